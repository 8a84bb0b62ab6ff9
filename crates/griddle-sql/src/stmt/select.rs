use griddle_core::schema::JoinTree;
use griddle_core::stmt::{Filter, OrderBy};

/// A compiled read request over one base collection.
///
/// Placeholder order is fixed: filter placeholders left to right in filter
/// order, then `OFFSET`, then `LIMIT`.
#[derive(Debug, Clone, PartialEq)]
pub struct Select {
    /// Database schema the base collection lives in.
    pub schema: String,

    /// The base collection.
    pub base: String,

    /// Base-collection projections, in output order.
    pub projections: Vec<Projection>,

    /// Resolved join paths, each rendered as a nested `LEFT JOIN`.
    pub joins: Vec<JoinTree>,

    /// Predicates combined with `AND`.
    pub filters: Vec<Filter>,

    pub order: Option<OrderBy>,

    /// Render an `OFFSET` placeholder.
    pub paged: bool,

    /// Render a `LIMIT` placeholder.
    pub limited: bool,

    pub output: Output,
}

/// Result shape of a select.
#[derive(Debug, Clone, PartialEq)]
pub enum Output {
    /// One JSON array of row objects.
    Records,

    /// `COUNT(*)` only.
    Count,

    /// Distinct values of one column.
    Unique(String),

    /// A GeoJSON `FeatureCollection`.
    GeoJson(GeoJson),
}

/// GeoJSON delivery: the designated geometry attribute becomes the feature
/// geometry and is excluded from the properties projection.
#[derive(Debug, Clone, PartialEq)]
pub struct GeoJson {
    pub attribute: String,

    /// SRID the column is stored in; geometries stored in another reference
    /// system are transformed to 4326 (2D) or 4979 (3D) on the way out.
    pub srid: i32,

    pub dimension: i32,
}

/// One projected column of the base collection.
#[derive(Debug, Clone, PartialEq)]
pub enum Projection {
    /// `"base"."col"`
    Column { name: String },

    /// `ENCODE("base"."col", 'BASE64') AS "col"` — binary data is delivered
    /// base64-encoded.
    Base64 { name: String },

    /// `ST_X`/`ST_Y` lat/lon pair of a transformed geometry column.
    LatLon { name: String },

    /// `ST_Transform("base"."col", code) AS "col"`.
    Transform { name: String, code: i32 },
}
