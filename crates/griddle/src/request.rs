use serde::Deserialize;

/// One read request, mirroring the wire surface of the records API.
///
/// All fields are optional; an empty request selects every attribute of
/// every record.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct QueryRequest {
    /// Comma-separated attributes to include. Identity and order-by
    /// attributes are always delivered.
    pub includes: Option<String>,

    /// Wire filters (`attribute,opcode,operand...`), combined with `AND`.
    pub filters: Vec<String>,

    /// Maximum number of records; `0` means unlimited (subject to the
    /// configured hard limit).
    pub size: i64,

    /// 1-based page spec, `page[,size]`.
    pub page: Option<String>,

    /// Order spec, `column[,asc|desc]`.
    pub order: Option<String>,

    /// Count matching records instead of returning them.
    pub count_only: bool,

    /// Deliver distinct values of one attribute.
    pub unique: Option<String>,

    /// Reassemble digit-suffixed flat rows into nested records.
    pub deflatten: bool,

    /// Geometry attribute to deliver results as a GeoJSON
    /// `FeatureCollection`.
    pub geojson_attr: Option<String>,

    /// Coordinate transform for geometry columns: `latlon` or an EPSG code.
    pub geotransform: Option<String>,

    /// Join paths, each a comma-separated chain of related collections.
    pub joins: Vec<String>,
}

impl QueryRequest {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn includes(mut self, includes: impl Into<String>) -> Self {
        self.includes = Some(includes.into());
        self
    }

    pub fn filter(mut self, code: impl Into<String>) -> Self {
        self.filters.push(code.into());
        self
    }

    pub fn size(mut self, size: i64) -> Self {
        self.size = size;
        self
    }

    pub fn page(mut self, page: impl Into<String>) -> Self {
        self.page = Some(page.into());
        self
    }

    pub fn order(mut self, order: impl Into<String>) -> Self {
        self.order = Some(order.into());
        self
    }

    pub fn count_only(mut self) -> Self {
        self.count_only = true;
        self
    }

    pub fn unique(mut self, column: impl Into<String>) -> Self {
        self.unique = Some(column.into());
        self
    }

    pub fn deflatten(mut self) -> Self {
        self.deflatten = true;
        self
    }

    pub fn geojson(mut self, attribute: impl Into<String>) -> Self {
        self.geojson_attr = Some(attribute.into());
        self
    }

    pub fn geotransform(mut self, transform: impl Into<String>) -> Self {
        self.geotransform = Some(transform.into());
        self
    }

    pub fn join(mut self, path: impl Into<String>) -> Self {
        self.joins.push(path.into());
        self
    }
}
