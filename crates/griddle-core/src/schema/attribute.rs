use crate::stmt::SqlType;

/// A typed column of a collection.
///
/// Attributes are produced by catalog introspection. The declared type
/// drives both filter-operand coercion and write-placeholder wrapping; the
/// foreign-key target drives relationship classification.
#[derive(Debug, Clone, PartialEq)]
pub struct Attribute {
    /// Name of the column in the database.
    pub name: String,

    /// The declared SQL type.
    pub ty: SqlType,

    /// Whether the column accepts NULL.
    pub nullable: bool,

    /// True if the column identifies rows, either through a SQL identity
    /// clause or primary-key membership. The first identity attribute of a
    /// collection is the default target for update and delete.
    pub identity: bool,

    /// True if the column is populated from a sequence.
    pub auto_increment: bool,

    /// Foreign-key target, if the column references another collection.
    pub reference: Option<Reference>,

    /// PostGIS metadata for geometry columns.
    pub geometry: Option<GeometryInfo>,
}

/// Foreign-key target of an attribute.
#[derive(Debug, Clone, PartialEq)]
pub struct Reference {
    /// The referenced collection.
    pub collection: String,

    /// The referenced attribute, usually the collection's primary key.
    pub attribute: String,
}

/// Geometry column metadata, from the `geometry_columns` view.
#[derive(Debug, Clone, PartialEq)]
pub struct GeometryInfo {
    /// Geometry subtype, e.g. `POINT` or `MULTIPOLYGON`.
    pub subtype: String,

    /// Spatial reference identifier the column is stored in.
    pub srid: i32,

    /// Coordinate dimension (2 or 3).
    pub dimension: i32,
}

impl Attribute {
    pub fn new(name: impl Into<String>, ty: SqlType) -> Self {
        Self {
            name: name.into(),
            ty,
            nullable: true,
            identity: false,
            auto_increment: false,
            reference: None,
            geometry: None,
        }
    }

    /// Marks the attribute as an identity column.
    pub fn identity(mut self) -> Self {
        self.identity = true;
        self
    }

    /// Marks the attribute as sequence-populated.
    pub fn auto_increment(mut self) -> Self {
        self.auto_increment = true;
        self
    }

    /// Declares a foreign-key target.
    pub fn references(mut self, collection: impl Into<String>, attribute: impl Into<String>) -> Self {
        self.reference = Some(Reference {
            collection: collection.into(),
            attribute: attribute.into(),
        });
        self
    }

    /// Attaches geometry metadata.
    pub fn with_geometry(mut self, subtype: impl Into<String>, srid: i32, dimension: i32) -> Self {
        self.geometry = Some(GeometryInfo {
            subtype: subtype.into(),
            srid,
            dimension,
        });
        self
    }
}
