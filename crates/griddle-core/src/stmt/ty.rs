use std::fmt;

/// The closed set of column types the record API understands.
///
/// Catalog type names are folded into these variants once, at introspection
/// time; coercion and placeholder wrapping dispatch on the variant instead
/// of re-examining type strings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SqlType {
    /// Boolean value
    Bool,

    /// Signed 16-bit integer (`int2`)
    I16,

    /// Signed 32-bit integer (`int4`)
    I32,

    /// Signed 64-bit integer (`int8`)
    I64,

    /// Double-precision float; also carries `numeric`/`decimal` columns
    F64,

    /// Unconstrained or length-limited text
    Text,

    /// Timestamp without time zone
    Timestamp,

    /// Civil date
    Date,

    /// `json` / `jsonb`
    Json,

    /// PostGIS geometry
    Geometry,

    /// Binary data (`bytea`), delivered base64-encoded
    Bytes,

    /// A catalog type with no dedicated handling
    Other(String),
}

impl SqlType {
    /// Folds a catalog type name (`udt_name`) into a variant.
    pub fn from_catalog(name: &str) -> SqlType {
        match name.to_ascii_lowercase().as_str() {
            "bool" | "boolean" => SqlType::Bool,
            "int2" | "smallint" => SqlType::I16,
            "int4" | "integer" | "serial" => SqlType::I32,
            "int8" | "bigint" | "bigserial" => SqlType::I64,
            "float4" | "float8" | "real" | "double precision" | "numeric" | "decimal" => {
                SqlType::F64
            }
            "text" | "varchar" | "character varying" | "bpchar" | "char" => SqlType::Text,
            "date" => SqlType::Date,
            "json" | "jsonb" => SqlType::Json,
            "geometry" => SqlType::Geometry,
            "bytea" => SqlType::Bytes,
            lowered if lowered.starts_with("timestamp") => SqlType::Timestamp,
            _ => SqlType::Other(name.to_string()),
        }
    }

    pub fn is_numeric(&self) -> bool {
        matches!(
            self,
            SqlType::I16 | SqlType::I32 | SqlType::I64 | SqlType::F64
        )
    }

    pub fn is_textual(&self) -> bool {
        matches!(self, SqlType::Text)
    }
}

impl fmt::Display for SqlType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SqlType::Bool => "bool",
            SqlType::I16 => "int2",
            SqlType::I32 => "int4",
            SqlType::I64 => "int8",
            SqlType::F64 => "float8",
            SqlType::Text => "text",
            SqlType::Timestamp => "timestamp",
            SqlType::Date => "date",
            SqlType::Json => "json",
            SqlType::Geometry => "geometry",
            SqlType::Bytes => "bytea",
            SqlType::Other(name) => name,
        };
        f.write_str(name)
    }
}
