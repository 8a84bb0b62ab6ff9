use std::fmt;

/// A non-fatal notice accumulated while serving a request.
///
/// Warnings never abort the request; they are collected and returned
/// alongside the successful result.
#[derive(Debug, Clone, PartialEq)]
pub enum Warning {
    /// Requested attributes that are not part of the collection.
    UnknownAttributes { attributes: Vec<String> },

    /// The order-by column is unavailable; results are unordered.
    UnorderableColumn { column: String },

    /// The requested page size exceeded the configured hard limit.
    SizeClamped { requested: i64, limit: i64 },

    /// A timestamp operand outside the supported range was clamped.
    TimestampClamped { raw: String },

    /// Write fields with no matching column were skipped.
    UnknownWriteFields {
        collection: String,
        fields: Vec<String>,
    },

    /// One element of a batch write failed; the rest of the batch went
    /// through.
    WriteFailed { index: usize, message: String },

    /// The collection has no identity column, so no generated id can be
    /// returned.
    MissingIdentity { collection: String },

    /// A GeoJSON geometry could not be converted to WKT.
    GeometryConversion { message: String },
}

impl fmt::Display for Warning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Warning::UnknownAttributes { attributes } => write!(
                f,
                "the requested attributes >{}< are not available",
                attributes.join(",")
            ),
            Warning::UnorderableColumn { column } => write!(
                f,
                "the orderby attribute >{column}< is not available; data will be unordered"
            ),
            Warning::SizeClamped { requested, limit } => write!(
                f,
                "the given limit of >{requested}< exceeds the maximum of >{limit}<; \
                 at most >{limit}< datasets are returned"
            ),
            Warning::TimestampClamped { raw } => write!(
                f,
                "the timestamp >{raw}< is outside the supported range and was clamped"
            ),
            Warning::UnknownWriteFields { collection, fields } => write!(
                f,
                "collection >{collection}< does not expect data for >{}<",
                fields.join(",")
            ),
            Warning::WriteFailed { index, message } => {
                write!(f, "record >{index}< was not written: {message}")
            }
            Warning::MissingIdentity { collection } => write!(
                f,
                "collection >{collection}< has no identity column; \
                 no generated id is returned"
            ),
            Warning::GeometryConversion { message } => {
                write!(f, "could not convert geometry: {message}")
            }
        }
    }
}
