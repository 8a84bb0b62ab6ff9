use crate::config::Config;
use crate::engine::cache::QueryCache;
use crate::Warning;

use griddle_core::stmt::Value;
use griddle_core::{Catalog, Result};
use griddle_driver_postgresql::Connection;

/// The record API facade: query, create, update, and delete over
/// dynamically introspected collections.
///
/// One `Griddle` owns one database connection plus the compiled-query
/// cache. The cache stores SQL text and placeholder positions only, so it
/// survives reconnects; live prepared statements stay inside the driver's
/// per-connection cache.
#[derive(Debug)]
pub struct Griddle {
    pub(crate) connection: Connection,
    pub(crate) config: Config,
    pub(crate) cache: QueryCache,
    url: String,
}

/// A successful read along with the warnings collected on the way.
#[derive(Debug, Clone, PartialEq)]
pub struct QueryOutput {
    pub records: serde_json::Value,
    pub warnings: Vec<Warning>,
}

/// Identities generated for a create request, one entry per record.
#[derive(Debug, Clone, PartialEq)]
pub struct CreateOutput {
    pub ids: Vec<serde_json::Value>,
    pub warnings: Vec<Warning>,
}

/// The identity of the last record touched by an update request.
#[derive(Debug, Clone, PartialEq)]
pub struct UpdateOutput {
    pub last_id: Option<serde_json::Value>,
    pub warnings: Vec<Warning>,
}

impl Griddle {
    /// Connects to the configured backend.
    pub async fn connect(url: &str, config: Config) -> Result<Self> {
        let connection = Connection::connect(url).await?;
        Ok(Self {
            connection,
            config,
            cache: QueryCache::new(),
            url: url.to_string(),
        })
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Reconnects when the connection died. Compiled SQL survives in the
    /// query cache and is re-prepared on the new connection.
    pub(crate) async fn ensure_open(&mut self) -> Result<()> {
        if !self.connection.is_open() {
            self.connection = Connection::connect(&self.url).await?;
        }
        Ok(())
    }

    /// Catalog snapshot for this request, with configured junction
    /// overrides applied.
    pub(crate) async fn catalog(&self) -> Result<Catalog> {
        let mut catalog = self.connection.introspect(&self.config.schema).await?;
        for junction in &self.config.junctions {
            catalog = catalog.with_junction_override(
                junction.left.clone(),
                junction.right.clone(),
                junction.junction.clone(),
            );
        }
        Ok(catalog)
    }
}

/// Converts a database value into its JSON representation for identity
/// reporting.
pub(crate) fn value_to_json(value: Value) -> serde_json::Value {
    match value {
        Value::Bool(v) => v.into(),
        Value::I16(v) => v.into(),
        Value::I32(v) => v.into(),
        Value::I64(v) => v.into(),
        Value::F64(v) => serde_json::Number::from_f64(v)
            .map_or(serde_json::Value::Null, serde_json::Value::Number),
        Value::String(v) | Value::Geometry(v) => v.into(),
        Value::Json(v) => {
            serde_json::from_str(&v).unwrap_or_else(|_| serde_json::Value::String(v))
        }
        Value::Timestamp(v) => v.format("%Y-%m-%dT%H:%M:%S").to_string().into(),
        Value::Date(v) => v.format("%Y-%m-%d").to_string().into(),
        Value::Null => serde_json::Value::Null,
    }
}
