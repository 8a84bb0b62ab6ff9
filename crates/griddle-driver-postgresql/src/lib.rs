mod catalog;

mod statement_cache;
use statement_cache::StatementCache;

mod value;
use value::BindValue;

use griddle_core::stmt::Value;
use griddle_core::{Error, Result};

use postgres_types::ToSql;
use tokio_postgres::{Client, Config};
use tracing::{debug, warn};
use url::Url;

/// A PostgreSQL connection executing griddle statements.
///
/// Prepared statements are cached per connection and die with it; the SQL
/// text shared across connections lives in the engine's query cache and is
/// re-prepared on whichever connection runs it.
#[derive(Debug)]
pub struct Connection {
    client: Client,
    statements: StatementCache,
}

impl Connection {
    /// Wraps an already-connected client.
    pub fn new(client: Client) -> Self {
        Self {
            client,
            statements: StatementCache::new(),
        }
    }

    /// Connects to a PostgreSQL database using a `postgresql://` URL.
    pub async fn connect(url: &str) -> Result<Self> {
        let url = Url::parse(url)
            .map_err(|err| Error::config(format!("invalid connection URL: {err}")))?;

        if url.scheme() != "postgresql" {
            return Err(Error::config(format!(
                "connection URL does not have a `postgresql` scheme; url={url}"
            )));
        }

        let host = url
            .host_str()
            .ok_or_else(|| Error::config(format!("missing host in connection URL; url={url}")))?;

        if url.path().trim_start_matches('/').is_empty() {
            return Err(Error::config(format!(
                "no database specified - missing path in connection URL; url={url}"
            )));
        }

        let mut config = Config::new();
        config.host(host);
        config.dbname(url.path().trim_start_matches('/'));

        if let Some(port) = url.port() {
            config.port(port);
        }
        if !url.username().is_empty() {
            config.user(url.username());
        }
        if let Some(password) = url.password() {
            config.password(password);
        }

        let (client, connection) = config
            .connect(tokio_postgres::NoTls)
            .await
            .map_err(|err| Error::execution_from("could not connect to database", err))?;

        tokio::spawn(async move {
            if let Err(err) = connection.await {
                warn!("connection error: {err}");
            }
        });

        Ok(Self::new(client))
    }

    /// Liveness check. A prepared statement is only valid while the
    /// connection it was prepared on is open.
    pub fn is_open(&self) -> bool {
        !self.client.is_closed()
    }

    /// Runs a statement whose single row and column carry the JSON result.
    pub async fn query_json(&mut self, sql: &str, values: &[Value]) -> Result<Option<String>> {
        let statement = self.prepare(sql).await?;
        let bound: Vec<BindValue<'_>> = values.iter().map(BindValue).collect();
        let args: Vec<&(dyn ToSql + Sync)> = bound
            .iter()
            .map(|value| value as &(dyn ToSql + Sync))
            .collect();

        debug!(sql, params = values.len(), "executing query");
        let rows = self
            .client
            .query(&statement, &args)
            .await
            .map_err(|err| Error::execution_from("query failed", err))?;

        Ok(rows.first().and_then(|row| row.get::<_, Option<String>>(0)))
    }

    /// Runs a write statement, returning the number of affected rows.
    pub async fn execute(&mut self, sql: &str, values: &[Value]) -> Result<u64> {
        let statement = self.prepare(sql).await?;
        let bound: Vec<BindValue<'_>> = values.iter().map(BindValue).collect();
        let args: Vec<&(dyn ToSql + Sync)> = bound
            .iter()
            .map(|value| value as &(dyn ToSql + Sync))
            .collect();

        debug!(sql, params = values.len(), "executing statement");
        self.client
            .execute(&statement, &args)
            .await
            .map_err(|err| Error::execution_from("statement failed", err))
    }

    /// Single-row, single-column lookup used for identity retrieval.
    pub async fn query_value(&mut self, sql: &str) -> Result<Option<Value>> {
        let statement = self.prepare(sql).await?;
        let rows = self
            .client
            .query(&statement, &[])
            .await
            .map_err(|err| Error::execution_from("query failed", err))?;

        match rows.first() {
            Some(row) => Ok(Some(value::from_row(row, 0)?)),
            None => Ok(None),
        }
    }

    /// Converts a GeoJSON geometry into SRID-prefixed WKT using the server's
    /// own parser, transforming into the column's reference system when it
    /// differs from the GeoJSON default.
    pub async fn geojson_to_wkt(&mut self, geometry: &str, srid: i32) -> Result<Option<String>> {
        let rows = if srid == 4326 {
            self.client
                .query(
                    "SELECT ST_AsText(ST_GeomFromGeoJSON($1::text)) AS geom",
                    &[&geometry],
                )
                .await
        } else {
            self.client
                .query(
                    "SELECT ST_AsText(ST_Transform(ST_GeomFromGeoJSON($1::text), $2)) AS geom",
                    &[&geometry, &srid],
                )
                .await
        }
        .map_err(|err| Error::execution_from("could not convert geojson geometry", err))?;

        let wkt = rows.first().and_then(|row| row.get::<_, Option<String>>(0));
        Ok(wkt.map(|wkt| format!("SRID={srid};{wkt}")))
    }

    /// Starts an explicit transaction. The write path scopes one insert and
    /// its identity fetch this way.
    pub async fn begin(&mut self) -> Result<()> {
        self.batch("BEGIN").await
    }

    pub async fn commit(&mut self) -> Result<()> {
        self.batch("COMMIT").await
    }

    pub async fn rollback(&mut self) -> Result<()> {
        self.batch("ROLLBACK").await
    }

    async fn batch(&mut self, sql: &str) -> Result<()> {
        self.client
            .batch_execute(sql)
            .await
            .map_err(|err| Error::execution_from(format!("{sql} failed"), err))
    }

    async fn prepare(&mut self, sql: &str) -> Result<tokio_postgres::Statement> {
        self.statements
            .prepare(&self.client, sql)
            .await
            .map_err(|err| Error::compile_sql(format!("could not prepare statement: {err}"), sql))
    }
}

impl From<Client> for Connection {
    fn from(client: Client) -> Self {
        Self::new(client)
    }
}
