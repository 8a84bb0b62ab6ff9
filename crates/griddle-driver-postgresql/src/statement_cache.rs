use std::{borrow::Cow, collections::HashMap};

use tokio_postgres::{Client, Error, Statement};

/// Prepared statements cached for one connection.
///
/// Handles in this cache are only valid for the client they were prepared
/// on; the cache lives and dies with its [`Connection`](crate::Connection)
/// and is never shared across connections.
#[derive(Debug, Clone, Default)]
pub(crate) struct StatementCache {
    map: HashMap<Key<'static>, Statement>,
}

impl StatementCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, sql: &str) -> Option<Statement> {
        self.map.get(&Key::new(sql)).map(ToOwned::to_owned)
    }

    pub fn insert(&mut self, sql: &str, statement: Statement) {
        self.map.insert(Key::new(sql).into_owned(), statement);
    }

    pub async fn prepare(&mut self, client: &Client, sql: &str) -> Result<Statement, Error> {
        if let Some(statement) = self.get(sql) {
            Ok(statement)
        } else {
            let statement = client.prepare(sql).await?;
            self.insert(sql, statement.clone());
            Ok(statement)
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct Key<'a> {
    sql: Cow<'a, str>,
}

impl<'a> Key<'a> {
    #[must_use]
    pub fn new(sql: &'a str) -> Self {
        Self { sql: sql.into() }
    }

    pub fn into_owned(self) -> Key<'static> {
        Key::<'static> {
            sql: self.sql.into_owned().into(),
        }
    }
}
