#[macro_use]
mod fmt;
use fmt::ToSql;

mod ident;

mod filter;

mod join;

mod params;
pub use params::{ParamCounter, Params, Placeholder};

mod select;
mod statement;
mod write;

use crate::stmt::Statement;

use griddle_core::stmt::Value;
use indexmap::IndexMap;

/// 1-based placeholder positions, keyed by the name bind values are looked
/// up under: each filter's wire code and then `offset` / `limit` on the read
/// path, column names on the write path.
pub type PlaceholderMap = IndexMap<String, usize>;

/// Serializes a statement to PostgreSQL SQL.
#[derive(Debug, Default)]
pub struct Serializer {
    _private: (),
}

impl Serializer {
    pub fn postgresql() -> Self {
        Self::default()
    }

    /// Serializes `stmt`, pushing one bind value per placeholder into
    /// `params` and returning the SQL text together with the
    /// placeholder-position map.
    pub fn serialize(&self, stmt: &Statement, params: &mut impl Params) -> (String, PlaceholderMap) {
        let mut ret = String::new();
        let mut positions = PlaceholderMap::new();

        let mut fmt = Formatter {
            dst: &mut ret,
            params,
            positions: &mut positions,
        };

        stmt.to_sql(&mut fmt);

        (ret, positions)
    }
}

struct Formatter<'a, T> {
    /// Where to write the serialized SQL
    dst: &'a mut String,

    /// Where to push bind values; assigns placeholder positions
    params: &'a mut T,

    /// Named first-placeholder positions, recorded as they are assigned
    positions: &'a mut PlaceholderMap,
}

impl<T: Params> Formatter<'_, T> {
    fn push(&mut self, value: &Value) -> Placeholder {
        self.params.push(value)
    }

    /// Records the position a named value binds at. The first recording of
    /// a name wins, matching bind order for duplicate filters.
    fn record(&mut self, name: &str, placeholder: &Placeholder) {
        self.positions
            .entry(name.to_string())
            .or_insert(placeholder.0);
    }
}
