use crate::request::QueryRequest;

use griddle_core::stmt::{Filter, Warning};
use griddle_core::Result;
use griddle_sql::PlaceholderMap;

use std::collections::hash_map::DefaultHasher;
use std::collections::HashMap;
use std::fmt::Write;
use std::hash::{Hash, Hasher};
use std::sync::{Arc, Mutex};

/// A compiled statement: SQL text plus placeholder bookkeeping.
///
/// Entries deliberately hold no driver handles; they stay valid across
/// reconnects and are shared between connections, each of which re-prepares
/// the text through its own statement cache.
#[derive(Debug, Clone)]
pub(crate) struct CompiledQuery {
    pub sql: String,

    /// 1-based first-placeholder positions: filter wire codes, then
    /// `offset`, then `limit` (or column names on the write path).
    pub placeholders: PlaceholderMap,

    /// Warnings raised while compiling, replayed on every reuse.
    pub warnings: Vec<Warning>,
}

/// Compiled-query cache shared by all requests of one service instance.
#[derive(Debug, Default)]
pub(crate) struct QueryCache {
    entries: Mutex<HashMap<String, Arc<CompiledQuery>>>,
}

impl QueryCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Atomic check-compile-insert per key. The lock is held across the
    /// builder, so concurrent requests never double-compile an entry or
    /// observe a partially built one.
    pub fn get_or_compile(
        &self,
        key: &str,
        build: impl FnOnce() -> Result<CompiledQuery>,
    ) -> Result<Arc<CompiledQuery>> {
        let mut entries = self.entries.lock().unwrap();
        if let Some(entry) = entries.get(key) {
            return Ok(entry.clone());
        }

        let compiled = Arc::new(build()?);
        entries.insert(key.to_string(), compiled.clone());
        Ok(compiled)
    }
}

/// Deterministic cache key over the request shape. Operand and paging
/// values do not participate: requests differing only in bound values share
/// one compiled statement. The filter set contributes attribute, operator,
/// negation, and operand count — everything that shapes the SQL.
pub(crate) fn cache_key(
    schema: &str,
    collection: &str,
    request: &QueryRequest,
    filters: &[Filter],
    size: i64,
) -> String {
    let mut key = format!("{schema}_{collection}");

    if let Some(includes) = &request.includes {
        key.push('_');
        key.push_str(includes);
    }
    if !filters.is_empty() {
        let mut hasher = DefaultHasher::new();
        for filter in filters {
            filter.qualifier.hash(&mut hasher);
            filter.attribute.hash(&mut hasher);
            filter.op.hash(&mut hasher);
            filter.negated.hash(&mut hasher);
            filter.values.len().hash(&mut hasher);
        }
        write!(key, "_f{:016x}", hasher.finish()).unwrap();
    }
    if let Some(order) = &request.order {
        key.push('_');
        key.push_str(order);
    }
    if size > 0 {
        write!(key, "_s{size}").unwrap();
    }
    if let Some(page) = &request.page {
        key.push('_');
        key.push_str(page);
    }
    if let Some(geo) = &request.geojson_attr {
        key.push_str("_geo");
        key.push_str(geo);
    }
    if let Some(transform) = &request.geotransform {
        key.push_str("_geot");
        key.push_str(transform);
    }
    for join in &request.joins {
        key.push_str("_j");
        key.push_str(join);
    }
    if let Some(unique) = &request.unique {
        key.push_str("_uq");
        key.push_str(unique);
    }
    write!(key, "_{}", request.count_only).unwrap();

    key
}

#[cfg(test)]
mod tests {
    use super::*;

    use griddle_core::schema::{Attribute, Collection};
    use griddle_core::stmt::{FilterParser, SqlType};
    use griddle_core::Catalog;

    fn catalog() -> Catalog {
        Catalog::new("public").with_collection(
            Collection::new("student")
                .with_attribute(Attribute::new("id", SqlType::I64).identity())
                .with_attribute(Attribute::new("name", SqlType::Text)),
        )
    }

    fn parse(codes: &[&str]) -> Vec<Filter> {
        let catalog = catalog();
        let parser = FilterParser::new(&catalog, "student");
        codes.iter().map(|code| parser.parse(code).unwrap()).collect()
    }

    fn request() -> QueryRequest {
        QueryRequest::new()
            .includes("id,name")
            .order("name,asc")
            .page("2")
    }

    #[test]
    fn key_is_deterministic() {
        let filters = parse(&["id,eq,1"]);
        let a = cache_key("public", "student", &request(), &filters, 10);
        let b = cache_key("public", "student", &request(), &filters, 10);
        assert_eq!(a, b);
    }

    #[test]
    fn key_distinguishes_request_shapes() {
        let filters = parse(&["id,eq,1"]);
        let base = cache_key("public", "student", &request(), &filters, 10);

        assert_ne!(base, cache_key("public", "course", &request(), &filters, 10));
        assert_ne!(base, cache_key("public", "student", &request(), &filters, 20));
        assert_ne!(
            base,
            cache_key("public", "student", &request().count_only(), &filters, 10)
        );
        assert_ne!(
            base,
            cache_key(
                "public",
                "student",
                &request(),
                &parse(&["id,eq,1", "name,cs,ann"]),
                10
            )
        );
        assert_ne!(
            base,
            cache_key("public", "student", &request().join("course"), &filters, 10)
        );
    }

    #[test]
    fn key_ignores_operand_values() {
        // same shape, different operand: the compiled statement is shared
        // and only the bound values differ
        let a = cache_key("public", "student", &QueryRequest::new(), &parse(&["id,eq,1"]), 0);
        let b = cache_key("public", "student", &QueryRequest::new(), &parse(&["id,eq,2"]), 0);
        assert_eq!(a, b);
    }
}
