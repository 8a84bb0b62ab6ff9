use super::{FilterOp, SqlType, Value, Warning};
use crate::schema::{Attribute, Catalog};
use crate::{Error, Result};

/// A parsed filter expression.
///
/// Operands are coerced to the attribute's declared type at parse time, so
/// a constructed filter can no longer fail on types. `first_placeholder` is
/// assigned when the filter is compiled into a statement; a filter belongs
/// to one compiled query at a time and must be re-assigned before reuse.
#[derive(Debug, Clone, PartialEq)]
pub struct Filter {
    /// The raw wire code (`attribute,opcode,operand...`).
    pub code: String,

    /// Qualifying collection of a dotted attribute reference.
    pub qualifier: Option<String>,

    /// The filtered attribute.
    pub attribute: String,

    pub op: FilterOp,
    pub negated: bool,

    /// Coerced operands, in bind order.
    pub values: Vec<Value>,

    /// SRID of the filtered geometry column, for spatial predicates.
    pub srid: Option<i32>,

    /// 1-based position of the filter's first placeholder within the
    /// compiled statement.
    pub first_placeholder: Option<usize>,

    /// Non-fatal notices raised while parsing, e.g. clamped timestamps.
    pub warnings: Vec<Warning>,
}

impl Filter {
    /// Number of placeholders the compiled predicate binds. Operands are
    /// stored in bind order, so this is simply the operand count.
    pub fn placeholders(&self) -> usize {
        self.values.len()
    }
}

/// Parses wire filters against a catalog, a base collection, and the set of
/// collections named on the active join paths.
pub struct FilterParser<'a> {
    catalog: &'a Catalog,
    base: &'a str,
    scope: Vec<String>,
}

impl<'a> FilterParser<'a> {
    pub fn new(catalog: &'a Catalog, base: &'a str) -> Self {
        Self {
            catalog,
            base,
            scope: vec![],
        }
    }

    /// Admits additional collections for dotted attribute references.
    pub fn with_scope(mut self, collections: impl IntoIterator<Item = String>) -> Self {
        self.scope.extend(collections);
        self
    }

    pub fn parse(&self, code: &str) -> Result<Filter> {
        let parts: Vec<&str> = code.split(',').collect();
        if parts.len() < 2 {
            return Err(Error::filter(format!(
                "filter >{code}< is malformed; expected <attribute>,<opcode>[,<operand>...]"
            )));
        }

        let (qualifier, attribute_name) = match parts[0].split_once('.') {
            Some((collection, attribute)) => (Some(collection), attribute),
            None => (None, parts[0]),
        };
        if let Some(collection) = qualifier {
            if collection != self.base && !self.scope.iter().any(|s| s == collection) {
                return Err(Error::filter(format!(
                    "filter >{code}< references collection >{collection}<, \
                     which is not part of the query"
                )));
            }
        }

        let collection = self.catalog.collection(qualifier.unwrap_or(self.base))?;
        let attribute = collection.attribute(attribute_name).ok_or_else(|| {
            Error::filter(format!(
                "the attribute >{attribute_name}< does not exist on >{}<",
                collection.name
            ))
        })?;

        let (op, negated) = FilterOp::parse(parts[1])
            .ok_or_else(|| Error::filter(format!("unknown filter operator >{}<", parts[1])))?;

        let operands = &parts[2..];
        if !op.operands().accepts(operands.len()) {
            return Err(Error::filter(format!(
                "operator >{}< expects {} operands, got {}",
                op.opcode(),
                op.operands(),
                operands.len()
            )));
        }

        if op.is_spatial() && attribute.ty != SqlType::Geometry {
            return Err(Error::filter(format!(
                "operator >{}< requires a geometry attribute, but >{attribute_name}< is >{}<",
                op.opcode(),
                attribute.ty
            )));
        }

        let mut warnings = vec![];
        let values = coerce_operands(op, attribute, operands, &mut warnings)?;

        Ok(Filter {
            code: code.to_string(),
            qualifier: qualifier.map(str::to_string),
            attribute: attribute_name.to_string(),
            op,
            negated,
            values,
            srid: attribute.geometry.as_ref().map(|g| g.srid),
            first_placeholder: None,
            warnings,
        })
    }
}

fn coerce_operands(
    op: FilterOp,
    attribute: &Attribute,
    operands: &[&str],
    warnings: &mut Vec<Warning>,
) -> Result<Vec<Value>> {
    match op {
        FilterOp::Is | FilterOp::Sic | FilterOp::Sis | FilterOp::Siv => Ok(vec![]),

        // Substring operators pre-wrap the LIKE pattern.
        FilterOp::Cs | FilterOp::Sw | FilterOp::Ew => {
            if !attribute.ty.is_textual() {
                return Err(Error::filter(format!(
                    "operator >{}< requires a text attribute, but >{}< is >{}<",
                    op.opcode(),
                    attribute.name,
                    attribute.ty
                )));
            }
            let pattern = match op {
                FilterOp::Cs => format!("%{}%", operands[0]),
                FilterOp::Sw => format!("{}%", operands[0]),
                _ => format!("%{}", operands[0]),
            };
            Ok(vec![Value::String(pattern)])
        }

        // x, y, radius, srid, table srid on the wire; stored in the order
        // the predicate binds them: x, y, srid, table srid, radius.
        FilterOp::Sir => {
            let x = Value::coerce(operands[0], &SqlType::F64, warnings)?;
            let y = Value::coerce(operands[1], &SqlType::F64, warnings)?;
            let radius = Value::coerce(operands[2], &SqlType::F64, warnings)?;
            let srid = Value::coerce(operands[3], &SqlType::I32, warnings)?;
            let table_srid = Value::coerce(operands[4], &SqlType::I32, warnings)?;
            Ok(vec![x, y, srid, table_srid, radius])
        }

        FilterOp::Sib => {
            let mut values = vec![];
            for operand in &operands[..4] {
                values.push(Value::coerce(operand, &SqlType::F64, warnings)?);
            }
            for operand in &operands[4..] {
                values.push(Value::coerce(operand, &SqlType::I32, warnings)?);
            }
            Ok(values)
        }

        // the geometry literal is the whole remainder of the wire code;
        // WKT carries commas of its own
        FilterOp::Sco
        | FilterOp::Scr
        | FilterOp::Sdi
        | FilterOp::Seq
        | FilterOp::Sin
        | FilterOp::Sov
        | FilterOp::Sto
        | FilterOp::Swi => Ok(vec![Value::Geometry(operands.join(","))]),

        _ => operands
            .iter()
            .map(|operand| Value::coerce(operand, &attribute.ty, warnings))
            .collect(),
    }
}
