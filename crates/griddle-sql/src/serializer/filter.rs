use super::ident::Column;
use super::{Formatter, Params, ToSql};

use griddle_core::stmt::{Filter, FilterOp, Value};

/// One filter rendered as a predicate fragment.
///
/// The fragment contains exactly as many placeholders as the filter has
/// operands; the position of the first one is recorded under the filter's
/// wire code. Ordering operators negate by complement, the rest by `NOT`.
pub(super) struct Predicate<'a> {
    pub filter: &'a Filter,
    pub base: &'a str,
}

impl ToSql for &Predicate<'_> {
    fn to_sql<T: Params>(self, f: &mut Formatter<'_, T>) {
        let filter = self.filter;
        let collection = filter.qualifier.as_deref().unwrap_or(self.base);
        let column = Column(collection, &filter.attribute);
        let negated = filter.negated;

        match filter.op {
            FilterOp::Eq => {
                fmt!(f, column, if negated { " <> " } else { " = " });
                operand(f, filter, 0);
            }
            FilterOp::Lt => {
                fmt!(f, column, if negated { " >= " } else { " < " });
                operand(f, filter, 0);
            }
            FilterOp::Le => {
                fmt!(f, column, if negated { " > " } else { " <= " });
                operand(f, filter, 0);
            }
            FilterOp::Ge => {
                fmt!(f, column, if negated { " < " } else { " >= " });
                operand(f, filter, 0);
            }
            FilterOp::Gt => {
                fmt!(f, column, if negated { " <= " } else { " > " });
                operand(f, filter, 0);
            }
            FilterOp::Bt => {
                fmt!(f, column, if negated { " NOT BETWEEN " } else { " BETWEEN " });
                operand(f, filter, 0);
                fmt!(f, " AND ");
                operand(f, filter, 1);
            }
            FilterOp::In => {
                fmt!(f, column, if negated { " NOT IN (" } else { " IN (" });
                for index in 0..filter.values.len() {
                    if index > 0 {
                        fmt!(f, ", ");
                    }
                    operand(f, filter, index);
                }
                fmt!(f, ")");
            }
            FilterOp::Is => {
                fmt!(f, column, if negated { " IS NOT NULL" } else { " IS NULL" });
            }
            FilterOp::Cs | FilterOp::Sw | FilterOp::Ew => {
                fmt!(f, column, if negated { " NOT LIKE " } else { " LIKE " });
                operand(f, filter, 0);
            }
            FilterOp::Sir => {
                if negated {
                    fmt!(f, "NOT ");
                }
                fmt!(f, "ST_DWithin(ST_Transform(ST_SetSRID(ST_MakePoint(");
                operand(f, filter, 0);
                fmt!(f, ", ");
                operand(f, filter, 1);
                fmt!(f, "), ");
                operand(f, filter, 2);
                fmt!(f, "), ");
                operand(f, filter, 3);
                fmt!(f, "), ", column, ", ");
                operand(f, filter, 4);
                fmt!(f, ")");
            }
            FilterOp::Sib => {
                if negated {
                    fmt!(f, "NOT (");
                }
                fmt!(f, column, " @ ST_Transform(ST_MakeEnvelope(");
                for index in 0..5 {
                    if index > 0 {
                        fmt!(f, ", ");
                    }
                    operand(f, filter, index);
                }
                fmt!(f, "), ");
                operand(f, filter, 5);
                fmt!(f, ")");
                if negated {
                    fmt!(f, ")");
                }
            }
            FilterOp::Sco
            | FilterOp::Scr
            | FilterOp::Sdi
            | FilterOp::Seq
            | FilterOp::Sin
            | FilterOp::Sov
            | FilterOp::Sto
            | FilterOp::Swi => {
                if negated {
                    fmt!(f, "NOT ");
                }
                fmt!(f, topology_function(filter.op), "(", column, ", ST_GeomFromText(");
                operand(f, filter, 0);
                if let Some(srid) = filter.srid {
                    fmt!(f, ", ", srid);
                }
                fmt!(f, "))");
            }
            FilterOp::Sic | FilterOp::Sis | FilterOp::Siv => {
                if negated {
                    fmt!(f, "NOT ");
                }
                fmt!(f, validity_function(filter.op), "(", column, ")");
            }
        }
    }
}

/// Pushes one operand and renders its placeholder. The first operand's
/// position is recorded under the filter's wire code. Float operands carry
/// an explicit cast so `numeric` columns compare through `float8` instead of
/// forcing the driver to speak the numeric wire format.
fn operand<T: Params>(f: &mut Formatter<'_, T>, filter: &Filter, index: usize) {
    let value = &filter.values[index];
    let placeholder = f.push(value);
    if index == 0 {
        f.record(&filter.code, &placeholder);
    }
    fmt!(f, placeholder);
    if matches!(value, Value::F64(_)) {
        fmt!(f, "::float8");
    }
}

fn topology_function(op: FilterOp) -> &'static str {
    match op {
        FilterOp::Sco => "ST_Contains",
        FilterOp::Scr => "ST_Crosses",
        FilterOp::Sdi => "ST_Disjoint",
        FilterOp::Seq => "ST_Equals",
        FilterOp::Sin => "ST_Intersects",
        FilterOp::Sov => "ST_Overlaps",
        FilterOp::Sto => "ST_Touches",
        FilterOp::Swi => "ST_Within",
        _ => unreachable!("not a topology operator: {op:?}"),
    }
}

fn validity_function(op: FilterOp) -> &'static str {
    match op {
        FilterOp::Sic => "ST_IsClosed",
        FilterOp::Sis => "ST_IsSimple",
        FilterOp::Siv => "ST_IsValid",
        _ => unreachable!("not a validity operator: {op:?}"),
    }
}
