use super::{Formatter, ToSql};

use griddle_core::stmt::Value;

pub trait Params {
    /// Pushes a bind value, returning its 1-based placeholder position.
    fn push(&mut self, param: &Value) -> Placeholder;
}

pub struct Placeholder(pub usize);

impl Params for Vec<Value> {
    fn push(&mut self, value: &Value) -> Placeholder {
        self.push(value.clone());
        Placeholder(self.len())
    }
}

/// Assigns placeholder positions without retaining values. Used when bind
/// values are reconstructed at bind time from the placeholder map.
#[derive(Debug, Default)]
pub struct ParamCounter(pub usize);

impl Params for ParamCounter {
    fn push(&mut self, _value: &Value) -> Placeholder {
        self.0 += 1;
        Placeholder(self.0)
    }
}

impl ToSql for Placeholder {
    fn to_sql<P: Params>(self, f: &mut Formatter<'_, P>) {
        use std::fmt::Write;

        write!(f.dst, "${}", self.0).unwrap();
    }
}
