use super::{Formatter, Params, ToSql};

/// A double-quoted SQL identifier. Embedded quotes are doubled, which keeps
/// catalog-sourced names safe to splice.
pub(super) struct Ident<'a>(pub &'a str);

impl ToSql for Ident<'_> {
    fn to_sql<T: Params>(self, f: &mut Formatter<'_, T>) {
        f.dst.push('"');
        for c in self.0.chars() {
            if c == '"' {
                f.dst.push('"');
            }
            f.dst.push(c);
        }
        f.dst.push('"');
    }
}

/// A schema-qualified table reference, `"schema"."name"`.
pub(super) struct Qualified<'a>(pub &'a str, pub &'a str);

impl ToSql for Qualified<'_> {
    fn to_sql<T: Params>(self, f: &mut Formatter<'_, T>) {
        fmt!(f, Ident(self.0), ".", Ident(self.1));
    }
}

/// A single-quoted string literal, used for `json_build_object` keys.
pub(super) struct KeyLiteral<'a>(pub &'a str);

impl ToSql for KeyLiteral<'_> {
    fn to_sql<T: Params>(self, f: &mut Formatter<'_, T>) {
        f.dst.push('\'');
        for c in self.0.chars() {
            if c == '\'' {
                f.dst.push('\'');
            }
            f.dst.push(c);
        }
        f.dst.push('\'');
    }
}

/// A column reference qualified by its collection, `"collection"."column"`.
pub(super) struct Column<'a>(pub &'a str, pub &'a str);

impl ToSql for Column<'_> {
    fn to_sql<T: Params>(self, f: &mut Formatter<'_, T>) {
        fmt!(f, Ident(self.0), ".", Ident(self.1));
    }
}
