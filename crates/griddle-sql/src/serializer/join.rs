use super::ident::{Column, Ident, KeyLiteral, Qualified};
use super::{Formatter, Params, ToSql};

use griddle_core::schema::{JoinNode, Link};

/// Renders one join step and, nested inside it, the rest of the path.
///
/// Aggregating steps (one-to-many, many-to-many) close with a `GROUP BY` on
/// their attachment key after any nested child has been rendered; singular
/// steps emit `json_build_object` without grouping.
pub(super) fn join_node<T: Params>(
    f: &mut Formatter<'_, T>,
    schema: &str,
    parent: &str,
    node: &JoinNode,
) {
    match &node.link {
        Link::ForeignKeyOnJoined { fk, referenced } => {
            fmt!(
                f,
                " LEFT JOIN (SELECT ",
                Column(&node.collection, fk),
                ", json_agg(json_build_object(",
            );
            payload_pairs(f, node);
            fmt!(
                f,
                ")) AS ",
                Ident(&node.collection),
                " FROM ",
                Qualified(schema, &node.collection),
            );
            if let Some(child) = &node.child {
                join_node(f, schema, &node.collection, child);
            }
            fmt!(
                f,
                " GROUP BY ",
                Column(&node.collection, fk),
                ") AS ",
                Ident(&node.collection),
                " ON ",
                Column(&node.collection, fk),
                " = ",
                Column(parent, referenced),
            );
        }
        Link::ForeignKeyOnParent { fk, referenced } => {
            fmt!(
                f,
                " LEFT JOIN (SELECT ",
                Column(&node.collection, referenced),
                ", json_build_object(",
            );
            payload_pairs(f, node);
            fmt!(
                f,
                ") AS ",
                Ident(&node.collection),
                " FROM ",
                Qualified(schema, &node.collection),
            );
            if let Some(child) = &node.child {
                join_node(f, schema, &node.collection, child);
            }
            fmt!(
                f,
                ") AS ",
                Ident(&node.collection),
                " ON ",
                Column(parent, fk),
                " = ",
                Column(&node.collection, referenced),
            );
        }
        Link::ViaJunction(junction) => {
            fmt!(
                f,
                " LEFT JOIN (SELECT ",
                Column(&junction.collection, &junction.to_parent.fk_attribute),
                ", json_agg(json_build_object(",
            );
            payload_pairs(f, node);
            fmt!(
                f,
                ")) AS ",
                Ident(&node.collection),
                " FROM ",
                Qualified(schema, &junction.collection),
                " LEFT JOIN ",
                Qualified(schema, &node.collection),
                " ON ",
                Column(&junction.collection, &junction.to_joined.fk_attribute),
                " = ",
                Column(&node.collection, &junction.to_joined.referenced_attribute),
            );
            if let Some(child) = &node.child {
                join_node(f, schema, &node.collection, child);
            }
            fmt!(
                f,
                " GROUP BY ",
                Column(&junction.collection, &junction.to_parent.fk_attribute),
                ") AS ",
                Ident(&junction.collection),
                " ON ",
                Column(&junction.collection, &junction.to_parent.fk_attribute),
                " = ",
                Column(parent, &junction.to_parent.referenced_attribute),
            );
        }
    }
}

/// The `json_build_object` key/value pairs of one step: the step's own
/// attributes, then the nested child's payload under the child's JSON key.
/// The foreign key attaching the child was already dropped during
/// resolution, so raw key values never shadow the nested payload.
fn payload_pairs<T: Params>(f: &mut Formatter<'_, T>, node: &JoinNode) {
    let mut first = true;
    for attribute in &node.attributes {
        if !first {
            fmt!(f, ", ");
        }
        fmt!(
            f,
            KeyLiteral(attribute),
            ", ",
            Column(&node.collection, attribute),
        );
        first = false;
    }

    // junction payload attributes ride along with the joined collection's
    if let Link::ViaJunction(junction) = &node.link {
        for attribute in &junction.attributes {
            if !first {
                fmt!(f, ", ");
            }
            fmt!(
                f,
                KeyLiteral(attribute),
                ", ",
                Column(&junction.collection, attribute),
            );
            first = false;
        }
    }

    if let Some(child) = &node.child {
        if !first {
            fmt!(f, ", ");
        }
        fmt!(f, KeyLiteral(&child.json_key), ", ");
        if child.aggregated {
            fmt!(f, "coalesce(", Ident(&child.collection), ", '[]'::json)");
        } else {
            fmt!(f, Ident(&child.collection));
        }
    }
}
