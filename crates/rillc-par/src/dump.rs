//! Stable JSON rendering of an AST, for debugging.
//!
//! The shape is field-filtered: booleans that are false, empty strings, and
//! empty sequences are omitted; the label appears as `_name`; source ranges
//! are dropped; a function body is renamed `inner` so it sorts after the
//! header fields.

use serde_json::{json, Map, Value};

use crate::ast::{Callee, Node, NodeKind, TypeExpr};

/// Renders a list of statements.
pub fn to_json(nodes: &[Node]) -> Value {
    Value::Array(nodes.iter().map(node_to_json).collect())
}

/// Renders a whole AST as pretty-printed text.
pub fn to_string_pretty(nodes: &[Node]) -> String {
    serde_json::to_string_pretty(&to_json(nodes)).expect("AST json has no non-string keys")
}

fn node_to_json(node: &Node) -> Value {
    let mut obj = Map::new();
    match &node.kind {
        NodeKind::Int(value) => {
            obj.insert("_type".into(), json!("IntLiteral"));
            obj.insert("value".into(), json!(value));
        }
        NodeKind::Str(value) => {
            obj.insert("_type".into(), json!("StringLiteral"));
            if !value.is_empty() {
                obj.insert("value".into(), json!(value));
            }
        }
        NodeKind::Type(ty) => {
            obj.insert("_type".into(), json!("Type"));
            type_fields(ty, &mut obj);
        }
        NodeKind::Function(func) => {
            obj.insert("_type".into(), json!("Function"));
            if !func.params.is_empty() {
                obj.insert(
                    "params".into(),
                    Value::Array(func.params.iter().map(type_to_json).collect()),
                );
            }
            if !func.body.is_empty() {
                obj.insert(
                    "inner".into(),
                    Value::Array(func.body.iter().map(node_to_json).collect()),
                );
            }
        }
        NodeKind::Apply(apply) => {
            obj.insert("_type".into(), json!("Apply"));
            match &apply.callee {
                Callee::Name(name) => {
                    obj.insert("of".into(), json!(name));
                }
                Callee::Func(func) => {
                    obj.insert("function".into(), node_to_json(func));
                }
            }
            if !apply.args.is_empty() {
                obj.insert(
                    "arguments".into(),
                    Value::Array(apply.args.iter().map(node_to_json).collect()),
                );
            }
        }
    }
    if let Some(name) = &node.name {
        if !name.is_empty() {
            obj.insert("_name".into(), json!(name));
        }
    }
    Value::Object(obj)
}

fn type_to_json(ty: &TypeExpr) -> Value {
    let mut obj = Map::new();
    obj.insert("_type".into(), json!("Type"));
    type_fields(ty, &mut obj);
    Value::Object(obj)
}

fn type_fields(ty: &TypeExpr, obj: &mut Map<String, Value>) {
    if let Some(value) = &ty.value {
        if !value.is_empty() {
            obj.insert("value".into(), json!(value));
        }
    }
    if !ty.values.is_empty() {
        obj.insert(
            "values".into(),
            Value::Array(ty.values.iter().map(type_to_json).collect()),
        );
    }
    if ty.comptime {
        obj.insert("comptime".into(), json!(true));
    }
    if let Some(name) = &ty.name {
        if !name.is_empty() {
            obj.insert("_name".into(), json!(name));
        }
    }
}
