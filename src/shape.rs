//! Data shape inference - renders a schema tree as a nested type annotation.
//!
//! | Schema | Shape |
//! |--------|-------|
//! | object | `array{a:string,b?:int}` |
//! | array | `<element>[]` |
//! | string / integer / number / boolean | `string` / `int` / `float` / `bool` |
//! | enum | `string&("a"\|"b")` |
//! | unknown | `mixed` |

use serde_json::Value;

use crate::schema::{SchemaKind, SchemaNode};

/// Infer the shape of the decoded payload described by `root`.
pub fn data_shape(root: &SchemaNode) -> String {
    infer_shape(root, None, false)
}

/// Infer the shape of `node`, optionally as a named (and nullable) member.
///
/// A named node renders as `name:type`, or `name?:type` when nullable;
/// an unnamed node renders only its type.
pub fn infer_shape(node: &SchemaNode, name: Option<&str>, nullable: bool) -> String {
    let ty = match &node.kind {
        SchemaKind::Array(arr) => format!("{}[]", infer_shape(&arr.items, None, false)),
        SchemaKind::Object(obj) => {
            let members: Vec<String> = obj
                .properties
                .iter()
                .map(|(child_name, child)| {
                    let optional = !obj.required.contains(child_name);
                    infer_shape(child, Some(child_name), optional)
                })
                .collect();
            format!("array{{{}}}", members.join(","))
        }
        SchemaKind::String(s) => literal_union("string", s.enum_values.as_deref()),
        SchemaKind::Integer(n) => literal_union("int", n.enum_values.as_deref()),
        SchemaKind::Number(n) => literal_union("float", n.enum_values.as_deref()),
        SchemaKind::Boolean => "bool".to_string(),
        SchemaKind::Unknown => "mixed".to_string(),
    };

    match name {
        Some(name) if nullable => format!("{}?:{}", name, ty),
        Some(name) => format!("{}:{}", name, ty),
        None => ty,
    }
}

/// `base&(lit|lit)` for enums, plain `base` otherwise.
fn literal_union(base: &str, values: Option<&[Value]>) -> String {
    match values {
        Some(values) => {
            let literals: Vec<String> = values.iter().map(Value::to_string).collect();
            format!("{}&({})", base, literals.join("|"))
        }
        None => base.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::CompileOptions;
    use serde_json::json;

    fn shape(value: Value) -> String {
        data_shape(&SchemaNode::from_value(&value, &CompileOptions::default()))
    }

    #[test]
    fn object_required_and_optional_members() {
        let s = shape(json!({
            "type": "object",
            "required": ["a"],
            "properties": {
                "a": { "type": "string" },
                "b": { "type": "integer" }
            }
        }));
        assert_eq!(s, "array{a:string,b?:int}");
    }

    #[test]
    fn member_order_follows_declaration() {
        let s = shape(json!({
            "type": "object",
            "required": ["z", "a"],
            "properties": {
                "z": { "type": "boolean" },
                "a": { "type": "number" }
            }
        }));
        assert_eq!(s, "array{z:bool,a:float}");
    }

    #[test]
    fn empty_object() {
        assert_eq!(shape(json!({ "type": "object" })), "array{}");
    }

    #[test]
    fn nested_array_of_objects() {
        let s = shape(json!({
            "type": "object",
            "properties": {
                "lines": {
                    "type": "array",
                    "items": {
                        "type": "object",
                        "required": ["sku"],
                        "properties": {
                            "sku": { "type": "string" },
                            "qty": { "type": "integer" }
                        }
                    }
                }
            }
        }));
        assert_eq!(s, "array{lines?:array{sku:string,qty?:int}[]}");
    }

    #[test]
    fn named_array_marks_name_not_brackets() {
        let node = SchemaNode::from_value(
            &json!({ "type": "array", "items": { "type": "string" } }),
            &CompileOptions::default(),
        );
        assert_eq!(infer_shape(&node, Some("tags"), true), "tags?:string[]");
        assert_eq!(infer_shape(&node, Some("tags"), false), "tags:string[]");
        assert_eq!(infer_shape(&node, None, true), "string[]");
    }

    #[test]
    fn enums_render_as_literal_unions() {
        assert_eq!(
            shape(json!({ "type": "string", "enum": ["asc", "desc"] })),
            r#"string&("asc"|"desc")"#
        );
        assert_eq!(
            shape(json!({ "type": "integer", "enum": [1, 2] })),
            "int&(1|2)"
        );
        assert_eq!(
            shape(json!({ "type": "number", "enum": [0.5, 2] })),
            "float&(0.5|2)"
        );
    }

    #[test]
    fn array_without_items_is_mixed_list() {
        assert_eq!(shape(json!({ "type": "array" })), "mixed[]");
    }

    #[test]
    fn unknown_is_mixed() {
        assert_eq!(shape(json!({})), "mixed");
        assert_eq!(shape(json!({ "type": "null" })), "mixed");
        assert_eq!(
            shape(json!({ "type": "object", "properties": { "x": {} } })),
            "array{x?:mixed}"
        );
    }

    #[test]
    fn overrides_do_not_affect_shape() {
        let s = shape(json!({
            "type": "object",
            "properties": {
                "meta": {
                    "type": "object",
                    "x-validation-rules": ["array"],
                    "properties": { "k": { "type": "string" } }
                }
            }
        }));
        assert_eq!(s, "array{meta?:array{k?:string}}");
    }
}
