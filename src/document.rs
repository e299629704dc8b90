//! OpenAPI operations and document-level compilation.
//!
//! The document is expected to be fully dereferenced. Anything that does not
//! look like an operation, parameter or media type is skipped rather than
//! reported; a leftover `$ref` simply compiles as an unknown schema.

use serde::Serialize;
use serde_json::{Map, Value};

use crate::error::GenerateError;
use crate::normalizer::normalize;
use crate::rules::{compile_rules, render_rules};
use crate::schema::SchemaNode;
use crate::shape::data_shape;
use crate::types::{CompileOptions, RenderedRule};

/// HTTP methods recognized in a Path Item, in output order.
pub const HTTP_METHODS: &[&str] = &[
    "get", "put", "post", "delete", "options", "head", "patch", "trace",
];

/// The inputs of one operation.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Operation {
    pub operation_id: Option<String>,
    pub summary: Option<String>,
    pub parameters: Vec<Parameter>,
    pub request_body: Option<RequestBody>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Parameter {
    pub name: String,
    /// Location (`path`, `query`, `header`, `cookie`).
    pub location: String,
    pub required: bool,
    pub schema: Option<SchemaNode>,
    pub route_binding: Option<RouteModelBinding>,
}

/// Marks a parameter resolved by framework routing instead of user input.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct RouteModelBinding {
    pub key: String,
    pub model: String,
    pub description: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RequestBody {
    pub required: bool,
    /// Schema of the JSON media type, if one is declared.
    pub json_schema: Option<SchemaNode>,
}

/// The two derived artifacts of one operation.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OperationArtifacts {
    pub rules: Vec<RenderedRule>,
    pub data_shape: String,
}

/// Compiled artifacts plus the metadata the template layer needs.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CompiledOperation {
    /// Upper-case HTTP method.
    pub method: String,
    pub path: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub operation_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
    #[serde(flatten)]
    pub artifacts: OperationArtifacts,
}

impl Operation {
    /// Read an Operation Object.
    pub fn from_value(value: &Value, options: &CompileOptions) -> Self {
        let Some(map) = value.as_object() else {
            return Self::default();
        };

        Self {
            operation_id: string_field(map, "operationId"),
            summary: string_field(map, "summary"),
            parameters: parse_parameters(map.get("parameters"), options),
            request_body: map
                .get("requestBody")
                .and_then(Value::as_object)
                .map(|body| RequestBody::from_map(body, options)),
        }
    }

    /// Add path-level parameters not redeclared by this operation.
    ///
    /// A parameter is redeclared when both `name` and location match.
    pub fn inherit_parameters(&mut self, inherited: &[Parameter]) {
        let missing: Vec<Parameter> = inherited
            .iter()
            .filter(|p| {
                !self
                    .parameters
                    .iter()
                    .any(|own| own.name == p.name && own.location == p.location)
            })
            .cloned()
            .collect();
        if !missing.is_empty() {
            // path-level parameters come first, as declared in the document
            let own = std::mem::replace(&mut self.parameters, missing);
            self.parameters.extend(own);
        }
    }
}

impl Parameter {
    /// Read a Parameter Object; `None` when it has no name.
    pub fn from_value(value: &Value, options: &CompileOptions) -> Option<Self> {
        let map = value.as_object()?;
        let name = map.get("name")?.as_str()?.to_string();

        Some(Self {
            name,
            location: string_field(map, "in").unwrap_or_default(),
            required: map.get("required").and_then(Value::as_bool).unwrap_or(false),
            schema: map
                .get("schema")
                .map(|schema| SchemaNode::from_value(schema, options)),
            route_binding: map
                .get(&options.route_binding_key)
                .and_then(RouteModelBinding::from_value),
        })
    }
}

impl RouteModelBinding {
    /// Any object value counts as a binding; missing members stay empty.
    pub fn from_value(value: &Value) -> Option<Self> {
        let map = value.as_object()?;
        Some(Self {
            key: string_field(map, "key").unwrap_or_default(),
            model: string_field(map, "model").unwrap_or_default(),
            description: string_field(map, "description"),
        })
    }
}

impl RequestBody {
    fn from_map(map: &Map<String, Value>, options: &CompileOptions) -> Self {
        let json_schema = map
            .get("content")
            .and_then(Value::as_object)
            .and_then(json_media_type)
            .and_then(|media| media.get("schema"))
            .map(|schema| SchemaNode::from_value(schema, options));

        Self {
            required: map.get("required").and_then(Value::as_bool).unwrap_or(false),
            json_schema,
        }
    }
}

/// Compile one operation into its rule list and data shape.
pub fn compile_operation(operation: &Operation) -> OperationArtifacts {
    let root = normalize(operation);
    // The payload itself is always present.
    let specs = compile_rules(&root, true);

    OperationArtifacts {
        rules: render_rules(&specs),
        data_shape: data_shape(&root),
    }
}

/// Compile every operation of a document, in document order.
pub fn compile_document(document: &Value, options: &CompileOptions) -> Vec<CompiledOperation> {
    collect_operations(document, options)
        .into_iter()
        .map(|(method, path, operation)| compile_entry(method, path, &operation))
        .collect()
}

/// Compile the operation matching `selector`.
///
/// The selector is either an `operationId` or `METHOD /path`
/// (method is case-insensitive).
///
/// # Errors
///
/// Returns `GenerateError::OperationNotFound` when nothing matches.
pub fn find_operation(
    document: &Value,
    selector: &str,
    options: &CompileOptions,
) -> Result<CompiledOperation, GenerateError> {
    let by_route = selector
        .split_once(' ')
        .map(|(method, path)| (method.to_lowercase(), path.trim().to_string()));

    collect_operations(document, options)
        .into_iter()
        .find(|(method, path, operation)| {
            operation.operation_id.as_deref() == Some(selector)
                || by_route
                    .as_ref()
                    .is_some_and(|(m, p)| m == method && p == path)
        })
        .map(|(method, path, operation)| compile_entry(method, path, &operation))
        .ok_or_else(|| GenerateError::OperationNotFound {
            selector: selector.to_string(),
        })
}

// --- Internal implementation ---

fn compile_entry(method: &str, path: String, operation: &Operation) -> CompiledOperation {
    let artifacts = compile_operation(operation);
    tracing::debug!(
        method,
        path = %path,
        rules = artifacts.rules.len(),
        "compiled operation"
    );

    CompiledOperation {
        method: method.to_uppercase(),
        path,
        operation_id: operation.operation_id.clone(),
        summary: operation.summary.clone(),
        artifacts,
    }
}

fn collect_operations(
    document: &Value,
    options: &CompileOptions,
) -> Vec<(&'static str, String, Operation)> {
    let Some(paths) = document.get("paths").and_then(Value::as_object) else {
        tracing::debug!("document has no paths");
        return Vec::new();
    };

    let mut operations = Vec::new();
    for (path, item) in paths {
        let Some(item) = item.as_object() else {
            tracing::debug!(path = %path, "skipping non-object path item");
            continue;
        };
        let shared = parse_parameters(item.get("parameters"), options);

        for method in HTTP_METHODS {
            let Some(raw) = item.get(*method) else {
                continue;
            };
            if !raw.is_object() {
                tracing::debug!(path = %path, method, "skipping non-object operation");
                continue;
            }
            let mut operation = Operation::from_value(raw, options);
            operation.inherit_parameters(&shared);
            operations.push((*method, path.clone(), operation));
        }
    }
    operations
}

fn parse_parameters(value: Option<&Value>, options: &CompileOptions) -> Vec<Parameter> {
    value
        .and_then(Value::as_array)
        .map(|params| {
            params
                .iter()
                .filter_map(|p| Parameter::from_value(p, options))
                .collect()
        })
        .unwrap_or_default()
}

/// `application/json` first, otherwise the first `+json` media type.
fn json_media_type(content: &Map<String, Value>) -> Option<&Value> {
    content.get("application/json").or_else(|| {
        content
            .iter()
            .find(|(media_type, _)| media_type.ends_with("+json"))
            .map(|(_, media)| media)
    })
}

fn string_field(map: &Map<String, Value>, key: &str) -> Option<String> {
    map.get(key).and_then(Value::as_str).map(String::from)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn sample_document() -> Value {
        json!({
            "openapi": "3.0.3",
            "paths": {
                "/users/{user}": {
                    "parameters": [
                        {
                            "name": "user",
                            "in": "path",
                            "required": true,
                            "schema": { "type": "integer" },
                            "x-route-model-binding": { "key": "id", "model": "User" }
                        }
                    ],
                    "patch": {
                        "operationId": "updateUser",
                        "requestBody": {
                            "required": true,
                            "content": {
                                "application/json": {
                                    "schema": {
                                        "type": "object",
                                        "required": ["name"],
                                        "properties": {
                                            "name": { "type": "string", "minLength": 1 }
                                        }
                                    }
                                }
                            }
                        }
                    },
                    "get": { "operationId": "showUser" }
                }
            }
        })
    }

    #[test]
    fn operations_follow_method_order() {
        let compiled = compile_document(&sample_document(), &CompileOptions::default());
        let methods: Vec<&str> = compiled.iter().map(|c| c.method.as_str()).collect();
        assert_eq!(methods, ["GET", "PATCH"]);
    }

    #[test]
    fn inherited_bound_parameter_is_excluded() {
        let compiled = compile_document(&sample_document(), &CompileOptions::default());
        let patch = &compiled[1];
        assert_eq!(patch.artifacts.data_shape, "array{name:string}");
        assert_eq!(patch.artifacts.rules.len(), 1);
        assert_eq!(patch.artifacts.rules[0].path, "name");
        assert_eq!(patch.artifacts.rules[0].rule, r#"["required", "string", "min:1"]"#);
    }

    #[test]
    fn operation_level_parameter_replaces_path_level() {
        let mut operation = Operation::from_value(
            &json!({
                "parameters": [
                    { "name": "page", "in": "query", "schema": { "type": "string" } }
                ]
            }),
            &CompileOptions::default(),
        );
        let inherited = vec![
            Parameter::from_value(
                &json!({ "name": "page", "in": "query", "schema": { "type": "integer" } }),
                &CompileOptions::default(),
            )
            .unwrap(),
            Parameter::from_value(
                &json!({ "name": "lang", "in": "header", "schema": { "type": "string" } }),
                &CompileOptions::default(),
            )
            .unwrap(),
        ];
        operation.inherit_parameters(&inherited);

        let names: Vec<&str> = operation.parameters.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, ["lang", "page"]);
        assert!(matches!(
            operation.parameters[1].schema.as_ref().unwrap().kind,
            crate::schema::SchemaKind::String(_)
        ));
    }

    #[test]
    fn find_by_operation_id() {
        let op = find_operation(&sample_document(), "updateUser", &CompileOptions::default())
            .unwrap();
        assert_eq!(op.method, "PATCH");
        assert_eq!(op.path, "/users/{user}");
    }

    #[test]
    fn find_by_method_and_path() {
        let op = find_operation(
            &sample_document(),
            "get /users/{user}",
            &CompileOptions::default(),
        )
        .unwrap();
        assert_eq!(op.operation_id.as_deref(), Some("showUser"));
        assert_eq!(op.artifacts.data_shape, "array{}");
        assert!(op.artifacts.rules.is_empty());
    }

    #[test]
    fn find_missing_operation_errors() {
        let result = find_operation(&sample_document(), "deleteUser", &CompileOptions::default());
        assert!(matches!(
            result,
            Err(GenerateError::OperationNotFound { selector }) if selector == "deleteUser"
        ));
    }

    #[test]
    fn document_without_paths_is_empty() {
        assert!(compile_document(&json!({ "openapi": "3.1.0" }), &CompileOptions::default())
            .is_empty());
    }

    #[test]
    fn vendor_json_media_type_is_used() {
        let operation = Operation::from_value(
            &json!({
                "requestBody": {
                    "content": {
                        "text/plain": { "schema": { "type": "string" } },
                        "application/vnd.api+json": {
                            "schema": {
                                "type": "object",
                                "properties": { "id": { "type": "string" } }
                            }
                        }
                    }
                }
            }),
            &CompileOptions::default(),
        );
        assert_eq!(compile_operation(&operation).data_shape, "array{id?:string}");
    }

    #[test]
    fn custom_binding_key() {
        let options = CompileOptions::new().with_route_binding_key("x-bind");
        let param = Parameter::from_value(
            &json!({
                "name": "post",
                "in": "path",
                "schema": { "type": "integer" },
                "x-bind": { "key": "slug", "model": "Post" }
            }),
            &options,
        )
        .unwrap();
        assert_eq!(
            param.route_binding,
            Some(RouteModelBinding {
                key: "slug".into(),
                model: "Post".into(),
                description: None,
            })
        );
    }

    #[test]
    fn serializes_camel_case_with_flattened_artifacts() {
        let op = find_operation(&sample_document(), "updateUser", &CompileOptions::default())
            .unwrap();
        let value = serde_json::to_value(&op).unwrap();
        assert_eq!(value["operationId"], "updateUser");
        assert_eq!(value["dataShape"], "array{name:string}");
        assert_eq!(value["rules"][0]["path"], "name");
        assert!(value.get("summary").is_none());
    }
}
