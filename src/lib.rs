//! OpenAPI Request Rules
//!
//! Compiles the input contract of an OpenAPI operation (parameters plus JSON
//! request body) into the two artifacts a server-side code generator needs:
//!
//! - an ordered list of per-field validation rules, and
//! - a single data-shape annotation describing the decoded payload.
//!
//! # Example
//!
//! ```
//! use oas_rules::{compile_operation, CompileOptions, Operation};
//! use serde_json::json;
//!
//! let operation = json!({
//!     "parameters": [
//!         { "name": "page", "in": "query", "schema": { "type": "integer", "minimum": 1 } }
//!     ],
//!     "requestBody": {
//!         "required": true,
//!         "content": {
//!             "application/json": {
//!                 "schema": {
//!                     "type": "object",
//!                     "required": ["title"],
//!                     "properties": {
//!                         "title": { "type": "string", "minLength": 3, "maxLength": 10 }
//!                     }
//!                 }
//!             }
//!         }
//!     }
//! });
//!
//! let operation = Operation::from_value(&operation, &CompileOptions::default());
//! let artifacts = compile_operation(&operation);
//!
//! assert_eq!(artifacts.rules[0].path, "title");
//! assert_eq!(artifacts.rules[0].rule, r#"["required", "string", "between:3,10"]"#);
//! assert_eq!(artifacts.rules[1].rule, r#"["sometimes", "integer", "min:1"]"#);
//! assert_eq!(artifacts.data_shape, "array{title:string,page?:int}");
//! ```
//!
//! # Necessity Rules
//!
//! | Required | Minimum length/items > 0 | Leading tokens |
//! |----------|--------------------------|----------------|
//! | yes | no | `present` |
//! | yes | yes | `required` |
//! | no | no | `sometimes` |
//! | no | yes | `sometimes`, `filled` |
//!
//! # Vendor Extensions
//!
//! A schema may replace its derived rules with an explicit list:
//! ```json
//! { "type": "string", "x-validation-rules": ["uuid", ["exists", "users", "id"], { "raw": "new Slug" }] }
//! ```
//!
//! A parameter resolved by routing is left out of both artifacts:
//! ```json
//! { "name": "user", "in": "path", "x-route-model-binding": { "key": "id", "model": "User" } }
//! ```

mod document;
mod error;
mod loader;
mod normalizer;
mod rules;
mod schema;
mod shape;
mod types;

pub use document::{
    compile_document, compile_operation, find_operation, CompiledOperation, Operation,
    OperationArtifacts, Parameter, RequestBody, RouteModelBinding, HTTP_METHODS,
};
pub use error::{GenerateError, LoadError};
pub use loader::{is_url, load_document, load_document_auto, load_document_str};
pub use normalizer::normalize;
pub use rules::{
    child_path, compile_rules, compile_rules_at, necessity_prefix, render_rule, render_rules,
    select_constraints, ConstraintCase, NUMERIC_CASES, STRING_CASES,
};
pub use schema::{
    ArraySchema, NumericSchema, ObjectSchema, SchemaKind, SchemaNode, StringFormat, StringSchema,
};
pub use shape::{data_shape, infer_shape};
pub use types::{
    CompileOptions, RenderedRule, RuleSpec, RuleToken, DEFAULT_ROUTE_BINDING_KEY,
    DEFAULT_RULE_OVERRIDE_KEY, WILDCARD_SEGMENT,
};

#[cfg(feature = "remote")]
pub use loader::load_document_url;
