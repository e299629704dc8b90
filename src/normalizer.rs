//! Schema normalization - merges an operation's inputs into one object schema.

use crate::document::{Operation, Parameter};
use crate::schema::{ObjectSchema, SchemaKind, SchemaNode};

/// Merge parameters and the JSON request body into a single `object` node.
///
/// Body properties seed the root; their `required` listing only counts when
/// the request body itself is required. Parameters are applied afterwards,
/// so a parameter overwrites a body property of the same name. Parameters
/// without a schema are skipped. A route-model-bound parameter removes its
/// name from the payload entirely, including a body property of that name.
pub fn normalize(operation: &Operation) -> SchemaNode {
    let mut root = body_seed(operation);

    for param in &operation.parameters {
        if param.route_binding.is_some() {
            tracing::debug!(name = %param.name, "excluding route-model-bound parameter");
            root.properties.shift_remove(&param.name);
            root.required.shift_remove(&param.name);
            continue;
        }
        let Some(schema) = &param.schema else {
            tracing::debug!(name = %param.name, "skipping parameter without schema");
            continue;
        };
        merge_parameter(&mut root, param, schema);
    }

    SchemaNode::new(SchemaKind::Object(root))
}

fn body_seed(operation: &Operation) -> ObjectSchema {
    let Some(body) = &operation.request_body else {
        return ObjectSchema::default();
    };
    let Some(SchemaNode {
        kind: SchemaKind::Object(obj),
        ..
    }) = &body.json_schema
    else {
        return ObjectSchema::default();
    };

    ObjectSchema {
        properties: obj.properties.clone(),
        required: if body.required {
            obj.required.clone()
        } else {
            Default::default()
        },
    }
}

fn merge_parameter(root: &mut ObjectSchema, param: &Parameter, schema: &SchemaNode) {
    root.properties.insert(param.name.clone(), schema.clone());
    if param.required {
        root.required.insert(param.name.clone());
    } else {
        root.required.shift_remove(&param.name);
    }
}
