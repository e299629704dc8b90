//! Rule compilation - walks a schema tree and emits per-field validation rules.
//!
//! # Necessity prefix
//!
//! | required | bound > 0 | tokens |
//! |----------|-----------|--------|
//! | true | no | `present` |
//! | true | yes | `required` |
//! | false | no | `sometimes` |
//! | false | yes | `sometimes`, `filled` |
//!
//! The bound is `minLength` for strings and `minItems` for arrays.
//!
//! # Constraint selection
//!
//! Leaf constraints are chosen from an ordered table of cases; the first
//! case whose predicate holds wins, so more specific combinations are
//! listed before their subsets. See [`STRING_CASES`] and [`NUMERIC_CASES`].

use serde_json::Value;

use crate::schema::{
    ArraySchema, NumericSchema, SchemaKind, SchemaNode, StringFormat, StringSchema,
};
use crate::types::{RenderedRule, RuleSpec, RuleToken, WILDCARD_SEGMENT};

/// One row of a constraint table.
pub struct ConstraintCase<C> {
    pub label: &'static str,
    pub applies: fn(&C) -> bool,
    pub emit: fn(&C) -> Vec<RuleToken>,
}

/// String constraint cases, most specific first. Enum wins over everything.
pub static STRING_CASES: &[ConstraintCase<StringSchema>] = &[
    ConstraintCase {
        label: "enum",
        applies: |s| s.enum_values.is_some(),
        emit: |s| vec![in_token(s.enum_values.as_deref().unwrap_or_default())],
    },
    ConstraintCase {
        label: "min+max+pattern",
        applies: |s| min_len(s).is_some() && s.max_length.is_some() && s.pattern.is_some(),
        emit: |s| vec![between_len(s), regex_token(s)],
    },
    ConstraintCase {
        label: "min+max",
        applies: |s| min_len(s).is_some() && s.max_length.is_some(),
        emit: |s| vec![between_len(s)],
    },
    ConstraintCase {
        label: "min+pattern",
        applies: |s| min_len(s).is_some() && s.pattern.is_some(),
        emit: |s| vec![RuleToken::param("min", min_len(s)), regex_token(s)],
    },
    ConstraintCase {
        label: "max+pattern",
        applies: |s| s.max_length.is_some() && s.pattern.is_some(),
        emit: |s| vec![RuleToken::param("max", s.max_length), regex_token(s)],
    },
    ConstraintCase {
        label: "min",
        applies: |s| min_len(s).is_some(),
        emit: |s| vec![RuleToken::param("min", min_len(s))],
    },
    ConstraintCase {
        label: "max",
        applies: |s| s.max_length.is_some(),
        emit: |s| vec![RuleToken::param("max", s.max_length)],
    },
    ConstraintCase {
        label: "pattern",
        applies: |s| s.pattern.is_some(),
        emit: |s| vec![regex_token(s)],
    },
    ConstraintCase {
        label: "email",
        applies: |s| s.format == StringFormat::Email,
        emit: |_| vec![RuleToken::keyword("email")],
    },
    ConstraintCase {
        label: "date-time",
        applies: |s| s.format == StringFormat::DateTime,
        emit: |_| vec![RuleToken::keyword("date")],
    },
];

/// Integer and number constraint cases, most specific first.
pub static NUMERIC_CASES: &[ConstraintCase<NumericSchema>] = &[
    ConstraintCase {
        label: "enum",
        applies: |n| n.enum_values.is_some(),
        emit: |n| vec![in_token(n.enum_values.as_deref().unwrap_or_default())],
    },
    ConstraintCase {
        label: "min+max",
        applies: |n| n.minimum.is_some() && n.maximum.is_some(),
        emit: |n| vec![RuleToken::param("between", n.minimum.iter().chain(&n.maximum))],
    },
    ConstraintCase {
        label: "min",
        applies: |n| n.minimum.is_some(),
        emit: |n| vec![RuleToken::param("min", &n.minimum)],
    },
    ConstraintCase {
        label: "max",
        applies: |n| n.maximum.is_some(),
        emit: |n| vec![RuleToken::param("max", &n.maximum)],
    },
];

/// Tokens of the first matching case, or none.
pub fn select_constraints<C>(cases: &[ConstraintCase<C>], schema: &C) -> Vec<RuleToken> {
    cases
        .iter()
        .find(|case| (case.applies)(schema))
        .map(|case| (case.emit)(schema))
        .unwrap_or_default()
}

/// Leading tokens stating whether and when a field must be present.
pub fn necessity_prefix(required: bool, bound: Option<u64>) -> Vec<RuleToken> {
    let bounded = bound.is_some_and(|b| b > 0);
    match (required, bounded) {
        (true, false) => vec![RuleToken::keyword("present")],
        (true, true) => vec![RuleToken::keyword("required")],
        (false, false) => vec![RuleToken::keyword("sometimes")],
        (false, true) => vec![RuleToken::keyword("sometimes"), RuleToken::keyword("filled")],
    }
}

/// Compile rules for a root node.
///
/// The root itself has an empty path; its object properties become
/// top-level paths.
pub fn compile_rules(node: &SchemaNode, required: bool) -> Vec<RuleSpec> {
    compile_rules_at(node, "", required)
}

/// Compile rules for the subtree rooted at `path`.
pub fn compile_rules_at(node: &SchemaNode, path: &str, required: bool) -> Vec<RuleSpec> {
    let mut rules = Vec::new();
    collect(node, path, required, &mut rules);
    rules
}

/// Render a rule specification for the template layer.
pub fn render_rule(spec: &RuleSpec) -> RenderedRule {
    let tokens: Vec<String> = spec.tokens.iter().map(RuleToken::render).collect();
    RenderedRule {
        path: spec.path.clone(),
        rule: format!("[{}]", tokens.join(", ")),
    }
}

pub fn render_rules(specs: &[RuleSpec]) -> Vec<RenderedRule> {
    specs.iter().map(render_rule).collect()
}

/// Join a parent path and a segment.
pub fn child_path(parent: &str, segment: &str) -> String {
    if parent.is_empty() {
        segment.to_string()
    } else {
        format!("{}.{}", parent, segment)
    }
}

// --- Internal implementation ---

fn collect(node: &SchemaNode, path: &str, required: bool, out: &mut Vec<RuleSpec>) {
    if let Some(tokens) = &node.rule_override {
        let mut all = necessity_prefix(required, node.presence_bound());
        all.extend(tokens.iter().cloned());
        push(out, path, all);
        return;
    }

    match &node.kind {
        SchemaKind::Object(obj) => {
            for (name, child) in &obj.properties {
                let child_required = required && obj.required.contains(name);
                collect(child, &child_path(path, name), child_required, out);
            }
        }
        SchemaKind::Array(arr) => {
            let mut tokens = necessity_prefix(required, arr.min_items);
            tokens.push(RuleToken::keyword("array"));
            tokens.extend(size_token(arr));
            push(out, path, tokens);

            // Element presence is governed by the array rule alone.
            collect(&arr.items, &child_path(path, WILDCARD_SEGMENT), false, out);
        }
        SchemaKind::String(s) => {
            let mut tokens = necessity_prefix(required, s.min_length);
            tokens.push(RuleToken::keyword("string"));
            tokens.extend(select_constraints(STRING_CASES, s));
            push(out, path, tokens);
        }
        SchemaKind::Integer(n) => {
            let mut tokens = necessity_prefix(required, None);
            tokens.push(RuleToken::keyword("integer"));
            tokens.extend(select_constraints(NUMERIC_CASES, n));
            push(out, path, tokens);
        }
        SchemaKind::Number(n) => {
            let mut tokens = necessity_prefix(required, None);
            tokens.push(RuleToken::keyword("numeric"));
            tokens.extend(select_constraints(NUMERIC_CASES, n));
            push(out, path, tokens);
        }
        SchemaKind::Boolean => {
            let mut tokens = necessity_prefix(required, None);
            tokens.push(RuleToken::keyword("boolean"));
            push(out, path, tokens);
        }
        SchemaKind::Unknown => {
            push(out, path, necessity_prefix(required, None));
        }
    }
}

fn push(out: &mut Vec<RuleSpec>, path: &str, tokens: Vec<RuleToken>) {
    tracing::trace!(path, tokens = tokens.len(), "emitting rule");
    out.push(RuleSpec {
        path: path.to_string(),
        tokens,
    });
}

fn size_token(arr: &ArraySchema) -> Option<RuleToken> {
    let min = arr.min_items.filter(|m| *m > 0);
    let max = arr.max_items.filter(|m| *m > 0);
    match (min, max) {
        (Some(min), Some(max)) => Some(RuleToken::param("between", [min, max])),
        (None, Some(max)) => Some(RuleToken::param("max", [max])),
        (Some(min), None) => Some(RuleToken::param("min", [min])),
        (None, None) => None,
    }
}

/// `minLength` when it actually constrains the value.
fn min_len(s: &StringSchema) -> Option<u64> {
    s.min_length.filter(|m| *m > 0)
}

fn between_len(s: &StringSchema) -> RuleToken {
    RuleToken::param("between", min_len(s).into_iter().chain(s.max_length))
}

fn regex_token(s: &StringSchema) -> RuleToken {
    RuleToken::param("regex", [format!("/{}/", s.pattern.as_deref().unwrap_or_default())])
}

fn in_token(values: &[Value]) -> RuleToken {
    let literals: Vec<String> = values.iter().map(Value::to_string).collect();
    RuleToken::raw(format!("Rule::in([{}])", literals.join(", ")))
}
