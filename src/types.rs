//! Core types for rule compilation.

use serde::Serialize;
use serde_json::Value;

/// Default vendor extension carrying an explicit rule list on a schema.
pub const DEFAULT_RULE_OVERRIDE_KEY: &str = "x-validation-rules";

/// Default vendor extension marking a parameter as resolved by routing.
pub const DEFAULT_ROUTE_BINDING_KEY: &str = "x-route-model-binding";

/// Path segment standing for every element of an array.
pub const WILDCARD_SEGMENT: &str = "*";

/// Returns the JSON type name for log messages.
pub fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// One unit of the target validator's rule language.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RuleToken {
    /// A bare keyword such as `required` or `string`.
    Keyword(String),
    /// A keyword with arguments, rendered as `keyword:arg1,arg2`.
    Param { keyword: String, args: Vec<String> },
    /// An opaque literal passed through to the output untouched.
    Raw(String),
}

impl RuleToken {
    pub fn keyword(keyword: impl Into<String>) -> Self {
        RuleToken::Keyword(keyword.into())
    }

    pub fn param<I, A>(keyword: impl Into<String>, args: I) -> Self
    where
        I: IntoIterator<Item = A>,
        A: ToString,
    {
        RuleToken::Param {
            keyword: keyword.into(),
            args: args.into_iter().map(|a| a.to_string()).collect(),
        }
    }

    pub fn raw(literal: impl Into<String>) -> Self {
        RuleToken::Raw(literal.into())
    }

    /// Render the token as it appears inside a rule list.
    ///
    /// Raw tokens are emitted verbatim, everything else is JSON-encoded.
    pub fn render(&self) -> String {
        match self {
            RuleToken::Keyword(keyword) => Value::String(keyword.clone()).to_string(),
            RuleToken::Param { keyword, args } if args.is_empty() => {
                Value::String(keyword.clone()).to_string()
            }
            RuleToken::Param { keyword, args } => {
                Value::String(format!("{}:{}", keyword, args.join(","))).to_string()
            }
            RuleToken::Raw(literal) => literal.clone(),
        }
    }
}

/// Rules for a single field path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuleSpec {
    /// Dot-delimited field path; `*` marks array elements.
    pub path: String,
    pub tokens: Vec<RuleToken>,
}

/// A rule specification rendered for the template layer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RenderedRule {
    pub path: String,
    /// Bracketed, comma-joined token list, e.g. `["required", "string"]`.
    pub rule: String,
}

/// Options controlling how vendor extensions are recognized.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompileOptions {
    /// Schema key holding an explicit rule override.
    pub rule_override_key: String,
    /// Parameter key marking route-model-bound parameters.
    pub route_binding_key: String,
}

impl Default for CompileOptions {
    fn default() -> Self {
        Self {
            rule_override_key: DEFAULT_RULE_OVERRIDE_KEY.to_string(),
            route_binding_key: DEFAULT_ROUTE_BINDING_KEY.to_string(),
        }
    }
}

impl CompileOptions {
    /// Create options using the default extension keys.
    pub fn new() -> Self {
        Self::default()
    }

    /// Use a different key for rule overrides.
    pub fn with_rule_override_key(mut self, key: impl Into<String>) -> Self {
        self.rule_override_key = key.into();
        self
    }

    /// Use a different key for the route-model-binding marker.
    pub fn with_route_binding_key(mut self, key: impl Into<String>) -> Self {
        self.route_binding_key = key.into();
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keyword_renders_json_encoded() {
        assert_eq!(RuleToken::keyword("required").render(), r#""required""#);
    }

    #[test]
    fn param_renders_colon_and_commas() {
        assert_eq!(
            RuleToken::param("between", [3, 10]).render(),
            r#""between:3,10""#
        );
    }

    #[test]
    fn param_without_args_renders_keyword() {
        let token = RuleToken::param("json", Vec::<String>::new());
        assert_eq!(token.render(), r#""json""#);
    }

    #[test]
    fn param_escapes_backslashes() {
        assert_eq!(
            RuleToken::param("regex", ["/^\\d+$/"]).render(),
            r#""regex:/^\\d+$/""#
        );
    }

    #[test]
    fn raw_renders_verbatim() {
        assert_eq!(
            RuleToken::raw("Rule::in([\"a\"])").render(),
            "Rule::in([\"a\"])"
        );
    }

    #[test]
    fn compile_options_defaults() {
        let opts = CompileOptions::new();
        assert_eq!(opts.rule_override_key, "x-validation-rules");
        assert_eq!(opts.route_binding_key, "x-route-model-binding");
    }

    #[test]
    fn compile_options_builder() {
        let opts = CompileOptions::new()
            .with_rule_override_key("x-rules")
            .with_route_binding_key("x-bind");
        assert_eq!(opts.rule_override_key, "x-rules");
        assert_eq!(opts.route_binding_key, "x-bind");
    }
}
