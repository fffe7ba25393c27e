//! Deferred task options.
//!
//! Every option of a task definition is a [`Property`]: either a literal value or a
//! `{{ name }}` template that is resolved against the [`RunContext`] of the current run.
//! Rendering happens once, before planning, so a bad template fails the run before any
//! command is started.
use std::collections::HashMap;
use std::sync::OnceLock;

use regex::Regex;
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RenderError {
    #[error("unknown variable '{name}' in '{template}'")]
    UnknownVariable { name: String, template: String },
    #[error("property '{0}' is set but rendered to an empty value")]
    Empty(String),
    #[error("property '{property}' expected {expected}, got '{value}'")]
    Invalid {
        property: String,
        expected: &'static str,
        value: String,
    },
}

fn template_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"\{\{\s*([A-Za-z_][A-Za-z0-9_.\-]*)\s*\}\}").expect("valid template regex")
    })
}

/// Variables visible to templates during one run.
#[derive(Debug, Clone, Default)]
pub struct RunContext {
    variables: HashMap<String, String>,
}

impl RunContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_variables(variables: HashMap<String, String>) -> Self {
        Self { variables }
    }

    pub fn with_var(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.insert(name, value);
        self
    }

    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.variables.insert(name.into(), value.into());
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.variables.get(name).map(String::as_str)
    }

    /// Substitutes every `{{ name }}` in `template`. Text without placeholders is returned as-is.
    pub fn render(&self, template: &str) -> Result<String, RenderError> {
        let re = template_re();
        let mut out = String::with_capacity(template.len());
        let mut last = 0;
        for caps in re.captures_iter(template) {
            let (Some(whole), Some(name)) = (caps.get(0), caps.get(1)) else {
                continue;
            };
            let value = self
                .get(name.as_str())
                .ok_or_else(|| RenderError::UnknownVariable {
                    name: name.as_str().to_string(),
                    template: template.to_string(),
                })?;
            out.push_str(&template[last..whole.start()]);
            out.push_str(value);
            last = whole.end();
        }
        out.push_str(&template[last..]);
        Ok(out)
    }
}

/// A value that can be resolved against a [`RunContext`].
pub trait Renderable: Sized {
    const EXPECTED: &'static str;

    fn render_value(&self, ctx: &RunContext) -> Result<Self, RenderError>;

    fn parse_rendered(rendered: &str) -> Option<Self>;
}

impl Renderable for String {
    const EXPECTED: &'static str = "a string";

    fn render_value(&self, ctx: &RunContext) -> Result<Self, RenderError> {
        ctx.render(self)
    }

    fn parse_rendered(rendered: &str) -> Option<Self> {
        Some(rendered.to_string())
    }
}

impl Renderable for bool {
    const EXPECTED: &'static str = "a boolean";

    fn render_value(&self, _ctx: &RunContext) -> Result<Self, RenderError> {
        Ok(*self)
    }

    fn parse_rendered(rendered: &str) -> Option<Self> {
        match rendered.trim().to_ascii_lowercase().as_str() {
            "true" => Some(true),
            "false" => Some(false),
            _ => None,
        }
    }
}

impl Renderable for Vec<String> {
    const EXPECTED: &'static str = "a JSON list of strings";

    fn render_value(&self, ctx: &RunContext) -> Result<Self, RenderError> {
        self.iter().map(|item| ctx.render(item)).collect()
    }

    fn parse_rendered(rendered: &str) -> Option<Self> {
        serde_json::from_str(rendered).ok()
    }
}

impl Renderable for HashMap<String, String> {
    const EXPECTED: &'static str = "a JSON object of strings";

    fn render_value(&self, ctx: &RunContext) -> Result<Self, RenderError> {
        self.iter()
            .map(|(k, v)| Ok((k.clone(), ctx.render(v)?)))
            .collect()
    }

    fn parse_rendered(rendered: &str) -> Option<Self> {
        serde_json::from_str(rendered).ok()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Property<T> {
    Value(T),
    Expression(String),
}

impl<T> Property<T> {
    pub fn of(value: T) -> Self {
        Property::Value(value)
    }

    pub fn expression(template: impl Into<String>) -> Self {
        Property::Expression(template.into())
    }
}

impl<T> From<T> for Property<T> {
    fn from(value: T) -> Self {
        Property::Value(value)
    }
}

impl<T: Renderable> Property<T> {
    pub fn render(&self, property: &str, ctx: &RunContext) -> Result<T, RenderError> {
        match self {
            Property::Value(v) => v.render_value(ctx),
            Property::Expression(template) => {
                let rendered = ctx.render(template)?;
                T::parse_rendered(&rendered).ok_or_else(|| RenderError::Invalid {
                    property: property.to_string(),
                    expected: T::EXPECTED,
                    value: rendered,
                })
            }
        }
    }
}

/// Renders an optional string property. A declared property must not render to blank.
pub fn render_optional(
    prop: Option<&Property<String>>,
    property: &str,
    ctx: &RunContext,
) -> Result<Option<String>, RenderError> {
    let Some(prop) = prop else {
        return Ok(None);
    };
    let rendered = prop.render(property, ctx)?;
    if rendered.trim().is_empty() {
        return Err(RenderError::Empty(property.to_string()));
    }
    Ok(Some(rendered))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn renders_variables_and_keeps_plain_text() {
        let ctx = RunContext::new().with_var("model", "smollm:360m");
        assert_eq!(
            ctx.render("ollama pull {{ model }}").unwrap(),
            "ollama pull smollm:360m"
        );
        assert_eq!(ctx.render("ollama list").unwrap(), "ollama list");
    }

    #[test]
    fn unknown_variable_is_an_error() {
        let err = RunContext::new().render("{{missing}}").unwrap_err();
        assert!(matches!(err, RenderError::UnknownVariable { ref name, .. } if name == "missing"));
    }

    #[test]
    fn bool_expression_is_parsed() {
        let ctx = RunContext::new().with_var("cache", "False");
        let prop: Property<bool> = Property::expression("{{ cache }}");
        assert!(!prop.render("enable_model_caching", &ctx).unwrap());

        let bad: Property<bool> = Property::expression("maybe");
        assert!(matches!(
            bad.render("enable_model_caching", &ctx),
            Err(RenderError::Invalid { .. })
        ));
    }

    #[test]
    fn list_items_are_rendered_one_by_one() {
        let ctx = RunContext::new().with_var("file", "out.txt");
        let prop = Property::of(vec!["a.txt".to_string(), "{{ file }}".to_string()]);
        assert_eq!(
            prop.render("output_files", &ctx).unwrap(),
            vec!["a.txt".to_string(), "out.txt".to_string()]
        );
    }

    #[test]
    fn declared_optional_rendering_to_blank_fails() {
        let ctx = RunContext::new().with_var("path", "  ");
        let prop = Property::expression("{{ path }}");
        assert_eq!(
            render_optional(Some(&prop), "model_cache_path", &ctx),
            Err(RenderError::Empty("model_cache_path".to_string()))
        );
        assert_eq!(render_optional(None, "model_cache_path", &ctx), Ok(None));
    }

    #[test]
    fn untagged_deserialization_prefers_literal_values() {
        #[derive(Deserialize)]
        struct Doc {
            flag: Property<bool>,
            templated: Property<bool>,
        }
        let doc: Doc = toml::from_str("flag = true\ntemplated = \"{{ on }}\"").unwrap();
        assert_eq!(doc.flag, Property::Value(true));
        assert_eq!(doc.templated, Property::Expression("{{ on }}".to_string()));
    }
}
