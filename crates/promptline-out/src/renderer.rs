//! Handlebars prompt rendering.
//!
//! Prompts are plain text, so HTML escaping is off. Custom helpers:
//! - truncate: cut a string to a maximum number of characters
//! - join: join an array with a separator
//! - bullets: one `- item` line per array element
//! - json: pretty JSON of any value (strings stay bare)
//! - default: fallback for null or missing values

use handlebars::{
    no_escape, Context, Handlebars, Helper, HelperDef, HelperResult, Output, RenderContext,
};
use promptline_core::{PromptRenderer, RenderError};
use serde_json::Value;
use std::path::Path;

use crate::templates::TemplatesFile;
use crate::OutputError;

/// Compiled renderer with registered helpers
pub struct TemplateRenderer {
    handlebars: Handlebars<'static>,
    templates: TemplatesFile,
}

impl TemplateRenderer {
    pub fn new(templates: TemplatesFile) -> Result<Self, OutputError> {
        let mut handlebars = Handlebars::new();
        handlebars.set_strict_mode(false);
        handlebars.register_escape_fn(no_escape);

        handlebars.register_helper("truncate", Box::new(TruncateHelper));
        handlebars.register_helper("join", Box::new(JoinHelper));
        handlebars.register_helper("bullets", Box::new(BulletsHelper));
        handlebars.register_helper("json", Box::new(JsonHelper));
        handlebars.register_helper("default", Box::new(DefaultHelper));

        for (name, template) in &templates.templates {
            handlebars
                .register_template_string(name, &template.template)
                .map_err(|e| OutputError::Template(format!("{}: {}", name, e)))?;
        }

        Ok(TemplateRenderer {
            handlebars,
            templates,
        })
    }

    /// Built-in prompts, optionally overlaid with a custom templates file.
    pub fn with_overrides(path: Option<&Path>) -> Result<Self, OutputError> {
        let mut templates = TemplatesFile::builtin()?;
        if let Some(path) = path {
            tracing::info!(path = %path.display(), "loading prompt template overrides");
            templates = templates.merge(TemplatesFile::load(path)?);
        }
        Self::new(templates)
    }

    pub fn builtin() -> Result<Self, OutputError> {
        Self::with_overrides(None)
    }

    pub fn render_named(&self, template_name: &str, data: &Value) -> Result<String, OutputError> {
        if !self.handlebars.has_template(template_name) {
            return Err(OutputError::Render(format!("unknown template {}", template_name)));
        }
        self.handlebars
            .render(template_name, data)
            .map_err(|e| OutputError::Render(e.to_string()))
    }

    pub fn list_templates(&self) -> Vec<&str> {
        self.templates.list_templates()
    }
}

impl PromptRenderer for TemplateRenderer {
    fn render(&self, template_id: &str, data: &Value) -> Result<String, RenderError> {
        if !self.has_template(template_id) {
            return Err(RenderError::UnknownTemplate(template_id.to_string()));
        }
        self.handlebars
            .render(template_id, data)
            .map_err(|e| RenderError::Render(e.to_string()))
    }

    fn has_template(&self, template_id: &str) -> bool {
        self.handlebars.has_template(template_id)
    }
}

fn value_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

struct TruncateHelper;

impl HelperDef for TruncateHelper {
    fn call<'reg: 'rc, 'rc>(
        &self,
        h: &Helper<'rc>,
        _r: &'reg Handlebars<'reg>,
        _ctx: &'rc Context,
        _rc: &mut RenderContext<'reg, 'rc>,
        out: &mut dyn Output,
    ) -> HelperResult {
        let text = h.param(0).map(|v| value_text(v.value())).unwrap_or_default();
        let max_chars = h.param(1).and_then(|v| v.value().as_u64()).unwrap_or(100) as usize;

        match text.char_indices().nth(max_chars) {
            Some((cut, _)) => {
                out.write(&text[..cut])?;
                out.write("...")?;
            }
            None => out.write(&text)?,
        }
        Ok(())
    }
}

struct JoinHelper;

impl HelperDef for JoinHelper {
    fn call<'reg: 'rc, 'rc>(
        &self,
        h: &Helper<'rc>,
        _r: &'reg Handlebars<'reg>,
        _ctx: &'rc Context,
        _rc: &mut RenderContext<'reg, 'rc>,
        out: &mut dyn Output,
    ) -> HelperResult {
        let separator = h.param(1).and_then(|v| v.value().as_str()).unwrap_or(", ");

        if let Some(arr) = h.param(0).and_then(|v| v.value().as_array()) {
            let strings: Vec<String> = arr.iter().map(value_text).collect();
            out.write(&strings.join(separator))?;
        }
        Ok(())
    }
}

struct BulletsHelper;

impl HelperDef for BulletsHelper {
    fn call<'reg: 'rc, 'rc>(
        &self,
        h: &Helper<'rc>,
        _r: &'reg Handlebars<'reg>,
        _ctx: &'rc Context,
        _rc: &mut RenderContext<'reg, 'rc>,
        out: &mut dyn Output,
    ) -> HelperResult {
        let lines: Vec<String> = match h.param(0).map(|v| v.value()) {
            Some(Value::Array(items)) => items.iter().map(|v| format!("- {}", value_text(v))).collect(),
            Some(Value::Null) | None => Vec::new(),
            Some(single) => vec![format!("- {}", value_text(single))],
        };
        out.write(&lines.join("\n"))?;
        Ok(())
    }
}

struct JsonHelper;

impl HelperDef for JsonHelper {
    fn call<'reg: 'rc, 'rc>(
        &self,
        h: &Helper<'rc>,
        _r: &'reg Handlebars<'reg>,
        _ctx: &'rc Context,
        _rc: &mut RenderContext<'reg, 'rc>,
        out: &mut dyn Output,
    ) -> HelperResult {
        let text = match h.param(0).map(|v| v.value()) {
            Some(Value::String(s)) => s.clone(),
            Some(value) => serde_json::to_string_pretty(value).unwrap_or_default(),
            None => String::new(),
        };
        out.write(&text)?;
        Ok(())
    }
}

struct DefaultHelper;

impl HelperDef for DefaultHelper {
    fn call<'reg: 'rc, 'rc>(
        &self,
        h: &Helper<'rc>,
        _r: &'reg Handlebars<'reg>,
        _ctx: &'rc Context,
        _rc: &mut RenderContext<'reg, 'rc>,
        out: &mut dyn Output,
    ) -> HelperResult {
        let fallback = h.param(1).and_then(|v| v.value().as_str()).unwrap_or("");

        match h.param(0).map(|v| v.value()) {
            Some(v) if !v.is_null() => out.write(&value_text(v))?,
            _ => out.write(fallback)?,
        }
        Ok(())
    }
}
