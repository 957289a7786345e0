//! Prompt templates.
//!
//! Templates use minijinja syntax but only three substitution kinds are
//! relied on: `{{ field }}`, `{% if field %}...{% endif %}` and
//! `{% for item in list %}...{% endfor %}`.

use minijinja::Environment;
use once_cell::sync::Lazy;
use serde::Serialize;
use serde_json::Value;

use crate::error::{FlowError, Result};
use crate::llm::MediaRef;

static ENGINE: Lazy<Environment<'static>> = Lazy::new(|| {
    let mut env = Environment::new();
    env.set_trim_blocks(true);
    env.set_lstrip_blocks(true);
    env
});

/// Output of [`PromptTemplate::render`]: the instruction text plus any
/// inline media lifted out of the input.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct RenderedPrompt {
    pub text: String,
    pub media: Vec<MediaRef>,
}

#[derive(Clone, Copy, Debug)]
pub struct PromptTemplate {
    name: &'static str,
    source: &'static str,
    media_fields: &'static [&'static str],
}

impl PromptTemplate {
    pub const fn new(name: &'static str, source: &'static str) -> Self {
        Self {
            name,
            source,
            media_fields: &[],
        }
    }

    /// Top-level input fields holding media references. When set, their
    /// values are attached to the request as media.
    pub const fn with_media(mut self, fields: &'static [&'static str]) -> Self {
        self.media_fields = fields;
        self
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn render<T: Serialize>(&self, input: &T) -> Result<RenderedPrompt> {
        let context = serde_json::to_value(input)?;
        let text = ENGINE
            .render_str(self.source, &context)
            .map_err(|e| FlowError::Template(format!("`{}`: {}", self.name, e)))?;

        let mut media = Vec::new();
        for field in self.media_fields {
            if let Some(Value::String(url)) = context.get(*field) {
                media.push(MediaRef::parse(url)?);
            }
        }
        Ok(RenderedPrompt {
            text: text.trim().to_string(),
            media,
        })
    }
}
