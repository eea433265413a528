//! Stub rendering

use anyhow::{Context, Result};
use handlebars::Handlebars;
use serde::Serialize;

pub mod stubs;

/// Handlebars registry of the Rust source stubs
pub struct TemplateRegistry {
    handlebars: Handlebars<'static>,
}

impl TemplateRegistry {
    /// Registry with every Rust stub registered
    pub fn new() -> Result<Self> {
        let mut handlebars = Handlebars::new();

        // Disable HTML escaping since we're generating code
        handlebars.register_escape_fn(handlebars::no_escape);

        for (name, source) in [
            ("model", stubs::MODEL),
            ("models_mod", stubs::MODELS_MOD),
            ("controller", stubs::CONTROLLER),
            ("store_request", stubs::STORE_REQUEST),
            ("update_request", stubs::UPDATE_REQUEST),
            ("requests_mod", stubs::REQUESTS_MOD),
        ] {
            handlebars
                .register_template_string(name, source)
                .with_context(|| format!("Failed to register {name} stub"))?;
        }

        Ok(Self { handlebars })
    }

    /// Render a registered stub
    pub fn render<T: Serialize>(&self, name: &str, data: &T) -> Result<String> {
        self.handlebars
            .render(name, data)
            .with_context(|| format!("Failed to render {name} stub"))
    }
}

/// Fill the `__TOKEN__` placeholders of a view stub
#[must_use]
pub fn replace_tokens(stub: &str, tokens: &[(&str, &str)]) -> String {
    tokens
        .iter()
        .fold(stub.to_string(), |acc, (token, value)| acc.replace(token, value))
}
