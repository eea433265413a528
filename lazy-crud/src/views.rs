//! View rendering
//!
//! Views are addressed by dotted paths. `user.profile.index` resolves to
//! `<views.directory>/user/profile/index.hbs`.

use handlebars::Handlebars;
use parking_lot::RwLock;
use serde_json::Value;
use std::path::{Path, PathBuf};

use crate::config::ViewSettings;
use crate::error::LazyError;

/// Renders a named view with a JSON context
pub trait ViewRenderer: Send + Sync {
    /// Render `view` (a dotted path) with `context`
    fn render(&self, view: &str, context: &Value) -> Result<String, LazyError>;
}

/// Handlebars views loaded from a directory
pub struct HandlebarsViews {
    directory: PathBuf,
    extension: String,
    cache: bool,
    registry: RwLock<Handlebars<'static>>,
}

impl std::fmt::Debug for HandlebarsViews {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HandlebarsViews")
            .field("directory", &self.directory)
            .field("cache", &self.cache)
            .finish_non_exhaustive()
    }
}

impl HandlebarsViews {
    /// Views under `directory`, kept in memory when `cache` is set
    pub fn new(directory: impl Into<PathBuf>, cache: bool) -> Self {
        let mut registry = Handlebars::new();
        registry.set_strict_mode(false);
        Self {
            directory: directory.into(),
            extension: "hbs".to_string(),
            cache,
            registry: RwLock::new(registry),
        }
    }

    /// Views configured by [`ViewSettings`]
    #[must_use]
    pub fn from_settings(settings: &ViewSettings) -> Self {
        let mut views = Self::new(settings.directory.clone(), settings.cache);
        views.extension.clone_from(&settings.extension);
        views
    }

    /// File a dotted view path resolves to
    pub fn resolve(&self, view: &str) -> Result<PathBuf, LazyError> {
        let mut path = self.directory.clone();
        for part in view.split('.') {
            if part.is_empty() || part.contains(['/', '\\']) || part == ".." {
                return Err(LazyError::View(format!("invalid view name {view}")));
            }
            path.push(part);
        }
        path.set_extension(&self.extension);
        Ok(path)
    }

    /// Directory the views are loaded from
    #[must_use]
    pub fn directory(&self) -> &Path {
        &self.directory
    }

    fn load(&self, view: &str) -> Result<(), LazyError> {
        let path = self.resolve(view)?;
        let source = std::fs::read_to_string(&path)
            .map_err(|e| LazyError::View(format!("view {view} not found at {}: {e}", path.display())))?;
        self.registry.write().register_template_string(view, source)?;
        tracing::debug!(view, path = %path.display(), "loaded view");
        Ok(())
    }
}

impl ViewRenderer for HandlebarsViews {
    fn render(&self, view: &str, context: &Value) -> Result<String, LazyError> {
        if !self.cache || !self.registry.read().has_template(view) {
            self.load(view)?;
        }
        Ok(self.registry.read().render(view, context)?)
    }
}
