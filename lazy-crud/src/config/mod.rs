//! Configuration management for lazy-crud
//!
//! Configuration is loaded from multiple sources with clear precedence:
//!
//! 1. Environment variables (highest priority, `LAZY_` prefix, `__` for nesting)
//! 2. `./lazy.toml`
//! 3. Hardcoded defaults (fallback)
//!
//! # Example Configuration
//!
//! ```toml
//! # lazy.toml
//! response = "auto"
//! router_prefix = "/admin"
//!
//! [pagination]
//! per_page = 15
//! max_per_page = 100
//!
//! [views]
//! directory = "./views"
//! cache = true
//!
//! [uploads]
//! directory = "./storage/public"
//! public_url = "/storage"
//!
//! [generator]
//! model_path = "src/models"
//! table_prefix = ""
//! ```
//!
//! # Usage
//!
//! ```rust,no_run
//! use lazy_crud::config::LazyConfig;
//!
//! # fn example() -> Result<(), lazy_crud::error::LazyError> {
//! let config = LazyConfig::load()?;
//! let per_page = config.pagination.per_page;
//! # Ok(())
//! # }
//! ```

use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::LazyError;

/// Default configuration file name
pub const CONFIG_FILE: &str = "lazy.toml";

/// How controllers answer requests
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResponseMode {
    /// Always render views
    Html,
    /// Always answer JSON
    Json,
    /// Decide per request from its headers
    #[default]
    Auto,
}

/// Index pagination settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PaginationSettings {
    /// Items per page when the request does not ask for a size
    pub per_page: u64,

    /// Upper bound for a requested `per_page`
    pub max_per_page: u64,
}

impl Default for PaginationSettings {
    fn default() -> Self {
        Self {
            per_page: 15,
            max_per_page: 100,
        }
    }
}

/// View rendering settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewSettings {
    /// Directory containing Handlebars views
    pub directory: PathBuf,

    /// Keep compiled views in memory
    pub cache: bool,

    /// View file extension
    pub extension: String,
}

impl Default for ViewSettings {
    fn default() -> Self {
        Self {
            directory: PathBuf::from("./views"),
            cache: !cfg!(debug_assertions),
            extension: "hbs".to_string(),
        }
    }
}

/// Public upload settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct UploadSettings {
    /// Directory uploaded files are written to
    pub directory: PathBuf,

    /// URL prefix the directory is served under
    pub public_url: String,

    /// Largest accepted upload in bytes
    pub max_bytes: usize,
}

impl Default for UploadSettings {
    fn default() -> Self {
        Self {
            directory: PathBuf::from("./storage/public"),
            public_url: "/storage".to_string(),
            max_bytes: 10 * 1024 * 1024,
        }
    }
}

/// Code generator settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneratorSettings {
    /// Directory for generated models
    pub model_path: PathBuf,

    /// Directory for generated controllers
    pub controller_path: PathBuf,

    /// Directory for generated request validators
    pub request_path: PathBuf,

    /// Directory for generated views
    pub view_path: PathBuf,

    /// Prefix prepended to guessed table names
    pub table_prefix: String,
}

impl Default for GeneratorSettings {
    fn default() -> Self {
        Self {
            model_path: PathBuf::from("src/models"),
            controller_path: PathBuf::from("src/controllers"),
            request_path: PathBuf::from("src/requests"),
            view_path: PathBuf::from("views"),
            table_prefix: String::new(),
        }
    }
}

/// Database settings
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct DatabaseSettings {
    /// Connection URL (`sqlite://`, `postgres://`, `mysql://`)
    pub url: Option<String>,
}

/// Flash messages shown after a redirect
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MessageSettings {
    /// After store
    pub saved: String,
    /// After update
    pub updated: String,
    /// After destroy
    pub deleted: String,
    /// After restore
    pub restored: String,
}

impl Default for MessageSettings {
    fn default() -> Self {
        Self {
            saved: "Saved successfully.".to_string(),
            updated: "Updated successfully.".to_string(),
            deleted: "Deleted successfully.".to_string(),
            restored: "Restored successfully.".to_string(),
        }
    }
}

impl MessageSettings {
    /// Look up a message by its flash key
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&str> {
        match key {
            "saved" => Some(&self.saved),
            "updated" => Some(&self.updated),
            "deleted" => Some(&self.deleted),
            "restored" => Some(&self.restored),
            _ => None,
        }
    }
}

/// Complete lazy-crud configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LazyConfig {
    /// Response type: html, json or auto
    #[serde(default)]
    pub response: ResponseMode,

    /// Prefix for every resource route (e.g. `/admin`)
    #[serde(default)]
    pub router_prefix: String,

    /// Index pagination
    #[serde(default)]
    pub pagination: PaginationSettings,

    /// View rendering
    #[serde(default)]
    pub views: ViewSettings,

    /// Public uploads
    #[serde(default)]
    pub uploads: UploadSettings,

    /// Code generator
    #[serde(default)]
    pub generator: GeneratorSettings,

    /// Database connection
    #[serde(default)]
    pub database: DatabaseSettings,

    /// Flash messages
    #[serde(default)]
    pub messages: MessageSettings,
}

impl LazyConfig {
    /// Load configuration from `./lazy.toml` and `LAZY_*` environment variables
    pub fn load() -> Result<Self, LazyError> {
        Self::load_from(CONFIG_FILE)
    }

    /// Load configuration from a specific file, still honoring the environment
    ///
    /// A missing file is not an error; defaults apply.
    pub fn load_from(path: impl AsRef<Path>) -> Result<Self, LazyError> {
        let config: Self = Self::figment(path.as_ref()).extract()?;
        config.validate()?;
        tracing::debug!(path = %path.as_ref().display(), ?config.response, "configuration loaded");
        Ok(config)
    }

    /// Reject settings the router cannot be built from
    pub fn validate(&self) -> Result<(), LazyError> {
        if self.uploads.public_url.trim_matches('/').is_empty() {
            return Err(LazyError::Config(
                "uploads.public_url must name a path below the site root".into(),
            ));
        }
        Ok(())
    }

    /// The layered figment used by [`LazyConfig::load_from`]
    #[must_use]
    pub fn figment(path: &Path) -> Figment {
        Figment::from(Serialized::defaults(Self::default()))
            .merge(Toml::file(path))
            .merge(Env::prefixed("LAZY_").split("__"))
    }

    /// Render this configuration as TOML
    pub fn to_toml(&self) -> Result<String, LazyError> {
        toml::to_string_pretty(self).map_err(|e| LazyError::Config(e.to_string()))
    }

    /// Join the router prefix and a resource route path
    #[must_use]
    pub fn resource_url(&self, route_path: &str) -> String {
        let prefix = self.router_prefix.trim_end_matches('/');
        let path = route_path.trim_start_matches('/');
        format!("{prefix}/{path}")
    }
}

/// Write the default configuration file, the way a service provider publishes its config
///
/// Returns `false` when the file already exists and `force` is not set.
pub fn publish_config(path: impl AsRef<Path>, force: bool) -> Result<bool, LazyError> {
    let path = path.as_ref();
    if path.exists() && !force {
        tracing::warn!(path = %path.display(), "configuration already published");
        return Ok(false);
    }
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    let content = format!(
        "# lazy-crud configuration\n# response: html, json or auto (depends on the request)\n{}",
        LazyConfig::default().to_toml()?
    );
    std::fs::write(path, content)?;
    Ok(true)
}
