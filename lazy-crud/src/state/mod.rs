//! Application state shared by every resource router

use crate::{
    config::LazyConfig,
    storage::{FileStorage, LocalFileStorage},
    views::{HandlebarsViews, ViewRenderer},
    error::LazyError,
};
use sea_orm::DatabaseConnection;
use std::sync::Arc;

/// State for lazy-crud routers
///
/// # Example
///
/// ```rust,no_run
/// use lazy_crud::{config::LazyConfig, state::LazyState};
///
/// # async fn example() -> anyhow::Result<()> {
/// let db = sea_orm::Database::connect("sqlite::memory:").await?;
/// let state = LazyState::new(db, LazyConfig::default())?;
/// let per_page = state.config().pagination.per_page;
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct LazyState {
    db: DatabaseConnection,
    config: Arc<LazyConfig>,
    views: Arc<dyn ViewRenderer>,
    storage: Arc<dyn FileStorage>,
}

impl LazyState {
    /// State with Handlebars views and local uploads taken from `config`
    pub fn new(db: DatabaseConnection, config: LazyConfig) -> Result<Self, LazyError> {
        config.validate()?;
        let views = HandlebarsViews::from_settings(&config.views);
        let storage = LocalFileStorage::new(
            config.uploads.directory.clone(),
            config.uploads.public_url.clone(),
        )?;
        Ok(Self {
            db,
            config: Arc::new(config),
            views: Arc::new(views),
            storage: Arc::new(storage),
        })
    }

    /// Replace the view renderer
    #[must_use]
    pub fn with_views(mut self, views: Arc<dyn ViewRenderer>) -> Self {
        self.views = views;
        self
    }

    /// Replace the upload storage
    #[must_use]
    pub fn with_storage(mut self, storage: Arc<dyn FileStorage>) -> Self {
        self.storage = storage;
        self
    }

    /// Database connection
    #[must_use]
    pub fn db(&self) -> &DatabaseConnection {
        &self.db
    }

    /// Configuration
    #[must_use]
    pub fn config(&self) -> &LazyConfig {
        &self.config
    }

    /// View renderer
    #[must_use]
    pub fn views(&self) -> &dyn ViewRenderer {
        self.views.as_ref()
    }

    /// Upload storage
    #[must_use]
    pub fn storage(&self) -> &dyn FileStorage {
        self.storage.as_ref()
    }
}

impl std::fmt::Debug for LazyState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LazyState")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}
