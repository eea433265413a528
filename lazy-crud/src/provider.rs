//! Service provider
//!
//! Collects resources into one router sharing a [`LazyState`].
//!
//! ```rust,ignore
//! let db = sea_orm::Database::connect(&url).await?;
//! let app = LazyServiceProvider::new(db, LazyConfig::load()?)?
//!     .resource::<PostController>()
//!     .resource::<UserProfileController>()
//!     .serve_uploads()
//!     .into_router();
//!
//! let listener = tokio::net::TcpListener::bind("0.0.0.0:3000").await?;
//! axum::serve(listener, app).await?;
//! ```

use axum::{extract::DefaultBodyLimit, Router};
use sea_orm::DatabaseConnection;
use std::sync::Arc;
use tower_http::{services::ServeDir, trace::TraceLayer};

use crate::config::LazyConfig;
use crate::controller::LazyController;
use crate::error::LazyError;
use crate::resource::Resource;
use crate::state::LazyState;
use crate::storage::FileStorage;
use crate::views::ViewRenderer;

/// Builder wiring resources, views and uploads together
pub struct LazyServiceProvider {
    state: LazyState,
    resources: Vec<(String, Router<LazyState>)>,
    serve_uploads: bool,
}

impl LazyServiceProvider {
    /// Provider with Handlebars views and local uploads from `config`
    pub fn new(db: DatabaseConnection, config: LazyConfig) -> Result<Self, LazyError> {
        Ok(Self::with_state(LazyState::new(db, config)?))
    }

    /// Provider around existing state
    #[must_use]
    pub fn with_state(state: LazyState) -> Self {
        Self {
            state,
            resources: Vec::new(),
            serve_uploads: false,
        }
    }

    /// Replace the view renderer
    #[must_use]
    pub fn views(mut self, views: Arc<dyn ViewRenderer>) -> Self {
        self.state = self.state.with_views(views);
        self
    }

    /// Replace the upload storage
    #[must_use]
    pub fn storage(mut self, storage: Arc<dyn FileStorage>) -> Self {
        self.state = self.state.with_storage(storage);
        self
    }

    /// Mount a resource under `router_prefix + route_path`
    #[must_use]
    pub fn resource<R: Resource>(mut self) -> Self {
        let path = self.state.config().resource_url(&R::route_path());
        tracing::debug!(resource = %R::name(), %path, view = %R::view_path(), "registered resource");
        self.resources.push((path, LazyController::<R>::router()));
        self
    }

    /// Serve the upload directory under its public URL
    #[must_use]
    pub fn serve_uploads(mut self) -> Self {
        self.serve_uploads = true;
        self
    }

    /// Paths resources are mounted under, in registration order
    #[must_use]
    pub fn routes(&self) -> Vec<&str> {
        self.resources.iter().map(|(path, _)| path.as_str()).collect()
    }

    /// Shared state
    #[must_use]
    pub fn state(&self) -> &LazyState {
        &self.state
    }

    /// Build the application router
    pub fn into_router(self) -> Router {
        let config = self.state.config().clone();
        let mut router: Router<LazyState> = Router::new();
        for (path, resource) in self.resources {
            router = router.nest(&path, resource);
        }

        if self.serve_uploads {
            let url = format!("/{}", config.uploads.public_url.trim_matches('/'));
            router = router.nest_service(&url, ServeDir::new(&config.uploads.directory));
        }

        router
            .layer(DefaultBodyLimit::max(config.uploads.max_bytes.saturating_add(64 * 1024)))
            .layer(TraceLayer::new_for_http())
            .with_state(self.state)
    }
}
