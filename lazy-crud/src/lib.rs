//! # lazy-crud
//!
//! A generic CRUD controller for Axum and Sea-ORM that turns query-string
//! filters into database predicates, plus the naming, view and upload pieces
//! the `lazy` generator builds on.
//!
//! ## Filtering
//!
//! `GET /posts?title-like=rust&views-gte=10&author.name=ann` becomes
//!
//! ```sql
//! WHERE posts.title LIKE '%rust%'
//!   AND posts.views >= 10
//!   AND EXISTS (SELECT 1 FROM users AS lazy_r0
//!               WHERE lazy_r0.id = posts.user_id AND lazy_r0.name = 'ann' ...)
//!   AND posts.deleted_at IS NULL
//! ```
//!
//! See [`filter`] for the key syntax.
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use lazy_crud::prelude::*;
//!
//! pub struct PostController;
//!
//! impl Resource for PostController {
//!     type Entity = post::Entity;
//!     type Store = StorePost;
//!     type Update = UpdatePost;
//!
//!     fn relations() -> Vec<RelationDef> {
//!         vec![RelationDef::belongs_to::<user::Entity>("author", "user_id")]
//!     }
//! }
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     lazy_crud::observability::init()?;
//!     let config = LazyConfig::load()?;
//!     let db = sea_orm::Database::connect(config.database.url.clone().unwrap_or_default()).await?;
//!
//!     let app = LazyServiceProvider::new(db, config)?
//!         .resource::<PostController>()
//!         .serve_uploads()
//!         .into_router();
//!
//!     let listener = tokio::net::TcpListener::bind("127.0.0.1:3000").await?;
//!     axum::serve(listener, app).await?;
//!     Ok(())
//! }
//! ```

#![forbid(unsafe_code)]

pub mod config;
pub mod controller;
pub mod error;
pub mod filter;
pub mod form;
pub mod naming;
pub mod observability;
pub mod provider;
pub mod query;
pub mod resource;
pub mod state;
pub mod storage;
pub mod views;

/// Common imports
pub mod prelude {
    pub use crate::config::{publish_config, LazyConfig, ResponseMode};
    pub use crate::controller::LazyController;
    pub use crate::error::LazyError;
    pub use crate::filter::{FilterKey, FilterOperator};
    pub use crate::naming::Naming;
    pub use crate::provider::LazyServiceProvider;
    pub use crate::query::{QueryPlan, RelationDef, TableMeta};
    pub use crate::resource::Resource;
    pub use crate::state::LazyState;
    pub use crate::storage::{FileStorage, LocalFileStorage};
    pub use crate::views::{HandlebarsViews, ViewRenderer};
}
