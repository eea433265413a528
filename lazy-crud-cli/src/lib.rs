//! lazy-crud CLI library

pub mod schema;
pub mod scaffold;
pub mod templates;

pub use schema::SchemaInspector;
pub use scaffold::{ScaffoldGenerator, SuiteNames};
pub use templates::TemplateRegistry;
