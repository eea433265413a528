//! Code generation from an existing database schema
//!
//! `lazy suite` renders the model, controller, request validators and views
//! of one table; `lazy models` renders a model per table.

pub mod field_type;
pub mod generator;
pub mod names;
pub mod relations;

pub use field_type::{FieldDefinition, FieldType, MANAGED_COLUMNS};
pub use generator::{
    FileKind, GeneratedFile, ModelsOptions, ScaffoldGenerator, SuiteOptions, SuitePlan, WriteOutcome,
};
pub use names::{module_path, SuiteNames};
pub use relations::{detect, Relation, RelationKind};
