//! Relation detection from naming conventions
//!
//! * another table with a `<singular table>_id` column: has-many
//! * an own `<name>_id` column whose `plural(name)` table exists: belongs-to

use crate::schema::TableSchema;
use lazy_crud::naming::Naming;
use serde_json::{json, Value};

/// Relation direction
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RelationKind {
    /// Related rows point at this table
    HasMany,
    /// This table points at the related row
    BelongsTo,
}

impl RelationKind {
    /// `RelationDef` constructor and Sea-ORM attribute name
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::HasMany => "has_many",
            Self::BelongsTo => "belongs_to",
        }
    }
}

/// A detected relation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Relation {
    /// Direction
    pub kind: RelationKind,
    /// Name used in filter keys (`posts`, `user`)
    pub name: String,
    /// Related table
    pub table: String,
    /// Foreign key column (on the related table for has-many)
    pub foreign_key: String,
    /// Primary key of the table the foreign key points at
    pub owner_key: String,
}

impl Relation {
    /// Module of the related model (`post`)
    #[must_use]
    pub fn module(&self, prefix: &str) -> String {
        Naming::snake(&Naming::singular(strip_prefix(&self.table, prefix)))
    }

    /// `#[sea_orm(..)]` attribute of the model's relation variant
    #[must_use]
    pub fn model_attribute(&self, prefix: &str) -> String {
        let module = self.module(prefix);
        match self.kind {
            RelationKind::HasMany => format!("#[sea_orm(has_many = \"super::{module}::Entity\")]"),
            RelationKind::BelongsTo => format!(
                "#[sea_orm(belongs_to = \"super::{module}::Entity\", from = \"Column::{}\", to = \"super::{module}::Column::{}\")]",
                Naming::pascal(&self.foreign_key),
                Naming::pascal(&self.owner_key),
            ),
        }
    }

    /// Template context of this relation
    #[must_use]
    pub fn context(&self, prefix: &str) -> Value {
        json!({
            "attribute": self.model_attribute(prefix),
            "kind": self.kind.as_str(),
            "has_many": self.kind == RelationKind::HasMany,
            "name": self.name,
            "variant": Naming::pascal(&self.name),
            "table": self.table,
            "module": self.module(prefix),
            "foreign_key": self.foreign_key,
        })
    }
}

impl std::fmt::Display for Relation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {} ({}.{})", self.kind.as_str(), self.name, self.table, self.foreign_key)
    }
}

fn strip_prefix<'a>(table: &'a str, prefix: &str) -> &'a str {
    table
        .strip_prefix(prefix)
        .filter(|rest| !rest.is_empty())
        .unwrap_or(table)
}

fn primary_key_of(schema: &TableSchema) -> String {
    schema
        .primary_key()
        .map_or_else(|| "id".to_string(), |c| c.name.clone())
}

/// Relations of `table` among `schemas`
#[must_use]
pub fn detect(table: &TableSchema, schemas: &[TableSchema], prefix: &str) -> Vec<Relation> {
    let mut relations: Vec<Relation> = Vec::new();
    let own_key = primary_key_of(table);
    let foreign_key = format!("{}_id", Naming::singular(strip_prefix(&table.name, prefix)));

    for other in schemas.iter().filter(|s| s.name != table.name) {
        if other.column(&foreign_key).is_some() {
            relations.push(Relation {
                kind: RelationKind::HasMany,
                name: strip_prefix(&other.name, prefix).to_string(),
                table: other.name.clone(),
                foreign_key: foreign_key.clone(),
                owner_key: own_key.clone(),
            });
        }
    }

    for column in &table.columns {
        let Some(name) = column.name.strip_suffix("_id").filter(|n| !n.is_empty()) else {
            continue;
        };
        if column.primary_key {
            continue;
        }
        let target = format!("{prefix}{}", Naming::plural(name));
        if let Some(other) = schemas.iter().find(|s| s.name == target) {
            relations.push(Relation {
                kind: RelationKind::BelongsTo,
                name: name.to_string(),
                table: other.name.clone(),
                foreign_key: column.name.clone(),
                owner_key: primary_key_of(other),
            });
        }
    }

    let mut seen = std::collections::HashSet::new();
    relations.retain(|r| seen.insert(Naming::pascal(&r.name)));
    relations
}
