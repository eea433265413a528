//! Suite and model generation
//!
//! The generator reads a table through [`SchemaInspector`], renders every
//! stub in memory and hands back a list of [`GeneratedFile`]s. Nothing
//! touches the disk until [`ScaffoldGenerator::write`], so commands can show
//! the plan and ask for confirmation first.

use super::field_type::{FieldDefinition, FieldType};
use super::names::{module_path, SuiteNames};
use super::relations::{detect, Relation};
use crate::schema::{SchemaInspector, TableSchema};
use crate::templates::{replace_tokens, stubs, TemplateRegistry};
use anyhow::{bail, Context, Result};
use lazy_crud::config::GeneratorSettings;
use lazy_crud::naming::Naming;
use serde_json::{json, Value};
use std::collections::BTreeSet;
use std::fs;
use std::path::{Path, PathBuf};

/// Options of `lazy suite`
#[derive(Debug, Clone, Default)]
pub struct SuiteOptions {
    /// Suite name (`post`, `UserProfile`)
    pub name: String,
    /// Table to use instead of the guessed ones
    pub table: Option<String>,
    /// Model name to use instead of the guessed one
    pub model: Option<String>,
    /// Skip the model file
    pub without_model: bool,
    /// Skip the request validators
    pub without_requests: bool,
    /// Skip the views
    pub without_views: bool,
    /// Views root instead of the configured one
    pub view_path: Option<PathBuf>,
}

/// Options of `lazy models`
#[derive(Debug, Clone, Default)]
pub struct ModelsOptions {
    /// Only these models or tables; empty means all
    pub only: Vec<String>,
    /// Never these models or tables
    pub without: Vec<String>,
    /// Output directory instead of the configured one
    pub path: Option<PathBuf>,
}

/// What a generated file is
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileKind {
    /// Sea-ORM entity
    Model,
    /// Resource controller
    Controller,
    /// Request validator
    Request,
    /// Handlebars view
    View,
    /// `mod.rs` index
    Module,
}

impl FileKind {
    /// Label shown next to the written path
    #[must_use]
    pub const fn description(self) -> &'static str {
        match self {
            Self::Model => "model",
            Self::Controller => "controller",
            Self::Request => "request",
            Self::View => "view",
            Self::Module => "module index",
        }
    }
}

/// Represents a generated file
#[derive(Debug, Clone)]
pub struct GeneratedFile {
    /// Relative path from project root
    pub path: PathBuf,
    /// File content
    pub content: String,
    /// Kind of file
    pub kind: FileKind,
}

/// Result of writing one file
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WriteOutcome {
    /// The file was written
    Written(PathBuf),
    /// The file existed and was left alone
    Skipped(PathBuf),
}

/// Everything `lazy suite` is about to generate
#[derive(Debug)]
pub struct SuitePlan {
    /// Derived names
    pub names: SuiteNames,
    /// Resolved table
    pub table: String,
    /// Detected relations
    pub relations: Vec<Relation>,
    /// Rendered files
    pub files: Vec<GeneratedFile>,
}

impl SuitePlan {
    /// Files of one kind
    pub fn files_of(&self, kind: FileKind) -> impl Iterator<Item = &GeneratedFile> {
        self.files.iter().filter(move |f| f.kind == kind)
    }
}

/// Generator over one project
pub struct ScaffoldGenerator {
    settings: GeneratorSettings,
    templates: TemplateRegistry,
    project_root: PathBuf,
}

impl ScaffoldGenerator {
    /// Create a generator writing below `project_root`
    pub fn new(settings: GeneratorSettings, project_root: PathBuf) -> Result<Self> {
        Ok(Self {
            settings,
            templates: TemplateRegistry::new()?,
            project_root,
        })
    }

    /// First candidate table that exists
    pub async fn resolve_table(&self, inspector: &SchemaInspector, options: &SuiteOptions) -> Result<String> {
        let candidates = SuiteNames::table_candidates(
            &options.name,
            options.table.as_deref(),
            &self.settings.table_prefix,
        );
        let tables = inspector.tables().await.context("Failed to list tables")?;
        tracing::debug!(?candidates, "resolving table");

        match candidates.iter().find(|c| tables.contains(c)) {
            Some(table) => Ok(table.clone()),
            None => bail!(
                "Table {} is not exists, make sure you've created this table.",
                candidates.join(", ")
            ),
        }
    }

    /// Resolve the table and render the suite
    pub async fn plan_suite(&self, inspector: &SchemaInspector, options: &SuiteOptions) -> Result<SuitePlan> {
        let table = self.resolve_table(inspector, options).await?;
        let schemas = inspector.schemas().await?;
        let schema = match schemas.iter().find(|s| s.name == table) {
            Some(schema) => schema.clone(),
            None => inspector.table(&table).await?,
        };

        let names = SuiteNames::new(&options.name, options.model.as_deref());
        let relations = detect(&schema, &schemas, &self.settings.table_prefix);
        let files = self.suite_files(&names, &schema, &schemas, options)?;

        Ok(SuitePlan {
            names,
            table,
            relations,
            files,
        })
    }

    /// Render the suite of one table
    pub fn suite_files(
        &self,
        names: &SuiteNames,
        table: &TableSchema,
        schemas: &[TableSchema],
        options: &SuiteOptions,
    ) -> Result<Vec<GeneratedFile>> {
        let mut files = Vec::new();
        let fields = fields_of(table);

        if !options.without_model {
            files.push(GeneratedFile {
                path: self.settings.model_path.join(format!("{}.rs", names.model_snake)),
                content: self.render_model(table, schemas)?,
                kind: FileKind::Model,
            });
        }

        let controller = json!({
            "model": names.model,
            "model_snake": names.model_snake,
            "title": names.title,
            "table": table.name,
            "route_path": names.route_path,
            "models_module": module_path(&self.settings.model_path),
            "requests_module": module_path(&self.settings.request_path),
            "relations": self.relation_contexts(&detect(table, schemas, &self.settings.table_prefix)),
        });
        files.push(GeneratedFile {
            path: self
                .settings
                .controller_path
                .join(format!("{}_controller.rs", names.model_snake)),
            content: self.templates.render("controller", &controller)?,
            kind: FileKind::Controller,
        });

        if !options.without_requests {
            files.extend(self.request_files(names, &fields)?);
        }

        if !options.without_views {
            let root = options
                .view_path
                .clone()
                .unwrap_or_else(|| self.settings.view_path.clone());
            files.extend(view_files(names, &fields, &root.join(names.view_dir())));
        }

        Ok(files)
    }

    /// Render one model per table, plus the `mod.rs` listing them
    pub async fn plan_models(&self, inspector: &SchemaInspector, options: &ModelsOptions) -> Result<Vec<GeneratedFile>> {
        let schemas = inspector.schemas().await?;
        self.model_files(&schemas, options)
    }

    /// Model files for the selected tables among `schemas`
    pub fn model_files(&self, schemas: &[TableSchema], options: &ModelsOptions) -> Result<Vec<GeneratedFile>> {
        let prefix = &self.settings.table_prefix;
        let matches = |table: &str, items: &[String]| {
            let model = Naming::model_name(table.strip_prefix(prefix.as_str()).unwrap_or(table));
            items
                .iter()
                .any(|item| item == table || Naming::model_name(item) == model)
        };

        let dir = options
            .path
            .clone()
            .unwrap_or_else(|| self.settings.model_path.clone());
        let mut files = Vec::new();
        let mut modules = Vec::new();

        for schema in schemas {
            if !options.only.is_empty() && !matches(&schema.name, &options.only) {
                continue;
            }
            if matches(&schema.name, &options.without) {
                tracing::debug!(table = %schema.name, "excluded");
                continue;
            }
            let module = Naming::snake(&Naming::model_name(
                schema.name.strip_prefix(prefix.as_str()).unwrap_or(&schema.name),
            ));
            files.push(GeneratedFile {
                path: dir.join(format!("{module}.rs")),
                content: self.render_model(schema, schemas)?,
                kind: FileKind::Model,
            });
            modules.push(module);
        }

        if modules.is_empty() {
            bail!("No tables left to generate models for");
        }

        files.push(GeneratedFile {
            path: dir.join("mod.rs"),
            content: self.templates.render("models_mod", &json!({ "modules": modules }))?,
            kind: FileKind::Module,
        });
        Ok(files)
    }

    /// Write files below the project root; existing files are kept unless `force`
    pub fn write(&self, files: &[GeneratedFile], force: bool) -> Result<Vec<WriteOutcome>> {
        let mut outcomes = Vec::new();
        for file in files {
            let full_path = self.project_root.join(&file.path);
            if full_path.exists() && !force {
                tracing::debug!(path = %full_path.display(), "exists, skipping");
                outcomes.push(WriteOutcome::Skipped(file.path.clone()));
                continue;
            }

            if let Some(parent) = full_path.parent() {
                fs::create_dir_all(parent)
                    .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
            }
            fs::write(&full_path, &file.content)
                .with_context(|| format!("Failed to write file: {}", full_path.display()))?;
            outcomes.push(WriteOutcome::Written(file.path.clone()));
        }
        Ok(outcomes)
    }

    fn render_model(&self, table: &TableSchema, schemas: &[TableSchema]) -> Result<String> {
        let relations = detect(table, schemas, &self.settings.table_prefix);
        let mut seen = BTreeSet::new();
        let related: Vec<&Relation> = relations
            .iter()
            .filter(|r| seen.insert(r.module(&self.settings.table_prefix)))
            .collect();

        let context = json!({
            "table": table.name,
            "fields": fields_of(table).iter().map(FieldDefinition::context).collect::<Vec<_>>(),
            "relations": self.relation_contexts(&relations),
            "related": related
                .iter()
                .map(|r| r.context(&self.settings.table_prefix))
                .collect::<Vec<_>>(),
        });
        self.templates.render("model", &context)
    }

    fn request_files(&self, names: &SuiteNames, fields: &[FieldDefinition]) -> Result<Vec<GeneratedFile>> {
        let fillable: Vec<&FieldDefinition> = fields.iter().filter(|f| f.is_fillable()).collect();
        let context = json!({
            "title": names.title,
            "title_lower": names.title.to_lowercase(),
            "prelude_import": prelude_import(&fillable),
            "fields": fillable.iter().map(|f| f.context()).collect::<Vec<_>>(),
        });

        let dir = self.settings.request_path.join(&names.model_snake);
        Ok(vec![
            GeneratedFile {
                path: dir.join("mod.rs"),
                content: self.templates.render("requests_mod", &context)?,
                kind: FileKind::Request,
            },
            GeneratedFile {
                path: dir.join("store_request.rs"),
                content: self.templates.render("store_request", &context)?,
                kind: FileKind::Request,
            },
            GeneratedFile {
                path: dir.join("update_request.rs"),
                content: self.templates.render("update_request", &context)?,
                kind: FileKind::Request,
            },
        ])
    }

    fn relation_contexts(&self, relations: &[Relation]) -> Vec<Value> {
        relations
            .iter()
            .map(|r| r.context(&self.settings.table_prefix))
            .collect()
    }
}

fn fields_of(table: &TableSchema) -> Vec<FieldDefinition> {
    let key = table
        .primary_key()
        .or_else(|| table.columns.first())
        .map(|c| c.name.clone());
    table
        .columns
        .iter()
        .map(|c| FieldDefinition::from_column(c, key.as_deref() == Some(c.name.as_str())))
        .collect()
}

fn prelude_import(fields: &[&FieldDefinition]) -> Option<String> {
    let types: BTreeSet<&str> = fields
        .iter()
        .filter(|f| {
            matches!(
                f.field_type,
                FieldType::Decimal
                    | FieldType::Date
                    | FieldType::Time
                    | FieldType::DateTime
                    | FieldType::Timestamp
                    | FieldType::Json
                    | FieldType::Uuid
            )
        })
        .map(|f| f.field_type.rust_type())
        .collect();
    match types.len() {
        0 => None,
        1 => types.first().map(|t| format!("use sea_orm::prelude::{t};")),
        _ => Some(format!(
            "use sea_orm::prelude::{{{}}};",
            types.into_iter().collect::<Vec<_>>().join(", ")
        )),
    }
}

fn field_tokens(stub: &str, field: &FieldDefinition, variable: &str) -> String {
    let label = Naming::title(&field.name);
    replace_tokens(
        stub,
        &[
            ("__NAME__", field.name.as_str()),
            ("__LABEL__", label.as_str()),
            ("__INPUT__", field.field_type.input_type()),
            ("__VARIABLE__", variable),
        ],
    )
}

fn view_files(names: &SuiteNames, fields: &[FieldDefinition], dir: &Path) -> Vec<GeneratedFile> {
    let key = fields
        .iter()
        .find(|f| f.primary_key)
        .map_or("id", |f| f.name.as_str());
    let fillable: Vec<&FieldDefinition> = fields.iter().filter(|f| f.is_fillable()).collect();

    let listed: Vec<&FieldDefinition> = fields
        .iter()
        .filter(|f| f.primary_key || f.is_fillable())
        .collect();
    let head_cells: String = listed.iter().map(|f| field_tokens(stubs::HEAD_CELL, f, &names.variable)).collect();
    let row_cells: String = listed.iter().map(|f| field_tokens(stubs::ROW_CELL, f, &names.variable)).collect();
    let details: String = fields.iter().map(|f| field_tokens(stubs::DETAIL, f, &names.variable)).collect();
    let form_fields: String = fillable
        .iter()
        .map(|f| {
            let stub = match f.field_type.input_type() {
                "textarea" => stubs::TEXTAREA_FIELD,
                "checkbox" => stubs::CHECKBOX_FIELD,
                _ => stubs::INPUT_FIELD,
            };
            field_tokens(stub, f, &names.variable)
        })
        .collect();

    let tokens = [
        ("__PLURAL_TITLE__", names.plural_title.as_str()),
        ("__TITLE__", names.title.as_str()),
        ("__VARIABLES__", names.variables.as_str()),
        ("__HEAD_CELLS__", head_cells.as_str()),
        ("__ROW_CELLS__", row_cells.as_str()),
        ("__DETAILS__", details.as_str()),
        ("__FORM_FIELDS__", form_fields.as_str()),
        ("__VARIABLE__", names.variable.as_str()),
        ("__KEY__", key),
    ];

    [
        ("index", stubs::INDEX_VIEW),
        ("show", stubs::SHOW_VIEW),
        ("create", stubs::CREATE_VIEW),
        ("edit", stubs::EDIT_VIEW),
    ]
    .into_iter()
    .map(|(view, stub)| GeneratedFile {
        path: dir.join(format!("{view}.hbs")),
        content: replace_tokens(stub, &tokens),
        kind: FileKind::View,
    })
    .collect()
}
