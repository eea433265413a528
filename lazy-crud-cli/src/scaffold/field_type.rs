//! Column types as the generator sees them
//!
//! Database type names differ per backend (`INTEGER`, `int4`, `int(11)`);
//! they are folded into one [`FieldType`] that knows its Rust type and the
//! form input used for it.
//!
//! ```text
//! varchar(255)              → String
//! text / longtext           → String (textarea)
//! integer / int4 / int(11)  → i32
//! bigint / int8             → i64
//! tinyint(1) / boolean      → bool
//! timestamp with time zone  → DateTimeWithTimeZone
//! json / jsonb              → Json
//! ```

use crate::schema::ColumnInfo;
use lazy_crud::naming::Naming;
use serde_json::{json, Value};

/// Columns the generated controller maintains itself
pub const MANAGED_COLUMNS: [&str; 3] = ["created_at", "updated_at", "deleted_at"];

const KEYWORDS: [&str; 38] = [
    "as", "async", "await", "break", "const", "continue", "crate", "dyn", "else", "enum",
    "extern", "false", "fn", "for", "if", "impl", "in", "let", "loop", "match", "mod", "move",
    "mut", "pub", "ref", "return", "self", "static", "struct", "super", "trait", "true", "type",
    "unsafe", "use", "where", "while", "yield",
];

/// Field type enumeration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldType {
    /// Short string (VARCHAR, CHAR)
    String,
    /// Text (unlimited length)
    Text,
    /// 16-bit integer
    SmallInt,
    /// 32-bit integer
    Integer,
    /// 64-bit integer
    BigInt,
    /// Boolean
    Boolean,
    /// 32-bit float
    Float,
    /// 64-bit float
    Double,
    /// Decimal number
    Decimal,
    /// Date (no time)
    Date,
    /// Time of day
    Time,
    /// `DateTime` (no timezone)
    DateTime,
    /// Timestamp (with timezone)
    Timestamp,
    /// JSON value
    Json,
    /// UUID
    Uuid,
    /// Raw bytes
    Binary,
}

impl FieldType {
    /// Fold a database type name into a field type
    ///
    /// Unknown names become [`FieldType::String`].
    #[must_use]
    pub fn from_sql(raw: &str) -> Self {
        let lower = raw.trim().to_lowercase();
        // MySQL reports booleans as tinyint(1)
        if lower.starts_with("tinyint(1)") || lower.starts_with("bool") {
            return Self::Boolean;
        }
        if (lower.contains("with time zone") && !lower.contains("without")) || lower == "timestamptz" {
            return Self::Timestamp;
        }

        let base = lower
            .split(['(', ' '])
            .next()
            .unwrap_or_default();
        match base {
            "smallint" | "int2" | "tinyint" | "smallserial" => Self::SmallInt,
            "int" | "integer" | "int4" | "mediumint" | "serial" => Self::Integer,
            "bigint" | "int8" | "bigserial" => Self::BigInt,
            "float" | "float4" => Self::Float,
            "real" | "double" | "float8" => Self::Double,
            "decimal" | "numeric" | "money" => Self::Decimal,
            "date" => Self::Date,
            "time" => Self::Time,
            "datetime" | "timestamp" => Self::DateTime,
            "json" | "jsonb" => Self::Json,
            "uuid" => Self::Uuid,
            "text" | "tinytext" | "mediumtext" | "longtext" | "clob" => Self::Text,
            "blob" | "tinyblob" | "mediumblob" | "longblob" | "bytea" | "binary" | "varbinary" => {
                Self::Binary
            }
            _ => Self::String,
        }
    }

    /// Rust type name as exported by `sea_orm::entity::prelude`
    #[must_use]
    pub const fn rust_type(self) -> &'static str {
        match self {
            Self::String | Self::Text => "String",
            Self::SmallInt => "i16",
            Self::Integer => "i32",
            Self::BigInt => "i64",
            Self::Boolean => "bool",
            Self::Float => "f32",
            Self::Double => "f64",
            Self::Decimal => "Decimal",
            Self::Date => "Date",
            Self::Time => "Time",
            Self::DateTime => "DateTime",
            Self::Timestamp => "DateTimeWithTimeZone",
            Self::Json => "Json",
            Self::Uuid => "Uuid",
            Self::Binary => "Vec<u8>",
        }
    }

    /// HTML input for the generated forms
    #[must_use]
    pub const fn input_type(self) -> &'static str {
        match self {
            Self::Text | Self::Json => "textarea",
            Self::SmallInt | Self::Integer | Self::BigInt | Self::Float | Self::Double | Self::Decimal => {
                "number"
            }
            Self::Boolean => "checkbox",
            Self::Date => "date",
            Self::Time => "time",
            Self::DateTime | Self::Timestamp => "datetime-local",
            Self::String | Self::Uuid | Self::Binary => "text",
        }
    }

    /// Whether the column is generated by the database on insert
    #[must_use]
    pub const fn auto_increments(self) -> bool {
        matches!(self, Self::SmallInt | Self::Integer | Self::BigInt)
    }
}

/// A column of the table a stub is rendered for
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldDefinition {
    /// Column name
    pub name: String,
    /// Field type
    pub field_type: FieldType,
    /// Whether field is nullable
    pub optional: bool,
    /// Whether field is the primary key
    pub primary_key: bool,
}

impl FieldDefinition {
    /// Field of an introspected column
    #[must_use]
    pub fn from_column(column: &ColumnInfo, primary_key: bool) -> Self {
        Self {
            name: column.name.clone(),
            field_type: FieldType::from_sql(&column.data_type),
            optional: column.nullable && !primary_key,
            primary_key,
        }
    }

    /// Rust identifier, raw when the column is a keyword
    #[must_use]
    pub fn ident(&self) -> String {
        let snake = Naming::snake(&self.name);
        if KEYWORDS.contains(&snake.as_str()) {
            format!("r#{snake}")
        } else {
            snake
        }
    }

    /// Rust type, wrapped in `Option` for nullable columns
    #[must_use]
    pub fn rust_type(&self) -> String {
        let base = self.field_type.rust_type();
        if self.optional {
            format!("Option<{base}>")
        } else {
            base.to_string()
        }
    }

    /// Filled in by forms rather than by the controller or the database
    #[must_use]
    pub fn is_fillable(&self) -> bool {
        !self.primary_key && !MANAGED_COLUMNS.contains(&self.name.as_str())
    }

    /// Validator rules for a request field
    #[must_use]
    pub fn validations(&self) -> Vec<String> {
        let mut validations = Vec::new();
        match self.field_type {
            FieldType::String if !self.optional => {
                validations.push("length(min = 1, max = 255)".to_string());
            }
            FieldType::String => validations.push("length(max = 255)".to_string()),
            FieldType::Text if !self.optional => validations.push("length(min = 1)".to_string()),
            _ => {}
        }
        if self.name.to_lowercase().contains("email")
            && matches!(self.field_type, FieldType::String | FieldType::Text)
        {
            validations.push("email".to_string());
        }
        validations
    }

    /// `#[sea_orm(..)]` attribute of the model field, if any
    #[must_use]
    pub fn model_attribute(&self) -> Option<String> {
        let mut parts = Vec::new();
        if self.primary_key {
            parts.push("primary_key".to_string());
            if !self.field_type.auto_increments() {
                parts.push("auto_increment = false".to_string());
            }
        }
        if self.ident() != self.name {
            parts.push(format!("column_name = \"{}\"", self.name));
        }
        (!parts.is_empty()).then(|| format!("#[sea_orm({})]", parts.join(", ")))
    }

    /// Type of the field in `StoreRequest`
    ///
    /// Checkboxes are `bool` even on nullable columns; an unchecked box is `false`.
    #[must_use]
    pub fn store_type(&self) -> String {
        if self.field_type == FieldType::Boolean {
            "bool".to_string()
        } else {
            self.rust_type()
        }
    }

    /// Type of the field in `UpdateRequest`; `None` leaves the column untouched
    #[must_use]
    pub fn update_type(&self) -> String {
        if self.field_type == FieldType::Boolean {
            "bool".to_string()
        } else {
            format!("Option<{}>", self.field_type.rust_type())
        }
    }

    /// `lazy_crud::form` helper for types chrono cannot read from a form
    #[must_use]
    pub fn serde_with(&self, optional: bool) -> Option<String> {
        let module = match self.field_type {
            FieldType::DateTime => "datetime",
            FieldType::Timestamp => "timestamp",
            _ => return None,
        };
        let suffix = if optional { "_option" } else { "" };
        Some(format!("lazy_crud::form::{module}{suffix}"))
    }

    /// `#[serde(..)]` attribute of the store request field, if any
    ///
    /// Blank form values arrive as missing keys, so required text falls back
    /// to `""` and fails validation instead of deserialization.
    #[must_use]
    pub fn store_serde_attribute(&self) -> Option<String> {
        let with = self.serde_with(self.optional);
        let mut parts = self.serde_rename();
        let defaults = match self.field_type {
            FieldType::Boolean => true,
            FieldType::String | FieldType::Text => !self.optional,
            _ => self.optional && with.is_some(),
        };
        if defaults {
            parts.push("default".to_string());
        }
        if let Some(with) = with {
            parts.push(format!("with = \"{with}\""));
        }
        (!parts.is_empty()).then(|| format!("#[serde({})]", parts.join(", ")))
    }

    /// `#[serde(..)]` attribute of the update request field
    #[must_use]
    pub fn update_serde_attribute(&self) -> String {
        let mut parts = self.serde_rename();
        parts.push("default".to_string());
        if self.field_type != FieldType::Boolean {
            parts.push("skip_serializing_if = \"Option::is_none\"".to_string());
        }
        if let Some(with) = self.serde_with(true) {
            parts.push(format!("with = \"{with}\""));
        }
        format!("#[serde({})]", parts.join(", "))
    }

    fn serde_rename(&self) -> Vec<String> {
        if Naming::snake(&self.name) == self.name {
            Vec::new()
        } else {
            vec![format!("rename = \"{}\"", self.name)]
        }
    }

    /// Template context of this field
    #[must_use]
    pub fn context(&self) -> Value {
        let ident = self.ident();
        json!({
            "name": self.name,
            "ident": ident,
            "attribute": self.model_attribute(),
            "store_serde_attribute": self.store_serde_attribute(),
            "update_serde_attribute": self.update_serde_attribute(),
            "rust_type": self.rust_type(),
            "store_type": self.store_type(),
            "update_type": self.update_type(),
            "optional": self.optional,
            "primary_key": self.primary_key,
            "auto_increment": self.primary_key && self.field_type.auto_increments(),
            "validations": self.validations(),
            "label": Naming::title(&self.name),
            "input_type": self.field_type.input_type(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn column(name: &str, data_type: &str, nullable: bool) -> ColumnInfo {
        ColumnInfo {
            name: name.into(),
            data_type: data_type.into(),
            nullable,
            primary_key: false,
        }
    }

    #[test]
    fn test_from_sql() {
        assert_eq!(FieldType::from_sql("INTEGER"), FieldType::Integer);
        assert_eq!(FieldType::from_sql("int(11) unsigned"), FieldType::Integer);
        assert_eq!(FieldType::from_sql("int8"), FieldType::BigInt);
        assert_eq!(FieldType::from_sql("tinyint(1)"), FieldType::Boolean);
        assert_eq!(FieldType::from_sql("tinyint(4)"), FieldType::SmallInt);
        assert_eq!(FieldType::from_sql("boolean"), FieldType::Boolean);
        assert_eq!(FieldType::from_sql("character varying"), FieldType::String);
        assert_eq!(FieldType::from_sql("VARCHAR(255)"), FieldType::String);
        assert_eq!(FieldType::from_sql("longtext"), FieldType::Text);
        assert_eq!(FieldType::from_sql("double precision"), FieldType::Double);
        assert_eq!(FieldType::from_sql("numeric(10,2)"), FieldType::Decimal);
        assert_eq!(FieldType::from_sql("timestamp without time zone"), FieldType::DateTime);
        assert_eq!(FieldType::from_sql("timestamp with time zone"), FieldType::Timestamp);
        assert_eq!(FieldType::from_sql("jsonb"), FieldType::Json);
        assert_eq!(FieldType::from_sql("bytea"), FieldType::Binary);
        assert_eq!(FieldType::from_sql(""), FieldType::String);
    }

    #[test]
    fn test_rust_type() {
        let field = FieldDefinition::from_column(&column("age", "integer", true), false);
        assert_eq!(field.rust_type(), "Option<i32>");

        let field = FieldDefinition::from_column(&column("id", "integer", true), true);
        assert_eq!(field.rust_type(), "i32");
    }

    #[test]
    fn test_keyword_columns_become_raw_identifiers() {
        let field = FieldDefinition::from_column(&column("type", "varchar(20)", false), false);
        assert_eq!(field.ident(), "r#type");
        assert_eq!(field.model_attribute().unwrap(), "#[sea_orm(column_name = \"type\")]");
        assert_eq!(
            field.update_serde_attribute(),
            "#[serde(default, skip_serializing_if = \"Option::is_none\")]"
        );
    }

    #[test]
    fn test_attributes() {
        let mut id = FieldDefinition::from_column(&column("id", "uuid", false), true);
        assert_eq!(id.model_attribute().unwrap(), "#[sea_orm(primary_key, auto_increment = false)]");
        id.field_type = FieldType::BigInt;
        assert_eq!(id.model_attribute().unwrap(), "#[sea_orm(primary_key)]");

        let camel = FieldDefinition::from_column(&column("userId", "integer", false), false);
        assert_eq!(camel.ident(), "user_id");
        assert_eq!(camel.store_serde_attribute().unwrap(), "#[serde(rename = \"userId\")]");

        let flag = FieldDefinition::from_column(&column("published", "boolean", false), false);
        assert_eq!(flag.store_serde_attribute().unwrap(), "#[serde(default)]");
        assert!(FieldDefinition::from_column(&column("views", "integer", true), false)
            .store_serde_attribute()
            .is_none());
    }

    #[test]
    fn test_blank_form_values() {
        let title = FieldDefinition::from_column(&column("title", "text", false), false);
        assert_eq!(title.store_serde_attribute().unwrap(), "#[serde(default)]");
        assert!(FieldDefinition::from_column(&column("subtitle", "text", true), false)
            .store_serde_attribute()
            .is_none());

        let starts = FieldDefinition::from_column(&column("starts_at", "datetime", false), false);
        assert_eq!(
            starts.store_serde_attribute().unwrap(),
            "#[serde(with = \"lazy_crud::form::datetime\")]"
        );
        let ends = FieldDefinition::from_column(&column("ends_at", "timestamp with time zone", true), false);
        assert_eq!(
            ends.store_serde_attribute().unwrap(),
            "#[serde(default, with = \"lazy_crud::form::timestamp_option\")]"
        );
        assert_eq!(
            starts.update_serde_attribute(),
            "#[serde(default, skip_serializing_if = \"Option::is_none\", with = \"lazy_crud::form::datetime_option\")]"
        );
    }

    #[test]
    fn test_checkboxes_are_plain_bools() {
        let flag = FieldDefinition::from_column(&column("isPublic", "tinyint(1)", true), false);
        assert_eq!(flag.rust_type(), "Option<bool>");
        assert_eq!(flag.store_type(), "bool");
        assert_eq!(flag.update_type(), "bool");
        assert_eq!(flag.update_serde_attribute(), "#[serde(rename = \"isPublic\", default)]");

        let age = FieldDefinition::from_column(&column("age", "integer", false), false);
        assert_eq!(age.store_type(), "i32");
        assert_eq!(age.update_type(), "Option<i32>");
    }

    #[test]
    fn test_fillable() {
        assert!(!FieldDefinition::from_column(&column("id", "integer", false), true).is_fillable());
        assert!(!FieldDefinition::from_column(&column("deleted_at", "datetime", true), false).is_fillable());
        assert!(FieldDefinition::from_column(&column("title", "text", false), false).is_fillable());
    }

    #[test]
    fn test_validations() {
        let email = FieldDefinition::from_column(&column("email", "varchar(255)", false), false);
        assert_eq!(email.validations(), vec!["length(min = 1, max = 255)", "email"]);

        let age = FieldDefinition::from_column(&column("age", "integer", false), false);
        assert!(age.validations().is_empty());
    }
}
