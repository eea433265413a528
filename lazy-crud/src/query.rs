//! Filter-to-query translation
//!
//! Request parameters become a Sea-ORM [`Condition`]. Relation filters compile
//! to correlated `EXISTS` sub-queries so a row matches when at least one
//! related row satisfies the filter.

use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime, NaiveTime, Utc};
use sea_orm::{
    sea_query::{Alias, Expr, Query, SelectStatement, SimpleExpr},
    ColumnTrait, ColumnType, Condition, EntityTrait, IdenStatic, Iterable,
    PrimaryKeyToColumn, Value,
};
use serde_json::Value as JsonValue;

use crate::error::LazyError;
use crate::filter::{FilterKey, FilterOperator, FilterValue, NullCheck};

/// Keys never treated as filters
pub const RESERVED_KEYS: [&str; 6] = ["page", "per_page", "query_key", "query_value", "_token", "_method"];

/// A column and its database type
#[derive(Debug, Clone)]
pub struct ColumnMeta {
    /// Column name
    pub name: String,
    /// Column type, used to coerce request values
    pub column_type: ColumnType,
}

/// Table name, primary key and columns of an entity
#[derive(Debug, Clone)]
pub struct TableMeta {
    /// Table name
    pub table: String,
    /// Primary key column
    pub primary_key: String,
    /// All columns
    pub columns: Vec<ColumnMeta>,
    /// Soft-delete column, when the table has one
    pub soft_delete: Option<String>,
}

impl TableMeta {
    /// Read the metadata of a Sea-ORM entity
    ///
    /// A `deleted_at` column marks the table as soft deleting.
    #[must_use]
    pub fn of<E: EntityTrait>() -> Self {
        let columns: Vec<ColumnMeta> = E::Column::iter()
            .map(|column| ColumnMeta {
                name: column.as_str().to_string(),
                column_type: column.def().get_column_type().clone(),
            })
            .collect();
        let primary_key = E::PrimaryKey::iter()
            .next()
            .map_or_else(|| "id".to_string(), |pk| pk.into_column().as_str().to_string());

        let mut meta = Self {
            table: E::default().table_name().to_string(),
            primary_key,
            columns,
            soft_delete: None,
        };
        meta.soft_delete = meta.has_column("deleted_at").then(|| "deleted_at".to_string());
        meta
    }

    /// Override the soft-delete column; ignored when the table lacks it
    #[must_use]
    pub fn with_soft_delete(mut self, column: Option<&str>) -> Self {
        self.soft_delete = match column {
            Some(name) if self.has_column(name) => Some(name.to_string()),
            Some(name) => {
                tracing::warn!(table = %self.table, column = name, "soft-delete column not found, ignoring");
                None
            }
            None => None,
        };
        self
    }

    /// Look up a column
    #[must_use]
    pub fn column(&self, name: &str) -> Option<&ColumnMeta> {
        self.columns.iter().find(|c| c.name == name)
    }

    /// Whether the table has a column
    #[must_use]
    pub fn has_column(&self, name: &str) -> bool {
        self.column(name).is_some()
    }

    /// Column or a bad-request error naming it
    pub fn require_column(&self, name: &str) -> Result<&ColumnMeta, LazyError> {
        self.column(name)
            .ok_or_else(|| LazyError::bad_request(format!("unknown column {name} on {}", self.table)))
    }

    /// Type of the primary key column
    #[must_use]
    pub fn primary_key_type(&self) -> ColumnType {
        self.column(&self.primary_key)
            .map_or(ColumnType::BigInteger, |c| c.column_type.clone())
    }

    /// `table.column` expression
    #[must_use]
    pub fn col(&self, column: &str) -> Expr {
        qualified(&self.table, column)
    }

    /// `table.primary_key = key`, the key coerced to the primary-key type
    pub fn primary_key_eq(&self, raw: &str) -> Result<SimpleExpr, LazyError> {
        let value = coerce(raw, &self.primary_key_type())?;
        Ok(self.col(&self.primary_key).eq(SimpleExpr::Value(value)))
    }
}

fn qualified(alias: &str, column: &str) -> Expr {
    Expr::col((Alias::new(alias), Alias::new(column)))
}

/// Related table reachable from a filter key
#[derive(Debug, Clone)]
pub struct RelationDef {
    /// Name used in filter keys
    pub name: String,
    /// Related table
    pub meta: TableMeta,
    /// Join column on the related table
    pub related_key: String,
    /// Join column on the parent table; the parent's primary key when `None`
    pub parent_key: Option<String>,
    /// Relations of the related table
    pub nested: Vec<RelationDef>,
}

impl RelationDef {
    /// Related rows point at the parent through `foreign_key`
    ///
    /// `posts.author_id = authors.id`
    pub fn has_many<E: EntityTrait>(name: impl Into<String>, foreign_key: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            meta: TableMeta::of::<E>(),
            related_key: foreign_key.into(),
            parent_key: None,
            nested: Vec::new(),
        }
    }

    /// The parent points at the related row through `foreign_key`
    ///
    /// `authors.id = posts.author_id`
    pub fn belongs_to<E: EntityTrait>(name: impl Into<String>, foreign_key: impl Into<String>) -> Self {
        let meta = TableMeta::of::<E>();
        Self {
            name: name.into(),
            related_key: meta.primary_key.clone(),
            meta,
            parent_key: Some(foreign_key.into()),
            nested: Vec::new(),
        }
    }

    /// Add a nested relation
    #[must_use]
    pub fn with(mut self, nested: Self) -> Self {
        self.nested.push(nested);
        self
    }
}

/// Which rows a soft-deleting query sees
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum TrashedScope {
    /// Live rows only
    #[default]
    Without,
    /// Live and trashed rows
    With,
    /// Trashed rows only
    Only,
}

impl TrashedScope {
    fn from_null_check(check: NullCheck) -> Self {
        match check {
            NullCheck::IsNull => Self::Without,
            NullCheck::IsNotNull => Self::Only,
            NullCheck::Any => Self::With,
        }
    }

    /// Soft-delete predicate for the table, if any
    #[must_use]
    pub fn condition(self, meta: &TableMeta) -> Option<SimpleExpr> {
        self.condition_on(&meta.table, meta)
    }

    fn condition_on(self, alias: &str, meta: &TableMeta) -> Option<SimpleExpr> {
        let column = meta.soft_delete.as_deref()?;
        match self {
            Self::Without => Some(qualified(alias, column).is_null()),
            Self::Only => Some(qualified(alias, column).is_not_null()),
            Self::With => None,
        }
    }
}

/// Translated request filters
#[derive(Debug, Clone)]
pub struct QueryPlan {
    /// All filters ANDed
    pub condition: Condition,
    /// Soft-delete scope
    pub trashed: TrashedScope,
}

impl Default for QueryPlan {
    fn default() -> Self {
        Self {
            condition: Condition::all(),
            trashed: TrashedScope::Without,
        }
    }
}

impl QueryPlan {
    /// Translate request parameters in order
    ///
    /// Empty values are skipped. Unknown columns, relations and disallowed
    /// operators are bad requests.
    pub fn from_params(
        meta: &TableMeta,
        relations: &[RelationDef],
        params: &[(String, String)],
        allowed: &[FilterOperator],
    ) -> Result<Self, LazyError> {
        let mut plan = Self::default();

        let lookup = |name: &str| {
            params
                .iter()
                .find(|(key, _)| key == name)
                .map(|(_, value)| value.as_str())
                .filter(|value| !value.is_empty())
        };
        if let (Some(query_key), Some(query_value)) = (lookup("query_key"), lookup("query_value")) {
            let key = FilterKey::parse_query_key(query_key)?;
            key.ensure_allowed(allowed)?;
            plan.apply_query_key(meta, &key, query_value)?;
        }

        for (name, raw) in params {
            if RESERVED_KEYS.contains(&name.as_str()) || raw.is_empty() {
                continue;
            }
            let key = FilterKey::parse(name)?;
            key.ensure_allowed(allowed)?;
            tracing::debug!(
                key = %name,
                column = %key.column,
                operator = %key.operator,
                relations = ?key.relations,
                "parsed filter"
            );
            plan.apply(meta, relations, &key, raw)?;
        }

        Ok(plan)
    }

    fn apply(
        &mut self,
        meta: &TableMeta,
        relations: &[RelationDef],
        key: &FilterKey,
        raw: &str,
    ) -> Result<(), LazyError> {
        if key.is_local() {
            if key.operator == FilterOperator::Null
                && meta.soft_delete.as_deref() == Some(key.column.as_str())
            {
                self.trashed = TrashedScope::from_null_check(NullCheck::parse(raw)?);
                return Ok(());
            }
            if let Some(condition) = leaf_condition(&meta.table, meta, key, raw)? {
                self.condition = std::mem::replace(&mut self.condition, Condition::all()).add(condition);
            }
            return Ok(());
        }

        let exists = relation_exists(&meta.table, meta, relations, &key.relations, key, raw, 0)?;
        self.condition = std::mem::replace(&mut self.condition, Condition::all()).add(exists);
        Ok(())
    }

    fn apply_query_key(&mut self, meta: &TableMeta, key: &FilterKey, raw: &str) -> Result<(), LazyError> {
        let column = meta.require_column(&key.column)?;
        let value = if key.operator.is_list() {
            key.operator.transform(raw)?
        } else {
            FilterValue::Single(raw.to_string())
        };
        let expr = compare(qualified(&meta.table, &column.name), &column.column_type, key.operator, &value)?;
        self.condition = std::mem::replace(&mut self.condition, Condition::all()).add(expr);
        Ok(())
    }

    /// The filter condition combined with the soft-delete scope
    #[must_use]
    pub fn into_condition(self, meta: &TableMeta) -> Condition {
        match self.trashed.condition(meta) {
            Some(scope) => self.condition.add(scope),
            None => self.condition,
        }
    }
}

/// `EXISTS (SELECT 1 FROM related AS lazy_rN WHERE join AND ...)`
fn relation_exists(
    parent_alias: &str,
    parent: &TableMeta,
    candidates: &[RelationDef],
    path: &[String],
    key: &FilterKey,
    raw: &str,
    depth: usize,
) -> Result<SimpleExpr, LazyError> {
    let Some((name, rest)) = path.split_first() else {
        return Err(LazyError::bad_request("empty relation path"));
    };
    let relation = candidates
        .iter()
        .find(|r| &r.name == name)
        .ok_or_else(|| LazyError::bad_request(format!("unknown relation {name} on {}", parent.table)))?;

    let alias = format!("lazy_r{depth}");
    let related = &relation.meta;
    let parent_key = relation.parent_key.as_deref().unwrap_or(&parent.primary_key);

    let mut select: SelectStatement = Query::select();
    select
        .expr(Expr::val(1))
        .from_as(Alias::new(&related.table), Alias::new(&alias))
        .and_where(qualified(&alias, &relation.related_key).equals((Alias::new(parent_alias), Alias::new(parent_key))));

    let mut scope = TrashedScope::Without;
    if rest.is_empty() {
        if key.operator == FilterOperator::Null && related.soft_delete.as_deref() == Some(key.column.as_str()) {
            scope = TrashedScope::from_null_check(NullCheck::parse(raw)?);
        } else if let Some(condition) = leaf_condition(&alias, related, key, raw)? {
            select.cond_where(condition);
        }
    } else {
        let nested = relation_exists(&alias, related, &relation.nested, rest, key, raw, depth + 1)?;
        select.and_where(nested);
    }
    if let Some(trashed) = scope.condition_on(&alias, related) {
        select.and_where(trashed);
    }

    Ok(Expr::exists(select))
}

/// Predicate for a single column of `meta`, addressed through `alias`
fn leaf_condition(
    alias: &str,
    meta: &TableMeta,
    key: &FilterKey,
    raw: &str,
) -> Result<Option<Condition>, LazyError> {
    let column = meta.require_column(&key.column)?;
    let col = qualified(alias, &column.name);

    if key.operator == FilterOperator::Null {
        return Ok(match NullCheck::parse(raw)? {
            NullCheck::IsNull => Some(Condition::all().add(col.is_null())),
            NullCheck::IsNotNull => Some(Condition::all().add(col.is_not_null())),
            NullCheck::Any => None,
        });
    }

    let value = key.operator.transform(raw)?;
    let expr = compare(col, &column.column_type, key.operator, &value)?;

    if !key.or_primary_key {
        return Ok(Some(Condition::all().add(expr)));
    }

    let primary = value
        .unwrapped()
        .and_then(|v| coerce(v, &meta.primary_key_type()).ok())
        .map(|pk| qualified(alias, &meta.primary_key).eq(SimpleExpr::Value(pk)));
    Ok(Some(match primary {
        Some(pk) => Condition::any().add(expr).add(pk),
        None => Condition::all().add(expr),
    }))
}

fn compare(
    col: Expr,
    column_type: &ColumnType,
    operator: FilterOperator,
    value: &FilterValue,
) -> Result<SimpleExpr, LazyError> {
    let typed = |raw: &str| coerce(raw, column_type).map(SimpleExpr::Value);

    let expr = match (operator, value) {
        (FilterOperator::Is, FilterValue::Single(v)) => col.eq(typed(v)?),
        (FilterOperator::Not, FilterValue::Single(v)) => col.ne(typed(v)?),
        (FilterOperator::Lt, FilterValue::Single(v)) => col.lt(typed(v)?),
        (FilterOperator::Lte, FilterValue::Single(v)) => col.lte(typed(v)?),
        (FilterOperator::Gt, FilterValue::Single(v)) => col.gt(typed(v)?),
        (FilterOperator::Gte, FilterValue::Single(v)) => col.gte(typed(v)?),
        (FilterOperator::Like, FilterValue::Pattern(p) | FilterValue::Single(p)) => col.like(p.as_str()),
        (FilterOperator::NotLike, FilterValue::Pattern(p) | FilterValue::Single(p)) => col.not_like(p.as_str()),
        (FilterOperator::Between, FilterValue::List(items)) => match items.as_slice() {
            [low, high] => col.between(typed(low)?, typed(high)?),
            _ => return Err(LazyError::bad_request("between expects two values")),
        },
        (FilterOperator::In, FilterValue::List(items)) => {
            col.is_in(items.iter().map(|v| typed(v)).collect::<Result<Vec<_>, _>>()?)
        }
        (FilterOperator::NotIn, FilterValue::List(items)) => {
            col.is_not_in(items.iter().map(|v| typed(v)).collect::<Result<Vec<_>, _>>()?)
        }
        (op, _) => {
            return Err(LazyError::bad_request(format!("operation {op} does not take this value")));
        }
    };
    Ok(expr)
}

/// Whether values of this type are stored as text
#[must_use]
pub fn is_textual(column_type: &ColumnType) -> bool {
    matches!(
        column_type,
        ColumnType::Char(_) | ColumnType::String(_) | ColumnType::Text | ColumnType::Enum { .. } | ColumnType::Custom(_)
    )
}

/// Typed SQL `NULL` for a column type
#[must_use]
pub fn null_of(column_type: &ColumnType) -> Value {
    match column_type {
        ColumnType::TinyInteger => Value::TinyInt(None),
        ColumnType::SmallInteger => Value::SmallInt(None),
        ColumnType::Integer => Value::Int(None),
        ColumnType::BigInteger => Value::BigInt(None),
        ColumnType::TinyUnsigned => Value::TinyUnsigned(None),
        ColumnType::SmallUnsigned => Value::SmallUnsigned(None),
        ColumnType::Unsigned => Value::Unsigned(None),
        ColumnType::BigUnsigned => Value::BigUnsigned(None),
        ColumnType::Float => Value::Float(None),
        ColumnType::Double | ColumnType::Decimal(_) | ColumnType::Money(_) => Value::Double(None),
        ColumnType::Boolean => Value::Bool(None),
        ColumnType::Uuid => Value::Uuid(None),
        ColumnType::Json | ColumnType::JsonBinary => Value::Json(None),
        ColumnType::Date => Value::ChronoDate(None),
        ColumnType::Time => Value::ChronoTime(None),
        ColumnType::DateTime | ColumnType::Timestamp => Value::ChronoDateTime(None),
        ColumnType::TimestampWithTimeZone => Value::ChronoDateTimeWithTimeZone(None),
        _ => Value::String(None),
    }
}

/// Current time as a value of the column's type
#[must_use]
pub fn now_value(column_type: &ColumnType) -> Value {
    let now = Utc::now();
    match column_type {
        ColumnType::TimestampWithTimeZone => now.fixed_offset().into(),
        ColumnType::Date => now.date_naive().into(),
        ColumnType::BigInteger | ColumnType::Integer => now.timestamp().into(),
        ty if is_textual(ty) => now.format("%Y-%m-%d %H:%M:%S").to_string().into(),
        _ => now.naive_utc().into(),
    }
}

fn invalid(raw: &str, kind: &str) -> LazyError {
    LazyError::bad_request(format!("{raw} is not a valid {kind}"))
}

fn parse_int<T: std::str::FromStr>(raw: &str) -> Result<T, LazyError> {
    raw.trim().parse().map_err(|_| invalid(raw, "integer"))
}

fn parse_bool(raw: &str) -> Result<bool, LazyError> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "on" | "yes" => Ok(true),
        "0" | "false" | "off" | "no" => Ok(false),
        _ => Err(invalid(raw, "boolean")),
    }
}

const DATETIME_FORMATS: [&str; 4] = [
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%dT%H:%M",
];

pub(crate) fn parse_datetime(raw: &str) -> Result<NaiveDateTime, LazyError> {
    let raw = raw.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Ok(dt.naive_utc());
    }
    DATETIME_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())
        .or_else(|| {
            NaiveDate::parse_from_str(raw, "%Y-%m-%d")
                .ok()
                .map(|d| d.and_time(NaiveTime::MIN))
        })
        .ok_or_else(|| invalid(raw, "date time"))
}

/// RFC 3339 with an offset, or a naive date time taken as UTC
pub(crate) fn parse_timestamp(raw: &str) -> Result<DateTime<FixedOffset>, LazyError> {
    DateTime::parse_from_rfc3339(raw.trim())
        .or_else(|_| parse_datetime(raw).map(|dt| dt.and_utc().fixed_offset()))
}

/// Convert a request string into a typed value for a column
pub fn coerce(raw: &str, column_type: &ColumnType) -> Result<Value, LazyError> {
    let value = match column_type {
        ColumnType::TinyInteger => parse_int::<i8>(raw)?.into(),
        ColumnType::SmallInteger => parse_int::<i16>(raw)?.into(),
        ColumnType::Integer => parse_int::<i32>(raw)?.into(),
        ColumnType::BigInteger => parse_int::<i64>(raw)?.into(),
        ColumnType::TinyUnsigned => parse_int::<u8>(raw)?.into(),
        ColumnType::SmallUnsigned => parse_int::<u16>(raw)?.into(),
        ColumnType::Unsigned => parse_int::<u32>(raw)?.into(),
        ColumnType::BigUnsigned => parse_int::<u64>(raw)?.into(),
        ColumnType::Float => raw.trim().parse::<f32>().map_err(|_| invalid(raw, "number"))?.into(),
        ColumnType::Double | ColumnType::Decimal(_) | ColumnType::Money(_) => {
            raw.trim().parse::<f64>().map_err(|_| invalid(raw, "number"))?.into()
        }
        ColumnType::Boolean => parse_bool(raw)?.into(),
        ColumnType::Uuid => uuid::Uuid::parse_str(raw.trim())
            .map_err(|_| invalid(raw, "uuid"))?
            .into(),
        ColumnType::Json | ColumnType::JsonBinary => {
            serde_json::from_str::<JsonValue>(raw)
                .unwrap_or_else(|_| JsonValue::String(raw.to_string()))
                .into()
        }
        ColumnType::Date => NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d")
            .or_else(|_| parse_datetime(raw).map(|dt| dt.date()).map_err(|_| ()))
            .map_err(|()| invalid(raw, "date"))?
            .into(),
        ColumnType::Time => NaiveTime::parse_from_str(raw.trim(), "%H:%M:%S")
            .or_else(|_| NaiveTime::parse_from_str(raw.trim(), "%H:%M"))
            .map_err(|_| invalid(raw, "time"))?
            .into(),
        ColumnType::DateTime | ColumnType::Timestamp => parse_datetime(raw)?.into(),
        ColumnType::TimestampWithTimeZone => parse_timestamp(raw)?.into(),
        _ => raw.to_string().into(),
    };
    Ok(value)
}

/// Convert a JSON request field into a typed value for a column
///
/// `null`, and empty strings on non-text columns, become a typed `NULL`.
pub fn coerce_json(value: &JsonValue, column_type: &ColumnType) -> Result<Value, LazyError> {
    match value {
        JsonValue::Null => Ok(null_of(column_type)),
        JsonValue::String(s) if s.is_empty() && !is_textual(column_type) => Ok(null_of(column_type)),
        JsonValue::String(s) => coerce(s, column_type),
        JsonValue::Bool(b) => match column_type {
            ColumnType::Boolean => Ok((*b).into()),
            _ => coerce(if *b { "1" } else { "0" }, column_type),
        },
        JsonValue::Number(n) => coerce(&n.to_string(), column_type),
        JsonValue::Array(_) | JsonValue::Object(_) => match column_type {
            ColumnType::Json | ColumnType::JsonBinary => Ok(value.clone().into()),
            _ => Err(LazyError::bad_request("nested values are only accepted for JSON columns")),
        },
    }
}
