//! Reads and writes driven by [`TableMeta`]

use sea_orm::{
    sea_query::{Alias, Query, SimpleExpr},
    ColumnType, Condition, ConnectionTrait, DbErr, EntityTrait, FromQueryResult, QueryFilter,
    Value,
};
use serde::Serialize;
use serde_json::Value as JsonValue;

use crate::error::LazyError;
use crate::query::{coerce_json, now_value, TableMeta, TrashedScope};

/// Columns the controller maintains itself
const TIMESTAMPS: [&str; 2] = ["created_at", "updated_at"];

fn query_error(err: impl std::fmt::Display) -> LazyError {
    LazyError::Database(DbErr::Custom(err.to_string()))
}

/// Find a row by primary key within a trashed scope
pub async fn find<E, C>(db: &C, meta: &TableMeta, id: &str, scope: TrashedScope) -> Result<JsonValue, LazyError>
where
    E: EntityTrait,
    C: ConnectionTrait,
{
    let key = meta
        .primary_key_eq(id)
        .map_err(|_| LazyError::not_found(&meta.table, id))?;
    let mut condition = Condition::all().add(key);
    if let Some(trashed) = scope.condition(meta) {
        condition = condition.add(trashed);
    }
    E::find()
        .filter(condition)
        .into_json()
        .one(db)
        .await?
        .ok_or_else(|| LazyError::not_found(&meta.table, id))
}

/// Column values of a validated request
///
/// Only entity columns are kept; the primary key, the soft-delete column and
/// the timestamps are never taken from the request.
pub fn column_values<T: Serialize>(meta: &TableMeta, input: &T, creating: bool) -> Result<Vec<(String, Value)>, LazyError> {
    let JsonValue::Object(fields) =
        serde_json::to_value(input).map_err(|e| LazyError::bad_request(e.to_string()))?
    else {
        return Err(LazyError::bad_request("request body must be an object"));
    };

    let mut values = Vec::new();
    for column in &meta.columns {
        let name = column.name.as_str();
        if name == meta.primary_key
            || meta.soft_delete.as_deref() == Some(name)
            || TIMESTAMPS.contains(&name)
        {
            continue;
        }
        if let Some(field) = fields.get(name) {
            values.push((column.name.clone(), coerce_json(field, &column.column_type)?));
        }
    }

    let stamped: &[&str] = if creating { &TIMESTAMPS } else { &TIMESTAMPS[1..] };
    for name in stamped {
        if let Some(column) = meta.column(name) {
            values.push(((*name).to_string(), now_value(&column.column_type)));
        }
    }
    Ok(values)
}

/// Insert a row and return it
pub async fn insert<E, C>(db: &C, meta: &TableMeta, mut values: Vec<(String, Value)>) -> Result<JsonValue, LazyError>
where
    E: EntityTrait,
    C: ConnectionTrait,
{
    let mut generated_key = None;
    if matches!(meta.primary_key_type(), ColumnType::Uuid) {
        let id = uuid::Uuid::new_v4();
        values.push((meta.primary_key.clone(), id.into()));
        generated_key = Some(id.to_string());
    }

    let mut insert = Query::insert();
    insert.into_table(Alias::new(&meta.table));
    if values.is_empty() {
        insert.or_default_values();
    } else {
        insert.columns(values.iter().map(|(name, _)| Alias::new(name)));
        insert
            .values(values.into_iter().map(|(_, value)| SimpleExpr::Value(value)))
            .map_err(query_error)?;
    }

    let backend = db.get_database_backend();
    if db.support_returning() {
        insert.returning_all();
        let row = db
            .query_one(backend.build(&insert))
            .await?
            .ok_or_else(|| query_error("insert returned no row"))?;
        return Ok(JsonValue::from_query_result(&row, "")?);
    }

    let result = db.execute(backend.build(&insert)).await?;
    let key = generated_key.unwrap_or_else(|| result.last_insert_id().to_string());
    tracing::debug!(table = %meta.table, %key, "inserted row");
    find::<E, C>(db, meta, &key, TrashedScope::With).await
}

/// Update a live row and return it
pub async fn update<E, C>(db: &C, meta: &TableMeta, id: &str, values: Vec<(String, Value)>) -> Result<JsonValue, LazyError>
where
    E: EntityTrait,
    C: ConnectionTrait,
{
    find::<E, C>(db, meta, id, TrashedScope::Without).await?;

    if !values.is_empty() {
        let mut update = Query::update();
        update
            .table(Alias::new(&meta.table))
            .values(values.into_iter().map(|(name, value)| (Alias::new(name), SimpleExpr::Value(value))))
            .and_where(meta.primary_key_eq(id)?);
        db.execute(db.get_database_backend().build(&update)).await?;
    }

    find::<E, C>(db, meta, id, TrashedScope::Without).await
}

/// Soft delete when the table supports it, hard delete otherwise
pub async fn destroy<E, C>(db: &C, meta: &TableMeta, id: &str) -> Result<(), LazyError>
where
    E: EntityTrait,
    C: ConnectionTrait,
{
    find::<E, C>(db, meta, id, TrashedScope::Without).await?;
    let backend = db.get_database_backend();

    if let Some(column) = &meta.soft_delete {
        let deleted_at = meta
            .column(column)
            .map_or_else(|| now_value(&ColumnType::DateTime), |c| now_value(&c.column_type));
        let mut update = Query::update();
        update
            .table(Alias::new(&meta.table))
            .value(Alias::new(column), SimpleExpr::Value(deleted_at))
            .and_where(meta.primary_key_eq(id)?);
        db.execute(backend.build(&update)).await?;
    } else {
        let mut delete = Query::delete();
        delete
            .from_table(Alias::new(&meta.table))
            .and_where(meta.primary_key_eq(id)?);
        db.execute(backend.build(&delete)).await?;
    }

    tracing::debug!(table = %meta.table, id, soft = meta.soft_delete.is_some(), "deleted row");
    Ok(())
}

/// Clear the soft-delete column of a trashed row
pub async fn restore<E, C>(db: &C, meta: &TableMeta, id: &str) -> Result<JsonValue, LazyError>
where
    E: EntityTrait,
    C: ConnectionTrait,
{
    let Some(column) = meta.soft_delete.as_deref() else {
        return Err(LazyError::bad_request(format!("{} does not support soft deletes", meta.table)));
    };
    find::<E, C>(db, meta, id, TrashedScope::Only).await?;

    let null = meta
        .column(column)
        .map_or(Value::ChronoDateTime(None), |c| crate::query::null_of(&c.column_type));
    let mut update = Query::update();
    update
        .table(Alias::new(&meta.table))
        .value(Alias::new(column), SimpleExpr::Value(null))
        .and_where(meta.primary_key_eq(id)?);
    db.execute(db.get_database_backend().build(&update)).await?;

    find::<E, C>(db, meta, id, TrashedScope::Without).await
}
