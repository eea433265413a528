//! Generic CRUD controller
//!
//! [`LazyController::router`] mounts the actions of a [`Resource`]:
//!
//! | action  | route                                  |
//! |---------|----------------------------------------|
//! | index   | `GET /`                                |
//! | create  | `GET /create`                          |
//! | store   | `POST /`                               |
//! | show    | `GET /{id}`                            |
//! | edit    | `GET /{id}/edit`                       |
//! | update  | `PUT`, `PATCH` or `POST /{id}`         |
//! | destroy | `DELETE /{id}` or `POST /{id}/destroy` |
//! | restore | `POST /{id}/restore`                   |
//! | upload  | `POST /upload`                         |
//!
//! Every action answers HTML or JSON according to the `response` setting.

mod payload;
mod persist;
pub mod response;

pub use payload::Payload;

use axum::{
    extract::{Multipart, Path, Query, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use axum_htmx::HxRequest;
use sea_orm::{
    sea_query::SimpleExpr, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder,
};
use serde::Serialize;
use serde_json::{json, Map, Value};
use std::marker::PhantomData;
use validator::Validate;

use crate::error::{field_errors, LazyError};
use crate::query::{QueryPlan, TableMeta, TrashedScope};
use crate::resource::Resource;
use crate::state::LazyState;
use crate::storage::{StorageError, UploadedFile};

use response::{clear_flash, flash_key, html, redirect, wants_json};

/// Pagination details of an index page
#[derive(Debug, Clone, Serialize)]
pub struct PageMeta {
    /// 1-based page number
    pub current_page: u64,
    /// Rows per page
    pub per_page: u64,
    /// Rows matching the filters
    pub total: u64,
    /// Last page number
    pub last_page: u64,
}

/// Generic controller for a resource
pub struct LazyController<R>(PhantomData<fn() -> R>);

impl<R: Resource> LazyController<R> {
    /// Router with every action, to be nested under the resource's route
    pub fn router() -> Router<LazyState> {
        Router::new()
            .route("/", get(Self::index).post(Self::store))
            .route("/create", get(Self::create))
            .route("/upload", post(Self::upload))
            .route(
                "/{id}",
                get(Self::show)
                    .put(Self::update)
                    .patch(Self::update)
                    .post(Self::update)
                    .delete(Self::destroy),
            )
            .route("/{id}/edit", get(Self::edit))
            .route("/{id}/destroy", post(Self::destroy))
            .route("/{id}/restore", post(Self::restore))
    }

    fn index_url(state: &LazyState) -> String {
        state.config().resource_url(&R::route_path())
    }

    fn view(path_suffix: &str) -> String {
        format!("{}.{path_suffix}", R::view_path())
    }

    fn render(state: &LazyState, status: StatusCode, view: &str, mut context: Map<String, Value>) -> Result<Response, LazyError> {
        context.insert("route".into(), Value::String(Self::index_url(state)));
        context.insert("resource".into(), Value::String(R::name()));
        let body = state.views().render(&Self::view(view), &Value::Object(context))?;
        Ok(html(status, body))
    }

    fn flash(state: &LazyState, key: &str, is_htmx: bool, headers: &HeaderMap) -> Response {
        if wants_json(state.config().response, headers, is_htmx) {
            let message = state.config().messages.get(key).unwrap_or(key);
            return Json(json!({ "message": message })).into_response();
        }
        redirect(&Self::index_url(state), is_htmx, Some(key))
    }

    /// List rows matching the request filters
    pub async fn index(
        State(state): State<LazyState>,
        HxRequest(is_htmx): HxRequest,
        headers: HeaderMap,
        Query(params): Query<Vec<(String, String)>>,
    ) -> Result<Response, LazyError> {
        let meta = R::meta();
        let plan = QueryPlan::from_params(&meta, &R::relations(), &params, &R::filter_operators())?;
        let mut select = R::Entity::find().filter(plan.into_condition(&meta));

        if let Some(order) = R::order() {
            if meta.has_column(R::order_by()) {
                select = select.order_by(SimpleExpr::from(meta.col(R::order_by())), order);
            } else {
                tracing::warn!(table = %meta.table, column = R::order_by(), "order column not found, leaving rows unordered");
            }
        }

        let db = state.db();
        let (rows, page) = if R::paginate_for_index() {
            let settings = &state.config().pagination;
            let param = |name: &str| {
                params
                    .iter()
                    .find(|(key, _)| key == name)
                    .and_then(|(_, value)| value.parse::<u64>().ok())
            };
            let per_page = param("per_page")
                .unwrap_or(settings.per_page)
                .clamp(1, settings.max_per_page.max(1));
            let current_page = param("page").unwrap_or(1).max(1);

            let paginator = select.into_json().paginate(db, per_page);
            let counts = paginator.num_items_and_pages().await?;
            let rows = paginator.fetch_page(current_page - 1).await?;
            let page = PageMeta {
                current_page,
                per_page,
                total: counts.number_of_items,
                last_page: counts.number_of_pages.max(1),
            };
            (rows, Some(page))
        } else {
            (select.into_json().all(db).await?, None)
        };

        tracing::debug!(resource = %R::name(), rows = rows.len(), "index");

        if wants_json(state.config().response, &headers, is_htmx) {
            let mut body = json!({ "data": rows });
            if let Some(page) = page {
                body["meta"] = serde_json::to_value(page)?;
            }
            return Ok(Json(body).into_response());
        }

        let mut context = Map::new();
        context.insert(R::variable_name(true), Value::Array(rows));
        context.insert("pagination".into(), serde_json::to_value(page)?);
        let flash = flash_key(&headers);
        if let Some(message) = flash.as_deref().and_then(|key| state.config().messages.get(key)) {
            context.insert("flash".into(), Value::String(message.to_string()));
        }
        let mut response = Self::render(&state, StatusCode::OK, "index", context)?;
        if flash.is_some() {
            clear_flash(&mut response);
        }
        Ok(response)
    }

    /// Show one live row
    pub async fn show(
        State(state): State<LazyState>,
        HxRequest(is_htmx): HxRequest,
        headers: HeaderMap,
        Path(id): Path<String>,
    ) -> Result<Response, LazyError> {
        let meta = R::meta();
        let row = persist::find::<R::Entity, _>(state.db(), &meta, &id, TrashedScope::Without).await?;
        if wants_json(state.config().response, &headers, is_htmx) {
            return Ok(Json(row).into_response());
        }
        let mut context = Map::new();
        context.insert(R::variable_name(false), row);
        Self::render(&state, StatusCode::OK, "show", context)
    }

    /// Empty form for a new row
    pub async fn create(
        State(state): State<LazyState>,
        HxRequest(is_htmx): HxRequest,
        headers: HeaderMap,
    ) -> Result<Response, LazyError> {
        let meta = R::meta();
        if wants_json(state.config().response, &headers, is_htmx) {
            return Ok(Json(json!({ "fields": form_fields(&meta) })).into_response());
        }
        Self::render(&state, StatusCode::OK, "create", form_context(None, None))
    }

    /// Validate and insert a row
    pub async fn store(
        State(state): State<LazyState>,
        HxRequest(is_htmx): HxRequest,
        headers: HeaderMap,
        Payload(input): Payload<R::Store>,
    ) -> Result<Response, LazyError> {
        let as_json = wants_json(state.config().response, &headers, is_htmx);
        if let Err(errors) = input.validate() {
            if as_json {
                return Err(errors.into());
            }
            let context = form_context(Some(&errors), Some(serde_json::to_value(&input)?));
            return Self::render(&state, StatusCode::UNPROCESSABLE_ENTITY, "create", context);
        }

        let meta = R::meta();
        let values = persist::column_values(&meta, &input, true)?;
        let row = persist::insert::<R::Entity, _>(state.db(), &meta, values).await?;
        tracing::info!(resource = %R::name(), "stored");

        if as_json {
            return Ok((StatusCode::CREATED, Json(row)).into_response());
        }
        Ok(redirect(&Self::index_url(&state), is_htmx, Some("saved")))
    }

    /// Form for an existing row
    pub async fn edit(
        State(state): State<LazyState>,
        HxRequest(is_htmx): HxRequest,
        headers: HeaderMap,
        Path(id): Path<String>,
    ) -> Result<Response, LazyError> {
        let meta = R::meta();
        let row = persist::find::<R::Entity, _>(state.db(), &meta, &id, TrashedScope::Without).await?;
        if wants_json(state.config().response, &headers, is_htmx) {
            return Ok(Json(row).into_response());
        }
        let mut context = form_context(None, Some(row.clone()));
        context.insert(R::variable_name(false), row);
        Self::render(&state, StatusCode::OK, "edit", context)
    }

    /// Validate and update a live row
    pub async fn update(
        State(state): State<LazyState>,
        HxRequest(is_htmx): HxRequest,
        headers: HeaderMap,
        Path(id): Path<String>,
        Payload(input): Payload<R::Update>,
    ) -> Result<Response, LazyError> {
        let meta = R::meta();
        let as_json = wants_json(state.config().response, &headers, is_htmx);
        if let Err(errors) = input.validate() {
            if as_json {
                return Err(errors.into());
            }
            let row = persist::find::<R::Entity, _>(state.db(), &meta, &id, TrashedScope::Without).await?;
            let mut context = form_context(Some(&errors), Some(serde_json::to_value(&input)?));
            context.insert(R::variable_name(false), row);
            return Self::render(&state, StatusCode::UNPROCESSABLE_ENTITY, "edit", context);
        }

        let values = persist::column_values(&meta, &input, false)?;
        let row = persist::update::<R::Entity, _>(state.db(), &meta, &id, values).await?;
        tracing::info!(resource = %R::name(), %id, "updated");

        if as_json {
            return Ok(Json(row).into_response());
        }
        Ok(redirect(&Self::index_url(&state), is_htmx, Some("updated")))
    }

    /// Soft or hard delete a live row
    pub async fn destroy(
        State(state): State<LazyState>,
        HxRequest(is_htmx): HxRequest,
        headers: HeaderMap,
        Path(id): Path<String>,
    ) -> Result<Response, LazyError> {
        let meta = R::meta();
        persist::destroy::<R::Entity, _>(state.db(), &meta, &id).await?;
        tracing::info!(resource = %R::name(), %id, "deleted");
        Ok(Self::flash(&state, "deleted", is_htmx, &headers))
    }

    /// Bring a trashed row back
    pub async fn restore(
        State(state): State<LazyState>,
        HxRequest(is_htmx): HxRequest,
        headers: HeaderMap,
        Path(id): Path<String>,
    ) -> Result<Response, LazyError> {
        let meta = R::meta();
        persist::restore::<R::Entity, _>(state.db(), &meta, &id).await?;
        tracing::info!(resource = %R::name(), %id, "restored");
        Ok(Self::flash(&state, "restored", is_htmx, &headers))
    }

    /// Store the multipart `file` field publicly and answer its URL
    pub async fn upload(State(state): State<LazyState>, mut multipart: Multipart) -> Result<Response, LazyError> {
        let max = state.config().uploads.max_bytes;
        while let Some(field) = multipart
            .next_field()
            .await
            .map_err(|e| LazyError::bad_request(e.body_text()))?
        {
            if field.name() != Some("file") {
                continue;
            }
            let filename = field.file_name().unwrap_or("upload").to_string();
            let content_type = field.content_type().map(ToString::to_string);
            let data = field
                .bytes()
                .await
                .map_err(|e| LazyError::bad_request(e.body_text()))?;
            if data.len() > max {
                return Err(StorageError::TooLarge { max }.into());
            }

            let stored = state
                .storage()
                .store(UploadedFile::new(filename, content_type, data.to_vec()))
                .await?;
            tracing::info!(resource = %R::name(), name = %stored.name, "uploaded");
            return Ok(Json(stored.url).into_response());
        }
        Err(StorageError::MissingFile.into())
    }
}

/// Columns a form fills in
fn form_fields(meta: &TableMeta) -> Vec<String> {
    meta.columns
        .iter()
        .map(|c| c.name.clone())
        .filter(|name| {
            *name != meta.primary_key
                && meta.soft_delete.as_deref() != Some(name.as_str())
                && name != "created_at"
                && name != "updated_at"
        })
        .collect()
}

fn form_context(errors: Option<&validator::ValidationErrors>, old: Option<Value>) -> Map<String, Value> {
    let mut context = Map::new();
    context.insert(
        "errors".into(),
        Value::Object(errors.map(field_errors).unwrap_or_default()),
    );
    context.insert("old".into(), old.unwrap_or_else(|| json!({})));
    context
}
