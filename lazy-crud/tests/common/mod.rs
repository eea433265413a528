#![allow(dead_code)]

use axum::body::Body;
use axum::http::{Request, Response};
use axum::Router;
use http_body_util::BodyExt;
use lazy_crud::prelude::*;
use sea_orm::{ConnectionTrait, Database, DatabaseConnection};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tempfile::TempDir;
use tower::ServiceExt;
use validator::Validate;

pub mod user {
    use sea_orm::entity::prelude::*;

    #[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
    #[sea_orm(table_name = "users")]
    pub struct Model {
        #[sea_orm(primary_key)]
        pub id: i32,
        pub name: String,
        pub email: Option<String>,
        pub age: Option<i32>,
        pub created_at: Option<DateTime>,
        pub updated_at: Option<DateTime>,
        pub deleted_at: Option<DateTime>,
    }

    #[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
    pub enum Relation {}

    impl ActiveModelBehavior for ActiveModel {}
}

pub mod post {
    use sea_orm::entity::prelude::*;

    #[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
    #[sea_orm(table_name = "posts")]
    pub struct Model {
        #[sea_orm(primary_key)]
        pub id: i32,
        pub user_id: i32,
        pub title: String,
        pub views: i32,
        pub deleted_at: Option<DateTime>,
    }

    #[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
    pub enum Relation {}

    impl ActiveModelBehavior for ActiveModel {}
}

pub mod tag {
    use sea_orm::entity::prelude::*;

    #[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
    #[sea_orm(table_name = "tags")]
    pub struct Model {
        #[sea_orm(primary_key)]
        pub id: i32,
        pub label: String,
    }

    #[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
    pub enum Relation {}

    impl ActiveModelBehavior for ActiveModel {}
}

pub mod event {
    use sea_orm::entity::prelude::*;

    #[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
    #[sea_orm(table_name = "events")]
    pub struct Model {
        #[sea_orm(primary_key)]
        pub id: i32,
        pub title: String,
        pub attendees: Option<i32>,
        pub starts_at: Option<DateTime>,
        pub public: bool,
    }

    #[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
    pub enum Relation {}

    impl ActiveModelBehavior for ActiveModel {}
}

#[derive(Debug, Deserialize, Serialize, Validate)]
pub struct StoreUser {
    #[validate(length(min = 2, message = "name is too short"))]
    pub name: String,
    #[validate(email(message = "email is invalid"))]
    pub email: Option<String>,
    pub age: Option<i32>,
}

#[derive(Debug, Deserialize, Serialize, Validate)]
pub struct UpdateUser {
    #[validate(length(min = 2, message = "name is too short"))]
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub age: Option<i32>,
}

pub struct UserController;

impl Resource for UserController {
    type Entity = user::Entity;
    type Store = StoreUser;
    type Update = UpdateUser;

    fn relations() -> Vec<RelationDef> {
        vec![RelationDef::has_many::<post::Entity>("posts", "user_id")]
    }
}

#[derive(Debug, Deserialize, Serialize, Validate)]
pub struct TagInput {
    pub label: String,
}

/// Unordered, unpaginated, no soft deletes, only equality filters
pub struct TagController;

impl Resource for TagController {
    type Entity = tag::Entity;
    type Store = TagInput;
    type Update = TagInput;

    fn paginate_for_index() -> bool {
        false
    }

    fn order() -> Option<sea_orm::Order> {
        None
    }

    fn filter_operators() -> Vec<FilterOperator> {
        vec![FilterOperator::Is]
    }
}

/// Shaped like the requests `lazy suite event` writes
#[derive(Debug, Deserialize, Serialize, Validate)]
pub struct StoreEvent {
    #[validate(length(min = 1, max = 255))]
    #[serde(default)]
    pub title: String,
    pub attendees: Option<i32>,
    #[serde(default, with = "lazy_crud::form::datetime_option")]
    pub starts_at: Option<sea_orm::prelude::DateTime>,
    #[serde(default)]
    pub public: bool,
}

#[derive(Debug, Deserialize, Serialize, Validate)]
pub struct UpdateEvent {
    #[validate(length(min = 1, max = 255))]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub attendees: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none", with = "lazy_crud::form::datetime_option")]
    pub starts_at: Option<sea_orm::prelude::DateTime>,
    #[serde(default)]
    pub public: bool,
}

pub struct EventController;

impl Resource for EventController {
    type Entity = event::Entity;
    type Store = StoreEvent;
    type Update = UpdateEvent;
}

const SCHEMA: &str = r"
CREATE TABLE users (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    name TEXT NOT NULL,
    email TEXT NULL,
    age INTEGER NULL,
    created_at TEXT NULL,
    updated_at TEXT NULL,
    deleted_at TEXT NULL
);
CREATE TABLE posts (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    user_id INTEGER NOT NULL,
    title TEXT NOT NULL,
    views INTEGER NOT NULL DEFAULT 0,
    deleted_at TEXT NULL
);
CREATE TABLE tags (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    label TEXT NOT NULL
);
CREATE TABLE events (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    title TEXT NOT NULL,
    attendees INTEGER NULL,
    starts_at TEXT NULL,
    public BOOLEAN NOT NULL DEFAULT 0
);
";

const SEED: &str = r"
INSERT INTO users (name, email, age, deleted_at) VALUES
    ('Ann', 'ann@example.com', 31, NULL),
    ('Bob', NULL, 17, NULL),
    ('Cid', 'cid@example.com', 45, NULL),
    ('Dee', 'dee@example.com', 28, '2024-01-01 00:00:00');
INSERT INTO posts (user_id, title, views, deleted_at) VALUES
    (1, 'Rust ownership', 120, NULL),
    (1, 'Axum routing', 40, NULL),
    (2, 'Cooking pasta', 5, NULL),
    (3, 'Rust async', 300, '2024-02-01 00:00:00');
INSERT INTO tags (label) VALUES ('rust'), ('web');
";

const VIEWS: [(&str, &str); 5] = [
    (
        "user/index.hbs",
        "{{#if flash}}<p class=\"flash\">{{flash}}</p>{{/if}}<ul>{{#each users}}<li>{{name}}</li>{{/each}}</ul>page {{pagination.current_page}}/{{pagination.last_page}}",
    ),
    ("user/show.hbs", "<h1>{{user.name}}</h1>"),
    (
        "user/create.hbs",
        "<form action=\"{{route}}\">{{#each errors.name}}<span class=\"error\">{{this}}</span>{{/each}}<input name=\"name\" value=\"{{old.name}}\"></form>",
    ),
    (
        "user/edit.hbs",
        "<h1>Edit {{user.name}}</h1>{{#each errors.name}}<span class=\"error\">{{this}}</span>{{/each}}",
    ),
    ("tag/index.hbs", "{{#each tags}}{{label}} {{/each}}"),
];

pub struct TestApp {
    pub router: Router,
    pub db: DatabaseConnection,
    pub uploads: TempDir,
    _views: TempDir,
}

pub async fn setup() -> TestApp {
    setup_with(LazyConfig::default()).await
}

pub async fn setup_with(mut config: LazyConfig) -> TestApp {
    let db = Database::connect("sqlite::memory:").await.unwrap();
    for statement in SCHEMA.split(';').chain(SEED.split(';')) {
        if !statement.trim().is_empty() {
            db.execute_unprepared(statement).await.unwrap();
        }
    }

    let views = TempDir::new().unwrap();
    for (path, source) in VIEWS {
        let file = views.path().join(path);
        std::fs::create_dir_all(file.parent().unwrap()).unwrap();
        std::fs::write(file, source).unwrap();
    }
    let uploads = TempDir::new().unwrap();

    config.views.directory = views.path().to_path_buf();
    config.views.cache = false;
    config.uploads.directory = uploads.path().join("public");

    let router = LazyServiceProvider::new(db.clone(), config)
        .unwrap()
        .resource::<UserController>()
        .resource::<TagController>()
        .resource::<EventController>()
        .serve_uploads()
        .into_router();

    TestApp {
        router,
        db,
        uploads,
        _views: views,
    }
}

impl TestApp {
    pub async fn send(&self, request: Request<Body>) -> Response<Body> {
        self.router.clone().oneshot(request).await.unwrap()
    }

    pub async fn get_json(&self, uri: &str) -> (u16, Value) {
        let response = self
            .send(
                Request::builder()
                    .uri(uri)
                    .header("accept", "application/json")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await;
        let status = response.status().as_u16();
        (status, body_json(response).await)
    }

    pub async fn get_html(&self, uri: &str) -> (u16, String) {
        let response = self
            .send(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await;
        let status = response.status().as_u16();
        (status, body_text(response).await)
    }

    pub async fn send_json(&self, method: &str, uri: &str, body: Value) -> (u16, Value) {
        let response = self
            .send(
                Request::builder()
                    .method(method)
                    .uri(uri)
                    .header("content-type", "application/json")
                    .header("accept", "application/json")
                    .body(Body::from(body.to_string()))
                    .unwrap(),
            )
            .await;
        let status = response.status().as_u16();
        (status, body_json(response).await)
    }

    /// Names returned by a JSON index request
    pub async fn names(&self, uri: &str) -> Vec<String> {
        let (status, body) = self.get_json(uri).await;
        assert_eq!(status, 200, "{uri}: {body}");
        body["data"]
            .as_array()
            .unwrap()
            .iter()
            .map(|row| row["name"].as_str().unwrap().to_string())
            .collect()
    }
}

pub async fn body_text(response: Response<Body>) -> String {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    String::from_utf8(bytes.to_vec()).unwrap()
}

pub async fn body_json(response: Response<Body>) -> Value {
    let text = body_text(response).await;
    serde_json::from_str(&text).unwrap_or(Value::Null)
}
