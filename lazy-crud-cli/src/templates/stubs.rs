//! Stub sources
//!
//! Rust stubs are Handlebars templates. View stubs are Handlebars templates
//! themselves, so they are filled by plain `__TOKEN__` replacement instead.

/// Sea-ORM entity
pub const MODEL: &str = r#"//! `{{table}}` table

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "{{table}}")]
pub struct Model {
{{#each fields}}
{{#if attribute}}
    {{attribute}}
{{/if}}
    pub {{ident}}: {{rust_type}},
{{/each}}
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
{{#each relations}}
    {{attribute}}
    {{variant}},
{{/each}}
}
{{#each related}}

impl Related<super::{{module}}::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::{{variant}}.def()
    }
}
{{/each}}

impl ActiveModelBehavior for ActiveModel {}
"#;

/// Module index of generated models
pub const MODELS_MOD: &str = r"//! Database models
{{#each modules}}
pub mod {{this}};
{{/each}}
";

/// Resource controller
pub const CONTROLLER: &str = r#"//! {{title}} controller

use lazy_crud::prelude::*;

use crate::{{models_module}}::{{model_snake}};
use crate::{{requests_module}}::{{model_snake}}::{StoreRequest, UpdateRequest};

/// CRUD actions for the `{{table}}` table, mounted at `{{route_path}}`
pub struct {{model}}Controller;

impl Resource for {{model}}Controller {
    type Entity = {{model_snake}}::Entity;
    type Store = StoreRequest;
    type Update = UpdateRequest;
{{#if relations}}

    fn relations() -> Vec<RelationDef> {
        vec![
{{#each relations}}
            RelationDef::{{kind}}::<crate::{{../models_module}}::{{module}}::Entity>("{{name}}", "{{foreign_key}}"),
{{/each}}
        ]
    }
{{/if}}
}
"#;

/// Validation of new rows
pub const STORE_REQUEST: &str = r"//! Validation for new {{title_lower}} rows
{{#if prelude_import}}

{{prelude_import}}
{{/if}}
use serde::{Deserialize, Serialize};
use validator::Validate;

#[derive(Debug, Deserialize, Serialize, Validate)]
pub struct StoreRequest {
{{#each fields}}
{{#each validations}}
    #[validate({{this}})]
{{/each}}
{{#if store_serde_attribute}}
    {{store_serde_attribute}}
{{/if}}
    pub {{ident}}: {{store_type}},
{{/each}}
}
";

/// Validation of updates; absent fields are left untouched
pub const UPDATE_REQUEST: &str = r"//! Validation for {{title_lower}} updates
{{#if prelude_import}}

{{prelude_import}}
{{/if}}
use serde::{Deserialize, Serialize};
use validator::Validate;

#[derive(Debug, Deserialize, Serialize, Validate)]
pub struct UpdateRequest {
{{#each fields}}
{{#each validations}}
    #[validate({{this}})]
{{/each}}
    {{update_serde_attribute}}
    pub {{ident}}: {{update_type}},
{{/each}}
}
";

/// Module index of one resource's requests
pub const REQUESTS_MOD: &str = r"//! Request validators for {{title}}

mod store_request;
mod update_request;

pub use store_request::StoreRequest;
pub use update_request::UpdateRequest;
";

/// Index view
pub const INDEX_VIEW: &str = r#"<h1>__PLURAL_TITLE__</h1>
{{#if flash}}<p class="flash">{{flash}}</p>{{/if}}
<a href="{{route}}/create">New __TITLE__</a>
<table>
  <thead>
    <tr>__HEAD_CELLS__<th></th></tr>
  </thead>
  <tbody>
    {{#each __VARIABLES__}}
    <tr>__ROW_CELLS__
      <td>
        <a href="{{../route}}/{{__KEY__}}">Show</a>
        <a href="{{../route}}/{{__KEY__}}/edit">Edit</a>
        <form method="post" action="{{../route}}/{{__KEY__}}/destroy"><button type="submit">Delete</button></form>
      </td>
    </tr>
    {{/each}}
  </tbody>
</table>
{{#if pagination}}
<nav>Page {{pagination.current_page}} of {{pagination.last_page}} ({{pagination.total}} total)</nav>
{{/if}}
"#;

/// Show view
pub const SHOW_VIEW: &str = r#"<h1>__TITLE__ {{__VARIABLE__.__KEY__}}</h1>
<dl>__DETAILS__
</dl>
<a href="{{route}}/{{__VARIABLE__.__KEY__}}/edit">Edit</a>
<a href="{{route}}">Back</a>
"#;

/// Create view
pub const CREATE_VIEW: &str = r#"<h1>New __TITLE__</h1>
<form method="post" action="{{route}}">__FORM_FIELDS__
  <button type="submit">Save</button>
</form>
<a href="{{route}}">Back</a>
"#;

/// Edit view
pub const EDIT_VIEW: &str = r#"<h1>Edit __TITLE__ {{__VARIABLE__.__KEY__}}</h1>
<form method="post" action="{{route}}/{{__VARIABLE__.__KEY__}}">
  <input type="hidden" name="_method" value="PUT">__FORM_FIELDS__
  <button type="submit">Update</button>
</form>
<a href="{{route}}">Back</a>
"#;

/// Index table header cell
pub const HEAD_CELL: &str = "<th>__LABEL__</th>";

/// Index table cell
pub const ROW_CELL: &str = "\n      <td>{{__NAME__}}</td>";

/// Show view entry
pub const DETAIL: &str = "\n  <dt>__LABEL__</dt><dd>{{__VARIABLE__.__NAME__}}</dd>";

/// Single-line input
pub const INPUT_FIELD: &str = r#"
  <div class="field">
    <label for="__NAME__">__LABEL__</label>
    <input type="__INPUT__" id="__NAME__" name="__NAME__" value="{{old.__NAME__}}">
    {{#each errors.__NAME__}}<span class="error">{{this}}</span>{{/each}}
  </div>"#;

/// Multi-line input
pub const TEXTAREA_FIELD: &str = r#"
  <div class="field">
    <label for="__NAME__">__LABEL__</label>
    <textarea id="__NAME__" name="__NAME__">{{old.__NAME__}}</textarea>
    {{#each errors.__NAME__}}<span class="error">{{this}}</span>{{/each}}
  </div>"#;

/// Checkbox
pub const CHECKBOX_FIELD: &str = r#"
  <div class="field">
    <label for="__NAME__">__LABEL__</label>
    <input type="checkbox" id="__NAME__" name="__NAME__" value="true"{{#if old.__NAME__}} checked{{/if}}>
    {{#each errors.__NAME__}}<span class="error">{{this}}</span>{{/each}}
  </div>"#;
