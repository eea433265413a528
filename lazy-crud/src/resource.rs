//! Controller configuration
//!
//! A controller is any type implementing [`Resource`]. Only the entity and
//! the two request validators are required; names are guessed from the
//! controller's own type name.
//!
//! ```rust,ignore
//! pub struct UserProfileController;
//!
//! impl Resource for UserProfileController {
//!     type Entity = user_profile::Entity;
//!     type Store = StoreUserProfile;
//!     type Update = UpdateUserProfile;
//! }
//!
//! // view path `user.profile`, route `/user-profiles`,
//! // template variables `userProfile` / `userProfiles`
//! ```

use sea_orm::{EntityTrait, Order};
use serde::{de::DeserializeOwned, Serialize};
use validator::Validate;

use crate::filter::FilterOperator;
use crate::naming::Naming;
use crate::query::{RelationDef, TableMeta};

/// A CRUD resource served by [`crate::controller::LazyController`]
pub trait Resource: Send + Sync + 'static {
    /// The model
    type Entity: EntityTrait;

    /// Validated input of `store`
    type Store: DeserializeOwned + Serialize + Validate + Send + 'static;

    /// Validated input of `update`
    type Update: DeserializeOwned + Serialize + Validate + Send + 'static;

    /// Short controller name without a trailing `Controller`
    fn name() -> String {
        Naming::controller_base_name(std::any::type_name::<Self>())
    }

    /// Template variable name (`userProfile`, or `userProfiles` when plural)
    fn variable_name(plural: bool) -> String {
        Naming::variable_name(&Self::name(), plural)
    }

    /// Dotted view directory (`user.profile`)
    fn view_path() -> String {
        Naming::view_path(&Self::name())
    }

    /// Route the resource is mounted under (`/user-profiles`)
    fn route_path() -> String {
        Naming::route_path(&Self::name())
    }

    /// Paginate the index instead of loading every row
    fn paginate_for_index() -> bool {
        true
    }

    /// Index ordering column
    fn order_by() -> &'static str {
        "id"
    }

    /// Index ordering direction; `None` leaves rows unordered
    fn order() -> Option<Order> {
        Some(Order::Desc)
    }

    /// Relations reachable from filter keys
    fn relations() -> Vec<RelationDef> {
        Vec::new()
    }

    /// Operators filter keys may use
    fn filter_operators() -> Vec<FilterOperator> {
        FilterOperator::ALL.to_vec()
    }

    /// Soft-delete column; ignored when the table lacks it
    fn soft_delete_column() -> Option<&'static str> {
        Some("deleted_at")
    }

    /// Table metadata of the entity
    fn meta() -> TableMeta {
        TableMeta::of::<Self::Entity>().with_soft_delete(Self::soft_delete_column())
    }
}
