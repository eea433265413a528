//! Naming helpers shared by the controller and the generator
//!
//! Controllers derive their view path, route path and template variable names
//! from their own type name, and the generator derives model, table and file
//! names from the name given on the command line. Both go through these
//! helpers so the two sides always agree.

use inflector::Inflector;

/// Naming conventions for resources
pub struct Naming;

impl Naming {
    /// Convert string to `snake_case`
    ///
    /// # Examples
    ///
    /// ```
    /// # use lazy_crud::naming::Naming;
    /// assert_eq!(Naming::snake("UserProfile"), "user_profile");
    /// assert_eq!(Naming::snake("userProfile"), "user_profile");
    /// ```
    #[must_use]
    pub fn snake(input: &str) -> String {
        input.to_snake_case()
    }

    /// Convert string to `PascalCase`
    #[must_use]
    pub fn pascal(input: &str) -> String {
        input.to_pascal_case()
    }

    /// Convert string to camelCase
    #[must_use]
    pub fn camel(input: &str) -> String {
        input.to_camel_case()
    }

    /// Convert string to kebab-case
    #[must_use]
    pub fn kebab(input: &str) -> String {
        input.to_kebab_case()
    }

    /// Human-readable title (`UserProfile` -> `User Profile`)
    #[must_use]
    pub fn title(input: &str) -> String {
        input.to_title_case()
    }

    /// Pluralize a word
    ///
    /// The inflector library has known limitations with some irregular plurals.
    #[must_use]
    pub fn plural(input: &str) -> String {
        input.to_plural()
    }

    /// Singularize a word
    #[must_use]
    pub fn singular(input: &str) -> String {
        input.to_singular()
    }

    /// Lower-case the first character only
    ///
    /// ```
    /// # use lazy_crud::naming::Naming;
    /// assert_eq!(Naming::lcfirst("UserProfile"), "userProfile");
    /// ```
    #[must_use]
    pub fn lcfirst(input: &str) -> String {
        let mut chars = input.chars();
        chars.next().map_or_else(String::new, |first| {
            first.to_lowercase().chain(chars).collect()
        })
    }

    /// Upper-case the first character only
    #[must_use]
    pub fn ucfirst(input: &str) -> String {
        let mut chars = input.chars();
        chars.next().map_or_else(String::new, |first| {
            first.to_uppercase().chain(chars).collect()
        })
    }

    /// Split a name into its snake-case words
    ///
    /// ```
    /// # use lazy_crud::naming::Naming;
    /// assert_eq!(Naming::words("UserProfile"), vec!["user", "profile"]);
    /// ```
    #[must_use]
    pub fn words(input: &str) -> Vec<String> {
        Self::snake(input)
            .split('_')
            .filter(|word| !word.is_empty())
            .map(ToString::to_string)
            .collect()
    }

    /// Strip the module path, generics and a trailing `Controller` from a type name
    ///
    /// Used with [`std::any::type_name`] so that `app::http::UserProfileController`
    /// resolves to `UserProfile`.
    ///
    /// ```
    /// # use lazy_crud::naming::Naming;
    /// assert_eq!(Naming::controller_base_name("app::UserProfileController"), "UserProfile");
    /// assert_eq!(Naming::controller_base_name("Posts"), "Posts");
    /// ```
    #[must_use]
    pub fn controller_base_name(type_name: &str) -> String {
        let without_generics = type_name.split('<').next().unwrap_or(type_name);
        let short = without_generics
            .rsplit("::")
            .next()
            .unwrap_or(without_generics);
        short
            .strip_suffix("Controller")
            .filter(|rest| !rest.is_empty())
            .unwrap_or(short)
            .to_string()
    }

    /// Template variable name for a resource (`userProfile` or `userProfiles`)
    #[must_use]
    pub fn variable_name(base: &str, plural: bool) -> String {
        let name = Self::lcfirst(base);
        if plural {
            Self::plural(&name)
        } else {
            name
        }
    }

    /// Dotted view path for a resource (`UserProfile` -> `user.profile`)
    #[must_use]
    pub fn view_path(base: &str) -> String {
        Self::snake(&Self::variable_name(base, false)).replace('_', ".")
    }

    /// Route path for a resource (kebab-case plural)
    ///
    /// ```
    /// # use lazy_crud::naming::Naming;
    /// assert_eq!(Naming::route_path("UserProfile"), "/user-profiles");
    /// ```
    #[must_use]
    pub fn route_path(base: &str) -> String {
        format!("/{}", Self::plural(&Self::kebab(base)))
    }

    /// Table name for a model (`snake_case` plural)
    #[must_use]
    pub fn table_name(model: &str) -> String {
        Self::plural(&Self::snake(model))
    }

    /// Model name for a suite name (`PascalCase` singular)
    ///
    /// ```
    /// # use lazy_crud::naming::Naming;
    /// assert_eq!(Naming::model_name("user_profiles"), "UserProfile");
    /// ```
    #[must_use]
    pub fn model_name(name: &str) -> String {
        Self::ucfirst(&Self::pascal(&Self::singular(name)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_case_conversions() {
        assert_eq!(Naming::snake("UserProfile"), "user_profile");
        assert_eq!(Naming::pascal("user_profile"), "UserProfile");
        assert_eq!(Naming::camel("user_profile"), "userProfile");
        assert_eq!(Naming::kebab("UserProfile"), "user-profile");
        assert_eq!(Naming::title("UserProfile"), "User Profile");
    }

    #[test]
    fn test_first_character_helpers() {
        assert_eq!(Naming::lcfirst("Post"), "post");
        assert_eq!(Naming::ucfirst("post"), "Post");
        assert_eq!(Naming::lcfirst(""), "");
        assert_eq!(Naming::ucfirst(""), "");
    }

    #[test]
    fn test_plural_and_singular() {
        assert_eq!(Naming::plural("post"), "posts");
        assert_eq!(Naming::plural("category"), "categories");
        assert_eq!(Naming::singular("posts"), "post");
        assert_eq!(Naming::singular("categories"), "category");
    }

    #[test]
    fn test_controller_base_name() {
        assert_eq!(
            Naming::controller_base_name("my_app::controllers::PostController"),
            "Post"
        );
        assert_eq!(Naming::controller_base_name("PostController"), "Post");
        assert_eq!(
            Naming::controller_base_name("app::Wrapper<app::PostController>"),
            "Wrapper"
        );
        assert_eq!(Naming::controller_base_name("Controller"), "Controller");
    }

    #[test]
    fn test_variable_names() {
        assert_eq!(Naming::variable_name("Post", false), "post");
        assert_eq!(Naming::variable_name("Post", true), "posts");
        assert_eq!(Naming::variable_name("UserProfile", false), "userProfile");
    }

    #[test]
    fn test_view_path() {
        assert_eq!(Naming::view_path("Post"), "post");
        assert_eq!(Naming::view_path("UserProfile"), "user.profile");
    }

    #[test]
    fn test_route_and_table() {
        assert_eq!(Naming::route_path("Post"), "/posts");
        assert_eq!(Naming::route_path("UserProfile"), "/user-profiles");
        assert_eq!(Naming::table_name("UserProfile"), "user_profiles");
        assert_eq!(Naming::table_name("Category"), "categories");
    }

    #[test]
    fn test_words_and_model_name() {
        assert_eq!(Naming::words("UserProfile"), vec!["user", "profile"]);
        assert_eq!(Naming::model_name("posts"), "Post");
        assert_eq!(Naming::model_name("user_profiles"), "UserProfile");
    }
}
