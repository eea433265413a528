//! Names derived from the suite name given on the command line

use lazy_crud::naming::Naming;
use std::path::{Component, Path, PathBuf};

/// Names of one generated suite
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SuiteNames {
    /// Model type (`UserProfile`)
    pub model: String,
    /// Model module (`user_profile`)
    pub model_snake: String,
    /// Human title (`User Profile`)
    pub title: String,
    /// Human plural title (`User Profiles`)
    pub plural_title: String,
    /// Template variable of one row (`userProfile`)
    pub variable: String,
    /// Template variable of the index rows (`userProfiles`)
    pub variables: String,
    /// Route the controller is mounted at (`/user-profiles`)
    pub route_path: String,
}

impl SuiteNames {
    /// Names for `name`, or for an explicit model name
    ///
    /// ```
    /// # use lazy_crud_cli::scaffold::SuiteNames;
    /// let names = SuiteNames::new("user_profiles", None);
    /// assert_eq!(names.model, "UserProfile");
    /// assert_eq!(names.variables, "userProfiles");
    /// ```
    #[must_use]
    pub fn new(name: &str, model: Option<&str>) -> Self {
        let model = model.map_or_else(|| Naming::model_name(name), Naming::ucfirst);
        Self {
            model_snake: Naming::snake(&model),
            title: Naming::title(&model),
            plural_title: Naming::title(&Naming::plural(&model)),
            variable: Naming::variable_name(&model, false),
            variables: Naming::variable_name(&model, true),
            route_path: Naming::route_path(&model),
            model,
        }
    }

    /// Tables tried in order, each with the configured prefix
    #[must_use]
    pub fn table_candidates(name: &str, table: Option<&str>, prefix: &str) -> Vec<String> {
        let guesses = match table {
            Some(table) => vec![table.to_string()],
            None => vec![
                Naming::plural(&Naming::snake(name)),
                Naming::plural(&Naming::lcfirst(name)),
            ],
        };
        let mut candidates: Vec<String> = Vec::new();
        for guess in guesses {
            let candidate = format!("{prefix}{guess}");
            if !candidates.contains(&candidate) {
                candidates.push(candidate);
            }
        }
        candidates
    }

    /// View directory below the views root (`user/profile`)
    #[must_use]
    pub fn view_dir(&self) -> PathBuf {
        self.model_snake.split('_').collect()
    }
}

/// Rust module path of a source directory (`src/http/models` -> `http::models`)
#[must_use]
pub fn module_path(dir: &Path) -> String {
    let parts: Vec<String> = dir
        .components()
        .filter_map(|c| match c {
            Component::Normal(part) => Some(part.to_string_lossy().to_string()),
            _ => None,
        })
        .collect();
    let inside_src = parts
        .iter()
        .position(|part| part == "src")
        .map_or(&parts[..], |idx| &parts[idx + 1..]);
    if inside_src.is_empty() {
        return parts.last().cloned().unwrap_or_default();
    }
    inside_src.join("::")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_names() {
        let names = SuiteNames::new("UserProfile", None);
        assert_eq!(names.model, "UserProfile");
        assert_eq!(names.model_snake, "user_profile");
        assert_eq!(names.title, "User Profile");
        assert_eq!(names.plural_title, "User Profiles");
        assert_eq!(names.variable, "userProfile");
        assert_eq!(names.route_path, "/user-profiles");
        assert_eq!(names.view_dir(), PathBuf::from("user/profile"));
    }

    #[test]
    fn test_explicit_model() {
        let names = SuiteNames::new("people", Some("member"));
        assert_eq!(names.model, "Member");
        assert_eq!(names.variables, "members");
    }

    #[test]
    fn test_table_candidates() {
        assert_eq!(
            SuiteNames::table_candidates("UserProfile", None, ""),
            vec!["user_profiles", "userProfiles"]
        );
        assert_eq!(SuiteNames::table_candidates("post", None, "app_"), vec!["app_posts"]);
        assert_eq!(
            SuiteNames::table_candidates("post", Some("articles"), "app_"),
            vec!["app_articles"]
        );
    }

    #[test]
    fn test_module_path() {
        assert_eq!(module_path(Path::new("src/models")), "models");
        assert_eq!(module_path(Path::new("./src/http/controllers")), "http::controllers");
        assert_eq!(module_path(Path::new("models")), "models");
    }
}
