//! Filter-key parsing
//!
//! Query-string keys name a column, an optional relation path and an operator:
//!
//! | key                      | meaning                                  |
//! |--------------------------|------------------------------------------|
//! | `name`                   | `name = value`                           |
//! | `name-like`              | `name LIKE %value%`                      |
//! | `age-between`            | `age BETWEEN a AND b` (`value = a,b`)    |
//! | `posts.title-like`       | has a post whose title is `LIKE %value%` |
//! | `author-posts-title-in`  | nested relations, `title IN (...)`       |
//! | `_name-like`             | `name LIKE %value% OR id = value`        |
//! | `deleted_at-null`        | `is`, `not` or `all` trashed rows        |
//!
//! This module only parses; [`crate::query`] turns parsed keys into conditions.

use std::fmt;

use crate::error::LazyError;

/// Comparison operator named by the last segment of a filter key
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FilterOperator {
    /// `=`
    Is,
    /// `!=`
    Not,
    /// `LIKE %v%`
    Like,
    /// `NOT LIKE %v%`
    NotLike,
    /// `<`
    Lt,
    /// `<=`
    Lte,
    /// `>`
    Gt,
    /// `>=`
    Gte,
    /// `BETWEEN a AND b`
    Between,
    /// `IS NULL` / `IS NOT NULL`
    Null,
    /// `IN (...)`
    In,
    /// `NOT IN (...)`
    NotIn,
}

impl FilterOperator {
    /// Every operator, in key-name order
    pub const ALL: [Self; 12] = [
        Self::Is,
        Self::Not,
        Self::Like,
        Self::NotLike,
        Self::Lt,
        Self::Lte,
        Self::Gt,
        Self::Gte,
        Self::Between,
        Self::Null,
        Self::In,
        Self::NotIn,
    ];

    /// Parse an operator from its key name (`not_like`, `gte`, ...)
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|op| op.name() == name)
    }

    /// Parse an operator from a key name or a raw SQL symbol
    ///
    /// Used for the `query_key=column-operator` form.
    #[must_use]
    pub fn from_symbol(symbol: &str) -> Option<Self> {
        let normalized = symbol.trim().to_ascii_lowercase();
        match normalized.as_str() {
            "=" | "==" => Some(Self::Is),
            "!=" | "<>" => Some(Self::Not),
            "<" => Some(Self::Lt),
            "<=" => Some(Self::Lte),
            ">" => Some(Self::Gt),
            ">=" => Some(Self::Gte),
            "not like" => Some(Self::NotLike),
            "not in" => Some(Self::NotIn),
            other => Self::from_name(other),
        }
    }

    /// Key name of the operator
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Is => "is",
            Self::Not => "not",
            Self::Like => "like",
            Self::NotLike => "not_like",
            Self::Lt => "lt",
            Self::Lte => "lte",
            Self::Gt => "gt",
            Self::Gte => "gte",
            Self::Between => "between",
            Self::Null => "null",
            Self::In => "in",
            Self::NotIn => "not_in",
        }
    }

    /// SQL rendering of the operator
    #[must_use]
    pub const fn sql(self) -> &'static str {
        match self {
            Self::Is => "=",
            Self::Not => "!=",
            Self::Like => "LIKE",
            Self::NotLike => "NOT LIKE",
            Self::Lt => "<",
            Self::Lte => "<=",
            Self::Gt => ">",
            Self::Gte => ">=",
            Self::Between => "BETWEEN",
            Self::Null => "NULL",
            Self::In => "IN",
            Self::NotIn => "NOT IN",
        }
    }

    /// Whether the operator takes a comma-separated list
    #[must_use]
    pub const fn is_list(self) -> bool {
        matches!(self, Self::Between | Self::In | Self::NotIn)
    }

    /// Turn a raw request value into the value the operator compares against
    pub fn transform(self, raw: &str) -> Result<FilterValue, LazyError> {
        match self {
            Self::Like | Self::NotLike => Ok(FilterValue::Pattern(format!("%{raw}%"))),
            Self::Between => {
                let items = split_list(raw);
                if items.len() == 2 {
                    Ok(FilterValue::List(items))
                } else {
                    Err(LazyError::bad_request(format!(
                        "between expects two comma separated values, got {}",
                        items.len()
                    )))
                }
            }
            Self::In | Self::NotIn => Ok(FilterValue::List(split_list(raw))),
            _ => Ok(FilterValue::Single(raw.to_string())),
        }
    }
}

impl fmt::Display for FilterOperator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

fn split_list(raw: &str) -> Vec<String> {
    raw.split(',').map(|item| item.trim().to_string()).collect()
}

/// Value a filter compares against
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FilterValue {
    /// A single value
    Single(String),
    /// A `LIKE` pattern, already wrapped in `%`
    Pattern(String),
    /// Comma-separated items
    List(Vec<String>),
}

impl FilterValue {
    /// The value with the `%` wrapping removed, for primary-key comparison
    ///
    /// Lists have no single primary-key form.
    #[must_use]
    pub fn unwrapped(&self) -> Option<&str> {
        match self {
            Self::Single(value) => Some(value),
            Self::Pattern(pattern) => Some(pattern.trim_matches('%')),
            Self::List(_) => None,
        }
    }
}

/// Value of a `-null` filter
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NullCheck {
    /// `IS NULL`
    IsNull,
    /// `IS NOT NULL`
    IsNotNull,
    /// No constraint
    Any,
}

impl NullCheck {
    /// Parse `is`, `not` or `all` (case-insensitive)
    pub fn parse(value: &str) -> Result<Self, LazyError> {
        match value.to_ascii_lowercase().as_str() {
            "is" => Ok(Self::IsNull),
            "not" => Ok(Self::IsNotNull),
            "all" => Ok(Self::Any),
            other => Err(LazyError::bad_request(format!(
                "null filter expects is, not or all, got {other}"
            ))),
        }
    }
}

/// A parsed filter key
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterKey {
    /// Relation path, outermost first
    pub relations: Vec<String>,
    /// Column name, without the leading underscore
    pub column: String,
    /// Comparison operator
    pub operator: FilterOperator,
    /// `_column` form: also match the primary key
    pub or_primary_key: bool,
}

impl FilterKey {
    /// Parse a query-string key
    ///
    /// ```
    /// # use lazy_crud::filter::{FilterKey, FilterOperator};
    /// let key = FilterKey::parse("author.posts.title-like").unwrap();
    /// assert_eq!(key.relations, vec!["author", "posts"]);
    /// assert_eq!(key.column, "title");
    /// assert_eq!(key.operator, FilterOperator::Like);
    /// ```
    pub fn parse(key: &str) -> Result<Self, LazyError> {
        let mut segments: Vec<&str> = key.split('-').collect();

        let operator = match segments.as_slice() {
            [.., last] if segments.len() > 1 => FilterOperator::from_name(last),
            _ => None,
        };
        let operator = match operator {
            Some(op) => {
                segments.pop();
                op
            }
            None => FilterOperator::Is,
        };

        let mut path: Vec<&str> = segments.iter().flat_map(|s| s.split('.')).collect();
        if path.iter().any(|part| part.is_empty()) {
            return Err(LazyError::bad_request(format!("invalid filter key {key}")));
        }

        let raw_column = path.pop().unwrap_or_default();
        let (column, or_primary_key) = match raw_column.strip_prefix('_') {
            Some(stripped) => (stripped, true),
            None => (raw_column, false),
        };
        if column.is_empty() {
            return Err(LazyError::bad_request(format!("invalid filter key {key}")));
        }

        Ok(Self {
            relations: path.into_iter().map(ToString::to_string).collect(),
            column: column.to_string(),
            operator,
            or_primary_key,
        })
    }

    /// Parse the `query_key` form: `column` or `column-operator`
    ///
    /// The operator may be a key name or an SQL symbol.
    pub fn parse_query_key(query_key: &str) -> Result<Self, LazyError> {
        let (column, operator) = match query_key.split_once('-') {
            Some((column, op)) => {
                let operator = FilterOperator::from_symbol(op)
                    .ok_or_else(|| LazyError::bad_request(format!("operation {op} is not allowed")))?;
                (column, operator)
            }
            None => (query_key, FilterOperator::Is),
        };
        if column.is_empty() {
            return Err(LazyError::bad_request("query_key has no column"));
        }
        Ok(Self {
            relations: Vec::new(),
            column: column.to_string(),
            operator,
            or_primary_key: false,
        })
    }

    /// Whether this key filters the main table
    #[must_use]
    pub fn is_local(&self) -> bool {
        self.relations.is_empty()
    }

    /// Reject the key when its operator is not in `allowed`
    pub fn ensure_allowed(&self, allowed: &[FilterOperator]) -> Result<(), LazyError> {
        if allowed.contains(&self.operator) {
            Ok(())
        } else {
            Err(LazyError::bad_request(format!(
                "operation {} is not allowed",
                self.operator
            )))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_plain_column_defaults_to_is() {
        let key = FilterKey::parse("name").unwrap();
        assert_eq!(key.column, "name");
        assert_eq!(key.operator, FilterOperator::Is);
        assert!(key.relations.is_empty());
        assert!(!key.or_primary_key);
    }

    #[test]
    fn test_operator_suffix() {
        let key = FilterKey::parse("created_at-gte").unwrap();
        assert_eq!(key.column, "created_at");
        assert_eq!(key.operator, FilterOperator::Gte);

        let key = FilterKey::parse("title-not_like").unwrap();
        assert_eq!(key.operator, FilterOperator::NotLike);
    }

    #[test]
    fn test_unknown_suffix_is_part_of_path() {
        let key = FilterKey::parse("posts-title").unwrap();
        assert_eq!(key.relations, vec!["posts"]);
        assert_eq!(key.column, "title");
        assert_eq!(key.operator, FilterOperator::Is);
    }

    #[test]
    fn test_operator_name_alone_is_a_column() {
        let key = FilterKey::parse("like").unwrap();
        assert_eq!(key.column, "like");
        assert_eq!(key.operator, FilterOperator::Is);
    }

    #[test]
    fn test_relation_paths() {
        for input in ["author.posts.title-like", "author-posts-title-like", "author.posts-title-like"] {
            let key = FilterKey::parse(input).unwrap();
            assert_eq!(key.relations, vec!["author", "posts"], "{input}");
            assert_eq!(key.column, "title");
            assert_eq!(key.operator, FilterOperator::Like);
        }
    }

    #[test]
    fn test_or_primary_key_form() {
        let key = FilterKey::parse("_name-like").unwrap();
        assert_eq!(key.column, "name");
        assert!(key.or_primary_key);

        let key = FilterKey::parse("posts._title").unwrap();
        assert_eq!(key.relations, vec!["posts"]);
        assert_eq!(key.column, "title");
        assert!(key.or_primary_key);
    }

    #[test]
    fn test_invalid_keys() {
        assert!(FilterKey::parse("").is_err());
        assert!(FilterKey::parse("_").is_err());
        assert!(FilterKey::parse("posts..title").is_err());
        assert!(FilterKey::parse("-like").is_err());
    }

    #[test]
    fn test_transform() {
        assert_eq!(
            FilterOperator::Like.transform("foo").unwrap(),
            FilterValue::Pattern("%foo%".into())
        );
        assert_eq!(
            FilterOperator::In.transform("1,2, 3").unwrap(),
            FilterValue::List(vec!["1".into(), "2".into(), "3".into()])
        );
        assert_eq!(
            FilterOperator::Gt.transform("5").unwrap(),
            FilterValue::Single("5".into())
        );
        assert!(FilterOperator::Between.transform("1,2").is_ok());
        assert!(FilterOperator::Between.transform("1").is_err());
        assert!(FilterOperator::Between.transform("1,2,3").is_err());
    }

    #[test]
    fn test_unwrapped_value() {
        assert_eq!(FilterValue::Pattern("%7%".into()).unwrapped(), Some("7"));
        assert_eq!(FilterValue::Single("7".into()).unwrapped(), Some("7"));
        assert_eq!(FilterValue::List(vec![]).unwrapped(), None);
    }

    #[test]
    fn test_null_check() {
        assert_eq!(NullCheck::parse("is").unwrap(), NullCheck::IsNull);
        assert_eq!(NullCheck::parse("NOT").unwrap(), NullCheck::IsNotNull);
        assert_eq!(NullCheck::parse("All").unwrap(), NullCheck::Any);
        assert!(NullCheck::parse("maybe").is_err());
    }

    #[test]
    fn test_from_symbol() {
        assert_eq!(FilterOperator::from_symbol(">="), Some(FilterOperator::Gte));
        assert_eq!(FilterOperator::from_symbol("<>"), Some(FilterOperator::Not));
        assert_eq!(FilterOperator::from_symbol("NOT LIKE"), Some(FilterOperator::NotLike));
        assert_eq!(FilterOperator::from_symbol("lte"), Some(FilterOperator::Lte));
        assert_eq!(FilterOperator::from_symbol("~"), None);
    }

    #[test]
    fn test_query_key() {
        let key = FilterKey::parse_query_key("age->=").unwrap();
        assert_eq!(key.column, "age");
        assert_eq!(key.operator, FilterOperator::Gte);

        let key = FilterKey::parse_query_key("name").unwrap();
        assert_eq!(key.operator, FilterOperator::Is);

        assert!(FilterKey::parse_query_key("name-~").is_err());
    }

    #[test]
    fn test_ensure_allowed() {
        let key = FilterKey::parse("name-like").unwrap();
        assert!(key.ensure_allowed(&FilterOperator::ALL).is_ok());
        let err = key.ensure_allowed(&[FilterOperator::Is]).unwrap_err();
        assert_eq!(err.to_string(), "Bad request: operation like is not allowed");
    }

    #[test]
    fn test_names_round_trip() {
        for op in FilterOperator::ALL {
            assert_eq!(FilterOperator::from_name(op.name()), Some(op));
        }
    }

    proptest! {
        #[test]
        fn parse_never_panics(key in "\\PC*") {
            let _ = FilterKey::parse(&key);
        }

        #[test]
        fn parsed_column_has_no_separators(key in "[a-z_.-]{1,24}") {
            if let Ok(parsed) = FilterKey::parse(&key) {
                prop_assert!(!parsed.column.is_empty());
                prop_assert!(!parsed.column.contains('-'));
                prop_assert!(!parsed.column.contains('.'));
            }
        }
    }
}
