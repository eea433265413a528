//! Serde helpers for HTML form values
//!
//! Browsers submit `<input type="datetime-local">` as `2024-01-02T03:04`,
//! which chrono's own `Deserialize` rejects. Request structs opt in per field:
//!
//! ```rust,ignore
//! #[derive(Deserialize, Serialize, Validate)]
//! pub struct StoreRequest {
//!     #[serde(with = "lazy_crud::form::datetime")]
//!     pub starts_at: DateTime,
//!     #[serde(default, with = "lazy_crud::form::datetime_option")]
//!     pub ends_at: Option<DateTime>,
//! }
//! ```
//!
//! Values are serialized in a form [`coerce_json`](crate::query::coerce_json)
//! reads back, so they reach the database unchanged.

use chrono::{DateTime, FixedOffset, NaiveDateTime};
use serde::{de, Deserialize, Deserializer, Serializer};

use crate::query::{parse_datetime, parse_timestamp};

const DATETIME_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.f";

fn blank_to_none(raw: Option<String>) -> Option<String> {
    raw.filter(|value| !value.trim().is_empty())
}

/// `NaiveDateTime` from a form or JSON string, with or without seconds
pub mod datetime {
    use super::{de, parse_datetime, Deserialize, Deserializer, NaiveDateTime, Serializer, DATETIME_FORMAT};

    /// Write as `YYYY-MM-DDTHH:MM:SS`
    pub fn serialize<S: Serializer>(value: &NaiveDateTime, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(&value.format(DATETIME_FORMAT))
    }

    /// Read any format the filter layer accepts
    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<NaiveDateTime, D::Error> {
        let raw = String::deserialize(deserializer)?;
        parse_datetime(&raw).map_err(de::Error::custom)
    }
}

/// Optional [`datetime`]; a blank value is `None`
pub mod datetime_option {
    use super::{
        blank_to_none, de, parse_datetime, Deserialize, Deserializer, NaiveDateTime, Serializer,
        DATETIME_FORMAT,
    };

    /// Write as `YYYY-MM-DDTHH:MM:SS` or null
    #[allow(clippy::ref_option)]
    pub fn serialize<S: Serializer>(value: &Option<NaiveDateTime>, serializer: S) -> Result<S::Ok, S::Error> {
        match value {
            Some(value) => serializer.collect_str(&value.format(DATETIME_FORMAT)),
            None => serializer.serialize_none(),
        }
    }

    /// Read a date time, null or a blank string
    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<NaiveDateTime>, D::Error> {
        blank_to_none(Option::<String>::deserialize(deserializer)?)
            .map(|raw| parse_datetime(&raw).map_err(de::Error::custom))
            .transpose()
    }
}

/// `DateTime<FixedOffset>` from RFC 3339 or a naive date time taken as UTC
pub mod timestamp {
    use super::{de, parse_timestamp, DateTime, Deserialize, Deserializer, FixedOffset, Serializer};

    /// Write as RFC 3339
    pub fn serialize<S: Serializer>(value: &DateTime<FixedOffset>, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&value.to_rfc3339())
    }

    /// Read RFC 3339 or a `datetime-local` value
    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<DateTime<FixedOffset>, D::Error> {
        let raw = String::deserialize(deserializer)?;
        parse_timestamp(&raw).map_err(de::Error::custom)
    }
}

/// Optional [`timestamp`]; a blank value is `None`
pub mod timestamp_option {
    use super::{blank_to_none, de, parse_timestamp, DateTime, Deserialize, Deserializer, FixedOffset, Serializer};

    /// Write as RFC 3339 or null
    #[allow(clippy::ref_option)]
    pub fn serialize<S: Serializer>(
        value: &Option<DateTime<FixedOffset>>,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        match value {
            Some(value) => serializer.serialize_str(&value.to_rfc3339()),
            None => serializer.serialize_none(),
        }
    }

    /// Read a timestamp, null or a blank string
    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Option<DateTime<FixedOffset>>, D::Error> {
        blank_to_none(Option::<String>::deserialize(deserializer)?)
            .map(|raw| parse_timestamp(&raw).map_err(de::Error::custom))
            .transpose()
    }
}
