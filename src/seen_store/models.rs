use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Timestamp format used in the persisted store file.
pub const SEEN_AT_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// A single persisted entry: one post id that already triggered a
/// notification, and when it did.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeenRecord {
    pub id: String,
    #[serde(rename = "date", with = "seen_at_format")]
    pub seen_at: DateTime<Utc>,
}

impl SeenRecord {
    pub fn new(id: impl Into<String>, seen_at: DateTime<Utc>) -> Self {
        Self {
            id: id.into(),
            seen_at,
        }
    }

    /// Whole days elapsed between this record and `now`. Truncates toward
    /// zero, so a record is a day old only once 24 full hours have passed.
    pub fn age_days(&self, now: DateTime<Utc>) -> i64 {
        (now - self.seen_at).num_days()
    }
}

mod seen_at_format {
    use chrono::{DateTime, NaiveDateTime, Utc};
    use serde::{self, Deserialize, Deserializer, Serializer};

    use super::SEEN_AT_FORMAT;

    pub fn serialize<S>(value: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&value.format(SEEN_AT_FORMAT).to_string())
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<DateTime<Utc>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        NaiveDateTime::parse_from_str(&s, SEEN_AT_FORMAT)
            .map(|naive| naive.and_utc())
            .map_err(serde::de::Error::custom)
    }
}
