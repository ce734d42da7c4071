use chrono::{DateTime, TimeZone, Utc};
use uuid::Uuid;

// Ids are opaque strings for every backend.
pub fn new_id() -> String {
  Uuid::new_v4().to_string()
}

// SQLite has no real date type so timestamps are stored
// as Unix milliseconds.
pub fn to_millis(date: &DateTime<Utc>) -> i64 {
  date.timestamp_millis()
}

pub fn from_millis(millis: i64) -> DateTime<Utc> {
  Utc.timestamp_millis_opt(millis)
    .single()
    .unwrap_or_else(|| Utc.timestamp_millis_opt(0).unwrap())
}

// Same for booleans.
pub fn bool_to_i32(value: bool) -> i32 {
  if value { 1 } else { 0 }
}

// Tags are kept in a single TEXT column as a JSON array,
// I didn't want a whole join table for a list of words.
pub fn tags_to_json(tags: &[String]) -> String {
  serde_json::to_string(tags).unwrap_or_else(|_| String::from("[]"))
}

pub fn tags_from_json(json: &str) -> Vec<String> {
  serde_json::from_str(json).unwrap_or_default()
}

// The "now" all stores use, millisecond precision so that
// what we hand out is exactly what SQLite gives back.
pub fn now() -> DateTime<Utc> {
  from_millis(Utc::now().timestamp_millis())
}
