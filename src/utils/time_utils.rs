use chrono::{DateTime, Utc};

// Absolute format used once something is more than
// a week old, e.g. "Mar 7, 2021".
const DATE_FORMAT_ABSOLUTE: &str = "%b %-d, %Y";
// What the scraper uses when the forum gives us no date:
const DATE_FORMAT_SHORT: &str = "%-m/%-d/%Y";

fn plural(count: i64, unit: &str) -> String {
  if count == 1 {
    format!("{} {} ago", count, unit)
  } else {
    format!("{} {}s ago", count, unit)
  }
}

// Relative phrasing under 7 days, absolute date after that.
// Dates in the future (clock skew between backends mostly)
// are clamped to "0 minutes ago".
pub fn format_date(date: DateTime<Utc>, now: DateTime<Utc>) -> String {
  let diff = now.signed_duration_since(date);
  let minutes = diff.num_minutes().max(0);
  let hours = diff.num_hours().max(0);
  let days = diff.num_days().max(0);
  if minutes < 60 {
    plural(minutes, "minute")
  } else if hours < 24 {
    plural(hours, "hour")
  } else if days < 7 {
    plural(days, "day")
  } else {
    date.format(DATE_FORMAT_ABSOLUTE).to_string()
  }
}

pub fn format_date_now(date: DateTime<Utc>) -> String {
  format_date(date, Utc::now())
}

pub fn short_date(date: DateTime<Utc>) -> String {
  date.format(DATE_FORMAT_SHORT).to_string()
}

// Unix timestamp in seconds.
pub fn current_timestamp() -> i64 {
  Utc::now().timestamp()
}
