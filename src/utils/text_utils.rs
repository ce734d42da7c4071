use regex::Regex;
use lazy_static::lazy_static;

pub const WORDS_PER_MINUTE: usize = 200;
pub const DEFAULT_SUMMARY_LENGTH: usize = 200;

// Estimated reading time in minutes. Nobody reads
// zero minutes of anything, so 1 is the floor.
pub fn calculate_reading_time(content: &str) -> u32 {
  let words = content.split_whitespace().count();
  let minutes = (words + WORDS_PER_MINUTE - 1) / WORDS_PER_MINUTE;
  minutes.max(1) as u32
}

// Summaries are built from markdown content so we strip
// the few characters that would look weird in plain text.
// Lengths are in chars and not bytes since a good chunk
// of the content is in Arabic.
pub fn generate_summary(content: &str, max_length: usize) -> String {
  lazy_static! {
    static ref MARKDOWN_CHARS: Regex = Regex::new(r"[#*`]").unwrap();
  }
  let plain = MARKDOWN_CHARS.replace_all(content, "");
  let plain = plain.trim();
  if plain.chars().count() <= max_length {
    return plain.to_string();
  }
  let truncated: String = plain.chars().take(max_length).collect();
  format!("{}...", truncated.trim_end())
}

// String::truncate panics when cutting a multibyte
// char in half, this doesn't.
pub fn truncate_utf8(s: &mut String, max_chars: usize) {
  if let Some((idx, _)) = s.char_indices().nth(max_chars) {
    s.truncate(idx);
  }
}
