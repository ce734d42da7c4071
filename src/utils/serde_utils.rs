// The admin dashboard sends empty strings for fields it
// wants us to fill in (summary mostly), treat those as
// absent.
pub fn empty_string_to_none(value: Option<String>) -> Option<String> {
  match value {
    Some(s) => if s.trim().is_empty()
      { None } else { Some(s) },
    None => None
  }
}
