use actix_web::{http::header, HttpRequest};
use color_eyre::Result;
use eyre::WrapErr;
use std::time::Duration;

const USER_AGENT: &str = "Mozilla/5.0 (compatible; gamenews-backend/1.0)";

// Extracting Actix header values is kinda convoluted.
// A header that isn't valid visible ASCII is treated as
// missing.
pub fn header_value(req: &HttpRequest, name: header::HeaderName) -> Option<String> {
  req.headers().get(name)
    .and_then(|h| h.to_str().ok())
    .map(|h| h.to_string())
}

// Token part of "Authorization: Bearer <token>". The
// scheme is case-insensitive.
pub fn bearer_token(req: &HttpRequest) -> Option<String> {
  let value = header_value(req, header::AUTHORIZATION)?;
  let (scheme, token) = value.trim().split_once(' ')?;
  let token = token.trim();
  if scheme.eq_ignore_ascii_case("bearer") && !token.is_empty() {
    Some(token.to_string())
  } else {
    None
  }
}

// One client for every outbound call (scraper and image
// host), it keeps its own connection pool.
pub fn build_http_client(timeout_secs: u64) -> Result<reqwest::Client> {
  reqwest::Client::builder()
    .timeout(Duration::from_secs(timeout_secs))
    .user_agent(USER_AGENT)
    .build()
    .context("Building the HTTP client")
}
