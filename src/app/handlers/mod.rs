use actix_web::HttpResponse;
use super::error::Error;
use super::{AppState, Limiter};
mod admins;
mod auth;
mod comments;
mod events;
mod mercenaries;
mod news;
mod newsletter;
mod posts;
mod scrape;
mod stats;
mod tickets;
mod uploads;
#[cfg(test)]
mod tests;

pub use admins::*;
pub use auth::*;
pub use comments::*;
pub use events::*;
pub use mercenaries::*;
pub use news::*;
pub use newsletter::*;
pub use posts::*;
pub use scrape::*;
pub use stats::*;
pub use tickets::*;
pub use uploads::*;

// Handler modules, grouped by what they touch. Everything
// returns the actix Result with my Error type, see the
// "error" module for how those become responses.

// Default response when no route matched the request:
pub async fn not_found() -> Result<HttpResponse, Error> {
  Err(Error::NotFound(String::from("Endpoint doesn't exist")))
}

// For login and the public forms.
fn check_rate_limit(app_state: &AppState, limiter: Limiter) -> Result<(), Error> {
  if app_state.check_rate_limit(limiter) {
    Err(Error::TooManyRequests)
  } else {
    Ok(())
  }
}

fn is_blank(value: &str) -> bool {
  value.trim().is_empty()
}
