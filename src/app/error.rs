use actix_web::{
  error::ResponseError,
  http::StatusCode,
  HttpResponse
};
use derive_more::Display;
use log::error;
use serde::Serialize;

// Not sure if it's a good idea to call it "Error"
// but uh... Yeah I don't know.
// Database errors only show a generic message, the
// full thing goes to the logs. The rest is meant to
// be read by the dashboard.
#[derive(Debug, Display)]
pub enum Error {
  #[display(fmt = "{}", _0)]
  InternalServerError(String),
  #[display(fmt = "Database error")]
  DatabaseError(String),
  #[display(fmt = "{}", _0)]
  Unauthorized(String),
  #[display(fmt = "{}", _0)]
  Forbidden(String),
  #[display(fmt = "{}", _0)]
  NotFound(String),
  #[display(fmt = "{}", _0)]
  BadRequest(String),
  #[display(fmt = "{}", _0)]
  Conflict(String),
  #[display(fmt = "Too many requests, try again later")]
  TooManyRequests
}

#[derive(Serialize)]
struct ErrorBody {
  error: String
}

// Every error is {"error": "message"}, the dashboard
// just displays whatever is in there.
impl ResponseError for Error {
  fn status_code(&self) -> StatusCode {
    match self {
      Error::InternalServerError(_) | Error::DatabaseError(_) =>
        StatusCode::INTERNAL_SERVER_ERROR,
      Error::Unauthorized(_) => StatusCode::UNAUTHORIZED,
      Error::Forbidden(_) => StatusCode::FORBIDDEN,
      Error::NotFound(_) => StatusCode::NOT_FOUND,
      Error::BadRequest(_) => StatusCode::BAD_REQUEST,
      Error::Conflict(_) => StatusCode::CONFLICT,
      Error::TooManyRequests => StatusCode::TOO_MANY_REQUESTS
    }
  }

  fn error_response(&self) -> HttpResponse {
    HttpResponse::build(self.status_code())
      .json(ErrorBody { error: self.to_string() })
  }
}

// Stores give out eyre reports, this is the one place
// they turn into HTTP errors.
pub fn map_db_error(e: eyre::Report) -> Error {
  error!("Database error: {:?}", e);
  Error::DatabaseError(e.to_string())
}
