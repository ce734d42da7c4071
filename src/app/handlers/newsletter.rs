use actix_web::{web, HttpResponse, Result};
use log::info;
use validator::Validate;
use super::super::auth::SuperAdmin;
use super::super::dtos::*;
use super::super::error::{Error, map_db_error};
use super::super::{AppState, Limiter};
use super::check_rate_limit;

pub async fn subscribers(
  _admin: SuperAdmin,
  app_state: web::Data<AppState>
) -> Result<HttpResponse, Error> {
  let subscribers = app_state.store.all_subscribers().map_err(map_db_error)?;
  Ok(HttpResponse::Ok().json(subscribers))
}

// Emails are stored lowercase so that the same address
// can't subscribe twice with different casing.
pub async fn subscribe(
  app_state: web::Data<AppState>,
  body: web::Json<SubscribeBody>
) -> Result<HttpResponse, Error> {
  check_rate_limit(&app_state, Limiter::Forms)?;
  let body = SubscribeBody {
    email: body.into_inner().email.trim().to_lowercase()
  };
  if body.validate().is_err() {
    return Err(Error::BadRequest(String::from("A valid email is required")));
  }
  if app_state.store.subscriber_by_email(&body.email).map_err(map_db_error)?.is_some() {
    return Err(Error::BadRequest(String::from("Email already subscribed")));
  }
  let subscriber = app_state.store
    .insert_subscriber(&body.email)
    .map_err(map_db_error)?;
  info!("New newsletter subscriber");
  Ok(HttpResponse::Created().json(subscriber))
}

pub async fn delete_subscriber(
  _admin: SuperAdmin,
  app_state: web::Data<AppState>,
  path: web::Path<(String,)>
) -> Result<HttpResponse, Error> {
  if app_state.store.delete_subscriber(&path.into_inner().0).map_err(map_db_error)? {
    Ok(HttpResponse::Ok().json(SuccessDto::ok()))
  } else {
    Err(Error::NotFound(String::from("Subscriber not found")))
  }
}
