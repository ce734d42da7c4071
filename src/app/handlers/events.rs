use actix_web::{web, HttpResponse, Result};
use crate::db::entities::{EventUpdate, NewEvent};
use super::super::auth::AuthedAdmin;
use super::super::dtos::*;
use super::super::error::{Error, map_db_error};
use super::super::AppState;
use super::is_blank;

fn event_not_found() -> Error {
  Error::NotFound(String::from("Event not found"))
}

pub async fn all_events(
  app_state: web::Data<AppState>
) -> Result<HttpResponse, Error> {
  let events = app_state.store.all_events().map_err(map_db_error)?;
  Ok(HttpResponse::Ok().json(events))
}

pub async fn event(
  app_state: web::Data<AppState>,
  path: web::Path<(String,)>
) -> Result<HttpResponse, Error> {
  match app_state.store.event_by_id(&path.into_inner().0).map_err(map_db_error)? {
    Some(event) => Ok(HttpResponse::Ok().json(event)),
    None => Err(event_not_found())
  }
}

pub async fn create_event(
  _admin: AuthedAdmin,
  app_state: web::Data<AppState>,
  body: web::Json<NewEventBody>
) -> Result<HttpResponse, Error> {
  let body = body.into_inner();
  if is_blank(&body.title) || is_blank(&body.date) {
    return Err(Error::BadRequest(String::from("Title and date are required")));
  }
  let event = app_state.store
    .insert_event(NewEvent::from(body))
    .map_err(map_db_error)?;
  Ok(HttpResponse::Created().json(event))
}

pub async fn update_event(
  _admin: AuthedAdmin,
  app_state: web::Data<AppState>,
  path: web::Path<(String,)>,
  body: web::Json<EventUpdateBody>
) -> Result<HttpResponse, Error> {
  let update: EventUpdate = body.into_inner().into();
  if update.title.as_deref().map_or(false, is_blank) {
    return Err(Error::BadRequest(String::from("Title can't be empty")));
  }
  match app_state.store.update_event(&path.into_inner().0, update).map_err(map_db_error)? {
    Some(event) => Ok(HttpResponse::Ok().json(event)),
    None => Err(event_not_found())
  }
}

pub async fn delete_event(
  _admin: AuthedAdmin,
  app_state: web::Data<AppState>,
  path: web::Path<(String,)>
) -> Result<HttpResponse, Error> {
  if app_state.store.delete_event(&path.into_inner().0).map_err(map_db_error)? {
    Ok(HttpResponse::Ok().json(SuccessDto::ok()))
  } else {
    Err(event_not_found())
  }
}
