use actix_web::{web, HttpResponse, Result};
use log::info;
use validator::Validate;
use crate::db::entities::{NewTicket, NewTicketReply, TicketUpdate};
use super::super::auth::AuthedAdmin;
use super::super::dtos::*;
use super::super::error::{Error, map_db_error};
use super::super::{AppState, Limiter};
use super::{check_rate_limit, is_blank};

fn ticket_not_found() -> Error {
  Error::NotFound(String::from("Ticket not found"))
}

// Support desk list. Only super admins get to see the
// email addresses.
pub async fn all_tickets(
  admin: AuthedAdmin,
  app_state: web::Data<AppState>
) -> Result<HttpResponse, Error> {
  let show_email = admin.0.is_super_admin();
  let tickets: Vec<TicketDto> = app_state.store.all_tickets()
    .map_err(map_db_error)?
    .into_iter()
    .map(|t| TicketDto::new(t, show_email))
    .collect();
  Ok(HttpResponse::Ok().json(tickets))
}

pub async fn my_tickets(
  app_state: web::Data<AppState>,
  path: web::Path<(String,)>
) -> Result<HttpResponse, Error> {
  let email = path.into_inner().0;
  let tickets: Vec<TicketDto> = app_state.store
    .tickets_by_email(email.trim())
    .map_err(map_db_error)?
    .into_iter()
    .map(TicketDto::from)
    .collect();
  Ok(HttpResponse::Ok().json(tickets))
}

pub async fn ticket(
  app_state: web::Data<AppState>,
  path: web::Path<(String,)>
) -> Result<HttpResponse, Error> {
  match app_state.store.ticket_by_id(&path.into_inner().0).map_err(map_db_error)? {
    Some(ticket) => Ok(HttpResponse::Ok().json(TicketDto::from(ticket))),
    None => Err(ticket_not_found())
  }
}

pub async fn create_ticket(
  app_state: web::Data<AppState>,
  body: web::Json<NewTicketBody>
) -> Result<HttpResponse, Error> {
  check_rate_limit(&app_state, Limiter::Forms)?;
  let mut body = body.into_inner();
  body.user_email = body.user_email.trim().to_string();
  body.validate()
    .map_err(|e| Error::BadRequest(format!("Invalid ticket - {}", e)))?;
  if is_blank(&body.title) || is_blank(&body.description) || is_blank(&body.user_name) {
    return Err(Error::BadRequest(String::from("Title, description and name are required")));
  }
  let ticket = app_state.store
    .insert_ticket(NewTicket::from(body))
    .map_err(map_db_error)?;
  info!("New support ticket {}", ticket.id);
  Ok(HttpResponse::Created().json(TicketDto::from(ticket)))
}

pub async fn update_ticket(
  _admin: AuthedAdmin,
  app_state: web::Data<AppState>,
  path: web::Path<(String,)>,
  body: web::Json<TicketUpdateBody>
) -> Result<HttpResponse, Error> {
  let update: TicketUpdate = body.into_inner().into();
  match app_state.store.update_ticket(&path.into_inner().0, update).map_err(map_db_error)? {
    Some(ticket) => Ok(HttpResponse::Ok().json(TicketDto::from(ticket))),
    None => Err(ticket_not_found())
  }
}

pub async fn delete_ticket(
  _admin: AuthedAdmin,
  app_state: web::Data<AppState>,
  path: web::Path<(String,)>
) -> Result<HttpResponse, Error> {
  if app_state.store.delete_ticket(&path.into_inner().0).map_err(map_db_error)? {
    Ok(HttpResponse::Ok().json(SuccessDto::ok()))
  } else {
    Err(ticket_not_found())
  }
}

pub async fn replies(
  app_state: web::Data<AppState>,
  path: web::Path<(String,)>
) -> Result<HttpResponse, Error> {
  let replies: Vec<ReplyDto> = app_state.store
    .replies_by_ticket(&path.into_inner().0)
    .map_err(map_db_error)?
    .into_iter()
    .map(ReplyDto::from)
    .collect();
  Ok(HttpResponse::Ok().json(replies))
}

// Users and admins both reply here. Claiming to be an
// admin only works with an admin token, the body alone
// isn't enough.
pub async fn post_reply(
  admin: Option<AuthedAdmin>,
  app_state: web::Data<AppState>,
  path: web::Path<(String,)>,
  body: web::Json<ReplyBody>
) -> Result<HttpResponse, Error> {
  let ticket_id = path.into_inner().0;
  let body = body.into_inner();
  if is_blank(&body.author_name) || is_blank(&body.content) {
    return Err(Error::BadRequest(String::from("Author name and content are required")));
  }
  if app_state.store.ticket_by_id(&ticket_id).map_err(map_db_error)?.is_none() {
    return Err(ticket_not_found());
  }
  let reply = app_state.store.insert_reply(NewTicketReply {
    ticket_id,
    author_name: body.author_name,
    content: body.content,
    is_admin: body.is_admin && admin.is_some()
  }).map_err(map_db_error)?;
  Ok(HttpResponse::Created().json(ReplyDto::from(reply)))
}
