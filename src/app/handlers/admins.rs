use actix_web::{web, HttpResponse, Result};
use log::info;
use crate::db::entities::{AdminUpdate, NewAdmin};
use crate::utils::password_utils::hash_password;
use super::super::auth::SuperAdmin;
use super::super::dtos::*;
use super::super::error::{Error, map_db_error};
use super::super::AppState;
use super::is_blank;

// Everything in here is for super admins only.

fn admin_not_found() -> Error {
  Error::NotFound(String::from("Admin not found"))
}

fn hash(password: &str) -> Result<String, Error> {
  hash_password(password)
    .map_err(|e| Error::InternalServerError(e.to_string()))
}

pub async fn all_admins(
  _admin: SuperAdmin,
  app_state: web::Data<AppState>
) -> Result<HttpResponse, Error> {
  let admins = app_state.store.all_admins().map_err(map_db_error)?;
  Ok(HttpResponse::Ok().json(admins))
}

pub async fn admin(
  _admin: SuperAdmin,
  app_state: web::Data<AppState>,
  path: web::Path<(String,)>
) -> Result<HttpResponse, Error> {
  match app_state.store.admin_by_id(&path.into_inner().0).map_err(map_db_error)? {
    Some(admin) => Ok(HttpResponse::Ok().json(admin)),
    None => Err(admin_not_found())
  }
}

pub async fn create_admin(
  super_admin: SuperAdmin,
  app_state: web::Data<AppState>,
  body: web::Json<NewAdminBody>
) -> Result<HttpResponse, Error> {
  let body = body.into_inner();
  let username = body.username.trim().to_string();
  if username.is_empty() || is_blank(&body.password) {
    return Err(Error::BadRequest(String::from("Username and password are required")));
  }
  if app_state.store.admin_by_username(&username).map_err(map_db_error)?.is_some() {
    return Err(Error::BadRequest(String::from("Username already exists")));
  }
  let admin = app_state.store.insert_admin(NewAdmin {
    username,
    password: hash(&body.password)?,
    role: body.role.unwrap_or_default()
  }).map_err(map_db_error)?;
  info!(
    "{} created admin {} with role {}",
    super_admin.0.actor(), admin.username, admin.role
  );
  Ok(HttpResponse::Created().json(admin))
}

pub async fn update_admin(
  _admin: SuperAdmin,
  app_state: web::Data<AppState>,
  path: web::Path<(String,)>,
  body: web::Json<AdminUpdateBody>
) -> Result<HttpResponse, Error> {
  let id = path.into_inner().0;
  let body = body.into_inner();
  let username = body.username.map(|u| u.trim().to_string());
  if let Some(username) = &username {
    if username.is_empty() {
      return Err(Error::BadRequest(String::from("Username can't be empty")));
    }
    // Renaming to your own name is fine.
    if let Some(other) = app_state.store.admin_by_username(username).map_err(map_db_error)? {
      if other.id != id {
        return Err(Error::BadRequest(String::from("Username already exists")));
      }
    }
  }
  let password = match body.password {
    Some(p) if is_blank(&p) =>
      return Err(Error::BadRequest(String::from("Password can't be empty"))),
    Some(p) => Some(hash(&p)?),
    None => None
  };
  let update = AdminUpdate { username, password, role: body.role };
  match app_state.store.update_admin(&id, update).map_err(map_db_error)? {
    Some(admin) => Ok(HttpResponse::Ok().json(admin)),
    None => Err(admin_not_found())
  }
}

pub async fn delete_admin(
  super_admin: SuperAdmin,
  app_state: web::Data<AppState>,
  path: web::Path<(String,)>
) -> Result<HttpResponse, Error> {
  let id = path.into_inner().0;
  if app_state.store.delete_admin(&id).map_err(map_db_error)? {
    info!("{} deleted admin {}", super_admin.0.actor(), id);
    Ok(HttpResponse::Ok().json(SuccessDto::ok()))
  } else {
    Err(admin_not_found())
  }
}
