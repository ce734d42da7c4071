use actix_web::{web, HttpResponse, Result};
use log::{info, warn};
use crate::db::entities::AdminRole;
use crate::utils::password_utils::{secret_matches, verify_password};
use super::super::auth::issue_token;
use super::super::dtos::*;
use super::super::error::{Error, map_db_error};
use super::super::{AppState, Limiter};
use super::check_rate_limit;

/**
 * Two ways to log in:
 * - username and password of an admin account
 * - the shared admin password alone, which makes you
 *   a super admin. Closed when no admin password is
 *   configured.
 */
pub async fn login(
  app_state: web::Data<AppState>,
  body: web::Json<LoginBody>
) -> Result<HttpResponse, Error> {
  check_rate_limit(&app_state, Limiter::Login)?;
  let body = body.into_inner();
  let username = body.username
    .map(|u| u.trim().to_string())
    .filter(|u| !u.is_empty());
  let password = body.password
    .filter(|p| !p.is_empty())
    .ok_or_else(|| Error::BadRequest(String::from("Password is required")))?;

  let response = match username {
    Some(username) => {
      let admin = app_state.store
        .admin_by_username(&username)
        .map_err(map_db_error)?
        .filter(|a| verify_password(&password, &a.password))
        .ok_or_else(|| {
          warn!("Failed login attempt for {}", username);
          Error::Unauthorized(String::from("Invalid credentials"))
        })?;
      let token = issue_token(
        &app_state.auth,
        Some(admin.id.clone()),
        Some(admin.username.clone()),
        admin.role
      )?;
      info!("Admin {} logged in", admin.username);
      LoginResponse {
        token,
        admin: AdminInfo {
          id: Some(admin.id),
          username: Some(admin.username),
          role: admin.role
        }
      }
    },
    None => {
      let valid = app_state.auth.admin_password.as_deref()
        .map_or(false, |secret| secret_matches(secret, &password));
      if !valid {
        warn!("Failed password-only login attempt");
        return Err(Error::Unauthorized(String::from("Invalid password")));
      }
      let token = issue_token(&app_state.auth, None, None, AdminRole::SuperAdmin)?;
      info!("Logged in with the admin password");
      LoginResponse {
        token,
        admin: AdminInfo { id: None, username: None, role: AdminRole::SuperAdmin }
      }
    }
  };
  Ok(HttpResponse::Ok().json(response))
}
