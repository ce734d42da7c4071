use actix_web::{dev::Payload, web, FromRequest, HttpRequest};
use chrono::{Duration, Utc};
use futures::future::{ready, Ready};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use log::{debug, error};
use serde::{Deserialize, Serialize};
use crate::db::entities::AdminRole;
use super::error::Error;
use super::helpers::bearer_token;
use super::AppState;

// What the app needs to know to log people in and check
// their tokens. There is no default secret, run() fails
// before we ever get one of these without it.
#[derive(Debug, Clone)]
pub struct AuthSettings {
  pub jwt_secret: String,
  pub admin_password: Option<String>,
  pub token_ttl_days: i64
}

// Password-only logins (the shared admin secret) have
// no id or username.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Claims {
  #[serde(skip_serializing_if = "Option::is_none")]
  pub sub: Option<String>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub username: Option<String>,
  pub role: AdminRole,
  pub exp: i64,
  pub iat: i64
}

impl Claims {
  pub fn is_super_admin(&self) -> bool {
    self.role == AdminRole::SuperAdmin
  }

  // For the logs. Tokens from the shared password have
  // no username.
  pub fn actor(&self) -> &str {
    self.username.as_deref().unwrap_or("admin password")
  }
}

pub fn issue_token(
  settings: &AuthSettings,
  sub: Option<String>,
  username: Option<String>,
  role: AdminRole
) -> Result<String, Error> {
  let now = Utc::now();
  let claims = Claims {
    sub,
    username,
    role,
    iat: now.timestamp(),
    exp: (now + Duration::days(settings.token_ttl_days)).timestamp()
  };
  encode_claims(&settings.jwt_secret, &claims)
}

fn encode_claims(secret: &str, claims: &Claims) -> Result<String, Error> {
  encode(
    &Header::default(),
    claims,
    &EncodingKey::from_secret(secret.as_bytes())
  ).map_err(|e| {
    error!("Could not sign token - {}", e);
    Error::InternalServerError(String::from("Could not create token"))
  })
}

// HS256 and expiry are checked by the default Validation.
pub fn verify_token(settings: &AuthSettings, token: &str) -> Option<Claims> {
  decode::<Claims>(
    token,
    &DecodingKey::from_secret(settings.jwt_secret.as_bytes()),
    &Validation::default()
  )
    .map(|data| data.claims)
    .map_err(|e| debug!("Rejected token - {}", e))
    .ok()
}

fn claims_from_request(req: &HttpRequest) -> Result<Claims, Error> {
  let app_state = req.app_data::<web::Data<AppState>>()
    .ok_or_else(|| {
      error!("App state missing when checking a token - SHOULD NEVER HAPPEN");
      Error::InternalServerError(String::from("Server misconfigured"))
    })?;
  let token = bearer_token(req)
    .ok_or_else(|| Error::Unauthorized(String::from("Authentication required")))?;
  verify_token(&app_state.auth, &token)
    .ok_or_else(|| Error::Unauthorized(String::from("Invalid or expired token")))
}

/**
 * Put one of these in a handler's arguments and the
 * handler only runs for requests carrying a valid admin
 * token. Everything else gets a 401.
 *
 * Wrap it in an Option when the token is a bonus and
 * not a requirement, actix gives None instead of failing
 * the request.
 */
#[derive(Debug)]
pub struct AuthedAdmin(pub Claims);

impl FromRequest for AuthedAdmin {
  type Error = Error;
  type Future = Ready<Result<Self, Self::Error>>;

  fn from_request(req: &HttpRequest, _: &mut Payload) -> Self::Future {
    ready(claims_from_request(req).map(AuthedAdmin))
  }
}

// Same as AuthedAdmin but the role has to be super_admin,
// a valid token with any other role is a 403.
#[derive(Debug)]
pub struct SuperAdmin(pub Claims);

impl FromRequest for SuperAdmin {
  type Error = Error;
  type Future = Ready<Result<Self, Self::Error>>;

  fn from_request(req: &HttpRequest, _: &mut Payload) -> Self::Future {
    let result = claims_from_request(req).and_then(|claims| {
      if claims.is_super_admin() {
        Ok(SuperAdmin(claims))
      } else {
        Err(Error::Forbidden(String::from("Super admin access required")))
      }
    });
    ready(result)
  }
}
