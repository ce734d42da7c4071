use actix_web::{web, HttpResponse, Result};
use super::super::error::{Error, map_db_error};
use super::super::AppState;

pub async fn mercenaries(
  app_state: web::Data<AppState>
) -> Result<HttpResponse, Error> {
  let mercenaries = app_state.store.all_mercenaries().map_err(map_db_error)?;
  Ok(HttpResponse::Ok().json(mercenaries))
}
