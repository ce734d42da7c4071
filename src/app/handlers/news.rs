use actix_web::{web, HttpResponse, Result};
use crate::db::entities::{NewNews, NewsUpdate};
use super::super::auth::AuthedAdmin;
use super::super::dtos::*;
use super::super::error::{Error, map_db_error};
use super::super::AppState;
use super::is_blank;

fn news_not_found() -> Error {
  Error::NotFound(String::from("News not found"))
}

pub async fn all_news(
  app_state: web::Data<AppState>
) -> Result<HttpResponse, Error> {
  let news = app_state.store.all_news().map_err(map_db_error)?;
  Ok(HttpResponse::Ok().json(news))
}

pub async fn news_item(
  app_state: web::Data<AppState>,
  path: web::Path<(String,)>
) -> Result<HttpResponse, Error> {
  match app_state.store.news_by_id(&path.into_inner().0).map_err(map_db_error)? {
    Some(news) => Ok(HttpResponse::Ok().json(news)),
    None => Err(news_not_found())
  }
}

pub async fn create_news(
  _admin: AuthedAdmin,
  app_state: web::Data<AppState>,
  body: web::Json<NewNewsBody>
) -> Result<HttpResponse, Error> {
  let body = body.into_inner();
  if is_blank(&body.title) || is_blank(&body.content) {
    return Err(Error::BadRequest(String::from("Title and content are required")));
  }
  let news = app_state.store
    .insert_news(NewNews::from(body))
    .map_err(map_db_error)?;
  Ok(HttpResponse::Created().json(news))
}

pub async fn update_news(
  _admin: AuthedAdmin,
  app_state: web::Data<AppState>,
  path: web::Path<(String,)>,
  body: web::Json<NewsUpdateBody>
) -> Result<HttpResponse, Error> {
  let update: NewsUpdate = body.into_inner().into();
  if update.title.as_deref().map_or(false, is_blank) {
    return Err(Error::BadRequest(String::from("Title can't be empty")));
  }
  match app_state.store.update_news(&path.into_inner().0, update).map_err(map_db_error)? {
    Some(news) => Ok(HttpResponse::Ok().json(news)),
    None => Err(news_not_found())
  }
}

pub async fn delete_news(
  _admin: AuthedAdmin,
  app_state: web::Data<AppState>,
  path: web::Path<(String,)>
) -> Result<HttpResponse, Error> {
  if app_state.store.delete_news(&path.into_inner().0).map_err(map_db_error)? {
    Ok(HttpResponse::Ok().json(SuccessDto::ok()))
  } else {
    Err(news_not_found())
  }
}
