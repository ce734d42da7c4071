use actix_web::{web, HttpResponse, Result};
use crate::db::entities::*;
use crate::utils::serde_utils::empty_string_to_none;
use crate::utils::text_utils::{calculate_reading_time, generate_summary, DEFAULT_SUMMARY_LENGTH};
use super::super::auth::AuthedAdmin;
use super::super::dtos::*;
use super::super::error::{Error, map_db_error};
use super::super::AppState;
use super::is_blank;

fn post_not_found() -> Error {
  Error::NotFound(String::from("Post not found"))
}

// "all" or nothing means no filter. Category is an exact
// match ignoring case, search looks for a substring in the
// text fields and the tags.
fn matches_filters(post: &Post, query: &PostsQuery) -> bool {
  if let Some(category) = query.category.as_deref().map(str::trim) {
    if !category.is_empty()
      && !category.eq_ignore_ascii_case("all")
      && !post.category.to_string().eq_ignore_ascii_case(category) {
      return false;
    }
  }
  if query.featured.as_deref() == Some("true") && !post.featured {
    return false;
  }
  if let Some(search) = query.search.as_deref().map(str::trim) {
    if !search.is_empty() {
      let term = search.to_lowercase();
      let found = post.title.to_lowercase().contains(&term)
        || post.summary.to_lowercase().contains(&term)
        || post.content.to_lowercase().contains(&term)
        || post.tags.iter().any(|t| t.to_lowercase().contains(&term));
      if !found {
        return false;
      }
    }
  }
  true
}

pub async fn all_posts(
  app_state: web::Data<AppState>,
  query: web::Query<PostsQuery>
) -> Result<HttpResponse, Error> {
  let posts = app_state.store.all_posts().map_err(map_db_error)?;
  let dtos: Vec<PostDto> = posts.into_iter()
    .filter(|p| matches_filters(p, &query))
    .map(PostDto::from)
    .collect();
  Ok(HttpResponse::Ok().json(dtos))
}

// Reading a post counts as a view, the response already
// includes it.
pub async fn post(
  app_state: web::Data<AppState>,
  path: web::Path<(String,)>
) -> Result<HttpResponse, Error> {
  let id = path.into_inner().0;
  app_state.store.increment_post_views(&id).map_err(map_db_error)?;
  match app_state.store.post_by_id(&id).map_err(map_db_error)? {
    Some(post) => Ok(HttpResponse::Ok().json(PostDto::from(post))),
    None => Err(post_not_found())
  }
}

pub async fn create_post(
  _admin: AuthedAdmin,
  app_state: web::Data<AppState>,
  body: web::Json<NewPostBody>
) -> Result<HttpResponse, Error> {
  let body = body.into_inner();
  if is_blank(&body.title) || is_blank(&body.content) {
    return Err(Error::BadRequest(String::from("Title and content are required")));
  }
  let summary = empty_string_to_none(body.summary)
    .unwrap_or_else(|| generate_summary(&body.content, DEFAULT_SUMMARY_LENGTH));
  let reading_time = body.reading_time
    .filter(|r| *r > 0)
    .unwrap_or_else(|| calculate_reading_time(&body.content));
  let post = app_state.store.insert_post(NewPost {
    title: body.title,
    content: body.content,
    summary,
    image: body.image,
    category: body.category,
    tags: body.tags,
    author: body.author,
    reading_time,
    featured: body.featured
  }).map_err(map_db_error)?;
  Ok(HttpResponse::Created().json(PostDto::from(post)))
}

// New content means the old summary and reading time are
// probably wrong, unless the request gives new ones too.
pub async fn update_post(
  _admin: AuthedAdmin,
  app_state: web::Data<AppState>,
  path: web::Path<(String,)>,
  body: web::Json<PostUpdateBody>
) -> Result<HttpResponse, Error> {
  let mut update: PostUpdate = body.into_inner().into();
  if update.title.as_deref().map_or(false, is_blank)
    || update.content.as_deref().map_or(false, is_blank) {
    return Err(Error::BadRequest(String::from("Title and content can't be empty")));
  }
  if let Some(content) = &update.content {
    if update.reading_time.is_none() {
      update.reading_time = Some(calculate_reading_time(content));
    }
    if update.summary.is_none() {
      update.summary = Some(generate_summary(content, DEFAULT_SUMMARY_LENGTH));
    }
  }
  let id = path.into_inner().0;
  match app_state.store.update_post(&id, update).map_err(map_db_error)? {
    Some(post) => Ok(HttpResponse::Ok().json(PostDto::from(post))),
    None => Err(post_not_found())
  }
}

pub async fn delete_post(
  _admin: AuthedAdmin,
  app_state: web::Data<AppState>,
  path: web::Path<(String,)>
) -> Result<HttpResponse, Error> {
  if app_state.store.delete_post(&path.into_inner().0).map_err(map_db_error)? {
    Ok(HttpResponse::Ok().json(SuccessDto::ok()))
  } else {
    Err(post_not_found())
  }
}
