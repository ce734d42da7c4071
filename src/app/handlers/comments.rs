use actix_web::{web, HttpResponse, Result};
use crate::db::entities::NewComment;
use crate::utils::text_utils::truncate_utf8;
use super::super::dtos::*;
use super::super::error::{Error, map_db_error};
use super::super::{AppState, Limiter};
use super::{check_rate_limit, is_blank};

const MAX_COMMENT_LENGTH: usize = 2000;
const MAX_AUTHOR_LENGTH: usize = 70;

pub async fn comments(
  app_state: web::Data<AppState>,
  path: web::Path<(String,)>
) -> Result<HttpResponse, Error> {
  let comments = app_state.store
    .comments_by_post(&path.into_inner().0)
    .map_err(map_db_error)?;
  let dtos: Vec<CommentDto> = comments.into_iter().map(CommentDto::from).collect();
  Ok(HttpResponse::Ok().json(dtos))
}

// Anyone can comment, which is why there's a rate limit.
// Replies have to point to a comment of the same post.
pub async fn post_comment(
  app_state: web::Data<AppState>,
  path: web::Path<(String,)>,
  body: web::Json<CommentBody>
) -> Result<HttpResponse, Error> {
  check_rate_limit(&app_state, Limiter::Forms)?;
  let post_id = path.into_inner().0;
  let body = body.into_inner();
  if is_blank(&body.author) || is_blank(&body.content) {
    return Err(Error::BadRequest(String::from("Author and content are required")));
  }
  if app_state.store.post_by_id(&post_id).map_err(map_db_error)?.is_none() {
    return Err(Error::NotFound(String::from("Post not found")));
  }
  let parent_comment_id = match body.parent_comment_id.filter(|p| !is_blank(p)) {
    Some(parent) => {
      let siblings = app_state.store.comments_by_post(&post_id).map_err(map_db_error)?;
      if !siblings.iter().any(|c| c.id == parent) {
        return Err(Error::BadRequest(String::from("Parent comment not found")));
      }
      Some(parent)
    },
    None => None
  };
  let mut name = body.author.trim().to_string();
  truncate_utf8(&mut name, MAX_AUTHOR_LENGTH);
  let mut content = body.content.trim().to_string();
  truncate_utf8(&mut content, MAX_COMMENT_LENGTH);
  let comment = app_state.store.insert_comment(NewComment {
    post_id,
    parent_comment_id,
    name,
    content
  }).map_err(map_db_error)?;
  Ok(HttpResponse::Created().json(CommentDto::from(comment)))
}
