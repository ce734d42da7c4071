use actix_web::{web, HttpResponse, Result};
use super::super::auth::AuthedAdmin;
use super::super::dtos::*;
use super::super::error::{Error, map_db_error};
use super::super::AppState;

const RECENT_POSTS: usize = 5;

// Dashboard home numbers. There's no comment count in the
// stores so we go through every post, the blog isn't big
// enough for this to matter.
pub async fn stats(
  _admin: AuthedAdmin,
  app_state: web::Data<AppState>
) -> Result<HttpResponse, Error> {
  let posts = app_state.store.all_posts().map_err(map_db_error)?;
  let mut total_comments = 0;
  for post in &posts {
    total_comments += app_state.store
      .comments_by_post(&post.id)
      .map_err(map_db_error)?
      .len();
  }
  let stats = StatsDto {
    total_posts: posts.len(),
    total_comments,
    total_views: posts.iter().map(|p| p.views).sum(),
    recent_posts: posts.into_iter()
      .take(RECENT_POSTS)
      .map(PostDto::from)
      .collect()
  };
  Ok(HttpResponse::Ok().json(stats))
}
