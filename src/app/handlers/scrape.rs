use actix_web::{web, HttpResponse, Result};
use super::super::auth::AuthedAdmin;
use super::super::dtos::*;
use super::super::error::Error;
use super::super::scrape_import::{import_events, import_news};
use super::super::AppState;

// The bodies are optional, posting nothing at all means
// "scrape the default pages". A body we can't read counts
// as nothing.

pub async fn scrape_events(
  _admin: AuthedAdmin,
  app_state: web::Data<AppState>,
  body: Option<web::Json<ScrapeEventsBody>>
) -> Result<HttpResponse, Error> {
  let service = &app_state.scrape_service;
  let _lock = service.lock()?;
  let selected = body.and_then(|b| b.into_inner().selected_items)
    .filter(|items| !items.is_empty());
  let items = match selected {
    Some(items) => items,
    None => service.scrape_events().await
  };
  let result = import_events(app_state.store.as_ref(), items)?;
  Ok(HttpResponse::Ok().json(ScrapeEventsDto {
    success: true,
    count: result.created.len(),
    skipped: result.skipped,
    events: result.created
  }))
}

pub async fn scrape_news(
  _admin: AuthedAdmin,
  app_state: web::Data<AppState>,
  body: Option<web::Json<ScrapeNewsBody>>
) -> Result<HttpResponse, Error> {
  let service = &app_state.scrape_service;
  let _lock = service.lock()?;
  let body = body.map(|b| b.into_inner()).unwrap_or_default();
  let items = match body.selected_items.filter(|items| !items.is_empty()) {
    Some(items) => items,
    None => {
      let url = body.url.as_deref().map(str::trim).filter(|u| !u.is_empty());
      service.scrape_news(url).await
    }
  };
  let result = import_news(app_state.store.as_ref(), items)?;
  Ok(HttpResponse::Ok().json(ScrapeNewsDto {
    success: true,
    count: result.created.len(),
    skipped: result.skipped,
    news: result.created
  }))
}

// Previews don't save anything, the dashboard sends the
// items it wants back as selectedItems.
pub async fn preview_events(
  _admin: AuthedAdmin,
  app_state: web::Data<AppState>
) -> Result<HttpResponse, Error> {
  let events = app_state.scrape_service.scrape_events().await;
  Ok(HttpResponse::Ok().json(EventsPreviewDto {
    count: events.len(),
    events
  }))
}

pub async fn preview_news(
  _admin: AuthedAdmin,
  app_state: web::Data<AppState>,
  query: web::Query<PreviewNewsQuery>
) -> Result<HttpResponse, Error> {
  let url = query.url.as_deref().map(str::trim).filter(|u| !u.is_empty());
  let news = app_state.scrape_service.scrape_news(url).await;
  Ok(HttpResponse::Ok().json(NewsPreviewDto {
    count: news.len(),
    news
  }))
}
