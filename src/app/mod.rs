use actix_cors::Cors;
use actix_web::{middleware, web, App, HttpServer};
use color_eyre::Result;
use eyre::{WrapErr, eyre};
use log::{debug, error, info, warn};
use rate_limiter::BasicRateLimiter;
use scrape_import::ScrapeService;
use image_host::ImageHost;
use auth::AuthSettings;
use error::Error;
use std::sync::RwLock;
// I think we have to add crate here because
// of the other crate named "config" that we
// use as a dependency.
use crate::config::{Config, ScraperSettings};
use crate::db::{self, StorageBackend, Store};
mod auth;
mod dtos;
mod error;
mod handlers;
mod helpers;
mod image_host;
mod rate_limiter;
mod scrape_import;

// Post bodies carry whole articles, the actix default
// of 32 KB is too small.
const JSON_BODY_LIMIT: usize = 2 * 1024 * 1024;

// Declare app state struct:
pub struct AppState {
  pub store: Box<dyn Store>,
  pub auth: AuthSettings,
  pub login_limiter: RwLock<BasicRateLimiter>,
  pub forms_limiter: RwLock<BasicRateLimiter>,
  pub scrape_service: ScrapeService,
  pub image_host: ImageHost
}

// Login gets its own limiter so spam on the public forms
// doesn't lock the admins out.
#[derive(Debug, Clone, Copy)]
pub enum Limiter {
  Login,
  Forms
}

// This shouldn't be that weird I'm sorry. These functions
// could be moved elsewhere to not be directly in AppState.
impl AppState {

  fn rate_limiter(&self, limiter: Limiter) -> &RwLock<BasicRateLimiter> {
    match limiter {
      Limiter::Login => &self.login_limiter,
      Limiter::Forms => &self.forms_limiter
    }
  }

  // Returns true when we're currently rate limited.
  pub fn check_rate_limit(&self, limiter: Limiter) -> bool {
    let rate_limiter = self.rate_limiter(limiter);
    let (needs_update, is_locked) = Self::rate_limiter_needs_update(rate_limiter);
    if needs_update {
      // Get a lock on the rate limiter:
      match rate_limiter.write() {
        Ok(mut rl) => return rl.update(),
        Err(e) => {
          error!("Could not get a write handle on the \
          rate limiter, SHOULD NEVER HAPPEN - {}", e);
        }
      }
    }
    is_locked
  }

  // Returns tuple: "needs update" first, then the current
  // is_locked value.
  fn rate_limiter_needs_update(rate_limiter: &RwLock<BasicRateLimiter>) -> (bool, bool) {
    match rate_limiter.read() {
      Ok(rl) => (
        !rl.is_locked() || rl.is_expired(),
        rl.is_locked()
      ),
      Err(e) => {
        // I decided to ignore possible weird rate limiter lock
        // errors which should never happen.
        error!("Could not get a read handle on the rate limiter - \
          SHOULD NEVER HAPPEN - {}", e);
        (false, false)
      }
    }
  }

}

fn new_rate_limiter(config: &Config) -> BasicRateLimiter {
  BasicRateLimiter::new(
    config.rl_max_requests,
    config.rl_max_requests_time,
    config.rl_block_duration
  )
}

// Function to start the server.
// Has to be async because there should be a .await at the end.
pub async fn run() -> Result<()> {
  let config = Config::from_env()
    .context("Configuration (environment or .env file) is missing")?;
  // Not printing the whole config, it has secrets in it.
  debug!(
    "Current config: bind {}, storage {}, db {}",
    config.bind_address, config.storage_backend, config.db_path
  );

  // No default signing key, tokens signed with a key that
  // ships with the source aren't worth anything.
  let jwt_secret = config.jwt_secret.clone()
    .filter(|s| !s.trim().is_empty())
    .ok_or_else(|| eyre!("JWT_SECRET has to be set, refusing to start"))?;
  if config.admin_password.is_none() {
    warn!("ADMIN_PASSWORD is not set, password-only login is disabled");
  }

  let store = db::open_store(
    StorageBackend::from_config(&config.storage_backend, &config.db_path)?
  ).context("Opening the store")?;

  let client = helpers::build_http_client(config.http_timeout_secs)?;
  let bind_address = config.bind_address.clone();
  let allowed_origin = config.allowed_origin.clone();

  let app_state = web::Data::new(
    AppState {
      store,
      auth: AuthSettings {
        jwt_secret,
        admin_password: config.admin_password.clone(),
        token_ttl_days: config.token_ttl_days
      },
      login_limiter: RwLock::new(new_rate_limiter(&config)),
      forms_limiter: RwLock::new(new_rate_limiter(&config)),
      scrape_service: ScrapeService::new(client.clone(), ScraperSettings::from(&config)),
      image_host: ImageHost::new(client, &config.image_host_url)
    }
  );

  info!("Starting server on {}", bind_address);
  HttpServer::new(move|| {
    // The dashboard and the reader site are served from
    // elsewhere, anything goes when no origin is configured.
    let cors = match &allowed_origin {
      Some(origin) => Cors::default()
        .allowed_origin(origin)
        .allow_any_method()
        .allow_any_header()
        .max_age(3600),
      None => Cors::permissive()
    };
    App::new()
      .app_data(app_state.clone())
      .wrap(cors)
      .wrap(middleware::Logger::default())
      .configure(api_config)
  })
  .bind(bind_address)?
  .run()
  .await
  .context("Start Actix web server")

}

// Route configuration, also used by the handler tests.
pub fn api_config(cfg: &mut web::ServiceConfig) {
  cfg.app_data(web::JsonConfig::default()
      .limit(JSON_BODY_LIMIT)
      .error_handler(|e, _| {
        Error::BadRequest(format!("Invalid request body - {}", e)).into()
      }))
    .app_data(web::PathConfig::default().error_handler(|_, _| {
      Error::BadRequest(String::from("Invalid path arguments")).into()
    }))
    .app_data(web::QueryConfig::default().error_handler(|_, _| {
      Error::BadRequest(String::from("Invalid query string arguments")).into()
    }))
    .service(
      web::scope("/api")
        .route("/auth/login", web::post().to(handlers::login))
        .route("/posts", web::get().to(handlers::all_posts))
        .route("/posts", web::post().to(handlers::create_post))
        .route("/posts/{id}", web::get().to(handlers::post))
        .route("/posts/{id}", web::patch().to(handlers::update_post))
        .route("/posts/{id}", web::delete().to(handlers::delete_post))
        .route("/posts/{id}/comments", web::get().to(handlers::comments))
        .route("/posts/{id}/comments", web::post().to(handlers::post_comment))
        .route("/events", web::get().to(handlers::all_events))
        .route("/events", web::post().to(handlers::create_event))
        .route("/events/{id}", web::get().to(handlers::event))
        .route("/events/{id}", web::patch().to(handlers::update_event))
        .route("/events/{id}", web::delete().to(handlers::delete_event))
        .route("/news", web::get().to(handlers::all_news))
        .route("/news", web::post().to(handlers::create_news))
        .route("/news/{id}", web::get().to(handlers::news_item))
        .route("/news/{id}", web::patch().to(handlers::update_news))
        .route("/news/{id}", web::delete().to(handlers::delete_news))
        .route("/mercenaries", web::get().to(handlers::mercenaries))
        .route("/stats", web::get().to(handlers::stats))
        .route("/tickets", web::get().to(handlers::all_tickets))
        .route("/tickets", web::post().to(handlers::create_ticket))
        .route("/tickets/my/{email}", web::get().to(handlers::my_tickets))
        .route("/tickets/{id}", web::get().to(handlers::ticket))
        .route("/tickets/{id}", web::patch().to(handlers::update_ticket))
        .route("/tickets/{id}", web::delete().to(handlers::delete_ticket))
        .route("/tickets/{id}/replies", web::get().to(handlers::replies))
        .route("/tickets/{id}/replies", web::post().to(handlers::post_reply))
        .route("/admins", web::get().to(handlers::all_admins))
        .route("/admins", web::post().to(handlers::create_admin))
        .route("/admins/{id}", web::get().to(handlers::admin))
        .route("/admins/{id}", web::patch().to(handlers::update_admin))
        .route("/admins/{id}", web::delete().to(handlers::delete_admin))
        .route("/newsletter-subscribers", web::get().to(handlers::subscribers))
        .route("/newsletter-subscribe", web::post().to(handlers::subscribe))
        .route("/newsletter-subscribers/{id}", web::delete().to(handlers::delete_subscriber))
        .route("/upload-image", web::post().to(handlers::upload_image))
        .route("/scrape/events", web::post().to(handlers::scrape_events))
        .route("/scrape/news", web::post().to(handlers::scrape_news))
        .route("/scrape/preview/events", web::get().to(handlers::preview_events))
        .route("/scrape/preview/news", web::get().to(handlers::preview_news))
    )
    .default_service(web::route().to(handlers::not_found));
}
