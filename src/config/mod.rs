// Adding the context method to errors:
use eyre::WrapErr;
use color_eyre::Result;
use serde::Deserialize;
use std::convert::From;

#[derive(Debug, Deserialize)]
pub struct Config {
  pub bind_address: String,
  // "sqlite" or "memory":
  pub storage_backend: String,
  pub db_path: String,
  // There is no default for the signing secret on
  // purpose. The server refuses to start without it.
  pub jwt_secret: Option<String>,
  // Password-only login is disabled when this is
  // missing.
  pub admin_password: Option<String>,
  pub token_ttl_days: i64,
  // Permissive CORS when absent:
  pub allowed_origin: Option<String>,
  pub image_host_url: String,
  pub http_timeout_secs: u64,
  // Scraper settings:
  pub scraper_events_url: String,
  pub scraper_forum_url: String,
  pub scraper_forum_base: String,
  pub scraper_image_base: String,
  // Rate limiter settings:
  pub rl_max_requests: u32,
  pub rl_max_requests_time: u32,
  pub rl_block_duration: u32
}

// Only what the scraper needs, so that we don't move
// the secrets around with it.
#[derive(Debug, Clone)]
pub struct ScraperSettings {
  pub events_url: String,
  pub forum_url: String,
  pub forum_base: String,
  pub image_base: String
}

impl From<&Config> for ScraperSettings {
  fn from(config: &Config) -> Self {
    Self {
      events_url: config.scraper_events_url.clone(),
      forum_url: config.scraper_forum_url.clone(),
      forum_base: config.scraper_forum_base.clone(),
      image_base: config.scraper_image_base.clone()
    }
  }
}

impl Config {

  pub fn from_env() -> Result<Config> {
    // RUST_LOG is already set in main.rs if it
    // was absent.
    // You have to use lowercase when compared to
    // what's in the .env file.
    let c = config::Config::builder()
      .set_default("bind_address", "127.0.0.1:5000")?
      .set_default("storage_backend", "sqlite")?
      .set_default("db_path", "./gamenews.sqlite")?
      .set_default("token_ttl_days", 7)?
      .set_default("image_host_url", "https://catbox.moe/user/api.php")?
      .set_default("http_timeout_secs", 20)?
      .set_default("scraper_events_url", "https://crossfire.z8games.com/events.html")?
      .set_default(
        "scraper_forum_url",
        "https://forum.z8games.com/categories/crossfire-announcements"
      )?
      // Bases should never have a trailing slash.
      .set_default("scraper_forum_base", "https://forum.z8games.com")?
      .set_default("scraper_image_base", "https://z8games.akamaized.net")?
      .set_default("rl_max_requests", 120)?
      .set_default("rl_max_requests_time", 60)?
      .set_default("rl_block_duration", 60)?
      .add_source(config::Environment::default())
      .build()
      .context("Reading configuration from env")?;
    c.try_deserialize()
      .context("Loading configuration from env")
  }

}
