mod app;
mod config;
mod db;
mod scraping;
mod utils;
use color_eyre::Result;
use dotenv::dotenv;
use std::env;

// Everything actually happens in app::run(), this is
// only setting up logging and error reports.
#[actix_web::main]
async fn main() -> Result<()> {
  dotenv().ok();
  // Default log level is info, RUST_LOG overrides it.
  if env::var("RUST_LOG").is_err() {
    env::set_var("RUST_LOG", "info");
  }
  env_logger::init();
  color_eyre::install()?;

  app::run().await
}
