// Only the stores are used in here, the rest of db and
// config is for the server.
#![allow(dead_code)]
mod config;
mod db;
mod utils;

use std::env;
use color_eyre::Result;
use eyre::{eyre, WrapErr};
use dotenv::dotenv;
use log::info;
use getopts::Options;
use crate::config::Config;
use crate::db::entities::{AdminRole, NewAdmin};
use crate::db::{SqliteStore, Store};
use crate::utils::password_utils::hash_password;

// Copy pasted this from getopts doc.
fn print_usage(program: &str, opts: Options) {
  let brief = format!("Usage: {} -u USERNAME -p PASSWORD [options]", program);
  print!("{}", opts.usage(&brief));
}

/**
 * Binary used to create admin accounts directly in the
 * SQLite database, mostly to get the first super admin
 * in there. Uses the same DB_PATH as the server.
 */
fn main() -> Result<()> {
  dotenv().ok();
  if env::var("RUST_LOG").is_err() {
    env::set_var("RUST_LOG", "info");
  }
  env_logger::init();
  color_eyre::install()?;

  let args: Vec<String> = env::args().collect();
  let program = args[0].clone();
  let mut opts = Options::new();
  opts.optopt("u", "username", "Username of the new admin", "USERNAME");
  opts.optopt("p", "password", "Password of the new admin", "PASSWORD");
  opts.optopt("r", "role", "admin or super_admin (default)", "ROLE");
  opts.optflag("h", "help", "Program usage");
  let opt_matches = opts.parse(&args[1..])?;
  if opt_matches.opt_present("h") {
    print_usage(&program, opts);
    return Ok(());
  }

  let (username, password) = match (opt_matches.opt_str("u"), opt_matches.opt_str("p")) {
    (Some(u), Some(p)) if !u.trim().is_empty() && !p.is_empty() => (u.trim().to_string(), p),
    _ => {
      print_usage(&program, opts);
      return Err(eyre!("Username and password are both required"));
    }
  };
  let role = match opt_matches.opt_str("r") {
    Some(r) => r.parse::<AdminRole>()?,
    None => AdminRole::SuperAdmin
  };

  let config = Config::from_env()
    .context("Configuration (environment or .env file) is missing")?;
  let store = SqliteStore::open(&config.db_path)?;
  if store.admin_by_username(&username)?.is_some() {
    return Err(eyre!("An admin named {} already exists", username));
  }
  let admin = store.insert_admin(NewAdmin {
    username,
    password: hash_password(&password)?,
    role
  })?;
  info!("Created {} ({}) in {}", admin.username, admin.role, config.db_path);

  Ok(())
}
