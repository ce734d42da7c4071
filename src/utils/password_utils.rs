use argon2::password_hash::rand_core::OsRng;
use argon2::password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use argon2::Argon2;
use eyre::eyre;
use color_eyre::Result;
use hmac::{Hmac, Mac};
use sha2::Sha256;

type HmacSha256 = Hmac<Sha256>;

// Argon2id with a random salt, stored as a PHC string so
// the params travel with the hash.
pub fn hash_password(password: &str) -> Result<String> {
  let salt = SaltString::generate(&mut OsRng);
  Argon2::default()
    .hash_password(password.as_bytes(), &salt)
    .map(|h| h.to_string())
    .map_err(|e| eyre!("Could not hash password - {}", e))
}

// A hash we can't even parse is treated as a failed
// verification rather than an error, there's nothing the
// person logging in can do about it anyway.
pub fn verify_password(password: &str, hash: &str) -> bool {
  match PasswordHash::new(hash) {
    Ok(parsed) => Argon2::default()
      .verify_password(password.as_bytes(), &parsed)
      .is_ok(),
    Err(_) => false
  }
}

// Plain secret comparison for the shared admin password.
// Both values go through the same MAC so the comparison
// runs in constant time and doesn't leak the length.
pub fn secret_matches(secret: &str, candidate: &str) -> bool {
  let mac_of = |value: &str| HmacSha256::new_from_slice(secret.as_bytes())
    .map(|mut mac| {
      mac.update(value.as_bytes());
      mac
    });
  match (mac_of(secret), mac_of(candidate)) {
    (Ok(expected), Ok(given)) => given
      .verify_slice(&expected.finalize().into_bytes())
      .is_ok(),
    _ => false
  }
}
