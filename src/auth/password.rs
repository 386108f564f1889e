use anyhow::Context;
use argon2::{
    password_hash::{self, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use rand::rngs::OsRng;
use tokio::task;
use tracing::error;

fn argon2_failure(stage: &'static str) -> impl FnOnce(password_hash::Error) -> anyhow::Error {
    move |e| {
        error!(error = %e, stage, "argon2 failure");
        anyhow::anyhow!("{stage}: {e}")
    }
}

/// Salted argon2 PHC string, as stored in a user's `password` field.
pub fn hash_password(plain: &str) -> anyhow::Result<String> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(plain.as_bytes(), &salt)
        .map(|phc| phc.to_string())
        .map_err(argon2_failure("hash password"))
}

/// `Ok(false)` on mismatch; `Err` only when the stored hash is unreadable.
pub fn verify_password(plain: &str, stored: &str) -> anyhow::Result<bool> {
    let parsed = PasswordHash::new(stored).map_err(argon2_failure("parse stored hash"))?;
    Ok(Argon2::default()
        .verify_password(plain.as_bytes(), &parsed)
        .is_ok())
}

/// Runs [`hash_password`] on the blocking pool so request workers stay free.
pub async fn hash_off_thread(plain: String) -> anyhow::Result<String> {
    task::spawn_blocking(move || hash_password(&plain))
        .await
        .context("password hashing task")?
}

/// Runs [`verify_password`] on the blocking pool.
pub async fn verify_off_thread(plain: String, stored: String) -> anyhow::Result<bool> {
    task::spawn_blocking(move || verify_password(&plain, &stored))
        .await
        .context("password verify task")?
}
