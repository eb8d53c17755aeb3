use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Algorithm, Argon2, Params, Version,
};

/// Argon2id with OWASP-recommended parameters:
/// m=19456 KiB (19 MiB), t=2 iterations, p=1 parallelism
fn hasher() -> Argon2<'static> {
    let params = Params::new(19456, 2, 1, None).expect("valid Argon2 params");
    Argon2::new(Algorithm::Argon2id, Version::V0x13, params)
}

/// Hash a player password, returning a PHC-formatted string for storage.
///
/// CPU-intensive and blocking -- call through `tokio::task::spawn_blocking()`
/// from request handlers.
pub fn hash_password(password: &str) -> Result<String, argon2::password_hash::Error> {
    let salt = SaltString::generate(&mut OsRng);
    let hash = hasher().hash_password(password.as_bytes(), &salt)?;
    Ok(hash.to_string())
}

/// Verify a password against a stored PHC hash. `Ok(false)` means the
/// password simply did not match; `Err` means the stored hash is malformed.
/// Blocking like [`hash_password`].
pub fn verify_password(password: &str, hash: &str) -> Result<bool, argon2::password_hash::Error> {
    let parsed = PasswordHash::new(hash)?;
    match hasher().verify_password(password.as_bytes(), &parsed) {
        Ok(()) => Ok(true),
        Err(argon2::password_hash::Error::Password) => Ok(false),
        Err(e) => Err(e),
    }
}
