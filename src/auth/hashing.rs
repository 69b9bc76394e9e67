use argon2::password_hash::{self, rand_core::OsRng, SaltString};
use argon2::{Algorithm, Argon2, Params, PasswordHash, PasswordHasher, PasswordVerifier, Version};

use crate::errors::{Error, Result};

const PARALLELISM: u32 = 1;

/// Argon2id hasher for new password hashes.
///
/// Verification never uses these parameters: a stored PHC string carries its
/// own, so raising the cost later does not lock out existing users.
pub fn password_hasher(memory_kib: u32, iterations: u32) -> Result<Argon2<'static>> {
    let params = Params::new(memory_kib, iterations, PARALLELISM, None).map_err(|e| {
        Error::config(format!(
            "Invalid Argon2 parameters (memory {memory_kib} KiB, {iterations} iterations): {e}"
        ))
    })?;
    Ok(Argon2::new(Algorithm::Argon2id, Version::V0x13, params))
}

/// Hash a password into a PHC string with a fresh random salt.
pub fn hash_password(hasher: &Argon2<'_>, password: &str) -> Result<String> {
    let salt = SaltString::generate(&mut OsRng);
    hasher
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| Error::internal(format!("Failed to hash password: {e}")))
}

/// Constant-time check of `password` against a stored PHC string.
///
/// `Ok(false)` means the password does not match; an unparseable hash is an
/// internal error rather than a mismatch.
pub fn verify_password(password: &str, hash: &str) -> Result<bool> {
    let parsed = PasswordHash::new(hash)
        .map_err(|e| Error::internal(format!("Stored password hash is invalid: {e}")))?;

    match Argon2::default().verify_password(password.as_bytes(), &parsed) {
        Ok(()) => Ok(true),
        Err(password_hash::Error::Password) => Ok(false),
        Err(e) => Err(Error::internal(format!("Password verification failed: {e}"))),
    }
}
