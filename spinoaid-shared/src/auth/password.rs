/// Credential hashing with Argon2id
///
/// Passwords are stored as PHC strings, which embed the algorithm, cost
/// parameters and salt next to the digest. Verification reads the parameters
/// back out of the stored string, so raising the costs below does not
/// invalidate existing hashes.
///
/// # Parameters
///
/// | Setting     | Value  |
/// |-------------|--------|
/// | Algorithm   | Argon2id v0x13 |
/// | Memory      | 64 MiB |
/// | Iterations  | 3      |
/// | Lanes       | 4      |
/// | Salt        | 16 random bytes (OS RNG) |
///
/// Hashing takes tens of milliseconds by design. Call it from
/// `tokio::task::spawn_blocking` inside async handlers.
///
/// # Example
///
/// ```
/// use spinoaid_shared::auth::password::{hash_password, verify_password};
///
/// # fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let stored = hash_password("radiograph-42")?;
///
/// assert!(verify_password("radiograph-42", &stored)?);
/// assert!(!verify_password("radiograph-43", &stored)?);
/// # Ok(())
/// # }
/// ```

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Algorithm, Argon2, Params, Version,
};

/// Memory cost in KiB
const MEMORY_COST_KIB: u32 = 65536;

/// Number of passes
const TIME_COST: u32 = 3;

/// Degree of parallelism
const PARALLELISM: u32 = 4;

/// Digest length in bytes
const OUTPUT_LEN: usize = 32;

/// Error type for credential hashing
#[derive(Debug, thiserror::Error)]
pub enum PasswordError {
    /// Hashing failed
    #[error("Failed to hash password: {0}")]
    HashError(String),

    /// The stored hash is not a valid PHC string
    #[error("Invalid password hash format: {0}")]
    InvalidHash(String),

    /// Verification failed for a reason other than a mismatch
    #[error("Failed to verify password: {0}")]
    VerifyError(String),
}

fn hasher() -> Result<Argon2<'static>, PasswordError> {
    let params = Params::new(MEMORY_COST_KIB, TIME_COST, PARALLELISM, Some(OUTPUT_LEN))
        .map_err(|e| PasswordError::HashError(format!("Invalid parameters: {}", e)))?;

    Ok(Argon2::new(Algorithm::Argon2id, Version::V0x13, params))
}

/// Hashes a plaintext password with a fresh random salt
///
/// Two calls with the same input return different strings.
pub fn hash_password(password: &str) -> Result<String, PasswordError> {
    let salt = SaltString::generate(&mut OsRng);

    let hash = hasher()?
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| PasswordError::HashError(e.to_string()))?;

    Ok(hash.to_string())
}

/// Checks a plaintext password against a stored hash
///
/// Returns `Ok(false)` on a mismatch. Errors are reserved for stored hashes
/// that cannot be parsed.
pub fn verify_password(password: &str, stored_hash: &str) -> Result<bool, PasswordError> {
    let parsed = PasswordHash::new(stored_hash)
        .map_err(|e| PasswordError::InvalidHash(e.to_string()))?;

    // Parameters come from the PHC string, not from the constants above
    match Argon2::default().verify_password(password.as_bytes(), &parsed) {
        Ok(()) => Ok(true),
        Err(argon2::password_hash::Error::Password) => Ok(false),
        Err(e) => Err(PasswordError::VerifyError(e.to_string())),
    }
}
