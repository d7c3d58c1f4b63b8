/// Authentication primitives
///
/// # Modules
///
/// - [`password`]: Argon2id credential hashing and verification
/// - [`jwt`]: HS256 bearer token issuance and verification
/// - [`middleware`]: the auth gate (header parsing, identity resolution)
///
/// # Example
///
/// ```
/// use spinoaid_shared::auth::{jwt::TokenIssuer, password};
/// use uuid::Uuid;
///
/// # fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let hash = password::hash_password("hunter22")?;
/// assert!(password::verify_password("hunter22", &hash)?);
///
/// let issuer = TokenIssuer::new("secret-from-config");
/// let token = issuer.issue(Uuid::new_v4())?;
/// assert!(issuer.verify(&token).is_ok());
/// # Ok(())
/// # }
/// ```

pub mod jwt;
pub mod middleware;
pub mod password;
