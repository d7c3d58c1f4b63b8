/// Bearer token issuance and verification
///
/// Tokens are HS256-signed JWTs carrying three claims:
///
/// - `sub`: the user id
/// - `iat`: issued-at (Unix seconds)
/// - `exp`: expiry, `iat` + 24 hours
///
/// A [`TokenIssuer`] is built once from the configured secret and shared by
/// the login handlers and the auth gate. Verification checks the signature,
/// the algorithm and `now <= exp` with no leeway. There are no refresh tokens
/// and no revocation list: a token stays valid until it expires.
///
/// # Example
///
/// ```
/// use spinoaid_shared::auth::jwt::TokenIssuer;
/// use uuid::Uuid;
///
/// # fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let issuer = TokenIssuer::new("a-long-random-secret-from-the-environment");
/// let user_id = Uuid::new_v4();
///
/// let token = issuer.issue(user_id)?;
/// let claims = issuer.verify(&token)?;
/// assert_eq!(claims.sub, user_id);
/// # Ok(())
/// # }
/// ```

use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Signing algorithm
pub const ALGORITHM: Algorithm = Algorithm::HS256;

/// Lifetime of an issued token
pub fn token_lifetime() -> Duration {
    Duration::hours(24)
}

/// Error type for token operations
#[derive(Debug, thiserror::Error)]
pub enum JwtError {
    /// Encoding failed
    #[error("Failed to create token: {0}")]
    CreateError(String),

    /// The token is past its `exp`
    #[error("Token has expired")]
    Expired,

    /// Bad signature, wrong algorithm, or not a JWT at all
    #[error("Invalid token: {0}")]
    Invalid(String),
}

/// Token claims
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    /// Subject: the user id
    pub sub: Uuid,

    /// Issued at (Unix timestamp)
    pub iat: i64,

    /// Expiration time (Unix timestamp)
    pub exp: i64,
}

impl Claims {
    /// Claims for `user_id` expiring after the standard lifetime
    pub fn new(user_id: Uuid) -> Self {
        Self::with_expiration(user_id, token_lifetime())
    }

    /// Claims with a custom lifetime (negative values produce expired claims)
    pub fn with_expiration(user_id: Uuid, expires_in: Duration) -> Self {
        let now = Utc::now();

        Self {
            sub: user_id,
            iat: now.timestamp(),
            exp: (now + expires_in).timestamp(),
        }
    }

    /// Checks expiry against the local clock
    pub fn is_expired(&self) -> bool {
        Utc::now().timestamp() > self.exp
    }
}

/// Issues and verifies tokens with one process-wide secret
#[derive(Clone)]
pub struct TokenIssuer {
    encoding: EncodingKey,
    decoding: DecodingKey,
    validation: Validation,
}

impl TokenIssuer {
    /// Builds an issuer for the given HMAC secret
    pub fn new(secret: &str) -> Self {
        let mut validation = Validation::new(ALGORITHM);
        validation.leeway = 0;
        validation.validate_exp = true;
        validation.set_required_spec_claims(&["exp", "sub"]);

        Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
            validation,
        }
    }

    /// Issues a token for `user_id`
    pub fn issue(&self, user_id: Uuid) -> Result<String, JwtError> {
        self.sign(&Claims::new(user_id))
    }

    /// Signs arbitrary claims
    pub fn sign(&self, claims: &Claims) -> Result<String, JwtError> {
        encode(&Header::new(ALGORITHM), claims, &self.encoding)
            .map_err(|e| JwtError::CreateError(e.to_string()))
    }

    /// Verifies a token and returns its claims
    pub fn verify(&self, token: &str) -> Result<Claims, JwtError> {
        decode::<Claims>(token, &self.decoding, &self.validation)
            .map(|data| data.claims)
            .map_err(|e| match e.kind() {
                jsonwebtoken::errors::ErrorKind::ExpiredSignature => JwtError::Expired,
                _ => JwtError::Invalid(e.to_string()),
            })
    }
}
