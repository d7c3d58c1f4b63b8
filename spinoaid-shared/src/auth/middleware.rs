/// Auth gate: bearer token extraction and caller identity
///
/// Protected routes run [`authenticate`] before the handler. It reads the
/// `Authorization: Bearer <token>` header, verifies the token with the
/// [`TokenIssuer`], and resolves an [`AuthContext`] that handlers pull out of
/// request extensions.
///
/// # Identity resolution
///
/// How the verified subject becomes a caller identity is a deployment choice:
///
/// - [`IdentityResolution::Placeholder`]: the id is the token subject, while
///   name and email are fixed placeholders. No user lookup happens, so a
///   token for a deleted account still authenticates.
/// - [`IdentityResolution::Lookup`]: the user record is loaded by subject id
///   and an unknown subject is rejected.
///
/// Ownership checks use `user_id` in both modes.
///
/// # Example
///
/// ```
/// use axum::Extension;
/// use spinoaid_shared::auth::middleware::AuthContext;
///
/// async fn handler(Extension(auth): Extension<AuthContext>) -> String {
///     format!("Hello, {}", auth.name)
/// }
/// ```

use axum::{
    http::{header, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};
use uuid::Uuid;

use super::jwt::{JwtError, TokenIssuer};
use crate::models::user::User;
use crate::store::DocumentStore;

/// Display name reported in placeholder mode
pub const PLACEHOLDER_NAME: &str = "Mock User";

/// Email reported in placeholder mode
pub const PLACEHOLDER_EMAIL: &str = "mock@example.com";

/// Strategy for turning a verified subject into an identity
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IdentityResolution {
    /// Subject id with placeholder name and email
    #[default]
    Placeholder,

    /// Load the user record for the subject
    Lookup,
}

impl fmt::Display for IdentityResolution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IdentityResolution::Placeholder => write!(f, "placeholder"),
            IdentityResolution::Lookup => write!(f, "lookup"),
        }
    }
}

impl FromStr for IdentityResolution {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "placeholder" => Ok(IdentityResolution::Placeholder),
            "lookup" => Ok(IdentityResolution::Lookup),
            other => Err(format!(
                "unknown identity resolution '{}', expected 'placeholder' or 'lookup'",
                other
            )),
        }
    }
}

/// Authenticated caller, added to request extensions
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthContext {
    /// Verified user id (token subject)
    pub user_id: Uuid,

    /// Display name
    pub name: String,

    /// Email address
    pub email: String,
}

impl AuthContext {
    /// Identity built from the subject alone
    pub fn placeholder(user_id: Uuid) -> Self {
        Self {
            user_id,
            name: PLACEHOLDER_NAME.to_string(),
            email: PLACEHOLDER_EMAIL.to_string(),
        }
    }

    /// Identity built from a stored user record
    pub fn from_user(user: &User) -> Self {
        Self {
            user_id: user.id,
            name: user.name.clone(),
            email: user.email.clone(),
        }
    }
}

/// Error type for the auth gate
#[derive(Debug)]
pub enum AuthError {
    /// No Authorization header
    MissingCredentials,

    /// Header present but not `Bearer <token>`
    InvalidFormat(String),

    /// Signature, format or expiry check failed
    InvalidToken(String),

    /// Lookup mode found no user for the subject
    UnknownUser,

    /// Lookup failed in the store
    StoreError(String),
}

impl From<JwtError> for AuthError {
    fn from(err: JwtError) -> Self {
        AuthError::InvalidToken(err.to_string())
    }
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            AuthError::MissingCredentials => (StatusCode::UNAUTHORIZED, "Not authenticated"),
            AuthError::InvalidFormat(_) => {
                (StatusCode::UNAUTHORIZED, "Invalid authorization header")
            }
            AuthError::InvalidToken(_) => (StatusCode::UNAUTHORIZED, "Invalid or expired token"),
            AuthError::UnknownUser => (StatusCode::UNAUTHORIZED, "Invalid token"),
            AuthError::StoreError(msg) => {
                tracing::error!("Identity lookup failed: {}", msg);
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error")
            }
        };

        let body = Json(serde_json::json!({
            "error": if status == StatusCode::UNAUTHORIZED { "unauthorized" } else { "internal_error" },
            "message": message,
        }));

        (status, body).into_response()
    }
}

/// Extracts the token from `Authorization: Bearer <token>`
///
/// The scheme is matched case-insensitively.
pub fn bearer_token(headers: &HeaderMap) -> Result<&str, AuthError> {
    let value = headers
        .get(header::AUTHORIZATION)
        .ok_or(AuthError::MissingCredentials)?
        .to_str()
        .map_err(|_| AuthError::InvalidFormat("Authorization header is not ASCII".to_string()))?;

    let (scheme, token) = value
        .trim()
        .split_once(' ')
        .ok_or_else(|| AuthError::InvalidFormat("Expected Bearer token".to_string()))?;

    if !scheme.eq_ignore_ascii_case("bearer") {
        return Err(AuthError::InvalidFormat(format!(
            "Unsupported authorization scheme '{}'",
            scheme
        )));
    }

    let token = token.trim();
    if token.is_empty() {
        return Err(AuthError::InvalidFormat("Empty bearer token".to_string()));
    }

    Ok(token)
}

/// Turns a verified subject into a caller identity
pub async fn resolve_identity(
    resolution: IdentityResolution,
    store: &dyn DocumentStore,
    user_id: Uuid,
) -> Result<AuthContext, AuthError> {
    match resolution {
        IdentityResolution::Placeholder => Ok(AuthContext::placeholder(user_id)),
        IdentityResolution::Lookup => User::find_by_id(store, user_id)
            .await
            .map_err(|e| AuthError::StoreError(e.to_string()))?
            .map(|user| AuthContext::from_user(&user))
            .ok_or(AuthError::UnknownUser),
    }
}

/// Runs the whole gate: header, token, identity
pub async fn authenticate(
    headers: &HeaderMap,
    issuer: &TokenIssuer,
    resolution: IdentityResolution,
    store: &dyn DocumentStore,
) -> Result<AuthContext, AuthError> {
    let token = bearer_token(headers)?;
    let claims = issuer.verify(token).map_err(|e| {
        tracing::debug!("Rejected bearer token: {}", e);
        AuthError::from(e)
    })?;

    resolve_identity(resolution, store, claims.sub).await
}
