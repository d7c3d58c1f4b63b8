/// Authentication endpoints
///
/// This module provides user authentication endpoints:
/// - Registration
/// - Login
/// - Current identity
///
/// # Endpoints
///
/// - `POST /auth/register` - Register new user
/// - `POST /auth/login` - Login and get a token
/// - `GET /auth/me` - Identity behind the bearer token

use crate::{
    app::AppState,
    error::{ApiError, ApiResult},
    extract::ApiJson,
};
use axum::{extract::State, Extension, Json};
use serde::{Deserialize, Serialize};
use spinoaid_shared::{
    auth::{middleware::AuthContext, password},
    models::user::{CreateUser, User},
};
use validator::Validate;

const EMAIL_TAKEN: &str = "Email already registered";
const BAD_CREDENTIALS: &str = "Invalid email or password";

/// Register request
#[derive(Debug, Deserialize, Validate)]
pub struct RegisterRequest {
    /// Display name
    #[validate(length(min = 1, max = 100, message = "Name must be 1 to 100 characters"))]
    pub name: String,

    /// Email address
    #[validate(email(message = "Invalid email format"))]
    pub email: String,

    #[validate(length(min = 1, message = "Password is required"))]
    pub password: String,
}

/// Login request
#[derive(Debug, Deserialize, Validate)]
pub struct LoginRequest {
    /// Email address
    #[validate(email(message = "Invalid email format"))]
    pub email: String,

    /// Password
    pub password: String,
}

/// Public view of a user
#[derive(Debug, Serialize, Deserialize)]
pub struct UserResponse {
    pub id: String,
    pub name: String,
    pub email: String,
}

impl From<&User> for UserResponse {
    fn from(user: &User) -> Self {
        Self {
            id: user.id.to_string(),
            name: user.name.clone(),
            email: user.email.clone(),
        }
    }
}

/// Register and login response
#[derive(Debug, Serialize, Deserialize)]
pub struct AuthResponse {
    pub success: bool,
    pub message: String,

    /// Bearer token (24h)
    pub token: String,

    pub user: UserResponse,
}

/// Register a new user
///
/// # Endpoint
///
/// ```text
/// POST /auth/register
/// Content-Type: application/json
///
/// {
///   "name": "Dr. Jane Doe",
///   "email": "jane@example.com",
///   "password": "secret"
/// }
/// ```
///
/// # Response
///
/// ```json
/// {
///   "success": true,
///   "message": "Registration successful",
///   "token": "eyJ...",
///   "user": { "id": "uuid", "name": "Dr. Jane Doe", "email": "jane@example.com" }
/// }
/// ```
///
/// # Errors
///
/// - `400 Bad Request`: Email already registered
/// - `422 Unprocessable Entity`: Validation failed
/// - `500 Internal Server Error`: Server error
pub async fn register(
    State(state): State<AppState>,
    ApiJson(req): ApiJson<RegisterRequest>,
) -> ApiResult<Json<AuthResponse>> {
    // Validate the name as it will be stored
    let req = RegisterRequest {
        name: req.name.trim().to_string(),
        ..req
    };
    req.validate()?;

    if User::find_by_email(&*state.store, &req.email).await?.is_some() {
        return Err(ApiError::BadRequest(EMAIL_TAKEN.to_string()));
    }

    // Argon2 is CPU-bound
    let plain = req.password;
    let password_hash =
        tokio::task::spawn_blocking(move || password::hash_password(&plain)).await??;

    let user = User::create(
        &*state.store,
        CreateUser {
            name: req.name,
            email: req.email,
            password_hash,
        },
    )
    .await
    .map_err(|err| {
        // Lost a race with a concurrent registration
        if err.is_duplicate_of("email") {
            ApiError::BadRequest(EMAIL_TAKEN.to_string())
        } else {
            ApiError::from(err)
        }
    })?;

    let token = state.tokens.issue(user.id)?;

    tracing::info!(user_id = %user.id, "user registered");

    Ok(Json(AuthResponse {
        success: true,
        message: "Registration successful".to_string(),
        token,
        user: UserResponse::from(&user),
    }))
}

/// Login endpoint
///
/// # Endpoint
///
/// ```text
/// POST /auth/login
/// Content-Type: application/json
///
/// {
///   "email": "jane@example.com",
///   "password": "secret"
/// }
/// ```
///
/// # Response
///
/// Same shape as registration, with message `"Login successful"`.
///
/// # Errors
///
/// - `401 Unauthorized`: Unknown email or wrong password
/// - `422 Unprocessable Entity`: Validation failed
/// - `500 Internal Server Error`: Server error
pub async fn login(
    State(state): State<AppState>,
    ApiJson(req): ApiJson<LoginRequest>,
) -> ApiResult<Json<AuthResponse>> {
    req.validate()?;

    let user = User::find_by_email(&*state.store, &req.email)
        .await?
        .ok_or_else(|| ApiError::Unauthorized(BAD_CREDENTIALS.to_string()))?;

    let plain = req.password;
    let stored_hash = user.password_hash.clone();
    let valid =
        tokio::task::spawn_blocking(move || password::verify_password(&plain, &stored_hash))
            .await??;

    if !valid {
        tracing::debug!(user_id = %user.id, "login rejected");
        return Err(ApiError::Unauthorized(BAD_CREDENTIALS.to_string()));
    }

    let token = state.tokens.issue(user.id)?;

    Ok(Json(AuthResponse {
        success: true,
        message: "Login successful".to_string(),
        token,
        user: UserResponse::from(&user),
    }))
}

/// Current identity
///
/// # Endpoint
///
/// ```text
/// GET /auth/me
/// Authorization: Bearer <token>
/// ```
///
/// # Response
///
/// ```json
/// { "id": "uuid", "name": "Mock User", "email": "mock@example.com" }
/// ```
///
/// Name and email come from the configured identity resolution.
pub async fn me(Extension(auth): Extension<AuthContext>) -> Json<UserResponse> {
    Json(UserResponse {
        id: auth.user_id.to_string(),
        name: auth.name,
        email: auth.email,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_register_validation() {
        let ok = RegisterRequest {
            name: "Jane".to_string(),
            email: "jane@example.com".to_string(),
            password: "pw".to_string(),
        };
        assert!(ok.validate().is_ok());

        let bad = RegisterRequest {
            name: String::new(),
            email: "not-an-email".to_string(),
            password: String::new(),
        };
        let errors = bad.validate().unwrap_err();
        let fields = errors.field_errors();
        assert!(fields.contains_key("name"));
        assert!(fields.contains_key("email"));
        assert!(fields.contains_key("password"));
    }
}
