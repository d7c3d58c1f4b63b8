/// Application state and router builder
///
/// This module defines the shared application state and provides
/// a function to build the Axum router with all routes and middleware.
///
/// # Example
///
/// ```no_run
/// use spinoaid_api::{app::AppState, config::Config};
/// use spinoaid_shared::store::MemoryStore;
/// use std::sync::Arc;
///
/// # async fn example() -> anyhow::Result<()> {
/// let config = Config::from_env()?;
/// let state = AppState::new(Arc::new(MemoryStore::new()), config);
/// let app = spinoaid_api::app::build_router(state);
/// # Ok(())
/// # }
/// ```

use crate::{config::Config, error::ApiError};
use axum::{
    extract::{DefaultBodyLimit, Request, State},
    http::{header, HeaderValue, Method},
    middleware::Next,
    response::Response,
    routing::{get, post},
    Router,
};
use spinoaid_shared::{
    auth::{jwt::TokenIssuer, middleware::authenticate},
    inference::{ImageAnalyzer, PlaceholderAnalyzer},
    store::DocumentStore,
};
use std::sync::Arc;
use tower_http::{
    cors::CorsLayer,
    trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer},
};
use tracing::Level;

/// Largest accepted image upload
pub const MAX_UPLOAD_BYTES: usize = 25 * 1024 * 1024;

/// Shared application state
///
/// This is cloned for each request handler via Axum's `State` extractor.
/// Uses Arc internally for cheap cloning.
#[derive(Clone)]
pub struct AppState {
    /// Storage collaborator
    pub store: Arc<dyn DocumentStore>,

    /// Token issuer and verifier
    pub tokens: TokenIssuer,

    /// Image analyzer behind `/api/analyze`
    pub analyzer: Arc<dyn ImageAnalyzer>,

    /// Application configuration
    pub config: Arc<Config>,
}

impl AppState {
    /// Creates new application state with the placeholder analyzer
    pub fn new(store: Arc<dyn DocumentStore>, config: Config) -> Self {
        Self {
            store,
            tokens: TokenIssuer::new(&config.jwt.secret),
            analyzer: Arc::new(PlaceholderAnalyzer::new()),
            config: Arc::new(config),
        }
    }

    /// Replaces the image analyzer
    pub fn with_analyzer(mut self, analyzer: Arc<dyn ImageAnalyzer>) -> Self {
        self.analyzer = analyzer;
        self
    }
}

/// Builds the complete Axum router with all routes and middleware
///
/// # Architecture
///
/// ```text
/// /
/// ├── GET  /                          # Liveness (public)
/// ├── GET  /health                    # Health check (public)
/// ├── /auth/
/// │   ├── POST /register              # public
/// │   ├── POST /login                 # public
/// │   └── GET  /me                    # authenticated
/// └── /api/
///     ├── /patients                   # authenticated
///     │   ├── GET    /
///     │   ├── POST   /
///     │   ├── GET    /:patient_id
///     │   ├── PUT    /:patient_id
///     │   └── DELETE /:patient_id
///     ├── /annotations                # authenticated
///     │   ├── POST   /
///     │   ├── GET    /:id             # id is a patient code
///     │   └── DELETE /:id             # id is an annotation record id
///     ├── POST /upload-image          # public
///     └── POST /analyze               # public
/// ```
///
/// # Middleware Stack
///
/// Applied in order (bottom to top):
/// 1. Logging (tower-http TraceLayer)
/// 2. CORS (tower-http CorsLayer)
/// 3. Authentication (per-route basis)
pub fn build_router(state: AppState) -> Router {
    use crate::routes;

    // Public routes
    let public_routes = Router::new()
        .route("/", get(routes::health::root))
        .route("/health", get(routes::health::health_check))
        .route("/auth/register", post(routes::auth::register))
        .route("/auth/login", post(routes::auth::login))
        .route(
            "/api/upload-image",
            post(routes::images::upload_image).layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES)),
        )
        .route("/api/analyze", post(routes::analysis::analyze));

    // Routes that require a bearer token
    let protected_routes = Router::new()
        .route("/auth/me", get(routes::auth::me))
        .route(
            "/api/patients",
            get(routes::patients::list_patients).post(routes::patients::create_patient),
        )
        .route(
            "/api/patients/:patient_id",
            get(routes::patients::get_patient)
                .put(routes::patients::update_patient)
                .delete(routes::patients::delete_patient),
        )
        .route("/api/annotations", post(routes::annotations::save_annotations))
        .route(
            "/api/annotations/:id",
            get(routes::annotations::list_annotations)
                .delete(routes::annotations::delete_annotation),
        )
        .layer(axum::middleware::from_fn_with_state(
            state.clone(),
            jwt_auth_layer,
        ));

    // Configure CORS based on environment
    let cors = if state.config.allows_any_origin() {
        // Development mode: permissive CORS
        CorsLayer::permissive()
    } else {
        let origins: Vec<HeaderValue> = state
            .config
            .api
            .cors_origins
            .iter()
            .filter_map(|origin| origin.parse().ok())
            .collect();

        CorsLayer::new()
            .allow_origin(origins)
            .allow_methods([
                Method::GET,
                Method::POST,
                Method::PUT,
                Method::DELETE,
                Method::OPTIONS,
            ])
            .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE])
            .allow_credentials(true)
            .max_age(std::time::Duration::from_secs(3600))
    };

    Router::new()
        .merge(public_routes)
        .merge(protected_routes)
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        .layer(cors)
        .with_state(state)
}

/// JWT authentication middleware layer
///
/// Validates the bearer token, resolves the caller identity and injects
/// the resulting `AuthContext` into request extensions.
async fn jwt_auth_layer(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let auth_context = authenticate(
        req.headers(),
        &state.tokens,
        state.config.auth.identity,
        &*state.store,
    )
    .await?;

    req.extensions_mut().insert(auth_context);

    Ok(next.run(req).await)
}
