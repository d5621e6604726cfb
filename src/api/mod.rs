use axum::{
    Router,
    http::HeaderValue,
    middleware,
    routing::{delete, get, post, put},
};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tower_sessions::{Expiry, MemoryStore, SessionManagerLayer};

use crate::config::Config;
use crate::state::SharedState;

pub mod auth;
mod error;
mod incidents;
mod system;
mod types;
mod users;

pub use error::ApiError;
pub use types::*;

use tokio::sync::RwLock;

use crate::db::Store;
use crate::services::{AccountService, IncidentService, TokenService};

#[derive(Clone)]
pub struct AppState {
    pub shared: Arc<SharedState>,

    pub start_time: std::time::Instant,
}

impl AppState {
    #[must_use]
    pub fn config(&self) -> &Arc<RwLock<Config>> {
        &self.shared.config
    }

    #[must_use]
    pub fn store(&self) -> &Store {
        &self.shared.store
    }

    #[must_use]
    pub fn accounts(&self) -> &Arc<dyn AccountService> {
        &self.shared.accounts
    }

    #[must_use]
    pub fn tokens(&self) -> &Arc<dyn TokenService> {
        &self.shared.tokens
    }

    #[must_use]
    pub fn incidents(&self) -> &Arc<dyn IncidentService> {
        &self.shared.incidents
    }
}

pub fn create_app_state(shared: Arc<SharedState>) -> Arc<AppState> {
    Arc::new(AppState {
        shared,
        start_time: std::time::Instant::now(),
    })
}

pub async fn create_app_state_from_config(config: Config) -> anyhow::Result<Arc<AppState>> {
    let shared = Arc::new(SharedState::new(config).await?);
    Ok(create_app_state(shared))
}

pub async fn router(state: Arc<AppState>) -> Router {
    let (cors_origins, secure_cookies, session_minutes) = {
        let config = state.config().read().await;
        (
            config.server.cors_allowed_origins.clone(),
            config.server.secure_cookies,
            config.server.session_minutes,
        )
    };

    let protected_routes = create_protected_router();

    let session_store = MemoryStore::default();
    let session_layer = SessionManagerLayer::new(session_store)
        .with_secure(secure_cookies)
        .with_same_site(tower_sessions::cookie::SameSite::Lax)
        .with_expiry(Expiry::OnInactivity(time::Duration::minutes(
            session_minutes,
        )));

    let api_router = Router::new()
        .merge(protected_routes)
        .route("/incidents", post(incidents::submit_incident))
        .route("/auth/login", post(auth::login))
        .route("/auth/logout", post(auth::logout))
        .route("/auth/forgot", post(auth::forgot_password))
        .route("/auth/reset", post(auth::reset_password))
        .layer(session_layer)
        .with_state(state.clone());

    let cors_layer = if cors_origins.contains(&"*".to_string()) {
        CorsLayer::new().allow_origin(Any)
    } else {
        let origins: Vec<HeaderValue> =
            cors_origins.iter().filter_map(|s| s.parse().ok()).collect();
        CorsLayer::new().allow_origin(origins)
    };

    Router::new()
        .nest("/api", api_router)
        .layer(cors_layer.allow_methods(Any).allow_headers(Any))
        .layer(TraceLayer::new_for_http())
}

fn create_protected_router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/incidents", get(incidents::list_incidents))
        .route("/incidents/{id}", get(incidents::get_incident))
        .route(
            "/incidents/{id}/corrective-actions",
            put(incidents::update_corrective_actions),
        )
        .route("/auth/me", get(auth::get_current_account))
        .route("/auth/password", put(auth::change_password))
        .route("/users", get(users::list_accounts))
        .route("/users", post(users::create_account))
        .route("/users/{id}/toggle", post(users::toggle_account))
        .route("/users/{id}/role", put(users::change_role))
        .route("/users/{id}/password", put(users::set_password))
        .route("/users/{id}", delete(users::delete_account))
        .route("/system/status", get(system::get_status))
        .route("/system/notifications", get(system::get_notifications))
        .route("/system/notifications", put(system::update_notifications))
        .route_layer(middleware::from_fn(auth::auth_middleware))
}
