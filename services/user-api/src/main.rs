//! Gatehouse User API
//!
//! JWT authentication and user-management service.
//!
//! ## Endpoints
//!
//! - `POST /auth/login` - Issue an access/refresh token pair
//! - `POST /auth/refresh` - Exchange a refresh token for a new pair
//! - `POST /user/register` - Self-registration (role fixed to `user`)
//! - `POST /user/register-roles` - Registration with explicit roles (admin)
//! - `GET /user/all` - List users (projection depends on caller's role)
//! - `GET /user/count` - Total number of users
//! - `GET /user/username/{username}` - Lookup by username
//! - `GET /user/me` - Current principal's details
//! - `PUT /user/username/{username}` - Update (admin or self)
//! - `DELETE /user/username/{username}` - Delete (admin or self, last admin kept)
//!
//! ## Health Endpoints
//!
//! - `GET /health` - Liveness probe
//! - `GET /ready` - Readiness probe

mod config;
mod error;
mod extractors;
mod handlers;
mod state;
mod validation;

use std::net::SocketAddr;
use std::sync::Arc;

use axum::routing::{get, post};
use axum::Router;
use gatehouse_auth_core::AuthService;
use gatehouse_db::pg::PgUserDirectory;
use tokio::signal;
use tower::ServiceBuilder;
use tower_http::cors::{Any, CorsLayer};
use tower_http::request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer};
use tracing::Level;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

use crate::config::Config;
use crate::handlers::{health, ready};
use crate::state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables
    dotenvy::dotenv().ok();

    // Initialize logging
    tracing_subscriber::registry()
        .with(EnvFilter::from_default_env().add_directive("user_api=debug".parse()?))
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting Gatehouse User API");

    // Load configuration
    let config = Config::from_env()?;
    tracing::info!(http_port = config.http_port, "Configuration loaded");

    // Create database pool
    let pool = gatehouse_db::create_pool(&config.database_url).await?;
    tracing::info!("Database pool created");

    // Create the user directory and auth service
    let directory = Arc::new(PgUserDirectory::new(pool.clone()));
    let auth = AuthService::new(config.auth.clone(), Arc::clone(&directory));

    // Create application state
    let state = AppState::new(auth, directory, pool, config.clone());

    // Build HTTP router
    let app = build_router(state);

    // Start server
    let addr = SocketAddr::from(([0, 0, 0, 0], config.http_port));
    tracing::info!("HTTP server listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Shutdown complete");
    Ok(())
}

fn build_router(state: AppState) -> Router {
    let request_timeout = state.request_timeout();

    let auth_routes = Router::new()
        .route("/login", post(handlers::login))
        .route("/refresh", post(handlers::refresh));

    let user_routes = Router::new()
        .route("/register", post(handlers::register))
        .route("/register-roles", post(handlers::register_roles))
        .route("/all", get(handlers::list_users))
        .route("/count", get(handlers::count_users))
        .route("/me", get(handlers::me))
        .route(
            "/username/{username}",
            get(handlers::get_user)
                .put(handlers::update_user)
                .delete(handlers::delete_user),
        );

    // Health routes (no timeout - must always respond quickly)
    let health_routes = Router::new()
        .route("/health", get(health))
        .route("/ready", get(ready));

    // Build middleware stack (order matters - outermost first)
    let middleware = ServiceBuilder::new()
        .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
        .layer(PropagateRequestIdLayer::x_request_id())
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .layer(TimeoutLayer::new(request_timeout));

    Router::new()
        .nest("/auth", auth_routes)
        .nest("/user", user_routes)
        .layer(middleware)
        .merge(health_routes)
        .with_state(state)
}

async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }

    tracing::info!("Shutdown signal received, starting graceful shutdown");
}
