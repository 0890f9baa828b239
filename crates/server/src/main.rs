//! wyr-rs server entry point.

use std::net::{IpAddr, SocketAddr};
use std::sync::Arc;

use axum::{middleware, Router};
use tokio::signal;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use wyr_api::{middleware::AppState, router as api_router};
use wyr_common::{config::ServerConfig, Config};
use wyr_core::{CategoryService, ProfileService, QuestionService, UserService, VoteService};
use wyr_db::repositories::{
    QuestionRepository, ResponseRepository, UserRepository, VoteRepository,
};

/// Waits for a shutdown signal (SIGINT or SIGTERM).
///
/// On Unix systems, this listens for both SIGINT (Ctrl+C) and SIGTERM.
/// On Windows, this only listens for Ctrl+C.
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
        () = ctrl_c => {
            info!("Received SIGINT, initiating graceful shutdown...");
        },
        () = terminate => {
            info!("Received SIGTERM, initiating graceful shutdown...");
        },
    }
}

/// Socket address from the configured host and port.
fn bind_addr(server: &ServerConfig) -> Result<SocketAddr, std::net::AddrParseError> {
    let host: IpAddr = server.host.parse()?;
    Ok(SocketAddr::new(host, server.port))
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "wyr=debug,tower_http=debug".into()),
        )
        .init();

    info!("Starting wyr-rs server...");

    // Load configuration
    let config = Config::load()?;

    // Connect to database
    let db = Arc::new(wyr_db::init(&config).await?);
    info!("Connected to database");

    // Run migrations
    info!("Running database migrations...");
    wyr_db::migrate(&db).await?;
    info!("Migrations completed");

    // Initialize repositories
    let user_repo = UserRepository::new(Arc::clone(&db));
    let question_repo = QuestionRepository::new(Arc::clone(&db));
    let response_repo = ResponseRepository::new(Arc::clone(&db));
    let vote_repo = VoteRepository::new(Arc::clone(&db));

    // Initialize services
    let user_service = UserService::new(user_repo.clone());
    let question_service = QuestionService::new(
        question_repo.clone(),
        response_repo.clone(),
        vote_repo.clone(),
        user_repo,
    );
    let vote_service = VoteService::new(
        question_repo.clone(),
        response_repo.clone(),
        vote_repo.clone(),
    );
    let category_service = CategoryService::new(question_repo.clone());
    let profile_service = ProfileService::new(question_repo, response_repo, vote_repo);

    let state = AppState {
        user_service,
        question_service,
        vote_service,
        category_service,
        profile_service,
    };

    let app = Router::new()
        .nest("/api", api_router())
        .layer(middleware::from_fn_with_state(
            state.clone(),
            wyr_api::middleware::auth_middleware,
        ))
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(state);

    // Start server with graceful shutdown
    let addr = bind_addr(&config.server)?;
    info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server shutdown complete");
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn bind_addr_uses_configured_host_and_port() {
        let server = ServerConfig {
            host: "127.0.0.1".to_string(),
            port: 8080,
        };
        let addr = bind_addr(&server).unwrap();
        assert_eq!(addr.to_string(), "127.0.0.1:8080");

        let server = ServerConfig {
            host: "::1".to_string(),
            port: 3000,
        };
        let addr = bind_addr(&server).unwrap();
        assert_eq!(addr.to_string(), "[::1]:3000");
    }

    #[test]
    fn bind_addr_rejects_hostnames() {
        let server = ServerConfig {
            host: "localhost".to_string(),
            port: 3000,
        };
        assert!(bind_addr(&server).is_err());
    }
}
