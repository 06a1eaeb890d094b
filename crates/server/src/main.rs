//! vidtube server entry point.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use axum::{Router, middleware};
use tokio::signal;
use tower::ServiceBuilder;
use tower_http::{
    cors::{Any, CorsLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use vidtube_api::{middleware::AppState, router as api_router};
use vidtube_common::Config;
use vidtube_core::{
    ChannelService, CommentService, SubscriptionService, UserService, VideoLikeService,
    VideoService, ViewService,
};
use vidtube_db::repositories::{
    CommentRepository, SubscriptionRepository, UserRepository, VideoLikeRepository,
    VideoRepository, ViewRepository,
};

/// Upper bound on a single request, database round trips included.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Waits for a shutdown signal (SIGINT or SIGTERM).
///
/// On Unix systems, this listens for both SIGINT (Ctrl+C) and SIGTERM.
/// On Windows, this only listens for Ctrl+C.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
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

/// Wire repositories into services.
fn build_state(db: &Arc<sea_orm::DatabaseConnection>) -> AppState {
    let user_repo = UserRepository::new(Arc::clone(db));
    let video_repo = VideoRepository::new(Arc::clone(db));
    let subscription_repo = SubscriptionRepository::new(Arc::clone(db));
    let video_like_repo = VideoLikeRepository::new(Arc::clone(db));
    let comment_repo = CommentRepository::new(Arc::clone(db));
    let view_repo = ViewRepository::new(Arc::clone(db));

    AppState {
        user_service: UserService::new(user_repo.clone()),
        subscription_service: SubscriptionService::new(
            subscription_repo.clone(),
            user_repo.clone(),
        ),
        channel_service: ChannelService::new(
            user_repo.clone(),
            subscription_repo.clone(),
            video_repo.clone(),
            view_repo.clone(),
        ),
        video_service: VideoService::new(
            video_repo.clone(),
            user_repo,
            view_repo.clone(),
            video_like_repo.clone(),
            comment_repo.clone(),
            subscription_repo,
        ),
        video_like_service: VideoLikeService::new(video_like_repo, video_repo.clone()),
        comment_service: CommentService::new(comment_repo, video_repo.clone()),
        view_service: ViewService::new(view_repo, video_repo),
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "vidtube=debug,tower_http=debug".into()),
        )
        .init();

    info!("Starting vidtube server...");

    let config = Config::load()?;

    let db = vidtube_db::init(&config).await?;
    info!("Connected to database");

    info!("Running database migrations...");
    vidtube_db::migrate(&db).await?;
    info!("Migrations completed");

    let db = Arc::new(db);
    let state = build_state(&db);

    let app = Router::new()
        .nest("/api/v1", api_router())
        .layer(middleware::from_fn_with_state(
            state.clone(),
            vidtube_api::middleware::auth_middleware,
        ))
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(TimeoutLayer::new(REQUEST_TIMEOUT))
                .layer(
                    CorsLayer::new()
                        .allow_origin(Any)
                        .allow_methods(Any)
                        .allow_headers(Any),
                ),
        )
        .with_state(state);

    // Start server with graceful shutdown
    let ip: std::net::IpAddr = config.server.host.parse()?;
    let addr = SocketAddr::from((ip, config.server.port));
    info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    match Arc::try_unwrap(db) {
        Ok(db) => {
            db.close().await?;
            info!("Database connection closed");
        }
        Err(db) => tracing::warn!(
            handles = Arc::strong_count(&db),
            "Database connection still shared at shutdown, leaving pool to drop"
        ),
    }

    info!("Server shutdown complete");
    Ok(())
}
