//! Router assembly and the serve loop.

use std::net::SocketAddr;
use std::time::Duration;

use axum::middleware;
use axum::routing::{get, post};
use axum::Router;
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::cors::CorsLayer;
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;

use crate::auth;
use crate::error::{Error, Result};
use crate::handlers;
use crate::state::AppState;

const MAX_BODY_BYTES: usize = 1024 * 1024;

/// The full service router. Product routes require a bearer token; auth,
/// category and supplier routes do not.
pub fn router(state: AppState) -> Router {
    let auth_routes = Router::new()
        .route("/register", post(handlers::auth::register))
        .route("/login", post(handlers::auth::login));

    let category_routes = Router::new().route(
        "/",
        get(handlers::categories::list).post(handlers::categories::create),
    );

    let product_routes = Router::new()
        .route(
            "/",
            get(handlers::products::list).post(handlers::products::create),
        )
        .route("/export.csv", get(handlers::products::export_csv))
        .route(
            "/{id}",
            get(handlers::products::get)
                .put(handlers::products::update)
                .delete(handlers::products::remove),
        )
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            auth::require_auth,
        ));

    let supplier_routes = Router::new()
        .route(
            "/",
            get(handlers::suppliers::list).post(handlers::suppliers::create),
        )
        .route(
            "/{id}",
            get(handlers::suppliers::get)
                .put(handlers::suppliers::update)
                .delete(handlers::suppliers::remove),
        );

    let api = Router::new()
        .nest("/auth", auth_routes)
        .nest("/categories", category_routes)
        .nest("/products", product_routes)
        .nest("/suppliers", supplier_routes);

    Router::new()
        .route("/health", get(handlers::health::health))
        .nest("/api/v1", api)
        .fallback(fallback)
        .layer(TraceLayer::new_for_http())
        .layer(TimeoutLayer::new(Duration::from_secs(
            state.config.service.timeout_secs,
        )))
        .layer(CatchPanicLayer::new())
        .layer(CorsLayer::permissive())
        .layer(RequestBodyLimitLayer::new(MAX_BODY_BYTES))
        .with_state(state)
}

/// Unmatched paths share the entity 404 body.
async fn fallback() -> Error {
    Error::not_found()
}

pub async fn serve(state: AppState) -> Result<()> {
    let addr = SocketAddr::from(([0, 0, 0, 0], state.config.service.port));
    let app = router(state);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!(%addr, "listening");
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %err, "failed to install Ctrl+C handler");
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(err) => tracing::error!(error = %err, "failed to install SIGTERM handler"),
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
    tracing::info!("shutdown signal received");
}
