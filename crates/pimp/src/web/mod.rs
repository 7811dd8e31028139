//! The website: routing, request handlers, sessions and page templates.
//!
//! [`serve`] opens the store, seeds the demo directory when configured and
//! runs the router until Ctrl+C or SIGTERM.

pub mod handlers;
pub mod layout;
pub mod nav;
pub mod router;
pub mod session;
pub mod state;
pub mod views;

pub use router::{create_router, RouteInfo, ROUTES};
pub use state::AppState;

use axum::body::{to_bytes, Body};
use axum::http::{Request, StatusCode};
use tokio::net::TcpListener;
use tokio::signal::ctrl_c;
#[cfg(unix)]
use tokio::signal::unix::{signal, SignalKind};
use tower::ServiceExt;
use tracing::{debug, info, warn};

use crate::config::Config;
use crate::error::{Error, Result};
use crate::storage::seed::seed_demo_data;
use crate::storage::Storage;

/// Open the configured store, loading the demo directory into an empty one
/// when `storage.seed_demo_data` is set.
///
/// # Errors
///
/// Returns an error if the database cannot be opened or seeded.
pub fn open_storage(config: &Config) -> Result<Storage> {
    let storage = Storage::open(config.database_path())?;
    if config.storage.seed_demo_data && storage.is_empty()? {
        let summary = seed_demo_data(&storage)?;
        info!(
            "Seeded demo directory: {} businesses, {} reviews, {} users",
            summary.businesses, summary.reviews, summary.users
        );
    }
    if let Err(e) = storage.purge_expired_sessions() {
        warn!("Failed to purge expired sessions: {}", e);
    }
    Ok(storage)
}

/// Run the web server until a shutdown signal arrives.
///
/// # Errors
///
/// Returns an error if the store cannot be opened or the address cannot be
/// bound.
pub async fn serve(config: Config) -> Result<()> {
    let addr = config.bind_addr()?;
    let storage = open_storage(&config)?;
    let state = AppState::new(config, storage);
    let app = create_router(state);

    let listener = TcpListener::bind(addr).await?;
    info!("Listening on http://{}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server stopped");
    Ok(())
}

/// Largest page body [`render`] will buffer.
const RENDER_LIMIT: usize = 8 * 1024 * 1024;

/// Render one GET request through the router without binding a socket.
///
/// Returns the status and the response body as text.
///
/// # Errors
///
/// Returns an error if the request cannot be built or the body is not
/// UTF-8.
pub async fn render(state: AppState, path: &str) -> Result<(StatusCode, String)> {
    let request = Request::get(path)
        .body(Body::empty())
        .map_err(|e| Error::internal(format!("bad request path {path:?}: {e}")))?;
    let response = create_router(state)
        .oneshot(request)
        .await
        .map_err(|e| Error::internal(e.to_string()))?;
    let status = response.status();
    let bytes = to_bytes(response.into_body(), RENDER_LIMIT)
        .await
        .map_err(|e| Error::internal(e.to_string()))?;
    debug!("Rendered {} ({}, {} bytes)", path, status, bytes.len());
    let body = String::from_utf8(bytes.to_vec())
        .map_err(|e| Error::internal(format!("response is not UTF-8: {e}")))?;
    Ok((status, body))
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = ctrl_c().await {
            warn!("Failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
        info!("Received Ctrl+C, shutting down");
    };

    #[cfg(unix)]
    let terminate = async {
        match signal(SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
                info!("Received terminate signal, shutting down");
            }
            Err(e) => {
                warn!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn seeded_state() -> AppState {
        let storage = Storage::open_in_memory().unwrap();
        seed_demo_data(&storage).unwrap();
        AppState::new(Config::default(), storage)
    }

    #[tokio::test]
    async fn test_render_home() {
        let (status, body) = render(seeded_state(), "/").await.unwrap();
        assert_eq!(status, StatusCode::OK);
        assert!(body.contains("<html"));
    }

    #[tokio::test]
    async fn test_render_missing_page() {
        let (status, _) = render(seeded_state(), "/no-such-page").await.unwrap();
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[test]
    fn test_open_storage_seeds_empty_store() {
        let dir = std::env::temp_dir().join(format!("pimp-open-{}", std::process::id()));
        let mut config = Config::default();
        config.storage.database_path = Some(dir.join("directory.db"));
        let storage = open_storage(&config).unwrap();
        assert!(!storage.is_empty().unwrap());

        config.storage.seed_demo_data = false;
        let before = storage.stats().unwrap().businesses;
        drop(storage);
        let storage = open_storage(&config).unwrap();
        assert_eq!(storage.stats().unwrap().businesses, before);
        drop(storage);
        let _ = std::fs::remove_dir_all(dir);
    }
}
