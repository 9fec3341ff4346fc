//! Bookmarks backend: serves `/api/categories` and `/api/sites` from an in-memory store.
//!
//! Run from repo root: `cargo run -p bookmarks-server`
//! Bind address and body limit come from `BOOKMARKS_BIND` / `BOOKMARKS_BODY_LIMIT`.

use bookmark_crud::{app, AppState, MemoryStore, ServerSettings};
use tokio::net::TcpListener;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("bookmark_crud=info,bookmarks_server=info")),
        )
        .init();

    let settings = ServerSettings::from_env();
    let state = AppState::new(MemoryStore::new());
    let router = app(state, settings.body_limit);

    let listener = TcpListener::bind(settings.bind).await?;
    tracing::info!("bookmarks server listening on http://{}", listener.local_addr()?);
    axum::serve(listener, router).await?;
    Ok(())
}
