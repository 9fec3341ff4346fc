//! Walkthrough: starts the bookmarks backend on an ephemeral port, then drives the
//! categories and sites orchestrators against it over HTTP.
//!
//! Run: `cargo run --example walkthrough`

use bookmark_crud::{
    app, presets, AlertChannel, AppState, ClientSettings, Confirm, CrudOrchestrator, Gateway,
    HttpTransport, MemoryStore, OrchestratorOptions, ServerSettings,
};
use serde_json::json;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("bookmark_crud=info".parse()?))
        .init();

    let server = ServerSettings::from_env();
    let listener = TcpListener::bind("127.0.0.1:0").await?;
    let addr = listener.local_addr()?;
    let router = app(AppState::new(MemoryStore::new()), server.body_limit);
    tokio::spawn(async move { axum::serve(listener, router).await });
    tracing::info!("backend on http://{}", addr);

    let client = ClientSettings::from_env();
    let transport = HttpTransport::new(format!("http://{}/api", addr), client.timeout)?;
    let alerts = AlertChannel::new();
    let gateway = Gateway::new(Arc::new(transport), alerts.clone()).with_conflict_marker(client.conflict_marker);
    let confirm: Arc<dyn Confirm> = Arc::new(|prompt: &str| {
        println!("? {} yes", prompt);
        true
    });
    let options = OrchestratorOptions {
        page_size: client.page_size,
        ..OrchestratorOptions::default()
    };

    let categories = CrudOrchestrator::new(presets::categories(), gateway.clone(), confirm.clone(), options.clone())?;
    let sites = CrudOrchestrator::new(presets::sites(gateway.clone()), gateway, confirm, options)?;

    categories.initialize().await;
    for name in ["Reading", "Tools", "Music"] {
        categories.set_field("name", json!(name))?;
        println!("create {:<8} -> {:?} {:?}", name, categories.submit().await, alerts.snapshot());
    }

    println!("empty submit  -> {:?} {:?}", categories.submit().await, alerts.snapshot());

    sites.initialize().await;
    println!("category options: {:?}", sites.view().options.get("categoryId"));
    let category_id = categories
        .view()
        .items
        .first()
        .and_then(|c| c.get("id").cloned())
        .unwrap_or_default();
    sites.set_field("name", json!("The Rust Book"))?;
    sites.set_field("url", json!("https://doc.rust-lang.org/book/"))?;
    sites.set_field("categoryId", category_id)?;
    println!("create site   -> {:?} {:?}", sites.submit().await, alerts.snapshot());

    if let Some(site) = sites.view().items.first() {
        sites.start_edit(site);
        sites.set_field("name", json!("Rust Book"))?;
        println!("edit site     -> {:?} {:?}", sites.submit().await, alerts.snapshot());
    }
    println!("sites: {}", serde_json::to_string_pretty(&sites.view().items)?);

    categories.load(1).await;
    let used = categories
        .view()
        .items
        .into_iter()
        .find(|c| c.get("name") == Some(&json!("Reading")));
    if let Some(used) = used {
        println!("delete used   -> {:?} {:?}", categories.remove(&used).await, alerts.snapshot());
    }

    if let Some(site) = sites.view().items.first() {
        println!("delete site   -> {:?} {:?}", sites.remove(site).await, alerts.snapshot());
    }
    Ok(())
}
