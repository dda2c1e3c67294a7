//! wikipad - a minimal wiki page editor backed by a key-value store
//!
//! Pages are viewed at `/view/{title}`, edited at `/edit/{title}` and saved
//! by posting the form to `/save/{title}`. Every other path is a 404.

pub mod components;
pub mod config;
pub mod errors;
pub mod handlers;
pub mod logger;
pub mod services;
pub mod types;
pub mod utils;

use std::sync::Arc;

use axum::{
    routing::{get, post},
    Router,
};

// Re-export commonly used items
pub use components::{Renderer, TemplateSet};
pub use config::{Config, StoreBackend};
pub use errors::WikiError;
pub use logger::Logger;
pub use services::{MemoryStore, PageService, PageStore, RedisStore};
pub use types::{AppState, Page, Title};

use handlers::{handle_edit, handle_not_found, handle_save, handle_view};

/// Route table: `view` and `edit` are GET, `save` is POST, the rest is 404
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/view/:title", get(handle_view).fallback(handle_not_found))
        .route("/edit/:title", get(handle_edit).fallback(handle_not_found))
        .route("/save/:title", post(handle_save).fallback(handle_not_found))
        .fallback(handle_not_found)
        .with_state(state)
}

/// Assemble the application state described by `config`
pub fn build_state(config: &Config) -> Result<AppState, WikiError> {
    let store: Arc<dyn PageStore> = match config.backend {
        StoreBackend::Redis => Arc::new(RedisStore::new(&config.store_credentials()?)?),
        StoreBackend::Memory => {
            log::warn!("Using the in-memory store; pages are lost on restart");
            Arc::new(MemoryStore::new())
        }
    };
    let templates = TemplateSet::load(&config.template_dir)?;
    let renderer = Renderer::new(templates, config.instance.as_str());
    Ok(AppState::new(PageService::new(store), renderer))
}
