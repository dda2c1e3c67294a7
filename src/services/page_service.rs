use std::sync::Arc;

use log::{debug, info, warn};

use crate::errors::WikiError;
use crate::services::codec;
use crate::services::store::PageStore;
use crate::types::{Page, Title};

/// Loads and saves pages through a [`PageStore`]
#[derive(Clone)]
pub struct PageService {
    store: Arc<dyn PageStore>,
}

impl PageService {
    pub fn new(store: Arc<dyn PageStore>) -> Self {
        Self { store }
    }

    /// Load the page stored under `title`.
    ///
    /// A missing key is [`WikiError::NotFound`] and store failures are passed
    /// through; callers fall back to [`Page::empty`] in both cases. A record
    /// that no longer decodes is not an error: it loads as an empty page.
    pub async fn load(&self, title: &Title) -> Result<Page, WikiError> {
        let blob = match self.store.get(title.as_str()).await {
            Ok(Some(blob)) => blob,
            Ok(None) => {
                info!("No stored page for '{}'", title);
                return Err(WikiError::NotFound);
            }
            Err(e) => {
                warn!("Failed to load page '{}': {}", title, e);
                return Err(e);
            }
        };

        match codec::decode(&blob) {
            Ok(page) => {
                if page.title() != title {
                    warn!("Record under '{}' claims title '{}'", title, page.title());
                }
                debug!("Loaded page '{}', {} bytes", title, page.body().len());
                Ok(Page::new(title.clone(), page.into_body()))
            }
            Err(e) => {
                warn!("Failed to decode page '{}': {}", title, e);
                Ok(Page::empty(title.clone()))
            }
        }
    }

    /// Store `body` under `title`, replacing whatever was there
    pub async fn save(&self, title: &Title, body: &[u8]) -> Result<(), WikiError> {
        let page = Page::new(title.clone(), body);
        let blob = codec::encode(&page)?;
        self.store.set(title.as_str(), blob).await?;
        info!("Saved page '{}', {} bytes", title, body.len());
        Ok(())
    }
}
