use std::sync::Arc;

use axum::response::Html;
use log::error;

use crate::components::TemplateSet;
use crate::errors::WikiError;
use crate::types::Page;

/// Fills templates for responses, stamping each page with the instance tag
#[derive(Clone)]
pub struct Renderer {
    templates: Arc<TemplateSet>,
    instance: Arc<str>,
}

impl Renderer {
    pub fn new(templates: TemplateSet, instance: impl Into<Arc<str>>) -> Self {
        Self { templates: Arc::new(templates), instance: instance.into() }
    }

    pub fn render(&self, name: &str, mut page: Page) -> Result<Html<String>, WikiError> {
        page.stamp_instance(&self.instance);
        self.templates.fill(name, &page).map(Html).map_err(|e| {
            error!("Failed to render '{}' for page '{}': {}", name, page.title(), e);
            e
        })
    }
}
