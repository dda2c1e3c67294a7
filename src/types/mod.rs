use std::borrow::Cow;
use std::fmt;

use crate::components::Renderer;
use crate::errors::WikiError;
use crate::services::PageService;

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    pub pages: PageService,
    pub renderer: Renderer,
}

impl AppState {
    pub fn new(pages: PageService, renderer: Renderer) -> Self {
        Self { pages, renderer }
    }
}

/// A page title: one or more ASCII letters or digits.
///
/// Titles double as storage keys, so the only way to get one is through
/// [`Title::parse`].
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Title(String);

impl Title {
    pub fn parse(raw: &str) -> Result<Self, WikiError> {
        if raw.is_empty() || !raw.bytes().all(|b| b.is_ascii_alphanumeric()) {
            return Err(WikiError::InvalidTitle(raw.to_string()));
        }
        Ok(Self(raw.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Title {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for Title {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// A wiki page as it lives for the duration of one request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Page {
    title: Title,
    body: Vec<u8>,
    instance: String,
}

impl Page {
    pub fn new(title: Title, body: impl Into<Vec<u8>>) -> Self {
        Self { title, body: body.into(), instance: String::new() }
    }

    /// Page with no body, used when the store has nothing usable
    pub fn empty(title: Title) -> Self {
        Self::new(title, Vec::new())
    }

    pub fn title(&self) -> &Title {
        &self.title
    }

    pub fn body(&self) -> &[u8] {
        &self.body
    }

    pub fn body_text(&self) -> Cow<'_, str> {
        String::from_utf8_lossy(&self.body)
    }

    pub fn into_body(self) -> Vec<u8> {
        self.body
    }

    /// Tag of the instance that rendered this page; empty until rendered.
    pub fn instance(&self) -> &str {
        &self.instance
    }

    pub fn stamp_instance(&mut self, instance: &str) {
        self.instance = instance.to_string();
    }
}
