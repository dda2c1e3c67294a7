use axum::{
    async_trait,
    body::Bytes,
    extract::{FromRequest, FromRequestParts, Multipart, Path, Request, State},
    http::{header, request::Parts},
    response::{IntoResponse, Response},
};

use crate::errors::WikiError;
use crate::types::{AppState, Page, Title};
use crate::utils::{form_value, found};

/// Title taken from the last path segment; anything but `[a-zA-Z0-9]+` is a 404
pub struct PageTitle(pub Title);

#[async_trait]
impl<S> FromRequestParts<S> for PageTitle
where
    S: Send + Sync,
{
    type Rejection = WikiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Path(raw) = Path::<String>::from_request_parts(parts, state)
            .await
            .map_err(|_| WikiError::NotFound)?;
        Title::parse(&raw).map(PageTitle).map_err(|e| {
            log::debug!("Rejected title {:?}", raw);
            e
        })
    }
}

/// The `body` field of a submitted form, byte for byte.
///
/// Urlencoded and multipart forms are read; any other content type,
/// including none, submits an empty body.
pub struct SaveBody(pub Vec<u8>);

#[async_trait]
impl<S> FromRequest<S> for SaveBody
where
    S: Send + Sync,
{
    type Rejection = WikiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let content_type = req
            .headers()
            .get(header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.split(';').next())
            .map(|v| v.trim().to_ascii_lowercase())
            .unwrap_or_default();

        match content_type.as_str() {
            "application/x-www-form-urlencoded" => {
                let form = Bytes::from_request(req, state)
                    .await
                    .map_err(|e| WikiError::BadForm(e.to_string()))?;
                Ok(SaveBody(form_value(&form, "body").unwrap_or_default()))
            }
            "multipart/form-data" => {
                let mut multipart = Multipart::from_request(req, state)
                    .await
                    .map_err(|e| WikiError::BadForm(e.to_string()))?;
                while let Some(field) = multipart
                    .next_field()
                    .await
                    .map_err(|e| WikiError::BadForm(e.to_string()))?
                {
                    if field.name() == Some("body") {
                        let bytes = field.bytes().await.map_err(|e| WikiError::BadForm(e.to_string()))?;
                        return Ok(SaveBody(bytes.to_vec()));
                    }
                }
                Ok(SaveBody(Vec::new()))
            }
            other => {
                log::debug!("Ignoring save payload with content type {:?}", other);
                Ok(SaveBody(Vec::new()))
            }
        }
    }
}

/// Show a stored page, sending unknown titles to the editor
pub async fn handle_view(
    State(state): State<AppState>,
    PageTitle(title): PageTitle,
) -> Result<Response, WikiError> {
    log::info!("View request for '{}'", title);
    match state.pages.load(&title).await {
        Ok(page) => Ok(state.renderer.render("view", page)?.into_response()),
        Err(e) => {
            log::debug!("Redirecting '{}' to the editor: {}", title, e);
            Ok(found(&format!("/edit/{}", title)))
        }
    }
}

/// Show the edit form, pre-filled when the page exists
pub async fn handle_edit(
    State(state): State<AppState>,
    PageTitle(title): PageTitle,
) -> Result<Response, WikiError> {
    log::info!("Edit request for '{}'", title);
    let page = state.pages.load(&title).await.unwrap_or_else(|e| {
        log::debug!("Editing '{}' from scratch: {}", title, e);
        Page::empty(title.clone())
    });
    Ok(state.renderer.render("edit", page)?.into_response())
}

/// Persist the submitted body and go back to the page
pub async fn handle_save(
    State(state): State<AppState>,
    PageTitle(title): PageTitle,
    SaveBody(body): SaveBody,
) -> Result<Response, WikiError> {
    log::info!("Save request for '{}', {} bytes", title, body.len());
    if let Err(e) = state.pages.save(&title, &body).await {
        log::error!("Failed to save '{}': {}", title, e);
        return Err(e);
    }
    Ok(found(&format!("/view/{}", title)))
}

pub async fn handle_not_found() -> WikiError {
    WikiError::NotFound
}
