//! Axum request handlers for the page and its actions.
//!
//! Form-style actions answer with `303 See Other` back to `/` so the browser
//! re-renders the page from the updated state.
use axum::extract::{Form, Multipart, Path, State};
use axum::http::{header, StatusCode};
use axum::response::{Html, IntoResponse, Redirect};
use axum::Json;
use serde::Deserialize;
use serde_json::{json, Value};
use std::sync::Arc;
use uuid::Uuid;

use crate::api::routes::AppState;
use crate::encoder::ImageFile;
use crate::error::{AppError, ValidationError};
use crate::generation::{generate_icon, IconGenerator, DOWNLOAD_FILE_NAME, PNG_MIME};
use crate::state::{PendingGeneration, Trigger};
use crate::ui::{page, upload as upload_surface};

type HandlerError = (StatusCode, String);

fn error_response(err: AppError) -> HandlerError {
    let status = match &err {
        AppError::Validation(ValidationError::UnsupportedType(_)) => StatusCode::UNSUPPORTED_MEDIA_TYPE,
        AppError::Validation(ValidationError::MissingImage) => StatusCode::BAD_REQUEST,
        AppError::InFlight => StatusCode::CONFLICT,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    };
    (status, err.user_message())
}

pub async fn index<G: IconGenerator>(State(state): State<Arc<AppState<G>>>) -> Html<String> {
    let orchestrator = state.orchestrator.read().await;
    Html(page::render(&orchestrator).into_string())
}

/// Machine-readable snapshot of the page state.
pub async fn state_json<G: IconGenerator>(State(state): State<Arc<AppState<G>>>) -> Json<Value> {
    let o = state.orchestrator.read().await;
    Json(json!({
        "state": o.phase().name(),
        "prompt": o.prompt(),
        "inFlight": o.is_in_flight(),
        "canGenerate": o.can_trigger(),
        "preview": o.preview_handle().map(|h| h.url()),
        "error": o.error(),
        "result": o.result().map(|r| r.data_url()),
    }))
}

#[derive(Debug, Deserialize)]
pub struct PromptForm {
    pub prompt: Option<String>,
}

/// Multipart upload; only the first `image` field is considered.
///
/// An optional `prompt` text field carries what the user typed so far. It is
/// stored only when the upload is accepted.
pub async fn upload<G: IconGenerator>(
    State(state): State<Arc<AppState<G>>>,
    mut multipart: Multipart,
) -> Result<Redirect, HandlerError> {
    let bad_request = |e: axum::extract::multipart::MultipartError| (StatusCode::BAD_REQUEST, e.to_string());
    let mut files = Vec::new();
    let mut prompt = None;
    while let Some(field) = multipart.next_field().await.map_err(bad_request)? {
        let field_name = field.name().map(str::to_string);
        match field_name.as_deref() {
            Some("image") => {
                let name = field.file_name().unwrap_or("upload").to_string();
                let mime = upload_surface::normalize_mime(field.content_type().unwrap_or_default());
                let bytes = field.bytes().await.map_err(bad_request)?;
                files.push(ImageFile::from_bytes(name, mime, bytes.to_vec()));
            }
            Some("prompt") => prompt = Some(field.text().await.map_err(bad_request)?),
            _ => {}
        }
    }

    let file = match upload_surface::accept_first(files) {
        Ok(Some(file)) => file,
        Ok(None) => return Err((StatusCode::BAD_REQUEST, "No image file in request.".to_string())),
        Err(e) => {
            tracing::warn!("Rejected upload: {}", e);
            return Err(error_response(e.into()));
        }
    };

    let mut o = state.orchestrator.write().await;
    o.on_image_upload(file).map_err(error_response)?;
    if let Some(prompt) = prompt {
        o.set_prompt(prompt);
    }
    Ok(Redirect::to("/"))
}

/// Discard the selection. A submitted prompt replaces the stored one once the
/// reset has gone through.
pub async fn reset<G: IconGenerator>(
    State(state): State<Arc<AppState<G>>>,
    form: Option<Form<PromptForm>>,
) -> Result<Redirect, HandlerError> {
    let mut o = state.orchestrator.write().await;
    o.reset().map_err(error_response)?;
    if let Some(prompt) = form.and_then(|Form(f)| f.prompt) {
        o.set_prompt(prompt);
    }
    Ok(Redirect::to("/"))
}

/// Store the prompt and trigger generation.
///
/// The remote call runs on a spawned task; the page shows the loading view
/// until [`run_generation`] records the outcome. While a request is in flight
/// the submission changes nothing.
pub async fn generate<G: IconGenerator>(
    State(state): State<Arc<AppState<G>>>,
    Form(form): Form<PromptForm>,
) -> Redirect {
    let trigger = state.orchestrator.write().await.trigger_with_prompt(form.prompt);
    match trigger {
        Trigger::Dispatched(pending) => {
            tokio::spawn(run_generation(state.clone(), pending));
        }
        Trigger::InFlight => tracing::debug!("Generate pressed while in flight"),
        Trigger::MissingImage => tracing::info!("Generate pressed without an image"),
    }
    Redirect::to("/")
}

/// Run encoder and generator without holding the state lock, then record the
/// outcome.
pub async fn run_generation<G: IconGenerator>(state: Arc<AppState<G>>, pending: PendingGeneration) {
    let outcome = generate_icon(&state.generator, &pending.file, &pending.prompt).await;
    state.orchestrator.write().await.finish(outcome);
}

pub async fn preview<G: IconGenerator>(
    State(state): State<Arc<AppState<G>>>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, HandlerError> {
    let not_found = || (StatusCode::NOT_FOUND, "Preview not found.".to_string());
    let id = Uuid::parse_str(&id).map_err(|_| not_found())?;
    let file = state.orchestrator.read().await.previews().get(&id).cloned().ok_or_else(not_found)?;
    let bytes = file.read().await.map_err(|e| error_response(AppError::Encoding(e)))?;
    Ok(([(header::CONTENT_TYPE, file.mime_type)], bytes))
}

pub async fn download<G: IconGenerator>(
    State(state): State<Arc<AppState<G>>>,
) -> Result<impl IntoResponse, HandlerError> {
    let icon = state
        .orchestrator
        .read()
        .await
        .result()
        .cloned()
        .ok_or_else(|| (StatusCode::NOT_FOUND, "No generated icon yet.".to_string()))?;
    let bytes = icon.png_bytes().map_err(error_response)?;
    Ok((
        [
            (header::CONTENT_TYPE, PNG_MIME.to_string()),
            (header::CONTENT_DISPOSITION, format!("attachment; filename=\"{}\"", DOWNLOAD_FILE_NAME)),
        ],
        bytes,
    ))
}
