//! Upload surface: MIME validation and the preview / drop-zone markup.
use std::path::Path;

use maud::{html, Markup};

use crate::encoder::ImageFile;
use crate::error::ValidationError;
use crate::state::PreviewHandle;

pub const ACCEPTED_MIME_TYPES: [&str; 3] = ["image/png", "image/jpeg", "image/webp"];

/// Value for the file input's `accept` attribute.
pub fn accept_hint() -> String {
    ACCEPTED_MIME_TYPES.join(",")
}

/// Canonical form of a client-reported content type.
pub fn normalize_mime(mime_type: &str) -> String {
    mime_type.trim().to_ascii_lowercase()
}

pub fn is_accepted(mime_type: &str) -> bool {
    ACCEPTED_MIME_TYPES.contains(&normalize_mime(mime_type).as_str())
}

pub fn validate(file: &ImageFile) -> Result<(), ValidationError> {
    if is_accepted(&file.mime_type) {
        Ok(())
    } else {
        Err(ValidationError::UnsupportedType(file.mime_type.clone()))
    }
}

/// Take the first file of a selection or drop and validate it.
///
/// Any further files are ignored. An empty selection yields `Ok(None)`.
pub fn accept_first<I>(files: I) -> Result<Option<ImageFile>, ValidationError>
where
    I: IntoIterator<Item = ImageFile>,
{
    match files.into_iter().next() {
        Some(file) => {
            validate(&file)?;
            Ok(Some(file))
        }
        None => Ok(None),
    }
}

/// Best-effort MIME type for a path on disk, by extension.
pub fn mime_from_path(path: &Path) -> Option<&'static str> {
    let ext = path.extension()?.to_str()?.to_ascii_lowercase();
    match ext.as_str() {
        "png" => Some("image/png"),
        "jpg" | "jpeg" => Some("image/jpeg"),
        "webp" => Some("image/webp"),
        _ => None,
    }
}

/// Preview with a remove control when a handle exists, drop zone otherwise.
///
/// The remove form carries the prompt so a reset does not lose what the user
/// typed; the page script refreshes it from the prompt box on submit.
pub fn render(preview: Option<PreviewHandle>, prompt: &str, locked: bool) -> Markup {
    match preview {
        Some(handle) => html! {
            div class="upload preview" {
                img src=(handle.url()) alt="Selected image";
                form class="remove" id="remove-form" method="post" action="/reset" {
                    input type="hidden" id="reset-prompt" name="prompt" value=(prompt);
                    button type="submit" title="Remove image" aria-label="Remove image" disabled[locked] { "×" }
                }
            }
        },
        None => html! {
            label class="upload dropzone" id="dropzone" for="file-input" {
                input type="file" id="file-input" name="image" accept=(accept_hint()) hidden disabled[locked];
                p { "Drag and drop an image here, or click to browse" }
                p class="hint" { "PNG, JPG or WEBP" }
            }
        },
    }
}
