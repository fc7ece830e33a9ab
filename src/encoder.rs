//! Image file handles and their conversion into base64 payloads.
//!
//! An [`ImageFile`] is either bytes already received (a browser upload) or a
//! path on disk (the CLI). Encoding reads the file, builds the data URL
//! `data:<mime>;base64,<payload>` and keeps only the payload after the first
//! comma, which is what the generation endpoint expects.
use std::path::PathBuf;

use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};

use crate::error::{AppError, AppResult};

#[derive(Debug, Clone)]
pub enum ImageSource {
    Bytes(Vec<u8>),
    Path(PathBuf),
}

/// A user-supplied image, not yet read or encoded.
#[derive(Debug, Clone)]
pub struct ImageFile {
    pub name: String,
    pub mime_type: String,
    pub source: ImageSource,
}

impl ImageFile {
    pub fn from_bytes(name: impl Into<String>, mime_type: impl Into<String>, bytes: Vec<u8>) -> Self {
        ImageFile { name: name.into(), mime_type: mime_type.into(), source: ImageSource::Bytes(bytes) }
    }

    pub fn from_path(path: impl Into<PathBuf>, mime_type: impl Into<String>) -> Self {
        let path = path.into();
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        ImageFile { name, mime_type: mime_type.into(), source: ImageSource::Path(path) }
    }

    /// Read the full contents; suspends on disk-backed files.
    pub async fn read(&self) -> std::io::Result<Vec<u8>> {
        match &self.source {
            ImageSource::Bytes(b) => Ok(b.clone()),
            ImageSource::Path(p) => tokio::fs::read(p).await,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodedImage {
    pub base64_data: String,
    pub mime_type: String,
}

impl EncodedImage {
    pub fn to_data_url(&self) -> String {
        data_url(&self.mime_type, &self.base64_data)
    }
}

pub fn data_url(mime_type: &str, base64_data: &str) -> String {
    format!("data:{};base64,{}", mime_type, base64_data)
}

/// Everything after the first comma; input without a comma is returned as is.
pub fn strip_data_url_prefix(url: &str) -> &str {
    match url.split_once(',') {
        Some((_, payload)) => payload,
        None => url,
    }
}

/// Read `file` and produce its base64 payload and MIME tag.
///
/// Read failures are returned unchanged as [`AppError::Encoding`].
pub async fn encode(file: &ImageFile) -> AppResult<EncodedImage> {
    let bytes = file.read().await.map_err(AppError::Encoding)?;
    let url = data_url(&file.mime_type, &BASE64.encode(&bytes));
    tracing::debug!(file = %file.name, bytes = bytes.len(), "Encoded image");
    Ok(EncodedImage {
        base64_data: strip_data_url_prefix(&url).to_string(),
        mime_type: file.mime_type.clone(),
    })
}
