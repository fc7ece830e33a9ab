//! The generation contract and the encode-then-generate pipeline.
use std::future::Future;

use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};

use crate::encoder::{self, data_url, strip_data_url_prefix, ImageFile};
use crate::error::{AppError, AppResult};

pub const DOWNLOAD_FILE_NAME: &str = "generated-icon.png";
pub const PNG_MIME: &str = "image/png";

/// Anything that can turn an encoded image plus a purpose into a PNG.
///
/// Implementations return the raw base64 PNG payload (no data-URL prefix) and
/// report every failure as [`AppError::Generation`]. Exactly one remote attempt
/// is made per call.
pub trait IconGenerator: Send + Sync + 'static {
    fn generate(
        &self,
        base64_data: &str,
        mime_type: &str,
        prompt_text: &str,
    ) -> impl Future<Output = AppResult<String>> + Send;
}

/// A generated icon, kept as a `data:image/png;base64,...` URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedIcon {
    data_url: String,
}

impl GeneratedIcon {
    pub fn from_base64_png(payload: &str) -> Self {
        GeneratedIcon { data_url: data_url(PNG_MIME, payload) }
    }

    pub fn data_url(&self) -> &str {
        &self.data_url
    }

    pub fn base64_payload(&self) -> &str {
        strip_data_url_prefix(&self.data_url)
    }

    pub fn png_bytes(&self) -> AppResult<Vec<u8>> {
        Ok(BASE64.decode(self.base64_payload())?)
    }
}

/// Encode `file`, then hand it to `generator` with `prompt`.
///
/// The generator is only called once the encoder has finished.
pub async fn generate_icon<G: IconGenerator>(
    generator: &G,
    file: &ImageFile,
    prompt: &str,
) -> AppResult<GeneratedIcon> {
    let encoded = encoder::encode(file).await?;
    if encoded.base64_data.is_empty() {
        return Err(AppError::Generation("The selected image is empty.".to_string()));
    }
    tracing::info!(file = %file.name, mime = %encoded.mime_type, "Requesting icon generation");
    let payload = generator
        .generate(&encoded.base64_data, &encoded.mime_type, prompt)
        .await?;
    tracing::info!(bytes = payload.len(), "Icon generated");
    Ok(GeneratedIcon::from_base64_png(&payload))
}
