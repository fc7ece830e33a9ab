//! Icon Forge library
//!
//! Modules:
//! - `api`: Axum handlers and router for the browser page.
//! - `encoder`: Image file handles and base64 payload encoding.
//! - `generation`: The `IconGenerator` contract and encode-then-generate pipeline.
//! - `gemini`: Gemini `generateContent` client implementing `IconGenerator`.
//! - `prompt`: Icon instruction templating with `{{placeholder}}` replacement.
//! - `state`: The orchestrator state machine and preview handles.
//! - `ui`: Server-rendered upload surface, result surface and page.
//! - `config`: Env-driven configuration loader.
//! - `error`: Common error type and alias.
//!
//! Re-exports are provided for common types: `Config`, `GeminiClient`,
//! `Orchestrator`, `ImageFile` and `IconGenerator`.
pub mod api;
pub mod encoder;
pub mod generation;
pub mod gemini;
pub mod prompt;
pub mod state;
pub mod ui;
pub mod config;
pub mod error;

pub use config::Config;
pub use encoder::{EncodedImage, ImageFile};
pub use gemini::client::GeminiClient;
pub use generation::{GeneratedIcon, IconGenerator};
pub use state::Orchestrator;
