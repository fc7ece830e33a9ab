//! Session state: the orchestrator and the preview handles it owns.
pub mod orchestrator;
pub mod preview;

pub use orchestrator::{ImageSelection, Orchestrator, PendingGeneration, Phase, Trigger, DEFAULT_PROMPT};
pub use preview::{PreviewHandle, PreviewStore};
