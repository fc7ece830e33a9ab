//! The page-level state machine.
//!
//! [`Orchestrator`] owns the selected image, its preview handle, the prompt
//! text and the outcome of the last generation. The outcome lives in
//! [`Phase`], so a result and an error can never be present together.
use crate::encoder::ImageFile;
use crate::error::{AppError, AppResult, ValidationError};
use crate::generation::{generate_icon, GeneratedIcon, IconGenerator};
use super::preview::{PreviewHandle, PreviewStore};

pub const DEFAULT_PROMPT: &str = "load data to database";

#[derive(Debug, Clone)]
pub struct ImageSelection {
    pub file: ImageFile,
    pub preview: PreviewHandle,
}

#[derive(Debug)]
pub enum Phase {
    Idle,
    ImageSelected(ImageSelection),
    Generating(ImageSelection),
    Succeeded { selection: ImageSelection, icon: GeneratedIcon },
    /// `selection` is `None` when generation was triggered without an image.
    Failed { selection: Option<ImageSelection>, message: String },
}

impl Phase {
    pub fn name(&self) -> &'static str {
        match self {
            Phase::Idle => "idle",
            Phase::ImageSelected(_) => "image_selected",
            Phase::Generating(_) => "generating",
            Phase::Succeeded { .. } => "succeeded",
            Phase::Failed { .. } => "failed",
        }
    }

    fn selection(&self) -> Option<&ImageSelection> {
        match self {
            Phase::Idle => None,
            Phase::ImageSelected(s) | Phase::Generating(s) => Some(s),
            Phase::Succeeded { selection, .. } => Some(selection),
            Phase::Failed { selection, .. } => selection.as_ref(),
        }
    }

    fn into_selection(self) -> Option<ImageSelection> {
        match self {
            Phase::Idle => None,
            Phase::ImageSelected(s) | Phase::Generating(s) => Some(s),
            Phase::Succeeded { selection, .. } => Some(selection),
            Phase::Failed { selection, .. } => selection,
        }
    }
}

/// Work handed out by [`Orchestrator::trigger`], to be run outside the state.
#[derive(Debug, Clone)]
pub struct PendingGeneration {
    pub file: ImageFile,
    pub prompt: String,
}

#[derive(Debug)]
pub enum Trigger {
    Dispatched(PendingGeneration),
    /// A request is already in flight; nothing changed.
    InFlight,
    /// No image selected; the validation error is now shown.
    MissingImage,
}

#[derive(Debug)]
pub struct Orchestrator {
    phase: Phase,
    prompt: String,
    previews: PreviewStore,
}

impl Default for Orchestrator {
    fn default() -> Self {
        Self::new()
    }
}

impl Orchestrator {
    pub fn new() -> Self {
        Orchestrator { phase: Phase::Idle, prompt: DEFAULT_PROMPT.to_string(), previews: PreviewStore::default() }
    }

    pub fn phase(&self) -> &Phase {
        &self.phase
    }

    pub fn prompt(&self) -> &str {
        &self.prompt
    }

    pub fn set_prompt(&mut self, prompt: impl Into<String>) {
        self.prompt = prompt.into();
    }

    pub fn previews(&self) -> &PreviewStore {
        &self.previews
    }

    pub fn selection(&self) -> Option<&ImageSelection> {
        self.phase.selection()
    }

    pub fn preview_handle(&self) -> Option<PreviewHandle> {
        self.selection().map(|s| s.preview)
    }

    pub fn is_in_flight(&self) -> bool {
        matches!(self.phase, Phase::Generating(_))
    }

    /// Whether the trigger control is enabled.
    pub fn can_trigger(&self) -> bool {
        self.selection().is_some() && !self.is_in_flight()
    }

    pub fn result(&self) -> Option<&GeneratedIcon> {
        match &self.phase {
            Phase::Succeeded { icon, .. } => Some(icon),
            _ => None,
        }
    }

    pub fn error(&self) -> Option<&str> {
        match &self.phase {
            Phase::Failed { message, .. } => Some(message),
            _ => None,
        }
    }

    /// Replace the selection with an already-validated file.
    ///
    /// Clears any result or error. The previous preview is released before the
    /// new one is acquired.
    pub fn on_image_upload(&mut self, file: ImageFile) -> AppResult<PreviewHandle> {
        if self.is_in_flight() {
            return Err(AppError::InFlight);
        }
        let previous = std::mem::replace(&mut self.phase, Phase::Idle);
        if let Some(old) = previous.into_selection() {
            self.previews.release(old.preview);
        }
        let preview = self.previews.acquire(&file);
        tracing::info!(file = %file.name, mime = %file.mime_type, "Image selected");
        self.phase = Phase::ImageSelected(ImageSelection { file, preview });
        Ok(preview)
    }

    /// Discard the selection and any outcome. The prompt is kept.
    pub fn reset(&mut self) -> AppResult<()> {
        if self.is_in_flight() {
            return Err(AppError::InFlight);
        }
        let previous = std::mem::replace(&mut self.phase, Phase::Idle);
        if let Some(old) = previous.into_selection() {
            self.previews.release(old.preview);
        }
        tracing::info!("Selection reset");
        Ok(())
    }

    /// Enter `Generating` if possible, clearing the previous result and error.
    pub fn trigger(&mut self) -> Trigger {
        if self.is_in_flight() {
            tracing::debug!("Trigger ignored, request already in flight");
            return Trigger::InFlight;
        }
        let previous = std::mem::replace(&mut self.phase, Phase::Idle);
        match previous.into_selection() {
            Some(selection) => {
                let pending = PendingGeneration { file: selection.file.clone(), prompt: self.prompt.clone() };
                self.phase = Phase::Generating(selection);
                tracing::info!(file = %pending.file.name, "Generation dispatched");
                Trigger::Dispatched(pending)
            }
            None => {
                tracing::warn!("Generation triggered without an image");
                self.phase = Phase::Failed {
                    selection: None,
                    message: ValidationError::MissingImage.to_string(),
                };
                Trigger::MissingImage
            }
        }
    }

    /// Apply a prompt edit from the page, then trigger.
    ///
    /// A trigger refused because a request is in flight leaves the prompt as
    /// it was dispatched.
    pub fn trigger_with_prompt(&mut self, prompt: Option<String>) -> Trigger {
        if self.is_in_flight() {
            tracing::debug!("Trigger ignored, request already in flight");
            return Trigger::InFlight;
        }
        if let Some(prompt) = prompt {
            self.prompt = prompt;
        }
        self.trigger()
    }

    /// Record the outcome of a dispatched generation.
    ///
    /// Outcomes arriving when nothing is in flight are dropped.
    pub fn finish(&mut self, outcome: AppResult<GeneratedIcon>) {
        self.phase = match std::mem::replace(&mut self.phase, Phase::Idle) {
            Phase::Generating(selection) => match outcome {
                Ok(icon) => Phase::Succeeded { selection, icon },
                Err(e) => {
                    let message = e.user_message();
                    tracing::error!("Generation failed: {}", message);
                    Phase::Failed { selection: Some(selection), message }
                }
            },
            other => {
                tracing::warn!(phase = other.name(), "Dropping generation outcome, nothing in flight");
                other
            }
        };
    }

    /// Trigger, run and record one generation while holding the state.
    pub async fn generate_with<G: IconGenerator>(&mut self, generator: &G) -> Trigger {
        let trigger = self.trigger();
        if let Trigger::Dispatched(pending) = &trigger {
            let outcome = generate_icon(generator, &pending.file, &pending.prompt).await;
            self.finish(outcome);
        }
        trigger
    }
}
