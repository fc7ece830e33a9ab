//! Revocable preview handles for the currently selected image.
//!
//! A handle is a URL the page can point an `<img>` at. Once released, the URL
//! stops resolving.
use std::collections::HashMap;

use uuid::Uuid;

use crate::encoder::ImageFile;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PreviewHandle(Uuid);

impl PreviewHandle {
    pub fn id(&self) -> Uuid {
        self.0
    }

    pub fn url(&self) -> String {
        format!("/preview/{}", self.0)
    }
}

#[derive(Debug, Default)]
pub struct PreviewStore {
    live: HashMap<Uuid, ImageFile>,
}

impl PreviewStore {
    pub fn acquire(&mut self, file: &ImageFile) -> PreviewHandle {
        let id = Uuid::new_v4();
        self.live.insert(id, file.clone());
        tracing::debug!(%id, "Preview acquired");
        PreviewHandle(id)
    }

    /// Returns false when the handle was already released.
    pub fn release(&mut self, handle: PreviewHandle) -> bool {
        let released = self.live.remove(&handle.0).is_some();
        if released {
            tracing::debug!(id = %handle.0, "Preview released");
        }
        released
    }

    pub fn get(&self, id: &Uuid) -> Option<&ImageFile> {
        self.live.get(id)
    }

    pub fn is_live(&self, handle: &PreviewHandle) -> bool {
        self.live.contains_key(&handle.0)
    }

    pub fn live_count(&self) -> usize {
        self.live.len()
    }
}
