/// Result Cache — the most recent prediction per assessment type, page
/// lifetime only. Never persisted.
use std::collections::HashMap;
use std::sync::Mutex;

use crate::history::Disease;
use crate::prediction::PredictionResponse;

#[derive(Default)]
pub struct ResultCache {
    slots: Mutex<HashMap<Disease, PredictionResponse>>,
}

impl ResultCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Cloned snapshot of the slot, or `None` when nothing has completed
    /// yet (or the slot was cleared for an in-flight submission).
    pub fn get(&self, disease: Disease) -> Option<PredictionResponse> {
        self.slots.lock().unwrap().get(&disease).cloned()
    }

    pub fn set(&self, disease: Disease, response: PredictionResponse) {
        self.slots.lock().unwrap().insert(disease, response);
    }

    /// Clears one slot so a stale result never lingers during a new
    /// submission.
    pub fn clear(&self, disease: Disease) {
        self.slots.lock().unwrap().remove(&disease);
    }

    pub fn clear_all(&self) {
        self.slots.lock().unwrap().clear();
    }
}
