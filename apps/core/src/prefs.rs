/// Language preference, persisted under the `language` key.
use std::sync::Arc;

use crate::store::{keys, KeyValueStore};

pub const DEFAULT_LANGUAGE: &str = "en";

#[derive(Clone)]
pub struct Preferences {
    store: Arc<dyn KeyValueStore>,
}

impl Preferences {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self { store }
    }

    /// Current locale tag, e.g. `en` or `bn`.
    pub fn language(&self) -> String {
        self.store
            .get(keys::LANGUAGE)
            .unwrap_or_else(|| DEFAULT_LANGUAGE.to_string())
    }

    pub fn set_language(&self, tag: &str) {
        self.store.set(keys::LANGUAGE, tag);
    }
}
