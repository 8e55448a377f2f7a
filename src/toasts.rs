use rand::seq::SliceRandom;
use rand::Rng;
use std::path::Path;
use tracing::{error, info, warn};

use crate::error::ComposeError;

/// Placeholder substituted with the holiday name
pub const PLACEHOLDER: &str = "{holiday}";

/// A congratulatory phrase with a holiday-name placeholder
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToastTemplate(String);

impl ToastTemplate {
    /// Substitute the holiday name into the template
    pub fn render(&self, holiday: &str) -> Result<String, ComposeError> {
        if !self.0.contains(PLACEHOLDER) {
            return Err(ComposeError::MissingPlaceholder(self.0.clone()));
        }
        Ok(self.0.replace(PLACEHOLDER, holiday))
    }
}

/// Immutable list of toast templates, loaded once at startup
#[derive(Debug, Clone, Default)]
pub struct ToastStore {
    templates: Vec<ToastTemplate>,
}

impl ToastStore {
    /// Load templates from a JSON array of strings.
    ///
    /// Never fails: a missing or malformed file gives an empty store.
    pub fn load(path: &Path) -> Self {
        let raw = match std::fs::read_to_string(path) {
            Ok(raw) => raw,
            Err(e) => {
                error!(path = %path.display(), error = %e, "Failed to read toast templates");
                return Self::default();
            }
        };

        let values: Vec<serde_json::Value> = match serde_json::from_str(&raw) {
            Ok(values) => values,
            Err(e) => {
                error!(path = %path.display(), error = %e, "Failed to parse toast templates");
                return Self::default();
            }
        };

        let templates = values
            .into_iter()
            .filter_map(|v| match v {
                serde_json::Value::String(s) => Some(s),
                _ => None,
            })
            .collect();

        let store = Self::from_templates(templates);
        info!(path = %path.display(), count = store.len(), "Loaded toast templates");
        store
    }

    /// Build a store from in-memory templates, applying the same filtering as `load`
    pub fn from_templates(templates: Vec<String>) -> Self {
        let templates = templates
            .into_iter()
            .filter(|t| !t.trim().is_empty())
            .filter(|t| {
                let ok = t.contains(PLACEHOLDER);
                if !ok {
                    warn!(template = %t, "Dropping toast template without {{holiday}} placeholder");
                }
                ok
            })
            .map(ToastTemplate)
            .collect();

        Self { templates }
    }

    pub fn len(&self) -> usize {
        self.templates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.templates.is_empty()
    }

    /// Choose a template uniformly at random
    pub fn pick<R: Rng + ?Sized>(&self, rng: &mut R) -> Result<&ToastTemplate, ComposeError> {
        self.templates.choose(rng).ok_or(ComposeError::NoToasts)
    }
}
