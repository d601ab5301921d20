use crate::domain::ports::EntityRecognizer;
use std::collections::HashSet;

/// Turns text into unique `"<text> (<CATEGORY>)"` strings for the
/// ORG, GPE, LOC and PRODUCT categories.
///
/// Owns its recognizer; build it once and reuse it for the whole batch.
pub struct EntityExtractor<R: EntityRecognizer> {
    recognizer: R,
}

impl<R: EntityRecognizer> EntityExtractor<R> {
    pub fn new(recognizer: R) -> Self {
        tracing::debug!("Entity extractor ready with model '{}'", recognizer.name());
        Self { recognizer }
    }

    /// Entities in order of first appearance, without duplicates.
    pub fn extract(&self, text: &str) -> Vec<String> {
        if text.trim().is_empty() {
            return Vec::new();
        }

        let mut seen = HashSet::new();
        self.recognizer
            .recognize(text)
            .into_iter()
            .filter(|span| span.label.is_supply_chain_relevant())
            .map(|span| span.formatted())
            .filter(|entity| seen.insert(entity.clone()))
            .collect()
    }
}
