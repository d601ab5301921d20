//! Gazetteer entity model loaded from a JSON file.
//!
//! ```json
//! {
//!   "name": "supply-chain-gazetteer",
//!   "version": "1.0.0",
//!   "entities": [{ "text": "Shanghai", "label": "GPE" }],
//!   "patterns": [{ "regex": "\\bPort of [A-Z][a-z]+", "label": "LOC" }]
//! }
//! ```
//!
//! Gazetteer entries match case-sensitively on word boundaries. Patterns use
//! `regex` crate syntax. Overlapping candidates resolve leftmost-longest,
//! gazetteer entries before patterns.

use crate::domain::model::{EntityLabel, EntitySpan};
use crate::domain::ports::EntityRecognizer;
use crate::utils::error::{EtlError, Result};
use regex::Regex;
use serde::Deserialize;
use std::path::Path;

#[derive(Debug, Deserialize)]
struct ModelFile {
    #[serde(default = "default_model_name")]
    name: String,
    #[serde(default)]
    version: Option<String>,
    #[serde(default)]
    entities: Vec<GazetteerEntry>,
    #[serde(default)]
    patterns: Vec<PatternEntry>,
}

fn default_model_name() -> String {
    "gazetteer".to_string()
}

#[derive(Debug, Clone, Deserialize)]
pub struct GazetteerEntry {
    pub text: String,
    pub label: EntityLabel,
}

#[derive(Debug, Deserialize)]
struct PatternEntry {
    regex: String,
    label: EntityLabel,
}

#[derive(Debug)]
struct CompiledPattern {
    regex: Regex,
    label: EntityLabel,
}

#[derive(Debug)]
pub struct GazetteerModel {
    name: String,
    version: Option<String>,
    entries: Vec<GazetteerEntry>,
    patterns: Vec<CompiledPattern>,
}

impl GazetteerModel {
    /// Loads the model file. A missing or malformed model is a configuration
    /// error: the transformation cannot run without it.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| EtlError::ModelUnavailable {
            path: path.display().to_string(),
            reason: e.to_string(),
        })?;

        let model = Self::from_json_str(&content).map_err(|e| match e {
            EtlError::ModelUnavailable { reason, .. } => EtlError::ModelUnavailable {
                path: path.display().to_string(),
                reason,
            },
            other => other,
        })?;

        tracing::info!(
            "🧠 Entity model '{}' {} loaded from {} ({} entries, {} patterns)",
            model.name,
            model.version.as_deref().unwrap_or("unversioned"),
            path.display(),
            model.entries.len(),
            model.patterns.len()
        );
        Ok(model)
    }

    pub fn from_json_str(content: &str) -> Result<Self> {
        let unavailable = |reason: String| EtlError::ModelUnavailable {
            path: "<inline>".to_string(),
            reason,
        };

        let file: ModelFile = serde_json::from_str(content)
            .map_err(|e| unavailable(format!("invalid model JSON: {}", e)))?;

        let entries: Vec<GazetteerEntry> = file
            .entities
            .into_iter()
            .filter(|entry| !entry.text.trim().is_empty())
            .collect();

        let patterns = file
            .patterns
            .into_iter()
            .map(|pattern| {
                Regex::new(&pattern.regex)
                    .map(|regex| CompiledPattern {
                        regex,
                        label: pattern.label,
                    })
                    .map_err(|e| unavailable(format!("invalid pattern '{}': {}", pattern.regex, e)))
            })
            .collect::<Result<Vec<_>>>()?;

        if entries.is_empty() && patterns.is_empty() {
            return Err(unavailable("model has no entities or patterns".to_string()));
        }

        Ok(Self {
            name: file.name,
            version: file.version,
            entries,
            patterns,
        })
    }

    pub fn version(&self) -> Option<&str> {
        self.version.as_deref()
    }

    pub fn entry_count(&self) -> usize {
        self.entries.len()
    }

    pub fn pattern_count(&self) -> usize {
        self.patterns.len()
    }

    fn gazetteer_candidates(&self, text: &str) -> Vec<EntitySpan> {
        let mut candidates = Vec::new();
        for entry in &self.entries {
            for (start, matched) in text.match_indices(entry.text.as_str()) {
                let end = start + matched.len();
                if on_word_boundary(text, start, end) {
                    candidates.push(EntitySpan {
                        start,
                        end,
                        text: matched.to_string(),
                        label: entry.label,
                    });
                }
            }
        }
        candidates
    }

    fn pattern_candidates(&self, text: &str) -> Vec<EntitySpan> {
        let mut candidates = Vec::new();
        for pattern in &self.patterns {
            for m in pattern.regex.find_iter(text) {
                let surface = m.as_str().trim();
                if surface.is_empty() {
                    continue;
                }
                let start = m.start() + (m.as_str().len() - m.as_str().trim_start().len());
                candidates.push(EntitySpan {
                    start,
                    end: start + surface.len(),
                    text: surface.to_string(),
                    label: pattern.label,
                });
            }
        }
        candidates
    }
}

fn on_word_boundary(text: &str, start: usize, end: usize) -> bool {
    let before = text[..start].chars().next_back();
    let after = text[end..].chars().next();
    !before.is_some_and(char::is_alphanumeric) && !after.is_some_and(char::is_alphanumeric)
}

/// Keeps the leftmost, then longest, candidate of every overlapping group.
/// Earlier candidates win ties, so gazetteer spans must come first.
fn resolve_overlaps(mut candidates: Vec<EntitySpan>) -> Vec<EntitySpan> {
    candidates.sort_by(|a, b| a.start.cmp(&b.start).then(b.len().cmp(&a.len())));

    let mut accepted: Vec<EntitySpan> = Vec::new();
    for candidate in candidates {
        if accepted.last().is_some_and(|last| last.overlaps(&candidate)) {
            continue;
        }
        accepted.push(candidate);
    }
    accepted
}

impl EntityRecognizer for GazetteerModel {
    fn name(&self) -> &str {
        &self.name
    }

    fn recognize(&self, text: &str) -> Vec<EntitySpan> {
        if text.trim().is_empty() {
            return Vec::new();
        }
        let mut candidates = self.gazetteer_candidates(text);
        candidates.extend(self.pattern_candidates(text));
        resolve_overlaps(candidates)
    }
}
