use crate::utils::error::{EtlError, Result};
use std::collections::BTreeMap;

/// Supply-chain risk keywords and their weights.
pub const DEFAULT_RISK_KEYWORDS: &[(&str, u32)] = &[
    ("fire", 3),
    ("explosion", 3),
    ("halt", 3),
    ("shutdown", 3),
    ("delay", 2),
    ("disruption", 2),
    ("strike", 2),
    ("protest", 2),
    ("shortage", 2),
    ("bankruptcy", 3),
    ("closure", 2),
    ("earthquake", 3),
    ("flood", 3),
    ("hurricane", 3),
    ("tariff", 2),
];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RiskKeyword {
    pub keyword: String,
    pub weight: u32,
}

/// Lowercase keyword to positive weight. Immutable once built.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RiskKeywordTable {
    entries: Vec<RiskKeyword>,
}

impl RiskKeywordTable {
    /// Builds a table from user supplied weights. Keywords are lowercased;
    /// empty keywords, zero weights and tables whose total weight does not
    /// fit in a `u32` score are rejected.
    pub fn from_weights<I, K>(weights: I) -> Result<Self>
    where
        I: IntoIterator<Item = (K, u32)>,
        K: AsRef<str>,
    {
        let mut merged: BTreeMap<String, u32> = BTreeMap::new();
        for (keyword, weight) in weights {
            let keyword = keyword.as_ref().trim().to_lowercase();
            if keyword.is_empty() {
                return Err(EtlError::InvalidConfigValueError {
                    field: "transform.risk_keywords".to_string(),
                    value: String::new(),
                    reason: "Keywords cannot be empty".to_string(),
                });
            }
            if weight == 0 {
                return Err(EtlError::InvalidConfigValueError {
                    field: format!("transform.risk_keywords.{}", keyword),
                    value: weight.to_string(),
                    reason: "Weights must be positive".to_string(),
                });
            }
            merged.insert(keyword, weight);
        }

        if merged.is_empty() {
            return Err(EtlError::ConfigValidationError {
                field: "transform.risk_keywords".to_string(),
                message: "At least one keyword is required".to_string(),
            });
        }

        // A score never exceeds the sum of all weights.
        let total = merged
            .values()
            .try_fold(0u32, |total, weight| total.checked_add(*weight));
        if total.is_none() {
            return Err(EtlError::ConfigValidationError {
                field: "transform.risk_keywords".to_string(),
                message: format!("Total keyword weight must not exceed {}", u32::MAX),
            });
        }

        Ok(Self {
            entries: merged
                .into_iter()
                .map(|(keyword, weight)| RiskKeyword { keyword, weight })
                .collect(),
        })
    }

    pub fn entries(&self) -> &[RiskKeyword] {
        &self.entries
    }

    pub fn weight(&self, keyword: &str) -> Option<u32> {
        self.entries
            .iter()
            .find(|entry| entry.keyword == keyword)
            .map(|entry| entry.weight)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Default for RiskKeywordTable {
    fn default() -> Self {
        Self {
            entries: DEFAULT_RISK_KEYWORDS
                .iter()
                .map(|(keyword, weight)| RiskKeyword {
                    keyword: (*keyword).to_string(),
                    weight: *weight,
                })
                .collect(),
        }
    }
}

/// Maps free text to an integer risk score.
///
/// A keyword counts once when it occurs anywhere in the lowercased text,
/// including inside longer words ("strike" matches "strikeout").
#[derive(Debug, Clone, Default)]
pub struct RiskScorer {
    table: RiskKeywordTable,
}

impl RiskScorer {
    pub fn new(table: RiskKeywordTable) -> Self {
        Self { table }
    }

    pub fn score(&self, text: &str) -> u32 {
        self.matches(text).iter().map(|entry| entry.weight).sum()
    }

    /// Keywords present in `text`, in table order.
    pub fn matches(&self, text: &str) -> Vec<&RiskKeyword> {
        if text.trim().is_empty() {
            return Vec::new();
        }
        let lowered = text.to_lowercase();
        self.table
            .entries
            .iter()
            .filter(|entry| lowered.contains(entry.keyword.as_str()))
            .collect()
    }
}
