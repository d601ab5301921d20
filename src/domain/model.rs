use serde::{Deserialize, Serialize};

/// Column order of the raw articles file.
pub const RAW_COLUMNS: [&str; 5] = ["title", "description", "url", "publishedAt", "source"];

/// Column order of the processed articles file.
pub const PROCESSED_COLUMNS: [&str; 7] = [
    "publishedAt",
    "title",
    "risk_score",
    "entities",
    "source",
    "url",
    "description",
];

/// An article as received from the news source, before scoring.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawArticle {
    pub title: Option<String>,
    pub description: Option<String>,
    #[serde(default)]
    pub url: String,
    #[serde(rename = "publishedAt", default)]
    pub published_at: String,
    #[serde(default)]
    pub source: String,
}

impl RawArticle {
    /// Title and description joined by a single space, absent parts as empty.
    pub fn full_text(&self) -> String {
        format!(
            "{} {}",
            self.title.as_deref().unwrap_or(""),
            self.description.as_deref().unwrap_or("")
        )
    }
}

/// A raw article augmented with its risk score and recognized entities.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScoredArticle {
    pub title: Option<String>,
    pub description: Option<String>,
    pub url: String,
    pub published_at: String,
    pub source: String,
    pub risk_score: u32,
    pub entities: Vec<String>,
}

impl ScoredArticle {
    pub fn from_raw(raw: &RawArticle, risk_score: u32, entities: Vec<String>) -> Self {
        Self {
            title: raw.title.clone(),
            description: raw.description.clone(),
            url: raw.url.clone(),
            published_at: raw.published_at.clone(),
            source: raw.source.clone(),
            risk_score,
            entities,
        }
    }
}

/// One row of the processed file, with `entities` in its textual list form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProcessedRow {
    #[serde(rename = "publishedAt", default)]
    pub published_at: String,
    pub title: Option<String>,
    pub risk_score: u32,
    #[serde(default)]
    pub entities: String,
    #[serde(default)]
    pub source: String,
    #[serde(default)]
    pub url: String,
    pub description: Option<String>,
}

/// Category code attached to a recognized span.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum EntityLabel {
    Org,
    Gpe,
    Loc,
    Product,
    Person,
    Norp,
    Fac,
    Event,
    Date,
    #[serde(other)]
    Other,
}

impl EntityLabel {
    pub fn code(&self) -> &'static str {
        match self {
            EntityLabel::Org => "ORG",
            EntityLabel::Gpe => "GPE",
            EntityLabel::Loc => "LOC",
            EntityLabel::Product => "PRODUCT",
            EntityLabel::Person => "PERSON",
            EntityLabel::Norp => "NORP",
            EntityLabel::Fac => "FAC",
            EntityLabel::Event => "EVENT",
            EntityLabel::Date => "DATE",
            EntityLabel::Other => "OTHER",
        }
    }

    /// Companies, places and products: the categories kept on scored articles.
    pub fn is_supply_chain_relevant(&self) -> bool {
        matches!(
            self,
            EntityLabel::Org | EntityLabel::Gpe | EntityLabel::Loc | EntityLabel::Product
        )
    }
}

/// A labelled byte range of the input text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntitySpan {
    pub start: usize,
    pub end: usize,
    pub text: String,
    pub label: EntityLabel,
}

impl EntitySpan {
    pub fn formatted(&self) -> String {
        format!("{} ({})", self.text, self.label.code())
    }

    pub fn len(&self) -> usize {
        self.end - self.start
    }

    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }

    pub fn overlaps(&self, other: &EntitySpan) -> bool {
        self.start < other.end && other.start < self.end
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_entity_label_codes_parse_back() {
        let label: EntityLabel = serde_json::from_str("\"GPE\"").unwrap();
        assert_eq!(label, EntityLabel::Gpe);
        assert_eq!(label.code(), "GPE");

        let unknown: EntityLabel = serde_json::from_str("\"WORK_OF_ART\"").unwrap();
        assert_eq!(unknown, EntityLabel::Other);
        assert!(!unknown.is_supply_chain_relevant());
    }

    #[test]
    fn test_span_formatting() {
        let span = EntitySpan {
            start: 0,
            end: 9,
            text: "Acme Inc.".to_string(),
            label: EntityLabel::Org,
        };
        assert_eq!(span.formatted(), "Acme Inc. (ORG)");
    }

    fn article(title: Option<&str>, description: Option<&str>) -> RawArticle {
        RawArticle {
            title: title.map(str::to_string),
            description: description.map(str::to_string),
            url: "http://x".to_string(),
            published_at: "2024-01-01T00:00:00Z".to_string(),
            source: "Reuters".to_string(),
        }
    }

    #[test]
    fn test_full_text_joins_with_single_space() {
        let raw = article(Some("Port closure halts shipments"), Some("Strike at the port"));
        assert_eq!(raw.full_text(), "Port closure halts shipments Strike at the port");
    }

    #[test]
    fn test_full_text_treats_absent_as_empty() {
        assert_eq!(article(None, Some("Flood")).full_text(), " Flood");
        assert_eq!(article(Some("Flood"), None).full_text(), "Flood ");
        assert_eq!(article(None, None).full_text(), " ");
    }
}
