use crate::config::toml_config::SourceConfig;
use crate::domain::model::RawArticle;
use crate::utils::error::{EtlError, Result};
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;

/// Response body of a news search request.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewsSearchResponse {
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub total_results: Option<u64>,
    #[serde(default)]
    pub code: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub articles: Vec<NewsApiArticle>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewsApiArticle {
    #[serde(default)]
    pub source: Option<SourceField>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub published_at: Option<String>,
}

/// `source` is usually `{"id": ..., "name": ...}` but some feeds send a bare string.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum SourceField {
    Named {
        #[serde(default)]
        id: Option<String>,
        #[serde(default)]
        name: Option<String>,
    },
    Plain(String),
}

impl SourceField {
    pub fn display_name(&self) -> String {
        match self {
            SourceField::Named { name: Some(name), .. } => name.clone(),
            SourceField::Named { id: Some(id), .. } => id.clone(),
            SourceField::Named { .. } => String::new(),
            SourceField::Plain(name) => name.clone(),
        }
    }
}

impl NewsApiArticle {
    pub fn into_raw(self) -> RawArticle {
        RawArticle {
            title: self.title.filter(|t| !t.is_empty()),
            description: self.description.filter(|d| !d.is_empty()),
            url: self.url.unwrap_or_default(),
            published_at: self.published_at.unwrap_or_default(),
            source: self
                .source
                .as_ref()
                .map(SourceField::display_name)
                .unwrap_or_default(),
        }
    }
}

/// Client for the news search endpoint.
pub struct NewsApiClient {
    client: Client,
    source: SourceConfig,
    api_key: String,
}

impl NewsApiClient {
    pub fn new(source: SourceConfig, api_key: String) -> Self {
        Self {
            client: Client::new(),
            source,
            api_key,
        }
    }

    pub fn endpoint(&self) -> &str {
        &self.source.endpoint
    }

    pub async fn search(&self) -> Result<Vec<NewsApiArticle>> {
        let page_size = self.source.page_size.to_string();
        let request = self
            .client
            .get(&self.source.endpoint)
            .query(&[
                ("q", self.source.query.as_str()),
                ("apiKey", self.api_key.as_str()),
                ("language", self.source.language.as_str()),
                ("sortBy", self.source.sort_by.as_str()),
                ("pageSize", page_size.as_str()),
            ])
            .timeout(Duration::from_secs(self.source.timeout_seconds));

        tracing::debug!("Making API request to: {}", self.source.endpoint);
        let response = request.send().await?;
        let status = response.status();
        tracing::debug!("API response status: {}", status);

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            tracing::error!("HTTP error during API call: {}", body);
            return Err(EtlError::ApiStatusError {
                status: status.as_u16(),
                body,
            });
        }

        let body: NewsSearchResponse = response.json().await?;
        if body.status.as_deref() == Some("error") {
            return Err(EtlError::ApiStatusError {
                status: status.as_u16(),
                body: format!(
                    "{}: {}",
                    body.code.as_deref().unwrap_or("error"),
                    body.message.as_deref().unwrap_or("no message")
                ),
            });
        }

        tracing::debug!(
            "API reported {} total results, returned {}",
            body.total_results.unwrap_or(0),
            body.articles.len()
        );
        Ok(body.articles)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_source_object_and_string() {
        let body = serde_json::json!({
            "status": "ok",
            "totalResults": 3,
            "articles": [
                {"source": {"id": "reuters", "name": "Reuters"}, "title": "A", "description": null,
                 "url": "http://a", "publishedAt": "2024-01-01T00:00:00Z"},
                {"source": "Bloomberg", "title": "B", "description": "b",
                 "url": "http://b", "publishedAt": "2024-01-02T00:00:00Z"},
                {"source": {"id": null, "name": null}, "title": "", "url": "http://c",
                 "publishedAt": "2024-01-03T00:00:00Z"}
            ]
        });

        let response: NewsSearchResponse = serde_json::from_value(body).unwrap();
        let raw: Vec<RawArticle> = response
            .articles
            .into_iter()
            .map(NewsApiArticle::into_raw)
            .collect();

        assert_eq!(raw[0].source, "Reuters");
        assert_eq!(raw[0].description, None);
        assert_eq!(raw[1].source, "Bloomberg");
        assert_eq!(raw[1].description.as_deref(), Some("b"));
        assert_eq!(raw[2].source, "");
        assert_eq!(raw[2].title, None);
    }
}
