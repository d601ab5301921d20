use crate::adapters::csv_codec::encode_raw_articles;
use crate::adapters::news_api::NewsApiArticle;
use crate::adapters::NewsApiClient;
use crate::config::TomlConfig;
use crate::core::{Pipeline, RawArticle, Storage};
use crate::utils::error::{PipelineStage, Result};

/// Fetches the latest matching articles and writes the raw articles file.
pub struct IngestionPipeline<S: Storage> {
    storage: S,
    client: NewsApiClient,
    raw_file: String,
}

impl<S: Storage> IngestionPipeline<S> {
    /// Fails when no API key can be found.
    pub fn from_config(storage: S, config: &TomlConfig) -> Result<Self> {
        let api_key = config.resolve_api_key()?;
        Ok(Self::new(
            storage,
            NewsApiClient::new(config.source.clone(), api_key),
            config.raw_file(),
        ))
    }

    pub fn new(storage: S, client: NewsApiClient, raw_file: impl Into<String>) -> Self {
        Self {
            storage,
            client,
            raw_file: raw_file.into(),
        }
    }
}

#[async_trait::async_trait]
impl<S: Storage> Pipeline for IngestionPipeline<S> {
    type Input = NewsApiArticle;
    type Output = RawArticle;

    fn stage(&self) -> PipelineStage {
        PipelineStage::Ingestion
    }

    async fn extract(&self) -> Result<Vec<NewsApiArticle>> {
        tracing::info!("📡 Fetching news from {}", self.client.endpoint());
        let articles = self.client.search().await?;
        if articles.is_empty() {
            tracing::warn!("No articles found for the keywords.");
        }
        Ok(articles)
    }

    async fn transform(&self, data: Vec<NewsApiArticle>) -> Result<Vec<RawArticle>> {
        Ok(data.into_iter().map(NewsApiArticle::into_raw).collect())
    }

    async fn load(&self, result: Vec<RawArticle>) -> Result<String> {
        let data = encode_raw_articles(&result)?;
        self.storage.write_file(&self.raw_file, &data).await?;

        let output_path = self.storage.display_path(&self.raw_file);
        tracing::info!(
            "Data ingestion complete. Saved {} articles to {}",
            result.len(),
            output_path
        );
        Ok(output_path)
    }
}
