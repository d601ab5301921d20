use crate::adapters::csv_codec::{decode_raw_articles, encode_processed_articles};
use crate::adapters::GazetteerModel;
use crate::config::TomlConfig;
use crate::core::{EntityRecognizer, Pipeline, RawArticle, ScoredArticle, Storage};
use crate::domain::services::{EntityExtractor, RiskScorer};
use crate::utils::error::{PipelineStage, Result};

/// Reads the raw articles file, scores every article and writes the
/// processed file ranked by risk.
pub struct TransformationPipeline<S: Storage, R: EntityRecognizer> {
    storage: S,
    scorer: RiskScorer,
    extractor: EntityExtractor<R>,
    raw_file: String,
    processed_file: String,
}

impl<S: Storage> TransformationPipeline<S, GazetteerModel> {
    /// Loads the entity model named by the config. Fails before any article is
    /// read when the model is unavailable.
    pub fn from_config(storage: S, config: &TomlConfig) -> Result<Self> {
        let model = GazetteerModel::load(config.model_path())?;
        let scorer = RiskScorer::new(config.risk_keyword_table()?);
        Ok(Self::new(
            storage,
            scorer,
            EntityExtractor::new(model),
            config.raw_file(),
            config.processed_file(),
        ))
    }
}

impl<S: Storage, R: EntityRecognizer> TransformationPipeline<S, R> {
    pub fn new(
        storage: S,
        scorer: RiskScorer,
        extractor: EntityExtractor<R>,
        raw_file: impl Into<String>,
        processed_file: impl Into<String>,
    ) -> Self {
        Self {
            storage,
            scorer,
            extractor,
            raw_file: raw_file.into(),
            processed_file: processed_file.into(),
        }
    }

    pub fn score_article(&self, article: &RawArticle) -> ScoredArticle {
        let full_text = article.full_text();
        let risk_score = self.scorer.score(&full_text);
        let entities = self.extractor.extract(&full_text);

        if tracing::enabled!(tracing::Level::DEBUG) {
            let keywords: Vec<&str> = self
                .scorer
                .matches(&full_text)
                .iter()
                .map(|entry| entry.keyword.as_str())
                .collect();
            tracing::debug!(
                "Scored '{}': {} (keywords: {:?}, entities: {})",
                article.title.as_deref().unwrap_or(""),
                risk_score,
                keywords,
                entities.len()
            );
        }

        ScoredArticle::from_raw(article, risk_score, entities)
    }

    /// Scores articles one at a time and sorts by descending risk. Ties keep
    /// their input order.
    pub fn score_batch(&self, articles: &[RawArticle]) -> Vec<ScoredArticle> {
        let mut scored: Vec<ScoredArticle> =
            articles.iter().map(|article| self.score_article(article)).collect();
        rank_by_risk(&mut scored);
        scored
    }
}

pub fn rank_by_risk(articles: &mut [ScoredArticle]) {
    articles.sort_by(|a, b| b.risk_score.cmp(&a.risk_score));
}

#[async_trait::async_trait]
impl<S: Storage, R: EntityRecognizer> Pipeline for TransformationPipeline<S, R> {
    type Input = RawArticle;
    type Output = ScoredArticle;

    fn stage(&self) -> PipelineStage {
        PipelineStage::Transformation
    }

    async fn extract(&self) -> Result<Vec<RawArticle>> {
        tracing::info!(
            "📄 Reading raw articles from {}",
            self.storage.display_path(&self.raw_file)
        );
        let data = self.storage.read_file(&self.raw_file).await?;
        decode_raw_articles(&data)
    }

    async fn transform(&self, data: Vec<RawArticle>) -> Result<Vec<ScoredArticle>> {
        tracing::info!("Processing {} articles...", data.len());
        let scored = self.score_batch(&data);

        let at_risk = scored.iter().filter(|a| a.risk_score > 0).count();
        tracing::info!(
            "✅ {} of {} articles carry supply chain risk",
            at_risk,
            scored.len()
        );
        Ok(scored)
    }

    async fn load(&self, result: Vec<ScoredArticle>) -> Result<String> {
        let data = encode_processed_articles(&result)?;
        self.storage.write_file(&self.processed_file, &data).await?;

        let output_path = self.storage.display_path(&self.processed_file);
        tracing::info!(
            "Data transformation complete. Saved {} articles to {}",
            result.len(),
            output_path
        );
        Ok(output_path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::model::{EntityLabel, EntitySpan};
    use crate::utils::error::EtlError;
    use std::collections::HashMap;
    use std::sync::Arc;
    use tokio::sync::Mutex;

    #[derive(Clone)]
    struct MockStorage {
        files: Arc<Mutex<HashMap<String, Vec<u8>>>>,
    }

    impl MockStorage {
        fn new() -> Self {
            Self {
                files: Arc::new(Mutex::new(HashMap::new())),
            }
        }

        async fn put(&self, path: &str, data: &[u8]) {
            self.files.lock().await.insert(path.to_string(), data.to_vec());
        }

        async fn get_file(&self, path: &str) -> Option<Vec<u8>> {
            self.files.lock().await.get(path).cloned()
        }
    }

    impl Storage for MockStorage {
        async fn read_file(&self, path: &str) -> Result<Vec<u8>> {
            let files = self.files.lock().await;
            files.get(path).cloned().ok_or_else(|| {
                EtlError::IoError(std::io::Error::new(
                    std::io::ErrorKind::NotFound,
                    format!("File not found: {}", path),
                ))
            })
        }

        async fn write_file(&self, path: &str, data: &[u8]) -> Result<()> {
            self.put(path, data).await;
            Ok(())
        }

        async fn exists(&self, path: &str) -> bool {
            self.files.lock().await.contains_key(path)
        }

        fn display_path(&self, path: &str) -> String {
            format!("memory://{}", path)
        }
    }

    /// Tags every occurrence of a few fixed words.
    struct KeywordRecognizer;

    impl EntityRecognizer for KeywordRecognizer {
        fn name(&self) -> &str {
            "keywords"
        }

        fn recognize(&self, text: &str) -> Vec<EntitySpan> {
            let known = [
                ("Reuters", EntityLabel::Org),
                ("Shanghai", EntityLabel::Gpe),
                ("Monday", EntityLabel::Date),
            ];
            let mut spans = Vec::new();
            for (word, label) in known {
                for (start, _) in text.match_indices(word) {
                    spans.push(EntitySpan {
                        start,
                        end: start + word.len(),
                        text: word.to_string(),
                        label,
                    });
                }
            }
            spans.sort_by_key(|span| span.start);
            spans
        }
    }

    fn pipeline(storage: MockStorage) -> TransformationPipeline<MockStorage, KeywordRecognizer> {
        TransformationPipeline::new(
            storage,
            RiskScorer::default(),
            EntityExtractor::new(KeywordRecognizer),
            "raw_articles.csv",
            "processed_articles.csv",
        )
    }

    fn raw(title: &str, description: Option<&str>) -> RawArticle {
        RawArticle {
            title: Some(title.to_string()),
            description: description.map(str::to_string),
            url: format!("http://news/{}", title.len()),
            published_at: "2024-01-01T00:00:00Z".to_string(),
            source: "Wire".to_string(),
        }
    }

    #[test]
    fn test_score_article_combines_title_and_description() {
        let pipeline = pipeline(MockStorage::new());
        let scored = pipeline.score_article(&raw(
            "Port closure halts shipments",
            Some("Strike at the port"),
        ));

        assert_eq!(scored.risk_score, 7);
        assert!(scored.entities.is_empty());
        assert_eq!(scored.source, "Wire");
    }

    #[test]
    fn test_score_article_with_absent_text() {
        let pipeline = pipeline(MockStorage::new());
        let mut article = raw("", None);
        article.title = None;

        let scored = pipeline.score_article(&article);
        assert_eq!(scored.risk_score, 0);
        assert!(scored.entities.is_empty());
    }

    #[test]
    fn test_entities_are_filtered_and_unique() {
        let pipeline = pipeline(MockStorage::new());
        let scored = pipeline.score_article(&raw(
            "Shanghai flood on Monday",
            Some("Reuters reports Shanghai lockdown, Reuters says"),
        ));

        assert_eq!(scored.entities, vec!["Shanghai (GPE)", "Reuters (ORG)"]);
    }

    #[test]
    fn test_score_batch_sorts_descending_and_keeps_ties_in_order() {
        let pipeline = pipeline(MockStorage::new());
        let articles = vec![
            raw("Quiet day", None),
            raw("Tariff talk", None),
            raw("Explosion and fire", Some("shutdown")),
            raw("Strike ends", None),
            raw("Nothing new", None),
        ];

        let scored = pipeline.score_batch(&articles);

        assert_eq!(scored.len(), articles.len());
        let titles: Vec<&str> = scored.iter().filter_map(|a| a.title.as_deref()).collect();
        assert_eq!(
            titles,
            vec![
                "Explosion and fire",
                "Tariff talk",
                "Strike ends",
                "Quiet day",
                "Nothing new"
            ]
        );
        assert!(scored.windows(2).all(|w| w[0].risk_score >= w[1].risk_score));
    }

    #[tokio::test]
    async fn test_missing_raw_file_writes_nothing() {
        let storage = MockStorage::new();
        let pipeline = pipeline(storage.clone());

        let err = pipeline.extract().await.unwrap_err();
        assert!(matches!(err, EtlError::IoError(_)));
        assert!(storage.get_file("processed_articles.csv").await.is_none());
    }

    #[tokio::test]
    async fn test_extract_transform_load() {
        let storage = MockStorage::new();
        storage
            .put(
                "raw_articles.csv",
                b"title,description,url,publishedAt,source\n\
Calm markets,,http://a,2024-01-02T00:00:00Z,AP\n\
Shanghai port closure,Typhoon delay,http://b,2024-01-03T00:00:00Z,Reuters\n",
            )
            .await;
        let pipeline = pipeline(storage.clone());

        let raw = pipeline.extract().await.unwrap();
        let scored = pipeline.transform(raw).await.unwrap();
        let output = pipeline.load(scored).await.unwrap();

        assert_eq!(output, "memory://processed_articles.csv");
        let written = String::from_utf8(storage.get_file("processed_articles.csv").await.unwrap()).unwrap();
        let lines: Vec<&str> = written.lines().collect();
        assert_eq!(lines.len(), 3);
        assert_eq!(
            lines[0],
            "publishedAt,title,risk_score,entities,source,url,description"
        );
        assert_eq!(
            lines[1],
            "2024-01-03T00:00:00Z,Shanghai port closure,4,['Shanghai (GPE)'],Reuters,http://b,Typhoon delay"
        );
        assert_eq!(lines[2], "2024-01-02T00:00:00Z,Calm markets,0,[],AP,http://a,");
    }
}
