use anyhow::Result;
use httpmock::prelude::*;
use supply_risk_forecaster::adapters::csv_codec::decode_raw_articles;
use supply_risk_forecaster::config::toml_config::DEFAULT_QUERY;
use supply_risk_forecaster::utils::error::{ErrorCategory, PipelineStage, PipelineStep};
use supply_risk_forecaster::{EtlEngine, EtlError, IngestionPipeline, LocalStorage, TomlConfig};
use tempfile::TempDir;

fn config_for(server: &MockServer, dir: &TempDir) -> TomlConfig {
    let mut config = TomlConfig::default();
    config.source.endpoint = server.url("/v2/everything");
    config.source.api_key = Some("test-key".to_string());
    config.load.artifacts_dir = dir.path().to_string_lossy().into_owned();
    config
}

async fn ingest(config: &TomlConfig) -> Result<String, EtlError> {
    let storage = LocalStorage::new(config.artifacts_dir());
    let pipeline = IngestionPipeline::from_config(storage, config)?;
    EtlEngine::new(pipeline).run().await
}

#[tokio::test]
async fn test_ingestion_writes_raw_articles() -> Result<()> {
    let dir = TempDir::new()?;
    let server = MockServer::start();

    let api_mock = server.mock(|when, then| {
        when.method(GET)
            .path("/v2/everything")
            .query_param("q", DEFAULT_QUERY)
            .query_param("apiKey", "test-key")
            .query_param("language", "en")
            .query_param("sortBy", "publishedAt")
            .query_param("pageSize", "100");
        then.status(200)
            .header("Content-Type", "application/json")
            .json_body(serde_json::json!({
                "status": "ok",
                "totalResults": 2,
                "articles": [
                    {
                        "source": {"id": "reuters", "name": "Reuters"},
                        "author": "Staff",
                        "title": "Port closure halts shipments",
                        "description": "Strike at the port, unions say",
                        "url": "http://x",
                        "urlToImage": null,
                        "publishedAt": "2024-01-01T00:00:00Z",
                        "content": "..."
                    },
                    {
                        "source": {"id": null, "name": "Supply Chain Dive"},
                        "title": "Warehouse automation gains",
                        "description": null,
                        "url": "http://y",
                        "publishedAt": "2024-01-02T00:00:00Z"
                    }
                ]
            }));
    });

    let output = ingest(&config_for(&server, &dir)).await?;

    api_mock.assert();
    assert!(output.ends_with("raw_articles.csv"));

    let data = std::fs::read(dir.path().join("raw_articles.csv"))?;
    let articles = decode_raw_articles(&data)?;
    assert_eq!(articles.len(), 2);
    assert_eq!(articles[0].source, "Reuters");
    assert_eq!(
        articles[0].description.as_deref(),
        Some("Strike at the port, unions say")
    );
    assert_eq!(articles[1].source, "Supply Chain Dive");
    assert_eq!(articles[1].description, None);
    Ok(())
}

#[tokio::test]
async fn test_no_articles_still_writes_header() -> Result<()> {
    let dir = TempDir::new()?;
    let server = MockServer::start();
    let api_mock = server.mock(|when, then| {
        when.method(GET).path("/v2/everything");
        then.status(200)
            .json_body(serde_json::json!({"status": "ok", "totalResults": 0, "articles": []}));
    });

    ingest(&config_for(&server, &dir)).await?;

    api_mock.assert();
    assert_eq!(
        std::fs::read_to_string(dir.path().join("raw_articles.csv"))?,
        "title,description,url,publishedAt,source\n"
    );
    Ok(())
}

#[tokio::test]
async fn test_api_error_is_reported_and_nothing_written() -> Result<()> {
    let dir = TempDir::new()?;
    let server = MockServer::start();
    let api_mock = server.mock(|when, then| {
        when.method(GET).path("/v2/everything");
        then.status(401).json_body(serde_json::json!({
            "status": "error",
            "code": "apiKeyInvalid",
            "message": "Your API key is invalid"
        }));
    });

    let err = ingest(&config_for(&server, &dir)).await.unwrap_err();

    api_mock.assert();
    assert_eq!(
        err.stage(),
        Some((PipelineStage::Ingestion, PipelineStep::Extract))
    );
    assert_eq!(err.category(), ErrorCategory::Network);
    match err.root() {
        EtlError::ApiStatusError { status, body } => {
            assert_eq!(*status, 401);
            assert!(body.contains("apiKeyInvalid"));
        }
        other => panic!("unexpected error: {other:?}"),
    }
    assert!(!dir.path().join("raw_articles.csv").exists());
    Ok(())
}

#[tokio::test]
async fn test_error_status_in_ok_response() -> Result<()> {
    let dir = TempDir::new()?;
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(GET).path("/v2/everything");
        then.status(200).json_body(serde_json::json!({
            "status": "error",
            "code": "rateLimited",
            "message": "Too many requests"
        }));
    });

    let err = ingest(&config_for(&server, &dir)).await.unwrap_err();
    assert!(matches!(err.root(), EtlError::ApiStatusError { .. }));
    assert!(err.to_string().contains("rateLimited"));
    Ok(())
}
