use crate::domain::services::RiskKeywordTable;
use crate::utils::error::{EtlError, Result};
use crate::utils::validation::{self, Validate};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

pub const DEFAULT_QUERY: &str =
    r#""supply chain" OR "factory fire" OR "port closure" OR "shipping delay" OR "supplier bankruptcy""#;
pub const API_KEY_ENV: &str = "NEWS_API_KEY";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct TomlConfig {
    pub pipeline: PipelineConfig,
    pub source: SourceConfig,
    pub transform: TransformConfig,
    pub load: LoadConfig,
    pub monitoring: MonitoringConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    pub name: String,
    pub description: String,
    pub version: String,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            name: "supply-chain-risk".to_string(),
            description: "Scores news articles for supply chain risk".to_string(),
            version: "1.0".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SourceConfig {
    pub endpoint: String,
    pub query: String,
    pub language: String,
    pub sort_by: String,
    pub page_size: u32,
    pub timeout_seconds: u64,
    /// Falls back to the `NEWS_API_KEY` environment variable.
    pub api_key: Option<String>,
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            endpoint: "https://newsapi.org/v2/everything".to_string(),
            query: DEFAULT_QUERY.to_string(),
            language: "en".to_string(),
            sort_by: "publishedAt".to_string(),
            page_size: 100,
            timeout_seconds: 30,
            api_key: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TransformConfig {
    pub model_path: String,
    /// Replaces the built-in keyword table when set.
    pub risk_keywords: Option<BTreeMap<String, u32>>,
}

impl Default for TransformConfig {
    fn default() -> Self {
        Self {
            model_path: "models/supply_chain_entities.json".to_string(),
            risk_keywords: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoadConfig {
    pub artifacts_dir: String,
    pub raw_file: String,
    pub processed_file: String,
}

impl Default for LoadConfig {
    fn default() -> Self {
        Self {
            artifacts_dir: "artifacts".to_string(),
            raw_file: "raw_articles.csv".to_string(),
            processed_file: "processed_articles.csv".to_string(),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct MonitoringConfig {
    pub enabled: bool,
}

impl TomlConfig {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path).map_err(EtlError::IoError)?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content)?;

        toml::from_str(&processed_content).map_err(|e| EtlError::ConfigValidationError {
            field: "toml_parsing".to_string(),
            message: format!("TOML parsing error: {}", e),
        })
    }

    /// Replaces `${VAR_NAME}` with the variable's value. Unset variables are
    /// left as written.
    fn substitute_env_vars(content: &str) -> Result<String> {
        use regex::Regex;
        let re = Regex::new(r"\$\{([^}]+)\}").map_err(|e| EtlError::ConfigError {
            message: e.to_string(),
        })?;

        let result = re.replace_all(content, |caps: &regex::Captures| {
            let var_name = &caps[1];
            std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
        });

        Ok(result.to_string())
    }

    pub fn validate_config(&self) -> Result<()> {
        validation::validate_url("source.endpoint", &self.source.endpoint)?;
        validation::validate_non_empty_string("source.query", &self.source.query)?;
        validation::validate_range("source.page_size", self.source.page_size, 1, 100)?;
        validation::validate_positive_number("source.timeout_seconds", self.source.timeout_seconds, 1)?;

        validation::validate_path("transform.model_path", &self.transform.model_path)?;
        self.risk_keyword_table()?;

        validation::validate_path("load.artifacts_dir", &self.load.artifacts_dir)?;
        validation::validate_file_extension("load.raw_file", &self.load.raw_file, &["csv"])?;
        validation::validate_file_extension(
            "load.processed_file",
            &self.load.processed_file,
            &["csv"],
        )?;

        if self.load.raw_file == self.load.processed_file {
            return Err(EtlError::ConfigValidationError {
                field: "load.processed_file".to_string(),
                message: "Processed file must differ from the raw file".to_string(),
            });
        }

        Ok(())
    }

    /// The configured keyword table, or the built-in one.
    pub fn risk_keyword_table(&self) -> Result<RiskKeywordTable> {
        match &self.transform.risk_keywords {
            Some(weights) => RiskKeywordTable::from_weights(
                weights.iter().map(|(keyword, weight)| (keyword.as_str(), *weight)),
            ),
            None => Ok(RiskKeywordTable::default()),
        }
    }

    /// API key from the config, else from the environment (after loading `.env`).
    pub fn resolve_api_key(&self) -> Result<String> {
        let configured = self
            .source
            .api_key
            .as_deref()
            .map(str::trim)
            .filter(|key| !key.is_empty() && !key.starts_with("${"));
        if let Some(key) = configured {
            return Ok(key.to_string());
        }

        if let Err(e) = dotenvy::dotenv() {
            if !e.not_found() {
                tracing::warn!("Could not read .env file: {}", e);
            }
        }

        match std::env::var(API_KEY_ENV) {
            Ok(key) if !key.trim().is_empty() => Ok(key.trim().to_string()),
            _ => {
                tracing::error!("{} not found in config, environment or .env file", API_KEY_ENV);
                Err(EtlError::MissingConfigError {
                    field: API_KEY_ENV.to_string(),
                })
            }
        }
    }

    pub fn artifacts_dir(&self) -> PathBuf {
        PathBuf::from(&self.load.artifacts_dir)
    }

    pub fn raw_file(&self) -> &str {
        &self.load.raw_file
    }

    pub fn processed_file(&self) -> &str {
        &self.load.processed_file
    }

    pub fn model_path(&self) -> &str {
        &self.transform.model_path
    }

    pub fn monitoring_enabled(&self) -> bool {
        self.monitoring.enabled
    }
}

impl Validate for TomlConfig {
    fn validate(&self) -> Result<()> {
        self.validate_config()
    }
}
