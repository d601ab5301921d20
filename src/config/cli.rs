use super::TomlConfig;
use crate::utils::error::Result;
use clap::{Parser, Subcommand, ValueEnum};

#[derive(Debug, Clone, Parser)]
#[command(name = "supply-risk")]
#[command(about = "Scores news articles for supply chain risk")]
pub struct CliConfig {
    /// Path to a TOML configuration file
    #[arg(short, long, global = true)]
    pub config: Option<String>,

    /// Override load.artifacts_dir
    #[arg(long, global = true)]
    pub artifacts_dir: Option<String>,

    /// Override transform.model_path
    #[arg(long, global = true)]
    pub model: Option<String>,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Log CPU and memory usage per step
    #[arg(long, global = true)]
    pub monitor: bool,

    #[arg(long, value_enum, default_value_t = LogFormat::Text, global = true)]
    pub log_format: LogFormat,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Clone, Subcommand)]
pub enum Command {
    /// Fetch articles from the news API into the raw articles file
    Ingest,
    /// Score the raw articles file into the processed articles file
    Transform,
    /// Ingest, then transform
    Run,
    /// Summarize the processed articles file
    Report {
        #[arg(long, value_enum, default_value_t = ReportFormat::Text)]
        format: ReportFormat,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LogFormat {
    Text,
    Json,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ReportFormat {
    Text,
    Json,
}

impl CliConfig {
    /// The config file (or defaults) with command-line overrides applied.
    pub fn resolve(&self) -> Result<TomlConfig> {
        let mut config = match &self.config {
            Some(path) => TomlConfig::from_file(path)?,
            None => TomlConfig::default(),
        };

        if let Some(dir) = &self.artifacts_dir {
            config.load.artifacts_dir = dir.clone();
        }
        if let Some(model) = &self.model {
            config.transform.model_path = model.clone();
        }
        if self.monitor {
            config.monitoring.enabled = true;
        }

        Ok(config)
    }
}
