pub mod adapters;
pub mod app;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use config::CliConfig;

pub use adapters::{GazetteerModel, LocalStorage, NewsApiClient};
pub use app::dashboard::{load_dashboard, Dashboard, DashboardState};
pub use app::pipelines::{IngestionPipeline, TransformationPipeline};
pub use config::TomlConfig;
pub use crate::core::etl::EtlEngine;
pub use domain::model::{RawArticle, ScoredArticle};
pub use domain::services::{EntityExtractor, RiskKeywordTable, RiskScorer};
pub use utils::error::{EtlError, Result};
