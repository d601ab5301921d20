use std::fmt;
use thiserror::Error;

/// Which pipeline an error escaped from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelineStage {
    Ingestion,
    Transformation,
    Report,
}

impl fmt::Display for PipelineStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            PipelineStage::Ingestion => "ingestion",
            PipelineStage::Transformation => "transformation",
            PipelineStage::Report => "report",
        };
        f.write_str(name)
    }
}

/// Step inside a pipeline stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelineStep {
    Setup,
    Extract,
    Transform,
    Load,
}

impl fmt::Display for PipelineStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            PipelineStep::Setup => "setup",
            PipelineStep::Extract => "extract",
            PipelineStep::Transform => "transform",
            PipelineStep::Load => "load",
        };
        f.write_str(name)
    }
}

#[derive(Error, Debug)]
pub enum EtlError {
    #[error("API request failed: {0}")]
    ApiError(#[from] reqwest::Error),

    #[error("API returned status {status}: {body}")]
    ApiStatusError { status: u16, body: String },

    #[error("CSV processing error: {0}")]
    CsvError(#[from] csv::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("Missing required configuration: {field}")]
    MissingConfigError { field: String },

    #[error("Invalid value '{value}' for {field}: {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Configuration validation failed for {field}: {message}")]
    ConfigValidationError { field: String, message: String },

    #[error("Entity model unavailable at {path}: {reason}")]
    ModelUnavailable { path: String, reason: String },

    #[error("Data processing error: {message}")]
    ProcessingError { message: String },

    #[error("{stage} {step} failed: {source}")]
    StageError {
        stage: PipelineStage,
        step: PipelineStep,
        #[source]
        source: Box<EtlError>,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Configuration,
    Io,
    Network,
    Data,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    Low,
    Medium,
    High,
    Critical,
}

impl EtlError {
    /// Wraps the error with the stage and step it escaped from. Already wrapped
    /// errors are returned unchanged so the innermost context wins.
    pub fn in_stage(self, stage: PipelineStage, step: PipelineStep) -> Self {
        match self {
            EtlError::StageError { .. } => self,
            other => EtlError::StageError {
                stage,
                step,
                source: Box::new(other),
            },
        }
    }

    /// The error without its stage wrapper.
    pub fn root(&self) -> &EtlError {
        match self {
            EtlError::StageError { source, .. } => source.root(),
            other => other,
        }
    }

    pub fn stage(&self) -> Option<(PipelineStage, PipelineStep)> {
        match self {
            EtlError::StageError { stage, step, .. } => Some((*stage, *step)),
            _ => None,
        }
    }

    pub fn category(&self) -> ErrorCategory {
        match self.root() {
            EtlError::ApiError(_) | EtlError::ApiStatusError { .. } => ErrorCategory::Network,
            EtlError::IoError(_) | EtlError::CsvError(_) => ErrorCategory::Io,
            EtlError::ConfigError { .. }
            | EtlError::MissingConfigError { .. }
            | EtlError::InvalidConfigValueError { .. }
            | EtlError::ConfigValidationError { .. }
            | EtlError::ModelUnavailable { .. } => ErrorCategory::Configuration,
            EtlError::SerializationError(_)
            | EtlError::ProcessingError { .. }
            | EtlError::StageError { .. } => ErrorCategory::Data,
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self.root() {
            EtlError::ApiError(_) => ErrorSeverity::Medium,
            EtlError::ApiStatusError { status, .. } if *status == 429 || *status >= 500 => {
                ErrorSeverity::Medium
            }
            EtlError::ModelUnavailable { .. } | EtlError::IoError(_) => ErrorSeverity::Critical,
            _ => ErrorSeverity::High,
        }
    }

    pub fn recovery_suggestion(&self) -> &'static str {
        match self.root() {
            EtlError::ApiError(_) => "Check network connectivity and retry the ingestion run",
            EtlError::ApiStatusError { status: 401, .. } => {
                "Check that NEWS_API_KEY holds a valid key"
            }
            EtlError::ApiStatusError { status: 429, .. } => {
                "The news API rate limit was hit; wait before retrying"
            }
            EtlError::ApiStatusError { .. } => "Inspect the API response body and query settings",
            EtlError::CsvError(_) => "Re-run ingestion to regenerate the raw articles file",
            EtlError::IoError(_) => {
                "Make sure the artifacts directory exists and the input file was produced by ingestion"
            }
            EtlError::SerializationError(_) => "The data could not be serialized; check its contents",
            EtlError::ModelUnavailable { .. } => {
                "Point --model or transform.model_path at a valid entity model JSON file"
            }
            EtlError::MissingConfigError { .. } => {
                "Set the missing value in the config file, the environment or a .env file"
            }
            EtlError::ConfigError { .. }
            | EtlError::InvalidConfigValueError { .. }
            | EtlError::ConfigValidationError { .. } => "Fix the configuration file and try again",
            EtlError::ProcessingError { .. } | EtlError::StageError { .. } => {
                "Run again with --verbose for details"
            }
        }
    }

    pub fn user_friendly_message(&self) -> String {
        let prefix = match self.stage() {
            Some((stage, step)) => format!("The {} pipeline failed during {}", stage, step),
            None => "The run failed".to_string(),
        };
        let detail = match self.root() {
            EtlError::ModelUnavailable { path, .. } => {
                format!("the entity model could not be loaded from {}", path)
            }
            EtlError::MissingConfigError { field } => format!("{} is not set", field),
            EtlError::IoError(e) if e.kind() == std::io::ErrorKind::NotFound => {
                "an input file was not found".to_string()
            }
            other => other.to_string(),
        };
        format!("{}: {}", prefix, detail)
    }
}

pub type Result<T> = std::result::Result<T, EtlError>;
