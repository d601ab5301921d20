use crate::domain::model::EntitySpan;
use crate::utils::error::{PipelineStage, Result};
use async_trait::async_trait;

pub trait Storage: Send + Sync {
    fn read_file(&self, path: &str) -> impl std::future::Future<Output = Result<Vec<u8>>> + Send;
    fn write_file(
        &self,
        path: &str,
        data: &[u8],
    ) -> impl std::future::Future<Output = Result<()>> + Send;
    fn exists(&self, path: &str) -> impl std::future::Future<Output = bool> + Send;
    /// Location of `path` as shown to users.
    fn display_path(&self, path: &str) -> String;
}

/// A three step batch job driven by `EtlEngine`.
#[async_trait]
pub trait Pipeline: Send + Sync {
    type Input: Send;
    type Output: Send;

    fn stage(&self) -> PipelineStage;
    async fn extract(&self) -> Result<Vec<Self::Input>>;
    async fn transform(&self, data: Vec<Self::Input>) -> Result<Vec<Self::Output>>;
    async fn load(&self, result: Vec<Self::Output>) -> Result<String>;
}

/// A loaded entity-recognition model. Implementations are built once and
/// only read afterwards.
pub trait EntityRecognizer: Send + Sync {
    fn name(&self) -> &str;
    /// Non-overlapping spans in order of appearance.
    fn recognize(&self, text: &str) -> Vec<EntitySpan>;
}
