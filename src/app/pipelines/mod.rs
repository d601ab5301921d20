pub mod ingestion_pipeline;
pub mod transformation_pipeline;

pub use ingestion_pipeline::IngestionPipeline;
pub use transformation_pipeline::TransformationPipeline;
