pub mod dashboard;
pub mod pipelines;
