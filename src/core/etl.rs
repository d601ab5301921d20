use crate::core::Pipeline;
use crate::utils::error::{PipelineStep, Result};
use crate::utils::monitor::SystemMonitor;

/// Runs a pipeline's extract, transform and load steps in order. Errors are
/// wrapped with the pipeline's stage and the failing step.
pub struct EtlEngine<P: Pipeline> {
    pipeline: P,
    monitor: SystemMonitor,
}

impl<P: Pipeline> EtlEngine<P> {
    pub fn new(pipeline: P) -> Self {
        Self::new_with_monitoring(pipeline, false)
    }

    pub fn new_with_monitoring(pipeline: P, monitor_enabled: bool) -> Self {
        Self {
            pipeline,
            monitor: SystemMonitor::new(monitor_enabled),
        }
    }

    pub fn pipeline(&self) -> &P {
        &self.pipeline
    }

    pub async fn run(&self) -> Result<String> {
        let stage = self.pipeline.stage();
        tracing::info!("🚀 Starting {} pipeline", stage);
        self.monitor.log_stats("start");

        let raw_data = self
            .pipeline
            .extract()
            .await
            .map_err(|e| e.in_stage(stage, PipelineStep::Extract))?;
        tracing::info!("📥 Extracted {} records", raw_data.len());
        self.monitor.log_stats("extract");

        let transformed = self
            .pipeline
            .transform(raw_data)
            .await
            .map_err(|e| e.in_stage(stage, PipelineStep::Transform))?;
        tracing::info!("🔧 Transformed {} records", transformed.len());
        self.monitor.log_stats("transform");

        let output_path = self
            .pipeline
            .load(transformed)
            .await
            .map_err(|e| e.in_stage(stage, PipelineStep::Load))?;
        tracing::info!("💾 {} output saved to: {}", stage, output_path);
        self.monitor.log_stats("load");
        self.monitor.log_final_stats();

        Ok(output_path)
    }
}
