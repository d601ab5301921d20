use anyhow::Context;
use clap::Parser;
use supply_risk_forecaster::config::cli::{Command, LogFormat, ReportFormat};
use supply_risk_forecaster::utils::error::{ErrorSeverity, PipelineStage, PipelineStep};
use supply_risk_forecaster::utils::{logger, validation::Validate};
use supply_risk_forecaster::{
    load_dashboard, CliConfig, EtlEngine, EtlError, IngestionPipeline, LocalStorage, TomlConfig,
    TransformationPipeline,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = CliConfig::parse();

    match cli.log_format {
        LogFormat::Text => logger::init_cli_logger(cli.verbose),
        LogFormat::Json => logger::init_json_logger(cli.verbose),
    }

    tracing::info!("Starting supply-risk CLI");
    if cli.verbose {
        tracing::debug!("CLI config: {:?}", cli);
    }

    let config = match cli.resolve().and_then(|config| config.validate().map(|_| config)) {
        Ok(config) => config,
        Err(e) => {
            tracing::error!("❌ Configuration validation failed: {}", e);
            tracing::error!("💡 Suggestion: {}", e.recovery_suggestion());
            eprintln!("❌ {}", e.user_friendly_message());
            std::process::exit(1);
        }
    };

    if config.monitoring_enabled() {
        tracing::info!("🔍 System monitoring enabled");
    }

    let storage = LocalStorage::new(config.artifacts_dir());

    let outcome = match &cli.command {
        Command::Ingest => ingest(storage, &config).await.map(report_output),
        Command::Transform => transform(storage, &config).await.map(report_output),
        Command::Run => run_all(storage, &config).await.map(report_output),
        Command::Report { format } => {
            let state = match load_dashboard(&storage, config.processed_file()).await {
                Ok(state) => state,
                Err(e) => fail(e.in_stage(PipelineStage::Report, PipelineStep::Load)),
            };
            match format {
                ReportFormat::Text => print!("{}", state.render_text()),
                ReportFormat::Json => println!(
                    "{}",
                    serde_json::to_string_pretty(&state).context("rendering report as JSON")?
                ),
            }
            Ok(())
        }
    };

    if let Err(e) = outcome {
        fail(e);
    }
    Ok(())
}

async fn ingest(storage: LocalStorage, config: &TomlConfig) -> Result<String, EtlError> {
    let pipeline = IngestionPipeline::from_config(storage, config)
        .map_err(|e| e.in_stage(PipelineStage::Ingestion, PipelineStep::Setup))?;
    EtlEngine::new_with_monitoring(pipeline, config.monitoring_enabled())
        .run()
        .await
}

async fn transform(storage: LocalStorage, config: &TomlConfig) -> Result<String, EtlError> {
    let pipeline = TransformationPipeline::from_config(storage, config)
        .map_err(|e| e.in_stage(PipelineStage::Transformation, PipelineStep::Setup))?;
    EtlEngine::new_with_monitoring(pipeline, config.monitoring_enabled())
        .run()
        .await
}

/// Both pipelines are built before anything runs, so a missing model or API
/// key aborts the run before the network is touched.
async fn run_all(storage: LocalStorage, config: &TomlConfig) -> Result<String, EtlError> {
    let ingestion = IngestionPipeline::from_config(storage.clone(), config)
        .map_err(|e| e.in_stage(PipelineStage::Ingestion, PipelineStep::Setup))?;
    let transformation = TransformationPipeline::from_config(storage, config)
        .map_err(|e| e.in_stage(PipelineStage::Transformation, PipelineStep::Setup))?;

    let monitor = config.monitoring_enabled();
    let raw_path = EtlEngine::new_with_monitoring(ingestion, monitor).run().await?;
    tracing::info!("📁 Raw articles saved to: {}", raw_path);
    EtlEngine::new_with_monitoring(transformation, monitor)
        .run()
        .await
}

fn report_output(output_path: String) {
    tracing::info!("✅ Pipeline completed successfully!");
    println!("✅ Pipeline completed successfully!");
    println!("📁 Output saved to: {}", output_path);
}

fn fail(e: EtlError) -> ! {
    tracing::error!(
        "❌ Pipeline failed: {} (Category: {:?}, Severity: {:?})",
        e,
        e.category(),
        e.severity()
    );
    tracing::error!("💡 Recovery suggestion: {}", e.recovery_suggestion());

    eprintln!("❌ {}", e.user_friendly_message());
    eprintln!("💡 Suggestion: {}", e.recovery_suggestion());

    let exit_code = match e.severity() {
        ErrorSeverity::Low => 0,
        ErrorSeverity::Medium => 2,
        ErrorSeverity::High => 1,
        ErrorSeverity::Critical => 3,
    };
    std::process::exit(exit_code);
}
