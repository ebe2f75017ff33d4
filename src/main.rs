use anyhow::Context;
use clap::Parser;
use project_usage::adapters::snapshot::SnapshotFormat;
use project_usage::utils::error::{ErrorSeverity, UsageError};
use project_usage::utils::{logger, validation::Validate};
use project_usage::{CliConfig, OutputFormat, SnapshotFile, UsageEngine, UsageReport};
use std::collections::BTreeMap;

fn exit_with(e: &UsageError) -> ! {
    tracing::error!(
        "❌ Usage computation failed: {} (Category: {:?}, Severity: {:?})",
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

fn render<T: serde::Serialize>(value: &T, format: OutputFormat) -> anyhow::Result<String> {
    let rendered = match format {
        OutputFormat::Json => {
            serde_json::to_string_pretty(value).context("Failed to render report as JSON")?
        }
        OutputFormat::Toml => toml::to_string(value).context("Failed to render report as TOML")?,
    };
    Ok(rendered)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = CliConfig::parse();

    // 初始化日誌
    if config.json_logs {
        logger::init_json_logger();
    } else {
        logger::init_cli_logger(config.verbose);
    }

    if config.verbose {
        tracing::debug!("CLI config: {:?}", config);
    }

    if let Err(e) = config.validate() {
        exit_with(&e);
    }

    tracing::info!("📁 Loading snapshot from: {}", config.snapshot);
    let content = match tokio::fs::read_to_string(&config.snapshot).await {
        Ok(content) => content,
        Err(e) => exit_with(&UsageError::IoError(e)),
    };
    let snapshot = match SnapshotFile::parse(&content, SnapshotFormat::from_path(&config.snapshot))
    {
        Ok(snapshot) => snapshot,
        Err(e) => exit_with(&e),
    };

    let engine = UsageEngine::new(snapshot.into_store());

    let output = match config.target_project() {
        Ok(Some(project)) => {
            let report = engine.compute(project).unwrap_or_else(|e| exit_with(&e));
            render(&report, config.format)?
        }
        Ok(None) => {
            let names: Vec<String> = engine.store().project_names().map(String::from).collect();
            let mut reports: BTreeMap<String, UsageReport> = BTreeMap::new();
            for name in names {
                let report = if config.limited_only {
                    engine.compute_if_limited(&name)
                } else {
                    engine.compute(&name).map(Some)
                };
                match report {
                    Ok(Some(report)) => {
                        reports.insert(name, report);
                    }
                    Ok(None) => tracing::debug!("Skipping project '{}' without limits", name),
                    Err(e) => exit_with(&e),
                }
            }
            render(&reports, config.format)?
        }
        Err(e) => exit_with(&e),
    };

    println!("{}", output);
    Ok(())
}
