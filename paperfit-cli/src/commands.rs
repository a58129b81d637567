//! CLI subcommand handlers.

use crate::Commands;
use crate::ConfigAction;
use paperfit_core::config::{AppConfig, load_config, to_redacted_toml};
use paperfit_core::controller::{self, AnalysisRequest, LiveView, Outcome};
use paperfit_core::{
    Analyzer, GatewayState, GenPdfRenderer, PdfTextExtractor, create_provider, gateway,
};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{info, warn};

const ANALYZE_HINT: &str =
    "Nothing to analyze: pass --paper <PDF> and either --topic <TEXT> or --thesis <PDF>.";

/// Handle a CLI subcommand.
pub async fn handle_command(command: Commands, workspace: &Path) -> anyhow::Result<()> {
    match command {
        Commands::Serve { host, port } => handle_serve(host, port, workspace).await,
        Commands::Analyze {
            paper,
            topic,
            thesis,
            output,
        } => handle_analyze(paper, topic, thesis, output, workspace).await,
        Commands::Config { action } => handle_config(action, workspace).await,
    }
}

fn load(workspace: &Path) -> anyhow::Result<AppConfig> {
    let config = load_config(Some(workspace), None)
        .map_err(|e| anyhow::anyhow!("Configuration error: {}", e))?;
    for warning in config.analysis.validate() {
        warn!("Config: {}", warning);
    }
    Ok(config)
}

/// Wire the production collaborators. A missing API key is fatal here.
fn build_analyzer(config: &AppConfig) -> anyhow::Result<Analyzer> {
    let provider = create_provider(&config.provider)?;
    let renderer = GenPdfRenderer::new(config.report.clone());
    if let Err(e) = renderer.check_fonts() {
        warn!(error = %e, "Report fonts not found; analyses will fail at the rendering step");
    }
    Ok(Analyzer::new(
        provider,
        Arc::new(PdfTextExtractor),
        Arc::new(renderer),
        config.analysis.clone(),
    ))
}

async fn handle_serve(
    host: Option<String>,
    port: Option<u16>,
    workspace: &Path,
) -> anyhow::Result<()> {
    let mut config = load(workspace)?;
    if let Some(host) = host {
        config.server.host = host;
    }
    if let Some(port) = port {
        config.server.port = port;
    }

    let analyzer = build_analyzer(&config)?;
    let state = GatewayState::new(analyzer, config.server.clone(), &config.report)
        .map_err(|e| anyhow::anyhow!("Failed to compile page templates: {}", e))?;
    info!(
        host = %config.server.host,
        port = config.server.port,
        "Starting paperfit web interface"
    );
    gateway::run_gateway(state.shared()).await?;
    Ok(())
}

async fn read_input(path: Option<PathBuf>) -> anyhow::Result<Option<Vec<u8>>> {
    match path {
        Some(path) => {
            let bytes = tokio::fs::read(&path)
                .await
                .map_err(|e| anyhow::anyhow!("Failed to read {}: {}", path.display(), e))?;
            Ok(Some(bytes))
        }
        None => Ok(None),
    }
}

async fn handle_analyze(
    paper: Option<PathBuf>,
    topic: Option<String>,
    thesis: Option<PathBuf>,
    output: Option<PathBuf>,
    workspace: &Path,
) -> anyhow::Result<()> {
    let request = AnalysisRequest {
        paper: read_input(paper).await?,
        thesis_topic: topic,
        thesis_file: read_input(thesis).await?,
    };
    if request.clone().validated().is_none() {
        println!("{}", ANALYZE_HINT);
        return Ok(());
    }

    let config = load(workspace)?;
    let analyzer = build_analyzer(&config)?;

    match controller::handle(&analyzer, request).await {
        Outcome::Idle => {
            println!("{}", ANALYZE_HINT);
            Ok(())
        }
        Outcome::Failed(message) => anyhow::bail!(message),
        Outcome::Completed(report) => {
            println!("{}", LiveView::from_analysis(&report.analysis).to_text());
            let path = output.unwrap_or_else(|| PathBuf::from(&config.report.file_name));
            tokio::fs::write(&path, &report.pdf)
                .await
                .map_err(|e| anyhow::anyhow!("Failed to write {}: {}", path.display(), e))?;
            println!("Report written to {}", path.display());
            Ok(())
        }
    }
}

async fn handle_config(action: ConfigAction, workspace: &Path) -> anyhow::Result<()> {
    match action {
        ConfigAction::Init => {
            let config_dir = workspace.join(".paperfit");
            std::fs::create_dir_all(&config_dir)?;

            let config_path = config_dir.join("config.toml");
            if config_path.exists() {
                println!(
                    "Configuration file already exists at: {}",
                    config_path.display()
                );
                return Ok(());
            }

            let toml_str = toml::to_string_pretty(&AppConfig::default())?;
            std::fs::write(&config_path, &toml_str)?;
            println!(
                "Created default configuration at: {}",
                config_path.display()
            );
            Ok(())
        }
        ConfigAction::Show => {
            let config = load(workspace)?;
            println!("{}", to_redacted_toml(&config)?);
            Ok(())
        }
    }
}
