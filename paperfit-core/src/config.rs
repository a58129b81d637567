//! Configuration system for paperfit.
//!
//! Uses `figment` for layered configuration: defaults -> config file -> environment -> CLI args.
//! Configuration is loaded from `~/.config/paperfit/config.toml` and/or `.paperfit/config.toml`
//! in the workspace directory.

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Top-level configuration for paperfit.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub provider: ProviderConfig,
    pub analysis: AnalysisConfig,
    pub server: ServerConfig,
    pub report: ReportConfig,
}

/// Hosted model provider configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ProviderConfig {
    /// Environment variable name containing the API key.
    pub api_key_env: String,
    /// API key set directly in config. Takes precedence over `api_key_env`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
    /// Base URL of the v1 REST API.
    pub base_url: String,
    /// Embedding model identifier.
    pub embed_model: String,
    /// Generation model identifier.
    pub generate_model: String,
    /// Maximum tokens for the generated literature-review paragraph.
    pub generate_max_tokens: u32,
    /// Summary length hint: "short", "medium", "long" or "auto".
    pub summary_length: String,
    /// Summary format hint: "paragraph", "bullets" or "auto".
    pub summary_format: String,
    /// Optional request timeout. `None` keeps the HTTP client's default.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timeout_secs: Option<u64>,
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            api_key_env: "COHERE_API_KEY".to_string(),
            api_key: None,
            base_url: "https://api.cohere.ai/v1".to_string(),
            embed_model: "embed-english-v3.0".to_string(),
            generate_model: "command".to_string(),
            generate_max_tokens: 200,
            summary_length: "long".to_string(),
            summary_format: "bullets".to_string(),
            timeout_secs: None,
        }
    }
}

/// Fixed knobs of the analysis pipeline.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    /// Characters of paper text embedded as the "document" input.
    pub paper_embed_chars: usize,
    /// Characters of paper text sent for summarization.
    pub summary_chars: usize,
    /// Scores at or below this value carry a low-relevance warning.
    pub low_score_threshold: f64,
    /// Maximum number of citations kept after filtering.
    pub max_citations: usize,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            paper_embed_chars: 2000,
            summary_chars: 5000,
            low_score_threshold: 0.30,
            max_citations: 10,
        }
    }
}

impl AnalysisConfig {
    /// Validate this config and return any warnings.
    ///
    /// Returns an empty Vec if the config is valid.
    pub fn validate(&self) -> Vec<String> {
        let mut warnings = Vec::new();
        if !(-1.0..=1.0).contains(&self.low_score_threshold) {
            warnings.push(format!(
                "low_score_threshold ({}) is outside the cosine range -1.0–1.0",
                self.low_score_threshold
            ));
        }
        if self.paper_embed_chars == 0 {
            warnings.push("paper_embed_chars is 0; the paper embedding will be empty".into());
        }
        if self.summary_chars == 0 {
            warnings.push("summary_chars is 0; nothing will be summarized".into());
        }
        warnings
    }
}

/// Web front end configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Host to bind to.
    pub host: String,
    /// Port to listen on.
    pub port: u16,
    /// Maximum accepted multipart body size in bytes.
    pub max_upload_bytes: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8501,
            max_upload_bytes: 20 * 1024 * 1024,
        }
    }
}

/// PDF report configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ReportConfig {
    /// File name offered for download.
    pub file_name: String,
    /// TrueType family name, resolved as `<family>-Regular.ttf` (or `<family>.ttf`),
    /// `<family>-Bold.ttf`, ... The faces are embedded in the report.
    pub font_family: String,
    /// Families tried in order when `font_family` is not installed.
    pub fallback_families: Vec<String>,
    /// Directories searched in order for the font family.
    pub font_dirs: Vec<PathBuf>,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            file_name: "research_paper_summary.pdf".to_string(),
            font_family: "LiberationSans".to_string(),
            fallback_families: vec!["DejaVuSans".to_string()],
            font_dirs: vec![
                PathBuf::from("fonts"),
                PathBuf::from("/usr/share/fonts/truetype/liberation"),
                PathBuf::from("/usr/share/fonts/liberation-sans"),
                PathBuf::from("/usr/share/fonts/liberation"),
                PathBuf::from("/usr/share/fonts/truetype/dejavu"),
                PathBuf::from("/usr/share/fonts/dejavu"),
                PathBuf::from("/Library/Fonts"),
                PathBuf::from("C:\\Windows\\Fonts"),
            ],
        }
    }
}

/// Load configuration by merging defaults, config files, and environment variables.
///
/// Priority (highest to lowest):
/// 1. Explicit overrides (passed as argument)
/// 2. Environment variables (prefixed with `PAPERFIT_`)
/// 3. Workspace-local config (`.paperfit/config.toml`)
/// 4. User config (`~/.config/paperfit/config.toml`)
/// 5. Built-in defaults
pub fn load_config(
    workspace: Option<&Path>,
    overrides: Option<&AppConfig>,
) -> Result<AppConfig, Box<figment::Error>> {
    let mut figment = Figment::from(Serialized::defaults(AppConfig::default()));

    // User-level config
    if let Some(config_dir) = directories::ProjectDirs::from("dev", "paperfit", "paperfit") {
        let user_config = config_dir.config_dir().join("config.toml");
        if user_config.exists() {
            figment = figment.merge(Toml::file(&user_config));
        }
    }

    // Workspace-level config
    if let Some(ws) = workspace {
        let ws_config = ws.join(".paperfit").join("config.toml");
        if ws_config.exists() {
            figment = figment.merge(Toml::file(&ws_config));
        }
    }

    // Environment variables (PAPERFIT_SERVER__PORT, PAPERFIT_ANALYSIS__MAX_CITATIONS, etc.)
    figment = figment.merge(Env::prefixed("PAPERFIT_").split("__"));

    // Explicit overrides
    if let Some(overrides) = overrides {
        figment = figment.merge(Serialized::defaults(overrides));
    }

    figment.extract().map_err(Box::new)
}

/// Render the configuration as TOML with any inline API key redacted.
pub fn to_redacted_toml(config: &AppConfig) -> Result<String, toml::ser::Error> {
    let mut shown = config.clone();
    if shown.provider.api_key.is_some() {
        shown.provider.api_key = Some("***".to_string());
    }
    toml::to_string_pretty(&shown)
}
