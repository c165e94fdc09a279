pub mod toml_config;

use crate::utils::error::{EtlError, Result};

pub const DEFAULT_API_KEY_ENV: &str = "OPENAI_API_KEY";

/// 讀取 API 金鑰；未設定或為空字串都視為缺少
pub fn api_key_from_env(var: &str) -> Result<String> {
    match std::env::var(var) {
        Ok(key) if !key.trim().is_empty() => Ok(key),
        _ => Err(EtlError::MissingConfigError {
            field: var.to_string(),
        }),
    }
}

#[cfg(feature = "cli")]
use crate::adapters::record_store::Encoding;
#[cfg(feature = "cli")]
use crate::utils::logger::DEFAULT_LOG_FILE;
#[cfg(feature = "cli")]
use clap::{Args, Parser, Subcommand};
#[cfg(feature = "cli")]
use std::path::PathBuf;
#[cfg(feature = "cli")]
use toml_config::TomlConfig;

#[cfg(feature = "cli")]
#[derive(Debug, Clone, Parser)]
#[command(name = "foodb-etl")]
#[command(about = "Enrich FooDB food records with translations and calorie estimates")]
pub struct CliConfig {
    #[command(subcommand)]
    pub command: Command,

    #[arg(short, long, global = true, help = "Enable verbose output")]
    pub verbose: bool,

    #[arg(long, global = true, help = "Emit stdout logs as JSON")]
    pub log_json: bool,

    #[arg(long, global = true, default_value = DEFAULT_LOG_FILE)]
    pub log_file: PathBuf,

    #[arg(long, global = true, help = "Only log to stdout")]
    pub no_log_file: bool,
}

#[cfg(feature = "cli")]
impl CliConfig {
    pub fn log_file(&self) -> Option<&std::path::Path> {
        (!self.no_log_file).then_some(self.log_file.as_path())
    }
}

#[cfg(feature = "cli")]
#[derive(Debug, Clone, Subcommand)]
pub enum Command {
    /// Translate names and estimate calories, checkpointing after every batch
    Enrich(EnrichArgs),
    /// Rewrite a JSON array file as one JSON object per line
    Convert(ConvertArgs),
}

#[cfg(feature = "cli")]
#[derive(Debug, Clone, Args)]
pub struct EnrichArgs {
    #[arg(long, default_value = "original_foodb_2020_04_07_json/Food.json")]
    pub input: String,

    #[arg(long, default_value = "enhanced_foodb/list/Food.json")]
    pub output: String,

    /// Settings file with [service] and [batch] sections
    #[arg(long)]
    pub config: Option<PathBuf>,

    #[arg(long)]
    pub batch_size: Option<usize>,

    /// Pause after each enrichment call, in milliseconds
    #[arg(long)]
    pub delay_ms: Option<u64>,

    /// Stop after this many batches
    #[arg(long)]
    pub max_batches: Option<usize>,

    /// Continue from the records already present in the output file
    #[arg(long)]
    pub resume: bool,

    /// Input encoding; detected from the file when omitted
    #[arg(long, value_enum)]
    pub input_format: Option<Encoding>,

    #[arg(long, value_enum, default_value = "array")]
    pub output_format: Encoding,

    #[arg(long)]
    pub model: Option<String>,

    #[arg(long)]
    pub endpoint: Option<String>,

    /// Environment variable holding the service API key
    #[arg(long, default_value = DEFAULT_API_KEY_ENV)]
    pub api_key_env: String,
}

#[cfg(feature = "cli")]
impl EnrichArgs {
    /// 命令列參數覆蓋設定檔
    pub fn apply_overrides(&self, config: &mut TomlConfig) {
        if let Some(size) = self.batch_size {
            config.batch.size = size;
        }
        if let Some(delay) = self.delay_ms {
            config.batch.delay_ms = delay;
        }
        if let Some(model) = &self.model {
            config.service.model = model.clone();
        }
        if let Some(endpoint) = &self.endpoint {
            config.service.endpoint = endpoint.clone();
        }
    }
}

#[cfg(feature = "cli")]
#[derive(Debug, Clone, Args)]
pub struct ConvertArgs {
    #[arg(long, default_value = "enhanced_foodb/list/Food.json")]
    pub input: String,

    #[arg(long, default_value = "enhanced_foodb/line/Food.json")]
    pub output: String,
}
