pub mod adapters;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use config::CliConfig;

pub use adapters::{
    openai::OpenAiEnricher,
    record_store::{Encoding, RecordStore},
    storage::LocalStorage,
};
pub use config::toml_config::TomlConfig;
pub use self::core::{BatchEnricher, BatchOptions, FormatConverter};
pub use domain::model::{EnrichmentOutcome, EnrichmentPayload, Record, RunSummary};
pub use utils::error::{EtlError, Result};
