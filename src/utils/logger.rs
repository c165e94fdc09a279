use crate::utils::error::Result;
use std::fs::{self, OpenOptions};
use std::path::Path;
use std::sync::Mutex;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

pub const DEFAULT_LOG_FILE: &str = "foodb_enhancement.log";

/// 同時輸出到 stdout 與日誌檔（日誌檔為附加模式，不含 ANSI 色碼）
pub fn init_cli_logger(verbose: bool, json: bool, log_file: Option<&Path>) -> Result<()> {
    let filter = if verbose {
        EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new("foodb_etl=debug,info"))
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("foodb_etl=info"))
    };

    let file_layer = match log_file {
        Some(path) => {
            if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
                fs::create_dir_all(parent)?;
            }
            let file = OpenOptions::new().create(true).append(true).open(path)?;
            Some(
                tracing_subscriber::fmt::layer()
                    .with_ansi(false)
                    .with_target(false)
                    .with_writer(Mutex::new(file)),
            )
        }
        None => None,
    };

    let (compact_layer, json_layer) = if json {
        (None, Some(tracing_subscriber::fmt::layer().with_target(false).json()))
    } else {
        (
            Some(
                tracing_subscriber::fmt::layer()
                    .with_target(false)
                    .with_thread_ids(false)
                    .with_file(false)
                    .with_line_number(false)
                    .compact(),
            ),
            None,
        )
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(compact_layer)
        .with(json_layer)
        .with(file_layer)
        .init();

    Ok(())
}
