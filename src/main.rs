use clap::Parser;
use foodb_etl::config::{api_key_from_env, Command, ConvertArgs, EnrichArgs};
use foodb_etl::utils::error::ErrorSeverity;
use foodb_etl::utils::{logger, validation::Validate};
use foodb_etl::{
    BatchEnricher, BatchOptions, CliConfig, EtlError, FormatConverter, LocalStorage,
    OpenAiEnricher, RecordStore, TomlConfig,
};

async fn run_enrich(args: EnrichArgs, api_key: String) -> Result<String, EtlError> {
    let mut config = match &args.config {
        Some(path) => {
            tracing::info!("📁 Loading configuration from: {}", path.display());
            TomlConfig::from_file(path)?
        }
        None => TomlConfig::default(),
    };
    args.apply_overrides(&mut config);
    config.validate()?;

    tracing::info!("Input file: {}", args.input);
    tracing::info!("Output file: {}", args.output);
    tracing::info!(
        "Model: {} (batch size {}, {}ms between items)",
        config.service.model,
        config.batch.size,
        config.batch.delay_ms
    );

    let enricher = OpenAiEnricher::new(&config.service, api_key)?;
    let options = BatchOptions {
        max_batches: args.max_batches,
        resume: args.resume,
        input_format: args.input_format,
        output_format: args.output_format,
        ..BatchOptions::from(&config)
    };

    let driver = BatchEnricher::new(RecordStore::new(LocalStorage::default()), enricher, options);
    let summary = driver.run(&args.input, &args.output).await?;

    tracing::info!(
        "📊 {}/{} items written ({} enriched, {} unenriched, {} batches this run)",
        summary.processed,
        summary.total,
        summary.enriched,
        summary.unavailable,
        summary.batches_written
    );
    if !summary.completed {
        tracing::warn!("Run stopped early; rerun with --resume to continue");
    }
    Ok(args.output)
}

async fn run_convert(args: ConvertArgs) -> Result<String, EtlError> {
    let converter = FormatConverter::new(RecordStore::new(LocalStorage::default()));
    converter.convert(&args.input, &args.output).await?;
    Ok(args.output)
}

fn exit_code(severity: ErrorSeverity) -> i32 {
    match severity {
        ErrorSeverity::Low => 0,
        ErrorSeverity::Medium => 2,
        ErrorSeverity::High => 1,
        ErrorSeverity::Critical => 3,
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = CliConfig::parse();

    // 金鑰必須在開啟日誌檔或讀取任何檔案之前確認
    let api_key = match &config.command {
        Command::Enrich(args) => match api_key_from_env(&args.api_key_env) {
            Ok(key) => Some(key),
            Err(e) => {
                eprintln!("❌ {}", e.user_friendly_message());
                std::process::exit(exit_code(e.severity()));
            }
        },
        Command::Convert(_) => None,
    };

    // 初始化日誌
    if let Err(e) = logger::init_cli_logger(config.verbose, config.log_json, config.log_file()) {
        eprintln!("❌ Failed to open log file: {}", e);
        std::process::exit(1);
    }

    tracing::info!("Starting foodb-etl");
    if config.verbose {
        tracing::debug!("CLI config: {:?}", config);
    }

    let result = match config.command {
        Command::Enrich(args) => run_enrich(args, api_key.unwrap_or_default()).await,
        Command::Convert(args) => run_convert(args).await,
    };

    match result {
        Ok(output_path) => {
            tracing::info!("✅ Finished successfully!");
            tracing::info!("📁 Output saved to: {}", output_path);
        }
        Err(e) => {
            tracing::error!(
                "❌ Run failed: {} (Category: {:?}, Severity: {:?})",
                e,
                e.category(),
                e.severity()
            );
            tracing::error!("💡 Recovery suggestion: {}", e.recovery_suggestion());
            eprintln!("❌ {}", e.user_friendly_message());

            let code = exit_code(e.severity());
            if code > 0 {
                std::process::exit(code);
            }
        }
    }

    Ok(())
}
