use crate::adapters::record_store::{Encoding, RecordStore};
use crate::config::toml_config::TomlConfig;
use crate::domain::model::{Record, RunSummary};
use crate::domain::ports::{Enricher, Storage};
use crate::domain::services::enhance_record;
use crate::utils::error::{EtlError, Result};
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct BatchOptions {
    pub batch_size: usize,
    /// Pause after every enrichment call.
    pub item_delay: Duration,
    /// Stop after this many batches of the current run.
    pub max_batches: Option<usize>,
    pub resume: bool,
    /// `None` detects the encoding from the input content.
    pub input_format: Option<Encoding>,
    pub output_format: Encoding,
}

impl Default for BatchOptions {
    fn default() -> Self {
        Self {
            batch_size: 5,
            item_delay: Duration::from_secs(1),
            max_batches: None,
            resume: false,
            input_format: None,
            output_format: Encoding::Array,
        }
    }
}

impl From<&TomlConfig> for BatchOptions {
    fn from(config: &TomlConfig) -> Self {
        Self {
            batch_size: config.batch.size,
            item_delay: config.item_delay(),
            ..Self::default()
        }
    }
}

/// Enriches a record collection batch by batch and rewrites the output file
/// after every batch, so an interrupted run leaves a valid prefix on disk.
pub struct BatchEnricher<S: Storage, E: Enricher> {
    store: RecordStore<S>,
    enricher: E,
    options: BatchOptions,
}

impl<S: Storage, E: Enricher> BatchEnricher<S, E> {
    pub fn new(store: RecordStore<S>, enricher: E, options: BatchOptions) -> Self {
        Self {
            store,
            enricher,
            options,
        }
    }

    pub async fn run(&self, source: &str, dest: &str) -> Result<RunSummary> {
        if self.options.batch_size == 0 {
            return Err(EtlError::InvalidConfigValueError {
                field: "batch.size".to_string(),
                value: "0".to_string(),
                reason: "Value must be at least 1".to_string(),
            });
        }

        let records: Vec<Record> = self.store.load(source, self.options.input_format).await?;
        let total = records.len();
        tracing::info!("Processing {} food items", total);

        let mut results = if self.options.resume {
            self.load_checkpoint(dest, &records).await?
        } else {
            Vec::new()
        };

        let mut summary = RunSummary {
            total,
            resumed_from: results.len(),
            ..RunSummary::default()
        };
        if summary.resumed_from > 0 {
            tracing::info!(
                "⏩ Resuming after {} already processed items",
                summary.resumed_from
            );
        }

        let pending = &records[summary.resumed_from..];
        for (batch_index, batch) in pending.chunks(self.options.batch_size).enumerate() {
            if self
                .options
                .max_batches
                .is_some_and(|max| batch_index >= max)
            {
                tracing::info!("⏹️ Stopping after {} batches as requested", batch_index);
                break;
            }

            let start = summary.resumed_from + batch_index * self.options.batch_size;
            let enhanced = self.process_batch(batch, start, total, &mut summary).await;
            results.extend(enhanced);

            // 每批完成後整檔覆寫，失敗即中止（先前的檢查點仍有效）
            self.store
                .save(&results, dest, self.options.output_format)
                .await?;
            summary.batches_written += 1;
            tracing::info!(
                "💾 Saved progress: {}/{} items processed",
                results.len(),
                total
            );
        }

        summary.processed = results.len();
        summary.completed = summary.processed == total;
        if summary.completed {
            tracing::info!(
                "✅ Enhancement completed: {} enriched, {} kept unenriched",
                summary.enriched,
                summary.unavailable
            );
        }
        Ok(summary)
    }

    async fn process_batch(
        &self,
        batch: &[Record],
        start: usize,
        total: usize,
        summary: &mut RunSummary,
    ) -> Vec<Record> {
        let mut enhanced_batch = Vec::with_capacity(batch.len());

        for (offset, source) in batch.iter().enumerate() {
            let name = if source.name().is_empty() {
                "unknown"
            } else {
                source.name()
            };
            tracing::info!("Processing item {}/{}: {}", start + offset + 1, total, name);

            let outcome = self
                .enricher
                .enrich(source.name(), source.description())
                .await;
            if outcome.is_enriched() {
                summary.enriched += 1;
            } else {
                summary.unavailable += 1;
            }
            enhanced_batch.push(enhance_record(source, &outcome));

            if !self.options.item_delay.is_zero() {
                tokio::time::sleep(self.options.item_delay).await;
            }
        }

        enhanced_batch
    }

    /// 讀取既有輸出作為已處理的前綴；檔案不存在時從頭開始。
    /// 每筆都必須對應到同位置的來源記錄，否則拒絕續跑
    async fn load_checkpoint(&self, dest: &str, records: &[Record]) -> Result<Vec<Record>> {
        let existing: Vec<Record> = match self.store.load(dest, None).await {
            Ok(saved) => saved,
            Err(EtlError::NotFoundError { .. }) => {
                tracing::info!("No checkpoint at {}, starting from the first item", dest);
                return Ok(Vec::new());
            }
            Err(e) => return Err(e),
        };

        if existing.len() > records.len() {
            return Err(EtlError::SchemaError {
                path: dest.to_string(),
                message: format!(
                    "checkpoint holds {} records but the source only has {}",
                    existing.len(),
                    records.len()
                ),
            });
        }

        if let Some(position) = existing
            .iter()
            .zip(records)
            .position(|(saved, source)| !saved.is_superset_of(source))
        {
            return Err(EtlError::SchemaError {
                path: dest.to_string(),
                message: format!(
                    "checkpoint record {} does not match source item {}",
                    position + 1,
                    position + 1
                ),
            });
        }
        Ok(existing)
    }
}
