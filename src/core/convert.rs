use crate::adapters::record_store::{Encoding, RecordStore};
use crate::domain::ports::Storage;
use crate::utils::error::Result;
use serde_json::Value;

/// Rewrites a JSON array file as line-delimited JSON, element by element.
pub struct FormatConverter<S: Storage> {
    store: RecordStore<S>,
}

impl<S: Storage> FormatConverter<S> {
    pub fn new(store: RecordStore<S>) -> Self {
        Self { store }
    }

    /// 回傳寫出的元素數量；元素內容不做任何轉換
    pub async fn convert(&self, source: &str, dest: &str) -> Result<usize> {
        tracing::info!("Reading from: {}", source);
        tracing::info!("Writing to: {}", dest);

        let items: Vec<Value> = self.store.load(source, Some(Encoding::Array)).await?;
        tracing::info!("Found {} items to convert", items.len());

        self.store.save(&items, dest, Encoding::Lines).await?;
        tracing::info!("Conversion completed successfully");
        Ok(items.len())
    }
}
