//! Reads and writes record collections in the two supported encodings.
//!
//! * [`Encoding::Array`]: one pretty-printed JSON array.
//! * [`Encoding::Lines`]: one compact JSON value per line.

use crate::domain::ports::Storage;
use crate::utils::error::{EtlError, Result};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;

const LINE_PREVIEW_CHARS: usize = 100;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "cli", derive(clap::ValueEnum))]
pub enum Encoding {
    Array,
    Lines,
}

impl Encoding {
    /// 以第一個非空白字元判斷格式
    pub fn detect(bytes: &[u8]) -> Self {
        match bytes.iter().find(|b| !b.is_ascii_whitespace()) {
            Some(b'[') => Encoding::Array,
            _ => Encoding::Lines,
        }
    }
}

fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

fn preview(line: &[u8]) -> String {
    String::from_utf8_lossy(line)
        .chars()
        .take(LINE_PREVIEW_CHARS)
        .collect()
}

#[derive(Debug, Clone)]
pub struct RecordStore<S: Storage> {
    storage: S,
}

impl<S: Storage> RecordStore<S> {
    pub fn new(storage: S) -> Self {
        Self { storage }
    }

    /// Loads a collection. `encoding = None` detects the format from the content.
    pub async fn load<T: DeserializeOwned>(
        &self,
        path: &str,
        encoding: Option<Encoding>,
    ) -> Result<Vec<T>> {
        tracing::info!("Attempting to load file: {}", path);
        let bytes = self.storage.read_file(path).await?;
        let encoding = encoding.unwrap_or_else(|| Encoding::detect(&bytes));
        tracing::debug!("Reading {} as {:?}", path, encoding);

        let records = match encoding {
            Encoding::Array => Self::decode_array(path, &bytes)?,
            Encoding::Lines => Self::decode_lines(path, &bytes)?,
        };

        tracing::info!("Successfully loaded {} items from {}", records.len(), path);
        Ok(records)
    }

    fn decode_array<T: DeserializeOwned>(path: &str, bytes: &[u8]) -> Result<Vec<T>> {
        let value: Value = serde_json::from_slice(bytes).map_err(|e| EtlError::SchemaError {
            path: path.to_string(),
            message: format!("invalid JSON: {}", e),
        })?;

        if !value.is_array() {
            return Err(EtlError::SchemaError {
                path: path.to_string(),
                message: format!("expected a JSON array, found {}", json_type_name(&value)),
            });
        }

        serde_json::from_value(value).map_err(|e| EtlError::SchemaError {
            path: path.to_string(),
            message: format!("array element has unexpected shape: {}", e),
        })
    }

    /// 逐行解析；單行失敗（含非 UTF-8 位元組）只略過該行
    fn decode_lines<T: DeserializeOwned>(path: &str, bytes: &[u8]) -> Result<Vec<T>> {
        let mut records = Vec::new();
        for (index, raw) in bytes.split(|b| *b == b'\n').enumerate() {
            let line = raw.trim_ascii();
            if line.is_empty() {
                continue;
            }
            match serde_json::from_slice::<T>(line) {
                Ok(record) => records.push(record),
                Err(e) => {
                    tracing::error!("Error parsing line {} in {}: {}", index + 1, path, e);
                    tracing::error!("Problematic line: {}...", preview(line));
                }
            }
        }
        Ok(records)
    }

    /// Overwrites `path` with the whole collection.
    pub async fn save<T: Serialize>(
        &self,
        records: &[T],
        path: &str,
        encoding: Encoding,
    ) -> Result<()> {
        tracing::debug!("Attempting to save {} items to {}", records.len(), path);
        let data = Self::encode(records, encoding)?;

        self.storage
            .write_file(path, &data)
            .await
            .map_err(|e| match e {
                EtlError::PersistenceError { .. } => e,
                other => EtlError::PersistenceError {
                    path: path.to_string(),
                    message: other.to_string(),
                },
            })?;

        tracing::debug!("Successfully saved {}", path);
        Ok(())
    }

    fn encode<T: Serialize>(records: &[T], encoding: Encoding) -> Result<Vec<u8>> {
        match encoding {
            Encoding::Array => Ok(serde_json::to_vec_pretty(records)?),
            Encoding::Lines => {
                let mut out = Vec::new();
                for record in records {
                    serde_json::to_writer(&mut out, record)?;
                    out.push(b'\n');
                }
                Ok(out)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::storage::LocalStorage;
    use crate::domain::model::Record;
    use serde_json::json;
    use tempfile::TempDir;

    fn store(dir: &TempDir) -> RecordStore<LocalStorage> {
        RecordStore::new(LocalStorage::new(dir.path()))
    }

    #[test]
    fn test_detect_encoding() {
        assert_eq!(Encoding::detect(b"  \n[{\"a\":1}]"), Encoding::Array);
        assert_eq!(Encoding::detect(b"{\"a\":1}\n{\"a\":2}\n"), Encoding::Lines);
        assert_eq!(Encoding::detect(b""), Encoding::Lines);
    }

    #[tokio::test]
    async fn test_lines_skip_blank_and_malformed() {
        let dir = TempDir::new().unwrap();
        std::fs::write(
            dir.path().join("Food.json"),
            "{\"name\":\"Angelica\"}\n\n{\"name\": broken\n   \n{\"name\":\"Kiwi\"}\n",
        )
        .unwrap();

        let records: Vec<Record> = store(&dir)
            .load("Food.json", Some(Encoding::Lines))
            .await
            .unwrap();

        assert_eq!(records.len(), 2);
        assert_eq!(records[0].name(), "Angelica");
        assert_eq!(records[1].name(), "Kiwi");
    }

    #[tokio::test]
    async fn test_lines_skip_invalid_utf8_line() {
        let dir = TempDir::new().unwrap();
        let mut content = b"{\"name\":\"Kiwi\"}\n{\"name\":\"".to_vec();
        content.extend_from_slice(&[0xFF, 0xFE]);
        content.extend_from_slice(b"\"}\r\n{\"name\":\"Lime\"}\n");
        std::fs::write(dir.path().join("Food.json"), content).unwrap();

        let records: Vec<Record> = store(&dir)
            .load("Food.json", Some(Encoding::Lines))
            .await
            .unwrap();

        let names: Vec<&str> = records.iter().map(Record::name).collect();
        assert_eq!(names, vec!["Kiwi", "Lime"]);
    }

    #[tokio::test]
    async fn test_lines_skip_non_object_line_for_records() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("Food.json"), "{\"name\":\"A\"}\n[1,2]\n42\n").unwrap();

        let records: Vec<Record> = store(&dir).load("Food.json", None).await.unwrap();
        assert_eq!(records.len(), 1);
    }

    #[tokio::test]
    async fn test_array_rejects_non_array_top_level() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("Food.json"), "{\"name\":\"A\"}").unwrap();

        let err = store(&dir)
            .load::<Value>("Food.json", Some(Encoding::Array))
            .await
            .unwrap_err();
        match err {
            EtlError::SchemaError { message, .. } => assert!(message.contains("object")),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_missing_file() {
        let dir = TempDir::new().unwrap();
        let err = store(&dir)
            .load::<Record>("missing.json", None)
            .await
            .unwrap_err();
        assert!(matches!(err, EtlError::NotFoundError { .. }));
    }

    #[tokio::test]
    async fn test_save_array_is_pretty_and_keeps_unicode() {
        let dir = TempDir::new().unwrap();
        let records = vec![json!({"name": "Apple", "multilingual": {"zh": "苹果"}})];

        store(&dir)
            .save(&records, "out/list/Food.json", Encoding::Array)
            .await
            .unwrap();

        let text = std::fs::read_to_string(dir.path().join("out/list/Food.json")).unwrap();
        assert!(text.starts_with("[\n  {\n    \"name\": \"Apple\""));
        assert!(text.contains("苹果"));
        assert!(!text.contains("\\u"));
    }

    #[tokio::test]
    async fn test_save_lines_one_compact_object_per_line() {
        let dir = TempDir::new().unwrap();
        let records = vec![json!({"name": "りんご"}), json!({"name": "B", "n": 2})];

        store(&dir)
            .save(&records, "Food.jsonl", Encoding::Lines)
            .await
            .unwrap();

        let text = std::fs::read_to_string(dir.path().join("Food.jsonl")).unwrap();
        assert_eq!(text, "{\"name\":\"りんご\"}\n{\"name\":\"B\",\"n\":2}\n");
    }

    #[tokio::test]
    async fn test_resave_is_byte_identical() {
        let dir = TempDir::new().unwrap();
        let store = store(&dir);
        let records = vec![
            json!({"z": 1, "a": "first", "description": "zz"}),
            json!({"name": "Ω", "nested": {"k": [1, 2, 3]}}),
        ];

        for encoding in [Encoding::Array, Encoding::Lines] {
            store.save(&records, "Food.json", encoding).await.unwrap();
            let first = std::fs::read(dir.path().join("Food.json")).unwrap();
            store.save(&records, "Food.json", encoding).await.unwrap();
            let second = std::fs::read(dir.path().join("Food.json")).unwrap();
            assert_eq!(first, second);
        }
    }
}
