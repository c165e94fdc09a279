use serde::{Deserialize, Serialize};
use serde_json::{Map, Number, Value};
use thiserror::Error;

/// Keys written by enrichment; everything else on a record belongs to the source.
pub const MULTILINGUAL_KEY: &str = "multilingual";
pub const CALORIES_KEY: &str = "calories_per_100g";

/// One food item. Key order follows the source file.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Record {
    pub data: Map<String, Value>,
}

impl Record {
    fn str_field(&self, key: &str) -> &str {
        self.data.get(key).and_then(Value::as_str).unwrap_or("")
    }

    pub fn name(&self) -> &str {
        self.str_field("name")
    }

    pub fn description(&self) -> &str {
        self.str_field("description")
    }

    pub fn is_enhanced(&self) -> bool {
        self.data.contains_key(MULTILINGUAL_KEY) && self.data.contains_key(CALORIES_KEY)
    }

    /// 檢查 `source` 中所有非增強欄位都原封不動地存在於 `self`
    pub fn is_superset_of(&self, source: &Record) -> bool {
        source
            .data
            .iter()
            .filter(|(key, _)| key.as_str() != MULTILINGUAL_KEY && key.as_str() != CALORIES_KEY)
            .all(|(key, value)| self.data.get(key) == Some(value))
    }
}

impl From<Map<String, Value>> for Record {
    fn from(data: Map<String, Value>) -> Self {
        Self { data }
    }
}

pub const REQUIRED_FIELDS: [&str; 7] = [
    "spanish",
    "french",
    "chinese",
    "japanese",
    "korean",
    "german",
    "calories_per_100g",
];

/// The seven-field result returned by the text-generation service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnrichmentPayload {
    pub spanish: String,
    pub french: String,
    pub chinese: String,
    pub japanese: String,
    pub korean: String,
    pub german: String,
    pub calories_per_100g: Number,
}

impl EnrichmentPayload {
    pub fn multilingual(&self) -> Multilingual {
        Multilingual {
            es: self.spanish.clone(),
            fr: self.french.clone(),
            zh: self.chinese.clone(),
            ja: self.japanese.clone(),
            ko: self.korean.clone(),
            de: self.german.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Multilingual {
    pub es: String,
    pub fr: String,
    pub zh: String,
    pub ja: String,
    pub ko: String,
    pub de: String,
}

impl Multilingual {
    pub fn into_value(self) -> Value {
        let mut map = Map::new();
        for (key, text) in [
            ("es", self.es),
            ("fr", self.fr),
            ("zh", self.zh),
            ("ja", self.ja),
            ("ko", self.ko),
            ("de", self.de),
        ] {
            map.insert(key.to_string(), Value::String(text));
        }
        Value::Object(map)
    }
}

/// Why enrichment was skipped for an item.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum UnavailableReason {
    #[error("request failed: {0}")]
    Transport(String),

    #[error("service answered with HTTP {0}")]
    HttpStatus(u16),

    #[error("completion contained no content")]
    EmptyCompletion,

    #[error("completion is not a JSON object: {0}")]
    MalformedJson(String),

    #[error("missing required fields: {}", .0.join(", "))]
    MissingFields(Vec<String>),

    #[error("field has the wrong type: {0}")]
    InvalidField(String),
}

#[derive(Debug, Clone, PartialEq)]
pub enum EnrichmentOutcome {
    Enriched(EnrichmentPayload),
    Unavailable(UnavailableReason),
}

impl EnrichmentOutcome {
    pub fn is_enriched(&self) -> bool {
        matches!(self, EnrichmentOutcome::Enriched(_))
    }
}

impl From<Result<EnrichmentPayload, UnavailableReason>> for EnrichmentOutcome {
    fn from(result: Result<EnrichmentPayload, UnavailableReason>) -> Self {
        match result {
            Ok(payload) => EnrichmentOutcome::Enriched(payload),
            Err(reason) => EnrichmentOutcome::Unavailable(reason),
        }
    }
}

/// Counters reported at the end of an enrichment run.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct RunSummary {
    pub total: usize,
    pub resumed_from: usize,
    pub processed: usize,
    pub enriched: usize,
    pub unavailable: usize,
    pub batches_written: usize,
    pub completed: bool,
}
