use crate::domain::model::{EnrichmentOutcome, Record, CALORIES_KEY, MULTILINGUAL_KEY};
use serde_json::Value;

/// 由來源記錄與增強結果產生輸出記錄，來源本身不會被修改
pub fn enhance_record(source: &Record, outcome: &EnrichmentOutcome) -> Record {
    let mut enhanced = source.clone();
    if let EnrichmentOutcome::Enriched(payload) = outcome {
        enhanced.data.insert(
            MULTILINGUAL_KEY.to_string(),
            payload.multilingual().into_value(),
        );
        enhanced.data.insert(
            CALORIES_KEY.to_string(),
            Value::Number(payload.calories_per_100g.clone()),
        );
    }
    enhanced
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::model::{EnrichmentPayload, UnavailableReason};
    use serde_json::json;

    fn apple() -> Record {
        serde_json::from_value(json!({
            "id": 1,
            "name": "Apple",
            "description": "Fruit of Malus domestica",
            "food_group": "Fruits"
        }))
        .unwrap()
    }

    fn payload() -> EnrichmentPayload {
        serde_json::from_value(json!({
            "spanish": "manzana",
            "french": "pomme",
            "chinese": "苹果",
            "japanese": "りんご",
            "korean": "사과",
            "german": "Apfel",
            "calories_per_100g": 52
        }))
        .unwrap()
    }

    #[test]
    fn test_enriched_outcome_adds_fields() {
        let source = apple();
        let enhanced = enhance_record(&source, &EnrichmentOutcome::Enriched(payload()));

        assert!(enhanced.is_enhanced());
        assert!(enhanced.is_superset_of(&source));
        assert_eq!(enhanced.data["multilingual"]["zh"], json!("苹果"));
        assert_eq!(enhanced.data["multilingual"]["de"], json!("Apfel"));
        assert_eq!(enhanced.data["calories_per_100g"], json!(52));
        // 來源不變
        assert!(!source.data.contains_key("multilingual"));
    }

    #[test]
    fn test_unavailable_outcome_returns_source_unchanged() {
        let source = apple();
        let outcome = EnrichmentOutcome::Unavailable(UnavailableReason::HttpStatus(429));
        assert_eq!(enhance_record(&source, &outcome), source);
    }

    #[test]
    fn test_enrichment_keeps_key_order() {
        let enhanced = enhance_record(&apple(), &EnrichmentOutcome::Enriched(payload()));
        let keys: Vec<&str> = enhanced.data.keys().map(String::as_str).collect();
        assert_eq!(
            keys,
            vec!["id", "name", "description", "food_group", "multilingual", "calories_per_100g"]
        );
    }
}
