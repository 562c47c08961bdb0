use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Per-model inference output attached to one query record.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct ModelResult {
    #[serde(default)]
    pub total_objects: u32,
    #[serde(default)]
    pub counts: HashMap<String, u32>,
}

/// Raw record returned by the query collaborator for one camera snapshot.
///
/// `has_image` is absent for legacy records; absence means the node retained
/// the image, so only an explicit `false` marks an inference-only record.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct QueryRecord {
    pub timestamp: String,
    pub node: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub filename: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub has_image: Option<bool>,
    #[serde(default)]
    pub models_results: HashMap<String, ModelResult>,
}

impl QueryRecord {
    /// `has_image != Some(false)`, matching the collaborator's convention.
    pub fn retains_image(&self) -> bool {
        self.has_image != Some(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_numeric_fields_default_to_zero() {
        let json = r#"{
            "timestamp": "2025-06-01T08:15:00Z",
            "node": "W023",
            "models_results": { "YOLOv8n": {} }
        }"#;
        let record: QueryRecord = serde_json::from_str(json).unwrap();
        let result = &record.models_results["YOLOv8n"];
        assert_eq!(result.total_objects, 0);
        assert!(result.counts.is_empty());
    }

    #[test]
    fn absent_has_image_means_retained() {
        let json = r#"{"timestamp": "2025-06-01T08:15:00Z", "node": "W023"}"#;
        let record: QueryRecord = serde_json::from_str(json).unwrap();
        assert!(record.retains_image());

        let json = r#"{"timestamp": "2025-06-01T08:15:00Z", "node": "W023", "has_image": false}"#;
        let record: QueryRecord = serde_json::from_str(json).unwrap();
        assert!(!record.retains_image());
    }
}
