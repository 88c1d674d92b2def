use serde::Serialize;

use crate::redaction::Entity;

/// A document with at least one entity at or above the confidence threshold.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FlaggedDocument {
    /// Document id (the issue URL)
    pub id: String,
    /// Body as redacted by the service
    pub redacted: String,
    /// Entities that passed the threshold, in service order
    pub entities: Vec<Entity>,
}

/// Counters for a complete scan.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ScanSummary {
    /// Issue pages fetched
    pub pages: usize,
    /// Issues seen across all pages
    pub issues: usize,
    /// Analysis requests sent
    pub requests: usize,
    /// Documents written to the output
    pub flagged_documents: usize,
    /// Entities across all flagged documents
    pub flagged_entities: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flagged_document_field_names() {
        let doc = FlaggedDocument {
            id: "https://github.com/octo/hello/issues/1".to_string(),
            redacted: "SSN ***********".to_string(),
            entities: vec![Entity {
                text: "123-45-6789".to_string(),
                category: "USSocialSecurityNumber".to_string(),
                offset: 4,
                length: 11,
                confidence_score: 0.85,
            }],
        };
        let value = serde_json::to_value(&doc).unwrap();
        assert_eq!(value["id"], "https://github.com/octo/hello/issues/1");
        assert_eq!(value["redacted"], "SSN ***********");
        assert_eq!(value["entities"][0]["confidenceScore"], 0.85);
        assert_eq!(value["entities"][0]["category"], "USSocialSecurityNumber");
    }

    #[test]
    fn test_summary_starts_empty() {
        let summary = ScanSummary::default();
        assert_eq!(summary.pages, 0);
        assert_eq!(summary.flagged_documents, 0);
    }
}
