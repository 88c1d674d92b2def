use serde::{Deserialize, Serialize};

/// Task kind understood by the analyze-text endpoint.
pub const TASK_KIND: &str = "PiiEntityRecognition";

/// Body of a PII entity recognition request.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PiiEntityRecognitionRequest {
    pub kind: String,
    pub analysis_input: AnalysisInput,
    pub parameters: Parameters,
}

impl PiiEntityRecognitionRequest {
    pub fn new(documents: Vec<Document>, domain: &str) -> Self {
        Self {
            kind: TASK_KIND.to_string(),
            analysis_input: AnalysisInput { documents },
            parameters: Parameters {
                domain: domain.to_string(),
            },
        }
    }

    pub fn documents(&self) -> &[Document] {
        &self.analysis_input.documents
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnalysisInput {
    pub documents: Vec<Document>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Parameters {
    pub domain: String,
}

/// A piece of text submitted for analysis.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Document {
    /// Caller-chosen id, echoed back in the results
    pub id: String,
    pub text: String,
    /// ISO 639-1 language of `text`
    pub language: String,
}

/// Response of a PII entity recognition request.
#[derive(Debug, Clone, Deserialize)]
pub struct PiiEntityRecognitionResults {
    #[serde(default)]
    pub kind: String,
    pub results: RecognitionResults,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecognitionResults {
    pub documents: Vec<DocumentResult>,
    #[serde(default)]
    pub errors: Vec<DocumentError>,
    #[serde(default)]
    pub model_version: String,
}

/// Per-document outcome: the redacted text and every detected entity.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentResult {
    pub redacted_text: String,
    pub id: String,
    #[serde(default)]
    pub entities: Vec<Entity>,
    #[serde(default)]
    pub warnings: Vec<Warning>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Entity {
    pub text: String,
    pub category: String,
    pub offset: usize,
    pub length: usize,
    pub confidence_score: f64,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Warning {
    #[serde(default)]
    pub code: String,
    #[serde(default)]
    pub message: String,
}

/// A document the service refused to process.
#[derive(Debug, Clone, Deserialize)]
pub struct DocumentError {
    pub id: String,
    #[serde(default)]
    pub error: ServiceError,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ServiceError {
    #[serde(default)]
    pub code: String,
    #[serde(default)]
    pub message: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_request_wire_shape() {
        let request = PiiEntityRecognitionRequest::new(
            vec![Document {
                id: "https://github.com/octo/hello/issues/1".to_string(),
                text: "Patient John Doe".to_string(),
                language: "en".to_string(),
            }],
            "phi",
        );
        let value = serde_json::to_value(&request).unwrap();
        assert_eq!(
            value,
            json!({
                "kind": "PiiEntityRecognition",
                "analysisInput": {
                    "documents": [{
                        "id": "https://github.com/octo/hello/issues/1",
                        "text": "Patient John Doe",
                        "language": "en"
                    }]
                },
                "parameters": {"domain": "phi"}
            })
        );
    }

    #[test]
    fn test_decode_service_response() {
        let body = r#"{
            "kind": "PiiEntityRecognitionResults",
            "results": {
                "documents": [{
                    "redactedText": "Patient ********",
                    "id": "1",
                    "entities": [{
                        "text": "John Doe",
                        "category": "Person",
                        "offset": 8,
                        "length": 8,
                        "confidenceScore": 0.97
                    }],
                    "warnings": []
                }],
                "errors": [{"id": "2", "error": {"code": "InvalidArgument", "message": "Document text is empty."}}],
                "modelVersion": "2021-01-15"
            }
        }"#;
        let parsed: PiiEntityRecognitionResults = serde_json::from_str(body).unwrap();
        assert_eq!(parsed.results.model_version, "2021-01-15");
        let doc = &parsed.results.documents[0];
        assert_eq!(doc.redacted_text, "Patient ********");
        assert_eq!(doc.entities[0].category, "Person");
        assert_eq!(doc.entities[0].offset, 8);
        assert_eq!(parsed.results.errors[0].error.code, "InvalidArgument");
    }

    #[test]
    fn test_decode_minimal_response() {
        let body = r#"{"results": {"documents": [{"redactedText": "", "id": "1"}]}}"#;
        let parsed: PiiEntityRecognitionResults = serde_json::from_str(body).unwrap();
        assert!(parsed.results.errors.is_empty());
        assert!(parsed.results.documents[0].entities.is_empty());
    }
}
