//! Wire records for OpenAI-compatible embedding endpoints
//!
//! Adapters that talk to such an endpoint serialize an [`EmbeddingRequest`]
//! and parse the body into an [`EmbeddingResponse`], which
//! [`EmbeddingResponse::into_vectors`] checks and puts back in request order.

use serde::{Deserialize, Serialize};

use super::EmbeddingError;
use crate::types::EmbeddingVector;

/// Request body for `POST /embeddings`
#[derive(Debug, Serialize)]
pub struct EmbeddingRequest<'a> {
    pub model: &'a str,
    #[serde(borrow)]
    pub input: &'a [&'a str],
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dimensions: Option<usize>,
}

/// Response body of an embeddings call
#[derive(Debug, Clone, Deserialize)]
pub struct EmbeddingResponse {
    pub data: Vec<EmbeddingData>,
}

/// One vector and the position of the input it belongs to
#[derive(Debug, Clone, Deserialize)]
pub struct EmbeddingData {
    pub embedding: Vec<f32>,
    pub index: usize,
}

impl EmbeddingResponse {
    /// Parse a response body
    pub fn from_json(body: &str) -> Result<Self, EmbeddingError> {
        Ok(serde_json::from_str(body)?)
    }

    /// Vectors in request order, checked against the request size
    ///
    /// Every index in `0..expected` must appear exactly once.
    pub fn into_vectors(mut self, expected: usize) -> Result<Vec<EmbeddingVector>, EmbeddingError> {
        if self.data.len() != expected {
            return Err(EmbeddingError::CountMismatch {
                expected,
                actual: self.data.len(),
            });
        }
        self.data.sort_by_key(|entry| entry.index);
        for (position, entry) in self.data.iter().enumerate() {
            if entry.index >= expected {
                return Err(EmbeddingError::IndexOutOfRange {
                    index: entry.index,
                    len: expected,
                });
            }
            if entry.index != position {
                // Sorted, in range and the right count: a gap means a repeat
                return Err(EmbeddingError::DuplicateIndex(entry.index));
            }
        }
        Ok(self.data.into_iter().map(|entry| entry.embedding).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reordered_by_index() {
        let body = r#"{
            "object": "list",
            "data": [
                { "object": "embedding", "index": 1, "embedding": [0.0, 1.0] },
                { "object": "embedding", "index": 0, "embedding": [1.0, 0.0] }
            ],
            "model": "text-embedding-3-small"
        }"#;
        let vectors = EmbeddingResponse::from_json(body)
            .unwrap()
            .into_vectors(2)
            .unwrap();
        assert_eq!(vectors, vec![vec![1.0, 0.0], vec![0.0, 1.0]]);
    }

    #[test]
    fn test_count_mismatch() {
        let body = r#"{ "data": [ { "index": 0, "embedding": [1.0] } ] }"#;
        let err = EmbeddingResponse::from_json(body)
            .unwrap()
            .into_vectors(2)
            .unwrap_err();
        assert!(matches!(
            err,
            EmbeddingError::CountMismatch {
                expected: 2,
                actual: 1
            }
        ));
    }

    #[test]
    fn test_duplicate_and_out_of_range_indices() {
        let duplicate = r#"{ "data": [
            { "index": 0, "embedding": [1.0] },
            { "index": 0, "embedding": [2.0] }
        ] }"#;
        let err = EmbeddingResponse::from_json(duplicate)
            .unwrap()
            .into_vectors(2)
            .unwrap_err();
        assert!(matches!(err, EmbeddingError::DuplicateIndex(0)));

        let out_of_range = r#"{ "data": [ { "index": 3, "embedding": [1.0] } ] }"#;
        let err = EmbeddingResponse::from_json(out_of_range)
            .unwrap()
            .into_vectors(1)
            .unwrap_err();
        assert!(matches!(err, EmbeddingError::IndexOutOfRange { index: 3, len: 1 }));
    }

    #[test]
    fn test_malformed_body() {
        let err = EmbeddingResponse::from_json(r#"{ "error": "rate limited" }"#).unwrap_err();
        assert!(matches!(err, EmbeddingError::Malformed(_)));
    }

    #[test]
    fn test_request_serialization() {
        let input = ["great app", "battery drain"];
        let request = EmbeddingRequest {
            model: "text-embedding-3-small",
            input: &input,
            dimensions: None,
        };
        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["input"][1], "battery drain");
        assert!(json.get("dimensions").is_none());
    }
}
