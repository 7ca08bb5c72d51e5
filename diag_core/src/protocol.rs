//! # /predict Wire Protocol
//!
//! Request and response shapes of the classification endpoint.
//!
//! ```text
//! POST /predict              multipart/form-data, one part named "file"
//!
//! 200 {"status": "success",
//!      "confidence_scores": {"EfficientNetV2S": .., "DenseNet121": .., "InceptionV3": ..},
//!      "final_diagnosis": "Monkeypox" | "Normal",
//!      "ensemble_confidence": 0.0..1.0,
//!      "lime_image_b64": "<base64 png>"}        (optional)
//!
//! 500 {"error": "Prediction failed: ..."}       (status absent or not "success")
//! ```
//!
//! HTTP status codes carry no meaning here; only the `status` field decides
//! which path a response takes.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::errors::{DiagError, DiagResult, UNKNOWN_SERVER_ERROR};

/// Fixed endpoint path, joined onto the configured server base URL
pub const PREDICT_PATH: &str = "/predict";

/// Multipart field name carrying the image
pub const FILE_FIELD: &str = "file";

/// Discriminator value selecting the success path
pub const SUCCESS_STATUS: &str = "success";

/// The only diagnosis label that triggers the positive styling
pub const POSITIVE_LABEL: &str = "Monkeypox";

/// The three ensemble members, in display order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ModelId {
    EfficientNetV2S,
    DenseNet121,
    InceptionV3,
}

impl ModelId {
    /// All models in fixed display order
    pub const ALL: [ModelId; 3] = [
        ModelId::EfficientNetV2S,
        ModelId::DenseNet121,
        ModelId::InceptionV3,
    ];

    /// Key used in the `confidence_scores` object
    pub fn key(&self) -> &'static str {
        match self {
            ModelId::EfficientNetV2S => "EfficientNetV2S",
            ModelId::DenseNet121 => "DenseNet121",
            ModelId::InceptionV3 => "InceptionV3",
        }
    }

    /// Human-readable model name
    pub fn display_name(&self) -> &'static str {
        match self {
            ModelId::EfficientNetV2S => "EfficientNetV2-S",
            ModelId::DenseNet121 => "DenseNet121",
            ModelId::InceptionV3 => "InceptionV3",
        }
    }

    /// Weight of this model in the server-side ensemble.
    ///
    /// Informational only; the client never recombines scores.
    pub fn ensemble_weight(&self) -> f64 {
        match self {
            ModelId::EfficientNetV2S => 0.2,
            ModelId::DenseNet121 => 0.4,
            ModelId::InceptionV3 => 0.4,
        }
    }
}

/// Per-model probability of the positive class.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ConfidenceScores {
    #[serde(rename = "EfficientNetV2S")]
    pub efficientnet_v2s: f64,
    #[serde(rename = "DenseNet121")]
    pub densenet121: f64,
    #[serde(rename = "InceptionV3")]
    pub inception_v3: f64,
}

impl ConfidenceScores {
    /// Score reported by one model
    pub fn get(&self, model: ModelId) -> f64 {
        match model {
            ModelId::EfficientNetV2S => self.efficientnet_v2s,
            ModelId::DenseNet121 => self.densenet121,
            ModelId::InceptionV3 => self.inception_v3,
        }
    }

    /// Scores in display order
    pub fn iter(&self) -> impl Iterator<Item = (ModelId, f64)> + '_ {
        ModelId::ALL.into_iter().map(move |m| (m, self.get(m)))
    }
}

/// A successful ensemble prediction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PredictionResult {
    pub confidence_scores: ConfidenceScores,
    pub final_diagnosis: String,
    pub ensemble_confidence: f64,
    /// Base64 PNG without a data-URI prefix
    #[serde(
        rename = "lime_image_b64",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub explanation_image: Option<String>,
}

impl PredictionResult {
    /// True iff the diagnosis is exactly the positive label
    pub fn is_positive(&self) -> bool {
        self.final_diagnosis == POSITIVE_LABEL
    }
}

/// Text of the `error` field, whatever JSON type the server used
fn error_text(error: Option<&Value>) -> String {
    match error {
        Some(Value::String(message)) => message.clone(),
        Some(Value::Null) | None => UNKNOWN_SERVER_ERROR.to_string(),
        Some(other) => other.to_string(),
    }
}

/// Interpret a raw response body.
///
/// # Returns
///
/// * `Ok(PredictionResult)` - `status` is `"success"` and the payload is complete
/// * `Err(DiagError::Server)` - any other or missing `status` (of any JSON type),
///   carrying the `error` field verbatim
/// * `Err(DiagError::InvalidResponse)` - body is not JSON, or a success payload is incomplete
///
/// # Example
///
/// ```rust
/// use diag_core::protocol::parse_response;
/// use diag_core::errors::DiagError;
///
/// let body = br#"{"status": "error", "error": "model unavailable"}"#;
/// assert_eq!(parse_response(body), Err(DiagError::server("model unavailable")));
/// ```
pub fn parse_response(body: &[u8]) -> DiagResult<PredictionResult> {
    let value: Value = serde_json::from_slice(body)?;

    if value.get("status").and_then(Value::as_str) != Some(SUCCESS_STATUS) {
        return Err(DiagError::server(error_text(value.get("error"))));
    }

    let result = PredictionResult::deserialize(&value)?;
    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::ErrorClass;

    const SUCCESS_BODY: &str = r#"{
        "status": "success",
        "final_diagnosis": "Monkeypox",
        "confidence_scores": {"EfficientNetV2S": 0.91, "DenseNet121": 0.87, "InceptionV3": 0.79},
        "ensemble_confidence": 0.8734,
        "lime_image_b64": "iVBORw0KGgo="
    }"#;

    #[test]
    fn test_parse_success() {
        let result = parse_response(SUCCESS_BODY.as_bytes()).unwrap();
        assert_eq!(result.final_diagnosis, "Monkeypox");
        assert!(result.is_positive());
        assert_eq!(result.confidence_scores.get(ModelId::DenseNet121), 0.87);
        assert_eq!(result.ensemble_confidence, 0.8734);
        assert_eq!(result.explanation_image.as_deref(), Some("iVBORw0KGgo="));
    }

    #[test]
    fn test_parse_success_without_explanation() {
        let body = r#"{"status": "success", "final_diagnosis": "Normal",
            "confidence_scores": {"EfficientNetV2S": 0.1, "DenseNet121": 0.2, "InceptionV3": 0.3},
            "ensemble_confidence": 0.81}"#;
        let result = parse_response(body.as_bytes()).unwrap();
        assert!(!result.is_positive());
        assert!(result.explanation_image.is_none());
    }

    #[test]
    fn test_parse_server_error() {
        let body = br#"{"status": "error", "error": "model unavailable"}"#;
        let err = parse_response(body).unwrap_err();
        assert_eq!(err, DiagError::server("model unavailable"));
        assert_eq!(err.class(), ErrorClass::Application);
    }

    #[test]
    fn test_missing_status_is_server_error() {
        // What the server sends alongside an HTTP 500
        let body = br#"{"error": "Models not loaded"}"#;
        assert_eq!(
            parse_response(body),
            Err(DiagError::server("Models not loaded"))
        );
    }

    #[test]
    fn test_non_string_status_is_server_error() {
        let body = br#"{"status": 0, "error": "model unavailable"}"#;
        let err = parse_response(body).unwrap_err();
        assert_eq!(err, DiagError::server("model unavailable"));
        assert_eq!(err.class(), ErrorClass::Application);

        let body = br#"{"status": false, "error": "model unavailable"}"#;
        assert_eq!(parse_response(body), Err(DiagError::server("model unavailable")));
    }

    #[test]
    fn test_non_string_error_is_shown_as_json() {
        let body = br#"{"status": "error", "error": 503}"#;
        assert_eq!(parse_response(body), Err(DiagError::server("503")));

        let body = br#"{"status": "error", "error": {"code": 7}}"#;
        assert_eq!(parse_response(body), Err(DiagError::server(r#"{"code":7}"#)));
    }

    #[test]
    fn test_non_object_json_is_server_error() {
        assert_eq!(parse_response(b"[]"), Err(DiagError::server(UNKNOWN_SERVER_ERROR)));
    }

    #[test]
    fn test_missing_error_field_uses_fallback() {
        let body = br#"{"status": "failed"}"#;
        assert_eq!(
            parse_response(body),
            Err(DiagError::server(UNKNOWN_SERVER_ERROR))
        );
    }

    #[test]
    fn test_non_json_is_transport_class() {
        let err = parse_response(b"<html>502 Bad Gateway</html>").unwrap_err();
        assert_eq!(err.class(), ErrorClass::Transport);
    }

    #[test]
    fn test_incomplete_success_is_transport_class() {
        let body = br#"{"status": "success", "final_diagnosis": "Normal"}"#;
        let err = parse_response(body).unwrap_err();
        assert!(matches!(err, DiagError::InvalidResponse { .. }));
    }

    #[test]
    fn test_positive_is_exact_match() {
        let mut result = parse_response(SUCCESS_BODY.as_bytes()).unwrap();
        for label in ["monkeypox", "Monkeypox ", "Normal", ""] {
            result.final_diagnosis = label.to_string();
            assert!(!result.is_positive(), "{label:?} must not be positive");
        }
    }

    #[test]
    fn test_model_order_and_weights() {
        let keys: Vec<_> = ModelId::ALL.iter().map(|m| m.key()).collect();
        assert_eq!(keys, ["EfficientNetV2S", "DenseNet121", "InceptionV3"]);
        let total: f64 = ModelId::ALL.iter().map(|m| m.ensemble_weight()).sum();
        assert!((total - 1.0).abs() < 1e-12);
    }
}
