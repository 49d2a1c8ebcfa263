//! Wire types of the sentiment API.

use serde::{Deserialize, Serialize};

/// Body of `/predict_one`, `/explain_lime` and `/explain`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PredictRequest {
    pub text: String,
}

impl PredictRequest {
    pub fn new(text: impl Into<String>) -> Self {
        Self { text: text.into() }
    }
}

/// Body of `/predict`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BatchRequest {
    pub texts: Vec<String>,
}

/// Payload of `/health`. The fields are opaque descriptions of the loaded model.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Health {
    #[serde(default)]
    pub model_class: Option<String>,
    #[serde(default)]
    pub mode: Option<String>,
    #[serde(default)]
    pub vectorizer_class: Option<String>,
}

/// Payload of a successful `/predict_one`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Prediction {
    pub sentiment: String,
    pub confidence: f64,
    pub probability_positive: f64,
    pub probability_negative: f64,
}

/// Tolerance used when checking that the two probabilities sum to one.
pub const PROBABILITY_TOLERANCE: f64 = 1e-6;

impl Prediction {
    /// Labels of the "positive" family (`positive`, `POS`, `Positif`, ...).
    pub fn is_positive(&self) -> bool {
        is_positive_label(&self.sentiment)
    }

    /// Whether the server's probabilities sum to 1.0 within [`PROBABILITY_TOLERANCE`].
    ///
    /// Informational only: the server is trusted.
    pub fn probabilities_are_consistent(&self) -> bool {
        (self.probability_positive + self.probability_negative - 1.0).abs() <= PROBABILITY_TOLERANCE
    }
}

/// One `[feature, weight]` pair of a LIME explanation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureWeight(pub String, pub f64);

impl FeatureWeight {
    pub fn feature(&self) -> &str {
        &self.0
    }

    pub fn weight(&self) -> f64 {
        self.1
    }
}

/// Payload of a successful `/explain_lime`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Explanation {
    #[serde(default)]
    pub sentiment: Option<String>,
    #[serde(default)]
    pub confidence: f64,
    pub html_explanation: String,
    #[serde(default)]
    pub explanation: Vec<FeatureWeight>,
}

pub(crate) fn is_positive_label(label: &str) -> bool {
    label.to_lowercase().starts_with("pos")
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_prediction_from_server_payload() {
        let prediction: Prediction = serde_json::from_value(json!({
            "sentiment": "positive",
            "confidence": 0.91,
            "probability_positive": 0.91,
            "probability_negative": 0.09
        }))
        .unwrap();

        assert!(prediction.is_positive());
        assert!(prediction.probabilities_are_consistent());
    }

    #[test]
    fn test_negative_labels() {
        for label in ["negative", "NEG", "Négatif"] {
            assert!(!is_positive_label(label), "{label}");
        }
        assert!(is_positive_label("Positif"));
    }

    #[test]
    fn test_explanation_defaults_and_feature_pairs() {
        let explanation: Explanation = serde_json::from_value(json!({
            "html_explanation": "<div>lime</div>",
            "explanation": [["adore", 0.42], ["produit", -0.05]]
        }))
        .unwrap();

        assert_eq!(explanation.sentiment, None);
        assert_eq!(explanation.confidence, 0.0);
        assert_eq!(explanation.explanation.len(), 2);
        assert_eq!(explanation.explanation[0].feature(), "adore");
        assert_eq!(explanation.explanation[1].weight(), -0.05);
    }

    #[test]
    fn test_health_fields_are_optional() {
        let health: Health = serde_json::from_value(json!({"model_class": "LogReg"})).unwrap();
        assert_eq!(health.model_class.as_deref(), Some("LogReg"));
        assert_eq!(health.mode, None);
    }

    #[test]
    fn test_batch_request_body_shape() {
        let body = BatchRequest {
            texts: vec!["a".to_string(), "b".to_string()],
        };
        assert_eq!(serde_json::to_value(&body).unwrap(), json!({"texts": ["a", "b"]}));
    }
}
