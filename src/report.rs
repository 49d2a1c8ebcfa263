//! Plain-text rendering of API results for the terminal front-end.

use crate::{
    models::{Explanation, Health, Prediction},
    validation::{CharBudget, MAX_CHARS},
    Error, Outcome,
};
use std::time::Duration;

/// Sample inputs offered by `sentiment samples`.
pub const SAMPLE_TEXTS: [&str; 4] = [
    "J'adore ce produit, il est fantastique !",
    "Service déplorable, je suis très déçu.",
    "Ce film est excellent, un vrai coup de cœur ❤️",
    "C'est une perte de temps. Horrible expérience.",
];

/// Longest body excerpt shown in error messages.
pub const SNIPPET_CHARS: usize = 200;

const BAR_WIDTH: usize = 40;

pub fn render_health(health: &Health) -> String {
    format!(
        "OK - {} (mode: {})\nVectorizer: {}\n",
        health.model_class.as_deref().unwrap_or("unknown"),
        health.mode.as_deref().unwrap_or("unknown"),
        health.vectorizer_class.as_deref().unwrap_or("unknown"),
    )
}

/// `"n / 280"` followed by a hint when the text is close to or over the limit.
pub fn render_char_counter(text: &str) -> String {
    let n = text.chars().count();
    match CharBudget::for_text(text) {
        CharBudget::Comfortable => format!("{} / {}", n, MAX_CHARS),
        CharBudget::NearLimit => format!("{} / {} (near limit)", n, MAX_CHARS),
        CharBudget::OverLimit => format!("{} / {} (over limit)", n, MAX_CHARS),
    }
}

pub fn render_prediction(prediction: &Prediction, elapsed: Duration) -> String {
    let mut out = String::new();
    let label = if prediction.is_positive() {
        "POSITIVE"
    } else {
        "NEGATIVE"
    };
    out.push_str(&format!(
        "{} ({:.1}%)\n",
        label,
        prediction.confidence * 100.0
    ));
    out.push_str(&format!(
        "p(positive): {:.2}  p(negative): {:.2}\n",
        prediction.probability_positive, prediction.probability_negative
    ));
    out.push_str(&format!("Duration: {:.2}s\n", elapsed.as_secs_f64()));
    out.push('\n');
    out.push_str(&render_probability_chart(
        prediction.probability_negative,
        prediction.probability_positive,
    ));
    out
}

/// Two horizontal bars on a fixed [0, 1] scale.
pub fn render_probability_chart(p_negative: f64, p_positive: f64) -> String {
    let mut out = String::from("Probabilities\n");
    for (label, p) in [("negative", p_negative), ("positive", p_positive)] {
        out.push_str(&format!(
            "{:>8} |{:<width$}| {:.2}\n",
            label,
            bar(p),
            p,
            width = BAR_WIDTH
        ));
    }
    out
}

fn bar(p: f64) -> String {
    let filled = (p.clamp(0.0, 1.0) * BAR_WIDTH as f64).round() as usize;
    "#".repeat(filled)
}

pub fn render_explanation(explanation: &Explanation) -> String {
    let mut out = String::from("Explanation (LIME)\n");
    let sentiment = explanation.sentiment.as_deref().unwrap_or("unknown");
    out.push_str(&format!("Sentiment: {}\n", sentiment));
    out.push_str(&format!(
        "Confidence: {:.1}%\n",
        explanation.confidence * 100.0
    ));

    if explanation.explanation.is_empty() {
        out.push_str("Features: none\n");
    } else {
        out.push_str("Features:\n");
        for feature in &explanation.explanation {
            out.push_str(&format!(
                "  {:>+8.4}  {}\n",
                feature.weight(),
                feature.feature()
            ));
        }
    }
    out
}

/// Message for a non-success outcome; `None` for [`Outcome::Success`].
pub fn render_failure<T>(operation: &str, outcome: &Outcome<T>) -> Option<String> {
    match outcome {
        Outcome::Success(_) => None,
        Outcome::InvalidInput { .. } => Some(format!(
            "Invalid input (422). Check the length (max {} characters) and the content.",
            MAX_CHARS
        )),
        Outcome::Unavailable { .. } => Some(
            "LIME is not installed on the API server (501). Add `lime` to the server requirements."
                .to_string(),
        ),
        Outcome::Failed { status, detail } => Some(format!(
            "API error ({}): {} - {}",
            operation,
            status.as_u16(),
            snippet(detail, SNIPPET_CHARS)
        )),
    }
}

pub fn render_error(operation: &str, error: &Error) -> String {
    if error.is_communication() {
        format!("Communication error ({}): {}", operation, error)
    } else {
        match error.raw_response() {
            Some(body) => format!(
                "API error ({}): {} - {}",
                operation,
                error,
                snippet(body, SNIPPET_CHARS)
            ),
            None => format!("API error ({}): {}", operation, error),
        }
    }
}

/// The first `max` characters of `text`, with an ellipsis when cut.
pub fn snippet(text: &str, max: usize) -> String {
    let mut chars = text.chars();
    let head: String = chars.by_ref().take(max).collect();
    if chars.next().is_some() {
        format!("{}...", head)
    } else {
        head
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::FeatureWeight;
    use http::StatusCode;

    fn round_trip_prediction() -> Prediction {
        Prediction {
            sentiment: "positive".to_string(),
            confidence: 0.91,
            probability_positive: 0.91,
            probability_negative: 0.09,
        }
    }

    #[test]
    fn test_render_prediction() {
        let prediction = round_trip_prediction();
        let text = render_prediction(&prediction, Duration::from_millis(120));

        assert!(text.starts_with("POSITIVE (91.0%)"));
        assert!(text.contains("p(positive): 0.91  p(negative): 0.09"));
        assert!(text.contains("Duration: 0.12s"));
        assert!(
            (prediction.probability_positive + prediction.probability_negative - 1.0).abs() < 1e-9
        );
    }

    #[test]
    fn test_chart_bar_lengths() {
        let chart = render_probability_chart(0.25, 0.75);
        let lines: Vec<&str> = chart.lines().collect();
        assert_eq!(lines.len(), 3);
        assert_eq!(lines[1].matches('#').count(), 10);
        assert_eq!(lines[2].matches('#').count(), 30);
    }

    #[test]
    fn test_render_explanation() {
        let explanation = Explanation {
            sentiment: Some("negative".to_string()),
            confidence: 0.8,
            html_explanation: "<div/>".to_string(),
            explanation: vec![FeatureWeight("déçu".to_string(), -0.31)],
        };
        let text = render_explanation(&explanation);
        assert!(text.contains("Sentiment: negative"));
        assert!(text.contains("Confidence: 80.0%"));
        assert!(text.contains("-0.3100  déçu"));
    }

    #[test]
    fn test_render_failures() {
        let ok: Outcome<()> = Outcome::Success(());
        assert_eq!(render_failure("predict", &ok), None);

        let invalid: Outcome<()> = Outcome::InvalidInput {
            detail: String::new(),
        };
        assert!(render_failure("predict", &invalid).unwrap().contains("422"));

        let unavailable: Outcome<()> = Outcome::Unavailable {
            detail: String::new(),
        };
        assert!(render_failure("LIME", &unavailable).unwrap().contains("501"));

        let failed: Outcome<()> = Outcome::Failed {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            detail: "x".repeat(500),
        };
        let message = render_failure("predict", &failed).unwrap();
        assert!(message.starts_with("API error (predict): 500 - "));
        assert!(message.ends_with("..."));
    }

    #[test]
    fn test_render_communication_error() {
        let error = Error::Communication {
            attempts: 3,
            last_error: Box::new(Error::Timeout {
                timeout: Duration::from_secs(10),
            }),
            earlier_failures: Vec::new(),
        };
        assert!(render_error("health", &error).starts_with("Communication error (health)"));
    }

    #[test]
    fn test_char_counter_and_snippet() {
        assert_eq!(render_char_counter("abc"), "3 / 280");
        assert!(render_char_counter(&"a".repeat(250)).ends_with("(near limit)"));
        assert!(render_char_counter(&"a".repeat(300)).ends_with("(over limit)"));
        assert_eq!(snippet("héllo", 10), "héllo");
        assert_eq!(snippet("héllo", 2), "hé...");
    }
}
