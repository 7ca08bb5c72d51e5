//! # Result Rendering
//!
//! Turns a [`PredictionResult`] into display-ready text and styling. The
//! output is toolkit-neutral: front ends map [`DiagnosisStyle`] to their own
//! colors and lay out the lines as they see fit.
//!
//! ## Example
//!
//! ```rust
//! use diag_core::protocol::{ConfidenceScores, PredictionResult};
//! use diag_core::render::{render_prediction, DiagnosisStyle};
//!
//! let result = PredictionResult {
//!     confidence_scores: ConfidenceScores {
//!         efficientnet_v2s: 0.9,
//!         densenet121: 0.85,
//!         inception_v3: 0.88,
//!     },
//!     final_diagnosis: "Monkeypox".to_string(),
//!     ensemble_confidence: 0.8734,
//!     explanation_image: None,
//! };
//!
//! let view = render_prediction(&result);
//! assert_eq!(view.style, DiagnosisStyle::Positive);
//! assert_eq!(view.confidence_percent, "87.34");
//! assert!(view.explanation.is_none());
//! ```

use base64::Engine;
use serde::Serialize;

use crate::protocol::{ModelId, PredictionResult};

pub const POSITIVE_HEADING: &str = "Diagnosis: Monkeypox Detected";
pub const NEGATIVE_HEADING: &str = "Diagnosis: Normal Skin Condition";
pub const THRESHOLD_NOTE: &str = "Threshold: 0.5 - Above means Monkeypox, below means Normal";
pub const SCORES_TITLE: &str = "Individual Model Contributions (Confidence in Monkeypox)";
pub const FAILURE_HEADING: &str = "Prediction Error";

/// Two-way heading style keyed on the diagnosis label.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DiagnosisStyle {
    /// Warning styling (red)
    Positive,
    /// All-clear styling (green)
    Negative,
}

impl DiagnosisStyle {
    /// RGB color in 0..1 components
    pub fn rgb(&self) -> [f32; 3] {
        match self {
            DiagnosisStyle::Positive => [0.8, 0.2, 0.2],
            DiagnosisStyle::Negative => [0.2, 0.6, 0.2],
        }
    }
}

/// One per-model score line.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScoreLine {
    pub model: ModelId,
    /// e.g. `EfficientNetV2-S (0.2x)`
    pub label: String,
    /// Exactly four decimals
    pub value: String,
}

/// The explanation overlay, ready to display.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExplanationImage {
    /// `data:image/png;base64,...`
    pub data_uri: String,
    #[serde(skip)]
    pub png_bytes: Vec<u8>,
}

impl ExplanationImage {
    /// Build from a base64 payload without prefix.
    ///
    /// Returns `None` for an empty or undecodable payload.
    pub fn from_base64(payload: &str) -> Option<Self> {
        if payload.is_empty() {
            return None;
        }
        match base64::engine::general_purpose::STANDARD.decode(payload) {
            Ok(png_bytes) => Some(ExplanationImage {
                data_uri: format!("data:image/png;base64,{}", payload),
                png_bytes,
            }),
            Err(e) => {
                tracing::warn!(error = %e, "explanation image is not valid base64; hiding it");
                None
            }
        }
    }
}

/// Rendered success view.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResultView {
    pub heading: &'static str,
    pub style: DiagnosisStyle,
    pub threshold_note: &'static str,
    pub scores_title: &'static str,
    pub scores: Vec<ScoreLine>,
    /// Percentage with two decimals, no `%` sign
    pub confidence_percent: String,
    pub explanation: Option<ExplanationImage>,
}

/// Render a successful prediction.
pub fn render_prediction(result: &PredictionResult) -> ResultView {
    let style = if result.is_positive() {
        DiagnosisStyle::Positive
    } else {
        DiagnosisStyle::Negative
    };
    let heading = match style {
        DiagnosisStyle::Positive => POSITIVE_HEADING,
        DiagnosisStyle::Negative => NEGATIVE_HEADING,
    };

    let scores = result
        .confidence_scores
        .iter()
        .map(|(model, score)| ScoreLine {
            model,
            label: format!("{} ({}x)", model.display_name(), model.ensemble_weight()),
            value: format_score(score),
        })
        .collect();

    ResultView {
        heading,
        style,
        threshold_note: THRESHOLD_NOTE,
        scores_title: SCORES_TITLE,
        scores,
        confidence_percent: format_percent(result.ensemble_confidence),
        explanation: result
            .explanation_image
            .as_deref()
            .and_then(ExplanationImage::from_base64),
    }
}

/// Enough fractional digits to print any `f64` exactly
const EXACT_DIGITS: usize = 1074;

/// Fixed-point text with the server page's rounding.
///
/// Rounds the exact binary value of `value` to `digits` places; a tie goes
/// away from zero. `format!("{:.N}")` would round ties to even instead, so
/// `0.03125` would show as `0.0312` here rather than `0.0313`.
///
/// ```rust
/// use diag_core::render::to_fixed;
///
/// assert_eq!(to_fixed(0.03125, 4), "0.0313");
/// assert_eq!(to_fixed(1.005, 2), "1.00"); // 1.00499999...
/// ```
pub fn to_fixed(value: f64, digits: usize) -> String {
    if value.is_nan() {
        return "NaN".to_string();
    }
    if value.is_infinite() {
        return if value > 0.0 { "Infinity" } else { "-Infinity" }.to_string();
    }

    let exact = format!("{:.*}", EXACT_DIGITS, value.abs());
    let (whole, fraction) = exact.split_once('.').unwrap_or((exact.as_str(), ""));

    let mut kept: Vec<u8> = whole
        .bytes()
        .chain(fraction.bytes().chain(std::iter::repeat(b'0')).take(digits))
        .map(|b| b - b'0')
        .collect();

    if fraction.as_bytes().get(digits).is_some_and(|&next| next >= b'5') {
        let mut carry = true;
        for d in kept.iter_mut().rev() {
            if *d == 9 {
                *d = 0;
            } else {
                *d += 1;
                carry = false;
                break;
            }
        }
        if carry {
            kept.insert(0, 1);
        }
    }

    let split = kept.len() - digits;
    let mut out = String::with_capacity(kept.len() + 2);
    // -0.0 prints unsigned
    if value < 0.0 {
        out.push('-');
    }
    out.extend(kept[..split].iter().map(|&d| char::from(b'0' + d)));
    if digits > 0 {
        out.push('.');
        out.extend(kept[split..].iter().map(|&d| char::from(b'0' + d)));
    }
    out
}

/// Score with exactly four decimal places
pub fn format_score(score: f64) -> String {
    to_fixed(score, 4)
}

/// Probability as a percentage with two decimal places
pub fn format_percent(probability: f64) -> String {
    to_fixed(probability * 100.0, 2)
}

/// Plain-text rendering for terminals and logs
pub fn to_plain_text(view: &ResultView) -> String {
    let mut out = String::new();
    out.push_str(view.heading);
    out.push('\n');
    out.push_str(&format!("Ensemble confidence: {}%\n", view.confidence_percent));
    out.push_str(view.threshold_note);
    out.push_str("\n\n");
    out.push_str(view.scores_title);
    out.push('\n');
    for line in &view.scores {
        out.push_str(&format!("  {}: {}\n", line.label, line.value));
    }
    out
}
