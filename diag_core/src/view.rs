//! # View Model
//!
//! Everything a front end needs to draw the diagnosis page. Only the
//! [`Controller`](crate::state::Controller) mutates it; front ends read it
//! and map it to widgets.
//!
//! ```text
//! ViewModel
//! ├── preview:        Option<PreviewImage>     (image panel)
//! ├── loading_visible: bool                    (spinner)
//! ├── results:        ResultsRegion            (empty / diagnosis / error)
//! ├── explanation:    Option<ExplanationImage> (overlay panel)
//! └── scroll_target:  Option<ScrollTarget>     (pending scroll-into-view)
//! ```

use serde::Serialize;

use crate::errors::{DiagError, ErrorClass};
use crate::file::PreviewImage;
use crate::render::{ExplanationImage, ResultView, FAILURE_HEADING};

/// What the results region shows.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ResultsRegion {
    #[default]
    Empty,
    Prediction(ResultView),
    Failure(FailureResult),
}

/// A failure ready for display.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FailureResult {
    pub class: ErrorClass,
    /// Text shown to the user
    pub message: String,
}

impl FailureResult {
    /// Heading above the message; only errors reported by the server get one
    pub fn heading(&self) -> Option<&'static str> {
        match self.class {
            ErrorClass::Application => Some(FAILURE_HEADING),
            ErrorClass::Validation | ErrorClass::Transport | ErrorClass::Local => None,
        }
    }
}

impl From<&DiagError> for FailureResult {
    fn from(error: &DiagError) -> Self {
        FailureResult {
            class: error.class(),
            message: error.user_message(),
        }
    }
}

/// Region a front end should bring into view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ScrollTarget {
    Preview,
    Results,
}

/// Toolkit-neutral page state.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ViewModel {
    pub preview: Option<PreviewImage>,
    pub loading_visible: bool,
    pub results: ResultsRegion,
    pub explanation: Option<ExplanationImage>,
    pub scroll_target: Option<ScrollTarget>,
}

impl ViewModel {
    /// Whether the explanation overlay is shown
    pub fn explanation_visible(&self) -> bool {
        self.explanation.is_some()
    }

    /// Clear result, error and explanation
    pub(crate) fn clear_results(&mut self) {
        self.results = ResultsRegion::Empty;
        self.explanation = None;
    }

    /// Hand the pending scroll request to the front end, clearing it
    pub fn take_scroll_target(&mut self) -> Option<ScrollTarget> {
        self.scroll_target.take()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_blank() {
        let view = ViewModel::default();
        assert!(view.preview.is_none());
        assert!(!view.loading_visible);
        assert_eq!(view.results, ResultsRegion::Empty);
        assert!(!view.explanation_visible());
    }

    #[test]
    fn test_take_scroll_target_clears() {
        let mut view = ViewModel {
            scroll_target: Some(ScrollTarget::Results),
            ..ViewModel::default()
        };
        assert_eq!(view.take_scroll_target(), Some(ScrollTarget::Results));
        assert_eq!(view.take_scroll_target(), None);
    }

    #[test]
    fn test_failure_from_error_uses_user_message() {
        let failure = FailureResult::from(&DiagError::transport("dns lookup failed"));
        assert_eq!(failure.class, ErrorClass::Transport);
        assert!(!failure.message.contains("dns"));
    }

    #[test]
    fn test_only_server_errors_get_a_heading() {
        let server = FailureResult::from(&DiagError::server("model unavailable"));
        assert_eq!(server.heading(), Some(FAILURE_HEADING));
        assert_eq!(server.message, "model unavailable");

        for error in [
            DiagError::NoFileSelected,
            DiagError::transport("connection refused"),
            DiagError::invalid_response("not json"),
        ] {
            assert_eq!(FailureResult::from(&error).heading(), None, "{error:?}");
        }
    }
}
