//! # Upload State Machine
//!
//! [`Controller`] owns the selected file, the current [`UploadState`] and the
//! [`ViewModel`]. Every state change goes through one of its transition
//! functions, so the whole flow can be driven and checked without a UI.
//!
//! ```text
//! Idle ──select──▶ Previewing ──submit──▶ Uploading ──status=success──▶ Success
//!   │                 ▲   │                   ├──status!=success──▶ Error
//!   └──submit──▶ Error│   └──select (resets)  └──rejected/unparsable──▶ Error
//!                     └──────── select from Success | Error | Uploading
//! ```
//!
//! ## Overlapping submissions
//!
//! Each submission gets a sequence number. A completion is applied only if
//! its number is the one currently in flight; anything older is dropped
//! without touching the view. Selecting a new file also retires the request
//! in flight.
//!
//! ## Example
//!
//! ```rust
//! use diag_core::state::{Controller, UploadState};
//!
//! let mut controller = Controller::new();
//! assert!(controller.begin_submission().is_err());
//! assert_eq!(controller.state(), UploadState::Error);
//! ```

use std::ops::{Deref, DerefMut};

use serde::Serialize;

use crate::errors::{DiagError, DiagResult, ErrorClass};
use crate::file::{PreviewImage, SelectedFile};
use crate::protocol::{parse_response, PredictionResult};
use crate::render::render_prediction;
use crate::transport::PredictTransport;
use crate::view::{FailureResult, ResultsRegion, ScrollTarget, ViewModel};

/// Which phase of the upload flow is active.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum UploadState {
    #[default]
    Idle,
    Previewing,
    Uploading,
    Success,
    Error,
}

impl UploadState {
    pub fn display_name(&self) -> &'static str {
        match self {
            UploadState::Idle => "Ready",
            UploadState::Previewing => "Image selected",
            UploadState::Uploading => "Analyzing...",
            UploadState::Success => "Diagnosis complete",
            UploadState::Error => "Error",
        }
    }
}

/// Identifies one submission.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Ticket(u64);

/// A request the front end should send.
#[derive(Debug, Clone)]
pub struct Submission {
    pub ticket: Ticket,
    pub file: SelectedFile,
}

/// What happened to a completion handed to [`Controller::finish_submission`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Completion {
    Applied,
    /// Superseded by a newer submission or file selection; ignored
    Stale,
}

/// Hides the loading indicator and requests scrolling to the results when
/// dropped, however the enclosing scope is left.
pub(crate) struct ReleaseGuard<'a> {
    view: &'a mut ViewModel,
}

impl<'a> ReleaseGuard<'a> {
    pub(crate) fn new(view: &'a mut ViewModel) -> Self {
        ReleaseGuard { view }
    }
}

impl Deref for ReleaseGuard<'_> {
    type Target = ViewModel;

    fn deref(&self) -> &ViewModel {
        self.view
    }
}

impl DerefMut for ReleaseGuard<'_> {
    fn deref_mut(&mut self) -> &mut ViewModel {
        self.view
    }
}

impl Drop for ReleaseGuard<'_> {
    fn drop(&mut self) {
        self.view.loading_visible = false;
        self.view.scroll_target = Some(ScrollTarget::Results);
    }
}

/// Single owner of the upload flow.
#[derive(Debug, Default)]
pub struct Controller {
    state: UploadState,
    selected: Option<SelectedFile>,
    prediction: Option<PredictionResult>,
    view: ViewModel,
    last_seq: u64,
    in_flight: Option<u64>,
}

impl Controller {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> UploadState {
        self.state
    }

    pub fn view(&self) -> &ViewModel {
        &self.view
    }

    pub fn selected_file(&self) -> Option<&SelectedFile> {
        self.selected.as_ref()
    }

    /// The current prediction; `Some` only in [`UploadState::Success`]
    pub fn prediction(&self) -> Option<&PredictionResult> {
        self.prediction.as_ref()
    }

    /// The current failure; `Some` only in [`UploadState::Error`]
    pub fn failure(&self) -> Option<&FailureResult> {
        match &self.view.results {
            ResultsRegion::Failure(failure) => Some(failure),
            _ => None,
        }
    }

    /// Whether a submission is awaiting its completion
    pub fn is_in_flight(&self) -> bool {
        self.in_flight.is_some()
    }

    /// Hand the pending scroll request to the front end
    pub fn take_scroll_target(&mut self) -> Option<ScrollTarget> {
        self.view.take_scroll_target()
    }

    /// Apply a file selection.
    ///
    /// `read` is the outcome of reading the picked file. On success the
    /// preview is replaced and any previous result, error or explanation is
    /// cleared. If reading or decoding fails nothing changes: the previous
    /// preview and selection stay in place and the error is returned.
    pub fn select_file(&mut self, read: DiagResult<SelectedFile>) -> DiagResult<()> {
        let decoded = read.and_then(|file| PreviewImage::decode(&file).map(|preview| (file, preview)));
        let (file, preview) = match decoded {
            Ok(pair) => pair,
            Err(error) => {
                tracing::warn!(error = %error, "file selection ignored; keeping previous preview");
                return Err(error);
            }
        };

        tracing::debug!(file = %file.name, width = preview.width, height = preview.height, "file selected");

        if let Some(seq) = self.in_flight.take() {
            tracing::debug!(seq, "new selection retires submission in flight");
        }

        self.selected = Some(file);
        self.prediction = None;
        self.view.preview = Some(preview);
        self.view.loading_visible = false;
        self.view.clear_results();
        self.view.scroll_target = Some(ScrollTarget::Preview);
        transition(&mut self.state, UploadState::Previewing);
        Ok(())
    }

    /// Start a submission.
    ///
    /// With no file selected this moves to [`UploadState::Error`] with the
    /// validation message and returns `Err(DiagError::NoFileSelected)`; no
    /// request must be sent. Otherwise the loading indicator is shown, the
    /// results are cleared and the returned [`Submission`] should be sent.
    pub fn begin_submission(&mut self) -> DiagResult<Submission> {
        let Some(file) = self.selected.clone() else {
            let error = DiagError::NoFileSelected;
            tracing::debug!("submit without a selected file");
            self.prediction = None;
            self.view.clear_results();
            self.view.results = ResultsRegion::Failure(FailureResult::from(&error));
            transition(&mut self.state, UploadState::Error);
            return Err(error);
        };

        self.last_seq += 1;
        let seq = self.last_seq;
        if let Some(previous) = self.in_flight.replace(seq) {
            tracing::debug!(previous, seq, "submission superseded while in flight");
        }

        self.prediction = None;
        self.view.loading_visible = true;
        self.view.clear_results();
        transition(&mut self.state, UploadState::Uploading);

        Ok(Submission {
            ticket: Ticket(seq),
            file,
        })
    }

    /// Apply the outcome of a submission.
    ///
    /// `outcome` is the raw response body, or the error the transport
    /// failed with. Stale tickets are ignored. For the current ticket the
    /// loading indicator is hidden and the results are brought into view on
    /// every path out of this function.
    pub fn finish_submission(&mut self, ticket: Ticket, outcome: DiagResult<Vec<u8>>) -> Completion {
        if self.in_flight != Some(ticket.0) {
            tracing::debug!(seq = ticket.0, current = ?self.in_flight, "discarding stale completion");
            return Completion::Stale;
        }
        self.in_flight = None;

        let mut view = ReleaseGuard::new(&mut self.view);

        match outcome.and_then(|body| parse_response(&body)) {
            Ok(result) => {
                let rendered = render_prediction(&result);
                tracing::info!(
                    diagnosis = %result.final_diagnosis,
                    confidence = result.ensemble_confidence,
                    explanation = rendered.explanation.is_some(),
                    "prediction received"
                );
                view.explanation = rendered.explanation.clone();
                view.results = ResultsRegion::Prediction(rendered);
                self.prediction = Some(result);
                transition(&mut self.state, UploadState::Success);
            }
            Err(error) => {
                match error.class() {
                    ErrorClass::Transport => {
                        tracing::error!(error = %error, "prediction request failed")
                    }
                    _ => tracing::warn!(error = %error, "server reported a prediction error"),
                }
                view.explanation = None;
                view.results = ResultsRegion::Failure(FailureResult::from(&error));
                transition(&mut self.state, UploadState::Error);
            }
        }

        Completion::Applied
    }

    /// Run one whole submission against `transport`.
    ///
    /// Convenience for sequential callers; returns the state afterwards.
    pub async fn submit<T: PredictTransport>(&mut self, transport: &T) -> UploadState {
        let Ok(submission) = self.begin_submission() else {
            return self.state;
        };
        let outcome = transport.predict(submission.file).await;
        self.finish_submission(submission.ticket, outcome);
        self.state
    }
}

fn transition(state: &mut UploadState, to: UploadState) {
    tracing::debug!(from = ?*state, to = ?to, "upload state transition");
    *state = to;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::{NETWORK_ERROR_MESSAGE, NO_FILE_MESSAGE};
    use crate::file::tests::tiny_png;
    use crate::render::DiagnosisStyle;
    use crate::transport::testing::ScriptedTransport;

    fn png_file(name: &str) -> DiagResult<SelectedFile> {
        Ok(SelectedFile::from_bytes(name, tiny_png()))
    }

    fn success_body(diagnosis: &str, lime: bool) -> Vec<u8> {
        let mut body = serde_json::json!({
            "status": "success",
            "final_diagnosis": diagnosis,
            "confidence_scores": {
                "EfficientNetV2S": 0.93121,
                "DenseNet121": 0.88,
                "InceptionV3": 0.81234
            },
            "ensemble_confidence": 0.8734
        });
        if lime {
            body["lime_image_b64"] = serde_json::json!("iVBORw0KGgo=");
        }
        serde_json::to_vec(&body).unwrap()
    }

    fn previewing() -> Controller {
        let mut controller = Controller::new();
        controller.select_file(png_file("lesion.png")).unwrap();
        controller
    }

    #[test]
    fn test_initial_state() {
        let controller = Controller::new();
        assert_eq!(controller.state(), UploadState::Idle);
        assert!(controller.selected_file().is_none());
        assert_eq!(controller.view(), &ViewModel::default());
    }

    #[test]
    fn test_select_file_previews() {
        let mut controller = previewing();
        assert_eq!(controller.state(), UploadState::Previewing);
        assert_eq!(controller.view().preview.as_ref().unwrap().file_name, "lesion.png");
        assert_eq!(controller.take_scroll_target(), Some(ScrollTarget::Preview));
    }

    #[test]
    fn test_failed_read_keeps_previous_preview() {
        let mut controller = previewing();
        let before = controller.view().clone();

        let err = controller
            .select_file(Err(DiagError::file_read("/tmp/gone.png", "not found")))
            .unwrap_err();
        assert_eq!(err.error_code(), "FILE_READ");

        let corrupt = SelectedFile::from_bytes("corrupt.png", b"\x89PNG but not really".to_vec());
        assert!(controller.select_file(Ok(corrupt)).is_err());

        assert_eq!(controller.state(), UploadState::Previewing);
        assert_eq!(controller.view(), &before);
        assert_eq!(controller.selected_file().unwrap().name, "lesion.png");
    }

    #[tokio::test]
    async fn test_submit_without_file_never_sends() {
        let transport = ScriptedTransport::replying(vec![Ok(success_body("Monkeypox", true))]);
        let mut controller = Controller::new();

        let state = controller.submit(&transport).await;

        assert_eq!(state, UploadState::Error);
        assert_eq!(transport.calls(), 0);
        let failure = controller.failure().unwrap();
        assert_eq!(failure.message, NO_FILE_MESSAGE);
        assert_eq!(failure.class, ErrorClass::Validation);
        assert!(!controller.view().loading_visible);
    }

    #[test]
    fn test_begin_shows_loading_and_clears_results() {
        let mut controller = previewing();
        let submission = controller.begin_submission().unwrap();
        assert_eq!(submission.file.name, "lesion.png");
        assert_eq!(controller.state(), UploadState::Uploading);
        assert!(controller.view().loading_visible);
        assert_eq!(controller.view().results, ResultsRegion::Empty);
        assert!(!controller.view().explanation_visible());
    }

    #[tokio::test]
    async fn test_success_positive() {
        let transport = ScriptedTransport::replying(vec![Ok(success_body("Monkeypox", true))]);
        let mut controller = previewing();

        assert_eq!(controller.submit(&transport).await, UploadState::Success);
        assert_eq!(transport.calls(), 1);

        let view = controller.view();
        assert!(!view.loading_visible);
        assert_eq!(view.scroll_target, Some(ScrollTarget::Results));
        let ResultsRegion::Prediction(rendered) = &view.results else {
            panic!("expected prediction, got {:?}", view.results);
        };
        assert_eq!(rendered.style, DiagnosisStyle::Positive);
        assert_eq!(rendered.confidence_percent, "87.34");
        assert_eq!(rendered.scores[0].value, "0.9312");
        assert_eq!(rendered.scores[2].value, "0.8123");
        assert!(view.explanation_visible());
        assert!(controller.prediction().is_some());
        assert!(controller.failure().is_none());
    }

    #[tokio::test]
    async fn test_success_negative_without_explanation() {
        let transport = ScriptedTransport::replying(vec![Ok(success_body("Normal", false))]);
        let mut controller = previewing();

        assert_eq!(controller.submit(&transport).await, UploadState::Success);
        let ResultsRegion::Prediction(rendered) = &controller.view().results else {
            panic!("expected prediction");
        };
        assert_eq!(rendered.style, DiagnosisStyle::Negative);
        assert!(!controller.view().explanation_visible());
    }

    #[tokio::test]
    async fn test_server_error_is_verbatim() {
        let body = br#"{"status": "error", "error": "model unavailable"}"#.to_vec();
        let transport = ScriptedTransport::replying(vec![Ok(body)]);
        let mut controller = previewing();

        assert_eq!(controller.submit(&transport).await, UploadState::Error);
        let failure = controller.failure().unwrap();
        assert_eq!(failure.message, "model unavailable");
        assert_eq!(failure.class, ErrorClass::Application);
        assert!(!controller.view().explanation_visible());
        assert!(!controller.view().loading_visible);
        assert!(controller.prediction().is_none());
    }

    #[tokio::test]
    async fn test_transport_failures_share_generic_message() {
        let transport = ScriptedTransport::replying(vec![
            Err(DiagError::transport("connection refused")),
            Err(DiagError::transport("certificate has expired")),
            Ok(b"<html>Bad Gateway</html>".to_vec()),
        ]);
        let mut controller = previewing();

        for _ in 0..3 {
            assert_eq!(controller.submit(&transport).await, UploadState::Error);
            let failure = controller.failure().unwrap();
            assert_eq!(failure.message, NETWORK_ERROR_MESSAGE);
            assert_eq!(failure.class, ErrorClass::Transport);
            assert!(!controller.view().loading_visible);
        }
        assert_eq!(transport.calls(), 3);
    }

    #[tokio::test]
    async fn test_new_selection_clears_previous_result() {
        let transport = ScriptedTransport::replying(vec![Ok(success_body("Monkeypox", true))]);
        let mut controller = previewing();
        controller.submit(&transport).await;
        assert!(controller.view().explanation_visible());

        controller.select_file(png_file("second.png")).unwrap();

        assert_eq!(controller.state(), UploadState::Previewing);
        assert_eq!(controller.view().results, ResultsRegion::Empty);
        assert!(!controller.view().explanation_visible());
        assert!(controller.prediction().is_none());
        assert_eq!(controller.selected_file().unwrap().name, "second.png");
    }

    #[test]
    fn test_new_selection_clears_error() {
        let mut controller = Controller::new();
        assert!(controller.begin_submission().is_err());
        assert!(controller.failure().is_some());

        controller.select_file(png_file("lesion.png")).unwrap();
        assert!(controller.failure().is_none());
        assert_eq!(controller.state(), UploadState::Previewing);
    }

    #[test]
    fn test_stale_completion_is_discarded() {
        let mut controller = previewing();
        let first = controller.begin_submission().unwrap();
        let second = controller.begin_submission().unwrap();
        assert_ne!(first.ticket, second.ticket);

        // Second resolves first, then the older one arrives late
        let applied = controller.finish_submission(second.ticket, Ok(success_body("Normal", false)));
        assert_eq!(applied, Completion::Applied);
        let late = controller.finish_submission(
            first.ticket,
            Ok(br#"{"status": "error", "error": "late"}"#.to_vec()),
        );
        assert_eq!(late, Completion::Stale);

        assert_eq!(controller.state(), UploadState::Success);
        assert!(controller.failure().is_none());
    }

    #[test]
    fn test_older_completion_does_not_hide_loading() {
        let mut controller = previewing();
        let first = controller.begin_submission().unwrap();
        let _second = controller.begin_submission().unwrap();

        let outcome = controller.finish_submission(first.ticket, Ok(success_body("Monkeypox", true)));
        assert_eq!(outcome, Completion::Stale);
        assert_eq!(controller.state(), UploadState::Uploading);
        assert!(controller.view().loading_visible);
        assert!(controller.is_in_flight());
    }

    #[test]
    fn test_selection_retires_in_flight_request() {
        let mut controller = previewing();
        let submission = controller.begin_submission().unwrap();

        controller.select_file(png_file("other.png")).unwrap();
        assert!(!controller.view().loading_visible);
        assert!(!controller.is_in_flight());

        let outcome = controller.finish_submission(submission.ticket, Ok(success_body("Monkeypox", true)));
        assert_eq!(outcome, Completion::Stale);
        assert_eq!(controller.state(), UploadState::Previewing);
        assert_eq!(controller.view().results, ResultsRegion::Empty);
    }

    #[test]
    fn test_release_guard_runs_on_panic() {
        let mut view = ViewModel {
            loading_visible: true,
            ..ViewModel::default()
        };

        let outcome = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
            let mut guard = ReleaseGuard::new(&mut view);
            guard.results = ResultsRegion::Empty;
            panic!("renderer blew up");
        }));

        assert!(outcome.is_err());
        assert!(!view.loading_visible);
        assert_eq!(view.scroll_target, Some(ScrollTarget::Results));
    }

    #[test]
    fn test_state_reentrant() {
        let mut controller = previewing();
        for _ in 0..3 {
            let submission = controller.begin_submission().unwrap();
            controller.finish_submission(submission.ticket, Err(DiagError::transport("down")));
            assert_eq!(controller.state(), UploadState::Error);
            controller.select_file(png_file("again.png")).unwrap();
            assert_eq!(controller.state(), UploadState::Previewing);
        }
    }
}
