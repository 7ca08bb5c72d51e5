//! # diag_core - Lesionscope Client Core
//!
//! `diag_core` drives the whole diagnosis flow of the Lesionscope client:
//! pick an image, preview it, send it to the ensemble classifier's
//! `POST /predict` endpoint, and turn the answer into something a UI can
//! draw. It has no UI toolkit dependency; the GUI and CLI are thin
//! bindings over [`state::Controller`] and [`view::ViewModel`].
//!
//! ## Design Philosophy
//!
//! - **One owner**: all state changes go through the controller's transitions
//! - **Headless**: the view model is plain data, so every behavior is testable
//! - **Rich Errors**: structured error types that know what the user may see
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use diag_core::file::read_selected_file;
//! use diag_core::state::Controller;
//! use diag_core::transport::HttpTransport;
//! use std::path::Path;
//!
//! # async fn run() -> diag_core::DiagResult<()> {
//! let transport = HttpTransport::new("http://127.0.0.1:5000")?;
//! let mut controller = Controller::new();
//!
//! controller.select_file(read_selected_file(Path::new("lesion.jpg")))?;
//! let state = controller.submit(&transport).await;
//! println!("{}: {:?}", state.display_name(), controller.view().results);
//! # Ok(())
//! # }
//! ```
//!
//! ## Modules
//!
//! - [`state`] - Upload state machine and controller
//! - [`transport`] - Multipart `/predict` client
//! - [`protocol`] - Response payloads and their interpretation
//! - [`render`] - Prediction to display text and styling
//! - [`view`] - Toolkit-neutral view model
//! - [`file`] - Selected files and previews
//! - [`config`] - `settings.toml` loading
//! - [`logging`] - `tracing` subscriber setup
//! - [`errors`] - Structured error types

pub mod config;
pub mod errors;
pub mod file;
pub mod logging;
pub mod protocol;
pub mod render;
pub mod state;
pub mod transport;
pub mod view;

// Re-export commonly used types at crate root for convenience
pub use errors::{DiagError, DiagResult};
pub use protocol::PredictionResult;
pub use state::{Controller, UploadState};
pub use view::ViewModel;
