//! UI module for the Lesionscope GUI
//!
//! The page is a single scrollable column:
//!
//! # Panel Structure
//! - `toolbar` - Header and the Choose Image / Diagnose buttons
//! - `preview_panel` - The selected image
//! - `results_panel` - Loading indicator, then diagnosis or error
//! - `status_bar` - Upload state, endpoint, selection notices
//!
//! # Results Panel Children
//! - `result_diagnosis` - Heading, per-model scores, explanation overlay

pub mod toolbar;
pub mod preview_panel;
pub mod results_panel;
pub mod status_bar;

pub mod result_diagnosis;
