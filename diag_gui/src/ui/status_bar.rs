//! Status Bar (Bottom)
//!
//! Displays:
//! - Upload state
//! - Selection notices (unreadable or unsupported files)
//! - Endpoint in use

use iced::widget::{row, text, Space};
use iced::{Element, Length, Padding};

use diag_core::state::UploadState;

use crate::Message;

/// Render the status bar
pub fn view_status_bar<'a>(
    state: UploadState,
    endpoint: &'a str,
    notice: Option<&'a str>,
) -> Element<'a, Message> {
    let notice_text = notice.map(|n| format!("  {}", n)).unwrap_or_default();

    row![
        text(state.display_name()).size(10),
        text(notice_text).size(10).color([0.6, 0.3, 0.0]),
        Space::new().width(Length::Fill),
        text(endpoint).size(10),
    ]
    .padding(Padding::from([4, 0]))
    .into()
}
