//! Toolbar component
//!
//! Contains the two user actions: choosing an image and submitting it.

use iced::widget::{button, row, text, Space};
use iced::{Alignment, Element, Length, Padding};

use diag_core::state::UploadState;

use crate::Message;

/// Render the application header
pub fn view_header() -> Element<'static, Message> {
    row![
        text("Lesionscope").size(28),
        Space::new().width(Length::Fill),
        text("Ensemble skin lesion screening").size(14),
    ]
    .align_y(Alignment::Center)
    .into()
}

/// Render the toolbar.
///
/// Diagnose stays enabled while a request is in flight; a second press
/// supersedes the first.
pub fn view_toolbar(state: UploadState) -> Element<'static, Message> {
    let diagnose_label = if state == UploadState::Uploading { "Diagnose again" } else { "Diagnose" };

    row![
        button(text("Choose Image").size(12))
            .on_press(Message::ChooseImage)
            .padding(Padding::from([6, 12]))
            .style(button::secondary),
        button(text(diagnose_label).size(12))
            .on_press(Message::Diagnose)
            .padding(Padding::from([6, 12]))
            .style(button::primary),
    ]
    .spacing(6)
    .padding(Padding::from([4, 0]))
    .align_y(Alignment::Center)
    .into()
}
