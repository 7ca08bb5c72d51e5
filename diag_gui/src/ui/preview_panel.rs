//! Preview Panel
//!
//! Shows the selected image, or a hint before anything is selected.

use iced::widget::{column, container, image, text, Space};
use iced::{Element, Length};

use diag_core::view::ViewModel;

use crate::Message;

const PREVIEW_HEIGHT: f32 = 320.0;

/// Render the preview panel
pub fn view<'a>(model: &'a ViewModel, handle: Option<&image::Handle>) -> Element<'a, Message> {
    let content = match (&model.preview, handle) {
        (Some(preview), Some(handle)) => column![
            image(handle.clone())
                .width(Length::Fill)
                .height(Length::Fixed(PREVIEW_HEIGHT)),
            Space::new().height(4),
            text(format!("{} ({}x{})", preview.file_name, preview.width, preview.height)).size(11),
        ],
        _ => column![text("Choose an image of the affected skin area to begin.").size(12)],
    };

    container(content)
        .width(Length::Fill)
        .padding(8)
        .style(container::bordered_box)
        .into()
}
