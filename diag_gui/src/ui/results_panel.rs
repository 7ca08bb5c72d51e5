//! Results Panel
//!
//! Dispatches on the view model's results region:
//! - Loading -> progress text
//! - Prediction -> result_diagnosis (heading, scores, explanation)
//! - Failure -> error display (heading only for server-reported errors)
//! - Empty -> nothing

use iced::widget::{container, image, text, Column, Space};
use iced::{Element, Length};

use diag_core::view::{ResultsRegion, ViewModel};

use super::result_diagnosis;
use crate::Message;

/// Render the results panel for the current view model
pub fn view_results_panel<'a>(
    model: &'a ViewModel,
    explanation: Option<&image::Handle>,
) -> Element<'a, Message> {
    let mut content: Column<'a, Message> = Column::new().spacing(6);

    if model.loading_visible {
        content = content.push(text("Analyzing image...").size(14).color([0.3, 0.4, 0.7]));
    }

    content = match &model.results {
        ResultsRegion::Empty => content,
        ResultsRegion::Prediction(view) => content.push(result_diagnosis::view(view, explanation)),
        ResultsRegion::Failure(failure) => {
            let mut error = Column::new();
            if let Some(heading) = failure.heading() {
                error = error.push(text(heading).size(14)).push(Space::new().height(8));
            }
            content.push(error.push(text(failure.message.as_str()).size(12).color([0.8, 0.2, 0.2])))
        }
    };

    container(content)
        .width(Length::Fill)
        .padding(8)
        .into()
}
