//! Results view for an ensemble diagnosis
//!
//! Shows:
//! - Diagnosis heading, colored by outcome
//! - Ensemble confidence and the 0.5 threshold note
//! - Per-model scores with their ensemble weights
//! - Explanation overlay, when the server sent one

use iced::widget::{column, container, image, row, text, Column, Space};
use iced::{Length, Padding};

use diag_core::render::ResultView;

use crate::Message;

const EXPLANATION_HEIGHT: f32 = 320.0;

/// Render a successful diagnosis
pub fn view<'a>(result: &'a ResultView, explanation: Option<&image::Handle>) -> Column<'a, Message> {
    let scores = result.scores.iter().fold(Column::new().spacing(2), |col, line| {
        col.push(row![
            text(line.label.as_str()).size(11).width(Length::Fixed(180.0)),
            text(line.value.as_str()).size(11),
        ])
    });

    let mut content = column![
        text(result.heading).size(20).color(result.style.rgb()),
        text(format!("Ensemble confidence: {}%", result.confidence_percent)).size(12),
        text(result.threshold_note).size(11),
        Space::new().height(12),
        container(column![
            text(result.scores_title).size(12),
            Space::new().height(6),
            scores,
        ])
        .padding(Padding::from([8, 10]))
        .style(container::bordered_box),
    ]
    .spacing(4);

    if let (Some(_), Some(handle)) = (&result.explanation, explanation) {
        content = content
            .push(Space::new().height(12))
            .push(text("Explanation (highlighted regions drove the prediction)").size(12))
            .push(
                image(handle.clone())
                    .width(Length::Fill)
                    .height(Length::Fixed(EXPLANATION_HEIGHT)),
            );
    }

    content
}
