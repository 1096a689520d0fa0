use iced::alignment::{Horizontal, Vertical};
use iced::padding::Padding;
use iced::widget::{container, stack, text};
use iced::{Element, Length};

use crate::{message::PlotUiMessage, selection::Selection};

/// One text per highlighted curve, drawn in its highlight color at its stacked position.
pub(crate) fn highlight_labels(
    selection: &Selection,
    size: f32,
) -> Option<Element<'_, PlotUiMessage>> {
    if selection.is_empty() {
        return None;
    }

    let labels = selection.labels().map(|label| {
        let [left, top] = label.position;
        container(
            text(&label.text)
                .size(size)
                .color(label.color)
                .wrapping(text::Wrapping::None),
        )
        .width(Length::Fill)
        .height(Length::Fill)
        .padding(Padding {
            top,
            left,
            ..Padding::ZERO
        })
        .align_x(Horizontal::Left)
        .align_y(Vertical::Top)
        .style(container::transparent)
        .into()
    });

    Some(stack(labels).into())
}
