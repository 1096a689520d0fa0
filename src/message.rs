use crate::ticks::PositionedTick;

#[derive(Debug, Clone, PartialEq)]
/// Messages sent by the plot widget to the application.
///
/// The host routes every one of them back to [`crate::TracePlot::update`].
pub enum PlotUiMessage {
    /// A click (press and release within the click tolerance) at data coordinates.
    /// `toggle` is set when Control was held.
    Click { x: f64, y: f64, toggle: bool },
    /// Rotate every selected curve by `delta` columns.
    Wrap { delta: i64 },
    /// Drop every highlight.
    ClearSelection,
    /// Internal render update message.
    RenderUpdate(PlotRenderUpdate),
}

#[derive(Debug, Clone, PartialEq)]
#[doc(hidden)]
pub struct PlotRenderUpdate {
    pub x_ticks: Option<Vec<PositionedTick>>,
    pub y_ticks: Option<Vec<PositionedTick>>,
}
