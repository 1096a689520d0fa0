use std::sync::Arc;

use crate::{
    colormap::Colormap,
    controls::{LabelLayout, PlotControls},
    curves::{CurveSet, Curves},
    ticks::{self, Tick, TickFormatter},
    trace_plot::{PlotError, TracePlot},
};

/// Builder for configuring and constructing a [`TracePlot`].
///
/// Everything but the curves has a default: hex labels (`0x0`, `0x1`, ...), the
/// `husl` color map and [`PlotControls::default`].
///
/// # Example
///
/// ```ignore
/// let plot = TracePlotBuilder::new(rows)
///     .with_labels(names)
///     .with_colormap("viridis")
///     .with_pick_radius(25)
///     .with_title("channels")
///     .build()?;
/// ```
pub struct TracePlotBuilder {
    curves: Curves,
    labels: Option<Vec<String>>,
    colormap: Option<String>,
    controls: PlotControls,
    title: Option<String>,
    x_axis_formatter: Option<TickFormatter>,
    y_axis_formatter: Option<TickFormatter>,
}

impl TracePlotBuilder {
    /// Start a builder for `curves`: one curve, or rows of curves by sample columns.
    pub fn new(curves: impl Into<Curves>) -> Self {
        Self {
            curves: curves.into(),
            labels: None,
            colormap: None,
            controls: PlotControls::default(),
            title: None,
            x_axis_formatter: None,
            y_axis_formatter: None,
        }
    }

    /// One label per curve, in curve order.
    pub fn with_labels<S: Into<String>>(mut self, labels: impl IntoIterator<Item = S>) -> Self {
        self.labels = Some(labels.into_iter().map(Into::into).collect());
        self
    }

    /// Name of the color map the highlight palette is sampled from.
    pub fn with_colormap(mut self, name: impl Into<String>) -> Self {
        self.colormap = Some(name.into());
        self
    }

    /// Columns searched on each side of a click.
    pub fn with_pick_radius(mut self, columns: usize) -> Self {
        self.controls.pick.window_radius = columns;
        self
    }

    /// Distance (data units) a curve must come within to be picked.
    pub fn with_pick_max_distance(mut self, distance: f64) -> Self {
        self.controls.pick.max_distance = distance;
        self
    }

    /// Pointer travel (logical pixels) below which a press and release is a click.
    pub fn with_click_tolerance_px(mut self, tolerance: f32) -> Self {
        self.controls.click_tolerance_px = tolerance;
        self
    }

    pub fn with_label_layout(mut self, layout: LabelLayout) -> Self {
        self.controls.labels = layout;
        self
    }

    pub fn with_zoom_step(mut self, step: f64) -> Self {
        self.controls.zoom_step = step;
        self
    }

    /// Enable or disable clearing the selection with Escape.
    pub fn with_clear_on_escape(mut self, enabled: bool) -> Self {
        self.controls.clear_on_escape = enabled;
        self
    }

    /// Replace every interaction setting at once.
    pub fn with_controls(mut self, controls: PlotControls) -> Self {
        self.controls = controls;
        self
    }

    /// Window title used by [`TracePlot::run`].
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    /// Set a custom formatter for the x-axis tick labels.
    pub fn with_x_tick_formatter<F>(mut self, formatter: F) -> Self
    where
        F: Fn(Tick) -> String + Send + Sync + 'static,
    {
        self.x_axis_formatter = Some(Arc::new(formatter));
        self
    }

    /// Set a custom formatter for the y-axis tick labels.
    pub fn with_y_tick_formatter<F>(mut self, formatter: F) -> Self
    where
        F: Fn(Tick) -> String + Send + Sync + 'static,
    {
        self.y_axis_formatter = Some(Arc::new(formatter));
        self
    }

    /// Validate the curves, labels and color map, then build the plot.
    pub fn build(self) -> Result<TracePlot, PlotError> {
        let colormap = match self.colormap.as_deref() {
            Some(name) => name.parse::<Colormap>()?,
            None => Colormap::default(),
        };
        let curves = CurveSet::new(self.curves, self.labels)?;

        Ok(TracePlot::from_parts(
            curves,
            colormap,
            self.controls,
            self.title.unwrap_or_else(|| "iced_traceplot".to_string()),
            self.x_axis_formatter
                .unwrap_or_else(|| Arc::new(ticks::default_formatter)),
            self.y_axis_formatter
                .unwrap_or_else(|| Arc::new(ticks::default_formatter)),
        ))
    }
}
