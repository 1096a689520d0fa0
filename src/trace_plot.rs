use std::{
    collections::HashMap,
    sync::{
        Arc,
        atomic::{AtomicU64, Ordering},
    },
};

use iced::{
    Color, Element, Length, Point, Rectangle, Size,
    alignment::{Horizontal, Vertical},
    mouse::{self, Interaction},
    padding,
    wgpu::TextureFormat,
    widget::{
        self, container,
        shader::{self, Pipeline, Viewport},
        stack,
    },
    window,
};
use thiserror::Error;
use tracing::{debug, warn};

use crate::{
    PlotUiMessage,
    colormap::{Colormap, ColormapError},
    controls::PlotControls,
    curves::{CurveError, CurveSet, Curves},
    interaction::DragKind,
    labels,
    line::TraceLine,
    message::PlotRenderUpdate,
    highlight::HighlightPalette,
    picking,
    plot_renderer::{PlotRenderer, RenderParams},
    plot_state::PlotState,
    selection::{HighlightLabel, Selection},
    ticks::{PositionedTick, TickFormatter},
    trace_plot_builder::TracePlotBuilder,
};

/// Background behind the traces.
pub const BACKGROUND: Color = Color::from_rgb8(0x22, 0x22, 0x22);

const TICK_LABEL_COLOR: Color = Color::from_rgb(0.7, 0.7, 0.7);

/// Errors that can occur when building a [`TracePlot`].
#[derive(Debug, Clone, PartialEq, Error)]
pub enum PlotError {
    #[error(transparent)]
    Curves(#[from] CurveError),
    #[error(transparent)]
    Colormap(#[from] ColormapError),
}

/// Many curves drawn as one GPU line, with click-to-highlight and Shift-drag wrapping.
///
/// Embed it by routing [`PlotUiMessage`]s from [`TracePlot::view`] back into
/// [`TracePlot::update`], or open a window of its own with [`TracePlot::run`].
#[derive(Clone)]
pub struct TracePlot {
    pub(crate) instance_id: u64,
    pub(crate) curves: Arc<CurveSet>,
    pub(crate) line: TraceLine,
    pub(crate) selection: Selection,
    pub(crate) controls: PlotControls,
    pub(crate) title: String,
    // Bumped whenever the renderer has to re-upload the matching buffer.
    pub(crate) geometry_version: u64,
    pub(crate) color_version: u64,
    pub(crate) x_ticks: Vec<PositionedTick>,
    pub(crate) y_ticks: Vec<PositionedTick>,
    pub(crate) x_axis_formatter: TickFormatter,
    pub(crate) y_axis_formatter: TickFormatter,
    pub(crate) tick_label_size: f32,
    pub(crate) label_size: f32,
}

impl TracePlot {
    /// Plot `curves` with optional per-curve `labels` and a named highlight color map
    /// (`"husl"` when `None`).
    pub fn new(
        curves: impl Into<Curves>,
        labels: Option<Vec<String>>,
        colormap: Option<&str>,
    ) -> Result<Self, PlotError> {
        let mut builder = TracePlotBuilder::new(curves);
        if let Some(labels) = labels {
            builder = builder.with_labels(labels);
        }
        if let Some(colormap) = colormap {
            builder = builder.with_colormap(colormap);
        }
        builder.build()
    }

    /// Start configuring a plot of `curves`.
    pub fn builder(curves: impl Into<Curves>) -> TracePlotBuilder {
        TracePlotBuilder::new(curves)
    }

    pub(crate) fn from_parts(
        curves: CurveSet,
        colormap: Colormap,
        controls: PlotControls,
        title: String,
        x_axis_formatter: TickFormatter,
        y_axis_formatter: TickFormatter,
    ) -> Self {
        let line = TraceLine::new(&curves);
        let selection = Selection::new(HighlightPalette::new(colormap), controls.labels);
        debug!(
            curves = curves.curve_count(),
            samples = curves.sample_count(),
            %colormap,
            "trace plot created"
        );
        Self {
            instance_id: NEXT_ID.fetch_add(1, Ordering::Relaxed),
            curves: Arc::new(curves),
            line,
            selection,
            controls,
            title,
            geometry_version: 1,
            color_version: 1,
            x_ticks: Vec::new(),
            y_ticks: Vec::new(),
            x_axis_formatter,
            y_axis_formatter,
            tick_label_size: 11.0,
            label_size: 14.0,
        }
    }

    /// Curve passing closest to `(x, y)` in data coordinates. Falls back to curve 0.
    pub fn find_closest_line(&self, x: f64, y: f64) -> usize {
        let (curve_count, sample_count) = self.curves.shape();
        picking::find_closest_line(
            self.line.positions(),
            curve_count,
            sample_count,
            x,
            y,
            &self.controls.pick,
        )
    }

    /// Highlight `curve` alone, dropping every other highlight.
    pub fn single_select(&mut self, curve: usize) {
        if !self.check_curve(curve) {
            return;
        }
        self.selection
            .single_select(curve, &self.curves, &mut self.line);
        self.color_version += 1;
        debug!(curve, label = self.curves.label(curve), "single select");
    }

    /// Toggle `curve` in or out of the highlighted set. Returns whether it is now highlighted.
    pub fn multiple_select(&mut self, curve: usize) -> bool {
        if !self.check_curve(curve) {
            return false;
        }
        let selected = self
            .selection
            .multiple_select(curve, &self.curves, &mut self.line);
        self.color_version += 1;
        debug!(curve, selected, count = self.selection.len(), "toggle select");
        selected
    }

    /// Rotate every highlighted curve's values by `delta` columns, cyclically.
    pub fn wrap_selected(&mut self, delta: i64) {
        if delta == 0 || self.selection.is_empty() {
            return;
        }
        for curve in self.selection.curves() {
            self.line.wrap_curve(curve, delta);
        }
        self.geometry_version += 1;
        debug!(delta, count = self.selection.len(), "wrapped selection");
    }

    /// Restore every highlighted curve's color and drop all labels.
    pub fn clear_selection(&mut self) {
        if self.selection.is_empty() {
            return;
        }
        self.selection.clear(&mut self.line);
        self.color_version += 1;
        debug!("selection cleared");
    }

    fn check_curve(&self, curve: usize) -> bool {
        let valid = curve < self.curves.curve_count();
        if !valid {
            warn!(
                curve,
                curves = self.curves.curve_count(),
                "ignoring selection of unknown curve"
            );
        }
        valid
    }

    pub fn curves(&self) -> &CurveSet {
        &self.curves
    }

    /// The drawn line: current positions (after wraps) and colors.
    pub fn line(&self) -> &TraceLine {
        &self.line
    }

    pub fn selection(&self) -> &Selection {
        &self.selection
    }

    /// Highlighted curve indices, oldest first.
    pub fn selected(&self) -> Vec<usize> {
        self.selection.curves().collect()
    }

    /// Highlight labels, top to bottom.
    pub fn labels(&self) -> impl Iterator<Item = &HighlightLabel> + '_ {
        self.selection.labels()
    }

    pub fn controls(&self) -> &PlotControls {
        &self.controls
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    /// Handle a message sent by the plot widget.
    pub fn update(&mut self, msg: PlotUiMessage) {
        match msg {
            PlotUiMessage::Click { x, y, toggle } => {
                let curve = self.find_closest_line(x, y);
                if toggle {
                    self.multiple_select(curve);
                } else {
                    self.single_select(curve);
                }
            }
            PlotUiMessage::Wrap { delta } => self.wrap_selected(delta),
            PlotUiMessage::ClearSelection => self.clear_selection(),
            PlotUiMessage::RenderUpdate(payload) => {
                if let Some(ticks) = payload.x_ticks {
                    self.x_ticks = ticks;
                }
                if let Some(ticks) = payload.y_ticks {
                    self.y_ticks = ticks;
                }
            }
        }
    }

    /// View the plot widget.
    pub fn view<'a>(&'a self) -> Element<'a, PlotUiMessage> {
        let plot = widget::shader(self)
            .width(Length::Fill)
            .height(Length::Fill);

        let background = container(plot)
            .width(Length::Fill)
            .height(Length::Fill)
            .style(|_| container::background(BACKGROUND));

        stack![
            background,
            self.view_tick_labels(),
            labels::highlight_labels(&self.selection, self.label_size),
        ]
        .width(Length::Fill)
        .height(Length::Fill)
        .into()
    }

    fn view_tick_labels(&self) -> Option<Element<'_, PlotUiMessage>> {
        if self.x_ticks.is_empty() && self.y_ticks.is_empty() {
            return None;
        }

        let mut tick_elements: Vec<Element<'_, PlotUiMessage>> =
            Vec::with_capacity(self.x_ticks.len() + self.y_ticks.len());
        let tick_text = |label: String| {
            widget::text(label)
                .size(self.tick_label_size)
                .color(TICK_LABEL_COLOR)
        };

        for tick in &self.x_ticks {
            let label_text = (self.x_axis_formatter)(tick.tick);
            let centering_offset = 2.0 * (label_text.len() as f32);
            let positioned_label = container(tick_text(label_text))
                .width(Length::Fill)
                .height(Length::Fill)
                .padding(padding::left((tick.screen_pos - centering_offset).max(0.0)).bottom(2.0))
                .align_x(Horizontal::Left)
                .align_y(Vertical::Bottom)
                .style(container::transparent);
            tick_elements.push(positioned_label.into());
        }

        for tick in &self.y_ticks {
            let label_text = (self.y_axis_formatter)(tick.tick);
            let positioned_label = container(tick_text(label_text))
                .width(Length::Fill)
                .height(Length::Fill)
                .padding(padding::top((tick.screen_pos - 6.0).max(0.0)).left(4.0))
                .align_x(Horizontal::Left)
                .align_y(Vertical::Top)
                .style(container::transparent);
            tick_elements.push(positioned_label.into());
        }

        Some(stack(tick_elements).into())
    }

    /// Open a 1280x900 window at (200, 200) showing this plot and run until it is closed.
    pub fn run(self) -> iced::Result {
        iced::application(move || self.clone(), Self::update, Self::view)
            .title(Self::window_title)
            .window_size(Size::new(1280.0, 900.0))
            .position(window::Position::Specific(Point::new(200.0, 200.0)))
            .run()
    }

    fn window_title(&self) -> String {
        self.title.clone()
    }
}

#[doc(hidden)]
pub struct Primitive {
    instance_id: u64,
    state: PlotState,
}

impl std::fmt::Debug for Primitive {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Primitive")
            .field("instance_id", &self.instance_id)
            .finish_non_exhaustive()
    }
}

impl shader::Program<PlotUiMessage> for TracePlot {
    type State = PlotState;
    type Primitive = Primitive;

    fn draw(
        &self,
        state: &Self::State,
        _cursor: mouse::Cursor,
        _bounds: Rectangle,
    ) -> Self::Primitive {
        Primitive {
            instance_id: self.instance_id,
            state: state.clone(),
        }
    }

    fn update(
        &self,
        state: &mut Self::State,
        event: &iced::Event,
        bounds: Rectangle,
        cursor: mouse::Cursor,
    ) -> Option<shader::Action<PlotUiMessage>> {
        let prev_camera = state.camera;
        let prev_bounds = state.bounds;
        state.bounds = bounds;

        let mut needs_redraw = state.sync_from_plot(self);

        let (redraw, message) = match event {
            iced::Event::Mouse(mouse_event) => state.handle_mouse_event(
                *mouse_event,
                cursor,
                &self.controls,
                !self.selection.is_empty(),
            ),
            iced::Event::Keyboard(keyboard_event) => {
                state.handle_keyboard_event(keyboard_event, &self.controls)
            }
            _ => (false, None),
        };
        needs_redraw |= redraw;

        if state.camera != prev_camera || state.bounds != prev_bounds {
            state.update_ticks();
            needs_redraw = true;
        }

        if let Some(message) = message {
            return Some(shader::Action::publish(message));
        }

        // Ticks shown by the overlay lag behind the camera until published.
        if state.x_ticks != self.x_ticks || state.y_ticks != self.y_ticks {
            return Some(shader::Action::publish(PlotUiMessage::RenderUpdate(
                PlotRenderUpdate {
                    x_ticks: Some(state.x_ticks.clone()),
                    y_ticks: Some(state.y_ticks.clone()),
                },
            )));
        }

        needs_redraw.then(shader::Action::request_redraw)
    }

    fn mouse_interaction(
        &self,
        state: &Self::State,
        _bounds: Rectangle,
        _cursor: mouse::Cursor,
    ) -> Interaction {
        match state.drag_kind() {
            Some(DragKind::Pan) => Interaction::Grabbing,
            Some(DragKind::Wrap) => Interaction::ResizingHorizontally,
            None => Interaction::None,
        }
    }
}

#[doc(hidden)]
pub struct PlotRendererState {
    renderers: HashMap<u64, PlotRenderer>,
    format: TextureFormat,
}

impl shader::Primitive for Primitive {
    type Pipeline = PlotRendererState;

    fn prepare(
        &self,
        renderer_state: &mut Self::Pipeline,
        device: &iced::wgpu::Device,
        queue: &iced::wgpu::Queue,
        _bounds: &Rectangle,
        _viewport: &Viewport,
    ) {
        // Get or create renderer for this widget instance.
        let renderer = renderer_state
            .renderers
            .entry(self.instance_id)
            .or_insert_with(|| PlotRenderer::new(device, queue, renderer_state.format));
        renderer.prepare_frame(device, queue, &self.state);
    }

    fn render(
        &self,
        renderer_state: &Self::Pipeline,
        encoder: &mut iced::wgpu::CommandEncoder,
        target: &iced::wgpu::TextureView,
        clip_bounds: &Rectangle<u32>,
    ) {
        if let Some(renderer) = renderer_state.renderers.get(&self.instance_id) {
            renderer.encode(RenderParams {
                encoder,
                target,
                clip_bounds,
            });
        }
    }
}

impl Pipeline for PlotRendererState {
    fn new(
        _device: &iced::wgpu::Device,
        _queue: &iced::wgpu::Queue,
        format: iced::wgpu::TextureFormat,
    ) -> Self
    where
        Self: Sized,
    {
        PlotRendererState {
            renderers: HashMap::new(),
            format,
        }
    }
}

// Global unique ID generator for widget instances
static NEXT_ID: AtomicU64 = AtomicU64::new(1);

#[cfg(test)]
mod tests {
    use super::*;

    fn abc() -> TracePlot {
        let rows: Vec<Vec<f64>> = (0..3)
            .map(|i| (0..100).map(|k| i as f64 * 10.0 + (k as f64 * 0.1).sin()).collect())
            .collect();
        TracePlot::new(
            rows,
            Some(vec!["a".into(), "b".into(), "c".into()]),
            None,
        )
        .unwrap()
    }

    fn label_texts(plot: &TracePlot) -> Vec<String> {
        plot.labels().map(|l| l.text.clone()).collect()
    }

    #[test]
    fn click_and_ctrl_click_sequence() {
        let mut plot = abc();
        let base = plot.controls().labels.position(0);

        plot.update(PlotUiMessage::Click {
            x: 50.0,
            y: 10.2,
            toggle: false,
        });
        assert_eq!(plot.selected(), vec![1]);
        assert_eq!(label_texts(&plot), vec!["b"]);

        plot.update(PlotUiMessage::Click {
            x: 20.0,
            y: 0.3,
            toggle: true,
        });
        assert_eq!(plot.selected(), vec![1, 0]);
        assert_eq!(label_texts(&plot), vec!["b", "a"]);
        let positions: Vec<_> = plot.labels().map(|l| l.position).collect();
        assert_eq!(positions, vec![base, plot.controls().labels.position(1)]);

        plot.update(PlotUiMessage::Click {
            x: 70.0,
            y: 9.5,
            toggle: true,
        });
        assert_eq!(plot.selected(), vec![0]);
        assert_eq!(label_texts(&plot), vec!["a"]);
        assert_eq!(plot.labels().next().map(|l| l.position), Some(base));
        assert_eq!(plot.line().curve_color(1), plot.line().backup_color(1));
    }

    #[test]
    fn label_count_must_match() {
        let result = TracePlot::new(vec![vec![0.0; 4]; 3], Some(vec!["a".into()]), None);
        assert_eq!(
            result.err(),
            Some(PlotError::Curves(CurveError::LabelCountMismatch {
                expected: 3,
                found: 1
            }))
        );
    }

    #[test]
    fn unknown_colormap_is_rejected() {
        let result = TracePlot::new(vec![0.0, 1.0], None, Some("nope"));
        assert_eq!(
            result.err(),
            Some(PlotError::Colormap(ColormapError::Unknown("nope".into())))
        );
    }

    #[test]
    fn versions_track_what_changed() {
        let mut plot = abc();
        let (geometry, colors) = (plot.geometry_version, plot.color_version);

        plot.single_select(2);
        assert_eq!(plot.geometry_version, geometry);
        assert_eq!(plot.color_version, colors + 1);

        plot.wrap_selected(5);
        assert_eq!(plot.geometry_version, geometry + 1);

        plot.wrap_selected(0);
        assert_eq!(plot.geometry_version, geometry + 1);
    }

    #[test]
    fn wrap_moves_only_selected_curves() {
        let mut plot = abc();
        let before: Vec<f64> = plot.line().curve_positions(0).unwrap().iter().map(|p| p[1]).collect();
        plot.update(PlotUiMessage::Wrap { delta: 3 });
        assert_eq!(
            plot.line().curve_positions(0).unwrap()[3][1],
            before[3],
            "nothing selected, nothing moves"
        );

        plot.multiple_select(0);
        plot.update(PlotUiMessage::Wrap { delta: 3 });
        assert_eq!(plot.line().curve_positions(0).unwrap()[3][1], before[0]);
        assert_eq!(plot.line().curve_positions(0).unwrap()[0][1], before[97]);
        assert_eq!(plot.curves().curve(0).unwrap()[0], before[0]);

        plot.update(PlotUiMessage::Wrap { delta: -3 });
        let after: Vec<f64> = plot.line().curve_positions(0).unwrap().iter().map(|p| p[1]).collect();
        assert_eq!(after, before);
    }

    #[test]
    fn out_of_range_selection_is_ignored() {
        let mut plot = abc();
        plot.single_select(7);
        assert!(!plot.multiple_select(3));
        assert!(plot.selected().is_empty());
    }

    #[test]
    fn escape_message_clears_everything() {
        let mut plot = abc();
        plot.multiple_select(0);
        plot.multiple_select(2);
        plot.update(PlotUiMessage::ClearSelection);
        assert!(plot.selected().is_empty());
        for curve in 0..3 {
            assert_eq!(plot.line().curve_color(curve), plot.line().backup_color(curve));
        }
    }

    #[test]
    fn render_update_stores_ticks() {
        let mut plot = abc();
        let tick = PositionedTick {
            screen_pos: 12.0,
            tick: crate::ticks::Tick::new(10.0, 10.0, crate::ticks::TickWeight::Major),
        };
        plot.update(PlotUiMessage::RenderUpdate(PlotRenderUpdate {
            x_ticks: Some(vec![tick.clone()]),
            y_ticks: None,
        }));
        assert_eq!(plot.x_ticks, vec![tick]);
        assert!(plot.y_ticks.is_empty());
    }
}
