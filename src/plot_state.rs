use std::sync::Arc;

use glam::{DVec2, Vec2};
use iced::{
    Color, Point, Rectangle, keyboard,
    mouse::{self, Event},
};
use tracing::debug;

use crate::{
    PlotUiMessage, TracePlot,
    camera::Camera,
    controls::PlotControls,
    interaction::{DragKind, ModifierState, PointerOutcome, PointerState},
    ticks::{self, PositionedTick},
};

/// Padding added around the data when framing the initial view.
const HOME_PADDING: f64 = 0.05;

#[derive(Clone)]
/// PlotState is a projection of the plot's data and the widget's interaction state.
/// It holds the GPU-ready data needed for rendering the plot.
///
/// Not part of the public API, but pub visibility is required for the shader implementation.
pub struct PlotState {
    // Immutable shared data to allow cheap shallow clones.
    pub(crate) positions: Arc<Vec<[f64; 2]>>,
    pub(crate) colors: Arc<Vec<Color>>,
    pub(crate) connect: Arc<[[u32; 2]]>,
    // Versions of the plot data last synced
    pub(crate) geometry_version: u64,
    pub(crate) color_version: u64,
    pub(crate) source_instance_id: Option<u64>,
    // Initial viewport
    pub(crate) home_min: DVec2,
    pub(crate) home_max: DVec2,
    // UI / camera
    pub(crate) camera: Camera,
    pub(crate) bounds: Rectangle,
    pub(crate) x_ticks: Vec<PositionedTick>,
    pub(crate) y_ticks: Vec<PositionedTick>,
    // Interaction state
    pub(crate) cursor_position: Vec2,
    pub(crate) pointer: PointerState,
    pub(crate) modifiers: ModifierState,
}

impl Default for PlotState {
    fn default() -> Self {
        Self {
            positions: Arc::new(Vec::new()),
            colors: Arc::new(Vec::new()),
            connect: Arc::new([]),
            geometry_version: 0,
            color_version: 0,
            source_instance_id: None,
            home_min: DVec2::ZERO,
            home_max: DVec2::ONE,
            camera: Camera::default(),
            bounds: Rectangle::default(),
            x_ticks: Vec::new(),
            y_ticks: Vec::new(),
            cursor_position: Vec2::ZERO,
            pointer: PointerState::default(),
            modifiers: ModifierState::default(),
        }
    }
}

impl PlotState {
    /// Pull geometry and colors that changed since the last sync.
    ///
    /// Returns true if anything was refreshed.
    pub(crate) fn sync_from_plot(&mut self, plot: &TracePlot) -> bool {
        let instance_switched = self.source_instance_id != Some(plot.instance_id);
        let mut changed = false;

        if instance_switched {
            self.connect = plot.line.shared_connectivity();
            let (min_y, max_y) = plot.curves.y_range();
            self.home_min = DVec2::new(-1.0, min_y);
            self.home_max = DVec2::new(plot.curves.sample_count() as f64, max_y);
            self.pointer = PointerState::Idle;
            self.reset_view();
            self.source_instance_id = Some(plot.instance_id);
            changed = true;
        }
        if instance_switched || self.geometry_version != plot.geometry_version {
            self.positions = plot.line.shared_positions();
            self.geometry_version = plot.geometry_version;
            changed = true;
        }
        if instance_switched || self.color_version != plot.color_version {
            self.colors = plot.line.shared_colors();
            self.color_version = plot.color_version;
            changed = true;
        }
        changed
    }

    /// Frame the initial viewport: x in `[-1, S]`, y over the data range.
    pub(crate) fn reset_view(&mut self) {
        self.camera
            .set_bounds(self.home_min, self.home_max, HOME_PADDING);
    }

    fn screen_size(&self) -> DVec2 {
        DVec2::new(
            self.bounds.width.max(1.0) as f64,
            self.bounds.height.max(1.0) as f64,
        )
    }

    fn to_world(&self, screen: Vec2) -> DVec2 {
        self.camera
            .screen_to_world(screen.as_dvec2(), self.screen_size())
    }

    /// Recompute tick screen positions. Returns true if they changed.
    pub(crate) fn update_ticks(&mut self) -> bool {
        let min = self.camera.position - self.camera.half_extents;
        let max = self.camera.position + self.camera.half_extents;

        let x_ticks: Vec<_> = ticks::default_tick_producer(min.x, max.x)
            .into_iter()
            .filter(|tick| tick.line_type.labelled())
            .filter_map(|tick| {
                self.camera
                    .world_to_screen_x(tick.value, self.bounds.width)
                    .map(|screen_pos| PositionedTick { screen_pos, tick })
            })
            .collect();
        let y_ticks: Vec<_> = ticks::default_tick_producer(min.y, max.y)
            .into_iter()
            .filter(|tick| tick.line_type.labelled())
            .filter_map(|tick| {
                self.camera
                    .world_to_screen_y(tick.value, self.bounds.height)
                    .map(|screen_pos| PositionedTick { screen_pos, tick })
            })
            .collect();

        let changed = x_ticks != self.x_ticks || y_ticks != self.y_ticks;
        self.x_ticks = x_ticks;
        self.y_ticks = y_ticks;
        changed
    }

    /// Feed a mouse event through the pointer state machine.
    ///
    /// Returns whether a redraw is needed and the message to publish, if any.
    pub(crate) fn handle_mouse_event(
        &mut self,
        event: Event,
        cursor: mouse::Cursor,
        controls: &PlotControls,
        has_selection: bool,
    ) -> (bool, Option<PlotUiMessage>) {
        let tolerance = controls.click_tolerance_px;

        match event {
            Event::CursorMoved { position } => {
                self.cursor_position = self.local(position);
                let outcome = self.pointer.moved(
                    self.cursor_position,
                    self.modifiers,
                    has_selection,
                    tolerance,
                );
                self.apply(outcome)
            }
            Event::ButtonPressed(mouse::Button::Left) => {
                // Drags continue outside the widget, but must start inside it.
                let Some(position) = cursor.position_in(self.bounds) else {
                    return (false, None);
                };
                self.cursor_position = Vec2::new(position.x, position.y);
                self.pointer.press(self.cursor_position);
                (false, None)
            }
            Event::ButtonReleased(mouse::Button::Left) => {
                let outcome = self
                    .pointer
                    .release(self.cursor_position, self.modifiers, tolerance);
                self.apply(outcome)
            }
            Event::WheelScrolled { delta } => {
                let Some(position) = cursor.position_in(self.bounds) else {
                    return (false, None);
                };
                let y = match delta {
                    mouse::ScrollDelta::Lines { y, .. } => y,
                    mouse::ScrollDelta::Pixels { y, .. } => y,
                };
                if y == 0.0 {
                    return (false, None);
                }
                let factor = if y > 0.0 {
                    1.0 - controls.zoom_step
                } else {
                    1.0 + controls.zoom_step
                };
                let screen = DVec2::new(position.x as f64, position.y as f64);
                self.camera.zoom_at(screen, self.screen_size(), factor);
                (true, None)
            }
            _ => (false, None),
        }
    }

    pub(crate) fn handle_keyboard_event(
        &mut self,
        event: &keyboard::Event,
        controls: &PlotControls,
    ) -> (bool, Option<PlotUiMessage>) {
        match event {
            keyboard::Event::ModifiersChanged(modifiers) => {
                self.modifiers = (*modifiers).into();
                (false, None)
            }
            keyboard::Event::KeyPressed { key, .. } => self.handle_key_press(key, controls),
            _ => (false, None),
        }
    }

    fn handle_key_press(
        &mut self,
        key: &keyboard::Key,
        controls: &PlotControls,
    ) -> (bool, Option<PlotUiMessage>) {
        use keyboard::{Key, key::Named};

        match key {
            Key::Named(Named::Escape) if controls.clear_on_escape => {
                (false, Some(PlotUiMessage::ClearSelection))
            }
            Key::Named(Named::Home) => {
                debug!("resetting view");
                self.reset_view();
                (true, None)
            }
            _ => (false, None),
        }
    }

    fn apply(&mut self, outcome: PointerOutcome) -> (bool, Option<PlotUiMessage>) {
        match outcome {
            PointerOutcome::None => (false, None),
            PointerOutcome::Click { position, toggle } => {
                let world = self.to_world(position);
                (
                    false,
                    Some(PlotUiMessage::Click {
                        x: world.x,
                        y: world.y,
                        toggle,
                    }),
                )
            }
            PointerOutcome::Wrap { from, to } => {
                // Truncate toward zero; the remainder of each move is dropped.
                let delta = (self.to_world(to).x - self.to_world(from).x) as i64;
                (false, (delta != 0).then_some(PlotUiMessage::Wrap { delta }))
            }
            PointerOutcome::Pan { from, to } => {
                self.camera
                    .pan(from.as_dvec2(), to.as_dvec2(), self.screen_size());
                (true, None)
            }
        }
    }

    /// Window position to widget-local position.
    fn local(&self, position: Point) -> Vec2 {
        Vec2::new(position.x - self.bounds.x, position.y - self.bounds.y)
    }

    pub(crate) fn drag_kind(&self) -> Option<DragKind> {
        match self.pointer {
            PointerState::Dragging { kind, .. } => Some(kind),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;

    use super::*;

    fn state() -> PlotState {
        let mut state = PlotState {
            bounds: Rectangle::new(Point::new(100.0, 50.0), iced::Size::new(400.0, 200.0)),
            home_min: DVec2::new(-1.0, -1.0),
            home_max: DVec2::new(99.0, 1.0),
            ..PlotState::default()
        };
        state.camera.set_bounds(state.home_min, state.home_max, 0.0);
        state
    }

    fn press_at(state: &mut PlotState, local: Vec2) {
        let window = Point::new(local.x + state.bounds.x, local.y + state.bounds.y);
        let controls = PlotControls::default();
        state.handle_mouse_event(
            Event::CursorMoved { position: window },
            mouse::Cursor::Available(window),
            &controls,
            true,
        );
        state.handle_mouse_event(
            Event::ButtonPressed(mouse::Button::Left),
            mouse::Cursor::Available(window),
            &controls,
            true,
        );
    }

    fn move_to(state: &mut PlotState, local: Vec2) -> Option<PlotUiMessage> {
        let window = Point::new(local.x + state.bounds.x, local.y + state.bounds.y);
        state
            .handle_mouse_event(
                Event::CursorMoved { position: window },
                mouse::Cursor::Available(window),
                &PlotControls::default(),
                true,
            )
            .1
    }

    fn release(state: &mut PlotState) -> Option<PlotUiMessage> {
        state
            .handle_mouse_event(
                Event::ButtonReleased(mouse::Button::Left),
                mouse::Cursor::Unavailable,
                &PlotControls::default(),
                true,
            )
            .1
    }

    #[test]
    fn click_reports_data_coordinates() {
        let mut state = state();
        press_at(&mut state, Vec2::new(200.0, 100.0));
        let Some(PlotUiMessage::Click { x, y, toggle }) = release(&mut state) else {
            panic!("expected a click");
        };
        assert_relative_eq!(x, 49.0, epsilon = 1e-9);
        assert_relative_eq!(y, 0.0, epsilon = 1e-9);
        assert!(!toggle);
    }

    #[test]
    fn press_outside_is_ignored() {
        let mut state = state();
        let controls = PlotControls::default();
        let outside = Point::new(10.0, 10.0);
        state.handle_mouse_event(
            Event::ButtonPressed(mouse::Button::Left),
            mouse::Cursor::Available(outside),
            &controls,
            true,
        );
        assert_eq!(state.pointer, PointerState::Idle);
        assert_eq!(release(&mut state), None);
    }

    #[test]
    fn shift_drag_publishes_truncated_deltas() {
        let mut state = state();
        state.modifiers = ModifierState {
            control: false,
            shift: true,
        };
        // 400 px for 100 columns: 4 px per column.
        press_at(&mut state, Vec2::new(100.0, 100.0));
        assert_eq!(move_to(&mut state, Vec2::new(103.0, 100.0)), None);
        assert_eq!(
            move_to(&mut state, Vec2::new(109.0, 120.0)),
            Some(PlotUiMessage::Wrap { delta: 1 })
        );
        assert_eq!(
            move_to(&mut state, Vec2::new(99.0, 120.0)),
            Some(PlotUiMessage::Wrap { delta: -2 })
        );
        assert_eq!(release(&mut state), None);
    }

    #[test]
    fn sub_column_moves_never_add_up() {
        let mut state = state();
        state.modifiers = ModifierState {
            control: false,
            shift: true,
        };
        // 3 px per move is 0.75 of a column each time.
        press_at(&mut state, Vec2::new(100.0, 100.0));
        let messages: Vec<_> = [103.0, 106.0, 109.0]
            .into_iter()
            .map(|x| move_to(&mut state, Vec2::new(x, 100.0)))
            .collect();
        assert_eq!(messages, vec![None, None, None]);
        assert_eq!(state.drag_kind(), Some(DragKind::Wrap));
    }

    #[test]
    fn plain_drag_pans_camera() {
        let mut state = state();
        let before = state.camera.position;
        press_at(&mut state, Vec2::new(100.0, 100.0));
        assert_eq!(move_to(&mut state, Vec2::new(140.0, 100.0)), None);
        assert_relative_eq!(state.camera.position.x, before.x - 10.0, epsilon = 1e-9);
        assert_eq!(state.drag_kind(), Some(DragKind::Pan));
        assert_eq!(release(&mut state), None);
    }

    #[test]
    fn home_restores_initial_view() {
        let mut state = state();
        state.reset_view();
        let home = state.camera;
        state.camera.zoom_at(DVec2::new(10.0, 10.0), DVec2::new(400.0, 200.0), 0.5);
        let (redraw, message) = state.handle_key_press(
            &keyboard::Key::Named(keyboard::key::Named::Home),
            &PlotControls::default(),
        );
        assert!(redraw);
        assert_eq!(message, None);
        assert_eq!(state.camera, home);
    }

    #[test]
    fn escape_clears_selection_when_enabled() {
        let mut state = state();
        let escape = keyboard::Key::Named(keyboard::key::Named::Escape);
        assert_eq!(
            state.handle_key_press(&escape, &PlotControls::default()),
            (false, Some(PlotUiMessage::ClearSelection))
        );
        let controls = PlotControls {
            clear_on_escape: false,
            ..PlotControls::default()
        };
        assert_eq!(state.handle_key_press(&escape, &controls), (false, None));
    }

    #[test]
    fn modifiers_follow_keyboard() {
        let mut state = state();
        state.handle_keyboard_event(
            &keyboard::Event::ModifiersChanged(keyboard::Modifiers::CTRL),
            &PlotControls::default(),
        );
        assert!(state.modifiers.control);
        assert!(!state.modifiers.shift);
        press_at(&mut state, Vec2::new(50.0, 50.0));
        assert!(matches!(
            release(&mut state),
            Some(PlotUiMessage::Click { toggle: true, .. })
        ));
    }

    #[test]
    fn ticks_are_labelled_inside_bounds() {
        let mut state = state();
        assert!(state.update_ticks());
        assert!(!state.x_ticks.is_empty());
        assert!(state
            .x_ticks
            .iter()
            .all(|t| (0.0..=400.0).contains(&t.screen_pos)));
        assert!(!state.update_ticks());
    }
}
