//! Pointer state machine for clicks, wrap drags and pans.
//!
//! Positions are widget-local logical pixels. The machine only classifies input;
//! the plot state decides what a click, wrap or pan does to the data and camera.
use glam::Vec2;
use iced::keyboard;

/// Modifier keys relevant to the plot, refreshed on every modifier change.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub(crate) struct ModifierState {
    /// Control: toggle a curve instead of replacing the selection.
    pub control: bool,
    /// Shift: drag wraps the selected curves.
    pub shift: bool,
}

impl From<keyboard::Modifiers> for ModifierState {
    fn from(modifiers: keyboard::Modifiers) -> Self {
        Self {
            control: modifiers.control(),
            shift: modifiers.shift(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum DragKind {
    /// Rotate the selected curves horizontally.
    Wrap,
    /// Move the camera.
    Pan,
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub(crate) enum PointerState {
    #[default]
    Idle,
    /// Left button down, not yet classified.
    Pressed { origin: Vec2 },
    /// Left button down and moving. `anchor` is the position of the previous move.
    Dragging { anchor: Vec2, kind: DragKind },
}

/// What a pointer event asks the plot to do.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) enum PointerOutcome {
    None,
    /// Select the curve under `position`; `toggle` adds or removes instead of replacing.
    Click { position: Vec2, toggle: bool },
    /// Wrap the selection by the horizontal data distance between `from` and `to`.
    Wrap { from: Vec2, to: Vec2 },
    /// Pan the camera so the point under `from` moves to `to`.
    Pan { from: Vec2, to: Vec2 },
}

impl PointerState {
    pub(crate) fn press(&mut self, position: Vec2) {
        *self = Self::Pressed { origin: position };
    }

    pub(crate) fn moved(
        &mut self,
        position: Vec2,
        modifiers: ModifierState,
        has_selection: bool,
        tolerance: f32,
    ) -> PointerOutcome {
        match *self {
            Self::Idle => PointerOutcome::None,
            Self::Pressed { origin } => {
                if modifiers.shift {
                    if !has_selection {
                        return PointerOutcome::None;
                    }
                    *self = Self::Dragging {
                        anchor: position,
                        kind: DragKind::Wrap,
                    };
                    PointerOutcome::Wrap {
                        from: origin,
                        to: position,
                    }
                } else if beyond(origin, position, tolerance) {
                    *self = Self::Dragging {
                        anchor: position,
                        kind: DragKind::Pan,
                    };
                    PointerOutcome::Pan {
                        from: origin,
                        to: position,
                    }
                } else {
                    PointerOutcome::None
                }
            }
            Self::Dragging {
                anchor,
                kind: DragKind::Wrap,
            } => {
                if modifiers.shift && has_selection {
                    *self = Self::Dragging {
                        anchor: position,
                        kind: DragKind::Wrap,
                    };
                    PointerOutcome::Wrap {
                        from: anchor,
                        to: position,
                    }
                } else {
                    PointerOutcome::None
                }
            }
            Self::Dragging {
                anchor,
                kind: DragKind::Pan,
            } => {
                *self = Self::Dragging {
                    anchor: position,
                    kind: DragKind::Pan,
                };
                PointerOutcome::Pan {
                    from: anchor,
                    to: position,
                }
            }
        }
    }

    pub(crate) fn release(
        &mut self,
        position: Vec2,
        modifiers: ModifierState,
        tolerance: f32,
    ) -> PointerOutcome {
        let state = std::mem::take(self);
        match state {
            Self::Pressed { origin } if !modifiers.shift && !beyond(origin, position, tolerance) => {
                PointerOutcome::Click {
                    position,
                    toggle: modifiers.control,
                }
            }
            _ => PointerOutcome::None,
        }
    }
}

/// Whether `to` is at least `tolerance` away from `from` on either axis.
fn beyond(from: Vec2, to: Vec2, tolerance: f32) -> bool {
    let delta = (to - from).abs();
    delta.x >= tolerance || delta.y >= tolerance
}
