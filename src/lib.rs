//! A GPU-accelerated Iced widget for inspecting many traces at once.
//!
//! - Draws every curve as one line with a single draw call
//! - Click a trace to highlight it, Ctrl-click to toggle it in a multi-selection
//! - Shift-drag rotates the highlighted traces cyclically along x
//! - Left-drag pans, the wheel zooms, Home resets and Escape clears the selection
//!
//! Quick start:
//!
//! ```no_run
//! use iced_traceplot::TracePlot;
//!
//! let rows: Vec<Vec<f64>> = (0..20)
//!     .map(|i| (0..1000).map(|k| i as f64 + (k as f64 * 0.01).sin()).collect())
//!     .collect();
//!
//! TracePlot::new(rows, None, Some("viridis"))
//!     .unwrap()
//!     .run()
//!     .unwrap();
//! ```
//!
//! See `demos/` for more.
pub mod colormap;
pub mod controls;
pub mod curves;
pub mod highlight;
pub mod line;
pub mod message;
pub mod selection;
pub mod ticks;
pub mod trace_plot;
pub mod trace_plot_builder;

pub(crate) mod camera;
pub(crate) mod grid;
pub(crate) mod interaction;
pub(crate) mod labels;
pub(crate) mod picking;
pub(crate) mod plot_renderer;
pub(crate) mod plot_state;

// Iced re-exports.
pub use iced::Color;

// Re-exports of public types.
pub use colormap::{Colormap, ColormapError};
pub use controls::{LabelLayout, PickControls, PlotControls};
pub use curves::{CurveError, CurveSet, Curves};
pub use highlight::{HighlightPalette, MAX_HL};
pub use line::TraceLine;
pub use message::PlotUiMessage;
pub use selection::{HighlightLabel, Selection};
pub use trace_plot::{PlotError, TracePlot};
pub use trace_plot_builder::TracePlotBuilder;
