//! Interaction settings for [`crate::TracePlot`].
//!
//! The hit-test constants depend on the data's coordinate scale, so they are
//! configurable rather than fixed.

/// Configures user interaction behavior for [`crate::TracePlot`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlotControls {
    /// Controls how a click is resolved to a curve.
    pub pick: PickControls,

    /// Where highlight labels are stacked.
    pub labels: LabelLayout,

    /// A release closer than this to the press (in logical pixels, on both axes) is a click.
    pub click_tolerance_px: f32,

    /// Mouse wheel zoom step; each notch scales the view by `1 -/+ zoom_step`.
    pub zoom_step: f64,

    /// Escape clears every highlighted curve.
    pub clear_on_escape: bool,
}

/// Configures the nearest-curve search.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PickControls {
    /// Columns searched on each side of the clicked column.
    pub window_radius: usize,

    /// Points at this distance (data units) or farther never win the search.
    pub max_distance: f64,
}

/// Placement of highlight labels in widget coordinates (logical pixels).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LabelLayout {
    /// Left edge of every label.
    pub origin_x: f32,
    /// Top of the first label.
    pub origin_y: f32,
    /// Vertical distance between consecutive labels.
    pub spacing: f32,
}

impl LabelLayout {
    /// Position of the label stacked at `row`.
    pub fn position(&self, row: usize) -> [f32; 2] {
        [self.origin_x, self.origin_y + self.spacing * row as f32]
    }
}

impl Default for PlotControls {
    fn default() -> Self {
        Self {
            pick: PickControls::default(),
            labels: LabelLayout::default(),
            click_tolerance_px: 3.0,
            zoom_step: 0.1,
            clear_on_escape: true,
        }
    }
}

impl Default for PickControls {
    fn default() -> Self {
        Self {
            window_radius: 10,
            max_distance: 100.0,
        }
    }
}

impl Default for LabelLayout {
    fn default() -> Self {
        Self {
            origin_x: 170.0,
            origin_y: 40.0,
            spacing: 16.0,
        }
    }
}
