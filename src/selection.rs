use indexmap::IndexMap;

use crate::{
    Color, controls::LabelLayout, curves::CurveSet, line::TraceLine, highlight::HighlightPalette,
};

/// An on-screen label naming a highlighted curve.
#[derive(Debug, Clone, PartialEq)]
pub struct HighlightLabel {
    /// Index of the labelled curve.
    pub curve: usize,
    /// Display text (the curve's label).
    pub text: String,
    /// Highlight color, shared by the label and the curve.
    pub color: Color,
    /// Top-left corner in widget coordinates.
    pub position: [f32; 2],
}

/// The highlighted curves, in selection order, each with its label.
///
/// Keying labels by curve index in one insertion-ordered map keeps the selected set
/// and the label stack the same size and in the same order.
#[derive(Debug, Clone)]
pub struct Selection {
    labels: IndexMap<usize, HighlightLabel>,
    palette: HighlightPalette,
    layout: LabelLayout,
}

impl Selection {
    pub(crate) fn new(palette: HighlightPalette, layout: LabelLayout) -> Self {
        Self {
            labels: IndexMap::new(),
            palette,
            layout,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn contains(&self, curve: usize) -> bool {
        self.labels.contains_key(&curve)
    }

    /// Selected curve indices, oldest first.
    pub fn curves(&self) -> impl Iterator<Item = usize> + '_ {
        self.labels.keys().copied()
    }

    /// Labels in stacking order (top to bottom).
    pub fn labels(&self) -> impl Iterator<Item = &HighlightLabel> + '_ {
        self.labels.values()
    }

    /// Replace the whole selection with `curve`.
    pub(crate) fn single_select(&mut self, curve: usize, curves: &CurveSet, line: &mut TraceLine) {
        self.clear(line);
        self.add(curve, curves, line);
    }

    /// Toggle `curve` in or out of the selection. Returns whether it is now selected.
    pub(crate) fn multiple_select(
        &mut self,
        curve: usize,
        curves: &CurveSet,
        line: &mut TraceLine,
    ) -> bool {
        if self.remove(curve) {
            line.restore_curve_color(curve);
            false
        } else {
            self.add(curve, curves, line);
            true
        }
    }

    /// Restore every highlighted curve and drop all labels.
    pub(crate) fn clear(&mut self, line: &mut TraceLine) {
        for curve in self.labels.keys() {
            line.restore_curve_color(*curve);
        }
        self.labels.clear();
    }

    fn add(&mut self, curve: usize, curves: &CurveSet, line: &mut TraceLine) {
        let color = self.palette.next_color();
        let text = curves.label(curve).unwrap_or_default().to_owned();
        let position = self.layout.position(self.labels.len());
        self.labels.insert(
            curve,
            HighlightLabel {
                curve,
                text,
                color,
                position,
            },
        );
        line.set_curve_color(curve, color);
    }

    fn remove(&mut self, curve: usize) -> bool {
        let Some((row, _, _)) = self.labels.shift_remove_full(&curve) else {
            return false;
        };
        // Close the gap left at `row`.
        for (offset, label) in self.labels.values_mut().skip(row).enumerate() {
            label.position = self.layout.position(row + offset);
        }
        true
    }
}
