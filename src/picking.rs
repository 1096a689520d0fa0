//! Nearest-curve search for clicks.
use crate::controls::PickControls;

/// Index of the curve passing closest to `(x, y)` in data coordinates.
///
/// Only the columns around `round(x)` picked by [`search_window`] are scanned, so
/// the curves are assumed to be dense in x. A point wins only with a distance strictly
/// smaller than every earlier candidate and than `controls.max_distance`; ties keep the
/// lower curve index. Returns curve 0 when nothing qualifies.
pub(crate) fn find_closest_line(
    positions: &[[f64; 2]],
    curve_count: usize,
    sample_count: usize,
    x: f64,
    y: f64,
    controls: &PickControls,
) -> usize {
    let Some(columns) = search_window(x, sample_count, controls.window_radius) else {
        return 0;
    };

    let mut best = (0, controls.max_distance);
    for (curve, points) in positions
        .chunks_exact(sample_count)
        .take(curve_count)
        .enumerate()
    {
        for [px, py] in &points[columns.clone()] {
            let distance = (px - x).hypot(py - y);
            if distance < best.1 {
                best = (curve, distance);
            }
        }
    }
    best.0
}

/// Columns `round(x) - radius .. round(x) + radius`, clamped to the data.
///
/// Halves round to even. The window is half-open, so it holds `2 * radius` columns
/// before clamping: `radius` left of the clicked column, the column itself and
/// `radius - 1` to its right.
fn search_window(x: f64, sample_count: usize, radius: usize) -> Option<std::ops::Range<usize>> {
    if sample_count == 0 || !x.is_finite() {
        return None;
    }
    let center = x.round_ties_even();
    let lo = (center - radius as f64).max(0.0);
    let hi = (center + radius as f64).min(sample_count as f64);
    (lo < hi).then(|| lo as usize..hi as usize)
}
