use std::sync::Arc;

use crate::{Color, curves::CurveSet};

/// The single line visual holding every curve: interleaved positions, the
/// connectivity table and per-point colors.
///
/// Geometry and colors are shared with the render primitive through `Arc`s, so
/// pushing a new frame is a shallow clone and mutation is copy-on-write.
#[derive(Debug, Clone)]
pub struct TraceLine {
    curve_count: usize,
    sample_count: usize,
    positions: Arc<Vec<[f64; 2]>>,
    connect: Arc<[[u32; 2]]>,
    colors: Arc<Vec<Color>>,
    backup_colors: Vec<Color>,
}

impl TraceLine {
    pub(crate) fn new(curves: &CurveSet) -> Self {
        let (curve_count, sample_count) = curves.shape();

        let positions = curves
            .values()
            .chunks_exact(sample_count)
            .flat_map(|curve| {
                curve
                    .iter()
                    .enumerate()
                    .map(|(column, &y)| [column as f64, y])
            })
            .collect();

        let backup_colors = default_gradient(curve_count);
        let colors = backup_colors
            .iter()
            .flat_map(|&color| std::iter::repeat_n(color, sample_count))
            .collect();

        Self {
            curve_count,
            sample_count,
            positions: Arc::new(positions),
            connect: build_connectivity(curve_count, sample_count).into(),
            colors: Arc::new(colors),
            backup_colors,
        }
    }

    /// Every point of every curve, curve-major.
    pub fn positions(&self) -> &[[f64; 2]] {
        &self.positions
    }

    /// Points of curve `n`.
    pub fn curve_positions(&self, n: usize) -> Option<&[[f64; 2]]> {
        self.range(n).map(|range| &self.positions[range])
    }

    /// Pairs of point indices joined by a segment.
    pub fn connectivity(&self) -> &[[u32; 2]] {
        &self.connect
    }

    /// Per-point colors, curve-major.
    pub fn colors(&self) -> &[Color] {
        &self.colors
    }

    /// Current color of curve `n`.
    pub fn curve_color(&self, n: usize) -> Option<Color> {
        self.range(n).map(|range| self.colors[range.start])
    }

    /// Unselected appearance of curve `n`.
    pub fn backup_color(&self, n: usize) -> Option<Color> {
        self.backup_colors.get(n).copied()
    }

    pub(crate) fn shared_positions(&self) -> Arc<Vec<[f64; 2]>> {
        Arc::clone(&self.positions)
    }

    pub(crate) fn shared_colors(&self) -> Arc<Vec<Color>> {
        Arc::clone(&self.colors)
    }

    pub(crate) fn shared_connectivity(&self) -> Arc<[[u32; 2]]> {
        Arc::clone(&self.connect)
    }

    pub(crate) fn set_curve_color(&mut self, n: usize, color: Color) {
        if let Some(range) = self.range(n) {
            Arc::make_mut(&mut self.colors)[range].fill(color);
        }
    }

    pub(crate) fn restore_curve_color(&mut self, n: usize) {
        if let Some(color) = self.backup_color(n) {
            self.set_curve_color(n, color);
        }
    }

    /// Cyclically rotate the y values of curve `n` by `delta` columns.
    ///
    /// A positive delta moves every sample to a higher column; samples pushed past the
    /// last column reappear at the first.
    pub(crate) fn wrap_curve(&mut self, n: usize, delta: i64) {
        let Some(range) = self.range(n) else {
            return;
        };
        let shift = delta.rem_euclid(self.sample_count as i64) as usize;
        if shift == 0 {
            return;
        }
        let points = &mut Arc::make_mut(&mut self.positions)[range];
        let mut ys: Vec<f64> = points.iter().map(|p| p[1]).collect();
        ys.rotate_right(shift);
        for (point, y) in points.iter_mut().zip(ys) {
            point[1] = y;
        }
    }

    fn range(&self, n: usize) -> Option<std::ops::Range<usize>> {
        (n < self.curve_count).then(|| n * self.sample_count..(n + 1) * self.sample_count)
    }
}

/// Join each sample to its successor; the last sample of each curve joins itself
/// so no segment spans two curves.
pub(crate) fn build_connectivity(curve_count: usize, sample_count: usize) -> Vec<[u32; 2]> {
    let total = curve_count * sample_count;
    (0..total.saturating_sub(1))
        .map(|i| {
            if (i + 1) % sample_count == 0 {
                [i as u32, i as u32]
            } else {
                [i as u32, i as u32 + 1]
            }
        })
        .collect()
}

/// Independent linear ramps over R, G and B across curves.
fn default_gradient(curve_count: usize) -> Vec<Color> {
    const RED: (f32, f32) = (0.4, 0.4);
    const GREEN: (f32, f32) = (0.5, 0.3);
    const BLUE: (f32, f32) = (0.5, 0.3);

    (0..curve_count)
        .map(|i| {
            let t = if curve_count > 1 {
                i as f32 / (curve_count - 1) as f32
            } else {
                0.0
            };
            let ramp = |(start, end): (f32, f32)| start + (end - start) * t;
            Color::from_rgb(ramp(RED), ramp(GREEN), ramp(BLUE))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;

    use super::*;

    fn line(n: usize, s: usize) -> TraceLine {
        let rows: Vec<Vec<f64>> = (0..n)
            .map(|i| (0..s).map(|k| (i * 100 + k) as f64).collect())
            .collect();
        TraceLine::new(&CurveSet::new(rows, None).unwrap())
    }

    fn ys(line: &TraceLine, n: usize) -> Vec<f64> {
        line.curve_positions(n)
            .unwrap()
            .iter()
            .map(|p| p[1])
            .collect()
    }

    #[test]
    fn connectivity_never_crosses_curves() {
        let connect = build_connectivity(3, 4);
        assert_eq!(connect.len(), 11);
        assert_eq!(connect[0], [0, 1]);
        assert_eq!(connect[3], [3, 3]);
        assert_eq!(connect[4], [4, 5]);
        assert_eq!(connect[7], [7, 7]);
        assert_eq!(connect[10], [10, 11]);
        for [a, b] in connect {
            assert_eq!(a / 4, b / 4);
        }
    }

    #[test]
    fn positions_are_column_and_sample() {
        let line = line(2, 3);
        assert_eq!(
            line.positions(),
            &[
                [0.0, 0.0],
                [1.0, 1.0],
                [2.0, 2.0],
                [0.0, 100.0],
                [1.0, 101.0],
                [2.0, 102.0]
            ]
        );
    }

    #[test]
    fn gradient_ramps_across_curves() {
        let line = line(3, 2);
        let first = line.backup_color(0).unwrap();
        let middle = line.backup_color(1).unwrap();
        let last = line.backup_color(2).unwrap();
        assert_relative_eq!(first.r, 0.4, epsilon = 1e-6);
        assert_relative_eq!(first.g, 0.5, epsilon = 1e-6);
        assert_relative_eq!(middle.g, 0.4, epsilon = 1e-6);
        assert_relative_eq!(last.r, 0.4, epsilon = 1e-6);
        assert_relative_eq!(last.b, 0.3, epsilon = 1e-6);
        assert!(line.colors()[..2].iter().all(|c| *c == first));
        assert!(line.colors()[4..].iter().all(|c| *c == last));

        let single = self::line(1, 2);
        assert_relative_eq!(single.backup_color(0).unwrap().g, 0.5, epsilon = 1e-6);
    }

    #[test]
    fn wrap_follows_roll_semantics() {
        let mut line = line(2, 5);
        line.wrap_curve(0, 2);
        assert_eq!(ys(&line, 0), vec![3.0, 4.0, 0.0, 1.0, 2.0]);
        assert_eq!(ys(&line, 1), vec![100.0, 101.0, 102.0, 103.0, 104.0]);
        let xs: Vec<f64> = line.curve_positions(0).unwrap().iter().map(|p| p[0]).collect();
        assert_eq!(xs, vec![0.0, 1.0, 2.0, 3.0, 4.0]);
    }

    #[test]
    fn wrap_inverse_and_composition() {
        let original = line(1, 7);
        for d1 in -15i64..15 {
            let mut there_and_back = original.clone();
            there_and_back.wrap_curve(0, d1);
            there_and_back.wrap_curve(0, -d1);
            assert_eq!(ys(&there_and_back, 0), ys(&original, 0));

            for d2 in -9i64..9 {
                let mut composed = original.clone();
                composed.wrap_curve(0, d1);
                composed.wrap_curve(0, d2);
                let mut direct = original.clone();
                direct.wrap_curve(0, (d1 + d2).rem_euclid(7));
                assert_eq!(ys(&composed, 0), ys(&direct, 0));
            }
        }
    }

    #[test]
    fn color_updates_do_not_touch_geometry() {
        let mut line = line(2, 3);
        let geometry = line.shared_positions();
        let red = Color::from_rgb(1.0, 0.0, 0.0);
        line.set_curve_color(1, red);
        assert!(Arc::ptr_eq(&geometry, &line.shared_positions()));
        assert_eq!(line.curve_color(1), Some(red));
        assert!(line.colors()[3..].iter().all(|c| *c == red));
        line.restore_curve_color(1);
        assert_eq!(line.curve_color(1), line.backup_color(1));
        line.set_curve_color(9, red);
        assert_eq!(line.curve_color(9), None);
    }
}
