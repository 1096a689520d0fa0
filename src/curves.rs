use thiserror::Error;

/// Errors that can occur when building a [`CurveSet`].
#[derive(Debug, Clone, PartialEq, Error)]
pub enum CurveError {
    /// No curves, or curves without samples.
    #[error("no curve data provided")]
    Empty,
    /// A row has a different number of samples than the first one.
    #[error("curve {row} has {found} samples, expected {expected}")]
    Ragged {
        row: usize,
        expected: usize,
        found: usize,
    },
    /// The number of labels does not match the number of curves.
    #[error("{found} labels provided for {expected} curves")]
    LabelCountMismatch { expected: usize, found: usize },
    /// A sample is NaN or infinite.
    #[error("sample {sample} of curve {curve} is not finite")]
    NonFinite { curve: usize, sample: usize },
    /// The total number of points cannot be indexed by the GPU line.
    #[error("{0} points exceed the maximum number of plottable points")]
    TooLarge(usize),
}

/// Input curves: a single 1-D curve or a 2-D block of rows (curves) by columns (samples).
#[derive(Debug, Clone, PartialEq)]
pub enum Curves {
    Single(Vec<f64>),
    Multiple(Vec<Vec<f64>>),
}

impl From<Vec<f64>> for Curves {
    fn from(curve: Vec<f64>) -> Self {
        Self::Single(curve)
    }
}

impl From<&[f64]> for Curves {
    fn from(curve: &[f64]) -> Self {
        Self::Single(curve.to_vec())
    }
}

impl From<Vec<Vec<f64>>> for Curves {
    fn from(curves: Vec<Vec<f64>>) -> Self {
        Self::Multiple(curves)
    }
}

impl From<&[Vec<f64>]> for Curves {
    fn from(curves: &[Vec<f64>]) -> Self {
        Self::Multiple(curves.to_vec())
    }
}

/// An immutable block of N curves sharing S samples each, with one display label per curve.
///
/// Samples are stored row-major: curve `n` occupies `[n * S, (n + 1) * S)`.
#[derive(Debug, Clone, PartialEq)]
pub struct CurveSet {
    values: Vec<f64>,
    curve_count: usize,
    sample_count: usize,
    labels: Vec<String>,
}

impl CurveSet {
    /// Build a curve set, validating shape and labels.
    ///
    /// When `labels` is `None` every curve is labelled with its hexadecimal index (`0x1f`).
    pub fn new(curves: impl Into<Curves>, labels: Option<Vec<String>>) -> Result<Self, CurveError> {
        let rows = match curves.into() {
            Curves::Single(curve) => vec![curve],
            Curves::Multiple(rows) => rows,
        };

        let curve_count = rows.len();
        let sample_count = rows.first().map(Vec::len).unwrap_or(0);
        if curve_count == 0 || sample_count == 0 {
            return Err(CurveError::Empty);
        }

        let total = curve_count * sample_count;
        if total > u32::MAX as usize {
            return Err(CurveError::TooLarge(total));
        }

        let labels = match labels {
            Some(labels) if labels.len() != curve_count => {
                return Err(CurveError::LabelCountMismatch {
                    expected: curve_count,
                    found: labels.len(),
                });
            }
            Some(labels) => labels,
            None => (0..curve_count).map(default_label).collect(),
        };

        let mut values = Vec::with_capacity(total);
        for (row, curve) in rows.into_iter().enumerate() {
            if curve.len() != sample_count {
                return Err(CurveError::Ragged {
                    row,
                    expected: sample_count,
                    found: curve.len(),
                });
            }
            if let Some(sample) = curve.iter().position(|v| !v.is_finite()) {
                return Err(CurveError::NonFinite { curve: row, sample });
            }
            values.extend(curve);
        }

        Ok(Self {
            values,
            curve_count,
            sample_count,
            labels,
        })
    }

    /// Number of curves (rows).
    pub fn curve_count(&self) -> usize {
        self.curve_count
    }

    /// Number of samples per curve (columns).
    pub fn sample_count(&self) -> usize {
        self.sample_count
    }

    /// `(curves, samples)`.
    pub fn shape(&self) -> (usize, usize) {
        (self.curve_count, self.sample_count)
    }

    /// Samples of curve `n`.
    pub fn curve(&self, n: usize) -> Option<&[f64]> {
        (n < self.curve_count)
            .then(|| &self.values[n * self.sample_count..(n + 1) * self.sample_count])
    }

    /// Display label of curve `n`.
    pub fn label(&self, n: usize) -> Option<&str> {
        self.labels.get(n).map(String::as_str)
    }

    pub fn labels(&self) -> &[String] {
        &self.labels
    }

    /// Global `(min, max)` over every sample of every curve.
    pub fn y_range(&self) -> (f64, f64) {
        self.values
            .iter()
            .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &v| {
                (lo.min(v), hi.max(v))
            })
    }

    pub(crate) fn values(&self) -> &[f64] {
        &self.values
    }
}

pub(crate) fn default_label(index: usize) -> String {
    format!("0x{index:x}")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rows(n: usize, s: usize) -> Vec<Vec<f64>> {
        (0..n)
            .map(|i| (0..s).map(|k| (i * s + k) as f64).collect())
            .collect()
    }

    #[test]
    fn labels_must_match_curve_count() {
        for provided in 0..6 {
            let labels = (0..provided).map(|i| format!("c{i}")).collect();
            let result = CurveSet::new(rows(3, 10), Some(labels));
            if provided == 3 {
                assert!(result.is_ok());
            } else {
                assert_eq!(
                    result,
                    Err(CurveError::LabelCountMismatch {
                        expected: 3,
                        found: provided
                    })
                );
            }
        }
    }

    #[test]
    fn default_labels_are_hex_indices() {
        let set = CurveSet::new(rows(20, 4), None).unwrap();
        assert_eq!(set.label(0), Some("0x0"));
        assert_eq!(set.label(10), Some("0xa"));
        assert_eq!(set.label(19), Some("0x13"));
        assert_eq!(set.label(20), None);
    }

    #[test]
    fn single_curve_is_one_row() {
        let set = CurveSet::new(vec![1.0, -2.0, 3.0], Some(vec!["only".into()])).unwrap();
        assert_eq!(set.shape(), (1, 3));
        assert_eq!(set.curve(0), Some(&[1.0, -2.0, 3.0][..]));
        assert_eq!(set.y_range(), (-2.0, 3.0));
    }

    #[test]
    fn rejects_bad_shapes() {
        assert_eq!(CurveSet::new(Vec::<Vec<f64>>::new(), None), Err(CurveError::Empty));
        assert_eq!(CurveSet::new(Vec::<f64>::new(), None), Err(CurveError::Empty));
        assert_eq!(
            CurveSet::new(vec![vec![0.0, 1.0], vec![0.0]], None),
            Err(CurveError::Ragged {
                row: 1,
                expected: 2,
                found: 1
            })
        );
        assert_eq!(
            CurveSet::new(vec![vec![0.0, 1.0], vec![f64::NAN, 0.0]], None),
            Err(CurveError::NonFinite { curve: 1, sample: 0 })
        );
    }

    #[test]
    fn curves_are_row_major() {
        let set = CurveSet::new(rows(3, 4), None).unwrap();
        assert_eq!(set.curve(1), Some(&[4.0, 5.0, 6.0, 7.0][..]));
        assert_eq!(set.curve(3), None);
        assert_eq!(set.y_range(), (0.0, 11.0));
    }
}
