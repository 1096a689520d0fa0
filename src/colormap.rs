//! Named color maps sampled to build the highlight palette.
use std::{fmt, str::FromStr};

use palette::{Hsluv, IntoColor, LinSrgb, Mix, Srgb};
use thiserror::Error;

use crate::Color;

/// Errors that can occur when resolving a color map by name.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ColormapError {
    #[error("unknown colormap `{0}` (expected one of: husl, viridis, grays, hot, cool)")]
    Unknown(String),
}

/// A named color map: a sequence of evenly spaced control colors, blended in linear light.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Colormap {
    /// Six HSLuv hues at full saturation and lightness 70. Perceptually uniform in lightness.
    #[default]
    Husl,
    Viridis,
    Grays,
    Hot,
    Cool,
}

const HUSL_HUES: usize = 6;
const HUSL_SATURATION: f32 = 100.0;
const HUSL_LIGHTNESS: f32 = 70.0;

/// Matplotlib's viridis at t = 0.0, 0.1, ..., 1.0.
const VIRIDIS: [[f32; 3]; 11] = [
    [0.267004, 0.004874, 0.329415],
    [0.282623, 0.140926, 0.457517],
    [0.253935, 0.265254, 0.529983],
    [0.206756, 0.371758, 0.553117],
    [0.163625, 0.471133, 0.558148],
    [0.127568, 0.566949, 0.550556],
    [0.134692, 0.658636, 0.517649],
    [0.266941, 0.748751, 0.440573],
    [0.477504, 0.821444, 0.318195],
    [0.741388, 0.873449, 0.149561],
    [0.993248, 0.906157, 0.143936],
];

impl Colormap {
    /// Every available color map.
    pub const ALL: [Colormap; 5] = [
        Colormap::Husl,
        Colormap::Viridis,
        Colormap::Grays,
        Colormap::Hot,
        Colormap::Cool,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Self::Husl => "husl",
            Self::Viridis => "viridis",
            Self::Grays => "grays",
            Self::Hot => "hot",
            Self::Cool => "cool",
        }
    }

    fn controls(self) -> Vec<LinSrgb> {
        let srgb = |[r, g, b]: [f32; 3]| -> LinSrgb { Srgb::new(r, g, b).into_linear() };

        match self {
            Self::Husl => (0..HUSL_HUES)
                .map(|i| {
                    let hue = 360.0 * i as f32 / HUSL_HUES as f32;
                    let color: Hsluv = Hsluv::new(hue, HUSL_SATURATION, HUSL_LIGHTNESS);
                    color.into_color()
                })
                .collect(),
            Self::Viridis => VIRIDIS.into_iter().map(srgb).collect(),
            Self::Grays => vec![srgb([0.0; 3]), srgb([1.0; 3])],
            Self::Hot => [
                [0.0, 0.0, 0.0],
                [1.0, 0.0, 0.0],
                [1.0, 1.0, 0.0],
                [1.0, 1.0, 1.0],
            ]
            .into_iter()
            .map(srgb)
            .collect(),
            Self::Cool => vec![srgb([0.0, 1.0, 1.0]), srgb([1.0, 0.0, 1.0])],
        }
    }

    /// Color at `t` in `[0, 1]` (clamped).
    pub fn map(self, t: f32) -> Color {
        interpolate(&self.controls(), t)
    }

    /// `n` colors sampled evenly across the map, both ends included.
    pub fn sample(self, n: usize) -> Vec<Color> {
        let controls = self.controls();
        (0..n)
            .map(|i| {
                let t = if n > 1 {
                    i as f32 / (n - 1) as f32
                } else {
                    0.0
                };
                interpolate(&controls, t)
            })
            .collect()
    }
}

impl FromStr for Colormap {
    type Err = ColormapError;

    fn from_str(name: &str) -> Result<Self, Self::Err> {
        match name.trim().to_ascii_lowercase().as_str() {
            "husl" | "hsluv" => Ok(Self::Husl),
            "viridis" => Ok(Self::Viridis),
            "grays" | "greys" | "gray" | "grey" => Ok(Self::Grays),
            "hot" => Ok(Self::Hot),
            "cool" => Ok(Self::Cool),
            _ => Err(ColormapError::Unknown(name.to_owned())),
        }
    }
}

impl fmt::Display for Colormap {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

fn interpolate(controls: &[LinSrgb], t: f32) -> Color {
    let mixed = match controls {
        [] => return Color::WHITE,
        [only] => *only,
        _ => {
            let scaled = t.clamp(0.0, 1.0) * (controls.len() - 1) as f32;
            let lower = (scaled.floor() as usize).min(controls.len() - 2);
            controls[lower].mix(controls[lower + 1], scaled - lower as f32)
        }
    };
    let color: Srgb = Srgb::from_linear(mixed);
    let (r, g, b) = color.into_components();
    Color::from_rgb(r, g, b)
}
