use crate::{Color, colormap::Colormap};

/// Number of distinct highlight colors before the palette repeats.
pub const MAX_HL: usize = 12;

/// A fixed table of highlight colors handed out cyclically.
///
/// Colors are not reclaimed when a curve is deselected: once more than [`MAX_HL`]
/// curves have been highlighted the sequence starts over.
#[derive(Debug, Clone, PartialEq)]
pub struct HighlightPalette {
    colors: Vec<Color>,
    next: usize,
}

impl HighlightPalette {
    /// Sample [`MAX_HL`] colors evenly across `colormap`.
    pub fn new(colormap: Colormap) -> Self {
        Self::from_colors(colormap.sample(MAX_HL))
    }

    /// Use an explicit color table. An empty table falls back to white.
    pub fn from_colors(colors: Vec<Color>) -> Self {
        let colors = if colors.is_empty() {
            vec![Color::WHITE]
        } else {
            colors
        };
        Self { colors, next: 0 }
    }

    /// The next color in the cycle.
    pub fn next_color(&mut self) -> Color {
        let color = self.colors[self.next];
        self.next = (self.next + 1) % self.colors.len();
        color
    }

    pub fn colors(&self) -> &[Color] {
        &self.colors
    }
}

impl Default for HighlightPalette {
    fn default() -> Self {
        Self::new(Colormap::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cycles_through_table() {
        let mut palette = HighlightPalette::new(Colormap::Viridis);
        let table = palette.colors().to_vec();
        assert_eq!(table.len(), MAX_HL);
        let drawn: Vec<Color> = (0..MAX_HL * 2 + 3).map(|_| palette.next_color()).collect();
        for (i, color) in drawn.iter().enumerate() {
            assert_eq!(*color, table[i % MAX_HL]);
        }
    }

    #[test]
    fn short_table_wraps_to_the_start() {
        let table = vec![Color::BLACK, Color::WHITE, Color::from_rgb(1.0, 0.0, 0.0)];
        let mut palette = HighlightPalette::from_colors(table.clone());
        let drawn: Vec<Color> = (0..7).map(|_| palette.next_color()).collect();
        assert_eq!(
            drawn,
            [0, 1, 2, 0, 1, 2, 0].map(|i| table[i]).to_vec()
        );
    }

    #[test]
    fn empty_table_still_yields_colors() {
        let mut palette = HighlightPalette::from_colors(Vec::new());
        assert_eq!(palette.next_color(), Color::WHITE);
        assert_eq!(palette.next_color(), Color::WHITE);
    }
}
