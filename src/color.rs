use std::collections::{BTreeMap, BTreeSet};

use eframe::egui::Color32;
use palette::{Hsl, IntoColor, Srgb};

/// Fill for the age histogram.
pub const AGE_BLUE: Color32 = Color32::from_rgb(0x4B, 0x8B, 0xBE);
/// Fill for the income histogram.
pub const INCOME_BLUE: Color32 = Color32::from_rgb(0x30, 0x69, 0x98);

// ---------------------------------------------------------------------------
// Color palette generator
// ---------------------------------------------------------------------------

/// Generates `n` visually distinct colours using evenly spaced hues.
pub fn generate_palette(n: usize, saturation: f32, lightness: f32) -> Vec<Color32> {
    if n == 0 {
        return Vec::new();
    }
    (0..n)
        .map(|i| {
            let hue = (i as f32 / n as f32) * 360.0;
            let hsl = Hsl::new(hue, saturation, lightness);
            let rgb: Srgb = hsl.into_color();
            Color32::from_rgb(
                (rgb.red * 255.0) as u8,
                (rgb.green * 255.0) as u8,
                (rgb.blue * 255.0) as u8,
            )
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Color mapping: category label → Color32
// ---------------------------------------------------------------------------

/// Maps the labels of a categorical column to distinct colours. Built from
/// the full dataset so colours stay put while filters change.
#[derive(Debug, Clone)]
pub struct ColorMap {
    mapping: BTreeMap<String, Color32>,
    default_color: Color32,
}

impl ColorMap {
    /// Saturated hues for region bars.
    pub fn vivid(labels: &BTreeSet<String>) -> Self {
        Self::with_palette(labels, generate_palette(labels.len(), 0.75, 0.55))
    }

    /// Soft hues for small categorical charts.
    pub fn pastel(labels: &BTreeSet<String>) -> Self {
        Self::with_palette(labels, generate_palette(labels.len(), 0.6, 0.75))
    }

    fn with_palette(labels: &BTreeSet<String>, palette: Vec<Color32>) -> Self {
        let mapping = labels.iter().cloned().zip(palette).collect();
        ColorMap {
            mapping,
            default_color: Color32::GRAY,
        }
    }

    /// Look up the colour for a given label.
    pub fn color_for(&self, label: &str) -> Color32 {
        self.mapping
            .get(label)
            .copied()
            .unwrap_or(self.default_color)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn palette_has_requested_size_and_distinct_colours() {
        let colours = generate_palette(4, 0.75, 0.55);
        assert_eq!(colours.len(), 4);
        let unique: BTreeSet<_> = colours.iter().map(|c| c.to_array()).collect();
        assert_eq!(unique.len(), 4);
        assert!(generate_palette(0, 0.75, 0.55).is_empty());
    }

    #[test]
    fn unknown_label_gets_default_colour() {
        let labels: BTreeSet<String> = ["Female", "Male"].iter().map(|s| s.to_string()).collect();
        let map = ColorMap::pastel(&labels);
        assert_ne!(map.color_for("Female"), map.color_for("Male"));
        assert_eq!(map.color_for("Other"), Color32::GRAY);
    }
}
