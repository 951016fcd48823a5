use std::collections::BTreeMap;

use eframe::egui::Color32;
use palette::{Hsl, IntoColor, Srgb};

use crate::data::model::Habitat;

// ---------------------------------------------------------------------------
// Color palette generator
// ---------------------------------------------------------------------------

/// Generates `n` visually distinct colours using evenly spaced hues,
/// starting at `hue_offset` degrees.
pub fn generate_palette(n: usize, hue_offset: f32) -> Vec<Color32> {
    if n == 0 {
        return Vec::new();
    }
    (0..n)
        .map(|i| {
            let hue = (hue_offset + (i as f32 / n as f32) * 360.0) % 360.0;
            let hsl = Hsl::new(hue, 0.65, 0.5);
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
// Habitat colours shared by every chart
// ---------------------------------------------------------------------------

/// Species bars are not habitat-specific.
pub const BAR_COLOR: Color32 = Color32::from_rgb(99, 110, 250);

/// Forest starts on green, grassland lands on the opposite hue.
const FOREST_HUE: f32 = 120.0;

#[derive(Debug, Clone)]
pub struct HabitatColors {
    mapping: BTreeMap<Habitat, Color32>,
}

impl Default for HabitatColors {
    fn default() -> Self {
        let palette = generate_palette(Habitat::ALL.len(), FOREST_HUE);
        HabitatColors {
            mapping: Habitat::ALL.into_iter().zip(palette).collect(),
        }
    }
}

impl HabitatColors {
    pub fn color_for(&self, habitat: Habitat) -> Color32 {
        self.mapping.get(&habitat).copied().unwrap_or(Color32::GRAY)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_palette_len_and_distinct() {
        let colors = generate_palette(4, 0.0);
        assert_eq!(colors.len(), 4);
        for (i, a) in colors.iter().enumerate() {
            for b in &colors[i + 1..] {
                assert_ne!(a, b);
            }
        }
        assert!(generate_palette(0, 0.0).is_empty());
    }

    #[test]
    fn test_habitats_get_different_colors() {
        let colors = HabitatColors::default();
        assert_ne!(
            colors.color_for(Habitat::Forest),
            colors.color_for(Habitat::Grassland)
        );
    }
}
