use std::collections::BTreeMap;

use palette::{Hsl, IntoColor, Srgb};
use plotters::style::RGBColor;

// ---------------------------------------------------------------------------
// Color palette generator
// ---------------------------------------------------------------------------

/// Generates `n` visually distinct colours using evenly spaced hues.
pub fn generate_palette(n: usize) -> Vec<RGBColor> {
    if n == 0 {
        return Vec::new();
    }
    (0..n)
        .map(|i| {
            let hue = (i as f32 / n as f32) * 360.0;
            let hsl = Hsl::new(hue, 0.75, 0.45);
            let rgb: Srgb = hsl.into_color();
            RGBColor(
                (rgb.red * 255.0) as u8,
                (rgb.green * 255.0) as u8,
                (rgb.blue * 255.0) as u8,
            )
        })
        .collect()
}

/// Parse `#rrggbb` (leading `#` optional).
pub fn parse_hex(s: &str) -> Option<RGBColor> {
    let rgb: Srgb<u8> = s.trim().trim_start_matches('#').parse().ok()?;
    Some(RGBColor(rgb.red, rgb.green, rgb.blue))
}

// ---------------------------------------------------------------------------
// Color mapping: series label → RGBColor
// ---------------------------------------------------------------------------

/// Maps series labels to distinct colours, with fixed colours taking
/// precedence over generated ones.
#[derive(Debug, Clone)]
pub struct ColorMap {
    mapping: BTreeMap<String, RGBColor>,
    default_color: RGBColor,
}

impl ColorMap {
    /// Build a colour map for `labels`. `fixed` holds hex overrides keyed by
    /// label; unparsable entries fall back to the generated colour.
    pub fn new<'a>(
        labels: impl IntoIterator<Item = &'a str>,
        fixed: &BTreeMap<String, String>,
    ) -> Self {
        let mut labels: Vec<&str> = labels.into_iter().collect();
        labels.sort_unstable();
        labels.dedup();

        let palette = generate_palette(labels.len());
        let mapping = labels
            .into_iter()
            .zip(palette)
            .map(|(label, generated)| {
                let color = match fixed.get(label) {
                    Some(hex) => parse_hex(hex).unwrap_or_else(|| {
                        log::warn!("ignoring invalid colour '{hex}' for series '{label}'");
                        generated
                    }),
                    None => generated,
                };
                (label.to_string(), color)
            })
            .collect();

        ColorMap {
            mapping,
            default_color: RGBColor(128, 128, 128),
        }
    }

    /// Look up the colour for a series label.
    pub fn color_for(&self, label: &str) -> RGBColor {
        self.mapping
            .get(label)
            .copied()
            .unwrap_or(self.default_color)
    }
}
