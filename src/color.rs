use palette::{Hsl, IntoColor, Srgb};

// ---------------------------------------------------------------------------
// Color palette generator
// ---------------------------------------------------------------------------

/// An sRGB color as 8-bit channels, shared by the PNG renderer and the viewer.
pub type Rgb8 = [u8; 3];

/// Generates `n` visually distinct colours using evenly spaced hues.
pub fn generate_palette(n: usize) -> Vec<Rgb8> {
    if n == 0 {
        return Vec::new();
    }
    (0..n)
        .map(|i| {
            // Start at blue so a two-curve chart reads blue / orange-ish.
            let hue = 220.0 + (i as f32 / n as f32) * 360.0;
            let hsl = Hsl::new(hue, 0.75, 0.45);
            let rgb: Srgb = hsl.into_color();
            [
                (rgb.red * 255.0).round() as u8,
                (rgb.green * 255.0).round() as u8,
                (rgb.blue * 255.0).round() as u8,
            ]
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_palette_is_distinct() {
        let colors = generate_palette(6);
        assert_eq!(colors.len(), 6);
        for (i, a) in colors.iter().enumerate() {
            for b in &colors[i + 1..] {
                assert_ne!(a, b);
            }
        }
        assert!(generate_palette(0).is_empty());
    }
}
