use palette::{Hsl, IntoColor, Srgb};

// ---------------------------------------------------------------------------
// Color palette generator
// ---------------------------------------------------------------------------

/// Generates `n` visually distinct colours (`#rrggbb`) using evenly spaced hues.
pub fn generate_palette(n: usize) -> Vec<String> {
    (0..n)
        .map(|i| {
            let hue = (i as f32 / n as f32) * 360.0;
            let hsl = Hsl::new(hue, 0.75, 0.55);
            let rgb: Srgb = hsl.into_color();
            let rgb: Srgb<u8> = rgb.into_format();
            format!("#{:02x}{:02x}{:02x}", rgb.red, rgb.green, rgb.blue)
        })
        .collect()
}

/// Resolve one colour per series: an explicit colour wins, otherwise the
/// series gets the palette entry for its position.
pub fn assign_colors(explicit: &[Option<String>]) -> Vec<String> {
    let palette = generate_palette(explicit.len());
    explicit
        .iter()
        .zip(palette)
        .map(|(given, generated)| given.clone().unwrap_or(generated))
        .collect()
}
