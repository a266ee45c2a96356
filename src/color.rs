use macroquad::color::Color;

/// Parses Tiled colour strings: `#AARRGGBB`, `#RRGGBB`, with or without the `#`.
///
/// Six digit colours are opaque.
pub fn parse_color(text: &str) -> Option<Color> {
    let hex = text.trim();
    let hex = hex.strip_prefix('#').unwrap_or(hex);
    if !hex.chars().all(|c| c.is_ascii_hexdigit()) {
        return None;
    }
    let value = u32::from_str_radix(hex, 16).ok()?;
    let (a, rgb) = match hex.len() {
        8 => ((value >> 24) as u8, value & 0x00FF_FFFF),
        6 => (255, value),
        _ => return None,
    };
    Some(Color::from_rgba(
        (rgb >> 16) as u8,
        (rgb >> 8) as u8,
        rgb as u8,
        a,
    ))
}

/// Formats a colour back to `#AARRGGBB`.
pub fn format_color(color: Color) -> String {
    let [r, g, b, a] = to_rgba8(color);
    format!("#{a:02x}{r:02x}{g:02x}{b:02x}")
}

/// Rounds each channel back to 0..=255.
pub fn to_rgba8(color: Color) -> [u8; 4] {
    let channel = |v: f32| (v.clamp(0.0, 1.0) * 255.0).round() as u8;
    [channel(color.r), channel(color.g), channel(color.b), channel(color.a)]
}

/// Component-wise product, used to compose inherited tints.
pub(crate) fn multiply(a: Color, b: Color) -> Color {
    Color::new(a.r * b.r, a.g * b.g, a.b * b.b, a.a * b.a)
}
