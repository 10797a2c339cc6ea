use crossterm::style::Color;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColorCapability {
    TrueColor,
    Ansi256,
    NoColor,
}

impl ColorCapability {
    pub fn detect() -> Self {
        let colorterm = std::env::var("COLORTERM").unwrap_or_default();
        let term = std::env::var("TERM").unwrap_or_default();
        Self::from_env(&colorterm, &term)
    }

    pub fn from_env(colorterm: &str, term: &str) -> Self {
        let colorterm = colorterm.to_lowercase();
        if colorterm.contains("truecolor") || colorterm.contains("24bit") {
            return ColorCapability::TrueColor;
        }
        if term.to_lowercase().contains("256color") {
            return ColorCapability::Ansi256;
        }
        ColorCapability::NoColor
    }

    /// `None` means the terminal gets plain text.
    pub fn map(self, rgb: (u8, u8, u8)) -> Option<Color> {
        match self {
            ColorCapability::TrueColor => Some(Color::Rgb { r: rgb.0, g: rgb.1, b: rgb.2 }),
            ColorCapability::Ansi256 => Some(Color::AnsiValue(rgb_to_ansi256(rgb.0, rgb.1, rgb.2))),
            ColorCapability::NoColor => None,
        }
    }
}

pub fn rgb_to_ansi256(r: u8, g: u8, b: u8) -> u8 {
    // 6x6x6 color cube, 16..231
    let r6 = (r as u16 * 5 / 255) as u8;
    let g6 = (g as u16 * 5 / 255) as u8;
    let b6 = (b as u16 * 5 / 255) as u8;
    16 + 36 * r6 + 6 * g6 + b6
}

/// Relative luminance in 0..=1 (Rec. 709 weights on sRGB channels).
pub fn luminance(rgb: (u8, u8, u8)) -> f32 {
    (0.2126 * rgb.0 as f32 + 0.7152 * rgb.1 as f32 + 0.0722 * rgb.2 as f32) / 255.0
}

/// Black or white, whichever reads better on `background`.
pub fn text_on(background: (u8, u8, u8)) -> (u8, u8, u8) {
    if luminance(background) > 0.5 {
        (0, 0, 0)
    } else {
        (255, 255, 255)
    }
}
