//! Hex color parsing and the red blend used by the countdown display

use std::fmt;

use serde::{Deserialize, Serialize};

/// An opaque RGB color
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const WHITE: Rgb = Rgb::new(255, 255, 255);
    pub const BLACK: Rgb = Rgb::new(0, 0, 0);

    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Parse `#rrggbb`, `#rgb` or the names `white` / `black`
    pub fn parse(input: &str) -> Result<Self, String> {
        let input = input.trim();
        match input.to_ascii_lowercase().as_str() {
            "white" => return Ok(Self::WHITE),
            "black" => return Ok(Self::BLACK),
            _ => {}
        }

        let hex = input
            .strip_prefix('#')
            .ok_or_else(|| format!("Color must start with '#': {}", input))?;
        if !hex.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(format!("Invalid hex color: {}", input));
        }

        let channel = |s: &str| u8::from_str_radix(s, 16).map_err(|e| format!("Invalid hex color {}: {}", input, e));
        match hex.len() {
            6 => Ok(Self::new(channel(&hex[0..2])?, channel(&hex[2..4])?, channel(&hex[4..6])?)),
            3 => {
                let short = |i: usize| channel(&hex[i..i + 1]).map(|v| v * 17);
                Ok(Self::new(short(0)?, short(1)?, short(2)?))
            }
            _ => Err(format!("Invalid hex color length: {}", input)),
        }
    }

    /// HSL lightness on a 0..=255 scale
    pub fn lightness(&self) -> u8 {
        let max = self.r.max(self.g).max(self.b) as u16;
        let min = self.r.min(self.g).min(self.b) as u16;
        ((max + min) / 2) as u8
    }

    pub fn is_light(&self) -> bool {
        self.lightness() > 128
    }

    /// Readable text color for this background
    pub fn contrasting_text(&self) -> Rgb {
        if self.is_light() {
            Self::BLACK
        } else {
            Self::WHITE
        }
    }

    /// Move toward pure red: red rises to 255, green and blue scale by `1 - ratio`
    pub fn blend_toward_red(&self, ratio: f64) -> Rgb {
        if ratio <= 0.0 {
            return *self;
        }
        let ratio = ratio.min(1.0);
        let r = self.r as f64 + (255.0 - self.r as f64) * ratio;
        let g = self.g as f64 * (1.0 - ratio);
        let b = self.b as f64 * (1.0 - ratio);
        Rgb::new(r as u8, g as u8, b as u8)
    }

    pub fn to_hex(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for Rgb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_long_short_and_named_forms() {
        assert_eq!(Rgb::parse("#1e90ff"), Ok(Rgb::new(0x1e, 0x90, 0xff)));
        assert_eq!(Rgb::parse("#FFF"), Ok(Rgb::WHITE));
        assert_eq!(Rgb::parse(" black "), Ok(Rgb::BLACK));
        assert!(Rgb::parse("1e90ff").is_err());
        assert!(Rgb::parse("#12345").is_err());
        assert!(Rgb::parse("#zzzzzz").is_err());
    }

    #[test]
    fn white_blends_to_red() {
        assert_eq!(Rgb::WHITE.blend_toward_red(0.0), Rgb::WHITE);
        assert_eq!(Rgb::WHITE.blend_toward_red(0.5), Rgb::new(255, 127, 127));
        assert_eq!(Rgb::WHITE.blend_toward_red(1.0), Rgb::new(255, 0, 0));
    }

    #[test]
    fn black_blends_to_red() {
        assert_eq!(Rgb::BLACK.blend_toward_red(0.5), Rgb::new(127, 0, 0));
        assert_eq!(Rgb::BLACK.blend_toward_red(1.0).to_hex(), "#ff0000");
    }

    #[test]
    fn text_contrasts_with_background() {
        assert_eq!(Rgb::BLACK.contrasting_text(), Rgb::WHITE);
        assert_eq!(Rgb::parse("#f0f0f0").map(|c| c.contrasting_text()), Ok(Rgb::BLACK));
        // lightness exactly 128 still counts as dark
        assert_eq!(Rgb::new(128, 128, 128).contrasting_text(), Rgb::WHITE);
    }
}
