//! Best-effort color code parsing for presentation.

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::OnceLock;

static RGB_COMPONENTS: OnceLock<Regex> = OnceLock::new();

fn rgb_components() -> &'static Regex {
    RGB_COMPONENTS.get_or_init(|| {
        Regex::new(
            r"(?i)^rgba?\(\s*(\d{1,3})\s*,\s*(\d{1,3})\s*,\s*(\d{1,3})\s*(?:,\s*([0-9]*\.?[0-9]+)\s*)?\)$",
        )
        .expect("invalid rgb component regex")
    })
}

/// 8-bit color channels with a unit-interval alpha.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rgba {
    pub red: u8,
    pub green: u8,
    pub blue: u8,
    pub alpha: f32,
}

impl Rgba {
    pub const fn opaque(red: u8, green: u8, blue: u8) -> Self {
        Self {
            red,
            green,
            blue,
            alpha: 1.0,
        }
    }

    /// `#RRGGBB`, alpha dropped.
    pub fn to_hex(&self) -> String {
        format!("#{:02X}{:02X}{:02X}", self.red, self.green, self.blue)
    }
}

/// Parse `#RGB`, `#RRGGBB`, `rgb(r, g, b)` or `rgba(r, g, b, a)`.
///
/// Channel values above 255 are rejected; alpha is clamped to `0.0..=1.0`.
pub fn parse_color(code: &str) -> Option<Rgba> {
    let trimmed = code.trim();

    if trimmed.starts_with('#') {
        return parse_hex(trimmed);
    }
    if trimmed.get(..3).is_some_and(|p| p.eq_ignore_ascii_case("rgb")) {
        return parse_rgb(trimmed);
    }
    None
}

fn parse_hex(code: &str) -> Option<Rgba> {
    if !crate::hex_color_pattern().is_match(code) {
        return None;
    }
    let digits = &code[1..];
    let value = u32::from_str_radix(digits, 16).ok()?;

    let rgba = if digits.len() == 6 {
        Rgba::opaque((value >> 16) as u8, (value >> 8) as u8, value as u8)
    } else {
        // #RGB expands each nibble: 0xA -> 0xAA
        let expand = |nibble: u32| (nibble as u8) * 17;
        Rgba::opaque(
            expand((value >> 8) & 0xF),
            expand((value >> 4) & 0xF),
            expand(value & 0xF),
        )
    };
    Some(rgba)
}

fn parse_rgb(code: &str) -> Option<Rgba> {
    let caps = rgb_components().captures(code)?;
    let channel = |idx: usize| -> Option<u8> { caps.get(idx)?.as_str().parse::<u8>().ok() };

    let alpha = match caps.get(4) {
        Some(m) => m.as_str().parse::<f32>().ok()?.clamp(0.0, 1.0),
        None => 1.0,
    };

    Some(Rgba {
        red: channel(1)?,
        green: channel(2)?,
        blue: channel(3)?,
        alpha,
    })
}
