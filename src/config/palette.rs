use crate::math::Vec3;
use super::ConfigError;

/// Parse a `#rrggbb` hex string into an RGB triple in `[0, 1]`
pub fn parse_hex_color(hex: &str) -> Result<Vec3, ConfigError> {
    let digits = hex.trim().strip_prefix('#').unwrap_or(hex.trim());
    if digits.len() != 6 || !digits.is_ascii() {
        return Err(ConfigError::InvalidColor(hex.to_string()));
    }

    let channel = |range: std::ops::Range<usize>| {
        u8::from_str_radix(&digits[range], 16)
            .map(|v| v as f32 / 255.0)
            .map_err(|_| ConfigError::InvalidColor(hex.to_string()))
    };

    Ok(Vec3::new(channel(0..2)?, channel(2..4)?, channel(4..6)?))
}

/// Parse every entry of a palette, rejecting empty palettes
pub fn parse_palette(layer: &str, hexes: &[String]) -> Result<Vec<Vec3>, ConfigError> {
    if hexes.is_empty() {
        return Err(ConfigError::EmptyPalette(layer.to_string()));
    }
    hexes.iter().map(|h| parse_hex_color(h)).collect()
}

pub mod colors {
    pub const PINE_GREEN: &str = "#0f3824";
    pub const VIBRANT_GREEN: &str = "#1a5e3a";
    pub const DEEP_NEEDLE: &str = "#052012";
    pub const SANTA_RED: &str = "#d90429";
    pub const BERRY_RED: &str = "#6d071a";
    pub const SNOW_WHITE: &str = "#f8f9fa";
    pub const CLASSIC_GOLD: &str = "#ffd700";
    pub const CHAMPAGNE_GOLD: &str = "#d4af37";
    pub const WARM_LIGHT: &str = "#fff3cd";
}
