//! Color normalization and theme derivation from a single brand color.

#[cfg(test)]
#[path = "color_test.rs"]
mod color_test;

use crate::config::DEFAULT_BRAND_COLOR;

const HOVER_DARKEN: f64 = 0.15;
const SOFT_TINT: f64 = 0.85;
/// Luminance above which black text out-contrasts white text.
const CONTRAST_CROSSOVER: f64 = 0.179;

/// Parse `#RGB` or `#RRGGBB` values into RGB channels.
pub fn parse_hex_rgb(raw: &str) -> Option<(u8, u8, u8)> {
    let hex = raw.trim().strip_prefix('#').filter(|h| h.is_ascii())?;
    match hex.len() {
        3 => {
            let r = u8::from_str_radix(&hex[0..1].repeat(2), 16).ok()?;
            let g = u8::from_str_radix(&hex[1..2].repeat(2), 16).ok()?;
            let b = u8::from_str_radix(&hex[2..3].repeat(2), 16).ok()?;
            Some((r, g, b))
        }
        6 => {
            let r = u8::from_str_radix(&hex[0..2], 16).ok()?;
            let g = u8::from_str_radix(&hex[2..4], 16).ok()?;
            let b = u8::from_str_radix(&hex[4..6], 16).ok()?;
            Some((r, g, b))
        }
        _ => None,
    }
}

pub fn to_hex((r, g, b): (u8, u8, u8)) -> String {
    format!("#{r:02x}{g:02x}{b:02x}")
}

/// Normalize a color to canonical lowercase `#rrggbb`.
pub fn normalize_hex_color(value: &str, fallback: &str) -> String {
    let fallback_rgb = parse_hex_rgb(fallback)
        .or_else(|| parse_hex_rgb(DEFAULT_BRAND_COLOR))
        .unwrap_or((29, 78, 216));
    to_hex(parse_hex_rgb(value).unwrap_or(fallback_rgb))
}

/// Move each channel `amount` (0..=1) of the way toward `target`.
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
pub fn mix(rgb: (u8, u8, u8), target: (u8, u8, u8), amount: f64) -> (u8, u8, u8) {
    let amount = amount.clamp(0.0, 1.0);
    let channel = |c: u8, t: u8| {
        let c = f64::from(c);
        (c + (f64::from(t) - c) * amount).round().clamp(0.0, 255.0) as u8
    };
    (channel(rgb.0, target.0), channel(rgb.1, target.1), channel(rgb.2, target.2))
}

/// WCAG relative luminance in `0.0..=1.0`.
pub fn relative_luminance((r, g, b): (u8, u8, u8)) -> f64 {
    let linear = |c: u8| {
        let c = f64::from(c) / 255.0;
        if c <= 0.039_28 { c / 12.92 } else { ((c + 0.055) / 1.055).powf(2.4) }
    };
    0.2126 * linear(r) + 0.7152 * linear(g) + 0.0722 * linear(b)
}

/// Palette derived from the brand color.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Theme {
    pub primary: String,
    pub primary_hover: String,
    pub primary_soft: String,
    /// Text color readable on top of `primary`.
    pub on_primary: String,
}

impl Theme {
    /// CSS custom properties for an inline `style` attribute.
    pub fn css_vars(&self) -> String {
        format!(
            "--color-primary: {}; --color-primary-hover: {}; --color-primary-soft: {}; --color-on-primary: {};",
            self.primary, self.primary_hover, self.primary_soft, self.on_primary
        )
    }
}

/// Derive a theme from `brand`, falling back to the default brand color when
/// it does not parse.
pub fn derive_theme(brand: &str) -> Theme {
    let base = parse_hex_rgb(&normalize_hex_color(brand, DEFAULT_BRAND_COLOR)).unwrap_or((29, 78, 216));
    let on_primary = if relative_luminance(base) > CONTRAST_CROSSOVER { "#000000" } else { "#ffffff" };
    Theme {
        primary: to_hex(base),
        primary_hover: to_hex(mix(base, (0, 0, 0), HOVER_DARKEN)),
        primary_soft: to_hex(mix(base, (255, 255, 255), SOFT_TINT)),
        on_primary: on_primary.to_owned(),
    }
}
