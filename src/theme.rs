//! Color handling for the titlebar
//!
//! Handles color math (lighten/darken in HSL space, light/dark detection) and
//! derives the titlebar and menubar palette from the current options and
//! window focus.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::TitlebarError;

/// Foreground of an unfocused titlebar on a light background
pub const INACTIVE_FOREGROUND_DARK: Color = Color::rgb(0x22, 0x22, 0x22);
/// Foreground of a focused titlebar on a light background
pub const ACTIVE_FOREGROUND_DARK: Color = Color::rgb(0x33, 0x33, 0x33);
/// Foreground of an unfocused titlebar on a dark background
pub const INACTIVE_FOREGROUND: Color = Color::rgb(0xEE, 0xEE, 0xEE);
/// Foreground of a focused titlebar on a dark background
pub const ACTIVE_FOREGROUND: Color = Color::rgb(0xFF, 0xFF, 0xFF);

/// How much the background is lightened while the window is unfocused
pub const UNFOCUS_LIGHTEN_FACTOR: f32 = 0.45;
/// How much the titlebar background is darkened for the menubar
pub const MENUBAR_DARKEN_FACTOR: f32 = 0.16;

/// Translucent black used for hovered/selected menu items
pub const DEFAULT_SELECTION_BACKGROUND: Color = Color::new(0, 0, 0, 36);

/// RGBA Color representation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Color {
    /// Create a new color from RGBA values
    pub const fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    /// Create a new opaque color from RGB values
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 255 }
    }

    /// Create a color with a fractional alpha (0.0 - 1.0)
    pub fn rgba(r: u8, g: u8, b: u8, alpha: f32) -> Self {
        let a = (alpha.clamp(0.0, 1.0) * 255.0).round() as u8;
        Self { r, g, b, a }
    }

    /// Create color from hex string (#RRGGBB or #RRGGBBAA)
    pub fn from_hex(hex: &str) -> Option<Self> {
        let hex = hex.trim_start_matches('#');
        if !hex.is_ascii() {
            return None;
        }
        match hex.len() {
            6 => {
                let r = u8::from_str_radix(&hex[0..2], 16).ok()?;
                let g = u8::from_str_radix(&hex[2..4], 16).ok()?;
                let b = u8::from_str_radix(&hex[4..6], 16).ok()?;
                Some(Self::rgb(r, g, b))
            }
            8 => {
                let r = u8::from_str_radix(&hex[0..2], 16).ok()?;
                let g = u8::from_str_radix(&hex[2..4], 16).ok()?;
                let b = u8::from_str_radix(&hex[4..6], 16).ok()?;
                let a = u8::from_str_radix(&hex[6..8], 16).ok()?;
                Some(Self::new(r, g, b, a))
            }
            _ => None,
        }
    }

    /// Convert to hex string
    pub fn hex(&self) -> String {
        if self.a == 255 {
            format!("#{:02X}{:02X}{:02X}", self.r, self.g, self.b)
        } else {
            format!("#{:02X}{:02X}{:02X}{:02X}", self.r, self.g, self.b, self.a)
        }
    }

    /// CSS value: `#rrggbb` when opaque, `rgba(r, g, b, a)` otherwise
    pub fn to_css(&self) -> String {
        if self.a == 255 {
            format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
        } else {
            let alpha = format!("{:.2}", self.alpha());
            let alpha = alpha.trim_end_matches('0').trim_end_matches('.');
            format!("rgba({}, {}, {}, {})", self.r, self.g, self.b, alpha)
        }
    }

    /// Alpha as a fraction
    pub fn alpha(&self) -> f32 {
        self.a as f32 / 255.0
    }

    /// Lighten the color: raises HSL lightness by `factor` of itself
    pub fn lighten(&self, factor: f32) -> Color {
        let hsl = Hsl::from(*self);
        Hsl {
            l: hsl.l + hsl.l * factor,
            ..hsl
        }
        .to_color(self.a)
    }

    /// Darken the color: lowers HSL lightness by `factor` of itself
    pub fn darken(&self, factor: f32) -> Color {
        let hsl = Hsl::from(*self);
        Hsl {
            l: hsl.l - hsl.l * factor,
            ..hsl
        }
        .to_color(self.a)
    }

    /// YIQ brightness check, alpha is ignored
    pub fn is_lighter(&self) -> bool {
        let yiq = (self.r as u32 * 299 + self.g as u32 * 587 + self.b as u32 * 114) / 1000;
        yiq >= 128
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_css())
    }
}

impl TryFrom<String> for Color {
    type Error = TitlebarError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Color::from_hex(&value).ok_or(TitlebarError::InvalidColor(value))
    }
}

impl From<Color> for String {
    fn from(color: Color) -> Self {
        color.hex()
    }
}

/// Hue/saturation/lightness triple used for lighten/darken
#[derive(Debug, Clone, Copy)]
struct Hsl {
    h: f32,
    s: f32,
    l: f32,
}

impl From<Color> for Hsl {
    fn from(color: Color) -> Self {
        let r = color.r as f32 / 255.0;
        let g = color.g as f32 / 255.0;
        let b = color.b as f32 / 255.0;
        let max = r.max(g).max(b);
        let min = r.min(g).min(b);
        let l = (min + max) / 2.0;
        let chroma = max - min;

        if chroma <= 0.0 {
            return Hsl { h: 0.0, s: 0.0, l };
        }

        let s = if l <= 0.5 {
            chroma / (2.0 * l)
        } else {
            chroma / (2.0 - 2.0 * l)
        }
        .min(1.0);

        let h = if max == r {
            (g - b) / chroma + if g < b { 6.0 } else { 0.0 }
        } else if max == g {
            (b - r) / chroma + 2.0
        } else {
            (r - g) / chroma + 4.0
        };

        Hsl {
            h: (h * 60.0).round(),
            s,
            l,
        }
    }
}

impl Hsl {
    fn to_color(self, a: u8) -> Color {
        let h = self.h.clamp(0.0, 360.0) / 360.0;
        let s = self.s.clamp(0.0, 1.0);
        let l = self.l.clamp(0.0, 1.0);

        let (r, g, b) = if s == 0.0 {
            (l, l, l)
        } else {
            let q = if l < 0.5 { l * (1.0 + s) } else { l + s - l * s };
            let p = 2.0 * l - q;
            (
                hue_to_rgb(p, q, h + 1.0 / 3.0),
                hue_to_rgb(p, q, h),
                hue_to_rgb(p, q, h - 1.0 / 3.0),
            )
        };

        Color::new(
            (r * 255.0).round() as u8,
            (g * 255.0).round() as u8,
            (b * 255.0).round() as u8,
            a,
        )
    }
}

fn hue_to_rgb(p: f32, q: f32, mut t: f32) -> f32 {
    if t < 0.0 {
        t += 1.0;
    }
    if t > 1.0 {
        t -= 1.0;
    }
    if t < 1.0 / 6.0 {
        return p + (q - p) * 6.0 * t;
    }
    if t < 1.0 / 2.0 {
        return q;
    }
    if t < 2.0 / 3.0 {
        return p + (q - p) * (2.0 / 3.0 - t) * 6.0;
    }
    p
}

/// Colors forwarded from the titlebar to the menubar and its items
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MenuStyle {
    pub background: Color,
    pub foreground: Color,
    pub selection_background: Color,
    pub selection_foreground: Color,
    pub separator: Color,
}

/// Everything the titlebar paints, derived from options and focus
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TitlebarPalette {
    pub background: Color,
    pub foreground: Color,
    /// Background is light, so the titlebar gets the `light` class
    pub is_light: bool,
    pub menu: MenuStyle,
}

impl TitlebarPalette {
    /// Derive the palette for the given base colors and focus state
    pub fn derive(
        background: Color,
        item_background: Option<Color>,
        inactive: bool,
        unfocus_effect: bool,
    ) -> Self {
        let dimmed = inactive && unfocus_effect;

        let title_background = if dimmed {
            background.lighten(UNFOCUS_LIGHTEN_FACTOR)
        } else {
            background
        };

        let is_light = title_background.is_lighter();
        let title_foreground = match (is_light, dimmed) {
            (true, true) => INACTIVE_FOREGROUND_DARK,
            (true, false) => ACTIVE_FOREGROUND_DARK,
            (false, true) => INACTIVE_FOREGROUND,
            (false, false) => ACTIVE_FOREGROUND,
        };

        let menu_background = background.darken(MENUBAR_DARKEN_FACTOR);
        let menu_foreground = if menu_background.is_lighter() {
            INACTIVE_FOREGROUND_DARK
        } else {
            INACTIVE_FOREGROUND
        };

        let selection_background = match item_background {
            Some(color) if color != menu_background => color,
            _ => DEFAULT_SELECTION_BACKGROUND,
        };
        let selection_foreground = if selection_background.is_lighter() {
            ACTIVE_FOREGROUND_DARK
        } else {
            ACTIVE_FOREGROUND
        };

        Self {
            background: title_background,
            foreground: title_foreground,
            is_light,
            menu: MenuStyle {
                background: menu_background,
                foreground: menu_foreground,
                selection_background,
                selection_foreground,
                separator: menu_foreground,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hex_parsing() {
        assert_eq!(Color::from_hex("#444444"), Some(Color::rgb(0x44, 0x44, 0x44)));
        assert_eq!(Color::from_hex("ff000080"), Some(Color::new(255, 0, 0, 128)));
        assert_eq!(Color::from_hex("#12345"), None);
        assert_eq!(Color::from_hex("#zzzzzz"), None);
    }

    #[test]
    fn css_rendering() {
        assert_eq!(Color::rgb(0xAB, 0xCD, 0xEF).to_css(), "#abcdef");
        assert_eq!(DEFAULT_SELECTION_BACKGROUND.to_css(), "rgba(0, 0, 0, 0.14)");
        assert_eq!(Color::new(0, 0, 0, 0).to_css(), "rgba(0, 0, 0, 0)");
    }

    #[test]
    fn lighten_and_darken_grey() {
        let grey = Color::rgb(0x44, 0x44, 0x44);
        let lighter = grey.lighten(0.45);
        let darker = grey.darken(0.16);
        assert!(lighter.r > grey.r);
        assert_eq!(lighter.r, lighter.g);
        assert!(darker.r < grey.r);
        assert_eq!(darker.a, 255);
        // lightness 0.2667 * 1.45 = 0.3867 -> 99
        assert_eq!(lighter, Color::rgb(99, 99, 99));
    }

    #[test]
    fn lighten_saturates_at_white() {
        assert_eq!(Color::rgb(250, 250, 250).lighten(1.0), Color::rgb(255, 255, 255));
    }

    #[test]
    fn hue_survives_lighten() {
        let red = Color::rgb(200, 0, 0);
        let light_red = red.lighten(0.2);
        assert!(light_red.r > light_red.g);
        assert_eq!(light_red.g, light_red.b);
    }

    #[test]
    fn yiq_brightness() {
        assert!(Color::rgb(255, 255, 255).is_lighter());
        assert!(!Color::rgb(0x44, 0x44, 0x44).is_lighter());
        assert!(!DEFAULT_SELECTION_BACKGROUND.is_lighter());
    }

    #[test]
    fn palette_for_dark_focused_titlebar() {
        let bg = Color::rgb(0x44, 0x44, 0x44);
        let palette = TitlebarPalette::derive(bg, None, false, true);
        assert_eq!(palette.background, bg);
        assert_eq!(palette.foreground, ACTIVE_FOREGROUND);
        assert!(!palette.is_light);
        assert_eq!(palette.menu.background, bg.darken(MENUBAR_DARKEN_FACTOR));
        assert_eq!(palette.menu.selection_background, DEFAULT_SELECTION_BACKGROUND);
        assert_eq!(palette.menu.selection_foreground, ACTIVE_FOREGROUND);
        assert_eq!(palette.menu.separator, palette.menu.foreground);
    }

    #[test]
    fn palette_dims_when_unfocused() {
        let bg = Color::rgb(0x44, 0x44, 0x44);
        let palette = TitlebarPalette::derive(bg, None, true, true);
        assert_eq!(palette.background, bg.lighten(UNFOCUS_LIGHTEN_FACTOR));
        assert_eq!(palette.foreground, INACTIVE_FOREGROUND);

        let no_effect = TitlebarPalette::derive(bg, None, true, false);
        assert_eq!(no_effect.background, bg);
        assert_eq!(no_effect.foreground, ACTIVE_FOREGROUND);
    }

    #[test]
    fn palette_light_background() {
        let bg = Color::rgb(0xF0, 0xF0, 0xF0);
        let palette = TitlebarPalette::derive(bg, None, false, true);
        assert!(palette.is_light);
        assert_eq!(palette.foreground, ACTIVE_FOREGROUND_DARK);
        let dimmed = TitlebarPalette::derive(bg, None, true, true);
        assert_eq!(dimmed.foreground, INACTIVE_FOREGROUND_DARK);
    }

    #[test]
    fn item_background_overrides_selection() {
        let bg = Color::rgb(0x44, 0x44, 0x44);
        let item = Color::rgb(0xDD, 0xDD, 0xDD);
        let palette = TitlebarPalette::derive(bg, Some(item), false, true);
        assert_eq!(palette.menu.selection_background, item);
        assert_eq!(palette.menu.selection_foreground, ACTIVE_FOREGROUND_DARK);

        // Same as the computed menubar background falls back to the overlay
        let same = bg.darken(MENUBAR_DARKEN_FACTOR);
        let palette = TitlebarPalette::derive(bg, Some(same), false, true);
        assert_eq!(palette.menu.selection_background, DEFAULT_SELECTION_BACKGROUND);
    }

    #[test]
    fn serde_as_hex_string() {
        #[derive(Serialize, Deserialize)]
        struct Holder {
            color: Color,
        }
        let parsed: Holder = toml::from_str("color = \"#102030\"").expect("parse");
        assert_eq!(parsed.color, Color::rgb(0x10, 0x20, 0x30));
        assert!(toml::from_str::<Holder>("color = \"nope\"").is_err());
    }
}
