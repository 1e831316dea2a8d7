//! Light/dark colour palettes.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    #[default]
    Light,
    Dark,
}

impl Theme {
    /// Anything other than exactly `"dark"` falls back to light.
    pub fn from_name(name: &str) -> Self {
        if name == "dark" {
            Theme::Dark
        } else {
            Theme::Light
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Theme::Light => "light",
            Theme::Dark => "dark",
        }
    }

    pub fn palette(self) -> Palette {
        match self {
            Theme::Light => LIGHT,
            Theme::Dark => DARK,
        }
    }
}

/// Named colours, as `#rrggbb` strings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Palette {
    pub bg: &'static str,
    pub fg: &'static str,
    pub fg_dim: &'static str,
    pub frame_bg: &'static str,
    pub entry_bg: &'static str,
    pub entry_fg: &'static str,
    pub btn_bg: &'static str,
    pub btn_fg: &'static str,
    pub btn_active: &'static str,
    pub progress_bg: &'static str,
    pub progress_fg: &'static str,
    pub select_bg: &'static str,
    pub select_fg: &'static str,
}

const LIGHT: Palette = Palette {
    bg: "#f0f0f0",
    fg: "#1a1a1a",
    fg_dim: "#666666",
    frame_bg: "#f5f5f5",
    entry_bg: "#ffffff",
    entry_fg: "#1a1a1a",
    btn_bg: "#e8e8e8",
    btn_fg: "#1a1a1a",
    btn_active: "#d0d0d0",
    progress_bg: "#e0e0e0",
    progress_fg: "#4caf50",
    select_bg: "#b0d4f1",
    select_fg: "#1a1a1a",
};

const DARK: Palette = Palette {
    bg: "#2b2b2b",
    fg: "#e0e0e0",
    fg_dim: "#a0a0a0",
    frame_bg: "#333333",
    entry_bg: "#3c3c3c",
    entry_fg: "#e0e0e0",
    btn_bg: "#404040",
    btn_fg: "#e0e0e0",
    btn_active: "#505050",
    progress_bg: "#404040",
    progress_fg: "#4caf50",
    select_bg: "#505050",
    select_fg: "#e0e0e0",
};

/// Parse `#rrggbb` into its components.
pub fn hex_to_rgb(hex: &str) -> Option<(u8, u8, u8)> {
    let digits = hex.strip_prefix('#')?;
    if digits.len() != 6 || !digits.is_ascii() {
        return None;
    }
    let channel = |i: usize| u8::from_str_radix(&digits[i..i + 2], 16).ok();
    Some((channel(0)?, channel(2)?, channel(4)?))
}

/// ANSI 24-bit foreground escape for `hex`, or empty when it does not parse.
pub fn ansi_fg(hex: &str) -> String {
    hex_to_rgb(hex)
        .map(|(r, g, b)| format!("\x1b[38;2;{r};{g};{b}m"))
        .unwrap_or_default()
}

pub const ANSI_RESET: &str = "\x1b[0m";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_names_fall_back_to_light() {
        assert_eq!(Theme::from_name("dark"), Theme::Dark);
        assert_eq!(Theme::from_name("DARK"), Theme::Light);
        assert_eq!(Theme::from_name(" dark "), Theme::Light);
        assert_eq!(Theme::from_name("solarized"), Theme::Light);
    }

    #[test]
    fn palettes_differ_in_background() {
        assert_eq!(Theme::Light.palette().bg, "#f0f0f0");
        assert_eq!(Theme::Dark.palette().bg, "#2b2b2b");
        assert_eq!(Theme::Dark.palette().progress_fg, Theme::Light.palette().progress_fg);
    }

    #[test]
    fn hex_parsing() {
        assert_eq!(hex_to_rgb("#4caf50"), Some((0x4c, 0xaf, 0x50)));
        assert_eq!(hex_to_rgb("4caf50"), None);
        assert_eq!(hex_to_rgb("#zzzzzz"), None);
        assert_eq!(ansi_fg("#010203"), "\x1b[38;2;1;2;3m");
        assert_eq!(ansi_fg("bad"), "");
    }
}
