//! Color configuration for the TUI.

use ratatui::style::Color;
use serde::{de, Deserialize, Deserializer};

use crate::domain::Rating;

/// Configuration for all TUI colors.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct ColorConfig {
    #[serde(deserialize_with = "deserialize_color")]
    pub active_border: Color,
    #[serde(deserialize_with = "deserialize_color")]
    pub inactive_border: Color,
    #[serde(deserialize_with = "deserialize_color")]
    pub selection_bg_active: Color,
    #[serde(deserialize_with = "deserialize_color")]
    pub selection_fg_active: Color,
    #[serde(deserialize_with = "deserialize_color")]
    pub selection_bg_inactive: Color,
    #[serde(deserialize_with = "deserialize_color")]
    pub selection_fg_inactive: Color,
    #[serde(deserialize_with = "deserialize_color")]
    pub text: Color,
    #[serde(deserialize_with = "deserialize_color")]
    pub muted: Color,
    #[serde(deserialize_with = "deserialize_color")]
    pub rating_safe: Color,
    #[serde(deserialize_with = "deserialize_color")]
    pub rating_questionable: Color,
    #[serde(deserialize_with = "deserialize_color")]
    pub rating_explicit: Color,
    #[serde(deserialize_with = "deserialize_color")]
    pub tag_artist: Color,
    #[serde(deserialize_with = "deserialize_color")]
    pub tag_character: Color,
    #[serde(deserialize_with = "deserialize_color")]
    pub tag_copyright: Color,
    #[serde(deserialize_with = "deserialize_color")]
    pub tag_species: Color,
    #[serde(deserialize_with = "deserialize_color")]
    pub tag_general: Color,
    #[serde(deserialize_with = "deserialize_color")]
    pub tag_meta: Color,
    #[serde(deserialize_with = "deserialize_color")]
    pub link: Color,
    #[serde(deserialize_with = "deserialize_color")]
    pub error: Color,
    #[serde(deserialize_with = "deserialize_color")]
    pub status_fg: Color,
    #[serde(deserialize_with = "deserialize_color")]
    pub status_bg: Color,
}

impl Default for ColorConfig {
    fn default() -> Self {
        Self {
            active_border: Color::Cyan,
            inactive_border: Color::DarkGray,
            selection_bg_active: Color::Cyan,
            selection_fg_active: Color::Black,
            selection_bg_inactive: Color::DarkGray,
            selection_fg_inactive: Color::White,
            text: Color::White,
            muted: Color::DarkGray,
            rating_safe: Color::Green,
            rating_questionable: Color::Yellow,
            rating_explicit: Color::Red,
            tag_artist: Color::LightYellow,
            tag_character: Color::LightGreen,
            tag_copyright: Color::LightMagenta,
            tag_species: Color::LightRed,
            tag_general: Color::LightBlue,
            tag_meta: Color::Gray,
            link: Color::Blue,
            error: Color::Red,
            status_fg: Color::White,
            status_bg: Color::DarkGray,
        }
    }
}

impl ColorConfig {
    /// Colors for the chosen theme. The configured palette targets a dark
    /// terminal; on a light one, foreground text colors are swapped for
    /// their darker counterparts.
    pub fn adjusted_for(&self, dark_theme: bool) -> Self {
        if dark_theme {
            return self.clone();
        }

        Self {
            text: darken(self.text),
            muted: darken(self.muted),
            tag_artist: darken(self.tag_artist),
            tag_character: darken(self.tag_character),
            tag_copyright: darken(self.tag_copyright),
            tag_species: darken(self.tag_species),
            tag_general: darken(self.tag_general),
            tag_meta: darken(self.tag_meta),
            ..self.clone()
        }
    }

    /// Color for a tag category name as returned by
    /// [`PostTags::by_category`](crate::domain::PostTags::by_category).
    pub fn tag_category(&self, category: &str) -> Color {
        match category {
            "artist" => self.tag_artist,
            "character" => self.tag_character,
            "copyright" => self.tag_copyright,
            "species" => self.tag_species,
            "meta" | "lore" | "invalid" => self.tag_meta,
            _ => self.tag_general,
        }
    }

    pub fn rating(&self, rating: Rating) -> Color {
        match rating {
            Rating::Safe => self.rating_safe,
            Rating::Questionable => self.rating_questionable,
            Rating::Explicit => self.rating_explicit,
        }
    }
}

fn darken(color: Color) -> Color {
    match color {
        Color::White => Color::Black,
        Color::Gray => Color::DarkGray,
        Color::DarkGray => Color::Gray,
        Color::LightRed => Color::Red,
        Color::LightGreen => Color::Green,
        Color::LightYellow => Color::Yellow,
        Color::LightBlue => Color::Blue,
        Color::LightMagenta => Color::Magenta,
        Color::LightCyan => Color::Cyan,
        other => other,
    }
}

/// Custom deserializer for Color that supports named colors and hex codes.
fn deserialize_color<'de, D>(deserializer: D) -> Result<Color, D::Error>
where
    D: Deserializer<'de>,
{
    let s = String::deserialize(deserializer)?;
    parse_color_string(&s).map_err(de::Error::custom)
}

/// Parse a color string into a ratatui Color.
///
/// Supports:
/// - Named colors: "Black", "Red", "Green", "Yellow", "Blue", "Magenta", "Cyan", "Gray",
///   "DarkGray", "LightRed", "LightGreen", "LightYellow", "LightBlue", "LightMagenta",
///   "LightCyan", "White", "Reset"
/// - Hex colors: "#RRGGBB" or "#RGB"
pub fn parse_color_string(s: &str) -> Result<Color, String> {
    let s = s.trim();

    // Handle hex colors
    if s.starts_with('#') {
        return parse_hex_color(s);
    }

    // Handle named colors (case-insensitive)
    match s.to_lowercase().as_str() {
        "black" => Ok(Color::Black),
        "red" => Ok(Color::Red),
        "green" => Ok(Color::Green),
        "yellow" => Ok(Color::Yellow),
        "blue" => Ok(Color::Blue),
        "magenta" => Ok(Color::Magenta),
        "cyan" => Ok(Color::Cyan),
        "gray" | "grey" => Ok(Color::Gray),
        "darkgray" | "darkgrey" => Ok(Color::DarkGray),
        "lightred" => Ok(Color::LightRed),
        "lightgreen" => Ok(Color::LightGreen),
        "lightyellow" => Ok(Color::LightYellow),
        "lightblue" => Ok(Color::LightBlue),
        "lightmagenta" => Ok(Color::LightMagenta),
        "lightcyan" => Ok(Color::LightCyan),
        "white" => Ok(Color::White),
        "reset" => Ok(Color::Reset),
        _ => Err(format!("Unknown color: {}", s)),
    }
}

/// Parse a hex color string into a ratatui Color.
///
/// Supports "#RRGGBB" and "#RGB" formats.
fn parse_hex_color(s: &str) -> Result<Color, String> {
    let hex = s.trim_start_matches('#');

    match hex.len() {
        6 => {
            let r = u8::from_str_radix(&hex[0..2], 16)
                .map_err(|_| format!("Invalid hex color: {}", s))?;
            let g = u8::from_str_radix(&hex[2..4], 16)
                .map_err(|_| format!("Invalid hex color: {}", s))?;
            let b = u8::from_str_radix(&hex[4..6], 16)
                .map_err(|_| format!("Invalid hex color: {}", s))?;
            Ok(Color::Rgb(r, g, b))
        }
        3 => {
            // Expand #RGB to #RRGGBB
            let r = u8::from_str_radix(&hex[0..1], 16)
                .map_err(|_| format!("Invalid hex color: {}", s))?;
            let g = u8::from_str_radix(&hex[1..2], 16)
                .map_err(|_| format!("Invalid hex color: {}", s))?;
            let b = u8::from_str_radix(&hex[2..3], 16)
                .map_err(|_| format!("Invalid hex color: {}", s))?;
            Ok(Color::Rgb(r * 17, g * 17, b * 17))
        }
        _ => Err(format!("Invalid hex color format: {}", s)),
    }
}
