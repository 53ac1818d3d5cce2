//! Theme system for claimdesk.
//!
//! Built-in themes are embedded TOML files parsed on first use.

mod colors;
mod loader;

pub use colors::Theme;
pub use loader::load_theme_from_str;

use ratatui::style::Color;
use std::sync::OnceLock;

const THEME_DEFAULT_TOML: &str = include_str!("../themes/default.toml");
const THEME_LIGHT_TOML: &str = include_str!("../themes/light.toml");

static THEME_DEFAULT: OnceLock<Theme> = OnceLock::new();
static THEME_LIGHT: OnceLock<Theme> = OnceLock::new();

/// Hardcoded fallback theme in case of parse errors.
fn get_hardcoded_fallback_theme(name: &'static str) -> Theme {
    Theme {
        name,
        bg: Color::Black,
        fg: Color::White,
        accented_bg: Color::DarkGray,
        accented_fg: Color::Cyan,
        selected_bg: Color::Blue,
        selected_fg: Color::White,
        disabled: Color::Gray,
        edit_border: Color::Yellow,
        modified: Color::LightCyan,
        success: Color::Green,
        warning: Color::Yellow,
        error: Color::Red,
    }
}

fn load_theme_from_toml(content: &str, name: &'static str) -> Theme {
    match loader::load_theme_from_str(content, name) {
        Ok(theme) => theme,
        Err(e) => {
            eprintln!(
                "Failed to parse built-in theme '{}': {}. Using fallback theme.",
                name, e
            );
            get_hardcoded_fallback_theme(name)
        }
    }
}

impl Theme {
    /// Get theme by name. Unknown names fall back to the default theme.
    pub fn get_by_name(name: &str) -> &'static Theme {
        match name {
            "light" => THEME_LIGHT.get_or_init(|| load_theme_from_toml(THEME_LIGHT_TOML, "light")),
            _ => THEME_DEFAULT
                .get_or_init(|| load_theme_from_toml(THEME_DEFAULT_TOML, "default")),
        }
    }
}
