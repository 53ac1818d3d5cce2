//! Theme color definitions.

use ratatui::style::Color;

/// Application theme with semantic color assignments.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Theme {
    /// Theme name for display
    pub name: &'static str,

    // === Base ===
    /// Page background
    pub bg: Color,
    /// Main text
    pub fg: Color,

    // === Accented ===
    /// Tab bar and status line background
    pub accented_bg: Color,
    /// Selected section border, dialog buttons
    pub accented_fg: Color,

    // === Selection ===
    /// Selected section / field background
    pub selected_bg: Color,
    /// Selected section / field text
    pub selected_fg: Color,

    /// Locked tabs, empty values, log strip
    pub disabled: Color,

    // === Editing ===
    /// Border of the section in edit mode
    pub edit_border: Color,
    /// Draft values that differ from the saved ones, "modified" markers
    pub modified: Color,

    // === Semantic ===
    /// Saved confirmation
    pub success: Color,
    /// Warn-level log lines
    pub warning: Color,
    /// Validation errors
    pub error: Color,
}

impl Default for Theme {
    fn default() -> Self {
        *Self::get_by_name("default")
    }
}
