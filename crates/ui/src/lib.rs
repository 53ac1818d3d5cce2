//! UI utilities for claimdesk.
//!
//! Modal result type, modal sizing and layout helpers shared by the
//! modal crate and the page renderer.

use ratatui::layout::{Constraint, Direction, Layout, Rect};
use unicode_width::UnicodeWidthStr;

// ===== Modal System =====

/// Modal window result.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ModalResult<T> {
    /// User confirmed the action with a result.
    Confirmed(T),
    /// User cancelled the action.
    Cancelled,
}

// ===== Modal Width Calculation =====

/// Default modal size constants.
pub mod modal_constants {
    /// Minimum modal width.
    pub const MIN_WIDTH: u16 = 30;
    /// Maximum width as percentage of screen.
    pub const MAX_WIDTH_PERCENTAGE: f32 = 0.75;
    /// Padding with single border.
    pub const PADDING_WITH_BORDER: u16 = 6;
}

/// Calculate modal width based on content and screen constraints.
///
/// Takes the widest content, adds border padding, then clamps between the
/// minimum width and a percentage of the screen.
pub fn calculate_modal_width(
    content_widths: impl Iterator<Item = u16>,
    screen_width: u16,
) -> u16 {
    let content_width = content_widths.max().unwrap_or(0);
    let total_width = content_width + modal_constants::PADDING_WITH_BORDER;
    let max_width = (screen_width as f32 * modal_constants::MAX_WIDTH_PERCENTAGE) as u16;

    total_width
        .max(modal_constants::MIN_WIDTH)
        .min(max_width)
        .min(screen_width)
}

/// Display width of the widest line of `text`.
pub fn max_line_width(text: &str) -> u16 {
    text.lines().map(|line| line.width()).max().unwrap_or(0) as u16
}

/// Cut `text` so that it fits in `width` terminal columns.
pub fn truncate_to_width(text: &str, width: usize) -> String {
    let mut result = String::new();
    let mut used = 0;
    for c in text.chars() {
        let w = unicode_width::UnicodeWidthChar::width(c).unwrap_or(0);
        if used + w > width {
            break;
        }
        used += w;
        result.push(c);
    }
    result
}

/// Create a centered rectangle with specified width and height within a container.
pub fn centered_rect_with_size(width: u16, height: u16, r: Rect) -> Rect {
    let horizontal_margin = r.width.saturating_sub(width) / 2;
    let vertical_margin = r.height.saturating_sub(height) / 2;

    let vertical_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(vertical_margin),
            Constraint::Length(height),
            Constraint::Length(vertical_margin),
        ])
        .split(r);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Length(horizontal_margin),
            Constraint::Length(width),
            Constraint::Length(horizontal_margin),
        ])
        .split(vertical_layout[1])[1]
}

/// Check whether a terminal cell lies inside `area`.
pub fn contains(area: Rect, column: u16, row: u16) -> bool {
    column >= area.x
        && column < area.x.saturating_add(area.width)
        && row >= area.y
        && row < area.y.saturating_add(area.height)
}
