//! Modal dialog system for claimdesk.
//!
//! Provides themed modal dialogs for user interaction.

use anyhow::Result;
use crossterm::event::{KeyEvent, MouseEvent};
use ratatui::{buffer::Buffer, layout::Rect};

use claimdesk_theme::Theme;

pub use claimdesk_ui::ModalResult;

pub mod confirm;

pub use confirm::ConfirmModal;

/// Trait for all modal windows.
pub trait Modal {
    /// Modal window result type.
    type Result;

    /// Render the modal window with theme.
    fn render(&mut self, area: Rect, buf: &mut Buffer, theme: &Theme);

    /// Handle keyboard event.
    /// Returns Some(result) if the modal window should close.
    fn handle_key(&mut self, key: KeyEvent) -> Result<Option<ModalResult<Self::Result>>>;

    /// Handle mouse event.
    /// Returns Some(result) if the modal window should close.
    fn handle_mouse(&mut self, _mouse: MouseEvent) -> Result<Option<ModalResult<Self::Result>>> {
        Ok(None)
    }
}
