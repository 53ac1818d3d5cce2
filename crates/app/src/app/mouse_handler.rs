//! Mouse event handling.

use anyhow::Result;
use crossterm::event::{MouseButton, MouseEvent, MouseEventKind};

use claimdesk_modal::Modal;
use claimdesk_ui::contains;

use super::App;

impl App {
    /// Handle mouse event
    pub(super) fn handle_mouse_event(&mut self, mouse: MouseEvent) -> Result<()> {
        if let Some(dialog) = self.discard_dialog.as_mut() {
            let result = dialog.handle_mouse(mouse)?;
            self.apply_discard_answer(result);
            return Ok(());
        }

        if mouse.kind != MouseEventKind::Down(MouseButton::Left) {
            return Ok(());
        }

        let tab = self
            .hit_areas
            .tabs
            .iter()
            .find(|(_, area)| contains(*area, mouse.column, mouse.row))
            .map(|(index, _)| *index);
        if let Some(index) = tab {
            self.page.request_tab(index);
            return Ok(());
        }

        let section = self
            .hit_areas
            .sections
            .iter()
            .find(|(_, area)| contains(*area, mouse.column, mouse.row))
            .map(|(id, _)| id.clone());
        if let Some(id) = section {
            self.page.request_edit(id);
        }
        Ok(())
    }
}
