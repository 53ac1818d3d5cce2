//! Keyboard event handling.
//!
//! Dispatches key events to the discard dialog, the section in edit mode, or
//! page navigation.

use anyhow::Result;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use claimdesk_logger as logger;
use claimdesk_modal::{Modal, ModalResult};

use super::App;

impl App {
    /// Handle keyboard event
    pub(super) fn handle_key_event(&mut self, key: KeyEvent) -> Result<()> {
        logger::debug(format!(
            "Key event: code={:?}, modifiers={:?}",
            key.code, key.modifiers
        ));

        if let Some(dialog) = self.discard_dialog.as_mut() {
            let result = dialog.handle_key(key)?;
            self.apply_discard_answer(result);
            return Ok(());
        }

        self.page.clear_status();

        if key.modifiers.contains(KeyModifiers::CONTROL) {
            match key.code {
                KeyCode::Char('q') => self.page.request_quit(),
                KeyCode::Char('s') => self.page.save_active(),
                _ => {}
            }
            return Ok(());
        }

        match key.code {
            KeyCode::Tab => self.page.next_tab(),
            KeyCode::BackTab => self.page.prev_tab(),
            _ if self.page.edit().is_any_component_editing() => self.handle_edit_key(key),
            _ => self.handle_browse_key(key),
        }
        Ok(())
    }

    /// Apply the user's answer from the discard dialog
    pub(super) fn apply_discard_answer(&mut self, result: Option<ModalResult<bool>>) {
        match result {
            Some(ModalResult::Confirmed(true)) => self.page.confirm_discard(),
            Some(ModalResult::Confirmed(false)) | Some(ModalResult::Cancelled) => {
                self.page.cancel_discard()
            }
            None => {}
        }
    }

    /// Keys while a section is in edit mode
    fn handle_edit_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Enter => self.page.save_active(),
            KeyCode::Esc => self.page.cancel_active(),
            KeyCode::Up => {
                self.page.with_active_section_mut(|section| section.prev_field());
            }
            KeyCode::Down => {
                self.page.with_active_section_mut(|section| section.next_field());
            }
            KeyCode::Backspace => {
                self.page.with_active_section_mut(|section| section.pop_char());
            }
            KeyCode::Char(' ') => {
                self.page.with_active_section_mut(|section| {
                    section.toggle_flag() || section.push_char(' ')
                });
            }
            KeyCode::Char(c) => {
                let accepted = self
                    .page
                    .with_active_section_mut(|section| section.push_char(c))
                    .unwrap_or(false);
                if !accepted {
                    logger::debug(format!("Rejected input {:?}", c));
                }
            }
            _ => {}
        }
    }

    /// Keys while no section is being edited
    fn handle_browse_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Up | KeyCode::Char('k') => self.page.select_prev(),
            KeyCode::Down | KeyCode::Char('j') => self.page.select_next(),
            KeyCode::Enter | KeyCode::Char('e') => self.page.begin_edit_selected(),
            KeyCode::Char('q') => self.page.request_quit(),
            KeyCode::Char('Q') => self.page.force_quit(),
            _ => {}
        }
    }
}
