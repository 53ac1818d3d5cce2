//! Main application module.
//!
//! Contains the App struct, the event loop and the input handlers.

use anyhow::Result;
use ratatui::{backend::Backend, layout::Rect, Terminal};
use std::time::Duration;

use claimdesk_config::{constants::EVENT_HANDLER_INTERVAL_MS, Config};
use claimdesk_form::SectionId;
use claimdesk_logger as logger;
use claimdesk_modal::ConfirmModal;
use claimdesk_theme::Theme;

use crate::claim::Claim;
use crate::event::{Event, EventHandler};
use crate::page::ClaimPage;

mod key_handler;
mod mouse_handler;

/// Screen areas from the last frame, used for mouse hit testing
#[derive(Debug, Default, Clone)]
pub struct HitAreas {
    pub tabs: Vec<(usize, Rect)>,
    pub sections: Vec<(SectionId, Rect)>,
}

/// Main application
pub struct App {
    page: ClaimPage,
    theme: &'static Theme,
    event_handler: EventHandler,
    /// Shown while the page waits for a discard decision
    discard_dialog: Option<ConfirmModal>,
    hit_areas: HitAreas,
    needs_redraw: bool,
}

impl App {
    pub fn new(claim: &Claim, config: &Config) -> Self {
        logger::info(format!(
            "Opened claim {} ({} tabs)",
            claim.claim_number,
            claim.tabs.len()
        ));
        Self {
            page: ClaimPage::new(claim, config.general.confirm_discard),
            theme: Theme::get_by_name(&config.general.theme),
            event_handler: EventHandler::new(Duration::from_millis(EVENT_HANDLER_INTERVAL_MS)),
            discard_dialog: None,
            hit_areas: HitAreas::default(),
            needs_redraw: true,
        }
    }

    pub fn page(&self) -> &ClaimPage {
        &self.page
    }

    pub fn theme(&self) -> &'static Theme {
        self.theme
    }

    pub fn discard_dialog(&self) -> Option<&ConfirmModal> {
        self.discard_dialog.as_ref()
    }

    /// Run the main application loop
    pub fn run<B: Backend>(&mut self, terminal: &mut Terminal<B>) -> Result<()> {
        while !self.page.should_quit() {
            let event = self.event_handler.next()?;
            self.handle_event(event)?;

            // Render UI only when needed
            if self.needs_redraw {
                terminal.draw(|frame| self.draw(frame))?;
                self.needs_redraw = false;
            }
        }
        logger::info("Application closed");
        Ok(())
    }

    /// Apply one input event
    pub fn handle_event(&mut self, event: Event) -> Result<()> {
        match event {
            Event::Key(key) => {
                self.handle_key_event(key)?;
                self.needs_redraw = true;
            }
            Event::Mouse(mouse) => {
                self.handle_mouse_event(mouse)?;
                self.needs_redraw = true;
            }
            Event::Resize(..) => self.needs_redraw = true,
            Event::Tick => {}
        }

        self.page.process_commands();
        self.sync_discard_dialog();
        Ok(())
    }

    /// Draw one frame and remember the hit areas
    pub fn draw(&mut self, frame: &mut ratatui::Frame<'_>) {
        self.hit_areas = crate::render::render_page(
            frame,
            &self.page,
            self.theme,
            self.discard_dialog.as_mut(),
        );
    }

    /// Open or close the discard dialog to match the page's pending confirmation
    fn sync_discard_dialog(&mut self) {
        let pending = self.page.edit().confirmation_pending();
        match (pending, self.discard_dialog.is_some()) {
            (true, false) => {
                let subject = self
                    .page
                    .discard_subject()
                    .unwrap_or_else(|| "this section".to_string());
                self.discard_dialog = Some(
                    ConfirmModal::new(
                        "Unsaved changes",
                        format!("Discard your changes to {}?", subject),
                    )
                    .with_buttons("Discard", "Keep editing")
                    .default_no(),
                );
                logger::debug("Discard dialog opened");
            }
            (false, true) => {
                self.discard_dialog = None;
                logger::debug("Discard dialog closed");
            }
            _ => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossterm::event::{
        KeyCode, KeyEvent, KeyModifiers, MouseButton, MouseEvent, MouseEventKind,
    };
    use ratatui::backend::TestBackend;

    use claimdesk_edit::EditPhase;

    fn app() -> App {
        App::new(&Claim::demo().unwrap(), &Config::default())
    }

    fn press(app: &mut App, code: KeyCode) {
        app.handle_event(Event::Key(KeyEvent::new(code, KeyModifiers::NONE)))
            .unwrap();
    }

    fn type_text(app: &mut App, text: &str) {
        for c in text.chars() {
            press(app, KeyCode::Char(c));
        }
    }

    fn click(app: &mut App, column: u16, row: u16) {
        app.handle_event(Event::Mouse(MouseEvent {
            kind: MouseEventKind::Down(MouseButton::Left),
            column,
            row,
            modifiers: KeyModifiers::NONE,
        }))
        .unwrap();
    }

    fn screen(app: &mut App) -> String {
        let mut terminal = Terminal::new(TestBackend::new(100, 40)).unwrap();
        terminal.draw(|frame| app.draw(frame)).unwrap();
        let buf = terminal.backend().buffer().clone();
        let mut text = String::new();
        for y in 0..buf.area.height {
            for x in 0..buf.area.width {
                text.push_str(buf[(x, y)].symbol());
            }
            text.push('\n');
        }
        text
    }

    fn section(name: &str) -> SectionId {
        SectionId::new(name)
    }

    #[test]
    fn test_edit_type_and_save() {
        let mut app = app();
        press(&mut app, KeyCode::Enter);
        assert!(app.page().edit().is_active(&section("policy")));

        type_text(&mut app, "-B");
        press(&mut app, KeyCode::Enter);

        assert_eq!(app.page().phase(), EditPhase::Idle);
        let saved = app
            .page()
            .with_section(&section("policy"), |s| s.saved_value("policy_number").to_string())
            .unwrap();
        assert_eq!(saved, "POL-88213-B");
    }

    #[test]
    fn test_switch_with_dirty_section_shows_dialog() {
        let mut app = app();
        press(&mut app, KeyCode::Char('e'));
        type_text(&mut app, "X");
        press(&mut app, KeyCode::Esc);

        assert!(app.discard_dialog().is_some());
        assert_eq!(app.page().phase(), EditPhase::ConfirmingDiscard);

        // Input goes to the dialog, not the section
        press(&mut app, KeyCode::Char('z'));
        assert!(app.discard_dialog().is_some());

        // Default button keeps editing
        press(&mut app, KeyCode::Enter);
        assert!(app.discard_dialog().is_none());
        assert_eq!(app.page().phase(), EditPhase::Editing);
        assert!(app.page().active_is_dirty());
    }

    #[test]
    fn test_confirming_dialog_discards() {
        let mut app = app();
        press(&mut app, KeyCode::Enter);
        type_text(&mut app, "X");
        press(&mut app, KeyCode::Esc);
        press(&mut app, KeyCode::Char('y'));

        assert!(app.discard_dialog().is_none());
        assert_eq!(app.page().phase(), EditPhase::Idle);
        let dirty = app
            .page()
            .with_section(&section("policy"), |s| s.is_dirty())
            .unwrap();
        assert!(!dirty);
    }

    #[test]
    fn test_tab_switch_after_confirmation() {
        let mut app = app();
        press(&mut app, KeyCode::Enter);
        type_text(&mut app, "X");
        press(&mut app, KeyCode::Tab);
        assert_eq!(app.page().active_tab(), 0);
        assert!(app.discard_dialog().is_some());

        press(&mut app, KeyCode::Char('y'));
        assert_eq!(app.page().active_tab(), 1);
        assert!(app.discard_dialog().is_none());
        assert_eq!(app.page().phase(), EditPhase::Idle);
    }

    #[test]
    fn test_quit_from_browse_mode() {
        let mut app = app();
        press(&mut app, KeyCode::Char('q'));
        assert!(app.page().should_quit());
    }

    #[test]
    fn test_guarded_quit_while_editing() {
        let mut app = app();
        press(&mut app, KeyCode::Enter);
        type_text(&mut app, "q");
        assert!(!app.page().should_quit());

        let ctrl_q = KeyEvent::new(KeyCode::Char('q'), KeyModifiers::CONTROL);
        app.handle_event(Event::Key(ctrl_q)).unwrap();
        assert!(app.discard_dialog().is_some());
        press(&mut app, KeyCode::Char('n'));
        assert!(!app.page().should_quit());

        app.handle_event(Event::Key(ctrl_q)).unwrap();
        press(&mut app, KeyCode::Char('y'));
        assert!(app.page().should_quit());
    }

    #[test]
    fn test_render_shows_tabs_sections_and_dialog() {
        let mut app = app();
        let text = screen(&mut app);
        assert!(text.contains("CLM-2024-00417"));
        assert!(text.contains("Overview"));
        assert!(text.contains("Parties (2)"));
        assert!(text.contains("Policy"));
        assert!(text.contains("POL-88213"));

        press(&mut app, KeyCode::Enter);
        let text = screen(&mut app);
        assert!(text.contains("Parties (locked)"));

        type_text(&mut app, "X");
        press(&mut app, KeyCode::Esc);
        let text = screen(&mut app);
        assert!(text.contains("Discard your changes to Policy?"));
    }

    #[test]
    fn test_section_in_edit_mode_uses_edit_border() {
        let mut app = app();
        press(&mut app, KeyCode::Enter);

        let mut terminal = Terminal::new(TestBackend::new(100, 40)).unwrap();
        terminal.draw(|frame| app.draw(frame)).unwrap();
        let (_, card) = app.hit_areas.sections[0].clone();
        let corner = &terminal.backend().buffer()[(card.x, card.y)];
        assert_eq!(corner.fg, app.theme().edit_border);

        let (_, idle_card) = app.hit_areas.sections[1].clone();
        let idle_corner = &terminal.backend().buffer()[(idle_card.x, idle_card.y)];
        assert_eq!(idle_corner.fg, app.theme().disabled);
    }

    #[test]
    fn test_click_on_section_starts_edit() {
        let mut app = app();
        screen(&mut app);
        let (_, area) = app
            .hit_areas
            .sections
            .iter()
            .find(|(id, _)| id == &section("payment"))
            .cloned()
            .unwrap();

        click(&mut app, area.x + 1, area.y + 1);
        assert!(app.page().edit().is_active(&section("payment")));
    }

    #[test]
    fn test_click_on_tab_switches() {
        let mut app = app();
        screen(&mut app);
        let (_, area) = app.hit_areas.tabs[1];

        click(&mut app, area.x, area.y);
        assert_eq!(app.page().active_tab(), 1);
    }
}
