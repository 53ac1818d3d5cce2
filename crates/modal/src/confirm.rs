//! Confirmation modal (two-button dialog).

use anyhow::Result;
use crossterm::event::{KeyCode, KeyEvent, MouseButton, MouseEvent, MouseEventKind};
use ratatui::{
    buffer::Buffer,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph, Widget},
};
use unicode_width::UnicodeWidthStr;

use claimdesk_config::constants::MODAL_BUTTON_SPACING;
use claimdesk_theme::Theme;
use claimdesk_ui::{
    calculate_modal_width, centered_rect_with_size, contains, max_line_width,
};

use crate::{Modal, ModalResult};

/// Confirmation modal window.
///
/// Confirms with `true` for the first button and `false` for the second.
#[derive(Debug)]
pub struct ConfirmModal {
    title: String,
    message: String,
    yes_label: String,
    no_label: String,
    selected: bool, // true = first button
    last_buttons_area: Option<Rect>,
}

impl ConfirmModal {
    /// Create a new Yes/No modal window
    pub fn new(title: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            message: message.into(),
            yes_label: "Yes".to_string(),
            no_label: "No".to_string(),
            selected: true,
            last_buttons_area: None,
        }
    }

    /// Replace the button captions
    pub fn with_buttons(mut self, yes: impl Into<String>, no: impl Into<String>) -> Self {
        self.yes_label = yes.into();
        self.no_label = no.into();
        self
    }

    /// Start with the second button selected
    pub fn default_no(mut self) -> Self {
        self.selected = false;
        self
    }

    fn yes_text(&self) -> String {
        format!("[ {} ]", self.yes_label)
    }

    fn no_text(&self) -> String {
        format!("[ {} ]", self.no_label)
    }

    fn buttons_width(&self) -> u16 {
        (self.yes_text().width() + self.no_text().width()) as u16 + MODAL_BUTTON_SPACING
    }

    fn calculate_modal_width(&self, screen_width: u16) -> u16 {
        let title_width = self.title.width() as u16 + 2;
        let message_width = max_line_width(&self.message);

        calculate_modal_width(
            [title_width, message_width, self.buttons_width()].into_iter(),
            screen_width,
        )
    }
}

impl Modal for ConfirmModal {
    type Result = bool;

    fn render(&mut self, area: Rect, buf: &mut Buffer, theme: &Theme) {
        // 1 (top border) + N (message lines) + 1 (buttons) + 1 (bottom border)
        let message_lines = self.message.lines().count().max(1);
        let modal_height = (message_lines + 3) as u16;
        let modal_width = self.calculate_modal_width(area.width);
        let modal_area = centered_rect_with_size(modal_width, modal_height, area);

        Clear.render(modal_area, buf);

        // Inverted colors
        let block = Block::default()
            .title(Span::styled(
                format!(" {} ", self.title),
                Style::default().fg(theme.bg).add_modifier(Modifier::BOLD),
            ))
            .borders(Borders::ALL)
            .border_style(Style::default().fg(theme.bg))
            .style(Style::default().bg(theme.fg));

        let inner = block.inner(modal_area);
        block.render(modal_area, buf);

        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(message_lines as u16),
                Constraint::Length(1),
            ])
            .split(inner);

        Paragraph::new(self.message.clone())
            .alignment(Alignment::Center)
            .style(Style::default().fg(theme.bg))
            .render(chunks[0], buf);

        let active = Style::default()
            .fg(theme.fg)
            .bg(theme.accented_fg)
            .add_modifier(Modifier::BOLD);
        let inactive = Style::default().fg(theme.accented_fg);
        let (yes_style, no_style) = if self.selected {
            (active, inactive)
        } else {
            (inactive, active)
        };

        let buttons = Line::from(vec![
            Span::styled(self.yes_text(), yes_style),
            Span::raw(" ".repeat(MODAL_BUTTON_SPACING as usize)),
            Span::styled(self.no_text(), no_style),
        ]);
        Paragraph::new(buttons)
            .alignment(Alignment::Center)
            .render(chunks[1], buf);

        // Save buttons area for mouse handling
        self.last_buttons_area = Some(chunks[1]);
    }

    fn handle_key(&mut self, key: KeyEvent) -> Result<Option<ModalResult<Self::Result>>> {
        match key.code {
            KeyCode::Left | KeyCode::Right | KeyCode::Tab | KeyCode::BackTab => {
                self.selected = !self.selected;
                Ok(None)
            }
            KeyCode::Enter => Ok(Some(ModalResult::Confirmed(self.selected))),
            KeyCode::Esc => Ok(Some(ModalResult::Cancelled)),
            KeyCode::Char('y') | KeyCode::Char('Y') => Ok(Some(ModalResult::Confirmed(true))),
            KeyCode::Char('n') | KeyCode::Char('N') => Ok(Some(ModalResult::Confirmed(false))),
            _ => Ok(None),
        }
    }

    fn handle_mouse(&mut self, mouse: MouseEvent) -> Result<Option<ModalResult<Self::Result>>> {
        if mouse.kind != MouseEventKind::Down(MouseButton::Left) {
            return Ok(None);
        }

        let Some(buttons_area) = self.last_buttons_area else {
            return Ok(None);
        };
        if !contains(buttons_area, mouse.column, mouse.row) {
            return Ok(None);
        }

        // Buttons are centered: "[ Yes ]    [ No ]"
        let yes_width = self.yes_text().width() as u16;
        let no_width = self.no_text().width() as u16;
        let start_col =
            buttons_area.x + buttons_area.width.saturating_sub(self.buttons_width()) / 2;
        let yes_end = start_col + yes_width;
        let no_start = yes_end + MODAL_BUTTON_SPACING;
        let no_end = no_start + no_width;

        if mouse.column >= start_col && mouse.column < yes_end {
            self.selected = true;
            Ok(Some(ModalResult::Confirmed(true)))
        } else if mouse.column >= no_start && mouse.column < no_end {
            self.selected = false;
            Ok(Some(ModalResult::Confirmed(false)))
        } else {
            Ok(None)
        }
    }
}
