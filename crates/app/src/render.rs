//! Page rendering.

use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};
use unicode_width::UnicodeWidthStr;

use claimdesk_config::constants::{FIELD_LABEL_WIDTH, LOG_STRIP_LINES};
use claimdesk_form::{values_equal, FieldKind, FormSection, SectionId};
use claimdesk_logger::{self as logger, LogLevel};
use claimdesk_modal::{ConfirmModal, Modal};
use claimdesk_theme::Theme;
use claimdesk_ui::truncate_to_width;

use crate::app::HitAreas;
use crate::page::{ClaimPage, StatusKind};

/// Render the whole page. Returns the clickable areas.
pub fn render_page(
    frame: &mut Frame<'_>,
    page: &ClaimPage,
    theme: &Theme,
    dialog: Option<&mut ConfirmModal>,
) -> HitAreas {
    let area = frame.area();
    frame.render_widget(
        Block::default().style(Style::default().bg(theme.bg).fg(theme.fg)),
        area,
    );

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1),
            Constraint::Length(1),
            Constraint::Min(0),
            Constraint::Length(1),
            Constraint::Length(LOG_STRIP_LINES as u16),
        ])
        .split(area);

    render_header(frame, chunks[0], page, theme);
    let tabs = render_tab_bar(frame, chunks[1], page, theme);
    let sections = render_sections(frame, chunks[2], page, theme);
    render_status_line(frame, chunks[3], page, theme);
    render_log_strip(frame, chunks[4], theme);

    if let Some(dialog) = dialog {
        dialog.render(area, frame.buffer_mut(), theme);
    }

    HitAreas { tabs, sections }
}

fn render_header(frame: &mut Frame<'_>, area: Rect, page: &ClaimPage, theme: &Theme) {
    let style = Style::default().bg(theme.accented_bg).fg(theme.accented_fg);
    let line = Line::from(vec![
        Span::styled(
            format!(" Claim {} ", page.claim_number()),
            style.add_modifier(Modifier::BOLD),
        ),
        Span::styled(format!(" {} ", page.claim_status()), style),
    ]);
    frame.render_widget(Paragraph::new(line).style(style), area);
}

/// Tab titles. Inactive tabs show a section count while browsing and are
/// locked while a section is being edited.
fn render_tab_bar(
    frame: &mut Frame<'_>,
    area: Rect,
    page: &ClaimPage,
    theme: &Theme,
) -> Vec<(usize, Rect)> {
    let lazy = page.edit().should_use_lazy();
    let mut spans = Vec::new();
    let mut hit = Vec::new();
    let mut x = area.x;

    for (index, tab) in page.tabs().iter().enumerate() {
        let (label, style) = if index == page.active_tab() {
            (
                format!(" {} ", tab.title),
                Style::default()
                    .bg(theme.selected_bg)
                    .fg(theme.selected_fg)
                    .add_modifier(Modifier::BOLD),
            )
        } else if lazy {
            (
                format!(" {} ({}) ", tab.title, tab.sections.len()),
                Style::default().fg(theme.fg),
            )
        } else {
            (
                format!(" {} (locked) ", tab.title),
                Style::default().fg(theme.disabled),
            )
        };

        let width = label.width() as u16;
        if x + width > area.right() {
            break;
        }
        hit.push((index, Rect::new(x, area.y, width, 1)));
        x += width + 1;
        spans.push(Span::styled(label, style));
        spans.push(Span::raw(" "));
    }

    frame.render_widget(Paragraph::new(Line::from(spans)), area);
    hit
}

fn render_sections(
    frame: &mut Frame<'_>,
    area: Rect,
    page: &ClaimPage,
    theme: &Theme,
) -> Vec<(SectionId, Rect)> {
    let mut hit = Vec::new();
    let mut y = area.y;

    for id in page.visible_sections() {
        let Some(height) = page.with_section(id, |section| section.fields().len() as u16 + 2)
        else {
            continue;
        };
        if y >= area.bottom() {
            break;
        }
        let card = Rect::new(area.x, y, area.width, height.min(area.bottom() - y));
        y += card.height;

        let selected = page.selected_section() == Some(id);
        let editing = page.edit().is_active(id);
        page.with_section(id, |section| {
            render_section_card(frame, card, section, theme, selected, editing)
        });
        hit.push((id.clone(), card));
    }
    hit
}

fn render_section_card(
    frame: &mut Frame<'_>,
    area: Rect,
    section: &FormSection,
    theme: &Theme,
    selected: bool,
    editing: bool,
) {
    let border = if editing {
        theme.edit_border
    } else if selected {
        theme.accented_fg
    } else {
        theme.disabled
    };
    let mut title = format!(" {} ", section.title());
    if editing {
        title.push_str(if section.is_dirty() {
            "[editing, modified] "
        } else {
            "[editing] "
        });
    }

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(border))
        .title(Span::styled(title, Style::default().add_modifier(Modifier::BOLD)));
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let value_width = inner.width.saturating_sub(FIELD_LABEL_WIDTH) as usize;
    let lines: Vec<Line> = section
        .fields()
        .iter()
        .enumerate()
        .map(|(index, spec)| {
            let marker = if spec.required { "*" } else { " " };
            let label = truncate_to_width(
                &format!("{}{}", spec.label, marker),
                FIELD_LABEL_WIDTH as usize - 1,
            );
            let label = format!("{:<width$} ", label, width = FIELD_LABEL_WIDTH as usize - 1);

            let value = section.draft_value(&spec.key);
            let mut text = match (spec.kind, value.is_empty()) {
                (FieldKind::Flag, true) => "no".to_string(),
                (_, true) => "-".to_string(),
                _ => value.to_string(),
            };

            let on_cursor = editing && index == section.cursor();
            if on_cursor && spec.kind != FieldKind::Flag {
                if value.is_empty() {
                    text.clear();
                }
                text.push('_');
            }

            let changed = !values_equal(value, section.saved_value(&spec.key));
            let value_style = if on_cursor {
                Style::default().bg(theme.selected_bg).fg(theme.selected_fg)
            } else if editing && changed {
                Style::default().fg(theme.modified)
            } else {
                Style::default().fg(theme.fg)
            };

            Line::from(vec![
                Span::styled(label, Style::default().fg(theme.disabled)),
                Span::styled(truncate_to_width(&text, value_width), value_style),
            ])
        })
        .collect();

    frame.render_widget(Paragraph::new(lines), inner);
}

fn render_status_line(frame: &mut Frame<'_>, area: Rect, page: &ClaimPage, theme: &Theme) {
    let base = Style::default().bg(theme.accented_bg).fg(theme.accented_fg);
    let mut spans = vec![Span::styled(
        format!(" {} ", page.phase().label()),
        base.add_modifier(Modifier::BOLD),
    )];

    if let Some(id) = page.edit().active_component() {
        if let Some(title) = page.with_section(&id, |s| s.title().to_string()) {
            spans.push(Span::styled(format!("| {} ", title), base));
        }
        if page.active_is_dirty() {
            spans.push(Span::styled("| modified ", base.fg(theme.modified)));
        }
    }

    if let Some((message, kind)) = page.status() {
        let color = match kind {
            StatusKind::Info => theme.accented_fg,
            StatusKind::Success => theme.success,
            StatusKind::Error => theme.error,
        };
        spans.push(Span::styled(format!("| {} ", message), base.fg(color)));
    }

    frame.render_widget(Paragraph::new(Line::from(spans)).style(base), area);
}

fn render_log_strip(frame: &mut Frame<'_>, area: Rect, theme: &Theme) {
    let lines: Vec<Line> = logger::recent_entries(area.height as usize)
        .into_iter()
        .map(|entry| {
            let color = match entry.level {
                LogLevel::Debug => theme.disabled,
                LogLevel::Info => theme.fg,
                LogLevel::Warn => theme.warning,
                LogLevel::Error => theme.error,
            };
            Line::from(vec![
                Span::styled(
                    format!("{} {:<5} ", entry.timestamp, entry.level.to_str()),
                    Style::default().fg(theme.disabled),
                ),
                Span::styled(entry.message, Style::default().fg(color)),
            ])
        })
        .collect();
    frame.render_widget(Paragraph::new(lines), area);
}
