use crate::client::app::{App, ChatLine};
use crate::protocol::{RenderedRow, NOTICE_USERNAME};
use crate::session::StatusClass;
use ratatui::{
    layout::{Constraint, Direction, Layout, Position, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, Paragraph},
    Frame,
};

const HELP_LINE: &str = "Enter send · Ctrl+S send · PgUp/PgDn scroll · Esc quit";

pub fn draw(f: &mut Frame, app: &App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1), // Status bar
            Constraint::Min(0),    // Connect form or chats
            Constraint::Length(2), // Input
            Constraint::Length(1), // Help
        ])
        .split(f.area());

    draw_status_bar(f, app, chunks[0]);

    if app.connect_form_visible {
        draw_connect_form(f, app, chunks[1]);
    } else if app.chat_visible {
        draw_chats(f, app, chunks[1]);
        draw_input(f, app, chunks[2]);
    } else {
        let p = Paragraph::new("Waiting for the server...")
            .style(Style::default().fg(Color::DarkGray));
        f.render_widget(p, chunks[1]);
    }

    f.render_widget(
        Paragraph::new(HELP_LINE).style(Style::default().fg(Color::DarkGray)),
        chunks[3],
    );
}

fn status_style(class: StatusClass) -> Style {
    match class {
        StatusClass::Disconnected => Style::default().fg(Color::Gray),
        StatusClass::Connecting => Style::default().fg(Color::Yellow),
        StatusClass::Connected => Style::default().fg(Color::Green),
        StatusClass::Error => Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
    }
}

fn draw_status_bar(f: &mut Frame, app: &App, area: Rect) {
    let mut spans = vec![
        Span::styled(" wschat ", Style::default().fg(Color::Black).bg(Color::Blue)),
        Span::raw(format!(" {} ({}) ", app.endpoint, app.protocol)),
    ];

    if !app.status.is_empty() {
        spans.push(Span::styled(app.status.clone(), status_style(app.status_class)));
    }

    if app.is_scrolled() {
        spans.push(Span::styled(" ↑ SCROLLED", Style::default().fg(Color::Yellow)));
    }

    f.render_widget(Paragraph::new(Line::from(spans)), area);
}

fn draw_connect_form(f: &mut Frame, app: &App, area: Rect) {
    let width = area.width.saturating_sub(4).min(50);
    let form_area = Rect::new(
        area.x + (area.width.saturating_sub(width)) / 2,
        area.y + area.height.saturating_sub(3) / 2,
        width,
        area.height.min(3),
    );

    let block = Block::default()
        .title("Start chatting")
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Blue));
    let inner_area = block.inner(form_area);
    f.render_widget(block, form_area);

    let label = "Username: ";
    let p = Paragraph::new(format!("{}{}", label, app.username_editor.content()));
    f.render_widget(p, inner_area);

    let col = cursor_column(
        inner_area,
        &format!("{}{}", label, app.username_editor.before_cursor()),
    );
    f.set_cursor_position(Position::new(col, inner_area.y));
}

fn chat_line(line: &ChatLine, show_timestamps: bool) -> Line<'static> {
    match &line.row {
        RenderedRow::Cells {
            datetime,
            username,
            message,
        } => {
            let mut spans = Vec::new();
            if show_timestamps {
                spans.push(Span::styled(
                    format!("[{}] ", datetime),
                    Style::default().fg(Color::DarkGray),
                ));
            }
            let name_style = if username == NOTICE_USERNAME {
                Style::default().fg(Color::Yellow).add_modifier(Modifier::ITALIC)
            } else {
                Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD)
            };
            spans.push(Span::styled(username.clone(), name_style));
            spans.push(Span::raw(" "));
            spans.push(Span::raw(message.clone()));
            Line::from(spans)
        }
        RenderedRow::Fragment(markup) => {
            let mut spans = Vec::new();
            if show_timestamps {
                spans.push(Span::styled(
                    format!("[{}] ", line.received_at.format("%H:%M:%S")),
                    Style::default().fg(Color::DarkGray),
                ));
            }
            spans.push(Span::raw(markup.clone()));
            Line::from(spans)
        }
    }
}

fn draw_chats(f: &mut Frame, app: &App, area: Rect) {
    let block = Block::default()
        .borders(Borders::ALL)
        .title("Chats")
        .border_style(Style::default().fg(Color::DarkGray));

    let inner_area = block.inner(area);
    f.render_widget(block, area);

    let height = inner_area.height as usize;
    let end_index = app.rows.len().saturating_sub(app.scroll_offset);
    let start_index = end_index.saturating_sub(height);

    let items: Vec<ListItem> = app.rows[start_index..end_index]
        .iter()
        .map(|line| ListItem::new(chat_line(line, app.show_timestamps)))
        .collect();

    f.render_widget(List::new(items), inner_area);
}

fn draw_input(f: &mut Frame, app: &App, area: Rect) {
    let block = Block::default()
        .borders(Borders::TOP)
        .border_style(Style::default().fg(Color::DarkGray));

    let inner_area = block.inner(area);
    f.render_widget(block, area);

    let prompt = "❯ ";
    let paragraph = Paragraph::new(format!("{}{}", prompt, app.chat_editor.content()))
        .style(Style::default().fg(Color::White));
    f.render_widget(paragraph, inner_area);

    let col = cursor_column(
        inner_area,
        &format!("{}{}", prompt, app.chat_editor.before_cursor()),
    );
    f.set_cursor_position(Position::new(col, inner_area.y));
}

/// Column just after `before`, measured in terminal cells and kept inside `area`
fn cursor_column(area: Rect, before: &str) -> u16 {
    let width = u16::try_from(Span::raw(before).width()).unwrap_or(u16::MAX);
    area.x + width.min(area.width.saturating_sub(1))
}
