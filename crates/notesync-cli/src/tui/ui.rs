//! UI rendering

use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, List, ListItem, ListState, Paragraph, Wrap},
    Frame,
};

use notesync_core::Note;

use super::app::{App, Focus, LiveIndicator};

/// Main UI rendering function
pub fn draw(frame: &mut Frame, app: &App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Length(3),
            Constraint::Length(1),
            Constraint::Min(3),
            Constraint::Length(1),
        ])
        .split(frame.area());

    draw_input(frame, app, Focus::Name, chunks[0]);
    draw_input(frame, app, Focus::Description, chunks[1]);
    draw_create_hint(frame, app, chunks[2]);
    draw_notes(frame, app, chunks[3]);
    draw_status_bar(frame, app, chunks[4]);

    draw_live_indicator(frame, app);

    if app.show_help {
        draw_help_overlay(frame);
    }

    if let Some(notice) = &app.notice {
        draw_notice(frame, notice);
    }
}

/// Draw one form input
fn draw_input(frame: &mut Frame, app: &App, focus: Focus, area: Rect) {
    let Some(field) = focus.field() else {
        return;
    };
    let is_active = app.focus == focus;
    let value = app.state.form.get(field);

    let (title, placeholder) = match focus {
        Focus::Name => (" Name ", "Name"),
        _ => (" Description ", "Description"),
    };

    let border_style = if is_active {
        Style::default().add_modifier(Modifier::BOLD)
    } else {
        Style::default()
    };

    let block = Block::default()
        .title(title)
        .borders(Borders::ALL)
        .border_style(border_style);

    let content = if value.is_empty() && !is_active {
        Span::styled(placeholder, Style::default().add_modifier(Modifier::DIM))
    } else {
        Span::raw(value)
    };

    frame.render_widget(Paragraph::new(content).block(block), area);

    if is_active {
        let max_x = area.x + area.width.saturating_sub(2);
        let cursor_x = (area.x + 1 + value.chars().count() as u16).min(max_x);
        frame.set_cursor_position((cursor_x, area.y + 1));
    }
}

/// Draw the create action line under the form
fn draw_create_hint(frame: &mut Frame, app: &App, area: Rect) {
    let style = if app.focus == Focus::List {
        Style::default().add_modifier(Modifier::DIM)
    } else {
        Style::default().fg(Color::Cyan)
    };

    let line = Line::from(vec![
        Span::styled(" [Enter] Create Note", style),
        Span::styled(
            "   Tab: next field",
            Style::default().add_modifier(Modifier::DIM),
        ),
    ]);

    frame.render_widget(Paragraph::new(line), area);
}

/// Draw the note list
fn draw_notes(frame: &mut Frame, app: &App, area: Rect) {
    let is_active = app.focus == Focus::List;
    let state = &app.state;

    let title = if state.loading {
        " Notes (loading...) ".to_string()
    } else {
        format!(" Notes ({}) ", state.notes.len())
    };

    let border_style = if is_active {
        Style::default().add_modifier(Modifier::BOLD)
    } else {
        Style::default()
    };

    let block = Block::default()
        .title(title)
        .borders(Borders::ALL)
        .border_style(border_style);

    if state.notes.is_empty() {
        let message = if state.error {
            Span::styled(
                "Could not load notes. Press r to retry.",
                Style::default().fg(Color::Red),
            )
        } else if state.loading {
            Span::styled("Loading...", Style::default().add_modifier(Modifier::DIM))
        } else {
            Span::styled("No notes yet", Style::default().add_modifier(Modifier::DIM))
        };
        frame.render_widget(Paragraph::new(message).block(block), area);
        return;
    }

    let items: Vec<ListItem> = state.notes.iter().map(note_item).collect();

    let highlight_style = if is_active {
        Style::default()
            .add_modifier(Modifier::BOLD)
            .add_modifier(Modifier::REVERSED)
    } else {
        Style::default()
    };

    let list = List::new(items)
        .block(block)
        .highlight_style(highlight_style);

    let mut list_state = ListState::default();
    list_state.select(Some(app.selected));

    frame.render_stateful_widget(list, area, &mut list_state);
}

fn note_item(note: &Note) -> ListItem<'_> {
    let (label, label_style) = if note.completed {
        ("completed", Style::default().fg(Color::Green))
    } else {
        ("mark completed", Style::default().add_modifier(Modifier::DIM))
    };

    let title = Line::from(vec![
        Span::styled(&note.name, Style::default().add_modifier(Modifier::BOLD)),
        Span::raw("  "),
        Span::styled(format!("[{}]", label), label_style),
    ]);

    let description = Line::from(vec![Span::styled(
        &note.description,
        Style::default().add_modifier(Modifier::DIM),
    )]);

    ListItem::new(vec![title, description])
}

/// Draw the status bar at the bottom
fn draw_status_bar(frame: &mut Frame, app: &App, area: Rect) {
    let content = if let Some(msg) = &app.status_message {
        msg.clone()
    } else if app.focus == Focus::List {
        "space:toggle  d:delete  r:reload  n:new  ?:help  q:quit".to_string()
    } else {
        "enter:create  tab:next  esc:list  ctrl-c:quit".to_string()
    };

    let paragraph = Paragraph::new(content).style(Style::default().add_modifier(Modifier::DIM));

    frame.render_widget(paragraph, area);
}

/// Draw the real-time indicator in the top-right corner
fn draw_live_indicator(frame: &mut Frame, app: &App) {
    let area = frame.area();
    if area.width < 5 {
        return;
    }

    let (icon, style) = match app.live {
        LiveIndicator::Live => ("●", Style::default().fg(Color::Green)),
        LiveIndicator::Connecting => ("↻", Style::default().fg(Color::Yellow)),
        LiveIndicator::Offline => ("⚡", Style::default().fg(Color::DarkGray)),
        LiveIndicator::Off => ("○", Style::default().add_modifier(Modifier::DIM)),
    };

    let indicator = Paragraph::new(Span::styled(icon, style));
    let indicator_area = Rect::new(area.width - 2, 0, 1, 1);
    frame.render_widget(indicator, indicator_area);
}

/// Centered popup area
fn popup_area(area: Rect, width: u16, height: u16) -> Rect {
    let popup_width = width.min(area.width.saturating_sub(4));
    let popup_height = height.min(area.height.saturating_sub(4));
    let popup_x = (area.width.saturating_sub(popup_width)) / 2;
    let popup_y = (area.height.saturating_sub(popup_height)) / 2;
    Rect::new(popup_x, popup_y, popup_width, popup_height)
}

/// Draw a blocking notice
fn draw_notice(frame: &mut Frame, message: &str) {
    let area = popup_area(frame.area(), 50, 7);
    frame.render_widget(Clear, area);

    let text = vec![
        Line::from(message),
        Line::from(""),
        Line::from(vec![Span::styled(
            "Press any key to continue",
            Style::default().add_modifier(Modifier::DIM),
        )]),
    ];

    let block = Block::default()
        .title(" Notice ")
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Yellow));

    let paragraph = Paragraph::new(text)
        .block(block)
        .wrap(Wrap { trim: true });
    frame.render_widget(paragraph, area);
}

/// Draw help overlay
fn draw_help_overlay(frame: &mut Frame) {
    let area = popup_area(frame.area(), 50, 18);
    frame.render_widget(Clear, area);

    let help_text = vec![
        Line::from(vec![Span::styled(
            "Keyboard Shortcuts",
            Style::default().add_modifier(Modifier::BOLD),
        )]),
        Line::from(""),
        Line::from("Form:"),
        Line::from("  Tab/S-Tab   Next/previous field"),
        Line::from("  Enter       Create note"),
        Line::from("  Esc         Go to list"),
        Line::from(""),
        Line::from("List:"),
        Line::from("  j/k, ↑/↓    Move up/down"),
        Line::from("  Space       Toggle completed"),
        Line::from("  d           Delete note"),
        Line::from("  r           Reload notes"),
        Line::from("  n           New note"),
        Line::from("  q           Quit"),
        Line::from(""),
        Line::from(vec![Span::styled(
            "Press any key to close",
            Style::default().add_modifier(Modifier::DIM),
        )]),
    ];

    let block = Block::default()
        .title(" Help ")
        .borders(Borders::ALL)
        .border_style(Style::default().add_modifier(Modifier::BOLD));

    let paragraph = Paragraph::new(help_text).block(block);
    frame.render_widget(paragraph, area);
}
