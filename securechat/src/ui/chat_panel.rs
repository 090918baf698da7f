//! Chat panel rendering (message list + input box).

use ratatui::{
    Frame,
    layout::{Constraint, Direction, Layout, Rect},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, ListState, Paragraph},
};

use super::theme;
use crate::app::App;
use crate::view::RenderedMessage;

/// Render the chat panel (messages + input box).
pub fn render(frame: &mut Frame, area: Rect, app: &App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(3), Constraint::Length(3)])
        .split(area);

    render_messages(frame, chunks[0], app);
    render_input(frame, chunks[1], app);
}

/// A message as a two-line list item: label, then body.
fn message_item(msg: &RenderedMessage) -> ListItem<'_> {
    let body_style = if msg.decryption_failed {
        theme::decryption_failed()
    } else {
        theme::normal()
    };

    ListItem::new(vec![
        Line::from(Span::styled(msg.label.as_str(), theme::slot_label(msg.slot))),
        Line::from(Span::styled(msg.text.as_str(), body_style)),
    ])
}

/// Render the message list, keeping the scrolled-to item in view.
fn render_messages(frame: &mut Frame, area: Rect, app: &App) {
    let view = app.view().lock();
    let messages = &view.messages;

    let items: Vec<ListItem> = messages.items().iter().map(message_item).collect();

    let title = format!(" Chat ({}) ", messages.len());
    let block = Block::default()
        .title(Span::styled(title, theme::panel_title(theme::CHAT_TITLE)))
        .borders(Borders::ALL)
        .border_style(theme::normal());

    let mut state = ListState::default();
    if !messages.is_empty() {
        state.select(Some(messages.scroll()));
    }

    frame.render_stateful_widget(List::new(items).block(block), area, &mut state);
}

/// Render the input box.
fn render_input(frame: &mut Frame, area: Rect, app: &App) {
    let cursor = app.cursor();
    let input = app.view().lock().input.clone();

    let input_line = if input.is_empty() {
        Line::from(vec![
            Span::styled("█", theme::bold()),
            Span::styled("Type a message...", theme::dimmed()),
        ])
    } else {
        let split = input
            .char_indices()
            .nth(cursor)
            .map_or(input.len(), |(i, _)| i);
        let (before, after) = input.split_at(split);
        Line::from(vec![
            Span::styled(before.to_string(), theme::normal()),
            Span::styled("█", theme::bold()),
            Span::styled(after.to_string(), theme::normal()),
        ])
    };

    let block = Block::default()
        .title("Input")
        .borders(Borders::ALL)
        .border_style(theme::highlighted());

    frame.render_widget(Paragraph::new(input_line).block(block), area);
}
