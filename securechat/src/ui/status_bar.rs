//! Status bar rendering.

use ratatui::{
    Frame,
    layout::Rect,
    text::{Line, Span},
    widgets::Paragraph,
};

use super::theme;
use crate::app::App;

const HELP_TEXT: &str =
    "Enter: send | ↑↓/PgUp/PgDn: scroll | Ctrl-S: SSH | Ctrl-E: encryption | Esc: quit";

/// Render the two-line status bar: session details, then switches and help.
pub fn render(frame: &mut Frame, area: Rect, app: &App) {
    let session = app.session();

    let username_style = if session.username().is_some() {
        theme::bold()
    } else {
        theme::normal().fg(theme::ERROR)
    };
    let key_style = if session.encryption_key().is_some() {
        theme::normal()
    } else {
        theme::normal().fg(theme::ERROR)
    };

    let session_line = Line::from(vec![
        Span::styled(session.username_display(), username_style),
        Span::raw(" | "),
        Span::styled(session.key_display(), key_style),
    ]);

    let switch_line = Line::from(vec![
        Span::styled("●", theme::switch_state(app.ssh_enabled)),
        Span::raw(format!(" SSH {}", on_off(app.ssh_enabled))),
        Span::raw(" | "),
        Span::styled("●", theme::switch_state(app.encryption_switch)),
        Span::raw(format!(" Encryption {}", on_off(app.encryption_switch))),
        Span::raw(" | "),
        Span::styled(HELP_TEXT, theme::dimmed()),
    ]);

    let paragraph = Paragraph::new(vec![session_line, switch_line]).style(theme::status_bar_bg());
    frame.render_widget(paragraph, area);
}

const fn on_off(enabled: bool) -> &'static str {
    if enabled { "on" } else { "off" }
}
