//! Theme and styling constants for the TUI.

use ratatui::style::{Color, Modifier, Style};

use crate::view::SLOT_COUNT;

/// Primary foreground color.
pub const FG_PRIMARY: Color = Color::White;

/// Secondary foreground color (dimmed text).
pub const FG_SECONDARY: Color = Color::Gray;

/// Highlight color for the focused input border.
pub const HIGHLIGHT: Color = Color::Cyan;

/// Switch-on indicator color.
pub const SUCCESS: Color = Color::Green;

/// Switch-off indicator color.
pub const DISABLED: Color = Color::DarkGray;

/// Error color (decryption failures, missing session values).
pub const ERROR: Color = Color::Red;

/// Label colors for the alternating message slots.
pub const SLOT_COLORS: [Color; SLOT_COUNT] = [Color::Cyan, Color::Green, Color::Magenta];

/// Panel title color for the chat panel.
pub const CHAT_TITLE: Color = Color::Cyan;

/// Normal text style.
#[must_use]
pub fn normal() -> Style {
    Style::default().fg(FG_PRIMARY)
}

/// Dimmed text style (key help, placeholders).
#[must_use]
pub fn dimmed() -> Style {
    Style::default().fg(FG_SECONDARY)
}

/// Bold text style.
#[must_use]
pub fn bold() -> Style {
    Style::default().fg(FG_PRIMARY).add_modifier(Modifier::BOLD)
}

/// Highlighted text style (focused panel borders).
#[must_use]
pub fn highlighted() -> Style {
    Style::default().fg(HIGHLIGHT).add_modifier(Modifier::BOLD)
}

/// Style for a message label in display slot `slot` (1-based).
#[must_use]
pub fn slot_label(slot: usize) -> Style {
    let color = SLOT_COLORS[slot.saturating_sub(1) % SLOT_COLORS.len()];
    Style::default().fg(color).add_modifier(Modifier::BOLD)
}

/// Style for a message body that could not be decrypted.
#[must_use]
pub fn decryption_failed() -> Style {
    Style::default().fg(ERROR).add_modifier(Modifier::ITALIC)
}

/// Style for a switch indicator.
#[must_use]
pub fn switch_state(enabled: bool) -> Style {
    Style::default().fg(if enabled { SUCCESS } else { DISABLED })
}

/// Style for the status bar background (dark background with white foreground).
#[must_use]
pub fn status_bar_bg() -> Style {
    Style::default().fg(Color::White).bg(Color::Rgb(30, 30, 50))
}

/// Style for panel titles with a given color (bold).
#[must_use]
pub fn panel_title(color: Color) -> Style {
    Style::default().fg(color).add_modifier(Modifier::BOLD)
}
