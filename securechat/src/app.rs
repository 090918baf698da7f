//! Application state and event handling.
//!
//! The compose input lives in the [`SharedView`] so the sync loop can clear
//! it after a successful send; [`App`] keeps only the cursor and the
//! front-end flags. Actions that need the network are returned to the event
//! loop as [`AppCommand`]s instead of being performed here.

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use securechat_proto::switch::{FeatureSwitch, SwitchUpdate};

use crate::session::SessionContext;
use crate::view::SharedView;

/// Number of items PageUp/PageDown move by.
const PAGE_SCROLL: usize = 10;

/// Work the event loop should start after a key press.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppCommand {
    /// Submit the current compose input.
    SendMessage,
    /// Post a feature switch state.
    UpdateSwitch(SwitchUpdate),
}

/// Main application state.
pub struct App {
    view: SharedView,
    session: SessionContext,
    /// Cursor position in the input (character index).
    pub cursor_position: usize,
    /// Whether the app should quit.
    pub should_quit: bool,
    /// Last requested SSH switch state.
    pub ssh_enabled: bool,
    /// Last requested encryption switch state.
    pub encryption_switch: bool,
}

impl App {
    /// Create the application state for `session`, drawing from `view`.
    #[must_use]
    pub const fn new(view: SharedView, session: SessionContext) -> Self {
        Self {
            view,
            session,
            cursor_position: 0,
            should_quit: false,
            ssh_enabled: false,
            encryption_switch: false,
        }
    }

    /// The shared chat view.
    #[must_use]
    pub const fn view(&self) -> &SharedView {
        &self.view
    }

    /// The session shown in the status bar.
    #[must_use]
    pub const fn session(&self) -> &SessionContext {
        &self.session
    }

    /// Cursor position clamped to the current input.
    ///
    /// The input can shrink underneath the cursor when a send clears it.
    #[must_use]
    pub fn cursor(&self) -> usize {
        self.cursor_position.min(self.input_len())
    }

    fn input_len(&self) -> usize {
        self.view.lock().input.chars().count()
    }

    /// Handle a key event, returning any work for the event loop.
    pub fn handle_key_event(&mut self, key: KeyEvent) -> Option<AppCommand> {
        match (key.code, key.modifiers) {
            (KeyCode::Char('c'), KeyModifiers::CONTROL) | (KeyCode::Esc, _) => {
                self.should_quit = true;
                None
            }
            (KeyCode::Char('s'), KeyModifiers::CONTROL) => {
                self.ssh_enabled = !self.ssh_enabled;
                Some(AppCommand::UpdateSwitch(
                    FeatureSwitch::Ssh.update(self.ssh_enabled),
                ))
            }
            (KeyCode::Char('e'), KeyModifiers::CONTROL) => {
                self.encryption_switch = !self.encryption_switch;
                Some(AppCommand::UpdateSwitch(
                    FeatureSwitch::Encryption.update(self.encryption_switch),
                ))
            }
            // Empty input is sent too; the server decides what to keep.
            (KeyCode::Enter, _) => Some(AppCommand::SendMessage),
            // Unbound Ctrl chords are not text.
            (KeyCode::Char(_), modifiers) if modifiers.contains(KeyModifiers::CONTROL) => None,
            _ => {
                self.handle_edit_key(key);
                None
            }
        }
    }

    fn handle_edit_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Char(c) => self.enter_char(c),
            KeyCode::Backspace => self.delete_char(),
            KeyCode::Left => self.cursor_position = self.cursor().saturating_sub(1),
            KeyCode::Right => self.cursor_position = (self.cursor() + 1).min(self.input_len()),
            KeyCode::Home => self.cursor_position = 0,
            KeyCode::End => self.cursor_position = self.input_len(),
            KeyCode::Up => self.view.lock().messages.scroll_up(1),
            KeyCode::Down => self.view.lock().messages.scroll_down(1),
            KeyCode::PageUp => self.view.lock().messages.scroll_up(PAGE_SCROLL),
            KeyCode::PageDown => self.view.lock().messages.scroll_down(PAGE_SCROLL),
            _ => {}
        }
    }

    /// Insert a character at the cursor position.
    fn enter_char(&mut self, c: char) {
        let cursor = self.cursor();
        let mut view = self.view.lock();
        let at = byte_index(&view.input, cursor);
        view.input.insert(at, c);
        drop(view);
        self.cursor_position = cursor + 1;
    }

    /// Delete the character before the cursor.
    fn delete_char(&mut self) {
        let cursor = self.cursor();
        if cursor == 0 {
            return;
        }
        let mut view = self.view.lock();
        let at = byte_index(&view.input, cursor - 1);
        view.input.remove(at);
        drop(view);
        self.cursor_position = cursor - 1;
    }
}

/// Byte offset of the `char_index`th character, or the end of `s`.
fn byte_index(s: &str, char_index: usize) -> usize {
    s.char_indices().nth(char_index).map_or(s.len(), |(i, _)| i)
}
