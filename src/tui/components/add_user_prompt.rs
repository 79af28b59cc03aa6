//! # Add-User Prompt
//!
//! Small centered overlay for adding a user to the selected company.
//! Opened with Ctrl+N, dismissed with Esc. The entry is a user number; the
//! new user is named `user <entry>`.
//!
//! Follows the persistent state + transient wrapper pattern:
//! - `AddUserPromptState` lives in `TuiState` while the prompt is open
//! - `AddUserPrompt` is created each frame with borrowed state

use ratatui::Frame;
use ratatui::layout::{Alignment, Constraint, Layout, Rect};
use ratatui::style::{Color, Style};
use ratatui::text::Line;
use ratatui::widgets::{Block, Borders, Clear, Padding, Paragraph};
use unicode_width::UnicodeWidthStr;

use crate::tui::event::TuiEvent;

/// Persistent state for the add-user overlay.
pub struct AddUserPromptState {
    pub company_name: String,
    pub buffer: String,
}

/// Events emitted by the add-user prompt.
#[derive(Debug, Clone, PartialEq)]
pub enum AddUserEvent {
    /// Add a user with this display name.
    Submit(String),
    Cancel,
}

impl AddUserPromptState {
    pub fn new(company_name: impl Into<String>) -> Self {
        Self {
            company_name: company_name.into(),
            buffer: String::new(),
        }
    }

    /// Handle a key event, returning an AddUserEvent if the overlay should act.
    pub fn handle_event(&mut self, event: &TuiEvent) -> Option<AddUserEvent> {
        match event {
            TuiEvent::Escape => Some(AddUserEvent::Cancel),
            TuiEvent::InputChar(c) => {
                self.buffer.push(*c);
                None
            }
            TuiEvent::Paste(text) => {
                self.buffer.push_str(text.lines().next().unwrap_or(""));
                None
            }
            TuiEvent::Backspace => {
                self.buffer.pop();
                None
            }
            TuiEvent::Submit => {
                let entry = self.buffer.trim();
                (!entry.is_empty()).then(|| AddUserEvent::Submit(format!("user {entry}")))
            }
            _ => None,
        }
    }
}

/// Transient render wrapper for the add-user overlay.
pub struct AddUserPrompt<'a> {
    state: &'a AddUserPromptState,
}

impl<'a> AddUserPrompt<'a> {
    pub fn new(state: &'a AddUserPromptState) -> Self {
        Self { state }
    }

    pub fn render(&self, frame: &mut Frame, area: Rect) {
        let overlay = centered_rect(50, 5, area);

        // Clear underlying content
        frame.render_widget(Clear, overlay);

        let block = Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::Cyan))
            .title(format!(" Add user to {} ", self.state.company_name))
            .title_alignment(Alignment::Left)
            .title_bottom(Line::from(" Enter Add  Esc Cancel ").centered())
            .padding(Padding::horizontal(1));

        let inner = block.inner(overlay);
        let paragraph = if self.state.buffer.is_empty() {
            Paragraph::new("Enter number").style(Style::default().fg(Color::DarkGray))
        } else {
            Paragraph::new(self.state.buffer.as_str())
        };
        frame.render_widget(paragraph.block(block), overlay);

        if inner.width > 0 && inner.height > 0 {
            let column = (self.state.buffer.width() as u16).min(inner.width - 1);
            frame.set_cursor_position((inner.x + column, inner.y));
        }
    }
}

/// A rect `percent_x` wide and `height` rows tall, centered in `outer`.
fn centered_rect(percent_x: u16, height: u16, outer: Rect) -> Rect {
    let [_, center_v, _] = Layout::vertical([
        Constraint::Fill(1),
        Constraint::Length(height),
        Constraint::Fill(1),
    ])
    .areas(outer);
    let [_, center, _] = Layout::horizontal([
        Constraint::Percentage((100 - percent_x) / 2),
        Constraint::Percentage(percent_x),
        Constraint::Percentage((100 - percent_x) / 2),
    ])
    .areas(center_v);
    center
}

#[cfg(test)]
mod tests {
    use super::*;
    use ratatui::Terminal;
    use ratatui::backend::TestBackend;

    fn type_str(state: &mut AddUserPromptState, text: &str) {
        for c in text.chars() {
            state.handle_event(&TuiEvent::InputChar(c));
        }
    }

    #[test]
    fn test_submit_prefixes_user() {
        let mut state = AddUserPromptState::new("Company 1");
        type_str(&mut state, " 42 ");
        assert_eq!(
            state.handle_event(&TuiEvent::Submit),
            Some(AddUserEvent::Submit("user 42".to_string()))
        );
    }

    #[test]
    fn test_blank_entry_is_not_submitted() {
        let mut state = AddUserPromptState::new("Company 1");
        assert_eq!(state.handle_event(&TuiEvent::Submit), None);
        type_str(&mut state, "  ");
        assert_eq!(state.handle_event(&TuiEvent::Submit), None);
    }

    #[test]
    fn test_escape_cancels() {
        let mut state = AddUserPromptState::new("Company 1");
        assert_eq!(state.handle_event(&TuiEvent::Escape), Some(AddUserEvent::Cancel));
    }

    #[test]
    fn test_backspace_and_paste() {
        let mut state = AddUserPromptState::new("Company 1");
        state.handle_event(&TuiEvent::Paste("12\n34".to_string()));
        assert_eq!(state.buffer, "12");
        state.handle_event(&TuiEvent::Backspace);
        assert_eq!(state.buffer, "1");
    }

    #[test]
    fn test_render_shows_company_and_placeholder() {
        let backend = TestBackend::new(80, 20);
        let mut terminal = Terminal::new(backend).unwrap();
        let state = AddUserPromptState::new("Company 2");
        terminal
            .draw(|f| AddUserPrompt::new(&state).render(f, f.area()))
            .unwrap();

        let text: String = terminal
            .backend()
            .buffer()
            .content()
            .iter()
            .map(|c| c.symbol())
            .collect();
        assert!(text.contains("Add user to Company 2"));
        assert!(text.contains("Enter number"));
    }
}
