//! # ChatInput Component
//!
//! Bottom of the chat pane. Its behavior depends on the input mode:
//!
//! - **Text**: a single-line editor. Enter submits non-blank text and clears
//!   the buffer.
//! - **Audio**: a record button. Enter starts a simulated recording; the
//!   transcript arrives later as a submitted query.
//!
//! `mode`, `disabled`, `recording` and `focused` are props synced from the
//! store and `TuiState` every frame. The buffer and cursor are internal.
//! While disabled (no user selected, or a reply pending) the buffer stays
//! editable but nothing is submitted.

use ratatui::Frame;
use ratatui::layout::{Alignment, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::widgets::{Block, BorderType, Paragraph};
use unicode_width::UnicodeWidthStr;

use crate::core::model::InputMode;
use crate::tui::component::{Component, EventHandler};
use crate::tui::components::pane_border_style;
use crate::tui::event::TuiEvent;

const PLACEHOLDER: &str = "Type your message...";

/// High-level events emitted by the ChatInput
#[derive(Debug, Clone, PartialEq)]
pub enum InputEvent {
    /// User submitted the text (Enter pressed in text mode)
    Submit(String),
    /// User pressed the record button (Enter in audio mode)
    StartRecording,
    /// Text content or cursor changed
    ContentChanged,
}

pub struct ChatInput {
    /// Text buffer (Internal State)
    pub buffer: String,
    /// Cursor as byte offset into `buffer`
    cursor: usize,
    pub mode: InputMode,
    pub disabled: bool,
    pub recording: bool,
    pub focused: bool,
}

impl ChatInput {
    pub fn new(mode: InputMode) -> Self {
        Self {
            buffer: String::new(),
            cursor: 0,
            mode,
            disabled: false,
            recording: false,
            focused: false,
        }
    }

    fn insert_str(&mut self, text: &str) {
        self.buffer.insert_str(self.cursor, text);
        self.cursor += text.len();
    }

    fn prev_boundary(&self) -> usize {
        self.buffer[..self.cursor]
            .char_indices()
            .next_back()
            .map(|(i, _)| i)
            .unwrap_or(0)
    }

    fn next_boundary(&self) -> usize {
        self.buffer[self.cursor..]
            .chars()
            .next()
            .map(|c| self.cursor + c.len_utf8())
            .unwrap_or(self.buffer.len())
    }

    /// First visible byte and the cursor column, keeping the cursor inside
    /// `width` columns.
    fn visible_window(&self, width: usize) -> (usize, u16) {
        let mut start = 0;
        while start < self.cursor && self.buffer[start..self.cursor].width() >= width.max(1) {
            start += self.buffer[start..]
                .chars()
                .next()
                .map(char::len_utf8)
                .unwrap_or(1);
        }
        let column = self.buffer[start..self.cursor].width() as u16;
        (start, column)
    }

    fn handle_text_event(&mut self, event: &TuiEvent) -> Option<InputEvent> {
        match event {
            TuiEvent::InputChar(c) => {
                let mut encoded = [0u8; 4];
                self.insert_str(c.encode_utf8(&mut encoded));
                Some(InputEvent::ContentChanged)
            }
            TuiEvent::Paste(text) => {
                // Single-line input: fold newlines into spaces
                let flattened = text.replace(['\r', '\n'], " ");
                self.insert_str(&flattened);
                Some(InputEvent::ContentChanged)
            }
            TuiEvent::Backspace => {
                if self.cursor == 0 {
                    return None;
                }
                let prev = self.prev_boundary();
                self.buffer.drain(prev..self.cursor);
                self.cursor = prev;
                Some(InputEvent::ContentChanged)
            }
            TuiEvent::CursorLeft => (self.cursor > 0).then(|| {
                self.cursor = self.prev_boundary();
                InputEvent::ContentChanged
            }),
            TuiEvent::CursorRight => (self.cursor < self.buffer.len()).then(|| {
                self.cursor = self.next_boundary();
                InputEvent::ContentChanged
            }),
            TuiEvent::Submit => {
                if self.disabled || self.buffer.trim().is_empty() {
                    return None;
                }
                let text = std::mem::take(&mut self.buffer);
                self.cursor = 0;
                Some(InputEvent::Submit(text))
            }
            _ => None,
        }
    }

    fn render_text(&self, frame: &mut Frame, area: Rect, block: Block) {
        let inner = block.inner(area);
        if self.buffer.is_empty() {
            let placeholder = Paragraph::new(PLACEHOLDER)
                .style(Style::default().fg(Color::DarkGray))
                .block(block);
            frame.render_widget(placeholder, area);
        } else {
            let (start, _) = self.visible_window(inner.width as usize);
            let style = if self.disabled {
                Style::default().add_modifier(Modifier::DIM)
            } else {
                Style::default().fg(Color::White)
            };
            let input = Paragraph::new(&self.buffer[start..])
                .style(style)
                .block(block);
            frame.render_widget(input, area);
        }

        if self.focused && inner.width > 0 {
            let (_, column) = self.visible_window(inner.width as usize);
            frame.set_cursor_position((inner.x + column.min(inner.width - 1), inner.y));
        }
    }

    fn render_audio(&self, frame: &mut Frame, area: Rect, block: Block) {
        let (text, style) = if self.recording {
            (
                "● Recording... (simulated)",
                Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
            )
        } else if self.disabled {
            ("Press Enter to record", Style::default().add_modifier(Modifier::DIM))
        } else {
            ("Press Enter to record", Style::default().fg(Color::Magenta))
        };
        let button = Paragraph::new(text)
            .style(style)
            .alignment(Alignment::Center)
            .block(block);
        frame.render_widget(button, area);
    }
}

impl Component for ChatInput {
    fn render(&mut self, frame: &mut Frame, area: Rect) {
        let title = match self.mode {
            InputMode::Text => " Message · Ctrl+T voice ",
            InputMode::Audio => " Voice · Ctrl+T text ",
        };
        let block = Block::bordered()
            .border_type(BorderType::Rounded)
            .title(title)
            .border_style(pane_border_style(self.focused));

        match self.mode {
            InputMode::Text => self.render_text(frame, area, block),
            InputMode::Audio => self.render_audio(frame, area, block),
        }
    }
}

impl EventHandler for ChatInput {
    type Event = InputEvent;

    fn handle_event(&mut self, event: &TuiEvent) -> Option<Self::Event> {
        match self.mode {
            InputMode::Text => self.handle_text_event(event),
            InputMode::Audio => match event {
                TuiEvent::Submit if !self.disabled && !self.recording => {
                    Some(InputEvent::StartRecording)
                }
                _ => None,
            },
        }
    }
}
