//! # ChatView Component
//!
//! Right pane: the selected user's history as chat bubbles. Queries sit on
//! the right, replies on the left, each titled with its local time.
//!
//! Follows the persistent state + transient wrapper pattern:
//! - `ChatViewState` lives in `TuiState` (scroll offset, what was last shown)
//! - `ChatView` is created each frame with borrowed state and props
//!
//! Bubble heights are predicted with `textwrap` (same options as ratatui's
//! `Paragraph` wrapping) so the scroll view can be sized before rendering.

use chrono::Local;
use ratatui::Frame;
use ratatui::buffer::Buffer;
use ratatui::layout::{Alignment, Rect, Size};
use ratatui::style::{Color, Modifier, Style};
use ratatui::widgets::{Block, BorderType, Padding, Paragraph, Widget, Wrap};
use tui_scrollview::{ScrollView, ScrollViewState, ScrollbarVisibility};

use crate::core::model::{Message, UserChatHistory};
use crate::tui::component::Component;
use crate::tui::event::TuiEvent;

/// Horizontal padding (per side) between the border and text content.
const CONTENT_PAD_H: u16 = 1;
/// Total horizontal space consumed by borders (1 left + 1 right) and padding.
const HORIZONTAL_OVERHEAD: u16 = 2 + CONTENT_PAD_H * 2;
/// Total vertical space consumed by borders (1 top + 1 bottom).
const VERTICAL_OVERHEAD: u16 = 2;
/// Bubbles take at most this share of the pane width.
const BUBBLE_WIDTH_PERCENT: u16 = 80;
/// Blank rows between bubbles.
const BUBBLE_GAP: u16 = 1;
/// Height cap of the scrollable content. Older bubbles beyond it are not shown.
const MAX_CONTENT_ROWS: u16 = 8192;

/// A single chat message rendered as a bordered bubble.
#[derive(Clone, Copy)]
pub struct Bubble<'a> {
    pub message: &'a Message,
}

impl<'a> Bubble<'a> {
    pub fn new(message: &'a Message) -> Self {
        Self { message }
    }

    /// Height of the bubble when rendered `width` columns wide.
    pub fn calculate_height(message: &Message, width: u16) -> u16 {
        let content_width = width.saturating_sub(HORIZONTAL_OVERHEAD);
        if content_width == 0 {
            return 1;
        }

        let content = message.content.trim();
        if content.is_empty() {
            return VERTICAL_OVERHEAD;
        }

        let options = textwrap::Options::new(content_width as usize)
            .break_words(true)
            .word_separator(textwrap::WordSeparator::AsciiSpace);
        let lines = textwrap::wrap(content, options);
        u16::try_from(lines.len())
            .unwrap_or(u16::MAX)
            .max(1)
            .saturating_add(VERTICAL_OVERHEAD)
    }

    fn time_label(message: &Message) -> String {
        message
            .timestamp
            .with_timezone(&Local)
            .format("%-I:%M %p")
            .to_string()
    }
}

impl Widget for Bubble<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let (label, color, alignment) = if self.message.is_query {
            ("you", Color::Cyan, Alignment::Right)
        } else {
            ("reply", Color::Green, Alignment::Left)
        };
        let title = format!(" {} · {} ", label, Bubble::time_label(self.message));

        let block = Block::bordered()
            .border_type(BorderType::Rounded)
            .border_style(Style::default().fg(color).add_modifier(Modifier::DIM))
            .title(title)
            .title_alignment(alignment)
            .padding(Padding::horizontal(CONTENT_PAD_H));

        Paragraph::new(self.message.content.trim())
            .block(block)
            .wrap(Wrap { trim: true })
            .render(area, buf);
    }
}

/// Persistent scroll state for the chat pane.
pub struct ChatViewState {
    pub scroll_state: ScrollViewState,
    /// (company, user, message count) shown last frame.
    last_shown: Option<(String, String, usize)>,
}

impl Default for ChatViewState {
    fn default() -> Self {
        Self::new()
    }
}

impl ChatViewState {
    pub fn new() -> Self {
        Self {
            scroll_state: ScrollViewState::default(),
            last_shown: None,
        }
    }

    /// Page-wise scrolling. Returns true if the event was consumed.
    pub fn handle_event(&mut self, event: &TuiEvent) -> bool {
        match event {
            TuiEvent::ScrollPageUp => {
                self.scroll_state.scroll_page_up();
                true
            }
            TuiEvent::ScrollPageDown => {
                self.scroll_state.scroll_page_down();
                true
            }
            _ => false,
        }
    }

    /// Jumps to the newest message whenever the user changes or the history grows.
    fn follow(&mut self, company_id: &str, user: &UserChatHistory) {
        let current = (
            company_id.to_string(),
            user.user_id.clone(),
            user.messages.len(),
        );
        if self.last_shown.as_ref() != Some(&current) {
            self.scroll_state.scroll_to_bottom();
            self.last_shown = Some(current);
        }
    }
}

/// Transient render wrapper for the chat pane.
pub struct ChatView<'a> {
    state: &'a mut ChatViewState,
    company_id: Option<&'a str>,
    user: Option<&'a UserChatHistory>,
}

impl<'a> ChatView<'a> {
    pub fn new(
        state: &'a mut ChatViewState,
        company_id: Option<&'a str>,
        user: Option<&'a UserChatHistory>,
    ) -> Self {
        Self {
            state,
            company_id,
            user,
        }
    }
}

fn placeholder(frame: &mut Frame, area: Rect, text: &str) {
    let paragraph = Paragraph::new(text)
        .style(Style::default().fg(Color::DarkGray))
        .alignment(Alignment::Center)
        .block(Block::bordered().border_type(BorderType::Rounded).title(" Chat "));
    frame.render_widget(paragraph, area);
}

/// The newest messages whose bubbles fit in `MAX_CONTENT_ROWS`, oldest first,
/// with their heights and the total content height. The newest bubble is
/// always kept, clipped if it alone is too tall.
fn newest_that_fit(messages: &[Message], bubble_width: u16) -> (Vec<(&Message, u16)>, u16) {
    let mut placed = Vec::new();
    let mut total_height: u16 = 0;
    for message in messages.iter().rev() {
        let room = MAX_CONTENT_ROWS - total_height;
        let mut height = Bubble::calculate_height(message, bubble_width);
        if placed.is_empty() {
            height = height.min(room - BUBBLE_GAP);
        } else if height.saturating_add(BUBBLE_GAP) > room {
            break;
        }
        total_height += height + BUBBLE_GAP;
        placed.push((message, height));
    }
    placed.reverse();
    (placed, total_height)
}

impl Component for ChatView<'_> {
    fn render(&mut self, frame: &mut Frame, area: Rect) {
        let (Some(company_id), Some(user)) = (self.company_id, self.user) else {
            self.state.last_shown = None;
            placeholder(frame, area, "Select a user to view chat history");
            return;
        };
        if user.messages.is_empty() {
            self.state.last_shown = None;
            placeholder(frame, area, "No messages yet");
            return;
        }

        let block = Block::bordered()
            .border_type(BorderType::Rounded)
            .title(format!(" Chat · {} ", user.name));
        let inner = block.inner(area);
        frame.render_widget(block, area);

        // One column reserved for the scrollbar
        let content_width = inner.width.saturating_sub(1);
        let bubble_width =
            ((u32::from(content_width) * u32::from(BUBBLE_WIDTH_PERCENT) / 100) as u16).max(1);

        let (placed, total_height) = newest_that_fit(&user.messages, bubble_width);

        let mut scroll_view = ScrollView::new(Size::new(content_width, total_height))
            .vertical_scrollbar_visibility(ScrollbarVisibility::Automatic)
            .horizontal_scrollbar_visibility(ScrollbarVisibility::Never);

        let mut y: u16 = 0;
        for (message, height) in placed {
            let x = if message.is_query {
                content_width.saturating_sub(bubble_width)
            } else {
                0
            };
            scroll_view.render_widget(Bubble::new(message), Rect::new(x, y, bubble_width, height));
            y += height + BUBBLE_GAP;
        }

        self.state.follow(company_id, user);
        frame.render_stateful_widget(scroll_view, inner, &mut self.state.scroll_state);
    }
}
