//! # TitleBar Component
//!
//! Top status line: application name, input mode, a spinner while a query is
//! pending, and the latest notification.
//!
//! TitleBar is purely presentational. It receives all data as props and has
//! no internal state:
//!
//! ```rust,ignore
//! let mut title_bar = TitleBar::new(InputMode::Text, true, spinner_frame, None);
//! title_bar.render(frame, area);
//! ```
//!
//! Output, in priority order (the left-most parts survive narrow terminals):
//!
//! 1. `chatdeck | mode: text`
//! 2. `chatdeck | mode: text | ⠋ waiting for reply`
//! 3. `chatdeck | mode: text | ⠋ waiting for reply | User Added: Added user 4 to Company 1`

use crate::core::model::InputMode;
use crate::core::notify::Notification;
use crate::tui::component::Component;
use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};

const SPINNER: [char; 10] = ['⠋', '⠙', '⠹', '⠸', '⠼', '⠴', '⠦', '⠧', '⠇', '⠏'];

pub struct TitleBar<'a> {
    pub input_mode: InputMode,
    pub pending: bool,
    pub spinner_frame: usize,
    pub notification: Option<&'a Notification>,
}

impl<'a> TitleBar<'a> {
    pub fn new(
        input_mode: InputMode,
        pending: bool,
        spinner_frame: usize,
        notification: Option<&'a Notification>,
    ) -> Self {
        Self {
            input_mode,
            pending,
            spinner_frame,
            notification,
        }
    }

    fn line(&self) -> Line<'static> {
        let dim = Style::default().add_modifier(Modifier::DIM);
        let mut spans = vec![
            Span::styled("chatdeck", Style::default().add_modifier(Modifier::BOLD)),
            Span::styled(" | ", dim),
            Span::raw(format!("mode: {}", self.input_mode.label())),
        ];

        if self.pending {
            let glyph = SPINNER[self.spinner_frame % SPINNER.len()];
            spans.push(Span::styled(" | ", dim));
            spans.push(Span::styled(
                format!("{glyph} waiting for reply"),
                Style::default().fg(Color::Yellow),
            ));
        }

        if let Some(notification) = self.notification {
            spans.push(Span::styled(" | ", dim));
            spans.push(Span::styled(
                format!("{}: {}", notification.title, notification.description),
                Style::default().fg(Color::Green),
            ));
        }

        Line::from(spans)
    }
}

impl Component for TitleBar<'_> {
    fn render(&mut self, frame: &mut Frame, area: Rect) {
        frame.render_widget(self.line(), area);
    }
}
