//! # TUI Components
//!
//! This module contains all UI components for the terminal interface.
//!
//! ## Component Architecture
//!
//! Components in this directory follow two patterns:
//!
//! ### Stateless Components (Props-Based Rendering)
//!
//! Display components that receive all data as parameters, rebuilt each frame:
//! - `TitleBar`: top status line (mode, pending spinner, latest notification)
//! - `CompanyList`: companies with user counts
//! - `UserList`: users of the selected company with message counts
//!
//! ### Stateful Components (Event-Driven)
//!
//! Components that manage local state and emit events:
//! - `ChatInput`: single-line text editor or record button, depending on mode
//! - `ChatView`: scrollable chat bubbles for the selected user
//! - `AddUserPrompt`: overlay asking for the new user's number
//!
//! ## Props-Based Data Flow
//!
//! Components receive store data as "props" (constructor parameters), never
//! by reaching into `HistoryStore` themselves:
//!
//! ```rust,ignore
//! CompanyList::new(store.companies(), store.selected_company_id(), focused)
//!     .render(frame, area);
//! ```

use ratatui::style::{Color, Style};
use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

pub mod add_user_prompt;
pub mod chat_input;
pub mod chat_view;
pub mod company_list;
mod title_bar;
pub mod user_list;

pub use add_user_prompt::{AddUserEvent, AddUserPrompt, AddUserPromptState};
pub use chat_input::{ChatInput, InputEvent};
pub use chat_view::{ChatView, ChatViewState};
pub use company_list::CompanyList;
pub use title_bar::TitleBar;
pub use user_list::UserList;

/// Border style for a pane, highlighted when it has keyboard focus.
pub(crate) fn pane_border_style(focused: bool) -> Style {
    if focused {
        Style::default().fg(Color::Cyan)
    } else {
        Style::default().fg(Color::DarkGray)
    }
}

/// Steps through `ids` from `current`.
///
/// Without a current id (or with one not in the list) this lands on the first
/// id going forward and the last going backward. Returns `None` at the edges.
pub(crate) fn step_id(ids: &[&str], current: Option<&str>, forward: bool) -> Option<String> {
    let position = current.and_then(|id| ids.iter().position(|candidate| *candidate == id));
    let next = match (position, forward) {
        (None, true) => ids.first(),
        (None, false) => ids.last(),
        (Some(i), true) => ids.get(i + 1),
        (Some(i), false) => i.checked_sub(1).and_then(|j| ids.get(j)),
    };
    next.map(|id| id.to_string())
}

/// Truncates `s` to at most `max_width` display columns, ending in "..." when cut.
pub(crate) fn truncate_str(s: &str, max_width: usize) -> String {
    if s.width() <= max_width {
        return s.to_string();
    }
    if max_width <= 3 {
        return ".".repeat(max_width);
    }

    let budget = max_width - 3;
    let mut used = 0;
    let mut out = String::new();
    for c in s.chars() {
        let w = c.width().unwrap_or(0);
        if used + w > budget {
            break;
        }
        used += w;
        out.push(c);
    }
    out.push_str("...");
    out
}
