//! # UserList Component
//!
//! Middle pane: users of the selected company with their message counts.

use ratatui::Frame;
use ratatui::layout::{Alignment, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, BorderType, List, ListItem, ListState, Paragraph};

use crate::core::model::CompanyData;
use crate::tui::component::Component;
use crate::tui::components::{pane_border_style, step_id, truncate_str};

pub struct UserList<'a> {
    pub company: Option<&'a CompanyData>,
    pub selected_id: Option<&'a str>,
    pub focused: bool,
}

impl<'a> UserList<'a> {
    pub fn new(company: Option<&'a CompanyData>, selected_id: Option<&'a str>, focused: bool) -> Self {
        Self {
            company,
            selected_id,
            focused,
        }
    }

    /// Id of the user before/after the selected one. With nothing selected,
    /// starts from the first user.
    pub fn neighbor(&self, forward: bool) -> Option<String> {
        let company = self.company?;
        let ids: Vec<&str> = company.users.iter().map(|u| u.user_id.as_str()).collect();
        step_id(&ids, self.selected_id, forward)
    }
}

impl Component for UserList<'_> {
    fn render(&mut self, frame: &mut Frame, area: Rect) {
        let title = match self.company {
            Some(company) => format!(" Users · {} ", company.name),
            None => " Users ".to_string(),
        };
        let block = Block::bordered()
            .border_type(BorderType::Rounded)
            .title(title)
            .title_bottom(Line::from(" Ctrl+N add user ").centered())
            .border_style(pane_border_style(self.focused));

        let Some(company) = self.company else {
            let empty = Paragraph::new("Select a company")
                .style(Style::default().fg(Color::DarkGray))
                .alignment(Alignment::Center)
                .block(block);
            frame.render_widget(empty, area);
            return;
        };

        if company.users.is_empty() {
            let empty = Paragraph::new("No users yet")
                .style(Style::default().fg(Color::DarkGray))
                .alignment(Alignment::Center)
                .block(block);
            frame.render_widget(empty, area);
            return;
        }

        let inner_width = area.width.saturating_sub(2) as usize;
        let items: Vec<ListItem> = company
            .users
            .iter()
            .map(|user| {
                let count = user.message_count_label();
                let name_width = inner_width.saturating_sub(count.len() + 1);
                let name = truncate_str(&user.name, name_width);
                let padded = format!("{:<width$}", name, width = name_width);
                ListItem::new(Line::from(vec![
                    Span::raw(padded),
                    Span::raw(" "),
                    Span::styled(count, Style::default().fg(Color::DarkGray)),
                ]))
            })
            .collect();

        let selected = self
            .selected_id
            .and_then(|id| company.users.iter().position(|u| u.user_id == id));

        let list = List::new(items)
            .block(block)
            .highlight_style(Style::default().add_modifier(Modifier::BOLD | Modifier::REVERSED));
        let mut state = ListState::default().with_selected(selected);
        frame.render_stateful_widget(list, area, &mut state);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::seed::seed_companies;
    use ratatui::Terminal;
    use ratatui::backend::TestBackend;

    fn rendered(mut list: UserList<'_>) -> String {
        let backend = TestBackend::new(36, 8);
        let mut terminal = Terminal::new(backend).unwrap();
        terminal.draw(|f| list.render(f, f.area())).unwrap();
        terminal
            .backend()
            .buffer()
            .content()
            .iter()
            .map(|c| c.symbol())
            .collect()
    }

    #[test]
    fn test_renders_users_with_counts() {
        let companies = seed_companies();
        let text = rendered(UserList::new(Some(&companies[0]), Some("1"), true));
        assert!(text.contains("user 1"));
        assert!(text.contains("2 messages"));
        assert!(text.contains("0 messages"));
    }

    #[test]
    fn test_empty_company() {
        let companies = seed_companies();
        let text = rendered(UserList::new(Some(&companies[2]), None, false));
        assert!(text.contains("No users yet"));
    }

    #[test]
    fn test_no_company() {
        let text = rendered(UserList::new(None, None, false));
        assert!(text.contains("Select a company"));
    }

    #[test]
    fn test_neighbor_without_selection_starts_at_first() {
        let companies = seed_companies();
        let list = UserList::new(Some(&companies[0]), None, true);
        assert_eq!(list.neighbor(true), Some("1".to_string()));
        assert_eq!(UserList::new(None, None, true).neighbor(true), None);
    }
}
