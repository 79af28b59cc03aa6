//! # CompanyList Component
//!
//! Left pane: every company with its user count. The highlighted row is the
//! store's selected company; moving the highlight selects a company.

use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, BorderType, List, ListItem, ListState};

use crate::core::model::CompanyData;
use crate::tui::component::Component;
use crate::tui::components::{pane_border_style, step_id, truncate_str};

pub struct CompanyList<'a> {
    pub companies: &'a [CompanyData],
    pub selected_id: Option<&'a str>,
    pub focused: bool,
}

impl<'a> CompanyList<'a> {
    pub fn new(companies: &'a [CompanyData], selected_id: Option<&'a str>, focused: bool) -> Self {
        Self {
            companies,
            selected_id,
            focused,
        }
    }

    /// Id of the company before/after the selected one, if any.
    pub fn neighbor(&self, forward: bool) -> Option<String> {
        let ids: Vec<&str> = self.companies.iter().map(|c| c.company_id.as_str()).collect();
        step_id(&ids, self.selected_id, forward)
    }

    fn selected_index(&self) -> Option<usize> {
        let selected = self.selected_id?;
        self.companies.iter().position(|c| c.company_id == selected)
    }
}

impl Component for CompanyList<'_> {
    fn render(&mut self, frame: &mut Frame, area: Rect) {
        let block = Block::bordered()
            .border_type(BorderType::Rounded)
            .title(" Companies ")
            .border_style(pane_border_style(self.focused));

        let inner_width = area.width.saturating_sub(2) as usize;
        let items: Vec<ListItem> = self
            .companies
            .iter()
            .map(|company| {
                let count = match company.users.len() {
                    1 => "1 user".to_string(),
                    n => format!("{n} users"),
                };
                let name_width = inner_width.saturating_sub(count.len() + 1);
                let name = truncate_str(&company.name, name_width);
                let padded = format!("{:<width$}", name, width = name_width);
                ListItem::new(Line::from(vec![
                    Span::raw(padded),
                    Span::raw(" "),
                    Span::styled(count, Style::default().fg(Color::DarkGray)),
                ]))
            })
            .collect();

        let list = List::new(items)
            .block(block)
            .highlight_style(Style::default().add_modifier(Modifier::BOLD | Modifier::REVERSED));

        let mut state = ListState::default().with_selected(self.selected_index());
        frame.render_stateful_widget(list, area, &mut state);
    }
}
