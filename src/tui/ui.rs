use crate::core::store::HistoryStore;
use crate::tui::component::Component;
use crate::tui::components::{AddUserPrompt, ChatView, CompanyList, TitleBar, UserList};
use crate::tui::{Focus, TuiState};

use ratatui::Frame;
use ratatui::layout::{Constraint, Layout};

/// Draws one frame: title line, then companies | users | chat + input.
pub fn draw_ui(frame: &mut Frame, store: &HistoryStore, tui: &mut TuiState, spinner_frame: usize) {
    use Constraint::{Length, Min, Ratio};
    let [title_area, main_area] = Layout::vertical([Length(1), Min(0)]).areas(frame.area());
    let [companies_area, users_area, chat_area] =
        Layout::horizontal([Ratio(3, 12), Ratio(3, 12), Ratio(6, 12)]).areas(main_area);
    let [history_area, input_area] = Layout::vertical([Min(0), Length(3)]).areas(chat_area);

    let notification = tui.toast.as_ref().map(|(notification, _)| notification);
    TitleBar::new(store.input_mode(), store.is_pending(), spinner_frame, notification)
        .render(frame, title_area);

    CompanyList::new(
        store.companies(),
        store.selected_company_id(),
        tui.focus == Focus::Companies,
    )
    .render(frame, companies_area);

    UserList::new(
        store.selected_company(),
        store.selected_user_id(),
        tui.focus == Focus::Users,
    )
    .render(frame, users_area);

    ChatView::new(
        &mut tui.chat,
        store.selected_company_id(),
        store.selected_user(),
    )
    .render(frame, history_area);

    // Sync input props with store/TUI state
    tui.input.mode = store.input_mode();
    tui.input.disabled = store.selected_user().is_none() || store.is_pending();
    tui.input.recording = tui.recording;
    tui.input.focused = tui.focus == Focus::Input && tui.add_user.is_none();
    tui.input.render(frame, input_area);

    if let Some(prompt) = &tui.add_user {
        AddUserPrompt::new(prompt).render(frame, frame.area());
    }
}
