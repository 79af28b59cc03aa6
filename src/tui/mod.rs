//! # TUI Adapter
//!
//! The ratatui-specific layer. Handles terminal I/O, renders the UI,
//! and translates keyboard events into core::Action values.
//!
//! This is the only module that knows about ratatui and crossterm.
//!
//! ## Ownership
//!
//! The loop owns the `HistoryStore`. Background tasks (round trips and
//! simulated recordings) never touch it; they send actions back over an
//! unbounded channel that is drained between frames.
//!
//! ## Redraw Strategy
//!
//! - **Animating** (reply pending, recording, toast visible): draws every
//!   ~80ms so the spinner moves and toasts expire on time.
//! - **Idle**: sleeps up to 500ms and only redraws on events.
//!
//! A `SteadyBlock` cursor style is used instead of a blinking cursor because
//! ratatui's `set_cursor_position` resets the terminal's blink timer on every
//! `draw()` call, making blinking cursors appear erratic during continuous redraws.

mod component;
mod components;
mod event;
mod ui;

use log::{debug, info};
use std::collections::HashMap;
use std::io::stdout;
use std::sync::Arc;
use std::time::{Duration, Instant};

use crossterm::cursor::{Hide, SetCursorStyle, Show};
use crossterm::event::{
    DisableBracketedPaste, EnableBracketedPaste, KeyboardEnhancementFlags,
    PopKeyboardEnhancementFlags, PushKeyboardEnhancementFlags,
};
use crossterm::execute;
use tokio::sync::mpsc::{self, UnboundedSender};
use tokio::task::AbortHandle;
use uuid::Uuid;

use crate::core::action::{Action, Effect, update};
use crate::core::config::ResolvedConfig;
use crate::core::model::{CompanyData, InputMode};
use crate::core::notify::{ChannelNotifier, Notification};
use crate::core::responder::{Responder, SimulatedResponder};
use crate::core::round_trip::{self, RoundTrip};
use crate::core::store::HistoryStore;
use crate::tui::component::EventHandler;
use crate::tui::components::{
    AddUserEvent, AddUserPromptState, ChatInput, ChatViewState, CompanyList, InputEvent, UserList,
};
use crate::tui::event::{TuiEvent, poll_event_immediate, poll_event_timeout};

/// Which pane receives keyboard input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Focus {
    Companies,
    Users,
    Input,
}

impl Focus {
    pub fn next(self) -> Self {
        match self {
            Focus::Companies => Focus::Users,
            Focus::Users => Focus::Input,
            Focus::Input => Focus::Companies,
        }
    }

    pub fn prev(self) -> Self {
        match self {
            Focus::Companies => Focus::Input,
            Focus::Users => Focus::Companies,
            Focus::Input => Focus::Users,
        }
    }
}

/// TUI-specific presentation state (not part of core business logic)
pub struct TuiState {
    pub focus: Focus,
    // Persistent component states
    pub chat: ChatViewState,
    pub input: ChatInput,
    /// Add-user overlay (None = hidden)
    pub add_user: Option<AddUserPromptState>,
    /// Latest notification and when it arrived
    pub toast: Option<(Notification, Instant)>,
    /// A simulated recording is running
    pub recording: bool,
}

impl TuiState {
    pub fn new(input_mode: InputMode) -> Self {
        Self {
            focus: Focus::Input, // User expects to type immediately
            chat: ChatViewState::new(),
            input: ChatInput::new(input_mode),
            add_user: None,
            toast: None,
            recording: false,
        }
    }

    /// Drops the toast once it has been visible for `ttl`.
    fn expire_toast(&mut self, ttl: Duration) -> bool {
        match &self.toast {
            Some((_, shown_at)) if shown_at.elapsed() >= ttl => {
                self.toast = None;
                true
            }
            _ => false,
        }
    }
}

/// Spawns and tracks the background tasks requested by `update()`.
struct Runtime {
    tx: UnboundedSender<Action>,
    responder: Arc<dyn Responder>,
    query_delay: Duration,
    transcription_delay: Duration,
    /// In-flight round trips, keyed by ticket id
    trips: HashMap<Uuid, (RoundTrip, AbortHandle)>,
    transcription: Option<AbortHandle>,
}

impl Runtime {
    fn new(config: &ResolvedConfig, tx: UnboundedSender<Action>) -> Self {
        Self {
            tx,
            responder: Arc::new(SimulatedResponder::new(config.reply_delay)),
            query_delay: config.query_delay,
            transcription_delay: config.transcription_delay,
            trips: HashMap::new(),
            transcription: None,
        }
    }

    /// Applies `action` to the store and carries out its effect.
    /// Returns true when the app should quit.
    fn dispatch(&mut self, store: &mut HistoryStore, action: Action) -> bool {
        match &action {
            Action::ReplyLanded { trip, .. } => {
                self.trips.remove(&trip.id);
            }
            Action::TranscriptReady(_) => {
                self.transcription = None;
            }
            _ => {}
        }

        match update(store, action) {
            Effect::None => false,
            Effect::Quit => true,
            Effect::SpawnRoundTrip(trip) => {
                let handle = round_trip::spawn(
                    trip.clone(),
                    self.query_delay,
                    self.responder.clone(),
                    self.tx.clone(),
                );
                self.trips.insert(trip.id, (trip, handle));
                false
            }
        }
    }

    fn start_recording(&mut self) {
        if let Some(previous) = self.transcription.take() {
            previous.abort();
        }
        self.transcription = Some(round_trip::spawn_transcription(
            self.transcription_delay,
            self.tx.clone(),
        ));
    }

    /// Aborts everything still running and releases the store's tickets.
    fn shutdown(&mut self, store: &mut HistoryStore) {
        if let Some(handle) = self.transcription.take() {
            handle.abort();
        }
        for (_, (trip, handle)) in self.trips.drain() {
            handle.abort();
            if store.abandon(&trip) {
                info!("Abandoned round trip {} on exit", trip.id);
            }
        }
    }
}

struct TerminalModeGuard;

impl TerminalModeGuard {
    fn new() -> std::io::Result<Self> {
        // Enable Kitty keyboard protocol unconditionally; terminals that don't
        // support it ignore the escape sequence
        execute!(
            stdout(),
            EnableBracketedPaste,
            Show,                        // Show cursor for input editing
            SetCursorStyle::SteadyBlock, // Non-blinking: avoids blink timer reset from continuous redraws
            PushKeyboardEnhancementFlags(
                KeyboardEnhancementFlags::DISAMBIGUATE_ESCAPE_CODES
                    | KeyboardEnhancementFlags::REPORT_EVENT_TYPES
            )
        )?;
        info!("Terminal modes enabled (bracketed paste, steady block cursor, keyboard enhancement)");
        Ok(Self)
    }
}

impl Drop for TerminalModeGuard {
    fn drop(&mut self) {
        let _ = execute!(
            stdout(),
            PopKeyboardEnhancementFlags,
            DisableBracketedPaste,
            Hide // Hide cursor on exit
        );
    }
}

pub fn run(config: ResolvedConfig, companies: Vec<CompanyData>) -> std::io::Result<()> {
    let (notify_tx, mut notify_rx) = mpsc::unbounded_channel();
    let mut store = HistoryStore::new(companies, Arc::new(ChannelNotifier::new(notify_tx)))
        .with_input_mode(config.input_mode);
    let mut tui = TuiState::new(store.input_mode());

    // Channel for actions from background tasks
    let (tx, mut rx) = mpsc::unbounded_channel();
    let mut runtime = Runtime::new(&config, tx);

    let mut terminal = ratatui::init();
    let _terminal_mode_guard = TerminalModeGuard::new();

    // Animation timer
    let start_time = Instant::now();
    let mut needs_redraw = true; // Force first frame

    loop {
        let animating = store.is_pending() || tui.recording || tui.toast.is_some();
        if animating {
            needs_redraw = true;
        }

        // Only draw when something changed
        if needs_redraw {
            let spinner_frame = (start_time.elapsed().as_secs_f32() * 12.0) as usize;
            terminal.draw(|f| ui::draw_ui(f, &store, &mut tui, spinner_frame))?;
            needs_redraw = false;
        }

        // Dynamic poll timeout: short when animating (~12fps), long when idle
        let timeout = if animating {
            Duration::from_millis(80)
        } else {
            Duration::from_millis(500)
        };
        let first_event = poll_event_timeout(timeout);

        // Process first event + drain ALL pending events before next draw
        let mut should_quit = false;
        if first_event.is_some() {
            needs_redraw = true;
        }
        for event in first_event
            .into_iter()
            .chain(std::iter::from_fn(poll_event_immediate))
        {
            if handle_event(&event, &mut store, &mut tui, &mut runtime) {
                should_quit = true;
                break;
            }
        }

        // Handle background task actions (round trips, transcriptions)
        while let Ok(action) = rx.try_recv() {
            needs_redraw = true;
            debug!("Event loop received: {:?}", action);
            if matches!(action, Action::TranscriptReady(_)) {
                tui.recording = false;
            }
            if runtime.dispatch(&mut store, action) {
                should_quit = true;
            }
        }

        // Notifications become the title bar toast
        while let Ok(notification) = notify_rx.try_recv() {
            tui.toast = Some((notification, Instant::now()));
            needs_redraw = true;
        }
        if tui.expire_toast(config.toast_duration) {
            needs_redraw = true;
        }

        if should_quit {
            break;
        }
    }

    runtime.shutdown(&mut store);

    ratatui::restore();
    Ok(())
}

/// Routes one terminal event. Returns true when the app should quit.
fn handle_event(
    event: &TuiEvent,
    store: &mut HistoryStore,
    tui: &mut TuiState,
    runtime: &mut Runtime,
) -> bool {
    // Resize just needs a redraw
    if matches!(event, TuiEvent::Resize) {
        return false;
    }

    // ForceQuit (Ctrl+C) always quits, even with the overlay open
    if matches!(event, TuiEvent::ForceQuit) {
        return runtime.dispatch(store, Action::Quit);
    }

    // When the add-user prompt is open, route all events to it
    if let Some(prompt) = tui.add_user.as_mut() {
        match prompt.handle_event(event) {
            Some(AddUserEvent::Submit(name)) => {
                tui.add_user = None;
                return runtime.dispatch(store, Action::AddUser(name));
            }
            Some(AddUserEvent::Cancel) => tui.add_user = None,
            None => {}
        }
        return false;
    }

    match event {
        TuiEvent::Escape => return runtime.dispatch(store, Action::Quit),
        TuiEvent::AddUser => {
            match store.selected_company() {
                Some(company) => tui.add_user = Some(AddUserPromptState::new(company.name.clone())),
                None => debug!("Add user ignored: no company selected"),
            }
            return false;
        }
        TuiEvent::ToggleMode if tui.recording => {
            debug!("Mode toggle ignored: recording in progress");
            return false;
        }
        TuiEvent::ToggleMode => return runtime.dispatch(store, Action::ToggleInputMode),
        TuiEvent::FocusNext => {
            tui.focus = tui.focus.next();
            return false;
        }
        TuiEvent::FocusPrev => {
            tui.focus = tui.focus.prev();
            return false;
        }
        TuiEvent::ScrollPageUp | TuiEvent::ScrollPageDown => {
            tui.chat.handle_event(event);
            return false;
        }
        _ => {}
    }

    match tui.focus {
        Focus::Companies => match event {
            TuiEvent::CursorUp | TuiEvent::CursorDown => {
                let forward = matches!(event, TuiEvent::CursorDown);
                let target = CompanyList::new(store.companies(), store.selected_company_id(), true)
                    .neighbor(forward);
                if let Some(id) = target {
                    return runtime.dispatch(store, Action::SelectCompany(id));
                }
                false
            }
            TuiEvent::Submit | TuiEvent::CursorRight => {
                tui.focus = Focus::Users;
                false
            }
            TuiEvent::InputChar(_) | TuiEvent::Paste(_) => {
                // Typing auto-switches to the input and forwards the event
                tui.focus = Focus::Input;
                handle_input_event(event, store, tui, runtime)
            }
            _ => false,
        },
        Focus::Users => match event {
            TuiEvent::CursorUp | TuiEvent::CursorDown => {
                let forward = matches!(event, TuiEvent::CursorDown);
                let target = UserList::new(store.selected_company(), store.selected_user_id(), true)
                    .neighbor(forward);
                if let Some(id) = target {
                    return runtime.dispatch(store, Action::SelectUser(id));
                }
                false
            }
            TuiEvent::CursorLeft => {
                tui.focus = Focus::Companies;
                false
            }
            TuiEvent::Submit | TuiEvent::CursorRight => {
                tui.focus = Focus::Input;
                false
            }
            TuiEvent::InputChar(_) | TuiEvent::Paste(_) => {
                tui.focus = Focus::Input;
                handle_input_event(event, store, tui, runtime)
            }
            _ => false,
        },
        Focus::Input => handle_input_event(event, store, tui, runtime),
    }
}

fn handle_input_event(
    event: &TuiEvent,
    store: &mut HistoryStore,
    tui: &mut TuiState,
    runtime: &mut Runtime,
) -> bool {
    // Props may be a frame old; resync before acting on them
    tui.input.mode = store.input_mode();
    tui.input.disabled = store.selected_user().is_none() || store.is_pending();
    tui.input.recording = tui.recording;

    match tui.input.handle_event(event) {
        Some(InputEvent::Submit(text)) => runtime.dispatch(store, Action::SubmitQuery(text)),
        Some(InputEvent::StartRecording) => {
            tui.recording = true;
            runtime.start_recording();
            false
        }
        Some(InputEvent::ContentChanged) | None => false,
    }
}
