//! # History Store
//!
//! All browsing state in one place:
//!
//! ```text
//! HistoryStore
//! ├── companies: Vec<CompanyData>        // nested users and messages
//! ├── selected_company_id: Option<String>
//! ├── selected_user_id: Option<String>   // always a user of the selected company
//! ├── input_mode: InputMode              // text / audio
//! ├── in_flight: HashSet<(company, user)>// outstanding round trips
//! └── notifier: Arc<dyn Notifier>        // "User Added" toasts
//! ```
//!
//! Operations never fail. Invalid requests (unknown id, nothing selected,
//! a round trip already running for that user) come back as
//! [`Outcome::NoOp`] and leave the state untouched.

use std::collections::HashSet;
use std::fmt;
use std::sync::Arc;

use chrono::Utc;
use log::{debug, info, warn};

use crate::core::model::{CompanyData, InputMode, Message, UserChatHistory};
use crate::core::notify::{Notification, Notifier};
use crate::core::round_trip::RoundTrip;
use crate::core::seed;

/// Why an operation left the store unchanged.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NoOpReason {
    NoCompanySelected,
    NoUserSelected,
    UnknownCompany(String),
    UnknownUser(String),
    /// The target user already has a round trip outstanding.
    RoundTripInFlight,
}

impl fmt::Display for NoOpReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NoOpReason::NoCompanySelected => write!(f, "no company selected"),
            NoOpReason::NoUserSelected => write!(f, "no user selected"),
            NoOpReason::UnknownCompany(id) => write!(f, "unknown company '{id}'"),
            NoOpReason::UnknownUser(id) => write!(f, "unknown user '{id}'"),
            NoOpReason::RoundTripInFlight => write!(f, "a query is already pending for this user"),
        }
    }
}

/// Result of a store operation.
#[derive(Debug, Clone, PartialEq, Eq)]
#[must_use]
pub enum Outcome<T = ()> {
    Applied(T),
    NoOp(NoOpReason),
}

impl<T> Outcome<T> {
    pub fn is_applied(&self) -> bool {
        matches!(self, Outcome::Applied(_))
    }

    pub fn is_noop(&self) -> bool {
        matches!(self, Outcome::NoOp(_))
    }

    pub fn applied(self) -> Option<T> {
        match self {
            Outcome::Applied(value) => Some(value),
            Outcome::NoOp(_) => None,
        }
    }
}

pub struct HistoryStore {
    companies: Vec<CompanyData>,
    selected_company_id: Option<String>,
    selected_user_id: Option<String>,
    input_mode: InputMode,
    in_flight: HashSet<(String, String)>,
    notifier: Arc<dyn Notifier>,
}

impl HistoryStore {
    /// Creates a store over `companies` and selects the first company and
    /// its first user, if any.
    pub fn new(companies: Vec<CompanyData>, notifier: Arc<dyn Notifier>) -> Self {
        let mut store = Self {
            companies,
            selected_company_id: None,
            selected_user_id: None,
            input_mode: InputMode::default(),
            in_flight: HashSet::new(),
            notifier,
        };
        store.select_initial();
        store
    }

    /// Creates a store over the built-in illustrative dataset.
    pub fn seeded(notifier: Arc<dyn Notifier>) -> Self {
        Self::new(seed::seed_companies(), notifier)
    }

    pub fn with_input_mode(mut self, input_mode: InputMode) -> Self {
        self.input_mode = input_mode;
        self
    }

    fn select_initial(&mut self) {
        if self.selected_company_id.is_some() {
            return;
        }
        if let Some(first) = self.companies.first() {
            self.selected_company_id = Some(first.company_id.clone());
            self.selected_user_id = first.users.first().map(|u| u.user_id.clone());
            debug!(
                "Initial selection: company={:?}, user={:?}",
                self.selected_company_id, self.selected_user_id
            );
        }
    }

    // ------------------------------------------------------------------
    // Reads
    // ------------------------------------------------------------------

    pub fn companies(&self) -> &[CompanyData] {
        &self.companies
    }

    pub fn company(&self, company_id: &str) -> Option<&CompanyData> {
        self.companies.iter().find(|c| c.company_id == company_id)
    }

    pub fn selected_company(&self) -> Option<&CompanyData> {
        self.company(self.selected_company_id.as_deref()?)
    }

    pub fn selected_user(&self) -> Option<&UserChatHistory> {
        let company = self.selected_company()?;
        company.user(self.selected_user_id.as_deref()?)
    }

    pub fn selected_company_id(&self) -> Option<&str> {
        self.selected_company_id.as_deref()
    }

    pub fn selected_user_id(&self) -> Option<&str> {
        self.selected_user_id.as_deref()
    }

    pub fn input_mode(&self) -> InputMode {
        self.input_mode
    }

    /// True while any round trip is outstanding.
    pub fn is_pending(&self) -> bool {
        !self.in_flight.is_empty()
    }

    pub fn is_user_pending(&self, company_id: &str, user_id: &str) -> bool {
        self.in_flight
            .contains(&(company_id.to_string(), user_id.to_string()))
    }

    // ------------------------------------------------------------------
    // Selection
    // ------------------------------------------------------------------

    /// Selects a company and resets the user selection to its first user.
    /// An unknown id keeps the previous selection.
    pub fn select_company(&mut self, company_id: &str) -> Outcome {
        let Some(company) = self.company(company_id) else {
            return Outcome::NoOp(NoOpReason::UnknownCompany(company_id.to_string()));
        };
        let selected = company.company_id.clone();
        let first_user = company.users.first().map(|u| u.user_id.clone());
        self.selected_company_id = Some(selected);
        self.selected_user_id = first_user;
        Outcome::Applied(())
    }

    /// Selects a user of the selected company. An unknown id clears the user
    /// selection.
    pub fn select_user(&mut self, user_id: &str) -> Outcome {
        let Some(company) = self.selected_company() else {
            return Outcome::NoOp(NoOpReason::NoCompanySelected);
        };
        let found = company.user(user_id).map(|u| u.user_id.clone());
        let outcome = match found {
            Some(_) => Outcome::Applied(()),
            None => Outcome::NoOp(NoOpReason::UnknownUser(user_id.to_string())),
        };
        self.selected_user_id = found;
        outcome
    }

    // ------------------------------------------------------------------
    // Mutation
    // ------------------------------------------------------------------

    /// Appends a user with an empty history to the selected company, selects
    /// it and raises a "User Added" notification. Returns the new user id.
    pub fn add_user(&mut self, name: &str) -> Outcome<String> {
        let Some(company_id) = self.selected_company_id.clone() else {
            return Outcome::NoOp(NoOpReason::NoCompanySelected);
        };
        let Some(company) = self.companies.iter_mut().find(|c| c.company_id == company_id) else {
            return Outcome::NoOp(NoOpReason::UnknownCompany(company_id));
        };

        let user_id = company.next_user_id();
        company.users.push(UserChatHistory::new(user_id.clone(), name));
        let notification =
            Notification::new("User Added", format!("Added {} to {}", name, company.name));

        info!("Added user {} ('{}') to company {}", user_id, name, company_id);
        self.selected_user_id = Some(user_id.clone());
        self.notifier.notify(notification);
        Outcome::Applied(user_id)
    }

    /// Passes a notification to the store's notifier.
    pub fn notify(&self, notification: Notification) {
        self.notifier.notify(notification);
    }

    /// Flips between text and audio input. Returns the new mode.
    pub fn toggle_input_mode(&mut self) -> InputMode {
        self.input_mode = self.input_mode.toggled();
        self.input_mode
    }

    /// Starts a round trip for the selected user. Nothing is appended yet;
    /// the caller drives the returned ticket through [`land_query`] and
    /// [`land_reply`].
    ///
    /// [`land_query`]: Self::land_query
    /// [`land_reply`]: Self::land_reply
    pub fn submit_query(&mut self, text: &str) -> Outcome<RoundTrip> {
        let Some(company_id) = self.selected_company_id.clone() else {
            return Outcome::NoOp(NoOpReason::NoCompanySelected);
        };
        let Some(user_id) = self.selected_user_id.clone() else {
            return Outcome::NoOp(NoOpReason::NoUserSelected);
        };

        let trip = RoundTrip::new(company_id, user_id, text);
        if !self.in_flight.insert(trip.target()) {
            return Outcome::NoOp(NoOpReason::RoundTripInFlight);
        }
        debug!("Round trip {} started", trip.id);
        Outcome::Applied(trip)
    }

    /// Phase one: appends the query message. Returns the new message id.
    pub fn land_query(&mut self, trip: &RoundTrip) -> Outcome<String> {
        let user = match self.user_mut(&trip.company_id, &trip.user_id) {
            Ok(user) => user,
            Err(reason) => {
                warn!("Dropping query of round trip {}: {}", trip.id, reason);
                return Outcome::NoOp(reason);
            }
        };

        let id = user.next_message_id();
        user.messages
            .push(Message::query(id.clone(), trip.query.clone(), Utc::now()));
        Outcome::Applied(id)
    }

    /// Phase two: appends the reply and ends the round trip. Returns the new
    /// message id.
    pub fn land_reply(&mut self, trip: &RoundTrip, content: &str) -> Outcome<String> {
        self.in_flight.remove(&trip.target());

        let user = match self.user_mut(&trip.company_id, &trip.user_id) {
            Ok(user) => user,
            Err(reason) => {
                warn!("Dropping reply of round trip {}: {}", trip.id, reason);
                return Outcome::NoOp(reason);
            }
        };

        // Never stamp a reply earlier than what it answers
        let now = Utc::now();
        let timestamp = user.messages.last().map_or(now, |last| last.timestamp.max(now));
        let id = user.next_message_id();
        user.messages.push(Message::reply(id.clone(), content, timestamp));
        debug!("Round trip {} finished", trip.id);
        Outcome::Applied(id)
    }

    /// Ends a round trip without appending anything (its task was cancelled).
    pub fn abandon(&mut self, trip: &RoundTrip) -> bool {
        self.in_flight.remove(&trip.target())
    }

    fn user_mut(
        &mut self,
        company_id: &str,
        user_id: &str,
    ) -> Result<&mut UserChatHistory, NoOpReason> {
        self.companies
            .iter_mut()
            .find(|c| c.company_id == company_id)
            .ok_or_else(|| NoOpReason::UnknownCompany(company_id.to_string()))?
            .user_mut(user_id)
            .ok_or_else(|| NoOpReason::UnknownUser(user_id.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::responder::simulated_reply;
    use crate::test_support::{RecordingNotifier, test_store};

    fn assert_selection_consistent(store: &HistoryStore) {
        if let Some(user_id) = store.selected_user_id() {
            let company = store.selected_company().expect("user selected without company");
            assert!(company.user(user_id).is_some(), "user {user_id} not in company");
        }
    }

    #[test]
    fn test_initial_selection_is_first_company_and_user() {
        let (store, _) = test_store();
        assert_eq!(store.selected_company_id(), Some("1"));
        assert_eq!(store.selected_user_id(), Some("1"));
        assert_eq!(store.input_mode(), InputMode::Text);
        assert!(!store.is_pending());
    }

    #[test]
    fn test_initial_selection_without_users() {
        let companies = vec![CompanyData::new("9", "Empty Co", vec![])];
        let store = HistoryStore::new(companies, Arc::new(RecordingNotifier::default()));
        assert_eq!(store.selected_company_id(), Some("9"));
        assert_eq!(store.selected_user_id(), None);
    }

    #[test]
    fn test_empty_dataset_selects_nothing() {
        let store = HistoryStore::new(vec![], Arc::new(RecordingNotifier::default()));
        assert!(store.selected_company().is_none());
        assert!(store.selected_user().is_none());
    }

    #[test]
    fn test_select_company_resets_user() {
        let (mut store, _) = test_store();
        assert!(store.select_user("2").is_applied());

        assert!(store.select_company("2").is_applied());
        assert_eq!(store.selected_company_id(), Some("2"));
        assert_eq!(store.selected_user_id(), Some("1"));

        assert!(store.select_company("3").is_applied());
        assert_eq!(store.selected_user_id(), None);
    }

    #[test]
    fn test_select_unknown_company_keeps_selection() {
        let (mut store, _) = test_store();
        assert!(store.select_user("2").is_applied());

        let outcome = store.select_company("42");
        assert_eq!(outcome, Outcome::NoOp(NoOpReason::UnknownCompany("42".into())));
        assert_eq!(store.selected_company_id(), Some("1"));
        assert_eq!(store.selected_user_id(), Some("2"));
    }

    #[test]
    fn test_select_unknown_user_clears_user() {
        let (mut store, _) = test_store();
        let outcome = store.select_user("99");
        assert_eq!(outcome, Outcome::NoOp(NoOpReason::UnknownUser("99".into())));
        assert_eq!(store.selected_user_id(), None);
        assert_eq!(store.selected_company_id(), Some("1"));
    }

    #[test]
    fn test_select_user_of_other_company_is_rejected() {
        let (mut store, _) = test_store();
        assert!(store.select_company("2").is_applied());
        // Company 2 only has user "1"
        assert!(store.select_user("3").is_noop());
        assert_selection_consistent(&store);
    }

    #[test]
    fn test_selection_invariant_over_call_sequence() {
        let (mut store, _) = test_store();
        let steps: &[(&str, &str)] = &[
            ("company", "2"),
            ("user", "2"),
            ("user", "1"),
            ("company", "1"),
            ("user", "3"),
            ("company", "3"),
            ("user", "1"),
            ("company", "nope"),
            ("user", "nope"),
            ("company", "1"),
            ("user", "2"),
        ];
        for (kind, id) in steps {
            let _ = match *kind {
                "company" => store.select_company(id),
                _ => store.select_user(id),
            };
            assert_selection_consistent(&store);
        }
        assert_eq!(store.selected_user().map(|u| u.name.as_str()), Some("user 2"));
    }

    #[test]
    fn test_select_user_without_company() {
        let mut store = HistoryStore::new(vec![], Arc::new(RecordingNotifier::default()));
        assert_eq!(
            store.select_user("1"),
            Outcome::NoOp(NoOpReason::NoCompanySelected)
        );
    }

    #[test]
    fn test_add_user_appends_selects_and_notifies() {
        let (mut store, notifier) = test_store();
        let before = store.selected_company().unwrap().users.len();

        let outcome = store.add_user("Alice");
        assert_eq!(outcome, Outcome::Applied((before + 1).to_string()));

        let company = store.selected_company().unwrap();
        assert_eq!(company.users.len(), before + 1);
        let user = store.selected_user().unwrap();
        assert_eq!(user.name, "Alice");
        assert!(user.messages.is_empty());

        let seen = notifier.take();
        assert_eq!(seen.len(), 1);
        assert_eq!(seen[0].title, "User Added");
        assert!(seen[0].description.contains("Alice"));
        assert!(seen[0].description.contains("Company 1"));
    }

    #[test]
    fn test_add_user_to_empty_company() {
        let (mut store, _) = test_store();
        assert!(store.select_company("3").is_applied());
        assert_eq!(store.add_user("user 1"), Outcome::Applied("1".into()));
        assert_eq!(store.selected_user_id(), Some("1"));
    }

    #[test]
    fn test_add_user_without_company_is_silent() {
        let notifier = Arc::new(RecordingNotifier::default());
        let mut store = HistoryStore::new(vec![], notifier.clone());
        assert_eq!(
            store.add_user("Alice"),
            Outcome::NoOp(NoOpReason::NoCompanySelected)
        );
        assert!(notifier.take().is_empty());
    }

    #[test]
    fn test_toggle_input_mode() {
        let (mut store, _) = test_store();
        assert_eq!(store.toggle_input_mode(), InputMode::Audio);
        assert_eq!(store.toggle_input_mode(), InputMode::Text);
    }

    #[test]
    fn test_with_input_mode() {
        let (store, _) = test_store();
        let store = store.with_input_mode(InputMode::Audio);
        assert_eq!(store.input_mode(), InputMode::Audio);
    }

    #[test]
    fn test_submit_query_marks_pending_without_appending() {
        let (mut store, _) = test_store();
        let before = store.selected_user().unwrap().messages.len();

        let trip = store.submit_query("hello").applied().unwrap();
        assert_eq!(trip.query, "hello");
        assert_eq!(trip.target(), ("1".to_string(), "1".to_string()));
        assert!(store.is_pending());
        assert!(store.is_user_pending("1", "1"));
        assert_eq!(store.selected_user().unwrap().messages.len(), before);
    }

    #[test]
    fn test_submit_query_without_user_is_noop() {
        let (mut store, _) = test_store();
        assert!(store.select_company("3").is_applied());
        assert_eq!(
            store.submit_query("hello"),
            Outcome::NoOp(NoOpReason::NoUserSelected)
        );
        assert!(!store.is_pending());
    }

    #[test]
    fn test_second_submit_for_same_user_is_rejected() {
        let (mut store, _) = test_store();
        assert!(store.submit_query("one").is_applied());
        assert_eq!(
            store.submit_query("two"),
            Outcome::NoOp(NoOpReason::RoundTripInFlight)
        );

        // A different user is independent
        assert!(store.select_user("2").is_applied());
        assert!(store.submit_query("three").is_applied());
    }

    #[test]
    fn test_land_query_then_reply() {
        let (mut store, _) = test_store();
        let trip = store.submit_query("hello").applied().unwrap();

        assert_eq!(store.land_query(&trip), Outcome::Applied("3".into()));
        assert!(store.is_pending());
        let reply = simulated_reply("hello");
        assert_eq!(store.land_reply(&trip, &reply), Outcome::Applied("4".into()));
        assert!(!store.is_pending());

        let messages = &store.selected_user().unwrap().messages;
        assert_eq!(messages.len(), 4);
        assert!(messages[2].is_query);
        assert_eq!(messages[2].content, "hello");
        assert!(!messages[3].is_query);
        assert_eq!(messages[3].content, reply);
        assert!(messages[2].timestamp <= messages[3].timestamp);
    }

    #[test]
    fn test_completion_lands_on_origin_user_after_selection_moves() {
        let (mut store, _) = test_store();
        let trip = store.submit_query("hello").applied().unwrap();
        assert!(store.select_company("2").is_applied());

        assert!(store.land_query(&trip).is_applied());
        assert!(store.land_reply(&trip, "reply").is_applied());

        let origin = store.company("1").unwrap().user("1").unwrap();
        assert_eq!(origin.messages.len(), 4);
        let other = store.company("2").unwrap().user("1").unwrap();
        assert_eq!(other.messages.len(), 2);
    }

    #[test]
    fn test_reply_for_missing_user_still_clears_pending() {
        let (mut store, _) = test_store();
        let _ = store.submit_query("hello");
        let ghost = RoundTrip::new("1", "1", "ghost");
        let stray = RoundTrip::new("7", "7", "stray");

        assert_eq!(
            store.land_reply(&stray, "x"),
            Outcome::NoOp(NoOpReason::UnknownCompany("7".into()))
        );
        assert!(store.land_reply(&ghost, "x").is_applied());
        assert!(!store.is_pending());
    }

    #[test]
    fn test_abandon_clears_pending() {
        let (mut store, _) = test_store();
        let trip = store.submit_query("hello").applied().unwrap();
        assert!(store.abandon(&trip));
        assert!(!store.is_pending());
        assert!(!store.abandon(&trip));
        assert!(store.submit_query("again").is_applied());
    }
}
