//! End-to-end behavior of the history store driven by simulated round trips.
//!
//! Runs with tokio's paused clock, so the 500ms/1000ms delays complete
//! instantly while keeping their ordering.

use std::sync::Arc;
use std::time::Duration;

use chatdeck::core::action::{Action, Effect, update};
use chatdeck::core::model::{CompanyData, UserChatHistory};
use chatdeck::core::notify::{ChannelNotifier, LogNotifier};
use chatdeck::core::responder::{SimulatedResponder, simulated_reply};
use chatdeck::core::round_trip::{self, DEFAULT_QUERY_DELAY};
use chatdeck::core::seed::seed_companies;
use chatdeck::core::store::{HistoryStore, NoOpReason, Outcome};
use tokio::sync::mpsc;

const FULL_ROUND_TRIP: Duration = Duration::from_millis(1600);

fn seeded_store() -> HistoryStore {
    HistoryStore::new(seed_companies(), Arc::new(LogNotifier))
}

/// Submits through the reducer, runs the spawned task, and feeds every
/// action it produces back into the store.
async fn submit_and_settle(store: &mut HistoryStore, text: &str) {
    let (tx, mut rx) = mpsc::unbounded_channel();
    let effect = update(store, Action::SubmitQuery(text.to_string()));
    let Effect::SpawnRoundTrip(trip) = effect else {
        panic!("expected a round trip for {text:?}, got {effect:?}");
    };
    round_trip::spawn(
        trip,
        DEFAULT_QUERY_DELAY,
        Arc::new(SimulatedResponder::default()),
        tx,
    );

    // Both phases arrive in order; the channel closes when the task ends
    while let Some(action) = rx.recv().await {
        assert_eq!(update(store, action), Effect::None);
    }
}

#[test]
fn test_initial_selection_is_first_company_and_user() {
    let store = seeded_store();
    assert_eq!(store.selected_company_id(), Some("1"));
    assert_eq!(store.selected_user_id(), Some("1"));

    let empty = HistoryStore::new(Vec::new(), Arc::new(LogNotifier));
    assert_eq!(empty.selected_company_id(), None);
    assert_eq!(empty.selected_user_id(), None);

    let no_users = HistoryStore::new(
        vec![CompanyData::new("x", "Quiet Co", Vec::new())],
        Arc::new(LogNotifier),
    );
    assert_eq!(no_users.selected_company_id(), Some("x"));
    assert_eq!(no_users.selected_user_id(), None);
}

#[test]
fn test_selected_user_always_belongs_to_selected_company() {
    let mut store = seeded_store();
    let steps: [(&str, &str); 6] = [
        ("company", "2"),
        ("user", "3"),
        ("company", "3"),
        ("user", "1"),
        ("company", "1"),
        ("user", "3"),
    ];
    for (kind, id) in steps {
        let _ = match kind {
            "company" => store.select_company(id),
            _ => store.select_user(id),
        };
        if let Some(user_id) = store.selected_user_id() {
            let company = store.selected_company().expect("user selected without company");
            assert!(company.user(user_id).is_some(), "user {user_id} not in {}", company.name);
        }
    }
}

#[test]
fn test_unknown_company_keeps_selection() {
    let mut store = seeded_store();
    assert!(store.select_user("2").is_applied());
    assert_eq!(
        store.select_company("missing"),
        Outcome::NoOp(NoOpReason::UnknownCompany("missing".to_string()))
    );
    assert_eq!(store.selected_company_id(), Some("1"));
    assert_eq!(store.selected_user_id(), Some("2"));
}

#[tokio::test]
async fn test_add_user_appends_selects_and_notifies() {
    let (tx, mut rx) = mpsc::unbounded_channel();
    let mut store = HistoryStore::new(seed_companies(), Arc::new(ChannelNotifier::new(tx)));
    let before = store.selected_company().map(|c| c.users.len()).unwrap_or(0);

    let id = store.add_user("Alice").applied().expect("user added");

    let company = store.selected_company().expect("company selected");
    assert_eq!(company.users.len(), before + 1);
    let added: &UserChatHistory = company.user(&id).expect("new user present");
    assert_eq!(added.name, "Alice");
    assert!(added.messages.is_empty());
    assert_eq!(store.selected_user_id(), Some(id.as_str()));

    let notification = rx.try_recv().expect("notification sent");
    assert!(notification.description.contains("Alice"));
    assert!(notification.description.contains("Company 1"));
}

#[tokio::test(start_paused = true)]
async fn test_submit_query_two_phase_round_trip() {
    let mut store = seeded_store();
    let before = store.selected_user().map(|u| u.messages.len()).unwrap_or(0);

    let (tx, mut rx) = mpsc::unbounded_channel();
    let trip = store.submit_query("hello").applied().expect("query accepted");
    assert!(store.is_pending());
    assert_eq!(store.selected_user().map(|u| u.messages.len()), Some(before));

    round_trip::spawn(
        trip,
        DEFAULT_QUERY_DELAY,
        Arc::new(SimulatedResponder::default()),
        tx,
    );

    // Phase one: only the query has landed
    let first = rx.recv().await.expect("query phase");
    assert!(matches!(first, Action::QueryLanded(_)));
    update(&mut store, first);
    assert_eq!(store.selected_user().map(|u| u.messages.len()), Some(before + 1));
    assert!(store.is_pending());

    // Phase two: the reply follows
    let second = rx.recv().await.expect("reply phase");
    update(&mut store, second);

    let user = store.selected_user().expect("user selected");
    assert_eq!(user.messages.len(), before + 2);
    let query = &user.messages[before];
    let reply = &user.messages[before + 1];
    assert!(query.is_query);
    assert_eq!(query.content, "hello");
    assert!(!reply.is_query);
    assert_eq!(reply.content, "This is a simulated response to: \"hello\"");
    assert!(query.timestamp <= reply.timestamp);
    assert!(!store.is_pending());
}

#[tokio::test(start_paused = true)]
async fn test_submit_without_user_is_noop() {
    let mut store = seeded_store();
    assert!(store.select_company("3").is_applied());
    assert_eq!(
        store.submit_query("anyone?"),
        Outcome::NoOp(NoOpReason::NoUserSelected)
    );
    assert!(!store.is_pending());
    assert_eq!(update(&mut store, Action::SubmitQuery("anyone?".into())), Effect::None);
}

#[tokio::test(start_paused = true)]
async fn test_sequential_round_trips_keep_call_order() {
    let mut store = seeded_store();
    let before = store.selected_user().map(|u| u.messages.len()).unwrap_or(0);

    submit_and_settle(&mut store, "first").await;
    submit_and_settle(&mut store, "second").await;

    let contents: Vec<String> = store
        .selected_user()
        .expect("user selected")
        .messages[before..]
        .iter()
        .map(|m| m.content.clone())
        .collect();
    assert_eq!(
        contents,
        vec![
            "first".to_string(),
            simulated_reply("first"),
            "second".to_string(),
            simulated_reply("second"),
        ]
    );
}

#[tokio::test(start_paused = true)]
async fn test_overlapping_submit_for_same_user_is_rejected() {
    let mut store = seeded_store();
    let trip = store.submit_query("one").applied().expect("first accepted");
    assert_eq!(
        store.submit_query("two"),
        Outcome::NoOp(NoOpReason::RoundTripInFlight)
    );

    // A different user can still ask
    assert!(store.select_user("2").is_applied());
    assert!(store.submit_query("other").is_applied());

    assert!(store.land_query(&trip).is_applied());
    assert!(store.land_reply(&trip, &simulated_reply("one")).is_applied());
    assert!(!store.is_user_pending("1", "1"));
    assert!(store.is_user_pending("1", "2"));
}

#[tokio::test(start_paused = true)]
async fn test_completion_lands_on_ticket_user_after_selection_moves() {
    let mut store = seeded_store();
    let before = store
        .company("1")
        .and_then(|c| c.user("1"))
        .map(|u| u.messages.len())
        .unwrap_or(0);

    let (tx, mut rx) = mpsc::unbounded_channel();
    let trip = store.submit_query("where does this go?").applied().expect("accepted");
    round_trip::spawn(trip, DEFAULT_QUERY_DELAY, Arc::new(SimulatedResponder::default()), tx);

    // Move away before anything lands
    assert!(store.select_company("2").is_applied());
    tokio::time::sleep(FULL_ROUND_TRIP).await;
    while let Ok(action) = rx.try_recv() {
        update(&mut store, action);
    }

    let origin = store.company("1").and_then(|c| c.user("1")).expect("origin user");
    assert_eq!(origin.messages.len(), before + 2);
    assert_eq!(origin.messages[before].content, "where does this go?");
    let elsewhere = store.selected_user().expect("company 2 user");
    assert!(elsewhere.messages.iter().all(|m| m.content != "where does this go?"));
    assert!(!store.is_pending());
}
