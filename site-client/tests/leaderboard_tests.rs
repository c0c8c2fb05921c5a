
use std::sync::Arc;
use std::sync::atomic::Ordering;

use site_client::{ApiError, LeaderboardStore};
use site_types::{LeaderboardPeriod, PrizeTier};
use test_helpers::*;

fn setup() -> (Arc<ScriptedApi>, Arc<LeaderboardStore>) {
    let api = Arc::new(ScriptedApi::new());
    let store = Arc::new(LeaderboardStore::new(api.clone()));
    (api, store)
}

#[tokio::test]
async fn test_repeated_fetch_yields_equal_lists() {
    let (api, store) = setup();
    *api.players.lock().unwrap() = vec![
        create_test_player("alice", 1200.0),
        create_test_player("bob", 800.5),
    ];

    store.fetch_leaderboard(LeaderboardPeriod::Monthly).await;
    let first = store.snapshot();
    store.fetch_leaderboard(LeaderboardPeriod::Monthly).await;
    let second = store.snapshot();

    assert_eq!(first.players, second.players);
    assert_eq!(first.players.len(), 2);
    assert_eq!(api.leaderboard_calls.load(Ordering::SeqCst), 2);
    assert!(!second.loading);
    assert!(second.error.is_none());
}

#[tokio::test]
async fn test_server_order_is_kept() {
    let (api, store) = setup();
    *api.players.lock().unwrap() = vec![
        create_test_player("bob", 500.0),
        create_test_player("cara", 900.0),
    ];

    store.fetch_leaderboard(LeaderboardPeriod::Monthly).await;

    let names: Vec<_> = store
        .snapshot()
        .players
        .iter()
        .map(|p| p.username.clone())
        .collect();
    assert_eq!(names, vec!["bob", "cara"]);
}

#[tokio::test]
async fn test_podium_follows_position() {
    let (api, store) = setup();
    *api.players.lock().unwrap() = vec![
        create_test_player("bob", 500.0),
        create_test_player("cara", 900.0),
        create_test_player("dan", 50.0),
        create_test_player("eve", 10.0),
    ];

    store.fetch_leaderboard(LeaderboardPeriod::Monthly).await;
    let state = store.snapshot();
    let podium = state.podium();

    assert_eq!(podium.len(), 3);
    assert_eq!(podium[0].0, PrizeTier::First);
    assert_eq!(podium[0].1.username, "bob");
    assert_eq!(podium[2].1.username, "dan");
}

#[tokio::test]
async fn test_failure_keeps_previous_list() {
    let (api, store) = setup();
    *api.players.lock().unwrap() = vec![create_test_player("alice", 1200.0)];
    store.fetch_leaderboard(LeaderboardPeriod::Monthly).await;

    *api.leaderboard_error.lock().unwrap() =
        Some(ApiError::Transport("connection refused".to_string()));
    store.fetch_leaderboard(LeaderboardPeriod::Monthly).await;

    let state = store.snapshot();
    assert_eq!(state.players.len(), 1);
    assert_eq!(state.error.as_deref(), Some("Failed to fetch leaderboard"));
    assert!(!state.loading);

    // Next success clears the error
    *api.leaderboard_error.lock().unwrap() = None;
    store.fetch_leaderboard(LeaderboardPeriod::Monthly).await;
    assert!(store.snapshot().error.is_none());
}

#[tokio::test]
async fn test_later_request_wins_over_late_response() {
    let (api, store) = setup();
    let first_reply = api.gate_leaderboard();
    let second_reply = api.gate_leaderboard();

    let first_store = store.clone();
    let first = tokio::spawn(async move {
        first_store
            .fetch_leaderboard(LeaderboardPeriod::Monthly)
            .await
    });
    let calls = api.clone();
    wait_for(|| calls.leaderboard_calls.load(Ordering::SeqCst) == 1).await;

    let second_store = store.clone();
    let second = tokio::spawn(async move {
        second_store
            .fetch_leaderboard(LeaderboardPeriod::Monthly)
            .await
    });
    wait_for(|| calls.leaderboard_calls.load(Ordering::SeqCst) == 2).await;

    // The newer request resolves first
    second_reply
        .send(Ok(vec![create_test_player("fresh", 2000.0)]))
        .unwrap();
    second.await.unwrap();
    assert_eq!(store.snapshot().players[0].username, "fresh");

    // The older one arrives last and must not overwrite it
    first_reply
        .send(Ok(vec![create_test_player("stale", 100.0)]))
        .unwrap();
    first.await.unwrap();

    let state = store.snapshot();
    assert_eq!(state.players.len(), 1);
    assert_eq!(state.players[0].username, "fresh");
    assert!(!state.loading);
}

#[tokio::test]
async fn test_late_failure_does_not_set_error() {
    let (api, store) = setup();
    let first_reply = api.gate_leaderboard();

    let first_store = store.clone();
    let first = tokio::spawn(async move {
        first_store
            .fetch_leaderboard(LeaderboardPeriod::Monthly)
            .await
    });
    let calls = api.clone();
    wait_for(|| calls.leaderboard_calls.load(Ordering::SeqCst) == 1).await;

    *api.players.lock().unwrap() = vec![create_test_player("alice", 1200.0)];
    store.fetch_leaderboard(LeaderboardPeriod::Monthly).await;

    first_reply.send(Err(ApiError::Timeout)).unwrap();
    first.await.unwrap();

    let state = store.snapshot();
    assert!(state.error.is_none());
    assert_eq!(state.players.len(), 1);
}

#[tokio::test]
async fn test_subscribers_are_notified() {
    let (api, store) = setup();
    *api.players.lock().unwrap() = vec![create_test_player("alice", 1200.0)];
    let mut updates = store.subscribe();

    store.fetch_leaderboard(LeaderboardPeriod::Monthly).await;

    assert!(updates.has_changed().unwrap());
    assert_eq!(updates.borrow_and_update().players.len(), 1);
}
