
use std::sync::Arc;
use std::sync::atomic::Ordering;
use std::time::Duration;

use site_client::LiveStatusPoller;
use test_helpers::*;

fn setup() -> (Arc<ScriptedApi>, Arc<LiveStatusPoller>) {
    let api = Arc::new(ScriptedApi::new());
    let poller = Arc::new(LiveStatusPoller::new(
        api.clone(),
        "teststreamer",
        Duration::from_secs(3600),
        Duration::from_secs(7200),
    ));
    (api, poller)
}

#[tokio::test]
async fn test_live_channel_reports_viewers() {
    let (api, poller) = setup();
    api.set_live(Some(120));

    let status = poller.poll_once().await.unwrap();

    assert!(status.is_live);
    assert_eq!(status.viewer_count, Some(120));
    assert_eq!(poller.status(), status);
}

#[tokio::test]
async fn test_offline_channel() {
    let (api, poller) = setup();
    api.set_live(Some(5));
    poller.poll_once().await.unwrap();

    api.set_live(None);
    let status = poller.poll_once().await.unwrap();

    assert!(!status.is_live);
    assert_eq!(status.viewer_count, None);
}

#[tokio::test]
async fn test_failed_poll_keeps_last_status() {
    let (api, poller) = setup();
    api.set_live(Some(42));
    poller.poll_once().await.unwrap();

    *api.channel.lock().unwrap() = None;
    assert!(poller.poll_once().await.is_err());

    let status = poller.status();
    assert!(status.is_live);
    assert_eq!(status.viewer_count, Some(42));
}

#[tokio::test]
async fn test_spawned_poller_polls_and_stops() {
    let (api, poller) = setup();
    api.set_live(Some(7));
    let mut updates = poller.subscribe();

    let handle = poller.clone().spawn();
    updates.changed().await.unwrap();
    assert!(updates.borrow().is_live);

    handle.shutdown().await;
    // One immediate poll; the next one is an hour away
    assert_eq!(api.channel_calls.load(Ordering::SeqCst), 1);
}
