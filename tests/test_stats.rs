use relaycache::stats::{RECENT_LIMIT, Resource, StatsCollector, StatsEvent, StatsSender, StatsSnapshot};

#[test]
fn test_snapshot_tracks_connections() {
    let mut snapshot = StatsSnapshot::default();

    snapshot.apply(StatsEvent::ConnectionDelta(1));
    snapshot.apply(StatsEvent::ConnectionDelta(1));
    snapshot.apply(StatsEvent::ConnectionDelta(-1));

    assert_eq!(snapshot.active_connections, 1);
    assert_eq!(snapshot.total_connections, 2);
}

#[test]
fn test_snapshot_keeps_recent_resources_newest_first() {
    let mut snapshot = StatsSnapshot::default();

    for i in 0..RECENT_LIMIT + 5 {
        snapshot.apply(StatsEvent::ResourceVisited(Resource {
            host: format!("host{}", i),
            uri: format!("/{}", i),
            content_length: 10,
        }));
    }

    let last = RECENT_LIMIT + 4;
    assert_eq!(snapshot.recent_resources.len(), RECENT_LIMIT);
    assert_eq!(snapshot.recent_hosts.len(), RECENT_LIMIT);
    assert_eq!(snapshot.recent_hosts[0], format!("host{}", last));
    assert_eq!(snapshot.recent_resources[0].uri, format!("/{}", last));
    assert_eq!(snapshot.bytes_served, 10 * (RECENT_LIMIT as u64 + 5));
}

#[test]
fn test_emit_without_receiver_is_silent() {
    let (stats, events) = StatsSender::channel();
    drop(events);

    stats.connection_opened();
    stats.resource_visited("example.com", "/", 0);
}

#[tokio::test]
async fn test_sender_helpers_emit_events() {
    let (stats, mut events) = StatsSender::channel();

    stats.connection_opened();
    stats.resource_visited("example.com", "/a", 5);
    stats.connection_closed();

    assert_eq!(events.recv().await, Some(StatsEvent::ConnectionDelta(1)));
    assert_eq!(
        events.recv().await,
        Some(StatsEvent::ResourceVisited(Resource {
            host: "example.com".to_string(),
            uri: "/a".to_string(),
            content_length: 5,
        }))
    );
    assert_eq!(events.recv().await, Some(StatsEvent::ConnectionDelta(-1)));
}

#[tokio::test]
async fn test_collector_aggregates_until_senders_drop() {
    let (stats, events) = StatsSender::channel();
    let collector = StatsCollector::new(events);
    let handle = collector.handle();
    let task = tokio::spawn(collector.run());

    stats.started();
    stats.connection_opened();
    stats.resource_visited("example.com", "/a", 5);
    stats.connection_closed();
    drop(stats);

    task.await.unwrap();

    let snapshot = handle.snapshot().await;
    assert!(snapshot.started_at.is_some());
    assert_eq!(snapshot.active_connections, 0);
    assert_eq!(snapshot.total_connections, 1);
    assert_eq!(snapshot.bytes_served, 5);
    assert_eq!(snapshot.recent_hosts.front().map(String::as_str), Some("example.com"));
}
