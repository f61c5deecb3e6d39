//! Statistics events
//!
//! Connection handlers report what they do as discrete events over a
//! one-way channel. Emitting never waits: if nobody is listening the event
//! is dropped. A single [`StatsCollector`] task folds the events into a
//! [`StatsSnapshot`] that other parts of the process may read.

use std::collections::VecDeque;
use std::sync::Arc;
use std::time::SystemTime;
use tokio::sync::{RwLock, mpsc};

/// How many recent hosts and resources a snapshot remembers.
pub const RECENT_LIMIT: usize = 10;

/// A resource served to a client.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resource {
    /// Origin host, from the request's Host header
    pub host: String,
    /// Request target as sent by the client
    pub uri: String,
    /// Response Content-Length, 0 when absent or not numeric
    pub content_length: usize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StatsEvent {
    /// The proxy started listening
    Started(SystemTime),
    /// Active connection count changed by +1 or -1
    ConnectionDelta(i64),
    /// A response was written to a client
    ResourceVisited(Resource),
}

/// Producer side of the statistics channel.
#[derive(Debug, Clone)]
pub struct StatsSender {
    tx: mpsc::UnboundedSender<StatsEvent>,
}

impl StatsSender {
    /// Creates a sender and the receiver a collector should drain.
    pub fn channel() -> (Self, mpsc::UnboundedReceiver<StatsEvent>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }

    /// Best-effort send.
    pub fn emit(&self, event: StatsEvent) {
        if self.tx.send(event).is_err() {
            tracing::trace!("Stats receiver dropped, event discarded");
        }
    }

    pub fn started(&self) {
        self.emit(StatsEvent::Started(SystemTime::now()));
    }

    pub fn connection_opened(&self) {
        self.emit(StatsEvent::ConnectionDelta(1));
    }

    pub fn connection_closed(&self) {
        self.emit(StatsEvent::ConnectionDelta(-1));
    }

    pub fn resource_visited(&self, host: &str, uri: &str, content_length: usize) {
        self.emit(StatsEvent::ResourceVisited(Resource {
            host: host.to_string(),
            uri: uri.to_string(),
            content_length,
        }));
    }
}

/// Aggregated view of every event received so far.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StatsSnapshot {
    pub started_at: Option<SystemTime>,
    pub active_connections: i64,
    pub total_connections: u64,
    /// Sum of reported content lengths
    pub bytes_served: u64,
    /// Most recent first
    pub recent_hosts: VecDeque<String>,
    /// Most recent first
    pub recent_resources: VecDeque<Resource>,
}

impl StatsSnapshot {
    pub fn apply(&mut self, event: StatsEvent) {
        match event {
            StatsEvent::Started(at) => self.started_at = Some(at),
            StatsEvent::ConnectionDelta(delta) => {
                self.active_connections += delta;
                if delta > 0 {
                    self.total_connections += delta as u64;
                }
            }
            StatsEvent::ResourceVisited(resource) => {
                self.bytes_served += resource.content_length as u64;

                push_recent(&mut self.recent_hosts, resource.host.clone());
                push_recent(&mut self.recent_resources, resource);
            }
        }
    }
}

fn push_recent<T>(list: &mut VecDeque<T>, item: T) {
    list.push_front(item);
    list.truncate(RECENT_LIMIT);
}

/// Read access to the collector's aggregate.
#[derive(Debug, Clone, Default)]
pub struct StatsHandle {
    state: Arc<RwLock<StatsSnapshot>>,
}

impl StatsHandle {
    pub async fn snapshot(&self) -> StatsSnapshot {
        self.state.read().await.clone()
    }
}

/// The single consumer of [`StatsEvent`]s.
pub struct StatsCollector {
    rx: mpsc::UnboundedReceiver<StatsEvent>,
    handle: StatsHandle,
}

impl StatsCollector {
    pub fn new(rx: mpsc::UnboundedReceiver<StatsEvent>) -> Self {
        Self {
            rx,
            handle: StatsHandle::default(),
        }
    }

    pub fn handle(&self) -> StatsHandle {
        self.handle.clone()
    }

    /// Drains events until every sender has been dropped.
    pub async fn run(mut self) {
        while let Some(event) = self.rx.recv().await {
            tracing::trace!(?event, "Stats event");

            let mut state = self.handle.state.write().await;
            state.apply(event);
        }

        tracing::debug!("Stats channel closed");
    }
}
