use std::collections::{HashMap, VecDeque};
use std::pin::Pin;
use std::sync::{Arc, Mutex};
use std::task::{Context, Poll};

use futures_util::Stream;
use tokio::sync::mpsc;

/// Events the broadcaster keeps for replay to late joiners.
pub const DEFAULT_HISTORY_CAPACITY: usize = 100;

/// Floor for per-subscriber channel capacity. The channel must hold at least
/// a full history replay, plus headroom for live events while the client
/// catches up.
const MIN_CHANNEL_CAPACITY: usize = 256;

/// In-process publish-subscribe hub feeding the /stream sessions.
///
/// One mutex serializes register/unregister/publish; it is held only across
/// the enqueue step, never across transport I/O. Events are opaque serialized
/// payloads; the broadcaster never parses them.
#[derive(Clone)]
pub struct Broadcaster {
    inner: Arc<Mutex<Inner>>,
}

struct Inner {
    next_id: u64,
    clients: HashMap<u64, mpsc::Sender<String>>,
    history: VecDeque<String>,
    history_capacity: usize,
    channel_capacity: usize,
}

impl Broadcaster {
    pub fn new(history_capacity: usize) -> Self {
        Self {
            inner: Arc::new(Mutex::new(Inner {
                next_id: 1,
                clients: HashMap::new(),
                history: VecDeque::with_capacity(history_capacity),
                history_capacity,
                channel_capacity: history_capacity.max(MIN_CHANNEL_CAPACITY),
            })),
        }
    }

    /// Create a subscriber, replay the buffered history into its channel
    /// (oldest first), and add it to the live set. The subscriber removes
    /// itself on drop.
    pub fn register(&self) -> Subscriber {
        let (id, rx, total) = {
            let mut inner = self.inner.lock().unwrap();

            let id = inner.next_id;
            inner.next_id += 1;

            let (tx, rx) = mpsc::channel(inner.channel_capacity);
            for event in &inner.history {
                // Capacity is at least the history size, so this cannot fail.
                let _ = tx.try_send(event.clone());
            }
            inner.clients.insert(id, tx);

            (id, rx, inner.clients.len())
        };

        tracing::info!("Stream client registered (id={id}). Total clients: {total}");

        Subscriber {
            id,
            rx,
            hub: self.clone(),
        }
    }

    /// Remove a subscriber from the live set; no-op if it is already gone.
    pub fn unregister(&self, id: u64) {
        let total = {
            let mut inner = self.inner.lock().unwrap();
            inner.clients.remove(&id);
            inner.clients.len()
        };
        tracing::info!("Stream client unregistered (id={id}). Total clients: {total}");
    }

    /// Append the event to the history buffer (FIFO eviction at capacity) and
    /// enqueue it to every live subscriber. Subscribers whose channel is full
    /// or closed are dropped in the same call; the publisher never sees an
    /// error.
    pub fn publish(&self, event: impl Into<String>) {
        let event = event.into();
        let dropped = {
            let mut inner = self.inner.lock().unwrap();

            if inner.history_capacity > 0 {
                if inner.history.len() == inner.history_capacity {
                    inner.history.pop_front();
                }
                inner.history.push_back(event.clone());
            }

            let mut dead = Vec::new();
            for (id, tx) in &inner.clients {
                if tx.try_send(event.clone()).is_err() {
                    dead.push(*id);
                }
            }
            for id in &dead {
                inner.clients.remove(id);
            }
            dead
        };

        for id in dropped {
            tracing::warn!("Dropped slow or disconnected stream client (id={id})");
        }
    }

    pub fn subscriber_count(&self) -> usize {
        self.inner.lock().unwrap().clients.len()
    }
}

/// One registered stream client: a bounded channel of serialized events.
///
/// Yields history replay first, then live events in publish order. Dropping
/// the subscriber unregisters it, which is how a closed /stream connection
/// tears its registration down.
pub struct Subscriber {
    id: u64,
    rx: mpsc::Receiver<String>,
    hub: Broadcaster,
}

impl Subscriber {
    pub fn id(&self) -> u64 {
        self.id
    }

    pub async fn recv(&mut self) -> Option<String> {
        self.rx.recv().await
    }
}

impl Stream for Subscriber {
    type Item = String;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<String>> {
        self.rx.poll_recv(cx)
    }
}

impl Drop for Subscriber {
    fn drop(&mut self) {
        self.hub.unregister(self.id);
    }
}
