//! Keyed work queues: in order per key, concurrent across keys.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc::{self, error::SendError};
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tokio::time::timeout;
use tracing::{debug, error, warn};

/// Handles the items queued on a lane, one at a time.
#[async_trait]
pub trait LaneWorker<T>: Send + Sync + 'static {
    async fn process(&self, key: &str, item: T);
}

struct Lane<T> {
    id: u64,
    tx: mpsc::UnboundedSender<T>,
    worker: JoinHandle<()>,
}

type LaneMap<T> = Arc<Mutex<HashMap<String, Lane<T>>>>;

/// One queue and one task per key.
///
/// Items pushed under the same key are processed in push order; different
/// keys run independently. A lane whose queue stays empty for the idle
/// timeout is retired, so quiet keys hold no task or map entry.
pub struct Lanes<T, W> {
    worker: Arc<W>,
    idle_timeout: Duration,
    lanes: LaneMap<T>,
    next_id: AtomicU64,
}

impl<T, W> Lanes<T, W>
where
    T: Send + 'static,
    W: LaneWorker<T>,
{
    pub fn new(worker: Arc<W>, idle_timeout: Duration) -> Self {
        Self {
            worker,
            idle_timeout,
            lanes: Arc::new(Mutex::new(HashMap::new())),
            next_id: AtomicU64::new(0),
        }
    }

    /// Queue `item` on the lane for `key`, opening it if needed.
    pub async fn push(&self, key: &str, item: T) {
        let mut lanes = self.lanes.lock().await;

        let item = match lanes.get(key) {
            Some(lane) => match lane.tx.send(item) {
                Ok(()) => return,
                Err(SendError(item)) => {
                    warn!(key = %key, "Lane worker stopped unexpectedly, reopening");
                    item
                }
            },
            None => item,
        };

        let lane = self.open(key);
        if lane.tx.send(item).is_err() {
            error!(key = %key, "Fresh lane rejected an item");
        }
        lanes.insert(key.to_string(), lane);
    }

    /// Number of open lanes.
    pub async fn len(&self) -> usize {
        self.lanes.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }

    /// Close every lane and wait until all queued items are processed.
    pub async fn flush(&self) {
        let lanes: Vec<Lane<T>> = self.lanes.lock().await.drain().map(|(_, l)| l).collect();
        for Lane { tx, worker, .. } in lanes {
            drop(tx);
            if let Err(e) = worker.await {
                error!(error = %e, "Lane worker panicked");
            }
        }
    }

    fn open(&self, key: &str) -> Lane<T> {
        let (tx, rx) = mpsc::unbounded_channel();
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let worker = tokio::spawn(run_lane(
            key.to_string(),
            id,
            rx,
            self.worker.clone(),
            self.lanes.clone(),
            self.idle_timeout,
        ));
        Lane { id, tx, worker }
    }
}

async fn run_lane<T, W>(
    key: String,
    id: u64,
    mut rx: mpsc::UnboundedReceiver<T>,
    worker: Arc<W>,
    lanes: LaneMap<T>,
    idle_timeout: Duration,
) where
    T: Send + 'static,
    W: LaneWorker<T>,
{
    loop {
        let item = match timeout(idle_timeout, rx.recv()).await {
            Ok(Some(item)) => item,
            Ok(None) => break,
            Err(_) => {
                // Pushes happen under the same lock, so nothing can be queued
                // between this check and the removal.
                let mut map = lanes.lock().await;
                match rx.try_recv() {
                    Ok(item) => item,
                    Err(_) => {
                        if map.get(&key).is_some_and(|lane| lane.id == id) {
                            map.remove(&key);
                        }
                        debug!(key = %key, "Lane idle, retired");
                        break;
                    }
                }
            }
        };

        worker.process(&key, item).await;
    }
}
