//! # Configuration Watchers
//!
//! One background tokio task per watched configuration name. Each task
//! fetches the document immediately, then once per interval, and invokes the
//! caller's callback when the canonical JSON of the document differs from
//! the last delivered one. Fetch failures are delivered to the callback and
//! never stop the loop.
//!
//! ## Lifecycle
//!
//! `Unwatched -> Watching -> (Cancelled | Unwatched)`. Watching a name that
//! already has a watcher cancels the old one first, so a name never has two
//! live pollers. Cancellation is cooperative: it is observed between polls
//! and right after an in-flight fetch returns, whose result is then dropped
//! instead of delivered. The request itself is not aborted.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use serde::{Serialize, Serializer};
use serde_json::Value;
use tokio::sync::watch;
use tokio::time::MissedTickBehavior;

use crate::error::SdkError;
use crate::store::Store;
use crate::transport::{Resource, Transport};
use crate::types::ConfigDocument;

/// Poll period used when the caller passes `Duration::ZERO`.
pub const DEFAULT_WATCH_INTERVAL: Duration = Duration::from_secs(5);

/// Receives each changed document, or each fetch error.
pub type WatchCallback = Arc<dyn Fn(Result<ConfigDocument, SdkError>) + Send + Sync>;

/// Bookkeeping for one live watcher. `id` tells a replaced watcher's slot
/// apart from its replacement's.
#[derive(Debug, Clone)]
struct WatcherSlot {
    id: u64,
    cancel: Arc<watch::Sender<bool>>,
}

impl WatcherSlot {
    fn cancel(&self) {
        self.cancel.send_replace(true);
    }
}

/// Owns the watcher map and spawns polling tasks.
#[derive(Debug)]
pub(crate) struct WatchManager {
    transport: Transport,
    watchers: Store<WatcherSlot>,
    next_id: AtomicU64,
}

impl WatchManager {
    pub(crate) fn new(transport: Transport) -> Self {
        Self {
            transport,
            watchers: Store::new(),
            next_id: AtomicU64::new(1),
        }
    }

    /// Start polling `name`, replacing any existing watcher for it.
    pub(crate) fn start(
        &self,
        name: &str,
        callback: WatchCallback,
        interval: Duration,
    ) -> WatchHandle {
        let period = if interval.is_zero() {
            DEFAULT_WATCH_INTERVAL
        } else {
            interval
        };
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let (tx, rx) = watch::channel(false);
        let slot = WatcherSlot {
            id,
            cancel: Arc::new(tx),
        };

        if let Some(previous) = self.watchers.insert(name, slot.clone()) {
            tracing::info!(config = name, "replacing existing watcher");
            previous.cancel();
        }

        tracing::info!(config = name, interval_ms = period.as_millis() as u64, "starting watcher");
        tokio::spawn(poll_loop(
            self.transport.clone(),
            name.to_string(),
            callback,
            period,
            rx,
        ));

        WatchHandle {
            name: name.to_string(),
            id,
            cancel: slot.cancel,
            watchers: self.watchers.clone(),
        }
    }

    /// Names with a live watcher, sorted.
    pub(crate) fn active(&self) -> Vec<String> {
        self.watchers.names()
    }

    /// Cancel every watcher and forget them.
    pub(crate) fn cancel_all(&self) {
        for (name, slot) in self.watchers.drain() {
            tracing::info!(config = %name, "stopping watcher");
            slot.cancel();
        }
    }
}

impl Drop for WatchManager {
    fn drop(&mut self) {
        self.cancel_all();
    }
}

/// Stop handle returned by [`crate::ConfigSdk::watch`].
///
/// Dropping the handle does NOT stop the watcher; call [`WatchHandle::stop`]
/// or destroy the SDK.
#[derive(Debug, Clone)]
pub struct WatchHandle {
    name: String,
    id: u64,
    cancel: Arc<watch::Sender<bool>>,
    watchers: Store<WatcherSlot>,
}

impl WatchHandle {
    /// Cancel the watcher and drop its bookkeeping entry. Safe to call any
    /// number of times. If the watcher was already replaced by a newer one
    /// for the same name, the newer one is left untouched.
    pub fn stop(&self) {
        let was_running = !self.cancel.send_replace(true);
        if self.watchers.remove_if(&self.name, |slot| slot.id == self.id).is_some() || was_running {
            tracing::info!(config = %self.name, "stopping watcher");
        }
    }

    /// Whether this watcher is still polling.
    pub fn is_active(&self) -> bool {
        !*self.cancel.borrow()
    }

    /// The watched configuration name.
    pub fn name(&self) -> &str {
        &self.name
    }
}

/// Canonical text form used to detect changes between polls: object keys
/// sorted at every depth, whatever order the map type iterates in.
pub(crate) fn snapshot(doc: &ConfigDocument) -> Result<String, serde_json::Error> {
    let sorted: BTreeMap<&str, Canonical<'_>> =
        doc.iter().map(|(k, v)| (k.as_str(), Canonical(v))).collect();
    serde_json::to_string(&sorted)
}

/// Serializes a JSON value with object keys in sorted order.
struct Canonical<'a>(&'a Value);

impl Serialize for Canonical<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self.0 {
            Value::Object(map) => {
                let sorted: BTreeMap<&str, Canonical<'_>> =
                    map.iter().map(|(k, v)| (k.as_str(), Canonical(v))).collect();
                sorted.serialize(serializer)
            }
            Value::Array(items) => serializer.collect_seq(items.iter().map(Canonical)),
            other => other.serialize(serializer),
        }
    }
}

async fn poll_loop(
    transport: Transport,
    name: String,
    callback: WatchCallback,
    period: Duration,
    mut cancel: watch::Receiver<bool>,
) {
    let mut baseline: Option<String> = None;
    // The first tick completes immediately, which gives the initial fetch.
    let mut ticker = tokio::time::interval(period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

    loop {
        tokio::select! {
            biased;
            changed = cancel.changed() => {
                // Err means every sender is gone: the SDK and all handles were dropped.
                if changed.is_err() || *cancel.borrow() {
                    break;
                }
                continue;
            }
            _ = ticker.tick() => {}
        }
        if *cancel.borrow() {
            break;
        }

        let result = transport.get::<ConfigDocument>(Resource::Config, &name).await;
        if *cancel.borrow() {
            break;
        }

        match result {
            Ok(doc) => match snapshot(&doc) {
                Ok(current) => {
                    if baseline.as_deref() != Some(current.as_str()) {
                        tracing::debug!(config = %name, "configuration changed");
                        baseline = Some(current);
                        callback(Ok(doc));
                    }
                }
                Err(e) => {
                    tracing::warn!(config = %name, "failed to snapshot document: {e}");
                }
            },
            Err(e) => {
                tracing::warn!(config = %name, "watch poll failed: {e}");
                callback(Err(e));
            }
        }
    }

    tracing::debug!(config = %name, "watcher task exited");
}
