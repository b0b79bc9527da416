// Copyright (c) 2025 SOLARE S.R.O.
//
// This file is part of Stroomlicht.
//
// Licensed under the Creative Commons Attribution-NonCommercial-NoDerivatives 4.0 International
// (CC BY-NC-ND 4.0). You may use and share this file for non-commercial purposes only and you may not
// create derivatives. See <https://creativecommons.org/licenses/by-nc-nd/4.0/>.
//
// This software is provided "AS IS", without warranty of any kind.
//
// For commercial licensing, please contact: info@solare.cz

//! Fetch orchestration: a background poller that refreshes the shared
//! price snapshot on a fixed interval and on manual request.
//!
//! Fetches are tagged with a monotonically increasing request id. A
//! timer tick racing a manual refresh can put two fetches in flight at
//! once; the id guard makes sure a slow early response never overwrites
//! a newer snapshot.

use crate::model::PriceSnapshot;
use crate::sources::PriceDataSource;
use parking_lot::RwLock;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;
use tokio::sync::mpsc;
use tracing::{debug, error, info, warn};

/// How many pending manual refresh requests to buffer. More than one
/// queued refresh collapses into the same work anyway.
const REFRESH_QUEUE_CAPACITY: usize = 4;

/// Shared snapshot with the stale-response guard.
#[derive(Debug)]
pub struct SharedPrices {
    inner: RwLock<Versioned>,
    next_request_id: AtomicU64,
}

#[derive(Debug)]
struct Versioned {
    last_applied: u64,
    snapshot: PriceSnapshot,
}

impl SharedPrices {
    pub fn new() -> Self {
        Self {
            inner: RwLock::new(Versioned {
                last_applied: 0,
                snapshot: PriceSnapshot::default(),
            }),
            next_request_id: AtomicU64::new(0),
        }
    }

    /// Clone out the current snapshot.
    pub fn snapshot(&self) -> PriceSnapshot {
        self.inner.read().snapshot.clone()
    }

    /// Reserve an id for a fetch that is about to start. Ids are handed
    /// out in start order, so a later-started fetch always wins.
    pub fn begin_fetch(&self) -> u64 {
        self.next_request_id.fetch_add(1, Ordering::SeqCst) + 1
    }

    /// Apply a completed fetch. Returns false (and leaves the snapshot
    /// untouched) when a fetch with a newer id already landed.
    pub fn apply(&self, request_id: u64, snapshot: PriceSnapshot) -> bool {
        let mut guard = self.inner.write();
        if request_id < guard.last_applied {
            return false;
        }
        guard.last_applied = request_id;
        guard.snapshot = snapshot;
        true
    }
}

impl Default for SharedPrices {
    fn default() -> Self {
        Self::new()
    }
}

/// Handle for requesting an out-of-cycle refresh.
#[derive(Debug, Clone)]
pub struct PollerHandle {
    refresh_tx: mpsc::Sender<()>,
}

impl PollerHandle {
    /// Queue a manual refresh. A full queue means refreshes are already
    /// pending, which serves the same purpose.
    pub fn trigger_refresh(&self) {
        if self.refresh_tx.try_send(()).is_err() {
            debug!("Refresh already queued, skipping duplicate request");
        }
    }
}

/// Spawn the poller task: one immediate fetch, then one per interval
/// tick or manual refresh. Every trigger starts its own fetch task so a
/// hung upstream request cannot stall the cycle.
pub fn spawn_price_poller(
    source: Arc<dyn PriceDataSource>,
    shared: Arc<SharedPrices>,
    interval: Duration,
) -> PollerHandle {
    let (refresh_tx, mut refresh_rx) = mpsc::channel(REFRESH_QUEUE_CAPACITY);

    tokio::spawn(async move {
        info!(
            "💰 Price poller started (source: {}, interval: {}s)",
            source.name(),
            interval.as_secs()
        );

        spawn_fetch(source.clone(), shared.clone());

        let mut ticker = tokio::time::interval(interval);
        ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
        // The first tick completes immediately; the startup fetch above
        // already covers it.
        ticker.tick().await;

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    debug!("Scheduled price refresh");
                    spawn_fetch(source.clone(), shared.clone());
                }
                received = refresh_rx.recv() => {
                    if received.is_none() {
                        // All handles dropped; keep polling on the timer.
                        continue;
                    }
                    info!("🔄 Manual price refresh requested");
                    spawn_fetch(source.clone(), shared.clone());
                }
            }
        }
    });

    PollerHandle { refresh_tx }
}

/// Run one fetch in its own task, guarded by a fresh request id.
fn spawn_fetch(source: Arc<dyn PriceDataSource>, shared: Arc<SharedPrices>) {
    let request_id = shared.begin_fetch();

    tokio::spawn(async move {
        match source.read_prices().await {
            Ok(snapshot) => {
                let records = snapshot.records.len();
                let source_kind = snapshot.source;
                if shared.apply(request_id, snapshot) {
                    debug!(
                        "✅ Applied snapshot #{request_id}: {records} records ({source_kind})"
                    );
                } else {
                    warn!("⏱️ Discarded stale snapshot #{request_id} ({records} records)");
                }
            }
            Err(e) => {
                // Only reachable without the fallback decorator, e.g. in
                // synthetic-only wiring gone wrong. Old data stays.
                error!("❌ Price fetch #{request_id} failed: {e}");
            }
        }
    });
}
