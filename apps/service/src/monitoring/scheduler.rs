use std::sync::Arc;
use std::time::Duration;

use tokio::time::sleep;
use tracing::{debug, error, info, warn};

use super::checker::Prober;
use super::detector::TransitionDetector;
use super::types::ConnectivityState;
use crate::database::{Record, RecordStore};

/// The perpetual probe loop
///
/// Probes, feeds the outcome to the detector, persists any transition, then
/// sleeps for a fixed interval. Probes never overlap.
pub struct MonitorLoop {
    prober: Arc<dyn Prober>,
    store: Arc<dyn RecordStore>,
    detector: TransitionDetector,
    interval: Duration,
}

impl MonitorLoop {
    /// Create a loop whose detector starts healthy
    pub fn new(prober: Arc<dyn Prober>, store: Arc<dyn RecordStore>, interval: Duration) -> Self {
        Self { prober, store, detector: TransitionDetector::new(), interval }
    }

    /// Replace the detector, e.g. with one seeded from the store
    pub fn with_detector(mut self, detector: TransitionDetector) -> Self {
        self.detector = detector;
        self
    }

    pub fn state(&self) -> ConnectivityState {
        self.detector.state()
    }

    /// Run one probe cycle without sleeping.
    ///
    /// Returns the record written for a transition, if any. A failed write
    /// is logged and yields `None`; the detector keeps its new state.
    pub async fn tick(&mut self) -> Option<Record> {
        let outcome = self.prober.probe().await;
        debug!(outcome = %outcome, "Probe finished");

        let record = self.detector.observe(&outcome)?;
        if record.failure {
            warn!(id = %record.id, description = %record.description, "Connectivity lost");
        } else {
            info!(id = %record.id, description = %record.description, "Connectivity restored");
        }

        match self.store.create_record(&record).await {
            Ok(()) => Some(record),
            Err(e) => {
                error!(id = %record.id, error = %format!("{e:#}"), "Failed to persist transition record");
                None
            }
        }
    }

    /// Probe forever
    pub async fn run(mut self) {
        info!(interval_ms = self.interval.as_millis() as u64, state = %self.state(), "Monitor loop starting");

        loop {
            self.tick().await;
            sleep(self.interval).await;
        }
    }

    /// Spawn the loop on the runtime. The task only ends with the process.
    pub fn spawn(self) -> tokio::task::JoinHandle<()> {
        tokio::spawn(self.run())
    }
}

/// Build the detector the loop starts with.
///
/// Without seeding the endpoint is assumed healthy. With seeding the newest
/// stored record decides; if it cannot be read the loop starts healthy.
pub async fn initial_detector(store: &dyn RecordStore, seed_from_store: bool) -> TransitionDetector {
    if !seed_from_store {
        return TransitionDetector::new();
    }

    match store.latest_record().await {
        Ok(Some(record)) => {
            info!(id = %record.id, state = %record.state(), "Seeding connectivity state from store");
            TransitionDetector::with_state(record.state())
        }
        Ok(None) => TransitionDetector::new(),
        Err(e) => {
            warn!(error = %format!("{e:#}"), "Could not read latest record, assuming healthy");
            TransitionDetector::new()
        }
    }
}
