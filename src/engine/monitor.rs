//! Serial background processing for the horizon engine.
//!
//! Location fixes arrive asynchronously; scans must never overlap and the
//! active-feature table must only ever be touched from one place. The
//! monitor achieves both by moving the engine onto a dedicated task that
//! drains a command channel in order: at most one scan is in flight, and a
//! new fix waits for the previous scan to finish.
//!
//! Stopping is safe to call while a scan is queued or running: every fix
//! carries the monitoring epoch it was enqueued under, and the task discards
//! fixes from an earlier epoch instead of repopulating cleared state.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use log::debug;
use tokio::sync::{broadcast, mpsc};
use tokio::task::JoinHandle;

use crate::engine::{HorizonEngine, HorizonEvent, HorizonObserver, NoopObserver};
use crate::error::{HorizonError, Result};
use crate::{HorizonConfig, LocationFix, Route};

/// Capacity of the event broadcast channel; slow subscribers lag rather
/// than block the scan task.
const EVENT_CHANNEL_CAPACITY: usize = 64;

enum Command {
    Start { route: Box<Route>, epoch: u64 },
    Stop { epoch: u64 },
    Fix { fix: LocationFix, epoch: u64 },
}

/// Handle to a horizon engine running on its own serial task.
///
/// All methods enqueue without blocking. Events are fanned out to every
/// subscriber; consumers should tolerate occasional duplicate approaching
/// deliveries.
///
/// Must be created from within a tokio runtime.
pub struct HorizonMonitor {
    commands: mpsc::UnboundedSender<Command>,
    events: broadcast::Sender<HorizonEvent>,
    epoch: AtomicU64,
    task: JoinHandle<()>,
}

impl HorizonMonitor {
    /// Validate the configuration and spawn the processing task.
    pub fn spawn(config: HorizonConfig) -> Result<Self> {
        Self::spawn_with_observer(config, Arc::new(NoopObserver))
    }

    /// As [`spawn`](Self::spawn), with an observer hooked into the engine's
    /// lifecycle points.
    pub fn spawn_with_observer(
        config: HorizonConfig,
        observer: Arc<dyn HorizonObserver>,
    ) -> Result<Self> {
        config.validate()?;

        let (commands, mut command_rx) = mpsc::unbounded_channel();
        let (events, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);

        let mut engine = HorizonEngine::with_observer(config, observer);
        let event_tx = events.clone();

        let task = tokio::spawn(async move {
            let mut current_epoch = 0u64;
            while let Some(command) = command_rx.recv().await {
                match command {
                    Command::Start { route, epoch } => {
                        current_epoch = epoch;
                        engine.start_monitoring(&route);
                    }
                    Command::Stop { epoch } => {
                        current_epoch = epoch;
                        engine.stop_monitoring();
                    }
                    Command::Fix { fix, epoch } => {
                        if epoch != current_epoch {
                            debug!("discarding fix from stale monitoring epoch {epoch}");
                            continue;
                        }
                        for event in engine.process_fix(&fix) {
                            // Send only fails when no subscriber exists;
                            // monitoring continues regardless.
                            let _ = event_tx.send(event);
                        }
                    }
                }
            }
        });

        Ok(Self {
            commands,
            events,
            epoch: AtomicU64::new(0),
            task,
        })
    }

    /// Subscribe to the event stream. Each subscriber receives every event
    /// emitted after the call.
    pub fn subscribe(&self) -> broadcast::Receiver<HorizonEvent> {
        self.events.subscribe()
    }

    /// Begin monitoring a route. Starts a new monitoring epoch; fixes
    /// enqueued before this call are discarded.
    pub fn start_monitoring(&self, route: Route) -> Result<()> {
        let epoch = self.epoch.fetch_add(1, Ordering::SeqCst) + 1;
        self.send(Command::Start {
            route: Box::new(route),
            epoch,
        })
    }

    /// Stop monitoring and clear all engine state. Fixes still queued from
    /// the stopped session are discarded, not replayed into a fresh table.
    pub fn stop_monitoring(&self) -> Result<()> {
        let epoch = self.epoch.fetch_add(1, Ordering::SeqCst) + 1;
        self.send(Command::Stop { epoch })
    }

    /// Enqueue a location fix for the next scan.
    pub fn process_location(&self, fix: LocationFix) -> Result<()> {
        let epoch = self.epoch.load(Ordering::SeqCst);
        self.send(Command::Fix { fix, epoch })
    }

    /// Shut the monitor down and wait for the task to drain.
    pub async fn shutdown(self) {
        drop(self.commands);
        let _ = self.task.await;
    }

    fn send(&self, command: Command) -> Result<()> {
        self.commands
            .send(command)
            .map_err(|_| HorizonError::MonitorStopped)
    }
}
