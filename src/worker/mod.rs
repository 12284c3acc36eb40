//! Background polling worker.
//!
//! A [`Worker`] owns at most one polling task. The task wakes on a fixed ticker, calls its
//! [`Source`] once on tokio's blocking pool under a timeout, and hands successful snapshots
//! to a callback. Cancellation goes through a [`CancellationToken`] that is checked while
//! waiting for the next tick and while a source call is outstanding.
//!
//! ```text
//! Stopped --start--> Running --stop--> Draining --task exited--> Stopped
//! ```
//!
//! [`Worker::stop`] only returns once the task has exited, so a caller can start a fresh
//! task right after it without the two ever overlapping. Every source call holds the
//! worker's single call permit until it returns, including calls that outlived their
//! timeout or the task that made them. Ticks that find the permit taken are skipped, in
//! this task or in a later one started by the same worker.

use std::{sync::Arc, time::Duration};

use parking_lot::Mutex;
use tokio::{
    runtime::Handle,
    sync::Semaphore,
    task::{self, JoinHandle},
    time::{self, MissedTickBehavior},
};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use crate::{core::types::RawSnapshot, traits::Source, Error, Result};

/// Lifecycle state of a worker
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorkerState {
    Stopped,
    Running,
    /// Cancellation requested, the task is finishing its current iteration
    Draining,
}

/// Owner of one sensor's polling task
pub struct Worker {
    name: String,
    state: Arc<Mutex<WorkerState>>,
    /// One permit, held by whichever source call is running
    call_gate: Arc<Semaphore>,
    cancel: Option<CancellationToken>,
    task: Option<JoinHandle<()>>,
}

impl Worker {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            state: Arc::new(Mutex::new(WorkerState::Stopped)),
            call_gate: Arc::new(Semaphore::new(1)),
            cancel: None,
            task: None,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn state(&self) -> WorkerState {
        *self.state.lock()
    }

    pub fn is_running(&self) -> bool {
        self.state() == WorkerState::Running
    }

    /// Shared view of the state that outlives individual start/stop cycles
    pub(crate) fn state_handle(&self) -> Arc<Mutex<WorkerState>> {
        Arc::clone(&self.state)
    }

    /// Spawns the polling task
    ///
    /// `on_sample` runs on the polling task for every successful source call, in order.
    ///
    /// # Errors
    ///
    /// * [`Error::AlreadyRunning`] if this worker's task has not been stopped
    /// * [`Error::Task`] if called outside a tokio runtime
    pub fn start<F>(
        &mut self,
        interval: Duration,
        source_timeout: Duration,
        source: Arc<dyn Source>,
        on_sample: F,
    ) -> Result<()>
    where
        F: FnMut(RawSnapshot) + Send + 'static,
    {
        if let Some(task) = &self.task {
            if !task.is_finished() {
                return Err(Error::AlreadyRunning);
            }
        }

        let runtime = Handle::try_current().map_err(|e| Error::task(format!("no tokio runtime: {}", e)))?;

        let cancel = CancellationToken::new();
        let polling = PollLoop {
            name: self.name.clone(),
            interval,
            source_timeout,
            source,
            call_gate: Arc::clone(&self.call_gate),
            cancel: cancel.clone(),
            state: Arc::clone(&self.state),
        };

        *self.state.lock() = WorkerState::Running;
        self.task = Some(runtime.spawn(polling.run(on_sample)));
        self.cancel = Some(cancel);

        info!(sensor = %self.name, interval_ms = interval.as_millis() as u64, "worker started");
        Ok(())
    }

    /// Cancels the polling task and waits for it to exit
    ///
    /// Calling this on a stopped worker does nothing.
    pub async fn stop(&mut self) {
        if let Some(cancel) = self.cancel.take() {
            cancel.cancel();
        }

        let Some(task) = self.task.take() else {
            return;
        };

        {
            let mut state = self.state.lock();
            if *state == WorkerState::Running {
                *state = WorkerState::Draining;
            }
        }

        if let Err(e) = task.await {
            if e.is_panic() {
                error!(sensor = %self.name, error = %e, "polling task panicked");
            }
        }

        *self.state.lock() = WorkerState::Stopped;
        info!(sensor = %self.name, "worker stopped");
    }
}

impl Drop for Worker {
    fn drop(&mut self) {
        // Can't await here; the task sees the cancellation at its next await point.
        if let Some(cancel) = self.cancel.take() {
            cancel.cancel();
        }
    }
}

struct PollLoop {
    name: String,
    interval: Duration,
    source_timeout: Duration,
    source: Arc<dyn Source>,
    call_gate: Arc<Semaphore>,
    cancel: CancellationToken,
    state: Arc<Mutex<WorkerState>>,
}

impl PollLoop {
    async fn run<F>(self, mut on_sample: F)
    where
        F: FnMut(RawSnapshot) + Send + 'static,
    {
        let PollLoop { name, interval, source_timeout, source, call_gate, cancel, state } = self;
        let _stopped = scopeguard::guard(state, |state| *state.lock() = WorkerState::Stopped);

        let mut ticker = time::interval_at(time::Instant::now() + interval, interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

        loop {
            tokio::select! {
                biased;
                _ = cancel.cancelled() => break,
                _ = ticker.tick() => {},
            }

            // Taken by a call that timed out earlier, possibly one started by a previous task.
            let Ok(permit) = Arc::clone(&call_gate).try_acquire_owned() else {
                warn!(sensor = %name, "previous source call still running, skipping tick");
                continue;
            };

            let reader = Arc::clone(&source);
            let mut call = task::spawn_blocking(move || {
                let _permit = permit;
                reader.read_snapshot()
            });

            let outcome = tokio::select! {
                biased;
                _ = cancel.cancelled() => None,
                result = time::timeout(source_timeout, &mut call) => Some(result),
            };

            let Some(outcome) = outcome else {
                break;
            };

            match outcome {
                Ok(Ok(Ok(snapshot))) => {
                    debug!(sensor = %name, entries = snapshot.len(), "sampled");
                    on_sample(snapshot);
                },
                Ok(Ok(Err(e))) => {
                    warn!(sensor = %name, error = %e, "source read failed, keeping last reading");
                },
                Ok(Err(e)) => {
                    let e = Error::source_failed(format!("{} panicked: {}", source.name(), e));
                    warn!(sensor = %name, error = %e, "source call panicked, keeping last reading");
                },
                Err(_) => {
                    // The call keeps its permit until it returns; its result is dropped.
                    warn!(
                        sensor = %name,
                        error = %Error::Timeout(source_timeout),
                        "source call timed out, keeping last reading"
                    );
                },
            }
        }

        if call_gate.available_permits() == 0 {
            match time::timeout(source_timeout, call_gate.acquire()).await {
                Ok(_) => debug!(sensor = %name, "drained pending source call"),
                Err(_) => warn!(
                    sensor = %name,
                    "source call still running after drain timeout, next task skips ticks until it returns"
                ),
            }
        }

        debug!(sensor = %name, "polling loop exited");
    }
}
