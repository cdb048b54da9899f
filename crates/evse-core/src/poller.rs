// ── Telemetry poller ──
//
// Two states, idle and polling. `start()` fetches immediately, then on every
// period tick. Each tick runs in its own task: a slow response never delays
// the next tick, and overlapping responses publish last-writer-wins. The
// returned `PollHandle` owns the schedule; releasing it (stop or drop)
// cancels the schedule exactly once. Requests already in flight finish and
// may still publish.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;
use tracing::{debug, trace};

use crate::error::CoreError;
use crate::panel::Panel;
use crate::view::TelemetryView;

/// Observable poller state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PollerState {
    Idle,
    Polling,
}

/// Periodic `/api/status` fetcher publishing into a `watch` channel.
pub struct TelemetryPoller {
    panel: Panel,
    period: Duration,
    tx: Arc<watch::Sender<TelemetryView>>,
    active: Arc<AtomicBool>,
}

impl TelemetryPoller {
    pub fn new(panel: Panel, period: Duration) -> Self {
        let (tx, _) = watch::channel(TelemetryView::pending());
        Self {
            panel,
            period,
            tx: Arc::new(tx),
            active: Arc::new(AtomicBool::new(false)),
        }
    }

    pub fn period(&self) -> Duration {
        self.period
    }

    /// Latest published view. Starts as [`TelemetryView::pending`].
    pub fn subscribe(&self) -> watch::Receiver<TelemetryView> {
        self.tx.subscribe()
    }

    pub fn state(&self) -> PollerState {
        if self.active.load(Ordering::SeqCst) {
            PollerState::Polling
        } else {
            PollerState::Idle
        }
    }

    /// Begin polling. Fails with [`CoreError::AlreadyPolling`] if a handle
    /// from an earlier call is still live.
    pub fn start(&self) -> Result<PollHandle, CoreError> {
        if self
            .active
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_err()
        {
            return Err(CoreError::AlreadyPolling);
        }

        let cancel = CancellationToken::new();
        let task = tokio::spawn(poll_task(
            self.panel.clone(),
            self.period,
            Arc::clone(&self.tx),
            cancel.clone(),
        ));
        debug!(period = ?self.period, "telemetry polling started");

        Ok(PollHandle {
            cancel,
            task: Some(task),
            active: Arc::clone(&self.active),
            released: false,
        })
    }
}

/// Owns a running poll schedule. Dropping it cancels the schedule.
pub struct PollHandle {
    cancel: CancellationToken,
    task: Option<JoinHandle<()>>,
    active: Arc<AtomicBool>,
    released: bool,
}

impl PollHandle {
    /// Cancel the schedule and wait for the scheduler task to exit.
    pub async fn stop(mut self) {
        self.release();
        if let Some(task) = self.task.take() {
            let _ = task.await;
        }
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancel.is_cancelled()
    }

    fn release(&mut self) {
        if self.released {
            return;
        }
        self.released = true;
        self.cancel.cancel();
        self.active.store(false, Ordering::SeqCst);
        debug!("telemetry polling stopped");
    }
}

impl Drop for PollHandle {
    fn drop(&mut self) {
        self.release();
    }
}

async fn poll_task(
    panel: Panel,
    period: Duration,
    tx: Arc<watch::Sender<TelemetryView>>,
    cancel: CancellationToken,
) {
    let mut interval = tokio::time::interval(period);
    interval.set_missed_tick_behavior(MissedTickBehavior::Skip);

    loop {
        tokio::select! {
            biased;
            () = cancel.cancelled() => break,
            _ = interval.tick() => {
                trace!("telemetry tick");
                let panel = panel.clone();
                let tx = Arc::clone(&tx);
                tokio::spawn(async move {
                    let view = panel.telemetry().await;
                    tx.send_replace(view);
                });
            }
        }
    }
}
