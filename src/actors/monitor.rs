//! MonitorActor - the recurring tick loop of one aggregator
//!
//! ## Message Flow
//!
//! ```text
//! Timer tick → Aggregator::tick → on_tick(report) → channel
//! ```
//!
//! Ticks are awaited one after another, so for a single aggregator they
//! never overlap. The first tick fires one full period after the loop is
//! started. The loop has no exit of its own: cancelling or dropping the
//! [`MonitorHandle`] aborts the task.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior, interval_at};
use tracing::{debug, error, instrument, trace};

use crate::aggregator::Aggregator;
use crate::error::AqiResult;

/// Actor that ticks a single aggregator
pub struct MonitorActor<F> {
    aggregator: Arc<dyn Aggregator>,

    /// Delivery step, awaited once per produced report
    on_tick: F,

    period: Duration,
}

impl<F, Fut> MonitorActor<F>
where
    F: Fn(String) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = ()> + Send,
{
    pub fn new(aggregator: Arc<dyn Aggregator>, period: Duration, on_tick: F) -> Self {
        Self {
            aggregator,
            on_tick,
            period,
        }
    }

    /// Tick forever; a failed tick is logged and the loop carries on.
    #[instrument(skip(self), fields(period = ?self.period))]
    pub async fn run(self) {
        debug!("starting monitor loop");

        let mut ticker = interval_at(Instant::now() + self.period, self.period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            ticker.tick().await;
            if let Err(e) = self.tick().await {
                error!("monitoring tick failed: {}", e);
            }
        }
    }

    async fn tick(&self) -> AqiResult<()> {
        trace!("tick");
        match self.aggregator.tick().await? {
            Some(report) => (self.on_tick)(report).await,
            None => trace!("nothing to deliver this tick"),
        }
        Ok(())
    }
}

/// Handle for one running tick loop
///
/// At most one exists per controller; it is the controller's timer.
#[derive(Debug)]
pub struct MonitorHandle {
    task: JoinHandle<()>,
    period: Duration,
}

impl MonitorHandle {
    /// Spawn a tick loop for `aggregator` that hands every tick's report
    /// to `on_tick`.
    pub fn spawn<F, Fut>(aggregator: Arc<dyn Aggregator>, period: Duration, on_tick: F) -> Self
    where
        F: Fn(String) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        let actor = MonitorActor::new(aggregator, period, on_tick);
        let task = tokio::spawn(actor.run());

        Self { task, period }
    }

    pub fn period(&self) -> Duration {
        self.period
    }

    /// Stop the loop immediately and wait until the task is gone.
    ///
    /// A tick that is in flight is dropped at its next await point.
    pub async fn cancel(mut self) {
        self.task.abort();
        let _ = (&mut self.task).await;
        debug!("monitor loop cancelled");
    }
}

impl Drop for MonitorHandle {
    fn drop(&mut self) {
        self.task.abort();
    }
}
