//! Job trait and the timer loop that drives it.
//!
//! Each job gets one spawned task that sleeps until the next firing, runs the job to
//! completion, and only then computes the next delay, so runs of the same job never overlap.
//! Cancelling the shared token stops new runs; a run already in progress finishes.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, NaiveTime, TimeZone, Utc};
use combot_core::Result;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, instrument, warn};

/// Periodic work driven by a [`Schedule`].
#[async_trait]
pub trait Job: Send + Sync {
    fn name(&self) -> &'static str;

    /// One firing; `now` is the wall-clock time the run started.
    async fn run(&self, now: DateTime<Utc>) -> Result<()>;
}

/// When a job fires.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Schedule {
    /// Fixed interval; the first run happens after `first_delay`.
    Every {
        interval: Duration,
        first_delay: Duration,
    },
    /// At each of the given UTC times of day.
    DailyAt(Vec<NaiveTime>),
}

impl Schedule {
    /// Delay before the next run, or `None` when the schedule can never fire.
    pub fn next_delay(&self, now: DateTime<Utc>, first: bool) -> Option<Duration> {
        match self {
            Schedule::Every {
                interval,
                first_delay,
            } => Some(if first { *first_delay } else { *interval }),
            Schedule::DailyAt(times) => {
                let next = next_daily_run(now, times)?;
                Some((next - now).to_std().unwrap_or_default())
            }
        }
    }
}

/// Earliest instant strictly after `now` that falls on one of `times` (UTC).
pub fn next_daily_run(now: DateTime<Utc>, times: &[NaiveTime]) -> Option<DateTime<Utc>> {
    let today = now.date_naive();
    let tomorrow = today.succ_opt()?;
    [today, tomorrow]
        .into_iter()
        .flat_map(|day| times.iter().map(move |time| day.and_time(*time)))
        .map(|naive| Utc.from_utc_datetime(&naive))
        .filter(|candidate| *candidate > now)
        .min()
}

/// Spawns the timer loop for one job.
pub fn spawn_job(
    job: Arc<dyn Job>,
    schedule: Schedule,
    shutdown: CancellationToken,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let name = job.name();
        info!(job = name, schedule = ?schedule, "Job scheduled");
        let mut first = true;
        loop {
            let Some(delay) = schedule.next_delay(Utc::now(), first) else {
                warn!(job = name, "Schedule has no firing times, job not started");
                return;
            };
            first = false;
            debug!(job = name, delay_secs = delay.as_secs(), "Waiting for next run");

            tokio::select! {
                _ = shutdown.cancelled() => {
                    info!(job = name, "Job stopped");
                    return;
                }
                _ = tokio::time::sleep(delay) => {}
            }
            run_once(job.as_ref()).await;
        }
    })
}

#[instrument(skip(job), fields(job = job.name()))]
async fn run_once(job: &dyn Job) {
    if let Err(e) = job.run(Utc::now()).await {
        error!(error = %e, "Job run failed");
    }
}

/// Owns the spawned job loops and their shared shutdown token.
pub struct JobRunner {
    shutdown: CancellationToken,
    handles: Vec<JoinHandle<()>>,
}

impl JobRunner {
    pub fn new(shutdown: CancellationToken) -> Self {
        Self {
            shutdown,
            handles: Vec::new(),
        }
    }

    pub fn spawn(&mut self, job: Arc<dyn Job>, schedule: Schedule) -> &mut Self {
        self.handles
            .push(spawn_job(job, schedule, self.shutdown.child_token()));
        self
    }

    pub fn len(&self) -> usize {
        self.handles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handles.is_empty()
    }

    /// Cancels every loop and waits for in-flight runs to finish.
    pub async fn shutdown(self) {
        self.shutdown.cancel();
        for handle in self.handles {
            if let Err(e) = handle.await {
                error!(error = %e, "Job task panicked");
            }
        }
    }
}
