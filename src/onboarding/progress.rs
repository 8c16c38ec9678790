// src/onboarding/progress.rs
//! Time-based progress estimate for an analysis of unknown duration
//!
//! The bar advances linearly towards an assumed duration, stalls at
//! `PROGRESS_CAP_PERCENT`, and only reaches 100 when the real result is in.

use tokio::task::JoinHandle;
use tokio::time::{Duration, Instant, MissedTickBehavior};

/// Assumed analysis duration the bar is paced against
pub const ESTIMATED_ANALYSIS_DURATION: Duration = Duration::from_millis(5000);

/// Period of the recurring progress tick
pub const PROGRESS_TICK_INTERVAL: Duration = Duration::from_millis(100);

/// Highest percentage shown before the analysis settles
pub const PROGRESS_CAP_PERCENT: f64 = 95.0;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ProgressState {
    pub percent: f64,
    pub seconds_remaining: u64,
}

impl ProgressState {
    pub fn starting(estimate: Duration) -> Self {
        Self {
            percent: 0.0,
            seconds_remaining: ceil_seconds(estimate),
        }
    }

    pub fn complete() -> Self {
        Self {
            percent: 100.0,
            seconds_remaining: 0,
        }
    }

    pub fn is_complete(&self) -> bool {
        self.percent >= 100.0
    }
}

impl Default for ProgressState {
    fn default() -> Self {
        Self::starting(ESTIMATED_ANALYSIS_DURATION)
    }
}

fn ceil_seconds(duration: Duration) -> u64 {
    let millis = duration.as_millis() as u64;
    millis.div_ceil(1000)
}

/// Progress for one analysis attempt
#[derive(Debug, Clone)]
pub struct ProgressEstimator {
    started_at: Instant,
    estimate: Duration,
    state: ProgressState,
    stopped: bool,
}

impl ProgressEstimator {
    pub fn start(now: Instant) -> Self {
        Self::with_estimate(now, ESTIMATED_ANALYSIS_DURATION)
    }

    pub fn with_estimate(now: Instant, estimate: Duration) -> Self {
        Self {
            started_at: now,
            estimate,
            state: ProgressState::starting(estimate),
            stopped: false,
        }
    }

    pub fn state(&self) -> ProgressState {
        self.state
    }

    pub fn is_stopped(&self) -> bool {
        self.stopped
    }

    /// Advance to `now`. Never moves backwards and never passes the cap.
    pub fn tick(&mut self, now: Instant) -> ProgressState {
        if self.stopped {
            return self.state;
        }

        let elapsed = now.saturating_duration_since(self.started_at);
        let ratio = elapsed.as_secs_f64() / self.estimate.as_secs_f64().max(f64::EPSILON);
        let percent = (ratio * 100.0).min(PROGRESS_CAP_PERCENT);
        let seconds_remaining = ceil_seconds(self.estimate.saturating_sub(elapsed));

        self.state = ProgressState {
            percent: percent.max(self.state.percent),
            seconds_remaining: seconds_remaining.min(self.state.seconds_remaining),
        };
        self.state
    }

    /// The analysis settled: jump to 100 and freeze.
    pub fn stop(&mut self) -> ProgressState {
        self.stopped = true;
        self.state = ProgressState::complete();
        self.state
    }
}

/// Recurring tick task. Aborted on `stop` or when dropped.
pub struct ProgressTicker {
    handle: Option<JoinHandle<()>>,
}

impl ProgressTicker {
    /// Call `on_tick` every `period`, first call one period from now.
    /// The task ends on its own once `on_tick` returns `false`.
    pub fn spawn<F>(period: Duration, mut on_tick: F) -> Self
    where
        F: FnMut() -> bool + Send + 'static,
    {
        let handle = tokio::spawn(async move {
            let mut interval = tokio::time::interval_at(Instant::now() + period, period);
            interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                interval.tick().await;
                if !on_tick() {
                    break;
                }
            }
        });

        Self {
            handle: Some(handle),
        }
    }

    pub fn is_running(&self) -> bool {
        self.handle.as_ref().is_some_and(|h| !h.is_finished())
    }

    /// Release the timer. Returns `false` if it was already released.
    pub fn stop(&mut self) -> bool {
        match self.handle.take() {
            Some(handle) => {
                handle.abort();
                true
            }
            None => false,
        }
    }
}

impl Drop for ProgressTicker {
    fn drop(&mut self) {
        self.stop();
    }
}
