// src/onboarding/session.rs
//! Event loop that runs the onboarding controller
//!
//! All state changes happen on one task, one event at a time. The analysis
//! call, the progress ticker and the reveal delay are child tasks that only
//! talk back through events tagged with their attempt id.

use std::sync::Arc;

use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tokio::time::Instant;

use crate::analysis::{AnalysisResult, WalletAnalyzer};
use crate::onboarding::controller::{AttemptId, AuthState, Command, OnboardingController};
use crate::onboarding::progress::{ProgressTicker, PROGRESS_TICK_INTERVAL};
use crate::onboarding::view::OnboardingSnapshot;

#[derive(Debug)]
enum SessionEvent {
    AuthChanged(AuthState),
    WalletConnected,
    Confirmed,
    Teardown,
    ProgressTick(AttemptId),
    AnalysisSettled(AttemptId, Result<AnalysisResult, String>),
    RevealProfile(AttemptId),
}

/// Cloneable front end of a running session
#[derive(Clone)]
pub struct OnboardingHandle {
    events: mpsc::UnboundedSender<SessionEvent>,
    snapshots: watch::Receiver<OnboardingSnapshot>,
}

impl OnboardingHandle {
    pub fn auth_changed(&self, auth: AuthState) {
        self.send(SessionEvent::AuthChanged(auth));
    }

    /// Callback for the wallet-connect widget
    pub fn wallet_connected(&self) {
        self.send(SessionEvent::WalletConnected);
    }

    pub fn confirm(&self) {
        self.send(SessionEvent::Confirmed);
    }

    pub fn teardown(&self) {
        self.send(SessionEvent::Teardown);
    }

    pub fn snapshot(&self) -> OnboardingSnapshot {
        self.snapshots.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<OnboardingSnapshot> {
        self.snapshots.clone()
    }

    fn send(&self, event: SessionEvent) {
        if self.events.send(event).is_err() {
            log::debug!("Onboarding session already closed");
        }
    }
}

/// Aborts the wrapped task when dropped
struct TaskGuard(JoinHandle<()>);

impl Drop for TaskGuard {
    fn drop(&mut self) {
        self.0.abort();
    }
}

struct Session {
    controller: OnboardingController,
    analyzer: Arc<dyn WalletAnalyzer>,
    events: mpsc::UnboundedReceiver<SessionEvent>,
    // Weak so the loop ends once every handle is gone
    loopback: mpsc::WeakUnboundedSender<SessionEvent>,
    snapshots: watch::Sender<OnboardingSnapshot>,
    ticker: Option<ProgressTicker>,
    analysis_task: Option<TaskGuard>,
    reveal_task: Option<TaskGuard>,
}

/// Start a session on the current tokio runtime.
///
/// The session ends on `teardown` or when every handle has been dropped;
/// either way the ticker, the in-flight analysis and any pending reveal are
/// released with it.
pub fn spawn(
    controller: OnboardingController,
    analyzer: Arc<dyn WalletAnalyzer>,
) -> (OnboardingHandle, JoinHandle<()>) {
    let (events_tx, events_rx) = mpsc::unbounded_channel();
    let (snapshots_tx, snapshots_rx) = watch::channel(controller.snapshot());

    let session = Session {
        controller,
        analyzer,
        events: events_rx,
        loopback: events_tx.downgrade(),
        snapshots: snapshots_tx,
        ticker: None,
        analysis_task: None,
        reveal_task: None,
    };
    let join = tokio::spawn(session.run());

    let handle = OnboardingHandle {
        events: events_tx,
        snapshots: snapshots_rx,
    };
    (handle, join)
}

impl Session {
    async fn run(mut self) {
        while let Some(event) = self.events.recv().await {
            let closing = matches!(event, SessionEvent::Teardown);
            let now = Instant::now();

            let commands = match event {
                SessionEvent::AuthChanged(auth) => self.controller.auth_changed(auth, now),
                SessionEvent::WalletConnected => self.controller.wallet_connected(now),
                SessionEvent::Confirmed => self.controller.confirm(),
                SessionEvent::Teardown => self.controller.teardown(),
                SessionEvent::ProgressTick(attempt) => {
                    self.controller.progress_tick(attempt, now);
                    Vec::new()
                }
                SessionEvent::AnalysisSettled(attempt, outcome) => {
                    self.controller.analysis_settled(attempt, outcome)
                }
                SessionEvent::RevealProfile(attempt) => {
                    self.controller.reveal(attempt);
                    Vec::new()
                }
            };

            for command in commands {
                self.execute(command);
            }
            self.publish();

            if closing {
                break;
            }
        }

        self.ticker = None;
        self.analysis_task = None;
        self.reveal_task = None;
        log::debug!("Onboarding session closed");
    }

    fn execute(&mut self, command: Command) {
        match command {
            Command::StartAnalysis { attempt, address } => {
                let analyzer = self.analyzer.clone();
                let loopback = self.loopback.clone();
                let task = tokio::spawn(async move {
                    let outcome = analyzer.analyze(&address).await;
                    if let Some(events) = loopback.upgrade() {
                        let _ = events.send(SessionEvent::AnalysisSettled(attempt, outcome));
                    }
                });
                // Replacing the guard aborts a superseded request
                self.analysis_task = Some(TaskGuard(task));
            }
            Command::CancelAnalysis => {
                self.analysis_task = None;
            }
            Command::StartProgressTicker { attempt } => {
                let loopback = self.loopback.clone();
                self.ticker = Some(ProgressTicker::spawn(PROGRESS_TICK_INTERVAL, move || {
                    match loopback.upgrade() {
                        Some(events) => events.send(SessionEvent::ProgressTick(attempt)).is_ok(),
                        None => false,
                    }
                }));
            }
            Command::StopProgressTicker => {
                if let Some(mut ticker) = self.ticker.take() {
                    ticker.stop();
                }
            }
            Command::ScheduleReveal { attempt, delay } => {
                let loopback = self.loopback.clone();
                let task = tokio::spawn(async move {
                    tokio::time::sleep(delay).await;
                    if let Some(events) = loopback.upgrade() {
                        let _ = events.send(SessionEvent::RevealProfile(attempt));
                    }
                });
                self.reveal_task = Some(TaskGuard(task));
            }
            Command::Navigate(navigation) => {
                log::info!("Navigating to {}", navigation.route);
            }
        }
    }

    fn publish(&self) {
        let next = self.controller.snapshot();
        self.snapshots.send_if_modified(|current| {
            if *current == next {
                false
            } else {
                *current = next;
                true
            }
        });
    }
}
