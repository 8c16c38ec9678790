// src/onboarding/controller.rs
//! Onboarding state machine
//!
//! Pure and synchronous: every input returns the side effects the caller
//! must carry out as `Command`s. `session` runs it on an event loop.

use std::fmt;
use std::sync::Arc;

use tokio::time::{Duration, Instant};

use crate::analysis::{AnalysisResult, Profile};
use crate::onboarding::progress::{ProgressEstimator, ProgressState};
use crate::onboarding::view::{OnboardingSnapshot, OnboardingView, ReviewView};
use crate::storage::{self, CompletionStore, KeyValueStore};

/// Post-onboarding destination
pub const HOME_ROUTE: &str = "/home";

/// Pause on a full progress bar before showing the profile
pub const SUCCESS_REVEAL_DELAY: Duration = Duration::from_millis(500);

/// Pause on the error message before showing the fallback profile
pub const FAILURE_REVEAL_DELAY: Duration = Duration::from_millis(1500);

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum OnboardingPhase {
    #[default]
    Welcome,
    Analyzing,
    Reviewing,
}

/// Snapshot from the wallet authentication provider
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AuthState {
    pub is_authenticated: bool,
    pub address: Option<String>,
}

impl AuthState {
    pub fn connected(address: impl Into<String>) -> Self {
        Self {
            is_authenticated: true,
            address: Some(address.into()),
        }
    }

    pub fn disconnected() -> Self {
        Self::default()
    }

    /// The wallet address, ignoring blank values
    pub fn address(&self) -> Option<&str> {
        self.address.as_deref().filter(|a| !a.trim().is_empty())
    }

    fn authenticated_address(&self) -> Option<&str> {
        if self.is_authenticated {
            self.address()
        } else {
            None
        }
    }
}

/// Identifies one analysis request. Only the newest one may change state.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct AttemptId(u64);

impl AttemptId {
    fn next(self) -> Self {
        AttemptId(self.0 + 1)
    }
}

impl fmt::Display for AttemptId {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Navigation {
    pub route: &'static str,
    /// Replace the current history entry instead of pushing
    pub replace: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    StartAnalysis { attempt: AttemptId, address: String },
    /// Drop the in-flight analysis request, its result is no longer wanted
    CancelAnalysis,
    StartProgressTicker { attempt: AttemptId },
    StopProgressTicker,
    ScheduleReveal { attempt: AttemptId, delay: Duration },
    Navigate(Navigation),
}

#[derive(Debug, Clone)]
struct PendingAttempt {
    id: AttemptId,
    address: String,
}

pub struct OnboardingController {
    phase: OnboardingPhase,
    auth: AuthState,
    store: Arc<dyn KeyValueStore>,
    completions: CompletionStore,
    last_attempt: AttemptId,
    /// Address the latest attempt analyzed (pending or settled)
    attempt_address: Option<String>,
    pending: Option<PendingAttempt>,
    estimator: Option<ProgressEstimator>,
    progress: ProgressState,
    ticker_active: bool,
    awaiting_reveal: Option<AttemptId>,
    analysis: Option<AnalysisResult>,
    profile: Option<Profile>,
    error: Option<String>,
    navigation: Option<Navigation>,
    torn_down: bool,
}

impl OnboardingController {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self {
            phase: OnboardingPhase::Welcome,
            auth: AuthState::default(),
            completions: CompletionStore::new(store.clone()),
            store,
            last_attempt: AttemptId::default(),
            attempt_address: None,
            pending: None,
            estimator: None,
            progress: ProgressState::default(),
            ticker_active: false,
            awaiting_reveal: None,
            analysis: None,
            profile: None,
            error: None,
            navigation: None,
            torn_down: false,
        }
    }

    pub fn phase(&self) -> OnboardingPhase {
        self.phase
    }

    pub fn progress(&self) -> ProgressState {
        self.progress
    }

    pub fn analysis(&self) -> Option<&AnalysisResult> {
        self.analysis.as_ref()
    }

    pub fn profile(&self) -> Option<&Profile> {
        self.profile.as_ref()
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn navigation(&self) -> Option<&Navigation> {
        self.navigation.as_ref()
    }

    pub fn completions(&self) -> &CompletionStore {
        &self.completions
    }

    pub fn is_ticker_active(&self) -> bool {
        self.ticker_active
    }

    /// First evaluation with the auth state known at mount time
    pub fn mount(&mut self, auth: AuthState, now: Instant) -> Vec<Command> {
        self.auth_changed(auth, now)
    }

    pub fn auth_changed(&mut self, auth: AuthState, now: Instant) -> Vec<Command> {
        self.auth = auth;
        if self.torn_down {
            return Vec::new();
        }

        // Returning wallets skip onboarding, but only before it has started
        if self.phase == OnboardingPhase::Welcome {
            if let Some(address) = self.auth.authenticated_address() {
                if self.completions.has(address) {
                    log::info!("Wallet {} already onboarded, skipping", address);
                    let navigation = Navigation {
                        route: HOME_ROUTE,
                        replace: true,
                    };
                    self.navigation = Some(navigation.clone());
                    return vec![Command::Navigate(navigation)];
                }
            }
            return Vec::new();
        }

        if self.phase != OnboardingPhase::Analyzing {
            return Vec::new();
        }

        let Some(address) = self.auth.authenticated_address().map(str::to_string) else {
            // Gated content is hidden, the timer goes with it
            return self.release_ticker().into_iter().collect();
        };

        if self.attempt_address.as_deref() != Some(address.as_str()) {
            return self.begin_attempt(address, now);
        }

        match &self.pending {
            Some(pending) if !self.ticker_active => {
                self.ticker_active = true;
                vec![Command::StartProgressTicker { attempt: pending.id }]
            }
            _ => Vec::new(),
        }
    }

    /// The wallet-connect widget finished a connection
    pub fn wallet_connected(&mut self, now: Instant) -> Vec<Command> {
        if self.torn_down {
            return Vec::new();
        }

        let mut commands = self.abandon_attempt();
        self.phase = OnboardingPhase::Analyzing;
        self.attempt_address = None;
        self.awaiting_reveal = None;
        self.clear_result();
        self.progress = ProgressState::default();

        if let Some(address) = self.auth.authenticated_address().map(str::to_string) {
            commands.extend(self.begin_attempt(address, now));
        } else {
            log::debug!("Wallet connected before auth resolved, waiting for an address");
        }
        commands
    }

    pub fn progress_tick(&mut self, attempt: AttemptId, now: Instant) -> bool {
        let current = self.pending.as_ref().is_some_and(|p| p.id == attempt);
        if !current || !self.ticker_active {
            return false;
        }
        match self.estimator.as_mut() {
            Some(estimator) => {
                self.progress = estimator.tick(now);
                true
            }
            None => false,
        }
    }

    /// Single settle event for an attempt. Stale attempts are ignored.
    pub fn analysis_settled(
        &mut self,
        attempt: AttemptId,
        outcome: Result<AnalysisResult, String>,
    ) -> Vec<Command> {
        let current = self.pending.as_ref().is_some_and(|p| p.id == attempt);
        if !current || self.phase != OnboardingPhase::Analyzing {
            log::debug!("Discarding analysis response for stale attempt {}", attempt);
            return Vec::new();
        }
        self.pending = None;

        self.progress = match self.estimator.as_mut() {
            Some(estimator) => estimator.stop(),
            None => ProgressState::complete(),
        };
        let mut commands: Vec<Command> = self.release_ticker().into_iter().collect();

        let delay = match outcome {
            Ok(result) => {
                let profile = Profile::from_analysis(&result);
                log::info!("Analysis {} settled: {}", attempt, profile.title);
                storage::save_profile(self.store.as_ref(), &profile);
                self.profile = Some(profile);
                self.analysis = Some(result);
                self.error = None;
                SUCCESS_REVEAL_DELAY
            }
            Err(message) => {
                log::warn!("Analysis {} failed: {}", attempt, message);
                let profile = Profile::fallback();
                storage::save_profile(self.store.as_ref(), &profile);
                self.profile = Some(profile);
                self.analysis = None;
                self.error = Some(message);
                FAILURE_REVEAL_DELAY
            }
        };

        self.awaiting_reveal = Some(attempt);
        commands.push(Command::ScheduleReveal { attempt, delay });
        commands
    }

    /// The display delay after a settle elapsed
    pub fn reveal(&mut self, attempt: AttemptId) -> bool {
        if self.awaiting_reveal != Some(attempt) || self.phase != OnboardingPhase::Analyzing {
            return false;
        }
        self.awaiting_reveal = None;
        self.phase = OnboardingPhase::Reviewing;
        true
    }

    /// User accepted the profile
    pub fn confirm(&mut self) -> Vec<Command> {
        if self.torn_down || self.view_phase() != OnboardingPhase::Reviewing {
            return Vec::new();
        }

        if let Some(address) = self.auth.address() {
            self.completions.add(address);
        }

        let navigation = Navigation {
            route: HOME_ROUTE,
            replace: false,
        };
        self.navigation = Some(navigation.clone());
        vec![Command::Navigate(navigation)]
    }

    /// The owning screen went away
    pub fn teardown(&mut self) -> Vec<Command> {
        if self.torn_down {
            return Vec::new();
        }
        self.torn_down = true;
        self.awaiting_reveal = None;
        self.abandon_attempt()
    }

    pub fn view(&self) -> OnboardingView {
        match self.view_phase() {
            OnboardingPhase::Welcome => OnboardingView::Welcome,
            OnboardingPhase::Analyzing => OnboardingView::Analyzing {
                progress: self.progress,
                error: self.error.clone(),
            },
            OnboardingPhase::Reviewing => OnboardingView::Reviewing(ReviewView {
                profile: self.profile.clone().unwrap_or_else(Profile::fallback),
                analysis: self.analysis.clone(),
                error: self.error.clone(),
            }),
        }
    }

    pub fn snapshot(&self) -> OnboardingSnapshot {
        OnboardingSnapshot {
            phase: self.phase,
            view: self.view(),
            navigation: self.navigation.clone(),
        }
    }

    /// Phase whose view is shown. Without auth only Welcome is visible.
    fn view_phase(&self) -> OnboardingPhase {
        if self.phase != OnboardingPhase::Welcome && !self.auth.is_authenticated {
            OnboardingPhase::Welcome
        } else {
            self.phase
        }
    }

    fn begin_attempt(&mut self, address: String, now: Instant) -> Vec<Command> {
        let mut commands = self.abandon_attempt();

        self.last_attempt = self.last_attempt.next();
        let attempt = self.last_attempt;
        log::info!("Starting wallet analysis {} for {}", attempt, address);

        let estimator = ProgressEstimator::start(now);
        self.progress = estimator.state();
        self.estimator = Some(estimator);
        self.ticker_active = true;
        self.awaiting_reveal = None;
        self.attempt_address = Some(address.clone());
        self.pending = Some(PendingAttempt {
            id: attempt,
            address: address.clone(),
        });
        self.clear_result();

        commands.push(Command::StartAnalysis { attempt, address });
        commands.push(Command::StartProgressTicker { attempt });
        commands
    }

    fn abandon_attempt(&mut self) -> Vec<Command> {
        let mut commands = Vec::new();
        if let Some(pending) = self.pending.take() {
            log::debug!("Abandoning analysis {} for {}", pending.id, pending.address);
            commands.push(Command::CancelAnalysis);
        }
        commands.extend(self.release_ticker());
        commands
    }

    fn release_ticker(&mut self) -> Option<Command> {
        if self.ticker_active {
            self.ticker_active = false;
            Some(Command::StopProgressTicker)
        } else {
            None
        }
    }

    fn clear_result(&mut self) {
        self.analysis = None;
        self.profile = None;
        self.error = None;
    }
}
