// src/onboarding/view.rs
//! What the onboarding screen shows, one variant per phase

use crate::analysis::{AnalysisResult, Profile};
use crate::onboarding::controller::{Navigation, OnboardingPhase};
use crate::onboarding::progress::ProgressState;

#[derive(Debug, Clone, PartialEq)]
pub enum OnboardingView {
    /// Wallet-connect prompt
    Welcome,
    Analyzing {
        progress: ProgressState,
        error: Option<String>,
    },
    Reviewing(ReviewView),
}

#[derive(Debug, Clone, PartialEq)]
pub struct ReviewView {
    pub profile: Profile,
    pub analysis: Option<AnalysisResult>,
    pub error: Option<String>,
}

impl ReviewView {
    pub fn total_transactions(&self) -> Option<u64> {
        self.analysis.as_ref().map(|a| a.total_transactions())
    }

    /// Label/value rows for the profile details card, empty without a backend profile
    pub fn profile_details(&self) -> Vec<(&'static str, String)> {
        let Some(data) = self.analysis.as_ref().and_then(|a| a.profile.as_ref()) else {
            return Vec::new();
        };

        vec![
            ("Experience Level", data.experience_level.clone()),
            ("Investment Strategy", data.investment_strategy.clone()),
            ("Management Style", data.management_style.clone()),
            ("Profile Type", data.profile_type.clone()),
        ]
    }

    pub fn analyzed_at_label(&self) -> Option<String> {
        self.analysis
            .as_ref()
            .and_then(|a| a.analyzed_at())
            .map(|t| t.format("%b %e, %Y %H:%M UTC").to_string())
    }
}

/// Everything a renderer needs after each controller step
#[derive(Debug, Clone, PartialEq)]
pub struct OnboardingSnapshot {
    pub phase: OnboardingPhase,
    pub view: OnboardingView,
    pub navigation: Option<Navigation>,
}

impl OnboardingSnapshot {
    pub fn progress(&self) -> Option<ProgressState> {
        match &self.view {
            OnboardingView::Analyzing { progress, .. } => Some(*progress),
            _ => None,
        }
    }

    pub fn review(&self) -> Option<&ReviewView> {
        match &self.view {
            OnboardingView::Reviewing(review) => Some(review),
            _ => None,
        }
    }
}
