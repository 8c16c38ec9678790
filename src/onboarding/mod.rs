// src/onboarding/mod.rs
//! Wallet onboarding flow: welcome, analysis with estimated progress, profile review

pub mod controller;
pub mod progress;
pub mod session;
pub mod view;

pub use controller::{AuthState, OnboardingController, OnboardingPhase};
pub use progress::ProgressState;
pub use view::{OnboardingView, ReviewView};
