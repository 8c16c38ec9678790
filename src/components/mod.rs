pub mod connect_wallet;
pub mod home;
pub mod onboarding;

pub use home::Home;
pub use onboarding::OnboardingFlow;
