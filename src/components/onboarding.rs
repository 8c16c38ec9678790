// src/components/onboarding.rs
use dioxus::prelude::*;
use std::sync::Arc;

use crate::analysis::{AnalysisClient, WalletAnalyzer};
use crate::components::connect_wallet::ConnectWallet;
use crate::config::AppConfig;
use crate::onboarding::{
    session, AuthState, OnboardingController, OnboardingPhase, OnboardingView, ProgressState,
    ReviewView,
};
use crate::storage;
use crate::Route;

const LOGO: Asset = asset!("/assets/logo.svg");

#[component]
pub fn OnboardingFlow() -> Element {
    let auth = use_context::<Signal<AuthState>>();
    let navigator = use_navigator();

    let handle = use_hook(|| {
        let config = AppConfig::from_env();
        let store = storage::default_store(&config.storage_dir);
        let analyzer: Arc<dyn WalletAnalyzer> = Arc::new(AnalysisClient::new(config.analysis_url()));
        let (handle, _join) = session::spawn(OnboardingController::new(store), analyzer);
        handle
    });

    let mut snapshot = use_signal({
        let handle = handle.clone();
        move || handle.snapshot()
    });

    let watcher = handle.clone();
    use_future(move || {
        let mut snapshots = watcher.subscribe();
        async move {
            while snapshots.changed().await.is_ok() {
                let next = snapshots.borrow_and_update().clone();
                snapshot.set(next);
            }
        }
    });

    // Re-evaluated on every auth change, including the first render
    let auth_handle = handle.clone();
    use_effect(move || {
        auth_handle.auth_changed(auth());
    });

    use_effect(move || {
        if let Some(navigation) = snapshot().navigation {
            log::info!("Onboarding finished, opening {}", navigation.route);
            if navigation.replace {
                let _ = navigator.replace(Route::Home {});
            } else {
                let _ = navigator.push(Route::Home {});
            }
        }
    });

    let drop_handle = handle.clone();
    use_drop(move || drop_handle.teardown());

    let connect_handle = handle.clone();
    let on_connected = EventHandler::new(move |_: ()| connect_handle.wallet_connected());
    let confirm_handle = handle.clone();
    let on_confirm = EventHandler::new(move |_: ()| confirm_handle.confirm());

    let current = snapshot();

    rsx! {
        div {
            class: "onboarding-overlay",

            div {
                class: "onboarding-container",

                if current.phase != OnboardingPhase::Welcome {
                    img {
                        class: "onboarding-logo small",
                        src: LOGO,
                        alt: "SynthOS Logo"
                    }
                }

                match current.view {
                    OnboardingView::Welcome => render_welcome(on_connected),
                    OnboardingView::Analyzing { progress, error } => render_analyzing(progress, error),
                    OnboardingView::Reviewing(review) => render_reviewing(review, on_confirm),
                }
            }
        }
    }
}

fn render_welcome(on_connected: EventHandler<()>) -> Element {
    rsx! {
        div {
            class: "onboarding-step",
            img {
                class: "onboarding-logo",
                src: LOGO,
                alt: "SynthOS Logo"
            }
            h1 {
                class: "onboarding-title brand",
                "SynthOS"
            }
            p {
                class: "onboarding-subtitle",
                "Invest with confidence using personalized yield plans."
            }
            ConnectWallet { on_connected: on_connected }
        }
    }
}

fn render_analyzing(progress: ProgressState, error: Option<String>) -> Element {
    let width = format!("{:.1}%", progress.percent);
    let seconds_left = progress.seconds_remaining;

    rsx! {
        div {
            class: "onboarding-step",
            h2 {
                class: "onboarding-title",
                "Analyzing your wallet..."
            }
            div {
                class: "progress-track",
                div {
                    class: "progress-fill",
                    style: "width: {width}"
                }
            }
            match error {
                Some(message) => rsx! {
                    div {
                        class: "analysis-error",
                        span { class: "pulse", "⚠️" }
                        span { "Error: {message}" }
                    }
                },
                None => rsx! {
                    div {
                        class: "analysis-status",
                        p { "⚡ Analyzing your wallet activity and investment patterns..." }
                        p {
                            class: "analysis-eta",
                            "🤖 AI analysis in progress, about {seconds_left}s left"
                        }
                    }
                },
            }
        }
    }
}

fn render_reviewing(review: ReviewView, on_confirm: EventHandler<()>) -> Element {
    let heading = match review.total_transactions() {
        Some(count) => format!("Here's what we found from your {} transactions:", count),
        None => "Here's a starting profile for you:".to_string(),
    };
    let details = review.profile_details();
    let analyzed_at = review.analyzed_at_label();
    let title = review.profile.title.clone();
    let description = review.profile.description.clone();

    rsx! {
        div {
            class: "onboarding-step",
            h2 {
                class: "review-heading",
                "{heading}"
            }

            div {
                class: "profile-card",
                p {
                    class: "profile-title",
                    "You are a "
                    span { class: "highlight", "{title}" }
                }
                p { class: "profile-description", "{description}" }
            }

            if !details.is_empty() {
                div {
                    class: "profile-details",
                    p { class: "profile-details-title", "Profile Details:" }
                    div {
                        class: "profile-details-grid",
                        for (label, value) in details {
                            div {
                                key: "{label}",
                                p { class: "detail-label", "{label}:" }
                                p { class: "detail-value", "{value}" }
                            }
                        }
                    }
                }
            }

            match review.error.clone() {
                Some(error) => rsx! {
                    p { class: "analysis-error small", "Analysis unavailable: {error}" }
                },
                None => rsx! {},
            }

            p {
                class: "review-footnote",
                "AI-powered results tailored to your wallet activity"
            }
            match analyzed_at {
                Some(when) => rsx! {
                    p { class: "review-timestamp", "Analyzed {when}" }
                },
                None => rsx! {},
            }

            button {
                class: "onboarding-button primary",
                onclick: move |_| on_confirm.call(()),
                "Continue to Dashboard"
            }
        }
    }
}
