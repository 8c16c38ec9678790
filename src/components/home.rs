// src/components/home.rs
use dioxus::prelude::*;

use crate::analysis::Profile;
use crate::components::connect_wallet::ConnectWallet;
use crate::config::AppConfig;
use crate::onboarding::AuthState;
use crate::points;
use crate::storage;

fn points_label(total: Option<i64>) -> String {
    match total {
        Some(total) => format!("{} pts", total),
        None => "0 pts".to_string(),
    }
}

#[component]
pub fn Home() -> Element {
    let auth = use_context::<Signal<AuthState>>();

    let profile = use_hook(|| {
        let config = AppConfig::from_env();
        let store = storage::default_store(&config.storage_dir);
        storage::load_cached_profile(store.as_ref()).unwrap_or_else(Profile::fallback)
    });

    let mut total_points = use_signal(|| None::<i64>);

    // Refetch whenever the connected wallet changes
    use_effect(move || {
        let address = auth().address().map(str::to_string);
        spawn(async move {
            let Some(address) = address else {
                total_points.set(None);
                return;
            };
            match points::fetch_total_points(&AppConfig::from_env().points_url(), &address).await {
                Ok(total) => total_points.set(total),
                Err(e) => log::warn!("Could not load points: {}", e),
            }
        });
    });

    let badge = points_label(total_points());
    let title = profile.title.clone();
    let description = profile.description.clone();

    rsx! {
        div {
            class: "home",

            header {
                class: "home-header",
                h1 { class: "brand", "SynthOS" }
                span { class: "points-badge", "{badge}" }
            }

            div {
                class: "profile-card",
                p {
                    class: "profile-title",
                    "Your investor profile: "
                    span { class: "highlight", "{title}" }
                }
                p { class: "profile-description", "{description}" }
            }

            ConnectWallet {
                on_connected: move |_| log::debug!("Wallet reconnected from home"),
                label: "Reconnect".to_string(),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_points_label() {
        assert_eq!(points_label(Some(265)), "265 pts");
        assert_eq!(points_label(None), "0 pts");
    }
}
