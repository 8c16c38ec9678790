// src/components/connect_wallet.rs
use dioxus::prelude::*;

use crate::onboarding::AuthState;

#[derive(Props, Clone, PartialEq)]
pub struct ConnectWalletProps {
    pub on_connected: EventHandler<()>,
    pub label: Option<String>,
}

/// Accepts a 0x-prefixed 20 byte hex address, returns it trimmed
pub fn validate_address(input: &str) -> Result<String, String> {
    let address = input.trim();
    if address.is_empty() {
        return Err("Enter a wallet address".to_string());
    }

    let hex = address
        .strip_prefix("0x")
        .or_else(|| address.strip_prefix("0X"))
        .ok_or_else(|| "Address must start with 0x".to_string())?;

    if hex.len() != 40 || !hex.chars().all(|c| c.is_ascii_hexdigit()) {
        return Err("Address must be 40 hex characters after 0x".to_string());
    }

    Ok(address.to_string())
}

fn shorten(address: &str) -> String {
    if address.len() <= 12 {
        return address.to_string();
    }
    format!("{}...{}", &address[..6], &address[address.len() - 4..])
}

#[component]
pub fn ConnectWallet(props: ConnectWalletProps) -> Element {
    let mut auth = use_context::<Signal<AuthState>>();
    let mut address_input = use_signal(String::new);
    let mut error = use_signal(|| None::<String>);

    let label = props.label.clone().unwrap_or_else(|| "Connect Wallet".to_string());
    let on_connected = props.on_connected;

    let handle_connect = move |_| match validate_address(&address_input()) {
        Ok(address) => {
            log::info!("Wallet connected: {}", shorten(&address));
            error.set(None);
            auth.set(AuthState::connected(address));
            on_connected.call(());
        }
        Err(e) => error.set(Some(e)),
    };

    let handle_disconnect = move |_| {
        log::info!("Wallet disconnected");
        address_input.set(String::new());
        auth.set(AuthState::disconnected());
    };

    let current = auth();

    rsx! {
        div {
            class: "connect-wallet",

            match current.address() {
                Some(address) => {
                    let short = shorten(address);
                    rsx! {
                        div {
                            class: "connect-wallet-connected",
                            span { class: "connect-wallet-address", "{short}" }
                            button {
                                class: "onboarding-button secondary",
                                onclick: handle_disconnect,
                                "Disconnect"
                            }
                        }
                    }
                }
                None => rsx! {
                    input {
                        class: "connect-wallet-input",
                        r#type: "text",
                        placeholder: "0x...",
                        value: "{address_input}",
                        oninput: move |evt: FormEvent| address_input.set(evt.value()),
                    }
                    button {
                        class: "onboarding-button primary",
                        onclick: handle_connect,
                        "{label}"
                    }
                },
            }

            match error() {
                Some(message) => rsx! {
                    p { class: "connect-wallet-error", "{message}" }
                },
                None => rsx! {},
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_address() {
        let address = "0x52908400098527886E0F7030069857D2E4169EE7";
        assert_eq!(validate_address(&format!("  {}\n", address)).unwrap(), address);
        assert_eq!(validate_address("").unwrap_err(), "Enter a wallet address");
        assert_eq!(
            validate_address("52908400098527886E0F7030069857D2E4169EE7").unwrap_err(),
            "Address must start with 0x"
        );
        assert!(validate_address("0x1234").is_err());
        assert!(validate_address("0xZZ908400098527886E0F7030069857D2E4169EE7").is_err());
    }

    #[test]
    fn test_shorten() {
        assert_eq!(shorten("0x52908400098527886E0F7030069857D2E4169EE7"), "0x5290...9EE7");
        assert_eq!(shorten("0xabc"), "0xabc");
    }
}
