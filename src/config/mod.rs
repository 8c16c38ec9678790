use serde::{Deserialize, Serialize};

const DEFAULT_API_URL: &str = "http://localhost:3000";

/// Endpoints and local paths used by the onboarding flow
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AppConfig {
    /// Base URL serving `/api/ai-analyser` and `/api/points`
    pub api_base_url: String,
    /// Directory for the file-backed key/value store
    pub storage_dir: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            api_base_url: DEFAULT_API_URL.to_string(),
            storage_dir: default_storage_dir(),
        }
    }
}

impl AppConfig {
    /// Load configuration from environment variables
    pub fn from_env() -> Self {
        Self {
            api_base_url: std::env::var("SYNTHOS_API_URL")
                .map(|v| trim_base_url(&v))
                .unwrap_or_else(|_| DEFAULT_API_URL.to_string()),
            storage_dir: std::env::var("SYNTHOS_STORAGE_DIR")
                .unwrap_or_else(|_| default_storage_dir()),
        }
    }

    pub fn analysis_url(&self) -> String {
        format!("{}/api/ai-analyser", self.api_base_url)
    }

    pub fn points_url(&self) -> String {
        format!("{}/api/points", self.api_base_url)
    }
}

fn trim_base_url(url: &str) -> String {
    url.trim().trim_end_matches('/').to_string()
}

fn default_storage_dir() -> String {
    let home_dir = std::env::var("HOME")
        .or_else(|_| std::env::var("USERPROFILE"))
        .unwrap_or_else(|_| ".".to_string());
    format!("{home_dir}/.synthos_app")
}
