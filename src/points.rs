// src/points.rs
//! Reward points shown next to the navigation

use reqwest::Client;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct UserPoints {
    pub points_login: Option<i64>,
    pub points_deposit: Option<i64>,
    pub points_feedback: Option<i64>,
    pub points_share_x: Option<i64>,
    pub points_testnet_claim: Option<i64>,
}

impl UserPoints {
    /// Sum of every category, missing ones count as zero
    pub fn total(&self) -> i64 {
        [
            self.points_login,
            self.points_deposit,
            self.points_feedback,
            self.points_share_x,
            self.points_testnet_claim,
        ]
        .iter()
        .map(|p| p.unwrap_or(0))
        .sum()
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
struct PointsResponse {
    #[serde(default)]
    user: Option<UserPoints>,
}

/// Total points for `address`, `None` when the wallet has no points record
pub async fn fetch_total_points(endpoint: &str, address: &str) -> Result<Option<i64>, String> {
    let response = Client::new()
        .get(endpoint)
        .query(&[("address", address)])
        .header("Accept", "application/json")
        .send()
        .await
        .map_err(|e| format!("Points request failed: {}", e))?;

    let status = response.status();
    if !status.is_success() {
        return Err(format!("Points API error: {}", status.as_u16()));
    }

    let body: PointsResponse = response
        .json()
        .await
        .map_err(|e| format!("Failed to parse points response: {}", e))?;

    Ok(body.user.map(|u| u.total()))
}
