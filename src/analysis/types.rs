// src/analysis/types.rs
//! Wallet analysis wire types and the derived investor profile

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub const FALLBACK_PROFILE_TITLE: &str = "New to DeFi";
pub const FALLBACK_PROFILE_DESCRIPTION: &str =
    "You're just getting started with DeFi. We'll help you navigate the ecosystem safely.";

/// Response body of `GET /api/ai-analyser`. A body without `analysis` is not a result.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisResult {
    #[serde(default)]
    pub wallet_address: String,
    pub analysis: AnalysisSummary,
    #[serde(default)]
    pub profile: Option<ProfileData>,
    /// ISO-8601 time the backend produced the analysis
    #[serde(default)]
    pub timestamp: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct AnalysisSummary {
    pub summary: String,
    pub details: AnalysisDetails,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct AnalysisDetails {
    pub total_transactions: u64,
    pub patterns: String,
    pub recommendations: String,
}

/// Investor classification returned by the backend
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct ProfileData {
    pub experience_level: String,
    pub investment_strategy: String,
    pub management_style: String,
    pub profile_type: String,
    pub standard_description: String,
    pub personalized_description: String,
}

impl AnalysisResult {
    pub fn total_transactions(&self) -> u64 {
        self.analysis.details.total_transactions
    }

    /// Parsed `timestamp`, `None` when the backend sent something else
    pub fn analyzed_at(&self) -> Option<DateTime<Utc>> {
        DateTime::parse_from_rfc3339(&self.timestamp)
            .ok()
            .map(|t| t.with_timezone(&Utc))
    }
}

/// Title and description shown on the review screen
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Profile {
    pub title: String,
    pub description: String,
}

impl Profile {
    pub fn fallback() -> Self {
        Self {
            title: FALLBACK_PROFILE_TITLE.to_string(),
            description: FALLBACK_PROFILE_DESCRIPTION.to_string(),
        }
    }

    /// Derive the displayed profile. Empty fields fall back one by one.
    pub fn from_analysis(result: &AnalysisResult) -> Self {
        let Some(data) = &result.profile else {
            return Self::fallback();
        };

        Self {
            title: non_empty_or(&data.profile_type, FALLBACK_PROFILE_TITLE),
            description: non_empty_or(&data.personalized_description, FALLBACK_PROFILE_DESCRIPTION),
        }
    }
}

fn non_empty_or(value: &str, fallback: &str) -> String {
    if value.trim().is_empty() {
        fallback.to_string()
    } else {
        value.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_profile_from_analysis() {
        let result: AnalysisResult = serde_json::from_str(
            r#"{"analysis": {}, "profile": {"profileType": "Degen", "personalizedDescription": "Apes into everything."}}"#,
        )
        .unwrap();

        assert_eq!(
            Profile::from_analysis(&result),
            Profile {
                title: "Degen".to_string(),
                description: "Apes into everything.".to_string(),
            }
        );
    }

    #[test]
    fn test_missing_profile_uses_fallback() {
        let result: AnalysisResult = serde_json::from_str(r#"{"walletAddress": "0xabc", "analysis": {}}"#).unwrap();
        assert_eq!(Profile::from_analysis(&result), Profile::fallback());
        assert_eq!(Profile::fallback().title, "New to DeFi");
    }

    #[test]
    fn test_empty_description_falls_back() {
        let result: AnalysisResult =
            serde_json::from_str(r#"{"analysis": {}, "profile": {"profileType": "Yield Farmer"}}"#)
                .unwrap();
        let profile = Profile::from_analysis(&result);

        assert_eq!(profile.title, "Yield Farmer");
        assert_eq!(profile.description, FALLBACK_PROFILE_DESCRIPTION);
    }

    #[test]
    fn test_full_response_parses() {
        let body = r#"{
            "walletAddress": "0x71C7656EC7ab88b098defB751B7401B5f6d8976F",
            "analysis": {
                "summary": "Active LP provider",
                "details": {
                    "totalTransactions": 42,
                    "patterns": "Frequent stablecoin swaps",
                    "recommendations": "Consider auto-compounding vaults"
                }
            },
            "profile": {
                "experienceLevel": "Intermediate",
                "investmentStrategy": "Yield",
                "managementStyle": "Active",
                "profileType": "Yield Farmer",
                "standardDescription": "Chases yield.",
                "personalizedDescription": "You farm stablecoin pools."
            },
            "timestamp": "2025-03-14T09:26:53.589Z"
        }"#;
        let result: AnalysisResult = serde_json::from_str(body).unwrap();

        assert_eq!(result.total_transactions(), 42);
        assert_eq!(result.analysis.summary, "Active LP provider");
        assert_eq!(result.profile.as_ref().unwrap().experience_level, "Intermediate");
        assert_eq!(
            result.analyzed_at().unwrap().to_rfc3339(),
            "2025-03-14T09:26:53.589+00:00"
        );
    }

    #[test]
    fn test_body_without_analysis_is_rejected() {
        assert!(serde_json::from_str::<AnalysisResult>(r#"{"error": "rate limited"}"#).is_err());
        assert!(serde_json::from_str::<AnalysisResult>("{}").is_err());
    }

    #[test]
    fn test_bad_timestamp_is_none() {
        let result = AnalysisResult {
            timestamp: "yesterday".to_string(),
            ..AnalysisResult::default()
        };
        assert!(result.analyzed_at().is_none());
    }
}
