// src/analysis/mod.rs
//! Wallet activity analysis

pub mod client;
pub mod types;

pub use client::{AnalysisClient, WalletAnalyzer};
pub use types::*;
