// src/analysis/client.rs
//! HTTP client for the wallet analysis endpoint

use async_trait::async_trait;
use reqwest::Client as HttpClient;

use crate::analysis::types::AnalysisResult;

/// Anything that can classify a wallet's on-chain activity.
///
/// One call is one attempt: implementations never retry, and every failure
/// (transport, status, body) comes back as a human-readable message.
#[async_trait]
pub trait WalletAnalyzer: Send + Sync {
    async fn analyze(&self, address: &str) -> Result<AnalysisResult, String>;
}

/// Talks to `GET {base}/api/ai-analyser?address=<wallet>`
pub struct AnalysisClient {
    endpoint: String,
    http_client: HttpClient,
}

impl AnalysisClient {
    /// # Arguments
    /// * `endpoint` - Full analysis URL, see `AppConfig::analysis_url`
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
            http_client: HttpClient::new(),
        }
    }
}

#[async_trait]
impl WalletAnalyzer for AnalysisClient {
    async fn analyze(&self, address: &str) -> Result<AnalysisResult, String> {
        if address.trim().is_empty() {
            return Err("Wallet address is required".to_string());
        }

        log::info!("Requesting wallet analysis for {}", address);

        let response = self
            .http_client
            .get(&self.endpoint)
            .query(&[("address", address)])
            .header("Accept", "application/json")
            .send()
            .await
            .map_err(|e| format!("Failed to analyze wallet: {}", e))?;

        let status = response.status();
        if !status.is_success() {
            log::warn!("Wallet analysis returned {}", status);
            return Err(format!("API error: {}", status.as_u16()));
        }

        let body: serde_json::Value = response
            .json()
            .await
            .map_err(|e| format!("Failed to parse analysis response: {}", e))?;

        // Some backend failures still answer 200 with an `error` field
        if let Some(message) = body.get("error").and_then(|e| e.as_str()) {
            log::warn!("Wallet analysis reported an error: {}", message);
            return Err(format!("API error: {}", message));
        }

        let result: AnalysisResult = serde_json::from_value(body)
            .map_err(|e| format!("Failed to parse analysis response: {}", e))?;

        log::info!(
            "Wallet analysis complete: {} transactions",
            result.total_transactions()
        );
        Ok(result)
    }
}

#[cfg(test)]
pub(crate) mod test_server {
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;
    use tokio::sync::oneshot;

    /// Serve one canned HTTP response on a loopback port.
    ///
    /// Returns the base URL and a receiver yielding the raw request text.
    pub async fn serve_once(status_line: &str, body: &str) -> (String, oneshot::Receiver<String>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let response = format!(
            "HTTP/1.1 {}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
            status_line,
            body.len(),
            body
        );
        let (tx, rx) = oneshot::channel();

        tokio::spawn(async move {
            let (mut stream, _) = listener.accept().await.unwrap();
            let mut request = Vec::new();
            let mut buf = [0u8; 4096];
            loop {
                let n = stream.read(&mut buf).await.unwrap();
                if n == 0 {
                    break;
                }
                request.extend_from_slice(&buf[..n]);
                if request_complete(&request) {
                    break;
                }
            }
            let _ = tx.send(String::from_utf8_lossy(&request).to_string());
            stream.write_all(response.as_bytes()).await.unwrap();
            stream.shutdown().await.ok();
        });

        (format!("http://{}", addr), rx)
    }

    fn request_complete(request: &[u8]) -> bool {
        let text = String::from_utf8_lossy(request);
        let Some(header_end) = text.find("\r\n\r\n") else {
            return false;
        };
        let content_length = text[..header_end]
            .lines()
            .find_map(|line| {
                let (name, value) = line.split_once(':')?;
                name.eq_ignore_ascii_case("content-length")
                    .then(|| value.trim().parse::<usize>().ok())
                    .flatten()
            })
            .unwrap_or(0);
        request.len() >= header_end + 4 + content_length
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use super::test_server::serve_once;

    #[tokio::test]
    async fn test_successful_analysis() {
        let body = r#"{"walletAddress":"0xabc","analysis":{"summary":"ok","details":{"totalTransactions":7,"patterns":"","recommendations":""}},"profile":{"profileType":"Degen","personalizedDescription":"Bold."},"timestamp":"2025-01-01T00:00:00Z"}"#;
        let (base, request) = serve_once("200 OK", body).await;
        let client = AnalysisClient::new(format!("{}/api/ai-analyser", base));

        let result = client.analyze("0xabc").await.unwrap();
        assert_eq!(result.wallet_address, "0xabc");
        assert_eq!(result.total_transactions(), 7);

        let request = request.await.unwrap();
        assert!(request.starts_with("GET /api/ai-analyser?address=0xabc "));
    }

    #[tokio::test]
    async fn test_non_success_status_is_failure() {
        let (base, _request) = serve_once("500 Internal Server Error", r#"{"profile":{"profileType":"Degen"}}"#).await;
        let client = AnalysisClient::new(format!("{}/api/ai-analyser", base));

        let err = client.analyze("0xabc").await.unwrap_err();
        assert_eq!(err, "API error: 500");
    }

    #[tokio::test]
    async fn test_ok_status_with_error_body_is_failure() {
        let (base, _request) = serve_once("200 OK", r#"{"error":"rate limited"}"#).await;
        let client = AnalysisClient::new(format!("{}/api/ai-analyser", base));

        let err = client.analyze("0xabc").await.unwrap_err();
        assert_eq!(err, "API error: rate limited");
    }

    #[tokio::test]
    async fn test_ok_status_without_analysis_is_failure() {
        let (base, _request) = serve_once("200 OK", r#"{"walletAddress":"0xabc"}"#).await;
        let client = AnalysisClient::new(format!("{}/api/ai-analyser", base));

        let err = client.analyze("0xabc").await.unwrap_err();
        assert!(err.starts_with("Failed to parse analysis response"));
    }

    #[tokio::test]
    async fn test_connection_refused_is_failure() {
        // Bind then drop so nothing is listening on the port
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let client = AnalysisClient::new(format!("http://{}/api/ai-analyser", addr));
        let err = client.analyze("0xabc").await.unwrap_err();
        assert!(err.starts_with("Failed to analyze wallet"));
    }

    #[tokio::test]
    async fn test_empty_address_rejected() {
        let client = AnalysisClient::new("http://127.0.0.1:9/api/ai-analyser");
        assert!(client.analyze("  ").await.is_err());
    }
}
