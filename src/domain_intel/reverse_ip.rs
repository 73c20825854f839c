//! Reverse-IP lookup over a HackerTarget-style plain-text HTTP API.

use super::ReverseIpLookup;
use crate::errors::{LureError, LureResult};
use async_trait::async_trait;
use std::time::Duration;

const SERVICE: &str = "reverse-ip";

pub struct HackerTargetClient {
    client: reqwest::Client,
    endpoint: String,
}

impl HackerTargetClient {
    pub fn new(endpoint: &str, timeout: Duration, user_agent: &str) -> LureResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(user_agent)
            .build()?;

        Ok(Self {
            client,
            endpoint: endpoint.to_string(),
        })
    }
}

#[async_trait]
impl ReverseIpLookup for HackerTargetClient {
    async fn hostnames(&self, host: &str) -> LureResult<Vec<String>> {
        let response = self.client.get(&self.endpoint).query(&[("q", host)]).send().await?;

        let status = response.status();
        if !status.is_success() {
            return Err(LureError::lookup(SERVICE, host, format!("HTTP {}", status)));
        }

        let body = response.text().await?;
        parse_listing(host, &body)
    }
}

/// Parse the one-hostname-per-line listing the API answers with.
pub fn parse_listing(host: &str, body: &str) -> LureResult<Vec<String>> {
    let trimmed = body.trim();
    let lower = trimmed.to_lowercase();

    if lower.starts_with("error") || lower.contains("api count exceeded") {
        let first_line = trimmed.lines().next().unwrap_or_default();
        return Err(LureError::lookup(SERVICE, host, first_line));
    }
    if lower.starts_with("no dns a records") || lower.starts_with("no records") {
        return Ok(Vec::new());
    }

    Ok(trimmed
        .lines()
        .map(|line| line.trim().to_lowercase())
        .filter(|line| !line.is_empty() && !line.contains(char::is_whitespace) && line.contains('.'))
        .collect())
}
