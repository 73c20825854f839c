//! `reqwest`-backed page fetcher.

use super::{FetchedPage, PageFetcher};
use crate::config::EngineConfig;
use crate::errors::{FetchError, LureResult};
use async_trait::async_trait;
use std::error::Error as _;

pub struct HttpFetcher {
    /// Follows redirects and tolerates bad certificates so content can still be inspected
    page_client: reqwest::Client,
    /// Validates certificates, no redirects
    tls_client: reqwest::Client,
    max_body_bytes: usize,
}

impl HttpFetcher {
    pub fn new(config: &EngineConfig) -> LureResult<Self> {
        let page_client = reqwest::Client::builder()
            .timeout(config.content_timeout())
            .redirect(reqwest::redirect::Policy::limited(config.max_redirects))
            .danger_accept_invalid_certs(true)
            .user_agent(&config.user_agent)
            .build()?;

        let tls_client = reqwest::Client::builder()
            .timeout(config.tls_timeout())
            .redirect(reqwest::redirect::Policy::none())
            .user_agent(&config.user_agent)
            .build()?;

        Ok(Self {
            page_client,
            tls_client,
            max_body_bytes: config.max_body_bytes,
        })
    }
}

#[async_trait]
impl PageFetcher for HttpFetcher {
    async fn fetch(&self, url: &str) -> Result<FetchedPage, FetchError> {
        let mut response = self.page_client.get(url).send().await.map_err(|e| classify(&e))?;

        let status = response.status().as_u16();
        let final_url = response.url().to_string();

        let mut body = Vec::new();
        while let Some(chunk) = response.chunk().await.map_err(|e| classify(&e))? {
            let room = self.max_body_bytes.saturating_sub(body.len());
            body.extend_from_slice(&chunk[..chunk.len().min(room)]);
            if body.len() >= self.max_body_bytes {
                log::debug!("Body of {} truncated at {} bytes", final_url, self.max_body_bytes);
                break;
            }
        }

        Ok(FetchedPage {
            status,
            final_url,
            body: String::from_utf8_lossy(&body).into_owned(),
        })
    }

    async fn verify_tls(&self, url: &str) -> Result<(), FetchError> {
        self.tls_client
            .head(url)
            .send()
            .await
            .map(|_| ())
            .map_err(|e| classify(&e))
    }
}

/// Sort a `reqwest` failure into the fetch error taxonomy.
///
/// Only the source chain is inspected: the top-level message embeds the
/// request URL, which is attacker-chosen text.
fn classify(err: &reqwest::Error) -> FetchError {
    if err.is_timeout() {
        return FetchError::Timeout;
    }

    let causes = source_chain(err);
    let detail = if causes.is_empty() {
        err.to_string()
    } else {
        causes.clone()
    };

    if is_tls_failure(&causes) {
        FetchError::Tls(detail)
    } else if err.is_connect() || err.is_request() {
        FetchError::Connection(detail)
    } else {
        FetchError::Other(detail)
    }
}

fn source_chain(err: &reqwest::Error) -> String {
    let mut causes = Vec::new();
    let mut source = err.source();
    while let Some(cause) = source {
        causes.push(cause.to_string());
        source = cause.source();
    }
    causes.join(": ")
}

fn is_tls_failure(causes: &str) -> bool {
    let lower = causes.to_lowercase();
    ["certificate", "tls", "ssl", "handshake"]
        .iter()
        .any(|marker| lower.contains(marker))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tls_markers() {
        assert!(is_tls_failure("error sending request: invalid peer certificate: Expired"));
        assert!(is_tls_failure("received fatal alert: HandshakeFailure"));
        assert!(!is_tls_failure("error trying to connect: tcp connect error: Connection refused"));
    }

    #[test]
    fn test_fetcher_builds_from_defaults() {
        assert!(HttpFetcher::new(&EngineConfig::default()).is_ok());
    }

    #[tokio::test]
    async fn test_refused_connection_ignores_words_in_url() {
        let fetcher = HttpFetcher::new(&EngineConfig::default()).unwrap();

        for url in [
            "http://127.0.0.1:1/ssl-certificate-update",
            "http://127.0.0.1:1/tls-handshake",
        ] {
            match fetcher.fetch(url).await {
                Err(FetchError::Connection(_)) => {}
                other => panic!("{}: expected a connection error, got {:?}", url, other.map(|p| p.status)),
            }
            assert!(matches!(fetcher.verify_tls(url).await, Err(FetchError::Connection(_))));
        }
    }
}
