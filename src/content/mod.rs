//! Content Probe
//!
//! Fetches the page once (following redirects) and inspects it. The
//! certificate-validating TLS check runs alongside the fetch for HTTPS URLs
//! and is best-effort: only a certificate failure produces a finding.

mod fetch;
mod inspect;

use crate::errors::FetchError;
use crate::models::{DegradationReason, FetchOutcome, Finding, FindingSource, ProbeDegradation, ProbeKind};
use crate::target::UrlTarget;
use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;

pub use fetch::HttpFetcher;
pub use inspect::PageInspector;

/// Points charged when the page cannot be reached at all
pub const UNREACHABLE_POINTS: u32 = 10;
/// Points charged for a non-2xx final status
pub const BAD_STATUS_POINTS: u32 = 5;
/// Points charged for a certificate that fails validation
pub const INVALID_TLS_POINTS: u32 = 3;

/// A page retrieved by the fetcher
#[derive(Debug, Clone)]
pub struct FetchedPage {
    pub status: u16,
    /// URL after redirects
    pub final_url: String,
    pub body: String,
}

/// HTTP access used by the probe
#[async_trait]
pub trait PageFetcher: Send + Sync {
    /// GET the URL following redirects, without rejecting bad certificates.
    async fn fetch(&self, url: &str) -> Result<FetchedPage, FetchError>;

    /// Make a certificate-validating request; `Ok` when the TLS chain verifies.
    async fn verify_tls(&self, url: &str) -> Result<(), FetchError>;
}

/// Everything the content probe learned about one URL
#[derive(Debug, Clone)]
pub struct ContentReport {
    pub findings: Vec<Finding>,
    pub outcome: FetchOutcome,
    pub final_url: Option<String>,
    pub degradations: Vec<ProbeDegradation>,
}

impl ContentReport {
    pub fn points(&self) -> u32 {
        self.findings.iter().map(|f| f.points).sum()
    }

    /// Report for a URL no fetch was attempted for
    pub fn not_attempted() -> Self {
        Self {
            findings: Vec::new(),
            outcome: FetchOutcome::NotAttempted,
            final_url: None,
            degradations: Vec::new(),
        }
    }
}

pub struct ContentProbe {
    fetcher: Arc<dyn PageFetcher>,
    inspector: PageInspector,
    fetch_timeout: Duration,
    tls_timeout: Duration,
}

impl ContentProbe {
    pub fn new(fetcher: Arc<dyn PageFetcher>, fetch_timeout: Duration, tls_timeout: Duration) -> Self {
        Self {
            fetcher,
            inspector: PageInspector::new(),
            fetch_timeout,
            tls_timeout,
        }
    }

    pub async fn probe(&self, target: &UrlTarget) -> ContentReport {
        let url = target.as_str();
        log::debug!("Content probe starting for {}", url);

        let page = async {
            tokio::time::timeout(self.fetch_timeout, self.fetcher.fetch(url))
                .await
                .unwrap_or(Err(FetchError::Timeout))
        };
        let tls = async {
            if target.is_encrypted() {
                let check = tokio::time::timeout(self.tls_timeout, self.fetcher.verify_tls(url)).await;
                Some(check.unwrap_or(Err(FetchError::Timeout)))
            } else {
                None
            }
        };
        let (page, tls) = tokio::join!(page, tls);

        let mut report = ContentReport::not_attempted();

        match page {
            Ok(page) => {
                report.outcome = FetchOutcome::Success { status: page.status };
                if !(200..300).contains(&page.status) {
                    report.findings.push(Finding::new(
                        "non_success_status",
                        BAD_STATUS_POINTS,
                        format!("Non-success HTTP status {}", page.status),
                        FindingSource::Content,
                    ));
                }
                report
                    .findings
                    .extend(self.inspector.inspect(&page.body, target.lowercase()));
                report.final_url = Some(page.final_url);
            }
            Err(FetchError::Tls(message)) => {
                log::debug!("Fetch of {} failed TLS negotiation: {}", url, message);
                report.outcome = FetchOutcome::TlsError;
                report.degradations.push(ProbeDegradation::new(
                    ProbeKind::Content,
                    "page_fetch",
                    DegradationReason::Failed(message),
                ));
            }
            Err(e) => {
                log::warn!("Fetch of {} failed: {}", url, e);
                let (outcome, reason) = match e {
                    FetchError::Timeout => (FetchOutcome::Timeout, DegradationReason::Timeout),
                    other => (FetchOutcome::ConnectionError, DegradationReason::Failed(other.to_string())),
                };
                report.outcome = outcome;
                report.findings.push(Finding::new(
                    "page_unreachable",
                    UNREACHABLE_POINTS,
                    format!("Page unreachable ({})", outcome),
                    FindingSource::Content,
                ));
                report
                    .degradations
                    .push(ProbeDegradation::new(ProbeKind::Content, "page_fetch", reason));
            }
        }

        if report.outcome.allows_content_findings() {
            match tls {
                Some(Err(FetchError::Tls(message))) => {
                    log::debug!("Certificate for {} failed validation: {}", url, message);
                    report.findings.push(Finding::new(
                        "invalid_tls_certificate",
                        INVALID_TLS_POINTS,
                        "Invalid or expired TLS certificate",
                        FindingSource::Content,
                    ));
                }
                Some(Err(other)) => {
                    log::debug!("TLS check for {} inconclusive: {}", url, other);
                    let reason = match other {
                        FetchError::Timeout => DegradationReason::Timeout,
                        e => DegradationReason::Failed(e.to_string()),
                    };
                    report
                        .degradations
                        .push(ProbeDegradation::new(ProbeKind::Content, "tls_certificate", reason));
                }
                Some(Ok(())) | None => {}
            }
        }

        log::debug!(
            "Content probe for {} finished: {} with {} point(s)",
            url,
            report.outcome,
            report.points()
        );
        report
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct StaticSite {
        status: u16,
        body: &'static str,
        tls: Result<(), FetchError>,
    }

    #[async_trait]
    impl PageFetcher for StaticSite {
        async fn fetch(&self, url: &str) -> Result<FetchedPage, FetchError> {
            Ok(FetchedPage {
                status: self.status,
                final_url: url.to_string(),
                body: self.body.to_string(),
            })
        }

        async fn verify_tls(&self, _url: &str) -> Result<(), FetchError> {
            self.tls.clone()
        }
    }

    struct DeadSite(FetchError);

    #[async_trait]
    impl PageFetcher for DeadSite {
        async fn fetch(&self, _url: &str) -> Result<FetchedPage, FetchError> {
            Err(self.0.clone())
        }

        async fn verify_tls(&self, _url: &str) -> Result<(), FetchError> {
            Err(self.0.clone())
        }
    }

    struct HangingSite;

    #[async_trait]
    impl PageFetcher for HangingSite {
        async fn fetch(&self, _url: &str) -> Result<FetchedPage, FetchError> {
            tokio::time::sleep(Duration::from_secs(30)).await;
            Err(FetchError::Other("unreachable".to_string()))
        }

        async fn verify_tls(&self, _url: &str) -> Result<(), FetchError> {
            tokio::time::sleep(Duration::from_secs(30)).await;
            Ok(())
        }
    }

    fn probe(fetcher: impl PageFetcher + 'static) -> ContentProbe {
        ContentProbe::new(Arc::new(fetcher), Duration::from_millis(200), Duration::from_millis(200))
    }

    fn ids(report: &ContentReport) -> Vec<&str> {
        report.findings.iter().map(|f| f.rule_id.as_str()).collect()
    }

    #[tokio::test]
    async fn test_clean_page() {
        let site = StaticSite {
            status: 200,
            body: "<html><head><title>Welcome</title></head><body>Hello</body></html>",
            tls: Ok(()),
        };
        let target = UrlTarget::parse("https://example.com").unwrap();
        let report = probe(site).probe(&target).await;

        assert_eq!(report.outcome, FetchOutcome::Success { status: 200 });
        assert!(report.findings.is_empty());
        assert_eq!(report.final_url.as_deref(), Some("https://example.com"));
    }

    #[tokio::test]
    async fn test_redirect_and_credential_form_fire_together() {
        let site = StaticSite {
            status: 200,
            body: r#"<html><body><form><input type="password" name="pw"></form>
                     <script>window.location.href = "https://evil.example/collect";</script></body></html>"#,
            tls: Ok(()),
        };
        let target = UrlTarget::parse("https://example.com/login").unwrap();
        let report = probe(site).probe(&target).await;

        let ids = ids(&report);
        assert!(ids.contains(&"credential_form"));
        assert!(ids.contains(&"script_redirect"));
        assert_eq!(report.points(), 5);
    }

    #[tokio::test]
    async fn test_non_success_status() {
        let site = StaticSite {
            status: 404,
            body: "<html><title>Not Found</title></html>",
            tls: Ok(()),
        };
        let target = UrlTarget::parse("https://example.com/missing").unwrap();
        let report = probe(site).probe(&target).await;

        assert_eq!(report.outcome, FetchOutcome::Success { status: 404 });
        assert_eq!(ids(&report), vec!["non_success_status"]);
        assert_eq!(report.points(), BAD_STATUS_POINTS);
    }

    #[tokio::test]
    async fn test_connection_failure_is_unreachable() {
        let target = UrlTarget::parse("https://example.com").unwrap();
        let report = probe(DeadSite(FetchError::Connection("refused".to_string())))
            .probe(&target)
            .await;

        assert_eq!(report.outcome, FetchOutcome::ConnectionError);
        assert_eq!(ids(&report), vec!["page_unreachable"]);
        assert_eq!(report.points(), UNREACHABLE_POINTS);
    }

    #[tokio::test]
    async fn test_timeout_is_bounded() {
        let started = std::time::Instant::now();
        let target = UrlTarget::parse("https://example.com").unwrap();
        let report = probe(HangingSite).probe(&target).await;

        assert!(started.elapsed() < Duration::from_secs(5));
        assert_eq!(report.outcome, FetchOutcome::Timeout);
        assert_eq!(ids(&report), vec!["page_unreachable"]);
    }

    #[tokio::test]
    async fn test_invalid_certificate() {
        let site = StaticSite {
            status: 200,
            body: "<html></html>",
            tls: Err(FetchError::Tls("certificate has expired".to_string())),
        };
        let target = UrlTarget::parse("https://expired.example.com").unwrap();
        let report = probe(site).probe(&target).await;

        assert_eq!(ids(&report), vec!["invalid_tls_certificate"]);
        assert_eq!(report.points(), INVALID_TLS_POINTS);
    }

    #[tokio::test]
    async fn test_tls_check_other_errors_are_swallowed() {
        let site = StaticSite {
            status: 200,
            body: "<html></html>",
            tls: Err(FetchError::Connection("reset".to_string())),
        };
        let target = UrlTarget::parse("https://example.com").unwrap();
        let report = probe(site).probe(&target).await;

        assert!(report.findings.is_empty());
        assert_eq!(report.degradations.len(), 1);
    }

    #[tokio::test]
    async fn test_tls_error_on_fetch() {
        let target = UrlTarget::parse("https://example.com").unwrap();
        let report = probe(DeadSite(FetchError::Tls("handshake failure".to_string())))
            .probe(&target)
            .await;

        assert_eq!(report.outcome, FetchOutcome::TlsError);
        assert_eq!(ids(&report), vec!["invalid_tls_certificate"]);
    }

    #[tokio::test]
    async fn test_plaintext_skips_tls_check() {
        let site = StaticSite {
            status: 200,
            body: "<html></html>",
            tls: Err(FetchError::Tls("would fire if called".to_string())),
        };
        let target = UrlTarget::parse("http://example.com").unwrap();
        let report = probe(site).probe(&target).await;
        assert!(report.findings.is_empty());
    }
}
