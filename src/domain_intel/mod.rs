//! Domain Intelligence Probe
//!
//! Domain-age and shared-hosting signals for a host. Both sub-checks run
//! concurrently, each under its own timeout, and neither can fail the probe:
//! - WHOIS failure or missing date: +1 point and a finding
//! - reverse-IP failure: no points, recorded as a degradation only

mod reverse_ip;
mod whois;

use crate::config::EngineConfig;
use crate::errors::LureResult;
use crate::models::{DegradationReason, Finding, FindingSource, ProbeDegradation, ProbeKind};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::HashSet;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

pub use reverse_ip::HackerTargetClient;
pub use whois::{parse_creation_date, registrable_domain, WhoisClient};

/// Domains younger than this many days are "newly registered"
pub const NEW_DOMAIN_DAYS: i64 = 90;
/// Domains younger than this many days are "recently registered"
pub const RECENT_DOMAIN_DAYS: i64 = 180;
/// More co-hosted domains than this is suspicious
pub const SHARED_HOSTING_LIMIT: usize = 10;

const AGE_CHECK: &str = "domain_age";
const HOSTING_CHECK: &str = "shared_hosting";

/// Registration metadata lookup (WHOIS or equivalent)
#[async_trait]
pub trait RegistrationLookup: Send + Sync {
    /// Creation date of the domain behind `host`, `None` when the registry has none
    async fn creation_date(&self, host: &str) -> LureResult<Option<DateTime<Utc>>>;
}

/// Reverse-IP lookup: other hostnames served from the same address
#[async_trait]
pub trait ReverseIpLookup: Send + Sync {
    async fn hostnames(&self, host: &str) -> LureResult<Vec<String>>;
}

/// Findings and degradations produced for one host
#[derive(Debug, Clone, Default)]
pub struct DomainReport {
    pub findings: Vec<Finding>,
    pub degradations: Vec<ProbeDegradation>,
}

impl DomainReport {
    pub fn points(&self) -> u32 {
        self.findings.iter().map(|f| f.points).sum()
    }
}

pub struct DomainIntelProbe {
    registration: Arc<dyn RegistrationLookup>,
    reverse_ip: Arc<dyn ReverseIpLookup>,
    whois_timeout: Duration,
    reverse_ip_timeout: Duration,
}

impl DomainIntelProbe {
    pub fn new(
        registration: Arc<dyn RegistrationLookup>,
        reverse_ip: Arc<dyn ReverseIpLookup>,
        whois_timeout: Duration,
        reverse_ip_timeout: Duration,
    ) -> Self {
        Self {
            registration,
            reverse_ip,
            whois_timeout,
            reverse_ip_timeout,
        }
    }

    /// Probe wired to the live WHOIS and reverse-IP services
    pub fn from_config(config: &EngineConfig) -> LureResult<Self> {
        let whois = WhoisClient::new(&config.whois_server, config.whois_port);
        let reverse_ip = HackerTargetClient::new(
            &config.reverse_ip_endpoint,
            config.reverse_ip_timeout(),
            &config.user_agent,
        )?;

        Ok(Self::new(
            Arc::new(whois),
            Arc::new(reverse_ip),
            config.whois_timeout(),
            config.reverse_ip_timeout(),
        ))
    }

    pub async fn probe(&self, host: &str) -> DomainReport {
        self.probe_at(host, Utc::now()).await
    }

    /// Probe with an explicit "now" for the age computation.
    pub async fn probe_at(&self, host: &str, now: DateTime<Utc>) -> DomainReport {
        log::debug!("Domain probe starting for {}", host);

        let (age, hosting) = tokio::join!(
            bounded(self.whois_timeout, self.registration.creation_date(host)),
            bounded(self.reverse_ip_timeout, self.reverse_ip.hostnames(host)),
        );

        let mut report = DomainReport::default();

        match age {
            Ok(Some(created)) => {
                let days = (now - created).num_days();
                if days < 0 {
                    log::warn!("WHOIS for {} reports a future creation date {}", host, created);
                    Self::registration_unavailable(&mut report, DegradationReason::NoData);
                } else if days < NEW_DOMAIN_DAYS {
                    report.findings.push(Finding::new(
                        "newly_registered_domain",
                        4,
                        format!("Newly registered domain: created {} day(s) ago", days),
                        FindingSource::Domain,
                    ));
                } else if days < RECENT_DOMAIN_DAYS {
                    report.findings.push(Finding::new(
                        "recently_registered_domain",
                        2,
                        format!("Recently registered domain: created {} day(s) ago", days),
                        FindingSource::Domain,
                    ));
                }
            }
            Ok(None) => Self::registration_unavailable(&mut report, DegradationReason::NoData),
            Err(reason) => {
                log::warn!("Domain age check for {} degraded: {:?}", host, reason);
                Self::registration_unavailable(&mut report, reason);
            }
        }

        match hosting {
            Ok(hostnames) => {
                let distinct: HashSet<String> = hostnames
                    .iter()
                    .map(|h| h.trim().trim_end_matches('.').to_lowercase())
                    .filter(|h| !h.is_empty())
                    .collect();
                if distinct.len() > SHARED_HOSTING_LIMIT {
                    report.findings.push(Finding::new(
                        "shared_hosting",
                        2,
                        format!(
                            "Host shares IP with many unrelated domains ({} hostnames)",
                            distinct.len()
                        ),
                        FindingSource::Domain,
                    ));
                }
            }
            Err(reason) => {
                log::debug!("Shared-hosting check for {} skipped: {:?}", host, reason);
                report
                    .degradations
                    .push(ProbeDegradation::new(ProbeKind::Domain, HOSTING_CHECK, reason));
            }
        }

        log::debug!("Domain probe for {} finished with {} point(s)", host, report.points());
        report
    }

    fn registration_unavailable(report: &mut DomainReport, reason: DegradationReason) {
        report.findings.push(Finding::new(
            "registration_data_unavailable",
            1,
            "Domain registration data unavailable",
            FindingSource::Domain,
        ));
        report
            .degradations
            .push(ProbeDegradation::new(ProbeKind::Domain, AGE_CHECK, reason));
    }
}

/// Run a lookup under a timeout, folding every failure into a degradation reason.
async fn bounded<T, F>(limit: Duration, lookup: F) -> Result<T, DegradationReason>
where
    F: Future<Output = LureResult<T>>,
{
    match tokio::time::timeout(limit, lookup).await {
        Ok(Ok(value)) => Ok(value),
        Ok(Err(e)) => Err(DegradationReason::Failed(e.to_string())),
        Err(_) => Err(DegradationReason::Timeout),
    }
}
