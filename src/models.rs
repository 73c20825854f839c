use serde::{Deserialize, Serialize};

/// Risk bucket derived from a point total.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, clap::ValueEnum,
)]
pub enum RiskTier {
    Low,
    Medium,
    High,
    Critical,
}

impl RiskTier {
    /// Totals strictly above this are at least Medium
    pub const MEDIUM_ABOVE: u32 = 5;
    /// Totals strictly above this are at least High
    pub const HIGH_ABOVE: u32 = 15;
    /// Totals strictly above this are Critical
    pub const CRITICAL_ABOVE: u32 = 25;

    pub const ALL: [RiskTier; 4] = [RiskTier::Low, RiskTier::Medium, RiskTier::High, RiskTier::Critical];

    /// Map a point total onto its tier.
    pub fn from_points(points: u32) -> Self {
        if points > Self::CRITICAL_ABOVE {
            RiskTier::Critical
        } else if points > Self::HIGH_ABOVE {
            RiskTier::High
        } else if points > Self::MEDIUM_ABOVE {
            RiskTier::Medium
        } else {
            RiskTier::Low
        }
    }

    /// Fixed headline used in every verdict of this tier.
    pub fn headline(self) -> &'static str {
        match self {
            RiskTier::Low => "Low risk: no strong phishing indicators",
            RiskTier::Medium => "Medium risk: proceed with caution",
            RiskTier::High => "High risk: likely phishing or malicious",
            RiskTier::Critical => "Critical risk: do not visit this link",
        }
    }
}

impl std::fmt::Display for RiskTier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RiskTier::Low => write!(f, "Low"),
            RiskTier::Medium => write!(f, "Medium"),
            RiskTier::High => write!(f, "High"),
            RiskTier::Critical => write!(f, "Critical"),
        }
    }
}

/// Which component produced a finding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FindingSource {
    Lexical,
    Domain,
    Content,
}

/// One discrete piece of evidence with its point weight.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Finding {
    pub rule_id: String,
    pub points: u32,
    pub description: String,
    pub source: FindingSource,
}

impl Finding {
    pub fn new(
        rule_id: impl Into<String>,
        points: u32,
        description: impl Into<String>,
        source: FindingSource,
    ) -> Self {
        Self {
            rule_id: rule_id.into(),
            points,
            description: description.into(),
            source,
        }
    }
}

/// Result of the single page fetch attempted for a URL.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum FetchOutcome {
    Success { status: u16 },
    Timeout,
    ConnectionError,
    TlsError,
    NotAttempted,
}

impl FetchOutcome {
    pub fn is_unreachable(&self) -> bool {
        matches!(self, FetchOutcome::Timeout | FetchOutcome::ConnectionError)
    }

    /// Content and TLS findings only exist for these outcomes
    pub fn allows_content_findings(&self) -> bool {
        matches!(self, FetchOutcome::Success { .. } | FetchOutcome::TlsError)
    }
}

impl std::fmt::Display for FetchOutcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FetchOutcome::Success { status } => write!(f, "HTTP {}", status),
            FetchOutcome::Timeout => write!(f, "timed out"),
            FetchOutcome::ConnectionError => write!(f, "connection failed"),
            FetchOutcome::TlsError => write!(f, "TLS handshake failed"),
            FetchOutcome::NotAttempted => write!(f, "not attempted"),
        }
    }
}

/// Probe that degraded instead of completing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProbeKind {
    Domain,
    Content,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "detail", rename_all = "snake_case")]
pub enum DegradationReason {
    Timeout,
    Failed(String),
    NoData,
}

/// A sub-check that could not complete normally and fell back to its policy.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProbeDegradation {
    pub probe: ProbeKind,
    pub check: String,
    pub reason: DegradationReason,
}

impl ProbeDegradation {
    pub fn new(probe: ProbeKind, check: impl Into<String>, reason: DegradationReason) -> Self {
        Self {
            probe,
            check: check.into(),
            reason,
        }
    }
}

/// Final, immutable scoring result for one input.
///
/// Fields are read through accessors so the point total and tier can never
/// drift from the evidence they are computed from.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Verdict {
    input_url: String,
    normalized_url: String,
    total_points: u32,
    tier: RiskTier,
    summary_message: String,
    evidence: Vec<Finding>,
    fetch_outcome: FetchOutcome,
    final_url: Option<String>,
    degradations: Vec<ProbeDegradation>,
    scanned_at: chrono::DateTime<chrono::Utc>,
}

impl Verdict {
    pub(crate) fn new(
        input_url: String,
        normalized_url: String,
        evidence: Vec<Finding>,
        fetch_outcome: FetchOutcome,
        final_url: Option<String>,
        degradations: Vec<ProbeDegradation>,
    ) -> Self {
        let total_points = evidence.iter().map(|f| f.points).sum();
        let tier = RiskTier::from_points(total_points);
        let summary_message = format!("{} ({} finding(s))", tier.headline(), evidence.len());

        Self {
            input_url,
            normalized_url,
            total_points,
            tier,
            summary_message,
            evidence,
            fetch_outcome,
            final_url,
            degradations,
            scanned_at: chrono::Utc::now(),
        }
    }

    pub fn input_url(&self) -> &str {
        &self.input_url
    }

    pub fn normalized_url(&self) -> &str {
        &self.normalized_url
    }

    pub fn total_points(&self) -> u32 {
        self.total_points
    }

    pub fn tier(&self) -> RiskTier {
        self.tier
    }

    pub fn summary_message(&self) -> &str {
        &self.summary_message
    }

    pub fn evidence(&self) -> &[Finding] {
        &self.evidence
    }

    pub fn fetch_outcome(&self) -> FetchOutcome {
        self.fetch_outcome
    }

    /// URL reached after redirects, when the page was fetched
    pub fn final_url(&self) -> Option<&str> {
        self.final_url.as_deref()
    }

    pub fn degradations(&self) -> &[ProbeDegradation] {
        &self.degradations
    }

    pub fn scanned_at(&self) -> chrono::DateTime<chrono::Utc> {
        self.scanned_at
    }
}
