//! Aggregation: merge probe results into a verdict, and tally batches.

use crate::content::ContentReport;
use crate::domain_intel::DomainReport;
use crate::models::{Finding, RiskTier, Verdict};
use crate::target::UrlTarget;
use serde::Serialize;

/// Merge all findings in their fixed order: lexical, domain, content.
pub fn assemble(
    input: &str,
    target: &UrlTarget,
    lexical: Vec<Finding>,
    domain: DomainReport,
    content: ContentReport,
) -> Verdict {
    let mut evidence = Vec::with_capacity(lexical.len() + domain.findings.len() + content.findings.len());
    evidence.extend(lexical);
    evidence.extend(domain.findings);
    evidence.extend(content.findings);

    let mut degradations = domain.degradations;
    degradations.extend(content.degradations);

    Verdict::new(
        input.to_string(),
        target.as_str().to_string(),
        evidence,
        content.outcome,
        content.final_url,
        degradations,
    )
}

/// Count of verdicts per tier
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct TierBreakdown {
    pub low: usize,
    pub medium: usize,
    pub high: usize,
    pub critical: usize,
}

impl TierBreakdown {
    pub fn count(&self, tier: RiskTier) -> usize {
        match tier {
            RiskTier::Low => self.low,
            RiskTier::Medium => self.medium,
            RiskTier::High => self.high,
            RiskTier::Critical => self.critical,
        }
    }
}

/// Calculate the breakdown of risk tiers across verdicts
pub fn calculate_risk_breakdown<'a>(verdicts: impl IntoIterator<Item = &'a Verdict>) -> TierBreakdown {
    let mut breakdown = TierBreakdown::default();

    for verdict in verdicts {
        match verdict.tier() {
            RiskTier::Low => breakdown.low += 1,
            RiskTier::Medium => breakdown.medium += 1,
            RiskTier::High => breakdown.high += 1,
            RiskTier::Critical => breakdown.critical += 1,
        }
    }

    breakdown
}
