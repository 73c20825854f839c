//! Engine Facade
//!
//! `score_url` is the single entry point: normalize, run the lexical rules,
//! run the domain and content probes concurrently, aggregate.
//! - `aggregate`: verdict assembly and batch tier breakdowns

mod aggregate;

pub use aggregate::{assemble, calculate_risk_breakdown, TierBreakdown};

use crate::config::EngineConfig;
use crate::content::{ContentProbe, ContentReport, HttpFetcher};
use crate::domain_intel::{DomainIntelProbe, DomainReport};
use crate::errors::{LureResult, ValidationError};
use crate::lexical::LexicalRuleSet;
use crate::models::Verdict;
use crate::target::UrlTarget;
use std::sync::Arc;

/// Risk-scoring engine. Holds no per-request state, so one instance can
/// serve any number of concurrent `score_url` calls.
pub struct UrlRiskEngine {
    rules: Arc<LexicalRuleSet>,
    domain_probe: Option<DomainIntelProbe>,
    content_probe: Option<ContentProbe>,
}

impl UrlRiskEngine {
    /// Create an engine wired to the live services described by `config`
    pub fn new(config: &EngineConfig) -> LureResult<Self> {
        config.validate()?;
        let rules = LexicalRuleSet::shared();
        log::info!("Risk engine initialized with {} lexical rules", rules.rule_count());

        if config.offline {
            log::info!("Offline mode: network probes disabled");
            return Ok(Self::offline(rules));
        }

        let fetcher = HttpFetcher::new(config)?;
        Ok(Self::with_probes(
            rules,
            Some(DomainIntelProbe::from_config(config)?),
            Some(ContentProbe::new(
                Arc::new(fetcher),
                config.content_timeout(),
                config.tls_timeout(),
            )),
        ))
    }

    pub fn with_probes(
        rules: Arc<LexicalRuleSet>,
        domain_probe: Option<DomainIntelProbe>,
        content_probe: Option<ContentProbe>,
    ) -> Self {
        Self {
            rules,
            domain_probe,
            content_probe,
        }
    }

    /// Engine that only runs the lexical rules
    pub fn offline(rules: Arc<LexicalRuleSet>) -> Self {
        Self::with_probes(rules, None, None)
    }

    /// Score one raw input.
    ///
    /// Only validation can fail; every probe failure is folded into the
    /// verdict as fallback findings and degradations.
    pub async fn score_url(&self, raw: &str) -> Result<Verdict, ValidationError> {
        let target = UrlTarget::parse(raw)?;
        log::debug!("Scoring {}", target);

        let lexical = self.rules.evaluate(&target);

        let domain = async {
            match &self.domain_probe {
                Some(probe) => probe.probe(target.host()).await,
                None => DomainReport::default(),
            }
        };
        let content = async {
            match &self.content_probe {
                Some(probe) => probe.probe(&target).await,
                None => ContentReport::not_attempted(),
            }
        };
        let (domain, content) = tokio::join!(domain, content);

        let verdict = assemble(raw, &target, lexical, domain, content);
        log::info!(
            "{} scored {} point(s): {}",
            verdict.normalized_url(),
            verdict.total_points(),
            verdict.tier()
        );
        Ok(verdict)
    }
}
