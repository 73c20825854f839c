//! Lexical Rule Set
//!
//! Pure predicates over the normalized URL and its parsed components.
//! Each rule carries a fixed weight; every rule that fires yields exactly one
//! finding, in catalog order. No I/O, no failure mode.

mod brands;
mod rules;

use crate::models::{Finding, FindingSource};
use crate::target::UrlTarget;
use regex::Regex;
use std::panic::{self, AssertUnwindSafe};
use std::sync::{Arc, OnceLock};

/// Part of the URL a pattern rule is matched against
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UrlField {
    /// The whole normalized URL string
    Full,
    Host,
    Path,
}

/// How a rule decides whether it fires
#[derive(Clone, Copy)]
pub enum Predicate {
    /// Arbitrary check over the parsed target
    Check(fn(&UrlTarget) -> bool),
    /// Regular expression matched against one field
    Pattern { field: UrlField, pattern: &'static str },
}

/// Static definition of one lexical rule
#[derive(Clone, Copy)]
pub struct RuleDescriptor {
    pub id: &'static str,
    pub weight: u32,
    pub description: &'static str,
    pub predicate: Predicate,
}

enum Matcher {
    Check(fn(&UrlTarget) -> bool),
    Regex(UrlField, Regex),
}

impl Matcher {
    fn matches(&self, target: &UrlTarget) -> bool {
        match self {
            Matcher::Check(check) => check(target),
            Matcher::Regex(field, regex) => {
                let haystack = match field {
                    UrlField::Full => target.as_str(),
                    UrlField::Host => target.host(),
                    UrlField::Path => target.path(),
                };
                regex.is_match(haystack)
            }
        }
    }
}

/// Compiled, read-only rule catalog.
pub struct LexicalRuleSet {
    rules: Vec<(RuleDescriptor, Matcher)>,
}

static STANDARD_RULES: OnceLock<Arc<LexicalRuleSet>> = OnceLock::new();

impl LexicalRuleSet {
    /// Compile the reference catalog
    pub fn new() -> Self {
        Self::with_rules(rules::get_rule_definitions())
    }

    /// Compile a custom catalog. Rules whose pattern does not compile are
    /// dropped with a warning.
    pub fn with_rules(definitions: Vec<RuleDescriptor>) -> Self {
        let mut compiled = Vec::with_capacity(definitions.len());

        for def in definitions {
            let matcher = match def.predicate {
                Predicate::Check(check) => Matcher::Check(check),
                Predicate::Pattern { field, pattern } => match Regex::new(pattern) {
                    Ok(re) => Matcher::Regex(field, re),
                    Err(e) => {
                        log::warn!("Failed to compile lexical rule '{}': {}", def.id, e);
                        continue;
                    }
                },
            };
            compiled.push((def, matcher));
        }

        Self { rules: compiled }
    }

    /// Process-wide reference catalog, compiled on first use
    pub fn shared() -> Arc<LexicalRuleSet> {
        Arc::clone(STANDARD_RULES.get_or_init(|| Arc::new(LexicalRuleSet::new())))
    }

    /// Evaluate every rule against the target.
    ///
    /// A predicate that panics is logged and counted as not fired, so one
    /// broken rule never voids the rest of the evaluation.
    pub fn evaluate(&self, target: &UrlTarget) -> Vec<Finding> {
        let mut findings = Vec::new();

        for (def, matcher) in &self.rules {
            let fired = panic::catch_unwind(AssertUnwindSafe(|| matcher.matches(target)));
            match fired {
                Ok(true) => {
                    log::debug!("Lexical rule '{}' fired on {}", def.id, target);
                    findings.push(Finding::new(
                        def.id,
                        def.weight,
                        def.description,
                        FindingSource::Lexical,
                    ));
                }
                Ok(false) => {}
                Err(_) => {
                    log::warn!("Lexical rule '{}' panicked on {}; skipping it", def.id, target);
                }
            }
        }

        findings
    }

    /// Get count of loaded rules
    pub fn rule_count(&self) -> usize {
        self.rules.len()
    }

    pub fn rule_ids(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.rules.iter().map(|(def, _)| def.id)
    }
}

impl Default for LexicalRuleSet {
    fn default() -> Self {
        Self::new()
    }
}
