//! Report rendering for batches of scored URLs.

use crate::cli::OutputFormat;
use crate::engine::{calculate_risk_breakdown, TierBreakdown};
use crate::errors::{LureResult, ValidationError};
use crate::models::{DegradationReason, FetchOutcome, RiskTier, Verdict};
use console::{style, Style};
use serde::Serialize;
use std::fmt::Write as _;

/// One input of a batch with what the engine made of it
#[derive(Debug, Clone)]
pub struct BatchEntry {
    pub input: String,
    pub outcome: Result<Verdict, ValidationError>,
}

impl BatchEntry {
    pub fn verdict(&self) -> Option<&Verdict> {
        self.outcome.as_ref().ok()
    }
}

/// Body of a successful analysis in the web-API shape
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AnalysisResponse {
    pub status: &'static str,
    pub message: String,
    pub link: String,
    pub result_message: String,
    pub risk_score: RiskTier,
    pub suspicious_points: u32,
    pub detected_warnings: usize,
    pub warnings: Vec<String>,
}

impl AnalysisResponse {
    pub fn from_verdict(verdict: &Verdict) -> Self {
        let outcome = verdict.fetch_outcome();
        let (status, message) = match outcome {
            FetchOutcome::Success { status } if (200..300).contains(&status) => {
                ("success", "Analysis complete.".to_string())
            }
            FetchOutcome::Success { status } => (
                "warning",
                format!("Link exists but returned an unusual status ({}).", status),
            ),
            FetchOutcome::NotAttempted => ("warning", "Analysis complete without visiting the link.".to_string()),
            unreachable if unreachable.is_unreachable() => (
                "error",
                format!("Could not connect to the link ({}).", unreachable),
            ),
            other => ("error", format!("Link answered over a connection that failed validation ({}).", other)),
        };

        Self {
            status,
            message,
            link: verdict.normalized_url().to_string(),
            result_message: verdict.summary_message().to_string(),
            risk_score: verdict.tier(),
            suspicious_points: verdict.total_points(),
            detected_warnings: verdict.evidence().len(),
            warnings: verdict.evidence().iter().map(|f| f.description.clone()).collect(),
        }
    }
}

/// Body returned for input that failed validation
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValidationResponse {
    pub status: &'static str,
    pub message: String,
    pub error_code: u16,
}

impl ValidationResponse {
    pub fn from_error(error: &ValidationError) -> Self {
        Self {
            status: "validation_error",
            message: format!("Validation failed: {}", error),
            error_code: 400,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum WebResponse {
    Analysis(AnalysisResponse),
    Validation(ValidationResponse),
}

impl From<&BatchEntry> for WebResponse {
    fn from(entry: &BatchEntry) -> Self {
        match &entry.outcome {
            Ok(verdict) => WebResponse::Analysis(AnalysisResponse::from_verdict(verdict)),
            Err(error) => WebResponse::Validation(ValidationResponse::from_error(error)),
        }
    }
}

#[derive(Serialize)]
struct JsonReport {
    generated_at: String,
    scored: usize,
    rejected: usize,
    breakdown: TierBreakdown,
    results: Vec<serde_json::Value>,
}

pub struct Reporter {
    format: OutputFormat,
    colored: bool,
}

impl Reporter {
    pub fn new(format: OutputFormat, colored: bool) -> Self {
        Self { format, colored }
    }

    pub fn render(&self, entries: &[BatchEntry]) -> LureResult<String> {
        match self.format {
            OutputFormat::Text => Ok(self.render_text(entries)),
            OutputFormat::Json => self.render_json(entries),
            OutputFormat::Response => {
                let responses: Vec<WebResponse> = entries.iter().map(WebResponse::from).collect();
                Ok(serde_json::to_string_pretty(&responses)?)
            }
        }
    }

    fn render_json(&self, entries: &[BatchEntry]) -> LureResult<String> {
        let mut results = Vec::with_capacity(entries.len());
        for entry in entries {
            let value = match &entry.outcome {
                Ok(verdict) => serde_json::to_value(verdict)?,
                Err(error) => serde_json::json!({
                    "input_url": entry.input,
                    "error": error.to_string(),
                }),
            };
            results.push(value);
        }

        let scored = entries.iter().filter(|e| e.outcome.is_ok()).count();
        let report = JsonReport {
            generated_at: chrono::Utc::now().to_rfc3339(),
            scored,
            rejected: entries.len() - scored,
            breakdown: calculate_risk_breakdown(entries.iter().filter_map(BatchEntry::verdict)),
            results,
        };
        Ok(serde_json::to_string_pretty(&report)?)
    }

    fn paint(&self, s: &Style) -> Style {
        s.clone().force_styling(self.colored)
    }

    fn tier_style(&self, tier: RiskTier) -> Style {
        let base = match tier {
            RiskTier::Low => Style::new().green(),
            RiskTier::Medium => Style::new().yellow(),
            RiskTier::High => Style::new().red(),
            RiskTier::Critical => Style::new().red().bold(),
        };
        self.paint(&base)
    }

    fn render_text(&self, entries: &[BatchEntry]) -> String {
        let mut out = String::new();
        let dim = self.paint(&Style::new().dim());
        let bold = self.paint(&Style::new().bold());

        for (index, entry) in entries.iter().enumerate() {
            match &entry.outcome {
                Ok(verdict) => {
                    let tier = self.tier_style(verdict.tier());
                    let _ = writeln!(
                        out,
                        "{} {} {}",
                        dim.apply_to(format!("[{}]", index + 1)),
                        bold.apply_to(verdict.normalized_url()),
                        tier.apply_to(format!("{} ({} pts)", verdict.tier(), verdict.total_points()))
                    );
                    let _ = writeln!(out, "    {}", verdict.summary_message());
                    let _ = writeln!(out, "    {} {}", dim.apply_to("fetch:"), verdict.fetch_outcome());
                    if let Some(final_url) = verdict.final_url() {
                        if final_url != verdict.normalized_url() {
                            let _ = writeln!(out, "    {} {}", dim.apply_to("landed on:"), final_url);
                        }
                    }
                    for finding in verdict.evidence() {
                        let _ = writeln!(
                            out,
                            "      +{:<2} {:<32} {}",
                            finding.points,
                            finding.rule_id,
                            dim.apply_to(&finding.description)
                        );
                    }
                    for degradation in verdict.degradations() {
                        let reason = match &degradation.reason {
                            DegradationReason::Timeout => "timed out".to_string(),
                            DegradationReason::NoData => "no data".to_string(),
                            DegradationReason::Failed(message) => message.clone(),
                        };
                        let _ = writeln!(
                            out,
                            "      {} {}/{}: {}",
                            self.paint(&Style::new().yellow()).apply_to("unverified"),
                            format!("{:?}", degradation.probe).to_lowercase(),
                            degradation.check,
                            reason
                        );
                    }
                }
                Err(error) => {
                    let _ = writeln!(
                        out,
                        "{} {} {}",
                        dim.apply_to(format!("[{}]", index + 1)),
                        bold.apply_to(if entry.input.trim().is_empty() { "<empty>" } else { entry.input.as_str() }),
                        self.paint(&Style::new().magenta()).apply_to(format!("rejected: {}", error))
                    );
                }
            }
            out.push('\n');
        }

        let breakdown = calculate_risk_breakdown(entries.iter().filter_map(BatchEntry::verdict));
        let _ = writeln!(out, "{}", bold.apply_to("RISK BREAKDOWN"));
        let _ = writeln!(out, "{}", "=".repeat(40));
        for tier in RiskTier::ALL.iter().rev() {
            let _ = writeln!(
                out,
                "{:<10} {}",
                self.tier_style(*tier).apply_to(tier.to_string()),
                breakdown.count(*tier)
            );
        }
        let rejected = entries.iter().filter(|e| e.outcome.is_err()).count();
        if rejected > 0 {
            let _ = writeln!(out, "{:<10} {}", "Rejected", rejected);
        }

        out
    }
}

/// Single-line colored tier label for terminal alerts
pub fn tier_badge(tier: RiskTier) -> String {
    match tier {
        RiskTier::Low => style("LOW").green().to_string(),
        RiskTier::Medium => style("MEDIUM").yellow().to_string(),
        RiskTier::High => style("HIGH").red().bold().to_string(),
        RiskTier::Critical => style("CRITICAL").red().bold().reverse().to_string(),
    }
}
