use crate::errors::ValidationError;
use crate::models::{RiskTier, Verdict};
use crate::reporter::tier_badge;
use console::{style, Term};
use indicatif::{ProgressBar, ProgressStyle};
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};

/// Live tallies for a running batch
#[derive(Debug, Default)]
pub struct BatchStats {
    pub scored: AtomicU64,
    pub rejected: AtomicU64,
    pub flagged: AtomicU64,
}

/// Progress display for a batch of URLs. Drawn on stderr so a report on
/// stdout stays clean; hidden entirely when quiet or not a terminal.
pub struct BatchProgress {
    term: Term,
    bar: ProgressBar,
    stats: BatchStats,
    alert_tier: RiskTier,
    start_time: Instant,
}

impl BatchProgress {
    pub fn new(total: u64, quiet: bool) -> Self {
        let term = Term::stderr();
        let bar = if quiet || !term.is_term() {
            ProgressBar::hidden()
        } else {
            ProgressBar::new(total)
        };

        match ProgressStyle::with_template(
            "{prefix} {spinner:.green} [{elapsed_precise}] [{wide_bar:.cyan/blue}] {pos}/{len} {msg}",
        ) {
            Ok(bar_style) => bar.set_style(
                bar_style
                    .progress_chars("█▉▊▋▌▍▎▏  ")
                    .tick_strings(&["▰▱▱▱", "▰▰▱▱", "▰▰▰▱", "▰▰▰▰", "▱▰▰▰", "▱▱▰▰", "▱▱▱▰", "▱▱▱▱"]),
            ),
            Err(e) => log::debug!("Progress template rejected: {}", e),
        }
        bar.set_prefix(style("SCAN").green().bold().to_string());
        bar.enable_steady_tick(Duration::from_millis(120));

        Self {
            term,
            bar,
            stats: BatchStats::default(),
            alert_tier: RiskTier::High,
            start_time: Instant::now(),
        }
    }

    pub fn is_hidden(&self) -> bool {
        self.bar.is_hidden()
    }

    pub fn started(&self, input: &str) {
        let display = if input.chars().count() > 50 {
            let tail: String = input.chars().rev().take(47).collect::<Vec<_>>().into_iter().rev().collect();
            format!("...{}", tail)
        } else {
            input.to_string()
        };
        self.bar.set_message(style(display).dim().to_string());
    }

    /// Record one finished input; high-risk verdicts are echoed above the bar.
    pub fn completed(&self, outcome: &Result<Verdict, ValidationError>) {
        match outcome {
            Ok(verdict) => {
                self.stats.scored.fetch_add(1, Ordering::Relaxed);
                if verdict.tier() >= self.alert_tier {
                    self.stats.flagged.fetch_add(1, Ordering::Relaxed);
                    self.bar.println(format!(
                        "{} {} ({} pts)",
                        tier_badge(verdict.tier()),
                        style(verdict.normalized_url()).white().bold(),
                        verdict.total_points()
                    ));
                }
            }
            Err(_) => {
                self.stats.rejected.fetch_add(1, Ordering::Relaxed);
            }
        }
        self.bar.inc(1);
    }

    pub fn finish(&self) {
        self.bar.finish_and_clear();
        if self.is_hidden() {
            return;
        }

        let elapsed = self.start_time.elapsed().as_secs_f64();
        let _ = self.term.write_line(&format!(
            "{} {} scored, {} rejected, {} flagged in {:.2}s",
            style("done").green().bold(),
            style(self.stats.scored.load(Ordering::Relaxed)).white().bold(),
            style(self.stats.rejected.load(Ordering::Relaxed)).magenta(),
            style(self.stats.flagged.load(Ordering::Relaxed)).red().bold(),
            elapsed
        ));
    }

    pub fn stats(&self) -> &BatchStats {
        &self.stats
    }
}

impl Drop for BatchProgress {
    fn drop(&mut self) {
        let _ = self.term.show_cursor();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::UrlRiskEngine;
    use crate::lexical::LexicalRuleSet;

    #[tokio::test]
    async fn test_counts_outcomes() {
        let engine = UrlRiskEngine::offline(LexicalRuleSet::shared());
        let progress = BatchProgress::new(3, true);
        assert!(progress.is_hidden());

        for input in ["https://example.com", "", "http://user@192.168.0.1:8080/login.exe"] {
            progress.started(input);
            progress.completed(&engine.score_url(input).await);
        }
        progress.finish();

        assert_eq!(progress.stats().scored.load(Ordering::Relaxed), 2);
        assert_eq!(progress.stats().rejected.load(Ordering::Relaxed), 1);
    }
}
