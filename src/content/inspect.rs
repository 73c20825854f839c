//! Page-level phishing signals from a fetched HTML body.

use crate::models::{Finding, FindingSource};
use regex::Regex;
use scraper::{Html, Selector};

const TITLE_KEYWORDS: &[&str] = &["error", "required", "login", "payment", "urgent"];

const LOGIN_URL_MARKERS: &[&str] = &["login", "signin"];

const REDIRECT_PATTERN: &str = r#"(?i)(?:window|document|top|self)\.location|location\.(?:href|replace|assign)\s*[=(]|http-equiv\s*=\s*["']?refresh|header\s*\(\s*["']location\s*:"#;

/// Compiled selectors and patterns for page inspection.
pub struct PageInspector {
    title: Option<Selector>,
    input: Option<Selector>,
    styled: Option<Selector>,
    redirect: Option<Regex>,
}

impl PageInspector {
    pub fn new() -> Self {
        Self {
            title: Self::selector("title"),
            input: Self::selector("input"),
            styled: Self::selector("[style]"),
            redirect: match Regex::new(REDIRECT_PATTERN) {
                Ok(re) => Some(re),
                Err(e) => {
                    log::warn!("Failed to compile redirect pattern: {}", e);
                    None
                }
            },
        }
    }

    fn selector(css: &str) -> Option<Selector> {
        match Selector::parse(css) {
            Ok(selector) => Some(selector),
            Err(e) => {
                log::warn!("Failed to parse selector '{}': {:?}", css, e);
                None
            }
        }
    }

    /// Run every page check. Checks are independent and may all fire.
    /// A body that does not look like HTML only gets the raw-text redirect check.
    pub fn inspect(&self, body: &str, url_lower: &str) -> Vec<Finding> {
        let mut findings = Vec::new();

        if body.contains('<') {
            let document = Html::parse_document(body);

            if let Some(title) = self.page_title(&document) {
                let lower = title.to_lowercase();
                if TITLE_KEYWORDS.iter().any(|kw| lower.contains(kw)) {
                    findings.push(Finding::new(
                        "suspicious_title",
                        1,
                        format!("Suspicious page title: '{}'", truncate(&title, 80)),
                        FindingSource::Content,
                    ));
                }
            }

            if self.has_password_field(&document) && LOGIN_URL_MARKERS.iter().any(|m| url_lower.contains(m)) {
                findings.push(Finding::new(
                    "credential_form",
                    3,
                    "Credential form on a login-styled URL",
                    FindingSource::Content,
                ));
            }

            let hidden = self.count_hidden(&document);
            if hidden > 0 {
                findings.push(Finding::new(
                    "hidden_elements",
                    2,
                    format!("{} hidden element(s) present", hidden),
                    FindingSource::Content,
                ));
            }
        }

        if self.redirect.as_ref().is_some_and(|re| re.is_match(body)) {
            findings.push(Finding::new(
                "script_redirect",
                2,
                "Immediate script redirect",
                FindingSource::Content,
            ));
        }

        findings
    }

    fn page_title(&self, document: &Html) -> Option<String> {
        let selector = self.title.as_ref()?;
        let title = document.select(selector).next()?.text().collect::<String>();
        let title = title.split_whitespace().collect::<Vec<_>>().join(" ");
        (!title.is_empty()).then_some(title)
    }

    fn has_password_field(&self, document: &Html) -> bool {
        let Some(selector) = self.input.as_ref() else {
            return false;
        };
        document.select(selector).any(|input| {
            input
                .value()
                .attr("type")
                .is_some_and(|t| t.trim().eq_ignore_ascii_case("password"))
        })
    }

    fn count_hidden(&self, document: &Html) -> usize {
        let Some(selector) = self.styled.as_ref() else {
            return 0;
        };
        document
            .select(selector)
            .filter(|el| {
                let style: String = el
                    .value()
                    .attr("style")
                    .unwrap_or_default()
                    .chars()
                    .filter(|c| !c.is_whitespace())
                    .collect::<String>()
                    .to_lowercase();
                style.contains("display:none") || style.contains("visibility:hidden")
            })
            .count()
    }
}

impl Default for PageInspector {
    fn default() -> Self {
        Self::new()
    }
}

fn truncate(s: &str, max_chars: usize) -> String {
    if s.chars().count() <= max_chars {
        s.to_string()
    } else {
        let cut: String = s.chars().take(max_chars).collect();
        format!("{}...", cut)
    }
}
