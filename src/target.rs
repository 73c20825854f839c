//! Input normalization and syntactic URL validation.
//!
//! Every rule and probe receives a [`UrlTarget`]; it is built exactly once per
//! scoring request and carries both the normalized string and its parsed form.

use crate::errors::ValidationError;
use url::{Host, Url};

/// Scheme prefixed onto inputs that do not name one
pub const DEFAULT_SCHEME_PREFIX: &str = "https://";

/// A validated, normalized URL ready for scoring.
#[derive(Debug, Clone)]
pub struct UrlTarget {
    normalized: String,
    lowercase: String,
    url: Url,
}

impl UrlTarget {
    /// Normalize and validate a raw input.
    pub fn parse(raw: &str) -> Result<Self, ValidationError> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(ValidationError::Empty);
        }

        if trimmed.chars().any(|c| c.is_whitespace() || c.is_control()) {
            return Err(ValidationError::InvalidSyntax {
                input: trimmed.to_string(),
                reason: "contains whitespace or control characters".to_string(),
            });
        }

        let normalized = normalize(trimmed);
        let url = Url::parse(&normalized).map_err(|e| ValidationError::InvalidSyntax {
            input: trimmed.to_string(),
            reason: e.to_string(),
        })?;

        if !matches!(url.scheme(), "http" | "https") {
            return Err(ValidationError::UnsupportedScheme {
                scheme: url.scheme().to_string(),
            });
        }

        match url.host() {
            None => return Err(ValidationError::MissingHost),
            Some(Host::Ipv4(ip)) => {
                // Reject integer or hex shorthands the parser expands into addresses
                if !normalized.contains(&ip.to_string()) {
                    return Err(ValidationError::InvalidHost {
                        host: ip.to_string(),
                    });
                }
            }
            Some(Host::Ipv6(_)) => {}
            Some(Host::Domain(domain)) => {
                if !is_valid_domain(domain) {
                    return Err(ValidationError::InvalidHost {
                        host: domain.to_string(),
                    });
                }
            }
        }

        let lowercase = normalized.to_lowercase();
        Ok(Self {
            normalized,
            lowercase,
            url,
        })
    }

    /// The normalized input string every rule inspects
    pub fn as_str(&self) -> &str {
        &self.normalized
    }

    pub fn lowercase(&self) -> &str {
        &self.lowercase
    }

    pub fn url(&self) -> &Url {
        &self.url
    }

    /// Host as the URL parser serialized it (lowercased, punycode)
    pub fn host(&self) -> &str {
        self.url.host_str().unwrap_or_default()
    }

    pub fn host_labels(&self) -> Vec<&str> {
        self.host()
            .trim_end_matches('.')
            .split('.')
            .filter(|l| !l.is_empty())
            .collect()
    }

    pub fn is_ip_literal(&self) -> bool {
        matches!(self.url.host(), Some(Host::Ipv4(_)) | Some(Host::Ipv6(_)))
    }

    pub fn is_encrypted(&self) -> bool {
        self.url.scheme() == "https"
    }

    pub fn path(&self) -> &str {
        self.url.path()
    }
}

impl std::fmt::Display for UrlTarget {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.normalized)
    }
}

/// Prefix the default scheme when the input has none.
pub fn normalize(input: &str) -> String {
    if has_explicit_scheme(input) {
        input.to_string()
    } else {
        format!("{}{}", DEFAULT_SCHEME_PREFIX, input)
    }
}

fn has_explicit_scheme(input: &str) -> bool {
    match input.split_once("://") {
        Some((scheme, _)) => {
            let mut chars = scheme.chars();
            chars.next().is_some_and(|c| c.is_ascii_alphabetic())
                && chars.all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '.'))
        }
        None => false,
    }
}

fn is_valid_domain(domain: &str) -> bool {
    let domain = domain.trim_end_matches('.');
    let labels: Vec<&str> = domain.split('.').collect();
    if labels.len() < 2 || domain.len() > 253 {
        return false;
    }

    let labels_ok = labels.iter().all(|label| {
        !label.is_empty()
            && label.len() <= 63
            && !label.starts_with('-')
            && !label.ends_with('-')
            && label.chars().all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
    });

    let tld = labels[labels.len() - 1];
    let tld_ok = tld.starts_with("xn--") || (tld.len() >= 2 && tld.chars().all(|c| c.is_ascii_alphabetic()));

    labels_ok && tld_ok
}
