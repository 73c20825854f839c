//! Lexical Rule Definitions
//!
//! The reference catalog, in evaluation order.

use super::{brands, Predicate, RuleDescriptor, UrlField};
use crate::target::UrlTarget;
use url::Host;

const SHORTENER_HOSTS: &[&str] = &[
    "bit.ly", "tinyurl.com", "goo.gl", "t.co", "ow.ly", "is.gd", "buff.ly", "adf.ly",
    "bit.do", "cutt.ly", "shorturl.at", "rebrand.ly", "tiny.cc", "rb.gy", "t.ly", "s.id",
];

const TRUST_WORDS: &[&str] = &["secure", "safe", "trust", "login", "verify"];

/// Get all rule definitions of the reference catalog
pub fn get_rule_definitions() -> Vec<RuleDescriptor> {
    vec![
        RuleDescriptor {
            id: "shortener_host",
            weight: 2,
            description: "URL uses a link-shortening service that hides the destination",
            predicate: Predicate::Check(uses_shortener),
        },
        RuleDescriptor {
            id: "ip_literal_host",
            weight: 2,
            description: "Host is a raw IPv4 address instead of a domain name",
            predicate: Predicate::Check(|t| matches!(t.url().host(), Some(Host::Ipv4(_)))),
        },
        RuleDescriptor {
            id: "at_symbol",
            weight: 5,
            description: "URL contains '@', which can disguise the real destination",
            predicate: Predicate::Check(|t| t.as_str().contains('@')),
        },
        RuleDescriptor {
            id: "long_url",
            weight: 1,
            description: "URL is longer than 80 characters",
            predicate: Predicate::Check(|t| t.as_str().chars().count() > 80),
        },
        RuleDescriptor {
            id: "bait_keywords",
            weight: 2,
            description: "URL contains bait wording (gift, prize, free, win, claim, discount)",
            predicate: Predicate::Pattern {
                field: UrlField::Full,
                pattern: r"(?i)gift|prize|free|win|claim|discount",
            },
        },
        RuleDescriptor {
            id: "plaintext_scheme",
            weight: 3,
            description: "URL uses unencrypted HTTP",
            predicate: Predicate::Check(|t| !t.is_encrypted()),
        },
        RuleDescriptor {
            id: "nonstandard_port",
            weight: 1,
            description: "URL specifies a non-standard port",
            predicate: Predicate::Check(|t| t.url().port().is_some_and(|p| p >= 1000)),
        },
        RuleDescriptor {
            id: "many_parameters",
            weight: 1,
            description: "URL carries more than 5 '=' parameter assignments",
            predicate: Predicate::Check(|t| t.as_str().matches('=').count() > 5),
        },
        RuleDescriptor {
            id: "deep_subdomains",
            weight: 1,
            description: "Host has more than 3 dot-separated labels",
            predicate: Predicate::Check(|t| !t.is_ip_literal() && t.host_labels().len() > 3),
        },
        RuleDescriptor {
            id: "abuse_prone_tld",
            weight: 1,
            description: "Top-level domain is frequently abused (.cf, .tk, .ga, .ml, .xyz)",
            predicate: Predicate::Pattern {
                field: UrlField::Host,
                pattern: r"\.(?:cf|tk|ga|ml|xyz)\.?$",
            },
        },
        RuleDescriptor {
            id: "trust_word_without_tls",
            weight: 2,
            description: "URL uses trust wording (secure, safe, trust, login, verify) without HTTPS",
            predicate: Predicate::Check(|t| {
                !t.is_encrypted() && TRUST_WORDS.iter().any(|w| t.lowercase().contains(w))
            }),
        },
        RuleDescriptor {
            id: "repeated_subdomain",
            weight: 2,
            description: "Host repeats its domain label as a subdomain",
            predicate: Predicate::Check(has_repeated_label),
        },
        RuleDescriptor {
            id: "digit_in_second_label",
            weight: 1,
            description: "Second host label contains a digit",
            predicate: Predicate::Check(|t| {
                let labels = t.host_labels();
                !t.is_ip_literal()
                    && labels.len() >= 2
                    && labels[1].chars().any(|c| c.is_ascii_digit())
            }),
        },
        RuleDescriptor {
            id: "long_digit_run",
            weight: 1,
            description: "Path contains a run of 8 or more digits",
            predicate: Predicate::Pattern {
                field: UrlField::Path,
                pattern: r"[0-9]{8,}",
            },
        },
        RuleDescriptor {
            id: "mixed_case",
            weight: 1,
            description: "Long URL mixes upper and lower case",
            predicate: Predicate::Check(is_mixed_case),
        },
        RuleDescriptor {
            id: "fragment_marker",
            weight: 1,
            description: "URL contains a '#' fragment marker",
            predicate: Predicate::Check(|t| t.as_str().contains('#')),
        },
        RuleDescriptor {
            id: "admin_keywords",
            weight: 2,
            description: "URL references admin, upload or config resources",
            predicate: Predicate::Pattern {
                field: UrlField::Full,
                pattern: r"(?i)admin|upload|config",
            },
        },
        RuleDescriptor {
            id: "executable_download",
            weight: 2,
            description: "Path ends in an executable extension (.exe, .bat, .cmd, .scr)",
            predicate: Predicate::Pattern {
                field: UrlField::Path,
                pattern: r"(?i)\.(exe|bat|cmd|scr)$",
            },
        },
        RuleDescriptor {
            id: "embedded_protocol",
            weight: 2,
            description: "'http' appears more than once, suggesting an embedded URL",
            predicate: Predicate::Check(|t| t.lowercase().matches("http").count() > 1),
        },
        RuleDescriptor {
            id: "brand_lookalike",
            weight: 2,
            description: "Host imitates a well-known brand name",
            predicate: Predicate::Check(|t| {
                !t.is_ip_literal() && brands::lookalike_brand(&t.host_labels()).is_some()
            }),
        },
    ]
}

fn uses_shortener(target: &UrlTarget) -> bool {
    let host = target.host().trim_start_matches("www.");
    SHORTENER_HOSTS
        .iter()
        .any(|s| host == *s || host.ends_with(&format!(".{}", s)))
}

fn has_repeated_label(target: &UrlTarget) -> bool {
    let labels = target.host_labels();
    // With two labels the first and second-to-last are the same label
    !target.is_ip_literal() && labels.len() >= 3 && labels[0] == labels[labels.len() - 2]
}

fn is_mixed_case(target: &UrlTarget) -> bool {
    let s = target.as_str();
    s.chars().count() > 30 && s != s.to_lowercase() && s != s.to_uppercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fires(id: &str, url: &str) -> bool {
        let def = get_rule_definitions()
            .into_iter()
            .find(|d| d.id == id)
            .unwrap();
        let rules = crate::lexical::LexicalRuleSet::with_rules(vec![def]);
        let target = UrlTarget::parse(url).unwrap();
        !rules.evaluate(&target).is_empty()
    }

    #[test]
    fn test_unique_ids_and_positive_weights() {
        let defs = get_rule_definitions();
        let mut ids: Vec<&str> = defs.iter().map(|d| d.id).collect();
        ids.sort();
        ids.dedup();
        assert_eq!(ids.len(), defs.len());
        assert!(defs.iter().all(|d| d.weight > 0));
    }

    #[test]
    fn test_shortener() {
        assert!(fires("shortener_host", "https://bit.ly/3xYz"));
        assert!(fires("shortener_host", "https://www.tinyurl.com/abc"));
        assert!(!fires("shortener_host", "https://habit.ly.example.com/"));
    }

    #[test]
    fn test_long_url() {
        // "https://example.com/" is 20 characters
        assert!(!fires("long_url", &format!("https://example.com/{}", "a".repeat(60))));
        assert!(fires("long_url", &format!("https://example.com/{}", "a".repeat(61))));
    }

    #[test]
    fn test_ip_literal_host() {
        assert!(fires("ip_literal_host", "http://192.168.1.20/index.html"));
        assert!(!fires("ip_literal_host", "https://example.com/192.168.1.20"));
    }

    #[test]
    fn test_at_symbol() {
        assert!(fires("at_symbol", "https://google.com@evil.example/"));
        assert!(!fires("at_symbol", "https://example.com/contact"));
    }

    #[test]
    fn test_bait_keywords() {
        assert!(fires("bait_keywords", "https://example.com/claim-your-PRIZE"));
        assert!(!fires("bait_keywords", "https://example.com/docs"));
    }

    #[test]
    fn test_admin_keywords() {
        assert!(fires("admin_keywords", "https://example.com/wp-Admin/"));
        assert!(fires("admin_keywords", "https://example.com/upload.php"));
        assert!(!fires("admin_keywords", "https://example.com/about"));
    }

    #[test]
    fn test_brand_lookalike_on_bare_host() {
        assert!(fires("brand_lookalike", "https://paypa1.com/"));
        assert!(fires("brand_lookalike", "https://gooogle.com/"));
        assert!(!fires("brand_lookalike", "https://google.com/"));
        assert!(!fires("brand_lookalike", "https://finance.yahoo.com/"));
        assert!(!fires("brand_lookalike", "https://cloud.google.com/"));
    }

    #[test]
    fn test_port() {
        assert!(fires("nonstandard_port", "https://example.com:8443/"));
        assert!(!fires("nonstandard_port", "https://example.com:443/"));
        assert!(!fires("nonstandard_port", "https://example.com:81/"));
    }

    #[test]
    fn test_parameters() {
        assert!(fires("many_parameters", "https://example.com/?a=1&b=2&c=3&d=4&e=5&f=6"));
        assert!(!fires("many_parameters", "https://example.com/?a=1&b=2&c=3&d=4&e=5"));
    }

    #[test]
    fn test_deep_subdomains() {
        assert!(fires("deep_subdomains", "https://a.b.c.example.com"));
        assert!(!fires("deep_subdomains", "https://www.example.com"));
    }

    #[test]
    fn test_abuse_tld() {
        assert!(fires("abuse_prone_tld", "https://prize.tk"));
        assert!(fires("abuse_prone_tld", "https://shop.xyz/a"));
        assert!(!fires("abuse_prone_tld", "https://example.com"));
        assert!(!fires("abuse_prone_tld", "https://tk.example.com/x.tk"));
    }

    #[test]
    fn test_trust_word_requires_plaintext() {
        assert!(fires("trust_word_without_tls", "http://secure-bank.com/verify"));
        assert!(!fires("trust_word_without_tls", "https://secure-bank.com/verify"));
    }

    #[test]
    fn test_repeated_subdomain() {
        assert!(fires("repeated_subdomain", "https://paypal.paypal.com"));
        assert!(!fires("repeated_subdomain", "https://example.com"));
    }

    #[test]
    fn test_digit_in_second_label() {
        assert!(fires("digit_in_second_label", "https://login.pay4pal.com"));
        assert!(!fires("digit_in_second_label", "https://shop1.example.com"));
    }

    #[test]
    fn test_digit_run() {
        assert!(fires("long_digit_run", "https://example.com/track/123456789"));
        assert!(!fires("long_digit_run", "https://example.com/track/1234567"));
    }

    #[test]
    fn test_mixed_case() {
        assert!(fires("mixed_case", "https://example.com/Account/UpdateDetails"));
        assert!(!fires("mixed_case", "https://ex.com/Ab"));
        assert!(!fires("mixed_case", "https://example.com/account/update-details"));
        // 30 characters does not fire, 31 does
        assert!(!fires("mixed_case", "https://example.com/Abcdefghij"));
        assert!(fires("mixed_case", "https://example.com/Abcdefghijk"));
    }

    #[test]
    fn test_fragment_and_executable() {
        assert!(fires("fragment_marker", "https://example.com/#section"));
        assert!(fires("executable_download", "https://example.com/setup.EXE"));
        assert!(!fires("executable_download", "https://example.com/setup.exe.html"));
    }

    #[test]
    fn test_embedded_protocol() {
        assert!(fires("embedded_protocol", "https://example.com/redirect?to=http://evil.com"));
        assert!(!fires("embedded_protocol", "https://example.com/"));
    }
}
