//! Brand look-alike detection for host names.

use strsim::levenshtein;

const PROTECTED_BRANDS: &[&str] = &[
    "facebook", "google", "apple", "paypal", "amazon", "microsoft", "netflix", "instagram",
    "whatsapp", "linkedin", "twitter", "outlook", "office365", "dropbox", "icloud", "yahoo",
    "ebay", "chase", "wellsfargo", "bankofamerica", "coinbase", "binance",
];

/// Return the brand a host imitates, if any.
///
/// Each label except the TLD is split on hyphens. A token fires when it is a
/// brand typo (edit distance, or digit-for-letter substitution), or when it is
/// the exact brand glued to other words inside a hyphenated label.
/// Edit-distance typos must be at least six characters long and keep the
/// brand's first and last letter, so dictionary words near short brands pass.
pub fn lookalike_brand(labels: &[&str]) -> Option<&'static str> {
    let (_, names) = labels.split_last()?;

    for label in names {
        let label = label.to_ascii_lowercase();
        let hyphenated = label.contains('-');

        for token in label.split('-').filter(|t| t.len() >= 4) {
            for brand in PROTECTED_BRANDS {
                if token == *brand {
                    if hyphenated {
                        return Some(brand);
                    }
                    continue;
                }

                if deglyph(token) == *brand {
                    return Some(brand);
                }

                if is_typo_of(token, brand) {
                    return Some(brand);
                }
            }
        }
    }

    None
}

fn deglyph(s: &str) -> String {
    s.replace("rn", "m")
        .replace("vv", "w")
        .replace('0', "o")
        .replace('1', "l")
        .replace('3', "e")
        .replace('4', "a")
        .replace('5', "s")
        .replace('7', "t")
        .replace('8', "b")
        .replace('9', "g")
}

const MIN_TYPO_LEN: usize = 6;

fn is_typo_of(token: &str, brand: &str) -> bool {
    let max_distance = if brand.len() >= 7 { 2 } else { 1 };
    token.len() >= MIN_TYPO_LEN
        && token.len().abs_diff(brand.len()) <= max_distance
        && token.chars().next() == brand.chars().next()
        && token.chars().last() == brand.chars().last()
        && (1..=max_distance).contains(&levenshtein(token, brand))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_typo_window() {
        assert!(is_typo_of("gooogle", "google"));
        assert!(is_typo_of("dropbax", "dropbox"));
        assert!(!is_typo_of("google", "google"));
        assert!(!is_typo_of("ample", "apple"));
        assert!(!is_typo_of("finance", "binance"));
    }

    #[test]
    fn test_genuine_brand_domains_pass() {
        assert_eq!(lookalike_brand(&["google", "com"]), None);
        assert_eq!(lookalike_brand(&["www", "facebook", "com"]), None);
        assert_eq!(lookalike_brand(&["mail", "google", "com"]), None);
    }

    #[test]
    fn test_typos_fire() {
        assert_eq!(lookalike_brand(&["gooogle", "com"]), Some("google"));
        assert_eq!(lookalike_brand(&["faceb00k", "com"]), Some("facebook"));
        assert_eq!(lookalike_brand(&["appple", "com"]), Some("apple"));
        assert_eq!(lookalike_brand(&["gogle", "com"]), None);
        assert_eq!(lookalike_brand(&["rnicrosoft", "net"]), Some("microsoft"));
    }

    #[test]
    fn test_combosquat_fires() {
        assert_eq!(lookalike_brand(&["secure-login-paypal-verify", "tk"]), Some("paypal"));
    }

    #[test]
    fn test_unrelated_hosts_pass() {
        assert_eq!(lookalike_brand(&["example", "com"]), None);
        assert_eq!(lookalike_brand(&["rust-lang", "org"]), None);
        assert_eq!(lookalike_brand(&["amazing", "com"]), None);
        assert_eq!(lookalike_brand(&["google"]), None);
    }

    #[test]
    fn test_dictionary_words_near_brands_pass() {
        assert_eq!(lookalike_brand(&["finance", "yahoo", "com"]), None);
        assert_eq!(lookalike_brand(&["cloud", "google", "com"]), None);
        assert_eq!(lookalike_brand(&["phase", "io"]), None);
        assert_eq!(lookalike_brand(&["ample", "com"]), None);
    }
}
