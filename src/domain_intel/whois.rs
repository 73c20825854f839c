//! WHOIS client (RFC 3912) for domain creation dates.

use super::RegistrationLookup;
use crate::errors::{LureError, LureResult};
use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;

/// Cap on a single WHOIS response
const MAX_RESPONSE_BYTES: u64 = 256 * 1024;

/// Field names registries use for the creation date
const CREATION_KEYS: &[&str] = &[
    "creation date",
    "created on",
    "created",
    "registered on",
    "registration time",
    "registration date",
    "domain registration date",
    "record created",
    "domain create date",
    "registered",
];

pub struct WhoisClient {
    bootstrap_server: String,
    port: u16,
}

impl WhoisClient {
    pub fn new(bootstrap_server: &str, port: u16) -> Self {
        Self {
            bootstrap_server: bootstrap_server.to_string(),
            port,
        }
    }

    async fn query(&self, server: &str, query: &str) -> LureResult<String> {
        log::debug!("WHOIS query '{}' to {}:{}", query, server, self.port);

        let mut stream = TcpStream::connect((server, self.port))
            .await
            .map_err(|e| LureError::whois(server, e.to_string()))?;
        stream
            .write_all(format!("{}\r\n", query).as_bytes())
            .await
            .map_err(|e| LureError::whois(server, e.to_string()))?;

        let mut raw = Vec::new();
        stream
            .take(MAX_RESPONSE_BYTES)
            .read_to_end(&mut raw)
            .await
            .map_err(|e| LureError::whois(server, e.to_string()))?;

        Ok(String::from_utf8_lossy(&raw).into_owned())
    }
}

#[async_trait]
impl RegistrationLookup for WhoisClient {
    async fn creation_date(&self, host: &str) -> LureResult<Option<DateTime<Utc>>> {
        let Some(domain) = registrable_domain(host) else {
            return Ok(None);
        };
        let tld = domain.rsplit('.').next().unwrap_or_default();

        let iana = self.query(&self.bootstrap_server, tld).await?;
        let server = field_value(&iana, &["refer", "whois"]).ok_or_else(|| {
            LureError::whois(&self.bootstrap_server, format!("no WHOIS server known for .{}", tld))
        })?;

        let response = self.query(&server, &domain).await?;
        if let Some(created) = parse_creation_date(&response) {
            return Ok(Some(created));
        }

        // Thin registries only point at the registrar's server
        match field_value(&response, &["registrar whois server"]) {
            Some(registrar) if !registrar.eq_ignore_ascii_case(&server) => {
                let detail = self.query(&registrar, &domain).await?;
                Ok(parse_creation_date(&detail))
            }
            _ => Ok(None),
        }
    }
}

/// Reduce a host to the domain a registry would know about, using the
/// public suffix list. Returns `None` for IP literals.
pub fn registrable_domain(host: &str) -> Option<String> {
    let host = host.trim().trim_end_matches('.').to_lowercase();
    let bare = host.trim_start_matches('[').trim_end_matches(']');
    if host.is_empty() || bare.parse::<std::net::IpAddr>().is_ok() {
        return None;
    }

    // A host that is itself a public suffix is queried as-is
    let domain = psl::domain_str(&host).unwrap_or(host.as_str());
    Some(domain.to_string())
}

/// Extract the creation date from a WHOIS response.
pub fn parse_creation_date(response: &str) -> Option<DateTime<Utc>> {
    for line in response.lines() {
        let Some((key, value)) = line.split_once(':') else {
            continue;
        };
        let key = key.trim().to_lowercase();
        if !CREATION_KEYS.contains(&key.as_str()) {
            continue;
        }
        if let Some(date) = parse_date(value.trim()) {
            return Some(date);
        }
    }
    None
}

fn field_value(response: &str, keys: &[&str]) -> Option<String> {
    response.lines().find_map(|line| {
        let (key, value) = line.split_once(':')?;
        let value = value.trim();
        (keys.contains(&key.trim().to_lowercase().as_str()) && !value.is_empty()).then(|| value.to_string())
    })
}

fn parse_date(value: &str) -> Option<DateTime<Utc>> {
    let cleaned = value
        .trim_end_matches("(UTC)")
        .trim_end_matches("UTC")
        .trim_end_matches("GMT")
        .trim();

    if let Ok(dt) = DateTime::parse_from_rfc3339(cleaned) {
        return Some(dt.with_timezone(&Utc));
    }

    for format in ["%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M:%S", "%Y.%m.%d %H:%M:%S", "%d.%m.%Y %H:%M:%S"] {
        if let Ok(dt) = NaiveDateTime::parse_from_str(cleaned, format) {
            return Some(dt.and_utc());
        }
    }

    let first = cleaned.split_whitespace().next()?;
    for format in ["%Y-%m-%d", "%d-%b-%Y", "%Y.%m.%d", "%d.%m.%Y", "%Y/%m/%d", "%Y%m%d"] {
        if let Ok(date) = NaiveDate::parse_from_str(first, format) {
            return date.and_hms_opt(0, 0, 0).map(|dt| dt.and_utc());
        }
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Datelike, TimeZone};

    #[test]
    fn test_registrable_domain() {
        assert_eq!(registrable_domain("www.example.com").as_deref(), Some("example.com"));
        assert_eq!(registrable_domain("a.b.example.co.uk").as_deref(), Some("example.co.uk"));
        assert_eq!(registrable_domain("Example.ORG.").as_deref(), Some("example.org"));
        assert_eq!(registrable_domain("shop.example.com.br").as_deref(), Some("example.com.br"));
        assert_eq!(registrable_domain("www.example.me.uk").as_deref(), Some("example.me.uk"));
        assert_eq!(registrable_domain("login.service.gov.uk").as_deref(), Some("service.gov.uk"));
        assert_eq!(registrable_domain("10.0.0.1"), None);
        assert_eq!(registrable_domain("[::1]"), None);
    }

    #[test]
    fn test_parse_verisign_response() {
        let response = "   Domain Name: EXAMPLE.COM\r\n   Registry Domain ID: 2336799_DOMAIN_COM-VRSN\r\n   Creation Date: 1995-08-14T04:00:00Z\r\n";
        let created = parse_creation_date(response).unwrap();
        assert_eq!(created, Utc.with_ymd_and_hms(1995, 8, 14, 4, 0, 0).unwrap());
    }

    #[test]
    fn test_parse_other_formats() {
        let created = parse_creation_date("created:      2021-03-04\n").unwrap();
        assert_eq!((created.year(), created.month(), created.day()), (2021, 3, 4));

        let created = parse_creation_date("Registered on: 12-Jan-2020\n").unwrap();
        assert_eq!((created.year(), created.month(), created.day()), (2020, 1, 12));

        let created = parse_creation_date("Registration Time: 2003-03-17 12:20:05\n").unwrap();
        assert_eq!(created.year(), 2003);
    }

    #[test]
    fn test_missing_creation_date() {
        assert!(parse_creation_date("No match for \"NOPE.COM\".\n").is_none());
        assert!(parse_creation_date("Creation Date: not a date\n").is_none());
    }

    #[test]
    fn test_iana_referral() {
        let iana = "domain:       COM\n\nrefer:        whois.verisign-grs.com\n";
        assert_eq!(field_value(iana, &["refer", "whois"]).as_deref(), Some("whois.verisign-grs.com"));
    }
}
