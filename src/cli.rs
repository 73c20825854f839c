use crate::config::EngineConfig;
use crate::errors::{LureError, LureResult};
use crate::models::RiskTier;
use clap::{Parser, ValueEnum};
use std::path::{Path, PathBuf};

#[derive(Parser, Debug, Clone)]
#[command(
    name = "lurescan",
    about = "Lurescan - phishing risk scoring for URLs",
    version
)]
pub struct Args {
    /// URLs to score
    pub urls: Vec<String>,

    /// File with one URL per line ('#' starts a comment)
    #[arg(short, long)]
    pub input: Option<PathBuf>,

    /// Report format
    #[arg(short, long, default_value = "text")]
    pub format: OutputFormat,

    /// Write the report to a file instead of stdout
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Only run the lexical rules, no network access
    #[arg(long)]
    pub offline: bool,

    /// Engine configuration file (JSON)
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Content fetch and TLS check timeout in seconds (5-10)
    #[arg(short, long)]
    pub timeout: Option<u64>,

    /// Number of URLs scored at the same time
    #[arg(long, default_value = "4")]
    pub concurrency: usize,

    /// Exit with status 2 when any URL reaches this tier
    #[arg(long)]
    pub fail_on: Option<RiskTier>,

    /// Enable verbose logging of all operations
    #[arg(short, long)]
    pub verbose: bool,

    /// Hide progress bars and use quiet output
    #[arg(short, long)]
    pub quiet: bool,
}

#[derive(Debug, Clone, Copy, ValueEnum, PartialEq, Eq)]
pub enum OutputFormat {
    /// Human-readable report with a tier breakdown
    Text,
    /// Full verdicts as one JSON document
    Json,
    /// One web-API style response per URL
    Response,
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OutputFormat::Text => write!(f, "Text"),
            OutputFormat::Json => write!(f, "Json"),
            OutputFormat::Response => write!(f, "Response"),
        }
    }
}

impl Args {
    /// Resolve the engine configuration: file (or defaults), then flag overrides.
    pub fn engine_config(&self) -> LureResult<EngineConfig> {
        let mut config = match &self.config {
            Some(path) => {
                log::debug!("Loading engine configuration from {:?}", path);
                EngineConfig::load(path)?
            }
            None => EngineConfig::default(),
        };

        if self.offline {
            config.offline = true;
        }
        if let Some(secs) = self.timeout {
            config.content_timeout_secs = secs;
            config.tls_timeout_secs = secs;
        }

        config.validate()?;
        Ok(config)
    }

    /// All inputs in order: positional URLs first, then the input file.
    pub fn targets(&self) -> LureResult<Vec<String>> {
        let mut targets = self.urls.clone();
        if let Some(path) = &self.input {
            targets.extend(read_input_list(path)?);
        }
        Ok(targets)
    }
}

pub fn read_input_list(path: &Path) -> LureResult<Vec<String>> {
    let text = std::fs::read_to_string(path).map_err(|e| LureError::io(e, path.to_path_buf()))?;
    Ok(parse_input_list(&text))
}

/// One entry per line; blank lines and `#` comments are skipped.
pub fn parse_input_list(text: &str) -> Vec<String> {
    text.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .map(String::from)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn parse(args: &[&str]) -> Args {
        Args::parse_from(std::iter::once("lurescan").chain(args.iter().copied()))
    }

    #[test]
    fn test_defaults() {
        let args = parse(&["https://example.com"]);
        assert_eq!(args.urls, vec!["https://example.com"]);
        assert_eq!(args.format, OutputFormat::Text);
        assert_eq!(args.concurrency, 4);
        assert!(args.fail_on.is_none());
    }

    #[test]
    fn test_fail_on_and_format() {
        let args = parse(&["--fail-on", "high", "--format", "response", "x.com"]);
        assert_eq!(args.fail_on, Some(RiskTier::High));
        assert_eq!(args.format, OutputFormat::Response);
    }

    #[test]
    fn test_parse_input_list() {
        let list = parse_input_list("# header\nhttps://a.example\n\n   b.example  \n#c.example\n");
        assert_eq!(list, vec!["https://a.example", "b.example"]);
    }

    #[test]
    fn test_targets_keep_order() -> LureResult<()> {
        let mut file = NamedTempFile::new()?;
        writeln!(file, "second.example\nthird.example")?;

        let path = file.path().to_string_lossy().to_string();
        let args = parse(&["first.example", "--input", &path]);
        assert_eq!(
            args.targets()?,
            vec!["first.example", "second.example", "third.example"]
        );
        Ok(())
    }

    #[test]
    fn test_missing_input_file() {
        let args = parse(&["--input", "/nonexistent/lurescan/list.txt"]);
        assert!(matches!(args.targets(), Err(LureError::Io { .. })));
    }

    #[test]
    fn test_flag_overrides() -> LureResult<()> {
        let args = parse(&["--offline", "--timeout", "6"]);
        let config = args.engine_config()?;
        assert!(config.offline);
        assert_eq!(config.content_timeout_secs, 6);
        assert_eq!(config.tls_timeout_secs, 6);
        Ok(())
    }

    #[test]
    fn test_out_of_range_timeout_rejected() {
        let args = parse(&["--timeout", "30"]);
        assert!(matches!(args.engine_config(), Err(LureError::Config { .. })));
    }
}
