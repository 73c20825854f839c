//! Lurescan
//!
//! Phishing risk scoring for URLs: lexical rules, domain intelligence and
//! page content combine into an explainable, point-based verdict.

pub mod cli;
pub mod config;
pub mod content;
pub mod domain_intel;
pub mod engine;
pub mod errors;
pub mod lexical;
pub mod models;
pub mod reporter;
pub mod target;
pub mod ui;

pub use errors::{LureError, LureResult, ValidationError};
pub use engine::UrlRiskEngine;
pub use models::{Finding, RiskTier, Verdict};
