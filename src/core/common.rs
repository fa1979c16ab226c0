use std::fmt::Display;
use std::net::IpAddr;
use std::time::Duration;

use clap::ValueEnum;
use serde_derive::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::core::konst::{
    CONCURRENCY_LIMIT, CURRENT_DIR, LOGFILE_NAME, LOGGING_JSON, LOGGING_QUIET, LOOKUP_TIMEOUT, QUERY_ATTEMPTS,
    QUERY_TIMEOUT,
};

/// A hostname under investigation and its resolution state.
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq)]
pub struct CandidateRecord {
    pub subdomain: String,
    #[serde(default)]
    pub ips: Option<String>,
    #[serde(default = "default_valid")]
    pub valid: bool,
    #[serde(default)]
    pub reason: Option<String>,
    // Any other input fields are carried through untouched.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

fn default_valid() -> bool {
    true
}

impl CandidateRecord {
    pub fn new(subdomain: &str) -> CandidateRecord {
        CandidateRecord {
            subdomain: subdomain.to_owned(),
            ips: None,
            valid: true,
            reason: None,
            extra: Map::new(),
        }
    }

    /// True when the record already carries resolved addresses.
    pub fn is_resolved(&self) -> bool {
        self.ips.as_deref().is_some_and(|ips| !ips.trim().is_empty())
    }
}

#[derive(ValueEnum, Clone, Copy, Debug, Default, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ResolverBackend {
    /// Query the configured nameservers directly
    #[default]
    Dns,
    /// Use the operating system resolver (getaddrinfo)
    System,
}

impl Display for ResolverBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ResolverBackend::Dns => write!(f, "dns"),
            ResolverBackend::System => write!(f, "system"),
        }
    }
}

#[derive(Clone, Debug, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct ResolveOptions {
    /// Nameservers to query. Empty means use the system configuration.
    pub nameservers: Vec<IpAddr>,
    /// Per query timeout (in milliseconds)
    pub query_timeout: u64,
    /// Number of attempts per nameserver query
    pub attempts: usize,
    /// Hard upper bound on a single lookup (in milliseconds)
    pub lookup_timeout: u64,
    /// Maximum number of lookups in flight
    pub concurrency: usize,
    pub backend: ResolverBackend,
}

impl Default for ResolveOptions {
    fn default() -> Self {
        Self {
            nameservers: vec![],
            query_timeout: QUERY_TIMEOUT,
            attempts: QUERY_ATTEMPTS,
            lookup_timeout: LOOKUP_TIMEOUT,
            concurrency: CONCURRENCY_LIMIT,
            backend: ResolverBackend::default(),
        }
    }
}

impl ResolveOptions {
    pub fn query_timeout(&self) -> Duration {
        Duration::from_millis(self.query_timeout)
    }

    pub fn lookup_timeout(&self) -> Duration {
        Duration::from_millis(self.lookup_timeout)
    }

    /// The in-flight bound. Never less than one.
    pub fn concurrency(&self) -> usize {
        self.concurrency.max(1)
    }
}

#[derive(Clone, Debug, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct LoggingOptions {
    pub dir: String,
    pub file: String,
    pub json: bool,
    pub quiet: bool,
}

impl Default for LoggingOptions {
    fn default() -> Self {
        Self {
            dir: CURRENT_DIR.to_owned(),
            file: LOGFILE_NAME.to_owned(),
            json: LOGGING_JSON,
            quiet: LOGGING_QUIET,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn record_without_ips_is_not_resolved() {
        let record = CandidateRecord::new("www.example.com");
        assert!(!record.is_resolved());
        assert!(record.valid);
    }

    #[test]
    fn record_with_blank_ips_is_not_resolved() {
        let mut record = CandidateRecord::new("www.example.com");
        record.ips = Some("  ".to_owned());
        assert!(!record.is_resolved());
    }

    #[test]
    fn record_deserializes_with_defaults_and_extra_fields() {
        let json = r#"{"subdomain": "a.example.com", "source": "crtsh", "port": 443}"#;
        let record: CandidateRecord = serde_json::from_str(json).unwrap();

        assert_eq!(record.subdomain, "a.example.com");
        assert_eq!(record.ips, None);
        assert!(record.valid);
        assert_eq!(record.reason, None);
        assert_eq!(record.extra.get("source"), Some(&Value::from("crtsh")));
        assert_eq!(record.extra.get("port"), Some(&Value::from(443)));
    }

    #[test]
    fn record_serializes_extra_fields_inline() {
        let mut record = CandidateRecord::new("a.example.com");
        record.extra.insert("source".to_owned(), Value::from("brute"));
        let value = serde_json::to_value(&record).unwrap();

        assert_eq!(value["subdomain"], "a.example.com");
        assert_eq!(value["source"], "brute");
        assert_eq!(value["valid"], true);
    }

    #[test]
    fn default_backend_queries_nameservers() {
        assert_eq!(ResolveOptions::default().backend, ResolverBackend::Dns);
        assert_eq!(ResolverBackend::default().to_string(), "dns");
    }

    #[test]
    fn concurrency_is_never_zero() {
        let options = ResolveOptions {
            concurrency: 0,
            ..Default::default()
        };
        assert_eq!(options.concurrency(), 1);
    }
}
