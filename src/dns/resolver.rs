use hickory_resolver::config::{NameServerConfigGroup, ResolverConfig};
use hickory_resolver::name_server::TokioConnectionProvider;
use hickory_resolver::proto::ProtoErrorKind;
use hickory_resolver::proto::op::ResponseCode;
use hickory_resolver::{ResolveError, Resolver, TokioResolver};

use std::fmt::Display;
use std::io;
use std::net::{IpAddr, Ipv4Addr};
use std::time::Duration;

use anyhow::Result;
use tracing::{Level, event};

use crate::core::common::ResolveOptions;
use crate::core::konst::{APP_NAME, DNS_PORT};

/// Classification of a failed lookup.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum FailureKind {
    Timeout,
    NoSuchDomain,
    NoAnswer,
    NetworkUnreachable,
    Other,
}

impl Display for FailureKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FailureKind::Timeout => write!(f, "Timeout"),
            FailureKind::NoSuchDomain => write!(f, "NXDOMAIN"),
            FailureKind::NoAnswer => write!(f, "NoAnswer"),
            FailureKind::NetworkUnreachable => write!(f, "NetworkUnreachable"),
            FailureKind::Other => write!(f, "Other"),
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct Failure {
    pub kind: FailureKind,
    pub message: String,
}

impl Failure {
    pub fn new(kind: FailureKind, message: impl Into<String>) -> Failure {
        Failure {
            kind,
            message: message.into(),
        }
    }
}

impl Display for Failure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {}", self.kind, self.message)
    }
}

/// Result of resolving a single hostname.
#[derive(Clone, Debug, PartialEq)]
pub enum Outcome {
    Resolved(Vec<Ipv4Addr>),
    Failed(Failure),
}

impl Outcome {
    /// Build an outcome from a list of addresses, treating an empty list as no answer.
    pub fn from_addrs(hostname: &str, addrs: impl IntoIterator<Item = Ipv4Addr>) -> Outcome {
        let mut ips: Vec<Ipv4Addr> = Vec::new();
        for addr in addrs {
            if !ips.contains(&addr) {
                ips.push(addr);
            }
        }
        match ips.is_empty() {
            true => Outcome::Failed(Failure::new(
                FailureKind::NoAnswer,
                format!("{hostname} has no IPv4 address"),
            )),
            false => Outcome::Resolved(ips),
        }
    }
}

/// A single name to address lookup.
///
/// Implementations never fail: every error is folded into [`Outcome::Failed`].
pub trait Resolve {
    async fn resolve(&self, hostname: &str) -> Outcome;
}

/// Enforce a hard deadline on a lookup, whatever the underlying mechanism does.
async fn with_deadline<F>(hostname: &str, deadline: Duration, lookup: F) -> Outcome
where
    F: Future<Output = Outcome>,
{
    match tokio::time::timeout(deadline, lookup).await {
        Ok(outcome) => outcome,
        Err(_) => Outcome::Failed(Failure::new(
            FailureKind::Timeout,
            format!("{hostname} lookup exceeded {}ms", deadline.as_millis()),
        )),
    }
}

/// Queries nameservers directly for A records.
pub struct DnsResolver {
    resolver: TokioResolver,
    lookup_timeout: Duration,
}

impl DnsResolver {
    /// Build a resolver from the configured nameservers.
    /// With no nameservers configured the system configuration is used.
    pub fn new(options: &ResolveOptions) -> Result<DnsResolver> {
        let mut builder = match options.nameservers.is_empty() {
            true => Resolver::builder_tokio()?,
            false => {
                let group = NameServerConfigGroup::from_ips_clear(&options.nameservers, DNS_PORT, true);
                let config = ResolverConfig::from_parts(None, vec![], group);
                Resolver::builder_with_config(config, TokioConnectionProvider::default())
            }
        };
        builder.options_mut().timeout = options.query_timeout();
        builder.options_mut().attempts = options.attempts;

        Ok(DnsResolver {
            resolver: builder.build(),
            lookup_timeout: options.lookup_timeout(),
        })
    }
}

impl Resolve for DnsResolver {
    async fn resolve(&self, hostname: &str) -> Outcome {
        with_deadline(hostname, self.lookup_timeout, async {
            match self.resolver.ipv4_lookup(hostname).await {
                Ok(lookup) => Outcome::from_addrs(hostname, lookup.iter().map(|a| a.0)),
                Err(e) => {
                    event!(target: APP_NAME, Level::TRACE, "{hostname}: {e}");
                    Outcome::Failed(classify_resolve_error(&e))
                }
            }
        })
        .await
    }
}

pub fn classify_resolve_error(e: &ResolveError) -> Failure {
    let kind = match e.proto().map(|p| p.kind()) {
        Some(ProtoErrorKind::NoRecordsFound { response_code, .. }) => match *response_code {
            ResponseCode::NXDomain => FailureKind::NoSuchDomain,
            _ => FailureKind::NoAnswer,
        },
        Some(ProtoErrorKind::Timeout) => FailureKind::Timeout,
        Some(ProtoErrorKind::Io(io_error)) => classify_io_kind(io_error.kind()),
        _ => FailureKind::Other,
    };
    Failure::new(kind, e.to_string())
}

/// Uses the operating system resolver (getaddrinfo).
pub struct SystemResolver {
    lookup_timeout: Duration,
}

impl SystemResolver {
    pub fn new(options: &ResolveOptions) -> SystemResolver {
        SystemResolver {
            lookup_timeout: options.lookup_timeout(),
        }
    }
}

impl Resolve for SystemResolver {
    async fn resolve(&self, hostname: &str) -> Outcome {
        with_deadline(hostname, self.lookup_timeout, async {
            match tokio::net::lookup_host((hostname, 0)).await {
                Ok(addrs) => Outcome::from_addrs(
                    hostname,
                    addrs.filter_map(|addr| match addr.ip() {
                        IpAddr::V4(ip) => Some(ip),
                        IpAddr::V6(_) => None,
                    }),
                ),
                Err(e) => {
                    event!(target: APP_NAME, Level::TRACE, "{hostname}: {e}");
                    Outcome::Failed(classify_io_error(&e))
                }
            }
        })
        .await
    }
}

/// getaddrinfo errors arrive as opaque io errors, so the message is inspected as well.
pub fn classify_io_error(e: &io::Error) -> Failure {
    let message = e.to_string();
    let kind = match classify_io_kind(e.kind()) {
        FailureKind::Other => {
            if message.contains("Name or service not known")
                || message.contains("nodename nor servname provided")
                || message.contains("No such host is known")
            {
                FailureKind::NoSuchDomain
            } else if message.contains("No address associated with hostname") {
                FailureKind::NoAnswer
            } else {
                FailureKind::Other
            }
        }
        kind => kind,
    };
    Failure::new(kind, message)
}

fn classify_io_kind(kind: io::ErrorKind) -> FailureKind {
    match kind {
        io::ErrorKind::TimedOut => FailureKind::Timeout,
        io::ErrorKind::NetworkUnreachable | io::ErrorKind::HostUnreachable | io::ErrorKind::NetworkDown => {
            FailureKind::NetworkUnreachable
        }
        _ => FailureKind::Other,
    }
}
