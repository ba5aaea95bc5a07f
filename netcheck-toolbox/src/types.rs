//! Public types returned by toolbox operations.

use std::fmt;
use std::net::IpAddr;
use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Why an address was refused by the SSRF filter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BlockReason {
    /// 127.0.0.0/8, `::1`.
    Loopback,
    /// RFC 1918 and IPv6 unique-local.
    Private,
    /// 169.254.0.0/16, fe80::/10.
    LinkLocal,
    /// 224.0.0.0/4, ff00::/8.
    Multicast,
    /// IANA special-purpose and reserved blocks.
    Reserved,
    /// `0.0.0.0`, `::`.
    Unspecified,
    /// Well-known cloud instance metadata endpoints.
    Metadata,
    /// Input was not an IP address at all.
    InvalidAddress,
}

impl fmt::Display for BlockReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Loopback => write!(f, "Loopback IP blocked"),
            Self::Private => write!(f, "Private IP blocked"),
            Self::LinkLocal => write!(f, "Link-local IP blocked"),
            Self::Multicast => write!(f, "Multicast IP blocked"),
            Self::Reserved => write!(f, "Reserved IP blocked"),
            Self::Unspecified => write!(f, "Unspecified IP blocked"),
            Self::Metadata => write!(f, "Metadata IP blocked"),
            Self::InvalidAddress => write!(f, "Invalid IP address"),
        }
    }
}

/// Classification of a single address.
///
/// `reason` is empty exactly when `allowed` is true; use [`AddressVerdict::allow`]
/// and [`AddressVerdict::block`] to build one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AddressVerdict {
    pub allowed: bool,
    pub reason: String,
}

impl AddressVerdict {
    #[must_use]
    pub const fn allow() -> Self {
        Self {
            allowed: true,
            reason: String::new(),
        }
    }

    #[must_use]
    pub fn block(reason: BlockReason) -> Self {
        Self {
            allowed: false,
            reason: reason.to_string(),
        }
    }
}

/// A resolved address that the SSRF filter refused.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlockedAddress {
    pub ip: IpAddr,
    pub reason: String,
}

/// Result of one TCP connect attempt.
///
/// `error` is empty exactly when `open` is true.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProbeAttempt {
    /// Address that was probed.
    pub ip: IpAddr,
    /// Whether the TCP handshake completed.
    pub open: bool,
    /// Wall-clock time until success or failure, rounded to 0.01 ms.
    pub latency_ms: f64,
    /// Human-readable failure cause.
    pub error: String,
}

impl ProbeAttempt {
    #[must_use]
    pub const fn open(ip: IpAddr, latency_ms: f64) -> Self {
        Self {
            ip,
            open: true,
            latency_ms,
            error: String::new(),
        }
    }

    /// A failed attempt. An empty `error` is replaced with a generic message.
    #[must_use]
    pub fn closed(ip: IpAddr, latency_ms: f64, error: impl Into<String>) -> Self {
        let mut error = error.into();
        if error.is_empty() {
            error = "connection failed".to_string();
        }
        Self {
            ip,
            open: false,
            latency_ms,
            error,
        }
    }
}

/// How far a port check got before producing its answer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PortCheckOutcome {
    /// The host did not resolve to any address.
    ResolutionFailed,
    /// Every resolved address was refused by the SSRF filter.
    AllBlocked,
    /// At least one address was probed.
    Probed,
}

impl PortCheckOutcome {
    /// Message surfaced in the `error` field, if any.
    #[must_use]
    pub const fn error_message(self) -> Option<&'static str> {
        match self {
            Self::ResolutionFailed => Some("Unable to resolve hostname"),
            Self::AllBlocked => Some("All resolved IPs are blocked"),
            Self::Probed => None,
        }
    }
}

/// Aggregate result of a port reachability check.
///
/// Field names follow the snake_case convention already consumed by the
/// port-checker frontend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PortCheckResult {
    /// Normalised host as it was resolved.
    pub host: String,
    pub port: u16,
    /// True iff some attempt succeeded.
    pub open: bool,
    /// Effective connect timeout in seconds.
    pub timeout_sec: f64,
    pub outcome: PortCheckOutcome,
    /// Set for `resolution_failed` and `all_blocked`.
    pub error: Option<String>,
    /// Every address the host resolved to, sorted.
    pub resolved_ips: Vec<IpAddr>,
    pub blocked: Vec<BlockedAddress>,
    /// Attempts in probe order; stops after the first open one.
    pub attempts: Vec<ProbeAttempt>,
}

/// Value of an email-security record check: either the records found or a
/// single diagnostic message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CheckValue {
    Records(Vec<String>),
    Message(String),
}

/// One record family of a domain lookup (`MX`, `SPF`, ...).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordCheck {
    /// Whether the record family is present and passes its policy check.
    pub status: bool,
    pub value: CheckValue,
}

impl RecordCheck {
    #[must_use]
    pub const fn records(status: bool, records: Vec<String>) -> Self {
        Self {
            status,
            value: CheckValue::Records(records),
        }
    }

    #[must_use]
    pub fn failed(message: impl Into<String>) -> Self {
        Self {
            status: false,
            value: CheckValue::Message(message.into()),
        }
    }
}

/// WHOIS excerpt included in a domain lookup.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum WhoisSummary {
    Found {
        registrar: Option<String>,
        creation_date: Option<String>,
        expiration_date: Option<String>,
        name_servers: Vec<String>,
    },
    Failed {
        error: String,
    },
}

impl From<WhoisResult> for WhoisSummary {
    fn from(result: WhoisResult) -> Self {
        Self::Found {
            registrar: result.registrar,
            creation_date: result.creation_date,
            expiration_date: result.expiration_date,
            name_servers: result.name_servers,
        }
    }
}

/// Email-security posture of a domain, keyed by record family.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DomainLookupResult {
    #[serde(rename = "MX")]
    pub mx: RecordCheck,
    #[serde(rename = "SPF")]
    pub spf: RecordCheck,
    #[serde(rename = "DKIM")]
    pub dkim: RecordCheck,
    #[serde(rename = "DMARC")]
    pub dmarc: RecordCheck,
    #[serde(rename = "MTA-STS")]
    pub mta_sts: RecordCheck,
    #[serde(rename = "DNSSEC")]
    pub dnssec: RecordCheck,
    /// Name servers; empty when the lookup failed.
    #[serde(rename = "NS")]
    pub ns: Vec<String>,
    #[serde(rename = "WHOIS")]
    pub whois: WhoisSummary,
}

/// Tunables for [`ToolboxService::domain_lookup`](crate::ToolboxService::domain_lookup).
#[derive(Debug, Clone)]
pub struct LookupOptions {
    /// DKIM selectors probed under `<selector>._domainkey.<domain>`.
    pub dkim_selectors: Vec<String>,
    /// Timeout for each MTA-STS policy fetch.
    pub http_timeout: Duration,
}

impl Default for LookupOptions {
    fn default() -> Self {
        Self {
            dkim_selectors: vec!["selector1".to_string(), "selector2".to_string()],
            http_timeout: Duration::from_secs(5),
        }
    }
}

/// WHOIS query result with parsed registration fields.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WhoisResult {
    /// The queried domain name.
    pub domain: String,
    /// Domain registrar (e.g. "Cloudflare, Inc.").
    pub registrar: Option<String>,
    /// Registration creation date.
    pub creation_date: Option<String>,
    /// Registration expiration date.
    pub expiration_date: Option<String>,
    /// Authoritative name servers.
    pub name_servers: Vec<String>,
}
