//! Host-to-address resolution for the port checker.

use std::future::Future;
use std::net::IpAddr;
use std::time::Duration;

use async_trait::async_trait;
use hickory_resolver::TokioResolver;
use tokio::time::timeout;

use super::resolver::{DEFAULT_QUERY_TIMEOUT, build_system_resolver};

/// Turns a user-supplied host into candidate addresses.
///
/// Implementations never fail: an unresolvable host yields an empty vector.
#[async_trait]
pub trait HostResolver: Send + Sync {
    async fn resolve(&self, host: &str) -> Vec<IpAddr>;
}

/// Resolver backed by the system DNS configuration (A + AAAA).
pub struct SystemHostResolver {
    resolver: TokioResolver,
    timeout: Duration,
}

impl SystemHostResolver {
    #[must_use]
    pub fn new(timeout: Duration) -> Self {
        Self {
            resolver: build_system_resolver(timeout),
            timeout,
        }
    }
}

impl Default for SystemHostResolver {
    fn default() -> Self {
        Self::new(DEFAULT_QUERY_TIMEOUT)
    }
}

#[async_trait]
impl HostResolver for SystemHostResolver {
    async fn resolve(&self, host: &str) -> Vec<IpAddr> {
        resolve_with(host, move |name| async move {
            match timeout(self.timeout, self.resolver.lookup_ip(name.as_str())).await {
                Ok(Ok(lookup)) => Ok(lookup.iter().collect()),
                Ok(Err(e)) => Err(e.to_string()),
                Err(_) => Err(format!("resolution timed out after {:?}", self.timeout)),
            }
        })
        .await
    }
}

/// Parse an IP literal, accepting bracketed IPv6 (`[::1]`).
pub fn parse_ip_literal(host: &str) -> Option<IpAddr> {
    let host = host.trim();
    let unbracketed = host
        .strip_prefix('[')
        .and_then(|h| h.strip_suffix(']'))
        .unwrap_or(host);
    unbracketed.parse().ok()
}

/// Normalise free-form host input: trim, drop an `http(s)://` scheme, any
/// path, and one trailing dot.
pub fn normalize_host(input: &str) -> String {
    let mut host = input.trim();
    for scheme in ["http://", "https://"] {
        if let Some(rest) = strip_prefix_ignore_case(host, scheme) {
            host = rest;
            break;
        }
    }
    let host = host.split('/').next().unwrap_or_default().trim();
    host.strip_suffix('.').unwrap_or(host).to_string()
}

/// `text` without an ASCII `prefix`, compared case-insensitively.
fn strip_prefix_ignore_case<'a>(text: &'a str, prefix: &str) -> Option<&'a str> {
    text.get(..prefix.len())
        .filter(|head| head.eq_ignore_ascii_case(prefix))
        .and_then(|_| text.get(prefix.len()..))
}

/// Resolve `host`, skipping `lookup` entirely for IP literals.
///
/// Lookup results are deduplicated and sorted by their string form; a lookup
/// error yields an empty vector.
pub(crate) async fn resolve_with<F, Fut>(host: &str, lookup: F) -> Vec<IpAddr>
where
    F: FnOnce(String) -> Fut,
    Fut: Future<Output = Result<Vec<IpAddr>, String>>,
{
    if let Some(ip) = parse_ip_literal(host) {
        return vec![ip];
    }

    match lookup(host.to_string()).await {
        Ok(ips) => dedup_sorted(ips),
        Err(e) => {
            log::debug!("[PORT] Resolution of {host} failed: {e}");
            Vec::new()
        }
    }
}

/// Deduplicate and sort by canonical string form.
fn dedup_sorted(ips: Vec<IpAddr>) -> Vec<IpAddr> {
    let mut keyed: Vec<(String, IpAddr)> = ips.into_iter().map(|ip| (ip.to_string(), ip)).collect();
    keyed.sort_by(|a, b| a.0.cmp(&b.0));
    keyed.dedup_by(|a, b| a.0 == b.0);
    keyed.into_iter().map(|(_, ip)| ip).collect()
}
