//! Port reachability check: validate, resolve, filter, probe.

use std::net::IpAddr;
use std::sync::Arc;
use std::time::Duration;

use super::address;
use super::host::{HostResolver, SystemHostResolver, normalize_host};
use super::probe::{PortProbe, TcpPortProbe};
use crate::error::{ToolboxError, ToolboxResult};
use crate::types::{BlockedAddress, PortCheckOutcome, PortCheckResult, ProbeAttempt};

/// Timeout policy for connect attempts.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PortCheckConfig {
    /// Used when the caller gives no usable timeout.
    pub default_timeout: Duration,
    /// Largest timeout a caller may request.
    pub max_timeout: Duration,
}

impl Default for PortCheckConfig {
    fn default() -> Self {
        Self {
            default_timeout: Duration::from_secs(3),
            max_timeout: Duration::from_secs(15),
        }
    }
}

/// Runs the port-check pipeline against injectable resolver and probe.
///
/// Addresses are probed one at a time in resolver order, stopping at the
/// first open one. Blocked addresses never reach the probe.
#[derive(Clone)]
pub struct PortChecker {
    resolver: Arc<dyn HostResolver>,
    probe: Arc<dyn PortProbe>,
    config: PortCheckConfig,
}

impl PortChecker {
    pub fn new(
        resolver: Arc<dyn HostResolver>,
        probe: Arc<dyn PortProbe>,
        config: PortCheckConfig,
    ) -> Self {
        Self {
            resolver,
            probe,
            config,
        }
    }

    /// Checker backed by system DNS and real TCP connects.
    pub fn system(config: PortCheckConfig, resolve_timeout: Duration) -> Self {
        Self::new(
            Arc::new(SystemHostResolver::new(resolve_timeout)),
            Arc::new(TcpPortProbe),
            config,
        )
    }

    pub const fn config(&self) -> &PortCheckConfig {
        &self.config
    }

    /// Check whether `port_raw` is reachable on `host_raw`.
    ///
    /// Only malformed input is an error; unresolvable hosts, fully blocked
    /// hosts and closed ports are all reported through the result.
    pub async fn check(
        &self,
        host_raw: &str,
        port_raw: &str,
        timeout_raw: Option<&str>,
    ) -> ToolboxResult<PortCheckResult> {
        let host = normalize_host(host_raw);
        if host.is_empty() {
            return Err(ToolboxError::ValidationError("host required".to_string()));
        }
        let port = parse_port(port_raw)
            .ok_or_else(|| ToolboxError::ValidationError("invalid port".to_string()))?;
        let connect_timeout = parse_timeout(timeout_raw, &self.config);

        log::debug!(
            "[PORT] Checking {host}:{port} (timeout {}s)",
            connect_timeout.as_secs_f64()
        );

        let mut result = PortCheckResult {
            host,
            port,
            open: false,
            timeout_sec: connect_timeout.as_secs_f64(),
            outcome: PortCheckOutcome::Probed,
            error: None,
            resolved_ips: Vec::new(),
            blocked: Vec::new(),
            attempts: Vec::new(),
        };

        result.resolved_ips = self.resolver.resolve(&result.host).await;
        if result.resolved_ips.is_empty() {
            return Ok(finish(result, PortCheckOutcome::ResolutionFailed));
        }

        let (allowed, blocked) = partition(&result.resolved_ips);
        result.blocked = blocked;
        if allowed.is_empty() {
            return Ok(finish(result, PortCheckOutcome::AllBlocked));
        }

        result.attempts = self.probe_in_order(&allowed, port, connect_timeout).await;
        result.open = result.attempts.iter().any(|a| a.open);
        Ok(finish(result, PortCheckOutcome::Probed))
    }

    async fn probe_in_order(
        &self,
        allowed: &[IpAddr],
        port: u16,
        connect_timeout: Duration,
    ) -> Vec<ProbeAttempt> {
        let mut attempts = Vec::with_capacity(allowed.len());
        for &ip in allowed {
            let attempt = self.probe.connect(ip, port, connect_timeout).await;
            let open = attempt.open;
            attempts.push(attempt);
            if open {
                break;
            }
        }
        attempts
    }
}

/// Split addresses into those that may be probed and those refused, keeping order.
fn partition(ips: &[IpAddr]) -> (Vec<IpAddr>, Vec<BlockedAddress>) {
    let mut allowed = Vec::new();
    let mut blocked = Vec::new();
    for &ip in ips {
        match address::block_reason(ip) {
            None => allowed.push(ip),
            Some(reason) => blocked.push(BlockedAddress {
                ip,
                reason: reason.to_string(),
            }),
        }
    }
    (allowed, blocked)
}

fn finish(mut result: PortCheckResult, outcome: PortCheckOutcome) -> PortCheckResult {
    result.outcome = outcome;
    result.error = outcome.error_message().map(str::to_string);
    log::info!(
        "[PORT] {}:{} -> open={} outcome={:?} resolved={} blocked={} attempts={}",
        result.host,
        result.port,
        result.open,
        outcome,
        result.resolved_ips.len(),
        result.blocked.len(),
        result.attempts.len()
    );
    result
}

/// Parse a port in `1..=65535`.
pub fn parse_port(raw: &str) -> Option<u16> {
    raw.trim().parse::<u16>().ok().filter(|&p| p != 0)
}

/// Effective connect timeout. Anything missing, non-numeric, non-finite,
/// non-positive or above the maximum yields the default.
pub fn parse_timeout(raw: Option<&str>, config: &PortCheckConfig) -> Duration {
    raw.and_then(|s| s.trim().parse::<f64>().ok())
        .filter(|secs| secs.is_finite() && *secs > 0.0 && *secs <= config.max_timeout.as_secs_f64())
        .map_or(config.default_timeout, Duration::from_secs_f64)
}
