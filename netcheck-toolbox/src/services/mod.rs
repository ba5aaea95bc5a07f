//! Service layer: the port-check pipeline and the stateless lookup façade.
//!
//! Every method on [`ToolboxService`] is an async associated function; no instance is needed.
//! Port checks need injectable collaborators and go through [`PortChecker`] instead.

pub mod address;
mod dnssec;
mod email_security;
mod host;
mod port_check;
mod probe;
mod resolver;
mod whois;

#[cfg(test)]
#[path = "test_mocks.rs"]
mod test_mocks;

pub use host::{HostResolver, SystemHostResolver, normalize_host, parse_ip_literal};
pub use port_check::{PortCheckConfig, PortChecker, parse_port, parse_timeout};
pub use probe::{PortProbe, TcpPortProbe};

use crate::error::{ToolboxError, ToolboxResult};
use crate::types::{DomainLookupResult, LookupOptions, WhoisResult, WhoisSummary};
use resolver::DEFAULT_RESOLVER;

/// Validate and normalise a domain name or IP address input.
///
/// Trims whitespace, passes through valid IP addresses unchanged, converts
/// internationalised domain names (IDN) to ASCII via IDNA 2008, and rejects
/// empty or overlong inputs.
fn validate_domain(domain: &str) -> ToolboxResult<String> {
    let domain = domain.trim();
    if domain.is_empty() {
        return Err(ToolboxError::ValidationError(
            "Domain name is required".to_string(),
        ));
    }
    if domain.parse::<std::net::IpAddr>().is_ok() {
        return Ok(domain.to_string());
    }
    let domain = domain.strip_suffix('.').unwrap_or(domain);
    let ascii_domain = idna::domain_to_ascii_strict(domain)
        .map_err(|_| ToolboxError::ValidationError(format!("Invalid domain name: {domain}")))?;
    if ascii_domain.len() > 253 {
        return Err(ToolboxError::ValidationError(format!(
            "Domain name exceeds maximum length of 253 characters (got {})",
            ascii_domain.len()
        )));
    }
    Ok(ascii_domain)
}

/// Entry point for the domain lookup operations.
///
/// ```rust,no_run
/// use netcheck_toolbox::{LookupOptions, ToolboxService};
/// # async fn demo() -> netcheck_toolbox::ToolboxResult<()> {
/// let report = ToolboxService::domain_lookup("example.com", &LookupOptions::default()).await?;
/// println!("MX ok: {}", report.mx.status);
/// # Ok(())
/// # }
/// ```
pub struct ToolboxService;

impl ToolboxService {
    /// Email-security posture of `domain`.
    ///
    /// All record families are queried concurrently. Per-family failures are
    /// reported inside the result; only an invalid domain is an error.
    pub async fn domain_lookup(
        domain: &str,
        options: &LookupOptions,
    ) -> ToolboxResult<DomainLookupResult> {
        let domain = validate_domain(domain)?;
        let resolver = &*DEFAULT_RESOLVER;

        let (mx, spf, dkim, dmarc, mta_sts, dnssec, ns, whois) = futures::join!(
            email_security::mx_check(resolver, &domain),
            email_security::spf_check(resolver, &domain),
            email_security::dkim_check(resolver, &domain, &options.dkim_selectors),
            email_security::dmarc_check(resolver, &domain),
            email_security::mta_sts_check(resolver, &domain, options.http_timeout),
            dnssec::dnssec_check(resolver, &domain),
            email_security::name_servers(resolver, &domain),
            whois::whois_lookup(&domain),
        );

        let whois = match whois {
            Ok(result) => WhoisSummary::from(result),
            Err(e) => {
                log::warn!("[LOOKUP] WHOIS for {domain} failed: {e}");
                WhoisSummary::Failed {
                    error: e.message().to_string(),
                }
            }
        };

        log::info!(
            "[LOOKUP] {domain}: MX={} SPF={} DKIM={} DMARC={} MTA-STS={} DNSSEC={} NS={}",
            mx.status,
            spf.status,
            dkim.status,
            dmarc.status,
            mta_sts.status,
            dnssec.status,
            ns.len()
        );

        Ok(DomainLookupResult {
            mx,
            spf,
            dkim,
            dmarc,
            mta_sts,
            dnssec,
            ns,
            whois,
        })
    }

    /// Query WHOIS information for a domain.
    pub async fn whois_lookup(domain: &str) -> ToolboxResult<WhoisResult> {
        let domain = validate_domain(domain)?;
        whois::whois_lookup(&domain).await
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::panic)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_domain_normal() {
        assert_eq!(validate_domain("example.com").unwrap(), "example.com");
    }

    #[test]
    fn test_validate_domain_trims_whitespace() {
        assert_eq!(validate_domain("  example.com  ").unwrap(), "example.com");
    }

    #[test]
    fn test_validate_domain_trailing_dot() {
        assert_eq!(validate_domain("example.com.").unwrap(), "example.com");
    }

    #[test]
    fn test_validate_domain_ip_passthrough() {
        assert_eq!(validate_domain("8.8.8.8").unwrap(), "8.8.8.8");
        assert_eq!(validate_domain("2001:db8::1").unwrap(), "2001:db8::1");
    }

    #[test]
    fn test_validate_domain_idn() {
        assert_eq!(validate_domain("bücher.example").unwrap(), "xn--bcher-kva.example");
    }

    #[test]
    fn test_validate_domain_empty() {
        for input in ["", "   "] {
            match validate_domain(input) {
                Err(ToolboxError::ValidationError(msg)) => {
                    assert_eq!(msg, "Domain name is required");
                }
                other => panic!("expected ValidationError, got {other:?}"),
            }
        }
    }

    #[test]
    fn test_validate_domain_too_long() {
        let label = "a".repeat(63);
        let long = [label.as_str(); 5].join(".");
        assert!(matches!(
            validate_domain(&long),
            Err(ToolboxError::ValidationError(_))
        ));
    }

    #[tokio::test]
    async fn test_domain_lookup_rejects_empty() {
        let err = ToolboxService::domain_lookup("  ", &LookupOptions::default())
            .await
            .unwrap_err();
        assert!(err.is_expected());
    }

    #[tokio::test]
    #[ignore = "requires network access"]
    async fn test_domain_lookup_real() {
        let report = ToolboxService::domain_lookup("gmail.com", &LookupOptions::default())
            .await
            .unwrap();
        assert!(report.mx.status);
        assert!(report.spf.status || !report.ns.is_empty());
        assert!(!report.ns.is_empty());
    }
}
