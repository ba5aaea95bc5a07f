//! Network diagnostics behind the netcheck service.
//!
//! Two independent surfaces:
//! - [`PortChecker`]: SSRF-filtered TCP reachability checks with injectable
//!   [`HostResolver`] and [`PortProbe`].
//! - [`ToolboxService`]: stateless email-security lookup (MX, SPF, DKIM, DMARC,
//!   MTA-STS, DNSSEC, NS, WHOIS).

mod error;
mod services;
mod types;

pub use error::{ToolboxError, ToolboxResult};
pub use services::address::{block_reason, classify, classify_str, is_metadata};
pub use services::{
    HostResolver, PortCheckConfig, PortChecker, PortProbe, SystemHostResolver, TcpPortProbe,
    ToolboxService, normalize_host, parse_ip_literal, parse_port, parse_timeout,
};
pub use types::{
    AddressVerdict, BlockReason, BlockedAddress, CheckValue, DomainLookupResult, LookupOptions,
    PortCheckOutcome, PortCheckResult, ProbeAttempt, RecordCheck, WhoisResult, WhoisSummary,
};
