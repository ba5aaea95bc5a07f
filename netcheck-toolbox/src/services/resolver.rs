//! Shared DNS resolver helpers used across service modules.

use std::sync::LazyLock;
use std::time::Duration;

use hickory_resolver::{
    ResolveError, TokioResolver,
    config::{LookupIpStrategy, ResolverConfig, ResolverOpts},
    name_server::TokioConnectionProvider,
};

use crate::types::RecordCheck;

/// Per-query timeout applied to resolvers built here.
pub(crate) const DEFAULT_QUERY_TIMEOUT: Duration = Duration::from_secs(5);

/// Shared default DNS resolver.
///
/// On Unix/Windows this uses the host system configuration (e.g. `/etc/resolv.conf`).
/// If the system configuration cannot be loaded, it falls back to Hickory's default
/// upstream set (Google Public DNS).
pub(crate) static DEFAULT_RESOLVER: LazyLock<TokioResolver> =
    LazyLock::new(|| build_system_resolver(DEFAULT_QUERY_TIMEOUT));

/// Build a resolver using the host system DNS configuration (with fallback).
///
/// `timeout` bounds each upstream query; two attempts are made per server.
/// Address lookups query A and AAAA together and return both families.
pub(crate) fn build_system_resolver(timeout: Duration) -> TokioResolver {
    #[cfg(any(unix, target_os = "windows"))]
    {
        match TokioResolver::builder_tokio() {
            Ok(mut builder) => {
                apply_options(builder.options_mut(), timeout);
                return builder.build();
            }
            Err(e) => {
                log::warn!(
                    "Failed to load system DNS configuration, falling back to defaults: {e}"
                );
            }
        }
    }

    let provider = TokioConnectionProvider::default();
    let mut opts = ResolverOpts::default();
    apply_options(&mut opts, timeout);
    TokioResolver::builder_with_config(ResolverConfig::default(), provider)
        .with_options(opts)
        .build()
}

fn apply_options(opts: &mut ResolverOpts, timeout: Duration) {
    opts.timeout = timeout;
    opts.attempts = 2;
    opts.ip_strategy = LookupIpStrategy::Ipv4AndIpv6;
}

/// Outcome class of a failed lookup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum LookupFailure {
    /// NXDOMAIN or an empty answer.
    NotFound,
    /// Anything else (timeout, SERVFAIL, transport error).
    Other(String),
}

impl From<&ResolveError> for LookupFailure {
    fn from(err: &ResolveError) -> Self {
        if err.is_no_records_found() || err.is_nx_domain() {
            Self::NotFound
        } else {
            Self::Other(err.to_string())
        }
    }
}

impl LookupFailure {
    /// Render as a failed record check: `"<KIND> record not found: <name>"`
    /// for missing records, the resolver message otherwise.
    pub(crate) fn into_check(self, kind: &str, name: &str) -> RecordCheck {
        match self {
            Self::NotFound => RecordCheck::failed(not_found_message(kind, name)),
            Self::Other(msg) => RecordCheck::failed(msg),
        }
    }
}

/// Answers of one query, with an empty answer folded into [`LookupFailure::NotFound`].
pub(crate) type Lookup<T> = Result<Vec<T>, LookupFailure>;

pub(crate) fn answers<T>(result: Result<Vec<T>, ResolveError>) -> Lookup<T> {
    match result {
        Ok(values) if values.is_empty() => Err(LookupFailure::NotFound),
        Ok(values) => Ok(values),
        Err(e) => Err(LookupFailure::from(&e)),
    }
}

pub(crate) fn not_found_message(kind: &str, name: &str) -> String {
    format!("{kind} record not found: {name}")
}
