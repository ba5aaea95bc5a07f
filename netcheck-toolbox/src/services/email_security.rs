//! Email-security record checks: MX, SPF, DKIM, DMARC, MTA-STS and NS.
//!
//! Each check fetches its records and hands them to a pure `evaluate_*`
//! function that decides `status` and renders `value`.

use std::sync::LazyLock;
use std::time::Duration;

use hickory_resolver::TokioResolver;
use reqwest::{Client, StatusCode};

use super::resolver::{Lookup, LookupFailure, answers, not_found_message};
use crate::types::RecordCheck;

/// Shared client for MTA-STS policy fetches. Per-request timeouts are set by the caller.
static HTTP_CLIENT: LazyLock<Client> = LazyLock::new(|| {
    Client::builder()
        .redirect(reqwest::redirect::Policy::limited(5))
        .build()
        .unwrap_or_default()
});

// ==================== DNS fetch ====================

/// TXT records at `name`, each record's character-strings concatenated.
async fn txt_records(resolver: &TokioResolver, name: &str) -> Lookup<String> {
    answers(resolver.txt_lookup(name).await.map(|response| {
        response
            .iter()
            .map(|txt| {
                txt.iter()
                    .map(|data| String::from_utf8_lossy(data).to_string())
                    .collect::<String>()
            })
            .collect()
    }))
}

async fn mx_exchanges(resolver: &TokioResolver, domain: &str) -> Lookup<String> {
    answers(resolver.mx_lookup(domain).await.map(|response| {
        response
            .iter()
            .map(|mx| mx.exchange().to_string().trim_end_matches('.').to_string())
            .collect()
    }))
}

// ==================== checks ====================

pub(crate) async fn mx_check(resolver: &TokioResolver, domain: &str) -> RecordCheck {
    evaluate_mx(domain, mx_exchanges(resolver, domain).await)
}

pub(crate) async fn spf_check(resolver: &TokioResolver, domain: &str) -> RecordCheck {
    evaluate_spf(domain, txt_records(resolver, domain).await)
}

pub(crate) async fn dkim_check(
    resolver: &TokioResolver,
    domain: &str,
    selectors: &[String],
) -> RecordCheck {
    let mut lookups = Vec::with_capacity(selectors.len());
    for selector in selectors {
        let name = dkim_name(selector, domain);
        lookups.push((selector.as_str(), txt_records(resolver, &name).await));
    }
    evaluate_dkim(domain, lookups)
}

pub(crate) async fn dmarc_check(resolver: &TokioResolver, domain: &str) -> RecordCheck {
    let name = format!("_dmarc.{domain}");
    evaluate_dmarc(&name, txt_records(resolver, &name).await)
}

/// The `_mta-sts` TXT record must exist and the policy file must be served
/// over HTTPS with status 200.
pub(crate) async fn mta_sts_check(
    resolver: &TokioResolver,
    domain: &str,
    http_timeout: Duration,
) -> RecordCheck {
    let name = format!("_mta-sts.{domain}");
    match txt_records(resolver, &name).await {
        Ok(records) => {
            let txt = records.into_iter().next().unwrap_or_default();
            let http_ok = mta_sts_policy_reachable(domain, http_timeout).await;
            render_mta_sts(txt, true, http_ok)
        }
        Err(failure) => failure.into_check("MTA-STS", &name),
    }
}

/// Name servers of `domain`; empty on any failure.
pub(crate) async fn name_servers(resolver: &TokioResolver, domain: &str) -> Vec<String> {
    match resolver.ns_lookup(domain).await {
        Ok(response) => response
            .iter()
            .map(|ns| ns.to_string().trim_end_matches('.').to_string())
            .collect(),
        Err(e) => {
            log::debug!("[LOOKUP] NS lookup for {domain} failed: {e}");
            Vec::new()
        }
    }
}

/// Try the `mta-sts.` host first, then the bare domain.
async fn mta_sts_policy_reachable(domain: &str, http_timeout: Duration) -> bool {
    for url in policy_urls(domain) {
        match HTTP_CLIENT.get(&url).timeout(http_timeout).send().await {
            Ok(response) if response.status() == StatusCode::OK => return true,
            Ok(response) => {
                log::debug!("[LOOKUP] {url} answered {}", response.status());
            }
            Err(e) => {
                log::debug!("[LOOKUP] {url} failed: {e}");
            }
        }
    }
    false
}

fn policy_urls(domain: &str) -> [String; 2] {
    [
        format!("https://mta-sts.{domain}/.well-known/mta-sts.txt"),
        format!("https://{domain}/.well-known/mta-sts.txt"),
    ]
}

fn dkim_name(selector: &str, domain: &str) -> String {
    format!("{selector}._domainkey.{domain}")
}

// ==================== evaluation ====================

pub(crate) fn evaluate_mx(domain: &str, lookup: Lookup<String>) -> RecordCheck {
    match lookup {
        Ok(exchanges) => RecordCheck::records(!exchanges.is_empty(), exchanges),
        Err(failure) => failure.into_check("MX", domain),
    }
}

/// Keeps `v=spf1` records; passes when one of them ends in a hard fail.
pub(crate) fn evaluate_spf(domain: &str, lookup: Lookup<String>) -> RecordCheck {
    let records: Vec<String> = match lookup {
        Ok(txt) => txt.into_iter().filter(|r| r.starts_with("v=spf1")).collect(),
        Err(failure) => return failure.into_check("SPF", domain),
    };
    if records.is_empty() {
        return LookupFailure::NotFound.into_check("SPF", domain);
    }
    let status = records.iter().any(|r| spf_hard_fails(r));
    RecordCheck::records(status, records)
}

/// Whether the record carries the `-all` mechanism.
pub(crate) fn spf_hard_fails(record: &str) -> bool {
    record
        .split_whitespace()
        .any(|term| term.eq_ignore_ascii_case("-all"))
}

/// One line per selector; passes only when every selector has a record.
pub(crate) fn evaluate_dkim(domain: &str, lookups: Vec<(&str, Lookup<String>)>) -> RecordCheck {
    let mut all_found = true;
    let mut lines = Vec::with_capacity(lookups.len());
    for (selector, lookup) in lookups {
        match lookup {
            Ok(records) => {
                let first = records.into_iter().next().unwrap_or_default();
                lines.push(format!("{selector}: {first}"));
            }
            Err(LookupFailure::NotFound) => {
                all_found = false;
                let name = dkim_name(selector, domain);
                lines.push(format!("{selector}: {}", not_found_message("DKIM", &name)));
            }
            Err(LookupFailure::Other(msg)) => {
                all_found = false;
                lines.push(format!("{selector}: {msg}"));
            }
        }
    }
    RecordCheck::records(all_found, lines)
}

/// Passes when any record's `p` tag is `reject`.
pub(crate) fn evaluate_dmarc(name: &str, lookup: Lookup<String>) -> RecordCheck {
    match lookup {
        Ok(records) => {
            let status = records
                .iter()
                .any(|r| dmarc_policy(r).is_some_and(|p| p.eq_ignore_ascii_case("reject")));
            RecordCheck::records(status, records)
        }
        Err(failure) => failure.into_check("DMARC", name),
    }
}

/// Value of the `p=` tag of a DMARC record.
pub(crate) fn dmarc_policy(record: &str) -> Option<&str> {
    record.split(';').find_map(|tag| {
        let (key, value) = tag.split_once('=')?;
        key.trim().eq_ignore_ascii_case("p").then(|| value.trim())
    })
}

pub(crate) fn render_mta_sts(txt: String, dns_ok: bool, http_ok: bool) -> RecordCheck {
    RecordCheck::records(
        dns_ok && http_ok,
        vec![txt, format!("DNS: {dns_ok}\t\tHTTP: {http_ok}")],
    )
}
