//! WHOIS lookup and registration-field extraction.

use std::sync::LazyLock;
use std::time::Duration;

use regex::Regex;
use whois_rust::{WhoIs, WhoIsLookupOptions};

use crate::error::{ToolboxError, ToolboxResult};
use crate::types::WhoisResult;

/// Embedded WHOIS server mapping (TLD → server).
const WHOIS_SERVERS: &str = include_str!("whois_servers.json");

const WHOIS_TIMEOUT: Duration = Duration::from_secs(10);

/// Referral hops followed from the registry to the registrar server.
const WHOIS_FOLLOW: u16 = 1;

static WHOIS_CLIENT: LazyLock<Result<WhoIs, String>> =
    LazyLock::new(|| WhoIs::from_string(WHOIS_SERVERS).map_err(|e| e.to_string()));

const REGISTRAR_PATTERNS: &[&str] = &[
    r"(?im)^[ \t]*Registrar:[ \t]*(.+)$",
    r"(?im)^[ \t]*Registrar Name:[ \t]*(.+)$",
    r"(?im)^[ \t]*Sponsoring Registrar:[ \t]*(.+)$",
];

const CREATION_PATTERNS: &[&str] = &[
    r"(?im)^[ \t]*Creation Date:[ \t]*(.+)$",
    r"(?im)^[ \t]*Created Date:[ \t]*(.+)$",
    r"(?im)^[ \t]*Created:[ \t]*(.+)$",
    r"(?im)^[ \t]*Registration Time:[ \t]*(.+)$",
    r"(?im)^[ \t]*Registered on:[ \t]*(.+)$",
];

const EXPIRATION_PATTERNS: &[&str] = &[
    r"(?im)^[ \t]*Registry Expiry Date:[ \t]*(.+)$",
    r"(?im)^[ \t]*Registrar Registration Expiration Date:[ \t]*(.+)$",
    r"(?im)^[ \t]*Expir(?:y|ation) Date:[ \t]*(.+)$",
    r"(?im)^[ \t]*Expiration Time:[ \t]*(.+)$",
    r"(?im)^[ \t]*paid-till:[ \t]*(.+)$",
];

const NAME_SERVER_PATTERNS: &[&str] = &[r"(?im)^[ \t]*Name Server:[ \t]*(\S+)", r"(?im)^[ \t]*nserver:[ \t]*(\S+)"];

fn compile(patterns: &[&str]) -> Vec<Regex> {
    patterns.iter().filter_map(|p| Regex::new(p).ok()).collect()
}

static REGISTRAR: LazyLock<Vec<Regex>> = LazyLock::new(|| compile(REGISTRAR_PATTERNS));
static CREATION: LazyLock<Vec<Regex>> = LazyLock::new(|| compile(CREATION_PATTERNS));
static EXPIRATION: LazyLock<Vec<Regex>> = LazyLock::new(|| compile(EXPIRATION_PATTERNS));
static NAME_SERVER: LazyLock<Vec<Regex>> = LazyLock::new(|| compile(NAME_SERVER_PATTERNS));

/// Query WHOIS for `domain` and extract the registration summary.
pub async fn whois_lookup(domain: &str) -> ToolboxResult<WhoisResult> {
    let whois = WHOIS_CLIENT.as_ref().map_err(|e| {
        ToolboxError::NetworkError(format!("Failed to initialize WHOIS client: {e}"))
    })?;

    let mut options = WhoIsLookupOptions::from_string(domain)
        .map_err(|e| ToolboxError::ValidationError(format!("Invalid domain: {e}")))?;
    options.follow = WHOIS_FOLLOW;
    options.timeout = Some(WHOIS_TIMEOUT);

    let raw = whois
        .lookup_async(options)
        .await
        .map_err(|e| ToolboxError::NetworkError(format!("WHOIS query failed: {e}")))?;

    let result = parse_whois_response(domain, &raw);
    if result.registrar.is_none() && result.creation_date.is_none() {
        log::debug!("[WHOIS] No registration fields found for {domain}");
    }
    Ok(result)
}

fn parse_whois_response(domain: &str, raw: &str) -> WhoisResult {
    WhoisResult {
        domain: domain.to_string(),
        registrar: first_match(raw, &REGISTRAR),
        creation_date: first_match(raw, &CREATION),
        expiration_date: first_match(raw, &EXPIRATION),
        name_servers: name_servers(raw),
    }
}

/// First non-empty capture across `patterns`, in pattern order.
fn first_match(text: &str, patterns: &[Regex]) -> Option<String> {
    patterns.iter().find_map(|re| {
        re.captures_iter(text)
            .filter_map(|caps| caps.get(1))
            .map(|m| m.as_str().trim().to_string())
            .find(|value| !value.is_empty())
    })
}

/// Lowercased, deduplicated, trailing dot removed.
fn name_servers(text: &str) -> Vec<String> {
    let mut servers: Vec<String> = Vec::new();
    for re in NAME_SERVER.iter() {
        for caps in re.captures_iter(text) {
            if let Some(m) = caps.get(1) {
                let server = m.as_str().trim_end_matches('.').to_lowercase();
                if !server.is_empty() && !servers.contains(&server) {
                    servers.push(server);
                }
            }
        }
    }
    servers
}
