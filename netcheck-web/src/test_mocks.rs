#![allow(clippy::unwrap_used)]

use std::collections::{HashMap, HashSet};
use std::net::IpAddr;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use netcheck_toolbox::{
    DomainLookupResult, HostResolver, LookupOptions, PortCheckConfig, PortChecker, PortProbe,
    ProbeAttempt, RecordCheck, ToolboxError, ToolboxResult, WhoisSummary,
};

use crate::gateway::LookupGateway;
use crate::routes::AppState;

#[derive(Default)]
pub struct MockHostResolver {
    answers: HashMap<String, Vec<IpAddr>>,
}

impl MockHostResolver {
    pub fn with(mut self, host: &str, ips: &[&str]) -> Self {
        self.answers
            .insert(host.to_string(), ips.iter().map(|s| s.parse().unwrap()).collect());
        self
    }
}

#[async_trait]
impl HostResolver for MockHostResolver {
    async fn resolve(&self, host: &str) -> Vec<IpAddr> {
        if let Some(ip) = netcheck_toolbox::parse_ip_literal(host) {
            return vec![ip];
        }
        self.answers.get(host).cloned().unwrap_or_default()
    }
}

#[derive(Default)]
pub struct MockPortProbe {
    open: HashSet<IpAddr>,
    probed: Mutex<Vec<IpAddr>>,
}

impl MockPortProbe {
    pub fn open_on(mut self, ip: &str) -> Self {
        self.open.insert(ip.parse().unwrap());
        self
    }

    pub fn probed(&self) -> Vec<IpAddr> {
        self.probed.lock().unwrap().clone()
    }
}

#[async_trait]
impl PortProbe for MockPortProbe {
    async fn connect(&self, ip: IpAddr, _port: u16, _timeout: Duration) -> ProbeAttempt {
        self.probed.lock().unwrap().push(ip);
        if self.open.contains(&ip) {
            ProbeAttempt::open(ip, 4.2)
        } else {
            ProbeAttempt::closed(ip, 1.0, "Connection refused (os error 111)")
        }
    }
}

pub enum LookupMode {
    Report,
    Failing,
    Slow(Duration),
}

pub struct MockLookupGateway {
    mode: LookupMode,
    calls: Mutex<Vec<(String, Vec<String>)>>,
}

impl MockLookupGateway {
    pub fn new(mode: LookupMode) -> Self {
        Self {
            mode,
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn calls(&self) -> Vec<(String, Vec<String>)> {
        self.calls.lock().unwrap().clone()
    }
}

pub fn sample_report() -> DomainLookupResult {
    DomainLookupResult {
        mx: RecordCheck::records(true, vec!["mx1.example.com".to_string()]),
        spf: RecordCheck::records(true, vec!["v=spf1 -all".to_string()]),
        dkim: RecordCheck::records(
            false,
            vec!["selector1: DKIM record not found: selector1._domainkey.example.com".to_string()],
        ),
        dmarc: RecordCheck::records(true, vec!["v=DMARC1; p=reject".to_string()]),
        mta_sts: RecordCheck::failed("MTA-STS record not found: _mta-sts.example.com"),
        dnssec: RecordCheck::failed("DNSSEC record not found: example.com"),
        ns: vec!["a.iana-servers.net".to_string()],
        whois: WhoisSummary::Failed {
            error: "WHOIS query failed: connection refused".to_string(),
        },
    }
}

#[async_trait]
impl LookupGateway for MockLookupGateway {
    async fn domain_lookup(
        &self,
        domain: &str,
        options: &LookupOptions,
    ) -> ToolboxResult<DomainLookupResult> {
        self.calls
            .lock()
            .unwrap()
            .push((domain.to_string(), options.dkim_selectors.clone()));
        if domain.trim().is_empty() {
            return Err(ToolboxError::ValidationError(
                "Domain name is required".to_string(),
            ));
        }
        match self.mode {
            LookupMode::Report => Ok(sample_report()),
            LookupMode::Failing => Err(ToolboxError::NetworkError("resolver unavailable".to_string())),
            LookupMode::Slow(delay) => {
                tokio::time::sleep(delay).await;
                Ok(sample_report())
            }
        }
    }
}

pub fn test_state(
    resolver: MockHostResolver,
    probe: Arc<MockPortProbe>,
    lookup: Arc<MockLookupGateway>,
) -> AppState {
    AppState {
        port_checker: PortChecker::new(Arc::new(resolver), probe, PortCheckConfig::default()),
        lookup,
        lookup_options: LookupOptions::default(),
        lookup_timeout: Duration::from_secs(5),
    }
}
