//! Scripted resolver and probe doubles for port-check tests.

#![allow(clippy::unwrap_used)]

use std::collections::{HashMap, HashSet};
use std::net::IpAddr;
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;

use super::host::HostResolver;
use super::probe::PortProbe;
use crate::types::ProbeAttempt;

/// Returns canned addresses per host and records every query.
#[derive(Default)]
pub struct MockHostResolver {
    answers: HashMap<String, Vec<IpAddr>>,
    calls: Mutex<Vec<String>>,
}

impl MockHostResolver {
    pub fn with(mut self, host: &str, ips: &[&str]) -> Self {
        let ips = ips.iter().map(|s| s.parse().unwrap()).collect();
        self.answers.insert(host.to_string(), ips);
        self
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl HostResolver for MockHostResolver {
    async fn resolve(&self, host: &str) -> Vec<IpAddr> {
        self.calls.lock().unwrap().push(host.to_string());
        self.answers.get(host).cloned().unwrap_or_default()
    }
}

/// Reports a fixed set of addresses as open and refuses the rest.
#[derive(Default)]
pub struct MockPortProbe {
    open: HashSet<IpAddr>,
    calls: Mutex<Vec<(IpAddr, u16, Duration)>>,
}

impl MockPortProbe {
    pub fn open_on(mut self, ip: &str) -> Self {
        self.open.insert(ip.parse().unwrap());
        self
    }

    pub fn calls(&self) -> Vec<(IpAddr, u16, Duration)> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl PortProbe for MockPortProbe {
    async fn connect(&self, ip: IpAddr, port: u16, timeout: Duration) -> ProbeAttempt {
        self.calls.lock().unwrap().push((ip, port, timeout));
        if self.open.contains(&ip) {
            ProbeAttempt::open(ip, 1.25)
        } else {
            ProbeAttempt::closed(ip, 0.5, "Connection refused (os error 111)")
        }
    }
}
