//! Single bounded TCP connect attempt.

use std::net::{IpAddr, SocketAddr};
use std::time::{Duration, Instant};

use async_trait::async_trait;
use tokio::net::TcpStream;
use tokio::time::timeout;

use crate::types::ProbeAttempt;

/// Connects once to `(ip, port)` and reports the outcome.
///
/// Never fails: every transport error is captured in the returned attempt.
#[async_trait]
pub trait PortProbe: Send + Sync {
    async fn connect(&self, ip: IpAddr, port: u16, timeout: Duration) -> ProbeAttempt;
}

/// Plain TCP handshake probe. No bytes are exchanged.
#[derive(Debug, Default, Clone, Copy)]
pub struct TcpPortProbe;

#[async_trait]
impl PortProbe for TcpPortProbe {
    async fn connect(&self, ip: IpAddr, port: u16, connect_timeout: Duration) -> ProbeAttempt {
        let addr = SocketAddr::new(ip, port);
        let start = Instant::now();
        let result = timeout(connect_timeout, TcpStream::connect(addr)).await;
        let latency_ms = round_ms(start.elapsed());

        match result {
            Ok(Ok(stream)) => {
                drop(stream);
                log::debug!("[PORT] {addr} open ({latency_ms}ms)");
                ProbeAttempt::open(ip, latency_ms)
            }
            Ok(Err(e)) => {
                log::debug!("[PORT] {addr} closed: {e}");
                ProbeAttempt::closed(ip, latency_ms, e.to_string())
            }
            Err(_) => {
                log::debug!(
                    "[PORT] {addr} timed out after {}ms",
                    connect_timeout.as_millis()
                );
                ProbeAttempt::closed(ip, latency_ms, "timed out")
            }
        }
    }
}

/// Milliseconds, rounded to two decimals.
pub(crate) fn round_ms(elapsed: Duration) -> f64 {
    (elapsed.as_secs_f64() * 1000.0 * 100.0).round() / 100.0
}
