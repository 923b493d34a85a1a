// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Reachability probing.
//!
//! A host is directly reachable when a TCP connection to its public address
//! succeeds on a candidate SSH port. The candidate order depends on the
//! preferred port:
//!
//! - preferred port other than `22`: try it first, then fall back to `22`
//! - preferred port `22`: try `22` once
//!
//! Every attempt is a single connect bounded by a short timeout; the socket is
//! closed as soon as the attempt finishes.

use crate::constants::{DEFAULT_SSH_PORT, PROBE_TIMEOUT_SECS};
use async_trait::async_trait;
use std::time::Duration;
use tokio::io::AsyncWriteExt;
use tokio::net::TcpStream;
use tracing::debug;

/// Checks whether a single `(address, port)` pair accepts TCP connections.
#[async_trait]
pub trait PortProbe: Send + Sync {
    /// Return `true` if a connection to `address:port` can be established.
    async fn is_open(&self, address: &str, port: &str) -> bool;
}

/// TCP connect probe with a fixed per-attempt timeout.
#[derive(Debug, Clone, Copy)]
pub struct TcpProbe {
    timeout: Duration,
}

impl TcpProbe {
    /// Create a probe with a custom per-attempt timeout.
    pub fn new(timeout: Duration) -> Self {
        Self { timeout }
    }
}

impl Default for TcpProbe {
    fn default() -> Self {
        Self::new(Duration::from_secs(PROBE_TIMEOUT_SECS))
    }
}

#[async_trait]
impl PortProbe for TcpProbe {
    async fn is_open(&self, address: &str, port: &str) -> bool {
        let Ok(port) = port.parse::<u16>() else {
            debug!(address = %address, port = %port, "Invalid port, not probing");
            return false;
        };

        match tokio::time::timeout(self.timeout, TcpStream::connect((address, port))).await {
            Ok(Ok(mut stream)) => {
                let _ = stream.shutdown().await;
                true
            }
            Ok(Err(e)) => {
                debug!(address = %address, port, error = %e, "Connection failed");
                false
            }
            Err(_) => {
                debug!(address = %address, port, timeout_secs = self.timeout.as_secs(), "Connection timed out");
                false
            }
        }
    }
}

/// Candidate ports to probe for a preferred port, in order.
pub fn candidate_ports(preferred_port: &str) -> Vec<&str> {
    if preferred_port == DEFAULT_SSH_PORT {
        vec![DEFAULT_SSH_PORT]
    } else {
        vec![preferred_port, DEFAULT_SSH_PORT]
    }
}

/// Find the port a host accepts SSH connections on.
///
/// # Returns
///
/// The first candidate port that accepts a connection, or `None` if none does.
pub async fn find_ssh_port<P>(probe: &P, address: &str, preferred_port: &str) -> Option<String>
where
    P: PortProbe + ?Sized,
{
    for port in candidate_ports(preferred_port) {
        if probe.is_open(address, port).await {
            debug!(address = %address, port = %port, "Accepting connections");
            return Some(port.to_string());
        }
    }

    debug!(address = %address, "Not accepting connections");
    None
}

#[cfg(test)]
#[path = "probe_tests.rs"]
mod probe_tests;
