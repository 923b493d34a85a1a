// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Relay (bastion) host selection.
//!
//! Hosts that cannot be reached directly are reached through a relay host in
//! the same partition. Only hosts with a public address qualify. Among those,
//! scanned in host id order:
//!
//! - the first host whose id contains `bastion` wins
//! - otherwise the last candidate wins
//!
//! Selection is a pure function of the partition's hosts.

use crate::constants::BASTION_MARKER;
use crate::inventory::HostRecord;
use tracing::debug;

/// Select the relay host for a partition.
///
/// # Arguments
///
/// * `partition` - Partition name, for diagnostics
/// * `hosts` - All hosts of the partition
///
/// # Returns
///
/// The relay host id, or `None` if no host in the partition has a public address.
pub fn select_relay(partition: &str, hosts: &[HostRecord]) -> Option<String> {
    let mut candidates: Vec<&str> = hosts
        .iter()
        .filter(|host| host.is_public())
        .map(|host| host.id.as_str())
        .collect();
    candidates.sort_unstable();

    debug!(partition = %partition, candidates = %candidates.join(" "), "Relay candidates with a public address");

    let relay = candidates
        .iter()
        .find(|id| id.contains(BASTION_MARKER))
        .or_else(|| candidates.last())
        .map(|id| (*id).to_string());

    debug!(partition = %partition, relay = ?relay, "Relay host selected");
    relay
}

#[cfg(test)]
#[path = "relay_tests.rs"]
mod relay_tests;
