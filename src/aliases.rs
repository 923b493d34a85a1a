// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Host alias resolution.
//!
//! Combines inventory identifiers with the zone map into the set of names that
//! should route to a host. Resolution runs in this order, each step appending
//! only names not already present:
//!
//! 1. the host id and the instance identifier
//! 2. names pointing at the public address
//! 3. names pointing at the private address
//! 4. names pointing at the synthesized `<id>.<domain>`
//! 5. one extra hop: names pointing at any name collected so far
//! 6. every name under `<domain>` again with the domain suffix removed
//!
//! The result is deduplicated and sorted.
//!
//! Step 5 is deliberately a single hop over a snapshot of the set, never a
//! fixed-point traversal, so self-referencing records cannot loop.

use crate::constants::DNS_LABEL_SEPARATOR;
use crate::inventory::HostRecord;
use crate::zone_map::ZoneMap;
use std::collections::BTreeSet;
use tracing::debug;

/// Ordered list of unique names with insertion order preserved.
#[derive(Debug, Default)]
struct AliasAccumulator {
    names: Vec<String>,
}

impl AliasAccumulator {
    fn push(&mut self, name: &str) {
        if !name.is_empty() && !self.names.iter().any(|n| n == name) {
            self.names.push(name.to_string());
        }
    }

    fn extend_from(&mut self, zone_map: &ZoneMap, key: &str, source: &str) {
        match zone_map.get(key) {
            Some(names) => {
                for name in names {
                    debug!(key = %key, alias = %name, source, "Found alias");
                    self.push(name);
                }
            }
            None => debug!(key = %key, source, "No zone map entry"),
        }
    }
}

/// `name` with `.<domain>` removed, if it lies under the domain.
pub fn strip_domain<'a>(name: &'a str, domain: &str) -> Option<&'a str> {
    if domain.is_empty() {
        return None;
    }
    name.strip_suffix(domain)
        .and_then(|rest| rest.strip_suffix(DNS_LABEL_SEPARATOR))
        .filter(|short| !short.is_empty())
}

/// Fully-qualified name synthesized from a host id.
pub fn synthesized_fqdn(host_id: &str, domain: &str) -> String {
    format!("{host_id}{DNS_LABEL_SEPARATOR}{domain}")
}

/// Resolve the aliases of a host.
///
/// # Arguments
///
/// * `host` - The host's inventory record
/// * `zone_map` - Reverse index built from the zone records
/// * `domain` - Domain suffix without a trailing separator (e.g., "example.com")
///
/// # Returns
///
/// Sorted, deduplicated aliases. Always contains at least the host id.
pub fn resolve_aliases(host: &HostRecord, zone_map: &ZoneMap, domain: &str) -> Vec<String> {
    let mut aliases = AliasAccumulator::default();

    aliases.push(&host.id);
    if let Some(instance_id) = &host.instance_id {
        aliases.push(instance_id);
    }

    if let Some(public_address) = &host.public_address {
        aliases.extend_from(zone_map, public_address, "public address");
    }
    aliases.extend_from(zone_map, &host.private_address, "private address");
    aliases.extend_from(zone_map, &synthesized_fqdn(&host.id, domain), "fqdn");

    // One hop only, over the names collected so far
    let snapshot = aliases.names.clone();
    for name in &snapshot {
        aliases.extend_from(zone_map, name, "alias");
    }

    let mut unique: BTreeSet<String> = aliases.names.into_iter().collect();
    let stripped: Vec<String> = unique
        .iter()
        .filter_map(|name| strip_domain(name, domain))
        .map(str::to_string)
        .collect();
    unique.extend(stripped);

    let resolved: Vec<String> = unique.into_iter().collect();
    debug!(host = %host.id, aliases = %resolved.join(" "), "Final list of aliases");
    resolved
}

#[cfg(test)]
#[path = "aliases_tests.rs"]
mod aliases_tests;
