// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Reverse index from addresses and DNS names to the names pointing at them.
//!
//! The zone map is built once per run from raw zone records:
//!
//! - `A` records are keyed by the IP address they resolve to
//! - `CNAME` records are keyed by their (normalized) target name
//! - Multi-valued record sets and all other record types are skipped
//!
//! Keys and values are normalized by stripping the trailing label separator,
//! so `www.example.com.` and `www.example.com` are the same key.
//!
//! # Example
//!
//! ```rust
//! use bastion_sshconfig::zone_map::{ZoneMap, ZoneRecord};
//!
//! let records = vec![
//!     ZoneRecord::new("web-1.example.com.", "A", "203.0.113.5"),
//!     ZoneRecord::new("www.example.com.", "CNAME", "web-1.example.com."),
//! ];
//!
//! let zone_map = ZoneMap::build(&records);
//! assert_eq!(zone_map.get("203.0.113.5"), Some(&["web-1.example.com".to_string()][..]));
//! assert_eq!(zone_map.get("web-1.example.com"), Some(&["www.example.com".to_string()][..]));
//! ```

use crate::constants::{DNS_LABEL_SEPARATOR, MULTI_VALUE_SEPARATOR};
use std::collections::BTreeMap;
use std::fmt;
use std::net::IpAddr;
use std::str::FromStr;
use tracing::debug;

/// Record type of a zone record, as far as the zone map cares.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum RecordKind {
    /// Address record
    A,
    /// Canonical name record
    Cname,
    /// Any other record type, kept by name for diagnostics
    Other(String),
}

impl FromStr for RecordKind {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s.to_ascii_uppercase().as_str() {
            "A" => RecordKind::A,
            "CNAME" => RecordKind::Cname,
            other => RecordKind::Other(other.to_string()),
        })
    }
}

impl fmt::Display for RecordKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RecordKind::A => f.write_str("A"),
            RecordKind::Cname => f.write_str("CNAME"),
            RecordKind::Other(kind) => f.write_str(kind),
        }
    }
}

/// One DNS entry as delivered by a zone source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ZoneRecord {
    /// Owner name, possibly with a trailing separator
    pub name: String,
    /// Record type
    pub kind: RecordKind,
    /// Record value: an IP address for `A`, a target name for `CNAME`.
    /// Record sets with several values carry them joined by `,`.
    pub value: String,
}

impl ZoneRecord {
    /// Create a record from its textual parts.
    pub fn new(name: impl Into<String>, kind: &str, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            // Infallible: unknown types map to RecordKind::Other
            kind: kind.parse().unwrap_or(RecordKind::Other(kind.to_string())),
            value: value.into(),
        }
    }

    /// Whether the record set carries more than one value.
    pub fn is_multi_valued(&self) -> bool {
        self.value.contains(MULTI_VALUE_SEPARATOR)
    }
}

/// Strip a single trailing label separator from a DNS name.
pub fn normalize_name(name: &str) -> &str {
    name.strip_suffix(DNS_LABEL_SEPARATOR).unwrap_or(name)
}

/// Whether an address may key the zone map.
///
/// Global and private unicast addresses are accepted. Multicast, the limited
/// broadcast address and the IPv4 shared address space (100.64.0.0/10) are
/// skipped.
fn is_indexable_address(ip: &IpAddr) -> bool {
    match ip {
        IpAddr::V4(v4) => {
            let [first, second, ..] = v4.octets();
            let shared = first == 100 && (second & 0xC0) == 64;
            !v4.is_multicast() && !v4.is_broadcast() && !shared
        }
        IpAddr::V6(v6) => !v6.is_multicast(),
    }
}

/// Reverse lookup from IP address or DNS name to the DNS names resolving to it.
///
/// Values keep insertion order and may contain duplicates; consumers deduplicate.
/// Every key maps to at least one name. The map is immutable once built.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ZoneMap {
    entries: BTreeMap<String, Vec<String>>,
}

impl ZoneMap {
    /// Build the zone map from raw zone records.
    ///
    /// Malformed records (bad address syntax, multi-valued payloads, unsupported
    /// types) are skipped; building never fails.
    pub fn build<'a, I>(records: I) -> Self
    where
        I: IntoIterator<Item = &'a ZoneRecord>,
    {
        let mut entries: BTreeMap<String, Vec<String>> = BTreeMap::new();

        for record in records {
            if record.is_multi_valued() {
                debug!(name = %record.name, kind = %record.kind, "Skipping multi-valued record set");
                continue;
            }

            let name = normalize_name(&record.name).to_string();
            let key = match &record.kind {
                RecordKind::A => match record.value.trim().parse::<IpAddr>() {
                    Ok(ip) if is_indexable_address(&ip) => ip.to_string(),
                    Ok(ip) => {
                        debug!(name = %name, address = %ip, "Skipping A record with non-unicast address");
                        continue;
                    }
                    Err(_) => {
                        debug!(name = %name, value = %record.value, "Skipping A record with invalid address");
                        continue;
                    }
                },
                RecordKind::Cname => normalize_name(record.value.trim()).to_string(),
                RecordKind::Other(_) => continue,
            };

            if key.is_empty() {
                continue;
            }

            entries.entry(key).or_default().push(name);
        }

        Self { entries }
    }

    /// Names pointing at `key`, in insertion order.
    ///
    /// IP keys are compared in canonical form and name keys without a trailing
    /// separator, so lookups use the same normalization as the builder.
    pub fn get(&self, key: &str) -> Option<&[String]> {
        self.entries
            .get(Self::lookup_key(key).as_str())
            .map(Vec::as_slice)
    }

    /// Whether `key` has any names pointing at it.
    pub fn contains_key(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    /// Number of distinct keys.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the map has no keys.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterate over keys and their names in key order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &[String])> {
        self.entries
            .iter()
            .map(|(key, names)| (key.as_str(), names.as_slice()))
    }

    fn lookup_key(key: &str) -> String {
        let key = key.trim();
        match key.parse::<IpAddr>() {
            Ok(ip) => ip.to_string(),
            Err(_) => normalize_name(key).to_string(),
        }
    }
}

#[cfg(test)]
#[path = "zone_map_tests.rs"]
mod zone_map_tests;
