// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Zone record acquisition.
//!
//! The zone map only needs `(name, type, value)` tuples. This module provides
//! the adapters that produce them:
//!
//! - [`ZoneTransfer`] - AXFR over TCP from an authoritative nameserver
//! - [`ZoneExportFile`] - a JSON export of the DNS provider's record sets
//!   (`ResourceRecordSets` listing)
//!
//! Both report record sets the same way: one [`ZoneRecord`] per `(name, type)`
//! with several values joined by `,`, so the builder can discard ambiguous
//! multi-valued sets regardless of where they came from.

use crate::constants::MULTI_VALUE_SEPARATOR;
use crate::errors::ZoneSourceError;
use crate::zone_map::{RecordKind, ZoneRecord};
use async_trait::async_trait;
use hickory_client::client::{Client, SyncClient};
use hickory_client::rr::{Name, RData, Record};
use hickory_client::tcp::TcpClientConnection;
use hickory_proto::op::ResponseCode;
use hickory_proto::rr::RecordType;
use serde::Deserialize;
use std::collections::HashMap;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;
use tracing::{debug, info};

/// Timeout for the zone transfer TCP connection and each response
const ZONE_TRANSFER_TIMEOUT_SECS: u64 = 30;

/// A provider of raw zone records.
#[async_trait]
pub trait ZoneSource: Send + Sync {
    /// Fetch every record of the zone.
    ///
    /// # Errors
    ///
    /// Returns an error if the records cannot be acquired at all.
    async fn fetch_records(&self) -> Result<Vec<ZoneRecord>, ZoneSourceError>;

    /// Human-readable description for logs.
    fn describe(&self) -> String;
}

/// Collapse individual records into record sets.
///
/// Records sharing `(name, kind)` are merged in first-seen order, with their
/// distinct values joined by `,`.
pub fn collapse_record_sets(records: Vec<ZoneRecord>) -> Vec<ZoneRecord> {
    let mut sets: Vec<(ZoneRecord, Vec<String>)> = Vec::new();
    let mut index: HashMap<(String, RecordKind), usize> = HashMap::new();

    for record in records {
        let key = (record.name.clone(), record.kind.clone());
        match index.get(&key) {
            Some(&position) => {
                let values = &mut sets[position].1;
                if !values.contains(&record.value) {
                    values.push(record.value);
                }
            }
            None => {
                index.insert(key, sets.len());
                let values = vec![record.value.clone()];
                sets.push((record, values));
            }
        }
    }

    sets.into_iter()
        .map(|(mut set, values)| {
            set.value = values.join(&MULTI_VALUE_SEPARATOR.to_string());
            set
        })
        .collect()
}

/// Convert a wire record into a zone record.
fn to_zone_record(record: &Record) -> ZoneRecord {
    let kind = match record.record_type() {
        RecordType::A => RecordKind::A,
        RecordType::CNAME => RecordKind::Cname,
        other => RecordKind::Other(other.to_string()),
    };

    let value = match record.data() {
        Some(RData::A(address)) => address.to_string(),
        Some(RData::CNAME(target)) => target.0.to_string(),
        Some(other) => other.to_string(),
        None => String::new(),
    };

    ZoneRecord {
        name: record.name().to_string(),
        kind,
        value,
    }
}

/// Transfer a zone (AXFR) from a nameserver.
///
/// # Arguments
///
/// * `zone_name` - DNS zone name (e.g., "example.com")
/// * `server` - Nameserver address with port (e.g., "10.0.0.53:53")
///
/// # Returns
///
/// All records of the zone collapsed into record sets.
///
/// # Errors
///
/// Returns an error if the server address or zone name is invalid, the
/// connection fails, or the server refuses the transfer.
pub async fn transfer_zone(
    zone_name: &str,
    server: &str,
) -> Result<Vec<ZoneRecord>, ZoneSourceError> {
    let server_addr = server
        .parse::<SocketAddr>()
        .map_err(|_| ZoneSourceError::InvalidNameserver(server.to_string()))?;
    let zone = Name::from_str(zone_name).map_err(|e| ZoneSourceError::InvalidZoneName {
        zone: zone_name.to_string(),
        reason: e.to_string(),
    })?;

    let zone_name_str = zone_name.to_string();
    let server_str = server.to_string();
    let transfer_failed = move |reason: String| ZoneSourceError::TransferFailed {
        zone: zone_name_str.clone(),
        server: server_str.clone(),
        reason,
    };

    info!(zone = %zone, server = %server_addr, "Requesting zone transfer");

    // hickory-client's sync client blocks, keep it off the runtime workers
    let records = tokio::task::spawn_blocking(move || {
        let conn = TcpClientConnection::with_timeout(
            server_addr,
            Duration::from_secs(ZONE_TRANSFER_TIMEOUT_SECS),
        )
        .map_err(|e| transfer_failed(e.to_string()))?;
        let client = SyncClient::new(conn);

        let responses = client
            .zone_transfer(&zone, None)
            .map_err(|e| transfer_failed(e.to_string()))?;

        let mut records = Vec::new();
        for response in responses {
            let response = response.map_err(|e| transfer_failed(e.to_string()))?;
            if response.response_code() != ResponseCode::NoError {
                return Err(transfer_failed(response.response_code().to_string()));
            }
            records.extend(response.answers().iter().map(to_zone_record));
        }

        // A complete transfer always carries at least the zone's SOA
        if records.is_empty() {
            return Err(transfer_failed("no records received".to_string()));
        }

        Ok(records)
    })
    .await
    .map_err(|e| ZoneSourceError::TransferFailed {
        zone: zone_name.to_string(),
        server: server.to_string(),
        reason: format!("zone transfer task failed: {e}"),
    })??;

    debug!(count = records.len(), "Received zone transfer records");

    Ok(collapse_record_sets(records))
}

/// AXFR zone source.
#[derive(Debug, Clone)]
pub struct ZoneTransfer {
    /// Nameserver address with port
    pub nameserver: String,
    /// Zone to transfer
    pub zone: String,
}

#[async_trait]
impl ZoneSource for ZoneTransfer {
    async fn fetch_records(&self) -> Result<Vec<ZoneRecord>, ZoneSourceError> {
        transfer_zone(&self.zone, &self.nameserver).await
    }

    fn describe(&self) -> String {
        format!("AXFR {} from {}", self.zone, self.nameserver)
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct RecordSetListing {
    resource_record_sets: Vec<RecordSet>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct RecordSet {
    name: String,
    #[serde(rename = "Type")]
    record_type: String,
    #[serde(default)]
    resource_records: Vec<ResourceRecord>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct ResourceRecord {
    value: String,
}

/// Parse a record-set listing export into zone records.
///
/// # Errors
///
/// Returns the JSON error if the document is not a record-set listing.
pub fn parse_record_set_listing(json: &str) -> Result<Vec<ZoneRecord>, serde_json::Error> {
    let listing: RecordSetListing = serde_json::from_str(json)?;

    Ok(listing
        .resource_record_sets
        .into_iter()
        .map(|set| {
            let value = set
                .resource_records
                .iter()
                .map(|r| r.value.as_str())
                .collect::<Vec<_>>()
                .join(&MULTI_VALUE_SEPARATOR.to_string());
            ZoneRecord::new(set.name, &set.record_type, value)
        })
        .collect())
}

/// Zone source reading an exported record-set listing from disk.
#[derive(Debug, Clone)]
pub struct ZoneExportFile {
    /// Path to the JSON export
    pub path: PathBuf,
}

impl ZoneExportFile {
    /// Create a source for the export at `path`.
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }
}

#[async_trait]
impl ZoneSource for ZoneExportFile {
    async fn fetch_records(&self) -> Result<Vec<ZoneRecord>, ZoneSourceError> {
        let json = tokio::fs::read_to_string(&self.path)
            .await
            .map_err(|source| ZoneSourceError::ExportRead {
                path: self.path.clone(),
                source,
            })?;

        let records =
            parse_record_set_listing(&json).map_err(|source| ZoneSourceError::ExportParse {
                path: self.path.clone(),
                source,
            })?;

        debug!(path = %self.path.display(), count = records.len(), "Loaded zone export");
        Ok(records)
    }

    fn describe(&self) -> String {
        format!("zone export {}", self.path.display())
    }
}

#[cfg(test)]
#[path = "zone_source_tests.rs"]
mod zone_source_tests;
