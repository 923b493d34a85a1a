// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Connectivity plan synthesis and rendering.
//!
//! For every partition (in name order) and every host (in id order) the plan
//! records which names address the host, whether it is reachable directly, and
//! which relay host to jump through when it is not. The plan renders as SSH
//! client configuration:
//!
//! ```text
//! ##################################################
//! ####   vpc-0a1b2c3d   ############################
//! ##################################################
//!
//! # <--
//! Host i-0abc web-1 web-1.example.com
//!   ForwardAgent yes
//!   StrictHostKeyChecking no
//!   Hostname 10.0.0.5
//!   ProxyJump bastion-1
//! # -->
//! ```
//!
//! # Probing
//!
//! Probes for all public hosts are issued in plan order through a buffered
//! stream of width `probe_concurrency`. Results come back in issue order, so
//! emission order never depends on which probe finishes first.

use crate::aliases::resolve_aliases;
use crate::constants::{BANNER_FILL, BANNER_WIDTH, PARTITION_PREFIX, STANZA_CLOSE, STANZA_OPEN};
use crate::inventory::{HostRecord, Inventory};
use crate::probe::{find_ssh_port, PortProbe};
use crate::relay::select_relay;
use crate::settings::PlanSettings;
use crate::zone_map::ZoneMap;
use futures::stream::{self, StreamExt};
use std::fmt;
use tracing::{debug, info, warn};

/// How one host is reached.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ConnectivityDecision {
    /// Port the host accepted a direct connection on
    pub port: Option<String>,
    /// Relay host id, when the host is not reachable directly and a relay exists
    pub relay: Option<String>,
}

impl ConnectivityDecision {
    /// Whether the host is reachable directly.
    pub fn is_direct(&self) -> bool {
        self.port.is_some()
    }
}

/// Explicit connection identity for a stanza.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    /// User to connect as
    pub user: String,
    /// Identity file path, when the host has a key name
    pub identity_file: Option<String>,
}

/// Connectivity stanza for one host.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HostStanza {
    /// Inventory host id
    pub host_id: String,
    /// Sorted, unique names addressing the host
    pub aliases: Vec<String>,
    /// Public DNS name when reachable directly, private address otherwise
    pub hostname: String,
    /// Routing decision
    pub decision: ConnectivityDecision,
    /// Explicit identity, when the connection user differs from the invoking user
    pub identity: Option<Identity>,
}

/// Stanzas of one partition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PartitionPlan {
    /// Partition name as listed in the inventory
    pub partition: String,
    /// One stanza per host, in host id order
    pub hosts: Vec<HostStanza>,
}

/// The full connectivity plan.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ConnectivityPlan {
    /// One entry per partition, in partition name order
    pub partitions: Vec<PartitionPlan>,
}

impl ConnectivityPlan {
    /// Total number of host stanzas.
    pub fn host_count(&self) -> usize {
        self.partitions.iter().map(|p| p.hosts.len()).sum()
    }
}

/// Partition name with the inventory's group prefix removed.
pub fn partition_label(partition: &str) -> &str {
    partition.strip_prefix(PARTITION_PREFIX).unwrap_or(partition)
}

/// Build the stanza of one host from its resolved parts.
///
/// `port` is the probe result. A host that answered but has no public DNS
/// name is addressed like an unreachable host, through its private address.
/// `relay` is consulted only when the host is not reachable directly.
pub fn host_stanza<F>(
    host: &HostRecord,
    aliases: Vec<String>,
    port: Option<String>,
    relay: F,
    settings: &PlanSettings,
) -> HostStanza
where
    F: FnOnce() -> Option<String>,
{
    let direct = match (port, &host.public_dns_name) {
        (Some(port), Some(dns_name)) => Some((port, dns_name.clone())),
        (Some(_), None) => {
            warn!(host = %host.id, "Reachable but no public DNS name, using private address");
            None
        }
        (None, _) => None,
    };

    let (hostname, decision) = match direct {
        Some((port, dns_name)) => (
            dns_name,
            ConnectivityDecision {
                port: Some(port),
                relay: None,
            },
        ),
        None => {
            let relay = relay();
            debug!(host = %host.id, relay = ?relay, "Bastion host found");
            (
                host.private_address.clone(),
                ConnectivityDecision { port: None, relay },
            )
        }
    };

    let identity = settings.overrides_user().then(|| Identity {
        user: settings.ssh_user.clone(),
        identity_file: host.key_name.as_deref().map(|k| settings.identity_file(k)),
    });

    HostStanza {
        host_id: host.id.clone(),
        aliases,
        hostname,
        decision,
        identity,
    }
}

/// Probe every public host in order with bounded concurrency.
async fn probe_hosts<P>(hosts: &[&HostRecord], probe: &P, settings: &PlanSettings) -> Vec<Option<String>>
where
    P: PortProbe + ?Sized,
{
    let width = settings.probe_concurrency.max(1);

    stream::iter(hosts.iter().copied())
        .map(|host| async move {
            match &host.public_address {
                Some(address) => {
                    debug!(host = %host.id, address = %address, "Host has a public ip");
                    find_ssh_port(probe, address, &settings.ssh_port).await
                }
                None => {
                    debug!(host = %host.id, "No public ip, not probing");
                    None
                }
            }
        })
        .buffered(width)
        .collect()
        .await
}

/// Build the connectivity plan.
///
/// # Arguments
///
/// * `inventory` - Parsed compute inventory
/// * `zone_map` - Reverse index of the zone records
/// * `settings` - Plan settings
/// * `probe` - Reachability probe
///
/// # Returns
///
/// One stanza per inventory host. Hosts are never skipped: a host that is
/// unreachable and has no relay candidate gets a stanza with only its
/// private address.
pub async fn build_plan<P>(
    inventory: &Inventory,
    zone_map: &ZoneMap,
    settings: &PlanSettings,
    probe: &P,
) -> ConnectivityPlan
where
    P: PortProbe + ?Sized,
{
    let partitions: Vec<(String, Vec<HostRecord>)> = inventory
        .list_partitions()
        .into_iter()
        .map(|partition| {
            let hosts = inventory.partition_hosts(&partition);
            (partition, hosts)
        })
        .collect();

    let all_hosts: Vec<&HostRecord> = partitions.iter().flat_map(|(_, hosts)| hosts).collect();
    info!(
        partitions = partitions.len(),
        hosts = all_hosts.len(),
        concurrency = settings.probe_concurrency,
        "Probing hosts"
    );
    let mut ports = probe_hosts(&all_hosts, probe, settings).await.into_iter();

    let mut plan = ConnectivityPlan::default();
    for (partition, hosts) in &partitions {
        debug!(partition = %partition, "Processing partition");

        // Relay choice depends only on this partition's hosts
        let mut relay: Option<Option<String>> = None;
        let mut stanzas = Vec::with_capacity(hosts.len());

        for host in hosts {
            debug!(host = %host.id, "Processing host");
            let aliases = resolve_aliases(host, zone_map, &settings.domain);
            let port = ports.next().flatten();
            let stanza = host_stanza(
                host,
                aliases,
                port,
                || relay.get_or_insert_with(|| select_relay(partition, hosts)).clone(),
                settings,
            );
            stanzas.push(stanza);
        }

        plan.partitions.push(PartitionPlan {
            partition: partition.clone(),
            hosts: stanzas,
        });
    }

    plan
}

impl fmt::Display for HostStanza {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{STANZA_OPEN}")?;
        writeln!(f, "Host {}", self.aliases.join(" "))?;
        writeln!(f, "  ForwardAgent yes")?;
        writeln!(f, "  StrictHostKeyChecking no")?;
        writeln!(f, "  Hostname {}", self.hostname)?;
        if let Some(port) = &self.decision.port {
            writeln!(f, "  Port {port}")?;
        }
        if let Some(identity) = &self.identity {
            writeln!(f, "  User {}", identity.user)?;
            if let Some(identity_file) = &identity.identity_file {
                writeln!(f, "  IdentityFile {identity_file}")?;
            }
        }
        if let Some(relay) = &self.decision.relay {
            writeln!(f, "  ProxyJump {relay}")?;
        }
        writeln!(f, "{STANZA_CLOSE}")?;
        writeln!(f)
    }
}

/// Banner separating partitions.
pub fn render_banner(partition: &str) -> String {
    let rule = BANNER_FILL.to_string().repeat(BANNER_WIDTH);
    let mut title = format!("####   {}   #####", partition_label(partition));
    let fill = BANNER_WIDTH.saturating_sub(title.chars().count());
    title.extend(std::iter::repeat(BANNER_FILL).take(fill));
    format!("{rule}\n{title}\n{rule}\n\n")
}

impl fmt::Display for PartitionPlan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&render_banner(&self.partition))?;
        for host in &self.hosts {
            write!(f, "{host}")?;
        }
        Ok(())
    }
}

impl fmt::Display for ConnectivityPlan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for partition in &self.partitions {
            write!(f, "{partition}")?;
        }
        Ok(())
    }
}

#[cfg(test)]
#[path = "plan_tests.rs"]
mod plan_tests;
