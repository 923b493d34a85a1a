// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Typed read-only view over the compute inventory.
//!
//! The inventory is the JSON tree printed by a dynamic inventory script:
//!
//! ```json
//! {
//!   "vpcs": { "children": ["vpc_id_vpc-0a1b2c3d"] },
//!   "vpc_id_vpc-0a1b2c3d": ["web-1", "bastion-1"],
//!   "_meta": {
//!     "hostvars": {
//!       "web-1": {
//!         "ec2_id": "i-0123456789abcdef0",
//!         "ec2_ip_address": "203.0.113.5",
//!         "ec2_private_ip_address": "10.0.0.5",
//!         "ec2_dns_name": "ec2-203-0-113-5.compute-1.amazonaws.com",
//!         "ec2_key_name": "prod"
//!       }
//!     }
//!   }
//! }
//! ```
//!
//! Partitions are listed under the reserved `vpcs` group, each partition group
//! lists its host ids (either as a plain array or as `{"hosts": [...]}`), and
//! `_meta.hostvars` maps host ids to attributes. Attributes holding an empty
//! string or `null` are treated as absent.
//!
//! [`InventoryScript`] runs the script and parses its output into an [`Inventory`].

use crate::constants::{
    ATTR_INSTANCE_ID, ATTR_KEY_NAME, ATTR_PRIVATE_ADDRESS, ATTR_PUBLIC_ADDRESS,
    ATTR_PUBLIC_DNS_NAME, INVENTORY_CHILDREN_KEY, INVENTORY_HOSTS_KEY, INVENTORY_HOSTVARS_KEY,
    INVENTORY_INI_ENV, INVENTORY_META_KEY, INVENTORY_PARTITIONS_KEY,
};
use crate::errors::InventoryError;
use serde_json::{Map, Value};
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// One host as the core sees it.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct HostRecord {
    /// Inventory host id, unique within the inventory
    pub id: String,
    /// Cloud instance identifier
    pub instance_id: Option<String>,
    /// Public IP address, if the host has one
    pub public_address: Option<String>,
    /// Private IP address
    pub private_address: String,
    /// Public DNS name, present when the host has a public address
    pub public_dns_name: Option<String>,
    /// Name of the SSH key pair the host was launched with
    pub key_name: Option<String>,
}

impl HostRecord {
    /// Whether the host has a public address.
    pub fn is_public(&self) -> bool {
        self.public_address.is_some()
    }
}

/// Parsed inventory tree.
#[derive(Debug, Clone, Default)]
pub struct Inventory {
    tree: Map<String, Value>,
}

impl Inventory {
    /// Parse inventory JSON.
    ///
    /// # Errors
    ///
    /// Returns [`InventoryError::Parse`] if the document is not a JSON object.
    pub fn from_json(json: &str) -> Result<Self, InventoryError> {
        let tree: Map<String, Value> = serde_json::from_str(json)?;
        Ok(Self { tree })
    }

    /// Partition names, sorted lexicographically.
    pub fn list_partitions(&self) -> Vec<String> {
        let mut partitions = self
            .tree
            .get(INVENTORY_PARTITIONS_KEY)
            .map(|group| group_members(group, INVENTORY_CHILDREN_KEY))
            .unwrap_or_default();
        partitions.sort();
        partitions.dedup();

        debug!(partitions = %partitions.join(" "), "Listed partitions");
        partitions
    }

    /// Host ids of a partition, sorted lexicographically.
    ///
    /// An unknown partition has no hosts.
    pub fn list_hosts(&self, partition: &str) -> Vec<String> {
        let mut hosts = self
            .tree
            .get(partition)
            .map(|group| group_members(group, INVENTORY_HOSTS_KEY))
            .unwrap_or_default();
        hosts.sort();
        hosts.dedup();

        debug!(partition = %partition, hosts = %hosts.join(" "), "Listed partition hosts");
        hosts
    }

    /// Look up a host attribute.
    ///
    /// Non-string scalars are returned in their JSON text form.
    ///
    /// # Errors
    ///
    /// Returns [`InventoryError::HostNotFound`] if the host has no metadata and
    /// [`InventoryError::AttributeNotFound`] if the attribute is absent or empty.
    pub fn attribute(&self, host: &str, key: &str) -> Result<String, InventoryError> {
        let vars = self
            .tree
            .get(INVENTORY_META_KEY)
            .and_then(|meta| meta.get(INVENTORY_HOSTVARS_KEY))
            .and_then(|hostvars| hostvars.get(host))
            .ok_or_else(|| InventoryError::HostNotFound {
                host: host.to_string(),
            })?;

        let not_found = || InventoryError::AttributeNotFound {
            host: host.to_string(),
            key: key.to_string(),
        };

        match vars.get(key) {
            Some(Value::String(s)) if !s.is_empty() => Ok(s.clone()),
            Some(Value::Number(n)) => Ok(n.to_string()),
            Some(Value::Bool(b)) => Ok(b.to_string()),
            _ => Err(not_found()),
        }
    }

    /// Attribute value, or `None` when it is missing.
    pub fn optional_attribute(&self, host: &str, key: &str) -> Option<String> {
        self.attribute(host, key).ok()
    }

    /// Build the typed record of a host.
    ///
    /// Missing optional attributes become `None`. A missing private address
    /// falls back to the host id so the host can still be addressed by name.
    pub fn host(&self, id: &str) -> HostRecord {
        let private_address = match self.attribute(id, ATTR_PRIVATE_ADDRESS) {
            Ok(address) => address,
            Err(e) => {
                warn!(host = %id, error = %e, "No private address, addressing host by id");
                id.to_string()
            }
        };

        HostRecord {
            id: id.to_string(),
            instance_id: self.optional_attribute(id, ATTR_INSTANCE_ID),
            public_address: self.optional_attribute(id, ATTR_PUBLIC_ADDRESS),
            private_address,
            public_dns_name: self.optional_attribute(id, ATTR_PUBLIC_DNS_NAME),
            key_name: self.optional_attribute(id, ATTR_KEY_NAME),
        }
    }

    /// Typed records of all hosts in a partition, in host id order.
    pub fn partition_hosts(&self, partition: &str) -> Vec<HostRecord> {
        self.list_hosts(partition)
            .iter()
            .map(|id| self.host(id))
            .collect()
    }
}

/// Members of an inventory group.
///
/// Groups are either a plain array of names or an object holding the names
/// under `member_key`.
fn group_members(group: &Value, member_key: &str) -> Vec<String> {
    let members = match group {
        Value::Array(_) => Some(group),
        Value::Object(map) => map.get(member_key),
        _ => None,
    };

    members
        .and_then(Value::as_array)
        .map(|names| {
            names
                .iter()
                .filter_map(Value::as_str)
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default()
}

/// Locate an executable script.
///
/// A name containing a path separator is used as given; a bare name is looked
/// up on `PATH`.
pub fn find_executable(script: &str) -> Option<PathBuf> {
    let candidate = Path::new(script);
    if candidate.components().count() > 1 || candidate.is_absolute() {
        return is_executable(candidate).then(|| candidate.to_path_buf());
    }

    std::env::var_os("PATH").and_then(|paths| {
        std::env::split_paths(&paths)
            .map(|dir| dir.join(script))
            .find(|path| is_executable(path))
    })
}

#[cfg(unix)]
fn is_executable(path: &Path) -> bool {
    use std::os::unix::fs::PermissionsExt;
    path.metadata()
        .map(|m| m.is_file() && m.permissions().mode() & 0o111 != 0)
        .unwrap_or(false)
}

#[cfg(not(unix))]
fn is_executable(path: &Path) -> bool {
    path.is_file()
}

/// Dynamic inventory script collaborator.
#[derive(Debug, Clone)]
pub struct InventoryScript {
    /// Script name (looked up on `PATH`) or path
    pub script: String,
    /// Credential profile passed to the script
    pub profile: String,
    /// Inventory config path exported to the script
    pub ini_path: String,
}

impl InventoryScript {
    /// Run the script and parse its output.
    ///
    /// Runs `<script> --refresh-cache --profile <profile>` with the inventory
    /// config path in its environment.
    ///
    /// # Errors
    ///
    /// Returns an error if the script cannot be found or started, exits
    /// unsuccessfully, or prints something that is not inventory JSON.
    pub async fn fetch(&self) -> Result<Inventory, InventoryError> {
        let path = find_executable(&self.script).ok_or_else(|| InventoryError::ScriptNotFound {
            script: self.script.clone(),
        })?;
        debug!(path = %path.display(), "Found inventory script");

        info!(script = %path.display(), profile = %self.profile, "Running inventory script");
        let output = tokio::process::Command::new(&path)
            .arg("--refresh-cache")
            .arg("--profile")
            .arg(&self.profile)
            .env(INVENTORY_INI_ENV, &self.ini_path)
            .kill_on_drop(true)
            .output()
            .await
            .map_err(|source| InventoryError::ScriptSpawn {
                path: path.clone(),
                source,
            })?;

        if !output.status.success() {
            return Err(InventoryError::ScriptFailed {
                path,
                status: output.status.to_string(),
                stderr: String::from_utf8_lossy(&output.stderr).trim_end().to_string(),
            });
        }

        Inventory::from_json(&String::from_utf8_lossy(&output.stdout))
    }
}

#[cfg(test)]
#[path = "inventory_tests.rs"]
mod inventory_tests;
