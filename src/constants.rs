// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Global constants for bastion-sshconfig.
//!
//! This module contains all numeric and string constants used throughout the codebase.
//! Constants are organized by category for easy maintenance.

// ============================================================================
// SSH Constants
// ============================================================================

/// Conventional SSH port, also the fallback port for a custom preferred port
pub const DEFAULT_SSH_PORT: &str = "22";

/// Timeout for a single TCP connect attempt while probing (seconds)
pub const PROBE_TIMEOUT_SECS: u64 = 3;

/// Substring that marks a host as an explicit relay (bastion) host
pub const BASTION_MARKER: &str = "bastion";

/// Default directory holding per-host SSH key material
pub const DEFAULT_SSH_KEY_PATH: &str = "~/SSHKEYS/";

/// Default number of probes allowed in flight at once
pub const DEFAULT_PROBE_CONCURRENCY: usize = 1;

// ============================================================================
// DNS Constants
// ============================================================================

/// Default domain suffix appended to inventory host names
pub const DEFAULT_TLD: &str = "example.com";

/// Label separator in DNS names; a trailing one marks a fully-qualified name
pub const DNS_LABEL_SEPARATOR: char = '.';

/// Separator used when a record set carries several values
pub const MULTI_VALUE_SEPARATOR: char = ',';

// ============================================================================
// Inventory Constants
// ============================================================================

/// Default inventory script name, looked up on `PATH`
pub const DEFAULT_INVENTORY_SCRIPT: &str = "ec2.py";

/// Environment variable the inventory script reads its config path from
pub const INVENTORY_INI_ENV: &str = "EC2_INI_PATH";

/// Reserved top-level inventory group listing all partitions
pub const INVENTORY_PARTITIONS_KEY: &str = "vpcs";

/// Key holding child group names inside a group
pub const INVENTORY_CHILDREN_KEY: &str = "children";

/// Key holding host names inside a group written in object form
pub const INVENTORY_HOSTS_KEY: &str = "hosts";

/// Reserved top-level metadata section
pub const INVENTORY_META_KEY: &str = "_meta";

/// Metadata entry mapping host id to its attributes
pub const INVENTORY_HOSTVARS_KEY: &str = "hostvars";

/// Prefix the inventory puts in front of partition group names
pub const PARTITION_PREFIX: &str = "vpc_id_";

/// Host attribute: cloud instance identifier
pub const ATTR_INSTANCE_ID: &str = "ec2_id";

/// Host attribute: public IP address (empty when the host has none)
pub const ATTR_PUBLIC_ADDRESS: &str = "ec2_ip_address";

/// Host attribute: private IP address
pub const ATTR_PRIVATE_ADDRESS: &str = "ec2_private_ip_address";

/// Host attribute: public DNS name
pub const ATTR_PUBLIC_DNS_NAME: &str = "ec2_dns_name";

/// Host attribute: name of the SSH key pair the host was launched with
pub const ATTR_KEY_NAME: &str = "ec2_key_name";

// ============================================================================
// Output Constants
// ============================================================================

/// Width of the partition banner lines
pub const BANNER_WIDTH: usize = 50;

/// Character used to draw and pad partition banners
pub const BANNER_FILL: char = '#';

/// Marker line opening a host stanza
pub const STANZA_OPEN: &str = "# <--";

/// Marker line closing a host stanza
pub const STANZA_CLOSE: &str = "# -->";

// ============================================================================
// Logging Constants
// ============================================================================

/// Environment variable selecting the log output format (`json` or `text`)
pub const LOG_FORMAT_ENV: &str = "RUST_LOG_FORMAT";

/// Default log filter
pub const DEFAULT_LOG_LEVEL: &str = "warn";

/// Log filter used when diagnostics are requested
pub const DEBUG_LOG_LEVEL: &str = "debug";
