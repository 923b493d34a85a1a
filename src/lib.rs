// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! # bastion-sshconfig - SSH configuration from cloud inventory and DNS
//!
//! Turns two independent sources of truth, a compute inventory (hosts grouped
//! into network partitions) and a DNS zone, into SSH client configuration:
//! for each host, which names address it, whether it is reachable directly,
//! and which bastion in its partition to jump through when it is not.
//!
//! ## Modules
//!
//! - [`zone_map`] - Reverse index from addresses and names to DNS names
//! - [`zone_source`] - Zone transfer and zone export readers
//! - [`inventory`] - Typed view over the inventory tree and the inventory script
//! - [`probe`] - TCP reachability probing with port fallback
//! - [`aliases`] - Per-host alias resolution
//! - [`relay`] - Per-partition relay (bastion) selection
//! - [`plan`] - Plan synthesis and SSH config rendering
//! - [`settings`] - Plan settings
//! - [`cli`] - Command-line surface
//! - [`telemetry`] - Logging setup
//!
//! ## Example
//!
//! ```rust,no_run
//! use bastion_sshconfig::inventory::Inventory;
//! use bastion_sshconfig::plan::build_plan;
//! use bastion_sshconfig::probe::TcpProbe;
//! use bastion_sshconfig::settings::PlanSettings;
//! use bastion_sshconfig::zone_map::{ZoneMap, ZoneRecord};
//!
//! # async fn example(inventory_json: &str) -> anyhow::Result<()> {
//! let inventory = Inventory::from_json(inventory_json)?;
//! let zone_map = ZoneMap::build(&[ZoneRecord::new("web-1.example.com.", "A", "203.0.113.5")]);
//!
//! let plan = build_plan(&inventory, &zone_map, &PlanSettings::default(), &TcpProbe::default()).await;
//! print!("{plan}");
//! # Ok(())
//! # }
//! ```

pub mod aliases;
pub mod cli;
pub mod constants;
pub mod errors;
pub mod inventory;
pub mod plan;
pub mod probe;
pub mod relay;
pub mod settings;
pub mod telemetry;
pub mod zone_map;
pub mod zone_source;
