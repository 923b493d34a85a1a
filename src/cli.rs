// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Command-line surface.
//!
//! Options fall back to the same environment variables the inventory tooling
//! uses (`AWS_PROFILE`, `EC2_INI_PATH`, `USER`). The credential profile and the
//! inventory config path are required, but are validated after parsing so that
//! `--completions` works without them.

use crate::constants::{
    DEFAULT_INVENTORY_SCRIPT, DEFAULT_PROBE_CONCURRENCY, DEFAULT_SSH_KEY_PATH, DEFAULT_SSH_PORT,
    DEFAULT_TLD,
};
use crate::errors::ConfigError;
use crate::inventory::InventoryScript;
use crate::settings::PlanSettings;
use crate::zone_map::normalize_name;
use crate::zone_source::{ZoneExportFile, ZoneSource, ZoneTransfer};
use clap::{CommandFactory, Parser};
use clap_complete::Shell;
use std::io::Write;
use std::path::PathBuf;

/// Generate SSH client configuration for cloud hosts from inventory and DNS data.
#[derive(Parser, Debug, Clone)]
#[command(name = "bastion-sshconfig")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Credential profile passed to the inventory script
    #[arg(long, env = "AWS_PROFILE")]
    pub profile: Option<String>,

    /// Inventory script to run (looked up on PATH unless it is a path)
    #[arg(long, default_value = DEFAULT_INVENTORY_SCRIPT)]
    pub inventory_script: String,

    /// Inventory config file passed to the script
    #[arg(long, env = "EC2_INI_PATH")]
    pub inventory_ini: Option<String>,

    /// SSH username
    #[arg(long, env = "USER", default_value = "")]
    pub ssh_user: String,

    /// Directory holding SSH keys, named after each host's key pair
    #[arg(long, default_value = DEFAULT_SSH_KEY_PATH)]
    pub ssh_key_path: String,

    /// Preferred SSH port; port 22 is tried as a fallback
    #[arg(long, default_value = DEFAULT_SSH_PORT)]
    pub ssh_port: String,

    /// Domain appended to host names
    #[arg(long, default_value = DEFAULT_TLD)]
    pub tld: String,

    /// Nameserver (host:port) to transfer the zone from
    #[arg(long, conflicts_with = "zone_file")]
    pub nameserver: Option<String>,

    /// Exported record-set listing (JSON) to read the zone from
    #[arg(long)]
    pub zone_file: Option<PathBuf>,

    /// Number of reachability probes in flight at once
    #[arg(long, default_value_t = DEFAULT_PROBE_CONCURRENCY)]
    pub probe_concurrency: usize,

    /// Enable debug diagnostics on stderr
    #[arg(long)]
    pub debug: bool,

    /// Print a shell completion script and exit
    #[arg(long, value_name = "SHELL")]
    pub completions: Option<Shell>,
}

impl Cli {
    /// Check that the required settings are present and sane.
    ///
    /// # Errors
    ///
    /// Returns the first missing or invalid setting.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.profile.as_deref().is_none_or(str::is_empty) {
            return Err(ConfigError::MissingProfile);
        }
        if self.inventory_ini.as_deref().is_none_or(str::is_empty) {
            return Err(ConfigError::MissingInventoryConfig);
        }
        if self.probe_concurrency == 0 {
            return Err(ConfigError::InvalidProbeConcurrency(self.probe_concurrency));
        }
        Ok(())
    }

    /// Domain suffix without a trailing separator.
    pub fn domain(&self) -> &str {
        normalize_name(&self.tld)
    }

    /// Plan settings for this invocation.
    pub fn plan_settings(&self, ambient_user: &str) -> PlanSettings {
        PlanSettings {
            ssh_user: self.ssh_user.clone(),
            ambient_user: ambient_user.to_string(),
            ssh_key_path: self.ssh_key_path.clone(),
            ssh_port: self.ssh_port.clone(),
            domain: self.domain().to_string(),
            probe_concurrency: self.probe_concurrency,
        }
    }

    /// Inventory collaborator for this invocation.
    ///
    /// # Errors
    ///
    /// Returns an error if the profile or inventory config path is missing.
    pub fn inventory_script(&self) -> Result<InventoryScript, ConfigError> {
        let profile = self.profile.clone().ok_or(ConfigError::MissingProfile)?;
        let ini_path = self
            .inventory_ini
            .clone()
            .ok_or(ConfigError::MissingInventoryConfig)?;

        Ok(InventoryScript {
            script: self.inventory_script.clone(),
            profile,
            ini_path,
        })
    }

    /// Zone source for this invocation, if one was configured.
    pub fn zone_source(&self) -> Option<Box<dyn ZoneSource>> {
        if let Some(path) = &self.zone_file {
            return Some(Box::new(ZoneExportFile::new(path)));
        }
        self.nameserver.as_ref().map(|nameserver| {
            Box::new(ZoneTransfer {
                nameserver: nameserver.clone(),
                zone: self.domain().to_string(),
            }) as Box<dyn ZoneSource>
        })
    }

    /// Short usage line.
    pub fn usage() -> String {
        Self::command().render_usage().to_string()
    }

    /// Write the completion script for `shell`.
    pub fn write_completions(shell: Shell, out: &mut dyn Write) {
        let mut command = Self::command();
        let name = command.get_name().to_string();
        clap_complete::generate(shell, &mut command, name, out);
    }
}

#[cfg(test)]
#[path = "cli_tests.rs"]
mod cli_tests;
