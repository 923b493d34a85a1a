// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Settings that shape the connectivity plan.

use crate::constants::{DEFAULT_PROBE_CONCURRENCY, DEFAULT_SSH_KEY_PATH, DEFAULT_SSH_PORT, DEFAULT_TLD};
use crate::zone_map::normalize_name;

/// Plan settings, independent of where they were read from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlanSettings {
    /// User to connect as
    pub ssh_user: String,
    /// User running the tool; a different `ssh_user` adds `User`/`IdentityFile`
    pub ambient_user: String,
    /// Directory holding per-host key material
    pub ssh_key_path: String,
    /// Preferred SSH port
    pub ssh_port: String,
    /// Domain suffix, without a trailing separator
    pub domain: String,
    /// Probes allowed in flight at once
    pub probe_concurrency: usize,
}

impl Default for PlanSettings {
    fn default() -> Self {
        Self {
            ssh_user: String::new(),
            ambient_user: String::new(),
            ssh_key_path: DEFAULT_SSH_KEY_PATH.to_string(),
            ssh_port: DEFAULT_SSH_PORT.to_string(),
            domain: DEFAULT_TLD.to_string(),
            probe_concurrency: DEFAULT_PROBE_CONCURRENCY,
        }
    }
}

impl PlanSettings {
    /// Set the domain suffix, dropping a trailing separator.
    #[must_use]
    pub fn with_domain(mut self, domain: &str) -> Self {
        self.domain = normalize_name(domain).to_string();
        self
    }

    /// Whether stanzas need an explicit user and identity file.
    pub fn overrides_user(&self) -> bool {
        self.ssh_user != self.ambient_user
    }

    /// Identity file path for a key name.
    pub fn identity_file(&self, key_name: &str) -> String {
        format!("{}/{key_name}", self.ssh_key_path.trim_end_matches('/'))
    }
}

#[cfg(test)]
#[path = "settings_tests.rs"]
mod settings_tests;
