// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Error types for bastion-sshconfig.
//!
//! This module provides specialized error types for:
//! - Missing or invalid configuration (fatal before any work starts)
//! - The inventory collaborator (script lookup, execution, output parsing)
//! - Host attribute lookups in the inventory tree
//! - Zone record acquisition (zone transfer, exported record files)
//!
//! Malformed DNS records are not errors: the zone map builder skips them.

use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while validating configuration.
///
/// These are reported together with a usage message and abort the run
/// before the inventory or DNS collaborators are contacted.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// No credential profile was given on the command line or via `AWS_PROFILE`
    #[error("AWS_PROFILE not set. Please provide one.")]
    MissingProfile,

    /// No inventory config path was given on the command line or via `EC2_INI_PATH`
    #[error("EC2_INI_PATH not set. Please provide one.")]
    MissingInventoryConfig,

    /// Probe concurrency must allow at least one probe in flight
    #[error("Probe concurrency must be at least 1, got {0}")]
    InvalidProbeConcurrency(usize),
}

/// Errors from the inventory collaborator and the inventory tree.
#[derive(Error, Debug)]
pub enum InventoryError {
    /// The inventory script could not be located or is not executable
    #[error("inventory script {script} not found")]
    ScriptNotFound {
        /// Script name or path as configured
        script: String,
    },

    /// The inventory script could not be started
    #[error("Failed to execute inventory script {}: {source}", path.display())]
    ScriptSpawn {
        /// Resolved script path
        path: PathBuf,
        /// Underlying IO error
        #[source]
        source: std::io::Error,
    },

    /// The inventory script exited unsuccessfully
    ///
    /// Carries the script's standard error so it can be shown to the user verbatim.
    #[error("inventory script {} exited with status {status}: {stderr}", path.display())]
    ScriptFailed {
        /// Resolved script path
        path: PathBuf,
        /// Exit status description
        status: String,
        /// Captured standard error of the script
        stderr: String,
    },

    /// The inventory output is not valid inventory JSON
    #[error("Failed to parse inventory JSON: {0}")]
    Parse(#[from] serde_json::Error),

    /// The requested host has no entry in the inventory metadata
    #[error("Host '{host}' not found in inventory metadata")]
    HostNotFound {
        /// Host id
        host: String,
    },

    /// The requested attribute is not set for the host
    #[error("Attribute '{key}' not found for host '{host}'")]
    AttributeNotFound {
        /// Host id
        host: String,
        /// Attribute key
        key: String,
    },
}

/// Errors from zone record acquisition.
#[derive(Error, Debug)]
pub enum ZoneSourceError {
    /// Nameserver address is not a valid `host:port` socket address
    #[error("Invalid nameserver address '{0}'")]
    InvalidNameserver(String),

    /// Zone name could not be parsed as a DNS name
    #[error("Invalid zone name '{zone}': {reason}")]
    InvalidZoneName {
        /// Zone name as configured
        zone: String,
        /// Parser message
        reason: String,
    },

    /// The zone transfer failed (connection, refusal, or protocol error)
    #[error("Zone transfer of '{zone}' from {server} failed: {reason}")]
    TransferFailed {
        /// Zone name
        zone: String,
        /// Nameserver address
        server: String,
        /// Specific reason for the failure
        reason: String,
    },

    /// The exported zone record file could not be read
    #[error("Failed to read zone export {}: {source}", path.display())]
    ExportRead {
        /// File path
        path: PathBuf,
        /// Underlying IO error
        #[source]
        source: std::io::Error,
    },

    /// The exported zone record file is not valid JSON of the expected shape
    #[error("Failed to parse zone export {}: {source}", path.display())]
    ExportParse {
        /// File path
        path: PathBuf,
        /// Underlying JSON error
        #[source]
        source: serde_json::Error,
    },
}

#[cfg(test)]
#[path = "errors_tests.rs"]
mod errors_tests;
