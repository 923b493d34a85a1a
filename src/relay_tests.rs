// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Unit tests for `relay.rs`

use super::*;

fn public_host(id: &str, address: &str) -> HostRecord {
    HostRecord {
        id: id.to_string(),
        public_address: Some(address.to_string()),
        private_address: "10.0.0.1".to_string(),
        ..Default::default()
    }
}

fn private_host(id: &str) -> HostRecord {
    HostRecord {
        id: id.to_string(),
        private_address: "10.0.0.2".to_string(),
        ..Default::default()
    }
}

#[test]
fn test_bastion_substring_wins() {
    let hosts = vec![
        public_host("web-1", "203.0.113.1"),
        public_host("web-2", "203.0.113.2"),
        public_host("bastion-a", "203.0.113.3"),
    ];

    assert_eq!(select_relay("vpc_id_prod", &hosts).as_deref(), Some("bastion-a"));
}

#[test]
fn test_last_candidate_without_bastion() {
    let hosts = vec![
        public_host("web-1", "203.0.113.1"),
        public_host("web-2", "203.0.113.2"),
    ];

    assert_eq!(select_relay("vpc_id_prod", &hosts).as_deref(), Some("web-2"));
}

#[test]
fn test_last_candidate_uses_id_order_not_input_order() {
    let hosts = vec![
        public_host("web-2", "203.0.113.2"),
        public_host("web-1", "203.0.113.1"),
    ];

    assert_eq!(select_relay("vpc_id_prod", &hosts).as_deref(), Some("web-2"));
}

#[test]
fn test_first_bastion_in_id_order() {
    let hosts = vec![
        public_host("z-bastion", "203.0.113.4"),
        public_host("bastion-b", "203.0.113.3"),
        public_host("bastion-a", "203.0.113.2"),
    ];

    assert_eq!(select_relay("vpc_id_prod", &hosts).as_deref(), Some("bastion-a"));
}

#[test]
fn test_private_hosts_never_selected() {
    let hosts = vec![
        private_host("bastion-internal"),
        public_host("web-1", "203.0.113.1"),
        private_host("zz-worker"),
    ];

    assert_eq!(select_relay("vpc_id_prod", &hosts).as_deref(), Some("web-1"));
}

#[test]
fn test_no_public_hosts() {
    let hosts = vec![private_host("db-1"), private_host("db-2")];

    assert_eq!(select_relay("vpc_id_prod", &hosts), None);
}

#[test]
fn test_empty_partition() {
    assert_eq!(select_relay("vpc_id_empty", &[]), None);
}

#[test]
fn test_selection_is_repeatable() {
    let hosts = vec![
        public_host("web-1", "203.0.113.1"),
        public_host("web-2", "203.0.113.2"),
    ];

    let first = select_relay("vpc_id_prod", &hosts);
    let second = select_relay("vpc_id_prod", &hosts);

    assert_eq!(first, second);
}
