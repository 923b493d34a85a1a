// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

// Common test utilities for integration tests

#![allow(dead_code)]

use async_trait::async_trait;
use bastion_sshconfig::inventory::Inventory;
use bastion_sshconfig::probe::PortProbe;
use serde_json::{json, Map, Value};
use std::collections::HashSet;
use std::sync::Mutex;

/// Probe answering from a fixed set of open `address:port` pairs.
#[derive(Default)]
pub struct StaticProbe {
    open: HashSet<String>,
    attempts: Mutex<Vec<String>>,
}

impl StaticProbe {
    pub fn with_open(pairs: &[&str]) -> Self {
        Self {
            open: pairs.iter().map(|p| (*p).to_string()).collect(),
            attempts: Mutex::default(),
        }
    }

    /// Every `address:port` pair probed so far, in call order.
    pub fn attempts(&self) -> Vec<String> {
        self.attempts.lock().unwrap().clone()
    }
}

#[async_trait]
impl PortProbe for StaticProbe {
    async fn is_open(&self, address: &str, port: &str) -> bool {
        let pair = format!("{address}:{port}");
        self.attempts.lock().unwrap().push(pair.clone());
        self.open.contains(&pair)
    }
}

/// Host entry for [`inventory_json`].
pub struct TestHost<'a> {
    pub partition: &'a str,
    pub id: &'a str,
    pub public_address: Option<&'a str>,
    pub private_address: &'a str,
    pub public_dns_name: Option<&'a str>,
    pub key_name: Option<&'a str>,
}

impl<'a> TestHost<'a> {
    pub fn private(partition: &'a str, id: &'a str, private_address: &'a str) -> Self {
        Self {
            partition,
            id,
            public_address: None,
            private_address,
            public_dns_name: None,
            key_name: None,
        }
    }

    pub fn public(
        partition: &'a str,
        id: &'a str,
        public_address: &'a str,
        private_address: &'a str,
    ) -> Self {
        Self {
            public_address: Some(public_address),
            public_dns_name: Some(public_address),
            ..Self::private(partition, id, private_address)
        }
    }

    pub fn dns_name(mut self, name: &'a str) -> Self {
        self.public_dns_name = Some(name);
        self
    }

    pub fn key(mut self, key_name: &'a str) -> Self {
        self.key_name = Some(key_name);
        self
    }
}

/// Inventory JSON in the shape the inventory script prints.
pub fn inventory_json(hosts: &[TestHost<'_>]) -> String {
    let mut tree = Map::new();
    let mut hostvars = Map::new();
    let mut partitions: Vec<&str> = Vec::new();

    for host in hosts {
        if !partitions.contains(&host.partition) {
            partitions.push(host.partition);
        }
        tree.entry(host.partition.to_string())
            .or_insert_with(|| json!([]))
            .as_array_mut()
            .unwrap()
            .push(json!(host.id));

        hostvars.insert(
            host.id.to_string(),
            json!({
                "ec2_id": format!("i-{}", host.id),
                "ec2_ip_address": host.public_address.unwrap_or(""),
                "ec2_private_ip_address": host.private_address,
                "ec2_dns_name": host.public_dns_name.unwrap_or(""),
                "ec2_key_name": host.key_name.unwrap_or(""),
            }),
        );
    }

    tree.insert("vpcs".to_string(), json!({ "children": partitions }));
    tree.insert("_meta".to_string(), json!({ "hostvars": hostvars }));
    Value::Object(tree).to_string()
}

pub fn inventory(hosts: &[TestHost<'_>]) -> Inventory {
    Inventory::from_json(&inventory_json(hosts)).unwrap()
}

/// Lines of the stanza whose `Host` line starts with `first_alias`.
pub fn stanza_lines<'a>(rendered: &'a str, first_alias: &str) -> Vec<&'a str> {
    let header = format!("Host {first_alias}");
    rendered
        .split("# <--\n")
        .find(|block| block.lines().next().is_some_and(|l| l.starts_with(&header)))
        .map(|block| block.lines().take_while(|l| *l != "# -->").collect())
        .unwrap_or_default()
}
