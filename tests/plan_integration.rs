// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! End-to-end tests: inventory and zone data in, SSH configuration out.

mod common;

use bastion_sshconfig::plan::build_plan;
use bastion_sshconfig::probe::TcpProbe;
use bastion_sshconfig::settings::PlanSettings;
use bastion_sshconfig::zone_map::{ZoneMap, ZoneRecord};
use bastion_sshconfig::zone_source::{ZoneExportFile, ZoneSource};
use common::{inventory, stanza_lines, StaticProbe, TestHost};

fn prod_hosts() -> Vec<TestHost<'static>> {
    vec![
        TestHost::public("vpc_id_prod", "web-1", "203.0.113.5", "10.0.0.5"),
        TestHost::public("vpc_id_prod", "bastion-1", "203.0.113.9", "10.0.0.9")
            .dns_name("ec2-203-0-113-9.compute.example.net"),
    ]
}

#[tokio::test]
async fn test_unreachable_host_is_relayed_through_bastion() {
    let inventory = inventory(&prod_hosts());
    let zone_map = ZoneMap::build(&[ZoneRecord::new("web-1.example.com.", "A", "203.0.113.5")]);
    let probe = StaticProbe::with_open(&["203.0.113.9:22"]);

    let plan = build_plan(&inventory, &zone_map, &PlanSettings::default(), &probe).await;
    let rendered = plan.to_string();

    assert_eq!(
        stanza_lines(&rendered, "i-web-1"),
        vec![
            "Host i-web-1 web-1 web-1.example.com",
            "  ForwardAgent yes",
            "  StrictHostKeyChecking no",
            "  Hostname 10.0.0.5",
            "  ProxyJump bastion-1",
        ]
    );
    assert_eq!(
        stanza_lines(&rendered, "bastion-1"),
        vec![
            "Host bastion-1 i-bastion-1",
            "  ForwardAgent yes",
            "  StrictHostKeyChecking no",
            "  Hostname ec2-203-0-113-9.compute.example.net",
            "  Port 22",
        ]
    );
}

#[tokio::test]
async fn test_full_output_layout() {
    let inventory = inventory(&prod_hosts());
    let probe = StaticProbe::with_open(&["203.0.113.9:22"]);

    let plan = build_plan(&inventory, &ZoneMap::default(), &PlanSettings::default(), &probe).await;

    let expected = "\
##################################################
####   prod   ####################################
##################################################

# <--
Host bastion-1 i-bastion-1
  ForwardAgent yes
  StrictHostKeyChecking no
  Hostname ec2-203-0-113-9.compute.example.net
  Port 22
# -->

# <--
Host i-web-1 web-1
  ForwardAgent yes
  StrictHostKeyChecking no
  Hostname 10.0.0.5
  ProxyJump bastion-1
# -->

";
    assert_eq!(plan.to_string(), expected);
}

#[tokio::test]
async fn test_user_override_adds_identity() {
    let hosts = vec![
        TestHost::public("vpc_id_prod", "bastion-1", "203.0.113.9", "10.0.0.9").key("ops"),
        TestHost::private("vpc_id_prod", "db-1", "10.0.0.20"),
    ];
    let settings = PlanSettings {
        ssh_user: "deploy".to_string(),
        ambient_user: "alice".to_string(),
        ssh_key_path: "/home/alice/SSHKEYS/".to_string(),
        ..PlanSettings::default()
    };

    let plan = build_plan(&inventory(&hosts), &ZoneMap::default(), &settings, &StaticProbe::default()).await;
    let rendered = plan.to_string();

    assert_eq!(
        stanza_lines(&rendered, "bastion-1"),
        vec![
            "Host bastion-1 i-bastion-1",
            "  ForwardAgent yes",
            "  StrictHostKeyChecking no",
            "  Hostname 10.0.0.9",
            "  User deploy",
            "  IdentityFile /home/alice/SSHKEYS/ops",
            "  ProxyJump bastion-1",
        ]
    );
    // No key name, no IdentityFile line
    assert_eq!(
        stanza_lines(&rendered, "db-1"),
        vec![
            "Host db-1 i-db-1",
            "  ForwardAgent yes",
            "  StrictHostKeyChecking no",
            "  Hostname 10.0.0.20",
            "  User deploy",
            "  ProxyJump bastion-1",
        ]
    );
}

#[tokio::test]
async fn test_isolated_partition_has_no_relay() {
    let hosts = vec![
        TestHost::private("vpc_id_internal", "worker-1", "10.1.0.1"),
        TestHost::private("vpc_id_internal", "worker-2", "10.1.0.2"),
        TestHost::public("vpc_id_prod", "bastion-1", "203.0.113.9", "10.0.0.9"),
    ];
    let probe = StaticProbe::default();

    let plan = build_plan(&inventory(&hosts), &ZoneMap::default(), &PlanSettings::default(), &probe).await;
    let rendered = plan.to_string();

    assert_eq!(plan.partitions[0].partition, "vpc_id_internal");
    assert!(plan.partitions[0]
        .hosts
        .iter()
        .all(|h| h.decision.relay.is_none()));
    assert!(!stanza_lines(&rendered, "i-worker-1").contains(&"  ProxyJump bastion-1"));
    assert_eq!(probe.attempts(), vec!["203.0.113.9:22"]);
}

#[tokio::test]
async fn test_custom_port_falls_back_to_default() {
    let hosts = vec![TestHost::public("vpc_id_prod", "web-1", "203.0.113.5", "10.0.0.5")];
    let settings = PlanSettings {
        ssh_port: "2222".to_string(),
        ..PlanSettings::default()
    };
    let probe = StaticProbe::with_open(&["203.0.113.5:22"]);

    let plan = build_plan(&inventory(&hosts), &ZoneMap::default(), &settings, &probe).await;

    assert_eq!(probe.attempts(), vec!["203.0.113.5:2222", "203.0.113.5:22"]);
    assert_eq!(plan.partitions[0].hosts[0].decision.port.as_deref(), Some("22"));
    assert!(stanza_lines(&plan.to_string(), "i-web-1").contains(&"  Port 22"));
}

#[tokio::test]
async fn test_zone_export_feeds_aliases() {
    let export = r#"{
      "ResourceRecordSets": [
        {"Name": "example.com.", "Type": "SOA", "ResourceRecords": [{"Value": "ns-1.example.com. hostmaster.example.com. 1 7200 900 1209600 86400"}]},
        {"Name": "web-1.example.com.", "Type": "A", "ResourceRecords": [{"Value": "203.0.113.5"}]},
        {"Name": "www.example.com.", "Type": "CNAME", "ResourceRecords": [{"Value": "web-1.example.com"}]},
        {"Name": "pool.example.com.", "Type": "A", "ResourceRecords": [{"Value": "203.0.113.5"}, {"Value": "203.0.113.6"}]}
      ]
    }"#;
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("zone.json");
    std::fs::write(&path, export).unwrap();

    let records = ZoneExportFile::new(&path).fetch_records().await.unwrap();
    let zone_map = ZoneMap::build(records.iter());

    let hosts = vec![TestHost::public("vpc_id_prod", "web-1", "203.0.113.5", "10.0.0.5")
        .dns_name("web-1.example.com")];
    let probe = StaticProbe::with_open(&["203.0.113.5:22"]);

    let plan = build_plan(&inventory(&hosts), &zone_map, &PlanSettings::default(), &probe).await;

    // Multi-valued pool record is ignored; the CNAME is reached in one hop
    assert_eq!(
        plan.partitions[0].hosts[0].aliases,
        vec!["i-web-1", "web-1", "web-1.example.com", "www", "www.example.com"]
    );
    assert_eq!(plan.partitions[0].hosts[0].hostname, "web-1.example.com");
}

#[tokio::test]
async fn test_real_listener_is_reachable_directly() {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port = listener.local_addr().unwrap().port().to_string();

    let hosts = vec![TestHost::public("vpc_id_lab", "lab-1", "127.0.0.1", "10.9.0.1")
        .dns_name("localhost")];
    let settings = PlanSettings {
        ssh_port: port.clone(),
        ..PlanSettings::default()
    };

    let plan = build_plan(&inventory(&hosts), &ZoneMap::default(), &settings, &TcpProbe::default()).await;
    let stanza = &plan.partitions[0].hosts[0];

    assert_eq!(stanza.decision.port.as_deref(), Some(port.as_str()));
    assert_eq!(stanza.hostname, "localhost");
    assert!(stanza.decision.relay.is_none());
}

#[cfg(unix)]
#[tokio::test]
async fn test_inventory_script_to_plan() {
    use bastion_sshconfig::inventory::InventoryScript;
    use std::os::unix::fs::PermissionsExt;

    let json = common::inventory_json(&prod_hosts());
    let dir = tempfile::tempdir().unwrap();
    let json_path = dir.path().join("inventory.json");
    std::fs::write(&json_path, json).unwrap();

    let script_path = dir.path().join("ec2.py");
    std::fs::write(
        &script_path,
        format!("#!/bin/sh\ncat '{}'\n", json_path.display()),
    )
    .unwrap();
    std::fs::set_permissions(&script_path, std::fs::Permissions::from_mode(0o755)).unwrap();

    let script = InventoryScript {
        script: script_path.display().to_string(),
        profile: "prod".to_string(),
        ini_path: "/etc/ansible/ec2.ini".to_string(),
    };
    let inventory = script.fetch().await.unwrap();

    let probe = StaticProbe::with_open(&["203.0.113.9:22"]);
    let plan = build_plan(&inventory, &ZoneMap::default(), &PlanSettings::default(), &probe).await;

    assert_eq!(plan.host_count(), 2);
    assert_eq!(
        plan.partitions[0].hosts[1].decision.relay.as_deref(),
        Some("bastion-1")
    );
}
