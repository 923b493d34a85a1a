// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

use anyhow::{Context, Result};
use bastion_sshconfig::{
    cli::Cli,
    plan::build_plan,
    probe::TcpProbe,
    telemetry,
    zone_map::{ZoneMap, ZoneRecord},
};
use clap::Parser;
use std::io::Write;
use tracing::{debug, info, warn};

fn main() -> Result<()> {
    let cli = Cli::parse();

    if let Some(shell) = cli.completions {
        Cli::write_completions(shell, &mut std::io::stdout());
        return Ok(());
    }

    if let Err(e) = cli.validate() {
        eprintln!("{e}");
        eprintln!("{}", Cli::usage());
        std::process::exit(2);
    }

    telemetry::init(cli.debug);

    // Build Tokio runtime with custom thread names
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .thread_name("bastion-sshconfig")
        .enable_all()
        .build()?;

    runtime.block_on(async_main(cli))
}

async fn async_main(cli: Cli) -> Result<()> {
    let ambient_user = std::env::var("USER").unwrap_or_default();
    let settings = cli.plan_settings(&ambient_user);

    let inventory = cli
        .inventory_script()?
        .fetch()
        .await
        .context("Failed to load inventory")?;

    let records = match cli.zone_source() {
        Some(source) => {
            let description = source.describe();
            info!(source = %description, "Loading zone records");
            source
                .fetch_records()
                .await
                .with_context(|| format!("Failed to load zone records ({description})"))?
        }
        None => {
            warn!("No zone source configured, aliases come from inventory only");
            Vec::new()
        }
    };

    let zone_map = ZoneMap::build(records.iter());
    dump_zone_map(&zone_map, &records);

    let probe = TcpProbe::default();
    let plan = build_plan(&inventory, &zone_map, &settings, &probe).await;
    info!(
        partitions = plan.partitions.len(),
        hosts = plan.host_count(),
        "Connectivity plan ready"
    );

    let mut stdout = std::io::stdout().lock();
    write!(stdout, "{plan}")?;
    stdout.flush()?;

    Ok(())
}

fn dump_zone_map(zone_map: &ZoneMap, records: &[ZoneRecord]) {
    debug!(
        records = records.len(),
        keys = zone_map.len(),
        "Zone map built"
    );
    for (key, names) in zone_map.iter() {
        debug!(key = %key, names = ?names, "Zone map entry");
    }
}
