//! Built-in sample inventory used when no dataset file is given.
//!
//! Every pseudo-random choice is a stable hash of the asset id, so the demo
//! looks the same on every run.

use tracing::debug;

use crate::util::{stable_index, stable_unit};

use super::model::{Asset, AssetStatus, Connection, Dataset, SYSTEM_TYPE};

const SYSTEMS: [(&str, &str); 5] = [
    ("sys-1", "Mail Service"),
    ("sys-2", "HR"),
    ("sys-3", "Knowledge Base"),
    ("sys-4", "Billing"),
    ("sys-5", "Finance"),
];

const GENERATED_TYPES: [&str; 20] = [
    "Hardware",
    "Interfaces",
    "Computers",
    "Printers",
    "Monitors",
    "Scanners",
    "Peripheral Equipment",
    "Barcode Readers",
    "Storage Devices",
    "Communication Equipment",
    "Software Items",
    "Servers",
    "Handheld Devices",
    "Databases",
    "Mobile Devices",
    "AD Groups",
    "Permissions",
    "Settings",
    "Information Security",
    "Service",
];

const STATUSES: [AssetStatus; 4] = [
    AssetStatus::Active,
    AssetStatus::Warning,
    AssetStatus::Error,
    AssetStatus::Maintenance,
];

const EXTRA_LABELS: [&str; 3] = ["Connects to", "Depends on", "Installed on"];

const SYSTEM_LINKS: [(&str, &str, &str); 6] = [
    ("sys-1", "sys-2", "Depends on"),
    ("sys-1", "sys-5", "Depends on"),
    ("sys-2", "sys-3", "Connects to"),
    ("sys-4", "sys-5", "Depends on"),
    ("sys-4", "sys-2", "Depends on"),
    ("sys-3", "sys-1", "Connects to"),
];

pub const GENERATED_ASSETS: usize = 150;
/// Assets with a lower index never get an extra asset-to-asset connection.
const EXTRA_LINK_MIN_INDEX: usize = 10;
const EXTRA_LINK_THRESHOLD: f64 = 0.65;

fn generated_asset(index: usize) -> Asset {
    let id = format!("asset-{index}");
    let asset_type = GENERATED_TYPES[stable_index(&id, "type", GENERATED_TYPES.len())];

    let ip = matches!(asset_type, "Servers" | "Computers").then(|| {
        format!(
            "192.168.{}.{}",
            stable_index(&id, "subnet", 255),
            stable_index(&id, "host", 255)
        )
    });
    let location = format!(
        "Building {}, Floor {}",
        stable_index(&id, "building", 5) + 1,
        stable_index(&id, "floor", 10) + 1
    );

    Asset {
        name: format!("{asset_type} {}", index + 1),
        asset_type: asset_type.to_owned(),
        status: Some(STATUSES[stable_index(&id, "status", STATUSES.len())]),
        ip,
        location: Some(location),
        id,
    }
}

fn extra_link(index: usize, id: &str) -> Option<Connection> {
    if index <= EXTRA_LINK_MIN_INDEX || stable_unit(id, "link") <= EXTRA_LINK_THRESHOLD {
        return None;
    }

    let target = format!("asset-{}", stable_index(id, "target", index));
    let label = EXTRA_LABELS[stable_index(id, "label", EXTRA_LABELS.len())];
    Some(Connection::new(id, target, label))
}

pub fn demo_dataset() -> Dataset {
    let mut assets = SYSTEMS
        .iter()
        .map(|(id, name)| Asset::new(*id, *name, SYSTEM_TYPE))
        .collect::<Vec<_>>();
    let mut connections = Vec::new();

    for index in 0..GENERATED_ASSETS {
        let asset = generated_asset(index);
        let (system, _) = SYSTEMS[stable_index(&asset.id, "system", SYSTEMS.len())];
        connections.push(Connection::new(system, asset.id.as_str(), "Hosts"));
        connections.extend(extra_link(index, &asset.id));
        assets.push(asset);
    }

    connections.extend(
        SYSTEM_LINKS
            .iter()
            .map(|(source, target, label)| Connection::new(*source, *target, *label)),
    );

    debug!(
        assets = assets.len(),
        connections = connections.len(),
        "generated demo dataset"
    );
    Dataset::new(assets, connections)
}
