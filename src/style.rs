//! Visual lookup tables for asset types and connection labels.
//!
//! Colors are plain RGB triples; the viewer converts them to egui colors.

use serde::Serialize;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
pub struct Rgb(pub u8, pub u8, pub u8);

impl Rgb {
    pub const fn hex(value: u32) -> Self {
        Self((value >> 16) as u8, (value >> 8) as u8, value as u8)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct AssetStyle {
    /// Short badge text drawn in the node's icon slot.
    pub glyph: &'static str,
    pub color: Rgb,
}

const DEFAULT_ASSET_STYLE: AssetStyle = AssetStyle {
    glyph: "?",
    color: Rgb::hex(0x64748b),
};

const fn style(glyph: &'static str, color: u32) -> AssetStyle {
    AssetStyle {
        glyph,
        color: Rgb::hex(color),
    }
}

/// Asset types shown in the legend, in display order.
pub const ASSET_TYPES: [&str; 24] = [
    "System",
    "Hardware",
    "Interfaces",
    "Entitlement Packages",
    "Computers",
    "AD Groups",
    "Printers",
    "Monitors",
    "Scanners",
    "Peripheral Equipment",
    "Barcode Readers",
    "Storage Devices",
    "Communication Equipment",
    "Permissions",
    "Settings",
    "Software Items",
    "Information Security",
    "Servers",
    "Miscellaneous",
    "Handheld Devices",
    "Databases",
    "Storage and Backup",
    "Service",
    "Mobile Devices",
];

pub fn style_for(asset_type: &str) -> AssetStyle {
    match asset_type {
        "System" => style("SYS", 0x4f46e5),
        "Hardware" => style("HW", 0x78716c),
        "Interfaces" => style("IF", 0x0ea5e9),
        "Entitlement Packages" => style("PKG", 0xa16207),
        "Computers" | "Workstation" => style("PC", 0x2563eb),
        "AD Groups" => style("AD", 0x7c3aed),
        "Printers" => style("PRN", 0x57534e),
        "Monitors" => style("MON", 0x0891b2),
        "Scanners" => style("SCN", 0x0d9488),
        "Peripheral Equipment" => style("USB", 0x65a30d),
        "Barcode Readers" => style("BAR", 0x4d7c0f),
        "Storage Devices" => style("STO", 0xb45309),
        "Communication Equipment" => style("COM", 0xdb2777),
        "Permissions" => style("PRM", 0xdc2626),
        "Settings" => style("CFG", 0x6b7280),
        "Software Items" => style("SW", 0x9333ea),
        "Information Security" | "Firewall" => style("SEC", 0xbe123c),
        "Servers" | "Server" => style("SRV", 0x1d4ed8),
        "Miscellaneous" => style("MSC", 0x94a3b8),
        "Handheld Devices" => style("HHD", 0x16a34a),
        "Databases" | "Database" => style("DB", 0xea580c),
        "Storage and Backup" => style("BAK", 0x0284c7),
        "Service" => style("SVC", 0xca8a04),
        "Mobile Devices" => style("MOB", 0x059669),
        "Switch" => style("SW", 0x0f766e),
        "Router" => style("RTR", 0x15803d),
        "Load Balancer" => style("LB", 0x7e22ce),
        _ => DEFAULT_ASSET_STYLE,
    }
}

pub const UNKNOWN_CONNECTION_COLOR: Rgb = Rgb::hex(0x94a3b8);
pub const DEFAULT_CONNECTION_COLOR: Rgb = Rgb::hex(0x9ca3af);

/// Labels with a dedicated edge color, in legend order.
pub const CONNECTION_COLORS: [(&str, Rgb); 12] = [
    ("hosts", Rgb::hex(0x2563eb)),
    ("communicates with", Rgb::hex(0x10b981)),
    ("connects to", Rgb::hex(0x16a34a)),
    ("is contained by", Rgb::hex(0x8b5cf6)),
    ("provides to", Rgb::hex(0xf59e0b)),
    ("Replicates to", Rgb::hex(0x06b6d4)),
    ("runs", Rgb::hex(0xec4899)),
    ("serves", Rgb::hex(0x6366f1)),
    ("services", Rgb::hex(0x14b8a6)),
    ("Triggers", Rgb::hex(0xf97316)),
    ("Uses", Rgb::hex(0xa855f7)),
    ("unknown", UNKNOWN_CONNECTION_COLOR),
];

/// Labels match case-sensitively, so `Hosts` falls back to the default.
pub fn connection_color(label: &str) -> Rgb {
    CONNECTION_COLORS
        .iter()
        .find(|(known, _)| *known == label)
        .map_or(DEFAULT_CONNECTION_COLOR, |(_, color)| *color)
}

/// Badge color for the expand (`+`) and collapse (`-`) indicator.
pub fn expansion_badge_color(expanded: bool) -> Rgb {
    if expanded {
        Rgb::hex(0xef4444)
    } else {
        Rgb::hex(0x22c55e)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::topology::CONNECTION_TYPES;

    #[test]
    fn test_hex_components() {
        assert_eq!(Rgb::hex(0x2563eb), Rgb(0x25, 0x63, 0xeb));
    }

    #[test]
    fn test_unknown_type_uses_default() {
        assert_eq!(style_for("Toaster"), DEFAULT_ASSET_STYLE);
        assert_eq!(style_for("Unknown"), DEFAULT_ASSET_STYLE);
    }

    #[test]
    fn test_legacy_types_share_styles() {
        assert_eq!(style_for("Server"), style_for("Servers"));
        assert_eq!(style_for("Database"), style_for("Databases"));
    }

    #[test]
    fn test_every_legend_type_has_its_own_entry() {
        for asset_type in ASSET_TYPES {
            assert_ne!(style_for(asset_type), DEFAULT_ASSET_STYLE, "{asset_type}");
        }
    }

    #[test]
    fn test_connection_colors() {
        assert_eq!(connection_color("hosts"), Rgb::hex(0x2563eb));
        assert_eq!(connection_color("unknown"), UNKNOWN_CONNECTION_COLOR);
        assert_eq!(connection_color("Hosts"), DEFAULT_CONNECTION_COLOR);
        assert_eq!(connection_color(""), DEFAULT_CONNECTION_COLOR);
    }

    #[test]
    fn test_every_offered_connection_type_is_colored() {
        for label in CONNECTION_TYPES {
            assert_ne!(connection_color(label), DEFAULT_CONNECTION_COLOR, "{label}");
        }
    }
}
