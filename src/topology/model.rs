use std::collections::HashMap;
use std::fmt;

use serde::{Deserialize, Serialize, Serializer};
use thiserror::Error;
use tracing::{debug, info};

pub const SYSTEM_TYPE: &str = "System";
pub const DATABASES_TYPE: &str = "Databases";
pub const SERVERS_TYPE: &str = "Servers";

/// Name and type given to ids that have no asset record.
pub const UNKNOWN: &str = "Unknown";

/// Relationship kinds offered when proposing a new connection.
pub const CONNECTION_TYPES: [&str; 11] = [
    "hosts",
    "communicates with",
    "connects to",
    "is contained by",
    "provides to",
    "Replicates to",
    "runs",
    "serves",
    "services",
    "Triggers",
    "Uses",
];

pub const DEFAULT_CONNECTION_TYPE: &str = "connects to";

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AssetStatus {
    Active,
    Warning,
    Error,
    Maintenance,
}

impl AssetStatus {
    pub fn label(self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::Warning => "warning",
            Self::Error => "error",
            Self::Maintenance => "maintenance",
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Asset {
    pub id: String,
    pub name: String,
    #[serde(rename = "type")]
    pub asset_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<AssetStatus>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ip: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
}

impl Asset {
    pub fn new(id: impl Into<String>, name: impl Into<String>, asset_type: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            asset_type: asset_type.into(),
            status: None,
            ip: None,
            location: None,
        }
    }

    /// Stand-in for an id referenced by a connection but missing from the dataset.
    pub fn placeholder(id: &str) -> Self {
        Self::new(id, UNKNOWN, UNKNOWN)
    }
}

/// Connection ids come either as numbers (edits) or strings (imported data).
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ConnectionId {
    Number(u64),
    Text(String),
}

impl fmt::Display for ConnectionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Number(value) => write!(f, "{value}"),
            Self::Text(value) => f.write_str(value),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Connection {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<ConnectionId>,
    pub source: String,
    pub target: String,
    pub label: String,
}

impl Connection {
    pub fn new(source: impl Into<String>, target: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            id: None,
            source: source.into(),
            target: target.into(),
            label: label.into(),
        }
    }

    pub fn touches(&self, asset_id: &str) -> bool {
        self.source == asset_id || self.target == asset_id
    }
}

/// Positional key of a connection in the dataset's connection list.
///
/// Rendered as `e{index}`. Keys stay valid until the connection list is
/// mutated, which is enough for click handlers to find their connection again.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EdgeKey(pub usize);

impl fmt::Display for EdgeKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "e{}", self.0)
    }
}

impl Serialize for EdgeKey {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Direction {
    Incoming,
    Outgoing,
}

#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum EditError {
    #[error("a connection from {0} to itself is not allowed")]
    SelfLoop(String),
    #[error("a connection from {from} to {to} already exists")]
    Duplicate { from: String, to: String },
}

/// One row of an asset's incoming or outgoing connection list.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ConnectionEntry {
    /// Id of the asset on the other end.
    pub id: String,
    pub name: String,
    #[serde(rename = "type")]
    pub asset_type: String,
    pub label: String,
    pub connection_key: EdgeKey,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Dataset {
    #[serde(default)]
    pub assets: Vec<Asset>,
    #[serde(default)]
    pub connections: Vec<Connection>,
}

impl Dataset {
    pub fn new(assets: Vec<Asset>, connections: Vec<Connection>) -> Self {
        Self {
            assets,
            connections,
        }
    }

    pub fn asset(&self, id: &str) -> Option<&Asset> {
        self.assets.iter().find(|asset| asset.id == id)
    }

    pub fn assets_of_type<'a>(&'a self, asset_type: &'a str) -> impl Iterator<Item = &'a Asset> + 'a {
        self.assets
            .iter()
            .filter(move |asset| asset.asset_type == asset_type)
    }

    pub fn keyed_connections(&self) -> impl Iterator<Item = (EdgeKey, &Connection)> {
        self.connections
            .iter()
            .enumerate()
            .map(|(index, connection)| (EdgeKey(index), connection))
    }

    pub fn connection_by_key(&self, key: EdgeKey) -> Option<&Connection> {
        self.connections.get(key.0)
    }

    /// Number of outgoing connections per source asset.
    pub fn child_counts(&self) -> HashMap<String, usize> {
        let mut counts = HashMap::new();
        for connection in &self.connections {
            *counts.entry(connection.source.clone()).or_insert(0) += 1;
        }
        counts
    }

    pub fn incoming(&self, asset_id: &str) -> Vec<ConnectionEntry> {
        self.keyed_connections()
            .filter(|(_, connection)| connection.target == asset_id)
            .map(|(key, connection)| self.entry_for(&connection.source, &connection.label, key))
            .collect()
    }

    pub fn outgoing(&self, asset_id: &str) -> Vec<ConnectionEntry> {
        self.keyed_connections()
            .filter(|(_, connection)| connection.source == asset_id)
            .map(|(key, connection)| self.entry_for(&connection.target, &connection.label, key))
            .collect()
    }

    fn entry_for(&self, other_id: &str, label: &str, key: EdgeKey) -> ConnectionEntry {
        let (name, asset_type) = match self.asset(other_id) {
            Some(asset) => (asset.name.clone(), asset.asset_type.clone()),
            None => (UNKNOWN.to_owned(), UNKNOWN.to_owned()),
        };

        ConnectionEntry {
            id: other_id.to_owned(),
            name,
            asset_type,
            label: label.to_owned(),
            connection_key: key,
        }
    }

    fn next_connection_id(&self) -> u64 {
        self.connections
            .iter()
            .filter_map(|connection| match connection.id {
                Some(ConnectionId::Number(value)) => Some(value),
                _ => None,
            })
            .max()
            .map_or(1, |max| max + 1)
    }

    /// Appends `source -> target`. The label does not take part in the
    /// duplicate check: the first connection for an ordered pair wins.
    pub fn add_connection(
        &mut self,
        source: &str,
        target: &str,
        label: &str,
    ) -> Result<ConnectionId, EditError> {
        if source == target {
            debug!(asset = source, "rejected self-loop connection");
            return Err(EditError::SelfLoop(source.to_owned()));
        }

        if self
            .connections
            .iter()
            .any(|connection| connection.source == source && connection.target == target)
        {
            debug!(source, target, "rejected duplicate connection");
            return Err(EditError::Duplicate {
                from: source.to_owned(),
                to: target.to_owned(),
            });
        }

        let id = ConnectionId::Number(self.next_connection_id());
        self.connections.push(Connection {
            id: Some(id.clone()),
            source: source.to_owned(),
            target: target.to_owned(),
            label: label.to_owned(),
        });
        info!(%id, source, target, label, "added connection");
        Ok(id)
    }

    /// Removes every connection with exactly this ordered pair.
    pub fn remove_connection(&mut self, source: &str, target: &str) -> usize {
        let before = self.connections.len();
        self.connections
            .retain(|connection| !(connection.source == source && connection.target == target));
        let removed = before - self.connections.len();
        if removed > 0 {
            info!(source, target, removed, "removed connection");
        }
        removed
    }

    pub fn remove_connection_by_direction(
        &mut self,
        focal_id: &str,
        other_id: &str,
        direction: Direction,
    ) -> usize {
        match direction {
            Direction::Outgoing => self.remove_connection(focal_id, other_id),
            Direction::Incoming => self.remove_connection(other_id, focal_id),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn two_systems() -> Dataset {
        Dataset::new(
            vec![
                Asset::new("sys-1", "Mail Service", SYSTEM_TYPE),
                Asset::new("sys-2", "HR", SYSTEM_TYPE),
            ],
            Vec::new(),
        )
    }

    #[test]
    fn test_add_connection_assigns_first_id() {
        let mut dataset = two_systems();
        let id = dataset
            .add_connection("sys-1", "sys-2", "connects to")
            .unwrap();
        assert_eq!(id, ConnectionId::Number(1));
        assert_eq!(dataset.connections.len(), 1);
    }

    #[test]
    fn test_add_connection_uses_max_numeric_id() {
        let mut dataset = two_systems();
        dataset.connections.push(Connection {
            id: Some(ConnectionId::Number(7)),
            ..Connection::new("sys-2", "sys-1", "hosts")
        });
        dataset.connections.push(Connection {
            id: Some(ConnectionId::Text("legacy".into())),
            ..Connection::new("sys-2", "sys-3", "hosts")
        });

        let id = dataset.add_connection("sys-1", "sys-2", "Uses").unwrap();
        assert_eq!(id, ConnectionId::Number(8));
    }

    #[test]
    fn test_self_loop_rejected() {
        let mut dataset = two_systems();
        let result = dataset.add_connection("sys-1", "sys-1", "connects to");
        assert_eq!(result, Err(EditError::SelfLoop("sys-1".into())));
        assert!(dataset.connections.is_empty());
    }

    #[test]
    fn test_duplicate_pair_rejected_regardless_of_label() {
        let mut dataset = two_systems();
        dataset
            .add_connection("sys-1", "sys-2", "connects to")
            .unwrap();
        let result = dataset.add_connection("sys-1", "sys-2", "hosts");

        assert!(matches!(result, Err(EditError::Duplicate { .. })));
        assert_eq!(dataset.connections.len(), 1);
        assert_eq!(dataset.connections[0].label, "connects to");

        // The reverse direction is a different pair.
        assert!(dataset.add_connection("sys-2", "sys-1", "hosts").is_ok());
        assert_eq!(dataset.connections.len(), 2);
    }

    #[test]
    fn test_remove_connection_exact_pair() {
        let mut dataset = two_systems();
        dataset.connections.push(Connection::new("sys-1", "sys-2", "hosts"));
        dataset.connections.push(Connection::new("sys-1", "sys-2", "runs"));
        dataset.connections.push(Connection::new("sys-2", "sys-1", "hosts"));

        assert_eq!(dataset.remove_connection("sys-1", "sys-2"), 2);
        assert_eq!(dataset.connections.len(), 1);
        assert_eq!(dataset.remove_connection("sys-1", "sys-2"), 0);
    }

    #[test]
    fn test_remove_by_direction_inverts_add() {
        let mut dataset = two_systems();
        dataset.connections.push(Connection::new("sys-2", "sys-1", "hosts"));
        let before = dataset.connections.len();

        dataset.add_connection("sys-1", "sys-2", "Uses").unwrap();
        dataset.remove_connection_by_direction("sys-1", "sys-2", Direction::Outgoing);
        assert_eq!(dataset.connections.len(), before);

        dataset.add_connection("sys-1", "sys-2", "Uses").unwrap();
        dataset.remove_connection_by_direction("sys-2", "sys-1", Direction::Incoming);
        assert_eq!(dataset.connections.len(), before);
        assert_eq!(dataset.connections[0].source, "sys-2");
    }

    #[test]
    fn test_child_counts_count_outgoing_only() {
        let mut dataset = two_systems();
        dataset.connections.push(Connection::new("sys-1", "sys-2", "hosts"));
        dataset.connections.push(Connection::new("sys-1", "asset-1", "hosts"));

        let counts = dataset.child_counts();
        assert_eq!(counts.get("sys-1"), Some(&2));
        assert_eq!(counts.get("sys-2"), None);
    }

    #[test]
    fn test_incoming_outgoing_entries() {
        let mut dataset = two_systems();
        dataset.connections.push(Connection::new("sys-1", "sys-2", "hosts"));
        dataset.connections.push(Connection::new("ghost", "sys-2", "Uses"));

        let incoming = dataset.incoming("sys-2");
        assert_eq!(incoming.len(), 2);
        assert_eq!(incoming[0].id, "sys-1");
        assert_eq!(incoming[0].name, "Mail Service");
        assert_eq!(incoming[0].connection_key, EdgeKey(0));
        assert_eq!(incoming[1].name, UNKNOWN);
        assert_eq!(incoming[1].asset_type, UNKNOWN);

        let outgoing = dataset.outgoing("sys-1");
        assert_eq!(outgoing.len(), 1);
        assert_eq!(outgoing[0].id, "sys-2");
        assert_eq!(outgoing[0].label, "hosts");
    }

    #[test]
    fn test_dataset_json_round_trip_keeps_shape() {
        let raw = r#"{"assets":[{"id":"a","name":"A","type":"Servers","status":"warning","ip":"10.0.0.1"}],"connections":[{"source":"a","target":"b","label":"hosts"},{"id":3,"source":"b","target":"a","label":"Uses"}]}"#;
        let dataset: Dataset = serde_json::from_str(raw).unwrap();
        assert_eq!(dataset.assets[0].status, Some(AssetStatus::Warning));
        assert_eq!(dataset.connections[1].id, Some(ConnectionId::Number(3)));

        let value = serde_json::to_value(&dataset).unwrap();
        let expected: serde_json::Value = serde_json::from_str(raw).unwrap();
        assert_eq!(value, expected);
    }

    #[test]
    fn test_edge_key_display() {
        assert_eq!(EdgeKey(12).to_string(), "e12");
        assert_eq!(serde_json::to_string(&EdgeKey(3)).unwrap(), "\"e3\"");
    }
}
