use std::collections::{HashSet, VecDeque};

use serde::Serialize;
use tracing::{debug, warn};

use super::model::{Asset, Connection, DATABASES_TYPE, Dataset, EdgeKey, SERVERS_TYPE};

/// Asset ids whose neighbors are revealed during hierarchical traversal.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ExpansionState {
    ids: HashSet<String>,
}

impl ExpansionState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contains(&self, id: &str) -> bool {
        self.ids.contains(id)
    }

    pub fn insert(&mut self, id: impl Into<String>) -> bool {
        self.ids.insert(id.into())
    }

    /// Flips membership and returns whether `id` is expanded afterwards.
    pub fn toggle(&mut self, id: &str) -> bool {
        if self.ids.remove(id) {
            false
        } else {
            self.ids.insert(id.to_owned());
            true
        }
    }

    pub fn clear(&mut self) {
        self.ids.clear();
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

}

impl<S: Into<String>> FromIterator<S> for ExpansionState {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self {
            ids: iter.into_iter().map(Into::into).collect(),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TraversalMode {
    /// Focal asset plus its one-hop neighbors, expansion state ignored.
    DirectNeighbors,
    /// Breadth-first reveal through the focal asset and expanded assets.
    Hierarchical,
}

impl TraversalMode {
    pub fn for_asset_type(asset_type: &str) -> Self {
        if asset_type == DATABASES_TYPE || asset_type == SERVERS_TYPE {
            Self::DirectNeighbors
        } else {
            Self::Hierarchical
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct VisibleEdge {
    pub key: EdgeKey,
    #[serde(flatten)]
    pub connection: Connection,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct VisibleSubgraph {
    pub nodes: Vec<Asset>,
    pub edges: Vec<VisibleEdge>,
}

/// Ids revealed so far, remembering the order they were first seen in.
#[derive(Default)]
struct Reveal {
    seen: HashSet<String>,
    discovery_order: Vec<String>,
}

impl Reveal {
    fn mark(&mut self, id: &str) -> bool {
        if self.seen.contains(id) {
            return false;
        }
        self.seen.insert(id.to_owned());
        self.discovery_order.push(id.to_owned());
        true
    }
}

pub fn resolve_visible(
    dataset: &Dataset,
    focal_id: Option<&str>,
    expanded: &ExpansionState,
) -> VisibleSubgraph {
    let Some(focal_id) = focal_id else {
        return VisibleSubgraph::default();
    };

    let mode = dataset
        .asset(focal_id)
        .map(|asset| TraversalMode::for_asset_type(&asset.asset_type))
        .unwrap_or(TraversalMode::Hierarchical);

    let mut reveal = Reveal::default();
    let mut edge_mask = vec![false; dataset.connections.len()];
    reveal.mark(focal_id);

    match mode {
        TraversalMode::DirectNeighbors => {
            for (index, connection) in dataset.connections.iter().enumerate() {
                if connection.touches(focal_id) {
                    reveal.mark(&connection.source);
                    reveal.mark(&connection.target);
                    edge_mask[index] = true;
                }
            }
        }
        TraversalMode::Hierarchical => {
            let mut queue = VecDeque::from([focal_id.to_owned()]);

            while let Some(current) = queue.pop_front() {
                if current != focal_id && !expanded.contains(&current) {
                    continue;
                }

                for (index, connection) in dataset.connections.iter().enumerate() {
                    if connection.source == current {
                        if reveal.mark(&connection.target) {
                            queue.push_back(connection.target.clone());
                        }
                        edge_mask[index] = true;
                    }
                    if connection.target == current {
                        if reveal.mark(&connection.source) {
                            queue.push_back(connection.source.clone());
                        }
                        edge_mask[index] = true;
                    }
                }
            }
        }
    }

    let subgraph = assemble(dataset, &reveal, &edge_mask);
    debug!(
        focal = focal_id,
        ?mode,
        nodes = subgraph.nodes.len(),
        edges = subgraph.edges.len(),
        "resolved visible subgraph"
    );
    subgraph
}

fn assemble(dataset: &Dataset, reveal: &Reveal, edge_mask: &[bool]) -> VisibleSubgraph {
    let mut nodes = dataset
        .assets
        .iter()
        .filter(|asset| reveal.seen.contains(&asset.id))
        .cloned()
        .collect::<Vec<_>>();

    if nodes.len() < reveal.seen.len() {
        let known = nodes
            .iter()
            .map(|asset| asset.id.as_str())
            .collect::<HashSet<_>>();
        let missing = reveal
            .discovery_order
            .iter()
            .filter(|id| !known.contains(id.as_str()))
            .map(|id| Asset::placeholder(id))
            .collect::<Vec<_>>();
        for placeholder in &missing {
            warn!(id = %placeholder.id, "connection references unknown asset");
        }
        nodes.extend(missing);
    }

    let edges = dataset
        .keyed_connections()
        .filter(|(key, _)| edge_mask[key.0])
        .map(|(key, connection)| VisibleEdge {
            key,
            connection: connection.clone(),
        })
        .collect();

    VisibleSubgraph { nodes, edges }
}

/// Expansion set that opens everything reachable from `focal_id` along
/// outgoing connections, focal included.
pub fn expand_all_from(dataset: &Dataset, focal_id: &str) -> ExpansionState {
    let mut reached = ExpansionState::new();
    let mut queue = VecDeque::from([focal_id.to_owned()]);
    reached.insert(focal_id);

    while let Some(current) = queue.pop_front() {
        for connection in &dataset.connections {
            if connection.source == current && reached.insert(connection.target.clone()) {
                queue.push_back(connection.target.clone());
            }
        }
    }

    reached
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::topology::model::{Connection, SYSTEM_TYPE, UNKNOWN};

    fn ids(subgraph: &VisibleSubgraph) -> Vec<&str> {
        subgraph.nodes.iter().map(|node| node.id.as_str()).collect()
    }

    fn shows(subgraph: &VisibleSubgraph, id: &str) -> bool {
        subgraph.nodes.iter().any(|node| node.id == id)
    }

    fn expanded(ids: &[&str]) -> ExpansionState {
        ids.iter().copied().collect()
    }

    // sys-1 -> a -> b -> c, sys-1 -> db, db -> srv, x -> a
    fn sample() -> Dataset {
        Dataset::new(
            vec![
                Asset::new("sys-1", "Mail", SYSTEM_TYPE),
                Asset::new("a", "A", "Hardware"),
                Asset::new("b", "B", "Interfaces"),
                Asset::new("c", "C", "Computers"),
                Asset::new("db", "DB", DATABASES_TYPE),
                Asset::new("srv", "Server", SERVERS_TYPE),
                Asset::new("x", "X", "Printers"),
            ],
            vec![
                Connection::new("sys-1", "a", "hosts"),
                Connection::new("a", "b", "connects to"),
                Connection::new("b", "c", "connects to"),
                Connection::new("sys-1", "db", "hosts"),
                Connection::new("db", "srv", "runs"),
                Connection::new("x", "a", "Uses"),
            ],
        )
    }

    #[test]
    fn test_no_focal_is_empty() {
        let subgraph = resolve_visible(&sample(), None, &ExpansionState::new());
        assert!(subgraph.nodes.is_empty());
        assert!(subgraph.edges.is_empty());
    }

    #[test]
    fn test_focal_reveals_one_hop_when_nothing_expanded() {
        let subgraph = resolve_visible(&sample(), Some("sys-1"), &ExpansionState::new());
        assert_eq!(ids(&subgraph), vec!["sys-1", "a", "db"]);
        let keys = subgraph.edges.iter().map(|edge| edge.key).collect::<Vec<_>>();
        assert_eq!(keys, vec![EdgeKey(0), EdgeKey(3)]);
    }

    #[test]
    fn test_expanded_node_reveals_incoming_and_outgoing() {
        let subgraph = resolve_visible(&sample(), Some("sys-1"), &expanded(&["a"]));
        assert_eq!(ids(&subgraph), vec!["sys-1", "a", "b", "db", "x"]);
        assert!(!shows(&subgraph, "c"));
    }

    #[test]
    fn test_every_node_reachable_through_expanded_chain() {
        let dataset = sample();
        let state = expanded(&["a", "b"]);
        let subgraph = resolve_visible(&dataset, Some("sys-1"), &state);

        // Each non-focal node must touch the focal node or an expanded node.
        for node in &subgraph.nodes {
            if node.id == "sys-1" {
                continue;
            }
            let revealed_by_open_node = dataset.connections.iter().any(|connection| {
                let other = if connection.source == node.id {
                    &connection.target
                } else if connection.target == node.id {
                    &connection.source
                } else {
                    return false;
                };
                (other == "sys-1" || state.contains(other)) && shows(&subgraph, other)
            });
            assert!(revealed_by_open_node, "{} was not revealed", node.id);
        }
        assert!(shows(&subgraph, "c"));
    }

    #[test]
    fn test_collapse_removes_subtree() {
        let dataset = sample();
        let open = resolve_visible(&dataset, Some("sys-1"), &expanded(&["a", "b"]));
        assert!(shows(&open, "c"));

        let collapsed = resolve_visible(&dataset, Some("sys-1"), &expanded(&["b"]));
        assert_eq!(ids(&collapsed), vec!["sys-1", "a", "db"]);
    }

    #[test]
    fn test_collapse_keeps_nodes_reachable_elsewhere() {
        let mut dataset = sample();
        dataset.connections.push(Connection::new("db", "c", "serves"));

        let subgraph = resolve_visible(&dataset, Some("sys-1"), &expanded(&["db"]));
        assert!(shows(&subgraph, "c"));
        assert!(!shows(&subgraph, "b"));
    }

    #[test]
    fn test_direct_mode_ignores_expansion() {
        let dataset = sample();
        let plain = resolve_visible(&dataset, Some("db"), &ExpansionState::new());
        let with_state = resolve_visible(&dataset, Some("db"), &expanded(&["sys-1", "srv", "a"]));

        assert_eq!(ids(&plain), vec!["sys-1", "db", "srv"]);
        assert_eq!(plain, with_state);
    }

    #[test]
    fn test_cycles_terminate_and_keep_redundant_edges() {
        let mut dataset = sample();
        dataset.connections.push(Connection::new("a", "sys-1", "Triggers"));
        dataset.connections.push(Connection::new("b", "a", "Uses"));

        let subgraph = resolve_visible(&dataset, Some("sys-1"), &expanded(&["a", "b", "c"]));
        assert_eq!(ids(&subgraph), vec!["sys-1", "a", "b", "c", "db", "x"]);
        // Both back edges between already visible nodes are rendered.
        let keys = subgraph.edges.iter().map(|edge| edge.key.0).collect::<Vec<_>>();
        assert!(keys.contains(&6));
        assert!(keys.contains(&7));
    }

    #[test]
    fn test_edge_keys_are_stable() {
        let dataset = sample();
        let state = expanded(&["a"]);
        let first = resolve_visible(&dataset, Some("sys-1"), &state);
        let second = resolve_visible(&dataset, Some("sys-1"), &state);
        assert_eq!(first.edges, second.edges);

        for edge in &first.edges {
            assert_eq!(dataset.connection_by_key(edge.key), Some(&edge.connection));
        }
    }

    #[test]
    fn test_unknown_reference_becomes_placeholder() {
        let mut dataset = sample();
        dataset.connections.push(Connection::new("sys-1", "ghost", "hosts"));

        let subgraph = resolve_visible(&dataset, Some("sys-1"), &ExpansionState::new());
        let ghost = subgraph.nodes.last().unwrap();
        assert_eq!(ghost.id, "ghost");
        assert_eq!(ghost.name, UNKNOWN);
        assert_eq!(ghost.asset_type, UNKNOWN);
    }

    #[test]
    fn test_expand_all_follows_outgoing_only() {
        let state = expand_all_from(&sample(), "sys-1");
        assert_eq!(state.len(), 6);
        for id in ["sys-1", "a", "b", "c", "db", "srv"] {
            assert!(state.contains(id), "{id}");
        }
        assert!(!state.contains("x"));
    }

    #[test]
    fn test_toggle_expansion() {
        let mut state = ExpansionState::new();
        assert!(state.toggle("a"));
        assert!(state.contains("a"));
        assert!(!state.toggle("a"));
        assert_eq!(state.len(), 0);
    }
}
