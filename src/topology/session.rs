use std::collections::{BTreeMap, HashMap};

use serde::Serialize;
use tracing::debug;

use crate::layout::{LayoutStrategy, PositionedNode, layout};

use super::model::{ConnectionId, Dataset, Direction, EditError};
use super::visibility::{
    ExpansionState, VisibleEdge, VisibleSubgraph, expand_all_from, resolve_visible,
};

/// Everything the view needs to draw one frame of the graph.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct Scene {
    pub focal: Option<String>,
    pub strategy: LayoutStrategy,
    pub nodes: Vec<PositionedNode>,
    pub edges: Vec<VisibleEdge>,
    /// Outgoing connection counts for the visible nodes that have any.
    pub child_counts: BTreeMap<String, usize>,
}

impl Scene {
    pub fn node(&self, id: &str) -> Option<&PositionedNode> {
        self.nodes.iter().find(|node| node.asset.id == id)
    }
}

/// Exploration state of one user: the dataset plus focal asset, expansion
/// state and layout choice. Derived data is recomputed on demand.
#[derive(Clone, Debug)]
pub struct Session {
    dataset: Dataset,
    focal: Option<String>,
    expanded: ExpansionState,
    strategy: LayoutStrategy,
    child_counts: HashMap<String, usize>,
}

impl Session {
    pub fn new(dataset: Dataset) -> Self {
        let child_counts = dataset.child_counts();
        Self {
            dataset,
            focal: None,
            expanded: ExpansionState::new(),
            strategy: LayoutStrategy::default(),
            child_counts,
        }
    }

    pub fn dataset(&self) -> &Dataset {
        &self.dataset
    }

    pub fn focal(&self) -> Option<&str> {
        self.focal.as_deref()
    }

    pub fn expanded(&self) -> &ExpansionState {
        &self.expanded
    }

    pub fn is_expanded(&self, id: &str) -> bool {
        self.expanded.contains(id)
    }

    pub fn strategy(&self) -> LayoutStrategy {
        self.strategy
    }

    pub fn child_count(&self, id: &str) -> usize {
        self.child_counts.get(id).copied().unwrap_or(0)
    }

    /// Focuses `id`; expansion restarts from the new focal asset alone.
    pub fn select_focal(&mut self, id: impl Into<String>) {
        let id = id.into();
        debug!(focal = %id, "selected focal asset");
        self.expanded = ExpansionState::from_iter([id.as_str()]);
        self.focal = Some(id);
    }

    pub fn clear_focal(&mut self) {
        self.focal = None;
        self.expanded.clear();
    }

    /// Returns whether `id` is expanded after the toggle.
    pub fn toggle_expansion(&mut self, id: &str) -> bool {
        self.expanded.toggle(id)
    }

    pub fn expand_all(&mut self) {
        if let Some(focal) = &self.focal {
            self.expanded = expand_all_from(&self.dataset, focal);
        }
    }

    pub fn collapse_all(&mut self) {
        self.expanded.clear();
    }

    pub fn set_strategy(&mut self, strategy: LayoutStrategy) {
        self.strategy = strategy;
    }

    pub fn add_connection(
        &mut self,
        source: &str,
        target: &str,
        label: &str,
    ) -> Result<ConnectionId, EditError> {
        let id = self.dataset.add_connection(source, target, label)?;
        self.refresh_child_counts();
        Ok(id)
    }

    pub fn remove_connection(&mut self, source: &str, target: &str) -> usize {
        let removed = self.dataset.remove_connection(source, target);
        self.refresh_child_counts();
        removed
    }

    pub fn remove_connection_by_direction(
        &mut self,
        focal_id: &str,
        other_id: &str,
        direction: Direction,
    ) -> usize {
        let removed = self
            .dataset
            .remove_connection_by_direction(focal_id, other_id, direction);
        self.refresh_child_counts();
        removed
    }

    fn refresh_child_counts(&mut self) {
        self.child_counts = self.dataset.child_counts();
    }

    pub fn visible(&self) -> VisibleSubgraph {
        resolve_visible(&self.dataset, self.focal.as_deref(), &self.expanded)
    }

    pub fn scene(&self) -> Scene {
        let VisibleSubgraph { nodes, edges } = self.visible();
        let positioned = layout(&nodes, &edges, self.strategy);
        let child_counts = positioned
            .iter()
            .filter_map(|node| {
                let count = self.child_count(&node.asset.id);
                (count > 0).then(|| (node.asset.id.clone(), count))
            })
            .collect();

        Scene {
            focal: self.focal.clone(),
            strategy: self.strategy,
            nodes: positioned,
            edges,
            child_counts,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::Point;
    use crate::topology::model::{Asset, Connection, SERVERS_TYPE, SYSTEM_TYPE};

    fn session() -> Session {
        Session::new(Dataset::new(
            vec![
                Asset::new("sys-1", "Mail", SYSTEM_TYPE),
                Asset::new("sys-2", "HR", SYSTEM_TYPE),
                Asset::new("a", "A", "Hardware"),
                Asset::new("srv", "Server", SERVERS_TYPE),
            ],
            vec![
                Connection::new("sys-1", "a", "hosts"),
                Connection::new("a", "srv", "runs"),
            ],
        ))
    }

    #[test]
    fn test_empty_scene_without_focal() {
        let scene = session().scene();
        assert!(scene.nodes.is_empty());
        assert!(scene.edges.is_empty());
        assert!(scene.focal.is_none());
    }

    #[test]
    fn test_select_focal_resets_expansion() {
        let mut session = session();
        session.select_focal("sys-1");
        session.toggle_expansion("a");
        assert!(session.is_expanded("a"));

        session.select_focal("sys-2");
        assert!(session.is_expanded("sys-2"));
        assert!(!session.is_expanded("a"));
        assert_eq!(session.expanded().len(), 1);
    }

    #[test]
    fn test_toggle_reveals_and_hides() {
        let mut session = session();
        session.select_focal("sys-1");
        assert_eq!(session.scene().nodes.len(), 2);

        assert!(session.toggle_expansion("a"));
        assert_eq!(session.scene().nodes.len(), 3);

        assert!(!session.toggle_expansion("a"));
        assert_eq!(session.scene().nodes.len(), 2);
    }

    #[test]
    fn test_expand_and_collapse_all() {
        let mut session = session();
        session.select_focal("sys-1");
        session.expand_all();
        assert_eq!(session.scene().nodes.len(), 3);

        session.collapse_all();
        assert_eq!(session.expanded().len(), 0);
        // The focal asset always reveals its neighbors.
        assert_eq!(session.scene().nodes.len(), 2);
    }

    #[test]
    fn test_edits_refresh_child_counts() {
        let mut session = session();
        assert_eq!(session.child_count("sys-2"), 0);

        session.add_connection("sys-2", "a", "Uses").unwrap();
        assert_eq!(session.child_count("sys-2"), 1);

        assert!(session.add_connection("sys-2", "sys-2", "Uses").is_err());
        assert!(session.add_connection("sys-2", "a", "hosts").is_err());
        assert_eq!(session.dataset().connections.len(), 3);

        session.remove_connection_by_direction("a", "sys-2", Direction::Incoming);
        assert_eq!(session.child_count("sys-2"), 0);
        assert_eq!(session.dataset().connections.len(), 2);
    }

    #[test]
    fn test_edit_is_visible_after_recompute() {
        let mut session = session();
        session.select_focal("sys-2");
        assert_eq!(session.scene().nodes.len(), 1);

        session.add_connection("sys-2", "a", "Uses").unwrap();
        let scene = session.scene();
        assert_eq!(scene.nodes.len(), 2);
        assert_eq!(scene.child_counts.get("sys-2"), Some(&1));

        session.remove_connection("sys-2", "a");
        assert_eq!(session.scene().nodes.len(), 1);
    }

    #[test]
    fn test_scene_uses_selected_strategy() {
        let mut session = session();
        session.select_focal("sys-1");
        session.set_strategy(LayoutStrategy::Star);

        let scene = session.scene();
        assert_eq!(scene.strategy, LayoutStrategy::Star);
        assert_eq!(scene.node("sys-1").unwrap().position, Point::ORIGIN);
        assert!((scene.node("a").unwrap().position.x - 180.0).abs() < 1e-9);
    }

    #[test]
    fn test_scene_serializes_flat_nodes() {
        let mut session = session();
        session.select_focal("sys-1");
        let value = serde_json::to_value(session.scene()).unwrap();

        assert_eq!(value["strategy"], "tree");
        assert_eq!(value["nodes"][0]["id"], "sys-1");
        assert_eq!(value["nodes"][0]["type"], "System");
        assert_eq!(value["nodes"][0]["anchor_in"], "top");
        assert_eq!(value["edges"][0]["key"], "e0");
        assert_eq!(value["edges"][0]["source"], "sys-1");
        assert_eq!(value["child_counts"]["sys-1"], 1);
    }
}
