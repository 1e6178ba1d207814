use eframe::egui::{Rect, Vec2, pos2};

use crate::layout::{LayoutStrategy, NODE_HEIGHT, NODE_WIDTH, position_shift};
use crate::topology::{ConnectionId, Direction, EditError, Scene};

use super::super::render_utils::point_vec;
use super::super::{Selection, ViewModel};

const FIT_MARGIN: f32 = 60.0;

/// World-space box around every card of `scene`.
fn world_bounds(scene: &Scene) -> Option<Rect> {
    scene
        .nodes
        .iter()
        .map(|node| {
            let min = pos2(node.position.x as f32, node.position.y as f32);
            Rect::from_min_size(min, Vec2::new(NODE_WIDTH as f32, NODE_HEIGHT as f32))
        })
        .reduce(|bounds, card| bounds.union(card))
}

impl ViewModel {
    /// Recomputes the scene after a state change. A pinned node keeps its
    /// screen position by moving the camera along with it.
    pub(in crate::app) fn refresh_scene(&mut self) {
        if !self.scene_dirty {
            return;
        }

        let scene = self.session.scene();
        if let Some(id) = self.pinned.take()
            && let Some(shift) = position_shift(&self.scene.nodes, &scene.nodes, &id)
            && shift.length() > 0.0
        {
            self.pan -= point_vec(shift) * self.zoom;
        }

        self.scene = scene;
        self.scene_dirty = false;
    }

    pub(in crate::app) fn fit_view(&mut self, rect: Rect) {
        self.fit_requested = false;

        let Some(bounds) = world_bounds(&self.scene) else {
            self.pan = Vec2::ZERO;
            self.zoom = 1.0;
            return;
        };

        let available = (rect.size() - Vec2::splat(FIT_MARGIN * 2.0)).max(Vec2::splat(1.0));
        let zoom_x = available.x / bounds.width().max(1.0);
        let zoom_y = available.y / bounds.height().max(1.0);
        self.zoom = zoom_x.min(zoom_y).clamp(0.1, 1.25);
        self.pan = -bounds.center().to_vec2() * self.zoom;
    }

    pub(in crate::app) fn focus_asset(&mut self, id: &str) {
        self.session.select_focal(id);
        self.focal_search.clear();
        self.selection = None;
        self.pinned = None;
        self.status = None;
        self.fit_requested = true;
        self.scene_dirty = true;
    }

    pub(in crate::app) fn clear_focus(&mut self) {
        self.session.clear_focal();
        self.selection = None;
        self.pinned = None;
        self.fit_requested = true;
        self.scene_dirty = true;
    }

    pub(in crate::app) fn toggle_node(&mut self, id: &str) {
        self.session.toggle_expansion(id);
        self.pinned = Some(id.to_owned());
        self.scene_dirty = true;
    }

    pub(in crate::app) fn expand_all(&mut self) {
        self.session.expand_all();
        self.fit_requested = true;
        self.scene_dirty = true;
    }

    pub(in crate::app) fn collapse_all(&mut self) {
        self.session.collapse_all();
        self.fit_requested = true;
        self.scene_dirty = true;
    }

    pub(in crate::app) fn set_strategy(&mut self, strategy: LayoutStrategy) {
        if self.session.strategy() == strategy {
            return;
        }

        self.session.set_strategy(strategy);
        self.fit_requested = true;
        self.scene_dirty = true;
    }

    pub(in crate::app) fn open_asset(&mut self, id: &str) {
        if self.selection.as_ref() != Some(&Selection::Asset(id.to_owned())) {
            self.outgoing_form = Default::default();
            self.incoming_form = Default::default();
        }
        self.selection = Some(Selection::Asset(id.to_owned()));
    }

    pub(in crate::app) fn add_connection(
        &mut self,
        asset_id: &str,
        other_id: &str,
        label: &str,
        direction: Direction,
    ) {
        let (source, target) = match direction {
            Direction::Outgoing => (asset_id, other_id),
            Direction::Incoming => (other_id, asset_id),
        };

        let result = self.session.add_connection(source, target, label);
        self.report_edit(result, source, target);
    }

    fn report_edit(&mut self, result: Result<ConnectionId, EditError>, source: &str, target: &str) {
        match result {
            Ok(_) => {
                self.status = Some(format!("Connected {source} → {target}"));
                self.scene_dirty = true;
            }
            Err(error) => {
                self.status = Some(error.to_string());
            }
        }
    }

    pub(in crate::app) fn remove_connection(
        &mut self,
        asset_id: &str,
        other_id: &str,
        direction: Direction,
    ) {
        let removed = self
            .session
            .remove_connection_by_direction(asset_id, other_id, direction);
        self.after_removal(removed);
    }

    /// Removes every `source -> target` connection.
    pub(in crate::app) fn remove_exact_connection(&mut self, source: &str, target: &str) {
        let removed = self.session.remove_connection(source, target);
        self.after_removal(removed);
    }

    fn after_removal(&mut self, removed: usize) {
        if removed == 0 {
            return;
        }

        self.status = Some(format!("Removed {removed} connection(s)"));
        // Edge keys are positional, so an open connection panel may now be stale.
        if matches!(self.selection, Some(Selection::Connection(_))) {
            self.selection = None;
        }
        self.scene_dirty = true;
    }
}
