use eframe::egui::{self, Pos2, Rect, Ui};

use crate::topology::EdgeKey;

use super::super::render_utils::{distance_to_segment, screen_to_world};
use super::super::{CardGeometry, Selection, ViewModel};

const EDGE_HIT_DISTANCE: f32 = 6.0;

impl ViewModel {
    pub(in crate::app) fn handle_graph_zoom(
        &mut self,
        ui: &Ui,
        rect: Rect,
        response: &egui::Response,
    ) {
        if !response.hovered() {
            return;
        }

        let scroll = ui.input(|input| input.raw_scroll_delta.y);
        if scroll.abs() <= f32::EPSILON {
            return;
        }

        let pointer = ui
            .input(|input| input.pointer.hover_pos())
            .unwrap_or_else(|| rect.center());
        let world_before = screen_to_world(rect, self.pan, self.zoom, pointer);

        let zoom_factor = (1.0 + (scroll * 0.0018)).clamp(0.85, 1.15);
        self.zoom = (self.zoom * zoom_factor).clamp(0.1, 3.0);
        self.pan = pointer - rect.center() - (world_before * self.zoom);
    }

    pub(in crate::app) fn handle_graph_pan(&mut self, response: &egui::Response) {
        if response.dragged_by(egui::PointerButton::Primary)
            || response.dragged_by(egui::PointerButton::Middle)
        {
            self.pan += response.drag_delta();
        }
    }

    /// Topmost card under `pointer`; cards drawn later sit on top.
    pub(in crate::app) fn hovered_card(&self, pointer: Pos2) -> Option<&CardGeometry> {
        self.canvas.cards.iter().rev().find(|card| {
            card.rect.contains(pointer) || card.badge.is_some_and(|badge| badge.contains(pointer))
        })
    }

    pub(in crate::app) fn hovered_edge(&self, pointer: Pos2) -> Option<EdgeKey> {
        self.canvas
            .edges
            .iter()
            .map(|edge| (edge.key, distance_to_segment(pointer, edge.start, edge.end)))
            .filter(|(_, distance)| *distance <= EDGE_HIT_DISTANCE)
            .min_by(|a, b| a.1.total_cmp(&b.1))
            .map(|(key, _)| key)
    }

    /// Left click toggles a card or opens an edge, right click opens a card's details.
    pub(in crate::app) fn handle_canvas_clicks(&mut self, response: &egui::Response) {
        let Some(pointer) = response.interact_pointer_pos() else {
            return;
        };

        if response.clicked_by(egui::PointerButton::Primary) {
            if let Some(id) = self.hovered_card(pointer).map(|card| card.id.clone()) {
                self.toggle_node(&id);
            } else if let Some(key) = self.hovered_edge(pointer) {
                self.selection = Some(Selection::Connection(key));
            }
        } else if response.clicked_by(egui::PointerButton::Secondary)
            && let Some(id) = self.hovered_card(pointer).map(|card| card.id.clone())
        {
            self.open_asset(&id);
        }
    }
}
