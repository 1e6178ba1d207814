use std::collections::HashMap;

use eframe::egui::{
    self, Align2, Color32, FontId, Painter, Rect, Sense, Stroke, StrokeKind, Ui, Vec2, vec2,
};

use crate::layout::{NODE_HEIGHT, NODE_WIDTH};
use crate::style::{connection_color, expansion_badge_color, style_for};
use crate::topology::{AssetStatus, EdgeKey};
use crate::util::truncate_label;

use super::super::render_utils::{
    anchor_point, blend_color, draw_arrow, draw_background, point_vec, rgb, world_to_screen,
};
use super::super::{CanvasCache, CardGeometry, EdgeGeometry, Selection, ViewModel};

const CARD_FILL: Color32 = Color32::from_rgb(36, 41, 50);
const SELECTED_COLOR: Color32 = Color32::from_rgb(245, 206, 93);
const ERROR_COLOR: Color32 = Color32::from_rgb(239, 68, 68);
const BADGE_RADIUS: f32 = 10.0;
/// Below this zoom, cards are drawn without text.
const TEXT_MIN_ZOOM: f32 = 0.3;

impl ViewModel {
    fn update_canvas_geometry(&mut self, rect: egui::Rect) {
        let card_size = vec2(NODE_WIDTH as f32, NODE_HEIGHT as f32) * self.zoom;
        let mut cards = Vec::with_capacity(self.scene.nodes.len());
        let mut index_by_id = HashMap::with_capacity(self.scene.nodes.len());

        for (index, node) in self.scene.nodes.iter().enumerate() {
            let min = world_to_screen(rect, self.pan, self.zoom, point_vec(node.position));
            let card = Rect::from_min_size(min, card_size);
            let badge = self.scene.child_counts.contains_key(&node.asset.id).then(|| {
                Rect::from_center_size(
                    card.center_bottom(),
                    Vec2::splat(BADGE_RADIUS * 2.0 * self.zoom.max(0.5)),
                )
            });

            index_by_id.insert(node.asset.id.as_str(), index);
            cards.push(CardGeometry {
                id: node.asset.id.clone(),
                rect: card,
                badge,
            });
        }

        let edges = self
            .scene
            .edges
            .iter()
            .filter_map(|edge| {
                let source = *index_by_id.get(edge.connection.source.as_str())?;
                let target = *index_by_id.get(edge.connection.target.as_str())?;
                Some(EdgeGeometry {
                    key: edge.key,
                    label: edge.connection.label.clone(),
                    start: anchor_point(cards[source].rect, self.scene.nodes[source].anchor_out),
                    end: anchor_point(cards[target].rect, self.scene.nodes[target].anchor_in),
                })
            })
            .collect();

        self.canvas = CanvasCache { cards, edges };
    }

    pub(in crate::app) fn draw_graph(&mut self, ui: &mut Ui) {
        self.refresh_scene();

        let (rect, response) = ui.allocate_exact_size(ui.available_size(), Sense::click_and_drag());
        let painter = ui.painter_at(rect);

        if self.fit_requested {
            self.fit_view(rect);
        }
        self.handle_graph_zoom(ui, rect, &response);
        self.handle_graph_pan(&response);

        draw_background(&painter, rect, self.pan, self.zoom);

        if self.scene.nodes.is_empty() {
            self.canvas = CanvasCache::default();
            painter.text(
                rect.center(),
                Align2::CENTER_CENTER,
                "Pick a system, database or server above to explore its topology.",
                FontId::proportional(16.0),
                Color32::from_gray(170),
            );
            return;
        }

        self.update_canvas_geometry(rect);

        let pointer = ui
            .input(|input| input.pointer.hover_pos())
            .filter(|pointer| rect.contains(*pointer));
        let hovered_card = pointer
            .and_then(|pointer| self.hovered_card(pointer))
            .map(|card| card.id.clone());
        let hovered_edge = if hovered_card.is_none() {
            pointer.and_then(|pointer| self.hovered_edge(pointer))
        } else {
            None
        };

        if hovered_card.is_some() || hovered_edge.is_some() {
            ui.output_mut(|output| {
                output.cursor_icon = egui::CursorIcon::PointingHand;
            });
        }

        self.draw_edges(&painter, hovered_edge);
        self.draw_cards(&painter, hovered_card.as_deref());

        if let Some(status) = &self.status {
            painter.text(
                rect.left_bottom() + vec2(10.0, -10.0),
                Align2::LEFT_BOTTOM,
                status,
                FontId::proportional(13.0),
                Color32::from_gray(225),
            );
        }

        self.handle_canvas_clicks(&response);
        if self.scene_dirty || response.dragged() {
            ui.ctx().request_repaint();
        }
    }

    fn draw_edges(&self, painter: &Painter, hovered: Option<EdgeKey>) {
        let selected = match &self.selection {
            Some(Selection::Connection(key)) => Some(*key),
            _ => None,
        };
        let zoom_sqrt = self.zoom.sqrt();

        for edge in &self.canvas.edges {
            let base = rgb(connection_color(&edge.label));
            let emphasized = hovered == Some(edge.key) || selected == Some(edge.key);
            let (width, color) = if emphasized {
                ((3.0 * zoom_sqrt).clamp(1.5, 5.0), blend_color(base, Color32::WHITE, 0.25))
            } else {
                ((1.6 * zoom_sqrt).clamp(0.8, 3.0), base)
            };

            draw_arrow(
                painter,
                edge.start,
                edge.end,
                Stroke::new(width, color),
                (10.0 * zoom_sqrt).clamp(5.0, 14.0),
            );

            if self.zoom >= 0.6 || emphasized {
                let mid = edge.start + (edge.end - edge.start) * 0.5;
                let galley = painter.layout_no_wrap(
                    edge.label.clone(),
                    FontId::proportional((11.0 * zoom_sqrt).clamp(9.0, 14.0)),
                    Color32::from_gray(30),
                );
                let label_rect =
                    Rect::from_center_size(mid, galley.size() + vec2(8.0, 4.0));
                painter.rect_filled(label_rect, 3.0, Color32::from_rgb(241, 243, 246));
                painter.galley(label_rect.min + vec2(4.0, 2.0), galley, Color32::from_gray(30));
            }
        }
    }

    fn draw_cards(&self, painter: &Painter, hovered: Option<&str>) {
        let selected = match &self.selection {
            Some(Selection::Asset(id)) => Some(id.as_str()),
            _ => None,
        };
        let focal = self.session.focal();
        let show_text = self.zoom >= TEXT_MIN_ZOOM;
        let rounding = 8.0 * self.zoom;

        for (card, node) in self.canvas.cards.iter().zip(&self.scene.nodes) {
            let asset = &node.asset;
            let style = style_for(&asset.asset_type);
            let accent = rgb(style.color);
            let is_error = asset.status == Some(AssetStatus::Error);

            let fill = if hovered == Some(asset.id.as_str()) {
                blend_color(CARD_FILL, accent, 0.18)
            } else {
                CARD_FILL
            };
            let border = if selected == Some(asset.id.as_str()) {
                Stroke::new(3.0, SELECTED_COLOR)
            } else if focal == Some(asset.id.as_str()) {
                Stroke::new(2.5, accent)
            } else if is_error {
                Stroke::new(2.0, ERROR_COLOR)
            } else {
                Stroke::new(1.0, blend_color(accent, CARD_FILL, 0.45))
            };

            painter.rect_filled(card.rect, rounding, fill);
            painter.rect_stroke(card.rect, rounding, border, StrokeKind::Inside);

            let icon_size = 44.0 * self.zoom;
            let icon = Rect::from_min_size(
                card.rect.left_center() + vec2(14.0 * self.zoom, -icon_size / 2.0),
                Vec2::splat(icon_size),
            );
            painter.rect_filled(icon, 6.0 * self.zoom, if is_error { ERROR_COLOR } else { accent });

            if show_text {
                painter.text(
                    icon.center(),
                    Align2::CENTER_CENTER,
                    style.glyph,
                    FontId::monospace(13.0 * self.zoom),
                    Color32::WHITE,
                );

                let text_left = icon.right() + 12.0 * self.zoom;
                painter.text(
                    egui::pos2(text_left, card.rect.center().y - 4.0 * self.zoom),
                    Align2::LEFT_BOTTOM,
                    truncate_label(&asset.name, 22),
                    FontId::proportional(15.0 * self.zoom),
                    Color32::from_gray(240),
                );
                painter.text(
                    egui::pos2(text_left, card.rect.center().y + 4.0 * self.zoom),
                    Align2::LEFT_TOP,
                    truncate_label(&asset.asset_type, 26),
                    FontId::proportional(12.0 * self.zoom),
                    Color32::from_gray(165),
                );
            }

            if is_error {
                painter.circle_filled(
                    card.rect.right_top() + vec2(-12.0, 12.0) * self.zoom,
                    5.0 * self.zoom,
                    ERROR_COLOR,
                );
            }

            if let Some(badge) = card.badge {
                let expanded = self.session.is_expanded(&asset.id);
                let radius = badge.width() / 2.0;
                painter.circle_filled(badge.center(), radius, rgb(expansion_badge_color(expanded)));
                painter.text(
                    badge.center(),
                    Align2::CENTER_CENTER,
                    if expanded { "-" } else { "+" },
                    FontId::monospace(radius * 1.4),
                    Color32::WHITE,
                );
            }
        }
    }
}
