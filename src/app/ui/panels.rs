use eframe::egui::{self, Align, Context, Layout, Vec2};

use crate::topology::Session;

use super::super::{CanvasCache, ConnectionForm, ViewModel};

impl ViewModel {
    pub(in crate::app) fn new(session: Session) -> Self {
        let scene = session.scene();
        Self {
            session,
            scene,
            scene_dirty: false,
            pan: Vec2::ZERO,
            zoom: 1.0,
            fit_requested: true,
            pinned: None,
            focal_search: String::new(),
            selection: None,
            outgoing_form: ConnectionForm::default(),
            incoming_form: ConnectionForm::default(),
            status: None,
            show_asset_legend: false,
            show_connection_legend: true,
            canvas: CanvasCache::default(),
        }
    }

    pub(in crate::app) fn show(&mut self, ctx: &Context) {
        self.refresh_scene();

        egui::TopBottomPanel::top("top_bar")
            .resizable(false)
            .show(ctx, |ui| {
                ui.horizontal(|ui| {
                    ui.heading("Asset Topology");
                    ui.separator();
                    self.draw_controls(ui);
                    ui.with_layout(Layout::right_to_left(Align::Center), |ui| {
                        ui.label(self.visible_graph_text());
                    });
                });
            });

        egui::SidePanel::left("legend")
            .resizable(true)
            .default_width(230.0)
            .show(ctx, |ui| self.draw_legends(ui));

        if self.selection.is_some() {
            egui::SidePanel::right("details")
                .resizable(true)
                .default_width(380.0)
                .show(ctx, |ui| self.draw_details(ui));
        }

        egui::CentralPanel::default().show(ctx, |ui| self.draw_graph(ui));
    }

    fn visible_graph_text(&self) -> String {
        format!(
            "nodes: {}  edges: {}  expanded: {}  assets: {}",
            self.scene.nodes.len(),
            self.scene.edges.len(),
            self.session.expanded().len(),
            self.session.dataset().assets.len()
        )
    }
}
