use eframe::egui::{self, RichText, Ui};

use crate::style::{connection_color, style_for};
use crate::topology::{
    Asset, CONNECTION_TYPES, ConnectionEntry, Dataset, Direction, EdgeKey, UNKNOWN,
};

use super::super::render_utils::rgb;
use super::super::{ConnectionForm, Selection, ViewModel};

/// How many partner assets the "add connection" picker lists at once.
const PICKER_ROWS: usize = 40;

/// Assets that can be connected to `asset_id`, filtered the way the picker
/// searches: case-insensitive substring over "name (type)".
fn partner_candidates<'a>(dataset: &'a Dataset, asset_id: &str, query: &str) -> Vec<&'a Asset> {
    let query = query.trim().to_lowercase();
    dataset
        .assets
        .iter()
        .filter(|asset| asset.id != asset_id)
        .filter(|asset| {
            query.is_empty()
                || format!("{} ({})", asset.name, asset.asset_type)
                    .to_lowercase()
                    .contains(&query)
        })
        .collect()
}

fn asset_caption(asset: &Asset) -> String {
    format!("{} ({})", asset.name, asset.asset_type)
}

enum DetailsAction {
    Close,
    Focus(String),
    Open(String),
    OpenConnection(EdgeKey),
    Remove { other: String, direction: Direction },
    Add { other: String, label: String, direction: Direction },
    RemoveConnection { source: String, target: String },
}

impl ViewModel {
    pub(in crate::app) fn draw_details(&mut self, ui: &mut Ui) {
        let action = match self.selection.clone() {
            Some(Selection::Asset(id)) => self.draw_asset_details(ui, &id),
            Some(Selection::Connection(key)) => self.draw_connection_details(ui, key),
            None => None,
        };

        let Some(action) = action else {
            return;
        };

        let current = match &self.selection {
            Some(Selection::Asset(id)) => Some(id.clone()),
            _ => None,
        };
        match action {
            DetailsAction::Close => self.selection = None,
            DetailsAction::Focus(id) => self.focus_asset(&id),
            DetailsAction::Open(id) => self.open_asset(&id),
            DetailsAction::OpenConnection(key) => self.selection = Some(Selection::Connection(key)),
            DetailsAction::Remove { other, direction } => {
                if let Some(id) = current {
                    self.remove_connection(&id, &other, direction);
                }
            }
            DetailsAction::Add {
                other,
                label,
                direction,
            } => {
                if let Some(id) = current {
                    self.add_connection(&id, &other, &label, direction);
                }
            }
            DetailsAction::RemoveConnection { source, target } => {
                self.remove_exact_connection(&source, &target);
            }
        }
    }

    fn details_header(ui: &mut Ui, title: &str) -> bool {
        let mut close = false;
        ui.horizontal(|ui| {
            ui.heading(title);
            ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                close = ui.button("✕").on_hover_text("Close").clicked();
            });
        });
        ui.add_space(6.0);
        close
    }

    fn draw_asset_details(&mut self, ui: &mut Ui, id: &str) -> Option<DetailsAction> {
        let mut action = None;
        if Self::details_header(ui, "Asset Details") {
            return Some(DetailsAction::Close);
        }

        let dataset = self.session.dataset();
        let placeholder;
        let asset = match dataset.asset(id) {
            Some(asset) => asset,
            None => {
                placeholder = Asset::placeholder(id);
                &placeholder
            }
        };
        let style = style_for(&asset.asset_type);

        ui.horizontal(|ui| {
            ui.label(
                RichText::new(style.glyph)
                    .monospace()
                    .color(egui::Color32::WHITE)
                    .background_color(rgb(style.color)),
            );
            ui.label(RichText::new(&asset.name).strong());
        });
        ui.small(asset.id.as_str());
        ui.add_space(4.0);

        egui::Grid::new("asset_properties")
            .num_columns(2)
            .spacing([12.0, 4.0])
            .show(ui, |ui| {
                ui.label("Type");
                ui.label(asset.asset_type.as_str());
                ui.end_row();
                ui.label("Status");
                ui.label(asset.status.map_or("-", |status| status.label()));
                ui.end_row();
                ui.label("IP address");
                ui.label(asset.ip.as_deref().unwrap_or("-"));
                ui.end_row();
                ui.label("Location");
                ui.label(asset.location.as_deref().unwrap_or("-"));
                ui.end_row();
                ui.label("Children");
                ui.label(self.session.child_count(id).to_string());
                ui.end_row();
                ui.label("In view");
                ui.label(if self.scene.node(id).is_some() { "yes" } else { "no" });
                ui.end_row();
            });

        if asset.asset_type != UNKNOWN
            && self.session.focal() != Some(id)
            && ui.button("Focus on this asset").clicked()
        {
            action = Some(DetailsAction::Focus(id.to_owned()));
        }

        let outgoing = dataset.outgoing(id);
        let incoming = dataset.incoming(id);

        egui::ScrollArea::vertical()
            .id_salt("asset_details_scroll")
            .show(ui, |ui| {
                ui.separator();
                ui.label(RichText::new(format!("Outgoing connections ({})", outgoing.len())).strong());
                if let Some(next) = connection_rows(ui, &outgoing, Direction::Outgoing) {
                    action = Some(next);
                }
                if let Some(next) = connection_form(
                    ui,
                    dataset,
                    id,
                    &mut self.outgoing_form,
                    Direction::Outgoing,
                ) {
                    action = Some(next);
                }

                ui.separator();
                ui.label(RichText::new(format!("Incoming connections ({})", incoming.len())).strong());
                if let Some(next) = connection_rows(ui, &incoming, Direction::Incoming) {
                    action = Some(next);
                }
                if let Some(next) = connection_form(
                    ui,
                    dataset,
                    id,
                    &mut self.incoming_form,
                    Direction::Incoming,
                ) {
                    action = Some(next);
                }
            });

        action
    }

    fn draw_connection_details(&mut self, ui: &mut Ui, key: EdgeKey) -> Option<DetailsAction> {
        if Self::details_header(ui, "Connection Details") {
            return Some(DetailsAction::Close);
        }

        let dataset = self.session.dataset();
        let Some(connection) = dataset.connection_by_key(key) else {
            ui.label("This connection no longer exists.");
            return None;
        };

        let mut action = None;
        let color = rgb(connection_color(&connection.label));
        ui.horizontal(|ui| {
            ui.label(RichText::new("━━").color(color));
            ui.label(RichText::new(&connection.label).strong());
        });
        if let Some(id) = &connection.id {
            ui.small(format!("id {id}"));
        }
        ui.add_space(6.0);

        for (heading, endpoint) in [("Parent", &connection.source), ("Child", &connection.target)] {
            let caption = dataset
                .asset(endpoint)
                .map_or_else(|| format!("{UNKNOWN} ({endpoint})"), asset_caption);
            ui.horizontal(|ui| {
                ui.label(RichText::new(heading).strong());
                if ui.link(caption).clicked() {
                    action = Some(DetailsAction::Open(endpoint.clone()));
                }
            });
        }

        ui.add_space(8.0);
        if ui.button("Remove connection").clicked() {
            action = Some(DetailsAction::RemoveConnection {
                source: connection.source.clone(),
                target: connection.target.clone(),
            });
        }

        action
    }
}

fn connection_rows(
    ui: &mut Ui,
    entries: &[ConnectionEntry],
    direction: Direction,
) -> Option<DetailsAction> {
    if entries.is_empty() {
        ui.label("None");
        return None;
    }

    let arrow = match direction {
        Direction::Outgoing => "→",
        Direction::Incoming => "←",
    };
    let mut action = None;
    for entry in entries {
        ui.horizontal(|ui| {
            ui.label(RichText::new(arrow).color(rgb(connection_color(&entry.label))));
            if ui
                .link(format!("{} ({})", entry.name, entry.asset_type))
                .on_hover_text(entry.id.as_str())
                .clicked()
            {
                action = Some(DetailsAction::Open(entry.id.clone()));
            }
            if ui
                .small_button(entry.label.as_str())
                .on_hover_text("Show connection")
                .clicked()
            {
                action = Some(DetailsAction::OpenConnection(entry.connection_key));
            }
            if ui.small_button("Remove").clicked() {
                action = Some(DetailsAction::Remove {
                    other: entry.id.clone(),
                    direction,
                });
            }
        });
    }
    action
}

fn connection_form(
    ui: &mut Ui,
    dataset: &Dataset,
    asset_id: &str,
    form: &mut ConnectionForm,
    direction: Direction,
) -> Option<DetailsAction> {
    let title = match direction {
        Direction::Outgoing => "Add outgoing connection",
        Direction::Incoming => "Add incoming connection",
    };
    let salt = match direction {
        Direction::Outgoing => "outgoing",
        Direction::Incoming => "incoming",
    };

    let mut action = None;
    egui::CollapsingHeader::new(title)
        .id_salt(("connection_form", salt))
        .show(ui, |ui| {
            let selected = form
                .other
                .as_deref()
                .and_then(|id| dataset.asset(id))
                .map_or_else(|| "Select asset…".to_owned(), asset_caption);

            egui::ComboBox::from_id_salt(("connection_partner", salt))
                .width(300.0)
                .selected_text(selected)
                .show_ui(ui, |ui| {
                    ui.add(egui::TextEdit::singleline(&mut form.search).hint_text("Search"));
                    let candidates = partner_candidates(dataset, asset_id, &form.search);
                    for asset in candidates.iter().take(PICKER_ROWS) {
                        let is_selected = form.other.as_deref() == Some(asset.id.as_str());
                        if ui.selectable_label(is_selected, asset_caption(asset)).clicked() {
                            form.other = Some(asset.id.clone());
                        }
                    }
                    if candidates.len() > PICKER_ROWS {
                        ui.small(format!("{} more, refine the search", candidates.len() - PICKER_ROWS));
                    }
                });

            egui::ComboBox::from_id_salt(("connection_label", salt))
                .selected_text(form.label.as_str())
                .show_ui(ui, |ui| {
                    for label in CONNECTION_TYPES {
                        ui.selectable_value(&mut form.label, label.to_owned(), label);
                    }
                });

            if ui
                .add_enabled(form.other.is_some(), egui::Button::new("Add"))
                .clicked()
                && let Some(other) = form.other.take()
            {
                action = Some(DetailsAction::Add {
                    other,
                    label: form.label.clone(),
                    direction,
                });
                form.search.clear();
            }
        });
    action
}
