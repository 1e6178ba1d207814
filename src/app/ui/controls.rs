use eframe::egui::{self, RichText, Ui, vec2};
use fuzzy_matcher::FuzzyMatcher;
use fuzzy_matcher::skim::SkimMatcherV2;

use crate::layout::LayoutStrategy;
use crate::style::{ASSET_TYPES, CONNECTION_COLORS, style_for};
use crate::topology::{Asset, DATABASES_TYPE, Dataset, SERVERS_TYPE, SYSTEM_TYPE};

use super::super::ViewModel;
use super::super::render_utils::rgb;

/// Asset types offered as focal assets, with their group headings.
const FOCAL_GROUPS: [(&str, &str); 3] = [
    ("Systems", SYSTEM_TYPE),
    ("Databases", DATABASES_TYPE),
    ("Servers", SERVERS_TYPE),
];

fn fuzzy_match_score(matcher: &SkimMatcherV2, text: &str, query: &str) -> Option<i64> {
    matcher
        .fuzzy_match(text, query)
        .or_else(|| matcher.fuzzy_match(&text.to_ascii_lowercase(), &query.to_ascii_lowercase()))
}

/// Focal candidates per group. A non-empty query keeps fuzzy matches on
/// name or id, best first.
fn focal_candidates<'a>(dataset: &'a Dataset, query: &str) -> Vec<(&'static str, Vec<&'a Asset>)> {
    let query = query.trim();
    let matcher = SkimMatcherV2::default();

    FOCAL_GROUPS
        .iter()
        .filter_map(|(heading, asset_type)| {
            let mut scored = dataset
                .assets_of_type(asset_type)
                .filter_map(|asset| {
                    if query.is_empty() {
                        return Some((0, asset));
                    }
                    let score = fuzzy_match_score(&matcher, &asset.name, query)
                        .max(fuzzy_match_score(&matcher, &asset.id, query))?;
                    Some((score, asset))
                })
                .collect::<Vec<_>>();
            scored.sort_by(|a, b| b.0.cmp(&a.0));

            let assets = scored.into_iter().map(|(_, asset)| asset).collect::<Vec<_>>();
            (!assets.is_empty()).then_some((*heading, assets))
        })
        .collect()
}

impl ViewModel {
    pub(in crate::app) fn draw_controls(&mut self, ui: &mut Ui) {
        let has_focal = self.session.focal().is_some();

        if ui
            .add_enabled(has_focal, egui::Button::new("← Back"))
            .on_hover_text("Return to the asset picker")
            .clicked()
        {
            self.clear_focus();
        }

        self.draw_focal_selector(ui);

        let current = self.session.strategy();
        let mut chosen = None;
        egui::ComboBox::from_id_salt("layout_strategy")
            .selected_text(current.label())
            .show_ui(ui, |ui| {
                for strategy in LayoutStrategy::ALL {
                    if ui
                        .selectable_label(strategy == current, strategy.label())
                        .clicked()
                    {
                        chosen = Some(strategy);
                    }
                }
            });
        if let Some(strategy) = chosen {
            self.set_strategy(strategy);
        }

        if ui
            .add_enabled(has_focal, egui::Button::new("Expand all"))
            .clicked()
        {
            self.expand_all();
        }
        if ui
            .add_enabled(has_focal, egui::Button::new("Collapse all"))
            .clicked()
        {
            self.collapse_all();
        }
    }

    fn draw_focal_selector(&mut self, ui: &mut Ui) {
        let dataset = self.session.dataset();
        let focal = self.session.focal();
        let selected_text = match focal {
            Some(id) => dataset
                .asset(id)
                .map_or_else(|| id.to_owned(), |asset| asset.name.clone()),
            None => "Select an asset…".to_owned(),
        };

        let search = &mut self.focal_search;
        let mut chosen = None;
        egui::ComboBox::from_id_salt("focal_asset")
            .width(260.0)
            .selected_text(selected_text)
            .show_ui(ui, |ui| {
                ui.add(
                    egui::TextEdit::singleline(&mut *search)
                        .hint_text("Search systems, databases, servers")
                        .desired_width(240.0),
                );
                ui.separator();

                let groups = focal_candidates(dataset, search.as_str());
                if groups.is_empty() {
                    ui.label("No matching assets.");
                }

                egui::ScrollArea::vertical()
                    .id_salt("focal_asset_list")
                    .max_height(360.0)
                    .show(ui, |ui| {
                        for (heading, assets) in groups {
                            ui.label(RichText::new(heading).strong());
                            for asset in assets {
                                let is_focal = focal == Some(asset.id.as_str());
                                if ui.selectable_label(is_focal, asset.name.as_str()).clicked() {
                                    chosen = Some(asset.id.clone());
                                }
                            }
                            ui.add_space(4.0);
                        }
                    });
            });

        if let Some(id) = chosen {
            self.focus_asset(&id);
        }
    }

    pub(in crate::app) fn draw_legends(&mut self, ui: &mut Ui) {
        egui::ScrollArea::vertical()
            .id_salt("legend_scroll")
            .show(ui, |ui| {
                if legend_heading(ui, "Asset types", self.show_asset_legend) {
                    self.show_asset_legend = !self.show_asset_legend;
                }
                if self.show_asset_legend {
                    for asset_type in ASSET_TYPES {
                        let style = style_for(asset_type);
                        ui.horizontal(|ui| {
                            ui.label(
                                RichText::new(style.glyph)
                                    .monospace()
                                    .color(egui::Color32::WHITE)
                                    .background_color(rgb(style.color)),
                            );
                            ui.label(asset_type);
                        });
                    }
                }

                ui.separator();

                if legend_heading(ui, "Connection types", self.show_connection_legend) {
                    self.show_connection_legend = !self.show_connection_legend;
                }
                if self.show_connection_legend {
                    for (label, color) in CONNECTION_COLORS {
                        ui.horizontal(|ui| {
                            let (swatch, _) =
                                ui.allocate_exact_size(vec2(20.0, 10.0), egui::Sense::hover());
                            ui.painter().rect_filled(
                                swatch.shrink2(vec2(0.0, 3.5)),
                                2.0,
                                rgb(color),
                            );
                            ui.label(label);
                        });
                    }
                }
            });
    }
}

fn legend_heading(ui: &mut Ui, title: &str, open: bool) -> bool {
    let marker = if open { "▼" } else { "▶" };
    ui.add(
        egui::Label::new(RichText::new(format!("{marker} {title}")).strong())
            .sense(egui::Sense::click()),
    )
    .clicked()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::topology::demo_dataset;

    fn headings<'a>(groups: &[(&'static str, Vec<&'a Asset>)]) -> Vec<&'static str> {
        groups.iter().map(|(heading, _)| *heading).collect()
    }

    #[test]
    fn test_empty_query_lists_every_group_in_order() {
        let dataset = demo_dataset();
        let groups = focal_candidates(&dataset, "");
        assert_eq!(groups[0].0, "Systems");
        assert_eq!(groups[0].1.len(), 5);
        assert_eq!(groups[0].1[0].id, "sys-1");

        for (_, assets) in &groups[1..] {
            for asset in assets {
                assert!(asset.asset_type == DATABASES_TYPE || asset.asset_type == SERVERS_TYPE);
            }
        }
    }

    #[test]
    fn test_query_filters_and_ranks() {
        let dataset = Dataset::new(
            vec![
                Asset::new("sys-1", "Mail Service", SYSTEM_TYPE),
                Asset::new("sys-2", "HR", SYSTEM_TYPE),
                Asset::new("db-1", "Mail Archive", DATABASES_TYPE),
                Asset::new("pc-1", "Mail Laptop", "Computers"),
            ],
            Vec::new(),
        );

        let groups = focal_candidates(&dataset, "mail");
        assert_eq!(headings(&groups), vec!["Systems", "Databases"]);
        assert_eq!(groups[0].1.len(), 1);
        assert_eq!(groups[0].1[0].id, "sys-1");

        assert!(focal_candidates(&dataset, "zzzz").is_empty());
    }

    #[test]
    fn test_query_matches_ids() {
        let dataset = Dataset::new(vec![Asset::new("sys-2", "HR", SYSTEM_TYPE)], Vec::new());
        let groups = focal_candidates(&dataset, "sys2");
        assert_eq!(groups.len(), 1);
    }
}
