use eframe::egui::{self, Align, Layout, RichText, Ui};
use retrieval_lens::perspective::{Perspective, QualityFilter};
use retrieval_lens::quality::{GOOD_THRESHOLD, QualityBand, SizePreset, WEAK_THRESHOLD};

use super::super::ViewModel;
use super::super::render_utils::band_color;

const WEAKEST_ROWS: usize = 40;

impl ViewModel {
    pub(in crate::app) fn draw_controls(&mut self, ui: &mut Ui) {
        ui.heading("View Controls");
        ui.separator();
        ui.add_space(4.0);

        let mut changed = false;

        ui.label("Search (label or id)")
            .on_hover_text("Fuzzy-highlight matching points without changing the layout.");
        ui.text_edit_singleline(&mut self.search)
            .on_hover_text("Type to highlight matching points, then click one to select it.");

        ui.separator();
        ui.label(RichText::new("Perspective").strong());
        for perspective in Perspective::ALL {
            changed |= ui
                .selectable_value(&mut self.view.perspective, perspective, perspective.label())
                .changed();
        }

        ui.separator();
        ui.label(RichText::new("Quality filter").strong());
        ui.horizontal_wrapped(|ui| {
            for filter in QualityFilter::ALL {
                changed |= ui
                    .selectable_value(&mut self.view.quality_filter, filter, filter.label())
                    .on_hover_text("Never-retrieved chunks only show under All.")
                    .changed();
            }
        });

        ui.separator();
        ui.label(RichText::new("Point size").strong());
        ui.horizontal_wrapped(|ui| {
            for preset in SizePreset::ALL {
                changed |= ui
                    .selectable_value(&mut self.view.size_preset, preset, preset.label())
                    .changed();
            }
        });

        ui.separator();
        changed |= ui
            .checkbox(&mut self.view.tooltips, "Hover tooltips")
            .changed();

        if changed {
            self.points_dirty = true;
        }

        ui.separator();
        self.draw_legend(ui);

        ui.separator();
        ui.label(RichText::new("Weakest points").strong());
        self.draw_weakest(ui);
    }

    fn draw_legend(&self, ui: &mut Ui) {
        let entries = [
            (QualityBand::Good, format!("good (≥ {GOOD_THRESHOLD:.1})")),
            (
                QualityBand::Weak,
                format!("weak ({WEAK_THRESHOLD:.1} to {GOOD_THRESHOLD:.1})"),
            ),
            (QualityBand::Poor, format!("poor (< {WEAK_THRESHOLD:.1})")),
            (QualityBand::Unretrieved, "never retrieved".to_owned()),
        ];
        for (band, text) in entries {
            let count = self.points.iter().filter(|point| point.band == band).count();
            ui.horizontal(|ui| {
                ui.label(RichText::new("●").color(band_color(band, 1.0)));
                ui.label(text);
                ui.with_layout(Layout::right_to_left(Align::Center), |ui| {
                    ui.label(count.to_string());
                });
            });
        }
    }

    fn draw_weakest(&mut self, ui: &mut Ui) {
        let mut ranked = self
            .points
            .iter()
            .enumerate()
            .filter(|(_, point)| !point.entity.is_orphan())
            .map(|(index, point)| (index, point.color_value))
            .collect::<Vec<_>>();
        ranked.sort_by(|a, b| a.1.total_cmp(&b.1).then_with(|| a.0.cmp(&b.0)));
        ranked.truncate(WEAKEST_ROWS);

        let mut selected_key = None;
        egui::ScrollArea::vertical()
            .id_salt("weakest_points_scroll")
            .max_height(260.0)
            .auto_shrink([false, false])
            .show_rows(ui, 22.0, ranked.len(), |ui, row_range| {
                for row in row_range {
                    let Some(&(index, score)) = ranked.get(row) else {
                        continue;
                    };
                    let point = &self.points[index];
                    let key = point.key();
                    let is_selected = self.selected.as_deref() == Some(key.as_str());

                    let clicked = ui
                        .horizontal(|ui| {
                            let clicked = ui
                                .selectable_label(is_selected, point.entity.label())
                                .clicked();
                            ui.with_layout(Layout::right_to_left(Align::Center), |ui| {
                                ui.label(format!("{score:.2}"));
                            });
                            clicked
                        })
                        .inner;
                    if clicked {
                        selected_key = Some(key);
                    }
                }
            });

        if let Some(key) = selected_key {
            self.set_selected(Some(key));
        }
    }
}
