use eframe::egui::{self, Align, Context, Layout, Vec2};
use retrieval_lens::{Canvas, LayoutSettings, Point, Snapshot, ViewConfig, render_points};
use tracing::debug;

use super::super::ViewModel;

impl ViewModel {
    pub(in crate::app) fn new(snapshot: Snapshot, settings: LayoutSettings, view: ViewConfig) -> Self {
        Self {
            snapshot,
            settings,
            view,
            search: String::new(),
            selected: None,
            points: Vec::new(),
            points_dirty: true,
            points_revision: 0,
            canvas_size: Vec2::ZERO,
            search_match_cache: None,
        }
    }

    pub(in crate::app) fn show(
        &mut self,
        ctx: &Context,
        source: &str,
        reload_requested: &mut bool,
        is_loading: bool,
    ) {
        egui::TopBottomPanel::top("top_bar")
            .resizable(false)
            .show(ctx, |ui| {
                ui.horizontal(|ui| {
                    ui.heading("retrieval-lens");
                    ui.separator();
                    ui.label(format!("snapshot: {source}"));
                    ui.label(format!("questions: {}", self.snapshot.questions.len()));
                    ui.label(format!("records: {}", self.snapshot.record_count()));
                    ui.label(format!("catalog: {}", self.snapshot.catalog().len()));
                    let reload_button =
                        ui.add_enabled(!is_loading, egui::Button::new("Reload snapshot"));
                    if reload_button.clicked() {
                        *reload_requested = true;
                    }
                    ui.with_layout(Layout::right_to_left(Align::Center), |ui| {
                        ui.label(format!(
                            "{}  |  {} points",
                            self.view.perspective.label(),
                            self.points.len()
                        ));
                    });
                });
            });

        egui::SidePanel::left("controls")
            .resizable(true)
            .default_width(300.0)
            .show(ctx, |ui| self.draw_controls(ui));

        egui::SidePanel::right("details")
            .resizable(true)
            .default_width(340.0)
            .show(ctx, |ui| self.draw_details(ui));

        egui::CentralPanel::default().show(ctx, |ui| {
            if is_loading {
                ui.vertical_centered(|ui| {
                    ui.add_space(120.0);
                    ui.heading("Reloading retrieval snapshot...");
                    ui.add_space(8.0);
                    ui.spinner();
                });
            } else {
                self.draw_canvas(ui);
            }
        });
    }

    pub(in crate::app) fn rebuild_points(&mut self) {
        let canvas = Canvas::new(
            self.canvas_size.x,
            self.canvas_size.y,
            self.settings.canvas_margin,
        );
        self.points = render_points(&self.snapshot, &self.view, &self.settings, canvas);
        self.points_dirty = false;
        self.points_revision = self.points_revision.wrapping_add(1);
        self.search_match_cache = None;

        if let Some(selected) = &self.selected
            && !self.points.iter().any(|point| &point.key() == selected)
        {
            self.selected = None;
        }
        debug!(
            perspective = ?self.view.perspective,
            points = self.points.len(),
            revision = self.points_revision,
            "rebuilt canvas points"
        );
    }

    pub(in crate::app) fn set_selected(&mut self, selected: Option<String>) {
        if self.selected != selected {
            self.selected = selected;
        }
    }

    pub(in crate::app) fn selected_point(&self) -> Option<&Point> {
        let selected = self.selected.as_deref()?;
        self.points.iter().find(|point| point.key() == selected)
    }
}
