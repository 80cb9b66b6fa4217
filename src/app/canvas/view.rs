use eframe::egui::{self, Align2, Color32, FontId, Pos2, Sense, Stroke, Ui, pos2, vec2};

use super::super::ViewModel;
use super::super::render_utils::{band_color, blend_color, dim_color, draw_background};

const MIN_SCREEN_RADIUS: f32 = 2.0;

impl ViewModel {
    pub(in crate::app) fn draw_canvas(&mut self, ui: &mut Ui) {
        let (rect, response) = ui.allocate_exact_size(ui.available_size(), Sense::click());
        let painter = ui.painter_at(rect);

        if self.canvas_size != rect.size() {
            self.canvas_size = rect.size();
            self.points_dirty = true;
        }
        if self.points_dirty {
            self.rebuild_points();
        }

        let plot = rect.shrink(self.settings.canvas_margin);
        draw_background(&painter, rect, plot);

        if self.points.is_empty() {
            painter.text(
                rect.center(),
                Align2::CENTER_CENTER,
                "No points for the current perspective and filter.",
                FontId::proportional(14.0),
                Color32::from_gray(200),
            );
            return;
        }

        let offset = rect.min.to_vec2();
        let screen = self
            .points
            .iter()
            .map(|point| {
                (
                    pos2(point.screen.x, point.screen.y) + offset,
                    point.screen.radius.max(MIN_SCREEN_RADIUS),
                )
            })
            .collect::<Vec<(Pos2, f32)>>();
        let visible = Self::visible_indices(rect, &screen);
        let hovered = Self::hovered_index(ui, &visible, &screen);
        if hovered.is_some() {
            ui.output_mut(|output| {
                output.cursor_icon = egui::CursorIcon::PointingHand;
            });
        }

        let search_matches = self.cached_search_matches();
        let search_active = search_matches
            .as_ref()
            .is_some_and(|matches| !matches.is_empty());
        let selected_color = Color32::from_rgb(245, 206, 93);

        for &index in &visible {
            let point = &self.points[index];
            let (position, radius) = screen[index];
            let is_owner = point.entity.owner().is_some();
            let is_hovered = hovered == Some(index);
            let is_selected = self.selected.as_deref() == Some(point.key().as_str());
            let is_match = search_matches
                .as_ref()
                .is_some_and(|matches| matches.contains(&index));

            let base = band_color(point.band, point.opacity);
            let color = if is_hovered {
                blend_color(base, Color32::from_rgb(255, 164, 101), 0.55)
            } else if is_match {
                blend_color(base, Color32::from_rgb(103, 196, 255), 0.6)
            } else if search_active {
                dim_color(base, 0.38)
            } else {
                base
            };

            if is_owner {
                // Owners are translucent discs so their children stay visible.
                painter.circle_filled(position, radius, color.gamma_multiply(0.28));
                painter.circle_stroke(position, radius, Stroke::new(1.4, color));
                if radius > 18.0 {
                    painter.text(
                        position - vec2(0.0, radius + 4.0),
                        Align2::CENTER_BOTTOM,
                        point.entity.label(),
                        FontId::proportional(12.0),
                        Color32::from_gray(225),
                    );
                }
            } else {
                painter.circle_filled(position, radius, color);
                painter.circle_stroke(
                    position,
                    radius,
                    Stroke::new(1.0, Color32::from_rgba_unmultiplied(15, 15, 15, 190)),
                );
            }

            if is_selected {
                painter.circle_stroke(position, radius + 4.0, Stroke::new(2.0, selected_color));
            }
        }

        if let Some(index) = hovered
            && let Some(tooltip) = self.points[index].tooltip.as_deref()
        {
            painter.text(
                rect.left_top() + vec2(10.0, 10.0),
                Align2::LEFT_TOP,
                tooltip,
                FontId::proportional(13.0),
                Color32::from_gray(240),
            );
        }

        if response.clicked_by(egui::PointerButton::Primary) {
            let selected = hovered.map(|index| self.points[index].key());
            self.set_selected(selected);
        }
    }
}
