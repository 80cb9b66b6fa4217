use eframe::egui::{Color32, Painter, Pos2, Rect, Stroke};
use retrieval_lens::QualityBand;

pub(super) fn blend_color(base: Color32, overlay: Color32, amount: f32) -> Color32 {
    let amount = amount.clamp(0.0, 1.0);
    let inverse = 1.0 - amount;

    Color32::from_rgba_unmultiplied(
        ((base.r() as f32 * inverse) + (overlay.r() as f32 * amount)) as u8,
        ((base.g() as f32 * inverse) + (overlay.g() as f32 * amount)) as u8,
        ((base.b() as f32 * inverse) + (overlay.b() as f32 * amount)) as u8,
        ((base.a() as f32 * inverse) + (overlay.a() as f32 * amount)) as u8,
    )
}

pub(super) fn dim_color(color: Color32, factor: f32) -> Color32 {
    let factor = factor.clamp(0.0, 1.0);
    Color32::from_rgba_unmultiplied(
        (color.r() as f32 * factor) as u8,
        (color.g() as f32 * factor) as u8,
        (color.b() as f32 * factor) as u8,
        (color.a() as f32 * (0.45 + (factor * 0.55))) as u8,
    )
}

pub(super) fn band_color(band: QualityBand, opacity: f32) -> Color32 {
    let [r, g, b] = band.rgb();
    let alpha = (opacity.clamp(0.0, 1.0) * 255.0).round() as u8;
    Color32::from_rgba_unmultiplied(r, g, b, alpha)
}

/// Dark backdrop with a light grid; the frame marks the unit square.
pub(super) fn draw_background(painter: &Painter, rect: Rect, plot: Rect) {
    painter.rect_filled(rect, 0.0, Color32::from_rgb(19, 23, 29));

    let grid = Stroke::new(1.0, Color32::from_rgba_unmultiplied(60, 70, 80, 70));
    for step in 1..10 {
        let t = step as f32 / 10.0;
        let x = plot.left() + plot.width() * t;
        let y = plot.top() + plot.height() * t;
        painter.line_segment([Pos2::new(x, plot.top()), Pos2::new(x, plot.bottom())], grid);
        painter.line_segment([Pos2::new(plot.left(), y), Pos2::new(plot.right(), y)], grid);
    }

    let frame = Stroke::new(1.0, Color32::from_rgba_unmultiplied(90, 102, 116, 140));
    painter.line_segment([plot.left_top(), plot.right_top()], frame);
    painter.line_segment([plot.right_top(), plot.right_bottom()], frame);
    painter.line_segment([plot.right_bottom(), plot.left_bottom()], frame);
    painter.line_segment([plot.left_bottom(), plot.left_top()], frame);
}

pub(super) fn circle_visible(rect: Rect, position: Pos2, radius: f32) -> bool {
    !(position.x + radius < rect.left()
        || position.x - radius > rect.right()
        || position.y + radius < rect.top()
        || position.y - radius > rect.bottom())
}
