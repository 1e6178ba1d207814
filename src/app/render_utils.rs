use eframe::egui::{Color32, Painter, Pos2, Rect, Stroke, Vec2, vec2};

use crate::layout::{Point, Side};
use crate::style::Rgb;

pub(super) fn rgb(color: Rgb) -> Color32 {
    Color32::from_rgb(color.0, color.1, color.2)
}

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

pub(super) fn draw_background(painter: &Painter, rect: Rect, pan: Vec2, zoom: f32) {
    painter.rect_filled(rect, 0.0, Color32::from_rgb(24, 27, 33));

    let step = (16.0 * zoom).max(8.0);
    let origin = rect.center() + pan;
    let dot = Color32::from_rgba_unmultiplied(90, 98, 112, 90);

    let mut x = rect.left() + (origin.x - rect.left()).rem_euclid(step);
    while x < rect.right() {
        let mut y = rect.top() + (origin.y - rect.top()).rem_euclid(step);
        while y < rect.bottom() {
            painter.circle_filled(Pos2::new(x, y), 0.9, dot);
            y += step;
        }
        x += step;
    }
}

pub(super) fn world_to_screen(rect: Rect, pan: Vec2, zoom: f32, world: Vec2) -> Pos2 {
    rect.center() + pan + world * zoom
}

pub(super) fn screen_to_world(rect: Rect, pan: Vec2, zoom: f32, screen: Pos2) -> Vec2 {
    (screen - rect.center() - pan) / zoom
}

pub(super) fn point_vec(point: Point) -> Vec2 {
    vec2(point.x as f32, point.y as f32)
}

/// Midpoint of the card edge on `side`.
pub(super) fn anchor_point(card: Rect, side: Side) -> Pos2 {
    match side {
        Side::Top => card.center_top(),
        Side::Bottom => card.center_bottom(),
        Side::Left => card.left_center(),
        Side::Right => card.right_center(),
    }
}

pub(super) fn distance_to_segment(point: Pos2, start: Pos2, end: Pos2) -> f32 {
    let segment = end - start;
    let length_sq = segment.length_sq();
    if length_sq <= f32::EPSILON {
        return point.distance(start);
    }

    let t = ((point - start).dot(segment) / length_sq).clamp(0.0, 1.0);
    point.distance(start + segment * t)
}

pub(super) fn draw_arrow(painter: &Painter, start: Pos2, end: Pos2, stroke: Stroke, head: f32) {
    painter.line_segment([start, end], stroke);

    let direction = end - start;
    if direction.length_sq() <= f32::EPSILON {
        return;
    }

    let direction = direction.normalized();
    let normal = vec2(-direction.y, direction.x);
    let base = end - direction * head;
    painter.add(eframe::egui::Shape::convex_polygon(
        vec![end, base + normal * head * 0.5, base - normal * head * 0.5],
        stroke.color,
        Stroke::NONE,
    ));
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_world_screen_round_trip() {
        let rect = Rect::from_min_size(Pos2::new(10.0, 20.0), vec2(800.0, 600.0));
        let pan = vec2(35.0, -12.0);
        let world = vec2(250.0, -80.0);

        let screen = world_to_screen(rect, pan, 1.5, world);
        let back = screen_to_world(rect, pan, 1.5, screen);
        assert!((back - world).length() < 1e-3);
    }

    #[test]
    fn test_anchor_points() {
        let card = Rect::from_min_size(Pos2::ZERO, vec2(250.0, 80.0));
        assert_eq!(anchor_point(card, Side::Top), Pos2::new(125.0, 0.0));
        assert_eq!(anchor_point(card, Side::Bottom), Pos2::new(125.0, 80.0));
        assert_eq!(anchor_point(card, Side::Left), Pos2::new(0.0, 40.0));
        assert_eq!(anchor_point(card, Side::Right), Pos2::new(250.0, 40.0));
    }

    #[test]
    fn test_distance_to_segment() {
        let start = Pos2::new(0.0, 0.0);
        let end = Pos2::new(10.0, 0.0);
        assert!((distance_to_segment(Pos2::new(5.0, 3.0), start, end) - 3.0).abs() < 1e-5);
        assert!((distance_to_segment(Pos2::new(-4.0, 3.0), start, end) - 5.0).abs() < 1e-5);
        assert!((distance_to_segment(Pos2::new(2.0, 2.0), start, start) - 8f32.sqrt()).abs() < 1e-5);
    }

    #[test]
    fn test_rgb_conversion() {
        assert_eq!(rgb(Rgb(1, 2, 3)), Color32::from_rgb(1, 2, 3));
    }
}
