use std::f64::consts::TAU;

use super::{Placement, Point, Side};

const CIRCLE_MIN_RADIUS: f64 = 150.0;
const CIRCLE_RADIUS_PER_NODE: f64 = 20.0;

const STAR_MIN_RADIUS: f64 = 180.0;
const STAR_RADIUS_PER_NODE: f64 = 25.0;

const CONCENTRIC_FIRST_RADIUS: f64 = 300.0;
const CONCENTRIC_FIRST_CAPACITY: usize = 6;
const CONCENTRIC_RADIUS_STEP: f64 = 250.0;
/// Arc length reserved for one node on a concentric ring.
const CONCENTRIC_NODE_ARC: f64 = 150.0;

fn angle_step(count: usize) -> f64 {
    if count == 0 { 0.0 } else { TAU / count as f64 }
}

pub(super) fn circle(count: usize) -> Vec<Placement> {
    let radius = CIRCLE_MIN_RADIUS.max(count as f64 * CIRCLE_RADIUS_PER_NODE);
    let step = angle_step(count);

    (0..count)
        .map(|index| {
            Placement::at(Point::polar(radius, index as f64 * step))
                .with_anchors(Side::Left, Side::Right)
        })
        .collect()
}

/// First node is the hub at the origin, the rest share one ring around it.
pub(super) fn star(count: usize) -> Vec<Placement> {
    if count == 0 {
        return Vec::new();
    }

    let ring = count - 1;
    let radius = STAR_MIN_RADIUS.max(ring as f64 * STAR_RADIUS_PER_NODE);
    let step = angle_step(ring);

    std::iter::once(Placement::at(Point::ORIGIN))
        .chain((0..ring).map(|index| Placement::at(Point::polar(radius, index as f64 * step))))
        .collect()
}

/// First node at the origin, then rings that fill in input order.
///
/// The first ring holds six nodes; every later ring is 250 units further out
/// and holds as many nodes as fit its circumference.
pub(super) fn concentric(count: usize) -> Vec<Placement> {
    if count == 0 {
        return Vec::new();
    }

    let mut placements = Vec::with_capacity(count);
    placements.push(Placement::at(Point::ORIGIN));

    let mut radius = CONCENTRIC_FIRST_RADIUS;
    let mut capacity = CONCENTRIC_FIRST_CAPACITY;
    let mut slot = 0usize;

    for _ in 1..count {
        let angle = slot as f64 * angle_step(capacity);
        placements.push(
            Placement::at(Point::polar(radius, angle)).with_anchors(Side::Left, Side::Right),
        );

        slot += 1;
        if slot >= capacity {
            radius += CONCENTRIC_RADIUS_STEP;
            capacity = ring_capacity(radius);
            slot = 0;
        }
    }

    placements
}

fn ring_capacity(radius: f64) -> usize {
    ((TAU * radius / CONCENTRIC_NODE_ARC).floor() as usize).max(1)
}

#[cfg(test)]
mod tests {
    use std::f64::consts::PI;

    use super::*;

    const EPSILON: f64 = 1e-9;

    fn assert_close(point: Point, x: f64, y: f64) {
        assert!(
            (point.x - x).abs() < EPSILON && (point.y - y).abs() < EPSILON,
            "expected ({x}, {y}), got ({}, {})",
            point.x,
            point.y
        );
    }

    #[test]
    fn test_circle_four_nodes_on_quarter_turns() {
        let placements = circle(4);
        assert_eq!(placements.len(), 4);
        for (index, placement) in placements.iter().enumerate() {
            assert_close(
                placement.position,
                150.0 * (index as f64 * PI / 2.0).cos(),
                150.0 * (index as f64 * PI / 2.0).sin(),
            );
            assert!((placement.position.length() - 150.0).abs() < EPSILON);
            assert_eq!(placement.anchor_in, Side::Left);
            assert_eq!(placement.anchor_out, Side::Right);
        }
    }

    #[test]
    fn test_circle_radius_grows_with_count() {
        let placements = circle(10);
        assert!((placements[3].position.length() - 200.0).abs() < EPSILON);
    }

    #[test]
    fn test_circle_single_node() {
        let placements = circle(1);
        assert_eq!(placements.len(), 1);
        assert_close(placements[0].position, 150.0, 0.0);
    }

    #[test]
    fn test_star_hub_only() {
        let placements = star(1);
        assert_eq!(placements.len(), 1);
        assert_eq!(placements[0].position, Point::ORIGIN);
    }

    #[test]
    fn test_star_three_nodes() {
        let placements = star(3);
        assert_eq!(placements[0].position, Point::ORIGIN);
        assert_close(placements[1].position, 180.0, 0.0);
        assert_close(placements[2].position, -180.0, 0.0);
    }

    #[test]
    fn test_star_radius_grows_with_ring() {
        let placements = star(11);
        assert!((placements[5].position.length() - 250.0).abs() < EPSILON);
    }

    #[test]
    fn test_concentric_first_ring_holds_six() {
        let placements = concentric(9);
        assert_eq!(placements[0].position, Point::ORIGIN);
        assert_eq!(placements[0].anchor_in, Side::Top);

        for placement in &placements[1..=6] {
            assert!((placement.position.length() - 300.0).abs() < EPSILON);
            assert_eq!(placement.anchor_in, Side::Left);
        }
        assert_close(placements[1].position, 300.0, 0.0);
        assert_close(placements[4].position, -300.0, 0.0);

        for placement in &placements[7..] {
            assert!((placement.position.length() - 550.0).abs() < EPSILON);
        }
        assert_close(placements[7].position, 550.0, 0.0);
    }

    #[test]
    fn test_concentric_second_ring_capacity() {
        // floor(2π·550 / 150) = 23 nodes on the second ring.
        assert_eq!(ring_capacity(550.0), 23);
        let placements = concentric(1 + 6 + 23 + 1);
        assert!((placements[29].position.length() - 550.0).abs() < EPSILON);
        assert!((placements[30].position.length() - 800.0).abs() < EPSILON);
    }
}
