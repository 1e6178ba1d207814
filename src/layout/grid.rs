use super::{Placement, Point, Side};

const CELL_WIDTH: f64 = 300.0;
const CELL_HEIGHT: f64 = 150.0;

fn column_count(count: usize) -> usize {
    (count as f64).sqrt().ceil().max(1.0) as usize
}

/// Row-major placement into a near-square grid.
pub(super) fn grid(count: usize) -> Vec<Placement> {
    let columns = column_count(count);

    (0..count)
        .map(|index| {
            let column = index % columns;
            let row = index / columns;
            Placement::at(Point::new(
                column as f64 * CELL_WIDTH,
                row as f64 * CELL_HEIGHT,
            ))
            .with_anchors(Side::Top, Side::Bottom)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ten_nodes_use_four_columns() {
        assert_eq!(column_count(10), 4);
        let placements = grid(10);
        assert_eq!(placements[7].position, Point::new(900.0, 150.0));
        assert_eq!(placements[9].position, Point::new(300.0, 300.0));
    }

    #[test]
    fn test_perfect_square() {
        assert_eq!(column_count(9), 3);
        assert_eq!(grid(9)[8].position, Point::new(600.0, 300.0));
    }

    #[test]
    fn test_single_node_at_origin() {
        let placements = grid(1);
        assert_eq!(placements[0].position, Point::ORIGIN);
        assert_eq!(placements[0].anchor_in, Side::Top);
        assert_eq!(placements[0].anchor_out, Side::Bottom);
    }
}
