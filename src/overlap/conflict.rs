//! Border conflict detection
//!
//! Two nearly-aligned edges of different cells describe the same physical
//! table border. When their visibility flags disagree over a shared stretch,
//! that stretch is reported as a conflict.

use serde::Serialize;

use crate::domain::{Axis, Bounds, Cell, CellId, Edge, Point};

/// Tolerances for conflict detection
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ConflictConfig {
    /// Maximum distance between two edges that are treated as the same border
    pub align_tolerance: f32,
    /// Exact-equality tolerance; shared stretches shorter than this are ignored
    pub epsilon: f32,
}

impl Default for ConflictConfig {
    fn default() -> Self {
        Self {
            align_tolerance: 3.0,
            epsilon: 0.5,
        }
    }
}

/// A stretch of border whose visibility the two cells disagree on
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct BorderConflict {
    pub a: CellId,
    pub a_edge: Edge,
    pub b: CellId,
    pub b_edge: Edge,
    /// Segment start at the averaged border position
    pub start: Point,
    pub end: Point,
    /// True when the two edges sit within `epsilon` of each other
    pub exact: bool,
}

/// Edge pairings checked per axis: abutting first, then same-side alignment
const HORIZONTAL_PAIRS: [(Edge, Edge); 4] = [
    (Edge::Top, Edge::Bottom),
    (Edge::Bottom, Edge::Top),
    (Edge::Top, Edge::Top),
    (Edge::Bottom, Edge::Bottom),
];

const VERTICAL_PAIRS: [(Edge, Edge); 4] = [
    (Edge::Left, Edge::Right),
    (Edge::Right, Edge::Left),
    (Edge::Left, Edge::Left),
    (Edge::Right, Edge::Right),
];

/// Interval shared by the two cells along the border direction
fn shared_interval(a: Bounds, b: Bounds, along: Axis) -> (f32, f32) {
    match along {
        Axis::Horizontal => (a.min_x.max(b.min_x), a.max_x.min(b.max_x)),
        Axis::Vertical => (a.min_y.max(b.min_y), a.max_y.min(b.max_y)),
    }
}

fn pair_conflicts(a: &Cell, b: &Cell, config: ConflictConfig, out: &mut Vec<BorderConflict>) {
    let (ba, bb) = (a.bounds(), b.bounds());
    let align_tolerance = config.align_tolerance.max(config.epsilon);

    // Top/bottom borders run horizontally, left/right borders run vertically.
    for (pairs, along) in [
        (&HORIZONTAL_PAIRS, Axis::Horizontal),
        (&VERTICAL_PAIRS, Axis::Vertical),
    ] {
        let (start, end) = shared_interval(ba, bb, along);
        if end - start <= config.epsilon {
            continue;
        }
        for &(a_edge, b_edge) in pairs {
            let pa = ba.edge(a_edge);
            let pb = bb.edge(b_edge);
            let gap = (pa - pb).abs();
            if gap > align_tolerance || a.lines.get(a_edge) == b.lines.get(b_edge) {
                continue;
            }
            let at = (pa + pb) * 0.5;
            let (start, end) = match along {
                Axis::Horizontal => (Point::new(start, at), Point::new(end, at)),
                Axis::Vertical => (Point::new(at, start), Point::new(at, end)),
            };
            out.push(BorderConflict {
                a: a.id(),
                a_edge,
                b: b.id(),
                b_edge,
                start,
                end,
                exact: gap <= config.epsilon,
            });
        }
    }
}

/// Check every unordered cell pair once for disagreeing shared borders
pub fn detect_border_conflicts(cells: &[Cell], config: ConflictConfig) -> Vec<BorderConflict> {
    let mut conflicts = Vec::new();
    for (i, a) in cells.iter().enumerate() {
        for b in &cells[i + 1..] {
            pair_conflicts(a, b, config, &mut conflicts);
        }
    }
    conflicts
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cell(id: u64, b: Bounds) -> Cell {
        Cell::from_bounds(CellId(id), b)
    }

    #[test]
    fn test_stacked_cells_with_disagreeing_border() {
        let mut upper = cell(1, Bounds::new(0.0, 0.0, 100.0, 50.0));
        let lower = cell(2, Bounds::new(20.0, 51.0, 140.0, 90.0));
        upper.lines.bottom = false;

        let conflicts = detect_border_conflicts(&[upper, lower], ConflictConfig::default());
        assert_eq!(conflicts.len(), 1);
        let c = &conflicts[0];
        assert_eq!((c.a_edge, c.b_edge), (Edge::Bottom, Edge::Top));
        assert_eq!(c.start, Point::new(20.0, 50.5));
        assert_eq!(c.end, Point::new(100.0, 50.5));
        assert!(!c.exact);
    }

    #[test]
    fn test_agreeing_flags_are_not_conflicts() {
        let upper = cell(1, Bounds::new(0.0, 0.0, 100.0, 50.0));
        let lower = cell(2, Bounds::new(0.0, 50.0, 100.0, 90.0));
        assert!(detect_border_conflicts(&[upper, lower], ConflictConfig::default()).is_empty());
    }

    #[test]
    fn test_side_by_side_exact_conflict() {
        let left = cell(1, Bounds::new(0.0, 0.0, 50.0, 40.0));
        let mut right = cell(2, Bounds::new(50.0, 10.0, 90.0, 60.0));
        right.lines.left = false;
        let conflicts = detect_border_conflicts(&[left, right], ConflictConfig::default());
        let shared: Vec<_> = conflicts
            .iter()
            .filter(|c| c.a_edge == Edge::Right && c.b_edge == Edge::Left)
            .collect();
        assert_eq!(shared.len(), 1);
        assert!(shared[0].exact);
        assert_eq!(shared[0].start, Point::new(50.0, 10.0));
        assert_eq!(shared[0].end, Point::new(50.0, 40.0));
    }

    #[test]
    fn test_same_side_alignment_detected() {
        // A wide spanning cell whose top lines up with a narrower one on top of it.
        let mut wide = cell(1, Bounds::new(0.0, 10.0, 200.0, 50.0));
        let narrow = cell(2, Bounds::new(0.0, 12.0, 100.0, 30.0));
        wide.lines.top = false;
        let conflicts = detect_border_conflicts(&[wide, narrow], ConflictConfig::default());
        assert!(
            conflicts
                .iter()
                .any(|c| c.a_edge == Edge::Top && c.b_edge == Edge::Top)
        );
    }

    #[test]
    fn test_cell_order_only_swaps_roles() {
        let mut upper = cell(1, Bounds::new(0.0, 0.0, 100.0, 50.0));
        let mut lower = cell(2, Bounds::new(20.0, 51.0, 140.0, 90.0));
        upper.lines.bottom = false;
        lower.lines.left = false;
        let mut beside = cell(3, Bounds::new(141.0, 50.0, 200.0, 90.0));
        beside.lines.left = false;

        let config = ConflictConfig::default();
        let forward = detect_border_conflicts(&[upper.clone(), lower.clone()], config);
        let backward = detect_border_conflicts(&[lower.clone(), upper.clone()], config);
        assert!(!forward.is_empty());
        assert_eq!(forward.len(), backward.len());
        for c in &forward {
            let mirrored = BorderConflict {
                a: c.b,
                a_edge: c.b_edge,
                b: c.a,
                b_edge: c.a_edge,
                ..c.clone()
            };
            assert!(backward.contains(&mirrored), "missing {mirrored:?}");
        }

        let three =
            detect_border_conflicts(&[upper.clone(), lower.clone(), beside.clone()], config);
        let shuffled = detect_border_conflicts(&[beside, lower, upper], config);
        assert_eq!(three.len(), 2);
        assert_eq!(shuffled.len(), 2);
    }

    #[test]
    fn test_beyond_tolerance_or_disjoint_ignored() {
        let mut upper = cell(1, Bounds::new(0.0, 0.0, 100.0, 50.0));
        upper.lines.bottom = false;
        let far = cell(2, Bounds::new(0.0, 60.0, 100.0, 90.0));
        let beside = cell(3, Bounds::new(200.0, 50.0, 300.0, 90.0));
        let conflicts =
            detect_border_conflicts(&[upper, far, beside], ConflictConfig::default());
        assert!(conflicts.is_empty());
    }
}
