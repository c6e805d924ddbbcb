//! Overlap and border-conflict analysis
//!
//! Detectors only read the cell set and produce advisory data for
//! highlighting. They never correct geometry.

pub mod clip;
pub mod conflict;

use std::collections::{BTreeSet, VecDeque};

use serde::Serialize;

use crate::domain::{Cell, CellId, Point};

pub use conflict::{BorderConflict, ConflictConfig, detect_border_conflicts};

/// Two cells whose areas intersect
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Overlap {
    pub a: CellId,
    pub b: CellId,
    /// Intersection polygon, for highlighting only
    pub polygon: Vec<Point>,
}

/// Intersection polygon of two cells, `None` unless it has positive area
pub fn cell_overlap(a: &Cell, b: &Cell) -> Option<Vec<Point>> {
    let (ba, bb) = (a.bounds(), b.bounds());
    if !ba.touches(bb) {
        return None;
    }
    if a.is_rectangular() && b.is_rectangular() {
        return clip::rect_intersection(ba, bb).map(|p| p.to_vec());
    }
    let polygon = clip::polygon_intersection(a.points(), b.points());
    (!polygon.is_empty()).then_some(polygon)
}

pub fn cells_overlap(a: &Cell, b: &Cell) -> bool {
    cell_overlap(a, b).is_some()
}

/// Every overlapping pair, each unordered pair reported once in insertion order
pub fn detect_overlaps(cells: &[Cell]) -> Vec<Overlap> {
    let mut overlaps = Vec::new();
    for (i, a) in cells.iter().enumerate() {
        for b in &cells[i + 1..] {
            if let Some(polygon) = cell_overlap(a, b) {
                overlaps.push(Overlap {
                    a: a.id(),
                    b: b.id(),
                    polygon,
                });
            }
        }
    }
    overlaps
}

/// Transitive closure of "overlaps with" around `seed`, sorted by id.
///
/// Returns an empty list when the seed does not exist and `[seed]` when it
/// overlaps nothing.
pub fn overlap_group(cells: &[Cell], seed: CellId) -> Vec<CellId> {
    if !cells.iter().any(|c| c.id() == seed) {
        return Vec::new();
    }

    let mut group = BTreeSet::from([seed]);
    let mut queue = VecDeque::from([seed]);
    while let Some(current_id) = queue.pop_front() {
        let Some(current) = cells.iter().find(|c| c.id() == current_id) else {
            continue;
        };
        for other in cells {
            if group.contains(&other.id()) {
                continue;
            }
            if cells_overlap(current, other) {
                group.insert(other.id());
                queue.push_back(other.id());
            }
        }
    }
    group.into_iter().collect()
}

/// All connected overlap groups with more than one member
pub fn overlap_groups(cells: &[Cell]) -> Vec<Vec<CellId>> {
    let mut seen = BTreeSet::new();
    let mut groups = Vec::new();
    for cell in cells {
        if seen.contains(&cell.id()) {
            continue;
        }
        let group = overlap_group(cells, cell.id());
        seen.extend(group.iter().copied());
        if group.len() > 1 {
            groups.push(group);
        }
    }
    groups
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Bounds;

    fn cell(id: u64, b: Bounds) -> Cell {
        Cell::from_bounds(CellId(id), b)
    }

    #[test]
    fn test_detect_overlaps_reports_pairs_once() {
        let cells = vec![
            cell(1, Bounds::new(0.0, 0.0, 10.0, 10.0)),
            cell(2, Bounds::new(5.0, 5.0, 15.0, 15.0)),
            cell(3, Bounds::new(10.0, 0.0, 20.0, 4.0)),
        ];
        let overlaps = detect_overlaps(&cells);
        assert_eq!(overlaps.len(), 1);
        assert_eq!((overlaps[0].a, overlaps[0].b), (CellId(1), CellId(2)));
        assert_eq!(
            Bounds::from_points(&overlaps[0].polygon),
            Some(Bounds::new(5.0, 5.0, 10.0, 10.0))
        );
    }

    #[test]
    fn test_overlap_is_symmetric() {
        let a = cell(1, Bounds::new(0.0, 0.0, 10.0, 10.0));
        let b = cell(2, Bounds::new(3.0, -4.0, 12.0, 6.0));
        assert_eq!(cell_overlap(&a, &b), cell_overlap(&b, &a));
    }

    #[test]
    fn test_adjacent_cells_do_not_overlap() {
        let a = cell(1, Bounds::new(0.0, 0.0, 10.0, 10.0));
        let b = cell(2, Bounds::new(10.0, 0.0, 20.0, 10.0));
        assert!(!cells_overlap(&a, &b));
    }

    #[test]
    fn test_overlap_group_is_transitive_and_sorted() {
        let cells = vec![
            cell(9, Bounds::new(0.0, 0.0, 10.0, 10.0)),
            cell(4, Bounds::new(8.0, 0.0, 18.0, 10.0)),
            cell(7, Bounds::new(16.0, 0.0, 26.0, 10.0)),
            cell(1, Bounds::new(100.0, 0.0, 110.0, 10.0)),
        ];
        let group = overlap_group(&cells, CellId(9));
        assert_eq!(group, vec![CellId(4), CellId(7), CellId(9)]);
        assert_eq!(overlap_group(&cells, CellId(1)), vec![CellId(1)]);
        assert!(overlap_group(&cells, CellId(42)).is_empty());
        assert_eq!(overlap_groups(&cells), vec![group]);
    }
}
