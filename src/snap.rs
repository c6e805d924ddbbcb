//! Snapping engine
//!
//! Aligns a moved or resized cell to nearby cells within a pixel threshold.
//! Every function here is pure: the same dragged geometry, targets and
//! threshold always produce the same result. The interaction layer calls them
//! on every pointer move for live preview and again for the final commit.
//!
//! Snapping is distance-gated only. Movement direction does not matter.

use crate::domain::{Bounds, Cell, CellId, Corner, Edge, Point};

/// Default snap distance in document pixels
pub const DEFAULT_THRESHOLD: f32 = 5.0;

/// A cell that can be snapped against
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SnapTarget {
    pub id: CellId,
    pub bounds: Bounds,
}

/// Collect snap targets from a cell list, skipping excluded ids
pub fn snap_targets<'a>(
    cells: impl IntoIterator<Item = &'a Cell>,
    exclude: impl Fn(CellId) -> bool,
) -> Vec<SnapTarget> {
    cells
        .into_iter()
        .filter(|c| !exclude(c.id()))
        .map(|c| SnapTarget {
            id: c.id(),
            bounds: c.bounds(),
        })
        .collect()
}

/// Best alignment found on one axis
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct EdgeMatch {
    pub cell_id: CellId,
    /// Edge of the dragged cell that aligns
    pub dragged_edge: Edge,
    /// Edge of the target cell it aligns to
    pub target_edge: Edge,
    /// Correction to add to the proposed position
    pub offset: f32,
}

impl EdgeMatch {
    pub fn distance(&self) -> f32 {
        self.offset.abs()
    }
}

/// Which edge pairs take part in a move snap
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SnapScope {
    /// The 4 cross-edge pairs: right/left, left/right, bottom/top, top/bottom
    All,
    /// Only the grabbed edge, against the opposite and same-side edge of others
    Edge(Edge),
    /// Cross-edge pairs for one vertical and one horizontal edge (rectangle draw)
    Free { x_edge: Edge, y_edge: Edge },
}

impl SnapScope {
    fn pairs(self) -> (Vec<(Edge, Edge)>, Vec<(Edge, Edge)>) {
        match self {
            SnapScope::All => (
                vec![(Edge::Right, Edge::Left), (Edge::Left, Edge::Right)],
                vec![(Edge::Bottom, Edge::Top), (Edge::Top, Edge::Bottom)],
            ),
            SnapScope::Edge(edge) => {
                let pairs = vec![(edge, edge.opposite()), (edge, edge)];
                match edge {
                    Edge::Left | Edge::Right => (pairs, Vec::new()),
                    Edge::Top | Edge::Bottom => (Vec::new(), pairs),
                }
            }
            SnapScope::Free { x_edge, y_edge } => (
                vec![(x_edge, x_edge.opposite())],
                vec![(y_edge, y_edge.opposite())],
            ),
        }
    }
}

/// Result of a move snap
#[derive(Clone, Debug, Default, PartialEq)]
pub struct SnapResult {
    /// Corrected horizontal delta
    pub delta_x: f32,
    /// Corrected vertical delta
    pub delta_y: f32,
    pub x: Option<EdgeMatch>,
    pub y: Option<EdgeMatch>,
    /// Contributing cells, closest match first, de-duplicated
    pub matched_cell_ids: Vec<CellId>,
}

impl SnapResult {
    fn unsnapped(dx: f32, dy: f32) -> Self {
        Self {
            delta_x: dx,
            delta_y: dy,
            ..Self::default()
        }
    }

    pub fn is_snapped(&self) -> bool {
        self.x.is_some() || self.y.is_some()
    }
}

fn keep_closest(best: &mut Option<EdgeMatch>, candidate: EdgeMatch) {
    // Strictly closer wins, so ties keep the first target in iteration order.
    if best.is_none_or(|b| candidate.distance() < b.distance()) {
        *best = Some(candidate);
    }
}

fn within(m: Option<EdgeMatch>, threshold: f32) -> Option<EdgeMatch> {
    m.filter(|m| m.distance() <= threshold)
}

fn matched_ids(x: Option<EdgeMatch>, y: Option<EdgeMatch>) -> Vec<CellId> {
    let mut matches: Vec<EdgeMatch> = x.into_iter().chain(y).collect();
    matches.sort_by(|a, b| a.distance().total_cmp(&b.distance()));
    let mut ids: Vec<CellId> = Vec::with_capacity(matches.len());
    for m in matches {
        if !ids.contains(&m.cell_id) {
            ids.push(m.cell_id);
        }
    }
    ids
}

/// Snap a proposed move of `dragged` by `(dx, dy)` against the targets
pub fn move_snap(
    dragged: Bounds,
    dx: f32,
    dy: f32,
    targets: &[SnapTarget],
    threshold: f32,
    scope: SnapScope,
) -> SnapResult {
    if threshold <= 0.0 {
        return SnapResult::unsnapped(dx, dy);
    }

    let proposed = dragged.translate(dx, dy);
    let (horizontal, vertical) = scope.pairs();
    let mut best_x = None;
    let mut best_y = None;

    for target in targets {
        for &(dragged_edge, target_edge) in &horizontal {
            keep_closest(
                &mut best_x,
                EdgeMatch {
                    cell_id: target.id,
                    dragged_edge,
                    target_edge,
                    offset: target.bounds.edge(target_edge) - proposed.edge(dragged_edge),
                },
            );
        }
        for &(dragged_edge, target_edge) in &vertical {
            keep_closest(
                &mut best_y,
                EdgeMatch {
                    cell_id: target.id,
                    dragged_edge,
                    target_edge,
                    offset: target.bounds.edge(target_edge) - proposed.edge(dragged_edge),
                },
            );
        }
    }

    let x = within(best_x, threshold);
    let y = within(best_y, threshold);
    if x.is_some() || y.is_some() {
        log::debug!("move snap x={x:?} y={y:?}");
    }

    SnapResult {
        delta_x: dx + x.map_or(0.0, |m| m.offset),
        delta_y: dy + y.map_or(0.0, |m| m.offset),
        x,
        y,
        matched_cell_ids: matched_ids(x, y),
    }
}

/// Distance-only move snap over all cross-edge pairs
pub fn calculate_snap(
    dragged: Bounds,
    dx: f32,
    dy: f32,
    targets: &[SnapTarget],
    threshold: f32,
) -> SnapResult {
    move_snap(dragged, dx, dy, targets, threshold, SnapScope::All)
}

/// Nearest corner of another cell
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CornerSnap {
    pub cell_id: CellId,
    pub corner: Corner,
    pub point: Point,
    pub distance: f32,
}

/// Find the nearest corner of any target within `threshold` (Euclidean)
pub fn corner_snap(p: Point, targets: &[SnapTarget], threshold: f32) -> Option<CornerSnap> {
    if threshold <= 0.0 {
        return None;
    }
    let mut best: Option<CornerSnap> = None;
    for target in targets {
        for (corner, point) in Corner::ALL.into_iter().zip(target.bounds.corners()) {
            let distance = p.distance_to(point);
            if distance <= threshold && best.is_none_or(|b| distance < b.distance) {
                best = Some(CornerSnap {
                    cell_id: target.id,
                    corner,
                    point,
                    distance,
                });
            }
        }
    }
    best
}

/// Result of snapping a dragged corner during resize
#[derive(Clone, Debug, PartialEq)]
pub struct ResizeSnap {
    /// Corner position after snapping
    pub point: Point,
    pub x: Option<EdgeMatch>,
    pub y: Option<EdgeMatch>,
    /// Only set when no edge alignment was found
    pub corner: Option<CornerSnap>,
    pub matched_cell_ids: Vec<CellId>,
}

impl ResizeSnap {
    pub fn is_snapped(&self) -> bool {
        self.x.is_some() || self.y.is_some() || self.corner.is_some()
    }
}

fn edge_alignment(
    value: f32,
    dragged_edge: Edge,
    targets: &[SnapTarget],
    threshold: f32,
) -> Option<EdgeMatch> {
    let mut best = None;
    for target in targets {
        // Matching edge first so an exact tie prefers alignment over abutment.
        for target_edge in [dragged_edge, dragged_edge.opposite()] {
            keep_closest(
                &mut best,
                EdgeMatch {
                    cell_id: target.id,
                    dragged_edge,
                    target_edge,
                    offset: target.bounds.edge(target_edge) - value,
                },
            );
        }
    }
    within(best, threshold)
}

/// Snap a dragged corner: edge alignment first, nearest corner as fallback
pub fn resize_snap(
    corner: Corner,
    proposed: Point,
    targets: &[SnapTarget],
    threshold: f32,
) -> ResizeSnap {
    if threshold <= 0.0 {
        return ResizeSnap {
            point: proposed,
            x: None,
            y: None,
            corner: None,
            matched_cell_ids: Vec::new(),
        };
    }

    let x = edge_alignment(proposed.x, corner.x_edge(), targets, threshold);
    let y = edge_alignment(proposed.y, corner.y_edge(), targets, threshold);

    if x.is_some() || y.is_some() {
        let point = Point::new(
            proposed.x + x.map_or(0.0, |m| m.offset),
            proposed.y + y.map_or(0.0, |m| m.offset),
        );
        return ResizeSnap {
            point,
            x,
            y,
            corner: None,
            matched_cell_ids: matched_ids(x, y),
        };
    }

    match corner_snap(proposed, targets, threshold) {
        Some(hit) => ResizeSnap {
            point: hit.point,
            x: None,
            y: None,
            corner: Some(hit),
            matched_cell_ids: vec![hit.cell_id],
        },
        None => ResizeSnap {
            point: proposed,
            x: None,
            y: None,
            corner: None,
            matched_cell_ids: Vec::new(),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn target(id: u64, b: Bounds) -> SnapTarget {
        SnapTarget {
            id: CellId(id),
            bounds: b,
        }
    }

    #[test]
    fn test_right_edge_snaps_to_left_edge() {
        let a = Bounds::new(0.0, 0.0, 100.0, 50.0);
        let targets = [target(2, Bounds::new(104.0, 0.0, 200.0, 50.0))];
        let result = calculate_snap(a, 3.0, 0.0, &targets, 5.0);
        assert_eq!(result.delta_x, 4.0);
        assert_eq!(result.delta_y, 0.0);
        assert_eq!(result.matched_cell_ids, vec![CellId(2)]);
        let x = result.x.unwrap();
        assert_eq!((x.dragged_edge, x.target_edge), (Edge::Right, Edge::Left));
    }

    #[test]
    fn test_threshold_boundary() {
        let a = Bounds::new(0.0, 0.0, 100.0, 50.0);
        let eps = 0.01;
        let near = [target(2, Bounds::new(100.0 + 5.0 - eps, 0.0, 200.0, 50.0))];
        let far = [target(2, Bounds::new(100.0 + 5.0 + eps, 0.0, 200.0, 50.0))];
        assert!(calculate_snap(a, 0.0, 0.0, &near, 5.0).x.is_some());
        let miss = calculate_snap(a, 0.0, 0.0, &far, 5.0);
        assert!(miss.x.is_none());
        assert_eq!(miss.delta_x, 0.0);
    }

    #[test]
    fn test_snaps_regardless_of_direction() {
        // Moving away from the target still snaps back when within threshold.
        let a = Bounds::new(0.0, 0.0, 100.0, 50.0);
        let targets = [target(2, Bounds::new(102.0, 0.0, 200.0, 50.0))];
        let result = calculate_snap(a, -1.0, 0.0, &targets, 5.0);
        assert_eq!(result.delta_x, 2.0);
    }

    #[test]
    fn test_both_axes_report_distinct_cells() {
        let a = Bounds::new(0.0, 0.0, 100.0, 50.0);
        let targets = [
            target(2, Bounds::new(103.0, 200.0, 200.0, 300.0)),
            target(3, Bounds::new(300.0, 51.0, 400.0, 80.0)),
        ];
        let result = calculate_snap(a, 0.0, 0.0, &targets, 5.0);
        assert_eq!(result.delta_x, 3.0);
        assert_eq!(result.delta_y, 1.0);
        // Closest match first.
        assert_eq!(result.matched_cell_ids, vec![CellId(3), CellId(2)]);
    }

    #[test]
    fn test_same_cell_on_both_axes_reported_once() {
        let a = Bounds::new(0.0, 0.0, 100.0, 50.0);
        let targets = [target(2, Bounds::new(102.0, 52.0, 200.0, 100.0))];
        let result = calculate_snap(a, 0.0, 0.0, &targets, 5.0);
        assert_eq!(result.matched_cell_ids, vec![CellId(2)]);
    }

    #[test]
    fn test_edge_scope_ignores_other_edges() {
        let a = Bounds::new(0.0, 0.0, 100.0, 50.0);
        // Right edge is 2px from target's left edge, bottom is 1px from another top.
        let targets = [
            target(2, Bounds::new(102.0, 0.0, 200.0, 50.0)),
            target(3, Bounds::new(10.0, 51.0, 90.0, 90.0)),
        ];
        let left_only = move_snap(a, 0.0, 0.0, &targets, 5.0, SnapScope::Edge(Edge::Left));
        assert!(!left_only.is_snapped());

        let right = move_snap(a, 0.0, 0.0, &targets, 5.0, SnapScope::Edge(Edge::Right));
        assert_eq!(right.delta_x, 2.0);
        assert_eq!(right.delta_y, 0.0);
    }

    #[test]
    fn test_edge_scope_aligns_same_side() {
        let a = Bounds::new(3.0, 100.0, 50.0, 150.0);
        let targets = [target(2, Bounds::new(0.0, 0.0, 80.0, 40.0))];
        let result = move_snap(a, 0.0, 0.0, &targets, 5.0, SnapScope::Edge(Edge::Left));
        assert_eq!(result.delta_x, -3.0);
        assert_eq!(result.x.unwrap().target_edge, Edge::Left);
    }

    #[test]
    fn test_corner_snap_nearest_within_threshold() {
        let targets = [
            target(2, Bounds::new(100.0, 100.0, 200.0, 200.0)),
            target(3, Bounds::new(0.0, 0.0, 97.0, 98.0)),
        ];
        let hit = corner_snap(Point::new(98.0, 99.0), &targets, 5.0).unwrap();
        assert_eq!(hit.cell_id, CellId(3));
        assert_eq!(hit.point, Point::new(97.0, 98.0));
        assert!(corner_snap(Point::new(50.0, 50.0), &targets, 5.0).is_none());
    }

    #[test]
    fn test_resize_prefers_edge_over_corner() {
        let targets = [target(2, Bounds::new(100.0, 0.0, 200.0, 50.0))];
        // Close to the (100, 50) corner but the x edge alone is closer to align.
        let snap = resize_snap(Corner::BottomRight, Point::new(101.0, 60.0), &targets, 5.0);
        assert_eq!(snap.point, Point::new(100.0, 60.0));
        assert!(snap.corner.is_none());
        assert_eq!(snap.x.unwrap().target_edge, Edge::Left);
    }

    #[test]
    fn test_resize_aligns_matching_edge() {
        let targets = [target(2, Bounds::new(300.0, 0.0, 400.0, 48.0))];
        let snap = resize_snap(Corner::BottomRight, Point::new(120.0, 50.0), &targets, 5.0);
        assert_eq!(snap.point, Point::new(120.0, 48.0));
        assert_eq!(snap.y.unwrap().target_edge, Edge::Bottom);
    }

    #[test]
    fn test_disabled_threshold_passes_through() {
        let a = Bounds::new(0.0, 0.0, 100.0, 50.0);
        let targets = [target(2, Bounds::new(101.0, 0.0, 200.0, 50.0))];
        let result = calculate_snap(a, 0.0, 0.0, &targets, 0.0);
        assert!(!result.is_snapped());
        let p = Point::new(99.0, 3.0);
        assert_eq!(resize_snap(Corner::TopLeft, p, &targets, 0.0).point, p);
    }
}
