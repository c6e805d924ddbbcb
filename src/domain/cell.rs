//! Table cell annotations
//!
//! A cell is stored as 4 points in the fixed winding order
//! `[top-left, top-right, bottom-right, bottom-left]`. Every mutation keeps
//! the points an axis-aligned rectangle.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::geometry::{Bounds, Corner, Edge, Point};

/// Stable cell identity, assigned at creation and never reused
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CellId(pub u64);

impl fmt::Display for CellId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "cell#{}", self.0)
    }
}

/// Per-edge border visibility
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CellLines {
    pub top: bool,
    pub bottom: bool,
    pub left: bool,
    pub right: bool,
}

impl Default for CellLines {
    fn default() -> Self {
        Self::all(true)
    }
}

impl CellLines {
    pub const fn all(visible: bool) -> Self {
        Self {
            top: visible,
            bottom: visible,
            left: visible,
            right: visible,
        }
    }

    pub fn get(&self, edge: Edge) -> bool {
        match edge {
            Edge::Top => self.top,
            Edge::Bottom => self.bottom,
            Edge::Left => self.left,
            Edge::Right => self.right,
        }
    }

    pub fn set(&mut self, edge: Edge, visible: bool) {
        match edge {
            Edge::Top => self.top = visible,
            Edge::Bottom => self.bottom = visible,
            Edge::Left => self.left = visible,
            Edge::Right => self.right = visible,
        }
    }

    /// Apply only the flags present in the patch
    pub fn apply(&mut self, patch: CellLinesPatch) {
        if let Some(top) = patch.top {
            self.top = top;
        }
        if let Some(bottom) = patch.bottom {
            self.bottom = bottom;
        }
        if let Some(left) = patch.left {
            self.left = left;
        }
        if let Some(right) = patch.right {
            self.right = right;
        }
    }
}

/// Partial update of [`CellLines`]
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CellLinesPatch {
    pub top: Option<bool>,
    pub bottom: Option<bool>,
    pub left: Option<bool>,
    pub right: Option<bool>,
}

impl CellLinesPatch {
    /// Patch touching a single edge
    pub fn edge(edge: Edge, visible: bool) -> Self {
        let mut patch = Self::default();
        match edge {
            Edge::Top => patch.top = Some(visible),
            Edge::Bottom => patch.bottom = Some(visible),
            Edge::Left => patch.left = Some(visible),
            Edge::Right => patch.right = Some(visible),
        }
        patch
    }

    pub fn all(visible: bool) -> Self {
        Self {
            top: Some(visible),
            bottom: Some(visible),
            left: Some(visible),
            right: Some(visible),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.top.is_none() && self.bottom.is_none() && self.left.is_none() && self.right.is_none()
    }
}

/// Row/column range a cell occupies in the logical table grid
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CellSpan {
    pub start_row: u32,
    pub end_row: u32,
    pub start_col: u32,
    pub end_col: u32,
}

/// Serializable color representation, presentation only
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CellColor {
    pub r: f32,
    pub g: f32,
    pub b: f32,
}

impl Default for CellColor {
    fn default() -> Self {
        Self {
            r: 0.1,
            g: 0.4,
            b: 0.9,
        }
    }
}

impl CellColor {
    /// Convert to RGBA bytes (0-255)
    pub fn to_rgba_u8(self, opacity: f32) -> [u8; 4] {
        [
            (self.r.clamp(0.0, 1.0) * 255.0).round() as u8,
            (self.g.clamp(0.0, 1.0) * 255.0).round() as u8,
            (self.b.clamp(0.0, 1.0) * 255.0).round() as u8,
            (opacity.clamp(0.0, 1.0) * 255.0).round() as u8,
        ]
    }
}

/// One rectangular table-cell annotation
#[derive(Clone, Debug, PartialEq)]
pub struct Cell {
    id: CellId,
    points: [Point; 4],
    pub lines: CellLines,
    pub span: CellSpan,
    pub color: Option<CellColor>,
    pub opacity: Option<f32>,
}

impl Cell {
    /// Create a cell covering `bounds` with all borders visible
    pub fn from_bounds(id: CellId, bounds: Bounds) -> Self {
        Self {
            id,
            points: bounds.corners(),
            lines: CellLines::default(),
            span: CellSpan::default(),
            color: None,
            opacity: None,
        }
    }

    /// Create a cell from arbitrary points, normalised to their bounding rectangle
    pub fn from_points(id: CellId, points: [Point; 4]) -> Self {
        let bounds = Bounds::from_points(&points).unwrap_or_default();
        Self::from_bounds(id, bounds)
    }

    pub fn id(&self) -> CellId {
        self.id
    }

    pub fn points(&self) -> &[Point; 4] {
        &self.points
    }

    pub fn point(&self, corner: Corner) -> Point {
        self.points[corner.index()]
    }

    pub fn bounds(&self) -> Bounds {
        let [tl, tr, br, bl] = self.points;
        Bounds {
            min_x: tl.x.min(tr.x).min(br.x).min(bl.x),
            min_y: tl.y.min(tr.y).min(br.y).min(bl.y),
            max_x: tl.x.max(tr.x).max(br.x).max(bl.x),
            max_y: tl.y.max(tr.y).max(br.y).max(bl.y),
        }
    }

    /// Translate all 4 points; edge flags are untouched
    pub fn move_by(&mut self, dx: f32, dy: f32) {
        for p in &mut self.points {
            *p = p.translate(dx, dy);
        }
    }

    /// Move only the points that define `edge`
    pub fn set_edge_position(&mut self, edge: Edge, value: f32) {
        let [a, b] = edge.point_indices();
        match edge {
            Edge::Top | Edge::Bottom => {
                self.points[a].y = value;
                self.points[b].y = value;
            }
            Edge::Left | Edge::Right => {
                self.points[a].x = value;
                self.points[b].x = value;
            }
        }
    }

    /// Move one corner and carry its x/y over to the two adjacent corners
    pub fn drag_corner(&mut self, corner: Corner, to: Point) {
        self.points[corner.index()] = to;
        self.points[corner.x_neighbor().index()].x = to.x;
        self.points[corner.y_neighbor().index()].y = to.y;
    }

    /// Replace the geometry with the given bounds
    pub fn set_bounds(&mut self, bounds: Bounds) {
        self.points = bounds.corners();
    }

    /// Re-emit the points in canonical winding order if a drag flipped them
    pub fn normalize(&mut self) {
        self.points = self.bounds().corners();
    }

    /// Width and height measured from the top-left point; negative once a drag
    /// has carried a corner past the opposite edge
    pub fn signed_size(&self) -> (f32, f32) {
        let [tl, tr, _, bl] = self.points;
        (tr.x - tl.x, bl.y - tl.y)
    }

    /// Adjacent corners share their coordinate on the common axis
    pub fn is_rectangular(&self) -> bool {
        let [tl, tr, br, bl] = self.points;
        tl.y == tr.y && tr.x == br.x && br.y == bl.y && bl.x == tl.x
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cell() -> Cell {
        Cell::from_bounds(CellId(1), Bounds::new(10.0, 10.0, 110.0, 60.0))
    }

    #[test]
    fn test_bounds_from_points() {
        assert_eq!(cell().bounds(), Bounds::new(10.0, 10.0, 110.0, 60.0));
    }

    #[test]
    fn test_move_keeps_flags_and_shape() {
        let mut c = cell();
        c.lines.left = false;
        c.move_by(5.0, -3.0);
        assert_eq!(c.bounds(), Bounds::new(15.0, 7.0, 115.0, 57.0));
        assert!(!c.lines.left);
        assert!(c.is_rectangular());

        let before = c.bounds();
        c.move_by(0.0, 0.0);
        assert_eq!(c.bounds(), before);
    }

    #[test]
    fn test_set_edge_position_moves_two_points() {
        let mut c = cell();
        c.set_edge_position(Edge::Right, 150.0);
        assert_eq!(c.bounds(), Bounds::new(10.0, 10.0, 150.0, 60.0));
        c.set_edge_position(Edge::Top, 0.0);
        assert_eq!(c.bounds(), Bounds::new(10.0, 0.0, 150.0, 60.0));
        assert!(c.is_rectangular());
    }

    #[test]
    fn test_drag_corner_propagates_to_neighbours() {
        let mut c = cell();
        c.drag_corner(Corner::TopLeft, Point::new(0.0, 5.0));
        assert_eq!(c.point(Corner::BottomLeft).x, 0.0);
        assert_eq!(c.point(Corner::TopRight).y, 5.0);
        assert_eq!(c.point(Corner::BottomRight), Point::new(110.0, 60.0));
        assert!(c.is_rectangular());

        c.drag_corner(Corner::BottomRight, Point::new(200.0, 90.0));
        assert_eq!(c.bounds(), Bounds::new(0.0, 5.0, 200.0, 90.0));
        assert!(c.is_rectangular());
    }

    #[test]
    fn test_normalize_restores_winding_after_flip() {
        let mut c = cell();
        c.drag_corner(Corner::TopLeft, Point::new(200.0, 10.0));
        assert!(c.is_rectangular());
        c.normalize();
        assert_eq!(c.point(Corner::TopLeft), Point::new(110.0, 10.0));
        assert_eq!(c.point(Corner::BottomRight), Point::new(200.0, 60.0));
    }

    #[test]
    fn test_from_points_normalizes_quadrilateral() {
        let c = Cell::from_points(
            CellId(2),
            [
                Point::new(0.0, 1.0),
                Point::new(10.0, 0.0),
                Point::new(11.0, 10.0),
                Point::new(1.0, 9.0),
            ],
        );
        assert!(c.is_rectangular());
        assert_eq!(c.bounds(), Bounds::new(0.0, 0.0, 11.0, 10.0));
    }

    #[test]
    fn test_lines_patch_applies_only_present_flags() {
        let mut lines = CellLines::default();
        lines.apply(CellLinesPatch::edge(Edge::Bottom, false));
        assert_eq!(
            lines,
            CellLines {
                top: true,
                bottom: false,
                left: true,
                right: true
            }
        );
        assert!(CellLinesPatch::default().is_empty());
    }
}
