//! Geometric types for cell rectangles in document-image pixel space

use serde::{Deserialize, Serialize};

/// A point in document-image pixel coordinates
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    /// Euclidean distance to another point
    pub fn distance_to(self, other: Point) -> f32 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        (dx * dx + dy * dy).sqrt()
    }

    pub fn translate(self, dx: f32, dy: f32) -> Point {
        Point::new(self.x + dx, self.y + dy)
    }

    pub fn is_finite(self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }
}

/// Axis-aligned bounds derived from a cell's corner points
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Bounds {
    pub min_x: f32,
    pub min_y: f32,
    pub max_x: f32,
    pub max_y: f32,
}

impl Bounds {
    pub const fn new(min_x: f32, min_y: f32, max_x: f32, max_y: f32) -> Self {
        Self {
            min_x,
            min_y,
            max_x,
            max_y,
        }
    }

    /// Build bounds from two arbitrary corner points
    pub fn from_corners(a: Point, b: Point) -> Self {
        Self {
            min_x: a.x.min(b.x),
            min_y: a.y.min(b.y),
            max_x: a.x.max(b.x),
            max_y: a.y.max(b.y),
        }
    }

    /// Min/max reduction over a set of points, `None` when empty
    pub fn from_points(points: &[Point]) -> Option<Self> {
        let first = points.first()?;
        let init = Bounds::new(first.x, first.y, first.x, first.y);
        Some(points[1..].iter().fold(init, |b, p| Bounds {
            min_x: b.min_x.min(p.x),
            min_y: b.min_y.min(p.y),
            max_x: b.max_x.max(p.x),
            max_y: b.max_y.max(p.y),
        }))
    }

    /// Calculate the intersection of two bounds, `None` unless the area is positive
    pub fn intersect(&self, other: Bounds) -> Option<Bounds> {
        let min_x = self.min_x.max(other.min_x);
        let min_y = self.min_y.max(other.min_y);
        let max_x = self.max_x.min(other.max_x);
        let max_y = self.max_y.min(other.max_y);
        if min_x < max_x && min_y < max_y {
            Some(Bounds {
                min_x,
                min_y,
                max_x,
                max_y,
            })
        } else {
            None
        }
    }

    /// Closed-interval overlap test used for cheap rejection before exact checks
    pub fn touches(&self, other: Bounds) -> bool {
        self.min_x <= other.max_x
            && other.min_x <= self.max_x
            && self.min_y <= other.max_y
            && other.min_y <= self.max_y
    }

    /// Translate the bounds by the given offset
    pub fn translate(&self, dx: f32, dy: f32) -> Bounds {
        Bounds {
            min_x: self.min_x + dx,
            min_y: self.min_y + dy,
            max_x: self.max_x + dx,
            max_y: self.max_y + dy,
        }
    }

    pub fn width(&self) -> f32 {
        self.max_x - self.min_x
    }

    pub fn height(&self) -> f32 {
        self.max_y - self.min_y
    }

    /// True when both dimensions strictly exceed `min_size`
    pub fn exceeds(&self, min_size: f32) -> bool {
        self.width() > min_size && self.height() > min_size
    }

    /// Check if these bounds contain a point (edges inclusive)
    pub fn contains_point(&self, p: Point) -> bool {
        p.x >= self.min_x && p.x <= self.max_x && p.y >= self.min_y && p.y <= self.max_y
    }

    /// Clamp to the `[0, width] x [0, height]` image raster
    pub fn clamp_to_image(&self, width: f32, height: f32) -> Bounds {
        Bounds {
            min_x: self.min_x.clamp(0.0, width),
            min_y: self.min_y.clamp(0.0, height),
            max_x: self.max_x.clamp(0.0, width),
            max_y: self.max_y.clamp(0.0, height),
        }
    }

    /// Position of one edge: x for left/right, y for top/bottom
    pub fn edge(&self, edge: Edge) -> f32 {
        match edge {
            Edge::Top => self.min_y,
            Edge::Bottom => self.max_y,
            Edge::Left => self.min_x,
            Edge::Right => self.max_x,
        }
    }

    /// Copy with one edge moved, re-normalised if it crossed the opposite edge
    pub fn with_edge(&self, edge: Edge, value: f32) -> Bounds {
        let mut b = *self;
        match edge {
            Edge::Top => b.min_y = value,
            Edge::Bottom => b.max_y = value,
            Edge::Left => b.min_x = value,
            Edge::Right => b.max_x = value,
        }
        Bounds::from_corners(Point::new(b.min_x, b.min_y), Point::new(b.max_x, b.max_y))
    }

    /// Edge closest to `p`; ties resolve in [`Edge::ALL`] order
    pub fn nearest_edge(&self, p: Point) -> Edge {
        let distance = |edge: Edge| match edge.axis() {
            Axis::Horizontal => (p.x - self.edge(edge)).abs(),
            Axis::Vertical => (p.y - self.edge(edge)).abs(),
        };
        Edge::ALL
            .into_iter()
            .fold((Edge::Top, f32::INFINITY), |(best, best_d), edge| {
                let d = distance(edge);
                if d < best_d { (edge, d) } else { (best, best_d) }
            })
            .0
    }

    /// Corner points in canonical winding order
    pub fn corners(&self) -> [Point; 4] {
        [
            Point::new(self.min_x, self.min_y),
            Point::new(self.max_x, self.min_y),
            Point::new(self.max_x, self.max_y),
            Point::new(self.min_x, self.max_y),
        ]
    }
}

/// Axis along which an edge position is measured
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Axis {
    /// Positions measured in x (left/right edges)
    Horizontal,
    /// Positions measured in y (top/bottom edges)
    Vertical,
}

/// One side of a cell rectangle
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Edge {
    Top,
    Bottom,
    Left,
    Right,
}

impl Edge {
    pub const ALL: [Edge; 4] = [Edge::Top, Edge::Bottom, Edge::Left, Edge::Right];

    /// Axis the edge position is measured on
    pub fn axis(self) -> Axis {
        match self {
            Edge::Left | Edge::Right => Axis::Horizontal,
            Edge::Top | Edge::Bottom => Axis::Vertical,
        }
    }

    pub fn opposite(self) -> Edge {
        match self {
            Edge::Top => Edge::Bottom,
            Edge::Bottom => Edge::Top,
            Edge::Left => Edge::Right,
            Edge::Right => Edge::Left,
        }
    }

    /// Indices into the canonical point array that define this edge
    pub fn point_indices(self) -> [usize; 2] {
        match self {
            Edge::Top => [0, 1],
            Edge::Right => [1, 2],
            Edge::Bottom => [2, 3],
            Edge::Left => [3, 0],
        }
    }
}

/// Corner of a cell rectangle; discriminant is the index into the point array
#[repr(u8)]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Corner {
    TopLeft = 0,
    TopRight = 1,
    BottomRight = 2,
    BottomLeft = 3,
}

impl Corner {
    pub const ALL: [Corner; 4] = [
        Corner::TopLeft,
        Corner::TopRight,
        Corner::BottomRight,
        Corner::BottomLeft,
    ];

    pub fn index(self) -> usize {
        self as usize
    }

    pub fn from_index(index: usize) -> Option<Corner> {
        Corner::ALL.get(index).copied()
    }

    /// The vertical edge (left/right) this corner controls
    pub fn x_edge(self) -> Edge {
        match self {
            Corner::TopLeft | Corner::BottomLeft => Edge::Left,
            Corner::TopRight | Corner::BottomRight => Edge::Right,
        }
    }

    /// The horizontal edge (top/bottom) this corner controls
    pub fn y_edge(self) -> Edge {
        match self {
            Corner::TopLeft | Corner::TopRight => Edge::Top,
            Corner::BottomLeft | Corner::BottomRight => Edge::Bottom,
        }
    }

    /// Neighbour sharing this corner's x coordinate
    pub fn x_neighbor(self) -> Corner {
        match self {
            Corner::TopLeft => Corner::BottomLeft,
            Corner::TopRight => Corner::BottomRight,
            Corner::BottomRight => Corner::TopRight,
            Corner::BottomLeft => Corner::TopLeft,
        }
    }

    /// Neighbour sharing this corner's y coordinate
    pub fn y_neighbor(self) -> Corner {
        match self {
            Corner::TopLeft => Corner::TopRight,
            Corner::TopRight => Corner::TopLeft,
            Corner::BottomRight => Corner::BottomLeft,
            Corner::BottomLeft => Corner::BottomRight,
        }
    }
}

/// Signed area of a polygon (shoelace). Positive for counter-clockwise in y-up terms.
pub fn signed_area(points: &[Point]) -> f32 {
    let n = points.len();
    if n < 3 {
        return 0.0;
    }
    let mut sum = 0.0;
    for i in 0..n {
        let a = points[i];
        let b = points[(i + 1) % n];
        sum += a.x * b.y - b.x * a.y;
    }
    sum * 0.5
}
