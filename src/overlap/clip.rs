//! Convex polygon clipping
//!
//! Sutherland-Hodgman clipping of one convex polygon against another, plus
//! the O(1) axis-aligned rectangle path used for cells.

use crate::domain::{Bounds, Point, signed_area};

/// Points closer than this are merged when cleaning clip output
const MERGE_EPSILON: f32 = 1e-4;

/// Minimum area for an intersection to count as an overlap
pub const MIN_OVERLAP_AREA: f32 = 1e-3;

fn cross(o: Point, a: Point, b: Point) -> f32 {
    (a.x - o.x) * (b.y - o.y) - (a.y - o.y) * (b.x - o.x)
}

/// Return the polygon with positive signed area
pub fn normalize_winding(points: &[Point]) -> Vec<Point> {
    let mut out = points.to_vec();
    if signed_area(&out) < 0.0 {
        out.reverse();
    }
    out
}

fn inside(p: Point, a: Point, b: Point) -> bool {
    cross(a, b, p) >= 0.0
}

fn segment_line_intersection(s: Point, e: Point, a: Point, b: Point) -> Point {
    let d1 = cross(a, b, s);
    let d2 = cross(a, b, e);
    let denom = d1 - d2;
    if denom.abs() < f32::EPSILON {
        return e;
    }
    let t = d1 / denom;
    Point::new(s.x + t * (e.x - s.x), s.y + t * (e.y - s.y))
}

/// Clip `subject` against the convex `clip` polygon.
///
/// Both inputs must already share the same (positive) winding.
pub fn clip_polygon(subject: &[Point], clip: &[Point]) -> Vec<Point> {
    let mut output = subject.to_vec();
    let n = clip.len();
    for i in 0..n {
        if output.is_empty() {
            break;
        }
        let a = clip[i];
        let b = clip[(i + 1) % n];
        let input = std::mem::take(&mut output);
        let Some(&last) = input.last() else { break };
        let mut prev = last;
        for &cur in &input {
            let cur_in = inside(cur, a, b);
            let prev_in = inside(prev, a, b);
            if cur_in {
                if !prev_in {
                    output.push(segment_line_intersection(prev, cur, a, b));
                }
                output.push(cur);
            } else if prev_in {
                output.push(segment_line_intersection(prev, cur, a, b));
            }
            prev = cur;
        }
    }
    dedup_points(output)
}

fn dedup_points(points: Vec<Point>) -> Vec<Point> {
    let mut out: Vec<Point> = Vec::with_capacity(points.len());
    for p in points {
        if out.last().is_none_or(|q| q.distance_to(p) > MERGE_EPSILON) {
            out.push(p);
        }
    }
    while out.len() > 1 {
        match (out.first(), out.last()) {
            (Some(first), Some(last)) if first.distance_to(*last) <= MERGE_EPSILON => {
                out.pop();
            }
            _ => break,
        }
    }
    out
}

/// Exact intersection of two convex polygons.
///
/// Returns an empty vector unless the intersection has at least 3 vertices
/// and a non-degenerate area. Clipping runs in both orders and the result
/// with more vertices is kept, which recovers area lost on degenerate inputs.
pub fn polygon_intersection(a: &[Point], b: &[Point]) -> Vec<Point> {
    if a.len() < 3 || b.len() < 3 {
        return Vec::new();
    }
    let (Some(ba), Some(bb)) = (Bounds::from_points(a), Bounds::from_points(b)) else {
        return Vec::new();
    };
    if !ba.touches(bb) {
        return Vec::new();
    }

    let a = normalize_winding(a);
    let b = normalize_winding(b);
    let ab = clip_polygon(&a, &b);
    let ba = clip_polygon(&b, &a);
    let best = if ba.len() > ab.len() { ba } else { ab };

    if best.len() >= 3 && signed_area(&best).abs() > MIN_OVERLAP_AREA {
        best
    } else {
        Vec::new()
    }
}

/// Fast path for two axis-aligned rectangles
pub fn rect_intersection(a: Bounds, b: Bounds) -> Option<[Point; 4]> {
    a.intersect(b).map(|i| i.corners())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn area(points: &[Point]) -> f32 {
        signed_area(points).abs()
    }

    #[test]
    fn test_normalize_winding_flips_clockwise() {
        let mut cw = Bounds::new(0.0, 0.0, 4.0, 4.0).corners().to_vec();
        cw.reverse();
        assert!(signed_area(&cw) < 0.0);
        assert!(signed_area(&normalize_winding(&cw)) > 0.0);
    }

    #[test]
    fn test_clip_matches_rect_fast_path() {
        let a = Bounds::new(0.0, 0.0, 10.0, 10.0);
        let b = Bounds::new(5.0, 5.0, 15.0, 15.0);
        let general = polygon_intersection(&a.corners(), &b.corners());
        let fast = rect_intersection(a, b).unwrap();
        assert_eq!(general.len(), 4);
        assert!((area(&general) - area(&fast)).abs() < 1e-3);
        assert_eq!(Bounds::from_points(&general), Bounds::from_points(&fast));
    }

    #[test]
    fn test_triangle_against_square() {
        let square = Bounds::new(0.0, 0.0, 10.0, 10.0).corners();
        let triangle = [
            Point::new(5.0, -5.0),
            Point::new(15.0, 5.0),
            Point::new(5.0, 15.0),
        ];
        let result = polygon_intersection(&square, &triangle);
        // Inside the square the triangle covers the whole x >= 5 half.
        assert!(result.len() >= 4);
        assert!((area(&result) - 50.0).abs() < 1e-3);
        assert_eq!(
            Bounds::from_points(&result),
            Some(Bounds::new(5.0, 0.0, 10.0, 10.0))
        );
    }

    #[test]
    fn test_touching_edges_do_not_overlap() {
        let a = Bounds::new(0.0, 0.0, 10.0, 10.0).corners();
        let b = Bounds::new(10.0, 0.0, 20.0, 10.0).corners();
        assert!(polygon_intersection(&a, &b).is_empty());
        assert!(
            rect_intersection(
                Bounds::new(0.0, 0.0, 10.0, 10.0),
                Bounds::new(10.0, 0.0, 20.0, 10.0)
            )
            .is_none()
        );
    }

    #[test]
    fn test_disjoint_rejected_by_bounds() {
        let a = Bounds::new(0.0, 0.0, 10.0, 10.0).corners();
        let b = Bounds::new(50.0, 50.0, 60.0, 60.0).corners();
        assert!(polygon_intersection(&a, &b).is_empty());
    }

    #[test]
    fn test_winding_independent() {
        let a = Bounds::new(0.0, 0.0, 10.0, 10.0).corners();
        let mut b = Bounds::new(2.0, 2.0, 8.0, 20.0).corners();
        b.reverse();
        let result = polygon_intersection(&a, &b);
        assert_eq!(
            Bounds::from_points(&result),
            Some(Bounds::new(2.0, 2.0, 8.0, 10.0))
        );
    }
}
