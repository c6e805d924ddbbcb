//! Annotation health report
//!
//! Collects overlaps, border conflicts, near-miss edge alignments and cells
//! outside the image raster for the `check` command.

use std::fmt;

use serde::Serialize;

use crate::config::EditorConfig;
use crate::domain::{Annotation, Bounds, CellId, Edge, Point};
use crate::overlap::{self, BorderConflict, Overlap};
use crate::snap::{self, SnapScope};

/// A cell that extends past the image raster
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct OutOfImage {
    pub id: CellId,
    pub bounds: Bounds,
}

/// An edge that sits within snapping distance of another cell's edge without touching it
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Misalignment {
    pub id: CellId,
    pub edge: Edge,
    pub target: CellId,
    pub target_edge: Edge,
    /// Signed distance the edge would move to align
    pub gap: f32,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct Report {
    pub filename: String,
    pub cell_count: usize,
    pub overlaps: Vec<Overlap>,
    /// Connected overlap groups with more than one member
    pub overlap_groups: Vec<Vec<CellId>>,
    pub conflicts: Vec<BorderConflict>,
    pub misaligned: Vec<Misalignment>,
    pub out_of_image: Vec<OutOfImage>,
}

/// Closest snap candidate per axis for each cell, ignoring exact alignments
fn misalignments(annotation: &Annotation, threshold: f32, epsilon: f32) -> Vec<Misalignment> {
    let cells = annotation.cells();
    let mut found = Vec::new();
    for cell in cells {
        let targets = snap::snap_targets(cells, |id| id == cell.id());
        let snap = snap::move_snap(cell.bounds(), 0.0, 0.0, &targets, threshold, SnapScope::All);
        for m in snap.x.into_iter().chain(snap.y) {
            if m.distance() > epsilon {
                found.push(Misalignment {
                    id: cell.id(),
                    edge: m.dragged_edge,
                    target: m.cell_id,
                    target_edge: m.target_edge,
                    gap: m.offset,
                });
            }
        }
    }
    found
}

impl Report {
    /// Run every detector over the annotation. `image_size` enables the raster check.
    pub fn build(
        annotation: &Annotation,
        config: &EditorConfig,
        image_size: Option<(f32, f32)>,
    ) -> Self {
        let cells = annotation.cells();
        let out_of_image = match image_size {
            Some((w, h)) => {
                let image = Bounds::new(0.0, 0.0, w, h);
                cells
                    .iter()
                    .filter(|c| {
                        let b = c.bounds();
                        !image.contains_point(Point::new(b.min_x, b.min_y))
                            || !image.contains_point(Point::new(b.max_x, b.max_y))
                    })
                    .map(|c| OutOfImage {
                        id: c.id(),
                        bounds: c.bounds(),
                    })
                    .collect()
            }
            None => Vec::new(),
        };

        Self {
            filename: annotation.filename().to_string(),
            cell_count: cells.len(),
            overlaps: overlap::detect_overlaps(cells),
            overlap_groups: overlap::overlap_groups(cells),
            conflicts: overlap::detect_border_conflicts(cells, config.conflict_config()),
            misaligned: misalignments(
                annotation,
                config.effective_snap_threshold(),
                config.border_epsilon,
            ),
            out_of_image,
        }
    }

    pub fn issue_count(&self) -> usize {
        self.overlaps.len() + self.conflicts.len() + self.misaligned.len() + self.out_of_image.len()
    }

    pub fn is_clean(&self) -> bool {
        self.issue_count() == 0
    }
}

impl fmt::Display for Report {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}: {} cells", self.filename, self.cell_count)?;
        for o in &self.overlaps {
            let area = Bounds::from_points(&o.polygon)
                .map(|b| b.width() * b.height())
                .unwrap_or_default();
            writeln!(f, "  overlap   {} / {} (~{area:.1} px²)", o.a, o.b)?;
        }
        for group in &self.overlap_groups {
            let ids: Vec<String> = group.iter().map(ToString::to_string).collect();
            writeln!(f, "  group     {}", ids.join(", "))?;
        }
        for c in &self.conflicts {
            writeln!(
                f,
                "  conflict  {} {:?} / {} {:?} from ({:.1}, {:.1}) to ({:.1}, {:.1}){}",
                c.a,
                c.a_edge,
                c.b,
                c.b_edge,
                c.start.x,
                c.start.y,
                c.end.x,
                c.end.y,
                if c.exact { "" } else { " (near)" }
            )?;
        }
        for m in &self.misaligned {
            writeln!(
                f,
                "  misalign  {} {:?} is {:.2}px from {} {:?}",
                m.id,
                m.edge,
                m.gap.abs(),
                m.target,
                m.target_edge
            )?;
        }
        for o in &self.out_of_image {
            writeln!(
                f,
                "  outside   {} at ({:.1}, {:.1})-({:.1}, {:.1})",
                o.id, o.bounds.min_x, o.bounds.min_y, o.bounds.max_x, o.bounds.max_y
            )?;
        }
        if self.is_clean() {
            writeln!(f, "  no issues")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::CellData;

    fn annotation(bounds: &[Bounds]) -> Annotation {
        let mut ann = Annotation::new("table.png");
        for b in bounds {
            ann.push_cell(&CellData::default(), *b);
        }
        ann
    }

    #[test]
    fn test_clean_grid() {
        let ann = annotation(&[
            Bounds::new(0.0, 0.0, 50.0, 20.0),
            Bounds::new(50.0, 0.0, 100.0, 20.0),
        ]);
        let report = Report::build(&ann, &EditorConfig::default(), Some((100.0, 20.0)));
        assert!(report.is_clean());
        assert!(report.to_string().contains("no issues"));
    }

    #[test]
    fn test_reports_overlap_and_outside() {
        let ann = annotation(&[
            Bounds::new(0.0, 0.0, 50.0, 20.0),
            Bounds::new(40.0, 0.0, 120.0, 20.0),
        ]);
        let report = Report::build(&ann, &EditorConfig::default(), Some((100.0, 20.0)));
        assert_eq!(report.overlaps.len(), 1);
        assert_eq!(report.overlap_groups, vec![vec![CellId(1), CellId(2)]]);
        assert_eq!(report.out_of_image.len(), 1);
        assert_eq!(report.out_of_image[0].id, CellId(2));
        assert_eq!(report.issue_count(), 2);
    }

    #[test]
    fn test_near_miss_edges_reported() {
        let ann = annotation(&[
            Bounds::new(0.0, 0.0, 50.0, 20.0),
            Bounds::new(52.0, 0.0, 100.0, 20.0),
        ]);
        let report = Report::build(&ann, &EditorConfig::default(), None);
        assert_eq!(report.misaligned.len(), 2);
        let first = &report.misaligned[0];
        assert_eq!((first.id, first.edge), (CellId(1), Edge::Right));
        assert_eq!((first.target, first.target_edge), (CellId(2), Edge::Left));
        assert_eq!(first.gap, 2.0);
        assert!(report.to_string().contains("misalign"));
    }

    #[test]
    fn test_no_image_skips_raster_check() {
        let ann = annotation(&[Bounds::new(-10.0, 0.0, 50.0, 20.0)]);
        let report = Report::build(&ann, &EditorConfig::default(), None);
        assert!(report.out_of_image.is_empty());
    }
}
