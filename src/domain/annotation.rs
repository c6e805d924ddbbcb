//! Document annotation: table boundary plus the ordered cell collection
//!
//! The [`Annotation`] is the unit of undo/redo snapshotting and of
//! load/replace. [`AnnotationData`] is the serializable form handed to and
//! received from the interchange codecs.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::cell::{Cell, CellColor, CellId, CellLines, CellSpan};
use super::geometry::{Bounds, Point};

/// Errors raised when a document cannot be turned into an [`Annotation`]
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("cell {index} has no points")]
    MissingPoints { index: usize },

    #[error("cell {index} has {found} points, expected 4")]
    PointCount { index: usize, found: usize },

    #[error("cell {index} has a non-finite coordinate")]
    NonFiniteCoordinate { index: usize },

    #[error("cell {index} has zero area ({width}x{height})")]
    DegenerateCell {
        index: usize,
        width: f32,
        height: f32,
    },

    #[error("cell id {id} appears more than once")]
    DuplicateId { id: u64 },

    #[error("no cell id left after {id}")]
    IdSpaceExhausted { id: u64 },

    #[error("table boundary needs at least 3 finite points, got {found}")]
    TableCoords { found: usize },

    #[error("invalid annotation document: {0}")]
    Json(#[from] serde_json::Error),
}

/// Serializable cell record
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CellData {
    pub id: Option<u64>,
    pub points: Option<Vec<Point>>,
    pub lines: CellLines,
    pub start_row: u32,
    pub end_row: u32,
    pub start_col: u32,
    pub end_col: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<CellColor>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub opacity: Option<f32>,
}

impl CellData {
    /// Minimal record for a freshly drawn rectangle
    pub fn from_bounds(bounds: Bounds) -> Self {
        Self {
            points: Some(bounds.corners().to_vec()),
            ..Self::default()
        }
    }

    fn span(&self) -> CellSpan {
        CellSpan {
            start_row: self.start_row,
            end_row: self.end_row,
            start_col: self.start_col,
            end_col: self.end_col,
        }
    }

    /// Validate the geometry and return it as a canonical rectangle
    pub(crate) fn validated_bounds(&self, index: usize) -> Result<Bounds, LoadError> {
        let points = self
            .points
            .as_ref()
            .ok_or(LoadError::MissingPoints { index })?;
        if points.is_empty() {
            return Err(LoadError::MissingPoints { index });
        }
        if points.len() != 4 {
            return Err(LoadError::PointCount {
                index,
                found: points.len(),
            });
        }
        if points.iter().any(|p| !p.is_finite()) {
            return Err(LoadError::NonFiniteCoordinate { index });
        }
        let bounds = Bounds::from_points(points).ok_or(LoadError::MissingPoints { index })?;
        if bounds.width() <= 0.0 || bounds.height() <= 0.0 {
            return Err(LoadError::DegenerateCell {
                index,
                width: bounds.width(),
                height: bounds.height(),
            });
        }
        if bounds.corners().as_slice() != points.as_slice() {
            log::warn!("cell {index} is not a canonical rectangle, using its bounding box");
        }
        Ok(bounds)
    }

    /// Build a cell with the given id, copying lines, span and presentation
    pub(crate) fn to_cell(&self, id: CellId, bounds: Bounds) -> Cell {
        let mut cell = Cell::from_bounds(id, bounds);
        cell.lines = self.lines;
        cell.span = self.span();
        cell.color = self.color;
        cell.opacity = self.opacity.map(|o| o.clamp(0.0, 1.0));
        cell
    }
}

impl From<&Cell> for CellData {
    fn from(cell: &Cell) -> Self {
        Self {
            id: Some(cell.id().0),
            points: Some(cell.points().to_vec()),
            lines: cell.lines,
            start_row: cell.span.start_row,
            end_row: cell.span.end_row,
            start_col: cell.span.start_col,
            end_col: cell.span.end_col,
            color: cell.color,
            opacity: cell.opacity,
        }
    }
}

/// Serializable annotation document
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnnotationData {
    pub filename: String,
    pub table_coords: Vec<Point>,
    pub cells: Vec<CellData>,
}

impl AnnotationData {
    pub fn from_json(json: &str) -> Result<Self, LoadError> {
        Ok(serde_json::from_str(json)?)
    }
}

/// In-memory editing state for one document
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Annotation {
    filename: String,
    table_coords: Vec<Point>,
    cells: Vec<Cell>,
    /// Highest id handed out or loaded, 0 before the first cell
    last_id: u64,
}

impl Annotation {
    pub fn new(filename: impl Into<String>) -> Self {
        Self {
            filename: filename.into(),
            ..Self::default()
        }
    }

    /// Build an annotation from interchange data, failing on the first malformed cell
    pub fn from_data(data: &AnnotationData) -> Result<Self, LoadError> {
        if !data.table_coords.is_empty()
            && (data.table_coords.len() < 3 || data.table_coords.iter().any(|p| !p.is_finite()))
        {
            return Err(LoadError::TableCoords {
                found: data.table_coords.len(),
            });
        }

        let mut seen = std::collections::HashSet::new();
        for cell in &data.cells {
            if let Some(id) = cell.id {
                if !seen.insert(id) {
                    return Err(LoadError::DuplicateId { id });
                }
            }
        }
        let mut last_id = seen.iter().copied().max().unwrap_or(0);

        let mut cells = Vec::with_capacity(data.cells.len());
        for (index, cell_data) in data.cells.iter().enumerate() {
            let bounds = cell_data.validated_bounds(index)?;
            let id = match cell_data.id {
                Some(id) => CellId(id),
                None => {
                    last_id = last_id
                        .checked_add(1)
                        .ok_or(LoadError::IdSpaceExhausted { id: last_id })?;
                    CellId(last_id)
                }
            };
            cells.push(cell_data.to_cell(id, bounds));
        }

        Ok(Self {
            filename: data.filename.clone(),
            table_coords: data.table_coords.clone(),
            cells,
            last_id,
        })
    }

    /// Serializable snapshot for the external codecs
    pub fn to_data(&self) -> AnnotationData {
        AnnotationData {
            filename: self.filename.clone(),
            table_coords: self.table_coords.clone(),
            cells: self.cells.iter().map(CellData::from).collect(),
        }
    }

    pub fn filename(&self) -> &str {
        &self.filename
    }

    pub fn table_coords(&self) -> &[Point] {
        &self.table_coords
    }

    /// Cells in insertion order
    pub fn cells(&self) -> &[Cell] {
        &self.cells
    }

    pub fn cell(&self, id: CellId) -> Option<&Cell> {
        self.cells.iter().find(|c| c.id() == id)
    }

    pub fn cell_mut(&mut self, id: CellId) -> Option<&mut Cell> {
        self.cells.iter_mut().find(|c| c.id() == id)
    }

    pub fn cells_mut(&mut self) -> impl Iterator<Item = &mut Cell> {
        self.cells.iter_mut()
    }

    pub fn contains(&self, id: CellId) -> bool {
        self.cell(id).is_some()
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// Append a cell with a fresh id; `None` once the id space is used up
    pub fn push_cell(&mut self, data: &CellData, bounds: Bounds) -> Option<CellId> {
        let id = self.allocate_id()?;
        self.cells.push(data.to_cell(id, bounds));
        Some(id)
    }

    pub fn remove_cell(&mut self, id: CellId) -> Option<Cell> {
        let index = self.cells.iter().position(|c| c.id() == id)?;
        Some(self.cells.remove(index))
    }

    /// Topmost (last inserted) cell containing the point
    pub fn cell_at(&self, p: Point) -> Option<&Cell> {
        self.cells.iter().rev().find(|c| c.bounds().contains_point(p))
    }

    fn allocate_id(&mut self) -> Option<CellId> {
        self.last_id = self.last_id.checked_add(1)?;
        Some(CellId(self.last_id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rect_points(b: Bounds) -> Option<Vec<Point>> {
        Some(b.corners().to_vec())
    }

    #[test]
    fn test_from_data_assigns_missing_ids_after_max() {
        let data = AnnotationData {
            filename: "page.png".into(),
            table_coords: vec![],
            cells: vec![
                CellData {
                    id: Some(7),
                    points: rect_points(Bounds::new(0.0, 0.0, 10.0, 10.0)),
                    ..CellData::default()
                },
                CellData {
                    points: rect_points(Bounds::new(10.0, 0.0, 20.0, 10.0)),
                    ..CellData::default()
                },
            ],
        };
        let ann = Annotation::from_data(&data).unwrap();
        let ids: Vec<_> = ann.cells().iter().map(|c| c.id()).collect();
        assert_eq!(ids, vec![CellId(7), CellId(8)]);
    }

    #[test]
    fn test_ids_never_reused_after_removal() {
        let mut ann = Annotation::new("doc");
        let data = CellData::default();
        let a = ann.push_cell(&data, Bounds::new(0.0, 0.0, 10.0, 10.0)).unwrap();
        ann.remove_cell(a);
        let b = ann.push_cell(&data, Bounds::new(0.0, 0.0, 10.0, 10.0)).unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn test_max_id_loads_but_allocates_nothing() {
        let json = r#"{"cells": [
            {"id": 18446744073709551615,
             "points": [{"x":0,"y":0},{"x":10,"y":0},{"x":10,"y":10},{"x":0,"y":10}]}
        ]}"#;
        let data = AnnotationData::from_json(json).unwrap();
        let mut ann = Annotation::from_data(&data).unwrap();
        assert_eq!(ann.cells()[0].id(), CellId(u64::MAX));
        assert_eq!(
            ann.push_cell(&CellData::default(), Bounds::new(20.0, 0.0, 30.0, 10.0)),
            None
        );
        assert_eq!(ann.len(), 1);

        // An id-less cell after the maximum cannot be numbered
        let mut data = data;
        data.cells.push(CellData {
            points: rect_points(Bounds::new(20.0, 0.0, 30.0, 10.0)),
            ..CellData::default()
        });
        assert!(matches!(
            Annotation::from_data(&data),
            Err(LoadError::IdSpaceExhausted { id: u64::MAX })
        ));
    }

    #[test]
    fn test_missing_points_fails_fast() {
        let data = AnnotationData {
            cells: vec![
                CellData {
                    points: rect_points(Bounds::new(0.0, 0.0, 10.0, 10.0)),
                    ..CellData::default()
                },
                CellData::default(),
            ],
            ..AnnotationData::default()
        };
        let err = Annotation::from_data(&data).unwrap_err();
        assert!(matches!(err, LoadError::MissingPoints { index: 1 }));
    }

    #[test]
    fn test_wrong_point_count_and_degenerate() {
        let three = AnnotationData {
            cells: vec![CellData {
                points: Some(vec![Point::new(0.0, 0.0); 3]),
                ..CellData::default()
            }],
            ..AnnotationData::default()
        };
        assert!(matches!(
            Annotation::from_data(&three),
            Err(LoadError::PointCount { index: 0, found: 3 })
        ));

        let flat = AnnotationData {
            cells: vec![CellData {
                points: rect_points(Bounds::new(0.0, 0.0, 10.0, 0.0)),
                ..CellData::default()
            }],
            ..AnnotationData::default()
        };
        assert!(matches!(
            Annotation::from_data(&flat),
            Err(LoadError::DegenerateCell { .. })
        ));
    }

    #[test]
    fn test_duplicate_ids_rejected() {
        let cell = CellData {
            id: Some(3),
            points: rect_points(Bounds::new(0.0, 0.0, 10.0, 10.0)),
            ..CellData::default()
        };
        let data = AnnotationData {
            cells: vec![cell.clone(), cell],
            ..AnnotationData::default()
        };
        assert!(matches!(
            Annotation::from_data(&data),
            Err(LoadError::DuplicateId { id: 3 })
        ));
    }

    #[test]
    fn test_json_document_loads_with_defaults() {
        let json = r#"{
            "filename": "scan.jpg",
            "cells": [
                {"points": [{"x":10,"y":10},{"x":110,"y":10},{"x":110,"y":60},{"x":10,"y":60}],
                 "lines": {"top": true, "bottom": false, "left": true, "right": true}}
            ]
        }"#;
        let data = AnnotationData::from_json(json).unwrap();
        let ann = Annotation::from_data(&data).unwrap();
        assert_eq!(ann.filename(), "scan.jpg");
        assert_eq!(ann.cells()[0].bounds(), Bounds::new(10.0, 10.0, 110.0, 60.0));
        assert!(!ann.cells()[0].lines.bottom);
        assert_eq!(ann.to_data().cells[0].id, Some(1));

        assert!(matches!(
            AnnotationData::from_json("{\"cells\": 3}"),
            Err(LoadError::Json(_))
        ));
    }

    #[test]
    fn test_cell_at_prefers_topmost() {
        let mut ann = Annotation::new("doc");
        let data = CellData::default();
        ann.push_cell(&data, Bounds::new(0.0, 0.0, 100.0, 100.0));
        let top = ann
            .push_cell(&data, Bounds::new(50.0, 50.0, 150.0, 150.0))
            .unwrap();
        assert_eq!(ann.cell_at(Point::new(75.0, 75.0)).map(|c| c.id()), Some(top));
        assert!(ann.cell_at(Point::new(500.0, 5.0)).is_none());
    }
}
