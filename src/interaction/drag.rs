//! Drag-move gesture
//!
//! Deltas are incremental. The gesture remembers the last target position it
//! commanded and compares it with where the cell actually is on each move;
//! if the two drift apart by more than the tolerance it resynchronises from
//! the actual position instead of accumulating the error.

use crate::domain::{Cell, CellId, Edge, Point};
use crate::snap::{SnapResult, SnapScope, SnapTarget, move_snap};

use super::{GestureSettings, Viewport};

/// Translation to apply to the live cell for one pointer move
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DragStep {
    pub dx: f32,
    pub dy: f32,
    /// True when the step was computed from the cell's actual position
    pub resynced: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DragGesture {
    cell_id: CellId,
    viewport: Viewport,
    press: Point,
    origin: Point,
    last_target: Point,
    grabbed_edge: Edge,
    preview: Option<SnapResult>,
}

impl DragGesture {
    /// Start dragging `cell` from a press at `screen`
    pub fn begin(cell: &Cell, screen: Point, viewport: Viewport) -> Self {
        let press = viewport.to_document(screen);
        let bounds = cell.bounds();
        let origin = Point::new(bounds.min_x, bounds.min_y);
        let grabbed_edge = bounds.nearest_edge(press);
        log::debug!("drag {} grabbed by {grabbed_edge:?} edge", cell.id());
        Self {
            cell_id: cell.id(),
            viewport,
            press,
            origin,
            last_target: origin,
            grabbed_edge,
            preview: None,
        }
    }

    pub fn cell_id(&self) -> CellId {
        self.cell_id
    }

    /// The only edge eligible for snapping during this drag
    pub fn grabbed_edge(&self) -> Edge {
        self.grabbed_edge
    }

    /// Active snap preview, if the grabbed edge is within range of another cell
    pub fn preview(&self) -> Option<&SnapResult> {
        self.preview.as_ref()
    }

    /// Compute the step for the pointer at `screen`. `current` is the live cell.
    pub fn update(
        &mut self,
        screen: Point,
        current: &Cell,
        targets: &[SnapTarget],
        settings: &GestureSettings,
    ) -> DragStep {
        let pointer = self.viewport.to_document(screen);
        let target = Point::new(
            self.origin.x + (pointer.x - self.press.x) * settings.movement_speed,
            self.origin.y + (pointer.y - self.press.y) * settings.movement_speed,
        );

        let bounds = current.bounds();
        let actual = Point::new(bounds.min_x, bounds.min_y);
        let resynced = actual.distance_to(self.last_target) > settings.drift_tolerance;
        let base = if resynced {
            log::debug!(
                "drag drifted from {:?} to {actual:?}, resynchronising",
                self.last_target
            );
            actual
        } else {
            self.last_target
        };

        let dx = target.x - base.x;
        let dy = target.y - base.y;
        self.last_target = target;

        let moved = bounds.translate(target.x - actual.x, target.y - actual.y);
        let snap = move_snap(
            moved,
            0.0,
            0.0,
            targets,
            settings.snap_threshold,
            SnapScope::Edge(self.grabbed_edge),
        );
        self.preview = snap.is_snapped().then_some(snap);

        DragStep { dx, dy, resynced }
    }

    /// Corrective delta to reach the snapped position, if a preview is active
    pub fn finish(self) -> Option<(f32, f32)> {
        self.preview.map(|snap| (snap.delta_x, snap.delta_y))
    }
}
