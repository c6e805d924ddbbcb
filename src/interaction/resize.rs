//! Corner resize gesture, with optional linked resize of co-selected cells

use crate::domain::{Bounds, Cell, CellId, Corner, Point};
use crate::snap::{ResizeSnap, SnapTarget, resize_snap};

use super::{GestureSettings, Viewport};

/// Geometry to install for one accepted pointer move
#[derive(Debug, Clone, PartialEq)]
pub struct ResizeStep {
    /// New points of the primary cell, canonical winding
    pub points: [Point; 4],
    /// New bounds of linked cells
    pub linked: Vec<(CellId, Bounds)>,
    pub snap: ResizeSnap,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ResizeGesture {
    original: Cell,
    corner: Corner,
    viewport: Viewport,
    /// Corner position minus press position, so the corner does not jump to the pointer
    grab_offset: (f32, f32),
    linked: Vec<(CellId, Bounds)>,
    last_valid: Option<ResizeStep>,
}

impl ResizeGesture {
    /// Start resizing `cell` by `corner`. `linked` holds co-selected cells that
    /// receive the same width/height change.
    pub fn begin(
        cell: &Cell,
        corner: Corner,
        screen: Point,
        viewport: Viewport,
        linked: Vec<(CellId, Bounds)>,
    ) -> Self {
        let press = viewport.to_document(screen);
        let at = cell.point(corner);
        log::debug!(
            "resize {} by {corner:?} with {} linked cells",
            cell.id(),
            linked.len()
        );
        Self {
            original: cell.clone(),
            corner,
            viewport,
            grab_offset: (at.x - press.x, at.y - press.y),
            linked,
            last_valid: None,
        }
    }

    pub fn cell_id(&self) -> CellId {
        self.original.id()
    }

    pub fn corner(&self) -> Corner {
        self.corner
    }

    /// Ids of the linked cells moving with this resize
    pub fn linked_ids(&self) -> impl Iterator<Item = CellId> + '_ {
        self.linked.iter().map(|(id, _)| *id)
    }

    /// Last accepted step
    pub fn current(&self) -> Option<&ResizeStep> {
        self.last_valid.as_ref()
    }

    /// Resize toward the pointer at `screen`.
    ///
    /// Returns `None` and keeps the previous geometry when the result would be
    /// smaller than the minimum size or would flip past the opposite corner.
    pub fn update(
        &mut self,
        screen: Point,
        targets: &[SnapTarget],
        settings: &GestureSettings,
    ) -> Option<ResizeStep> {
        let pointer = self.viewport.to_document(screen);
        let proposed = pointer.translate(self.grab_offset.0, self.grab_offset.1);
        let snap = resize_snap(self.corner, proposed, targets, settings.snap_threshold);

        let mut cell = self.original.clone();
        cell.drag_corner(self.corner, snap.point);
        let (width, height) = cell.signed_size();
        if width <= settings.min_cell_size || height <= settings.min_cell_size {
            return None;
        }

        let original = self.original.bounds();
        let dw = width - original.width();
        let dh = height - original.height();
        let linked = self
            .linked
            .iter()
            .map(|&(id, b)| {
                let resized = Bounds::new(b.min_x, b.min_y, b.max_x + dw, b.max_y + dh);
                if resized.exceeds(settings.min_cell_size) {
                    (id, resized)
                } else {
                    (id, b)
                }
            })
            .collect();

        let step = ResizeStep {
            points: *cell.points(),
            linked,
            snap,
        };
        self.last_valid = Some(step.clone());
        Some(step)
    }

    /// Geometry to commit on release, `None` if no move was ever accepted
    pub fn finish(self) -> Option<ResizeStep> {
        self.last_valid
    }
}
