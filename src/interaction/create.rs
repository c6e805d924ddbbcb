//! Rectangle creation gesture

use crate::domain::{Bounds, Edge, Point};
use crate::snap::{SnapScope, SnapTarget, move_snap};

use super::{GestureSettings, Viewport};

/// In-progress rectangle draw, anchored where the press landed
#[derive(Debug, Clone, PartialEq)]
pub struct CreateGesture {
    anchor: Point,
    viewport: Viewport,
    image_size: Option<(f32, f32)>,
    preview: Option<Bounds>,
}

impl CreateGesture {
    /// Start drawing at `screen`. Returns `None` when the press is outside the image.
    pub fn begin(screen: Point, viewport: Viewport, image_size: Option<(f32, f32)>) -> Option<Self> {
        let anchor = viewport.to_document(screen);
        if let Some((w, h)) = image_size {
            if !Bounds::new(0.0, 0.0, w, h).contains_point(anchor) {
                log::debug!("create press outside image at {anchor:?}");
                return None;
            }
        }
        Some(Self {
            anchor,
            viewport,
            image_size,
            preview: None,
        })
    }

    pub fn anchor(&self) -> Point {
        self.anchor
    }

    /// Rectangle shown while dragging
    pub fn preview(&self) -> Option<Bounds> {
        self.preview
    }

    /// Recompute the preview for the pointer at `screen`
    pub fn update(
        &mut self,
        screen: Point,
        targets: &[SnapTarget],
        settings: &GestureSettings,
    ) -> Bounds {
        let rect = self.rect_for(screen, targets, settings);
        self.preview = Some(rect);
        rect
    }

    /// Final rectangle on release, `None` when it is too small to keep
    pub fn finish(
        mut self,
        screen: Point,
        targets: &[SnapTarget],
        settings: &GestureSettings,
    ) -> Option<Bounds> {
        let rect = self.update(screen, targets, settings);
        if rect.exceeds(settings.min_cell_size) {
            Some(rect)
        } else {
            log::debug!(
                "discarding {}x{} rectangle below minimum size",
                rect.width(),
                rect.height()
            );
            None
        }
    }

    fn rect_for(&self, screen: Point, targets: &[SnapTarget], settings: &GestureSettings) -> Bounds {
        let mut current = self.viewport.to_document(screen);
        if let Some((w, h)) = self.image_size {
            current = Point::new(current.x.clamp(0.0, w), current.y.clamp(0.0, h));
        }
        let raw = Bounds::from_corners(self.anchor, current);
        if !raw.exceeds(settings.min_cell_size) {
            return raw;
        }

        // Only the edges under the pointer move; the anchor stays put.
        let x_edge = if current.x >= self.anchor.x {
            Edge::Right
        } else {
            Edge::Left
        };
        let y_edge = if current.y >= self.anchor.y {
            Edge::Bottom
        } else {
            Edge::Top
        };
        let snap = move_snap(
            raw,
            0.0,
            0.0,
            targets,
            settings.snap_threshold,
            SnapScope::Free { x_edge, y_edge },
        );

        // A snap may pull the free edge toward the anchor but never across it
        let keeps_side = |edge: Edge, anchor: f32, snapped: f32| {
            let extent = match edge {
                Edge::Right | Edge::Bottom => snapped - anchor,
                Edge::Left | Edge::Top => anchor - snapped,
            };
            extent > settings.min_cell_size
        };

        let mut rect = raw;
        if let Some(m) = snap.x {
            let snapped = raw.edge(x_edge) + m.offset;
            if keeps_side(x_edge, self.anchor.x, snapped) {
                rect = rect.with_edge(x_edge, snapped);
            } else {
                log::debug!("dropping x snap to {} that would cross the anchor", m.cell_id);
            }
        }
        if let Some(m) = snap.y {
            let snapped = raw.edge(y_edge) + m.offset;
            if keeps_side(y_edge, self.anchor.y, snapped) {
                rect = rect.with_edge(y_edge, snapped);
            } else {
                log::debug!("dropping y snap to {} that would cross the anchor", m.cell_id);
            }
        }
        match self.image_size {
            Some((w, h)) => rect.clamp_to_image(w, h),
            None => rect,
        }
    }
}
