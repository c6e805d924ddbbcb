//! Pointer-driven interaction state machines
//!
//! Three mutually exclusive gestures: rectangle creation, drag-move and
//! corner resize. Each one snapshots the [`Viewport`] at press time and uses
//! that snapshot for the whole gesture, so a scale or pan change between
//! press and move never shifts the geometry under the pointer.

pub mod create;
pub mod drag;
pub mod resize;

use serde::{Deserialize, Serialize};

use crate::config::EditorConfig;
use crate::domain::{Annotation, Corner, HandleHit, Point, Selection};

pub use create::CreateGesture;
pub use drag::{DragGesture, DragStep};
pub use resize::{ResizeGesture, ResizeStep};

// ============================================================================
// Viewport
// ============================================================================

/// Rendering surface transform: `screen = doc * scale + offset`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    pub scale: f32,
    pub offset_x: f32,
    pub offset_y: f32,
}

impl Default for Viewport {
    fn default() -> Self {
        Self {
            scale: 1.0,
            offset_x: 0.0,
            offset_y: 0.0,
        }
    }
}

impl Viewport {
    pub fn new(scale: f32, offset_x: f32, offset_y: f32) -> Self {
        Self {
            scale,
            offset_x,
            offset_y,
        }
    }

    /// Usable scale; non-positive or non-finite values fall back to 1
    fn effective_scale(&self) -> f32 {
        if self.scale.is_finite() && self.scale > 0.0 {
            self.scale
        } else {
            1.0
        }
    }

    /// Convert a surface position into document-image pixels
    pub fn to_document(&self, screen: Point) -> Point {
        let scale = self.effective_scale();
        Point::new(
            (screen.x - self.offset_x) / scale,
            (screen.y - self.offset_y) / scale,
        )
    }

    pub fn to_screen(&self, doc: Point) -> Point {
        let scale = self.effective_scale();
        Point::new(doc.x * scale + self.offset_x, doc.y * scale + self.offset_y)
    }

    /// Length of `screen_px` surface pixels in document pixels
    pub fn document_length(&self, screen_px: f32) -> f32 {
        screen_px / self.effective_scale()
    }
}

// ============================================================================
// Modes and settings
// ============================================================================

/// Which gesture a press starts
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum EditMode {
    /// Drag-move and corner resize of existing cells
    #[default]
    Select,
    /// Draw a new rectangle
    Create,
}

/// Numeric knobs the gestures read, derived from [`EditorConfig`]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GestureSettings {
    /// Snap distance in document pixels, 0 disables snapping
    pub snap_threshold: f32,
    pub min_cell_size: f32,
    pub movement_speed: f32,
    pub drift_tolerance: f32,
}

impl Default for GestureSettings {
    fn default() -> Self {
        Self::from(&EditorConfig::default())
    }
}

impl From<&EditorConfig> for GestureSettings {
    fn from(config: &EditorConfig) -> Self {
        Self {
            snap_threshold: config.effective_snap_threshold(),
            min_cell_size: config.min_cell_size,
            movement_speed: config.movement_speed,
            drift_tolerance: config.drift_tolerance,
        }
    }
}

/// The gesture currently in progress, if any
#[derive(Debug, Clone, Default)]
pub enum Gesture {
    #[default]
    Idle,
    Create(CreateGesture),
    Drag(DragGesture),
    Resize(ResizeGesture),
}

impl Gesture {
    pub fn is_idle(&self) -> bool {
        matches!(self, Gesture::Idle)
    }
}

// ============================================================================
// Hit testing
// ============================================================================

/// Resolve what a select-mode press at `screen` grabs.
///
/// Corner handles of selected cells win (within `handle_radius` surface
/// pixels), then the topmost cell containing the point, else empty space.
pub fn hit_test(
    annotation: &Annotation,
    selection: &Selection,
    viewport: Viewport,
    screen: Point,
    handle_radius: f32,
) -> HandleHit {
    let doc = viewport.to_document(screen);
    let radius = viewport.document_length(handle_radius);

    let mut best_corner = None;
    for cell in annotation.cells().iter().rev() {
        if !selection.contains(cell.id()) {
            continue;
        }
        for corner in Corner::ALL {
            let distance = doc.distance_to(cell.point(corner));
            if distance <= radius && best_corner.is_none_or(|(_, _, d)| distance < d) {
                best_corner = Some((cell.id(), corner, distance));
            }
        }
    }
    if let Some((id, corner, _)) = best_corner {
        return HandleHit::Corner(id, corner);
    }

    match annotation.cell_at(doc) {
        Some(cell) => HandleHit::Body(cell.id(), cell.bounds().nearest_edge(doc)),
        None => HandleHit::Empty,
    }
}
