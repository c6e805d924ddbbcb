//! Editing session state
//!
//! [`EditorSession`] exclusively owns the live [`Annotation`]. Every change
//! goes through one of two paths:
//! - history-wrapped mutations build a new annotation, install it and commit
//!   one snapshot;
//! - gesture live updates install without committing, and the release commits
//!   once (cancel restores the annotation captured at press).
//!
//! Installing any annotation bumps the geometry version, which is what
//! invalidates the memoized overlap group used for cycling.

use std::collections::BTreeSet;

use crate::config::EditorConfig;
use crate::domain::{
    Annotation, AnnotationData, Bounds, Cell, CellColor, CellData, CellId, CellLinesPatch, Edge,
    HandleHit, LoadError, Point, Selection,
};
use crate::interaction::{
    self, CreateGesture, DragGesture, EditMode, Gesture, GestureSettings, ResizeGesture,
    ResizeStep, Viewport,
};
use crate::overlap::{self, BorderConflict, Overlap};
use crate::report::Report;
use crate::snap::{self, SnapTarget};

use super::history::History;
use super::messages::{Command, CycleDirection, EditMsg, SelectionMsg};
use super::shortcuts::Modifiers;

/// Memoized overlap group, valid for one geometry version and selection epoch
#[derive(Debug, Clone, PartialEq, Eq)]
struct OverlapGroupCache {
    source: CellId,
    geometry_version: u64,
    selection_epoch: u64,
    cell_ids: Vec<CellId>,
}

#[derive(Debug)]
pub struct EditorSession {
    annotation: Annotation,
    history: History,
    config: EditorConfig,
    selection: Selection,
    /// Bumped whenever the selection changes by any means other than cycling
    selection_epoch: u64,
    /// Bumped whenever a new annotation is installed
    geometry_version: u64,
    overlap_cache: Option<OverlapGroupCache>,
    mode: EditMode,
    viewport: Viewport,
    image_size: Option<(f32, f32)>,
    gesture: Gesture,
    /// Annotation at gesture start, restored on cancel
    gesture_base: Option<Annotation>,
}

impl Default for EditorSession {
    fn default() -> Self {
        Self::new(EditorConfig::default())
    }
}

impl EditorSession {
    /// Start with an empty annotation
    pub fn new(config: EditorConfig) -> Self {
        let config = config.sanitized();
        let annotation = Annotation::default();
        Self {
            history: History::new(annotation.clone(), config.history_capacity),
            annotation,
            config,
            selection: Selection::default(),
            selection_epoch: 0,
            geometry_version: 0,
            overlap_cache: None,
            mode: EditMode::default(),
            viewport: Viewport::default(),
            image_size: None,
            gesture: Gesture::Idle,
            gesture_base: None,
        }
    }

    /// Replace the annotation and reset history. Nothing changes on error.
    pub fn load_annotation(&mut self, data: &AnnotationData) -> Result<(), LoadError> {
        let annotation = Annotation::from_data(data)?;
        log::info!(
            "Loaded {} with {} cells",
            annotation.filename(),
            annotation.len()
        );

        self.gesture = Gesture::Idle;
        self.gesture_base = None;
        self.history.reset(annotation.clone());
        self.selection.clear();
        self.selection_epoch += 1;
        self.overlap_cache = None;
        self.install(annotation);
        Ok(())
    }

    pub fn load_json(&mut self, json: &str) -> Result<(), LoadError> {
        let data = AnnotationData::from_json(json)?;
        self.load_annotation(&data)
    }

    // ========================================================================
    // Queries
    // ========================================================================

    pub fn annotation(&self) -> &Annotation {
        &self.annotation
    }

    /// Cells in insertion order
    pub fn cells(&self) -> &[Cell] {
        self.annotation.cells()
    }

    pub fn cell(&self, id: CellId) -> Option<&Cell> {
        self.annotation.cell(id)
    }

    /// Serializable snapshot for the external codecs
    pub fn to_data(&self) -> AnnotationData {
        self.annotation.to_data()
    }

    pub fn can_undo(&self) -> bool {
        self.history.can_undo()
    }

    pub fn can_redo(&self) -> bool {
        self.history.can_redo()
    }

    pub fn history(&self) -> &History {
        &self.history
    }

    pub fn selection(&self) -> &Selection {
        &self.selection
    }

    pub fn mode(&self) -> EditMode {
        self.mode
    }

    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    pub fn image_size(&self) -> Option<(f32, f32)> {
        self.image_size
    }

    pub fn config(&self) -> &EditorConfig {
        &self.config
    }

    pub fn geometry_version(&self) -> u64 {
        self.geometry_version
    }

    pub fn gesture(&self) -> &Gesture {
        &self.gesture
    }

    /// Live rectangle of an in-progress create gesture
    pub fn create_preview(&self) -> Option<Bounds> {
        match &self.gesture {
            Gesture::Create(g) => g.preview(),
            _ => None,
        }
    }

    /// Cells the active drag or resize is currently snapping to
    pub fn snap_highlights(&self) -> &[CellId] {
        match &self.gesture {
            Gesture::Drag(g) => g
                .preview()
                .map(|s| s.matched_cell_ids.as_slice())
                .unwrap_or_default(),
            Gesture::Resize(g) => g
                .current()
                .map(|s| s.snap.matched_cell_ids.as_slice())
                .unwrap_or_default(),
            _ => &[],
        }
    }

    pub fn overlaps(&self) -> Vec<Overlap> {
        overlap::detect_overlaps(self.annotation.cells())
    }

    pub fn border_conflicts(&self) -> Vec<BorderConflict> {
        overlap::detect_border_conflicts(self.annotation.cells(), self.config.conflict_config())
    }

    pub fn report(&self) -> Report {
        Report::build(&self.annotation, &self.config, self.image_size)
    }

    // ========================================================================
    // History-wrapped mutations
    // ========================================================================

    /// Add a cell from interchange data; `None` if its geometry is invalid or too small
    pub fn create_cell(&mut self, data: &CellData) -> Option<CellId> {
        let bounds = match data.validated_bounds(self.annotation.len()) {
            Ok(bounds) => bounds,
            Err(err) => {
                log::debug!("rejecting new cell: {err}");
                return None;
            }
        };
        if !bounds.exceeds(self.config.min_cell_size) {
            log::debug!(
                "rejecting {}x{} cell below minimum size",
                bounds.width(),
                bounds.height()
            );
            return None;
        }

        let mut created = None;
        self.commit_with(|ann| {
            created = ann.push_cell(data, bounds);
            created.is_some()
        });
        if created.is_none() {
            log::warn!("no cell id left, rejecting new cell");
        }
        created
    }

    pub fn move_cell(&mut self, id: CellId, dx: f32, dy: f32) -> bool {
        self.move_cells(&[id], dx, dy)
    }

    /// Translate several cells as one history entry
    pub fn move_cells(&mut self, ids: &[CellId], dx: f32, dy: f32) -> bool {
        if !dx.is_finite() || !dy.is_finite() || (dx == 0.0 && dy == 0.0) {
            return false;
        }
        self.commit_with(|ann| {
            let mut moved = false;
            for &id in ids {
                if let Some(cell) = ann.cell_mut(id) {
                    cell.move_by(dx, dy);
                    moved = true;
                }
            }
            moved
        })
    }

    pub fn update_cell_lines(&mut self, id: CellId, patch: CellLinesPatch) -> bool {
        self.update_cells_lines(&[id], patch)
    }

    /// Apply a partial border update to several cells as one history entry
    pub fn update_cells_lines(&mut self, ids: &[CellId], patch: CellLinesPatch) -> bool {
        if patch.is_empty() {
            return false;
        }
        self.commit_with(|ann| {
            let mut changed = false;
            for &id in ids {
                if let Some(cell) = ann.cell_mut(id) {
                    let before = cell.lines;
                    cell.lines.apply(patch);
                    changed |= cell.lines != before;
                }
            }
            changed
        })
    }

    /// Replace a cell's geometry, normalised to the points' bounding rectangle
    pub fn update_cell_points(&mut self, id: CellId, points: [Point; 4]) -> bool {
        if points.iter().any(|p| !p.is_finite()) {
            return false;
        }
        let Some(bounds) = Bounds::from_points(&points) else {
            return false;
        };
        if !bounds.exceeds(self.config.min_cell_size) {
            return false;
        }
        self.commit_with(|ann| match ann.cell_mut(id) {
            Some(cell) if cell.bounds() != bounds || !cell.is_rectangular() => {
                cell.set_bounds(bounds);
                true
            }
            _ => false,
        })
    }

    /// Move one edge to an exact coordinate, rejected if the cell would flip or shrink too far
    pub fn set_cell_edge(&mut self, id: CellId, edge: Edge, value: f32) -> bool {
        if !value.is_finite() {
            return false;
        }
        let min_size = self.config.min_cell_size;
        self.commit_with(|ann| {
            let Some(cell) = ann.cell_mut(id) else {
                return false;
            };
            let mut edited = cell.clone();
            edited.set_edge_position(edge, value);
            let (width, height) = edited.signed_size();
            if width <= min_size || height <= min_size || edited == *cell {
                return false;
            }
            *cell = edited;
            true
        })
    }

    pub fn remove_cell(&mut self, id: CellId) -> bool {
        self.remove_cells(&[id])
    }

    pub fn remove_cells(&mut self, ids: &[CellId]) -> bool {
        self.commit_with(|ann| {
            let mut removed = false;
            for &id in ids {
                removed |= ann.remove_cell(id).is_some();
            }
            removed
        })
    }

    pub fn update_all_cells_color(&mut self, color: CellColor) -> bool {
        self.commit_with(|ann| {
            let mut changed = false;
            for cell in ann.cells_mut() {
                changed |= cell.color != Some(color);
                cell.color = Some(color);
            }
            changed
        })
    }

    pub fn update_all_cells_opacity(&mut self, opacity: f32) -> bool {
        if !opacity.is_finite() {
            return false;
        }
        let opacity = opacity.clamp(0.0, 1.0);
        self.commit_with(|ann| {
            let mut changed = false;
            for cell in ann.cells_mut() {
                changed |= cell.opacity != Some(opacity);
                cell.opacity = Some(opacity);
            }
            changed
        })
    }

    /// Step back one snapshot; a no-op at the origin
    pub fn undo(&mut self) -> bool {
        self.cancel_gesture();
        let Some(snapshot) = self.history.undo() else {
            return false;
        };
        self.install(snapshot);
        self.history.finish_replay();
        true
    }

    pub fn redo(&mut self) -> bool {
        self.cancel_gesture();
        let Some(snapshot) = self.history.redo() else {
            return false;
        };
        self.install(snapshot);
        self.history.finish_replay();
        true
    }

    /// Build the next annotation with `f` and commit it if `f` reports a change
    fn commit_with(&mut self, f: impl FnOnce(&mut Annotation) -> bool) -> bool {
        if !self.gesture.is_idle() {
            log::debug!("edit during active gesture, cancelling gesture");
            self.cancel_gesture();
        }
        let mut next = self.annotation.clone();
        if !f(&mut next) {
            return false;
        }
        self.install(next);
        self.history.commit(self.annotation.clone())
    }

    /// Swap in a new annotation and resync derived state
    fn install(&mut self, annotation: Annotation) {
        self.annotation = annotation;
        self.geometry_version = self.geometry_version.wrapping_add(1);

        let before = self.selection.clone();
        let annotation = &self.annotation;
        self.selection.retain(|id| annotation.contains(id));
        if self.selection != before {
            self.selection_epoch += 1;
        }
    }

    // ========================================================================
    // Selection and overlap cycling
    // ========================================================================

    fn set_selection(&mut self, selection: Selection) -> bool {
        if self.selection == selection {
            return false;
        }
        self.selection = selection;
        self.selection_epoch += 1;
        true
    }

    /// Select exactly one cell; unknown ids are ignored
    pub fn select(&mut self, id: CellId) -> bool {
        if !self.annotation.contains(id) {
            return false;
        }
        self.set_selection(Selection::single(id))
    }

    /// Add or remove a cell from the selection
    pub fn toggle_select(&mut self, id: CellId) -> bool {
        if !self.annotation.contains(id) {
            return false;
        }
        let mut selection = self.selection.clone();
        selection.toggle(id);
        self.set_selection(selection)
    }

    pub fn select_all(&mut self) -> bool {
        let mut selection = Selection::default();
        for cell in self.annotation.cells() {
            selection.add(cell.id());
        }
        self.set_selection(selection)
    }

    pub fn clear_selection(&mut self) -> bool {
        self.set_selection(Selection::default())
    }

    /// Overlap group cached for the current geometry and selection, if still valid
    pub fn cached_overlap_group(&self) -> Option<&[CellId]> {
        self.overlap_cache
            .as_ref()
            .filter(|cache| {
                cache.geometry_version == self.geometry_version
                    && cache.selection_epoch == self.selection_epoch
            })
            .map(|cache| cache.cell_ids.as_slice())
    }

    fn overlap_group_for(&mut self, selected: CellId) -> Vec<CellId> {
        if let Some(cache) = &self.overlap_cache {
            if cache.geometry_version == self.geometry_version
                && cache.selection_epoch == self.selection_epoch
                && cache.cell_ids.contains(&selected)
            {
                log::debug!("reusing overlap group of {}", cache.source);
                return cache.cell_ids.clone();
            }
        }

        let cell_ids = overlap::overlap_group(self.annotation.cells(), selected);
        self.overlap_cache = Some(OverlapGroupCache {
            source: selected,
            geometry_version: self.geometry_version,
            selection_epoch: self.selection_epoch,
            cell_ids: cell_ids.clone(),
        });
        cell_ids
    }

    /// Select the next or previous cell in the selected cell's overlap group.
    ///
    /// The group is sorted by id and wraps around. Returns the newly selected
    /// cell, or `None` when nothing is selected or the cell overlaps nothing.
    pub fn cycle_overlap(&mut self, direction: CycleDirection) -> Option<CellId> {
        let current = self.selection.primary()?;
        let group = self.overlap_group_for(current);
        if group.len() < 2 {
            return None;
        }
        let index = group.iter().position(|&id| id == current)?;
        let len = group.len();
        let next = match direction {
            CycleDirection::Next => group[(index + 1) % len],
            CycleDirection::Previous => group[(index + len - 1) % len],
        };
        // Cycling keeps the cache alive, so the epoch is left alone
        self.selection = Selection::single(next);
        log::debug!("cycled overlap selection {current} -> {next}");
        Some(next)
    }

    // ========================================================================
    // Viewport, mode and configuration
    // ========================================================================

    /// Record the surface transform. Active gestures keep their press-time snapshot.
    pub fn set_viewport(&mut self, viewport: Viewport) {
        self.viewport = viewport;
    }

    /// Document raster size; non-positive sizes clear it
    pub fn set_image_size(&mut self, width: f32, height: f32) {
        self.image_size = (width.is_finite() && height.is_finite() && width > 0.0 && height > 0.0)
            .then_some((width, height));
    }

    /// Switch mode, cancelling any active gesture
    pub fn set_mode(&mut self, mode: EditMode) -> bool {
        self.cancel_gesture();
        if self.mode == mode {
            return false;
        }
        log::debug!("edit mode {:?} -> {mode:?}", self.mode);
        self.mode = mode;
        true
    }

    pub fn update_config(&mut self, config: EditorConfig) {
        let config = config.sanitized();
        if config.history_capacity != self.history.capacity() {
            self.history.set_capacity(config.history_capacity);
        }
        self.config = config;
    }

    // ========================================================================
    // Pointer gestures
    // ========================================================================

    /// Handle a press at surface position `screen`. Returns true if a gesture started.
    pub fn pointer_down(&mut self, screen: Point, modifiers: Modifiers) -> bool {
        self.cancel_gesture();
        let viewport = self.viewport;

        match self.mode {
            EditMode::Create => match CreateGesture::begin(screen, viewport, self.image_size) {
                Some(gesture) => {
                    self.gesture = Gesture::Create(gesture);
                    true
                }
                None => false,
            },
            EditMode::Select => {
                let hit = interaction::hit_test(
                    &self.annotation,
                    &self.selection,
                    viewport,
                    screen,
                    self.config.handle_radius,
                );
                match hit {
                    HandleHit::Corner(id, corner) => {
                        let Some(cell) = self.annotation.cell(id) else {
                            return false;
                        };
                        let linked = if self.config.linked_resize {
                            self.selection
                                .ids()
                                .iter()
                                .filter(|&&other| other != id)
                                .filter_map(|&other| self.annotation.cell(other))
                                .map(|c| (c.id(), c.bounds()))
                                .collect()
                        } else {
                            Vec::new()
                        };
                        let gesture = ResizeGesture::begin(cell, corner, screen, viewport, linked);
                        self.begin_gesture(Gesture::Resize(gesture));
                        true
                    }
                    HandleHit::Body(id, _) if modifiers.shift() => {
                        self.toggle_select(id);
                        false
                    }
                    HandleHit::Body(id, _) => {
                        if !self.selection.contains(id) {
                            self.select(id);
                        }
                        let Some(cell) = self.annotation.cell(id) else {
                            return false;
                        };
                        let gesture = DragGesture::begin(cell, screen, viewport);
                        self.begin_gesture(Gesture::Drag(gesture));
                        true
                    }
                    HandleHit::Empty => {
                        self.clear_selection();
                        false
                    }
                }
            }
        }
    }

    fn begin_gesture(&mut self, gesture: Gesture) {
        self.gesture_base = Some(self.annotation.clone());
        self.gesture = gesture;
    }

    /// Advance the active gesture; live geometry is installed without history
    pub fn pointer_move(&mut self, screen: Point) {
        let settings = GestureSettings::from(&self.config);

        match std::mem::take(&mut self.gesture) {
            Gesture::Idle => {}
            Gesture::Create(mut gesture) => {
                let targets = self.snap_targets(&BTreeSet::new());
                gesture.update(screen, &targets, &settings);
                self.gesture = Gesture::Create(gesture);
            }
            Gesture::Drag(mut gesture) => {
                let id = gesture.cell_id();
                let Some(current) = self.annotation.cell(id).cloned() else {
                    log::warn!("dragged {id} disappeared, cancelling drag");
                    self.cancel_gesture();
                    return;
                };
                let targets = self.snap_targets(&BTreeSet::from([id]));
                let step = gesture.update(screen, &current, &targets, &settings);
                self.gesture = Gesture::Drag(gesture);
                self.apply_live(|ann| {
                    if let Some(cell) = ann.cell_mut(id) {
                        cell.move_by(step.dx, step.dy);
                    }
                });
            }
            Gesture::Resize(mut gesture) => {
                let id = gesture.cell_id();
                let moving: BTreeSet<CellId> =
                    std::iter::once(id).chain(gesture.linked_ids()).collect();
                let targets = self.snap_targets(&moving);
                let step = gesture.update(screen, &targets, &settings);
                self.gesture = Gesture::Resize(gesture);
                if let Some(step) = step {
                    self.apply_resize(id, &step);
                }
            }
        }
    }

    /// Finish the active gesture. Returns true if a history entry was committed.
    pub fn pointer_up(&mut self, screen: Point) -> bool {
        if matches!(self.gesture, Gesture::Drag(_) | Gesture::Resize(_)) {
            self.pointer_move(screen);
        }
        let settings = GestureSettings::from(&self.config);

        match std::mem::take(&mut self.gesture) {
            Gesture::Idle => false,
            Gesture::Create(gesture) => {
                self.gesture_base = None;
                let targets = self.snap_targets(&BTreeSet::new());
                let Some(bounds) = gesture.finish(screen, &targets, &settings) else {
                    return false;
                };
                match self.create_cell(&CellData::from_bounds(bounds)) {
                    Some(id) => {
                        self.select(id);
                        true
                    }
                    None => false,
                }
            }
            Gesture::Drag(gesture) => {
                let id = gesture.cell_id();
                if let Some((dx, dy)) = gesture.finish() {
                    self.apply_live(|ann| {
                        if let Some(cell) = ann.cell_mut(id) {
                            cell.move_by(dx, dy);
                        }
                    });
                }
                self.commit_gesture()
            }
            Gesture::Resize(gesture) => {
                let id = gesture.cell_id();
                if let Some(step) = gesture.finish() {
                    self.apply_resize(id, &step);
                }
                self.commit_gesture()
            }
        }
    }

    /// Abort the active gesture and restore the pre-gesture annotation
    pub fn cancel_gesture(&mut self) -> bool {
        let was_active = !self.gesture.is_idle();
        self.gesture = Gesture::Idle;
        if let Some(base) = self.gesture_base.take() {
            if base != self.annotation {
                self.install(base);
            }
        }
        if was_active {
            log::debug!("gesture cancelled");
        }
        was_active
    }

    fn commit_gesture(&mut self) -> bool {
        match self.gesture_base.take() {
            Some(base) if base != self.annotation => self.history.commit(self.annotation.clone()),
            _ => false,
        }
    }

    fn apply_live(&mut self, f: impl FnOnce(&mut Annotation)) {
        let mut next = self.annotation.clone();
        f(&mut next);
        if next != self.annotation {
            self.install(next);
        }
    }

    fn apply_resize(&mut self, id: CellId, step: &ResizeStep) {
        let Some(bounds) = Bounds::from_points(&step.points) else {
            return;
        };
        self.apply_live(|ann| {
            if let Some(cell) = ann.cell_mut(id) {
                cell.set_bounds(bounds);
            }
            for &(linked_id, linked_bounds) in &step.linked {
                if let Some(cell) = ann.cell_mut(linked_id) {
                    cell.set_bounds(linked_bounds);
                }
            }
        });
    }

    fn snap_targets(&self, exclude: &BTreeSet<CellId>) -> Vec<SnapTarget> {
        snap::snap_targets(self.annotation.cells(), |id| exclude.contains(&id))
    }

    // ========================================================================
    // Commands
    // ========================================================================

    /// Apply a keyboard/menu command. Returns true if anything changed.
    pub fn execute(&mut self, command: Command) -> bool {
        match command {
            Command::Edit(msg) => self.handle_edit(msg),
            Command::Selection(SelectionMsg::CycleOverlap(direction)) => {
                self.cycle_overlap(direction).is_some()
            }
            Command::Selection(SelectionMsg::SelectAll) => self.select_all(),
            Command::Selection(SelectionMsg::Clear) => self.clear_selection(),
            Command::SetMode(mode) => self.set_mode(mode),
            Command::Cancel => self.cancel_gesture() || self.clear_selection(),
        }
    }

    fn handle_edit(&mut self, msg: EditMsg) -> bool {
        let selected: Vec<CellId> = self.selection.ids().iter().copied().collect();
        match msg {
            EditMsg::Undo => self.undo(),
            EditMsg::Redo => self.redo(),
            EditMsg::Delete => self.remove_cells(&selected),
            EditMsg::Nudge(steps_x, steps_y) => {
                let step = self.config.nudge_step;
                self.move_cells(&selected, steps_x * step, steps_y * step)
            }
            EditMsg::ToggleEdge(edge) => {
                // Every selected cell ends up with the opposite of the primary's flag
                let Some(primary) = self
                    .selection
                    .primary()
                    .and_then(|id| self.annotation.cell(id))
                else {
                    return false;
                };
                let visible = !primary.lines.get(edge);
                self.update_cells_lines(&selected, CellLinesPatch::edge(edge, visible))
            }
            EditMsg::SetAllEdges(visible) => {
                self.update_cells_lines(&selected, CellLinesPatch::all(visible))
            }
        }
    }
}
