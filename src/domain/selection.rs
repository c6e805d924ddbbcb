//! Selection types for the cell editor

use std::collections::BTreeSet;

use super::cell::CellId;
use super::geometry::{Corner, Edge};

/// What a pointer press landed on
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HandleHit {
    /// Corner handle of a selected cell
    Corner(CellId, Corner),
    /// Inside a cell; the edge is the one nearest to the press
    Body(CellId, Edge),
    /// Empty canvas
    Empty,
}

/// Currently selected cells plus the primary one the user acted on last
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Selection {
    ids: BTreeSet<CellId>,
    primary: Option<CellId>,
}

impl Selection {
    pub fn single(id: CellId) -> Self {
        Self {
            ids: BTreeSet::from([id]),
            primary: Some(id),
        }
    }

    pub fn ids(&self) -> &BTreeSet<CellId> {
        &self.ids
    }

    pub fn primary(&self) -> Option<CellId> {
        self.primary
    }

    pub fn contains(&self, id: CellId) -> bool {
        self.ids.contains(&id)
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    /// Add a cell and make it primary
    pub fn add(&mut self, id: CellId) {
        self.ids.insert(id);
        self.primary = Some(id);
    }

    /// Toggle membership; the primary falls back to the highest remaining id
    pub fn toggle(&mut self, id: CellId) {
        if self.ids.remove(&id) {
            if self.primary == Some(id) {
                self.primary = self.ids.iter().next_back().copied();
            }
        } else {
            self.add(id);
        }
    }

    pub fn clear(&mut self) {
        self.ids.clear();
        self.primary = None;
    }

    /// Drop ids for which `exists` is false
    pub fn retain(&mut self, exists: impl Fn(CellId) -> bool) {
        self.ids.retain(|id| exists(*id));
        if self.primary.is_some_and(|p| !self.ids.contains(&p)) {
            self.primary = self.ids.iter().next_back().copied();
        }
    }
}
