//! Per-page stroke ledger.
//!
//! Strokes live in an arena indexed by [`StrokeId`]. The global order (which is
//! also the paint order) and every contributor's own view hold handles into that
//! arena, so flipping a stroke's `active` flag through one view is seen through
//! the other.

use crate::history;
use crate::segment::{ContributorId, PageKey, Segment};
use crate::snapshot::{PageRecord, SnapshotError, SnapshotResult};
use crate::stroke::{Stroke, StrokeId};
use std::collections::{HashMap, HashSet};

/// Stroke history of one page.
#[derive(Debug, Clone)]
pub struct Ledger {
    key: PageKey,
    width: u32,
    height: u32,
    /// Stroke storage; handles index into this.
    arena: Vec<Stroke>,
    /// Creation order across all contributors.
    global: Vec<StrokeId>,
    /// Each contributor's strokes, in their creation order.
    by_contributor: HashMap<ContributorId, Vec<StrokeId>>,
}

impl Ledger {
    /// Create an empty ledger for a page.
    pub fn new(key: PageKey, width: u32, height: u32) -> Self {
        Self {
            key,
            width,
            height,
            arena: Vec::new(),
            global: Vec::new(),
            by_contributor: HashMap::new(),
        }
    }

    pub fn key(&self) -> PageKey {
        self.key
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// Number of strokes in the global order.
    pub fn len(&self) -> usize {
        self.global.len()
    }

    pub fn is_empty(&self) -> bool {
        self.global.is_empty()
    }

    /// Number of strokes currently painted.
    pub fn active_count(&self) -> usize {
        self.strokes().filter(|s| s.is_active()).count()
    }

    pub fn stroke(&self, id: StrokeId) -> Option<&Stroke> {
        self.arena.get(id.0)
    }

    /// Strokes in creation (paint) order.
    pub fn strokes(&self) -> impl Iterator<Item = &Stroke> + '_ {
        self.global.iter().map(|id| &self.arena[id.0])
    }

    /// Handles in creation order.
    pub fn stroke_ids(&self) -> &[StrokeId] {
        &self.global
    }

    /// Handles of the strokes a contributor created, oldest first.
    pub fn contributor_strokes(&self, contributor: &ContributorId) -> &[StrokeId] {
        self.by_contributor
            .get(contributor)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Contributors that still hold an undo view on this page.
    pub fn contributors(&self) -> impl Iterator<Item = &ContributorId> + '_ {
        self.by_contributor.keys()
    }

    /// Append a segment drawn on `page`.
    ///
    /// Returns `false` when the segment was dropped: the page key is not this
    /// ledger's (a gesture that outlived a page switch), or it continues a stroke
    /// the contributor no longer has.
    pub fn append_segment(&mut self, page: PageKey, segment: Segment, is_new: bool) -> bool {
        if page != self.key {
            log::debug!(
                "Dropping segment from {} for page {} (bound to {})",
                segment.contributor,
                page,
                self.key
            );
            return false;
        }

        if is_new {
            let id = StrokeId(self.arena.len());
            let contributor = segment.contributor.clone();
            self.arena.push(Stroke::new(segment));
            self.global.push(id);
            self.by_contributor.entry(contributor).or_default().push(id);
            return true;
        }

        let last = self
            .by_contributor
            .get(&segment.contributor)
            .and_then(|ids| ids.last().copied());
        match last {
            Some(id) => {
                self.arena[id.0].push(segment);
                true
            }
            None => {
                log::debug!(
                    "Dropping continuation segment from {}: no open stroke",
                    segment.contributor
                );
                false
            }
        }
    }

    /// Deactivate the contributor's newest active stroke.
    pub fn undo(&mut self, contributor: &ContributorId) -> Option<StrokeId> {
        let ids = self.by_contributor.get(contributor)?;
        let index = history::undo_target(ids, |id| self.arena[id.0].is_active())?;
        let id = ids[index];
        self.arena[id.0].set_active(false);
        Some(id)
    }

    /// Reactivate the contributor's next redoable stroke.
    pub fn redo(&mut self, contributor: &ContributorId) -> Option<StrokeId> {
        let ids = self.by_contributor.get(contributor)?;
        let index = history::redo_target(ids, |id| self.arena[id.0].is_active())?;
        let id = ids[index];
        self.arena[id.0].set_active(true);
        Some(id)
    }

    /// Whether `undo` would change anything for this contributor.
    pub fn can_undo(&self, contributor: &ContributorId) -> bool {
        let ids = self.contributor_strokes(contributor);
        history::undo_target(ids, |id| self.arena[id.0].is_active()).is_some()
    }

    /// Whether `redo` would change anything for this contributor.
    pub fn can_redo(&self, contributor: &ContributorId) -> bool {
        let ids = self.contributor_strokes(contributor);
        history::redo_target(ids, |id| self.arena[id.0].is_active()).is_some()
    }

    /// Drop every stroke and every contributor view.
    pub fn clear(&mut self) {
        self.arena.clear();
        self.global.clear();
        self.by_contributor.clear();
    }

    /// Forget a contributor's undo view. Their strokes keep painting.
    pub fn remove_contributor(&mut self, contributor: &ContributorId) -> bool {
        self.by_contributor.remove(contributor).is_some()
    }

    /// Discard strokes that no operation can ever paint again.
    ///
    /// Only inactive strokes whose contributor view is gone qualify: undone
    /// strokes still listed in a view can come back once everything above them
    /// has been undone too. Returns the number of strokes discarded.
    pub fn prune_unreachable(&mut self) -> usize {
        let mut reachable: HashSet<StrokeId> = self
            .by_contributor
            .values()
            .flat_map(|ids| ids.iter().copied())
            .collect();
        for id in &self.global {
            if self.arena[id.0].is_active() {
                reachable.insert(*id);
            }
        }

        let before = self.global.len();
        if reachable.len() == before {
            return 0;
        }

        let mut remap: HashMap<StrokeId, StrokeId> = HashMap::new();
        let mut arena = Vec::with_capacity(reachable.len());
        let mut global = Vec::with_capacity(reachable.len());
        for id in &self.global {
            if reachable.contains(id) {
                let new_id = StrokeId(arena.len());
                arena.push(self.arena[id.0].clone());
                global.push(new_id);
                remap.insert(*id, new_id);
            }
        }
        for ids in self.by_contributor.values_mut() {
            *ids = ids.iter().filter_map(|id| remap.get(id).copied()).collect();
        }

        self.arena = arena;
        self.global = global;
        before - self.global.len()
    }

    /// Serializable form of this ledger.
    pub fn to_record(&self) -> PageRecord {
        PageRecord {
            key: self.key,
            width: self.width,
            height: self.height,
            strokes: self.strokes().cloned().collect(),
        }
    }

    /// Rebuild a ledger, regrouping contributor views from segment tags.
    pub fn from_record(record: PageRecord) -> SnapshotResult<Self> {
        let mut ledger = Self::new(record.key, record.width, record.height);
        for (index, stroke) in record.strokes.into_iter().enumerate() {
            let contributor = stroke
                .contributor()
                .cloned()
                .ok_or(SnapshotError::EmptyStroke(index))?;
            let id = StrokeId(ledger.arena.len());
            ledger.arena.push(stroke);
            ledger.global.push(id);
            ledger.by_contributor.entry(contributor).or_default().push(id);
        }
        Ok(ledger)
    }
}
