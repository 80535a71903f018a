//! Drawing session: applies operations to the page table and reports what to repaint.

use crate::ledger::Ledger;
use crate::operation::Operation;
use crate::pages::PageTable;
use crate::segment::{ContributorId, PageKey, Segment};
use crate::snapshot::{PageRecord, SnapshotCache, SnapshotResult};

/// Something observers of the session need to react to.
#[derive(Debug, Clone, PartialEq)]
pub enum DrawEvent {
    /// A segment was added to the bound page; paint just this one.
    SegmentPainted(Segment),
    /// The bound page must be repainted from a blank surface.
    FullReplayRequested,
    /// A contributor pressed down on a page.
    GestureStarted(PageKey),
}

/// Applies operations, strictly in delivery order, and queues [`DrawEvent`]s.
#[derive(Debug)]
pub struct DrawingSession {
    pages: PageTable,
    snapshots: SnapshotCache,
    events: Vec<DrawEvent>,
}

impl DrawingSession {
    /// Create a session bound to the initial page.
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            pages: PageTable::new(width, height),
            snapshots: SnapshotCache::new(),
            events: Vec::new(),
        }
    }

    pub fn pages(&self) -> &PageTable {
        &self.pages
    }

    /// Ledger of the bound page.
    pub fn current(&self) -> &Ledger {
        self.pages.current()
    }

    pub fn current_key(&self) -> PageKey {
        self.pages.current_key()
    }

    /// Apply one operation. Stale and no-op operations queue nothing.
    pub fn apply(&mut self, op: &Operation) {
        match op {
            Operation::StartGesture { page, contributor } => {
                self.start_gesture(contributor, *page);
            }
            Operation::AppendSegment {
                page,
                segment,
                is_new,
            } => {
                self.append_segment(*page, segment.clone(), *is_new);
            }
            Operation::Undo { contributor } => {
                self.undo(contributor);
            }
            Operation::Redo { contributor } => {
                self.redo(contributor);
            }
            Operation::Clear { page } => {
                self.clear(*page);
            }
            Operation::PageChanged {
                page,
                width,
                height,
            } => {
                self.switch_to(*page, *width, *height);
            }
            Operation::PageRemoved { page } => {
                self.remove_page(*page);
            }
            Operation::ContributorLeft { contributor } => {
                self.contributor_left(contributor);
            }
        }
    }

    /// A gesture is starting: drop any cached snapshot of that page.
    pub fn start_gesture(&mut self, contributor: &ContributorId, page: PageKey) {
        log::debug!("Gesture started by {} on page {}", contributor, page);
        self.snapshots.invalidate(page);
        self.events.push(DrawEvent::GestureStarted(page));
    }

    /// Add a segment to the bound page. Returns `false` if it was dropped.
    pub fn append_segment(&mut self, page: PageKey, segment: Segment, is_new: bool) -> bool {
        let painted = segment.clone();
        if !self.pages.current_mut().append_segment(page, segment, is_new) {
            return false;
        }
        self.snapshots.invalidate(page);
        self.events.push(DrawEvent::SegmentPainted(painted));
        true
    }

    /// Undo the contributor's newest active stroke on the bound page.
    pub fn undo(&mut self, contributor: &ContributorId) -> bool {
        let changed = self.pages.current_mut().undo(contributor).is_some();
        if !changed {
            log::debug!("Nothing to undo for {}", contributor);
        }
        self.after_history_change(changed)
    }

    /// Redo the contributor's next undone stroke on the bound page.
    pub fn redo(&mut self, contributor: &ContributorId) -> bool {
        let changed = self.pages.current_mut().redo(contributor).is_some();
        if !changed {
            log::debug!("Nothing to redo for {}", contributor);
        }
        self.after_history_change(changed)
    }

    fn after_history_change(&mut self, changed: bool) -> bool {
        if changed {
            self.snapshots.invalidate(self.pages.current_key());
            self.events.push(DrawEvent::FullReplayRequested);
        }
        changed
    }

    /// Wipe a page (`None` for the bound one). Returns `false` for an unknown page.
    pub fn clear(&mut self, page: Option<PageKey>) -> bool {
        let key = page.unwrap_or_else(|| self.pages.current_key());
        let Some(ledger) = self.pages.get_mut(key) else {
            log::debug!("Clear for unknown page {}", key);
            return false;
        };
        ledger.clear();
        self.snapshots.invalidate(key);
        if key == self.pages.current_key() {
            self.events.push(DrawEvent::FullReplayRequested);
        }
        true
    }

    /// Navigate to a page, creating it on first visit, and repaint it.
    pub fn switch_to(&mut self, page: PageKey, width: u32, height: u32) {
        self.pages.switch_to(page, width, height);
        self.events.push(DrawEvent::FullReplayRequested);
    }

    /// Delete a page and everything drawn on it.
    pub fn remove_page(&mut self, page: PageKey) -> bool {
        let was_current = page == self.pages.current_key();
        if self.pages.remove_page(page).is_none() {
            return false;
        }
        self.snapshots.invalidate(page);
        if was_current {
            self.events.push(DrawEvent::FullReplayRequested);
        }
        true
    }

    /// A contributor disconnected: their strokes stay, their undo history goes.
    pub fn contributor_left(&mut self, contributor: &ContributorId) {
        let pages = self.pages.contributor_left(contributor);
        log::info!("Contributor {} left ({} pages affected)", contributor, pages);
    }

    /// Install a page restored from a snapshot.
    ///
    /// Replaces any ledger with the same key; repaints if it is the bound page.
    pub fn restore_page(&mut self, record: PageRecord) -> SnapshotResult<()> {
        let ledger = Ledger::from_record(record)?;
        let key = ledger.key();
        self.pages.insert(ledger);
        self.snapshots.invalidate(key);
        if key == self.pages.current_key() {
            self.events.push(DrawEvent::FullReplayRequested);
        }
        Ok(())
    }

    /// Serialized snapshot of a page, cached until the page changes.
    pub fn snapshot(&mut self, page: PageKey) -> SnapshotResult<Option<String>> {
        let Some(ledger) = self.pages.get(page) else {
            return Ok(None);
        };
        Ok(Some(self.snapshots.get_or_serialize(ledger)?.to_string()))
    }

    /// Drain queued events.
    pub fn take_events(&mut self) -> Vec<DrawEvent> {
        std::mem::take(&mut self.events)
    }

    pub fn has_events(&self) -> bool {
        !self.events.is_empty()
    }
}
