//! Page table: one ledger per page key, one of them bound as current.

use crate::ledger::Ledger;
use crate::segment::{ContributorId, PageKey};
use std::collections::HashMap;

/// Maps page keys to ledgers and tracks the bound page.
#[derive(Debug, Clone)]
pub struct PageTable {
    pages: HashMap<PageKey, Ledger>,
    current: PageKey,
    /// Size given to the initial page when it has to be recreated.
    default_size: (u32, u32),
}

impl PageTable {
    /// Create a table bound to [`PageKey::INITIAL`].
    pub fn new(width: u32, height: u32) -> Self {
        let mut pages = HashMap::new();
        pages.insert(PageKey::INITIAL, Ledger::new(PageKey::INITIAL, width, height));
        Self {
            pages,
            current: PageKey::INITIAL,
            default_size: (width, height),
        }
    }

    pub fn current_key(&self) -> PageKey {
        self.current
    }

    /// Ledger of the bound page.
    pub fn current(&self) -> &Ledger {
        &self.pages[&self.current]
    }

    pub fn current_mut(&mut self) -> &mut Ledger {
        let key = self.current;
        let (width, height) = self.default_size;
        self.pages
            .entry(key)
            .or_insert_with(|| Ledger::new(key, width, height))
    }

    pub fn get(&self, key: PageKey) -> Option<&Ledger> {
        self.pages.get(&key)
    }

    pub fn get_mut(&mut self, key: PageKey) -> Option<&mut Ledger> {
        self.pages.get_mut(&key)
    }

    pub fn contains(&self, key: PageKey) -> bool {
        self.pages.contains_key(&key)
    }

    pub fn len(&self) -> usize {
        self.pages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pages.is_empty()
    }

    /// Page keys in ascending order.
    pub fn keys(&self) -> Vec<PageKey> {
        let mut keys: Vec<_> = self.pages.keys().copied().collect();
        keys.sort();
        keys
    }

    pub fn ledgers(&self) -> impl Iterator<Item = &Ledger> + '_ {
        self.pages.values()
    }

    /// Bind `key` as the current page, creating its ledger on first visit.
    ///
    /// The ledger switched away from is left untouched. Returns `true` if a
    /// ledger was created.
    pub fn switch_to(&mut self, key: PageKey, width: u32, height: u32) -> bool {
        let mut created = false;
        self.pages.entry(key).or_insert_with(|| {
            created = true;
            Ledger::new(key, width, height)
        });
        if created {
            log::info!("Created page {} ({}x{})", key, width, height);
        }
        self.current = key;
        created
    }

    /// Insert a ledger (e.g. restored from a snapshot), replacing any existing one.
    pub fn insert(&mut self, ledger: Ledger) -> Option<Ledger> {
        self.pages.insert(ledger.key(), ledger)
    }

    /// Delete a page and all its strokes.
    ///
    /// Removing the bound page rebinds the initial page, recreating it if it
    /// was the one removed.
    pub fn remove_page(&mut self, key: PageKey) -> Option<Ledger> {
        let removed = self.pages.remove(&key)?;
        log::info!("Removed page {} with {} strokes", key, removed.len());
        if key == self.current {
            let (width, height) = self.default_size;
            self.switch_to(PageKey::INITIAL, width, height);
        }
        Some(removed)
    }

    /// Drop a departed contributor's undo view on every page.
    pub fn contributor_left(&mut self, contributor: &ContributorId) -> usize {
        self.pages
            .values_mut()
            .map(|ledger| ledger.remove_contributor(contributor))
            .filter(|removed| *removed)
            .count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::segment::{Segment, SerializableColor};
    use kurbo::Point;

    fn seg(who: &str) -> Segment {
        Segment::new(
            who.into(),
            Point::new(0.0, 0.0),
            Point::new(4.0, 4.0),
            SerializableColor::black(),
            2.0,
        )
    }

    #[test]
    fn test_starts_on_initial_page() {
        let table = PageTable::new(1024, 1024);
        assert_eq!(table.current_key(), PageKey::INITIAL);
        assert_eq!(table.current().width(), 1024);
    }

    #[test]
    fn test_switch_creates_lazily_and_preserves_old_page() {
        let mut table = PageTable::new(100, 100);
        table.current_mut().append_segment(PageKey(0), seg("u1"), true);

        assert!(table.switch_to(PageKey(1), 50, 60));
        assert_eq!(table.current().height(), 60);
        assert!(table.current().is_empty());

        assert!(!table.switch_to(PageKey(0), 1, 1));
        assert_eq!(table.current().len(), 1);
        assert_eq!(table.current().width(), 100);
    }

    #[test]
    fn test_remove_current_page_rebinds_initial() {
        let mut table = PageTable::new(100, 100);
        table.switch_to(PageKey(5), 10, 10);
        assert!(table.remove_page(PageKey(5)).is_some());
        assert_eq!(table.current_key(), PageKey::INITIAL);
        assert!(!table.contains(PageKey(5)));
        assert!(table.remove_page(PageKey(5)).is_none());
    }

    #[test]
    fn test_remove_initial_page_recreates_it_empty() {
        let mut table = PageTable::new(100, 100);
        table.current_mut().append_segment(PageKey(0), seg("u1"), true);
        table.remove_page(PageKey::INITIAL);
        assert!(table.contains(PageKey::INITIAL));
        assert!(table.current().is_empty());
    }

    #[test]
    fn test_contributor_left_spans_pages() {
        let mut table = PageTable::new(100, 100);
        table.current_mut().append_segment(PageKey(0), seg("u1"), true);
        table.switch_to(PageKey(1), 100, 100);
        table.current_mut().append_segment(PageKey(1), seg("u1"), true);

        assert_eq!(table.contributor_left(&"u1".into()), 2);
        for ledger in table.ledgers() {
            assert_eq!(ledger.len(), 1);
            assert!(ledger.contributor_strokes(&"u1".into()).is_empty());
        }
        assert_eq!(table.contributor_left(&"u1".into()), 0);
    }

    #[test]
    fn test_keys_sorted() {
        let mut table = PageTable::new(10, 10);
        table.switch_to(PageKey(3), 10, 10);
        table.switch_to(PageKey(1), 10, 10);
        assert_eq!(table.keys(), vec![PageKey(0), PageKey(1), PageKey(3)]);
    }
}
