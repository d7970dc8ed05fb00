//! Open pages keyed by the handle the host holds. Handles are never reused,
//! so a stale handle from a closed page cannot reach a newer one.

use std::collections::BTreeMap;

use factbook_core::page::PageModel;

#[derive(Debug)]
pub struct PageSlots {
    pages: BTreeMap<usize, PageModel>,
    next: usize,
}

impl PageSlots {
    pub const fn new() -> Self {
        Self {
            pages: BTreeMap::new(),
            next: 0,
        }
    }

    pub fn insert(&mut self, page: PageModel) -> usize {
        let handle = self.next;
        self.next += 1;
        self.pages.insert(handle, page);
        handle
    }

    pub fn get_mut(&mut self, handle: usize) -> Option<&mut PageModel> {
        self.pages.get_mut(&handle)
    }

    /// Unmount and drop the page. Returns whether the handle was open.
    pub fn close(&mut self, handle: usize) -> bool {
        match self.pages.remove(&handle) {
            Some(mut page) => {
                page.unmount();
                true
            }
            None => false,
        }
    }

    #[cfg(test)]
    pub fn open_count(&self) -> usize {
        self.pages.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use factbook_core::TotalPolicy;
    use factbook_core::catalog::{PAGE_8, PAGE_24};

    #[test]
    fn closing_frees_the_slot() {
        let mut slots = PageSlots::new();
        for _ in 0..100 {
            let handle = slots.insert(PageModel::new(&PAGE_24, TotalPolicy::default()));
            assert!(slots.close(handle));
        }
        assert_eq!(slots.open_count(), 0);
    }

    #[test]
    fn handles_are_not_reused() {
        let mut slots = PageSlots::new();
        let first = slots.insert(PageModel::new(&PAGE_24, TotalPolicy::default()));
        assert!(slots.close(first));
        let second = slots.insert(PageModel::new(&PAGE_8, TotalPolicy::default()));
        assert_ne!(first, second);
        assert!(slots.get_mut(first).is_none());
        assert!(!slots.close(first));
        assert_eq!(slots.get_mut(second).map(|p| p.spec().anchor), Some("page-8"));
    }
}
