//! Page window bookkeeping.
//!
//! Tracks the half-open range of page indices `[start, end)` currently
//! materialized by a recycling list. This is a pure data component: it knows
//! nothing about elements, only about which pages they represent.

use crate::error::VirtualListError;
use crate::result::ListResult;
use serde::{Deserialize, Serialize};

/// Half-open range of materialized page indices.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageWindow {
    start: usize,
    end: usize,
}

impl PageWindow {
    /// Create an empty window positioned at the top of the list.
    pub fn new() -> Self {
        Self { start: 0, end: 0 }
    }

    /// Index of the first materialized page.
    pub fn start(&self) -> usize {
        self.start
    }

    /// One past the last materialized page.
    pub fn end(&self) -> usize {
        self.end
    }

    /// Number of materialized pages.
    pub fn len(&self) -> usize {
        self.end - self.start
    }

    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }

    pub fn is_at_top(&self) -> bool {
        self.start == 0
    }

    pub fn contains(&self, page: usize) -> bool {
        page >= self.start && page < self.end
    }

    /// Page fetched by the next bottom trigger.
    pub fn next_page(&self) -> usize {
        self.end
    }

    /// Page fetched by the next top trigger, if any remain above the window.
    pub fn prev_page(&self) -> Option<usize> {
        self.start.checked_sub(1)
    }

    /// Page represented by a pool slot, given fixed-size page chunks.
    pub fn page_for_slot(&self, slot: usize, page_size: usize) -> Option<usize> {
        if page_size == 0 {
            return None;
        }
        let page = self.start + slot / page_size;
        self.contains(page).then_some(page)
    }

    /// Grow the window downwards by one page.
    pub fn extend_end(&mut self) {
        self.end += 1;
    }

    /// Slide the whole window down by one page.
    pub fn advance(&mut self) {
        self.start += 1;
        self.end += 1;
    }

    /// Grow the window upwards by one page.
    pub fn extend_start(&mut self) -> ListResult<()> {
        self.start = self.prev_page().ok_or(VirtualListError::AtTopOfList)?;
        Ok(())
    }

    /// Slide the whole window up by one page.
    pub fn retreat(&mut self) -> ListResult<()> {
        let start = self.prev_page().ok_or(VirtualListError::AtTopOfList)?;
        self.start = start;
        self.end -= 1;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_window_is_empty() {
        let window = PageWindow::new();
        assert!(window.is_empty());
        assert!(window.is_at_top());
        assert_eq!(window.next_page(), 0);
        assert_eq!(window.prev_page(), None);
    }

    #[test]
    fn test_extend_then_advance() {
        let mut window = PageWindow::new();
        window.extend_end();
        window.extend_end();
        assert_eq!((window.start(), window.end()), (0, 2));

        window.advance();
        assert_eq!((window.start(), window.end()), (1, 3));
        assert_eq!(window.len(), 2);
        assert_eq!(window.prev_page(), Some(0));
    }

    #[test]
    fn test_retreat_at_top_fails_without_change() {
        let mut window = PageWindow::new();
        window.extend_end();

        let result = window.retreat();
        assert!(matches!(result, Err(VirtualListError::AtTopOfList)));
        assert_eq!((window.start(), window.end()), (0, 1));

        assert!(window.extend_start().is_err());
        assert_eq!(window.start(), 0);
    }

    #[test]
    fn test_retreat_mirrors_advance() {
        let mut window = PageWindow::new();
        window.extend_end();
        window.extend_end();
        window.advance();
        window.retreat().unwrap();
        assert_eq!((window.start(), window.end()), (0, 2));
    }

    #[test]
    fn test_page_for_slot() {
        let mut window = PageWindow::new();
        window.extend_end();
        window.extend_end();
        window.advance();

        assert_eq!(window.page_for_slot(0, 3), Some(1));
        assert_eq!(window.page_for_slot(2, 3), Some(1));
        assert_eq!(window.page_for_slot(3, 3), Some(2));
        assert_eq!(window.page_for_slot(6, 3), None);
        assert_eq!(window.page_for_slot(0, 0), None);
    }
}
