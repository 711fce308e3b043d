//! Vertical placement of pooled elements.
//!
//! Elements carry no position of their own: a slot index maps to a fixed
//! offset, and offsets are reapplied whenever pool order changes. Offsets are
//! applied as transforms so moving an element never reflows its neighbours.

use crate::pool::ElementPool;
use vlist_core::{ListConfig, Translate};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PositionTranslator {
    element_height: f64,
    margin: f64,
}

impl PositionTranslator {
    pub fn new(element_height: f64, margin: f64) -> Self {
        Self {
            element_height,
            margin,
        }
    }

    pub fn from_config(config: &ListConfig) -> Self {
        Self::new(config.element_height, config.margin)
    }

    /// Offset in pixels of the top of `slot`.
    pub fn offset_of(&self, slot: usize) -> f64 {
        slot as f64 * (self.element_height + self.margin)
    }

    pub fn apply<E: Translate>(&self, element: &mut E, slot: usize) {
        element.translate_y(self.offset_of(slot));
    }

    /// Reapply offsets for every element in pool order.
    pub fn reindex_all<E: Translate>(&self, pool: &mut ElementPool<E>) {
        for (slot, element) in pool.iter_mut().enumerate() {
            self.apply(element, slot);
        }
    }
}
