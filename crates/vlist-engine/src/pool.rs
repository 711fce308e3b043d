//! Bounded pool of reusable elements.
//!
//! The pool is a fixed-capacity ring buffer over page-sized chunks. Order is
//! visible order, top to bottom. Recycling removes a chunk from one end and
//! [`ElementPool::rotate`] puts it back at the other, so the backing storage
//! is allocated once and never grows past `limit`.

use std::collections::VecDeque;
use vlist_core::{ListResult, VirtualListError};

/// End of the pool a chunk is inserted at.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PoolEnd {
    Front,
    Back,
}

#[derive(Debug)]
pub struct ElementPool<E> {
    elements: VecDeque<E>,
    limit: usize,
}

impl<E> ElementPool<E> {
    pub fn new(limit: usize) -> Self {
        Self {
            elements: VecDeque::with_capacity(limit),
            limit,
        }
    }

    pub fn len(&self) -> usize {
        self.elements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    pub fn limit(&self) -> usize {
        self.limit
    }

    pub fn spare_capacity(&self) -> usize {
        self.limit.saturating_sub(self.elements.len())
    }

    pub fn get(&self, slot: usize) -> Option<&E> {
        self.elements.get(slot)
    }

    pub fn iter(&self) -> impl Iterator<Item = &E> {
        self.elements.iter()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut E> {
        self.elements.iter_mut()
    }

    /// Add elements after the current tail.
    pub fn append(&mut self, elements: Vec<E>) -> ListResult<()> {
        self.ensure_capacity(elements.len())?;
        self.elements.extend(elements);
        Ok(())
    }

    /// Add elements before the current head, keeping their relative order.
    pub fn prepend(&mut self, elements: Vec<E>) -> ListResult<()> {
        self.ensure_capacity(elements.len())?;
        for element in elements.into_iter().rev() {
            self.elements.push_front(element);
        }
        Ok(())
    }

    /// Remove and return the first `n` elements without dropping them.
    pub fn recycle_front(&mut self, n: usize) -> ListResult<Vec<E>> {
        self.ensure_available(n)?;
        Ok(self.elements.drain(..n).collect())
    }

    /// Remove and return the last `n` elements without dropping them.
    pub fn recycle_back(&mut self, n: usize) -> ListResult<Vec<E>> {
        self.ensure_available(n)?;
        let split = self.elements.len() - n;
        Ok(self.elements.drain(split..).collect())
    }

    /// Reinsert a recycled chunk at `end`, completing a rotation.
    pub fn rotate(&mut self, recycled: Vec<E>, end: PoolEnd) -> ListResult<()> {
        match end {
            PoolEnd::Front => self.prepend(recycled),
            PoolEnd::Back => self.append(recycled),
        }
    }

    /// Drop every element.
    pub fn clear(&mut self) {
        self.elements.clear();
    }

    fn ensure_capacity(&self, requested: usize) -> ListResult<()> {
        let available = self.spare_capacity();
        if requested > available {
            return Err(VirtualListError::CapacityExceeded {
                requested,
                available,
            });
        }
        Ok(())
    }

    fn ensure_available(&self, requested: usize) -> ListResult<()> {
        if requested > self.elements.len() {
            return Err(VirtualListError::InsufficientElements {
                requested,
                len: self.elements.len(),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pool_with(limit: usize, items: &[u32]) -> ElementPool<u32> {
        let mut pool = ElementPool::new(limit);
        pool.append(items.to_vec()).unwrap();
        pool
    }

    fn contents(pool: &ElementPool<u32>) -> Vec<u32> {
        pool.iter().copied().collect()
    }

    #[test]
    fn test_append_within_limit() {
        let pool = pool_with(4, &[1, 2, 3]);
        assert_eq!(pool.len(), 3);
        assert_eq!(pool.spare_capacity(), 1);
    }

    #[test]
    fn test_append_over_limit_leaves_pool_unchanged() {
        let mut pool = pool_with(4, &[1, 2, 3]);
        let result = pool.append(vec![4, 5]);

        assert!(matches!(
            result,
            Err(VirtualListError::CapacityExceeded {
                requested: 2,
                available: 1
            })
        ));
        assert_eq!(contents(&pool), vec![1, 2, 3]);
    }

    #[test]
    fn test_prepend_keeps_order() {
        let mut pool = pool_with(6, &[3, 4]);
        pool.prepend(vec![1, 2]).unwrap();
        assert_eq!(contents(&pool), vec![1, 2, 3, 4]);
    }

    #[test]
    fn test_recycle_front_then_rotate_back() {
        let mut pool = pool_with(4, &[1, 2, 3, 4]);
        let recycled = pool.recycle_front(2).unwrap();
        assert_eq!(recycled, vec![1, 2]);
        assert_eq!(pool.len(), 2);

        pool.rotate(recycled, PoolEnd::Back).unwrap();
        assert_eq!(contents(&pool), vec![3, 4, 1, 2]);
    }

    #[test]
    fn test_recycle_back_then_rotate_front() {
        let mut pool = pool_with(4, &[1, 2, 3, 4]);
        let recycled = pool.recycle_back(2).unwrap();
        assert_eq!(recycled, vec![3, 4]);

        pool.rotate(recycled, PoolEnd::Front).unwrap();
        assert_eq!(contents(&pool), vec![3, 4, 1, 2]);
    }

    #[test]
    fn test_recycle_more_than_held_fails() {
        let mut pool = pool_with(4, &[1]);
        assert!(matches!(
            pool.recycle_front(2),
            Err(VirtualListError::InsufficientElements {
                requested: 2,
                len: 1
            })
        ));
        assert!(pool.recycle_back(2).is_err());
        assert_eq!(contents(&pool), vec![1]);
    }

    #[test]
    fn test_clear() {
        let mut pool = pool_with(4, &[1, 2]);
        pool.clear();
        assert!(pool.is_empty());
        assert_eq!(pool.limit(), 4);
    }
}
