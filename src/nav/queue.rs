//! Min-priority queue with in-place priority updates
//!
//! Backed by a vector kept sorted by descending priority, so the lowest
//! priority sits at the end and pops in O(1). Inserts and updates are O(n),
//! which is fine for the open sets A* builds on a 100x100 grid.

/// Lowest priority pops first; equal priorities pop in insertion order.
#[derive(Debug, Clone)]
pub struct PriorityQueue<T> {
    entries: Vec<(T, f64)>,
}

impl<T> Default for PriorityQueue<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> PriorityQueue<T> {
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            entries: Vec::with_capacity(capacity),
        }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Panics on a NaN priority.
    pub fn push(&mut self, item: T, priority: f64) {
        assert!(!priority.is_nan(), "priority must not be NaN");
        // Ahead of equal priorities so older entries keep popping first
        let index = self.entries.partition_point(|(_, p)| *p > priority);
        self.entries.insert(index, (item, priority));
    }

    /// Remove and return the lowest-priority item
    pub fn pop(&mut self) -> Option<(T, f64)> {
        self.entries.pop()
    }

    pub fn peek(&self) -> Option<(&T, f64)> {
        self.entries.last().map(|(item, p)| (item, *p))
    }

    pub fn iter(&self) -> impl Iterator<Item = (&T, f64)> {
        self.entries.iter().rev().map(|(item, p)| (item, *p))
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

impl<T: PartialEq> PriorityQueue<T> {
    pub fn contains(&self, item: &T) -> bool {
        self.entries.iter().any(|(other, _)| other == item)
    }

    pub fn priority_of(&self, item: &T) -> Option<f64> {
        self.entries
            .iter()
            .find(|(other, _)| other == item)
            .map(|(_, p)| *p)
    }

    /// Move `item` to `priority`; false if it is not queued
    pub fn change_priority(&mut self, item: &T, priority: f64) -> bool {
        let Some(index) = self.entries.iter().position(|(other, _)| other == item) else {
            return false;
        };
        let (item, _) = self.entries.remove(index);
        self.push(item, priority);
        true
    }
}
