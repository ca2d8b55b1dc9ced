//! Fixed-capacity sliding buffer of recent observations.

use std::collections::VecDeque;

/// FIFO buffer that keeps the most recent `capacity` values.
///
/// Pushing onto a full buffer evicts the oldest value, so the length never
/// exceeds the capacity.
#[derive(Debug, Clone, PartialEq)]
pub struct SequenceBuffer {
    values: VecDeque<f64>,
    capacity: usize,
}

impl SequenceBuffer {
    pub fn new(capacity: usize) -> Self {
        Self {
            values: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    /// Build a buffer holding the trailing `capacity` values of `values`.
    pub fn from_values(capacity: usize, values: &[f64]) -> Self {
        let mut buffer = Self::new(capacity);
        let start = values.len().saturating_sub(capacity);
        buffer.values.extend(&values[start..]);
        buffer
    }

    /// Append a value, evicting the oldest one when full.
    pub fn push(&mut self, value: f64) {
        if self.capacity == 0 {
            return;
        }
        if self.values.len() == self.capacity {
            self.values.pop_front();
        }
        self.values.push_back(value);
    }

    /// Snapshot of the current contents, oldest first.
    pub fn window(&self) -> Vec<f64> {
        self.values.iter().copied().collect()
    }

    /// The most recent `n` values, oldest first.
    pub fn tail(&self, n: usize) -> Vec<f64> {
        let start = self.values.len().saturating_sub(n);
        self.values.range(start..).copied().collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = &f64> {
        self.values.iter()
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn is_full(&self) -> bool {
        self.values.len() == self.capacity
    }

    /// Remove every value; the capacity is unchanged.
    pub fn clear(&mut self) {
        self.values.clear();
    }
}
