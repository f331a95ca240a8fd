use std::collections::VecDeque;

/// Fixed-width FIFO remembering the last `width` values pushed. Storage
/// grows with the values actually pushed, not with `width`.
#[derive(Debug, Clone)]
pub struct RingWindow<T> {
    values: VecDeque<T>,
    width: usize,
}

impl<T> RingWindow<T> {
    pub fn with_width(width: usize) -> Self {
        let width = width.max(1);
        Self {
            values: VecDeque::new(),
            width,
        }
    }

    /// Pushes `value`; once the window is full, returns the value leaving it.
    pub fn push(&mut self, value: T) -> Option<T> {
        let leaving = if self.is_full() {
            self.values.pop_front()
        } else {
            None
        };
        self.values.push_back(value);
        leaving
    }

    pub fn is_full(&self) -> bool {
        self.values.len() >= self.width
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn width(&self) -> usize {
        self.width
    }
}
