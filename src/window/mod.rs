//! # Rolling Window
//!
//! A fixed-capacity ring buffer of recent samples. Once full, each push overwrites the
//! slot under the write cursor and advances it modulo the capacity; nothing is shifted.
//! [`RollingWindow::items`] therefore returns buffer order, not age order, which is all a
//! mean or max over the window needs.
//!
//! ```rust
//! use sensor_poller::window::RollingWindow;
//!
//! let window = RollingWindow::new(3);
//! for v in 1..=4 {
//!     window.push(v);
//! }
//! assert_eq!(window.items(), vec![4, 2, 3]);
//! ```
//!
//! The window owns its own lock. Pushes from the polling task and reads from elsewhere
//! are serialized on it, and `items` hands back a copy so callers never hold the lock
//! while iterating.
use std::time::Duration;

use parking_lot::Mutex;

struct Ring<T> {
    items: Vec<T>,
    cursor: usize,
}

/// Fixed-capacity, overwrite-on-full sample buffer
pub struct RollingWindow<T> {
    ring: Mutex<Ring<T>>,
    capacity: usize,
}

impl<T: Clone> RollingWindow<T> {
    /// Creates an empty window; a capacity of zero is raised to one
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self { ring: Mutex::new(Ring { items: Vec::with_capacity(capacity), cursor: 0 }), capacity }
    }

    /// Creates a window spanning about one second at the given polling interval
    pub fn for_interval(interval: Duration) -> Self {
        Self::new(capacity_for_interval(interval))
    }

    pub fn push(&self, item: T) {
        let mut ring = self.ring.lock();
        if ring.items.len() < self.capacity {
            ring.items.push(item);
        } else {
            let cursor = ring.cursor;
            ring.items[cursor] = item;
            ring.cursor = (cursor + 1) % self.capacity;
        }
    }

    /// Copy of the current contents in buffer order
    pub fn items(&self) -> Vec<T> {
        self.ring.lock().items.clone()
    }

    pub fn len(&self) -> usize {
        self.ring.lock().items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ring.lock().items.is_empty()
    }

    pub fn is_full(&self) -> bool {
        self.len() == self.capacity
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn clear(&self) {
        let mut ring = self.ring.lock();
        ring.items.clear();
        ring.cursor = 0;
    }
}

/// `max(1, round(1 / interval_seconds))`
pub fn capacity_for_interval(interval: Duration) -> usize {
    let secs = interval.as_secs_f64();
    if secs <= 0.0 {
        return 1;
    }
    ((1.0 / secs).round() as usize).max(1)
}
