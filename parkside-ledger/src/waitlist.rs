use crate::models::User;
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;

/// FIFO queue of users deferred due to capacity exhaustion.
///
/// Insertion order is the only ordering key. A single queue serves all
/// demand regardless of the slot type eventually offered.
#[derive(Debug, Default, Clone, Serialize, Deserialize)]
pub struct Waitlist {
    queue: VecDeque<User>,
}

impl Waitlist {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn enqueue(&mut self, user: User) {
        self.queue.push_back(user);
    }

    pub fn dequeue(&mut self) -> Option<User> {
        self.queue.pop_front()
    }

    pub fn peek(&self) -> Option<&User> {
        self.queue.front()
    }

    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }

    pub fn len(&self) -> usize {
        self.queue.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &User> {
        self.queue.iter()
    }
}
