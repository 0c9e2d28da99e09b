//! Frame-by-frame replay position that outlives any borrow of the trajectory.
//!
//! A UI keeps the cursor between frames and hands it the trajectory on each
//! tick; pausing is simply not calling [`ReplayCursor::advance`].

use crate::{Trajectory, TrajectorySample};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ReplayCursor {
    next: usize,
}

impl ReplayCursor {
    pub const fn new() -> Self {
        Self { next: 0 }
    }

    /// Index of the sample the next `advance` returns.
    pub fn position(&self) -> usize {
        self.next
    }

    pub fn seek(&mut self, index: usize) {
        self.next = index;
    }

    pub fn rewind(&mut self) {
        self.next = 0;
    }

    pub fn is_finished(&self, trajectory: &Trajectory) -> bool {
        self.next >= trajectory.len()
    }

    /// Emit the current sample and step forward; `None` once past the end.
    pub fn advance(&mut self, trajectory: &Trajectory) -> Option<TrajectorySample> {
        let sample = trajectory.sample(self.next)?;
        self.next += 1;
        Some(sample)
    }
}
