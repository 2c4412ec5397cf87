//! Label ordering.
//!
//! Positions are dense and 1-based per user. Moving a label shifts the
//! labels between its old and new slot by one; deleting closes the gap.

use std::ops::RangeInclusive;

/// Where a label moves and which of its siblings shift to make room.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MovePlan {
    pub from: i32,
    pub to: i32,
}

impl MovePlan {
    /// Plan a move of the label at `current` to just after the label at
    /// `after`, or to the top when `after` is `None`.
    pub fn new(current: i32, after: Option<i32>) -> Self {
        let to = match after {
            None => 1,
            Some(after) if after < current => after + 1,
            Some(after) if after > current => after,
            Some(_) => current,
        };
        Self { from: current, to }
    }

    pub fn is_noop(&self) -> bool {
        self.from == self.to
    }

    /// Positions of the other labels that shift, and by how much.
    pub fn shift(&self) -> Option<(RangeInclusive<i32>, i32)> {
        if self.to < self.from {
            Some((self.to..=self.from - 1, 1))
        } else if self.to > self.from {
            Some((self.from + 1..=self.to, -1))
        } else {
            None
        }
    }

    /// New position of a label currently at `position`.
    pub fn apply(&self, position: i32) -> i32 {
        if position == self.from {
            return self.to;
        }
        match self.shift() {
            Some((range, delta)) if range.contains(&position) => position + delta,
            _ => position,
        }
    }
}

/// New position of a label at `position` after the label at `deleted` is removed.
pub fn close_gap(deleted: i32, position: i32) -> i32 {
    if position > deleted {
        position - 1
    } else {
        position
    }
}
