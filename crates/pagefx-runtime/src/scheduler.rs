#![forbid(unsafe_code)]

//! Host-driven timer and animation-frame scheduler.
//!
//! The scheduler stores typed tasks instead of closures. The host owns the
//! clock: it calls [`Scheduler::pop_due`] with the current page time to drain
//! expired timers, and [`Scheduler::take_frame_tasks`] once per rendered frame.
//!
//! # Invariants
//!
//! 1. Timers fire in `(deadline, scheduling order)` order.
//! 2. Nothing fires inside `schedule_after`; a zero delay fires on the next
//!    `pop_due`.
//! 3. A cancelled timer never fires; cancelling twice (or after firing)
//!    returns `false`.
//! 4. Frame tasks requested while a frame is being processed run on the next
//!    frame, never the current one.
//! 5. `clear()` drops every pending timer and frame task.

use std::cmp::Ordering;
use std::collections::BinaryHeap;
use std::time::Duration;

use ahash::AHashSet;

/// Handle of a scheduled timer.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TimerId(u64);

/// Handle of a requested animation frame callback.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FrameId(u64);

/// A timer that reached its deadline.
#[derive(Clone, Debug, PartialEq)]
pub struct Due<T> {
    pub id: TimerId,
    pub deadline: Duration,
    pub task: T,
}

struct TimerEntry<T> {
    deadline: Duration,
    seq: u64,
    id: TimerId,
    task: T,
}

impl<T> PartialEq for TimerEntry<T> {
    fn eq(&self, other: &Self) -> bool {
        self.deadline == other.deadline && self.seq == other.seq
    }
}

impl<T> Eq for TimerEntry<T> {}

impl<T> PartialOrd for TimerEntry<T> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl<T> Ord for TimerEntry<T> {
    // Reversed so the max-heap pops the earliest deadline first.
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .deadline
            .cmp(&self.deadline)
            .then_with(|| other.seq.cmp(&self.seq))
    }
}

/// Timer queue plus per-frame task list.
pub struct Scheduler<T> {
    timers: BinaryHeap<TimerEntry<T>>,
    live: AHashSet<TimerId>,
    frames: Vec<(FrameId, T)>,
    next_seq: u64,
    next_frame: u64,
}

impl<T> std::fmt::Debug for Scheduler<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Scheduler")
            .field("pending_timers", &self.live.len())
            .field("pending_frames", &self.frames.len())
            .field("next_deadline", &self.next_deadline())
            .finish()
    }
}

impl<T> Default for Scheduler<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Scheduler<T> {
    #[must_use]
    pub fn new() -> Self {
        Self {
            timers: BinaryHeap::new(),
            live: AHashSet::new(),
            frames: Vec::new(),
            next_seq: 0,
            next_frame: 0,
        }
    }

    // ── Timers ───────────────────────────────────────────────────────

    /// Run `task` once, `delay` after `now`.
    pub fn schedule_after(&mut self, now: Duration, delay: Duration, task: T) -> TimerId {
        let seq = self.next_seq;
        self.next_seq += 1;
        let id = TimerId(seq);
        self.timers.push(TimerEntry {
            deadline: now.saturating_add(delay),
            seq,
            id,
            task,
        });
        self.live.insert(id);
        id
    }

    /// Cancel a pending timer. Returns `true` if it was still pending.
    pub fn cancel(&mut self, id: TimerId) -> bool {
        self.live.remove(&id)
    }

    #[must_use]
    pub fn is_pending(&self, id: TimerId) -> bool {
        self.live.contains(&id)
    }

    /// Number of timers that will still fire.
    #[must_use]
    pub fn pending_timers(&self) -> usize {
        self.live.len()
    }

    /// Earliest deadline among live timers.
    #[must_use]
    pub fn next_deadline(&self) -> Option<Duration> {
        // Cancelled entries stay in the heap until popped; scan past them.
        self.timers
            .iter()
            .filter(|e| self.live.contains(&e.id))
            .map(|e| e.deadline)
            .min()
    }

    /// Pop the earliest timer whose deadline is at or before `now`.
    pub fn pop_due(&mut self, now: Duration) -> Option<Due<T>> {
        loop {
            let head = self.timers.peek()?;
            if !self.live.contains(&head.id) {
                self.timers.pop();
                continue;
            }
            if head.deadline > now {
                return None;
            }
            let entry = self.timers.pop()?;
            self.live.remove(&entry.id);
            return Some(Due {
                id: entry.id,
                deadline: entry.deadline,
                task: entry.task,
            });
        }
    }

    // ── Animation frames ─────────────────────────────────────────────

    /// Run `task` on the next animation frame.
    pub fn request_frame(&mut self, task: T) -> FrameId {
        let id = FrameId(self.next_frame);
        self.next_frame += 1;
        self.frames.push((id, task));
        id
    }

    /// Whether any frame task is waiting.
    #[must_use]
    pub fn wants_frame(&self) -> bool {
        !self.frames.is_empty()
    }

    /// Take the tasks for the frame being rendered now.
    pub fn take_frame_tasks(&mut self) -> Vec<T> {
        std::mem::take(&mut self.frames)
            .into_iter()
            .map(|(_, task)| task)
            .collect()
    }

    // ── Teardown ─────────────────────────────────────────────────────

    /// Drop every pending timer and frame task.
    pub fn clear(&mut self) {
        self.timers.clear();
        self.live.clear();
        self.frames.clear();
    }
}
