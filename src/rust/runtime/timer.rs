// Copyright (c) Microsoft Corporation.
// Licensed under the MIT license.

//==============================================================================
// Imports
//==============================================================================

use crate::runtime::SharedObject;
use ::core::cmp::Reverse;
use ::std::{
    collections::{
        BinaryHeap,
        HashSet,
    },
    ops::{
        Deref,
        DerefMut,
    },
    time::{
        Duration,
        Instant,
    },
};

//==============================================================================
// Structures
//==============================================================================

/// Identifies a single armed timer entry.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub struct TimerHandle(u64);

struct TimerQueueEntry<T> {
    expiry: Instant,
    handle: TimerHandle,
    event: T,
}

/// Timer that holds one or more events for future firing. Time only moves forward when the owner advances the clock,
/// which makes the whole event loop deterministic.
pub struct Timer<T> {
    now: Instant,
    next_handle: u64,
    // Use a reverse to get a min heap.
    heap: BinaryHeap<Reverse<TimerQueueEntry<T>>>,
    // Entries that have been scheduled and neither fired nor cancelled.
    armed: HashSet<TimerHandle>,
}

pub struct SharedTimer<T>(SharedObject<Timer<T>>);

//==============================================================================
// Associate Functions
//==============================================================================

impl<T> SharedTimer<T> {
    pub fn new(now: Instant) -> Self {
        Self(SharedObject::<Timer<T>>::new(Timer {
            now,
            next_handle: 0,
            heap: BinaryHeap::new(),
            armed: HashSet::new(),
        }))
    }

    pub fn now(&self) -> Instant {
        self.now
    }

    /// Arms a timer that fires `event` once `delay` has elapsed from the current clock.
    pub fn schedule(&mut self, delay: Duration, event: T) -> TimerHandle {
        let expiry: Instant = self.now + delay;
        self.schedule_at(expiry, event)
    }

    /// Arms a timer that fires `event` at `expiry`.
    pub fn schedule_at(&mut self, expiry: Instant, event: T) -> TimerHandle {
        let handle: TimerHandle = TimerHandle(self.next_handle);
        self.next_handle += 1;
        self.heap.push(Reverse(TimerQueueEntry { expiry, handle, event }));
        self.armed.insert(handle);
        handle
    }

    /// Disarms the timer identified by `handle`. Returns false if it already fired or was cancelled.
    pub fn cancel(&mut self, handle: TimerHandle) -> bool {
        self.armed.remove(&handle)
    }

    pub fn is_armed(&self, handle: TimerHandle) -> bool {
        self.armed.contains(&handle)
    }

    pub fn num_armed(&self) -> usize {
        self.armed.len()
    }

    /// Pops the next event whose expiry is not later than `now`. The clock is moved to the expiry of the returned
    /// event, so timers armed while handling it are relative to the instant it fired. Once no expired event remains
    /// the clock is moved to `now` and `None` is returned. A `now` earlier than the clock is ignored.
    pub fn pop_expired(&mut self, now: Instant) -> Option<T> {
        if now < self.now {
            warn!("pop_expired(): clock cannot move backwards (now={:?}, requested={:?})", self.now, now);
            return None;
        }

        while let Some(Reverse(entry)) = self.heap.peek() {
            if now < entry.expiry {
                break;
            }
            let entry: TimerQueueEntry<T> = self
                .heap
                .pop()
                .expect("should have an entry because we were able to peek")
                .0;
            // Cancelled entries are discarded lazily.
            if !self.armed.remove(&entry.handle) {
                continue;
            }
            if self.now < entry.expiry {
                self.now = entry.expiry;
            }
            return Some(entry.event);
        }

        self.now = now;
        None
    }
}

//==============================================================================
// Trait Implementations
//==============================================================================

impl<T> Clone for SharedTimer<T> {
    fn clone(&self) -> Self {
        Self(self.0.clone())
    }
}

impl<T> Default for SharedTimer<T> {
    fn default() -> Self {
        Self::new(Instant::now())
    }
}

impl<T> Deref for SharedTimer<T> {
    type Target = Timer<T>;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl<T> DerefMut for SharedTimer<T> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        self.0.deref_mut()
    }
}

impl<T> PartialEq for TimerQueueEntry<T> {
    fn eq(&self, other: &TimerQueueEntry<T>) -> bool {
        self.expiry == other.expiry && self.handle == other.handle
    }
}

impl<T> Eq for TimerQueueEntry<T> {}

impl<T> PartialOrd for TimerQueueEntry<T> {
    fn partial_cmp(&self, other: &TimerQueueEntry<T>) -> Option<core::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl<T> Ord for TimerQueueEntry<T> {
    // Entries with the same expiry fire in the order they were armed.
    fn cmp(&self, other: &TimerQueueEntry<T>) -> core::cmp::Ordering {
        self.expiry
            .cmp(&other.expiry)
            .then_with(|| self.handle.0.cmp(&other.handle.0))
    }
}

//==============================================================================
// Unit Tests
//==============================================================================
