// Copyright (c) Microsoft Corporation.
// Licensed under the MIT license.

//======================================================================================================================
// Imports
//======================================================================================================================

use crate::{
    inetstack::protocols::layer4::tcp::{
        ConnectionId,
        SeqNumber,
    },
    runtime::timer::{
        SharedTimer,
        TimerHandle,
    },
};
use ::bytes::Bytes;
use ::std::{
    collections::VecDeque,
    fmt,
    slice::Chunks,
    time::Duration,
};

//======================================================================================================================
// Constants
//======================================================================================================================

// Minimum size for unacknowledged queue. This number doesn't really matter very much, it just sets the initial size
// of the unacked queue, below which memory allocation is not required.
const MIN_UNACKED_QUEUE_SIZE_FRAMES: usize = 64;

//======================================================================================================================
// Structures
//======================================================================================================================

/// A segment that was transmitted and awaits acknowledgement. The encoded bytes are kept so that retransmissions are
/// identical to the original transmission.
pub struct UnackedSegment {
    pub seq_no: SeqNumber,
    pub len: usize,
    pub bytes: Bytes,
}

pub struct Sender {
    //
    // Send Sequence Space:
    //
    //            oldest unacked segment                     send_next
    //                     v                                     v
    // ... ----------------|-------------------------------------|------------------------------------------
    //       acknowledged  |  unacknowledged (retransmit queue)  |  future sequence number space
    //
    // Note: There is no send window. We may run arbitrarily far ahead of the peer's acknowledgements.
    //

    // Sequence Number of the next data to be sent.  In RFC 793 terms, this is SND.NXT.
    send_next: SeqNumber,

    // Queue of unacknowledged sent segments, in transmission order.  RFC 793 calls this the "retransmission queue".
    unacked_queue: VecDeque<UnackedSegment>,

    // Maximum Segment Size for this connection.
    mss: usize,

    // Fixed interval between retransmissions of the oldest unacknowledged segment.
    retransmit_timeout: Duration,

    // Shared event loop timer and the event we arm it with.
    timer: SharedTimer<ConnectionId>,
    id: ConnectionId,

    // The armed retransmission timer, if any. Never more than one per connection.
    retransmit_timer: Option<TimerHandle>,
}

//======================================================================================================================
// Associated Functions
//======================================================================================================================

impl Sender {
    pub fn new(
        seq_no: SeqNumber,
        mss: usize,
        retransmit_timeout: Duration,
        timer: SharedTimer<ConnectionId>,
        id: ConnectionId,
    ) -> Self {
        Self {
            send_next: seq_no,
            unacked_queue: VecDeque::with_capacity(MIN_UNACKED_QUEUE_SIZE_FRAMES),
            mss,
            retransmit_timeout,
            timer,
            id,
            retransmit_timer: None,
        }
    }

    pub fn get_send_next(&self) -> SeqNumber {
        self.send_next
    }

    pub fn num_unacked(&self) -> usize {
        self.unacked_queue.len()
    }

    pub fn is_retransmit_armed(&self) -> bool {
        match self.retransmit_timer {
            Some(handle) => self.timer.is_armed(handle),
            None => false,
        }
    }

    /// Splits `buf` into MSS-sized chunks, in sequence order.
    pub fn segments<'a>(&self, buf: &'a [u8]) -> Chunks<'a, u8> {
        buf.chunks(self.mss)
    }

    /// Records a segment that was just handed to the network. Advances SND.NXT by its payload length and arms the
    /// retransmission timer if none is armed.
    pub fn on_transmit(&mut self, bytes: Bytes, len: usize) {
        debug_assert!(len <= self.mss);
        let seq_no: SeqNumber = self.send_next;
        self.send_next = self.send_next + SeqNumber::from(len as u32);
        self.unacked_queue.push_back(UnackedSegment { seq_no, len, bytes });

        if self.retransmit_timer.is_none() {
            self.arm_retransmit_timer();
        }
    }

    /// Retires the oldest unacknowledged segment. The timer is restarted for the new oldest segment, if there is one.
    /// Returns the retired segment, or `None` if nothing was outstanding.
    pub fn on_ack(&mut self) -> Option<UnackedSegment> {
        let segment: UnackedSegment = self.unacked_queue.pop_front()?;
        self.disarm_retransmit_timer();
        if !self.unacked_queue.is_empty() {
            self.arm_retransmit_timer();
        }
        Some(segment)
    }

    /// Handles expiry of the retransmission timer. Returns the oldest unacknowledged segment, unchanged, and re-arms
    /// the timer for another full interval.
    pub fn on_retransmit_timeout(&mut self) -> Option<(SeqNumber, Bytes)> {
        // The timer that fired is no longer armed.
        self.retransmit_timer = None;
        let segment: &UnackedSegment = self.unacked_queue.front()?;
        let retransmission: (SeqNumber, Bytes) = (segment.seq_no, segment.bytes.clone());
        self.arm_retransmit_timer();
        Some(retransmission)
    }

    /// Cancels the retransmission timer, if armed.
    pub fn disarm_retransmit_timer(&mut self) {
        if let Some(handle) = self.retransmit_timer.take() {
            self.timer.cancel(handle);
        }
    }

    fn arm_retransmit_timer(&mut self) {
        // Never leave two timers armed for the same connection.
        self.disarm_retransmit_timer();
        let handle: TimerHandle = self.timer.schedule(self.retransmit_timeout, self.id);
        self.retransmit_timer = Some(handle);
    }
}

//======================================================================================================================
// Trait Implementations
//======================================================================================================================

/// A replaced or dropped connection must not leave its timer behind.
impl Drop for Sender {
    fn drop(&mut self) {
        self.disarm_retransmit_timer();
    }
}

impl fmt::Debug for Sender {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("Sender")
            .field("send_next", &self.send_next)
            .field("unacked", &self.unacked_queue.len())
            .field("mss", &self.mss)
            .field("retransmit_timer", &self.retransmit_timer)
            .finish()
    }
}

//======================================================================================================================
// Unit Tests
//======================================================================================================================
