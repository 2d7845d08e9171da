// Copyright (c) Microsoft Corporation.
// Licensed under the MIT license.

//======================================================================================================================
// Imports
//======================================================================================================================

use ::std::{
    fmt,
    ops::Add,
};

//======================================================================================================================
// Structures
//======================================================================================================================

/// Position in a 32-bit sequence space that wraps around. Only addition and the acknowledgement test are defined.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct SeqNumber(u32);

//======================================================================================================================
// Associated Functions
//======================================================================================================================

impl SeqNumber {
    /// Tells whether a segment numbered `self` confirms progress for a receiver expecting `receive_next` next, that is
    /// whether `self` lies at or ahead of `receive_next` in the wrapping sequence space.
    pub fn confirms_progress(self, receive_next: SeqNumber) -> bool {
        self.0.wrapping_sub(receive_next.0) as i32 >= 0
    }
}

//======================================================================================================================
// Trait Implementations
//======================================================================================================================

impl From<u32> for SeqNumber {
    fn from(value: u32) -> Self {
        Self(value)
    }
}

impl From<SeqNumber> for u32 {
    fn from(seq_no: SeqNumber) -> u32 {
        seq_no.0
    }
}

impl fmt::Display for SeqNumber {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl Add for SeqNumber {
    type Output = SeqNumber;

    fn add(self, other: SeqNumber) -> SeqNumber {
        SeqNumber(self.0.wrapping_add(other.0))
    }
}

//======================================================================================================================
// Unit Tests
//======================================================================================================================
