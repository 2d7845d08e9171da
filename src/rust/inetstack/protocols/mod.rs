// Copyright (c) Microsoft Corporation.
// Licensed under the MIT license.

//======================================================================================================================
// Exports
//======================================================================================================================

pub mod layer3;
pub mod layer4;

//======================================================================================================================
// Imports
//======================================================================================================================

use ::std::slice::ChunksExact;

//======================================================================================================================
// Standalone Functions
//======================================================================================================================

/// Computes the generic checksum of a bytes array.
///
/// This iterates all 16-bit array elements, summing
/// the values into a 32-bit variable. This functions
/// paddies with zero an octet at the end (if necessary)
/// to turn into a 16-bit element. Also, this may use
/// an initial value depending on the parameter `"start"`.
pub fn compute_generic_checksum(buf: &[u8], start: Option<u32>) -> u32 {
    let mut state: u32 = start.unwrap_or(0);

    let mut chunks_iter: ChunksExact<u8> = buf.chunks_exact(2);
    for chunk in chunks_iter.by_ref() {
        state += u16::from_be_bytes([chunk[0], chunk[1]]) as u32;
    }

    if let Some(&b) = chunks_iter.remainder().first() {
        state += u16::from_be_bytes([b, 0]) as u32;
    }

    state
}

/// Folds 32-bit sum into 16-bit checksum value.
pub fn fold16(mut state: u32) -> u16 {
    while state > 0xFFFF {
        state = (state & 0xFFFF) + (state >> 16);
    }
    !state as u16
}

//======================================================================================================================
// Unit Tests
//======================================================================================================================
