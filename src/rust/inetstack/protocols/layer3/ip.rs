// Copyright (c) Microsoft Corporation.
// Licensed under the MIT license.

//======================================================================================================================
// Structures
//======================================================================================================================

/// IP protocol numbers carried in the pseudo-header of transport checksums.
#[repr(u8)]
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum IpProtocol {
    /// Transmission Control Protocol
    TCP = 0x06,
}
