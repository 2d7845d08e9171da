// Copyright (c) Microsoft Corporation.
// Licensed under the MIT license.

//======================================================================================================================
// Exports
//======================================================================================================================

pub mod ip;

pub use self::ip::IpProtocol;

//======================================================================================================================
// Imports
//======================================================================================================================

use crate::runtime::{
    fail::Fail,
    SharedBox,
};
use ::bytes::Bytes;
use ::std::net::Ipv4Addr;

//======================================================================================================================
// Structures
//======================================================================================================================

/// Upward callback invoked by the network layer for every arriving datagram, with the source address, the destination
/// address and the raw transport segment.
pub type SegmentReceiver = Box<dyn FnMut(Ipv4Addr, Ipv4Addr, Bytes)>;

/// Shared handle to the network layer, held by the listener and by every connection for outbound transmission.
pub type SharedNetworkLayer = SharedBox<dyn NetworkLayer>;

//======================================================================================================================
// Traits
//======================================================================================================================

/// Unreliable, already-addressed datagram service the transport runs on top of.
pub trait NetworkLayer {
    /// Hands a raw transport segment to the network for delivery to `dst`. Delivery is not guaranteed.
    fn transmit(&mut self, dst: Ipv4Addr, segment: Bytes) -> Result<(), Fail>;

    /// Registers the callback that receives inbound segments.
    fn register_receiver(&mut self, receiver: SegmentReceiver);

    /// Whether inbound checksums must be validated. Test harnesses turn this off to inject hand-crafted segments.
    fn checksum_enforced(&self) -> bool;
}
