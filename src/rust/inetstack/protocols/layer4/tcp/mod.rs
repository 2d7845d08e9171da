// Copyright (c) Microsoft Corporation.
// Licensed under the MIT license.

//======================================================================================================================
// Exports
//======================================================================================================================

mod established;
pub mod header;
pub mod listener;
mod sequence_number;

#[cfg(test)]
mod tests;

pub use self::{
    established::{
        ControlBlock,
        DataCallback,
    },
    header::{
        compute_checksum,
        fix_checksum,
        TcpHeader,
    },
    listener::{
        AcceptCallback,
        SharedTcpListener,
        TcpListener,
    },
    sequence_number::SeqNumber,
};

//======================================================================================================================
// Imports
//======================================================================================================================

use ::std::net::SocketAddrV4;

//======================================================================================================================
// Structures
//======================================================================================================================

/// Identifies a connection: the remote endpoint it talks to and the local endpoint it was accepted on.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub struct ConnectionKey {
    pub remote: SocketAddrV4,
    pub local: SocketAddrV4,
}

/// Index of a connection in the listener's arena. Also the payload of its retransmission timer events.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub struct ConnectionId(usize);

//======================================================================================================================
// Associated Functions
//======================================================================================================================

impl ConnectionKey {
    pub fn new(remote: SocketAddrV4, local: SocketAddrV4) -> Self {
        Self { remote, local }
    }
}

impl From<ConnectionId> for usize {
    fn from(id: ConnectionId) -> usize {
        id.0
    }
}

impl From<usize> for ConnectionId {
    fn from(index: usize) -> Self {
        ConnectionId(index)
    }
}
