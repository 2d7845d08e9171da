// Copyright (c) Microsoft Corporation.
// Licensed under the MIT license.

//======================================================================================================================
// Imports
//======================================================================================================================

use crate::inetstack::{
    protocols::layer4::tcp::{
        ConnectionKey,
        SeqNumber,
        TcpHeader,
    },
    test_helpers::SharedTestNetwork,
};
use ::bytes::Bytes;
use ::std::net::SocketAddrV4;

//======================================================================================================================
// Constants
//======================================================================================================================

const PEER_WINDOW_SIZE: u16 = 0xffff;

//======================================================================================================================
// Structures
//======================================================================================================================

/// Scripted remote endpoint. Builds well-formed segments from `local` to `remote` and injects them into a
/// [SharedTestNetwork]. It keeps no connection state; every sequence number is chosen by the test.
pub struct TestPeer {
    local: SocketAddrV4,
    remote: SocketAddrV4,
}

//======================================================================================================================
// Associate Functions
//======================================================================================================================

impl TestPeer {
    pub fn new(local: SocketAddrV4, remote: SocketAddrV4) -> Self {
        Self { local, remote }
    }

    /// Key under which the listener files the connection with this peer.
    pub fn key(&self) -> ConnectionKey {
        ConnectionKey::new(self.local, self.remote)
    }

    pub fn header(&self) -> TcpHeader {
        let mut header: TcpHeader = TcpHeader::new(self.local.port(), self.remote.port());
        header.window_size = PEER_WINDOW_SIZE;
        header
    }

    pub fn syn(&self, seq_num: SeqNumber) -> Bytes {
        let mut header: TcpHeader = self.header();
        header.syn = true;
        header.seq_num = seq_num;
        self.build(&header, &[])
    }

    pub fn data(&self, seq_num: SeqNumber, ack_num: SeqNumber, payload: &[u8]) -> Bytes {
        let mut header: TcpHeader = self.header();
        header.ack = true;
        header.seq_num = seq_num;
        header.ack_num = ack_num;
        self.build(&header, payload)
    }

    pub fn ack(&self, seq_num: SeqNumber, ack_num: SeqNumber) -> Bytes {
        self.data(seq_num, ack_num, &[])
    }

    pub fn fin(&self, seq_num: SeqNumber, ack_num: SeqNumber) -> Bytes {
        let mut header: TcpHeader = self.header();
        header.ack = true;
        header.fin = true;
        header.seq_num = seq_num;
        header.ack_num = ack_num;
        self.build(&header, &[])
    }

    /// Serializes `header` and `payload` with a valid checksum for this peer's address pair.
    pub fn build(&self, header: &TcpHeader, payload: &[u8]) -> Bytes {
        header.serialize(payload, self.local.ip(), self.remote.ip())
    }

    /// Injects `segment` into `network` and delivers it.
    pub fn deliver(&self, network: &mut SharedTestNetwork, segment: Bytes) {
        network.push_segment(*self.local.ip(), *self.remote.ip(), segment);
        network.poll();
    }
}
