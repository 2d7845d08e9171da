// Copyright (c) Microsoft Corporation.
// Licensed under the MIT license.

//======================================================================================================================
// Imports
//======================================================================================================================

use crate::{
    inetstack::protocols::{
        layer3::SharedNetworkLayer,
        layer4::tcp::{
            established::sender::Sender,
            header::TcpHeader,
            ConnectionId,
            ConnectionKey,
            SeqNumber,
        },
    },
    runtime::{
        fail::Fail,
        network::config::TcpConfig,
        timer::SharedTimer,
    },
};
use ::bytes::Bytes;
use ::libc::ENOTCONN;
use ::std::{
    fmt,
    net::SocketAddrV4,
};

//======================================================================================================================
// Structures
//======================================================================================================================

/// Upward callback invoked with every payload delivered in order. An empty payload means the peer sent a FIN.
pub type DataCallback = Box<dyn FnMut(&mut ControlBlock, Bytes)>;

// TCP Connection State.
// There is no SYN-RECEIVED wait: a connection is established as soon as the listener answers the SYN, and closing is
// one-sided, so there is no FIN-WAIT or TIME-WAIT either.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum State {
    Established,
    Closed,
}

/// Transmission control block for a single connection.
pub struct ControlBlock {
    id: ConnectionId,
    key: ConnectionKey,

    // Used for outbound transmission only. The network layer is shared with the listener and every other connection.
    network: SharedNetworkLayer,

    // Advertised in every segment. Never enforced in either direction.
    window_size: u16,

    state: State,

    // Send path: next sequence number, retransmission queue and its timer.
    sender: Sender,

    // Next sequence number we expect from the peer. In RFC 793 terms, this is RCV.NXT. Only an in-order segment moves
    // it forward.
    receive_next: SeqNumber,

    data_callback: Option<DataCallback>,
}

//======================================================================================================================
// Associated Functions
//======================================================================================================================

impl ControlBlock {
    pub fn new(
        id: ConnectionId,
        key: ConnectionKey,
        network: SharedNetworkLayer,
        timer: SharedTimer<ConnectionId>,
        tcp_config: &TcpConfig,
        sender_seq_no: SeqNumber,
        receiver_seq_no: SeqNumber,
    ) -> Self {
        let sender: Sender = Sender::new(
            sender_seq_no,
            tcp_config.get_mss(),
            tcp_config.get_retransmit_timeout(),
            timer,
            id,
        );
        Self {
            id,
            key,
            network,
            window_size: tcp_config.get_window_size(),
            state: State::Established,
            sender,
            receive_next: receiver_seq_no,
            data_callback: None,
        }
    }

    pub fn get_key(&self) -> ConnectionKey {
        self.key
    }

    pub fn get_local(&self) -> SocketAddrV4 {
        self.key.local
    }

    pub fn get_remote(&self) -> SocketAddrV4 {
        self.key.remote
    }

    pub fn get_send_next(&self) -> SeqNumber {
        self.sender.get_send_next()
    }

    pub fn get_receive_next(&self) -> SeqNumber {
        self.receive_next
    }

    pub fn num_outstanding(&self) -> usize {
        self.sender.num_unacked()
    }

    pub fn is_retransmit_armed(&self) -> bool {
        self.sender.is_retransmit_armed()
    }

    pub fn is_closed(&self) -> bool {
        self.state == State::Closed
    }

    /// Installs the callback that receives in-order payloads. Replaces any previous one.
    pub fn register_receiver(&mut self, callback: DataCallback) {
        self.data_callback = Some(callback);
    }

    /// Sends `buf` to the peer, one segment per MSS-sized chunk.
    pub fn send(&mut self, buf: &[u8]) -> Result<(), Fail> {
        if self.state == State::Closed {
            let cause: String = format!("connection is closed (remote={:?})", self.key.remote);
            warn!("send(): {}", cause);
            return Err(Fail::new(ENOTCONN, &cause));
        }

        for chunk in self.sender.segments(buf) {
            self.send_segment(chunk)?;
        }

        Ok(())
    }

    /// Closes our side of the connection. The FIN is sent once and neither retransmitted nor awaited.
    pub fn close(&mut self) -> Result<(), Fail> {
        if self.state == State::Closed {
            trace!("close(): already closed");
            return Ok(());
        }

        self.state = State::Closed;
        self.sender.disarm_retransmit_timer();

        let mut header: TcpHeader = self.tcp_header();
        header.seq_num = self.sender.get_send_next();
        header.fin = true;
        trace!("close(): sending fin (remote={:?})", self.key.remote);
        self.emit(header, &[])
    }

    /// Processes an inbound segment for this connection.
    pub fn receive(&mut self, header: &TcpHeader, payload: Bytes) {
        if self.state == State::Closed {
            trace!("receive(): connection closed, dropping segment");
            return;
        }

        // Any segment at or past RCV.NXT that carries an ACK confirms the oldest outstanding segment.
        if header.ack && header.seq_num.confirms_progress(self.receive_next) {
            if let Some(segment) = self.sender.on_ack() {
                trace!(
                    "receive(): acknowledged {} bytes at {} ({} segments outstanding)",
                    segment.len,
                    segment.seq_no,
                    self.sender.num_unacked()
                );
            }
        }

        if header.seq_num != self.receive_next {
            debug!(
                "receive(): out-of-order segment (seq_num={}, receive_next={})",
                header.seq_num, self.receive_next
            );
            return;
        }

        if header.fin {
            trace!("receive(): received fin");
            self.deliver(Bytes::new());
            return;
        }

        if payload.is_empty() {
            return;
        }

        let consumed: u32 = payload.len() as u32;
        self.receive_next = self.receive_next + SeqNumber::from(consumed);
        self.send_ack();
        self.deliver(payload);
    }

    /// Handles expiry of this connection's retransmission timer.
    pub fn retransmission_tick(&mut self) {
        if self.state == State::Closed {
            return;
        }

        match self.sender.on_retransmit_timeout() {
            Some((seq_num, segment)) => {
                debug!("retransmitting segment (seq_num={}, remote={:?})", seq_num, self.key.remote);
                if let Err(e) = self.transmit(segment) {
                    warn!("retransmission_tick(): could not retransmit ({:?})", e);
                }
            },
            None => trace!("retransmission_tick(): nothing outstanding"),
        }
    }

    /// Fetch a TCP header for the current connection state. Once established we always carry a valid ACK.
    fn tcp_header(&self) -> TcpHeader {
        let mut header: TcpHeader = TcpHeader::new(self.key.local.port(), self.key.remote.port());
        header.window_size = self.window_size;
        header.ack = true;
        header.ack_num = self.receive_next;
        header
    }

    /// Send an ACK to our peer, reflecting our current state.
    fn send_ack(&mut self) {
        let mut header: TcpHeader = self.tcp_header();
        header.seq_num = self.sender.get_send_next();
        if let Err(e) = self.emit(header, &[]) {
            warn!("send_ack(): could not send ack ({:?})", e);
        }
    }

    fn send_segment(&mut self, chunk: &[u8]) -> Result<(), Fail> {
        let mut header: TcpHeader = self.tcp_header();
        header.seq_num = self.sender.get_send_next();
        let segment: Bytes = header.serialize(chunk, self.key.local.ip(), self.key.remote.ip());
        debug!("Sending {} bytes + {:?}", chunk.len(), header);
        self.transmit(segment.clone())?;
        self.sender.on_transmit(segment, chunk.len());
        Ok(())
    }

    fn emit(&mut self, header: TcpHeader, body: &[u8]) -> Result<(), Fail> {
        debug!("Sending {} bytes + {:?}", body.len(), header);
        let segment: Bytes = header.serialize(body, self.key.local.ip(), self.key.remote.ip());
        self.transmit(segment)
    }

    fn transmit(&mut self, segment: Bytes) -> Result<(), Fail> {
        self.network.transmit(*self.key.remote.ip(), segment)
    }

    // The callback is moved out while it runs, so that it can borrow this control block mutably.
    fn deliver(&mut self, payload: Bytes) {
        match self.data_callback.take() {
            Some(mut callback) => {
                callback(self, payload);
                // Keep a replacement registered from inside the callback.
                if self.data_callback.is_none() {
                    self.data_callback = Some(callback);
                }
            },
            None => debug!("deliver(): no receiver registered, dropping {} bytes", payload.len()),
        }
    }
}

//======================================================================================================================
// Trait Implementations
//======================================================================================================================

impl fmt::Debug for ControlBlock {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("ControlBlock")
            .field("id", &self.id)
            .field("key", &self.key)
            .field("state", &self.state)
            .field("sender", &self.sender)
            .field("receive_next", &self.receive_next)
            .finish()
    }
}
