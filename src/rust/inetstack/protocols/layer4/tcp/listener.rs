// Copyright (c) Microsoft Corporation.
// Licensed under the MIT license.

//======================================================================================================================
// Imports
//======================================================================================================================

use crate::{
    inetstack::protocols::{
        layer3::SharedNetworkLayer,
        layer4::tcp::{
            established::ControlBlock,
            header::{
                compute_checksum,
                TcpHeader,
            },
            ConnectionId,
            ConnectionKey,
            SeqNumber,
        },
    },
    runtime::{
        network::config::TcpConfig,
        timer::SharedTimer,
        SharedObject,
        WeakObject,
    },
};
use ::bytes::Bytes;
use ::slab::Slab;
use ::std::{
    collections::HashMap,
    net::{
        Ipv4Addr,
        SocketAddrV4,
    },
    ops::{
        Deref,
        DerefMut,
    },
    time::Instant,
};

//======================================================================================================================
// Structures
//======================================================================================================================

/// Invoked once per accepted connection, after the SYN+ACK has been handed to the network.
pub type AcceptCallback = Box<dyn FnMut(&mut ControlBlock)>;

/// Passive endpoint bound to one local port. Owns every connection accepted on it.
pub struct TcpListener {
    local: SocketAddrV4,
    network: SharedNetworkLayer,
    timer: SharedTimer<ConnectionId>,
    tcp_config: TcpConfig,
    // Connection arena. Retransmission timer events carry the index of the connection they belong to.
    connections: Slab<ControlBlock>,
    addresses: HashMap<ConnectionKey, ConnectionId>,
    accept_callback: Option<AcceptCallback>,
}

#[derive(Clone)]
pub struct SharedTcpListener(SharedObject<TcpListener>);

//======================================================================================================================
// Associated Functions
//======================================================================================================================

impl SharedTcpListener {
    /// Creates a listener for `local` and registers it as the receiver of the network layer. The network only keeps a
    /// weak handle, so dropping the last [SharedTcpListener] tears the listener down.
    pub fn new(
        mut network: SharedNetworkLayer,
        timer: SharedTimer<ConnectionId>,
        local: SocketAddrV4,
        tcp_config: TcpConfig,
    ) -> Self {
        let listener: SharedObject<TcpListener> = SharedObject::new(TcpListener {
            local,
            network: network.clone(),
            timer,
            tcp_config,
            connections: Slab::new(),
            addresses: HashMap::new(),
            accept_callback: None,
        });

        let weak: WeakObject<TcpListener> = listener.downgrade();
        network.register_receiver(Box::new(move |src_ipv4_addr: Ipv4Addr, dst_ipv4_addr: Ipv4Addr, buf: Bytes| {
            match weak.upgrade() {
                Some(listener) => SharedTcpListener(listener).receive(src_ipv4_addr, dst_ipv4_addr, buf),
                None => trace!("receive(): listener is gone, dropping segment"),
            }
        }));

        Self(listener)
    }

    pub fn register_accept_callback(&mut self, callback: AcceptCallback) {
        self.accept_callback = Some(callback);
    }

    /// Processes an inbound segment. Failures never propagate: the segment is dropped and, unless it was simply not
    /// meant for us, logged.
    pub fn receive(&mut self, src_ipv4_addr: Ipv4Addr, dst_ipv4_addr: Ipv4Addr, buf: Bytes) {
        let (header, payload): (TcpHeader, Bytes) = match TcpHeader::parse(&buf) {
            Ok(result) => result,
            Err(e) => {
                warn!("receive(): invalid tcp header ({:?})", e);
                return;
            },
        };

        if header.dst_port != self.local.port() {
            trace!("receive(): not for this listener (dst_port={})", header.dst_port);
            return;
        }

        if self.network.checksum_enforced() && compute_checksum(&buf, &src_ipv4_addr, &dst_ipv4_addr) != 0 {
            warn!(
                "receive(): checksum mismatch (src={}, checksum={:#06x})",
                src_ipv4_addr, header.checksum
            );
            return;
        }

        debug!("TCP received {:?}", header);
        let remote: SocketAddrV4 = SocketAddrV4::new(src_ipv4_addr, header.src_port);
        let local: SocketAddrV4 = SocketAddrV4::new(dst_ipv4_addr, header.dst_port);
        let key: ConnectionKey = ConnectionKey::new(remote, local);

        if header.syn {
            self.accept(key, &header);
            return;
        }

        let id: ConnectionId = match self.addresses.get(&key) {
            Some(id) => *id,
            None => {
                warn!("receive(): segment for unknown connection (remote={:?})", remote);
                return;
            },
        };

        match self.connections.get_mut(id.into()) {
            Some(cb) => cb.receive(&header, payload),
            None => warn!("receive(): connection table out of sync (id={:?})", id),
        }
    }

    /// Moves the clock to `now`, running the retransmission timers that expire on the way.
    pub fn advance_clock(&mut self, now: Instant) {
        while let Some(id) = self.timer.pop_expired(now) {
            match self.connections.get_mut(id.into()) {
                Some(cb) => cb.retransmission_tick(),
                None => warn!("advance_clock(): timer fired for unknown connection (id={:?})", id),
            }
        }
    }

    pub fn get_local(&self) -> SocketAddrV4 {
        self.local
    }

    pub fn num_connections(&self) -> usize {
        self.addresses.len()
    }

    pub fn get_connection(&self, key: &ConnectionKey) -> Option<&ControlBlock> {
        let id: ConnectionId = *self.addresses.get(key)?;
        self.connections.get(id.into())
    }

    pub fn get_connection_mut(&mut self, key: &ConnectionKey) -> Option<&mut ControlBlock> {
        let id: ConnectionId = *self.addresses.get(key)?;
        self.connections.get_mut(id.into())
    }

    /// Establishes a connection in response to a SYN. Both of its sequence numbers start right after the peer's.
    fn accept(&mut self, key: ConnectionKey, header: &TcpHeader) {
        // A new SYN from the same peer replaces whatever connection it had. Dropping it cancels its timer.
        if let Some(id) = self.addresses.remove(&key) {
            if let Some(old) = self.connections.try_remove(id.into()) {
                debug!("accept(): replacing connection {:?}", old);
            }
        }

        let seq_no: SeqNumber = header.seq_num + SeqNumber::from(1);
        let id: ConnectionId = ConnectionId::from(self.connections.vacant_key());
        let cb: ControlBlock = ControlBlock::new(
            id,
            key,
            self.network.clone(),
            self.timer.clone(),
            &self.tcp_config,
            seq_no,
            seq_no,
        );
        let index: usize = self.connections.insert(cb);
        debug_assert_eq!(index, usize::from(id));
        self.addresses.insert(key, id);

        let mut reply: TcpHeader = TcpHeader::new(key.local.port(), key.remote.port());
        reply.syn = true;
        reply.ack = true;
        reply.seq_num = header.seq_num;
        reply.ack_num = seq_no;
        reply.window_size = self.tcp_config.get_window_size();
        debug!("Sending SYN+ACK {:?}", reply);
        let segment: Bytes = reply.serialize(&[], key.local.ip(), key.remote.ip());
        if let Err(e) = self.network.transmit(*key.remote.ip(), segment) {
            warn!("accept(): could not send syn+ack ({:?})", e);
        }

        if let Some(mut callback) = self.accept_callback.take() {
            if let Some(cb) = self.connections.get_mut(id.into()) {
                callback(cb);
            }
            if self.accept_callback.is_none() {
                self.accept_callback = Some(callback);
            }
        }
    }
}

//======================================================================================================================
// Trait Implementations
//======================================================================================================================

impl Deref for SharedTcpListener {
    type Target = TcpListener;

    fn deref(&self) -> &Self::Target {
        self.0.deref()
    }
}

impl DerefMut for SharedTcpListener {
    fn deref_mut(&mut self) -> &mut Self::Target {
        self.0.deref_mut()
    }
}
