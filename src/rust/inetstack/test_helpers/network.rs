// Copyright (c) Microsoft Corporation.
// Licensed under the MIT license.

//======================================================================================================================
// Imports
//======================================================================================================================

use crate::{
    inetstack::protocols::layer3::{
        NetworkLayer,
        SegmentReceiver,
        SharedNetworkLayer,
    },
    runtime::{
        fail::Fail,
        logging,
        SharedBox,
        SharedObject,
    },
};
use ::bytes::Bytes;
use ::rand::{
    rngs::SmallRng,
    Rng,
    SeedableRng,
};
use ::std::{
    collections::VecDeque,
    net::Ipv4Addr,
    ops::{
        Deref,
        DerefMut,
    },
};

//======================================================================================================================
// Constants
//======================================================================================================================

const DEFAULT_RNG_SEED: u64 = 0x5eed;

//======================================================================================================================
// Structures
//======================================================================================================================

/// A segment queued for delivery to the host: source address, destination address and raw bytes.
pub type InboundSegment = (Ipv4Addr, Ipv4Addr, Bytes);

/// A segment the host transmitted: destination address and raw bytes.
pub type OutboundSegment = (Ipv4Addr, Bytes);

/// In-memory network for a single host. Inbound segments are queued by the test and delivered on [poll]; outbound
/// segments are captured for inspection, unless the loss model drops them.
pub struct TestNetwork {
    local_ipv4_addr: Ipv4Addr,
    incoming: VecDeque<InboundSegment>,
    outgoing: VecDeque<OutboundSegment>,
    receiver: Option<SegmentReceiver>,
    checksum_enforced: bool,
    loss_rate: f64,
    rng: SmallRng,
    num_dropped: usize,
}

#[derive(Clone)]
pub struct SharedTestNetwork(SharedObject<TestNetwork>);

//======================================================================================================================
// Associate Functions
//======================================================================================================================

impl SharedTestNetwork {
    pub fn new_test(local_ipv4_addr: Ipv4Addr) -> Self {
        logging::initialize();
        Self(SharedObject::<TestNetwork>::new(TestNetwork {
            local_ipv4_addr,
            incoming: VecDeque::new(),
            outgoing: VecDeque::new(),
            receiver: None,
            checksum_enforced: true,
            loss_rate: 0.0,
            rng: SmallRng::seed_from_u64(DEFAULT_RNG_SEED),
            num_dropped: 0,
        }))
    }

    /// Wraps this network into the handle the transport layer expects.
    pub fn as_network_layer(&self) -> SharedNetworkLayer {
        SharedBox::new(Box::new(self.clone()))
    }

    pub fn set_checksum_enforced(&mut self, enforced: bool) {
        self.checksum_enforced = enforced;
    }

    /// Drops each outbound segment with probability `loss_rate`, drawing from a generator seeded with `seed`.
    pub fn set_loss(&mut self, loss_rate: f64, seed: u64) {
        assert!((0.0..=1.0).contains(&loss_rate));
        self.loss_rate = loss_rate;
        self.rng = SmallRng::seed_from_u64(seed);
    }

    pub fn num_dropped(&self) -> usize {
        self.num_dropped
    }

    pub fn push_segment(&mut self, src_ipv4_addr: Ipv4Addr, dst_ipv4_addr: Ipv4Addr, segment: Bytes) {
        self.incoming.push_back((src_ipv4_addr, dst_ipv4_addr, segment));
    }

    /// Delivers every queued inbound segment to the registered receiver. Returns how many were delivered.
    pub fn poll(&mut self) -> usize {
        let mut delivered: usize = 0;
        while let Some((src_ipv4_addr, dst_ipv4_addr, segment)) = self.incoming.pop_front() {
            // The receiver is moved out while it runs, since it may transmit through this network.
            let mut receiver: SegmentReceiver = match self.receiver.take() {
                Some(receiver) => receiver,
                None => {
                    warn!("poll(): no receiver registered, dropping segment");
                    continue;
                },
            };
            receiver(src_ipv4_addr, dst_ipv4_addr, segment);
            if self.receiver.is_none() {
                self.receiver = Some(receiver);
            }
            delivered += 1;
        }
        delivered
    }

    pub fn num_outgoing(&self) -> usize {
        self.outgoing.len()
    }

    /// Removes the oldest transmitted segment. The queue should not be empty.
    pub fn pop_segment(&mut self) -> OutboundSegment {
        self.outgoing.pop_front().expect("should be at least one segment")
    }

    pub fn pop_all_segments(&mut self) -> VecDeque<OutboundSegment> {
        self.outgoing.split_off(0)
    }
}

//======================================================================================================================
// Trait Implementations
//======================================================================================================================

impl NetworkLayer for SharedTestNetwork {
    fn transmit(&mut self, dst: Ipv4Addr, segment: Bytes) -> Result<(), Fail> {
        // Segments must fit in a single datagram.
        assert!(segment.len() < u16::MAX as usize);

        if self.loss_rate > 0.0 {
            let loss_rate: f64 = self.loss_rate;
            if self.rng.gen_bool(loss_rate) {
                self.num_dropped += 1;
                debug!(
                    "transmit(): dropping segment ({} bytes, {} -> {})",
                    segment.len(),
                    self.local_ipv4_addr,
                    dst
                );
                return Ok(());
            }
        }

        debug!("transmit segment: {:?} total size: {:?}", self.outgoing.len(), segment.len());
        self.outgoing.push_back((dst, segment));
        Ok(())
    }

    fn register_receiver(&mut self, receiver: SegmentReceiver) {
        self.receiver = Some(receiver);
    }

    fn checksum_enforced(&self) -> bool {
        self.checksum_enforced
    }
}

impl Deref for SharedTestNetwork {
    type Target = TestNetwork;

    fn deref(&self) -> &Self::Target {
        self.0.deref()
    }
}

impl DerefMut for SharedTestNetwork {
    fn deref_mut(&mut self) -> &mut Self::Target {
        self.0.deref_mut()
    }
}
