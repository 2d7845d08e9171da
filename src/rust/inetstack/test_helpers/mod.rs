// Copyright (c) Microsoft Corporation.
// Licensed under the MIT license.

pub mod network;
pub mod peer;

pub use self::{
    network::SharedTestNetwork,
    peer::TestPeer,
};

use crate::{
    inetstack::protocols::layer4::tcp::{
        ConnectionId,
        SharedTcpListener,
    },
    runtime::{
        network::config::TcpConfig,
        timer::SharedTimer,
    },
};
use ::std::{
    net::{
        Ipv4Addr,
        SocketAddrV4,
    },
    time::Instant,
};

//==============================================================================
// Constants
//==============================================================================

pub const ALICE_IPV4: Ipv4Addr = Ipv4Addr::new(192, 168, 1, 1);
pub const ALICE_PORT: u16 = 8000;
pub const BOB_IPV4: Ipv4Addr = Ipv4Addr::new(192, 168, 1, 2);
pub const BOB_PORT: u16 = 49152;
pub const CARRIE_IPV4: Ipv4Addr = Ipv4Addr::new(192, 168, 1, 3);
pub const CARRIE_PORT: u16 = 49153;

//==============================================================================
// Standalone Functions
//==============================================================================

/// Alice listens on [ALICE_PORT] behind a fresh simulated network.
pub fn new_alice(
    now: Instant,
    tcp_config: TcpConfig,
) -> (SharedTcpListener, SharedTestNetwork, SharedTimer<ConnectionId>) {
    let network: SharedTestNetwork = SharedTestNetwork::new_test(ALICE_IPV4);
    let timer: SharedTimer<ConnectionId> = SharedTimer::new(now);
    let listener: SharedTcpListener = SharedTcpListener::new(
        network.as_network_layer(),
        timer.clone(),
        SocketAddrV4::new(ALICE_IPV4, ALICE_PORT),
        tcp_config,
    );
    (listener, network, timer)
}

/// Bob is the scripted remote side, talking to Alice.
pub fn new_bob() -> TestPeer {
    TestPeer::new(
        SocketAddrV4::new(BOB_IPV4, BOB_PORT),
        SocketAddrV4::new(ALICE_IPV4, ALICE_PORT),
    )
}

pub fn new_carrie() -> TestPeer {
    TestPeer::new(
        SocketAddrV4::new(CARRIE_IPV4, CARRIE_PORT),
        SocketAddrV4::new(ALICE_IPV4, ALICE_PORT),
    )
}
