// Copyright (c) Microsoft Corporation.
// Licensed under the MIT license.

//======================================================================================================================
// Imports
//======================================================================================================================

use ::std::time::Duration;

//======================================================================================================================
// Constants
//======================================================================================================================

/// Fallback MSS Parameter for TCP
pub const FALLBACK_MSS: usize = 536;

/// Minimum MSS Parameter for TCP
pub const MIN_MSS: usize = FALLBACK_MSS;

/// Maximum MSS Parameter for TCP
pub const MAX_MSS: usize = u16::MAX as usize;

/// Default MSS Parameter for TCP. This is the payload that fits an Ethernet MTU after the IPv4 and TCP headers.
pub const DEFAULT_MSS: usize = 1460;

/// Fixed retransmission interval for unacknowledged segments. There is no backoff and no RTT estimation.
pub const DEFAULT_RETRANSMIT_TIMEOUT: Duration = Duration::from_secs(1);

/// Window size advertised on every outgoing segment. Peers' windows are parsed but never enforced.
pub const DEFAULT_WINDOW_SIZE: u16 = 0xffff;
