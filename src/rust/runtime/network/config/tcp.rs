// Copyright (c) Microsoft Corporation.
// Licensed under the MIT license.

//==============================================================================
// Imports
//==============================================================================

use crate::runtime::network::consts::{
    DEFAULT_MSS,
    DEFAULT_RETRANSMIT_TIMEOUT,
    DEFAULT_WINDOW_SIZE,
    MAX_MSS,
    MIN_MSS,
};
use ::std::time::Duration;

//==============================================================================
// Structures
//==============================================================================

/// TCP Configuration Descriptor
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TcpConfig {
    /// Maximum Segment Size
    mss: usize,
    /// Fixed Retransmission Interval
    retransmit_timeout: Duration,
    /// Advertised Window Size
    window_size: u16,
}

//==============================================================================
// Associate Functions
//==============================================================================

/// Associate Functions for TCP Configuration Descriptor
impl TcpConfig {
    /// Creates a TCP Configuration Descriptor.
    pub fn new(mss: Option<usize>, retransmit_timeout: Option<Duration>, window_size: Option<u16>) -> Self {
        let mut options = Self::default();

        if let Some(value) = mss {
            options = options.set_mss(value);
        }
        if let Some(value) = retransmit_timeout {
            options = options.set_retransmit_timeout(value);
        }
        if let Some(value) = window_size {
            options.window_size = value;
        }

        options
    }

    /// Gets the maximum segment size in the target [TcpConfig].
    pub fn get_mss(&self) -> usize {
        self.mss
    }

    /// Gets the retransmission interval in the target [TcpConfig].
    pub fn get_retransmit_timeout(&self) -> Duration {
        self.retransmit_timeout
    }

    /// Gets the advertised window size in the target [TcpConfig].
    pub fn get_window_size(&self) -> u16 {
        self.window_size
    }

    /// Sets the maximum segment size in the target [TcpConfig].
    fn set_mss(mut self, value: usize) -> Self {
        assert!(value >= MIN_MSS);
        assert!(value <= MAX_MSS);
        self.mss = value;
        self
    }

    /// Sets the retransmission interval in the target [TcpConfig].
    fn set_retransmit_timeout(mut self, value: Duration) -> Self {
        assert!(value > Duration::new(0, 0));
        self.retransmit_timeout = value;
        self
    }
}

//==============================================================================
// Trait Implementations
//==============================================================================

/// Default Trait Implementation for TCP Configuration Descriptor
impl Default for TcpConfig {
    /// Creates a TCP Configuration Descriptor with the default values.
    fn default() -> Self {
        TcpConfig {
            mss: DEFAULT_MSS,
            retransmit_timeout: DEFAULT_RETRANSMIT_TIMEOUT,
            window_size: DEFAULT_WINDOW_SIZE,
        }
    }
}

//==============================================================================
// Unit Tests
//==============================================================================
