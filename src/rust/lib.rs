// Copyright (c) Microsoft Corporation.
// Licensed under the MIT license.

#![deny(clippy::all)]

#[macro_use]
extern crate log;

//======================================================================================================================
// Macros
//======================================================================================================================

/// Ensures that two expressions are equal, bailing out of the enclosing `anyhow::Result` function otherwise.
#[cfg(test)]
#[macro_export]
macro_rules! ensure_eq {
    ($left:expr, $right:expr $(,)?) => {
        match (&$left, &$right) {
            (left_val, right_val) => {
                if !(*left_val == *right_val) {
                    anyhow::bail!(
                        "ensure failed: `(left == right)` left: `{:?}`, right: `{:?}` ({}:{})",
                        left_val,
                        right_val,
                        file!(),
                        line!()
                    );
                }
            },
        }
    };
}

/// Ensures that two expressions are not equal, bailing out of the enclosing `anyhow::Result` function otherwise.
#[cfg(test)]
#[macro_export]
macro_rules! ensure_neq {
    ($left:expr, $right:expr $(,)?) => {
        match (&$left, &$right) {
            (left_val, right_val) => {
                if *left_val == *right_val {
                    anyhow::bail!(
                        "ensure failed: `(left != right)` left: `{:?}`, right: `{:?}` ({}:{})",
                        left_val,
                        right_val,
                        file!(),
                        line!()
                    );
                }
            },
        }
    };
}

//======================================================================================================================
// Exports
//======================================================================================================================

pub mod config;
pub mod inetstack;
pub mod runtime;

pub use self::{
    inetstack::protocols::{
        layer3::{
            NetworkLayer,
            SegmentReceiver,
            SharedNetworkLayer,
        },
        layer4::tcp::{
            ConnectionId,
            ConnectionKey,
            ControlBlock,
            SeqNumber,
            SharedTcpListener,
            TcpHeader,
            TcpListener,
        },
    },
    runtime::{
        fail::Fail,
        network::config::TcpConfig,
        timer::SharedTimer,
    },
};
