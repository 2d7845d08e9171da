// Copyright (c) Microsoft Corporation.
// Licensed under the MIT license.

//======================================================================================================================
// Exports
//======================================================================================================================

mod ctrlblk;
mod sender;

pub use self::ctrlblk::{
    ControlBlock,
    DataCallback,
};
