// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! Utilities for testing code that works with [`Stream`][crate::Stream]
//! implementations, including the reset behavior of
//! [`ResettableStream`][crate::ResettableStream].

mod buffer;
mod null;

pub use buffer::*;
pub use null::*;
