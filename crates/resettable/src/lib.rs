// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

#![cfg_attr(coverage_nightly, feature(coverage_attribute))]
#![cfg_attr(docsrs, feature(doc_cfg))]

//! Hot-swappable wrapper around readable and writable byte streams.
//!
//! This crate provides [`ResettableStream`], a thread-safe cell holding a byte
//! stream - anything implementing the [`Stream`] contract - that a controller can
//! atomically replace ("reset") at any time, even while other threads are blocked
//! inside reads and writes against it. Consumers hold one stable handle for the
//! lifetime of the application and never observe a missing resource or a deadlock.
//!
//! # When to Use
//!
//! Use a resettable stream when long-lived consumers must survive the underlying
//! transport being replaced out from under them:
//!
//! - **Reconnection**: swap a dropped connection for a fresh one without tearing
//!   down the readers and writers built on top of it
//! - **Upgrades**: replace a plain stream with one layered over it (pass
//!   `close_old = false` so the wrapped stream stays alive)
//! - **Testing**: substitute an in-memory stream for a live one mid-run
//!
//! # Reset detection
//!
//! Every reset advances a generation counter. Reads and writes snapshot the counter
//! before the operation and check it again afterwards; a change means a reset
//! overlapped the operation, which then reports [`Error::Reset`] instead of the
//! raced-against stream's own outcome - preserving the number of bytes actually
//! transferred before the race. An operation that completes with the counter
//! unchanged is guaranteed no reset overlapped it. The underlying I/O call itself
//! runs without any lock held, so a reset never waits on in-flight I/O.
//!
//! Callers should treat [`Error::Reset`] as a retry signal: the operation raced
//! with a swap, and the bytes it reports may have gone to (or come from) the
//! stream that was just replaced.
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//!
//! use resettable::ResettableStream;
//! use resettable::testing::BufferStream;
//!
//! let stream = ResettableStream::new(Arc::new(BufferStream::new()));
//!
//! assert_eq!(stream.write(b"hello").unwrap(), 5);
//!
//! let mut buf = [0_u8; 5];
//! assert_eq!(stream.read(&mut buf).unwrap(), 5);
//! assert_eq!(&buf, b"hello");
//!
//! // A controller swaps in a fresh stream; the old one is closed best-effort.
//! stream.reset(Arc::new(BufferStream::new()), true).unwrap();
//! assert_eq!(stream.reset_count(), 1);
//! ```
//!
//! # Thread Safety
//!
//! [`ResettableStream`] is `Send` and `Sync` and is designed to be shared across
//! threads. Reads, writes, and closes proceed in parallel under a shared lock;
//! a reset is the rare exclusive event.
//!
//! The `test-util` feature enables additional utilities for testing code that
//! produces or consumes streams of bytes. These are in the `testing` module.

#![doc(html_logo_url = "https://media.githubusercontent.com/media/microsoft/oxidizer/refs/heads/main/crates/resettable/logo.png")]
#![doc(html_favicon_url = "https://media.githubusercontent.com/media/microsoft/oxidizer/refs/heads/main/crates/resettable/favicon.ico")]

mod error;
mod resettable_stream;
mod stream;

pub use error::{Error, Result};
pub use resettable_stream::ResettableStream;
pub use stream::Stream;

#[cfg(any(test, feature = "test-util"))]
pub mod testing;
