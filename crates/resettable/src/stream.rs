// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

use std::fmt::Debug;

/// A bidirectional stream of bytes that can be read from, written to, and closed.
///
/// This is the capability contract accepted by [`ResettableStream`]: any resource that
/// can service blocking reads and writes of raw bytes can implement it - network
/// connections, pipes, in-memory buffers, or wrappers layered over other streams.
/// The contract deliberately says nothing about what the bytes mean; buffering,
/// retries, and framing are the caller's concern.
///
/// # Ownership
///
/// The methods on this trait accept `&self`, so any number of operations may be in
/// flight against the same stream at once. Implementations are responsible for their
/// own internal synchronization, the same way operating system handles are. This is
/// what allows one handle to be shared between the threads performing I/O and a
/// controller that may [reset][ResettableStream::reset] the wrapper at any moment.
///
/// Streams travel as `Arc<dyn Stream>`; identity (used by the reset rejection rules)
/// is the address of the allocation, never structural equality.
///
/// # Thread safety
///
/// `Send` and `Sync` are supertraits - a stream must be shareable across threads.
///
/// [`ResettableStream`]: crate::ResettableStream
/// [ResettableStream::reset]: crate::ResettableStream::reset
pub trait Stream: Debug + Send + Sync {
    /// Reads bytes from the stream into `buf`, returning how many were read.
    ///
    /// Short reads are permitted - a successful call may fill any prefix of `buf`.
    /// A return of `Ok(0)` for a non-empty `buf` signals end of stream.
    ///
    /// # Errors
    ///
    /// Whatever the resource produces, e.g. [`Error::Closed`][crate::Error::Closed]
    /// once the stream has been closed.
    fn read(&self, buf: &mut [u8]) -> crate::Result<usize>;

    /// Writes bytes from `buf` to the stream, returning how many were written.
    ///
    /// Short writes are permitted - a successful call may consume any prefix of `buf`.
    ///
    /// # Errors
    ///
    /// Whatever the resource produces, e.g. [`Error::Closed`][crate::Error::Closed]
    /// once the stream has been closed.
    fn write(&self, buf: &[u8]) -> crate::Result<usize>;

    /// Closes the stream.
    ///
    /// Reads and writes issued after a close are expected to fail, though the exact
    /// outcome is up to the implementation. Closing an already-closed stream is
    /// permitted.
    ///
    /// # Errors
    ///
    /// Whatever the resource produces while shutting down.
    fn close(&self) -> crate::Result<()>;
}
