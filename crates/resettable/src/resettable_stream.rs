// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use parking_lot::RwLock;
use tracing::{Level, event};

use crate::{Error, Stream};

/// A stream wrapper whose underlying resource can be atomically replaced while reads,
/// writes, and closes against it are in flight.
///
/// Consumers hold the wrapper and keep issuing I/O; a controller calls
/// [`reset()`][Self::reset] to swap in a new stream at any time. Consumers never
/// observe a missing resource and never deadlock - an operation that races with a
/// reset either completes normally on the pre-reset stream or reports
/// [`Error::Reset`] carrying the byte count it had already transferred.
///
/// # Reset detection
///
/// Every reset advances a generation counter. A read or write snapshots the counter
/// and the installed stream, performs the I/O *without holding any lock*, and then
/// checks the counter again. A changed counter means at least one reset overlapped
/// the operation; the operation then reports [`Error::Reset`] instead of the
/// stream's own outcome. An operation that completes with the counter unchanged is
/// guaranteed that no reset overlapped it and passes the stream's outcome through
/// untouched.
///
/// An operation that does observe a reset makes no claim about *which* stream
/// produced its bytes - that ambiguity is inherent to allowing resets concurrent
/// with I/O. Callers that care should treat [`Error::Reset`] as a signal to retry.
///
/// # Example
///
/// ```
/// use std::sync::Arc;
///
/// use resettable::ResettableStream;
/// use resettable::testing::BufferStream;
///
/// let stream = ResettableStream::new(Arc::new(BufferStream::new()));
///
/// assert_eq!(stream.write(b"hello").unwrap(), 5);
///
/// let mut buf = [0_u8; 5];
/// assert_eq!(stream.read(&mut buf).unwrap(), 5);
/// assert_eq!(&buf, b"hello");
///
/// // Swap in a fresh stream, closing the old one for us.
/// stream.reset(Arc::new(BufferStream::new()), true).unwrap();
/// assert_eq!(stream.reset_count(), 1);
/// ```
///
/// # Thread safety
///
/// This type is thread-safe. Reads, writes, and closes take the stream lock in
/// shared mode and may overlap freely; a reset takes it exclusively and is the only
/// writer of the wrapper's state. The lock is never held across the underlying
/// read or write call itself, so a reset only ever waits for operations that are
/// mid-snapshot, not for their actual I/O.
#[derive(Debug)]
pub struct ResettableStream {
    stream: RwLock<Arc<dyn Stream>>,

    // Incremented exactly once per successful reset, never decremented.
    generation: AtomicU64,
}

impl ResettableStream {
    /// Creates a new wrapper around `stream`.
    ///
    /// The wrapper always holds a live stream: `Arc` cannot be null, so the
    /// degenerate "wrapper without a resource" state cannot be constructed.
    #[must_use]
    pub fn new(stream: Arc<dyn Stream>) -> Self {
        Self {
            stream: RwLock::new(stream),
            generation: AtomicU64::new(0),
        }
    }

    /// Reads bytes from the currently installed stream into `buf`.
    ///
    /// The underlying read runs without holding the stream lock, so a
    /// [`reset()`][Self::reset] may complete while it is in flight. When that
    /// happens this call reports [`Error::Reset`] with the number of bytes the
    /// raced-against stream had already transferred, discarding that stream's own
    /// outcome - even a clean end of stream. When no reset overlaps the call, the
    /// stream's outcome is passed through unchanged.
    ///
    /// # Errors
    ///
    /// [`Error::Reset`] if a reset raced with the call; otherwise whatever the
    /// underlying stream produced.
    pub fn read(&self, buf: &mut [u8]) -> crate::Result<usize> {
        let generation = self.generation.load(Ordering::Acquire);

        let stream = Arc::clone(&*self.stream.read());

        // A reset slipped in between the two snapshots; they may disagree,
        // so report the reset without touching the stream at all.
        if self.generation.load(Ordering::Acquire) != generation {
            return Err(Error::Reset { transferred: 0 });
        }

        let result = stream.read(buf);

        // A reset overlapped the read itself. The reset verdict replaces the
        // stream's own outcome, but the transferred byte count is preserved.
        if self.generation.load(Ordering::Acquire) != generation {
            return Err(Error::Reset {
                transferred: result.unwrap_or(0),
            });
        }

        result
    }

    /// Writes bytes from `buf` to the currently installed stream.
    ///
    /// Reset detection works exactly as for [`read()`][Self::read]: a reset that
    /// overlaps the call replaces the stream's outcome with [`Error::Reset`],
    /// preserving the count of bytes already written to the pre-reset stream.
    ///
    /// # Errors
    ///
    /// [`Error::Reset`] if a reset raced with the call; otherwise whatever the
    /// underlying stream produced.
    pub fn write(&self, buf: &[u8]) -> crate::Result<usize> {
        let generation = self.generation.load(Ordering::Acquire);

        let stream = Arc::clone(&*self.stream.read());

        if self.generation.load(Ordering::Acquire) != generation {
            return Err(Error::Reset { transferred: 0 });
        }

        let result = stream.write(buf);

        if self.generation.load(Ordering::Acquire) != generation {
            return Err(Error::Reset {
                transferred: result.unwrap_or(0),
            });
        }

        result
    }

    /// Closes the currently installed stream.
    ///
    /// The stream lock is held in shared mode for the duration of the close, so a
    /// reset cannot swap the stream out from under it - but closes may freely
    /// overlap with reads, writes, and other closes. Close does not participate in
    /// reset detection: the underlying outcome is always surfaced. The wrapper
    /// itself remains usable afterwards and may still be reset.
    ///
    /// # Errors
    ///
    /// Whatever the underlying stream's close produced.
    pub fn close(&self) -> crate::Result<()> {
        self.stream.read().close()
    }

    /// Atomically replaces the underlying stream with `new`.
    ///
    /// Waits for operations that are mid-snapshot to release the shared lock, but
    /// never for their actual I/O; in-flight reads and writes against the previous
    /// stream either complete before the swap or report [`Error::Reset`]. On
    /// success the [reset count][Self::reset_count] advances by exactly one.
    ///
    /// When `close_old` is true the replaced stream is closed after the swap as
    /// best-effort cleanup; a failure to close it is logged and not surfaced, since
    /// the replaced stream is no longer the wrapper's concern. Pass false when the
    /// new stream wraps the old one or the old stream is still in use elsewhere.
    ///
    /// Streams are compared by the address of their allocation, never structurally.
    ///
    /// # Errors
    ///
    /// * [`Error::ResetToSelf`] if `new` is this wrapper itself.
    /// * [`Error::AlreadyInstalled`] if `new` is the stream already installed.
    ///
    /// Both rejections leave the wrapper completely unchanged.
    pub fn reset(&self, new: Arc<dyn Stream>, close_old: bool) -> crate::Result<()> {
        if std::ptr::addr_eq(Arc::as_ptr(&new), std::ptr::from_ref(self)) {
            return Err(Error::ResetToSelf);
        }

        let (old, generation) = {
            let mut stream = self.stream.write();

            if std::ptr::addr_eq(Arc::as_ptr(&*stream), Arc::as_ptr(&new)) {
                return Err(Error::AlreadyInstalled);
            }

            let old = std::mem::replace(&mut *stream, new);
            let generation = self.generation.fetch_add(1, Ordering::AcqRel) + 1;
            (old, generation)
        };

        event!(
            Level::DEBUG,
            message = "stream reset",
            generation,
            close_old
        );

        if close_old {
            // Best-effort cleanup; the replaced stream's close outcome is
            // meaningless to the caller that just installed its successor.
            if let Err(error) = old.close() {
                event!(
                    Level::DEBUG,
                    message = "closing the replaced stream failed",
                    error = ?error
                );
            }
        }

        Ok(())
    }

    /// Returns how many times the stream has been reset.
    ///
    /// The count only ever grows, by exactly one per successful reset. Two calls
    /// that return different values bracket at least one reset, though not how
    /// many. Useful for debugging, tests, or enforcing caller-side reset limits.
    #[must_use]
    pub fn reset_count(&self) -> u64 {
        self.generation.load(Ordering::Acquire)
    }

    /// Returns the stream installed at the moment of the call.
    ///
    /// The returned handle is a snapshot: a concurrent reset can replace the
    /// installed stream immediately after this returns. Callers may use it for
    /// identity comparison against handles they kept from construction or from
    /// earlier resets, or to reach the concrete stream they installed.
    #[must_use]
    pub fn current(&self) -> Arc<dyn Stream> {
        Arc::clone(&*self.stream.read())
    }
}

/// The wrapper satisfies the same contract it wraps, so it can be handed to any
/// consumer of [`Stream`] - including another resettable wrapper layered on top.
#[cfg_attr(coverage_nightly, coverage(off))] // Trivial forwarder.
impl Stream for ResettableStream {
    #[cfg_attr(test, mutants::skip)] // Trivial forwarder.
    fn read(&self, buf: &mut [u8]) -> crate::Result<usize> {
        self.read(buf)
    }

    #[cfg_attr(test, mutants::skip)] // Trivial forwarder.
    fn write(&self, buf: &[u8]) -> crate::Result<usize> {
        self.write(buf)
    }

    #[cfg_attr(test, mutants::skip)] // Trivial forwarder.
    fn close(&self) -> crate::Result<()> {
        self.close()
    }
}
