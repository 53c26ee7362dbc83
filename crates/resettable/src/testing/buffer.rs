// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

use std::collections::VecDeque;
use std::time::Duration;

use parking_lot::Mutex;

use crate::{Error, Stream};

/// A growable in-memory stream: writes append to an internal buffer and reads drain
/// it in FIFO order. For test and example purposes only, not for real I/O.
///
/// Once [closed][Stream::close], reads and writes fail with
/// [`Error::Closed`]; reading an empty, still-open buffer reports end of stream.
///
/// The [builder][BufferStream::builder] can configure a per-operation delay (to
/// stage races between in-flight I/O and a reset) and a maximum I/O size (to force
/// the caller to handle short reads and writes).
#[derive(Debug)]
pub struct BufferStream {
    state: Mutex<State>,

    // Applied at the start of every read and write, before the transfer, so a
    // concurrently issued reset lands while the operation is still in flight.
    delay: Option<Duration>,

    max_io_size: Option<usize>,
}

#[derive(Debug, Default)]
struct State {
    buffer: VecDeque<u8>,
    closed: bool,
}

impl BufferStream {
    /// Starts building a new `BufferStream`.
    #[must_use]
    pub fn builder() -> BufferStreamBuilder {
        BufferStreamBuilder {
            delay: None,
            max_io_size: None,
        }
    }

    /// Creates a new `BufferStream` with the default configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::builder().build()
    }

    /// Reads up to `buf.len()` buffered bytes in FIFO order.
    ///
    /// Returns `Ok(0)` when the buffer is empty, signaling end of stream.
    ///
    /// # Errors
    ///
    /// [`Error::Closed`] once the stream has been closed.
    #[cfg_attr(test, mutants::skip)] // Test/example code, do not waste time mutating.
    pub fn read(&self, buf: &mut [u8]) -> crate::Result<usize> {
        self.wait_delay();

        let mut state = self.state.lock();
        if state.closed {
            return Err(Error::Closed);
        }

        let bytes_to_read = buf
            .len()
            .min(state.buffer.len())
            .min(self.max_io_size.unwrap_or(usize::MAX));

        for (slot, byte) in buf.iter_mut().zip(state.buffer.drain(..bytes_to_read)) {
            *slot = byte;
        }

        Ok(bytes_to_read)
    }

    /// Appends up to `buf.len()` bytes to the buffer.
    ///
    /// # Errors
    ///
    /// [`Error::Closed`] once the stream has been closed.
    #[cfg_attr(test, mutants::skip)] // Test/example code, do not waste time mutating.
    pub fn write(&self, buf: &[u8]) -> crate::Result<usize> {
        self.wait_delay();

        let mut state = self.state.lock();
        if state.closed {
            return Err(Error::Closed);
        }

        let bytes_to_write = buf.len().min(self.max_io_size.unwrap_or(usize::MAX));
        state.buffer.extend(&buf[..bytes_to_write]);

        Ok(bytes_to_write)
    }

    /// Closes the stream; subsequent reads and writes fail with [`Error::Closed`].
    ///
    /// # Errors
    ///
    /// This call never fails. Closing an already-closed stream is a no-op.
    #[cfg_attr(test, mutants::skip)] // Test/example code, do not waste time mutating.
    pub fn close(&self) -> crate::Result<()> {
        self.state.lock().closed = true;
        Ok(())
    }

    /// Returns a copy of the bytes currently buffered, in read order.
    #[must_use]
    pub fn contents(&self) -> Vec<u8> {
        self.state.lock().buffer.iter().copied().collect()
    }

    /// Returns the number of bytes currently buffered.
    #[must_use]
    pub fn len(&self) -> usize {
        self.state.lock().buffer.len()
    }

    /// Returns true if no bytes are currently buffered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.state.lock().buffer.is_empty()
    }

    /// Returns true once the stream has been closed.
    #[must_use]
    pub fn is_closed(&self) -> bool {
        self.state.lock().closed
    }

    #[cfg_attr(test, mutants::skip)] // Test/example code, do not waste time mutating.
    fn wait_delay(&self) {
        if let Some(delay) = self.delay {
            std::thread::sleep(delay);
        }
    }
}

impl Default for BufferStream {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg_attr(coverage_nightly, coverage(off))] // Trivial forwarder.
impl Stream for BufferStream {
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

/// Creates an instance of [`BufferStream`].
///
/// Access through [`BufferStream::builder()`][BufferStream::builder].
#[derive(Debug)]
pub struct BufferStreamBuilder {
    delay: Option<Duration>,
    max_io_size: Option<usize>,
}

impl BufferStreamBuilder {
    /// Sleeps for `delay` at the start of every read and write, before any bytes
    /// are transferred.
    ///
    /// Optional. Defaults to no delay.
    #[must_use]
    pub fn delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Caps the number of bytes a single read or write transfers, forcing callers
    /// to cope with short operations.
    ///
    /// Optional. Defaults to no cap.
    #[must_use]
    pub fn max_io_size(mut self, max_io_size: usize) -> Self {
        self.max_io_size = Some(max_io_size);
        self
    }

    /// Builds the `BufferStream` with the provided configuration.
    #[must_use]
    pub fn build(self) -> BufferStream {
        BufferStream {
            state: Mutex::new(State::default()),
            delay: self.delay,
            max_io_size: self.max_io_size,
        }
    }
}
