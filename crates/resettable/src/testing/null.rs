// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

use crate::Stream;

/// A stream that does nothing - any data written to it is discarded and it never
/// returns any data when read from. Intended for simple tests and examples.
#[derive(Debug, Default)]
pub struct Null;

impl Null {
    /// Creates a new `Null` stream.
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    /// Reads nothing; the stream is always at its end.
    ///
    /// # Errors
    ///
    /// This call never fails.
    #[cfg_attr(test, mutants::skip)] // Test/example code, do not waste time mutating.
    pub fn read(&self, _buf: &mut [u8]) -> crate::Result<usize> {
        Ok(0)
    }

    /// Discards `buf` and reports all of it as written.
    ///
    /// # Errors
    ///
    /// This call never fails.
    #[cfg_attr(test, mutants::skip)] // Test/example code, do not waste time mutating.
    pub fn write(&self, buf: &[u8]) -> crate::Result<usize> {
        Ok(buf.len())
    }

    /// Does nothing; a `Null` stream cannot be meaningfully closed.
    ///
    /// # Errors
    ///
    /// This call never fails.
    #[cfg_attr(test, mutants::skip)] // Test/example code, do not waste time mutating.
    pub fn close(&self) -> crate::Result<()> {
        Ok(())
    }
}

#[cfg_attr(coverage_nightly, coverage(off))] // Trivial forwarder.
impl Stream for Null {
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
