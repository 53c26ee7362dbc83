// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

use thiserror::Error;

/// Any error that may arise from operating on a stream, whether produced by the
/// [`ResettableStream`][crate::ResettableStream] wrapper itself or passed through
/// unchanged from the underlying resource.
///
/// # Thread safety
///
/// This type is thread-safe.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum Error {
    /// The stream was reset while a read or write was in flight.
    ///
    /// `transferred` is the number of bytes the raced-against stream had already
    /// transferred when the reset was detected. The outcome that stream produced -
    /// even a clean end of stream - is discarded in favor of this error, because the
    /// stream may already be closed or replaced and its verdict is meaningless.
    /// Callers that care about the data should inspect `transferred` and decide
    /// whether to retry against the freshly installed stream.
    #[error("stream was reset during the operation ({transferred} bytes transferred)")]
    Reset {
        /// Bytes the pre-reset stream transferred before the reset was detected.
        transferred: usize,
    },

    /// A reset was rejected because the proposed stream is the one already
    /// installed. Nothing was changed and the reset count was not advanced.
    #[error("new stream is already installed")]
    AlreadyInstalled,

    /// A reset was rejected because the proposed stream is the wrapper itself,
    /// which would make the wrapper forward every operation to itself forever.
    /// Nothing was changed and the reset count was not advanced.
    #[error("a resettable stream cannot be reset with itself")]
    ResetToSelf,

    /// The stream is closed and can no longer service the operation.
    #[error("stream is closed")]
    Closed,

    /// We are forwarding an error received from the standard library's I/O APIs.
    #[error(transparent)]
    StdIo(#[from] std::io::Error),

    /// We are forwarding an error of unknown type from an unspecified source.
    #[error(transparent)]
    Other(#[from] Box<dyn std::error::Error + Send + Sync>),
}

/// A specialized `Result` for use with stream operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Represents a stream error as a standard I/O error.
/// This is often used when interoperating with other libraries that expect standard I/O errors.
impl From<Error> for std::io::Error {
    fn from(value: Error) -> Self {
        match value {
            Error::StdIo(error) => error,
            _ => Self::other(value),
        }
    }
}
