// SPDX-FileCopyrightText: Copyright (c) 2017-2024 slowtec GmbH <post@slowtec.de>
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Error types.

use std::io;

use thiserror::Error;

/// Reasons why a buffer could not be decoded into an RTU frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum FrameError {
    /// Not enough bytes for a complete frame yet.
    ///
    /// The buffer is left untouched so that decoding can be retried
    /// once more bytes have arrived.
    #[error("packet too short")]
    TooShort,

    /// The trailing CRC does not match the frame contents.
    ///
    /// The whole buffer has been discarded, because the frame boundaries
    /// within it can no longer be trusted.
    #[error("CRC mismatch: expected {expected:#06X}, received {actual:#06X}")]
    ChecksumMismatch { expected: u16, actual: u16 },
}

/// _Modbus_ RTU server transport error.
#[derive(Debug, Error)]
pub enum Error {
    /// I/O error of the underlying port.
    #[error(transparent)]
    Io(#[from] io::Error),

    /// Malformed frame.
    #[error(transparent)]
    Frame(#[from] FrameError),

    /// The receiving end of the request sink has been dropped.
    #[error("request sink closed")]
    RequestSinkClosed,
}

/// Specialized [`std::result::Result`] type for the server transport.
pub type Result<T> = std::result::Result<T, Error>;
