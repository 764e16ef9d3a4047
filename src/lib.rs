// SPDX-FileCopyrightText: Copyright (c) 2017-2025 slowtec GmbH <post@slowtec.de>
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The receive side of a [Modbus](https://en.wikipedia.org/wiki/Modbus)
//! RTU server, based on [tokio](https://tokio.rs).
//!
//! Bytes arriving on a serial line are reassembled into CRC checked
//! [`RtuFrame`]s and handed over to a bounded request queue, together with
//! the [`PortHandle`](server::PortHandle) that replies are sent through.
//! What a frame means is up to the consumer of the queue: this crate does
//! not interpret function codes or register data.
//!
//! RTU frames carry no length field. Function codes up to `0x05` are taken
//! to be exactly 8 bytes long; everything else is delimited by the line
//! going idle, i.e. by a read timeout.
//!
//! ## Installation
//!
//! Add this to your `Cargo.toml`:
//!
//! ```toml
//! [dependencies]
//! modbus-rtu-server = "*"
//! ```

pub use bytes;

pub mod codec;
pub mod server;

mod error;
pub use self::error::{Error, FrameError, Result};

mod frame;
pub use self::frame::{
    rtu::{RtuFrame, BROADCAST_ADDRESS},
    Exception, Framer, FunctionCode, EXCEPTION_FLAG,
};
