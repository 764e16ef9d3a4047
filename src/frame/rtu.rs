// SPDX-FileCopyrightText: Copyright (c) 2017-2025 slowtec GmbH <post@slowtec.de>
// SPDX-License-Identifier: MIT OR Apache-2.0

use super::*;

use crate::{bytes::BytesMut, codec};

/// The special address for broadcast messages to all devices on the line.
pub const BROADCAST_ADDRESS: u8 = 0;

/// A _Modbus_ RTU frame.
///
/// The CRC is not part of the frame: it is verified and dropped while
/// decoding and recomputed from the other fields while encoding.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RtuFrame {
    pub address: u8,
    pub function: FunctionCode,
    pub data: Bytes,
}

impl RtuFrame {
    pub fn new(address: u8, function: FunctionCode, data: impl Into<Bytes>) -> Self {
        Self {
            address,
            function,
            data: data.into(),
        }
    }

    #[must_use]
    pub const fn is_broadcast(&self) -> bool {
        self.address == BROADCAST_ADDRESS
    }

    #[must_use]
    pub const fn is_exception(&self) -> bool {
        self.function & EXCEPTION_FLAG != 0
    }
}

impl Framer for RtuFrame {
    fn to_bytes(&self) -> Bytes {
        let mut buf = BytesMut::with_capacity(self.data.len() + 4);
        codec::rtu::encode(self, &mut buf);
        buf.freeze()
    }

    fn function(&self) -> FunctionCode {
        self.function
    }

    fn data(&self) -> &[u8] {
        &self.data
    }

    fn set_data(&mut self, data: Bytes) {
        self.data = data;
    }

    fn set_exception(&mut self, exception: Exception) {
        self.function |= EXCEPTION_FLAG;
        self.data = Bytes::copy_from_slice(&[exception.code()]);
    }

    fn boxed_copy(&self) -> Box<dyn Framer> {
        Box::new(self.clone())
    }
}
