// SPDX-FileCopyrightText: Copyright (c) 2017-2025 slowtec GmbH <post@slowtec.de>
// SPDX-License-Identifier: MIT OR Apache-2.0

pub(crate) mod rtu;

use std::fmt;

use crate::bytes::Bytes;

/// A Modbus function code is represented by an unsigned 8 bit integer.
pub type FunctionCode = u8;

/// The high bit of a function code marks an exception response.
pub const EXCEPTION_FLAG: FunctionCode = 0x80;

/// Exception code answered in place of the regular response data.
///
/// Codes that have no variant of their own end up in [`Exception::Custom`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Exception {
    IllegalFunction,
    IllegalDataAddress,
    IllegalDataValue,
    ServerDeviceFailure,
    Acknowledge,
    ServerDeviceBusy,
    MemoryParityError,
    GatewayPathUnavailable,
    GatewayTargetDevice,
    Custom(u8),
}

impl Exception {
    const NAMED: [Self; 9] = [
        Self::IllegalFunction,
        Self::IllegalDataAddress,
        Self::IllegalDataValue,
        Self::ServerDeviceFailure,
        Self::Acknowledge,
        Self::ServerDeviceBusy,
        Self::MemoryParityError,
        Self::GatewayPathUnavailable,
        Self::GatewayTargetDevice,
    ];

    /// The code as it appears on the wire.
    #[must_use]
    pub const fn code(self) -> u8 {
        match self {
            Self::IllegalFunction => 0x01,
            Self::IllegalDataAddress => 0x02,
            Self::IllegalDataValue => 0x03,
            Self::ServerDeviceFailure => 0x04,
            Self::Acknowledge => 0x05,
            Self::ServerDeviceBusy => 0x06,
            Self::MemoryParityError => 0x08,
            Self::GatewayPathUnavailable => 0x0A,
            Self::GatewayTargetDevice => 0x0B,
            Self::Custom(code) => code,
        }
    }

    const fn name(self) -> Option<&'static str> {
        let name = match self {
            Self::IllegalFunction => "illegal function",
            Self::IllegalDataAddress => "illegal data address",
            Self::IllegalDataValue => "illegal data value",
            Self::ServerDeviceFailure => "server failure",
            Self::Acknowledge => "acknowledged, still processing",
            Self::ServerDeviceBusy => "server busy",
            Self::MemoryParityError => "memory parity error",
            Self::GatewayPathUnavailable => "no gateway path",
            Self::GatewayTargetDevice => "no response from gateway target",
            Self::Custom(_) => return None,
        };
        Some(name)
    }
}

impl From<u8> for Exception {
    fn from(code: u8) -> Self {
        Self::NAMED
            .into_iter()
            .find(|exception| exception.code() == code)
            .unwrap_or(Self::Custom(code))
    }
}

impl From<Exception> for u8 {
    fn from(exception: Exception) -> Self {
        exception.code()
    }
}

impl fmt::Display for Exception {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.name() {
            Some(name) => write!(f, "{name} (0x{:02X})", self.code()),
            None => write!(f, "exception 0x{:02X}", self.code()),
        }
    }
}

/// A protocol frame, independent of the transport it travels on.
///
/// Every transport variant owns its wire format entirely and implements
/// this trait on its own frame type. Request handlers only need these
/// operations to turn a request into a response.
pub trait Framer: fmt::Debug + Send + Sync {
    /// Encode the frame into its wire representation, including any
    /// transport specific header and checksum.
    fn to_bytes(&self) -> Bytes;

    /// The function code, with the exception flag if set.
    fn function(&self) -> FunctionCode;

    /// The data following the function code.
    fn data(&self) -> &[u8];

    /// Replace the data following the function code.
    fn set_data(&mut self, data: Bytes);

    /// Turn the frame into an exception response.
    fn set_exception(&mut self, exception: Exception);

    /// An independent copy that can be modified without affecting `self`.
    fn boxed_copy(&self) -> Box<dyn Framer>;
}
