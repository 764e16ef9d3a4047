// SPDX-FileCopyrightText: Copyright (c) 2017-2025 slowtec GmbH <post@slowtec.de>
// SPDX-License-Identifier: MIT OR Apache-2.0

use byteorder::{ByteOrder, LittleEndian};
use tokio_util::codec::{Decoder, Encoder};

use crate::{
    bytes::{BufMut as _, BytesMut},
    frame::{rtu::RtuFrame, FunctionCode},
    Error, FrameError,
};

/// No valid frame can be shorter: addr + function + data + crc.
const MIN_ADU_LEN: usize = 5;

/// Length on the wire of frames in the fixed-length class.
const FIXED_ADU_LEN: usize = 8;

/// Function codes up to and including this value always occupy
/// [`FIXED_ADU_LEN`] bytes.
const MAX_FIXED_LEN_FUNCTION: FunctionCode = 0x05;

const CRC_LEN: usize = 2;

/// Calculate the _Modbus_ CRC-16 of `buf`.
#[must_use]
pub fn crc16(buf: &[u8]) -> u16 {
    let mut crc = 0xFFFF;
    for x in buf {
        crc ^= u16::from(*x);
        for _ in 0..8 {
            if (crc & 0x0001) != 0 {
                crc >>= 1;
                crc ^= 0xA001;
            } else {
                crc >>= 1;
            }
        }
    }
    crc
}

/// Decode the frame at the front of `buf`.
///
/// On success the decoded bytes are removed and `buf` keeps the remainder.
/// It is only non-empty for the fixed-length function codes, because
/// for all other codes the whole buffer is taken as a single frame.
///
/// [`FrameError::TooShort`] leaves `buf` untouched.
/// [`FrameError::ChecksumMismatch`] clears it.
pub fn decode(buf: &mut BytesMut) -> Result<RtuFrame, FrameError> {
    if buf.len() < MIN_ADU_LEN {
        return Err(FrameError::TooShort);
    }

    let adu_len = if buf[1] <= MAX_FIXED_LEN_FUNCTION {
        if buf.len() < FIXED_ADU_LEN {
            return Err(FrameError::TooShort);
        }
        FIXED_ADU_LEN
    } else {
        buf.len()
    };

    let crc_offset = adu_len - CRC_LEN;
    let actual = LittleEndian::read_u16(&buf[crc_offset..adu_len]);
    let expected = crc16(&buf[..crc_offset]);
    if expected != actual {
        buf.clear();
        return Err(FrameError::ChecksumMismatch { expected, actual });
    }

    let mut adu = buf.split_to(adu_len);
    adu.truncate(crc_offset);
    let hdr = adu.split_to(2);
    Ok(RtuFrame {
        address: hdr[0],
        function: hdr[1],
        data: adu.freeze(),
    })
}

/// Append the wire representation of `frame`, including its CRC, to `buf`.
pub fn encode(frame: &RtuFrame, buf: &mut BytesMut) {
    let start = buf.len();
    buf.reserve(frame.data.len() + 4);
    buf.put_u8(frame.address);
    buf.put_u8(frame.function);
    buf.put_slice(&frame.data);
    let crc = crc16(&buf[start..]);
    buf.put_u16_le(crc);
}

/// [`Decoder`] and [`Encoder`] for _Modbus_ RTU frames.
///
/// Incomplete frames are reported as `Ok(None)`, CRC errors as
/// [`Error::Frame`] after the read buffer has been discarded.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct RtuCodec;

impl Decoder for RtuCodec {
    type Item = RtuFrame;
    type Error = Error;

    fn decode(&mut self, buf: &mut BytesMut) -> Result<Option<RtuFrame>, Error> {
        match decode(buf) {
            Ok(frame) => Ok(Some(frame)),
            Err(FrameError::TooShort) => Ok(None),
            Err(err) => Err(err.into()),
        }
    }
}

impl Encoder<RtuFrame> for RtuCodec {
    type Error = Error;

    fn encode(&mut self, frame: RtuFrame, buf: &mut BytesMut) -> Result<(), Error> {
        encode(&frame, buf);
        Ok(())
    }
}

impl<'a> Encoder<&'a RtuFrame> for RtuCodec {
    type Error = Error;

    fn encode(&mut self, frame: &'a RtuFrame, buf: &mut BytesMut) -> Result<(), Error> {
        encode(frame, buf);
        Ok(())
    }
}
