// SPDX-FileCopyrightText: Copyright (c) 2017-2023 slowtec GmbH <post@slowtec.de>
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Modbus RTU receive loop

use std::{io, time::Duration};

use log::{debug, error, trace, warn};
use tokio::{
    io::{AsyncRead, AsyncReadExt as _},
    sync::mpsc,
    time,
};
use tokio_util::{codec::Decoder as _, sync::CancellationToken};

use crate::{
    bytes::BytesMut,
    codec::rtu::RtuCodec,
    server::{PortHandle, Request},
    Error, Result,
};

/// Settings of a single receive loop.
#[derive(Debug, Clone, Copy)]
pub(crate) struct ReadSettings {
    pub(crate) timeout: Duration,
    pub(crate) buffer_size: usize,
}

/// Reassemble the frames arriving on `reader` and forward them to `requests`.
///
/// A read timeout marks an idle line, i.e. a frame boundary, and discards
/// the bytes received so far. Runs until `shutdown` is cancelled, the
/// request receiver is dropped, or the port fails. Shutdown is checked
/// before every read and while waiting for room in the request queue.
pub(crate) async fn accept_serial_requests<R>(
    port: PortHandle,
    mut reader: R,
    requests: mpsc::Sender<Request>,
    settings: ReadSettings,
    shutdown: CancellationToken,
) -> Result<()>
where
    R: AsyncRead + Unpin,
{
    let mut codec = RtuCodec;
    let mut leftover = BytesMut::new();
    let mut chunk = BytesMut::with_capacity(settings.buffer_size);

    loop {
        if shutdown.is_cancelled() {
            debug!("{port}: shutting down");
            return Ok(());
        }

        chunk.clear();
        let bytes_read = match time::timeout(settings.timeout, reader.read_buf(&mut chunk)).await {
            Ok(Ok(bytes_read)) => bytes_read,
            Ok(Err(err)) if err.kind() == io::ErrorKind::TimedOut => {
                reset_on_idle(&port, &mut leftover);
                continue;
            }
            Ok(Err(err)) => {
                error!("{port}: serial read error: {err}");
                return Err(err.into());
            }
            Err(_elapsed) => {
                reset_on_idle(&port, &mut leftover);
                continue;
            }
        };

        if bytes_read == 0 {
            // Nothing arrived or the stream is exhausted.
            time::sleep(settings.timeout).await;
            continue;
        }

        leftover.extend_from_slice(&chunk);
        loop {
            let frame = match codec.decode(&mut leftover) {
                Ok(Some(frame)) => frame,
                Ok(None) => break,
                Err(err) => {
                    debug!("{port}: discarding receive buffer: {err}");
                    break;
                }
            };
            trace!(
                "{port}: frame from 0x{:02X}, function 0x{:02X}",
                frame.address,
                frame.function
            );
            let request = Request {
                port: port.clone(),
                frame,
            };
            // A full queue blocks here until a request has been taken out.
            tokio::select! {
                biased;
                sent = requests.send(request) => {
                    if sent.is_err() {
                        warn!("{port}: request sink closed");
                        return Err(Error::RequestSinkClosed);
                    }
                }
                () = shutdown.cancelled() => {
                    debug!("{port}: shutting down with a pending request");
                    return Ok(());
                }
            }
        }
    }
}

fn reset_on_idle(port: &PortHandle, leftover: &mut BytesMut) {
    if !leftover.is_empty() {
        trace!("{port}: idle line, discarding {} bytes", leftover.len());
        leftover.clear();
    }
}
