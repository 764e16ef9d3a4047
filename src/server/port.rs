// SPDX-FileCopyrightText: Copyright (c) 2017-2025 slowtec GmbH <post@slowtec.de>
// SPDX-License-Identifier: MIT OR Apache-2.0

use std::{fmt, sync::Arc};

use futures_util::SinkExt as _;
use tokio::{io::AsyncWrite, sync::Mutex};
use tokio_util::codec::FramedWrite;

use crate::{codec::rtu::RtuCodec, frame::rtu::RtuFrame, Result};

type BoxedWriter = Box<dyn AsyncWrite + Send + Unpin>;

/// Name of an attached port, e.g. the serial device path.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PortId(Arc<str>);

impl PortId {
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for PortId {
    fn from(from: &str) -> Self {
        Self(from.into())
    }
}

impl From<String> for PortId {
    fn from(from: String) -> Self {
        Self(from.into())
    }
}

impl fmt::Display for PortId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// The port a request was received on.
///
/// Cloning is cheap. All clones share the write half of the port, so
/// replies from concurrent handlers are written one frame at a time.
#[derive(Clone)]
pub struct PortHandle {
    id: PortId,
    writer: Arc<Mutex<FramedWrite<BoxedWriter, RtuCodec>>>,
}

impl PortHandle {
    pub(crate) fn new<W>(id: PortId, writer: W) -> Self
    where
        W: AsyncWrite + Send + Unpin + 'static,
    {
        let writer: BoxedWriter = Box::new(writer);
        Self {
            id,
            writer: Arc::new(Mutex::new(FramedWrite::new(writer, RtuCodec))),
        }
    }

    #[must_use]
    pub const fn id(&self) -> &PortId {
        &self.id
    }

    /// Encode `frame` and write it to the port.
    pub async fn send(&self, frame: &RtuFrame) -> Result<()> {
        let mut writer = self.writer.lock().await;
        writer.send(frame).await
    }
}

impl PartialEq for PortHandle {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for PortHandle {}

impl fmt::Debug for PortHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PortHandle").field("id", &self.id).finish()
    }
}

impl fmt::Display for PortHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.id, f)
    }
}
