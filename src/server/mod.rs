// SPDX-FileCopyrightText: Copyright (c) 2017-2025 slowtec GmbH <post@slowtec.de>
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Modbus RTU server transport
//!
//! Every attached port is served by its own task. The tasks hand the
//! decoded frames over to a bounded channel, whose receiving end belongs
//! to the caller:
//!
//! ```no_run
//! # async fn run() -> modbus_rtu_server::Result<()> {
//! use modbus_rtu_server::{server::{Server, ServerConfig}, Exception, Framer as _};
//!
//! let (mut server, mut requests) = Server::new(ServerConfig::default());
//! server.listen_rtu("/dev/ttyUSB0", 19200)?;
//!
//! while let Some(request) = requests.recv().await {
//!     let mut response = request.frame.clone();
//!     response.set_exception(Exception::IllegalFunction);
//!     request.port.send(&response).await?;
//! }
//! # Ok(())
//! # }
//! ```

mod port;
pub(crate) mod rtu;

use std::time::Duration;

use log::debug;
use tokio::{
    io::{AsyncRead, AsyncWrite},
    sync::mpsc,
    task::JoinHandle,
};
use tokio_util::sync::{CancellationToken, DropGuard};

pub use self::port::{PortHandle, PortId};
use crate::{frame::rtu::RtuFrame, Result};

/// Timeout of a single read, which also defines the idle time that
/// separates two frames on the line.
pub const DEFAULT_READ_TIMEOUT: Duration = Duration::from_millis(100);

/// Maximum number of bytes requested from the port per read.
pub const DEFAULT_READ_BUFFER_SIZE: usize = 512;

/// Number of decoded requests that may be queued before the
/// receive loops block.
pub const DEFAULT_REQUEST_QUEUE_CAPACITY: usize = 64;

/// A frame together with the port it has been received on.
#[derive(Debug)]
pub struct Request {
    pub port: PortHandle,
    pub frame: RtuFrame,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    pub read_timeout: Duration,
    pub read_buffer_size: usize,
    pub request_queue_capacity: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            read_timeout: DEFAULT_READ_TIMEOUT,
            read_buffer_size: DEFAULT_READ_BUFFER_SIZE,
            request_queue_capacity: DEFAULT_REQUEST_QUEUE_CAPACITY,
        }
    }
}

impl ServerConfig {
    #[must_use]
    pub fn with_read_timeout(mut self, read_timeout: Duration) -> Self {
        self.read_timeout = read_timeout;
        self
    }

    #[must_use]
    pub fn with_read_buffer_size(mut self, read_buffer_size: usize) -> Self {
        self.read_buffer_size = read_buffer_size;
        self
    }

    /// Set the capacity of the request queue (at least 1).
    #[must_use]
    pub fn with_request_queue_capacity(mut self, request_queue_capacity: usize) -> Self {
        self.request_queue_capacity = request_queue_capacity;
        self
    }
}

/// Outcome of a port task after shutdown.
#[derive(Debug)]
pub struct Terminated {
    pub port: PortId,
    pub result: Result<()>,
}

/// _Modbus_ RTU server transport serving any number of ports.
///
/// Dropping the server without calling [`Server::shutdown`] stops all
/// ports as well, but does not wait for their tasks.
#[derive(Debug)]
pub struct Server {
    config: ServerConfig,
    requests: mpsc::Sender<Request>,
    shutdown: CancellationToken,
    _cancel_on_drop: DropGuard,
    ports: Vec<(PortId, JoinHandle<Result<()>>)>,
}

impl Server {
    /// Create a new server and the receiving end of its request queue.
    #[must_use]
    pub fn new(config: ServerConfig) -> (Self, mpsc::Receiver<Request>) {
        let (requests, receiver) = mpsc::channel(config.request_queue_capacity.max(1));
        let shutdown = CancellationToken::new();
        let server = Self {
            config,
            requests,
            _cancel_on_drop: shutdown.clone().drop_guard(),
            shutdown,
            ports: Vec::new(),
        };
        (server, receiver)
    }

    #[must_use]
    pub const fn config(&self) -> &ServerConfig {
        &self.config
    }

    /// Cancelling this token stops all ports before their next read.
    #[must_use]
    pub fn shutdown_token(&self) -> CancellationToken {
        self.shutdown.clone()
    }

    /// Open the serial device at `path` and serve it.
    #[cfg(feature = "serial")]
    pub fn listen_rtu(&mut self, path: &str, baud_rate: u32) -> Result<PortHandle> {
        let builder = tokio_serial::new(path, baud_rate).timeout(self.config.read_timeout);
        let serial = tokio_serial::SerialStream::open(&builder).map_err(|err| {
            debug!("{path}: failed to open: {err}");
            std::io::Error::from(err)
        })?;
        Ok(self.attach(path, serial))
    }

    /// Serve an already opened transport under the name `id`.
    ///
    /// Must be called within a tokio runtime.
    pub fn attach<T>(&mut self, id: impl Into<PortId>, transport: T) -> PortHandle
    where
        T: AsyncRead + AsyncWrite + Send + 'static,
    {
        let id = id.into();
        let (reader, writer) = tokio::io::split(transport);
        let port = PortHandle::new(id.clone(), writer);
        let settings = rtu::ReadSettings {
            timeout: self.config.read_timeout,
            buffer_size: self.config.read_buffer_size,
        };
        debug!("{id}: serving");
        let task = tokio::spawn(rtu::accept_serial_requests(
            port.clone(),
            reader,
            self.requests.clone(),
            settings,
            self.shutdown.child_token(),
        ));
        self.ports.push((id, task));
        port
    }

    /// Number of attached ports, including those whose task has ended.
    #[must_use]
    pub fn port_count(&self) -> usize {
        self.ports.len()
    }

    /// Stop all ports and wait for their tasks to finish.
    ///
    /// Each port stops before its next read, i.e. after at most one
    /// read timeout.
    pub async fn shutdown(self) -> Vec<Terminated> {
        let Self {
            requests,
            shutdown,
            ports,
            ..
        } = self;
        drop(requests);
        shutdown.cancel();

        let mut terminated = Vec::with_capacity(ports.len());
        for (port, task) in ports {
            let result = match task.await {
                Ok(result) => result,
                Err(err) => Err(std::io::Error::from(err).into()),
            };
            terminated.push(Terminated { port, result });
        }
        terminated
    }
}
