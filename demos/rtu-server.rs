// SPDX-FileCopyrightText: Copyright (c) 2017-2024 slowtec GmbH <post@slowtec.de>
// SPDX-License-Identifier: MIT OR Apache-2.0

//! RTU server example
//!
//! Answers "Read Holding Registers" with zeros and everything else with
//! an "Illegal function" exception until Ctrl-C is pressed. Register
//! counts outside 1..=125 are refused as an illegal data value.

use modbus_rtu_server::{
    bytes::{BufMut as _, BytesMut},
    server::{Request, Server, ServerConfig},
    Exception, Framer as _, RtuFrame,
};

const READ_HOLDING_REGISTERS: u8 = 0x03;

/// Largest register count a single response can carry.
const MAX_READ_REGISTERS: u8 = 125;

fn respond(request: &RtuFrame) -> RtuFrame {
    let mut response = request.clone();
    match (request.function, &request.data[..]) {
        (READ_HOLDING_REGISTERS, [_, _, hi, lo]) => {
            let count = u16::from_be_bytes([*hi, *lo]);
            match u8::try_from(count) {
                Ok(count) if (1..=MAX_READ_REGISTERS).contains(&count) => {
                    let byte_count = count * 2;
                    let mut data = BytesMut::with_capacity(1 + usize::from(byte_count));
                    data.put_u8(byte_count);
                    data.put_bytes(0, usize::from(byte_count));
                    response.set_data(data.freeze());
                }
                _ => response.set_exception(Exception::IllegalDataValue),
            }
        }
        _ => response.set_exception(Exception::IllegalFunction),
    }
    response
}

async fn handle(request: Request) {
    let Request { port, frame } = request;
    if frame.is_broadcast() {
        return;
    }
    let response = respond(&frame);
    if let Err(err) = port.send(&response).await {
        eprintln!("{port}: failed to send response: {err}");
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();

    let path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "/dev/ttyUSB0".to_owned());
    let (mut server, mut requests) = Server::new(ServerConfig::default());
    server.listen_rtu(&path, 19200)?;
    println!("Serving {path}...");

    loop {
        tokio::select! {
            request = requests.recv() => match request {
                Some(request) => handle(request).await,
                None => break,
            },
            _ = tokio::signal::ctrl_c() => break,
        }
    }

    println!("Shutting down...");
    for terminated in server.shutdown().await {
        if let Err(err) = terminated.result {
            eprintln!("{}: {err}", terminated.port);
        }
    }
    Ok(())
}
