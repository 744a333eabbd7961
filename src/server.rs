//! TCP serving for a pure storage node: accept, spawn a worker per
//! connection, answer framed requests until the peer hangs up.

use std::net::{TcpListener, TcpStream};
use std::sync::Arc;
use std::thread;

use log::{debug, error, info};

use crate::error::{Result, StoreError};
use crate::pathmap::basename;
use crate::route::FileType;
use crate::storage::Storage;
use crate::wire::{Frame, Wire};

/// Accept loop. Each connection gets its own worker thread; a worker
/// failure never touches the listener or any other connection.
pub fn serve_node(listener: TcpListener, storage: Arc<Storage>) {
    if let Ok(addr) = listener.local_addr() {
        info!("{} serving {:?} on {}", storage.id(), storage.root(), addr);
    }
    for stream in listener.incoming() {
        match stream {
            Ok(stream) => {
                let storage = Arc::clone(&storage);
                thread::spawn(move || {
                    if let Err(e) = serve_conn(stream, &storage) {
                        error!("worker failed: {}", e);
                    }
                });
            }
            Err(e) => error!("accept failed: {}", e),
        }
    }
}

/// Answer framed requests on one connection until clean EOF.
fn serve_conn(stream: TcpStream, storage: &Storage) -> Result<()> {
    let peer = stream.peer_addr()?;
    debug!("connection from {}", peer);
    let mut wire = Wire::new(stream);
    while let Some(frame) = wire.recv()? {
        let reply = match execute(storage, &frame) {
            Ok(reply) => reply,
            Err(e) => {
                debug!("{} {:?} failed: {}", frame.command, frame.arg, e);
                Frame::error(&e)
            }
        };
        wire.send(&reply)?;
    }
    debug!("connection from {} closed", peer);
    Ok(())
}

/// Run the storage operation named by `frame` and build its response.
fn execute(storage: &Storage, frame: &Frame) -> Result<Frame> {
    match frame.command.as_str() {
        "store" => {
            storage.store(&frame.arg, &frame.payload)?;
            Ok(Frame::ok(&frame.arg, Vec::new()))
        }
        "fetch" => {
            let bytes = storage.fetch(&frame.arg)?;
            Ok(Frame::ok(basename(&frame.arg), bytes))
        }
        "delete" => {
            storage.delete(&frame.arg)?;
            Ok(Frame::ok(&frame.arg, Vec::new()))
        }
        "list" => {
            let names = storage.list(&frame.arg)?;
            Ok(Frame::ok(&frame.arg, names.join("\n").into_bytes()))
        }
        "archive" => {
            let ftype = FileType::from_ext(&frame.arg)
                .ok_or_else(|| StoreError::UnsupportedArchive(frame.arg.clone()))?;
            let bytes = storage.archive(ftype)?;
            Ok(Frame::ok(&format!("{}.tar", ftype), bytes))
        }
        other => Err(StoreError::MalformedCommand(format!(
            "unknown operation {:?}",
            other
        ))),
    }
}
