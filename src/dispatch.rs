//! The front-door dispatcher: parses one client command per iteration,
//! executes it locally or against the owning backend, and relays the
//! response. Backend sharding stays invisible to the client.

use std::net::{SocketAddr, TcpListener, TcpStream};
use std::sync::Arc;
use std::thread;

use log::{debug, error, info};

use crate::client::Command;
use crate::error::{Result, StoreError};
use crate::pathmap::{self, basename};
use crate::route::{route, BackendId, FileType};
use crate::storage::Storage;
use crate::wire::{Frame, Wire, STATUS_NOTFOUND, STATUS_OK};

/// Front-door state shared by every client worker: the local `.c` shard
/// plus the dial addresses of the three storage backends.
pub struct FrontDoor {
    local: Storage,
    n2: SocketAddr,
    n3: SocketAddr,
    n4: SocketAddr,
}

impl FrontDoor {
    pub fn new(local: Storage, n2: SocketAddr, n3: SocketAddr, n4: SocketAddr) -> Self {
        Self { local, n2, n3, n4 }
    }

    fn peer(&self, id: BackendId) -> Result<SocketAddr> {
        match id {
            BackendId::N2 => Ok(self.n2),
            BackendId::N3 => Ok(self.n3),
            BackendId::N4 => Ok(self.n4),
            BackendId::N1 => Err(StoreError::Unavailable(
                "N1 does not dial itself".to_string(),
            )),
        }
    }

    /// One dial, one exchange, close. Connections are never pooled; any
    /// wire failure on the backend link surfaces as the backend being
    /// unavailable.
    fn exchange(&self, id: BackendId, request: &Frame) -> Result<Frame> {
        let addr = self.peer(id)?;
        let stream = TcpStream::connect(addr)
            .map_err(|e| StoreError::Unavailable(format!("{} at {}: {}", id, addr, e)))?;
        let mut wire = Wire::new(stream);
        wire.send(request)
            .map_err(|_| StoreError::Unavailable(format!("{} dropped the request", id)))?;
        match wire.recv() {
            Ok(Some(reply)) => Ok(reply),
            Ok(None) => Err(StoreError::Unavailable(format!(
                "{} closed before replying",
                id
            ))),
            Err(_) => Err(StoreError::Unavailable(format!(
                "{} reply was cut short",
                id
            ))),
        }
    }

    /// Execute one parsed command and build the frame to send back.
    /// Backend responses, success and error alike, are relayed verbatim.
    fn dispatch(&self, command: Command, payload: Vec<u8>) -> Result<Frame> {
        match command {
            Command::Upload { local, dest } => self.upload(&local, dest.as_deref(), payload),
            Command::Download { path } => self.download(&path),
            Command::Remove { path } => self.remove(&path),
            Command::Archive { ftype } => self.archive(ftype),
            Command::List { dir } => self.list(dir.as_deref()),
            // the worker closes the connection before dispatching this
            Command::Exit => Ok(Frame::ok("", Vec::new())),
        }
    }

    fn upload(&self, local: &str, dest: Option<&str>, payload: Vec<u8>) -> Result<Frame> {
        let name = basename(local);
        let backend = route(name)?;
        let logical = match dest {
            Some(dir) => format!("{}/{}", dir.trim_end_matches('/'), name),
            None => name.to_string(),
        };
        let physical = pathmap::rewrite(&logical, backend)?;
        if backend == BackendId::N1 {
            self.local.store(&physical, &payload)?;
            Ok(Frame::ok(&physical, Vec::new()))
        } else {
            debug!("store {} on {}", physical, backend);
            self.exchange(backend, &Frame::new("store", &physical, payload))
        }
    }

    fn download(&self, path: &str) -> Result<Frame> {
        let backend = route(basename(path))?;
        let physical = pathmap::rewrite(path, backend)?;
        if backend == BackendId::N1 {
            let bytes = self.local.fetch(&physical)?;
            Ok(Frame::ok(basename(path), bytes))
        } else {
            debug!("fetch {} from {}", physical, backend);
            self.exchange(backend, &Frame::bare("fetch", &physical))
        }
    }

    fn remove(&self, path: &str) -> Result<Frame> {
        let backend = route(basename(path))?;
        let physical = pathmap::rewrite(path, backend)?;
        if backend == BackendId::N1 {
            self.local.delete(&physical)?;
            Ok(Frame::ok(&physical, Vec::new()))
        } else {
            debug!("delete {} on {}", physical, backend);
            self.exchange(backend, &Frame::bare("delete", &physical))
        }
    }

    /// zip is refused here, before any backend traffic; c archives are
    /// built on the local shard and everything else on the owning node.
    fn archive(&self, ftype: FileType) -> Result<Frame> {
        match ftype {
            FileType::Zip => Err(StoreError::UnsupportedArchive("zip".to_string())),
            FileType::C => {
                let bytes = self.local.archive(FileType::C)?;
                Ok(Frame::ok("c.tar", bytes))
            }
            other => {
                debug!("archive {} on {}", other, other.backend());
                self.exchange(other.backend(), &Frame::bare("archive", other.as_str()))
            }
        }
    }

    /// Unified listing across all four nodes, concatenated in node order so
    /// the classes come out c, pdf, txt, zip regardless of reply timing. A
    /// node without the directory contributes nothing; any other backend
    /// failure aborts the whole command.
    fn list(&self, dir: Option<&str>) -> Result<Frame> {
        let logical = dir.unwrap_or("~/S1");
        let mut names: Vec<String> = Vec::new();

        let local_path = pathmap::rewrite(logical, BackendId::N1)?;
        match self.local.list(&local_path) {
            Ok(mut local_names) => names.append(&mut local_names),
            Err(StoreError::NotFound(_)) => {}
            Err(e) => return Err(e),
        }

        for id in [BackendId::N2, BackendId::N3, BackendId::N4] {
            let physical = pathmap::rewrite(logical, id)?;
            let reply = self.exchange(id, &Frame::bare("list", &physical))?;
            match reply.command.as_str() {
                STATUS_OK => {
                    let text = String::from_utf8_lossy(&reply.payload);
                    names.extend(text.lines().map(str::to_string));
                }
                STATUS_NOTFOUND => {}
                _ => {
                    return Err(StoreError::Unavailable(format!(
                        "{} failed to list {}: {}",
                        id, physical, reply.arg
                    )))
                }
            }
        }

        Ok(Frame::ok(logical, names.join("\n").into_bytes()))
    }
}

/// Accept loop for the front door; one worker thread per client.
pub fn serve_front(listener: TcpListener, front: Arc<FrontDoor>) {
    if let Ok(addr) = listener.local_addr() {
        info!("front door on {}, local root {:?}", addr, front.local.root());
    }
    for stream in listener.incoming() {
        match stream {
            Ok(stream) => {
                let front = Arc::clone(&front);
                thread::spawn(move || {
                    if let Err(e) = serve_client(stream, &front) {
                        error!("client worker failed: {}", e);
                    }
                });
            }
            Err(e) => error!("accept failed: {}", e),
        }
    }
}

/// One client's command loop. Commands complete strictly in issue order,
/// and a command's failure is fatal to that command only.
fn serve_client(stream: TcpStream, front: &FrontDoor) -> Result<()> {
    let peer = stream.peer_addr()?;
    info!("client connected from {}", peer);
    let mut wire = Wire::new(stream);
    while let Some(frame) = wire.recv()? {
        let command = match Command::from_frame(&frame) {
            Ok(command) => command,
            Err(e) => {
                debug!("rejected {:?} from {}: {}", frame.command, peer, e);
                wire.send(&Frame::error(&e))?;
                continue;
            }
        };
        if let Command::Exit = command {
            break;
        }
        let reply = front
            .dispatch(command, frame.payload)
            .unwrap_or_else(|e| Frame::error(&e));
        wire.send(&reply)?;
    }
    info!("client {} disconnected", peer);
    Ok(())
}
