//! Framed request/response format used on every TCP link.
//!
//! A frame is three ASCII header lines followed by a binary payload:
//!
//! ```text
//! <command>\n
//! <argument>\n
//! <payload length>\n
//! <payload bytes>
//! ```
//!
//! The declared length is authoritative: the reader consumes exactly that
//! many bytes after the header and then returns to header-parsing state.
//! Response frames carry a status keyword in the command slot.

use std::io::{self, BufRead, BufReader, Read, Write};
use std::net::TcpStream;

use crate::error::{Result, StoreError};

pub const STATUS_OK: &str = "ok";
pub const STATUS_NOTFOUND: &str = "notfound";
pub const STATUS_IOERROR: &str = "ioerror";
pub const STATUS_UNSUPPORTED: &str = "unsupported";
pub const STATUS_TRUNCATED: &str = "truncated";
pub const STATUS_UNAVAILABLE: &str = "unavailable";

/// One atomic header-plus-payload message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    pub command: String,
    pub arg: String,
    pub payload: Vec<u8>,
}

impl Frame {
    pub fn new(command: &str, arg: &str, payload: Vec<u8>) -> Self {
        Self {
            command: command.to_string(),
            arg: arg.to_string(),
            payload,
        }
    }

    /// A frame with an empty payload.
    pub fn bare(command: &str, arg: &str) -> Self {
        Self::new(command, arg, Vec::new())
    }

    /// A success response.
    pub fn ok(arg: &str, payload: Vec<u8>) -> Self {
        Self::new(STATUS_OK, arg, payload)
    }

    /// An error response; the argument line carries the diagnostic.
    pub fn error(err: &StoreError) -> Self {
        Self::new(err.status(), &err.to_string(), Vec::new())
    }

    pub fn is_ok(&self) -> bool {
        self.command == STATUS_OK
    }
}

/// Read one frame. Returns `None` on clean EOF before any header byte;
/// EOF anywhere inside a frame is `Truncated`.
pub fn read_frame(reader: &mut impl BufRead) -> Result<Option<Frame>> {
    let mut command = String::new();
    if reader.read_line(&mut command)? == 0 {
        return Ok(None);
    }
    chomp(&mut command);

    let mut arg = String::new();
    if reader.read_line(&mut arg)? == 0 {
        return Err(StoreError::Truncated);
    }
    chomp(&mut arg);

    let mut length = String::new();
    if reader.read_line(&mut length)? == 0 {
        return Err(StoreError::Truncated);
    }
    let length: usize = length.trim().parse().map_err(|_| {
        StoreError::MalformedCommand(format!("bad payload length {:?}", length.trim()))
    })?;

    let mut payload = vec![0u8; length];
    reader.read_exact(&mut payload).map_err(|e| {
        if e.kind() == io::ErrorKind::UnexpectedEof {
            StoreError::Truncated
        } else {
            StoreError::Io(e)
        }
    })?;

    Ok(Some(Frame {
        command,
        arg,
        payload,
    }))
}

/// Write one frame and flush it. `write_all` loops until every byte of the
/// header and payload is on the wire.
pub fn write_frame(writer: &mut impl Write, frame: &Frame) -> Result<()> {
    write!(
        writer,
        "{}\n{}\n{}\n",
        frame.command,
        frame.arg,
        frame.payload.len()
    )?;
    writer.write_all(&frame.payload)?;
    writer.flush()?;
    Ok(())
}

fn chomp(line: &mut String) {
    if line.ends_with('\n') {
        line.pop();
        if line.ends_with('\r') {
            line.pop();
        }
    }
}

/// A framed adapter over one TCP connection. Connection-scoped: never shared
/// across concurrent operations.
pub struct Wire {
    reader: BufReader<TcpStream>,
}

impl Wire {
    pub fn new(stream: TcpStream) -> Self {
        Self {
            reader: BufReader::new(stream),
        }
    }

    pub fn recv(&mut self) -> Result<Option<Frame>> {
        read_frame(&mut self.reader)
    }

    pub fn send(&mut self, frame: &Frame) -> Result<()> {
        write_frame(self.reader.get_mut(), frame)
    }
}
