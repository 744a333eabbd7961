//! Client-side command validation and the thin interactive loop.
//!
//! Validation happens before any bytes hit the socket: keyword, arity, and
//! the extension or type argument where the command demands one. The
//! dispatcher reuses the same parser, so a hand-rolled peer speaking the
//! wire format directly is held to the same rules.

use std::fs;
use std::io::{self, BufRead, Write};
use std::net::TcpStream;

use crate::error::{Result, StoreError};
use crate::pathmap::basename;
use crate::route::FileType;
use crate::wire::{Frame, Wire};

/// A validated client command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Upload { local: String, dest: Option<String> },
    Download { path: String },
    Remove { path: String },
    Archive { ftype: FileType },
    List { dir: Option<String> },
    Exit,
}

impl Command {
    /// Validate one raw command line.
    pub fn parse_line(line: &str) -> Result<Command> {
        let mut parts = line.split_whitespace();
        let keyword = parts
            .next()
            .ok_or_else(|| StoreError::MalformedCommand("empty command".to_string()))?;
        let args: Vec<&str> = parts.collect();
        Self::parse(keyword, &args)
    }

    /// Reconstruct a command from a received frame.
    pub fn from_frame(frame: &Frame) -> Result<Command> {
        let args: Vec<&str> = frame.arg.split_whitespace().collect();
        Self::parse(&frame.command, &args)
    }

    /// Validate a keyword with its already-split arguments.
    pub fn parse(keyword: &str, args: &[&str]) -> Result<Command> {
        match keyword {
            "uploadf" => match args {
                [local] => {
                    FileType::from_filename(basename(local))?;
                    Ok(Command::Upload {
                        local: local.to_string(),
                        dest: None,
                    })
                }
                [local, dest] => {
                    FileType::from_filename(basename(local))?;
                    Ok(Command::Upload {
                        local: local.to_string(),
                        dest: Some(dest.to_string()),
                    })
                }
                _ => Err(arity("uploadf <localfile> [destpath]")),
            },
            "downlf" => match args {
                [path] => {
                    FileType::from_filename(basename(path))?;
                    Ok(Command::Download {
                        path: path.to_string(),
                    })
                }
                _ => Err(arity("downlf <path>")),
            },
            "removef" => match args {
                [path] => {
                    FileType::from_filename(basename(path))?;
                    Ok(Command::Remove {
                        path: path.to_string(),
                    })
                }
                _ => Err(arity("removef <path>")),
            },
            "downltar" => match args {
                [kind] => match FileType::from_ext(kind) {
                    Some(FileType::Zip) => {
                        Err(StoreError::UnsupportedArchive("zip".to_string()))
                    }
                    Some(ftype) => Ok(Command::Archive { ftype }),
                    None => Err(StoreError::UnsupportedType((*kind).to_string())),
                },
                _ => Err(arity("downltar <c|pdf|txt>")),
            },
            "dispfnames" => match args {
                [] => Ok(Command::List { dir: None }),
                [dir] => Ok(Command::List {
                    dir: Some(dir.to_string()),
                }),
                _ => Err(arity("dispfnames [dirpath]")),
            },
            "exit" => match args {
                [] => Ok(Command::Exit),
                _ => Err(arity("exit")),
            },
            other => Err(StoreError::MalformedCommand(format!(
                "unknown command {:?}",
                other
            ))),
        }
    }
}

fn arity(usage: &str) -> StoreError {
    StoreError::MalformedCommand(format!("usage: {}", usage))
}

/// Connect to the front door and run the interactive loop: one command per
/// line, one request/response exchange per command.
pub fn run(addr: &str) -> Result<()> {
    let stream = TcpStream::connect(addr)
        .map_err(|e| StoreError::Unavailable(format!("{}: {}", addr, e)))?;
    let mut wire = Wire::new(stream);
    let stdin = io::stdin();
    loop {
        print!("> ");
        io::stdout().flush()?;
        let mut line = String::new();
        if stdin.lock().read_line(&mut line)? == 0 {
            break;
        }
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        let command = match Command::parse_line(line) {
            Ok(command) => command,
            Err(e) => {
                println!("{}", e);
                continue;
            }
        };
        let request = match build_request(&command) {
            Ok(request) => request,
            Err(e) => {
                println!("{}", e);
                continue;
            }
        };
        wire.send(&request)?;
        if let Command::Exit = command {
            break;
        }
        match wire.recv()? {
            Some(reply) => report(&command, &reply)?,
            None => {
                println!("server closed the connection");
                break;
            }
        }
    }
    Ok(())
}

/// Build the request frame for a command. Uploads read the local file
/// here, so a missing file is caught before anything is transmitted.
fn build_request(command: &Command) -> Result<Frame> {
    Ok(match command {
        Command::Upload { local, dest } => {
            let bytes = match fs::read(local) {
                Ok(bytes) => bytes,
                Err(e) if e.kind() == io::ErrorKind::NotFound => {
                    return Err(StoreError::NotFound(local.clone()))
                }
                Err(e) => return Err(e.into()),
            };
            let arg = match dest {
                Some(dir) => format!("{} {}", local, dir),
                None => local.clone(),
            };
            Frame::new("uploadf", &arg, bytes)
        }
        Command::Download { path } => Frame::bare("downlf", path),
        Command::Remove { path } => Frame::bare("removef", path),
        Command::Archive { ftype } => Frame::bare("downltar", ftype.as_str()),
        Command::List { dir } => Frame::bare("dispfnames", dir.as_deref().unwrap_or("")),
        Command::Exit => Frame::bare("exit", ""),
    })
}

/// Print the outcome of one exchange. Successful downloads land in the
/// current directory under the basename of the requested path.
fn report(command: &Command, reply: &Frame) -> Result<()> {
    if !reply.is_ok() {
        println!("{}: {}", reply.command, reply.arg);
        return Ok(());
    }
    match command {
        Command::Upload { local, .. } => println!("uploaded {}", local),
        Command::Remove { path } => println!("removed {}", path),
        Command::Download { path } => {
            let name = basename(path);
            fs::write(name, &reply.payload)?;
            println!("downloaded {} ({} bytes)", name, reply.payload.len());
        }
        Command::Archive { ftype } => {
            let name = format!("{}.tar", ftype);
            fs::write(&name, &reply.payload)?;
            println!("downloaded {} ({} bytes)", name, reply.payload.len());
        }
        Command::List { .. } => {
            for name in String::from_utf8_lossy(&reply.payload).lines() {
                println!("{}", name);
            }
        }
        Command::Exit => {}
    }
    Ok(())
}
