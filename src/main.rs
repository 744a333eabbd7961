use clap::{Parser, Subcommand};
use log::error;
use std::io;
use std::net::{SocketAddr, TcpListener, ToSocketAddrs};
use std::path::PathBuf;
use std::sync::Arc;

use shardfs::dispatch::{self, FrontDoor};
use shardfs::route::{BackendId, FileType};
use shardfs::storage::Storage;
use shardfs::{client, pathmap, server};

#[derive(Parser, Debug)]
#[command(version, about)]
struct Args {
    /// Enables verbose output
    #[arg(long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Cmd,
}

#[derive(Subcommand, Debug)]
enum Cmd {
    /// Run the front-door node (stores .c files, owns all client traffic)
    Front {
        /// Listen port
        port: u16,
        /// Port of the pdf node
        n2_port: u16,
        /// Port of the txt node
        n3_port: u16,
        /// Port of the zip node
        n4_port: u16,
        /// Storage root (defaults to ~/S1)
        #[arg(long)]
        root: Option<PathBuf>,
        /// Host the storage nodes are reachable on
        #[arg(long, default_value = "127.0.0.1")]
        backend_host: String,
    },
    /// Run a pure storage node for one file type
    Node {
        /// Listen port
        port: u16,
        /// File type this node owns: pdf, txt or zip
        file_type: String,
        /// Storage root (defaults to ~/S2, ~/S3 or ~/S4)
        #[arg(long)]
        root: Option<PathBuf>,
    },
    /// Connect to a front-door node and run the interactive client
    Client {
        /// Front-door port
        port: u16,
        /// Front-door host
        #[arg(long, default_value = "127.0.0.1")]
        host: String,
    },
}

fn resolve(host: &str, port: u16) -> io::Result<SocketAddr> {
    (host, port).to_socket_addrs()?.next().ok_or_else(|| {
        io::Error::new(
            io::ErrorKind::NotFound,
            format!("no address for {}:{}", host, port),
        )
    })
}

fn bind(port: u16) -> TcpListener {
    match TcpListener::bind(("0.0.0.0", port)) {
        Ok(listener) => listener,
        Err(e) => {
            error!("failed to bind port {}: {}", port, e);
            std::process::exit(1);
        }
    }
}

fn main() {
    let args = Args::parse();
    let mut builder = env_logger::Builder::new();
    builder.filter_level(log::LevelFilter::Error);
    if args.verbose {
        builder.filter_level(log::LevelFilter::Debug);
    }
    builder.init();

    match args.command {
        Cmd::Front {
            port,
            n2_port,
            n3_port,
            n4_port,
            root,
            backend_host,
        } => {
            let addrs: Result<Vec<SocketAddr>, io::Error> = [n2_port, n3_port, n4_port]
                .iter()
                .map(|&p| resolve(&backend_host, p))
                .collect();
            let addrs = match addrs {
                Ok(addrs) => addrs,
                Err(e) => {
                    error!("cannot resolve backend host {}: {}", backend_host, e);
                    std::process::exit(1);
                }
            };
            let root = root.unwrap_or_else(|| pathmap::default_root(BackendId::N1));
            let local = Storage::new(BackendId::N1, root);
            let front = Arc::new(FrontDoor::new(local, addrs[0], addrs[1], addrs[2]));
            dispatch::serve_front(bind(port), front);
        }
        Cmd::Node {
            port,
            file_type,
            root,
        } => {
            let ftype = match FileType::from_ext(&file_type) {
                Some(ftype) if ftype != FileType::C => ftype,
                _ => {
                    error!("node type must be pdf, txt or zip (c lives on the front door)");
                    std::process::exit(2);
                }
            };
            let id = ftype.backend();
            let root = root.unwrap_or_else(|| pathmap::default_root(id));
            server::serve_node(bind(port), Arc::new(Storage::new(id, root)));
        }
        Cmd::Client { port, host } => {
            if let Err(e) = client::run(&format!("{}:{}", host, port)) {
                error!("{}", e);
                std::process::exit(1);
            }
        }
    }
}
