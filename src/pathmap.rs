//! Path translation between the client-visible namespace and node-local
//! disk paths.
//!
//! Clients address everything under `~/S1/...` (or as a bare name relative
//! to that root). The front door rewrites the root segment for the node that
//! owns the file's class; the node resolves the leading `~` against its own
//! home. Intermediate segments pass through verbatim: no normalization, no
//! symlink resolution.

use std::path::{Path, PathBuf};

use crate::error::{Result, StoreError};
use crate::route::BackendId;

const SEGMENTS: [&str; 4] = ["S1", "S2", "S3", "S4"];

/// Rewrite a client-visible path for the node that owns the file type.
///
/// A relative path is anchored under the target's default root. An anchored
/// path has its root segment replaced by the target's segment. An absolute
/// path not anchored at a recognized root is malformed.
pub fn rewrite(logical: &str, target: BackendId) -> Result<String> {
    if let Some(rest) = logical.strip_prefix("~/") {
        let (first, tail) = match rest.split_once('/') {
            Some((first, tail)) => (first, Some(tail)),
            None => (rest, None),
        };
        if !SEGMENTS.contains(&first) {
            return Err(StoreError::MalformedPath(logical.to_string()));
        }
        Ok(match tail {
            Some(tail) if !tail.is_empty() => format!("~/{}/{}", target.segment(), tail),
            _ => format!("~/{}", target.segment()),
        })
    } else if logical.starts_with('/') || logical == "~" {
        Err(StoreError::MalformedPath(logical.to_string()))
    } else {
        Ok(format!("~/{}/{}", target.segment(), logical))
    }
}

/// Resolve a rewritten path onto this node's root directory. Paths anchored
/// at another node's segment never belong here.
pub fn resolve(physical: &str, own: BackendId, root: &Path) -> Result<PathBuf> {
    let anchor = format!("~/{}", own.segment());
    if physical == anchor {
        return Ok(root.to_path_buf());
    }
    match physical.strip_prefix(&format!("{}/", anchor)) {
        Some("") => Ok(root.to_path_buf()),
        Some(rest) => Ok(root.join(rest)),
        None => Err(StoreError::MalformedPath(physical.to_string())),
    }
}

/// Final component of a `/`-separated path.
pub fn basename(path: &str) -> &str {
    path.rsplit('/').next().unwrap_or(path)
}

/// Default root for a node: `~/Sx` under the node's home.
pub fn default_root(id: BackendId) -> PathBuf {
    let home = std::env::var("HOME").unwrap_or_else(|_| String::from("/root"));
    Path::new(&home).join(id.segment())
}
