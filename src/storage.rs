//! The five storage operations every node implements against its local root.

use std::fs::{self, File};
use std::io::{self, Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};

use log::debug;
use walkdir::WalkDir;

use crate::error::{Result, StoreError};
use crate::pathmap;
use crate::route::{BackendId, FileType};

/// One node's shard, rooted at a local directory. Safe to share across
/// worker threads: every operation is a self-contained filesystem call.
pub struct Storage {
    id: BackendId,
    root: PathBuf,
}

impl Storage {
    pub fn new(id: BackendId, root: PathBuf) -> Self {
        Self { id, root }
    }

    pub fn id(&self) -> BackendId {
        self.id
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn resolve(&self, path: &str) -> Result<PathBuf> {
        pathmap::resolve(path, self.id, &self.root)
    }

    /// Write `bytes` at `path`, creating every missing parent directory.
    /// An existing file is truncated and overwritten.
    pub fn store(&self, path: &str, bytes: &[u8]) -> Result<()> {
        let target = self.resolve(path)?;
        if let Some(parent) = target.parent() {
            fs::create_dir_all(parent)?;
        }
        let mut file = File::create(&target)?;
        file.write_all(bytes)?;
        debug!("stored {} bytes at {:?}", bytes.len(), target);
        Ok(())
    }

    /// Read and return the full contents of the file at `path`.
    pub fn fetch(&self, path: &str) -> Result<Vec<u8>> {
        let target = self.resolve(path)?;
        let mut file = match File::open(&target) {
            Ok(f) => f,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                return Err(StoreError::NotFound(path.to_string()))
            }
            Err(e) => return Err(e.into()),
        };
        let mut buf = Vec::new();
        file.read_to_end(&mut buf)?;
        Ok(buf)
    }

    /// Unlink the file at `path`. Now-empty parent directories are left in
    /// place.
    pub fn delete(&self, path: &str) -> Result<()> {
        let target = self.resolve(path)?;
        match fs::remove_file(&target) {
            Ok(()) => {
                debug!("deleted {:?}", target);
                Ok(())
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                Err(StoreError::NotFound(path.to_string()))
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Names of the regular files directly in `dirpath`, grouped by class
    /// in the fixed class order and name-sorted within each class. Hidden
    /// entries, non-regular entries and unclassifiable names are omitted.
    pub fn list(&self, dirpath: &str) -> Result<Vec<String>> {
        let dir = self.resolve(dirpath)?;
        let entries = match fs::read_dir(&dir) {
            Ok(rd) => rd,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                return Err(StoreError::NotFound(dirpath.to_string()))
            }
            Err(e) => return Err(e.into()),
        };

        let mut names: Vec<(FileType, String)> = Vec::new();
        for entry in entries {
            let entry = entry?;
            if !entry.file_type()?.is_file() {
                continue;
            }
            let name = match entry.file_name().into_string() {
                Ok(name) => name,
                Err(_) => continue,
            };
            if name.starts_with('.') {
                continue;
            }
            let class = match FileType::from_filename(&name) {
                Ok(class) => class,
                Err(_) => continue,
            };
            names.push((class, name));
        }
        names.sort();
        Ok(names.into_iter().map(|(_, name)| name).collect())
    }

    /// Build a tar archive of every `ftype` file below the root, with
    /// member paths relative to the root. Only the type this node owns is
    /// archivable, and zip archives are never produced.
    ///
    /// The archive is staged in an anonymous temp file, so concurrent
    /// workers never collide and nothing is left behind on disk.
    pub fn archive(&self, ftype: FileType) -> Result<Vec<u8>> {
        if ftype == FileType::Zip {
            return Err(StoreError::UnsupportedArchive("zip".to_string()));
        }
        if ftype != self.id.owned_type() {
            return Err(StoreError::UnsupportedArchive(format!(
                "{} files are not stored on {}",
                ftype, self.id
            )));
        }

        let mut builder = tar::Builder::new(tempfile::tempfile()?);
        let mut members = 0usize;
        for entry in WalkDir::new(&self.root).into_iter().filter_map(|e| e.ok()) {
            if !entry.file_type().is_file() {
                continue;
            }
            let name = entry.file_name().to_string_lossy();
            if name.starts_with('.') || FileType::from_filename(&name).ok() != Some(ftype) {
                continue;
            }
            let rel = match entry.path().strip_prefix(&self.root) {
                Ok(rel) => rel,
                Err(_) => continue,
            };
            builder.append_path_with_name(entry.path(), rel)?;
            members += 1;
        }

        let mut staging = builder.into_inner()?;
        staging.seek(SeekFrom::Start(0))?;
        let mut bytes = Vec::new();
        staging.read_to_end(&mut bytes)?;
        debug!("archived {} {} files ({} bytes)", members, ftype, bytes.len());
        Ok(bytes)
    }
}
