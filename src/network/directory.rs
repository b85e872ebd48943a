use std::fs::{self, OpenOptions};
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

use crate::error::NodeError;

/// Loosely consistent list of node URLs shared by every node on a host.
pub trait PeerDirectory {
    fn list_known_peers(&self) -> Result<Vec<String>, NodeError>;
    fn append_peer(&self, address: &str) -> Result<(), NodeError>;
}

/// Flat file with one URL per line; only ever appended to.
#[derive(Debug, Clone)]
pub struct FilePeerDirectory {
    path: PathBuf,
}

impl FilePeerDirectory {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }
}

impl PeerDirectory for FilePeerDirectory {
    fn list_known_peers(&self) -> Result<Vec<String>, NodeError> {
        let contents = match fs::read_to_string(&self.path) {
            Ok(contents) => contents,
            Err(err) if err.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(err) => return Err(err.into()),
        };
        Ok(contents
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .map(str::to_string)
            .collect())
    }

    fn append_peer(&self, address: &str) -> Result<(), NodeError> {
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;
        writeln!(file, "{address}")?;
        Ok(())
    }
}
