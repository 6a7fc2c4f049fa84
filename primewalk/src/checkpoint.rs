//! Durable snapshots of a run.
//!
//! A checkpoint file is `magic(4) | schema_version(4, LE) | sha256(body)(32) | body`, where
//! the body is the borsh encoding of a [`Snapshot`]. Saves go to a sibling `.tmp` file that
//! is synced and then renamed over the target, so a reader sees either the old file or the
//! new one. The containing directory is synced after the rename. A failed save removes the
//! `.tmp` file.

use std::fs::{self, File};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use borsh::{BorshDeserialize, BorshSerialize};
use log::{debug, warn};
use sha2::{Digest, Sha256};
use thiserror::Error;

use crate::state::{CaseState, Dimensions};
use crate::store::PointStore;

pub const CHECKPOINT_MAGIC: [u8; 4] = *b"PWCK";
pub const CHECKPOINT_SCHEMA_VERSION: u32 = 1;
const HEADER_LEN: usize = 4 + 4 + 32;

#[derive(Debug, Error)]
pub enum CheckpointError {
    #[error("io error: {0}")]
    Io(#[from] io::Error),
    #[error("checkpoint truncated at {0} bytes")]
    Truncated(usize),
    #[error("not a checkpoint file")]
    BadMagic,
    #[error("unsupported checkpoint schema version {found}")]
    UnsupportedVersion { found: u32 },
    #[error("checkpoint digest mismatch")]
    DigestMismatch,
    #[error("serialization error")]
    Serialize,
    #[error("deserialization error: {0}")]
    Deserialize(String),
}

/// One case's trajectory: its walk state and everything it has drawn so far.
#[derive(Clone, Debug, PartialEq, Eq, BorshSerialize, BorshDeserialize)]
pub struct CaseTrack {
    pub id: String,
    pub state: CaseState,
    pub store: PointStore,
}

#[derive(Clone, Debug, PartialEq, Eq, BorshSerialize, BorshDeserialize)]
pub struct Snapshot {
    /// Next iteration index to process.
    pub cursor: i64,
    /// Iteration index the run first started from; anchors the checkpoint cadence.
    pub start: i64,
    pub dimensions: Dimensions,
    pub cases: Vec<CaseTrack>,
}

impl Snapshot {
    pub fn case_ids(&self) -> impl Iterator<Item = &str> {
        self.cases.iter().map(|c| c.id.as_str())
    }

    /// SHA-256 of the borsh body, as stored in the file header.
    pub fn digest(&self) -> Result<[u8; 32], CheckpointError> {
        let body = borsh::to_vec(self).map_err(|_| CheckpointError::Serialize)?;
        Ok(hash_body(&body))
    }
}

pub fn hash_body(bytes: &[u8]) -> [u8; 32] {
    let mut h = Sha256::new();
    h.update(bytes);
    let out = h.finalize();
    let mut arr = [0u8; 32];
    arr.copy_from_slice(&out[..32]);
    arr
}

pub fn encode(snapshot: &Snapshot) -> Result<Vec<u8>, CheckpointError> {
    let body = borsh::to_vec(snapshot).map_err(|_| CheckpointError::Serialize)?;
    let mut v = Vec::with_capacity(HEADER_LEN + body.len());
    v.extend_from_slice(&CHECKPOINT_MAGIC);
    v.extend_from_slice(&CHECKPOINT_SCHEMA_VERSION.to_le_bytes());
    v.extend_from_slice(&hash_body(&body));
    v.extend_from_slice(&body);
    Ok(v)
}

pub fn decode(bytes: &[u8]) -> Result<Snapshot, CheckpointError> {
    if bytes.len() < HEADER_LEN {
        return Err(CheckpointError::Truncated(bytes.len()));
    }
    if bytes[0..4] != CHECKPOINT_MAGIC {
        return Err(CheckpointError::BadMagic);
    }
    let version = u32::from_le_bytes([bytes[4], bytes[5], bytes[6], bytes[7]]);
    if version != CHECKPOINT_SCHEMA_VERSION {
        return Err(CheckpointError::UnsupportedVersion { found: version });
    }
    let body = &bytes[HEADER_LEN..];
    if hash_body(body)[..] != bytes[8..HEADER_LEN] {
        return Err(CheckpointError::DigestMismatch);
    }
    Snapshot::try_from_slice(body).map_err(|e| CheckpointError::Deserialize(e.to_string()))
}

#[derive(Clone, Debug)]
pub struct CheckpointManager {
    path: PathBuf,
}

impl CheckpointManager {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn tmp_path(&self) -> PathBuf {
        let mut name = self.path.clone().into_os_string();
        name.push(".tmp");
        PathBuf::from(name)
    }

    /// Atomically replaces the checkpoint file. Returns the body digest.
    pub fn save(&self, snapshot: &Snapshot) -> Result<[u8; 32], CheckpointError> {
        let bytes = encode(snapshot)?;
        let parent = match self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            Some(parent) => {
                fs::create_dir_all(parent)?;
                parent
            }
            None => Path::new("."),
        };
        let tmp = self.tmp_path();
        if let Err(e) = write_then_rename(&tmp, &self.path, &bytes) {
            let _ = fs::remove_file(&tmp);
            return Err(e.into());
        }
        sync_dir(parent)?;
        let mut digest = [0u8; 32];
        digest.copy_from_slice(&bytes[8..HEADER_LEN]);
        debug!(
            "checkpoint saved: path={} cursor={} bytes={} sha256={}",
            self.path.display(),
            snapshot.cursor,
            bytes.len(),
            faster_hex::hex_string(&digest)
        );
        Ok(digest)
    }

    /// Reads the checkpoint. A missing file is `Ok(None)`; anything unreadable is an error.
    pub fn load(&self) -> Result<Option<Snapshot>, CheckpointError> {
        let bytes = match fs::read(&self.path) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };
        decode(&bytes).map(Some)
    }

    /// Like [`Self::load`], but a corrupt or unreadable checkpoint counts as absent.
    pub fn restore(&self) -> Option<Snapshot> {
        match self.load() {
            Ok(snapshot) => snapshot,
            Err(e) => {
                warn!("ignoring checkpoint {}: {e}", self.path.display());
                None
            }
        }
    }
}

fn write_then_rename(tmp: &Path, path: &Path, bytes: &[u8]) -> io::Result<()> {
    let mut file = File::create(tmp)?;
    file.write_all(bytes)?;
    file.sync_all()?;
    drop(file);
    fs::rename(tmp, path)
}

/// Makes a completed rename durable.
#[cfg(unix)]
fn sync_dir(dir: &Path) -> io::Result<()> {
    File::open(dir)?.sync_all()
}

#[cfg(not(unix))]
fn sync_dir(_dir: &Path) -> io::Result<()> {
    Ok(())
}
