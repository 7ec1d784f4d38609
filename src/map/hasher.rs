//! Whole-file content hashing (BLAKE3 by default, SHA-256 for older maps)

use crate::types::ContentHash;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fs::File;
use std::io::{self, Read};
use std::path::Path;

/// Default read size for streaming a file through the hasher.
pub const DEFAULT_CHUNK_SIZE: usize = 64 * 1024;

/// Digest used to fingerprint file contents.
///
/// Both produce 64 hex characters, so a map cannot tell them apart: switching
/// algorithms requires a forced rescan.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "lowercase")]
pub enum HashAlgorithm {
    #[default]
    Blake3,
    Sha256,
}

impl HashAlgorithm {
    pub fn name(&self) -> &'static str {
        match self {
            HashAlgorithm::Blake3 => "blake3",
            HashAlgorithm::Sha256 => "sha256",
        }
    }
}

enum ContentHasher {
    Blake3(Box<blake3::Hasher>),
    Sha256(Sha256),
}

impl ContentHasher {
    fn new(algorithm: HashAlgorithm) -> Self {
        match algorithm {
            HashAlgorithm::Blake3 => ContentHasher::Blake3(Box::new(blake3::Hasher::new())),
            HashAlgorithm::Sha256 => ContentHasher::Sha256(Sha256::new()),
        }
    }

    fn update(&mut self, data: &[u8]) {
        match self {
            ContentHasher::Blake3(hasher) => {
                hasher.update(data);
            }
            ContentHasher::Sha256(hasher) => hasher.update(data),
        }
    }

    fn finalize(self) -> ContentHash {
        match self {
            ContentHasher::Blake3(hasher) => ContentHash::from_digest(hasher.finalize().as_bytes()),
            ContentHasher::Sha256(hasher) => ContentHash::from_digest(&hasher.finalize()),
        }
    }
}

/// Hash everything `reader` yields, `chunk_size` bytes at a time.
pub fn hash_reader<R: Read>(
    mut reader: R,
    algorithm: HashAlgorithm,
    chunk_size: usize,
) -> io::Result<ContentHash> {
    let mut hasher = ContentHasher::new(algorithm);
    let mut buffer = vec![0u8; chunk_size.max(1)];
    loop {
        let read = match reader.read(&mut buffer) {
            Ok(0) => break,
            Ok(n) => n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        };
        hasher.update(&buffer[..read]);
    }
    Ok(hasher.finalize())
}

/// Stream a file from disk through the content hash.
pub fn hash_file(
    path: &Path,
    algorithm: HashAlgorithm,
    chunk_size: usize,
) -> io::Result<ContentHash> {
    let file = File::open(path)?;
    hash_reader(file, algorithm, chunk_size)
}

/// Compute content hash for in-memory bytes
pub fn compute_content_hash(content: &[u8], algorithm: HashAlgorithm) -> ContentHash {
    let mut hasher = ContentHasher::new(algorithm);
    hasher.update(content);
    hasher.finalize()
}
