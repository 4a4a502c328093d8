//! BLAKE3 file hasher with streaming support.
//!
//! # Overview
//!
//! [`Hasher`] provides the I/O primitives behind the two hashing tiers:
//!
//! - [`Hasher::prehash`] digests at most the first [`PREHASH_SIZE`] bytes.
//!   A file that yields no bytes at all maps to [`PrefixDigest::EmptyRead`].
//! - [`Hasher::full_hash`] streams the whole file in [`CHUNK_SIZE`] reads and
//!   checks the cancellation token before every read.
//! - [`Hasher::contents_equal`] compares two files byte for byte, chunk by
//!   chunk, for paranoid verification.
//!
//! All digests are computed over the raw byte stream; nothing is decoded.
//! For a file no longer than [`PREHASH_SIZE`] the prefix digest and the
//! full digest are identical.

use std::fs::File;
use std::io::{self, Read};
use std::path::Path;

use super::HashError;
use crate::cancel::CancelToken;

/// BLAKE3 digest.
pub type Hash = [u8; 32];

/// Number of leading bytes hashed by the prefix tier.
pub const PREHASH_SIZE: usize = 4096;

/// Read size for streaming hashes and byte comparison.
pub const CHUNK_SIZE: usize = 64 * 1024;

/// Result of the prefix tier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PrefixDigest {
    /// The file produced no readable bytes.
    EmptyRead,
    /// Digest of the bytes that were read.
    Digest(Hash),
}

/// Streaming hasher shared by all hashing workers.
#[derive(Debug, Clone, Default)]
pub struct Hasher {
    cancel: Option<CancelToken>,
}

impl Hasher {
    /// Create a hasher that never observes cancellation.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Abandon long reads once the token is cancelled.
    #[must_use]
    pub fn with_cancel_token(mut self, token: CancelToken) -> Self {
        self.cancel = Some(token);
        self
    }

    fn check_cancelled(&self, path: &Path) -> Result<(), HashError> {
        if self.cancel.as_ref().is_some_and(CancelToken::is_cancelled) {
            return Err(HashError::Cancelled(path.to_path_buf()));
        }
        Ok(())
    }

    /// Digest the first [`PREHASH_SIZE`] bytes of a file.
    ///
    /// # Errors
    ///
    /// Returns [`HashError`] if the file cannot be opened or read.
    pub fn prehash(&self, path: &Path) -> Result<PrefixDigest, HashError> {
        self.check_cancelled(path)?;

        let file = File::open(path).map_err(|e| HashError::from_io(path, e))?;
        let mut buffer = Vec::with_capacity(PREHASH_SIZE);
        file.take(PREHASH_SIZE as u64)
            .read_to_end(&mut buffer)
            .map_err(|e| HashError::from_io(path, e))?;

        if buffer.is_empty() {
            return Ok(PrefixDigest::EmptyRead);
        }
        Ok(PrefixDigest::Digest(*blake3::hash(&buffer).as_bytes()))
    }

    /// Digest the entire content of a file.
    ///
    /// # Errors
    ///
    /// Returns [`HashError::Cancelled`] if the token is set between chunks,
    /// or another [`HashError`] if the file cannot be read.
    pub fn full_hash(&self, path: &Path) -> Result<Hash, HashError> {
        self.check_cancelled(path)?;

        let file = File::open(path).map_err(|e| HashError::from_io(path, e))?;
        self.hash_stream(path, file)
    }

    /// Digest everything `reader` yields, checking the token before each chunk.
    fn hash_stream(&self, path: &Path, mut reader: impl Read) -> Result<Hash, HashError> {
        let mut hasher = blake3::Hasher::new();
        let mut buffer = vec![0u8; CHUNK_SIZE];

        loop {
            self.check_cancelled(path)?;
            let read = read_retrying(&mut reader, &mut buffer).map_err(|e| HashError::from_io(path, e))?;
            if read == 0 {
                break;
            }
            hasher.update(&buffer[..read]);
        }

        Ok(*hasher.finalize().as_bytes())
    }

    /// Compare two files byte for byte.
    ///
    /// # Errors
    ///
    /// Returns [`HashError`] if either file cannot be read, or
    /// [`HashError::Cancelled`] if the token is set between chunks.
    pub fn contents_equal(&self, a: &Path, b: &Path) -> Result<bool, HashError> {
        let mut file_a = File::open(a).map_err(|e| HashError::from_io(a, e))?;
        let mut file_b = File::open(b).map_err(|e| HashError::from_io(b, e))?;
        let mut buf_a = vec![0u8; CHUNK_SIZE];
        let mut buf_b = vec![0u8; CHUNK_SIZE];

        loop {
            self.check_cancelled(a)?;
            let read_a = read_full(&mut file_a, &mut buf_a).map_err(|e| HashError::from_io(a, e))?;
            let read_b = read_full(&mut file_b, &mut buf_b).map_err(|e| HashError::from_io(b, e))?;

            if read_a != read_b || buf_a[..read_a] != buf_b[..read_b] {
                return Ok(false);
            }
            if read_a == 0 {
                return Ok(true);
            }
        }
    }
}

/// One read, retried on `Interrupted`.
fn read_retrying(reader: &mut impl Read, buffer: &mut [u8]) -> io::Result<usize> {
    loop {
        match reader.read(buffer) {
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            other => return other,
        }
    }
}

/// Fill the buffer unless EOF comes first; returns the number of bytes read.
fn read_full(reader: &mut impl Read, buffer: &mut [u8]) -> io::Result<usize> {
    let mut filled = 0;
    while filled < buffer.len() {
        let read = read_retrying(reader, &mut buffer[filled..])?;
        if read == 0 {
            break;
        }
        filled += read;
    }
    Ok(filled)
}

/// Lowercase hexadecimal rendering of a digest.
#[must_use]
pub fn hash_to_hex(hash: &Hash) -> String {
    hash.iter().map(|b| format!("{b:02x}")).collect()
}
