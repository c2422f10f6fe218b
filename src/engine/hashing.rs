//! Byte source and digest function used by the hash workers.

use memmap2::Mmap;
use std::fmt::Display;
use std::fs::File;
use std::io::{self, Read};

use crate::Job;
use crate::utils::config::HashingConsts;

/// Produces the full content of a job's file.
///
/// Called concurrently from independent workers on independent jobs, so implementations
/// must not share mutable state across calls. The call blocks the worker until data is
/// available or the read fails.
pub trait ByteSource: Send + Sync {
    type Bytes: AsRef<[u8]>;

    fn read(&self, job: &Job) -> io::Result<Self::Bytes>;
}

/// Pure mapping from bytes to a fixed-size digest. Total and deterministic.
pub trait Digester: Send + Sync {
    type Output: Display + Send + 'static;

    fn digest(&self, bytes: &[u8]) -> Self::Output;
}

/// Content of a file read by [`FsSource`].
pub enum FileBytes {
    Mapped(Mmap),
    Buffered(Vec<u8>),
}

impl AsRef<[u8]> for FileBytes {
    fn as_ref(&self) -> &[u8] {
        match self {
            FileBytes::Mapped(m) => &m[..],
            FileBytes::Buffered(v) => v.as_slice(),
        }
    }
}

/// Reads files from the local filesystem. Memory-maps non-empty regular files; empty and special
/// files (pipes, procfs entries reporting size 0) are read into a buffer.
#[derive(Clone, Copy, Debug, Default)]
pub struct FsSource;

impl ByteSource for FsSource {
    type Bytes = FileBytes;

    fn read(&self, job: &Job) -> io::Result<FileBytes> {
        let file = File::open(&job.path)?;
        let meta = file.metadata()?;
        if meta.is_dir() {
            return Err(io::Error::new(io::ErrorKind::IsADirectory, "Is a directory"));
        }
        let size = meta.len();

        if meta.is_file() && size > 0 {
            // SAFETY: the map is read-only and dropped before the worker takes its next job.
            let mmap = unsafe { Mmap::map(&file)? };
            return Ok(FileBytes::Mapped(mmap));
        }

        let mut reader = io::BufReader::with_capacity(HashingConsts::HASH_READ_CHUNK_SIZE, file);
        let mut buffer = Vec::new();
        reader.read_to_end(&mut buffer)?;
        Ok(FileBytes::Buffered(buffer))
    }
}

/// Blake3 digest; displays as 64 lowercase hex characters.
#[derive(Clone, Copy, Debug, Default)]
pub struct Blake3Digester;

impl Digester for Blake3Digester {
    type Output = blake3::Hash;

    fn digest(&self, bytes: &[u8]) -> blake3::Hash {
        // Blake3 already uses SIMD internally; rayon splitting only pays off for big inputs.
        if bytes.len() as u64 > HashingConsts::RAYON_HASH_THRESHOLD {
            let mut hasher = blake3::Hasher::new();
            hasher.update_rayon(bytes);
            hasher.finalize()
        } else {
            blake3::hash(bytes)
        }
    }
}

/// Hash a single file with the default source and digester.
pub fn hash_file(job: &Job) -> io::Result<blake3::Hash> {
    let bytes = FsSource.read(job)?;
    Ok(Blake3Digester.digest(bytes.as_ref()))
}
