use std::fs::File;
use std::io::Read;
use std::path::Path;

use crate::error::HashError;

const CHUNK_SIZE: usize = 64 * 1024; // 64 KB

/// Content digest of one file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileDigest {
    /// Lowercase hex MD5.
    pub hash: String,
    /// Number of bytes hashed.
    pub size: u64,
}

/// Hash a file's full contents, streaming in fixed-size chunks.
pub fn hash_file(path: &Path) -> Result<FileDigest, HashError> {
    let mut file = File::open(path).map_err(|source| HashError::Open {
        path: path.to_path_buf(),
        source,
    })?;
    hash_reader(&mut file).map_err(|source| HashError::Read {
        path: path.to_path_buf(),
        source,
    })
}

/// Hash everything a reader yields.
pub fn hash_reader<R: Read + ?Sized>(reader: &mut R) -> std::io::Result<FileDigest> {
    let mut context = md5::Context::new();
    let mut buf = vec![0u8; CHUNK_SIZE];
    let mut size: u64 = 0;

    loop {
        let n = match reader.read(&mut buf) {
            Ok(0) => break,
            Ok(n) => n,
            Err(e) if e.kind() == std::io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        };
        context.consume(&buf[..n]);
        size += n as u64;
    }

    Ok(FileDigest {
        hash: format!("{:x}", context.compute()),
        size,
    })
}

#[cfg(test)]
#[path = "tests/hasher_tests.rs"]
mod tests;
