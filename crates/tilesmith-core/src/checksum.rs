//! Streaming SHA256 of release tarballs.

use std::io::Read;
use std::path::{Path, PathBuf};

use sha2::{Digest, Sha256};
use tilesmith_schema::Sha256Hash;

/// Hash the file at `path` without loading it into memory.
pub async fn sha256_file(path: &Path) -> std::io::Result<Sha256Hash> {
    let path: PathBuf = path.to_path_buf();
    tokio::task::spawn_blocking(move || hash_blocking(&path))
        .await
        .map_err(std::io::Error::other)?
}

fn hash_blocking(path: &Path) -> std::io::Result<Sha256Hash> {
    let mut file = std::fs::File::open(path)?;
    let mut hasher = Sha256::new();
    let mut buffer = [0u8; 65536]; // 64KB buffer

    loop {
        let bytes_read = file.read(&mut buffer)?;
        if bytes_read == 0 {
            break;
        }
        hasher.update(&buffer[..bytes_read]);
    }

    Ok(Sha256Hash::new(hex::encode(hasher.finalize())))
}
