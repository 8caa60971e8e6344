//! Archive checksum calculation.
//!
//! SHA-256 digests for built BSP archives, computed in a single streaming
//! pass so arbitrarily large archives never have to fit in memory.

use std::io;
use std::path::Path;

use sha2::{Digest, Sha256};
use tokio::io::AsyncReadExt;

/// Calculates the SHA-256 checksum of a file.
///
/// Reads the file in 8KB chunks and returns the uppercase hex digest, the
/// form the board-manager index has always carried.
///
/// # Arguments
///
/// * `path` - Path to the file to hash
///
/// # Returns
///
/// * `Ok(String)` - Uppercase hex-encoded SHA-256 digest (64 characters)
/// * `Err` - If the file cannot be read
pub async fn sha256_file(path: &Path) -> io::Result<String> {
    let mut file = tokio::fs::File::open(path).await?;
    let mut hasher = Sha256::new();
    let mut buffer = vec![0u8; 8192];

    loop {
        let n = file.read(&mut buffer).await?;
        if n == 0 {
            break;
        }
        hasher.update(&buffer[..n]);
    }

    Ok(hex::encode_upper(hasher.finalize()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[tokio::test]
    async fn digest_matches_known_vector() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(b"abc").unwrap();

        let digest = sha256_file(file.path()).await.unwrap();
        assert_eq!(
            digest,
            "BA7816BF8F01CFEA414140DE5DAE2223B00361A396177A9CB410FF61F20015AD"
        );
    }

    #[tokio::test]
    async fn empty_file_digest() {
        let file = tempfile::NamedTempFile::new().unwrap();

        let digest = sha256_file(file.path()).await.unwrap();
        assert_eq!(
            digest,
            "E3B0C44298FC1C149AFBF4C8996FB92427AE41E4649B934CA495991B7852B855"
        );
    }
}
