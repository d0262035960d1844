//! Content hashing for fingerprinted file names.

use std::fmt;
use std::fs;
use std::path::Path;
use std::str::FromStr;

use md5::Md5;
use serde::Deserialize;
use sha1::Sha1;
use sha2::{Digest, Sha256};
use tracing::trace;

use crate::error::{CachetError, Result};

/// Hash algorithm used to fingerprint file content.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Algorithm {
    /// MD5, the historical default for filename fingerprinting.
    #[default]
    Md5,
    Sha1,
    Sha256,
}

impl FromStr for Algorithm {
    type Err = CachetError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "md5" => Ok(Algorithm::Md5),
            "sha1" => Ok(Algorithm::Sha1),
            "sha256" => Ok(Algorithm::Sha256),
            other => Err(CachetError::UnsupportedAlgorithm(other.to_string())),
        }
    }
}

impl fmt::Display for Algorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Algorithm::Md5 => write!(f, "md5"),
            Algorithm::Sha1 => write!(f, "sha1"),
            Algorithm::Sha256 => write!(f, "sha256"),
        }
    }
}

/// Computes the lowercase hex digest of `content` under `algorithm`.
///
/// Pure function of the content: the same input always yields the same
/// digest.
///
/// ## Examples
///
/// ```rust
/// use cachet_lib::hash::{hash_content, Algorithm};
///
/// let digest = hash_content("define(\"app\", [], function(){});", Algorithm::Md5);
/// assert_eq!(digest.len(), 32);
/// assert_eq!(digest, hash_content("define(\"app\", [], function(){});", Algorithm::Md5));
/// ```
pub fn hash_content(content: &str, algorithm: Algorithm) -> String {
    match algorithm {
        Algorithm::Md5 => format!("{:x}", Md5::digest(content.as_bytes())),
        Algorithm::Sha1 => format!("{:x}", Sha1::digest(content.as_bytes())),
        Algorithm::Sha256 => format!("{:x}", Sha256::digest(content.as_bytes())),
    }
}

/// Computes the lowercase hex digest of the file at `path`.
///
/// Reads the full content as UTF-8; a missing or unreadable file
/// propagates as [`CachetError::Io`].
pub fn hash_file(path: &Path, algorithm: Algorithm) -> Result<String> {
    trace!(file = %path.display(), "calculating hashsum");
    let content =
        fs::read_to_string(path).map_err(|source| CachetError::io(path, source))?;
    Ok(hash_content(&content, algorithm))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn md5_digest_is_deterministic() {
        let content = "define(\"app\", [], function(){});";
        assert_eq!(
            hash_content(content, Algorithm::Md5),
            hash_content(content, Algorithm::Md5)
        );
    }

    #[test]
    fn digests_are_lowercase_hex() {
        for algorithm in [Algorithm::Md5, Algorithm::Sha1, Algorithm::Sha256] {
            let digest = hash_content("content", algorithm);
            assert!(digest.chars().all(|c| c.is_ascii_hexdigit()));
            assert_eq!(digest, digest.to_lowercase());
        }
    }

    #[test]
    fn digest_lengths_match_algorithm() {
        assert_eq!(hash_content("x", Algorithm::Md5).len(), 32);
        assert_eq!(hash_content("x", Algorithm::Sha1).len(), 40);
        assert_eq!(hash_content("x", Algorithm::Sha256).len(), 64);
    }

    #[test]
    fn different_content_produces_different_digest() {
        assert_ne!(
            hash_content("a", Algorithm::Md5),
            hash_content("b", Algorithm::Md5)
        );
    }

    #[test]
    fn known_md5_vector() {
        // `echo -n abc | md5sum`
        assert_eq!(
            hash_content("abc", Algorithm::Md5),
            "900150983cd24fb0d6963f7d28e17f72"
        );
    }

    #[test]
    fn algorithm_from_str() {
        assert_eq!("md5".parse::<Algorithm>().unwrap(), Algorithm::Md5);
        assert_eq!("sha1".parse::<Algorithm>().unwrap(), Algorithm::Sha1);
        assert_eq!("sha256".parse::<Algorithm>().unwrap(), Algorithm::Sha256);
        assert!("crc32".parse::<Algorithm>().is_err());
    }

    #[test]
    fn hash_file_missing_path_is_io_error() {
        let err = hash_file(Path::new("/nonexistent/app.js"), Algorithm::Md5).unwrap_err();
        assert!(matches!(err, CachetError::Io { .. }));
    }
}
