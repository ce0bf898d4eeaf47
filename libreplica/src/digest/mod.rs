//! OCI Content Digest validation and computation.
//!
//! This module wraps `oci_spec::image::Digest` so digests flowing through the
//! protocol client share the crate's error handling.

use crate::error::{Result, RegistryError};
use oci_spec::image::Digest as OciDigest;
use sha2::{Digest as Sha2Digest, Sha256};
use std::fmt;
use std::str::FromStr;


/// A validated `algorithm:hex` content address, as sent in `Docker-Content-Digest`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Digest(OciDigest);

impl FromStr for Digest {
    type Err = RegistryError;

    fn from_str(s: &str) -> Result<Self> {
        let oci_digest = OciDigest::from_str(s).map_err(|e| {
            RegistryError::validation_with_source(format!("Invalid digest format: {}", s), e)
        })?;
        Ok(Digest(oci_digest))
    }
}

impl fmt::Display for Digest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl Digest {
    /// Computes the sha256 digest of `data`.
    ///
    /// # Examples
    ///
    /// ```
    /// use libreplica::Digest;
    ///
    /// let digest = Digest::sha256_of(b"").unwrap();
    /// assert_eq!(
    ///     digest.to_string(),
    ///     "sha256:e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855"
    /// );
    /// ```
    pub fn sha256_of(data: &[u8]) -> Result<Self> {
        let mut hasher = Sha256::new();
        hasher.update(data);
        Self::from_str(&format!("sha256:{:x}", hasher.finalize()))
    }

    /// Returns true when `data` hashes to this digest.
    ///
    /// Only sha256 digests are supported.
    pub fn matches(&self, data: &[u8]) -> Result<bool> {
        let rendered = self.to_string();
        if !rendered.starts_with("sha256:") {
            return Err(RegistryError::validation(format!(
                "Unsupported digest algorithm in {}. Only sha256 is currently supported",
                rendered
            )));
        }
        Ok(Self::sha256_of(data)? == *self)
    }
}
