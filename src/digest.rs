//! Password digests.
//!
//! A digest is a pure function of the password bytes and the chosen hash.
//! All algorithms are compiled in, so digesting itself cannot fail.

use crate::scheme::HashAlgorithm;
use digest::Digest;
use md5::Md5;
use sha2::Sha256;
use sha3::Sha3_256;
use std::fmt;

/// Fixed-length digest of a password
#[derive(Clone, PartialEq, Eq)]
pub struct PasswordDigest {
    algorithm: HashAlgorithm,
    bytes: Vec<u8>,
}

impl PasswordDigest {
    pub fn algorithm(&self) -> HashAlgorithm {
        self.algorithm
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

impl fmt::Display for PasswordDigest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&hex::encode(&self.bytes))
    }
}

// Digest bytes are key material; keep them out of debug output.
impl fmt::Debug for PasswordDigest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PasswordDigest")
            .field("algorithm", &self.algorithm)
            .field("len", &self.bytes.len())
            .finish()
    }
}

/// Digest a password with the given algorithm
pub fn digest(password: &[u8], algorithm: HashAlgorithm) -> PasswordDigest {
    let bytes = match algorithm {
        HashAlgorithm::Sha256 => sha256(password).to_vec(),
        HashAlgorithm::Md5 => md5(password).to_vec(),
        HashAlgorithm::Sha3 => Sha3_256::digest(password).to_vec(),
        HashAlgorithm::Blake3 => blake3::hash(password).as_bytes().to_vec(),
    };
    PasswordDigest { algorithm, bytes }
}

pub fn sha256(data: &[u8]) -> [u8; 32] {
    Sha256::digest(data).into()
}

pub fn md5(data: &[u8]) -> [u8; 16] {
    Md5::digest(data).into()
}

/// Output length of an algorithm in bytes
pub fn output_len(algorithm: HashAlgorithm) -> usize {
    match algorithm {
        HashAlgorithm::Md5 => 16,
        HashAlgorithm::Sha256 | HashAlgorithm::Sha3 | HashAlgorithm::Blake3 => 32,
    }
}
