use sha3::{
    Digest,
    Sha3_256
};

/// Hash a sequence of byte strings with SHA3-256.
///
/// Every part is prefixed with its length (u64, big endian) so that the
/// concatenation is unambiguous: `["ab", "c"]` and `["a", "bc"]` differ.
pub fn sha3_digest(parts: &[Vec<u8>]) -> [u8; 32] {
    let mut hasher = Sha3_256::new();
    hasher.update((parts.len() as u64).to_be_bytes());
    for part in parts {
        hasher.update((part.len() as u64).to_be_bytes());
        hasher.update(part);
    }
    hasher.finalize().into()
}
