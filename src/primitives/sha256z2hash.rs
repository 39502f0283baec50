use super::{AesBlock, Hash, HashKey};
use sha2::{Digest, Sha256};

/// Random oracle onto Z2 built from SHA-256: H(k, x) = lsb(SHA-256(k || x)).
#[derive(Debug)]
pub struct Sha256Z2Hash {
    value: HashKey,
}

impl Hash for Sha256Z2Hash {
    fn new(value: &HashKey) -> Self {
        Self { value: *value }
    }

    fn hash(&self, key: &AesBlock) -> u8 {
        let mut hasher = Sha256::new();
        hasher.update(key);
        hasher.update(self.value);
        hasher.finalize()[0] & 1u8
    }

    fn hash_all(&self, keys: &[AesBlock]) -> Vec<u8> {
        keys.iter().map(|key| self.hash(key)).collect()
    }
}
