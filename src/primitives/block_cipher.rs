use crate::primitives::{fill_random, AesBlock};
use crate::{OreError, OreResult};
use aes::cipher::{BlockEncrypt, KeyInit};
use aes::Aes128;
use rand::{CryptoRng, RngCore};
use std::fmt;
use zeroize::{ZeroizeOnDrop, Zeroizing};

/// An expanded AES-128 key.
///
/// This is the fixed-block primitive everything else is built on. Batched
/// evaluation gives exactly the same results as evaluating each block on its
/// own, it only lets the backend pipeline the rounds.
#[derive(Clone, ZeroizeOnDrop)]
pub struct AesKey {
    cipher: Aes128,
}

impl AesKey {
    pub const KEY_SIZE: usize = 16;

    /// Samples a fresh key from the entropy source.
    pub fn generate<R: RngCore + CryptoRng>(rng: &mut R) -> OreResult<Self> {
        let mut key = Zeroizing::new([0u8; Self::KEY_SIZE]);
        fill_random(rng, &mut key[..])?;
        Self::expand(&key[..])
    }

    /// Runs the key schedule on raw key bytes.
    pub fn expand(key: &[u8]) -> OreResult<Self> {
        OreError::check_len(Self::KEY_SIZE, key.len())?;
        let cipher = Aes128::new_from_slice(key).map_err(|_| OreError::InvalidLength {
            expected: Self::KEY_SIZE,
            actual: key.len(),
        })?;
        Ok(Self { cipher })
    }

    /// Uses a (pseudorandom) block as key material.
    pub fn from_block(block: &AesBlock) -> Self {
        Self { cipher: Aes128::new(block) }
    }

    #[inline]
    pub fn encrypt_block(&self, block: &mut AesBlock) {
        self.cipher.encrypt_block(block);
    }

    #[inline]
    pub fn eval(&self, block: &AesBlock) -> AesBlock {
        let mut out = *block;
        self.cipher.encrypt_block(&mut out);
        out
    }

    /// Encrypts every block in place under the one key schedule.
    pub fn encrypt_blocks(&self, blocks: &mut [AesBlock]) {
        self.cipher.encrypt_blocks(blocks);
    }
}

impl fmt::Debug for AesKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("AesKey { .. }")
    }
}
