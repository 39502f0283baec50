pub mod block_cipher;
pub mod hash;
pub mod hmac_prf;
pub mod prf;
pub mod prng;
pub mod prp;
pub mod sha256z2hash;

use crate::{OreError, OreResult};
use aes::Block;
use byteorder::{ByteOrder, LittleEndian};
use rand::{CryptoRng, RngCore};
use zeroize::Zeroizing;

pub type AesBlock = Block;
pub type HashKey = AesBlock;
pub const BLOCK_SIZE: usize = 16;
pub const NONCE_SIZE: usize = 16;

/// Packs two 64-bit words into an AES block: `lo` fills the first eight
/// bytes and `hi` the last eight, both little-endian.
#[inline]
pub fn make_block(hi: u64, lo: u64) -> AesBlock {
    let mut block = AesBlock::default();
    LittleEndian::write_u64(&mut block[0..8], lo);
    LittleEndian::write_u64(&mut block[8..16], hi);
    block
}

/// The first eight bytes of a block read as a little-endian word.
#[inline]
pub(crate) fn low_word(block: &AesBlock) -> u64 {
    LittleEndian::read_u64(&block[0..8])
}

/// Fills `buf` from the entropy source. A failed or short read is fatal to the call.
pub(crate) fn fill_random<R: RngCore + CryptoRng>(rng: &mut R, buf: &mut [u8]) -> OreResult<()> {
    rng.try_fill_bytes(buf).map_err(|err| {
        tracing::warn!(error = %err, len = buf.len(), "entropy source failed");
        OreError::Randomness
    })
}

/// A keyed pseudorandom function.
///
/// Implementations are selected when a secret key is constructed. `INPUT_SIZE`
/// is `Some(n)` for fixed-width functions which only accept `n`-byte inputs.
pub trait Prf: Sized {
    const KEY_SIZE: usize;
    const OUTPUT_SIZE: usize;
    const INPUT_SIZE: Option<usize>;

    fn new(key: &[u8]) -> OreResult<Self>;

    fn generate<R: RngCore + CryptoRng>(rng: &mut R) -> OreResult<Self> {
        let mut key = Zeroizing::new(vec![0u8; Self::KEY_SIZE]);
        fill_random(rng, &mut key)?;
        Self::new(&key)
    }

    /// Evaluates the PRF on `src`, writing exactly `OUTPUT_SIZE` bytes to `dst`.
    fn eval(&self, dst: &mut [u8], src: &[u8]) -> OreResult<()>;
}

/// Random oracle onto Z2, keyed by the value it is evaluated against.
///
/// `new` fixes the value (the ciphertext nonce) so that many keys can be
/// hashed against it in one batch.
pub trait Hash: Sized {
    fn new(value: &HashKey) -> Self;
    fn hash(&self, key: &AesBlock) -> u8;
    fn hash_all(&self, keys: &[AesBlock]) -> Vec<u8>;

    fn eval(key: &AesBlock, value: &HashKey) -> u8 {
        Self::new(value).hash(key)
    }
}
