use crate::primitives::{block_cipher::AesKey, make_block, AesBlock, BLOCK_SIZE};
use crate::{OreError, OreResult};
use rand::{rngs::OsRng, CryptoRng, RngCore, SeedableRng};

/// Counter-mode generator over AES-128, used to draw ciphertext nonces.
///
/// Block `n` of the stream is `AES(k, make_block(0, n))`. A generator built
/// with [`Aes128Prng::new`] has no key until it is first used, at which point
/// it draws one from the OS entropy source and starts counting from zero.
///
/// Not thread safe: each key (or each thread) should own its generator.
#[derive(Debug, Default)]
pub struct Aes128Prng {
    key: Option<AesKey>,
    counter: u64,
}

impl Aes128Prng {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_key(key: &[u8]) -> OreResult<Self> {
        Ok(Self {
            key: Some(AesKey::expand(key)?),
            counter: 0,
        })
    }

    pub fn is_seeded(&self) -> bool {
        self.key.is_some()
    }

    fn seed_if_needed(&mut self) -> OreResult<()> {
        if self.key.is_none() {
            tracing::debug!("seeding nonce generator from the OS entropy source");
            self.key = Some(AesKey::generate(&mut OsRng)?);
            self.counter = 0;
        }
        Ok(())
    }

    pub fn next_block(&mut self) -> OreResult<AesBlock> {
        self.seed_if_needed()?;
        let key = self.key.as_ref().ok_or(OreError::Randomness)?;
        let block = key.eval(&make_block(0, self.counter));
        self.counter = self.counter.wrapping_add(1);
        Ok(block)
    }
}

impl RngCore for Aes128Prng {
    fn next_u32(&mut self) -> u32 {
        let mut buf = [0u8; 4];
        self.fill_bytes(&mut buf);
        u32::from_le_bytes(buf)
    }

    fn next_u64(&mut self) -> u64 {
        let mut buf = [0u8; 8];
        self.fill_bytes(&mut buf);
        u64::from_le_bytes(buf)
    }

    fn fill_bytes(&mut self, dest: &mut [u8]) {
        if let Err(err) = self.try_fill_bytes(dest) {
            panic!("nonce generator failed: {err}");
        }
    }

    /// Each call consumes whole blocks; the unused tail of the last block is discarded.
    fn try_fill_bytes(&mut self, dest: &mut [u8]) -> Result<(), rand::Error> {
        for chunk in dest.chunks_mut(BLOCK_SIZE) {
            let block = self.next_block().map_err(rand::Error::new)?;
            chunk.copy_from_slice(&block[..chunk.len()]);
        }
        Ok(())
    }
}

impl CryptoRng for Aes128Prng {}

impl SeedableRng for Aes128Prng {
    type Seed = [u8; 16];

    fn from_seed(seed: Self::Seed) -> Self {
        Self {
            key: Some(AesKey::from_block(&AesBlock::from(seed))),
            counter: 0,
        }
    }
}
