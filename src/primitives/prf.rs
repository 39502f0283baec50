use crate::primitives::{block_cipher::AesKey, AesBlock, Prf, BLOCK_SIZE};
use crate::{OreError, OreResult};
use zeroize::ZeroizeOnDrop;

/// Fixed-width PRF: a single AES-128 evaluation (16 byte domain and range).
#[derive(Debug, Clone, ZeroizeOnDrop)]
pub struct Aes128Prf {
    key: AesKey,
}

impl Aes128Prf {
    pub fn from_key(key: AesKey) -> Self {
        Self { key }
    }

    #[inline]
    pub fn eval_block(&self, block: &AesBlock) -> AesBlock {
        self.key.eval(block)
    }

    /// Evaluates the PRF on every block in place.
    pub fn encrypt_all(&self, data: &mut [AesBlock]) {
        self.key.encrypt_blocks(data);
    }
}

impl Prf for Aes128Prf {
    const KEY_SIZE: usize = AesKey::KEY_SIZE;
    const OUTPUT_SIZE: usize = BLOCK_SIZE;
    const INPUT_SIZE: Option<usize> = Some(BLOCK_SIZE);

    fn new(key: &[u8]) -> OreResult<Self> {
        Ok(Self { key: AesKey::expand(key)? })
    }

    fn eval(&self, dst: &mut [u8], src: &[u8]) -> OreResult<()> {
        OreError::check_len(Self::OUTPUT_SIZE, dst.len())?;
        OreError::check_len(BLOCK_SIZE, src.len())?;
        let block = self.eval_block(AesBlock::from_slice(src));
        dst.copy_from_slice(&block);
        Ok(())
    }
}
