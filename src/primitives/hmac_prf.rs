use super::Prf;
use crate::{OreError, OreResult};
use hmac::{Hmac, Mac};
use sha2::Sha256;
use std::fmt;
use zeroize::{Zeroize, ZeroizeOnDrop};

/// Variable-length PRF: HMAC-SHA256 under a 256-bit key.
///
/// Unlike [`super::prf::Aes128Prf`] this accepts inputs of any length, so the
/// basic scheme can encrypt plaintexts wider than 64 bits with it.
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct HmacSha256Prf {
    key: [u8; 32],
}

impl Prf for HmacSha256Prf {
    const KEY_SIZE: usize = 32;
    const OUTPUT_SIZE: usize = 32;
    const INPUT_SIZE: Option<usize> = None;

    fn new(key: &[u8]) -> OreResult<Self> {
        OreError::check_len(Self::KEY_SIZE, key.len())?;
        let mut buf = [0u8; 32];
        buf.copy_from_slice(key);
        Ok(Self { key: buf })
    }

    fn eval(&self, dst: &mut [u8], src: &[u8]) -> OreResult<()> {
        OreError::check_len(Self::OUTPUT_SIZE, dst.len())?;
        let mut mac = Hmac::<Sha256>::new_from_slice(&self.key).map_err(|_| {
            OreError::InvalidLength {
                expected: Self::KEY_SIZE,
                actual: self.key.len(),
            }
        })?;
        mac.update(src);
        dst.copy_from_slice(&mac.finalize().into_bytes());
        Ok(())
    }
}

impl fmt::Debug for HmacSha256Prf {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("HmacSha256Prf { .. }")
    }
}
