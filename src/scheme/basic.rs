/*
 * Bitwise ORE (Chenette, Lewi, Weis, Wu).
 *
 * Bit i of the plaintext (most significant first) becomes the block
 * F(k, i || prefix) + b_i mod 2^out_blk_len, where prefix holds the bits
 * already processed. Two ciphertexts agree on every block up to the first
 * differing plaintext bit, and at that block they differ by exactly one.
 */

use crate::params::{ceil_div, BasicParams};
use crate::primitives::{prf::Aes128Prf, Prf};
use crate::scheme::{alloc_buffer, CipherTextState};
use crate::{OreCipher, OreError, OreResult};

use byteorder::{ByteOrder, LittleEndian};
use num::{BigUint, One, Zero};
use rand::{CryptoRng, RngCore};
use std::cmp::Ordering;
use std::fmt;
use zeroize::{Zeroize, Zeroizing};

/// Widest plaintext a fixed-width (16 byte input) PRF can encrypt
const MAX_FIXED_PRF_NBITS: u32 = 64;
const MAX_FIXED_PRF_MSG_LEN: usize = 8;

/// Secret key for the bitwise scheme, generic over the PRF.
pub struct BasicOre<P: Prf = Aes128Prf> {
    prf: Option<P>,
    params: BasicParams,
}

#[derive(Clone)]
pub struct BasicCipherText {
    buf: Zeroizing<Vec<u8>>,
    params: BasicParams,
    state: CipherTextState,
}

impl<P: Prf> BasicOre<P> {
    /// Builds a key from raw PRF key bytes.
    pub fn init(key: &[u8], params: BasicParams) -> OreResult<Self> {
        Self::check_params(&params)?;
        Ok(Self {
            prf: Some(P::new(key)?),
            params,
        })
    }

    fn check_params(params: &BasicParams) -> OreResult<()> {
        let max = 8 * P::OUTPUT_SIZE as u32;
        if params.out_blk_len() > max {
            tracing::debug!(out_blk_len = params.out_blk_len(), max, "out_blk_len too wide for PRF");
            return Err(OreError::InvalidParameter(format!(
                "out_blk_len must be at most {max} for this PRF (got {})",
                params.out_blk_len()
            )));
        }
        Ok(())
    }

    pub fn is_initialized(&self) -> bool {
        self.prf.is_some()
    }

    /// Encrypts a little-endian plaintext. Bytes beyond the plaintext width
    /// are ignored and a short buffer is zero extended.
    pub fn encrypt_bytes(&self, msg: &[u8]) -> OreResult<BasicCipherText> {
        let mut ctxt = BasicCipherText::init(self.params)?;
        self.encrypt_bytes_into(&mut ctxt, msg)?;
        Ok(ctxt)
    }

    pub fn encrypt_bytes_into(&self, ctxt: &mut BasicCipherText, msg: &[u8]) -> OreResult<()> {
        let prf = self.prf.as_ref().ok_or(OreError::KeyNotInitialized)?;
        ctxt.state.check_writable()?;
        if ctxt.params != self.params {
            return Err(OreError::ParamsMismatch);
        }
        if P::INPUT_SIZE.is_some()
            && (msg.len() > MAX_FIXED_PRF_MSG_LEN || self.params.nbits() > MAX_FIXED_PRF_NBITS)
        {
            return Err(OreError::UnsupportedOperation(format!(
                "a fixed-width PRF encrypts at most {MAX_FIXED_PRF_NBITS} bit plaintexts"
            )));
        }
        ctxt.state = CipherTextState::Initialized;

        let nbits = self.params.nbits() as usize;
        let out_blk_len = self.params.out_blk_len() as usize;
        let nbytes = self.params.plaintext_len();
        let block_bytes = ceil_div(out_blk_len, 8);
        let block_mask = (BigUint::one() << out_blk_len) - 1u32;

        let mut msgbuf = Zeroizing::new(vec![0u8; nbytes]);
        let n = msg.len().min(nbytes);
        msgbuf[..n].copy_from_slice(&msg[..n]);

        // Bytes 0..4 hold the bit index; the prefix is OR'd in from byte 1
        let mut input = Zeroizing::new(vec![0u8; P::INPUT_SIZE.unwrap_or(4 + nbytes)]);
        let mut output = Zeroizing::new(vec![0u8; P::OUTPUT_SIZE]);
        let mut acc = BigUint::zero();

        let offset = (8 - nbits % 8) % 8;
        for i in 0..nbits {
            let pos = i + offset;
            let byte_index = nbytes - 1 - pos / 8;
            let bit = msgbuf[byte_index] & (1u8 << (7 - pos % 8));

            prf.eval(&mut output, &input)?;

            let mut block = BigUint::from_bytes_be(&output[..block_bytes]);
            if bit != 0 {
                block += 1u32;
            }
            block &= &block_mask;
            acc |= block << ((nbits - i - 1) * out_blk_len);

            input[1 + byte_index] |= bit;
            let index = LittleEndian::read_u32(&input[0..4]).wrapping_add(1);
            LittleEndian::write_u32(&mut input[0..4], index);
        }

        let packed = Zeroizing::new(acc.to_bytes_be());
        let start = ctxt
            .buf
            .len()
            .checked_sub(packed.len())
            .ok_or(OreError::InvalidLength {
                expected: ctxt.buf.len(),
                actual: packed.len(),
            })?;
        ctxt.buf[..start].fill(0);
        ctxt.buf[start..].copy_from_slice(&packed);

        ctxt.state = CipherTextState::Populated;
        Ok(())
    }
}

impl<P: Prf> OreCipher for BasicOre<P> {
    type Params = BasicParams;
    type CipherText = BasicCipherText;

    fn setup_with_rng<R: RngCore + CryptoRng>(params: BasicParams, rng: &mut R) -> OreResult<Self> {
        Self::check_params(&params)?;
        let prf = P::generate(rng)?;
        tracing::debug!(
            nbits = params.nbits(),
            out_blk_len = params.out_blk_len(),
            "generated bitwise ORE key"
        );
        Ok(Self { prf: Some(prf), params })
    }

    fn params(&self) -> &BasicParams {
        &self.params
    }

    fn encrypt(&self, msg: u64) -> OreResult<BasicCipherText> {
        self.encrypt_bytes(&msg.to_le_bytes())
    }

    fn encrypt_into(&self, ctxt: &mut BasicCipherText, msg: u64) -> OreResult<()> {
        self.encrypt_bytes_into(ctxt, &msg.to_le_bytes())
    }

    fn compare(a: &BasicCipherText, b: &BasicCipherText) -> OreResult<Ordering> {
        a.compare(b)
    }

    fn ciphertext_size(params: &BasicParams) -> usize {
        params.ciphertext_len()
    }

    fn clear(&mut self) {
        // Dropping the PRF wipes its key
        self.prf = None;
    }
}

impl<P: Prf> fmt::Debug for BasicOre<P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BasicOre")
            .field("params", &self.params)
            .field("initialized", &self.is_initialized())
            .finish()
    }
}

impl BasicCipherText {
    /// Allocates an empty ciphertext for `params`.
    pub fn init(params: BasicParams) -> OreResult<Self> {
        Ok(Self {
            buf: alloc_buffer(params.ciphertext_len())?,
            params,
            state: CipherTextState::Initialized,
        })
    }

    pub fn from_bytes(params: BasicParams, bytes: &[u8]) -> OreResult<Self> {
        OreError::check_len(params.ciphertext_len(), bytes.len())?;
        let mut ctxt = Self::init(params)?;
        ctxt.buf.copy_from_slice(bytes);
        ctxt.state = CipherTextState::Populated;
        Ok(ctxt)
    }

    pub fn as_bytes(&self) -> OreResult<&[u8]> {
        self.state.check_populated()?;
        Ok(self.buf.as_slice())
    }

    pub fn to_bytes(&self) -> OreResult<Vec<u8>> {
        self.as_bytes().map(|bytes| bytes.to_vec())
    }

    pub fn params(&self) -> &BasicParams {
        &self.params
    }

    pub fn state(&self) -> CipherTextState {
        self.state
    }

    pub fn clear(&mut self) {
        self.buf.zeroize();
        self.state = CipherTextState::Cleared;
    }

    /// Finds the most significant block where the two ciphertexts differ. A
    /// difference of exactly one means `self` had the set bit.
    pub fn compare(&self, other: &Self) -> OreResult<Ordering> {
        self.state.check_populated()?;
        other.state.check_populated()?;
        if self.params != other.params {
            return Err(OreError::ParamsMismatch);
        }

        let nbits = self.params.nbits() as usize;
        let out_blk_len = self.params.out_blk_len() as usize;
        let modulus = BigUint::one() << out_blk_len;
        let block_mask = &modulus - 1u32;

        let a = BigUint::from_bytes_be(&self.buf);
        let b = BigUint::from_bytes_be(&other.buf);

        for i in 0..nbits {
            let shift = (nbits - i - 1) * out_blk_len;
            let block_a = (&a >> shift) & &block_mask;
            let block_b = (&b >> shift) & &block_mask;
            let diff = (block_a + &modulus - block_b) & &block_mask;

            if !diff.is_zero() {
                return Ok(if diff.is_one() {
                    Ordering::Greater
                } else {
                    Ordering::Less
                });
            }
        }
        Ok(Ordering::Equal)
    }
}

impl fmt::Debug for BasicCipherText {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BasicCipherText")
            .field("params", &self.params)
            .field("state", &self.state)
            .field("buf", &hex::encode(&self.buf[..]))
            .finish()
    }
}

impl PartialEq for BasicCipherText {
    fn eq(&self, other: &Self) -> bool {
        matches!(self.compare(other), Ok(Ordering::Equal))
    }
}

impl PartialOrd for BasicCipherText {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        self.compare(other).ok()
    }
}
