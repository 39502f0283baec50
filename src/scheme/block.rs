/*
 * Block ORE (Lewi-Wu) with a Feistel small-domain PRP.
 *
 * The plaintext is split into nblocks chunks of block_len bits, most
 * significant first. For chunk i with value v and prefix p (the chunks before
 * it) the left ciphertext holds F(k1, i || p || pi(v)) and pi(v), where pi is
 * a PRP keyed by F(k2, i || p). The right ciphertext holds, for every slot j,
 * the bit [pi^-1(j) <= v] masked with H(F(k1, i || p || j), nonce).
 */

use crate::params::BlockParams;
use crate::primitives::{
    block_cipher::AesKey, fill_random, hash::Aes128Z2Hash, make_block, prf::Aes128Prf,
    prng::Aes128Prng, prp::FeistelPrp, AesBlock, Hash, HashKey, Prf, BLOCK_SIZE, NONCE_SIZE,
};
use crate::scheme::{alloc_buffer, CipherTextState};
use crate::{OreCipher, OreError, OreResult};

use rand::{CryptoRng, RngCore};
use std::cell::RefCell;
use std::cmp::Ordering;
use std::fmt;
use std::marker::PhantomData;
use subtle_ng::ConstantTimeEq;
use zeroize::{Zeroize, ZeroizeOnDrop, Zeroizing};

#[derive(ZeroizeOnDrop)]
struct BlockKeys {
    prf: Aes128Prf,
    prp: AesKey,
}

/// Secret key for the Lewi-Wu scheme, generic over the random oracle used to
/// mask the right ciphertext.
///
/// Nonces for [`OreCipher::encrypt`] come from a counter generator owned by
/// the key, seeded from the OS on first use. Use
/// [`BlockOre::encrypt_with_rng`] to supply nonces from elsewhere.
pub struct BlockOre<H: Hash = Aes128Z2Hash> {
    keys: Option<BlockKeys>,
    params: BlockParams,
    nonces: RefCell<Aes128Prng>,
    _hash: PhantomData<H>,
}

pub struct BlockCipherText<H: Hash = Aes128Z2Hash> {
    left: Zeroizing<Vec<u8>>,
    right: Zeroizing<Vec<u8>>,
    params: BlockParams,
    state: CipherTextState,
    _hash: PhantomData<H>,
}

impl<H: Hash> BlockOre<H> {
    /// Builds a key from raw PRF and PRP key bytes (16 bytes each).
    pub fn init(prf_key: &[u8], prp_key: &[u8], params: BlockParams) -> OreResult<Self> {
        let keys = BlockKeys {
            prf: Aes128Prf::new(prf_key)?,
            prp: AesKey::expand(prp_key)?,
        };
        Ok(Self::from_keys(keys, params))
    }

    fn from_keys(keys: BlockKeys, params: BlockParams) -> Self {
        Self {
            keys: Some(keys),
            params,
            nonces: RefCell::new(Aes128Prng::new()),
            _hash: PhantomData,
        }
    }

    pub fn is_initialized(&self) -> bool {
        self.keys.is_some()
    }

    pub fn encrypt_with_rng<R: RngCore + CryptoRng>(
        &self,
        msg: u64,
        rng: &mut R,
    ) -> OreResult<BlockCipherText<H>> {
        let mut ctxt = BlockCipherText::init(self.params)?;
        self.encrypt_into_with_rng(&mut ctxt, msg, rng)?;
        Ok(ctxt)
    }

    pub fn encrypt_into_with_rng<R: RngCore + CryptoRng>(
        &self,
        ctxt: &mut BlockCipherText<H>,
        msg: u64,
        rng: &mut R,
    ) -> OreResult<()> {
        let keys = self.keys.as_ref().ok_or(OreError::KeyNotInitialized)?;
        ctxt.state.check_writable()?;
        if ctxt.params != self.params {
            return Err(OreError::ParamsMismatch);
        }
        ctxt.state = CipherTextState::Initialized;

        let params = &self.params;
        let nbits = params.nbits();
        let block_len = params.block_len();
        let nblocks = params.nblocks();
        let msg = if nbits == 64 { msg } else { msg & ((1u64 << nbits) - 1) };
        let chunk_mask = (1u64 << block_len) - 1;

        let (nonce, right_blocks) = ctxt.right.split_at_mut(NONCE_SIZE);
        fill_random(rng, nonce)?;
        let hasher = H::new(HashKey::from_slice(nonce));

        let left_blocks = ctxt.left.chunks_exact_mut(params.left_block_len());
        let right_blocks = right_blocks.chunks_exact_mut(params.right_block_len());

        let mut prefix = 0u64;
        for (i, (left, right)) in left_blocks.zip(right_blocks).enumerate() {
            let shift = block_len as usize * (nblocks - i - 1);
            let value = (msg >> shift) & chunk_mask;

            self.encrypt_block(keys, &hasher, i as u64, prefix, value, left, right)?;
            prefix = (prefix << block_len) | value;
        }

        ctxt.state = CipherTextState::Populated;
        Ok(())
    }

    #[allow(clippy::too_many_arguments)]
    fn encrypt_block(
        &self,
        keys: &BlockKeys,
        hasher: &H,
        index: u64,
        prefix: u64,
        value: u64,
        left: &mut [u8],
        right: &mut [u8],
    ) -> OreResult<()> {
        let block_len = self.params.block_len();
        let index_len = self.params.index_len();

        let mut prp_seed = keys.prp.eval(&make_block(index, prefix));
        let prp = FeistelPrp::from_seed(&prp_seed);
        prp_seed.as_mut_slice().zeroize();

        let pix = prp.permute(value, block_len)?;
        let prefix_shifted = prefix << block_len;

        let key = keys.prf.eval_block(&make_block(index, prefix_shifted | pix));
        left.fill(0);
        left[..BLOCK_SIZE].copy_from_slice(&key);
        left[BLOCK_SIZE..BLOCK_SIZE + index_len].copy_from_slice(&pix.to_le_bytes()[..index_len]);

        let mut ro_keys: Vec<AesBlock> = (0..self.params.nslots() as u64)
            .map(|j| make_block(index, prefix_shifted | j))
            .collect();
        keys.prf.encrypt_all(&mut ro_keys);
        let masks = hasher.hash_all(&ro_keys);
        for ro_key in ro_keys.iter_mut() {
            ro_key.as_mut_slice().zeroize();
        }

        let pi_inv = prp.invert_all(block_len)?;

        // Bit j lives in byte (len - 1 - j/8) so the vector reads as a big-endian integer
        right.fill(0);
        let len = right.len();
        for (j, (&preimage, &mask)) in pi_inv.iter().zip(masks.iter()).enumerate() {
            let bit = u8::from(preimage <= value) ^ mask;
            right[len - 1 - j / 8] |= bit << (j % 8);
        }
        Ok(())
    }
}

impl<H: Hash> OreCipher for BlockOre<H> {
    type Params = BlockParams;
    type CipherText = BlockCipherText<H>;

    fn setup_with_rng<R: RngCore + CryptoRng>(params: BlockParams, rng: &mut R) -> OreResult<Self> {
        let keys = BlockKeys {
            prf: Aes128Prf::generate(rng)?,
            prp: AesKey::generate(rng)?,
        };
        tracing::debug!(
            nbits = params.nbits(),
            block_len = params.block_len(),
            "generated block ORE key"
        );
        Ok(Self::from_keys(keys, params))
    }

    fn params(&self) -> &BlockParams {
        &self.params
    }

    fn encrypt(&self, msg: u64) -> OreResult<BlockCipherText<H>> {
        let mut ctxt = BlockCipherText::init(self.params)?;
        self.encrypt_into(&mut ctxt, msg)?;
        Ok(ctxt)
    }

    fn encrypt_into(&self, ctxt: &mut BlockCipherText<H>, msg: u64) -> OreResult<()> {
        let mut nonces = self.nonces.borrow_mut();
        self.encrypt_into_with_rng(ctxt, msg, &mut *nonces)
    }

    fn compare(a: &BlockCipherText<H>, b: &BlockCipherText<H>) -> OreResult<Ordering> {
        a.compare(b)
    }

    fn ciphertext_size(params: &BlockParams) -> usize {
        params.ciphertext_len()
    }

    fn clear(&mut self) {
        self.keys = None;
    }
}

impl<H: Hash> fmt::Debug for BlockOre<H> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BlockOre")
            .field("params", &self.params)
            .field("initialized", &self.is_initialized())
            .finish()
    }
}

impl<H: Hash> BlockCipherText<H> {
    /// Allocates an empty ciphertext for `params`.
    pub fn init(params: BlockParams) -> OreResult<Self> {
        Ok(Self {
            left: alloc_buffer(params.left_len())?,
            right: alloc_buffer(params.right_len())?,
            params,
            state: CipherTextState::Initialized,
            _hash: PhantomData,
        })
    }

    /// Parses `left || right` as produced by [`BlockCipherText::to_bytes`].
    pub fn from_bytes(params: BlockParams, bytes: &[u8]) -> OreResult<Self> {
        OreError::check_len(params.ciphertext_len(), bytes.len())?;
        let (left, right) = bytes.split_at(params.left_len());
        Self::from_parts(params, left, right)
    }

    pub fn from_parts(params: BlockParams, left: &[u8], right: &[u8]) -> OreResult<Self> {
        OreError::check_len(params.left_len(), left.len())?;
        OreError::check_len(params.right_len(), right.len())?;
        let mut ctxt = Self::init(params)?;
        ctxt.left.copy_from_slice(left);
        ctxt.right.copy_from_slice(right);
        ctxt.state = CipherTextState::Populated;
        Ok(ctxt)
    }

    pub fn left(&self) -> OreResult<&[u8]> {
        self.state.check_populated()?;
        Ok(self.left.as_slice())
    }

    /// The right ciphertext, starting with its 16 byte nonce.
    pub fn right(&self) -> OreResult<&[u8]> {
        self.state.check_populated()?;
        Ok(self.right.as_slice())
    }

    pub fn to_bytes(&self) -> OreResult<Vec<u8>> {
        self.state.check_populated()?;
        let mut bytes = Vec::new();
        bytes
            .try_reserve_exact(self.left.len() + self.right.len())
            .map_err(|_| OreError::Allocation)?;
        bytes.extend_from_slice(&self.left);
        bytes.extend_from_slice(&self.right);
        Ok(bytes)
    }

    pub fn params(&self) -> &BlockParams {
        &self.params
    }

    pub fn state(&self) -> CipherTextState {
        self.state
    }

    pub fn clear(&mut self) {
        self.left.zeroize();
        self.right.zeroize();
        self.state = CipherTextState::Cleared;
    }

    pub fn compare(&self, other: &Self) -> OreResult<Ordering> {
        self.state.check_populated()?;
        other.state.check_populated()?;
        if self.params != other.params {
            return Err(OreError::ParamsMismatch);
        }

        compare_components::<H>(&self.params, &self.left, &other.left, &other.right)
    }

    /// Compares ciphertexts stored as separate components: `left` from the
    /// first ciphertext against both components of the second.
    ///
    /// The right component alone cannot tell `Equal` from `Less`, so the
    /// second left component is needed to locate the first differing block.
    pub fn compare_parts(
        params: &BlockParams,
        left: &[u8],
        other_left: &[u8],
        other_right: &[u8],
    ) -> OreResult<Ordering> {
        OreError::check_len(params.left_len(), left.len())?;
        OreError::check_len(params.left_len(), other_left.len())?;
        OreError::check_len(params.right_len(), other_right.len())?;
        compare_components::<H>(params, left, other_left, other_right)
    }
}

fn compare_components<H: Hash>(
    params: &BlockParams,
    left: &[u8],
    other_left: &[u8],
    other_right: &[u8],
) -> OreResult<Ordering> {
    let left_block_len = params.left_block_len();
    let right_block_len = params.right_block_len();
    let index_len = params.index_len();

    let first_diff = left
        .chunks_exact(left_block_len)
        .zip(other_left.chunks_exact(left_block_len))
        .position(|(a, b)| !bool::from(a[..BLOCK_SIZE].ct_eq(&b[..BLOCK_SIZE])));

    let i = match first_diff {
        Some(i) => i,
        None => return Ok(Ordering::Equal),
    };

    let block = &left[i * left_block_len..(i + 1) * left_block_len];
    let mut index_bytes = [0u8; 8];
    index_bytes[..index_len].copy_from_slice(&block[BLOCK_SIZE..BLOCK_SIZE + index_len]);
    let index = u64::from_le_bytes(index_bytes) as usize;
    if index >= params.nslots() {
        return Err(OreError::MalformedCiphertext(format!(
            "block {i} has slot index {index} but only {} slots",
            params.nslots()
        )));
    }

    let start = NONCE_SIZE + i * right_block_len;
    let right = &other_right[start..start + right_block_len];
    let bit = (right[right_block_len - 1 - index / 8] >> (index % 8)) & 1;

    let nonce = HashKey::from_slice(&other_right[..NONCE_SIZE]);
    let key = AesBlock::from_slice(&block[..BLOCK_SIZE]);

    if bit ^ H::eval(key, nonce) == 1 {
        Ok(Ordering::Less)
    } else {
        Ok(Ordering::Greater)
    }
}

impl<H: Hash> Clone for BlockCipherText<H> {
    fn clone(&self) -> Self {
        Self {
            left: self.left.clone(),
            right: self.right.clone(),
            params: self.params,
            state: self.state,
            _hash: PhantomData,
        }
    }
}

impl<H: Hash> fmt::Debug for BlockCipherText<H> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BlockCipherText")
            .field("params", &self.params)
            .field("state", &self.state)
            .field("left", &hex::encode(&self.left[..]))
            .field("right", &hex::encode(&self.right[..]))
            .finish()
    }
}

impl<H: Hash> PartialEq for BlockCipherText<H> {
    fn eq(&self, other: &Self) -> bool {
        matches!(self.compare(other), Ok(Ordering::Equal))
    }
}

impl<H: Hash> PartialOrd for BlockCipherText<H> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        self.compare(other).ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::primitives::sha256z2hash::Sha256Z2Hash;
    use hex_literal::hex;
    use rand::SeedableRng;
    use rand_chacha::ChaCha20Rng;

    fn init_ore(nbits: u32, block_len: u32) -> BlockOre {
        let params = BlockParams::new(nbits, block_len).unwrap();
        BlockOre::init(
            &hex!("00010203 04050607 08090a0b 0c0d0e0f"),
            &hex!("0f0e0d0c 0b0a0908 07060504 03020100"),
            params,
        )
        .unwrap()
    }

    quickcheck! {
        fn compare_64(x: u64, y: u64) -> bool {
            let ore = init_ore(64, 8);
            let a = ore.encrypt(x).unwrap();
            let b = ore.encrypt(y).unwrap();

            match x.cmp(&y) {
                Ordering::Greater => a > b,
                Ordering::Less => a < b,
                Ordering::Equal => a == b,
            }
        }

        fn compare_32(x: u32, y: u32) -> bool {
            let ore = init_ore(32, 4);
            let a = ore.encrypt(x as u64).unwrap();
            let b = ore.encrypt(y as u64).unwrap();

            a.compare(&b).unwrap() == x.cmp(&y) && b.compare(&a).unwrap() == y.cmp(&x)
        }

        fn equality_64(x: u64) -> bool {
            let ore = init_ore(64, 8);
            let a = ore.encrypt(x).unwrap();
            let b = ore.encrypt(x).unwrap();

            a == b
        }
    }

    #[test]
    fn smallest_to_largest() {
        let ore = init_ore(64, 8);
        let a = ore.encrypt(0).unwrap();
        let b = ore.encrypt(u64::MAX).unwrap();

        assert!(a < b);
        assert!(b > a);
    }

    #[test]
    fn comparisons_in_first_block() {
        let ore = init_ore(64, 8);
        let a = ore.encrypt(18446744073709551615).unwrap();
        let b = ore.encrypt(18446744073709551612).unwrap();

        assert!(a > b);
        assert!(b < a);
    }

    #[test]
    fn comparisons_in_last_block() {
        let ore = init_ore(64, 8);
        let a = ore.encrypt(10).unwrap();
        let b = ore.encrypt(73).unwrap();

        assert!(a < b);
        assert!(b > a);
    }

    #[test]
    fn fresh_nonce_per_encryption() {
        let ore = init_ore(16, 4);
        let a = ore.encrypt(1234).unwrap();
        let b = ore.encrypt(1234).unwrap();

        assert_eq!(a.left().unwrap(), b.left().unwrap());
        assert_ne!(a.right().unwrap(), b.right().unwrap());
        assert_eq!(a.compare(&b).unwrap(), Ordering::Equal);
    }

    #[test]
    fn injected_nonce_source_is_deterministic() {
        let ore = init_ore(16, 4);
        let a = ore.encrypt_with_rng(77, &mut ChaCha20Rng::seed_from_u64(9)).unwrap();
        let b = ore.encrypt_with_rng(77, &mut ChaCha20Rng::seed_from_u64(9)).unwrap();
        assert_eq!(a.to_bytes().unwrap(), b.to_bytes().unwrap());
    }

    #[test]
    fn left_block_layout() {
        let ore = init_ore(12, 4);
        let ctxt = ore.encrypt(0xabc).unwrap();
        let left = ctxt.left().unwrap();
        let params = ctxt.params();
        assert_eq!(left.len(), 3 * 18);

        for block in left.chunks_exact(params.left_block_len()) {
            // pix fits in one byte and everything after it is padding
            assert!(block[BLOCK_SIZE] < 16);
            assert_eq!(block[BLOCK_SIZE + 1], 0);
        }
    }

    #[test]
    fn partial_top_block() {
        let ore = init_ore(10, 4);
        let values = [0u64, 1, 255, 256, 511, 512, 1023];
        let ctxts: Vec<_> = values.iter().map(|&v| ore.encrypt(v).unwrap()).collect();

        for (x, a) in values.iter().zip(ctxts.iter()) {
            for (y, b) in values.iter().zip(ctxts.iter()) {
                assert_eq!(a.compare(b).unwrap(), x.cmp(y));
            }
        }
    }

    #[test]
    fn odd_block_len_fails_to_encrypt() {
        let ore = init_ore(9, 3);
        let mut ctxt = BlockCipherText::init(*ore.params()).unwrap();
        assert!(matches!(ore.encrypt_into(&mut ctxt, 5), Err(OreError::InvalidParameter(_))));
        assert_eq!(ctxt.state(), CipherTextState::Initialized);
    }

    #[test]
    fn block_len_one_is_rejected_by_prp() {
        let ore = init_ore(4, 1);
        assert!(ore.encrypt(3).is_err());
    }

    #[test]
    fn sha256_oracle() {
        let params = BlockParams::new(16, 4).unwrap();
        let ore: BlockOre<Sha256Z2Hash> = BlockOre::init(&[1u8; 16], &[2u8; 16], params).unwrap();
        let a = ore.encrypt(300).unwrap();
        let b = ore.encrypt(301).unwrap();
        assert!(a < b);
        assert!(a == ore.encrypt(300).unwrap());
    }

    #[test]
    fn malformed_slot_index() {
        let ore = init_ore(8, 2);
        let a = ore.encrypt(1).unwrap();
        let b = ore.encrypt(2).unwrap();

        let mut bytes = a.to_bytes().unwrap();
        // Mismatch the first block key and give it a slot index past nslots
        bytes[0] ^= 0x01;
        bytes[BLOCK_SIZE] = 0xff;
        let params = *a.params();
        let corrupted: BlockCipherText = BlockCipherText::from_bytes(params, &bytes).unwrap();
        assert!(matches!(corrupted.compare(&b), Err(OreError::MalformedCiphertext(_))));
    }

    #[test]
    fn serialization() {
        let ore = init_ore(32, 4);
        let a = ore.encrypt(3298645429).unwrap();
        let bytes = a.to_bytes().unwrap();
        assert_eq!(bytes.len(), BlockOre::<Aes128Z2Hash>::ciphertext_size(ore.params()));

        let parsed: BlockCipherText = BlockCipherText::from_bytes(*ore.params(), &bytes).unwrap();
        assert!(parsed > ore.encrypt(3292279815).unwrap());
        assert!(parsed == a);

        assert!(matches!(
            BlockCipherText::<Aes128Z2Hash>::from_bytes(*ore.params(), &bytes[1..]),
            Err(OreError::InvalidLength { .. })
        ));
    }

    #[test]
    fn compare_stored_components() {
        let ore = init_ore(32, 4);
        let params = *ore.params();
        let a = ore.encrypt(3298645429).unwrap();
        let b = ore.encrypt(3292279815).unwrap();
        let c = ore.encrypt(3298645429).unwrap();

        let parts = |x: &BlockCipherText, y: &BlockCipherText| {
            BlockCipherText::<Aes128Z2Hash>::compare_parts(
                &params,
                x.left().unwrap(),
                y.left().unwrap(),
                y.right().unwrap(),
            )
            .unwrap()
        };
        assert_eq!(parts(&a, &b), Ordering::Greater);
        assert_eq!(parts(&b, &a), Ordering::Less);
        assert_eq!(parts(&a, &c), Ordering::Equal);
        assert_eq!(parts(&a, &b), a.compare(&b).unwrap());

        let left = a.left().unwrap();
        assert!(matches!(
            BlockCipherText::<Aes128Z2Hash>::compare_parts(&params, &left[1..], b.left().unwrap(), b.right().unwrap()),
            Err(OreError::InvalidLength { .. })
        ));
        assert!(matches!(
            BlockCipherText::<Aes128Z2Hash>::compare_parts(&params, left, b.left().unwrap(), &b.right().unwrap()[..16]),
            Err(OreError::InvalidLength { .. })
        ));
    }

    #[test]
    fn lifecycle_errors() {
        let mut ore = init_ore(8, 2);
        let a = ore.encrypt(1).unwrap();
        let fresh = BlockCipherText::init(*ore.params()).unwrap();
        assert!(matches!(a.compare(&fresh), Err(OreError::CiphertextNotInitialized)));
        assert!(fresh.to_bytes().is_err());

        let mut cleared = ore.encrypt(1).unwrap();
        cleared.clear();
        assert!(matches!(cleared.compare(&a), Err(OreError::CiphertextNotInitialized)));
        assert!(matches!(
            ore.encrypt_into(&mut cleared, 1),
            Err(OreError::CiphertextNotInitialized)
        ));

        let other = init_ore(8, 4).encrypt(1).unwrap();
        assert!(matches!(a.compare(&other), Err(OreError::ParamsMismatch)));
        assert!(a.partial_cmp(&other).is_none());

        ore.clear();
        assert!(matches!(ore.encrypt(1), Err(OreError::KeyNotInitialized)));
    }
}
