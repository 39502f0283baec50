use crate::primitives::{block_cipher::AesKey, low_word, make_block, AesBlock};
use crate::{OreError, OreResult};
use zeroize::Zeroize;

/// Pseudorandom permutation over a small even-width domain, built as a
/// 3-round Feistel network with AES round functions.
///
/// Round function `i` maps the right half `R` to the low `nbits / 2` bits of
/// `AES(k_i, R)`. Round keys are derived by encrypting the counters 0, 1 and 2
/// under the PRP key.
#[derive(Debug)]
pub struct FeistelPrp {
    round_keys: [AesKey; 3],
}

impl FeistelPrp {
    /// Widest domain for single value evaluation
    pub const MAX_BITS: u32 = 64;
    /// Widest domain that can be enumerated with [`FeistelPrp::permute_all`]
    pub const MAX_ENUMERATION_BITS: u32 = 16;

    pub fn new(key: &AesKey) -> Self {
        let mut seeds = [make_block(0, 0), make_block(0, 1), make_block(0, 2)];
        key.encrypt_blocks(&mut seeds);

        let round_keys = [
            AesKey::from_block(&seeds[0]),
            AesKey::from_block(&seeds[1]),
            AesKey::from_block(&seeds[2]),
        ];
        for seed in seeds.iter_mut() {
            seed.as_mut_slice().zeroize();
        }

        Self { round_keys }
    }

    /// Builds the PRP from a pseudorandom block used as the PRP key.
    pub fn from_seed(seed: &AesBlock) -> Self {
        Self::new(&AesKey::from_block(seed))
    }

    pub fn permute(&self, value: u64, nbits: u32) -> OreResult<u64> {
        self.eval(value, nbits, false)
    }

    pub fn invert(&self, value: u64, nbits: u32) -> OreResult<u64> {
        self.eval(value, nbits, true)
    }

    /// The image of every value in `[0, 2^nbits)`, indexed by value.
    pub fn permute_all(&self, nbits: u32) -> OreResult<Vec<u64>> {
        self.eval_all(nbits, false)
    }

    /// The preimage of every value in `[0, 2^nbits)`, indexed by value.
    pub fn invert_all(&self, nbits: u32) -> OreResult<Vec<u64>> {
        self.eval_all(nbits, true)
    }

    #[inline]
    fn round_key(&self, round: usize, inverse: bool) -> &AesKey {
        if inverse {
            &self.round_keys[2 - round]
        } else {
            &self.round_keys[round]
        }
    }

    fn eval(&self, value: u64, nbits: u32, inverse: bool) -> OreResult<u64> {
        check_domain(nbits, Self::MAX_BITS)?;
        let half = nbits / 2;
        let mask = half_mask(half);

        let (mut l, mut r) = ((value >> half) & mask, value & mask);
        if inverse {
            std::mem::swap(&mut l, &mut r);
        }

        for round in 0..3 {
            let f = low_word(&self.round_key(round, inverse).eval(&make_block(0, r))) & mask;
            let new_r = l ^ f;
            l = r;
            r = new_r;
        }

        if inverse {
            std::mem::swap(&mut l, &mut r);
        }
        Ok((l << half) | r)
    }

    fn eval_all(&self, nbits: u32, inverse: bool) -> OreResult<Vec<u64>> {
        check_domain(nbits, Self::MAX_ENUMERATION_BITS)?;
        let half = nbits / 2;
        let mask = half_mask(half);
        let size = 1u64 << nbits;

        let (mut l, mut r): (Vec<u64>, Vec<u64>) =
            (0..size).map(|v| ((v >> half) & mask, v & mask)).unzip();
        if inverse {
            std::mem::swap(&mut l, &mut r);
        }

        // All domain points go through a round together so AES can pipeline
        let mut blocks: Vec<AesBlock> = Vec::with_capacity(r.len());
        for round in 0..3 {
            blocks.clear();
            blocks.extend(r.iter().map(|&x| make_block(0, x)));
            self.round_key(round, inverse).encrypt_blocks(&mut blocks);

            let new_r: Vec<u64> = l
                .iter()
                .zip(blocks.iter())
                .map(|(&x, block)| x ^ (low_word(block) & mask))
                .collect();
            l = std::mem::replace(&mut r, new_r);
        }

        if inverse {
            std::mem::swap(&mut l, &mut r);
        }
        Ok(l.iter().zip(r.iter()).map(|(&x, &y)| (x << half) | y).collect())
    }
}

#[inline]
fn half_mask(half: u32) -> u64 {
    (1u64 << half) - 1
}

fn check_domain(nbits: u32, max: u32) -> OreResult<()> {
    if nbits % 2 != 0 || nbits > max {
        tracing::debug!(nbits, max, "rejected PRP domain");
        return Err(OreError::InvalidParameter(format!(
            "PRP domain must be an even number of bits no greater than {max} (got {nbits})"
        )));
    }
    Ok(())
}
