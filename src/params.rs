use crate::primitives::{BLOCK_SIZE, NONCE_SIZE};
use crate::{OreError, OreResult};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Largest output block width any supported PRF can supply (32 byte outputs).
pub const MAX_OUT_BLK_LEN: u32 = 8 * 32;
pub const MAX_BLOCK_LEN: u32 = 16;
pub const MAX_BLOCK_NBITS: u32 = 64;

#[inline]
pub(crate) fn ceil_div(a: usize, b: usize) -> usize {
    (a + b - 1) / b
}

fn invalid(msg: String) -> OreError {
    tracing::debug!(reason = %msg, "rejected ORE parameters");
    OreError::InvalidParameter(msg)
}

/// Parameters for the bitwise scheme: plaintext width and the width of the
/// ciphertext block emitted for every plaintext bit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(try_from = "RawParams", into = "RawParams"))]
pub struct BasicParams {
    nbits: u32,
    out_blk_len: u32,
}

impl BasicParams {
    pub fn new(nbits: u32, out_blk_len: u32) -> OreResult<Self> {
        if nbits == 0 {
            return Err(invalid("nbits must be at least 1".into()));
        }
        if !(2..=MAX_OUT_BLK_LEN).contains(&out_blk_len) {
            return Err(invalid(format!(
                "out_blk_len must be between 2 and {MAX_OUT_BLK_LEN} (got {out_blk_len})"
            )));
        }
        Ok(Self { nbits, out_blk_len })
    }

    pub fn nbits(&self) -> u32 {
        self.nbits
    }

    pub fn out_blk_len(&self) -> u32 {
        self.out_blk_len
    }

    /// Bytes in a packed plaintext
    pub fn plaintext_len(&self) -> usize {
        ceil_div(self.nbits as usize, 8)
    }

    pub fn ciphertext_len(&self) -> usize {
        ceil_div(self.nbits as usize * self.out_blk_len as usize, 8)
    }
}

/// Parameters for the Lewi-Wu scheme: plaintext width and the width of each
/// small-domain block.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(try_from = "RawParams", into = "RawParams"))]
pub struct BlockParams {
    nbits: u32,
    block_len: u32,
}

impl BlockParams {
    pub fn new(nbits: u32, block_len: u32) -> OreResult<Self> {
        if !(1..=MAX_BLOCK_NBITS).contains(&nbits) {
            return Err(invalid(format!(
                "nbits must be between 1 and {MAX_BLOCK_NBITS} (got {nbits})"
            )));
        }
        if !(1..=MAX_BLOCK_LEN).contains(&block_len) {
            return Err(invalid(format!(
                "block_len must be between 1 and {MAX_BLOCK_LEN} (got {block_len})"
            )));
        }
        // The slot index is stored in the nbits-sized tail of each left block
        if ceil_div(block_len as usize, 8) > ceil_div(nbits as usize, 8) {
            return Err(invalid(format!(
                "a {block_len} bit block index does not fit the left block of a {nbits} bit plaintext"
            )));
        }
        Ok(Self { nbits, block_len })
    }

    pub fn nbits(&self) -> u32 {
        self.nbits
    }

    pub fn block_len(&self) -> u32 {
        self.block_len
    }

    pub fn nblocks(&self) -> usize {
        ceil_div(self.nbits as usize, self.block_len as usize)
    }

    /// Number of comparison slots per block (`2^block_len`)
    pub fn nslots(&self) -> usize {
        1usize << self.block_len
    }

    /// Bytes holding a permuted block value in a left block.
    pub(crate) fn index_len(&self) -> usize {
        ceil_div(self.block_len as usize, 8)
    }

    /// Width of one left block. The trailing index field is sized by
    /// `nbits` rather than `block_len`; everything past the index is zero.
    pub fn left_block_len(&self) -> usize {
        BLOCK_SIZE + ceil_div(self.nbits as usize, 8)
    }

    pub fn right_block_len(&self) -> usize {
        ceil_div(self.nslots(), 8)
    }

    pub fn left_len(&self) -> usize {
        self.nblocks() * self.left_block_len()
    }

    pub fn right_len(&self) -> usize {
        NONCE_SIZE + self.nblocks() * self.right_block_len()
    }

    pub fn ciphertext_len(&self) -> usize {
        self.left_len() + self.right_len()
    }
}

/// Serialized form of either parameter set, validated on the way back in.
#[cfg(feature = "serde")]
#[derive(Serialize, Deserialize)]
struct RawParams {
    nbits: u32,
    block: u32,
}

#[cfg(feature = "serde")]
impl TryFrom<RawParams> for BasicParams {
    type Error = OreError;

    fn try_from(raw: RawParams) -> OreResult<Self> {
        Self::new(raw.nbits, raw.block)
    }
}

#[cfg(feature = "serde")]
impl From<BasicParams> for RawParams {
    fn from(params: BasicParams) -> Self {
        Self { nbits: params.nbits, block: params.out_blk_len }
    }
}

#[cfg(feature = "serde")]
impl TryFrom<RawParams> for BlockParams {
    type Error = OreError;

    fn try_from(raw: RawParams) -> OreResult<Self> {
        Self::new(raw.nbits, raw.block)
    }
}

#[cfg(feature = "serde")]
impl From<BlockParams> for RawParams {
    fn from(params: BlockParams) -> Self {
        Self { nbits: params.nbits, block: params.block_len }
    }
}
