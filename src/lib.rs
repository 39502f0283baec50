//! Order-revealing encryption over AES.
//!
//! Two constructions are provided. [`BasicOre`] is the bitwise scheme of
//! Chenette, Lewi, Weis and Wu: every plaintext bit produces one small
//! ciphertext block and comparison is a scan for the first differing block.
//! [`BlockOre`] is the Lewi-Wu scheme: plaintexts are split into small-domain
//! blocks and every ciphertext carries a left part (used when it is the
//! first argument of a comparison) and a nonce-masked right part.
//!
//! ```
//! use ore_lewi::{BlockOre, BlockParams, OreCipher};
//!
//! let params = BlockParams::new(32, 8)?;
//! let ore: BlockOre = OreCipher::setup(params)?;
//! let a = ore.encrypt(10)?;
//! let b = ore.encrypt(73)?;
//! assert!(a < b);
//! # Ok::<(), ore_lewi::OreError>(())
//! ```

mod convert;
pub mod encrypt;
mod error;
pub mod params;
pub mod primitives;
pub mod scheme;

pub use crate::encrypt::OreEncrypt;
pub use crate::error::{OreError, OreResult};
pub use crate::params::{BasicParams, BlockParams};
pub use crate::primitives::{
    hash::Aes128Z2Hash, hmac_prf::HmacSha256Prf, prf::Aes128Prf, prng::Aes128Prng,
    sha256z2hash::Sha256Z2Hash,
};
pub use crate::scheme::{
    basic::{BasicCipherText, BasicOre},
    block::{BlockCipherText, BlockOre},
    CipherTextState,
};

use rand::{rngs::OsRng, CryptoRng, RngCore};
use std::cmp::Ordering;

#[cfg(test)]
#[macro_use]
extern crate quickcheck;

/// An ORE construction: key generation, encryption and comparison.
pub trait OreCipher: Sized {
    type Params;
    type CipherText;

    /// Generates a fresh key from the OS entropy source.
    fn setup(params: Self::Params) -> OreResult<Self> {
        Self::setup_with_rng(params, &mut OsRng)
    }

    fn setup_with_rng<R: RngCore + CryptoRng>(params: Self::Params, rng: &mut R) -> OreResult<Self>;

    fn params(&self) -> &Self::Params;

    fn encrypt(&self, msg: u64) -> OreResult<Self::CipherText>;

    /// Encrypts into a ciphertext created with the key's parameters.
    ///
    /// The ciphertext is only marked populated once the whole encryption
    /// succeeds, so a failed call never leaves a comparable ciphertext.
    fn encrypt_into(&self, ctxt: &mut Self::CipherText, msg: u64) -> OreResult<()>;

    /// `Less`, `Equal` or `Greater` as `a` compares to `b` (cast with `as i8` for -1, 0, 1).
    fn compare(a: &Self::CipherText, b: &Self::CipherText) -> OreResult<Ordering>;

    fn ciphertext_size(params: &Self::Params) -> usize;

    /// Wipes the key material. Every later encryption fails with
    /// [`OreError::KeyNotInitialized`].
    fn clear(&mut self);
}
