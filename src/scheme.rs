pub mod basic;
pub mod block;

use crate::{OreError, OreResult};
use zeroize::Zeroizing;

/// Lifecycle of a ciphertext buffer.
///
/// Only `Populated` ciphertexts can be compared or serialized. `Cleared` is
/// terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CipherTextState {
    Initialized,
    Populated,
    Cleared,
}

impl CipherTextState {
    /// Checks that a ciphertext can be (re)written with an encryption.
    pub(crate) fn check_writable(self) -> OreResult<()> {
        match self {
            CipherTextState::Cleared => Err(OreError::CiphertextNotInitialized),
            _ => Ok(()),
        }
    }

    pub(crate) fn check_populated(self) -> OreResult<()> {
        match self {
            CipherTextState::Populated => Ok(()),
            _ => Err(OreError::CiphertextNotInitialized),
        }
    }
}

/// Allocates a zeroed buffer that is wiped when dropped.
pub(crate) fn alloc_buffer(len: usize) -> OreResult<Zeroizing<Vec<u8>>> {
    let mut buf = Vec::new();
    buf.try_reserve_exact(len).map_err(|_| OreError::Allocation)?;
    buf.resize(len, 0);
    Ok(Zeroizing::new(buf))
}
