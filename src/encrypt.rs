use crate::convert::ToOrderedInteger;
use crate::{OreCipher, OreResult};

/// Encrypts native plaintext types with any ORE scheme.
///
/// Integers are encrypted by value, so the scheme's `nbits` must cover the
/// type's width for comparisons to be meaningful. Floats go through an order
/// preserving map into `u64` and need `nbits = 64`.
pub trait OreEncrypt<T: OreCipher> {
    fn encrypt(&self, cipher: &T) -> OreResult<T::CipherText>;
}

macro_rules! impl_ore_encrypt_unsigned {
    ($($ty:ty),*) => {
        $(
            impl<T: OreCipher> OreEncrypt<T> for $ty {
                fn encrypt(&self, cipher: &T) -> OreResult<T::CipherText> {
                    cipher.encrypt(u64::from(*self))
                }
            }
        )*
    };
}

impl_ore_encrypt_unsigned!(u64, u32, u16, u8);

impl<T: OreCipher> OreEncrypt<T> for f64 {
    fn encrypt(&self, cipher: &T) -> OreResult<T::CipherText> {
        cipher.encrypt(self.map_to())
    }
}
