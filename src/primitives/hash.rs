use crate::primitives::{block_cipher::AesKey, AesBlock, Hash, HashKey};
use zeroize::ZeroizeOnDrop;

/*
 * Models a Random Oracle in Z2 by treating AES as an ideal cipher:
 * H(k, x) = lsb(AES(x, k)). The value x (the nonce) is the AES key and the
 * hash key k is the plaintext, so a batch of keys hashed against one nonce
 * shares a single key schedule.
 */
#[derive(Debug, ZeroizeOnDrop)]
pub struct Aes128Z2Hash {
    cipher: AesKey,
}

impl Hash for Aes128Z2Hash {
    fn new(value: &HashKey) -> Self {
        Self { cipher: AesKey::from_block(value) }
    }

    fn hash(&self, key: &AesBlock) -> u8 {
        self.cipher.eval(key)[0] & 1u8
    }

    fn hash_all(&self, keys: &[AesBlock]) -> Vec<u8> {
        let mut blocks = keys.to_vec();
        self.cipher.encrypt_blocks(&mut blocks);

        // Output is Z2 (1-bit)
        blocks.iter().map(|block| block[0] & 1u8).collect()
    }
}
