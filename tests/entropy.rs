use ore_lewi::{
    Aes128Z2Hash, BasicOre, BasicParams, BlockCipherText, BlockOre, BlockParams, CipherTextState,
    OreCipher, OreError,
};
use rand::{CryptoRng, RngCore};

/// An entropy source that is always unavailable.
struct BrokenRng;

impl RngCore for BrokenRng {
    fn next_u32(&mut self) -> u32 {
        unreachable!("only try_fill_bytes is used")
    }

    fn next_u64(&mut self) -> u64 {
        unreachable!("only try_fill_bytes is used")
    }

    fn fill_bytes(&mut self, _dest: &mut [u8]) {
        unreachable!("only try_fill_bytes is used")
    }

    fn try_fill_bytes(&mut self, _dest: &mut [u8]) -> Result<(), rand::Error> {
        Err(rand::Error::new("entropy source unavailable"))
    }
}

impl CryptoRng for BrokenRng {}

#[test]
fn basic_setup_fails() {
    let params = BasicParams::new(31, 5).unwrap();
    let result: Result<BasicOre, _> = OreCipher::setup_with_rng(params, &mut BrokenRng);
    assert!(matches!(result, Err(OreError::Randomness)));
}

#[test]
fn block_setup_fails() {
    let params = BlockParams::new(32, 4).unwrap();
    let result: Result<BlockOre, _> = OreCipher::setup_with_rng(params, &mut BrokenRng);
    assert!(matches!(result, Err(OreError::Randomness)));
}

#[test]
fn failed_nonce_leaves_ciphertext_unpopulated() {
    let params = BlockParams::new(32, 4).unwrap();
    let ore: BlockOre = BlockOre::init(&[1u8; 16], &[2u8; 16], params).unwrap();

    let mut ctxt = BlockCipherText::<Aes128Z2Hash>::init(params).unwrap();
    assert!(matches!(
        ore.encrypt_into_with_rng(&mut ctxt, 42, &mut BrokenRng),
        Err(OreError::Randomness)
    ));
    assert_eq!(ctxt.state(), CipherTextState::Initialized);
    assert!(matches!(ctxt.to_bytes(), Err(OreError::CiphertextNotInitialized)));

    // A populated ciphertext is demoted rather than left holding stale data
    ore.encrypt_into(&mut ctxt, 42).unwrap();
    assert!(matches!(
        ore.encrypt_into_with_rng(&mut ctxt, 7, &mut BrokenRng),
        Err(OreError::Randomness)
    ));
    assert!(ctxt.to_bytes().is_err());
    assert!(matches!(ore.encrypt_with_rng(7, &mut BrokenRng), Err(OreError::Randomness)));
}
