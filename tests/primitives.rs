use ore_lewi::primitives::{
    block_cipher::AesKey, make_block, prp::FeistelPrp, AesBlock, Hash, HashKey, Prf,
};
use ore_lewi::{Aes128Prf, Aes128Z2Hash, HmacSha256Prf, OreError, Sha256Z2Hash};
use rand::SeedableRng;
use rand_chacha::ChaCha20Rng;

fn prf_conformance<P: Prf>() {
    let mut rng = ChaCha20Rng::seed_from_u64(11);
    let prf = P::generate(&mut rng).unwrap();
    let input = vec![0x5au8; P::INPUT_SIZE.unwrap_or(24)];

    let mut a = vec![0u8; P::OUTPUT_SIZE];
    let mut b = vec![0u8; P::OUTPUT_SIZE];
    prf.eval(&mut a, &input).unwrap();
    prf.eval(&mut b, &input).unwrap();
    assert_eq!(a, b);

    let mut short = vec![0u8; P::OUTPUT_SIZE - 1];
    assert!(matches!(prf.eval(&mut short, &input), Err(OreError::InvalidLength { .. })));
    assert!(P::new(&vec![0u8; P::KEY_SIZE + 1]).is_err());
}

#[test]
fn aes_prf_conformance() {
    prf_conformance::<Aes128Prf>();
}

#[test]
fn hmac_prf_conformance() {
    prf_conformance::<HmacSha256Prf>();
}

fn oracle_batch_matches_single<H: Hash>() {
    let nonce = HashKey::from([0x42u8; 16]);
    let keys: Vec<AesBlock> = (0..100u64).map(|i| make_block(i, !i)).collect();
    let hash = H::new(&nonce);
    let batch = hash.hash_all(&keys);

    for (key, bit) in keys.iter().zip(batch) {
        assert!(bit <= 1);
        assert_eq!(H::eval(key, &nonce), bit);
    }
}

#[test]
fn aes_oracle_batch() {
    oracle_batch_matches_single::<Aes128Z2Hash>();
}

#[test]
fn sha256_oracle_batch() {
    oracle_batch_matches_single::<Sha256Z2Hash>();
}

#[test]
fn prp_full_domain_matches_single_values() {
    let mut rng = ChaCha20Rng::seed_from_u64(12);
    let prp = FeistelPrp::new(&AesKey::generate(&mut rng).unwrap());

    let image = prp.permute_all(12).unwrap();
    let preimage = prp.invert_all(12).unwrap();
    for v in 0..(1u64 << 12) {
        assert_eq!(image[v as usize], prp.permute(v, 12).unwrap());
        assert_eq!(preimage[v as usize], prp.invert(v, 12).unwrap());
        assert_eq!(prp.invert(prp.permute(v, 12).unwrap(), 12).unwrap(), v);
    }
}

#[test]
fn prp_wide_domain_roundtrip() {
    let prp = FeistelPrp::from_seed(&AesBlock::from([1u8; 16]));
    for v in [0u64, 1, 0xdead_beef, u64::MAX, 1 << 63] {
        assert_eq!(prp.invert(prp.permute(v, 64).unwrap(), 64).unwrap(), v);
    }
}
