use hex_literal::hex;
use ore_lewi::{BlockOre, BlockParams, OreEncrypt};

fn main() -> Result<(), ore_lewi::OreError> {
    let k1 = hex!("00010203 04050607 08090a0b 0c0d0e0f");
    let k2 = hex!("d0d007a5 3f9a6848 83bc1f21 0f6595a3");

    let ore: BlockOre = BlockOre::init(&k1, &k2, BlockParams::new(32, 8)?)?;

    let a = 10000u32.encrypt(&ore)?;
    let b = 10001u32.encrypt(&ore)?;
    println!("CT = {};", hex::encode(a.to_bytes()?));
    println!("10000 < 10001: {}", a < b);
    Ok(())
}
