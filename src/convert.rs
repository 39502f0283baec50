/*
  Order-preserving map from 64 bit floats to 64 bit unsigned integers (and
  back, which is only needed to check the mapping).

  Sorting the mapped integers gives the same order as sorting the floats.
  Negative numbers have every bit flipped and positive numbers only have
  the sign bit flipped, so -0.0 maps just below 0.0.

  NaN and the infinities are mapped too but their order is not meaningful.
  Filter them out before encrypting.

  https://lemire.me/blog/2020/12/14/converting-floating-point-numbers-to-integers-while-preserving-order
*/

pub(crate) trait ToOrderedInteger<T> {
    fn map_to(&self) -> T;
}

#[cfg(test)]
pub(crate) trait FromOrderedInteger<T> {
    fn map_from(input: T) -> Self;
}

const SIGN_BIT: u64 = 0x8000_0000_0000_0000;

impl ToOrderedInteger<u64> for f64 {
    fn map_to(&self) -> u64 {
        let num = self.to_bits();
        // All ones for negative numbers, zero otherwise
        let mask = 0u64.wrapping_sub(num >> 63) | SIGN_BIT;
        num ^ mask
    }
}

#[cfg(test)]
impl FromOrderedInteger<u64> for f64 {
    fn map_from(input: u64) -> f64 {
        let mask = ((input >> 63).wrapping_sub(1)) | SIGN_BIT;
        f64::from_bits(input ^ mask)
    }
}
