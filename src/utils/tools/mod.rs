use std::ops::Neg;
use rabe_bn::{Fr, G1, Group};
use crate::error::{ColaggError, Result};

/// Converts a signed integer into a scalar, negative values map to `-|m|`.
pub fn i64_to_fr(m: i64) -> Result<Fr> {
    let magnitude = Fr::from_str(&m.unsigned_abs().to_string())
        .ok_or_else(|| ColaggError::InvalidScalar(m.to_string()))?;
    if m < 0 {
        Ok(magnitude.neg())
    } else {
        Ok(magnitude)
    }
}

/// Canonical encoding of a G1 point.
///
/// Jacobian coordinates are not unique, so the point is normalized to affine
/// form (`z = 1`) first and written after a tag byte `4`. The point at
/// infinity is encoded as a single `0` byte.
pub fn point_bytes(point: &G1) -> Result<Vec<u8>> {
    if point.is_zero() {
        return Ok(vec![0u8]);
    }
    let mut affine = *point;
    affine.normalize();
    let mut bytes = vec![4u8];
    bytes.extend(affine.into_bytes());
    Ok(bytes)
}

pub fn to_hex(bytes: &[u8]) -> String {
    bytes.iter().map(|b| format!("{:02x}", b)).collect()
}

#[cfg(test)]
mod tests {

    use super::*;

    #[test]
    fn negative_scalars() {
        let g = G1::one();
        let three = i64_to_fr(3).unwrap();
        let minus_three = i64_to_fr(-3).unwrap();
        assert!((g * three + g * minus_three).is_zero());
        assert_eq!(i64_to_fr(0).unwrap(), Fr::zero());
    }

    #[test]
    fn encoding_ignores_representation() {
        let g = G1::one();
        let two = i64_to_fr(2).unwrap();
        // same point reached two ways
        assert_eq!(point_bytes(&(g + g)).unwrap(), point_bytes(&(g * two)).unwrap());
        assert_ne!(point_bytes(&g).unwrap(), point_bytes(&(g * two)).unwrap());
        assert_eq!(point_bytes(&G1::zero()).unwrap(), vec![0u8]);
    }

    #[test]
    fn encoding_is_affine() {
        let g = G1::one();
        let five = i64_to_fr(5).unwrap();
        let minus_four = i64_to_fr(-4).unwrap();
        // g·5 + g·(-4) lands on g with z != 1
        let detour = g * five + g * minus_four;
        let bytes = point_bytes(&detour).unwrap();
        assert_eq!(bytes, point_bytes(&g).unwrap());
        assert_eq!(bytes[0], 4);
        assert_ne!(point_bytes(&-g).unwrap(), bytes);
    }

    #[test]
    fn hex() {
        assert_eq!(to_hex(&[0x00, 0xab, 0x10]), "00ab10");
    }
}
