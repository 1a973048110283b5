//! Utilities for serializing and deserializing `zkmeter_crypto` types using Serde.
//!
//! There are two modules here, [`group_element`] and [`field_element`]. To Serde, these look
//! like "modules" which can be used with the `#[serde(with = "crate::serde::group_element")]`
//! syntax in order to add serialization/deserialization functionality to any curve point or
//! scalar implementing the `group`/`ff` encoding traits, which otherwise do not provide
//! `Serialize` and `Deserialize` implementations.
//!
//! Both encode the canonical byte representation as a sequence of bytes. Decoding rejects
//! byte strings of the wrong length and non-canonical encodings; for points this includes points
//! off the curve or outside the prime-order subgroup.

use crate::common::*;

/// Decode a group element from its canonical byte encoding.
pub(crate) fn element_from_slice<G: GroupEncoding>(bytes: &[u8]) -> Option<G> {
    let mut repr = G::Repr::default();
    if repr.as_ref().len() != bytes.len() {
        return None;
    }
    repr.as_mut().copy_from_slice(bytes);
    G::from_bytes(&repr).into()
}

/// Decode a scalar from its canonical byte encoding.
pub(crate) fn scalar_from_slice<S: PrimeField>(bytes: &[u8]) -> Option<S> {
    let mut repr = S::Repr::default();
    if repr.as_ref().len() != bytes.len() {
        return None;
    }
    repr.as_mut().copy_from_slice(bytes);
    S::from_repr(repr).into()
}

/// Length in bytes of the canonical encoding of an element of `G`.
pub(crate) fn element_len<G: GroupEncoding>() -> usize {
    G::Repr::default().as_ref().len()
}

pub(crate) mod group_element {
    use super::*;
    use serde::{de, Deserialize, Deserializer, Serialize, Serializer};

    pub(crate) fn serialize<G, S>(element: &G, serializer: S) -> Result<S::Ok, S::Error>
    where
        G: GroupEncoding,
        S: Serializer,
    {
        element.to_bytes().as_ref().serialize(serializer)
    }

    pub(crate) fn deserialize<'de, G, D>(deserializer: D) -> Result<G, D::Error>
    where
        G: GroupEncoding,
        D: Deserializer<'de>,
    {
        let bytes = <Vec<u8>>::deserialize(deserializer)?;
        element_from_slice(&bytes).ok_or_else(|| de::Error::custom("invalid element encoding"))
    }
}

pub(crate) mod field_element {
    use super::*;
    use serde::{de, Deserialize, Deserializer, Serialize, Serializer};

    pub(crate) fn serialize<F, S>(scalar: &F, serializer: S) -> Result<S::Ok, S::Error>
    where
        F: PrimeField,
        S: Serializer,
    {
        scalar.to_repr().as_ref().serialize(serializer)
    }

    pub(crate) fn deserialize<'de, F, D>(deserializer: D) -> Result<F, D::Error>
    where
        F: PrimeField,
        D: Deserializer<'de>,
    {
        let bytes = <Vec<u8>>::deserialize(deserializer)?;
        scalar_from_slice(&bytes).ok_or_else(|| de::Error::custom("invalid scalar encoding"))
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use bls12_381::G1Projective;
    use curve25519_dalek::RistrettoPoint;

    fn element_roundtrip<G: Group + GroupEncoding>() {
        let mut rng = crate::test::rng();
        let g = G::random(&mut rng);
        let decoded: G = element_from_slice(g.to_bytes().as_ref()).unwrap();
        assert_eq!(g, decoded);
        assert!(element_from_slice::<G>(&g.to_bytes().as_ref()[1..]).is_none());
    }

    #[test]
    fn element_roundtrip_g1() {
        element_roundtrip::<G1Projective>()
    }

    #[test]
    fn element_roundtrip_ristretto() {
        element_roundtrip::<RistrettoPoint>()
    }

    #[test]
    fn non_canonical_scalar_is_rejected() {
        // All-ones is larger than the order of either scalar field.
        assert!(scalar_from_slice::<bls12_381::Scalar>(&[0xff; 32]).is_none());
        assert!(scalar_from_slice::<curve25519_dalek::Scalar>(&[0xff; 32]).is_none());
    }
}
