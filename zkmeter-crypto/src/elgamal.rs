//! Additively homomorphic ElGamal encryption over a prime-order elliptic-curve group, following
//! the elliptic-curve formulation in Washington, "Elliptic Curves: Number Theory and
//! Cryptography", 2008, p. 175.
//!
//! A plaintext `m` is encoded as the point `m * P` for a public generator `P`; a ciphertext under
//! the public key `B = s * P` is the pair `(k * P, m * P + k * B)` for fresh randomness `k`.
//! Adding two ciphertexts component-wise yields an encryption of the sum of their plaintexts,
//! which is how a meter's readings are aggregated into a bill without decrypting them.
//!
//! Decryption recovers `m * P` and then has to solve a discrete logarithm. This is only tractable
//! because plaintexts are small: the search is limited to an explicit interval `[0, max]` and
//! fails with [`Error::PlaintextNotFound`] outside of it.
//! ```
//! # use zkmeter_crypto::elgamal::KeyPair;
//! # use curve25519_dalek::RistrettoPoint;
//! # let mut rng = rand::thread_rng();
//! let keypair = KeyPair::<RistrettoPoint>::new(&mut rng);
//! let first = keypair.public_key().encrypt(&mut rng, 42);
//! let second = keypair.public_key().encrypt(&mut rng, 58);
//! assert_eq!(keypair.decrypt(&(first + second), 1000), Ok(100));
//! ```

use crate::{
    common::*,
    proofs::{ChallengeBuilder, ChallengeInput},
    serde::{element_from_slice, element_len},
    Error,
};
use serde::{Deserialize, Serialize};
use std::{
    collections::HashMap,
    fmt,
    iter::Sum,
    ops::{Add, AddAssign},
};
use zeroize::Zeroize;

/// ElGamal secret key: the scalar `s` and the generator the key was derived from.
///
/// The scalar is wiped when the key is dropped and never appears in `Debug` output.
pub struct SecretKey<G: Group> {
    scalar: SecretScalar<G::Scalar>,
    generator: G,
}

/// ElGamal public key `B = s * P`, together with the generator `P`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(bound = "G: GroupEncoding")]
pub struct PublicKey<G: Group> {
    #[serde(with = "crate::serde::group_element")]
    generator: G,
    #[serde(with = "crate::serde::group_element")]
    point: G,
}

/// A keypair formed from a [`SecretKey`] and a [`PublicKey`].
#[derive(Debug)]
pub struct KeyPair<G: Group> {
    sk: SecretKey<G>,
    pk: PublicKey<G>,
}

/// The randomness `k` used to produce one [`Ciphertext`].
///
/// Only needed to prove statements about the ciphertext; wiped on drop.
pub struct EncryptionRandomness<G: Group>(SecretScalar<G::Scalar>);

/// An ElGamal ciphertext `(c1, c2) = (k * P, m * P + k * B)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(bound = "G: GroupEncoding")]
pub struct Ciphertext<G: Group> {
    #[serde(with = "crate::serde::group_element")]
    c1: G,
    #[serde(with = "crate::serde::group_element")]
    c2: G,
}

impl<G: Group> KeyPair<G> {
    /// Generate a new keypair on the group's standard generator.
    pub fn new(rng: &mut impl Rng) -> Self {
        Self::generate(rng, G::generator())
    }

    /// Generate a new keypair on the given generator.
    ///
    /// Use this to encrypt under the value generator of a set of Pedersen parameters, which is a
    /// precondition for proving that a ciphertext and a commitment hold the same value.
    pub fn with_generator(rng: &mut impl Rng, generator: G) -> Result<Self, Error> {
        if bool::from(generator.is_identity()) {
            return Err(Error::CryptoBackend("the identity cannot be used as a generator"));
        }
        Ok(Self::generate(rng, generator))
    }

    fn generate(rng: &mut impl Rng, generator: G) -> Self {
        let scalar = random_nonzero_scalar::<G::Scalar>(rng);
        let pk = PublicKey {
            generator,
            point: generator * scalar,
        };
        let sk = SecretKey {
            scalar: SecretScalar(scalar),
            generator,
        };
        Self { sk, pk }
    }

    /// Get the public portion of the keypair.
    pub fn public_key(&self) -> &PublicKey<G> {
        &self.pk
    }

    /// Get the secret portion of the keypair.
    pub fn secret_key(&self) -> &SecretKey<G> {
        &self.sk
    }

    /// Decrypt a ciphertext whose plaintext is at most `max_plaintext`.
    pub fn decrypt(&self, ciphertext: &Ciphertext<G>, max_plaintext: u64) -> Result<u64, Error> {
        self.sk.decrypt(ciphertext, max_plaintext)
    }
}

impl<G: Group> SecretKey<G> {
    /// Strip the key from a ciphertext, leaving the plaintext point `m * P`.
    fn plaintext_point(&self, ciphertext: &Ciphertext<G>) -> G {
        ciphertext.c2 - ciphertext.c1 * self.scalar.0
    }

    /// Decrypt a ciphertext by exhaustive search over `[0, max_plaintext]`.
    ///
    /// Runs in time linear in the plaintext; prefer [`SecretKey::decrypt_with_table()`] when
    /// decrypting many ciphertexts over the same domain.
    pub fn decrypt(&self, ciphertext: &Ciphertext<G>, max_plaintext: u64) -> Result<u64, Error> {
        let target = self.plaintext_point(ciphertext);
        let mut candidate = G::identity();
        for m in 0..=max_plaintext {
            if candidate == target {
                return Ok(m);
            }
            candidate += self.generator;
        }
        Err(Error::PlaintextNotFound { max_plaintext })
    }

    /// The generator this key was derived from.
    pub fn generator(&self) -> G {
        self.generator
    }
}

impl<G: Group + GroupEncoding> SecretKey<G> {
    /// Decrypt a ciphertext using a precomputed discrete logarithm table.
    pub fn decrypt_with_table(
        &self,
        ciphertext: &Ciphertext<G>,
        table: &DiscreteLogTable<G>,
    ) -> Result<u64, Error> {
        if table.generator != self.generator {
            return Err(Error::GeneratorMismatch);
        }
        table
            .get(&self.plaintext_point(ciphertext))
            .ok_or(Error::PlaintextNotFound {
                max_plaintext: table.max_plaintext,
            })
    }
}

impl<G: Group> Drop for SecretKey<G> {
    fn drop(&mut self) {
        self.scalar.zeroize();
    }
}

impl<G: Group> fmt::Debug for SecretKey<G> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SecretKey")
            .field("generator", &self.generator)
            .finish_non_exhaustive()
    }
}

impl<G: Group> PublicKey<G> {
    /// Encrypt `plaintext` with fresh randomness.
    pub fn encrypt(&self, rng: &mut impl Rng, plaintext: u64) -> Ciphertext<G> {
        self.encrypt_with_randomness(rng, plaintext).0
    }

    /// Encrypt `plaintext` with fresh randomness, and also return that randomness.
    pub fn encrypt_with_randomness(
        &self,
        rng: &mut impl Rng,
        plaintext: u64,
    ) -> (Ciphertext<G>, EncryptionRandomness<G>) {
        let k = random_nonzero_scalar::<G::Scalar>(rng);
        let ciphertext = Ciphertext {
            c1: self.generator * k,
            c2: self.generator * G::Scalar::from(plaintext) + self.point * k,
        };
        (ciphertext, EncryptionRandomness(SecretScalar(k)))
    }

    /// The generator `P` this key was derived from.
    pub fn generator(&self) -> G {
        self.generator
    }

    /// The public point `B = s * P`.
    pub fn to_element(&self) -> G {
        self.point
    }
}

impl<G: Group + GroupEncoding> ChallengeInput for PublicKey<G> {
    fn consume(&self, builder: &mut ChallengeBuilder) {
        builder.consume_element(&self.generator);
        builder.consume_element(&self.point);
    }
}

impl<G: Group> EncryptionRandomness<G> {
    pub(crate) fn as_scalar(&self) -> G::Scalar {
        self.0 .0
    }
}

impl<G: Group> Drop for EncryptionRandomness<G> {
    fn drop(&mut self) {
        self.0.zeroize();
    }
}

impl<G: Group> fmt::Debug for EncryptionRandomness<G> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("EncryptionRandomness(..)")
    }
}

impl<G: Group> Ciphertext<G> {
    /// The first component, `k * P`.
    pub fn c1(&self) -> G {
        self.c1
    }

    /// The second component, `m * P + k * B`.
    pub fn c2(&self) -> G {
        self.c2
    }

    /// The trivial encryption of zero, the neutral element of ciphertext addition.
    fn identity() -> Self {
        Self {
            c1: G::identity(),
            c2: G::identity(),
        }
    }
}

impl<G: Group + GroupEncoding> Ciphertext<G> {
    /// Encode the ciphertext as `c1 || c2`.
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut bytes = Vec::with_capacity(2 * element_len::<G>());
        bytes.extend_from_slice(self.c1.to_bytes().as_ref());
        bytes.extend_from_slice(self.c2.to_bytes().as_ref());
        bytes
    }

    /// Decode a ciphertext from the output of [`Ciphertext::to_bytes()`].
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, Error> {
        let len = element_len::<G>();
        if bytes.len() != 2 * len {
            return Err(Error::CryptoBackend("ciphertext has the wrong length"));
        }
        let decode = |part: &[u8]| {
            element_from_slice(part)
                .ok_or(Error::CryptoBackend("ciphertext component is not a valid group element"))
        };
        Ok(Self {
            c1: decode(&bytes[..len])?,
            c2: decode(&bytes[len..])?,
        })
    }
}

impl<G: Group> Add for Ciphertext<G> {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        Self {
            c1: self.c1 + rhs.c1,
            c2: self.c2 + rhs.c2,
        }
    }
}

impl<G: Group> AddAssign for Ciphertext<G> {
    fn add_assign(&mut self, rhs: Self) {
        *self = *self + rhs;
    }
}

impl<G: Group> Sum for Ciphertext<G> {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Self::identity(), Add::add)
    }
}

impl<G: Group + GroupEncoding> ChallengeInput for Ciphertext<G> {
    fn consume(&self, builder: &mut ChallengeBuilder) {
        builder.consume_element(&self.c1);
        builder.consume_element(&self.c2);
    }
}

/// Lookup table for discrete logarithms of `m * P` for every `m` in `[0, max_plaintext]`.
#[derive(Debug, Clone)]
pub struct DiscreteLogTable<G: Group + GroupEncoding> {
    generator: G,
    max_plaintext: u64,
    inner: HashMap<Vec<u8>, u64>,
}

impl<G: Group + GroupEncoding> DiscreteLogTable<G> {
    /// Creates a lookup table for the plaintexts `0..=max_plaintext` on the given generator.
    pub fn new(generator: G, max_plaintext: u64) -> Self {
        tracing::debug!(max_plaintext, "building discrete log table");
        let mut inner = HashMap::new();
        let mut point = G::identity();
        for m in 0..=max_plaintext {
            let _ = inner.insert(point.to_bytes().as_ref().to_vec(), m);
            point += generator;
        }
        Self {
            generator,
            max_plaintext,
            inner,
        }
    }

    /// Gets the discrete log of `point`, or `None` if it is outside of the table's domain.
    pub fn get(&self, point: &G) -> Option<u64> {
        self.inner.get(point.to_bytes().as_ref()).copied()
    }

    /// Inclusive upper bound of the table's domain.
    pub fn max_plaintext(&self) -> u64 {
        self.max_plaintext
    }
}
