use num::traits::{Signed, Zero};
use num::BigInt;
use std::fmt;
use std::ops::Add;

use crate::error::{Error, Result};
use crate::math_extensions::Modulo;
use crate::trace::KeyGenerationTrace;

/// Public half of a key pair. `g` is always `n + 1`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PublicKey {
  pub(crate) n: BigInt,
  pub(crate) n_square: BigInt,
  pub(crate) g: BigInt,
}

impl PublicKey {
  pub fn n(&self) -> &BigInt {
    &self.n
  }

  pub fn n_square(&self) -> &BigInt {
    &self.n_square
  }

  pub fn g(&self) -> &BigInt {
    &self.g
  }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PrivateKey {
  pub(crate) lambda: BigInt,
  pub(crate) mu: BigInt,
  pub(crate) n: BigInt,
  pub(crate) n_square: BigInt,
}

impl PrivateKey {
  pub fn lambda(&self) -> &BigInt {
    &self.lambda
  }

  pub fn mu(&self) -> &BigInt {
    &self.mu
  }

  pub fn n(&self) -> &BigInt {
    &self.n
  }

  pub fn n_square(&self) -> &BigInt {
    &self.n_square
  }
}

/// Keys and the derivation record from a single call to [`generate_key_pair`](crate::generate_key_pair).
///
/// The parts are only handed out by reference or all together, so keys from different
/// generations cannot be recombined into one pair.
#[derive(Clone, Debug, PartialEq)]
pub struct KeyPair {
  pub(crate) public_key: PublicKey,
  pub(crate) private_key: PrivateKey,
  pub(crate) trace: KeyGenerationTrace,
}

impl KeyPair {
  pub fn public_key(&self) -> &PublicKey {
    &self.public_key
  }

  pub fn private_key(&self) -> &PrivateKey {
    &self.private_key
  }

  pub fn trace(&self) -> &KeyGenerationTrace {
    &self.trace
  }

  pub fn into_parts(self) -> (PublicKey, PrivateKey, KeyGenerationTrace) {
    (self.public_key, self.private_key, self.trace)
  }
}

/// Type representing a PlainText
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PlainText(pub(crate) BigInt);

impl PlainText {
  /// Checked constructor: `m` must lie in the plaintext space `[0, n)`.
  pub fn new(m: &BigInt, n: &BigInt) -> Result<Self> {
    if !m.is_negative() && m < n {
      Ok(PlainText(m.clone()))
    } else {
      Err(Error::MessageOutOfRange {
        message: m.clone(),
        n: n.clone(),
      })
    }
  }

  pub fn value(&self) -> &BigInt {
    &self.0
  }

  pub fn into_inner(self) -> BigInt {
    self.0
  }
}

impl From<BigInt> for PlainText {
  fn from(m: BigInt) -> Self {
    PlainText(m)
  }
}

impl fmt::Display for PlainText {
  fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
    write!(f, "{}", self.0)
  }
}

/// A ciphertext together with the modulus `n²` of the key that produced it.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CipherText {
  pub(crate) data: BigInt,
  pub(crate) n_square: BigInt,
}

impl CipherText {
  /// Binds an externally supplied integer to `key`, rejecting values outside `[0, n²)`.
  pub fn new(c: &BigInt, key: &PublicKey) -> Result<Self> {
    if *c >= Zero::zero() && *c < key.n_square {
      Ok(CipherText {
        data: c.clone(),
        n_square: key.n_square.clone(),
      })
    } else {
      Err(Error::CiphertextOutOfRange {
        ciphertext: c.clone(),
        n_square: key.n_square.clone(),
      })
    }
  }

  pub fn value(&self) -> &BigInt {
    &self.data
  }

  pub fn into_inner(self) -> BigInt {
    self.data
  }

  pub(crate) fn belongs_to(&self, key: &PublicKey) -> bool {
    self.n_square == key.n_square
  }
}

impl fmt::Display for CipherText {
  fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
    write!(f, "{}", self.data)
  }
}

impl Add<CipherText> for CipherText {
  type Output = Self;

  /// Homomorphically adds two ciphertexts so that the resulting ciphertext represents the sum of the underlying plaintexts.
  ///
  /// # Panics
  ///
  /// Will panic if the two ciphertexts are not encrypted using the same keyset.
  ///
  /// # Examples
  ///
  /// ```
  /// # use num::BigInt;
  /// # use paillier_tally::{generate_key_pair, encrypt, decrypt, PlainText};
  /// let key_pair = generate_key_pair(&BigInt::from(7), &BigInt::from(11)).unwrap();
  /// let c1 = encrypt(&PlainText::from(1), key_pair.public_key()).unwrap();
  /// let c2 = encrypt(&PlainText::from(1), key_pair.public_key()).unwrap();
  ///
  /// let c = c1.into_ciphertext() + c2.into_ciphertext();
  ///
  /// let decrypted = decrypt(&c, key_pair.private_key()).unwrap();
  ///
  /// assert_eq!(decrypted, PlainText::from(2));
  /// ```
  #[allow(clippy::suspicious_arithmetic_impl)]
  fn add(self, rhs: Self) -> <Self as Add<Self>>::Output {
    let CipherText {
      data: c1,
      n_square: c1_n_square,
    } = self;

    let CipherText {
      data: c2,
      n_square: c2_n_square,
    } = rhs;

    // Ensure ciphertexts were encrypted with the same keys
    assert_eq!(&c1_n_square, &c2_n_square);

    CipherText {
      data: (c1 * c2).modulo(&c1_n_square),
      n_square: c1_n_square,
    }
  }
}

/// Output of an encryption: the ciphertext and the blinding factor `r` it was drawn with.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EncryptionResult {
  pub(crate) ciphertext: CipherText,
  pub(crate) r: BigInt,
}

impl EncryptionResult {
  pub fn ciphertext(&self) -> &CipherText {
    &self.ciphertext
  }

  /// The blinding factor. Kept for display only; decryption never needs it.
  pub fn r(&self) -> &BigInt {
    &self.r
  }

  pub fn into_ciphertext(self) -> CipherText {
    self.ciphertext
  }
}

mod impls {
  use super::PlainText;
  use doc_comment::doc_comment;

  macro_rules! impl_from_for_single_plaintext {
    ($t: ty) => {
      impl ::std::convert::From<$t> for PlainText {
        doc_comment! {
          concat!("Convert from `", stringify!($t), "` to a `PlainText`
            Note: This is a raw conversion; the value is only checked against the plaintext
            space `0 <= x < n` when it is encrypted. For this crate's demo-scale keys `n` may
            be as small as a few dozen, so large primitives can be rejected at that point."
          ),
          fn from(x: $t) -> Self {
            PlainText(num::BigInt::from(x))
          }
        }
      }
    };
  }

  macro_rules! impl_from_for_plaintext {
    ($($t:ty),+) => {
      $(
        impl_from_for_single_plaintext!($t);
      )+
    };
  }

  impl_from_for_plaintext!(u8, u16, u32, u64, u128, usize, i8, i16, i32, i64, i128, isize);
}
