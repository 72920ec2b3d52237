//! Paillier cryptosystem over arbitrary-precision integers, with `g = n + 1`.
//!
//! Key pairs are derived from caller-chosen primes, ciphertexts combine additively, and
//! both key derivation and decryption can report every intermediate value. The key
//! sizes this crate is used with are demonstration scale and offer no real security.

use log::{debug, warn};
use num::traits::{One, Signed};
use num::BigInt;
use rand::{CryptoRng, RngCore};

mod error;
mod math_extensions;
mod trace;
mod types;
pub mod voting;

pub use crate::error::{Error, InvalidPrimePair, Result};
pub use crate::math_extensions::{
  find_primes_in_range, gcd, is_prime, is_prime_deterministic, is_prime_with_rng, lcm,
  mod_inverse, mod_pow, random_in_range, random_in_range_with_rng, Modulo, MILLER_RABIN_ROUNDS,
  TRIAL_DIVISION_LIMIT,
};
pub use crate::trace::{DecryptionTrace, KeyGenerationTrace};
pub use crate::types::{CipherText, EncryptionResult, KeyPair, PlainText, PrivateKey, PublicKey};

use crate::math_extensions::{gen_prime, l_function, power_mod};

/// Moduli shorter than this are accepted but logged as insecure.
pub const RECOMMENDED_MODULUS_BITS: usize = 2048;

/// Smallest prime size `glass_pumpkin` will generate.
pub const MIN_PRIME_BITS: usize = 128;

/// Derives a key pair from the primes `p` and `q`. Uses no randomness.
///
/// Fails when either input is not prime, when `p == q`, or when `gcd(n, λ) != 1`
/// (which happens exactly when `p | q - 1` or `q | p - 1`).
pub fn generate_key_pair(p: &BigInt, q: &BigInt) -> Result<KeyPair> {
  for value in &[p, q] {
    if !is_prime_deterministic(value) {
      return Err(InvalidPrimePair::NotPrime {
        value: (*value).clone(),
      }
      .into());
    }
  }

  let one = BigInt::one();
  let n = p * q;
  let n_square = &n * &n;
  let g = &n + &one;
  let p_minus_one = p - &one;
  let q_minus_one = q - &one;
  let lambda = lcm(&p_minus_one, &q_minus_one);
  let divisor = gcd(&n, &lambda);

  if p == q {
    return Err(
      InvalidPrimePair::EqualPrimes {
        p: p.clone(),
        n,
        lambda,
        gcd: divisor,
      }
      .into(),
    );
  }
  if divisor != one {
    return Err(
      InvalidPrimePair::NotCoprime {
        n,
        lambda,
        gcd: divisor,
      }
      .into(),
    );
  }

  let g_lambda = power_mod(&g, &lambda, &n_square);
  let l_value = l_function(&g_lambda, &n);
  let mu = mod_inverse(&l_value, &n)?;

  if n.bits() < RECOMMENDED_MODULUS_BITS {
    warn!(
      "Paillier modulus is {} bits, below the recommended {} bits",
      n.bits(),
      RECOMMENDED_MODULUS_BITS
    );
  }
  debug!("derived Paillier key pair with n = {}, λ = {}, μ = {}", n, lambda, mu);

  let trace = KeyGenerationTrace {
    p: p.clone(),
    q: q.clone(),
    n: n.clone(),
    n_square: n_square.clone(),
    g: g.clone(),
    p_minus_one,
    q_minus_one,
    lambda: lambda.clone(),
    g_lambda,
    l_value,
    mu: mu.clone(),
  };

  Ok(KeyPair {
    public_key: PublicKey {
      n: n.clone(),
      n_square: n_square.clone(),
      g,
    },
    private_key: PrivateKey {
      lambda,
      mu,
      n,
      n_square,
    },
    trace,
  })
}

/// Draws random `bits`-bit primes until they form a valid pair, then derives the keys.
///
/// `bits` must be at least [`MIN_PRIME_BITS`].
pub fn generate_random_key_pair(bits: usize) -> Result<KeyPair> {
  if bits < MIN_PRIME_BITS {
    return Err(Error::PrimeTooSmall {
      bits,
      min_bits: MIN_PRIME_BITS,
    });
  }
  loop {
    let p = gen_prime(bits).ok_or(Error::PrimeGeneration { bits })?;
    let q = gen_prime(bits).ok_or(Error::PrimeGeneration { bits })?;
    match generate_key_pair(&p, &q) {
      Err(Error::InvalidPrimePair(reason)) => debug!("redrawing primes: {}", reason),
      result => return result,
    }
  }
}

/// Encrypts `plaintext` under `key` with a fresh blinding factor from the thread-local generator.
pub fn encrypt(plaintext: &PlainText, key: &PublicKey) -> Result<EncryptionResult> {
  encrypt_with_rng(plaintext, key, &mut rand::thread_rng())
}

/// [`encrypt`] with a caller-supplied generator, which must be cryptographically secure.
pub fn encrypt_with_rng<R: RngCore + CryptoRng>(
  plaintext: &PlainText,
  key: &PublicKey,
  rng: &mut R,
) -> Result<EncryptionResult> {
  let PublicKey {
    ref n,
    ref g,
    ref n_square,
  } = key;

  let PlainText(m) = PlainText::new(plaintext.value(), n)?;
  let r = blinding_factor(n, rng)?;
  let c = (power_mod(g, &m, n_square) * power_mod(&r, n, n_square)).modulo(n_square);

  Ok(EncryptionResult {
    ciphertext: CipherText {
      data: c,
      n_square: n_square.clone(),
    },
    r,
  })
}

/// Uniform `r` in `[2, n - 1]` with `gcd(r, n) = 1`.
fn blinding_factor<R: RngCore + CryptoRng>(n: &BigInt, rng: &mut R) -> Result<BigInt> {
  let one = BigInt::one();
  let low = BigInt::from(2);
  let high = n - &one;
  loop {
    let r = random_in_range_with_rng(&low, &high, rng)?;
    if gcd(&r, n) == one {
      return Ok(r);
    }
    debug!("blinding factor shares a factor with n, resampling");
  }
}

fn check_ciphertext(ciphertext: &CipherText, key: &PrivateKey) -> Result<()> {
  let c = ciphertext.value();
  if c.is_negative() || *c >= key.n_square {
    return Err(Error::CiphertextOutOfRange {
      ciphertext: c.clone(),
      n_square: key.n_square.clone(),
    });
  }
  Ok(())
}

/// Recovers the plaintext of `ciphertext`.
///
/// A ciphertext from another key pair still decrypts, to a meaningless value.
pub fn decrypt(ciphertext: &CipherText, key: &PrivateKey) -> Result<PlainText> {
  check_ciphertext(ciphertext, key)?;
  let PrivateKey {
    ref lambda,
    ref mu,
    ref n,
    ref n_square,
  } = key;

  let m = (l_function(&power_mod(ciphertext.value(), lambda, n_square), n) * mu).modulo(n);
  Ok(PlainText(m))
}

/// Same computation as [`decrypt`], keeping every intermediate value.
pub fn decrypt_with_trace(ciphertext: &CipherText, key: &PrivateKey) -> Result<DecryptionTrace> {
  check_ciphertext(ciphertext, key)?;
  let c_lambda = power_mod(ciphertext.value(), &key.lambda, &key.n_square);
  let l_value = l_function(&c_lambda, &key.n);
  let l_times_mu = &l_value * &key.mu;
  let message = PlainText(l_times_mu.modulo(&key.n));

  Ok(DecryptionTrace {
    ciphertext: ciphertext.clone(),
    lambda: key.lambda.clone(),
    n_square: key.n_square.clone(),
    c_lambda,
    n: key.n.clone(),
    l_value,
    mu: key.mu.clone(),
    l_times_mu,
    message,
  })
}

fn assert_same_key(ciphertext: &CipherText, key: &PublicKey) {
  assert!(
    ciphertext.belongs_to(key),
    "ciphertext was not encrypted under the given public key"
  );
}

/// `c1 · c2 mod n²`, an encryption of `m1 + m2 mod n`.
///
/// # Panics
///
/// Panics if either ciphertext was produced under a different public key.
pub fn homomorphic_add(c1: &CipherText, c2: &CipherText, key: &PublicKey) -> CipherText {
  assert_same_key(c1, key);
  assert_same_key(c2, key);
  CipherText {
    data: (c1.value() * c2.value()).modulo(&key.n_square),
    n_square: key.n_square.clone(),
  }
}

/// `c^scalar mod n²`, an encryption of `scalar · m mod n`.
///
/// Negative scalars are first reduced modulo `n`.
///
/// # Panics
///
/// Panics if `ciphertext` was produced under a different public key.
pub fn homomorphic_multiply_scalar(
  ciphertext: &CipherText,
  scalar: &BigInt,
  key: &PublicKey,
) -> CipherText {
  assert_same_key(ciphertext, key);
  let exponent = if scalar.is_negative() {
    scalar.modulo(&key.n)
  } else {
    scalar.clone()
  };
  CipherText {
    data: power_mod(ciphertext.value(), &exponent, &key.n_square),
    n_square: key.n_square.clone(),
  }
}

/// Folds `ciphertexts` with [`homomorphic_add`]. The result decrypts to the sum of the
/// plaintexts modulo `n`, so callers must keep the true sum below `n`.
///
/// # Panics
///
/// Panics if any ciphertext was produced under a different public key.
pub fn homomorphic_sum(ciphertexts: &[CipherText], key: &PublicKey) -> Result<CipherText> {
  let (first, rest) = ciphertexts.split_first().ok_or(Error::EmptyTally)?;
  assert_same_key(first, key);
  Ok(
    rest
      .iter()
      .fold(first.clone(), |sum, c| homomorphic_add(&sum, c, key)),
  )
}

#[cfg(test)]
mod tests {
  use super::*;
  use proptest::prelude::*;

  fn demo_key_pair() -> KeyPair {
    generate_key_pair(&BigInt::from(7), &BigInt::from(11)).expect("7 and 11 form a valid pair")
  }

  #[test]
  fn key_generation_for_seven_and_eleven() {
    let key_pair = demo_key_pair();
    let trace = key_pair.trace();
    assert_eq!(trace.n, BigInt::from(77));
    assert_eq!(trace.n_square, BigInt::from(5929));
    assert_eq!(trace.g, BigInt::from(78));
    assert_eq!(trace.p_minus_one, BigInt::from(6));
    assert_eq!(trace.q_minus_one, BigInt::from(10));
    assert_eq!(trace.lambda, BigInt::from(30));
    assert_eq!(trace.g_lambda, BigInt::from(2311));
    assert_eq!(trace.l_value, BigInt::from(30));
    assert_eq!(trace.mu, BigInt::from(18));

    assert_eq!(key_pair.public_key().g(), &BigInt::from(78));
    assert_eq!(key_pair.private_key().mu(), &BigInt::from(18));
    assert_eq!(key_pair.private_key().n_square(), key_pair.public_key().n_square());
  }

  #[test]
  fn encryption_rejects_out_of_range_messages() {
    let key_pair = demo_key_pair();
    assert_eq!(
      encrypt(&PlainText::from(77), key_pair.public_key()),
      Err(Error::MessageOutOfRange {
        message: BigInt::from(77),
        n: BigInt::from(77),
      })
    );
    assert!(encrypt(&PlainText::from(-1), key_pair.public_key()).is_err());
  }

  #[test]
  fn blinding_factor_is_coprime_and_in_range() {
    let key_pair = demo_key_pair();
    for _ in 0..200 {
      let result = encrypt(&PlainText::from(5), key_pair.public_key()).unwrap();
      assert!(*result.r() >= BigInt::from(2) && *result.r() <= BigInt::from(76));
      assert_eq!(gcd(result.r(), &BigInt::from(77)), BigInt::one());
      assert!(*result.ciphertext().value() < BigInt::from(5929));
    }
  }

  #[test]
  fn decryption_rejects_out_of_range_ciphertexts() {
    let key_pair = demo_key_pair();
    let big = generate_key_pair(&BigInt::from(11), &BigInt::from(13)).unwrap();
    let c = CipherText::new(&BigInt::from(10_000), big.public_key()).unwrap();
    assert_eq!(
      decrypt(&c, key_pair.private_key()),
      Err(Error::CiphertextOutOfRange {
        ciphertext: BigInt::from(10_000),
        n_square: BigInt::from(5929),
      })
    );
    assert!(decrypt_with_trace(&c, key_pair.private_key()).is_err());
  }

  #[test]
  fn scalar_multiplication_matches_exponentiation() {
    let key_pair = demo_key_pair();
    let key = key_pair.public_key();
    let c = CipherText::new(&BigInt::from(1234), key).unwrap();
    let product = homomorphic_multiply_scalar(&c, &BigInt::from(3), key);
    assert_eq!(product.value(), &BigInt::from(1234i64.pow(3) % 5929));
  }

  #[test]
  fn negative_scalar_wraps_modulo_n() {
    let key_pair = demo_key_pair();
    let c = encrypt(&PlainText::from(4), key_pair.public_key())
      .unwrap()
      .into_ciphertext();
    let product = homomorphic_multiply_scalar(&c, &BigInt::from(-1), key_pair.public_key());
    assert_eq!(
      decrypt(&product, key_pair.private_key()),
      Ok(PlainText::from(73))
    );
  }

  #[test]
  fn empty_sum_is_rejected() {
    let key_pair = demo_key_pair();
    assert_eq!(
      homomorphic_sum(&[], key_pair.public_key()),
      Err(Error::EmptyTally)
    );
  }

  #[test]
  #[should_panic(expected = "not encrypted under the given public key")]
  fn homomorphic_add_refuses_foreign_ciphertexts() {
    let ours = demo_key_pair();
    let theirs = generate_key_pair(&BigInt::from(11), &BigInt::from(13)).unwrap();
    let c1 = encrypt(&PlainText::from(1), ours.public_key()).unwrap();
    let c2 = encrypt(&PlainText::from(1), theirs.public_key()).unwrap();
    homomorphic_add(c1.ciphertext(), c2.ciphertext(), ours.public_key());
  }

  #[test]
  fn traces_render_every_step() {
    let key_pair = demo_key_pair();
    let rendered = key_pair.trace().to_string();
    assert!(rendered.contains("n = p·q = 77"));
    assert!(rendered.contains("μ = L(g^λ mod n²)⁻¹ mod n = 18"));

    let c = encrypt(&PlainText::from(1), key_pair.public_key())
      .unwrap()
      .into_ciphertext();
    let trace = decrypt_with_trace(&c, key_pair.private_key()).unwrap();
    assert!(trace.to_string().ends_with("mod 77 = 1"));
  }

  proptest! {
    #![proptest_config(ProptestConfig { cases: 50, ..ProptestConfig::default() })]

    #[test]
    fn every_ciphertext_decrypts(value in 0i64..5929) {
      let key_pair = demo_key_pair();
      let c = CipherText::new(&BigInt::from(value), key_pair.public_key()).unwrap();
      let trace = decrypt_with_trace(&c, key_pair.private_key()).unwrap();
      prop_assert_eq!(decrypt(&c, key_pair.private_key()).unwrap(), trace.message.clone());
      prop_assert!(trace.message.value() < &BigInt::from(77));
    }
  }
}
