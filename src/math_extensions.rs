use log::trace;
use num::bigint::Sign;
use num::traits::{One, Signed, ToPrimitive, Zero};
use num::{BigInt, Integer};
use rand::{CryptoRng, RngCore};

use crate::error::{Error, Result};

/// Number of random bases tried by Miller-Rabin. Bounds the false-positive rate by `4^-40`.
pub const MILLER_RABIN_ROUNDS: usize = 40;

/// Candidates below this bound are tested by trial division.
pub const TRIAL_DIVISION_LIMIT: u64 = 1 << 32;

/// The first [`MILLER_RABIN_ROUNDS`] primes. The first twelve alone decide primality
/// exactly below 3.3·10^24.
const FIXED_BASES: [u32; MILLER_RABIN_ROUNDS] = [
  2, 3, 5, 7, 11, 13, 17, 19, 23, 29, 31, 37, 41, 43, 47, 53, 59, 61, 67, 71, 73, 79, 83, 89,
  97, 101, 103, 107, 109, 113, 127, 131, 137, 139, 149, 151, 157, 163, 167, 173,
];

pub fn gcd(a: &BigInt, b: &BigInt) -> BigInt {
  a.gcd(b)
}

/// `lcm(a, b) = |a·b| / gcd(a, b)`, taken as zero when both inputs are zero.
pub fn lcm(a: &BigInt, b: &BigInt) -> BigInt {
  let divisor = gcd(a, b);
  if divisor.is_zero() {
    return BigInt::zero();
  }
  (a / &divisor * b).abs()
}

/// Modular exponentiation `base^exponent mod modulus`.
///
/// The result always lies in `[0, modulus)`; `exponent = 0` yields `1 mod modulus`.
pub fn mod_pow(base: &BigInt, exponent: &BigInt, modulus: &BigInt) -> Result<BigInt> {
  if *modulus < BigInt::one() {
    return Err(Error::InvalidModulus(modulus.clone()));
  }
  if exponent.is_negative() {
    return Err(Error::NegativeExponent(exponent.clone()));
  }
  Ok(power_mod(base, exponent, modulus))
}

/// Unchecked [`mod_pow`] for callers that already hold a positive modulus and a
/// non-negative exponent.
pub(crate) fn power_mod(base: &BigInt, exponent: &BigInt, modulus: &BigInt) -> BigInt {
  if *modulus == BigInt::one() {
    return BigInt::zero();
  }
  if exponent.is_zero() {
    return BigInt::one();
  }
  base.modulo(modulus).modpow(exponent, modulus)
}

/// Inverse of `a` modulo `modulus` by the extended Euclidean algorithm.
pub fn mod_inverse(a: &BigInt, modulus: &BigInt) -> Result<BigInt> {
  if *modulus < BigInt::one() {
    return Err(Error::InvalidModulus(modulus.clone()));
  }

  let mut remainders = (modulus.clone(), a.modulo(modulus));
  let mut coefficients = (BigInt::zero(), BigInt::one());
  while !remainders.1.is_zero() {
    let quotient = &remainders.0 / &remainders.1;
    let next = &remainders.0 - &quotient * &remainders.1;
    coefficients = (
      coefficients.1.clone(),
      coefficients.0 - quotient * coefficients.1,
    );
    remainders = (remainders.1, next);
  }

  // remainders.0 is now gcd(a, modulus)
  if remainders.0 != BigInt::one() {
    return Err(Error::NoInverse {
      value: a.clone(),
      modulus: modulus.clone(),
      gcd: remainders.0,
    });
  }
  Ok(coefficients.0.modulo(modulus))
}

pub(crate) fn div(a: &BigInt, b: &BigInt) -> BigInt {
  let (quotient, _remainder) = a.div_rem(b);
  quotient
}

/// `L(x) = (x - 1) / n`
pub(crate) fn l_function(x: &BigInt, n: &BigInt) -> BigInt {
  div(&(x - BigInt::one()), n)
}

/// Primality test: trial division below [`TRIAL_DIVISION_LIMIT`], Miller-Rabin above it.
pub fn is_prime(candidate: &BigInt) -> bool {
  is_prime_with_rng(candidate, &mut rand::thread_rng())
}

pub fn is_prime_with_rng<R: RngCore + CryptoRng>(candidate: &BigInt, rng: &mut R) -> bool {
  if let Some(verdict) = small_prime_verdict(candidate) {
    return verdict;
  }
  // Bases are drawn from [2, candidate - 2]
  let base_range = candidate - BigInt::from(3);
  let bases: Vec<BigInt> = (0..MILLER_RABIN_ROUNDS)
    .map(|_| BigInt::from(2) + sample_below(&base_range, rng))
    .collect();
  miller_rabin(candidate, &bases)
}

/// Same verdicts as [`is_prime`] but with fixed Miller-Rabin bases, so the answer never
/// depends on a random draw.
pub fn is_prime_deterministic(candidate: &BigInt) -> bool {
  if let Some(verdict) = small_prime_verdict(candidate) {
    return verdict;
  }
  let bases: Vec<BigInt> = FIXED_BASES.iter().map(|&base| BigInt::from(base)).collect();
  miller_rabin(candidate, &bases)
}

/// Trial-division answer for candidates below [`TRIAL_DIVISION_LIMIT`].
fn small_prime_verdict(candidate: &BigInt) -> Option<bool> {
  if *candidate < BigInt::from(2) {
    return Some(false);
  }
  match candidate.to_u64() {
    Some(small) if small < TRIAL_DIVISION_LIMIT => Some(primes::is_prime(small)),
    _ => None,
  }
}

/// Every base must lie in `[2, candidate - 2]`.
fn miller_rabin(candidate: &BigInt, bases: &[BigInt]) -> bool {
  if candidate.is_even() {
    return false;
  }

  let one = BigInt::one();
  let two = BigInt::from(2);
  let candidate_minus_one = candidate - &one;

  let mut d = candidate_minus_one.clone();
  let mut s = 0usize;
  while d.is_even() {
    d = d / &two;
    s += 1;
  }

  trace!(
    "running {} Miller-Rabin rounds on a {}-bit candidate",
    bases.len(),
    candidate.bits()
  );

  'rounds: for base in bases {
    let mut x = power_mod(base, &d, candidate);
    if x == one || x == candidate_minus_one {
      continue;
    }
    for _ in 1..s {
      x = power_mod(&x, &two, candidate);
      if x == candidate_minus_one {
        continue 'rounds;
      }
    }
    return false;
  }
  true
}

/// Uniform integer in `[min, max]` from the thread-local cryptographic generator.
pub fn random_in_range(min: &BigInt, max: &BigInt) -> Result<BigInt> {
  random_in_range_with_rng(min, max, &mut rand::thread_rng())
}

pub fn random_in_range_with_rng<R: RngCore + CryptoRng>(
  min: &BigInt,
  max: &BigInt,
  rng: &mut R,
) -> Result<BigInt> {
  if min > max {
    return Err(Error::EmptyRange {
      min: min.clone(),
      max: max.clone(),
    });
  }
  let range = max - min + BigInt::one();
  Ok(min + sample_below(&range, rng))
}

/// Rejection sampling over the smallest whole number of bytes covering `range`.
/// `range` must be positive.
fn sample_below<R: RngCore + CryptoRng>(range: &BigInt, rng: &mut R) -> BigInt {
  let width = (range.bits() + 7) / 8;
  let mut buffer = vec![0u8; width];
  loop {
    rng.fill_bytes(&mut buffer);
    let candidate = BigInt::from_bytes_be(Sign::Plus, &buffer);
    if candidate < *range {
      return candidate;
    }
  }
}

/// All primes in `[min, max]`, ascending.
pub fn find_primes_in_range(min: &BigInt, max: &BigInt) -> Vec<BigInt> {
  let mut rng = rand::thread_rng();
  let mut candidate = std::cmp::max(min.clone(), BigInt::from(2));
  let mut found = Vec::new();
  while candidate <= *max {
    if is_prime_with_rng(&candidate, &mut rng) {
      found.push(candidate.clone());
    }
    candidate += BigInt::one();
  }
  found
}

pub(crate) fn gen_prime(bits: usize) -> Option<BigInt> {
  glass_pumpkin::prime::new(bits)
    .ok()
    .map(|big| BigInt::from_biguint(Sign::Plus, big))
}

pub trait Modulo<RHS = Self> {
  type Output;
  fn modulo(&self, rhs: &RHS) -> Self::Output;
}

impl Modulo<BigInt> for BigInt {
  type Output = BigInt;
  fn modulo(&self, rhs: &BigInt) -> Self::Output {
    let r = self % rhs;
    if r < BigInt::zero() {
      r + rhs.abs()
    } else {
      r
    }
  }
}
