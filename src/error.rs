use num::BigInt;

/// Reasons a `(p, q)` pair cannot produce a Paillier key pair.
///
/// The messages carry `n`, `λ` and `gcd(n, λ)` so they can be shown to the user verbatim.
#[derive(thiserror::Error, Clone, Debug, PartialEq)]
pub enum InvalidPrimePair {
  #[error("{value} is not prime")]
  NotPrime { value: BigInt },
  #[error("p and q must be distinct, both are {p} (n = {n}, λ = {lambda}, gcd(n, λ) = {gcd})")]
  EqualPrimes {
    p: BigInt,
    n: BigInt,
    lambda: BigInt,
    gcd: BigInt,
  },
  #[error("gcd(n, λ) must be 1 (n = {n}, λ = {lambda}, gcd(n, λ) = {gcd})")]
  NotCoprime {
    n: BigInt,
    lambda: BigInt,
    gcd: BigInt,
  },
}

#[derive(thiserror::Error, Clone, Debug, PartialEq)]
pub enum Error {
  #[error("invalid prime pair: {0}")]
  InvalidPrimePair(#[from] InvalidPrimePair),
  #[error("{value} has no inverse modulo {modulus} (gcd = {gcd})")]
  NoInverse {
    value: BigInt,
    modulus: BigInt,
    gcd: BigInt,
  },
  #[error("message {message} is outside the plaintext space [0, {n})")]
  MessageOutOfRange { message: BigInt, n: BigInt },
  #[error("ciphertext {ciphertext} is outside the ciphertext space [0, {n_square})")]
  CiphertextOutOfRange {
    ciphertext: BigInt,
    n_square: BigInt,
  },
  #[error("cannot sample from the empty range [{min}, {max}]")]
  EmptyRange { min: BigInt, max: BigInt },
  #[error("modulus must be at least 1, got {0}")]
  InvalidModulus(BigInt),
  #[error("negative exponent {0}")]
  NegativeExponent(BigInt),
  #[error("cannot tally an empty set of ciphertexts")]
  EmptyTally,
  #[error("{bits}-bit primes requested, at least {min_bits} bits are required")]
  PrimeTooSmall { bits: usize, min_bits: usize },
  #[error("could not generate a {bits}-bit prime")]
  PrimeGeneration { bits: usize },
  #[error("voter {voter_id} has already cast a ballot")]
  AlreadyCast { voter_id: String },
}

pub type Result<T> = std::result::Result<T, Error>;
