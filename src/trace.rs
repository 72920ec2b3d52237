//! Step-by-step records of key derivation and decryption, for display and audit.

use num::BigInt;
use std::fmt;

use crate::types::{CipherText, PlainText};

/// Every intermediate value computed while deriving a key pair from `(p, q)`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct KeyGenerationTrace {
  pub p: BigInt,
  pub q: BigInt,
  pub n: BigInt,
  pub n_square: BigInt,
  pub g: BigInt,
  pub p_minus_one: BigInt,
  pub q_minus_one: BigInt,
  pub lambda: BigInt,
  /// `g^λ mod n²`
  pub g_lambda: BigInt,
  /// `L(g^λ mod n²)`
  pub l_value: BigInt,
  pub mu: BigInt,
}

impl fmt::Display for KeyGenerationTrace {
  fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
    writeln!(f, "p = {}, q = {}", self.p, self.q)?;
    writeln!(f, "n = p·q = {}", self.n)?;
    writeln!(f, "n² = {}", self.n_square)?;
    writeln!(f, "g = n + 1 = {}", self.g)?;
    writeln!(
      f,
      "λ = lcm(p - 1, q - 1) = lcm({}, {}) = {}",
      self.p_minus_one, self.q_minus_one, self.lambda
    )?;
    writeln!(f, "g^λ mod n² = {}", self.g_lambda)?;
    writeln!(f, "L(g^λ mod n²) = (g^λ mod n² - 1) / n = {}", self.l_value)?;
    write!(f, "μ = L(g^λ mod n²)⁻¹ mod n = {}", self.mu)
  }
}

/// Every intermediate value of one decryption.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DecryptionTrace {
  pub ciphertext: CipherText,
  pub lambda: BigInt,
  pub n_square: BigInt,
  /// `c^λ mod n²`
  pub c_lambda: BigInt,
  pub n: BigInt,
  /// `L(c^λ mod n²)`
  pub l_value: BigInt,
  pub mu: BigInt,
  /// `L · μ` before the final reduction modulo `n`
  pub l_times_mu: BigInt,
  pub message: PlainText,
}

impl fmt::Display for DecryptionTrace {
  fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
    writeln!(f, "c = {}", self.ciphertext)?;
    writeln!(
      f,
      "c^λ mod n² = {}^{} mod {} = {}",
      self.ciphertext, self.lambda, self.n_square, self.c_lambda
    )?;
    writeln!(
      f,
      "L(c^λ mod n²) = ({} - 1) / {} = {}",
      self.c_lambda, self.n, self.l_value
    )?;
    writeln!(f, "L · μ = {} · {} = {}", self.l_value, self.mu, self.l_times_mu)?;
    write!(f, "m = {} mod {} = {}", self.l_times_mu, self.n, self.message)
  }
}
