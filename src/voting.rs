//! Encrypted yes/no tallying: each voter's choice is encrypted once, the ciphertexts are
//! multiplied together, and only the aggregate is ever decrypted.

use log::{info, warn};
use num::traits::ToPrimitive;
use num::BigInt;

use crate::error::{Error, Result};
use crate::trace::DecryptionTrace;
use crate::types::{CipherText, EncryptionResult, KeyPair, PlainText, PublicKey};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Vote {
  No,
  Yes,
}

impl From<Vote> for PlainText {
  fn from(vote: Vote) -> Self {
    match vote {
      Vote::No => PlainText::from(0u8),
      Vote::Yes => PlainText::from(1u8),
    }
  }
}

/// One voter's record. Starts unset and is encrypted exactly once by [`Ballot::cast`].
#[derive(Clone, Debug, PartialEq)]
pub struct Ballot {
  voter_id: String,
  choice: Option<Vote>,
  encryption: Option<EncryptionResult>,
}

impl Ballot {
  pub fn new<S: Into<String>>(voter_id: S) -> Self {
    Ballot {
      voter_id: voter_id.into(),
      choice: None,
      encryption: None,
    }
  }

  pub fn voter_id(&self) -> &str {
    &self.voter_id
  }

  pub fn choice(&self) -> Option<Vote> {
    self.choice
  }

  pub fn encryption(&self) -> Option<&EncryptionResult> {
    self.encryption.as_ref()
  }

  /// Encrypts `choice` under `key`. A ballot that was already cast is left untouched.
  pub fn cast(&mut self, choice: Vote, key: &PublicKey) -> Result<&EncryptionResult> {
    if self.encryption.is_some() {
      return Err(Error::AlreadyCast {
        voter_id: self.voter_id.clone(),
      });
    }
    let encryption = crate::encrypt(&PlainText::from(choice), key)?;
    self.choice = Some(choice);
    let stored: &EncryptionResult = self.encryption.get_or_insert(encryption);
    Ok(stored)
  }
}

/// Outcome of [`tally`]: the aggregate ciphertext and its decryption steps.
#[derive(Clone, Debug, PartialEq)]
pub struct TallyResult {
  pub ballots_counted: usize,
  pub aggregate: CipherText,
  pub trace: DecryptionTrace,
}

impl TallyResult {
  pub fn yes_votes(&self) -> &BigInt {
    self.trace.message.value()
  }

  /// Yes-votes as a machine integer, when it fits.
  pub fn yes_votes_u64(&self) -> Option<u64> {
    self.yes_votes().to_u64()
  }

  pub fn no_votes(&self) -> BigInt {
    BigInt::from(self.ballots_counted) - self.yes_votes()
  }
}

/// Sums every cast ballot homomorphically and decrypts only the total. Unset ballots are skipped.
///
/// # Panics
///
/// Panics if a ballot was cast under a different public key than `key_pair`'s.
pub fn tally(ballots: &[Ballot], key_pair: &KeyPair) -> Result<TallyResult> {
  let ciphertexts: Vec<CipherText> = ballots
    .iter()
    .filter_map(|ballot| ballot.encryption())
    .map(|encryption| encryption.ciphertext().clone())
    .collect();

  let counted = BigInt::from(ciphertexts.len());
  if counted >= *key_pair.public_key().n() {
    warn!(
      "{} ballots reach the plaintext modulus {}, the tally will wrap around",
      counted,
      key_pair.public_key().n()
    );
  }

  let aggregate = crate::homomorphic_sum(&ciphertexts, key_pair.public_key())?;
  let trace = crate::decrypt_with_trace(&aggregate, key_pair.private_key())?;
  info!(
    "tallied {} of {} ballots: {} yes",
    ciphertexts.len(),
    ballots.len(),
    trace.message
  );

  Ok(TallyResult {
    ballots_counted: ciphertexts.len(),
    aggregate,
    trace,
  })
}
