use num::BigInt;
use paillier_tally::voting::{tally, Ballot, Vote};
use paillier_tally::*;
use proptest::prelude::*;

fn cast_all(choices: &[Vote], key_pair: &KeyPair) -> Vec<Ballot> {
  choices
    .iter()
    .enumerate()
    .map(|(i, &choice)| {
      let mut ballot = Ballot::new(format!("voter-{}", i));
      ballot
        .cast(choice, key_pair.public_key())
        .expect("Couldn't cast ballot");
      ballot
    })
    .collect()
}

#[test]
fn three_voters_yes_yes_no() {
  let key_pair = generate_key_pair(&BigInt::from(7), &BigInt::from(11)).unwrap();
  let ballots = cast_all(&[Vote::Yes, Vote::Yes, Vote::No], &key_pair);

  let result = tally(&ballots, &key_pair).expect("Tally failed");

  assert_eq!(result.yes_votes(), &BigInt::from(2));
  assert_eq!(result.no_votes(), BigInt::from(1));
  assert_eq!(result.trace.ciphertext, result.aggregate);
  assert_eq!(
    decrypt(&result.aggregate, key_pair.private_key()),
    Ok(PlainText::from(2))
  );
}

#[test]
#[should_panic]
fn ballots_under_another_key_are_refused() {
  let ours = generate_key_pair(&BigInt::from(7), &BigInt::from(11)).unwrap();
  let theirs = generate_key_pair(&BigInt::from(11), &BigInt::from(13)).unwrap();
  let mut ballots = cast_all(&[Vote::Yes], &ours);
  ballots.extend(cast_all(&[Vote::Yes], &theirs));

  let _ = tally(&ballots, &ours);
}

proptest! {
  #![proptest_config(ProptestConfig { cases: 20, ..ProptestConfig::default() })]

  #[test]
  fn tally_counts_yes_votes(votes in prop::collection::vec(any::<bool>(), 1..60)) {
    let key_pair = generate_key_pair(&BigInt::from(101), &BigInt::from(103)).unwrap();
    let choices: Vec<Vote> = votes
      .iter()
      .map(|&yes| if yes { Vote::Yes } else { Vote::No })
      .collect();
    let ballots = cast_all(&choices, &key_pair);

    let result = tally(&ballots, &key_pair).unwrap();

    let expected = votes.iter().filter(|&&yes| yes).count() as u64;
    prop_assert_eq!(result.yes_votes_u64(), Some(expected));
    prop_assert_eq!(result.ballots_counted, votes.len());
  }
}
