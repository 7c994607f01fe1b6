use std::cmp::Ordering;

use itertools::Itertools;

use lequinte_db::models::{Candidate, RaceType, MAX_NUMBER, MIN_NUMBER, PICK_COUNT};
use lequinte_db::store::WeightStore;

use crate::config::EngineConfig;

/// C(16, 5)
pub const COMBINATION_COUNT: usize = 4368;

/// Every 5-number subset of 1-16, ascending inside a subset and in
/// lexicographic order across subsets.
pub fn all_combinations() -> impl Iterator<Item = [u8; PICK_COUNT]> {
    (MIN_NUMBER..=MAX_NUMBER)
        .combinations(PICK_COUNT)
        .map(|c| [c[0], c[1], c[2], c[3], c[4]])
}

fn combination_sum(numbers: &[u8; PICK_COUNT]) -> u32 {
    numbers.iter().map(|&n| n as u32).sum()
}

/// Subsets whose sum lies in `min..=max`, before scoring.
pub fn combinations_in_bounds(min: u32, max: u32) -> impl Iterator<Item = [u8; PICK_COUNT]> {
    all_combinations().filter(move |c| (min..=max).contains(&combination_sum(c)))
}

pub fn qualifying_combinations(race_type: RaceType) -> impl Iterator<Item = [u8; PICK_COUNT]> {
    all_combinations().filter(move |c| race_type.accepts_sum(combination_sum(c)))
}

pub fn count_qualifying(race_type: RaceType) -> usize {
    qualifying_combinations(race_type).count()
}

/// Highest score first; equal scores keep the lexicographic order of the numbers.
fn rank(a: &Candidate, b: &Candidate) -> Ordering {
    b.score
        .partial_cmp(&a.score)
        .unwrap_or(Ordering::Equal)
        .then_with(|| a.numbers.cmp(&b.numbers))
}

/// Top `config.top_k` combinations for `race_type`, scored with `store`.
pub fn generate_candidates(
    race_type: RaceType,
    store: &WeightStore,
    config: &EngineConfig,
) -> Vec<Candidate> {
    let (min, max) = race_type.sum_bounds();
    generate_in_bounds(min, max, store, config)
}

/// Top `config.top_k` combinations whose sum lies in `min..=max`.
///
/// An empty vector means no subset satisfies the bounds.
pub fn generate_in_bounds(
    min: u32,
    max: u32,
    store: &WeightStore,
    config: &EngineConfig,
) -> Vec<Candidate> {
    let mut candidates: Vec<Candidate> = combinations_in_bounds(min, max)
        .map(|numbers| Candidate {
            score: store.score(&numbers),
            numbers,
        })
        .collect();

    log::debug!(
        "{} combinaisons sur {COMBINATION_COUNT} dans les bornes {min}-{max}",
        candidates.len()
    );

    candidates.sort_by(rank);
    candidates.truncate(config.top_k);
    candidates
}
