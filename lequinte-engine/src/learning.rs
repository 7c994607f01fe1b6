use std::path::Path;

use thiserror::Error;

use lequinte_db::models::{is_valid_number, parse_result, RaceResult, ResultError};
use lequinte_db::store::{save_store, StoreError, WeightStore};

use crate::config::EngineConfig;

#[derive(Debug, Error)]
pub enum LearnError {
    #[error(transparent)]
    Input(#[from] ResultError),
    #[error(transparent)]
    Store(#[from] StoreError),
}

impl LearnError {
    /// True when the user typed something unusable, as opposed to a storage failure.
    pub fn is_input_error(&self) -> bool {
        matches!(self, LearnError::Input(_))
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct LearnReport {
    /// (number, bonus) in finishing order.
    pub bonuses: Vec<(u8, f64)>,
    pub total_bonus: f64,
}

/// Bonus earned by each position of an `len`-long result: `step * (len - i)`.
///
/// Out-of-pool numbers keep their position but get no entry.
pub fn bonuses(numbers: &[u8], step: f64) -> Vec<(u8, f64)> {
    let len = numbers.len();
    numbers
        .iter()
        .enumerate()
        .filter(|&(_, &n)| is_valid_number(n))
        .map(|(i, &n)| (n, step * (len - i) as f64))
        .collect()
}

/// Adds the position bonuses of `result` to `store`, in memory only.
pub fn apply_result(store: &mut WeightStore, result: &RaceResult, config: &EngineConfig) -> LearnReport {
    let bonuses = bonuses(result.numbers(), config.bonus_step);
    let mut total_bonus = 0.0;
    for &(number, bonus) in &bonuses {
        if store.add(number, bonus) {
            total_bonus += bonus;
            log::debug!("#{number} +{bonus:.2} -> {:.2}", store.get(number).unwrap_or_default());
        }
    }
    LearnReport { bonuses, total_bonus }
}

/// Applies `result` and rewrites the whole store at `path`.
///
/// If the write fails the in-memory store is rolled back, so it always
/// matches what is on disk.
pub fn learn(
    store: &mut WeightStore,
    result: &RaceResult,
    config: &EngineConfig,
    path: &Path,
) -> Result<LearnReport, LearnError> {
    let mut updated = store.clone();
    let report = apply_result(&mut updated, result, config);
    save_store(&updated, path)?;
    *store = updated;
    log::info!("Résultat {result} appris (+{:.2} au total)", report.total_bonus);
    Ok(report)
}

/// Parses a "5/2/3/6/16"-style result and learns from it.
///
/// Nothing is applied or written when the text yields fewer than three usable numbers.
pub fn learn_from_text(
    store: &mut WeightStore,
    input: &str,
    config: &EngineConfig,
    path: &Path,
) -> Result<LearnReport, LearnError> {
    let result = parse_result(input)?;
    learn(store, &result, config, path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use lequinte_db::store::load_store;

    const EPS: f64 = 1e-9;

    #[test]
    fn test_bonus_schedule_five() {
        let b = bonuses(&[5, 2, 3, 6, 16], 0.3);
        let expected: [(u8, f64); 5] = [(5, 1.5), (2, 1.2), (3, 0.9), (6, 0.6), (16, 0.3)];
        assert_eq!(b.len(), 5);
        for ((n, w), (en, ew)) in b.iter().zip(expected.iter()) {
            assert_eq!(n, en);
            assert!((w - ew).abs() < EPS, "#{} : {} != {}", n, w, ew);
        }
    }

    #[test]
    fn test_bonus_total_triangular() {
        for len in 3..=5usize {
            let numbers: Vec<u8> = (1..=len as u8).collect();
            let total: f64 = bonuses(&numbers, 0.3).iter().map(|(_, w)| w).sum();
            let expected = 0.3 * (len * (len + 1) / 2) as f64;
            assert!((total - expected).abs() < EPS);
        }
    }

    #[test]
    fn test_bonus_ignores_out_of_domain() {
        let b = bonuses(&[20, 4, 0], 0.3);
        assert_eq!(b.len(), 1);
        assert_eq!(b[0].0, 4);
        assert!((b[0].1 - 0.6).abs() < EPS);
    }

    #[test]
    fn test_apply_result() {
        let mut store = WeightStore::new();
        let result = RaceResult::new(vec![5, 2, 3, 6, 16]).unwrap();
        let report = apply_result(&mut store, &result, &EngineConfig::default());

        assert!((store.get(5).unwrap() - 2.5).abs() < EPS);
        assert!((store.get(2).unwrap() - 2.2).abs() < EPS);
        assert!((store.get(3).unwrap() - 1.9).abs() < EPS);
        assert!((store.get(6).unwrap() - 1.6).abs() < EPS);
        assert!((store.get(16).unwrap() - 1.3).abs() < EPS);
        assert_eq!(store.get(1), Some(1.0));
        assert!((report.total_bonus - 4.5).abs() < EPS);
    }

    #[test]
    fn test_learn_persists() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("weights.json");
        let mut store = WeightStore::new();
        let result = RaceResult::new(vec![8, 1, 14]).unwrap();

        learn(&mut store, &result, &EngineConfig::default(), &path).unwrap();

        let reloaded = load_store(&path).unwrap();
        assert_eq!(reloaded, store);
        assert!((reloaded.get(8).unwrap() - 1.9).abs() < EPS);
        assert!((reloaded.get(14).unwrap() - 1.3).abs() < EPS);
    }

    #[test]
    fn test_learn_from_text_with_garbage_token() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("weights.json");
        let mut store = WeightStore::new();

        let report = learn_from_text(&mut store, "5/2/abc/6/16", &EngineConfig::default(), &path).unwrap();

        let numbers: Vec<u8> = report.bonuses.iter().map(|(n, _)| *n).collect();
        assert_eq!(numbers, vec![5, 2, 6, 16]);
        assert!((store.get(5).unwrap() - 2.2).abs() < EPS);
        assert!((store.get(16).unwrap() - 1.3).abs() < EPS);
        assert!((report.total_bonus - 3.0).abs() < EPS);
    }

    #[test]
    fn test_learn_from_text_rejects_short_input() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("weights.json");
        let mut store = WeightStore::new();

        let err = learn_from_text(&mut store, "5/2", &EngineConfig::default(), &path).unwrap_err();
        assert!(err.is_input_error());
        assert!(matches!(
            err,
            LearnError::Input(ResultError::TooFewNumbers { found: 2, required: 3 })
        ));
        assert_eq!(store, WeightStore::new());
        assert!(!path.exists());
    }

    #[test]
    fn test_store_never_decreases() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("weights.json");
        let mut store = WeightStore::new();
        let config = EngineConfig::default();

        for input in ["1/2/3", "16/15/14/13/12", "7/3/9/1"] {
            let before = store.clone();
            learn_from_text(&mut store, input, &config, &path).unwrap();
            for ((_, old), (_, new)) in before.iter().zip(store.iter()) {
                assert!(new >= old);
            }
        }
    }

    #[test]
    fn test_failed_save_leaves_store_untouched() {
        let dir = tempfile::tempdir().unwrap();
        // Un fichier ordinaire bloque la création du répertoire parent.
        let blocker = dir.path().join("blocker");
        std::fs::write(&blocker, "x").unwrap();
        let path = blocker.join("weights.json");

        let mut store = WeightStore::new();
        let result = RaceResult::new(vec![1, 2, 3]).unwrap();
        let err = learn(&mut store, &result, &EngineConfig::default(), &path).unwrap_err();

        assert!(!err.is_input_error());
        assert_eq!(store, WeightStore::new());
    }
}
