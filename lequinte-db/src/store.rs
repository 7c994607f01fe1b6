use std::collections::BTreeMap;
use std::io::Write;
use std::path::{Path, PathBuf};

use tempfile::NamedTempFile;
use thiserror::Error;

use crate::models::{is_valid_number, MAX_NUMBER, MIN_NUMBER, POOL_SIZE};

pub const DEFAULT_WEIGHT: f64 = 1.0;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Impossible de lire {path:?}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Impossible d'écrire {path:?}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("JSON invalide dans {path:?}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("Poids invalide pour le numéro {number} : {value}")]
    InvalidWeight { number: u8, value: f64 },
}

/// Weight of every number in the pool, indexed by `number - 1`.
#[derive(Debug, Clone, PartialEq)]
pub struct WeightStore {
    weights: [f64; POOL_SIZE],
}

impl Default for WeightStore {
    fn default() -> Self {
        Self::new()
    }
}

impl WeightStore {
    pub fn new() -> Self {
        Self {
            weights: [DEFAULT_WEIGHT; POOL_SIZE],
        }
    }

    /// Weight of `number`, `None` outside 1-16.
    pub fn get(&self, number: u8) -> Option<f64> {
        if is_valid_number(number) {
            Some(self.weights[(number - 1) as usize])
        } else {
            None
        }
    }

    /// Adds `amount` to the weight of `number`.
    ///
    /// Returns `false` and leaves the store untouched when the number is out of
    /// the pool or the amount is not a positive finite value: weights only grow.
    pub fn add(&mut self, number: u8, amount: f64) -> bool {
        if !is_valid_number(number) || !amount.is_finite() || amount <= 0.0 {
            return false;
        }
        self.weights[(number - 1) as usize] += amount;
        true
    }

    /// Sum of the weights of `numbers`; out-of-pool numbers count for nothing.
    pub fn score(&self, numbers: &[u8]) -> f64 {
        numbers.iter().filter_map(|&n| self.get(n)).sum()
    }

    pub fn iter(&self) -> impl Iterator<Item = (u8, f64)> + '_ {
        self.weights
            .iter()
            .enumerate()
            .map(|(i, &w)| (i as u8 + MIN_NUMBER, w))
    }

    pub fn total(&self) -> f64 {
        self.weights.iter().sum()
    }

    /// Weights rounded to 2 decimals, for display.
    pub fn rounded(&self) -> BTreeMap<u8, f64> {
        self.iter()
            .map(|(n, w)| (n, (w * 100.0).round() / 100.0))
            .collect()
    }

    fn to_record(&self) -> BTreeMap<String, f64> {
        self.iter().map(|(n, w)| (n.to_string(), w)).collect()
    }

    fn from_record(record: BTreeMap<String, f64>) -> Result<Self, StoreError> {
        let mut store = Self::new();
        for (key, value) in record {
            let number = match key.trim().parse::<u8>() {
                Ok(n) if is_valid_number(n) => n,
                _ => {
                    log::warn!("Clé ignorée dans le fichier de poids : '{key}'");
                    continue;
                }
            };
            if !value.is_finite() || value < 0.0 {
                return Err(StoreError::InvalidWeight { number, value });
            }
            store.weights[(number - 1) as usize] = value;
        }
        Ok(store)
    }
}

pub fn store_path() -> PathBuf {
    let mut path = std::env::current_dir().unwrap_or_default();
    path.push("data");
    path.push("weights.json");
    path
}

/// Loads the store from `path`, or a fresh all-1.0 store if the file is absent.
pub fn load_store(path: &Path) -> Result<WeightStore, StoreError> {
    if !path.exists() {
        log::info!("Aucun fichier de poids à {:?}, poids initialisés à {DEFAULT_WEIGHT}", path);
        return Ok(WeightStore::new());
    }
    let json = std::fs::read_to_string(path).map_err(|source| StoreError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    let record: BTreeMap<String, f64> =
        serde_json::from_str(&json).map_err(|source| StoreError::Json {
            path: path.to_path_buf(),
            source,
        })?;
    let store = WeightStore::from_record(record)?;
    log::debug!("Poids chargés depuis {:?} (total {:.2})", path, store.total());
    Ok(store)
}

/// Replaces the file at `path` with the full store.
///
/// The JSON is written to a temporary file in the same directory and renamed
/// over the destination, so readers see either the old or the new record.
pub fn save_store(store: &WeightStore, path: &Path) -> Result<(), StoreError> {
    let write_err = |source| StoreError::Write {
        path: path.to_path_buf(),
        source,
    };
    let dir = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p.to_path_buf(),
        _ => PathBuf::from("."),
    };
    std::fs::create_dir_all(&dir).map_err(write_err)?;

    let json = serde_json::to_string_pretty(&store.to_record()).map_err(|source| {
        StoreError::Json {
            path: path.to_path_buf(),
            source,
        }
    })?;

    let mut tmp = NamedTempFile::new_in(&dir).map_err(write_err)?;
    tmp.write_all(json.as_bytes()).map_err(write_err)?;
    tmp.as_file().sync_all().map_err(write_err)?;
    tmp.persist(path).map_err(|e| write_err(e.error))?;

    log::debug!("Poids sauvegardés dans {:?}", path);
    Ok(())
}

/// Overwrites the file at `path` with a fresh all-1.0 store.
pub fn reset_store(path: &Path) -> Result<WeightStore, StoreError> {
    let store = WeightStore::new();
    save_store(&store, path)?;
    log::info!("Poids réinitialisés ({} numéros à {DEFAULT_WEIGHT})", MAX_NUMBER);
    Ok(store)
}
