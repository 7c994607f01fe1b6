use std::fmt;
use std::str::FromStr;

use thiserror::Error;

pub const MIN_NUMBER: u8 = 1;
pub const MAX_NUMBER: u8 = 16;
pub const POOL_SIZE: usize = MAX_NUMBER as usize;
/// Numbers in a Quinté-style combination.
pub const PICK_COUNT: usize = 5;

pub const MIN_RESULT_LEN: usize = 3;
pub const MAX_RESULT_LEN: usize = PICK_COUNT;

pub fn is_valid_number(n: u8) -> bool {
    (MIN_NUMBER..=MAX_NUMBER).contains(&n)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RaceType {
    Plat,
    Attele,
    Handicap,
}

impl RaceType {
    pub const ALL: [RaceType; 3] = [RaceType::Plat, RaceType::Attele, RaceType::Handicap];

    /// Inclusive bounds on the sum of a combination's numbers.
    pub fn sum_bounds(&self) -> (u32, u32) {
        match self {
            RaceType::Plat => (20, 40),
            RaceType::Attele => (22, 45),
            RaceType::Handicap => (25, 50),
        }
    }

    pub fn accepts_sum(&self, sum: u32) -> bool {
        let (min, max) = self.sum_bounds();
        (min..=max).contains(&sum)
    }

    pub fn label(&self) -> &'static str {
        match self {
            RaceType::Plat => "Plat",
            RaceType::Attele => "Attelé",
            RaceType::Handicap => "Handicap",
        }
    }
}

impl fmt::Display for RaceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Type de course inconnu : '{0}' (attendu : plat, attele, handicap)")]
pub struct UnknownRaceType(pub String);

impl FromStr for RaceType {
    type Err = UnknownRaceType;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "plat" | "p" => Ok(RaceType::Plat),
            "attele" | "attelé" | "trot" | "a" => Ok(RaceType::Attele),
            "handicap" | "h" => Ok(RaceType::Handicap),
            _ => Err(UnknownRaceType(s.to_string())),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Candidate {
    pub numbers: [u8; PICK_COUNT],
    pub score: f64,
}

impl Candidate {
    pub fn sum(&self) -> u32 {
        self.numbers.iter().map(|&n| n as u32).sum()
    }
}

impl fmt::Display for Candidate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let joined = self
            .numbers
            .iter()
            .map(|n| n.to_string())
            .collect::<Vec<_>>()
            .join(" / ");
        write!(f, "{joined}")
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ResultError {
    #[error("Résultat vide : entrez les numéros séparés par / (ex: 5/2/3/6/16)")]
    Empty,
    #[error("Au moins {required} numéros valides (1-16) sont nécessaires, {found} trouvé(s)")]
    TooFewNumbers { found: usize, required: usize },
    #[error("Au plus {max} numéros sont acceptés, {found} trouvés")]
    TooManyNumbers { found: usize, max: usize },
    #[error("Numéro en double : {0}")]
    DuplicateNumber(u8),
    #[error("Numéro {0} hors limites (1-16)")]
    OutOfRange(u8),
}

/// Finishing order reported by the user, first horse first.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RaceResult {
    numbers: Vec<u8>,
}

impl RaceResult {
    pub fn new(numbers: Vec<u8>) -> Result<Self, ResultError> {
        validate_result(&numbers)?;
        Ok(Self { numbers })
    }

    pub fn numbers(&self) -> &[u8] {
        &self.numbers
    }
}

impl fmt::Display for RaceResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let joined = self
            .numbers
            .iter()
            .map(|n| n.to_string())
            .collect::<Vec<_>>()
            .join("/");
        write!(f, "{joined}")
    }
}

/// Keeps the in-range integer tokens of a slash-separated result, in order.
/// Anything else ("abc", "0", "17", "-3") is dropped without error.
pub fn extract_numbers(input: &str) -> Vec<u8> {
    input
        .split('/')
        .map(str::trim)
        .filter(|tok| !tok.is_empty() && tok.bytes().all(|b| b.is_ascii_digit()))
        .filter_map(|tok| tok.parse::<u8>().ok())
        .filter(|&n| is_valid_number(n))
        .collect()
}

pub fn parse_result(input: &str) -> Result<RaceResult, ResultError> {
    if input.trim().is_empty() {
        return Err(ResultError::Empty);
    }
    RaceResult::new(extract_numbers(input))
}

pub fn validate_result(numbers: &[u8]) -> Result<(), ResultError> {
    for &n in numbers {
        if !is_valid_number(n) {
            return Err(ResultError::OutOfRange(n));
        }
    }
    if numbers.len() < MIN_RESULT_LEN {
        return Err(ResultError::TooFewNumbers {
            found: numbers.len(),
            required: MIN_RESULT_LEN,
        });
    }
    if numbers.len() > MAX_RESULT_LEN {
        return Err(ResultError::TooManyNumbers {
            found: numbers.len(),
            max: MAX_RESULT_LEN,
        });
    }
    for i in 0..numbers.len() {
        for j in (i + 1)..numbers.len() {
            if numbers[i] == numbers[j] {
                return Err(ResultError::DuplicateNumber(numbers[i]));
            }
        }
    }
    Ok(())
}
