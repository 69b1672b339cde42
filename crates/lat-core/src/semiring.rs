//! Semirings over which all lattice scoring is generic.
//!
//! Each semiring supplies `add`, `multiply` and their identities over `f64`
//! values. Posterior computation additionally needs a multiplicative inverse
//! (`invert`), which only the probabilistic semirings provide; the scoring
//! stages ask for it instead of branching on the concrete variant.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::lattice::LatticeError;
use crate::numeric::log_sum_exp;

/// Trait for the algebra a scoring pass runs under.
pub trait Semiring: Send + Sync {
    /// Short lowercase name, used in diagnostics and annotation records.
    fn name(&self) -> &'static str;

    /// Semiring sum of `values`. Empty input yields `zero()`.
    fn add(&self, values: &[f64]) -> f64;

    /// Semiring product of `values`. Empty input yields `one()`.
    fn multiply(&self, values: &[f64]) -> f64;

    /// Additive identity.
    fn zero(&self) -> f64;

    /// Multiplicative identity.
    fn one(&self) -> f64;

    /// Lift a natural-log probability into this semiring's carrier.
    fn from_log(&self, log_prob: f64) -> f64;

    /// Lift a count (e.g. a number of frames) into the carrier.
    fn from_count(&self, count: usize) -> f64 {
        self.from_log((count as f64).ln())
    }

    /// Multiplicative inverse, if the semiring has a probabilistic reading.
    ///
    /// Returns `None` for semirings where normalising by total mass is
    /// meaningless (tropical).
    fn invert(&self, _value: f64) -> Option<f64> {
        None
    }
}

/// Log-probability semiring: log-sum-exp and addition.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogSemiring;

impl Semiring for LogSemiring {
    fn name(&self) -> &'static str {
        SemiringKind::Log.name()
    }

    fn add(&self, values: &[f64]) -> f64 {
        log_sum_exp(values)
    }

    fn multiply(&self, values: &[f64]) -> f64 {
        values.iter().sum()
    }

    fn zero(&self) -> f64 {
        f64::NEG_INFINITY
    }

    fn one(&self) -> f64 {
        0.0
    }

    fn from_log(&self, log_prob: f64) -> f64 {
        log_prob
    }

    fn invert(&self, value: f64) -> Option<f64> {
        Some(-value)
    }
}

/// Linear probability semiring: ordinary sum and product.
#[derive(Debug, Clone, Copy, Default)]
pub struct ProbabilitySemiring;

impl Semiring for ProbabilitySemiring {
    fn name(&self) -> &'static str {
        SemiringKind::Probability.name()
    }

    fn add(&self, values: &[f64]) -> f64 {
        values.iter().sum()
    }

    fn multiply(&self, values: &[f64]) -> f64 {
        values.iter().fold(self.one(), |acc, v| acc * v)
    }

    fn zero(&self) -> f64 {
        0.0
    }

    fn one(&self) -> f64 {
        1.0
    }

    fn from_log(&self, log_prob: f64) -> f64 {
        log_prob.exp()
    }

    fn from_count(&self, count: usize) -> f64 {
        count as f64
    }

    fn invert(&self, value: f64) -> Option<f64> {
        Some(1.0 / value)
    }
}

/// Min-plus semiring. Forward-backward under it yields Viterbi scores.
#[derive(Debug, Clone, Copy, Default)]
pub struct TropicalSemiring;

impl Semiring for TropicalSemiring {
    fn name(&self) -> &'static str {
        SemiringKind::Tropical.name()
    }

    fn add(&self, values: &[f64]) -> f64 {
        values.iter().copied().fold(self.zero(), f64::min)
    }

    fn multiply(&self, values: &[f64]) -> f64 {
        values.iter().sum()
    }

    fn zero(&self) -> f64 {
        f64::INFINITY
    }

    fn one(&self) -> f64 {
        0.0
    }

    /// Costs are negated log-probabilities.
    fn from_log(&self, log_prob: f64) -> f64 {
        -log_prob
    }
}

static LOG: LogSemiring = LogSemiring;
static PROBABILITY: ProbabilitySemiring = ProbabilitySemiring;
static TROPICAL: TropicalSemiring = TropicalSemiring;

/// Names the available semirings, e.g. for settings and command-line flags.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SemiringKind {
    Log,
    Probability,
    Tropical,
}

impl SemiringKind {
    pub const ALL: [SemiringKind; 3] = [Self::Log, Self::Probability, Self::Tropical];

    pub fn name(self) -> &'static str {
        match self {
            Self::Log => "log",
            Self::Probability => "probability",
            Self::Tropical => "tropical",
        }
    }

    pub fn semiring(self) -> &'static dyn Semiring {
        match self {
            Self::Log => &LOG,
            Self::Probability => &PROBABILITY,
            Self::Tropical => &TROPICAL,
        }
    }
}

impl fmt::Display for SemiringKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for SemiringKind {
    type Err = LatticeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "log" => Ok(Self::Log),
            "probability" | "prob" => Ok(Self::Probability),
            "tropical" => Ok(Self::Tropical),
            other => Err(LatticeError::UnknownSemiring(other.to_string())),
        }
    }
}
