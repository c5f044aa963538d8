//! Errors produced while building or pulling from a pipeline.

use thiserror::Error;

/// An alias for results returned throughout the crate.
pub type Result<T> = std::result::Result<T, Error>;

/// Everything that can go wrong in a pipeline.
///
/// Errors never get retried or recovered from by the operators themselves.
/// They travel downstream with the pull that caused them and abort whatever
/// terminal is collecting the current generation.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum Error {
  /// An individual was compared before it was evaluated.
  #[error("individual has no fitness, evaluate it before ranking")]
  UnsetFitness,

  /// Truncation was asked for more individuals than it was given.
  #[error("cannot keep {requested} individuals out of {available} candidates")]
  NotEnoughCandidates {
    /// Requested population size.
    requested: usize,
    /// Number of candidates actually available.
    available: usize,
  },

  /// Upstream ran dry before a terminal got everything it asked for.
  #[error("upstream exhausted after {pulled} of {requested} pulls")]
  Exhausted {
    /// Requested number of pulls.
    requested: usize,
    /// Number of successful pulls before exhaustion.
    pulled: usize,
  },

  /// Mutation of a genome without genes.
  #[error("cannot mutate an empty genome")]
  EmptyGenome,

  /// More bit flips were expected than there are bits to flip.
  #[error("expected {expected} flips exceeds genome length {length}")]
  ExcessiveMutation {
    /// Expected number of flips per individual.
    expected: f64,
    /// Length of the offending genome.
    length: usize,
  },

  /// Selection from a population without individuals.
  #[error("cannot select from an empty population")]
  EmptyPopulation,

  /// Tournament of size zero.
  #[error("tournament size must be at least 1")]
  InvalidTournamentSize,

  /// An operator was configured with a nonsensical parameter.
  #[error("invalid parameter: {0}")]
  InvalidParameter(String),

  /// A context or attribute lookup for a key that is not there.
  #[error("no value for key `{0}`")]
  MissingKey(String),

  /// A context or attribute value of an unexpected type.
  #[error("value for key `{key}` is not {expected}")]
  TypeMismatch {
    /// Looked up key.
    key: String,
    /// Name of the requested type.
    expected: &'static str,
  },
}
