//! Candidate solutions.

use std::{cmp::Ordering, collections::BTreeMap, fmt, sync::Arc};

use crate::{
  context::{lookup, FromValue, Value},
  decoder::Decoder,
  error::{Error, Result},
  problem::Problem,
};

/// A gene that is either set or unset.
pub trait BinaryGene: Clone {
  /// Returns the opposite gene.
  fn flipped(&self) -> Self;

  /// Returns `true` for a set gene (`1` or `true`).
  fn is_set(&self) -> bool;
}

impl BinaryGene for bool {
  fn flipped(&self) -> Self {
    !self
  }

  fn is_set(&self) -> bool {
    *self
  }
}

/// Any nonzero value counts as set and flips to `0`.
impl BinaryGene for u8 {
  fn flipped(&self) -> Self {
    u8::from(*self == 0)
  }

  fn is_set(&self) -> bool {
    *self != 0
  }
}

/// One candidate solution: a genome, the decoder and problem that give it
/// meaning, its fitness once evaluated, and free form attributes.
///
/// Fitness stays unset until [`evaluate`](Individual::evaluate) is called and
/// is reset whenever the genome changes, so a fitness is always the fitness
/// of the current genome.
///
/// Decoder and problem are shared through [`Arc`]s: cloning an individual
/// copies the genome and attributes but not its configuration.
pub struct Individual<D, P>
where
  D: Decoder,
  P: Problem<D::Phenome>,
{
  genome: Vec<D::Gene>,
  decoder: Arc<D>,
  problem: Arc<P>,
  fitness: Option<P::Fitness>,
  attributes: BTreeMap<String, Value>,
}

impl<D, P> Individual<D, P>
where
  D: Decoder,
  P: Problem<D::Phenome>,
{
  /// Creates an unevaluated individual.
  pub fn new(genome: Vec<D::Gene>, decoder: Arc<D>, problem: Arc<P>) -> Self {
    Self {
      genome,
      decoder,
      problem,
      fitness: None,
      attributes: BTreeMap::new(),
    }
  }

  /// The genome.
  pub fn genome(&self) -> &[D::Gene] {
    &self.genome
  }

  /// The shared decoder.
  pub fn decoder(&self) -> &Arc<D> {
    &self.decoder
  }

  /// The shared problem.
  pub fn problem(&self) -> &Arc<P> {
    &self.problem
  }

  /// Fitness, or `None` if the individual hasn't been evaluated since its
  /// genome last changed.
  pub fn fitness(&self) -> Option<&P::Fitness> {
    self.fitness.as_ref()
  }

  /// Returns `true` if fitness is set.
  pub fn is_evaluated(&self) -> bool {
    self.fitness.is_some()
  }

  /// Decodes the genome.
  pub fn decode(&self) -> D::Phenome {
    self.decoder.decode(&self.genome)
  }

  /// Decodes and evaluates the genome, storing the fitness. Evaluating again
  /// simply overwrites it.
  pub fn evaluate(&mut self) -> &mut Self {
    let fitness = self.problem.evaluate(&self.decode());
    log::trace!("evaluated individual, fitness {fitness:?}");
    self.fitness = Some(fitness);
    self
  }

  /// Modifies the genome in place and resets fitness.
  pub fn mutate<R>(&mut self, f: impl FnOnce(&mut Vec<D::Gene>) -> R) -> R {
    self.fitness = None;
    f(&mut self.genome)
  }

  /// Replaces the genome and resets fitness.
  pub fn set_genome(&mut self, genome: Vec<D::Gene>) {
    self.fitness = None;
    self.genome = genome;
  }

  /// Compares fitness with another individual using this individual's
  /// problem. `Greater` means `self` is better.
  ///
  /// # Errors
  ///
  /// [`Error::UnsetFitness`] if either individual is unevaluated.
  pub fn try_cmp(&self, other: &Self) -> Result<Ordering> {
    match (&self.fitness, &other.fitness) {
      (Some(a), Some(b)) => Ok(self.problem.cmp_fitness(a, b)),
      _ => Err(Error::UnsetFitness),
    }
  }

  /// All attributes.
  pub fn attributes(&self) -> &BTreeMap<String, Value> {
    &self.attributes
  }

  /// Returns an attribute.
  pub fn attribute(&self, key: &str) -> Option<&Value> {
    self.attributes.get(key)
  }

  /// Returns an attribute converted to `T`.
  pub fn attribute_as<T: FromValue>(&self, key: &str) -> Result<T> {
    lookup(&self.attributes, key)
  }

  /// Sets an attribute, returning the value it replaced.
  pub fn set_attribute(
    &mut self,
    key: impl Into<String>,
    value: impl Into<Value>,
  ) -> Option<Value> {
    self.attributes.insert(key.into(), value.into())
  }
}

impl<D, P> Clone for Individual<D, P>
where
  D: Decoder,
  D::Gene: Clone,
  P: Problem<D::Phenome>,
{
  fn clone(&self) -> Self {
    Self {
      genome: self.genome.clone(),
      decoder: Arc::clone(&self.decoder),
      problem: Arc::clone(&self.problem),
      fitness: self.fitness.clone(),
      attributes: self.attributes.clone(),
    }
  }
}

/// Individuals are equal if their genomes are.
impl<D, P> PartialEq for Individual<D, P>
where
  D: Decoder,
  D::Gene: PartialEq,
  P: Problem<D::Phenome>,
{
  fn eq(&self, other: &Self) -> bool {
    self.genome == other.genome
  }
}

impl<D, P> fmt::Debug for Individual<D, P>
where
  D: Decoder,
  D::Gene: fmt::Debug,
  P: Problem<D::Phenome>,
{
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("Individual")
      .field("genome", &self.genome)
      .field("fitness", &self.fitness)
      .field("attributes", &self.attributes)
      .finish()
  }
}

/// Something that can be ranked against its peers by fitness.
///
/// Implemented for [`Individual`]s and references to them, so selection works
/// on owned and borrowed populations alike.
pub trait Ranked {
  /// Returns `true` if fitness is set.
  fn is_evaluated(&self) -> bool;

  /// `Greater` means `self` is better.
  ///
  /// # Errors
  ///
  /// [`Error::UnsetFitness`] if either side is unevaluated.
  fn try_cmp(&self, other: &Self) -> Result<Ordering>;
}

impl<D, P> Ranked for Individual<D, P>
where
  D: Decoder,
  P: Problem<D::Phenome>,
{
  fn is_evaluated(&self) -> bool {
    Individual::is_evaluated(self)
  }

  fn try_cmp(&self, other: &Self) -> Result<Ordering> {
    Individual::try_cmp(self, other)
  }
}

impl<T: Ranked + ?Sized> Ranked for &T {
  fn is_evaluated(&self) -> bool {
    (**self).is_evaluated()
  }

  fn try_cmp(&self, other: &Self) -> Result<Ordering> {
    (**self).try_cmp(*other)
  }
}
