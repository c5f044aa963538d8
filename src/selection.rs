//! Selection operators.
//!
//! [`TournamentSelector`] and [`CyclicSelector`] are infinite sources that
//! borrow a population and yield references into it. [`Truncation`] is an
//! eager terminal that keeps the best individuals of a finite stream.

use std::cmp::Ordering;

use itertools::Itertools;
use rand::Rng;
use typed_builder::TypedBuilder;

use crate::{
  context::{Context, WithContext},
  error::{Error, Result},
  individual::Ranked,
  operator::{stream, Pulled, Terminal},
  pool::Population,
};

/// Selects the best of `k` individuals drawn uniformly at random, with
/// replacement, from a population. Ties go to the individual drawn first.
///
/// This stream never ends. Each pull fails with
/// - [`Error::EmptyPopulation`] if the population is empty,
/// - [`Error::InvalidTournamentSize`] if `k` is zero,
/// - [`Error::UnsetFitness`] if a drawn individual is unevaluated.
///
/// # Examples
/// ```
/// # use evopipe::selection::TournamentSelector;
/// # use rand::{rngs::StdRng, SeedableRng};
/// let population = vec![1, 2, 3];
/// let selector = TournamentSelector::builder()
///   .population(&population)
///   .k(3)
///   .rng(StdRng::seed_from_u64(0))
///   .build();
/// ```
#[derive(TypedBuilder, Clone, Debug)]
#[must_use = "streams are lazy and do nothing unless pulled from"]
pub struct TournamentSelector<'a, T, R> {
  population: &'a [T],
  /// Tournament size.
  #[builder(default = 2)]
  k: usize,
  rng: R,
  /// Context merged into every item this operator yields.
  #[builder(default)]
  context: Context,
}

impl<'a, T: Ranked, R: Rng> TournamentSelector<'a, T, R> {
  fn run_tournament(&mut self) -> Result<&'a T> {
    let population = self.population;
    if population.is_empty() {
      return Err(Error::EmptyPopulation);
    }
    if self.k == 0 {
      return Err(Error::InvalidTournamentSize);
    }
    let mut best = &population[self.rng.gen_range(0..population.len())];
    if !best.is_evaluated() {
      return Err(Error::UnsetFitness);
    }
    for _ in 1..self.k {
      let challenger = &population[self.rng.gen_range(0..population.len())];
      if challenger.try_cmp(best)? == Ordering::Greater {
        best = challenger;
      }
    }
    Ok(best)
  }
}

impl<'a, T: Ranked, R: Rng> Iterator for TournamentSelector<'a, T, R> {
  type Item = Pulled<&'a T>;

  fn next(&mut self) -> Option<Self::Item> {
    Some(
      self
        .run_tournament()
        .map(|best| WithContext::new(best).with_context(self.context.clone())),
    )
  }

  // every pull yields, even if only an error
  fn size_hint(&self) -> (usize, Option<usize>) {
    (usize::MAX, None)
  }
}

/// Tournament selection of size `k` from `population`. See
/// [`TournamentSelector`].
pub fn tournament<T: Ranked, R: Rng>(
  population: &[T],
  k: usize,
  rng: R,
) -> TournamentSelector<'_, T, R> {
  TournamentSelector::builder()
    .population(population)
    .k(k)
    .rng(rng)
    .build()
}

/// Yields individuals of a population in order, starting over when it runs
/// out.
///
/// This is *naive* because the population is never reshuffled between
/// rounds: a downstream operator that assumes independent draws will see the
/// same order repeated. An empty population yields nothing.
#[derive(Clone, Debug)]
#[must_use = "streams are lazy and do nothing unless pulled from"]
pub struct CyclicSelector<'a, T> {
  population: &'a [T],
  position: usize,
  context: Context,
}

impl<'a, T> CyclicSelector<'a, T> {
  /// Creates a selector starting at the first individual.
  pub fn new(population: &'a [T]) -> Self {
    Self {
      population,
      position: 0,
      context: Context::default(),
    }
  }

  /// Sets the context merged into every item this operator yields.
  pub fn with_context(mut self, context: Context) -> Self {
    self.context = context;
    self
  }
}

impl<'a, T> Iterator for CyclicSelector<'a, T> {
  type Item = Pulled<&'a T>;

  fn next(&mut self) -> Option<Self::Item> {
    let selected = self.population.get(self.position)?;
    self.position = (self.position + 1) % self.population.len();
    Some(Ok(
      WithContext::new(selected).with_context(self.context.clone()),
    ))
  }

  fn size_hint(&self) -> (usize, Option<usize>) {
    if self.population.is_empty() {
      (0, Some(0))
    } else {
      (usize::MAX, None)
    }
  }
}

/// Cycles through `population` in order. See [`CyclicSelector`].
pub fn naive_cyclic_selection<T>(population: &[T]) -> CyclicSelector<'_, T> {
  CyclicSelector::new(population)
}

/// Keeps the `size` best individuals of a finite stream, optionally competing
/// against a population of `parents` (the "mu + lambda" scheme).
///
/// The result is ordered best first; individuals of equal fitness keep their
/// relative order, stream before parents. Contexts of all pulled items are
/// merged into the returned population's context, followed by the
/// truncation's own context.
///
/// # Errors
///
/// - [`Error::NotEnoughCandidates`] if stream and parents hold fewer than
///   `size` individuals together,
/// - [`Error::UnsetFitness`] if any candidate is unevaluated,
/// - any error pulled from the stream.
#[derive(Clone, Debug)]
pub struct Truncation<T> {
  size: usize,
  parents: Vec<T>,
  context: Context,
}

impl<T> Truncation<T> {
  /// Truncation to `size` individuals without parents.
  pub fn new(size: usize) -> Self {
    Self {
      size,
      parents: Vec::new(),
      context: Context::default(),
    }
  }

  /// Adds parents competing with the stream.
  pub fn with_parents(mut self, parents: impl IntoIterator<Item = T>) -> Self {
    self.parents.extend(parents);
    self
  }

  /// Sets the context merged into the returned population's context.
  pub fn with_context(mut self, context: Context) -> Self {
    self.context = context;
    self
  }
}

impl<T: Ranked> Terminal<T> for Truncation<T> {
  type Output = Population<T>;

  fn finish<U>(self, upstream: U) -> Result<Population<T>>
  where
    U: Iterator<Item = Pulled<T>>,
  {
    let mut context = Context::default();
    let mut candidates = Vec::new();
    for pulled in upstream {
      let (individual, pulled_context) = pulled?.into_parts();
      context.merge(pulled_context);
      candidates.push(individual);
    }
    context.merge(self.context);
    candidates.extend(self.parents);

    if candidates.len() < self.size {
      return Err(Error::NotEnoughCandidates {
        requested: self.size,
        available: candidates.len(),
      });
    }
    if !candidates.iter().all(Ranked::is_evaluated) {
      return Err(Error::UnsetFitness);
    }

    let available = candidates.len();
    let individuals: Vec<T> = candidates
      .into_iter()
      .sorted_by(|a, b| b.try_cmp(a).unwrap_or(Ordering::Equal))
      .take(self.size)
      .collect();
    log::debug!("truncated {available} candidates to {}", individuals.len());

    Ok(Population {
      individuals,
      context,
    })
  }
}

/// Returns the `size` best individuals of `population`, best first.
/// See [`Truncation`].
pub fn truncate<T: Ranked>(
  population: impl IntoIterator<Item = T>,
  size: usize,
) -> Result<Vec<T>> {
  Truncation::new(size)
    .finish(stream(population))
    .map(Population::into_individuals)
}

/// Returns the `size` best individuals of `population` and `parents`
/// together, best first. See [`Truncation`].
pub fn truncate_with_parents<T: Ranked>(
  population: impl IntoIterator<Item = T>,
  parents: impl IntoIterator<Item = T>,
  size: usize,
) -> Result<Vec<T>> {
  Truncation::new(size)
    .with_parents(parents)
    .finish(stream(population))
    .map(Population::into_individuals)
}
