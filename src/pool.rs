//! Materialization of streams into populations.

use std::{slice, vec};

use crate::{
  context::{Context, WithContext},
  error::{Error, Result},
  operator::{Pulled, Terminal},
};

/// A finite collection of individuals along with the merged context of the
/// pulls that produced them.
#[derive(Clone, Debug, PartialEq)]
pub struct Population<T> {
  /// Individuals in the order they were pulled.
  pub individuals: Vec<T>,
  /// Contexts of all pulls, merged in pull order.
  pub context: Context,
}

impl<T> Population<T> {
  /// Number of individuals.
  pub fn len(&self) -> usize {
    self.individuals.len()
  }

  /// Returns `true` if there are no individuals.
  pub fn is_empty(&self) -> bool {
    self.individuals.is_empty()
  }

  /// Iterates over the individuals.
  pub fn iter(&self) -> slice::Iter<'_, T> {
    self.individuals.iter()
  }

  /// Drops the context.
  pub fn into_individuals(self) -> Vec<T> {
    self.individuals
  }
}

impl<T> From<Vec<T>> for Population<T> {
  fn from(individuals: Vec<T>) -> Self {
    Self {
      individuals,
      context: Context::default(),
    }
  }
}

impl<T> IntoIterator for Population<T> {
  type Item = T;
  type IntoIter = vec::IntoIter<T>;

  fn into_iter(self) -> Self::IntoIter {
    self.individuals.into_iter()
  }
}

impl<'a, T> IntoIterator for &'a Population<T> {
  type Item = &'a T;
  type IntoIter = slice::Iter<'a, T>;

  fn into_iter(self) -> Self::IntoIter {
    self.iter()
  }
}

/// A terminal that pulls exactly `self.0` individuals from a stream.
///
/// This is what bounds infinite streams: each individual pulled into the pool
/// triggers exactly one pull through every stage upstream of it, so a pool of
/// size `n` draws `n` selections, `n` mutations and so on, and nothing more.
///
/// # Errors
///
/// - [`Error::Exhausted`] if a finite upstream ends early,
/// - the first error pulled, after which no more pulls are made.
///
/// # Examples
/// ```
/// # use evopipe::{operator::stream, pool::Pool, PipelineExt};
/// let pooled = stream(1..).finish(Pool(2)).unwrap();
/// assert_eq!(pooled.individuals, vec![1, 2]);
/// assert!(stream(1..=3).finish(Pool(4)).is_err());
/// ```
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub struct Pool(pub usize);

impl<T> Terminal<T> for Pool {
  type Output = Population<T>;

  fn finish<U>(self, mut upstream: U) -> Result<Population<T>>
  where
    U: Iterator<Item = Pulled<T>>,
  {
    let Pool(size) = self;
    let mut population = Population {
      individuals: Vec::with_capacity(size),
      context: Context::default(),
    };
    for pulled in 0..size {
      let item = upstream.next().ok_or(Error::Exhausted {
        requested: size,
        pulled,
      })??;
      let WithContext {
        individual,
        context,
      } = item;
      population.individuals.push(individual);
      population.context.merge(context);
    }
    log::debug!(
      "pooled {size} individuals, context holds {} args and {} kwargs",
      population.context.args().len(),
      population.context.kwargs().len()
    );
    Ok(population)
  }
}

/// Pulls exactly `size` individuals from `upstream`. See [`Pool`].
pub fn pool<T, U>(upstream: U, size: usize) -> Result<Population<T>>
where
  U: Iterator<Item = Pulled<T>>,
{
  Terminal::<T>::finish(Pool(size), upstream)
}

#[cfg(test)]
mod tests {
  use std::cell::Cell;

  use proptest::prelude::*;
  use rand::{rngs::StdRng, SeedableRng};

  use super::*;
  use crate::{
    cloning::clone,
    evaluation::evaluate,
    individual::tests::{bits, evaluated_bits},
    mutation::mutate_bitflip,
    operator::{stream, PipelineExt},
    selection::{naive_cyclic_selection, tournament, truncate_with_parents},
  };

  #[test]
  fn test_pool_cyclic_selection() {
    let pop = bits(&[&[0, 0], &[0, 1]]);
    let pooled = pool(naive_cyclic_selection(&pop), 3).unwrap();
    let genomes: Vec<_> = pooled.iter().map(|i| i.genome().to_vec()).collect();
    assert_eq!(genomes, vec![vec![0, 0], vec![0, 1], vec![0, 0]]);
  }

  #[test]
  fn test_pool_exhausted() {
    assert_eq!(
      pool(stream(bits(&[&[1], &[0]])), 3),
      Err(Error::Exhausted {
        requested: 3,
        pulled: 2
      })
    );
  }

  #[test]
  fn test_pool_zero() {
    let pooled = pool(stream(bits(&[])), 0).unwrap();
    assert!(pooled.is_empty());
    assert!(pooled.context.is_empty());
  }

  #[test]
  fn test_pool_stops_at_first_error() {
    let pulls = Cell::new(0);
    let upstream = std::iter::from_fn(|| {
      pulls.set(pulls.get() + 1);
      Some(if pulls.get() == 2 {
        Err(Error::EmptyGenome)
      } else {
        Ok(WithContext::new(pulls.get()))
      })
    });
    assert_eq!(pool(upstream, 5), Err(Error::EmptyGenome));
    assert_eq!(pulls.get(), 2);
  }

  #[test]
  fn test_pool_merges_contexts_in_pull_order() {
    let upstream = (0..3).map(|i| {
      Ok(WithContext::new(i).with_context(
        Context::new().with_arg(i).with_kwarg("last", i),
      ))
    });
    let pooled = pool(upstream, 3).unwrap();
    assert_eq!(pooled.individuals, vec![0, 1, 2]);
    assert_eq!(pooled.context.args().len(), 3);
    assert_eq!(pooled.context.get_as::<i64>("last").unwrap(), 2);
  }

  #[test]
  fn test_generation() {
    let mut rng = StdRng::seed_from_u64(42);
    let genome = [0u8; 10];
    let mut parents = evaluated_bits(&[&genome[..]; 20]);
    let initial_best = parents.iter().filter_map(|i| i.fitness()).max().copied();

    for _ in 0..30 {
      let selected = tournament(&parents, 2, StdRng::from_rng(&mut rng).unwrap());
      let offspring = evaluate(mutate_bitflip(
        clone(selected),
        1.0,
        StdRng::from_rng(&mut rng).unwrap(),
      ))
      .pool(parents.len())
      .unwrap();
      assert!(offspring.iter().all(|i| i.is_evaluated()));
      parents = truncate_with_parents(offspring, parents, 20).unwrap();
    }

    let best = parents.iter().filter_map(|i| i.fitness()).max().copied();
    assert!(best > initial_best);
    assert_eq!(parents.len(), 20);
  }

  #[test]
  fn test_generation_leaves_parents_untouched() {
    let parents = evaluated_bits(&[&[0, 0, 0, 0]]);
    let offspring = clone(naive_cyclic_selection(&parents))
      .pipe(|mut i: crate::individual::tests::Bits| -> Result<_> {
        i.set_genome(vec![1; 4]);
        Ok(i)
      })
      .evaluate()
      .pool(3)
      .unwrap();
    assert_eq!(parents[0].genome(), &[0, 0, 0, 0]);
    assert_eq!(parents[0].fitness(), Some(&0));
    assert!(offspring.iter().all(|i| i.fitness() == Some(&4)));
  }

  proptest! {
    #[test]
    fn prop_pool_pulls_exactly_size(size in 0usize..64, extra in 0usize..8) {
      let pulls = Cell::new(0);
      let upstream = stream(0..size + extra).inspect(|_| pulls.set(pulls.get() + 1));
      let pooled = pool(upstream, size).unwrap();
      prop_assert_eq!(pooled.len(), size);
      prop_assert_eq!(pulls.get(), size);
    }
  }
}
