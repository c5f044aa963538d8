//! Cloning operator.

use crate::{
  context::WithContext,
  decoder::Decoder,
  error::Result,
  individual::Individual,
  operator::{Operator, Pulled, Stage},
  problem::Problem,
};

/// An operator that yields a clone of each individual passing through it.
///
/// Selection operators yield references into the previous population, and the
/// same individual may be selected several times. Cloning is how a pipeline
/// obtains owned individuals that can be mutated without touching the
/// population they were selected from.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Default)]
pub struct Cloner;

impl<'a, D, P> Operator<&'a Individual<D, P>> for Cloner
where
  D: Decoder,
  D::Gene: Clone,
  P: Problem<D::Phenome>,
{
  type Output = Individual<D, P>;

  fn apply(
    &mut self,
    item: WithContext<&'a Individual<D, P>>,
  ) -> Result<WithContext<Individual<D, P>>> {
    Ok(item.map(Individual::clone))
  }
}

impl<D, P> Operator<Individual<D, P>> for Cloner
where
  D: Decoder,
  D::Gene: Clone,
  P: Problem<D::Phenome>,
{
  type Output = Individual<D, P>;

  fn apply(
    &mut self,
    item: WithContext<Individual<D, P>>,
  ) -> Result<WithContext<Individual<D, P>>> {
    Ok(item.map(|individual| individual.clone()))
  }
}

/// Clones every individual pulled from `upstream`.
pub fn clone<T, U>(upstream: U) -> Stage<U, Cloner>
where
  U: Iterator<Item = Pulled<T>>,
  Cloner: Operator<T>,
{
  Stage::new(upstream, Cloner)
}

#[cfg(test)]
mod tests {
  use std::sync::Arc;

  use super::*;
  use crate::{
    individual::tests::{bits, evaluated_bits},
    operator::stream,
  };

  #[test]
  fn test_clone_borrowed() {
    let mut pop = bits(&[&[1, 1]]);
    pop[0].set_attribute("origin", "test");
    let original = &pop[0];

    let cloned = clone(stream([original])).next().unwrap().unwrap().individual;

    assert_eq!(&cloned, original);
    assert_eq!(cloned.fitness(), original.fitness());
    assert!(Arc::ptr_eq(cloned.decoder(), original.decoder()));
    assert!(Arc::ptr_eq(cloned.problem(), original.problem()));
    assert_eq!(cloned.attributes(), original.attributes());
  }

  #[test]
  fn test_clone_does_not_alias() {
    let pop = evaluated_bits(&[&[1, 0]]);
    let mut cloned = clone(stream(&pop)).next().unwrap().unwrap().individual;
    assert_eq!(cloned.fitness(), Some(&1));

    cloned.mutate(|g| g[1] = 1);
    assert_eq!(pop[0].genome(), &[1, 0]);
    assert_eq!(pop[0].fitness(), Some(&1));
    assert_eq!(cloned.fitness(), None);
  }

  #[test]
  fn test_clone_owned() {
    let pop = evaluated_bits(&[&[0, 1]]);
    let cloned: Vec<_> = clone(stream(pop.clone()))
      .map(|pulled| pulled.map(|item| item.individual))
      .collect::<Result<_>>()
      .unwrap();
    assert_eq!(cloned, pop);
  }
}
