//! Fitness evaluation operator.

use crate::{
  context::WithContext,
  decoder::Decoder,
  error::Result,
  individual::Individual,
  operator::{Operator, Pulled, Stage},
  problem::Problem,
};

/// An operator that evaluates each individual passing through it.
///
/// Every individual is evaluated, even if it already has a fitness: the
/// pipeline decides what gets evaluated, not the evaluator.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Default)]
pub struct Evaluator;

impl<D, P> Operator<Individual<D, P>> for Evaluator
where
  D: Decoder,
  P: Problem<D::Phenome>,
{
  type Output = Individual<D, P>;

  fn apply(
    &mut self,
    mut item: WithContext<Individual<D, P>>,
  ) -> Result<WithContext<Individual<D, P>>> {
    item.individual.evaluate();
    Ok(item)
  }
}

/// Evaluates every individual pulled from `upstream`.
pub fn evaluate<D, P, U>(upstream: U) -> Stage<U, Evaluator>
where
  D: Decoder,
  P: Problem<D::Phenome>,
  U: Iterator<Item = Pulled<Individual<D, P>>>,
{
  Stage::new(upstream, Evaluator)
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::{
    individual::tests::bits,
    operator::{stream, PipelineExt},
  };

  #[test]
  fn test_evaluate_sets_fitness() {
    let pop = bits(&[&[0, 0, 0], &[1, 0, 1], &[1, 1, 1]]);
    let expected: Vec<_> =
      pop.iter().map(|i| i.problem().evaluate(&i.decode())).collect();

    let evaluated = evaluate(stream(pop)).pool(3).unwrap().individuals;
    let fitness: Vec<_> =
      evaluated.iter().map(|i| i.fitness().copied()).collect();
    assert_eq!(fitness, vec![Some(0), Some(2), Some(3)]);
    assert_eq!(fitness, expected.into_iter().map(Some).collect::<Vec<_>>());
  }

  #[test]
  fn test_evaluate_is_bounded_by_upstream() {
    let mut s = stream(bits(&[&[1]])).evaluate();
    assert!(s.next().is_some());
    assert!(s.next().is_none());
  }

  #[test]
  fn test_reevaluation_overwrites() {
    let mut pop = bits(&[&[1, 1]]);
    pop[0].evaluate();
    pop[0].mutate(|g| g[0] = 0);
    let again = evaluate(stream(pop)).next().unwrap().unwrap().individual;
    assert_eq!(again.fitness(), Some(&1));
  }
}
