//! Fitness evaluation and comparison.

use std::{cmp::Ordering, fmt::Debug};

use crate::individual::BinaryGene;

/// Supplies fitness evaluation for phenomes of type `Ph` and the ordering of
/// the resulting fitness values.
///
/// Whether a problem is minimized or maximized is entirely up to
/// [`cmp_fitness`](Problem::cmp_fitness): the framework only ever asks which
/// of two values is *better*.
///
/// **Note that problems are shared between individuals and must not carry
/// mutable state.**
pub trait Problem<Ph: ?Sized> {
  /// The fitness type.
  type Fitness: Clone + Debug;

  /// Computes fitness of a phenome.
  fn evaluate(&self, phenome: &Ph) -> Self::Fitness;

  /// Returns `Greater` if `a` is better than `b`, `Less` if it is worse and
  /// `Equal` if neither is preferred.
  fn cmp_fitness(&self, a: &Self::Fitness, b: &Self::Fitness) -> Ordering;

  /// Same as [`cmp_fitness`](Problem::cmp_fitness), but a missing fitness
  /// loses against any defined one. Useful for "best so far" tracking that
  /// starts with nothing.
  fn cmp_optional_fitness(
    &self,
    a: Option<&Self::Fitness>,
    b: Option<&Self::Fitness>,
  ) -> Ordering {
    match (a, b) {
      (Some(a), Some(b)) => self.cmp_fitness(a, b),
      (Some(_), None) => Ordering::Greater,
      (None, Some(_)) => Ordering::Less,
      (None, None) => Ordering::Equal,
    }
  }
}

/// The textbook binary problem: fitness is the number of set genes.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub struct MaxOnes {
  /// If `false`, fewer ones are better.
  pub maximize: bool,
}

impl Default for MaxOnes {
  fn default() -> Self {
    Self { maximize: true }
  }
}

impl<G: BinaryGene> Problem<Vec<G>> for MaxOnes {
  type Fitness = usize;

  fn evaluate(&self, phenome: &Vec<G>) -> usize {
    phenome.iter().filter(|g| g.is_set()).count()
  }

  fn cmp_fitness(&self, a: &usize, b: &usize) -> Ordering {
    if self.maximize {
      a.cmp(b)
    } else {
      b.cmp(a)
    }
  }
}

/// A real valued problem defined by a closure.
///
/// # Examples
/// ```
/// # use evopipe::problem::{FunctionProblem, Problem};
/// let sphere = FunctionProblem::minimize(|x: &Vec<f64>| {
///   x.iter().map(|v| v * v).sum::<f64>()
/// });
/// let a = sphere.evaluate(&vec![0.5]);
/// let b = sphere.evaluate(&vec![2.0]);
/// assert!(Problem::<Vec<f64>>::cmp_fitness(&sphere, &a, &b).is_gt());
/// ```
#[derive(Clone, Copy, Debug)]
pub struct FunctionProblem<F> {
  function: F,
  maximize: bool,
}

impl<F> FunctionProblem<F> {
  /// Larger function values are better.
  pub fn maximize(function: F) -> Self {
    Self {
      function,
      maximize: true,
    }
  }

  /// Smaller function values are better.
  pub fn minimize(function: F) -> Self {
    Self {
      function,
      maximize: false,
    }
  }
}

impl<Ph, F> Problem<Ph> for FunctionProblem<F>
where
  F: Fn(&Ph) -> f64,
{
  type Fitness = f64;

  fn evaluate(&self, phenome: &Ph) -> f64 {
    (self.function)(phenome)
  }

  // NaN sorts as the worst possible value either way
  fn cmp_fitness(&self, a: &f64, b: &f64) -> Ordering {
    match (a.is_nan(), b.is_nan()) {
      (true, true) => Ordering::Equal,
      (true, false) => Ordering::Less,
      (false, true) => Ordering::Greater,
      _ if self.maximize => a.total_cmp(b),
      _ => b.total_cmp(a),
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_max_ones() {
    let p = MaxOnes::default();
    assert_eq!(p.evaluate(&vec![1u8, 0, 1]), 2);
    assert_eq!(p.evaluate(&vec![true, true, true]), 3);
    assert_eq!(Problem::<Vec<u8>>::cmp_fitness(&p, &3, &2), Ordering::Greater);
  }

  #[test]
  fn test_min_ones() {
    let p = MaxOnes { maximize: false };
    assert_eq!(Problem::<Vec<u8>>::cmp_fitness(&p, &3, &2), Ordering::Less);
  }

  #[test]
  fn test_unset_fitness_is_worst() {
    let p = MaxOnes::default();
    let cmp = |a, b| Problem::<Vec<u8>>::cmp_optional_fitness(&p, a, b);
    assert_eq!(cmp(Some(&0), None), Ordering::Greater);
    assert_eq!(cmp(None, Some(&0)), Ordering::Less);
    assert_eq!(cmp(None, None), Ordering::Equal);
  }

  #[test]
  fn test_function_problem_nan_is_worst() {
    let p = FunctionProblem::maximize(|x: &f64| *x);
    assert_eq!(
      Problem::<f64>::cmp_fitness(&p, &f64::NAN, &-1e9),
      Ordering::Less
    );
    let p = FunctionProblem::minimize(|x: &f64| *x);
    let cmp = |a, b| Problem::<f64>::cmp_fitness(&p, a, b);
    assert_eq!(cmp(&1e9, &f64::NAN), Ordering::Greater);
    assert_eq!(cmp(&1.0, &2.0), Ordering::Greater);
  }
}
