//! Mutation operators.
//!
//! Mutators take ownership of each individual passing through them, mutate
//! its genome in place and reset its fitness. Clone individuals before
//! mutating them if they come straight out of a selection operator.

use rand::Rng;
use rand_distr::{Distribution, Normal};
use typed_builder::TypedBuilder;

use crate::{
  context::{Context, WithContext},
  decoder::Decoder,
  error::{Error, Result},
  individual::{BinaryGene, Individual},
  operator::{Operator, Pulled, Stage},
  problem::Problem,
};

/// Flips each bit of a genome independently with probability
/// `expected / genome length`, so that on average `expected` bits are
/// flipped per individual.
///
/// # Errors
///
/// Pulling an individual through this operator fails with
/// - [`Error::EmptyGenome`] if its genome is empty,
/// - [`Error::ExcessiveMutation`] if `expected` exceeds its genome length,
/// - [`Error::InvalidParameter`] if `expected` is negative or not finite.
///
/// # Examples
/// ```
/// # use evopipe::mutation::BitFlipMutator;
/// # use rand::{rngs::StdRng, SeedableRng};
/// let mutator = BitFlipMutator::builder()
///   .expected(2.0)
///   .rng(StdRng::seed_from_u64(0))
///   .build();
/// ```
#[derive(TypedBuilder, Clone, Debug)]
pub struct BitFlipMutator<R> {
  /// Expected number of flipped bits per individual.
  #[builder(default = 1.0)]
  expected: f64,
  rng: R,
  /// Context merged into every item this operator yields.
  #[builder(default)]
  context: Context,
}

impl<R: Rng> BitFlipMutator<R> {
  /// Creates a mutator with an empty context.
  pub fn new(expected: f64, rng: R) -> Self {
    Self::builder().expected(expected).rng(rng).build()
  }

  fn probability(&self, length: usize) -> Result<f64> {
    if !self.expected.is_finite() || self.expected < 0.0 {
      return Err(Error::InvalidParameter(format!(
        "expected number of flips must be a non-negative number, got {}",
        self.expected
      )));
    }
    if length == 0 {
      return Err(Error::EmptyGenome);
    }
    if self.expected > length as f64 {
      return Err(Error::ExcessiveMutation {
        expected: self.expected,
        length,
      });
    }
    Ok(self.expected / length as f64)
  }
}

impl<D, P, R> Operator<Individual<D, P>> for BitFlipMutator<R>
where
  D: Decoder,
  D::Gene: BinaryGene,
  P: Problem<D::Phenome>,
  R: Rng,
{
  type Output = Individual<D, P>;

  fn apply(
    &mut self,
    mut item: WithContext<Individual<D, P>>,
  ) -> Result<WithContext<Individual<D, P>>> {
    let probability = self.probability(item.individual.genome().len())?;
    let rng = &mut self.rng;
    item.individual.mutate(|genome| {
      for gene in genome.iter_mut() {
        if rng.gen_bool(probability) {
          *gene = gene.flipped();
        }
      }
    });
    Ok(item.with_context(self.context.clone()))
  }
}

/// Bit flip mutation of every individual pulled from `upstream`. See
/// [`BitFlipMutator`].
pub fn mutate_bitflip<D, P, U, R>(
  upstream: U,
  expected: f64,
  rng: R,
) -> Stage<U, BitFlipMutator<R>>
where
  D: Decoder,
  D::Gene: BinaryGene,
  P: Problem<D::Phenome>,
  U: Iterator<Item = Pulled<Individual<D, P>>>,
  R: Rng,
{
  Stage::new(upstream, BitFlipMutator::new(expected, rng))
}

/// Adds normally distributed noise with standard deviation `std_dev` to each
/// gene of a real valued genome with probability `probability`, then clips
/// the gene to `bounds`.
///
/// # Errors
///
/// Pulling through this operator fails with [`Error::InvalidParameter`] if
/// `std_dev` is negative or not finite, if `probability` lies outside
/// `[0, 1]`, or if the lower bound exceeds the upper one.
#[derive(TypedBuilder, Clone, Debug)]
pub struct GaussianMutator<R> {
  /// Probability of mutating each gene.
  probability: f64,
  /// Standard deviation of the added noise.
  std_dev: f64,
  /// Hard lower and upper bounds of a gene.
  #[builder(default = (f64::NEG_INFINITY, f64::INFINITY))]
  bounds: (f64, f64),
  rng: R,
  /// Context merged into every item this operator yields.
  #[builder(default)]
  context: Context,
}

impl<R: Rng> GaussianMutator<R> {
  fn noise(&self) -> Result<Normal<f64>> {
    if !(0.0..=1.0).contains(&self.probability) {
      return Err(Error::InvalidParameter(format!(
        "mutation probability must lie in [0, 1], got {}",
        self.probability
      )));
    }
    if !(self.bounds.0 <= self.bounds.1) {
      return Err(Error::InvalidParameter(format!(
        "lower bound {} exceeds upper bound {}",
        self.bounds.0, self.bounds.1
      )));
    }
    if !(self.std_dev.is_finite() && self.std_dev >= 0.0) {
      return Err(Error::InvalidParameter(format!(
        "standard deviation must be a non-negative number, got {}",
        self.std_dev
      )));
    }
    Normal::new(0.0, self.std_dev)
      .map_err(|e| Error::InvalidParameter(format!("std_dev: {e}")))
  }
}

impl<D, P, R> Operator<Individual<D, P>> for GaussianMutator<R>
where
  D: Decoder<Gene = f64>,
  P: Problem<D::Phenome>,
  R: Rng,
{
  type Output = Individual<D, P>;

  fn apply(
    &mut self,
    mut item: WithContext<Individual<D, P>>,
  ) -> Result<WithContext<Individual<D, P>>> {
    let noise = self.noise()?;
    let (probability, (low, high)) = (self.probability, self.bounds);
    let rng = &mut self.rng;
    item.individual.mutate(|genome| {
      for gene in genome.iter_mut() {
        if rng.gen_bool(probability) {
          *gene = (*gene + noise.sample(&mut *rng)).clamp(low, high);
        }
      }
    });
    Ok(item.with_context(self.context.clone()))
  }
}

/// Gaussian mutation of every individual pulled from `upstream`, unbounded.
/// See [`GaussianMutator`].
pub fn mutate_gaussian<D, P, U, R>(
  upstream: U,
  probability: f64,
  std_dev: f64,
  rng: R,
) -> Stage<U, GaussianMutator<R>>
where
  D: Decoder<Gene = f64>,
  P: Problem<D::Phenome>,
  U: Iterator<Item = Pulled<Individual<D, P>>>,
  R: Rng,
{
  let mutator = GaussianMutator::builder()
    .probability(probability)
    .std_dev(std_dev)
    .rng(rng)
    .build();
  Stage::new(upstream, mutator)
}

#[cfg(test)]
mod tests {
  use std::sync::Arc;

  use rand::{rngs::StdRng, SeedableRng};

  use super::*;
  use crate::{
    decoder::IdentityDecoder,
    individual::tests::{bits, evaluated_bits},
    operator::{stream, PipelineExt},
    problem::FunctionProblem,
  };

  fn rng() -> StdRng {
    StdRng::seed_from_u64(42)
  }

  #[test]
  fn test_bitflip_resets_fitness() {
    let pop = evaluated_bits(&[&[0; 8]]);
    let mutated = mutate_bitflip(stream(pop), 8.0, rng())
      .next()
      .unwrap()
      .unwrap()
      .individual;
    // a flip probability of 1 flips every bit
    assert_eq!(mutated.genome(), &[1; 8]);
    assert!(!mutated.is_evaluated());
  }

  #[test]
  fn test_bitflip_zero_expected_keeps_genome() {
    let pop = bits(&[&[1, 0, 1]]);
    let mutated = mutate_bitflip(stream(pop), 0.0, rng()).pool(1).unwrap();
    assert_eq!(mutated.individuals[0].genome(), &[1, 0, 1]);
  }

  #[test]
  fn test_bitflip_errors() {
    let mut s = mutate_bitflip(stream(bits(&[&[]])), 1.0, rng());
    assert_eq!(s.next().unwrap().unwrap_err(), Error::EmptyGenome);

    let mut s = mutate_bitflip(stream(bits(&[&[1, 0]])), 3.0, rng());
    assert_eq!(
      s.next().unwrap().unwrap_err(),
      Error::ExcessiveMutation {
        expected: 3.0,
        length: 2
      }
    );

    let mut s = mutate_bitflip(stream(bits(&[&[1, 0]])), f64::NAN, rng());
    assert!(matches!(
      s.next().unwrap(),
      Err(Error::InvalidParameter(_))
    ));
  }

  #[test]
  fn test_bitflip_merges_context() {
    let mutator = BitFlipMutator::builder()
      .rng(rng())
      .context(Context::new().with_kwarg("op", "bitflip"))
      .build();
    let item = WithContext::new(bits(&[&[0, 0]]).remove(0))
      .with_context(Context::new().with_kwarg("op", "upstream").with_arg(1));
    let out = stream_one(item).pipe(mutator).pool(1).unwrap();
    assert_eq!(out.context.get_as::<String>("op").unwrap(), "bitflip");
    assert_eq!(out.context.args().len(), 1);
  }

  fn stream_one<T>(item: WithContext<T>) -> impl Iterator<Item = Pulled<T>> {
    std::iter::once(Ok(item))
  }

  #[test]
  fn test_bitflip_mean_flips_converge_to_expected() {
    let length = 100;
    let expected = 3.0;
    let trials = 2000;
    let original = vec![0u8; length];
    let genomes = vec![original.as_slice(); trials];

    let mutated = mutate_bitflip(stream(bits(&genomes)), expected, rng())
      .pool(trials)
      .unwrap();
    let flipped: usize = mutated
      .individuals
      .iter()
      .map(|i| i.genome().iter().filter(|g| **g == 1).count())
      .sum();
    let mean = flipped as f64 / trials as f64;
    assert!((mean - expected).abs() < 0.2, "mean flips {mean}");
  }

  #[test]
  fn test_gaussian_respects_bounds() {
    let decoder = Arc::new(IdentityDecoder::<f64>::new());
    let problem = Arc::new(FunctionProblem::maximize(|x: &Vec<f64>| x[0]));
    let pop = vec![Individual::new(vec![0.5; 16], decoder, problem)];
    let mutator = GaussianMutator::builder()
      .probability(1.0)
      .std_dev(10.0)
      .bounds((0.0, 1.0))
      .rng(rng())
      .build();

    let mutated = stream(pop).evaluate().pipe(mutator).pool(1).unwrap();
    let genome = mutated.individuals[0].genome();
    assert!(genome.iter().all(|g| (0.0..=1.0).contains(g)));
    assert!(genome.iter().any(|g| *g != 0.5));
    assert!(!mutated.individuals[0].is_evaluated());
  }

  #[test]
  fn test_gaussian_invalid_parameters() {
    let decoder = Arc::new(IdentityDecoder::<f64>::new());
    let problem = Arc::new(FunctionProblem::minimize(|x: &Vec<f64>| x[0]));
    let pop = vec![Individual::new(vec![0.0], decoder, problem)];

    let mut s = mutate_gaussian(stream(pop.clone()), 0.5, -1.0, rng());
    assert!(matches!(s.next().unwrap(), Err(Error::InvalidParameter(_))));
    let mut s = mutate_gaussian(stream(pop), 1.5, 1.0, rng());
    assert!(matches!(s.next().unwrap(), Err(Error::InvalidParameter(_))));
  }

  #[test]
  fn test_gaussian_rejects_negative_std_dev() {
    let decoder = Arc::new(IdentityDecoder::<f64>::new());
    let problem = Arc::new(FunctionProblem::maximize(|x: &Vec<f64>| x[0]));
    let pop = vec![Individual::new(vec![0.0; 4], decoder, problem)];

    for std_dev in [-1.0, -f64::MIN_POSITIVE, f64::NAN, f64::INFINITY] {
      let mut s = mutate_gaussian(stream(pop.clone()), 1.0, std_dev, rng());
      assert!(
        matches!(s.next().unwrap(), Err(Error::InvalidParameter(_))),
        "std_dev {std_dev} accepted"
      );
    }
    let mutated = mutate_gaussian(stream(pop), 1.0, 0.0, rng()).pool(1).unwrap();
    assert_eq!(mutated.individuals[0].genome(), &[0.0; 4]);
  }
}
