//! **evopipe** is a framework for building evolutionary algorithms out of
//! small, composable operators chained into lazily evaluated pipelines. It
//! strives to be simple, explicit about ownership and friendly to closures.
//!
//! Here's a [quick start example](#example) for the impatient.
//!
//! A few abstractions make up the framework:
//! - **Individual** - a candidate solution: a genome, the [`Decoder`] that
//!   turns it into a phenome, the [`Problem`] that scores the phenome, a
//!   fitness once evaluated, and free form attributes
//! - **Stream** - any iterator of [`Pulled`] items: individuals wrapped in a
//!   [`WithContext`], or the error that occurred while producing them
//! - **Operator** - a pipeline stage, either *lazy* (an [`Operator`], applied
//!   to each individual as it is pulled) or *eager* (a [`Terminal`], which
//!   drives its upstream and materializes a result)
//!
//! A typical generation reads from left to right:
//!   1. **Select** individuals from the previous population with an infinite
//!      selection stream, such as [`tournament`]
//!   2. **Clone** them, so that the previous population stays intact
//!   3. **Mutate** the clones, e.g. with [`mutate_bitflip`]
//!   4. **Evaluate** them
//!   5. **Pool** a fixed number of them, which is what actually pulls
//!      individuals through steps 1 to 4
//!   6. Optionally **truncate** offspring and parents down to the survivors
//!
//! # Operators
//!
//! Lazy stages are represented with the [`Operator`] trait and attached to a
//! stream with [`pipe()`]. Nothing happens until a [`Terminal`] pulls: every
//! pull from a stage pulls exactly once from the stage above it, so a pool of
//! ten individuals runs ten selections, ten mutations and ten evaluations.
//!
//! |                       | Lazy stage        | Eager terminal  |
//! |:----------------------|:-----------------:|:---------------:|
//! | **Selection**         | [`tournament`], [`naive_cyclic_selection`] | [`Truncation`] |
//! | **Cloning**           | [`Cloner`]        |                 |
//! | **Mutation**          | [`BitFlipMutator`], [`GaussianMutator`] | |
//! | **Evaluation**        | [`Evaluator`]     |                 |
//! | **Materialization**   |                   | [`Pool`]        |
//!
//! Selection operators are *sources*: they borrow a population and yield
//! references into it, never ending on their own. The same individual may be
//! selected many times, so operators that modify individuals only accept
//! owned ones, and [`clone_individuals()`] is how a reference becomes an
//! individual of its own.
//!
//! # Closures
//!
//! [`Operator`] is implemented by every closure of type
//! `FnMut(T) -> Result<R>`, which leaves the context of the item untouched.
//! If you need to read or extend the context, implement the trait directly.
//!
//! # Context
//!
//! Each item travelling through a pipeline carries a [`Context`] of
//! positional and keyword [`Value`]s. Operators can be configured with a
//! context of their own, which they merge into every item they yield, and
//! [`Pool`] merges the contexts of all pulls into the one it returns.
//!
//! # Errors
//!
//! Failures travel downstream as [`Err`] items and abort the terminal that
//! pulls them. Operators never skip, retry or recover. See [`Error`] for
//! everything that can go wrong.
//!
//! # Example
//!
//! A (mu + lambda) search for the textbook *MaxOnes* problem: each generation
//! selects parents by binary tournament, mutates their clones and keeps the
//! best individuals out of parents and offspring.
//! ```
//! # fn main() -> evopipe::Result<()> {
//! use std::sync::Arc;
//!
//! use evopipe::{
//!   stream, tournament, truncate_with_parents, IdentityDecoder, Individual,
//!   MaxOnes, PipelineExt,
//! };
//! use rand::{rngs::StdRng, SeedableRng};
//!
//! let decoder = Arc::new(IdentityDecoder::<u8>::new());
//! let problem = Arc::new(MaxOnes::default());
//! let mut rng = StdRng::seed_from_u64(0);
//! // ten individuals with 16 unset genes each
//! let mut parents = stream(
//!   (0..10).map(|_| Individual::new(vec![0; 16], decoder.clone(), problem.clone())),
//! )
//! .evaluate()
//! .pool(10)?
//! .into_individuals();
//!
//! for _ in 0..20 {
//!   let offspring = tournament(&parents, 2, StdRng::from_rng(&mut rng).unwrap())
//!     .clone_individuals()
//!     .pipe(evopipe::BitFlipMutator::new(1.0, StdRng::from_rng(&mut rng).unwrap()))
//!     .evaluate()
//!     .pool(10)?;
//!   parents = truncate_with_parents(offspring, parents, 10)?;
//! }
//! assert!(parents[0].fitness() > Some(&0));
//! # Ok(())
//! # }
//! ```
//!
//! # Common pitfalls
//!
//! - Selection streams are infinite. Collecting one without a [`Pool`] or
//!   `take()` never returns.
//! - Selected individuals are references. Mutators won't accept them until
//!   they go through a [`Cloner`], which is what keeps one selected individual
//!   from silently changing the population it came from.
//! - A random number generator passed to an operator belongs to it. Derive one
//!   generator per operator from a seeded parent to keep runs reproducible.
//!
//! [`pipe()`]: crate::operator::PipelineExt::pipe
//! [`clone_individuals()`]: crate::operator::PipelineExt::clone_individuals

#![warn(missing_docs)]

pub mod cloning;
pub mod context;
pub mod decoder;
pub mod error;
pub mod evaluation;
pub mod individual;
pub mod mutation;
pub mod operator;
pub mod pool;
pub mod problem;
pub mod selection;

pub use cloning::{clone, Cloner};
pub use context::{Context, FromValue, Value, WithContext};
pub use decoder::{Decoder, IdentityDecoder};
pub use error::{Error, Result};
pub use evaluation::{evaluate, Evaluator};
pub use individual::{BinaryGene, Individual, Ranked};
pub use mutation::{
  mutate_bitflip, mutate_gaussian, BitFlipMutator, GaussianMutator,
};
pub use operator::{stream, Operator, PipelineExt, Pulled, Stage, Terminal};
pub use pool::{pool, Pool, Population};
pub use problem::{FunctionProblem, MaxOnes, Problem};
pub use selection::{
  naive_cyclic_selection, tournament, truncate, truncate_with_parents,
  CyclicSelector, TournamentSelector, Truncation,
};
