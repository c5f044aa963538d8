//! The operator contract: lazy stages and eager terminals.
//!
//! A *stream* is any iterator of [`Pulled`] items. Nothing in a stream runs
//! until somebody pulls from it, and every stream produced by this crate pulls
//! exactly once from its upstream per item it yields. Streams built from
//! selection operators never end on their own; they are bounded by a
//! [`Terminal`] such as [`Pool`](crate::pool::Pool).

use crate::{
  cloning::Cloner,
  context::WithContext,
  error::Result,
  evaluation::Evaluator,
  pool::{Pool, Population},
};

/// A single pull from a stream.
pub type Pulled<T> = Result<WithContext<T>>;

/// A lazy pipeline stage, applied to each individual pulled through it.
///
/// Implemented by every closure of type `FnMut(T) -> Result<R>`, which leaves
/// the context untouched.
///
/// # Examples
/// ```
/// # use evopipe::{operator::*, Result};
/// let double = |v: i32| -> Result<i32> { Ok(v * 2) };
/// let doubled = stream(vec![1, 2, 3]).pipe(double).pool(3).unwrap();
/// assert_eq!(doubled.individuals, vec![2, 4, 6]);
/// ```
///
/// **Note that you always can implement this trait instead of using closures.**
pub trait Operator<T> {
  /// Type of the individuals this stage yields.
  type Output;

  /// Transforms one pulled item.
  fn apply(&mut self, item: WithContext<T>) -> Result<WithContext<Self::Output>>;
}

impl<T, R, F> Operator<T> for F
where
  F: FnMut(T) -> Result<R>,
{
  type Output = R;

  fn apply(&mut self, item: WithContext<T>) -> Result<WithContext<R>> {
    item.try_map(self)
  }
}

/// An eager pipeline sink that consumes a stream and produces a result.
///
/// Terminals are the only places where a stream is driven.
pub trait Terminal<T> {
  /// What the terminal produces.
  type Output;

  /// Pulls from `upstream` until satisfied.
  fn finish<U>(self, upstream: U) -> Result<Self::Output>
  where
    U: Iterator<Item = Pulled<T>>;
}

/// A stream that applies an [`Operator`] to each item of its upstream.
///
/// Upstream errors are passed along without invoking the operator.
#[derive(Clone, Debug)]
#[must_use = "streams are lazy and do nothing unless pulled from"]
pub struct Stage<U, O> {
  upstream: U,
  operator: O,
}

impl<U, O> Stage<U, O> {
  /// Attaches `operator` to `upstream`.
  pub fn new(upstream: U, operator: O) -> Self {
    Self { upstream, operator }
  }

  /// The wrapped operator.
  pub fn operator(&self) -> &O {
    &self.operator
  }
}

impl<T, U, O> Iterator for Stage<U, O>
where
  U: Iterator<Item = Pulled<T>>,
  O: Operator<T>,
{
  type Item = Pulled<O::Output>;

  fn next(&mut self) -> Option<Self::Item> {
    let pulled = self.upstream.next()?;
    Some(pulled.and_then(|item| self.operator.apply(item)))
  }

  fn size_hint(&self) -> (usize, Option<usize>) {
    self.upstream.size_hint()
  }
}

/// Lifts a collection into a finite stream with empty contexts.
pub fn stream<I: IntoIterator>(
  individuals: I,
) -> impl Iterator<Item = Pulled<I::Item>> {
  individuals.into_iter().map(|i| Ok(WithContext::new(i)))
}

/// Pipeline construction methods available on every stream.
pub trait PipelineExt<T>: Iterator<Item = Pulled<T>> + Sized {
  /// Appends a lazy stage.
  fn pipe<O: Operator<T>>(self, operator: O) -> Stage<Self, O> {
    Stage::new(self, operator)
  }

  /// Appends an [`Evaluator`].
  fn evaluate(self) -> Stage<Self, Evaluator>
  where
    Evaluator: Operator<T>,
  {
    self.pipe(Evaluator)
  }

  /// Appends a [`Cloner`].
  fn clone_individuals(self) -> Stage<Self, Cloner>
  where
    Cloner: Operator<T>,
  {
    self.pipe(Cloner)
  }

  /// Drives the stream into a terminal.
  fn finish<X: Terminal<T>>(self, terminal: X) -> Result<X::Output> {
    terminal.finish(self)
  }

  /// Pulls exactly `size` individuals. See [`Pool`].
  fn pool(self, size: usize) -> Result<Population<T>> {
    self.finish(Pool(size))
  }
}

impl<T, I> PipelineExt<T> for I where I: Iterator<Item = Pulled<T>> {}
