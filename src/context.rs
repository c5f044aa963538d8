//! Auxiliary data threaded through a pipeline alongside individuals.
//!
//! Every pull through a pipeline produces an individual wrapped in
//! [`WithContext`]. Operators that were configured with a [`Context`] merge it
//! into the items they emit, and [`pool`](crate::pool::pool) merges the
//! contexts of all pulls into the one it returns with the population.

use std::collections::BTreeMap;

use crate::error::{Error, Result};

/// A loosely typed value stored in a [`Context`] or in an individual's
/// attributes.
#[derive(Clone, Debug, PartialEq)]
pub enum Value {
  /// A boolean flag.
  Bool(bool),
  /// An integer.
  Int(i64),
  /// A floating point number.
  Float(f64),
  /// A string.
  Text(String),
  /// A list of values.
  List(Vec<Value>),
}

impl From<bool> for Value {
  fn from(v: bool) -> Self {
    Value::Bool(v)
  }
}

impl From<i64> for Value {
  fn from(v: i64) -> Self {
    Value::Int(v)
  }
}

impl From<i32> for Value {
  fn from(v: i32) -> Self {
    Value::Int(v.into())
  }
}

impl From<f64> for Value {
  fn from(v: f64) -> Self {
    Value::Float(v)
  }
}

impl From<&str> for Value {
  fn from(v: &str) -> Self {
    Value::Text(v.to_owned())
  }
}

impl From<String> for Value {
  fn from(v: String) -> Self {
    Value::Text(v)
  }
}

impl<V: Into<Value>> From<Vec<V>> for Value {
  fn from(v: Vec<V>) -> Self {
    Value::List(v.into_iter().map(Into::into).collect())
  }
}

/// Typed extraction of a [`Value`].
pub trait FromValue: Sized {
  /// Name of the type, used in error messages.
  const NAME: &'static str;

  /// Returns `None` if `value` holds another type.
  fn from_value(value: &Value) -> Option<Self>;
}

impl FromValue for bool {
  const NAME: &'static str = "a bool";

  fn from_value(value: &Value) -> Option<Self> {
    match value {
      Value::Bool(v) => Some(*v),
      _ => None,
    }
  }
}

impl FromValue for i64 {
  const NAME: &'static str = "an integer";

  fn from_value(value: &Value) -> Option<Self> {
    match value {
      Value::Int(v) => Some(*v),
      _ => None,
    }
  }
}

impl FromValue for f64 {
  const NAME: &'static str = "a float";

  /// Integers are widened.
  fn from_value(value: &Value) -> Option<Self> {
    match value {
      Value::Float(v) => Some(*v),
      Value::Int(v) => Some(*v as f64),
      _ => None,
    }
  }
}

impl FromValue for String {
  const NAME: &'static str = "a string";

  fn from_value(value: &Value) -> Option<Self> {
    match value {
      Value::Text(v) => Some(v.clone()),
      _ => None,
    }
  }
}

/// Looks up `key` in `map` and converts the value to `T`.
pub(crate) fn lookup<T: FromValue>(
  map: &BTreeMap<String, Value>,
  key: &str,
) -> Result<T> {
  let value = map.get(key).ok_or_else(|| Error::MissingKey(key.to_owned()))?;
  T::from_value(value).ok_or_else(|| Error::TypeMismatch {
    key: key.to_owned(),
    expected: T::NAME,
  })
}

/// Positional and keyword data accompanying an individual through a pipeline.
///
/// When two contexts are merged, positional arguments are concatenated
/// (upstream first) and keyword arguments are united, with the downstream
/// value replacing the upstream one on a key collision.
///
/// # Examples
/// ```
/// # use evopipe::context::Context;
/// let upstream = Context::new().with_arg(1).with_kwarg("rate", 0.5);
/// let downstream = Context::new().with_arg(2).with_kwarg("rate", 0.1);
/// let merged = upstream.merged(downstream);
/// assert_eq!(merged.args().len(), 2);
/// assert_eq!(merged.get_as::<f64>("rate").unwrap(), 0.1);
/// ```
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Context {
  args: Vec<Value>,
  kwargs: BTreeMap<String, Value>,
}

impl Context {
  /// Creates an empty context.
  pub fn new() -> Self {
    Self::default()
  }

  /// Appends a positional argument.
  pub fn with_arg(mut self, value: impl Into<Value>) -> Self {
    self.push_arg(value);
    self
  }

  /// Sets a keyword argument.
  pub fn with_kwarg(
    mut self,
    key: impl Into<String>,
    value: impl Into<Value>,
  ) -> Self {
    self.insert(key, value);
    self
  }

  /// Appends a positional argument.
  pub fn push_arg(&mut self, value: impl Into<Value>) {
    self.args.push(value.into());
  }

  /// Sets a keyword argument, returning the value it replaced.
  pub fn insert(
    &mut self,
    key: impl Into<String>,
    value: impl Into<Value>,
  ) -> Option<Value> {
    self.kwargs.insert(key.into(), value.into())
  }

  /// Returns a keyword argument.
  pub fn get(&self, key: &str) -> Option<&Value> {
    self.kwargs.get(key)
  }

  /// Returns a keyword argument converted to `T`.
  pub fn get_as<T: FromValue>(&self, key: &str) -> Result<T> {
    lookup(&self.kwargs, key)
  }

  /// Positional arguments in the order they were added.
  pub fn args(&self) -> &[Value] {
    &self.args
  }

  /// Keyword arguments.
  pub fn kwargs(&self) -> &BTreeMap<String, Value> {
    &self.kwargs
  }

  /// Returns `true` if there are neither positional nor keyword arguments.
  pub fn is_empty(&self) -> bool {
    self.args.is_empty() && self.kwargs.is_empty()
  }

  /// Merges a downstream context into this one.
  pub fn merge(&mut self, downstream: Context) {
    self.args.extend(downstream.args);
    self.kwargs.extend(downstream.kwargs);
  }

  /// Consuming version of [`merge`](Self::merge).
  pub fn merged(mut self, downstream: Context) -> Self {
    self.merge(downstream);
    self
  }
}

/// An item travelling through a pipeline: an individual (owned or borrowed)
/// together with the context accumulated on its way.
#[derive(Clone, Debug, PartialEq)]
pub struct WithContext<T> {
  /// The individual.
  pub individual: T,
  /// Context accumulated upstream.
  pub context: Context,
}

impl<T> WithContext<T> {
  /// Wraps an individual with an empty context.
  pub fn new(individual: T) -> Self {
    Self {
      individual,
      context: Context::default(),
    }
  }

  /// Merges `context` into the carried one, `context` winning on collisions.
  pub fn with_context(mut self, context: Context) -> Self {
    self.context.merge(context);
    self
  }

  /// Transforms the individual, keeping the context.
  pub fn map<R>(self, f: impl FnOnce(T) -> R) -> WithContext<R> {
    WithContext {
      individual: f(self.individual),
      context: self.context,
    }
  }

  /// Fallibly transforms the individual, keeping the context.
  pub fn try_map<R>(
    self,
    f: impl FnOnce(T) -> Result<R>,
  ) -> Result<WithContext<R>> {
    Ok(WithContext {
      individual: f(self.individual)?,
      context: self.context,
    })
  }

  /// Splits into the individual and its context.
  pub fn into_parts(self) -> (T, Context) {
    (self.individual, self.context)
  }
}
