//! Genome decoders.

use std::marker::PhantomData;

/// Maps a genome to the phenome a [`Problem`](crate::problem::Problem)
/// evaluates.
///
/// **Note that decoders are shared between individuals and must not carry
/// mutable state.**
pub trait Decoder {
  /// A single gene of the genome.
  type Gene;
  /// The decoded form of a genome.
  type Phenome;

  /// Decodes a genome.
  fn decode(&self, genome: &[Self::Gene]) -> Self::Phenome;
}

/// A decoder whose phenome is a copy of the genome.
#[derive(Debug)]
pub struct IdentityDecoder<G>(PhantomData<fn() -> G>);

impl<G> IdentityDecoder<G> {
  /// Creates an identity decoder.
  pub fn new() -> Self {
    Self(PhantomData)
  }
}

impl<G> Default for IdentityDecoder<G> {
  fn default() -> Self {
    Self::new()
  }
}

impl<G: Clone> Decoder for IdentityDecoder<G> {
  type Gene = G;
  type Phenome = Vec<G>;

  fn decode(&self, genome: &[G]) -> Vec<G> {
    genome.to_vec()
  }
}
