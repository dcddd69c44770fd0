//! Evolutionary search for puzzle programs.
//!
//! A [`ProgramChromosome`] is a flat slot sequence covering every function;
//! [`ProgramFitness`] decodes it and scores it with the interpreter. The
//! evolution loop in [`evolution`] is generic over the two traits below, so
//! it knows nothing about puzzles.

pub mod chromosome;
pub mod evolution;
pub mod fitness;
pub mod selection;

use rand::Rng;

pub use chromosome::ProgramChromosome;
pub use evolution::{evolve, EvolutionConfig, EvolutionResult, Population};
pub use fitness::ProgramFitness;
pub use selection::SelectionConfig;

/// A candidate that can produce variations of itself.
pub trait Evolvable: Clone + Send + Sync {
    /// Apply a small random change in place.
    fn mutate<R: Rng + ?Sized>(&mut self, rng: &mut R);

    /// Exchange genetic material with `other`; both are changed in place.
    fn crossover<R: Rng + ?Sized>(&mut self, other: &mut Self, rng: &mut R);
}

/// Scores candidates; higher is better.
pub trait Fitness<C>: Sync {
    fn evaluate(&self, candidate: &C) -> f64;
}
