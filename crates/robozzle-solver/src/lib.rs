//! Solving engine for RoboZZle puzzles.
//!
//! A robot on a grid of colored cells runs a program of up to five functions
//! and must collect every star. This crate provides the interpreter that
//! judges a program, an exhaustive enumerator of pruned candidate programs,
//! and an evolutionary search over flat program encodings, along with a
//! plain-text board format.

pub mod error;
pub mod executor;
pub mod format;
pub mod generator;
pub mod genetic;
pub mod program;
pub mod pruning;
pub mod puzzle;
pub mod solver;

// Re-export main types
pub use error::{ConfigError, FormatError};
pub use executor::{execute, verify_solution, ExecutionMetrics, ExecutionResult, ExecutionStatus};
pub use format::{parse_puzzle, read_puzzle, write_puzzle};
pub use generator::generate_programs;
pub use genetic::{evolve, EvolutionConfig, EvolutionResult, ProgramChromosome, ProgramFitness};
pub use program::{
    search_space_estimate, ColorSet, FunctionLengths, Instruction, InstructionType, Program,
    MAX_FUNCTIONS,
};
pub use puzzle::{Direction, Position, Puzzle, Tile, TileColor};
pub use solver::{
    solve, spawn_solver, CancelToken, SearchOutcome, SolverConfig, SolverHandle, SolverResult,
};
