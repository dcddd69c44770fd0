//! Exhaustive search driver.
//!
//! Runs the program generator and hands every candidate to the interpreter,
//! stopping at the first program that solves the puzzle. The search can run
//! on its own thread with a [`SolverHandle`] for progress polling and
//! cooperative cancellation.

use std::ops::ControlFlow;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Instant;

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::error::ConfigError;
use crate::executor::execute;
use crate::generator::generate_programs;
use crate::program::{search_space_estimate, ColorSet, FunctionLengths, Program};
use crate::puzzle::Puzzle;

/// Unpruned search spaces above this size get a warning.
pub const LARGE_SEARCH_SPACE: f64 = 5e8;

/// Configuration for the solver
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SolverConfig {
    /// Guard colors the generator may use
    pub colors: ColorSet,
    /// Slot counts of F1..Fk
    pub function_lengths: FunctionLengths,
    /// Notify progress every this many candidates
    pub progress_interval: u64,
}

impl SolverConfig {
    pub fn new(colors: ColorSet, function_lengths: FunctionLengths) -> Self {
        Self {
            colors,
            function_lengths,
            progress_interval: 10_000,
        }
    }

    /// Colors derived from the board, as the editor does.
    pub fn for_puzzle(puzzle: &Puzzle, function_lengths: FunctionLengths) -> Self {
        Self::new(ColorSet::from_puzzle(puzzle), function_lengths)
    }
}

/// Shared flag a supervisor sets to stop a running search.
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }
}

/// How a search ended
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SearchOutcome {
    /// A program that the interpreter verified as solving the puzzle
    Solved(Program),
    /// Every candidate was tried without success
    Exhausted,
    /// The cancel token was set before a solution was found
    Cancelled,
}

/// Result of the solver search
#[derive(Debug, Clone)]
pub struct SolverResult {
    pub outcome: SearchOutcome,
    /// Number of programs tested
    pub programs_tested: u64,
    /// Time elapsed in milliseconds
    pub time_elapsed_ms: u64,
}

impl SolverResult {
    pub fn solution(&self) -> Option<&Program> {
        match &self.outcome {
            SearchOutcome::Solved(program) => Some(program),
            _ => None,
        }
    }
}

/// Log a warning if the configured search is likely to take a long time.
pub(crate) fn warn_if_large(colors: ColorSet, lengths: &FunctionLengths) {
    let estimate = search_space_estimate(colors, lengths);
    if estimate > LARGE_SEARCH_SPACE {
        warn!(estimate, "search space is large, solving may take a long time");
    }
}

/// Search for a program solving `puzzle`.
///
/// `on_progress` is called with the running candidate count every
/// `config.progress_interval` candidates. `cancel` is checked after each
/// candidate that did not solve the puzzle.
pub fn solve<P>(
    puzzle: &Puzzle,
    config: &SolverConfig,
    cancel: &CancelToken,
    mut on_progress: P,
) -> Result<SolverResult, ConfigError>
where
    P: FnMut(u64),
{
    puzzle.validate()?;
    warn_if_large(config.colors, &config.function_lengths);

    let start_time = Instant::now();
    let interval = config.progress_interval.max(1);
    let mut programs_tested: u64 = 0;
    let mut outcome = SearchOutcome::Exhausted;

    info!(
        functions = ?config.function_lengths.as_slice(),
        colors = ?config.colors,
        "starting exhaustive search"
    );

    let _ = generate_programs(config.colors, &config.function_lengths, |program| {
        programs_tested += 1;
        if programs_tested % interval == 0 {
            debug!(programs_tested, "search progress");
            on_progress(programs_tested);
        }

        if execute(puzzle, program).solved() {
            outcome = SearchOutcome::Solved(program.clone());
            return ControlFlow::Break(());
        }

        if cancel.is_cancelled() {
            outcome = SearchOutcome::Cancelled;
            return ControlFlow::Break(());
        }

        ControlFlow::Continue(())
    });

    let time_elapsed_ms = start_time.elapsed().as_millis() as u64;
    match &outcome {
        SearchOutcome::Solved(program) => {
            info!(programs_tested, time_elapsed_ms, %program, "solution found")
        }
        SearchOutcome::Exhausted => info!(programs_tested, time_elapsed_ms, "search exhausted"),
        SearchOutcome::Cancelled => info!(programs_tested, time_elapsed_ms, "search cancelled"),
    }

    Ok(SolverResult {
        outcome,
        programs_tested,
        time_elapsed_ms,
    })
}

/// A search running on a dedicated thread.
#[derive(Debug)]
pub struct SolverHandle {
    cancel: CancelToken,
    progress: Arc<AtomicU64>,
    thread: JoinHandle<Result<SolverResult, ConfigError>>,
}

impl SolverHandle {
    /// Candidate count as of the last progress notification.
    pub fn progress(&self) -> u64 {
        self.progress.load(Ordering::Relaxed)
    }

    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    pub fn is_finished(&self) -> bool {
        self.thread.is_finished()
    }

    /// Wait for the search to end. A panicking worker is resumed here.
    pub fn join(self) -> Result<SolverResult, ConfigError> {
        match self.thread.join() {
            Ok(result) => result,
            Err(payload) => std::panic::resume_unwind(payload),
        }
    }
}

/// Start [`solve`] on a new thread.
pub fn spawn_solver(puzzle: Puzzle, config: SolverConfig) -> SolverHandle {
    let cancel = CancelToken::new();
    let progress = Arc::new(AtomicU64::new(0));

    let thread = {
        let cancel = cancel.clone();
        let progress = Arc::clone(&progress);
        thread::spawn(move || {
            solve(&puzzle, &config, &cancel, |count| {
                progress.store(count, Ordering::Relaxed)
            })
        })
    };

    SolverHandle {
        cancel,
        progress,
        thread,
    }
}
