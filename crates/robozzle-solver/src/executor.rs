//! Program interpreter with loop detection and metrics tracking.
//!
//! A run is bounded without any step limit: every instruction slot that is
//! reached records its execution state (position, direction, function,
//! instruction index), and reaching a recorded state again ends the run as a
//! cycle. Collected stars are not part of that state, so a program that
//! passes through the same state after eating a star is still rejected. This
//! is conservative and occasionally discards a program that would have
//! finished; callers rely on the exact behaviour, so it stays.

use std::collections::HashSet;

use smallvec::{smallvec, SmallVec};

use crate::program::{InstructionType, Program};
use crate::puzzle::{Direction, Position, Puzzle};

/// Result status of program execution
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExecutionStatus {
    /// All stars collected
    Solved,
    /// Robot left the board or moved onto an unpainted cell
    Fell,
    /// An execution state was reached twice
    Cycle,
    /// F1 ran out of instructions with stars left
    Exhausted,
}

impl ExecutionStatus {
    pub fn is_solved(self) -> bool {
        self == ExecutionStatus::Solved
    }
}

/// Metrics collected during execution
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ExecutionMetrics {
    /// Instructions that actually ran (skipped guards and empty slots excluded)
    pub steps: usize,
    /// Distinct execution states recorded
    pub states_visited: usize,
    pub max_stack_depth: usize,
    pub stars_collected: usize,
    pub total_stars: usize,
}

/// Result of running a program
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExecutionResult {
    pub status: ExecutionStatus,
    pub metrics: ExecutionMetrics,
}

impl ExecutionResult {
    pub fn solved(&self) -> bool {
        self.status.is_solved()
    }

    pub fn stars_eaten(&self) -> usize {
        self.metrics.stars_collected
    }
}

/// Loop detection key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
struct ExecutionState {
    position: Position,
    direction: Direction,
    func_index: usize,
    inst_index: usize,
}

/// An active function call: which function, and the next slot to run.
#[derive(Debug, Clone, Copy)]
struct StackFrame {
    func_index: usize,
    next_inst: usize,
}

impl StackFrame {
    fn new(func_index: usize) -> Self {
        Self {
            func_index,
            next_inst: 0,
        }
    }
}

/// Run `program` on `puzzle` until it solves, fails, or loops.
///
/// The puzzle must be a valid configuration (see [`Puzzle::validate`]).
pub fn execute(puzzle: &Puzzle, program: &Program) -> ExecutionResult {
    let mut metrics = ExecutionMetrics {
        total_stars: puzzle.star_count(),
        ..Default::default()
    };
    let finish = |status, metrics| ExecutionResult { status, metrics };

    let mut position = puzzle.start();
    let mut direction = puzzle.start_direction();
    let mut eaten = vec![false; puzzle.width() * puzzle.height()];

    // A star under the start cell counts before any instruction runs
    if let Some(index) = puzzle.index_of(position) {
        if puzzle.has_star(position) {
            eaten[index] = true;
            metrics.stars_collected = 1;
            if metrics.stars_collected == metrics.total_stars {
                return finish(ExecutionStatus::Solved, metrics);
            }
        }
    }

    let mut seen_states: HashSet<ExecutionState> = HashSet::new();
    let mut stack: SmallVec<[StackFrame; 16]> = smallvec![StackFrame::new(0)];
    metrics.max_stack_depth = 1;

    while let Some(frame) = stack.last_mut() {
        let body = program.function(frame.func_index);
        if frame.next_inst >= body.len() {
            // Function exhausted: the caller resumes after its call
            stack.pop();
            continue;
        }

        let func_index = frame.func_index;
        let inst_index = frame.next_inst;
        frame.next_inst += 1;

        let state = ExecutionState {
            position,
            direction,
            func_index,
            inst_index,
        };
        if !seen_states.insert(state) {
            return finish(ExecutionStatus::Cycle, metrics);
        }
        metrics.states_visited += 1;

        let instruction = body[inst_index];
        if instruction.is_noop() || !instruction.should_execute(puzzle.color_at(position)) {
            continue;
        }
        metrics.steps += 1;

        match instruction.instruction_type {
            InstructionType::Forward => {
                let next = position.step(direction);
                let Some(index) = puzzle.index_of(next) else {
                    return finish(ExecutionStatus::Fell, metrics);
                };
                if puzzle.color_at(next).is_none() {
                    return finish(ExecutionStatus::Fell, metrics);
                }
                position = next;

                if puzzle.has_star(next) && !eaten[index] {
                    eaten[index] = true;
                    metrics.stars_collected += 1;
                    if metrics.stars_collected == metrics.total_stars {
                        return finish(ExecutionStatus::Solved, metrics);
                    }
                }
            }

            InstructionType::Left => direction = direction.turn_left(),

            InstructionType::Right => direction = direction.turn_right(),

            InstructionType::F1
            | InstructionType::F2
            | InstructionType::F3
            | InstructionType::F4
            | InstructionType::F5 => {
                if let Some(target) = instruction.instruction_type.function_index() {
                    stack.push(StackFrame::new(target));
                    metrics.max_stack_depth = metrics.max_stack_depth.max(stack.len());
                }
            }

            InstructionType::Noop => {}
        }
    }

    finish(ExecutionStatus::Exhausted, metrics)
}

/// Simple verification: does the program solve the puzzle?
pub fn verify_solution(puzzle: &Puzzle, program: &Program) -> bool {
    execute(puzzle, program).solved()
}
