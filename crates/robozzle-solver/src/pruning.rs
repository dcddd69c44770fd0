//! Search space pruning rules for the program generator.
//!
//! Each rule skips candidates that are redundant with a shorter or
//! earlier-enumerated program, or that can never make progress. None of them
//! changes whether a puzzle has a solution.

use crate::program::{Instruction, InstructionType, Program};

/// Longest allowed run of identical right turns under one guard.
/// Three rights are one left, which shorter programs already cover.
const MAX_RIGHT_RUN: usize = 2;
/// Two lefts are two rights, so a single left is the longest useful run.
const MAX_LEFT_RUN: usize = 1;

/// Check if an adjacent instruction pair cancels out.
///
/// A left turn directly followed by a right turn (or the reverse) under the
/// same condition leaves the robot exactly where it was.
pub fn is_banned_pair(a: &Instruction, b: &Instruction) -> bool {
    a.condition == b.condition
        && matches!(
            (a.instruction_type, b.instruction_type),
            (InstructionType::Left, InstructionType::Right)
                | (InstructionType::Right, InstructionType::Left)
        )
}

/// Length of the run of `candidate` that placing it after `preceding` would
/// create.
fn run_length(preceding: &[Instruction], candidate: &Instruction) -> usize {
    1 + preceding
        .iter()
        .rev()
        .take_while(|inst| *inst == candidate)
        .count()
}

/// Check whether `candidate` may be placed at slot `depth` of function
/// `func_index`, given the slots already filled before it.
pub fn is_banned_slot(
    body: &[Instruction],
    func_index: usize,
    depth: usize,
    candidate: &Instruction,
) -> bool {
    let preceding = &body[..depth];

    if candidate.instruction_type.is_turn() {
        if let Some(prev) = preceding.last() {
            if is_banned_pair(prev, candidate) {
                return true;
            }
        }

        let max_run = match candidate.instruction_type {
            InstructionType::Right => MAX_RIGHT_RUN,
            _ => MAX_LEFT_RUN,
        };
        if run_length(preceding, candidate) > max_run {
            return true;
        }
    }

    // A function opening with a call to itself recurses without doing anything
    depth == 0 && candidate.instruction_type.function_index() == Some(func_index)
}

/// Check if a fully assembled program should be skipped.
///
/// A program without any forward move can never reach a star.
pub fn should_reject_program(program: &Program) -> bool {
    !program.has_forward()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::puzzle::TileColor;

    fn inst(instruction_type: InstructionType) -> Instruction {
        Instruction::new(instruction_type)
    }

    #[test]
    fn test_left_right_banned() {
        let left = inst(InstructionType::Left);
        let right = inst(InstructionType::Right);

        assert!(is_banned_pair(&left, &right));
        assert!(is_banned_pair(&right, &left));
        assert!(!is_banned_pair(&left, &left));
    }

    #[test]
    fn test_conditional_left_right_different_conditions_not_banned() {
        let red_left = Instruction::with_condition(InstructionType::Left, TileColor::Red);
        let blue_right = Instruction::with_condition(InstructionType::Right, TileColor::Blue);

        assert!(!is_banned_pair(&red_left, &blue_right));
    }

    #[test]
    fn test_opposite_turn_slot_banned() {
        let body = [inst(InstructionType::Right), Instruction::EMPTY];
        assert!(is_banned_slot(&body, 0, 1, &inst(InstructionType::Left)));

        let red_left = Instruction::with_condition(InstructionType::Left, TileColor::Red);
        assert!(!is_banned_slot(&body, 0, 1, &red_left));
    }

    #[test]
    fn test_turn_runs_capped() {
        let right = inst(InstructionType::Right);
        let left = inst(InstructionType::Left);

        let body = [right, right, Instruction::EMPTY];
        assert!(!is_banned_slot(&body, 0, 1, &right));
        assert!(is_banned_slot(&body, 0, 2, &right));

        let body = [left, Instruction::EMPTY];
        assert!(is_banned_slot(&body, 0, 1, &left));

        // Runs only count identical guards
        let red_left = Instruction::with_condition(InstructionType::Left, TileColor::Red);
        assert!(!is_banned_slot(&body, 0, 1, &red_left));
    }

    #[test]
    fn test_turn_run_is_contiguous() {
        let right = inst(InstructionType::Right);
        let forward = inst(InstructionType::Forward);
        let body = [right, right, forward, right, Instruction::EMPTY];

        assert!(!is_banned_slot(&body, 0, 4, &right));
    }

    #[test]
    fn test_self_call_first_slot_banned() {
        let body = [Instruction::EMPTY, Instruction::EMPTY];
        assert!(is_banned_slot(&body, 0, 0, &inst(InstructionType::F1)));
        assert!(is_banned_slot(&body, 1, 0, &inst(InstructionType::F2)));
        assert!(!is_banned_slot(&body, 0, 0, &inst(InstructionType::F2)));

        let body = [inst(InstructionType::Forward), Instruction::EMPTY];
        assert!(!is_banned_slot(&body, 0, 1, &inst(InstructionType::F1)));
    }

    #[test]
    fn test_reject_program_without_forward() {
        let turning = Program::new(vec![vec![inst(InstructionType::Left)]]);
        assert!(should_reject_program(&turning));

        let guarded = Program::new(vec![vec![Instruction::with_condition(
            InstructionType::Forward,
            TileColor::Green,
        )]]);
        assert!(!should_reject_program(&guarded));
    }
}
