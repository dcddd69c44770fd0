//! Depth-first enumeration of candidate programs.
//!
//! Functions are filled left to right, slots within a function left to
//! right. At every slot each allowed instruction is first tried as the last
//! one of its function (the remaining slots stay empty) before the function
//! is extended, so every prefix length is a candidate body of its own.
//!
//! Candidate order per slot is action-major: `Forward, Left, Right, F1..Fk`,
//! each with the unconditional variant first and then red, green, blue
//! guards as enabled.

use std::ops::ControlFlow;

use smallvec::SmallVec;

use crate::program::{ColorSet, FunctionLengths, Instruction, InstructionType, Program};
use crate::pruning::{is_banned_slot, should_reject_program};

/// Walk every admissible program in enumeration order.
///
/// `visit` receives each complete candidate and returns
/// [`ControlFlow::Break`] to stop the walk. The program handed out is a view
/// of the generator's working buffer; clone it to keep it. Returns `Break` if
/// the visitor stopped the walk, `Continue` if the space was exhausted.
pub fn generate_programs<F>(colors: ColorSet, lengths: &FunctionLengths, mut visit: F) -> ControlFlow<()>
where
    F: FnMut(&Program) -> ControlFlow<()>,
{
    let mut generator = ProgramGenerator::new(colors, lengths);
    generator.fill_function(0, &mut visit)
}

/// Instructions allowed in any slot, in the order they are tried.
pub fn slot_candidates(colors: ColorSet, function_count: usize) -> SmallVec<[Instruction; 32]> {
    let mut actions: SmallVec<[InstructionType; 8]> = SmallVec::new();
    actions.extend([
        InstructionType::Forward,
        InstructionType::Left,
        InstructionType::Right,
    ]);
    actions.extend(InstructionType::CALLS.into_iter().take(function_count));

    let conditions = colors.conditions();
    actions
        .iter()
        .flat_map(|&instruction_type| {
            conditions.iter().map(move |&condition| Instruction {
                instruction_type,
                condition,
            })
        })
        .collect()
}

/// Mutable search state: the slot candidates and the program being built.
///
/// Invariant: while slot `depth` of function `func` is being tried, every
/// later slot of `func` and every slot of later functions is empty.
struct ProgramGenerator {
    candidates: SmallVec<[Instruction; 32]>,
    buffer: Program,
}

impl ProgramGenerator {
    fn new(colors: ColorSet, lengths: &FunctionLengths) -> Self {
        Self {
            candidates: slot_candidates(colors, lengths.function_count()),
            buffer: Program::with_lengths(lengths),
        }
    }

    fn fill_function<F>(&mut self, func: usize, visit: &mut F) -> ControlFlow<()>
    where
        F: FnMut(&Program) -> ControlFlow<()>,
    {
        if func == self.buffer.function_count() {
            if should_reject_program(&self.buffer) {
                return ControlFlow::Continue(());
            }
            return visit(&self.buffer);
        }
        self.fill_slot(func, 0, visit)
    }

    fn fill_slot<F>(&mut self, func: usize, depth: usize, visit: &mut F) -> ControlFlow<()>
    where
        F: FnMut(&Program) -> ControlFlow<()>,
    {
        let len = self.buffer.function(func).len();

        for i in 0..self.candidates.len() {
            let candidate = self.candidates[i];
            if is_banned_slot(self.buffer.function(func), func, depth, &candidate) {
                continue;
            }

            self.buffer.function_mut(func)[depth] = candidate;

            // End this function here, then try growing it
            self.fill_function(func + 1, visit)?;
            if depth + 1 < len {
                self.fill_slot(func, depth + 1, visit)?;
            }

            self.buffer.function_mut(func)[depth] = Instruction::EMPTY;
        }

        ControlFlow::Continue(())
    }
}
