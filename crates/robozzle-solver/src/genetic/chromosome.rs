//! Flat slot encoding of a program and its genetic operators.

use rand::Rng;

use crate::genetic::Evolvable;
use crate::program::{ColorSet, FunctionLengths, Instruction, InstructionType, Program, MAX_FUNCTIONS};
use crate::puzzle::TileColor;

/// Every slot of every function, F1 first, in one sequence.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProgramChromosome {
    slots: Vec<Instruction>,
    function_count: usize,
    colors: ColorSet,
}

impl ProgramChromosome {
    /// A chromosome with every slot drawn independently at random.
    pub fn random<R: Rng + ?Sized>(lengths: &FunctionLengths, colors: ColorSet, rng: &mut R) -> Self {
        let mut chromosome = Self {
            slots: Vec::with_capacity(lengths.total_slots()),
            function_count: lengths.function_count(),
            colors,
        };
        for _ in 0..lengths.total_slots() {
            let slot = Instruction {
                instruction_type: chromosome.random_action(rng),
                condition: chromosome.random_condition(rng),
            };
            chromosome.slots.push(slot);
        }
        chromosome
    }

    pub fn from_slots(slots: Vec<Instruction>, function_count: usize, colors: ColorSet) -> Self {
        debug_assert!(!slots.is_empty() && (1..=MAX_FUNCTIONS).contains(&function_count));
        Self {
            slots,
            function_count,
            colors,
        }
    }

    pub fn slots(&self) -> &[Instruction] {
        &self.slots
    }

    pub fn slot_count(&self) -> usize {
        self.slots.len()
    }

    /// Uniform over empty, the three moves and the configured calls.
    fn random_action<R: Rng + ?Sized>(&self, rng: &mut R) -> InstructionType {
        match rng.gen_range(0..self.function_count + 4) {
            0 => InstructionType::Noop,
            1 => InstructionType::Left,
            2 => InstructionType::Right,
            3 => InstructionType::Forward,
            n => InstructionType::CALLS[n - 4],
        }
    }

    /// Uniform over the four guard codes, redrawn until allowed.
    fn random_condition<R: Rng + ?Sized>(&self, rng: &mut R) -> Option<TileColor> {
        loop {
            let condition = TileColor::from_code(rng.gen_range(0..4u8));
            if self.colors.allows(condition) {
                return condition;
            }
        }
    }

    /// Swap slots `first..=last` with the same range of `other`.
    pub fn swap_range(&mut self, other: &mut Self, first: usize, last: usize) {
        debug_assert!(first <= last && last < self.slots.len());
        self.slots[first..=last].swap_with_slice(&mut other.slots[first..=last]);
    }

    /// Re-slice into functions of the given lengths.
    pub fn to_program(&self, lengths: &FunctionLengths) -> Program {
        debug_assert_eq!(lengths.total_slots(), self.slots.len());
        let mut rest = self.slots.as_slice();
        let functions = lengths
            .as_slice()
            .iter()
            .map(|&len| {
                let (body, tail) = rest.split_at(len);
                rest = tail;
                body.to_vec()
            })
            .collect();
        Program::new(functions)
    }
}

impl Evolvable for ProgramChromosome {
    /// Redraw either the action or the guard of one random slot.
    fn mutate<R: Rng + ?Sized>(&mut self, rng: &mut R) {
        let mutate_color = rng.gen_bool(0.5);
        let pos = rng.gen_range(0..self.slots.len());
        if mutate_color {
            self.slots[pos].condition = self.random_condition(rng);
        } else {
            self.slots[pos].instruction_type = self.random_action(rng);
        }
    }

    /// Two-point crossover: swap the range between two random positions.
    fn crossover<R: Rng + ?Sized>(&mut self, other: &mut Self, rng: &mut R) {
        let a = rng.gen_range(0..self.slots.len());
        let b = rng.gen_range(0..self.slots.len());
        self.swap_range(other, a.min(b), a.max(b));
    }
}
