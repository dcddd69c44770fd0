//! Fitness of a program chromosome: stars eaten when run on the puzzle.

use crate::executor::{execute, ExecutionResult};
use crate::genetic::{Fitness, ProgramChromosome};
use crate::program::{FunctionLengths, Program};
use crate::puzzle::Puzzle;

/// Scores chromosomes against one puzzle and function layout.
#[derive(Debug, Clone)]
pub struct ProgramFitness<'a> {
    puzzle: &'a Puzzle,
    lengths: FunctionLengths,
}

impl<'a> ProgramFitness<'a> {
    pub fn new(puzzle: &'a Puzzle, lengths: FunctionLengths) -> Self {
        Self { puzzle, lengths }
    }

    pub fn decode(&self, chromosome: &ProgramChromosome) -> Program {
        chromosome.to_program(&self.lengths)
    }

    pub fn run(&self, chromosome: &ProgramChromosome) -> ExecutionResult {
        execute(self.puzzle, &self.decode(chromosome))
    }

    /// Score of a chromosome that solves the puzzle.
    pub fn target(&self) -> f64 {
        (self.puzzle.star_count() + 1) as f64
    }
}

impl Fitness<ProgramChromosome> for ProgramFitness<'_> {
    /// Stars eaten plus one, so every score stays positive.
    fn evaluate(&self, chromosome: &ProgramChromosome) -> f64 {
        (self.run(chromosome).stars_eaten() + 1) as f64
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::program::{ColorSet, Instruction, InstructionType};
    use crate::puzzle::{Direction, Position, TileColor};

    fn strip() -> Puzzle {
        let mut puzzle = Puzzle::new(4, 1, Position::new(0, 0), Direction::Right);
        for x in 0..4 {
            puzzle.set_color(Position::new(x, 0), Some(TileColor::Green));
        }
        puzzle.set_star(Position::new(1, 0), true);
        puzzle.set_star(Position::new(3, 0), true);
        puzzle
    }

    fn chromosome(slots: &[InstructionType]) -> ProgramChromosome {
        ProgramChromosome::from_slots(
            slots.iter().map(|&t| Instruction::new(t)).collect(),
            2,
            ColorSet::NONE,
        )
    }

    #[test]
    fn test_fitness_counts_stars_plus_one() {
        let puzzle = strip();
        let fitness = ProgramFitness::new(&puzzle, FunctionLengths::new(vec![2, 1]).unwrap());

        let nothing = chromosome(&[InstructionType::Left, InstructionType::Noop, InstructionType::Noop]);
        assert_eq!(fitness.evaluate(&nothing), 1.0);

        let one_star = chromosome(&[InstructionType::Forward, InstructionType::Noop, InstructionType::Noop]);
        assert_eq!(fitness.evaluate(&one_star), 2.0);

        // F1: Forward, F2 / F2: F1 walks the whole strip
        let solved = chromosome(&[InstructionType::Forward, InstructionType::F2, InstructionType::F1]);
        assert_eq!(fitness.evaluate(&solved), fitness.target());
        assert!(fitness.run(&solved).solved());
    }

    #[test]
    fn test_fitness_counts_stars_before_failure() {
        let puzzle = strip();
        let fitness = ProgramFitness::new(&puzzle, FunctionLengths::new(vec![3]).unwrap());

        // Eats the first star, then turns and walks off the board
        let program = ProgramChromosome::from_slots(
            vec![
                Instruction::new(InstructionType::Forward),
                Instruction::new(InstructionType::Left),
                Instruction::new(InstructionType::Forward),
            ],
            1,
            ColorSet::NONE,
        );
        assert!(!fitness.run(&program).solved());
        assert_eq!(fitness.evaluate(&program), 2.0);
    }
}
