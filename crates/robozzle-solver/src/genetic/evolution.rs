//! Generational evolution loop.
//!
//! [`Population`] is generic over any [`Evolvable`] candidate and its
//! [`Fitness`]; [`evolve`] wires it to program chromosomes and runs until a
//! solution appears, the generation budget runs out or the search is
//! cancelled.

use std::time::Instant;

use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::ConfigError;
use crate::executor::verify_solution;
use crate::genetic::selection::{select_elite, tournament_select, SelectionConfig};
use crate::genetic::{Evolvable, Fitness, ProgramChromosome, ProgramFitness};
use crate::program::{ColorSet, FunctionLengths, Program};
use crate::puzzle::Puzzle;
use crate::solver::{warn_if_large, CancelToken, SearchOutcome};

/// Configuration for the evolution process.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EvolutionConfig {
    /// Population size.
    pub population_size: usize,
    /// Number of generations to run.
    pub generations: usize,
    /// Selection configuration.
    pub selection: SelectionConfig,
    /// Probability that a parent pair is recombined.
    pub crossover_rate: f64,
    /// Probability that a child is mutated.
    pub mutation_rate: f64,
    /// RNG seed for reproducibility.
    pub seed: u64,
    /// Notify progress every this many generations.
    pub progress_interval: usize,
}

impl Default for EvolutionConfig {
    fn default() -> Self {
        Self {
            population_size: 200,
            generations: 1000,
            selection: SelectionConfig::default(),
            crossover_rate: 0.75,
            mutation_rate: 0.1,
            seed: 42,
            progress_interval: 10,
        }
    }
}

/// A scored generation of candidates.
#[derive(Debug)]
pub struct Population<C, F> {
    individuals: Vec<C>,
    scores: Vec<f64>,
    fitness: F,
    config: EvolutionConfig,
}

impl<C, F> Population<C, F>
where
    C: Evolvable,
    F: Fitness<C>,
{
    /// Score the initial individuals. Panics if `individuals` is empty.
    pub fn new(individuals: Vec<C>, fitness: F, config: EvolutionConfig) -> Self {
        assert!(!individuals.is_empty(), "population must not be empty");
        let mut population = Self {
            individuals,
            scores: Vec::new(),
            fitness,
            config,
        };
        population.evaluate();
        population
    }

    fn evaluate(&mut self) {
        let fitness = &self.fitness;
        let scores: Vec<f64> = self
            .individuals
            .par_iter()
            .map(|candidate| fitness.evaluate(candidate))
            .collect();
        self.scores = scores;
    }

    /// Replace the population with the next generation and score it.
    pub fn run_epoch<R: Rng + ?Sized>(&mut self, rng: &mut R) {
        let size = self.individuals.len();
        let selection = self.config.selection;
        let crossover_rate = self.config.crossover_rate.clamp(0.0, 1.0);
        let mutation_rate = self.config.mutation_rate.clamp(0.0, 1.0);

        let mut next: Vec<C> = select_elite(&self.scores, selection.elite_count.min(size))
            .into_iter()
            .map(|i| self.individuals[i].clone())
            .collect();

        while next.len() < size {
            let a = tournament_select(&self.scores, selection.tournament_size, rng);
            let b = tournament_select(&self.scores, selection.tournament_size, rng);
            let mut first = self.individuals[a].clone();
            let mut second = self.individuals[b].clone();

            if rng.gen_bool(crossover_rate) {
                first.crossover(&mut second, rng);
            }
            for child in [&mut first, &mut second] {
                if rng.gen_bool(mutation_rate) {
                    child.mutate(rng);
                }
            }

            next.push(first);
            if next.len() < size {
                next.push(second);
            }
        }

        self.individuals = next;
        self.evaluate();
    }

    /// The fittest individual and its score; ties go to the earliest.
    pub fn best(&self) -> (&C, f64) {
        let mut best = 0;
        for (i, &score) in self.scores.iter().enumerate() {
            if score > self.scores[best] {
                best = i;
            }
        }
        (&self.individuals[best], self.scores[best])
    }

    pub fn individuals(&self) -> &[C] {
        &self.individuals
    }

    pub fn scores(&self) -> &[f64] {
        &self.scores
    }

    pub fn fitness(&self) -> &F {
        &self.fitness
    }
}

/// Result of an evolutionary search
#[derive(Debug, Clone)]
pub struct EvolutionResult {
    pub outcome: SearchOutcome,
    /// Generations bred after the initial population
    pub generations: usize,
    /// Best score in the final population
    pub best_fitness: f64,
    /// Decoded program of the best individual
    pub best: Program,
    /// Time elapsed in milliseconds
    pub time_elapsed_ms: u64,
}

/// Evolve programs for `puzzle` until one solves it.
///
/// `on_progress` receives the generation number and best score every
/// `config.progress_interval` generations. `cancel` is checked between
/// generations.
pub fn evolve<P>(
    puzzle: &Puzzle,
    colors: ColorSet,
    lengths: &FunctionLengths,
    config: &EvolutionConfig,
    cancel: &CancelToken,
    mut on_progress: P,
) -> Result<EvolutionResult, ConfigError>
where
    P: FnMut(usize, f64),
{
    puzzle.validate()?;
    if config.population_size < 2 {
        return Err(ConfigError::PopulationTooSmall(config.population_size));
    }
    warn_if_large(colors, lengths);

    let start_time = Instant::now();
    let interval = config.progress_interval.max(1);
    let mut rng = SmallRng::seed_from_u64(config.seed);

    info!(
        functions = ?lengths.as_slice(),
        colors = ?colors,
        population = config.population_size,
        seed = config.seed,
        "starting evolutionary search"
    );

    let individuals = (0..config.population_size)
        .map(|_| ProgramChromosome::random(lengths, colors, &mut rng))
        .collect();
    let fitness = ProgramFitness::new(puzzle, lengths.clone());
    let target = fitness.target();
    let mut population = Population::new(individuals, fitness, config.clone());
    let mut generation = 0;

    let outcome = loop {
        let (best, best_fitness) = population.best();
        if best_fitness >= target {
            let program = population.fitness().decode(best);
            if verify_solution(puzzle, &program) {
                break SearchOutcome::Solved(program);
            }
        }
        if generation >= config.generations {
            break SearchOutcome::Exhausted;
        }
        if cancel.is_cancelled() {
            break SearchOutcome::Cancelled;
        }

        population.run_epoch(&mut rng);
        generation += 1;

        if generation % interval == 0 {
            let (_, best_fitness) = population.best();
            debug!(generation, best_fitness, "generation complete");
            on_progress(generation, best_fitness);
        }
    };

    let (best, best_fitness) = population.best();
    let best = population.fitness().decode(best);
    let time_elapsed_ms = start_time.elapsed().as_millis() as u64;
    match &outcome {
        SearchOutcome::Solved(program) => {
            info!(generation, time_elapsed_ms, %program, "solution evolved")
        }
        SearchOutcome::Exhausted => {
            info!(generation, best_fitness, time_elapsed_ms, "generation budget spent")
        }
        SearchOutcome::Cancelled => info!(generation, time_elapsed_ms, "evolution cancelled"),
    }

    Ok(EvolutionResult {
        outcome,
        generations: generation,
        best_fitness,
        best,
        time_elapsed_ms,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::puzzle::{Direction, Position, TileColor};

    fn red_strip(stars: &[i32], gaps: &[i32]) -> Puzzle {
        let mut puzzle = Puzzle::new(3, 1, Position::new(0, 0), Direction::Right);
        for x in 0..3 {
            if !gaps.contains(&x) {
                puzzle.set_color(Position::new(x, 0), Some(TileColor::Red));
            }
        }
        for &x in stars {
            puzzle.set_star(Position::new(x, 0), true);
        }
        puzzle
    }

    fn lengths(values: &[usize]) -> FunctionLengths {
        FunctionLengths::new(values.to_vec()).unwrap()
    }

    /// Integer candidate whose fitness is its own value.
    #[derive(Debug, Clone, PartialEq)]
    struct Counter(u32);

    impl Evolvable for Counter {
        fn mutate<R: Rng + ?Sized>(&mut self, rng: &mut R) {
            self.0 = rng.gen_range(0..100);
        }

        fn crossover<R: Rng + ?Sized>(&mut self, other: &mut Self, _rng: &mut R) {
            std::mem::swap(self, other);
        }
    }

    struct Value;

    impl Fitness<Counter> for Value {
        fn evaluate(&self, candidate: &Counter) -> f64 {
            candidate.0 as f64
        }
    }

    #[test]
    fn test_population_scores_in_order() {
        let population = Population::new(
            vec![Counter(3), Counter(9), Counter(1)],
            Value,
            EvolutionConfig::default(),
        );
        assert_eq!(population.scores(), &[3.0, 9.0, 1.0]);
        assert_eq!(population.best(), (&Counter(9), 9.0));
    }

    #[test]
    fn test_elitism_keeps_best_score() {
        let config = EvolutionConfig {
            mutation_rate: 1.0,
            ..EvolutionConfig::default()
        };
        let individuals = (0..20).map(Counter).collect();
        let mut population = Population::new(individuals, Value, config);
        let mut rng = SmallRng::seed_from_u64(1);

        let mut previous = population.best().1;
        for _ in 0..30 {
            population.run_epoch(&mut rng);
            assert_eq!(population.individuals().len(), 20);
            let best = population.best().1;
            assert!(best >= previous);
            previous = best;
        }
    }

    #[test]
    fn test_evolve_solves_trivial_board() {
        let puzzle = red_strip(&[2], &[]);
        let result = evolve(
            &puzzle,
            ColorSet::NONE,
            &lengths(&[2]),
            &EvolutionConfig::default(),
            &CancelToken::new(),
            |_, _| {},
        )
        .unwrap();

        match &result.outcome {
            SearchOutcome::Solved(program) => assert!(verify_solution(&puzzle, program)),
            other => panic!("expected a solution, got {other:?}"),
        }
        assert_eq!(result.best_fitness, 2.0);
    }

    #[test]
    fn test_evolve_is_reproducible() {
        let puzzle = red_strip(&[1, 2], &[]);
        let config = EvolutionConfig {
            population_size: 30,
            generations: 20,
            seed: 7,
            ..EvolutionConfig::default()
        };
        let run = || {
            evolve(
                &puzzle,
                ColorSet::NONE,
                &lengths(&[3, 2]),
                &config,
                &CancelToken::new(),
                |_, _| {},
            )
            .unwrap()
        };
        let (a, b) = (run(), run());
        assert_eq!(a.outcome, b.outcome);
        assert_eq!(a.generations, b.generations);
        assert_eq!(a.best, b.best);
    }

    #[test]
    fn test_unsolvable_board_spends_budget() {
        let puzzle = red_strip(&[2], &[1]);
        let config = EvolutionConfig {
            population_size: 10,
            generations: 4,
            progress_interval: 2,
            ..EvolutionConfig::default()
        };
        let mut ticks = Vec::new();
        let result = evolve(
            &puzzle,
            ColorSet::NONE,
            &lengths(&[2]),
            &config,
            &CancelToken::new(),
            |generation, _| ticks.push(generation),
        )
        .unwrap();

        assert_eq!(result.outcome, SearchOutcome::Exhausted);
        assert_eq!(result.generations, 4);
        assert_eq!(result.best_fitness, 1.0);
        assert_eq!(ticks, vec![2, 4]);
    }

    #[test]
    fn test_cancel_stops_before_first_generation() {
        let puzzle = red_strip(&[2], &[1]);
        let cancel = CancelToken::new();
        cancel.cancel();

        let result = evolve(
            &puzzle,
            ColorSet::NONE,
            &lengths(&[2]),
            &EvolutionConfig::default(),
            &cancel,
            |_, _| {},
        )
        .unwrap();
        assert_eq!(result.outcome, SearchOutcome::Cancelled);
        assert_eq!(result.generations, 0);
    }

    #[test]
    fn test_population_too_small_rejected() {
        let puzzle = red_strip(&[2], &[]);
        let config = EvolutionConfig {
            population_size: 1,
            ..EvolutionConfig::default()
        };
        let err = evolve(
            &puzzle,
            ColorSet::NONE,
            &lengths(&[2]),
            &config,
            &CancelToken::new(),
            |_, _| {},
        )
        .unwrap_err();
        assert_eq!(err, ConfigError::PopulationTooSmall(1));
    }
}
