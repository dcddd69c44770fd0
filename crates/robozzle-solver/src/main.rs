//! CLI entry point for the puzzle solver.
//!
//! Usage:
//!   robozzle-solver solve <board.txt> --start X,Y --direction D --functions 5,3 [options]
//!   robozzle-solver evolve <board.txt> --start X,Y --direction D --functions 5,3 [options]
//!
//! Both commands print a JSON report and exit with 0 when a solution was
//! found, 1 otherwise.

mod logging;

use std::path::PathBuf;
use std::process::ExitCode;
use std::thread;
use std::time::{Duration, Instant};

use anyhow::{bail, Context, Result};
use clap::{Args, Parser, Subcommand, ValueEnum};
use serde::Serialize;
use tracing::info;

use robozzle_solver::{
    evolve, execute, read_puzzle, spawn_solver, CancelToken, ColorSet, Direction, EvolutionConfig,
    FunctionLengths, Position, Program, Puzzle, SearchOutcome, SolverConfig, TileColor,
};

#[derive(Parser)]
#[command(name = "robozzle-solver")]
#[command(about = "Find programs that solve RoboZZle puzzles")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Enumerate every pruned program in order until one solves the board
    Solve {
        #[command(flatten)]
        board: BoardArgs,

        /// Report progress every this many candidates
        #[arg(long, default_value = "10000")]
        progress_interval: u64,

        /// Give up after this many seconds
        #[arg(long)]
        timeout: Option<u64>,
    },
    /// Evolve programs with a genetic algorithm
    Evolve {
        #[command(flatten)]
        board: BoardArgs,

        /// Individuals per generation
        #[arg(long, default_value = "200")]
        population: usize,

        /// Maximum generations to breed
        #[arg(long, default_value = "1000")]
        generations: usize,

        /// RNG seed
        #[arg(long, default_value = "42")]
        seed: u64,
    },
}

#[derive(Args)]
struct BoardArgs {
    /// Path to the board text file
    #[arg(value_name = "FILE")]
    file: PathBuf,

    /// Robot start cell as X,Y
    #[arg(long, value_parser = parse_position)]
    start: Position,

    /// Robot start direction
    #[arg(long, value_enum)]
    direction: Heading,

    /// Slot count of each function, F1 first
    #[arg(long, value_delimiter = ',', required = true)]
    functions: Vec<usize>,

    /// Guard colors: `auto` (from the board), `none`, or letters from `rgb`
    #[arg(long, default_value = "auto")]
    colors: String,
}

#[derive(Clone, Copy, ValueEnum)]
enum Heading {
    Up,
    Right,
    Down,
    Left,
}

impl From<Heading> for Direction {
    fn from(heading: Heading) -> Self {
        match heading {
            Heading::Up => Direction::Up,
            Heading::Right => Direction::Right,
            Heading::Down => Direction::Down,
            Heading::Left => Direction::Left,
        }
    }
}

fn parse_position(value: &str) -> Result<Position, String> {
    let (x, y) = value
        .split_once(',')
        .ok_or_else(|| format!("expected X,Y, got {value:?}"))?;
    let x = x.trim().parse().map_err(|e| format!("invalid x: {e}"))?;
    let y = y.trim().parse().map_err(|e| format!("invalid y: {e}"))?;
    Ok(Position::new(x, y))
}

fn parse_colors(value: &str, puzzle: &Puzzle) -> Result<ColorSet> {
    match value {
        "auto" => return Ok(ColorSet::from_puzzle(puzzle)),
        "none" => return Ok(ColorSet::NONE),
        _ => {}
    }
    let mut colors = ColorSet::NONE;
    for c in value.chars() {
        match c.to_ascii_lowercase() {
            'r' => colors.red = true,
            'g' => colors.green = true,
            'b' => colors.blue = true,
            other => bail!("unknown color {other:?} in --colors {value:?}"),
        }
    }
    Ok(colors)
}

impl BoardArgs {
    fn load(&self) -> Result<(Puzzle, ColorSet, FunctionLengths)> {
        let puzzle = read_puzzle(&self.file, self.start, self.direction.into())
            .with_context(|| format!("failed to load board {}", self.file.display()))?;
        puzzle.validate().context("board is not solvable as given")?;
        let colors = parse_colors(&self.colors, &puzzle)?;
        let lengths = FunctionLengths::new(self.functions.clone()).context("invalid --functions")?;
        Ok((puzzle, colors, lengths))
    }
}

/// JSON report printed on stdout
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct SolveOutput {
    found: bool,
    outcome: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    program: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    solution: Option<Program>,
    #[serde(skip_serializing_if = "Option::is_none")]
    metrics: Option<MetricsOutput>,
    #[serde(skip_serializing_if = "Option::is_none")]
    programs_tested: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    generations: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    best_fitness: Option<f64>,
    time_elapsed_ms: u64,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct MetricsOutput {
    steps: usize,
    stars_collected: usize,
    recursion_depth: usize,
}

impl SolveOutput {
    fn new(puzzle: &Puzzle, outcome: &SearchOutcome, time_elapsed_ms: u64) -> Self {
        let (found, label, solution) = match outcome {
            SearchOutcome::Solved(program) => (true, "solved", Some(program.clone())),
            SearchOutcome::Exhausted => (false, "exhausted", None),
            SearchOutcome::Cancelled => (false, "cancelled", None),
        };
        let metrics = solution.as_ref().map(|program| {
            let m = execute(puzzle, program).metrics;
            MetricsOutput {
                steps: m.steps,
                stars_collected: m.stars_collected,
                recursion_depth: m.max_stack_depth,
            }
        });
        Self {
            found,
            outcome: label,
            program: solution.as_ref().map(ToString::to_string),
            solution,
            metrics,
            programs_tested: None,
            generations: None,
            best_fitness: None,
            time_elapsed_ms,
        }
    }
}

fn run_solve(board: &BoardArgs, progress_interval: u64, timeout: Option<u64>) -> Result<SolveOutput> {
    let (puzzle, colors, lengths) = board.load()?;
    let mut config = SolverConfig::new(colors, lengths);
    config.progress_interval = progress_interval;

    let deadline = timeout.map(|secs| Instant::now() + Duration::from_secs(secs));
    let handle = spawn_solver(puzzle.clone(), config);
    while !handle.is_finished() {
        if deadline.is_some_and(|d| Instant::now() >= d) {
            info!(programs_tested = handle.progress(), "timeout reached, cancelling");
            handle.cancel();
            break;
        }
        thread::sleep(Duration::from_millis(50));
    }

    let result = handle.join()?;
    let mut output = SolveOutput::new(&puzzle, &result.outcome, result.time_elapsed_ms);
    output.programs_tested = Some(result.programs_tested);
    Ok(output)
}

fn run_evolve(board: &BoardArgs, config: EvolutionConfig) -> Result<SolveOutput> {
    let (puzzle, colors, lengths) = board.load()?;
    let result = evolve(&puzzle, colors, &lengths, &config, &CancelToken::new(), |generation, best| {
        info!(generation, best, "evolution progress")
    })?;

    let mut output = SolveOutput::new(&puzzle, &result.outcome, result.time_elapsed_ms);
    output.generations = Some(result.generations);
    output.best_fitness = Some(result.best_fitness);
    Ok(output)
}

fn run(cli: Cli) -> Result<SolveOutput> {
    match cli.command {
        Commands::Solve {
            board,
            progress_interval,
            timeout,
        } => run_solve(&board, progress_interval, timeout),
        Commands::Evolve {
            board,
            population,
            generations,
            seed,
        } => {
            let config = EvolutionConfig {
                population_size: population,
                generations,
                seed,
                ..EvolutionConfig::default()
            };
            run_evolve(&board, config)
        }
    }
}

fn main() -> ExitCode {
    logging::init();
    let cli = Cli::parse();

    let output = match run(cli) {
        Ok(output) => output,
        Err(e) => {
            eprintln!("Error: {e:#}");
            return ExitCode::from(2);
        }
    };

    match serde_json::to_string_pretty(&output) {
        Ok(json) => println!("{json}"),
        Err(e) => {
            eprintln!("Error: failed to encode report: {e}");
            return ExitCode::from(2);
        }
    }

    if output.found {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    }
}
