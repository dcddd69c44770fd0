//! Program representation: functions made of color-guarded instruction slots.

use std::fmt;

use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use crate::error::ConfigError;
use crate::puzzle::{Puzzle, TileColor};

/// Maximum number of functions a program may declare.
pub const MAX_FUNCTIONS: usize = 5;

/// Instruction type. `Noop` marks an unfilled slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InstructionType {
    #[default]
    Noop,
    Forward,
    Left,
    Right,
    F1,
    F2,
    F3,
    F4,
    F5,
}

impl InstructionType {
    pub const CALLS: [InstructionType; MAX_FUNCTIONS] = [
        InstructionType::F1,
        InstructionType::F2,
        InstructionType::F3,
        InstructionType::F4,
        InstructionType::F5,
    ];

    /// The call instruction for function `index` (0-4).
    pub fn call(index: usize) -> Option<InstructionType> {
        Self::CALLS.get(index).copied()
    }

    /// Check if this is a function call
    pub fn is_function_call(self) -> bool {
        self.function_index().is_some()
    }

    /// Check if this is a turn instruction
    pub fn is_turn(self) -> bool {
        matches!(self, InstructionType::Left | InstructionType::Right)
    }

    /// Get the function index (0-4) if this is a function call
    pub fn function_index(self) -> Option<usize> {
        match self {
            InstructionType::F1 => Some(0),
            InstructionType::F2 => Some(1),
            InstructionType::F3 => Some(2),
            InstructionType::F4 => Some(3),
            InstructionType::F5 => Some(4),
            _ => None,
        }
    }
}

impl fmt::Display for InstructionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            InstructionType::Noop => "Noop",
            InstructionType::Forward => "Forward",
            InstructionType::Left => "Left",
            InstructionType::Right => "Right",
            InstructionType::F1 => "F1",
            InstructionType::F2 => "F2",
            InstructionType::F3 => "F3",
            InstructionType::F4 => "F4",
            InstructionType::F5 => "F5",
        };
        f.write_str(name)
    }
}

/// A single instruction slot with optional color condition
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Instruction {
    #[serde(rename = "type")]
    pub instruction_type: InstructionType,
    pub condition: Option<TileColor>,
}

impl Instruction {
    /// An unfilled slot.
    pub const EMPTY: Instruction = Instruction {
        instruction_type: InstructionType::Noop,
        condition: None,
    };

    pub fn new(instruction_type: InstructionType) -> Self {
        Self {
            instruction_type,
            condition: None,
        }
    }

    pub fn with_condition(instruction_type: InstructionType, condition: TileColor) -> Self {
        Self {
            instruction_type,
            condition: Some(condition),
        }
    }

    /// Check if this instruction should execute given the current tile color
    pub fn should_execute(&self, tile_color: Option<TileColor>) -> bool {
        match self.condition {
            None => true,
            Some(cond) => tile_color == Some(cond),
        }
    }

    pub fn is_noop(&self) -> bool {
        self.instruction_type == InstructionType::Noop
    }
}

impl fmt::Display for Instruction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.instruction_type)?;
        if let Some(color) = self.condition {
            write!(f, "({color:?})")?;
        }
        Ok(())
    }
}

/// Ordered slot counts of the functions to search, F1 first.
///
/// Always holds between 1 and [`MAX_FUNCTIONS`] entries, each at least 1.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<usize>", into = "Vec<usize>")]
pub struct FunctionLengths(Vec<usize>);

impl FunctionLengths {
    pub fn new(lengths: Vec<usize>) -> Result<Self, ConfigError> {
        if lengths.is_empty() {
            return Err(ConfigError::NoFunctions);
        }
        if lengths.len() > MAX_FUNCTIONS {
            return Err(ConfigError::TooManyFunctions(lengths.len()));
        }
        if let Some(index) = lengths.iter().position(|&len| len == 0) {
            return Err(ConfigError::EmptyFunction(index + 1));
        }
        Ok(Self(lengths))
    }

    /// Build from the editor's five raw slot counts, where zero means the
    /// function is unused. F1 must still have at least one slot.
    pub fn from_editor_slots(slots: [usize; MAX_FUNCTIONS]) -> Result<Self, ConfigError> {
        if slots[0] == 0 {
            return Err(ConfigError::EmptyFunction(1));
        }
        Self::new(slots.into_iter().filter(|&len| len > 0).collect())
    }

    pub fn get(&self, index: usize) -> usize {
        self.0.get(index).copied().unwrap_or(0)
    }

    pub fn function_count(&self) -> usize {
        self.0.len()
    }

    pub fn total_slots(&self) -> usize {
        self.0.iter().sum()
    }

    pub fn as_slice(&self) -> &[usize] {
        &self.0
    }
}

impl TryFrom<Vec<usize>> for FunctionLengths {
    type Error = ConfigError;

    fn try_from(lengths: Vec<usize>) -> Result<Self, Self::Error> {
        Self::new(lengths)
    }
}

impl From<FunctionLengths> for Vec<usize> {
    fn from(lengths: FunctionLengths) -> Self {
        lengths.0
    }
}

/// Which guard colors the search may use.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ColorSet {
    pub red: bool,
    pub green: bool,
    pub blue: bool,
}

impl ColorSet {
    pub const NONE: ColorSet = ColorSet {
        red: false,
        green: false,
        blue: false,
    };

    pub const ALL: ColorSet = ColorSet {
        red: true,
        green: true,
        blue: true,
    };

    /// Enable the colors present on the board. A board with fewer than two
    /// distinct colors gets no guards at all, since a guard could never tell
    /// two cells apart.
    pub fn from_puzzle(puzzle: &Puzzle) -> Self {
        let counts = puzzle.color_counts();
        if counts.distinct() < 2 {
            return Self::NONE;
        }
        Self {
            red: counts.red > 0,
            green: counts.green > 0,
            blue: counts.blue > 0,
        }
    }

    pub fn contains(&self, color: TileColor) -> bool {
        match color {
            TileColor::Red => self.red,
            TileColor::Green => self.green,
            TileColor::Blue => self.blue,
        }
    }

    /// Whether a slot may carry this condition. `None` is always allowed.
    pub fn allows(&self, condition: Option<TileColor>) -> bool {
        condition.map_or(true, |color| self.contains(color))
    }

    /// Conditions in search order: unconditional first, then red, green, blue.
    pub fn conditions(&self) -> SmallVec<[Option<TileColor>; 4]> {
        let mut conditions = SmallVec::new();
        conditions.push(None);
        for color in TileColor::ALL {
            if self.contains(color) {
                conditions.push(Some(color));
            }
        }
        conditions
    }
}

/// Rough size of the unpruned search space: `((3 + k) * c) ^ slots`.
pub fn search_space_estimate(colors: ColorSet, lengths: &FunctionLengths) -> f64 {
    let actions = 3 + lengths.function_count();
    let conditions = colors.conditions().len();
    ((actions * conditions) as f64).powi(lengths.total_slots() as i32)
}

/// A program consisting of 1 to 5 functions
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Program {
    functions: Vec<Vec<Instruction>>,
}

impl Program {
    pub fn new(functions: Vec<Vec<Instruction>>) -> Self {
        Self { functions }
    }

    /// Create a program with specified function lengths (all slots empty)
    pub fn with_lengths(lengths: &FunctionLengths) -> Self {
        Self {
            functions: lengths
                .as_slice()
                .iter()
                .map(|&len| vec![Instruction::EMPTY; len])
                .collect(),
        }
    }

    pub fn function_count(&self) -> usize {
        self.functions.len()
    }

    /// Get a function by index; unknown indices yield an empty body
    pub fn function(&self, index: usize) -> &[Instruction] {
        self.functions.get(index).map_or(&[], Vec::as_slice)
    }

    pub(crate) fn function_mut(&mut self, index: usize) -> &mut [Instruction] {
        &mut self.functions[index]
    }

    pub fn functions(&self) -> impl Iterator<Item = &[Instruction]> {
        self.functions.iter().map(Vec::as_slice)
    }

    /// Get instruction at a specific position
    pub fn get(&self, func_index: usize, inst_index: usize) -> Option<&Instruction> {
        self.function(func_index).get(inst_index)
    }

    /// Count filled (non-`Noop`) slots
    pub fn instruction_count(&self) -> usize {
        self.functions()
            .flatten()
            .filter(|inst| !inst.is_noop())
            .count()
    }

    /// Whether any slot, guarded or not, moves forward.
    pub fn has_forward(&self) -> bool {
        self.functions()
            .flatten()
            .any(|inst| inst.instruction_type == InstructionType::Forward)
    }
}

impl fmt::Display for Program {
    /// Each function is printed up to its first empty slot:
    /// `F1: Forward Right(Red) F2 | F2: Left Forward`.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (index, body) in self.functions().enumerate() {
            if index > 0 {
                f.write_str(" | ")?;
            }
            write!(f, "F{}:", index + 1)?;
            for inst in body.iter().take_while(|inst| !inst.is_noop()) {
                write!(f, " {inst}")?;
            }
        }
        Ok(())
    }
}
