#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Core contracts shared across the aging Life engine.
//!
//! This crate defines the message surface that connects drivers, the
//! authoritative world, and pure systems. Drivers submit [`Command`] values
//! describing desired mutations, the world executes those commands via its
//! `apply` entry point, and then broadcasts [`Event`] values. Observers that
//! only care about the three user-facing notifications implement
//! [`LifeObserver`] and receive them through [`notify`].

use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub mod buffer;

/// Edge length of a single square cell measured in canvas units.
pub const CELL_SIZE: u32 = 8;

/// Canvas width used when nothing else is configured.
pub const DEFAULT_CANVAS_WIDTH: u32 = 512;

/// Canvas height used when nothing else is configured.
pub const DEFAULT_CANVAS_HEIGHT: u32 = 384;

/// Delay between automatically driven generations when nothing else is configured.
pub const DEFAULT_DELAY: Duration = Duration::from_millis(300);

/// Commands that express all permissible world mutations.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Command {
    /// Advances the simulation by one generation if the run is still current.
    Step {
        /// Run identifier captured when the step was scheduled.
        run_id: RunId,
        /// Indicates that the step was requested manually rather than by a periodic driver.
        single_step: bool,
    },
    /// Zeroes the generation counter, clears the history buffers and restores default flags.
    Reset,
    /// Invalidates the current run and kills every cell of the current generation.
    ClearCurrent,
    /// Invalidates the current run and seeds roughly a third of the cells with life.
    RandomizeCurrent {
        /// Seed for the random source used to populate the grid.
        seed: u64,
    },
    /// Flips the cell under the provided canvas point between dead and newborn.
    ToggleCellAt {
        /// Horizontal canvas coordinate.
        x: i32,
        /// Vertical canvas coordinate.
        y: i32,
    },
    /// Selects the rule set without notifying observers.
    SetRuleSet {
        /// Rule set to apply from the next generation onwards.
        rules: RuleSet,
    },
    /// Enables or disables automatic halting without notifying observers.
    SetAutoStop {
        /// Whether periodic stepping halts on a steady state.
        enabled: bool,
    },
    /// Configures the pause a periodic driver waits between generations.
    ///
    /// The delay must be non-zero; drivers reject zero before submitting the command.
    ConfigureDelay {
        /// Pause between successive automatically driven generations.
        delay: Duration,
    },
    /// Stores the current generation and flags in the memory slot.
    Remember,
    /// Restores the generation and flags stored by the last [`Command::Remember`].
    Recall,
    /// Installs a decoded pattern as the current generation.
    LoadPattern {
        /// Pattern produced by the decoder for the world's geometry.
        pattern: SeedPattern,
    },
}

/// Events broadcast by the world after processing commands.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Event {
    /// Reports the generation counter after it changed.
    GenerationChanged {
        /// Number of generations computed since the last reset.
        generation: u64,
    },
    /// Reports that the rule set was changed programmatically.
    RuleSetChanged {
        /// Rule set that became active.
        rules: RuleSet,
    },
    /// Reports that the auto-stop flag was changed programmatically.
    AutoStopChanged {
        /// Whether auto-stop is now enabled.
        enabled: bool,
    },
    /// Signals the periodic driver that the simulation reached a steady state.
    AutoStopTriggered {
        /// Generation that matched the generation two steps earlier.
        generation: u64,
    },
    /// Confirms that a cell was edited directly.
    CellToggled {
        /// Cell that was flipped.
        cell: CellCoord,
        /// Whether the cell is alive after the edit.
        alive: bool,
    },
    /// Reports that a remember or recall request could not copy the buffers.
    MemoryRejected {
        /// Operation that failed.
        operation: MemoryOperation,
        /// Reason the copy failed.
        reason: BufferError,
    },
    /// Reports that a decoded pattern did not fit the world's buffers.
    PatternRejected {
        /// Reason the pattern could not be installed.
        reason: BufferError,
    },
}

/// Memory slot operations that may be rejected.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum MemoryOperation {
    /// Copying the current generation into memory.
    Remember,
    /// Copying memory back into the current generation.
    Recall,
}

/// Age of a single cell. Zero means dead; any other value counts survived generations.
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub struct CellAge(u8);

impl CellAge {
    /// Age of a dead cell.
    pub const DEAD: Self = Self(0);

    /// Age of a cell in its first living generation.
    pub const NEWBORN: Self = Self(1);

    /// Creates a cell age from its numeric value.
    #[must_use]
    pub const fn new(value: u8) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the age.
    #[must_use]
    pub const fn get(&self) -> u8 {
        self.0
    }

    /// Reports whether the cell is alive.
    #[must_use]
    pub const fn is_alive(&self) -> bool {
        self.0 > 0
    }

    /// Age after surviving (or being born into) one more generation, capped at `max_age`.
    #[must_use]
    pub fn aged(self, max_age: CellAge) -> Self {
        if self.0 < max_age.0 {
            Self(self.0 + 1)
        } else {
            self
        }
    }
}

/// Token identifying the current run; stale scheduled steps carry an outdated value.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct RunId(u64);

impl RunId {
    /// Creates a run identifier with the provided numeric value.
    #[must_use]
    pub const fn new(value: u64) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the identifier.
    #[must_use]
    pub const fn get(&self) -> u64 {
        self.0
    }

    /// Identifier that supersedes this one.
    #[must_use]
    pub const fn next(self) -> Self {
        Self(self.0.wrapping_add(1))
    }
}

/// Rules that decide which cells live in the next generation.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RuleSet {
    /// Conway's B3/S23: birth on three neighbours, survival on two or three.
    #[default]
    Standard,
    /// B34/S34: a cell lives iff it has exactly three or four live neighbours.
    ThreeFour,
}

impl RuleSet {
    /// Selects the rule set from the "3-4 life" flag.
    #[must_use]
    pub const fn from_three_four(three_four: bool) -> Self {
        if three_four {
            Self::ThreeFour
        } else {
            Self::Standard
        }
    }

    /// Reports whether this is the "3-4 life" rule set.
    #[must_use]
    pub const fn is_three_four(self) -> bool {
        matches!(self, Self::ThreeFour)
    }

    /// Decides whether a cell of the given age with `live_neighbors` lives on.
    #[must_use]
    pub const fn keeps_alive(self, age: CellAge, live_neighbors: u8) -> bool {
        match self {
            Self::Standard => (live_neighbors == 2 && age.is_alive()) || live_neighbors == 3,
            Self::ThreeFour => live_neighbors == 3 || live_neighbors == 4,
        }
    }
}

/// Location of a single grid cell expressed as column and row coordinates.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CellCoord {
    column: u32,
    row: u32,
}

impl CellCoord {
    /// Creates a new grid cell coordinate.
    #[must_use]
    pub const fn new(column: u32, row: u32) -> Self {
        Self { column, row }
    }

    /// Zero-based column index of the cell.
    #[must_use]
    pub const fn column(&self) -> u32 {
        self.column
    }

    /// Zero-based row index of the cell.
    #[must_use]
    pub const fn row(&self) -> u32 {
        self.row
    }
}

/// Row and column counts of the toroidal grid derived from the canvas size.
///
/// Cells are stored row-major, so the cell at `(row, column)` lives at
/// `row * columns + column`. Zero-sized grids are valid and simply hold no cells.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct GridGeometry {
    columns: u32,
    rows: u32,
}

impl GridGeometry {
    /// Creates a geometry with explicit cell counts.
    #[must_use]
    pub const fn new(columns: u32, rows: u32) -> Self {
        Self { columns, rows }
    }

    /// Derives the geometry covering a canvas, truncating partial cells.
    #[must_use]
    pub const fn from_canvas(width: u32, height: u32) -> Self {
        Self::new(width / CELL_SIZE, height / CELL_SIZE)
    }

    /// Number of columns in the grid.
    #[must_use]
    pub const fn columns(&self) -> u32 {
        self.columns
    }

    /// Number of rows in the grid.
    #[must_use]
    pub const fn rows(&self) -> u32 {
        self.rows
    }

    /// Total number of cells, which is also the length of every buffer.
    #[must_use]
    pub const fn cell_count(&self) -> usize {
        self.columns as usize * self.rows as usize
    }

    /// Linear index of the cell, or `None` when it lies outside the grid.
    #[must_use]
    pub fn index(&self, cell: CellCoord) -> Option<usize> {
        if cell.column() < self.columns && cell.row() < self.rows {
            let row = usize::try_from(cell.row()).ok()?;
            let column = usize::try_from(cell.column()).ok()?;
            let width = usize::try_from(self.columns).ok()?;
            Some(row * width + column)
        } else {
            None
        }
    }

    /// Cell underneath a canvas point, or `None` when the point misses the grid.
    #[must_use]
    pub fn cell_at_point(&self, x: i32, y: i32) -> Option<CellCoord> {
        let x = u32::try_from(x).ok()?;
        let y = u32::try_from(y).ok()?;
        let cell = CellCoord::new(x / CELL_SIZE, y / CELL_SIZE);
        self.index(cell).map(|_| cell)
    }
}

/// Colour assigned to one cell age.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CellColor {
    red: u8,
    green: u8,
    blue: u8,
}

impl CellColor {
    /// Creates a new colour from byte RGB components.
    #[must_use]
    pub const fn from_rgb(red: u8, green: u8, blue: u8) -> Self {
        Self { red, green, blue }
    }

    /// Red component of the color.
    #[must_use]
    pub const fn red(&self) -> u8 {
        self.red
    }

    /// Green component of the color.
    #[must_use]
    pub const fn green(&self) -> u8 {
        self.green
    }

    /// Blue component of the color.
    #[must_use]
    pub const fn blue(&self) -> u8 {
        self.blue
    }
}

const DEFAULT_PALETTE: [CellColor; 7] = [
    CellColor::from_rgb(0x00, 0x00, 0x00),
    CellColor::from_rgb(0xff, 0xff, 0x00),
    CellColor::from_rgb(0x00, 0xff, 0xff),
    CellColor::from_rgb(0x00, 0xff, 0x00),
    CellColor::from_rgb(0xff, 0x00, 0xff),
    CellColor::from_rgb(0xff, 0x00, 0x00),
    CellColor::from_rgb(0xff, 0xff, 0xff),
];

/// Ordered colours indexed by cell age. Its length fixes the maximum age.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AgePalette {
    colors: Vec<CellColor>,
}

impl AgePalette {
    /// Creates a palette; entry zero colours dead cells.
    pub fn new(colors: Vec<CellColor>) -> Result<Self, PaletteError> {
        if colors.len() < 2 {
            return Err(PaletteError::TooFewColors(colors.len()));
        }
        if colors.len() > usize::from(u8::MAX) + 1 {
            return Err(PaletteError::TooManyColors(colors.len()));
        }
        Ok(Self { colors })
    }

    /// Oldest age a cell can reach.
    #[must_use]
    pub fn max_age(&self) -> CellAge {
        CellAge::new(u8::try_from(self.colors.len() - 1).unwrap_or(u8::MAX))
    }

    /// Colour used for the provided age.
    #[must_use]
    pub fn color(&self, age: CellAge) -> Option<CellColor> {
        self.colors.get(usize::from(age.get())).copied()
    }

    /// Iterator over the colours in age order.
    pub fn iter(&self) -> impl Iterator<Item = &CellColor> {
        self.colors.iter()
    }
}

impl Default for AgePalette {
    fn default() -> Self {
        Self {
            colors: DEFAULT_PALETTE.to_vec(),
        }
    }
}

/// Reasons a palette cannot be constructed.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Error)]
pub enum PaletteError {
    /// A palette needs a dead colour and at least one living colour.
    #[error("palette needs at least 2 colours, got {0}")]
    TooFewColors(usize),
    /// Ages are stored in a byte.
    #[error("palette supports at most 256 colours, got {0}")]
    TooManyColors(usize),
}

/// Reasons a buffer-level operation may fail.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Error)]
pub enum BufferError {
    /// Source and destination buffers hold different numbers of cells.
    #[error("buffers differ in length: source has {source_len} cells, destination has {destination_len}")]
    LengthMismatch {
        /// Length of the buffer being read.
        source_len: usize,
        /// Length of the buffer being written.
        destination_len: usize,
    },
}

/// Pattern decoded against a grid geometry, ready to become the current generation.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SeedPattern {
    /// Cell ages covering the whole grid, with the pattern centred.
    pub cells: Vec<CellAge>,
    /// Rule set requested by the pattern, if any.
    pub rules: Option<RuleSet>,
    /// Auto-stop setting requested by the pattern, if any.
    pub auto_stop: Option<bool>,
}

/// Receiver for the notifications a presentation layer mirrors.
pub trait LifeObserver {
    /// Called after every change of the generation counter.
    fn on_generation_changed(&mut self, generation: u64);

    /// Called when the rule set was changed programmatically.
    fn on_rule_set_changed(&mut self, rules: RuleSet);

    /// Called when the auto-stop flag was changed programmatically.
    fn on_auto_stop_changed(&mut self, enabled: bool);
}

/// Forwards the observer-facing notifications contained in `events`, in order.
pub fn notify<O>(observer: &mut O, events: &[Event])
where
    O: LifeObserver + ?Sized,
{
    for event in events {
        match event {
            Event::GenerationChanged { generation } => observer.on_generation_changed(*generation),
            Event::RuleSetChanged { rules } => observer.on_rule_set_changed(*rules),
            Event::AutoStopChanged { enabled } => observer.on_auto_stop_changed(*enabled),
            _ => {}
        }
    }
}
