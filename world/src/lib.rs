#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Authoritative run state for the aging Life engine.
//!
//! The world owns every buffer, counter and flag. Drivers mutate it only by
//! submitting [`Command`] values to [`apply`], which runs synchronously and
//! reports what happened as [`Event`] values.

mod buffers;

use std::time::Duration;

use agelife_core::{
    buffer, AgePalette, CellAge, Command, Event, GridGeometry, MemoryOperation, RuleSet, RunId,
    SeedPattern, DEFAULT_CANVAS_HEIGHT, DEFAULT_CANVAS_WIDTH, DEFAULT_DELAY,
};
use agelife_system_cycle_detector::should_auto_stop;
use agelife_system_generation::advance;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

use crate::buffers::BufferStore;

/// Fixed parameters a world is built with.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct WorldConfig {
    geometry: GridGeometry,
    max_age: CellAge,
}

impl WorldConfig {
    /// Creates a configuration for the given grid and age ceiling.
    #[must_use]
    pub const fn new(geometry: GridGeometry, max_age: CellAge) -> Self {
        Self { geometry, max_age }
    }

    /// Creates a configuration whose age ceiling comes from a palette.
    #[must_use]
    pub fn with_palette(geometry: GridGeometry, palette: &AgePalette) -> Self {
        Self::new(geometry, palette.max_age())
    }
}

impl Default for WorldConfig {
    fn default() -> Self {
        Self::with_palette(
            GridGeometry::from_canvas(DEFAULT_CANVAS_WIDTH, DEFAULT_CANVAS_HEIGHT),
            &AgePalette::default(),
        )
    }
}

/// Flags captured alongside the memory buffer by [`Command::Remember`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RememberedSettings {
    /// Rule set active when the generation was remembered.
    pub rules: RuleSet,
    /// Auto-stop flag active when the generation was remembered.
    pub auto_stop: bool,
}

impl Default for RememberedSettings {
    fn default() -> Self {
        Self {
            rules: RuleSet::Standard,
            auto_stop: true,
        }
    }
}

/// Represents the authoritative simulation state.
#[derive(Debug)]
pub struct World {
    geometry: GridGeometry,
    max_age: CellAge,
    buffers: BufferStore,
    run_id: RunId,
    generation: u64,
    rules: RuleSet,
    auto_stop: bool,
    delay: Duration,
    remembered: RememberedSettings,
}

impl World {
    /// Creates an idle world with every cell dead.
    #[must_use]
    pub fn new(config: WorldConfig) -> Self {
        Self {
            geometry: config.geometry,
            max_age: config.max_age,
            buffers: BufferStore::new(config.geometry.cell_count()),
            run_id: RunId::default(),
            generation: 0,
            rules: RuleSet::Standard,
            auto_stop: true,
            delay: DEFAULT_DELAY,
            remembered: RememberedSettings::default(),
        }
    }

    fn step(&mut self, run_id: RunId, single_step: bool, out_events: &mut Vec<Event>) {
        if run_id != self.run_id {
            log::debug!(
                "dropping stale step for run {} (current run {})",
                run_id.get(),
                self.run_id.get()
            );
            return;
        }

        self.buffers.rotate();
        let (previous, current) = self.buffers.advance_slots();
        advance(previous, current, self.geometry, self.rules, self.max_age);

        self.generation = self.generation.saturating_add(1);
        out_events.push(Event::GenerationChanged {
            generation: self.generation,
        });

        if should_auto_stop(
            self.buffers.current(),
            self.buffers.second_previous(),
            self.auto_stop,
            single_step,
        ) {
            log::info!("steady state reached at generation {}", self.generation);
            out_events.push(Event::AutoStopTriggered {
                generation: self.generation,
            });
        }
    }

    fn reset(&mut self, out_events: &mut Vec<Event>) {
        self.generation = 0;
        out_events.push(Event::GenerationChanged { generation: 0 });
        self.buffers.clear_history();
        self.announce_rules(RuleSet::Standard, out_events);
        self.announce_auto_stop(true, out_events);
    }

    fn announce_rules(&mut self, rules: RuleSet, out_events: &mut Vec<Event>) {
        self.rules = rules;
        out_events.push(Event::RuleSetChanged { rules });
    }

    fn announce_auto_stop(&mut self, enabled: bool, out_events: &mut Vec<Event>) {
        self.auto_stop = enabled;
        out_events.push(Event::AutoStopChanged { enabled });
    }

    fn invalidate_run(&mut self) {
        self.run_id = self.run_id.next();
    }

    fn randomize(&mut self, seed: u64) {
        self.invalidate_run();
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        for cell in self.buffers.current_mut() {
            *cell = if rng.gen_range(0..3) == 0 {
                CellAge::NEWBORN
            } else {
                CellAge::DEAD
            };
        }
    }

    fn toggle_cell_at(&mut self, x: i32, y: i32, out_events: &mut Vec<Event>) {
        let Some(cell) = self.geometry.cell_at_point(x, y) else {
            return;
        };
        let Some(index) = self.geometry.index(cell) else {
            return;
        };
        let current = self.buffers.current_mut();
        current[index] = if current[index].is_alive() {
            CellAge::DEAD
        } else {
            CellAge::NEWBORN
        };
        out_events.push(Event::CellToggled {
            cell,
            alive: current[index].is_alive(),
        });
    }

    fn remember(&mut self, out_events: &mut Vec<Event>) {
        if let Err(reason) = self.buffers.remember() {
            log::warn!("remember rejected: {reason}");
            out_events.push(Event::MemoryRejected {
                operation: MemoryOperation::Remember,
                reason,
            });
            return;
        }
        self.remembered = RememberedSettings {
            rules: self.rules,
            auto_stop: self.auto_stop,
        };
    }

    fn recall(&mut self, out_events: &mut Vec<Event>) {
        if let Err(reason) = self.buffers.recall() {
            log::warn!("recall rejected: {reason}");
            out_events.push(Event::MemoryRejected {
                operation: MemoryOperation::Recall,
                reason,
            });
            return;
        }
        self.reset(out_events);
        let remembered = self.remembered;
        self.announce_auto_stop(remembered.auto_stop, out_events);
        self.announce_rules(remembered.rules, out_events);
    }

    fn load_pattern(&mut self, pattern: SeedPattern, out_events: &mut Vec<Event>) {
        // The copy leaves the current buffer untouched when it fails.
        if let Err(reason) = self.buffers.install(&pattern.cells) {
            log::warn!("pattern rejected: {reason}");
            out_events.push(Event::PatternRejected { reason });
            return;
        }
        self.reset(out_events);
        if let Some(rules) = pattern.rules {
            self.announce_rules(rules, out_events);
        }
        if let Some(enabled) = pattern.auto_stop {
            self.announce_auto_stop(enabled, out_events);
        }
        self.invalidate_run();
    }
}

impl Default for World {
    fn default() -> Self {
        Self::new(WorldConfig::default())
    }
}

/// Applies the provided command to the world, mutating state deterministically.
pub fn apply(world: &mut World, command: Command, out_events: &mut Vec<Event>) {
    match command {
        Command::Step {
            run_id,
            single_step,
        } => world.step(run_id, single_step, out_events),
        Command::Reset => world.reset(out_events),
        Command::ClearCurrent => {
            world.invalidate_run();
            buffer::clear(world.buffers.current_mut());
        }
        Command::RandomizeCurrent { seed } => world.randomize(seed),
        Command::ToggleCellAt { x, y } => world.toggle_cell_at(x, y, out_events),
        Command::SetRuleSet { rules } => world.rules = rules,
        Command::SetAutoStop { enabled } => world.auto_stop = enabled,
        Command::ConfigureDelay { delay } => {
            debug_assert!(!delay.is_zero(), "drivers must reject a zero delay");
            world.delay = delay;
        }
        Command::Remember => world.remember(out_events),
        Command::Recall => world.recall(out_events),
        Command::LoadPattern { pattern } => world.load_pattern(pattern, out_events),
    }
}

/// Query functions that provide read-only access to the world state.
pub mod query {
    use std::time::Duration;

    use super::{RememberedSettings, World};
    use agelife_core::{buffer, CellAge, CellCoord, GridGeometry, RuleSet, RunId};

    /// Grid dimensions fixed at construction.
    #[must_use]
    pub fn geometry(world: &World) -> GridGeometry {
        world.geometry
    }

    /// Oldest age any cell can reach.
    #[must_use]
    pub fn max_age(world: &World) -> CellAge {
        world.max_age
    }

    /// Identifier a driver must capture when scheduling a step.
    #[must_use]
    pub fn run_id(world: &World) -> RunId {
        world.run_id
    }

    /// Generations computed since the last reset.
    #[must_use]
    pub fn generation(world: &World) -> u64 {
        world.generation
    }

    /// Rule set used for the next generation.
    #[must_use]
    pub fn rules(world: &World) -> RuleSet {
        world.rules
    }

    /// Whether periodic stepping halts on a steady state.
    #[must_use]
    pub fn auto_stop(world: &World) -> bool {
        world.auto_stop
    }

    /// Pause a periodic driver waits between generations.
    #[must_use]
    pub fn delay(world: &World) -> Duration {
        world.delay
    }

    /// Flags stored by the last successful remember.
    #[must_use]
    pub fn remembered_settings(world: &World) -> RememberedSettings {
        world.remembered
    }

    /// Ages of the current generation in row-major order.
    #[must_use]
    pub fn current_cells(world: &World) -> &[CellAge] {
        world.buffers.current()
    }

    /// Ages of the generation before the current one.
    #[must_use]
    pub fn previous_cells(world: &World) -> &[CellAge] {
        world.buffers.previous()
    }

    /// Ages of the generation two steps before the current one.
    #[must_use]
    pub fn second_previous_cells(world: &World) -> &[CellAge] {
        world.buffers.second_previous()
    }

    /// Ages stored in the memory slot.
    #[must_use]
    pub fn memory_cells(world: &World) -> &[CellAge] {
        world.buffers.memory()
    }

    /// Age of a single cell of the current generation.
    #[must_use]
    pub fn cell_age(world: &World, cell: CellCoord) -> Option<CellAge> {
        world
            .geometry
            .index(cell)
            .and_then(|index| world.buffers.current().get(index).copied())
    }

    /// Number of living cells in the current generation.
    #[must_use]
    pub fn live_cell_count(world: &World) -> usize {
        buffer::live_count(world.buffers.current())
    }
}
