use std::time::Duration;

use agelife_core::{
    BufferError, CellAge, CellCoord, Command, Event, GridGeometry, RuleSet, SeedPattern, CELL_SIZE,
};
use agelife_system_pattern::{decode, Dimension, PatternDescription};
use agelife_world::{self as world, query, World, WorldConfig};

fn world_with(columns: u32, rows: u32, max_age: u8) -> World {
    World::new(WorldConfig::new(
        GridGeometry::new(columns, rows),
        CellAge::new(max_age),
    ))
}

fn pattern(world: &World, width: i64, rows: &[&str]) -> SeedPattern {
    let description = PatternDescription {
        width: Some(Dimension::Number(width)),
        height: Some(Dimension::Number(rows.len() as i64)),
        rows: Some(rows.iter().map(|row| (*row).to_owned()).collect()),
        ..PatternDescription::default()
    };
    decode(&description, query::geometry(world)).expect("test pattern decodes")
}

fn load(world: &mut World, pattern: SeedPattern) -> Vec<Event> {
    let mut events = Vec::new();
    world::apply(world, Command::LoadPattern { pattern }, &mut events);
    events
}

fn drive(world: &mut World, single_step: bool) -> Vec<Event> {
    let mut events = Vec::new();
    let run_id = query::run_id(world);
    world::apply(
        world,
        Command::Step {
            run_id,
            single_step,
        },
        &mut events,
    );
    events
}

fn halted(events: &[Event]) -> bool {
    events
        .iter()
        .any(|event| matches!(event, Event::AutoStopTriggered { .. }))
}

fn toggle_cell(world: &mut World, column: u32, row: u32) -> Vec<Event> {
    let mut events = Vec::new();
    world::apply(
        world,
        Command::ToggleCellAt {
            x: (column * CELL_SIZE) as i32,
            y: (row * CELL_SIZE) as i32,
        },
        &mut events,
    );
    events
}

#[test]
fn step_advances_generation_and_notifies() {
    let mut world = world_with(8, 8, 6);
    let blinker = pattern(&world, 3, &["E"]);
    let _ = load(&mut world, blinker);

    let events = drive(&mut world, true);

    assert_eq!(events, vec![Event::GenerationChanged { generation: 1 }]);
    assert_eq!(query::generation(&world), 1);
    assert_eq!(query::live_cell_count(&world), 3);
    assert_eq!(
        query::cell_age(&world, CellCoord::new(3, 3)),
        Some(CellAge::new(2)),
        "the blinker's centre survives and ages",
    );
    assert_eq!(
        query::cell_age(&world, CellCoord::new(3, 2)),
        Some(CellAge::NEWBORN)
    );
}

#[test]
fn stale_steps_are_dropped() {
    let mut world = world_with(10, 10, 6);
    let mut events = Vec::new();
    world::apply(&mut world, Command::RandomizeCurrent { seed: 5 }, &mut events);
    let live_run = query::run_id(&world);
    assert_eq!(live_run.get(), 1);
    let before = query::current_cells(&world).to_vec();

    world::apply(
        &mut world,
        Command::Step {
            run_id: agelife_core::RunId::new(live_run.get() - 1),
            single_step: false,
        },
        &mut events,
    );

    assert!(events.is_empty(), "stale steps must not notify");
    assert_eq!(query::generation(&world), 0);
    assert_eq!(query::current_cells(&world), before.as_slice());

    world::apply(
        &mut world,
        Command::Step {
            run_id: live_run,
            single_step: false,
        },
        &mut events,
    );
    assert_eq!(query::generation(&world), 1);
}

#[test]
fn reset_clears_history_and_restores_defaults() {
    let mut world = world_with(8, 8, 6);
    let blinker = pattern(&world, 3, &["E"]);
    let _ = load(&mut world, blinker);
    let mut events = Vec::new();
    world::apply(
        &mut world,
        Command::SetRuleSet {
            rules: RuleSet::ThreeFour,
        },
        &mut events,
    );
    world::apply(&mut world, Command::SetAutoStop { enabled: false }, &mut events);
    assert!(events.is_empty(), "direct setters do not notify");
    let _ = drive(&mut world, true);
    let _ = drive(&mut world, true);
    let current = query::current_cells(&world).to_vec();

    world::apply(&mut world, Command::Reset, &mut events);

    assert_eq!(
        events,
        vec![
            Event::GenerationChanged { generation: 0 },
            Event::RuleSetChanged {
                rules: RuleSet::Standard,
            },
            Event::AutoStopChanged { enabled: true },
        ]
    );
    assert_eq!(query::generation(&world), 0);
    assert_eq!(query::rules(&world), RuleSet::Standard);
    assert!(query::auto_stop(&world));
    assert!(query::previous_cells(&world).iter().all(|age| !age.is_alive()));
    assert!(query::second_previous_cells(&world)
        .iter()
        .all(|age| !age.is_alive()));
    assert_eq!(query::current_cells(&world), current.as_slice());
}

#[test]
fn clear_current_invalidates_run_and_kills_cells() {
    let mut world = world_with(8, 8, 6);
    let mut events = Vec::new();
    world::apply(&mut world, Command::RandomizeCurrent { seed: 1 }, &mut events);
    let randomized_run = query::run_id(&world);

    world::apply(&mut world, Command::ClearCurrent, &mut events);

    assert!(events.is_empty());
    assert_eq!(query::run_id(&world), randomized_run.next());
    assert_eq!(query::live_cell_count(&world), 0);
}

#[test]
fn toggling_flips_single_cells() {
    let mut world = world_with(8, 8, 6);
    let run_id = query::run_id(&world);

    let events = toggle_cell(&mut world, 2, 5);
    assert_eq!(
        events,
        vec![Event::CellToggled {
            cell: CellCoord::new(2, 5),
            alive: true,
        }]
    );
    assert_eq!(
        query::cell_age(&world, CellCoord::new(2, 5)),
        Some(CellAge::NEWBORN)
    );

    let _ = toggle_cell(&mut world, 2, 5);
    assert_eq!(
        query::cell_age(&world, CellCoord::new(2, 5)),
        Some(CellAge::DEAD)
    );

    let _ = toggle_cell(&mut world, 3, 5);
    let _ = toggle_cell(&mut world, 4, 5);
    let _ = toggle_cell(&mut world, 5, 5);
    let _ = drive(&mut world, true);
    assert_eq!(
        query::cell_age(&world, CellCoord::new(4, 5)),
        Some(CellAge::new(2))
    );
    let _ = toggle_cell(&mut world, 4, 5);
    let _ = toggle_cell(&mut world, 4, 5);
    assert_eq!(
        query::cell_age(&world, CellCoord::new(4, 5)),
        Some(CellAge::NEWBORN),
        "toggling an aged cell twice leaves a newborn",
    );
    assert_eq!(query::run_id(&world), run_id, "edits keep the run alive");
}

#[test]
fn toggling_outside_the_grid_is_ignored() {
    let mut world = world_with(8, 8, 6);
    let mut events = Vec::new();
    for (x, y) in [(-1, 0), (0, -3), (64, 0), (0, 64), (500, 500)] {
        world::apply(&mut world, Command::ToggleCellAt { x, y }, &mut events);
    }
    assert!(events.is_empty());
    assert_eq!(query::live_cell_count(&world), 0);
}

#[test]
fn blinker_halts_after_two_steps_when_ages_saturate_immediately() {
    let mut world = world_with(8, 8, 1);
    let blinker = pattern(&world, 3, &["E"]);
    let _ = load(&mut world, blinker);

    assert!(!halted(&drive(&mut world, false)));
    let events = drive(&mut world, false);

    assert!(halted(&events));
    assert_eq!(
        events.last(),
        Some(&Event::AutoStopTriggered { generation: 2 })
    );
}

#[test]
fn blinker_halts_once_its_centre_reaches_max_age() {
    let mut world = world_with(8, 8, 6);
    let blinker = pattern(&world, 3, &["E"]);
    let _ = load(&mut world, blinker);

    let mut halted_at = None;
    for _ in 0..20 {
        if halted(&drive(&mut world, false)) {
            halted_at = Some(query::generation(&world));
            break;
        }
    }

    assert_eq!(halted_at, Some(7));
}

#[test]
fn single_steps_and_disabled_auto_stop_never_halt() {
    let mut world = world_with(8, 8, 1);
    let blinker = pattern(&world, 3, &["E"]);
    let _ = load(&mut world, blinker.clone());
    for _ in 0..6 {
        assert!(!halted(&drive(&mut world, true)));
    }

    let _ = load(&mut world, blinker);
    let mut events = Vec::new();
    world::apply(&mut world, Command::SetAutoStop { enabled: false }, &mut events);
    for _ in 0..6 {
        assert!(!halted(&drive(&mut world, false)));
    }
}

#[test]
fn glider_never_halts_before_wrapping() {
    let mut world = world_with(24, 24, 6);
    let glider = pattern(&world, 3, &["4", "2", "E"]);
    let _ = load(&mut world, glider);

    for _ in 0..24 {
        assert!(!halted(&drive(&mut world, false)));
    }
    assert_eq!(query::live_cell_count(&world), 5);
}

#[test]
fn recall_restores_remembered_generation_and_flags() {
    let mut world = world_with(8, 8, 6);
    let mut events = Vec::new();
    world::apply(&mut world, Command::RandomizeCurrent { seed: 21 }, &mut events);
    world::apply(
        &mut world,
        Command::SetRuleSet {
            rules: RuleSet::ThreeFour,
        },
        &mut events,
    );
    world::apply(&mut world, Command::SetAutoStop { enabled: false }, &mut events);
    world::apply(&mut world, Command::Remember, &mut events);
    assert!(events.is_empty());
    let remembered = query::current_cells(&world).to_vec();

    let _ = drive(&mut world, true);
    world::apply(&mut world, Command::ClearCurrent, &mut events);
    world::apply(&mut world, Command::Reset, &mut events);
    events.clear();

    world::apply(&mut world, Command::Recall, &mut events);

    assert_eq!(query::current_cells(&world), remembered.as_slice());
    assert_eq!(query::memory_cells(&world), remembered.as_slice());
    assert_eq!(query::rules(&world), RuleSet::ThreeFour);
    assert!(!query::auto_stop(&world));
    assert_eq!(query::generation(&world), 0);
    assert_eq!(
        events,
        vec![
            Event::GenerationChanged { generation: 0 },
            Event::RuleSetChanged {
                rules: RuleSet::Standard,
            },
            Event::AutoStopChanged { enabled: true },
            Event::AutoStopChanged { enabled: false },
            Event::RuleSetChanged {
                rules: RuleSet::ThreeFour,
            },
        ]
    );
}

#[test]
fn recall_without_remember_restores_an_empty_grid() {
    let mut world = world_with(8, 8, 6);
    let mut events = Vec::new();
    world::apply(&mut world, Command::RandomizeCurrent { seed: 2 }, &mut events);
    world::apply(&mut world, Command::Recall, &mut events);

    assert_eq!(query::live_cell_count(&world), 0);
    assert_eq!(query::rules(&world), RuleSet::Standard);
    assert!(query::auto_stop(&world));
}

#[test]
fn loading_a_pattern_applies_overrides_and_invalidates_the_run() {
    let mut world = world_with(8, 8, 6);
    let run_id = query::run_id(&world);
    let mut seed = pattern(&world, 4, &["F"]);
    seed.rules = Some(RuleSet::ThreeFour);
    seed.auto_stop = Some(false);

    let events = load(&mut world, seed);

    assert_eq!(
        events,
        vec![
            Event::GenerationChanged { generation: 0 },
            Event::RuleSetChanged {
                rules: RuleSet::Standard,
            },
            Event::AutoStopChanged { enabled: true },
            Event::RuleSetChanged {
                rules: RuleSet::ThreeFour,
            },
            Event::AutoStopChanged { enabled: false },
        ]
    );
    assert_eq!(query::run_id(&world), run_id.next());
    assert_eq!(query::live_cell_count(&world), 4);
    assert_eq!(query::rules(&world), RuleSet::ThreeFour);
    assert!(!query::auto_stop(&world));
}

#[test]
fn mismatched_pattern_is_rejected_without_mutation() {
    let mut world = world_with(8, 8, 6);
    let _ = toggle_cell(&mut world, 1, 1);
    let run_id = query::run_id(&world);

    let events = load(
        &mut world,
        SeedPattern {
            cells: vec![CellAge::NEWBORN; 10],
            rules: Some(RuleSet::ThreeFour),
            auto_stop: None,
        },
    );

    assert_eq!(
        events,
        vec![Event::PatternRejected {
            reason: BufferError::LengthMismatch {
                source_len: 10,
                destination_len: 64,
            },
        }]
    );
    assert_eq!(query::run_id(&world), run_id);
    assert_eq!(query::live_cell_count(&world), 1);
    assert_eq!(query::rules(&world), RuleSet::Standard);
}

#[test]
fn configured_delay_is_exposed_to_drivers() {
    let mut world = world_with(4, 4, 6);
    let mut events = Vec::new();
    world::apply(
        &mut world,
        Command::ConfigureDelay {
            delay: Duration::from_millis(75),
        },
        &mut events,
    );
    assert!(events.is_empty());
    assert_eq!(query::delay(&world), Duration::from_millis(75));
}

#[test]
fn empty_grid_steps_without_panicking() {
    let mut world = world_with(0, 0, 6);
    let events = drive(&mut world, false);
    assert_eq!(
        events,
        vec![
            Event::GenerationChanged { generation: 1 },
            Event::AutoStopTriggered { generation: 1 },
        ],
        "two empty generations are trivially equal",
    );
}
