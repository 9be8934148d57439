#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Command-line adapter that runs the aging Life engine headlessly.

mod driver;
mod library;
mod observer;
mod settings;

use std::{path::PathBuf, thread, time::Duration};

use agelife_core::{notify, AgePalette, Command, Event, GridGeometry, RuleSet};
use agelife_system_pattern::{decode, encode, PatternDescription};
use agelife_world::{self as world, query, World, WorldConfig};
use anyhow::{bail, Context, Result};
use clap::{Parser, ValueEnum};

use crate::{
    driver::Driver, library::PatternLibrary, observer::LogObserver, settings::Settings,
};

/// Command-line arguments accepted by the simulator.
#[derive(Debug, Parser)]
#[command(name = "agelife", about = "Runs Conway's Life on a torus with cell ages.")]
struct Args {
    /// TOML settings file with canvas size, delay and palette.
    #[arg(long, value_name = "PATH")]
    settings: Option<PathBuf>,

    /// Canvas width in pixels, overriding the settings file.
    #[arg(long)]
    canvas_width: Option<u32>,

    /// Canvas height in pixels, overriding the settings file.
    #[arg(long)]
    canvas_height: Option<u32>,

    /// Pattern file to load instead of a random start.
    #[arg(long, value_name = "PATH", conflicts_with = "name")]
    pattern: Option<PathBuf>,

    /// Pattern library index.
    #[arg(long, value_name = "PATH", default_value = "patterns/index.toml")]
    library: PathBuf,

    /// Name of a library pattern to load.
    #[arg(long)]
    name: Option<String>,

    /// Lists the library patterns and exits.
    #[arg(long)]
    list: bool,

    /// Rule set to run with, overriding the pattern.
    #[arg(long, value_enum)]
    rules: Option<RulesArg>,

    /// Keeps running through steady states.
    #[arg(long)]
    no_auto_stop: bool,

    /// Pause between generations in milliseconds.
    #[arg(long, value_parser = clap::value_parser!(u64).range(1..))]
    delay_ms: Option<u64>,

    /// Maximum number of generations to compute.
    #[arg(long, default_value_t = 1000)]
    generations: u64,

    /// Seed for the random start.
    #[arg(long)]
    seed: Option<u64>,

    /// Toggles the cell under a canvas pixel before running, as `X,Y`.
    #[arg(long, value_name = "X,Y", value_parser = parse_point)]
    toggle: Vec<(i32, i32)>,

    /// Advances with single steps, which never auto-stop.
    #[arg(long)]
    manual: bool,

    /// Runs without waiting for the delay between generations.
    #[arg(long)]
    unpaced: bool,

    /// Writes the final generation as a pattern file.
    #[arg(long, value_name = "PATH")]
    save: Option<PathBuf>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum RulesArg {
    Standard,
    #[value(name = "3-4")]
    ThreeFour,
}

impl From<RulesArg> for RuleSet {
    fn from(value: RulesArg) -> Self {
        Self::from_three_four(value == RulesArg::ThreeFour)
    }
}

fn parse_point(value: &str) -> Result<(i32, i32), String> {
    let (x, y) = value
        .split_once(',')
        .ok_or_else(|| format!("expected X,Y but got `{value}`"))?;
    let parse = |part: &str| {
        part.trim()
            .parse::<i32>()
            .map_err(|error| format!("invalid coordinate `{part}`: {error}"))
    };
    Ok((parse(x)?, parse(y)?))
}

/// Entry point for the aging Life command-line interface.
fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let args = Args::parse();

    if args.list {
        let library = PatternLibrary::from_index_path(&args.library)?;
        for name in library.names() {
            println!("{name}");
        }
        return Ok(());
    }

    let settings = match &args.settings {
        Some(path) => Settings::load(path)?,
        None => Settings::default(),
    };
    let palette = settings.palette()?;
    let (canvas_width, canvas_height) = settings.canvas();
    let geometry = GridGeometry::from_canvas(
        args.canvas_width.unwrap_or(canvas_width),
        args.canvas_height.unwrap_or(canvas_height),
    );
    let delay = match args.delay_ms {
        Some(millis) => Duration::from_millis(millis),
        None => settings.delay()?,
    };
    log::info!(
        "grid {}x{} cells, max age {}, delay {} ms",
        geometry.columns(),
        geometry.rows(),
        palette.max_age().get(),
        delay.as_millis()
    );

    let mut world = World::new(WorldConfig::with_palette(geometry, &palette));
    let mut observer = LogObserver::default();
    let mut events = Vec::new();
    world::apply(&mut world, Command::ConfigureDelay { delay }, &mut events);

    match pattern_source(&args)? {
        Some(description) => {
            let pattern = decode(&description, geometry).context("failed to decode pattern")?;
            world::apply(&mut world, Command::LoadPattern { pattern }, &mut events);
        }
        None => {
            let seed = args.seed.unwrap_or_else(rand::random);
            log::info!("random start with seed {seed}");
            world::apply(&mut world, Command::Reset, &mut events);
            world::apply(&mut world, Command::RandomizeCurrent { seed }, &mut events);
        }
    }
    if let Some(reason) = events.iter().find_map(|event| match event {
        Event::PatternRejected { reason } => Some(reason),
        _ => None,
    }) {
        bail!("pattern rejected: {reason}");
    }

    if let Some(rules) = args.rules {
        world::apply(&mut world, Command::SetRuleSet { rules: rules.into() }, &mut events);
    }
    if args.no_auto_stop {
        world::apply(&mut world, Command::SetAutoStop { enabled: false }, &mut events);
    }
    for &(x, y) in &args.toggle {
        world::apply(&mut world, Command::ToggleCellAt { x, y }, &mut events);
    }
    notify(&mut observer, &events);
    events.clear();

    let halted = run(&mut world, &mut observer, &args);
    log::info!(
        "{} at generation {} with {} live cells",
        if halted { "steady state" } else { "finished" },
        observer.generation(),
        query::live_cell_count(&world)
    );
    print_summary(&world, &palette);

    if let Some(path) = &args.save {
        let description = encode(
            query::current_cells(&world),
            geometry,
            query::rules(&world),
            query::auto_stop(&world),
        );
        library::save_pattern_file(path, &description)?;
        log::info!("saved final generation to {}", path.display());
    }
    Ok(())
}

fn pattern_source(args: &Args) -> Result<Option<PatternDescription>> {
    if let Some(path) = &args.pattern {
        return library::load_pattern_file(path).map(Some);
    }
    if let Some(name) = &args.name {
        let library = PatternLibrary::from_index_path(&args.library)?;
        return library.load(name).map(Some);
    }
    Ok(None)
}

/// Runs until the generation limit or a steady state; reports whether it halted.
fn run(world: &mut World, observer: &mut LogObserver, args: &Args) -> bool {
    let mut driver = Driver::new();
    let mut events = Vec::new();

    if args.manual {
        for _ in 0..args.generations {
            driver.single_step(world, &mut events);
            notify(observer, &events);
            events.clear();
        }
        return false;
    }

    let mut halted = false;
    driver.start();
    while let Some(scheduled) = driver.schedule(world) {
        if query::generation(world) >= args.generations {
            driver.stop();
            break;
        }
        if !args.unpaced {
            thread::sleep(scheduled.delay());
        }
        driver.fire(world, scheduled, &mut events);
        halted |= events
            .iter()
            .any(|event| matches!(event, Event::AutoStopTriggered { .. }));
        notify(observer, &events);
        events.clear();
    }
    log::debug!("driver {:?}", driver.state());
    halted
}

fn print_summary(world: &World, palette: &AgePalette) {
    let mut counts = vec![0usize; usize::from(query::max_age(world).get()) + 1];
    for age in query::current_cells(world) {
        if let Some(count) = counts.get_mut(usize::from(age.get())) {
            *count += 1;
        }
    }

    println!("generation {}", query::generation(world));
    for (age, (color, count)) in palette.iter().zip(&counts).enumerate() {
        println!(
            "age {age:>3}  #{:02x}{:02x}{:02x}  {count}",
            color.red(),
            color.green(),
            color.blue()
        );
    }
}
