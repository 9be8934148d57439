//! Periodic driver that feeds automatic steps into the world.
//!
//! The world holds no timer. The driver captures the run identifier and delay
//! when it schedules a step and fires it later; if the run was cleared,
//! randomized or reloaded in between, the world drops the step.

use std::time::Duration;

use agelife_core::{Command, Event, RunId};
use agelife_world::{self as world, query, World};

/// Whether the driver is currently producing steps.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum DriverState {
    /// No steps are scheduled.
    Idle,
    /// Steps are scheduled one after another.
    Running,
}

/// Step captured at scheduling time.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) struct ScheduledStep {
    run_id: RunId,
    delay: Duration,
}

impl ScheduledStep {
    /// Pause to wait before firing the step.
    pub(crate) const fn delay(&self) -> Duration {
        self.delay
    }
}

/// Start/stop state machine around automatic stepping.
#[derive(Debug)]
pub(crate) struct Driver {
    state: DriverState,
}

impl Driver {
    /// Creates an idle driver.
    pub(crate) const fn new() -> Self {
        Self {
            state: DriverState::Idle,
        }
    }

    pub(crate) fn start(&mut self) {
        self.state = DriverState::Running;
    }

    pub(crate) fn stop(&mut self) {
        self.state = DriverState::Idle;
    }

    pub(crate) const fn state(&self) -> DriverState {
        self.state
    }

    pub(crate) fn is_running(&self) -> bool {
        self.state == DriverState::Running
    }

    /// Captures the next automatic step, or `None` while idle.
    pub(crate) fn schedule(&self, world: &World) -> Option<ScheduledStep> {
        self.is_running().then(|| ScheduledStep {
            run_id: query::run_id(world),
            delay: query::delay(world),
        })
    }

    /// Fires a previously scheduled step and stops on a steady state.
    pub(crate) fn fire(
        &mut self,
        world: &mut World,
        scheduled: ScheduledStep,
        out_events: &mut Vec<Event>,
    ) {
        if !self.is_running() {
            return;
        }

        let first_new = out_events.len();
        world::apply(
            world,
            Command::Step {
                run_id: scheduled.run_id,
                single_step: false,
            },
            out_events,
        );

        let halted = out_events[first_new..]
            .iter()
            .any(|event| matches!(event, Event::AutoStopTriggered { .. }));
        if halted {
            self.stop();
        }
    }

    /// Advances one generation on demand; never halts the driver.
    pub(crate) fn single_step(&self, world: &mut World, out_events: &mut Vec<Event>) {
        let run_id = query::run_id(world);
        world::apply(
            world,
            Command::Step {
                run_id,
                single_step: true,
            },
            out_events,
        );
    }
}
