#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Steady-state detection used to halt periodically driven runs.
//!
//! A freshly computed generation is compared with the generation from two
//! steps earlier. This catches still lifes (period 1) and flip-flops such as
//! the blinker (period 2). Oscillators with longer periods are not detected
//! and keep running until the driver is stopped.

use agelife_core::{buffer, CellAge};

/// Decides whether a periodically driven run should halt after the latest step.
///
/// Manual single steps never halt, and neither do runs with auto-stop disabled.
#[must_use]
pub fn should_auto_stop(
    current: &[CellAge],
    second_previous: &[CellAge],
    auto_stop_enabled: bool,
    single_step: bool,
) -> bool {
    !single_step && auto_stop_enabled && buffer::equal(current, second_previous)
}
