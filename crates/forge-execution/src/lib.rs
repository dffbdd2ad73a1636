//! Cosmetic progress reporting for outstanding backend calls.
//!
//! Nothing here observes the real request: the reporter replays a scripted
//! list of status lines into a shared [`ConsoleLog`] on a fixed cadence until
//! the owner cancels it.

mod console;
mod progress;

pub use console::ConsoleLog;
pub use progress::{
    ProgressHandle, ProgressReporter, ProgressSlot, SUCCESS_STEPS, simulation_steps,
};
