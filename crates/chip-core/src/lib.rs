//! Core traits and types shared by the switch-level chip simulators.
//!
//! Chips are simulated one clock half-cycle at a time. Everything that
//! counts time counts half-cycles or full cycles of the chip's input clock,
//! never wall time.

mod bus;
mod observable;
mod tickable;
mod ticks;

pub use bus::Bus;
pub use observable::{Observable, Value};
pub use tickable::Tickable;
pub use ticks::Ticks;
