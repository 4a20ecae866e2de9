//! Trait for components that advance by clock cycles.

use crate::Ticks;

/// A component that can be advanced by one clock cycle.
///
/// For a switch-level chip one tick is two half-cycles: the clock input is
/// driven low and the network settled, then driven high and settled again.
pub trait Tickable {
    /// Advance the component by one clock cycle.
    fn tick(&mut self);

    /// Advance the component by multiple cycles.
    ///
    /// Default implementation calls `tick()` in a loop. Components may
    /// override for efficiency, but must produce identical results.
    fn tick_n(&mut self, count: Ticks) {
        for _ in 0..count.get() {
            self.tick();
        }
    }
}
