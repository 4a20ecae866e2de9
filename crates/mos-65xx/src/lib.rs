//! The MOS 6502 family, simulated transistor by transistor.
//!
//! Every variant shares the same die: a [`Netlist`] loaded at runtime feeds
//! an [`nmos_switch::Network`], and a [`Variant`] maps the package pins of
//! one family member onto it. [`Mos65xx`] is the resulting chip.
//!
//! # Variants
//!
//! | Variant   | Pins | Address bus | I/O port |
//! |-----------|------|-------------|----------|
//! | MOS6502   | 40   | 16 bits     | no       |
//! | MOS6503   | 28   | 12 bits     | no       |
//! | MOS6504   | 28   | 13 bits     | no       |
//! | MOS6505   | 28   | 12 bits     | no       |
//! | MOS6510   | 40   | 16 bits     | P0-P5    |
//! | MOS6510-1 | 40   | 16 bits     | P0-P7    |
//! | MOS6510-2 | 40   | 16 bits     | P0-P7    |

mod chip;
mod error;
mod io_port;
mod netlist;
mod nodes;
mod variant;

#[cfg(any(test, feature = "test-utils"))]
pub mod testing;

pub use chip::{ChipConfig, Mos65xx};
pub use error::{NetlistError, UnknownVariant};
pub use io_port::{DIRECTION_REGISTER, IoPort, OUTPUT_REGISTER};
pub use netlist::Netlist;
pub use nodes::{ChipNodes, Signal, UNUSED};
pub use variant::{Pin, Variant};
