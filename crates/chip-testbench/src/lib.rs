//! Drives a transistor-level 65xx chip against a memory map, one clock
//! cycle at a time, optionally tracing every bus access.

pub mod config;
pub mod console;
pub mod machine;
pub mod memory;
pub mod trace;

pub use config::{ConfigError, MachineConfig, RamSpec, RomSpec};
pub use console::Console;
pub use machine::{Machine, MachineError, RunLimit, RunResult, StopReason};
pub use memory::{AddressRange, Memory, Ram, Rom};
pub use trace::{Access, TraceFormat, TraceRecord, Tracer};
