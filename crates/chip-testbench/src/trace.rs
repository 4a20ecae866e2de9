//! Per-cycle CPU trace.
//!
//! The text format is two lines per cycle:
//!
//! ```text
//! A:00 X:00 Y:00 P:16 PC:8000 S:FD IR:EA RW:1 AB:8000 DB:EA
//!  read $8000 - $EA
//! ```
//!
//! preceded by `Cycle N` once the CPU is out of reset. The JSON format is
//! one object per cycle with the same fields.

use std::fmt;
use std::io::{self, Write};

use mos_65xx::Mos65xx;
use serde::{Deserialize, Serialize};

/// Direction of a bus cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Access {
    Read,
    Write,
}

/// CPU state at the end of one cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TraceRecord {
    /// Cycle number after reset; `None` while reset is held.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cycle: Option<u64>,
    pub a: u8,
    pub x: u8,
    pub y: u8,
    pub p: u8,
    pub pc: u16,
    pub s: u8,
    pub ir: u8,
    pub rw: bool,
    #[serde(rename = "ab")]
    pub address: u16,
    #[serde(rename = "db")]
    pub data: u8,
    pub access: Access,
    /// Byte transferred: what memory supplied on a read, what the CPU
    /// drove on a write.
    pub value: u8,
}

impl TraceRecord {
    /// Snapshot `cpu`, with `value` the byte moved by this cycle.
    #[must_use]
    pub fn capture(cpu: &Mos65xx, cycle: Option<u64>, value: u8) -> Self {
        let rw = cpu.rw();
        Self {
            cycle,
            a: cpu.a(),
            x: cpu.x(),
            y: cpu.y(),
            p: cpu.p(),
            pc: cpu.pc(),
            s: cpu.s(),
            ir: cpu.ir(),
            rw,
            address: cpu.read_address_bus(),
            data: cpu.read_data_bus(),
            access: if rw { Access::Read } else { Access::Write },
            value,
        }
    }
}

impl fmt::Display for TraceRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(cycle) = self.cycle {
            writeln!(f, "Cycle {cycle}")?;
        }
        writeln!(
            f,
            "A:{:02X} X:{:02X} Y:{:02X} P:{:02X} PC:{:04X} S:{:02X} IR:{:02X} RW:{} AB:{:04X} DB:{:02X}",
            self.a,
            self.x,
            self.y,
            self.p,
            self.pc,
            self.s,
            self.ir,
            u8::from(self.rw),
            self.address,
            self.data
        )?;
        let direction = match self.access {
            Access::Read => "read",
            Access::Write => "write",
        };
        write!(f, " {direction} ${:04X} - ${:02X}", self.address, self.value)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum TraceFormat {
    #[default]
    Text,
    Json,
}

/// Writes trace records to a stream in one format.
pub struct Tracer {
    out: Box<dyn Write>,
    format: TraceFormat,
}

impl Tracer {
    pub fn new(out: Box<dyn Write>, format: TraceFormat) -> Self {
        Self { out, format }
    }

    pub fn record(&mut self, record: &TraceRecord) -> io::Result<()> {
        match self.format {
            TraceFormat::Text => writeln!(self.out, "{record}"),
            TraceFormat::Json => {
                serde_json::to_writer(&mut self.out, record)?;
                writeln!(self.out)
            }
        }
    }

    /// A free-form progress line. Text traces only.
    pub fn note(&mut self, message: &str) -> io::Result<()> {
        match self.format {
            TraceFormat::Text => writeln!(self.out, "{message}"),
            TraceFormat::Json => Ok(()),
        }
    }

    pub fn flush(&mut self) -> io::Result<()> {
        self.out.flush()
    }
}
