//! A chip wired to a bus and stepped one clock cycle at a time.

use std::io;

use chip_core::{Bus, Tickable};
use mos_65xx::{Mos65xx, Signal};
use nmos_switch::NetworkError;
use thiserror::Error;

use crate::console::{self, Console};
use crate::memory::Memory;
use crate::trace::{TraceRecord, Tracer};

#[derive(Debug, Error)]
pub enum MachineError {
    #[error(transparent)]
    Unsettled(#[from] NetworkError),

    #[error("failed to write trace")]
    Trace(#[from] io::Error),

    #[error("console I/O failed")]
    Console(#[source] io::Error),
}

pub type Result<T> = std::result::Result<T, MachineError>;

/// When [`Machine::run`] stops. With neither set it runs until an error.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunLimit {
    pub max_cycles: Option<u64>,
    /// Stop at the end of the first cycle whose PC equals this.
    pub until_pc: Option<u16>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopReason {
    CycleLimit,
    PcReached(u16),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunResult {
    /// Cycles executed since reset.
    pub cycles: u64,
    pub stop: StopReason,
}

/// A 65xx and its memory.
///
/// Each cycle drives the clock low then high, propagating after each edge,
/// and then serves the bus: on a read the addressed byte is put on the
/// data bus, on a write the data bus is stored.
pub struct Machine<B: Bus = Memory> {
    cpu: Mos65xx,
    bus: B,
    tracer: Option<Tracer>,
    console: Option<Console>,
    reset_cycles: u32,
    cycles: u64,
}

impl<B: Bus> Machine<B> {
    pub fn new(cpu: Mos65xx, bus: B) -> Self {
        Self {
            cpu,
            bus,
            tracer: None,
            console: None,
            reset_cycles: 8,
            cycles: 0,
        }
    }

    #[must_use]
    pub fn with_tracer(mut self, tracer: Tracer) -> Self {
        self.tracer = Some(tracer);
        self
    }

    /// Map a console mailbox over the bus.
    #[must_use]
    pub fn with_console(mut self, console: Console) -> Self {
        self.console = Some(console);
        self
    }

    #[must_use]
    pub fn console(&self) -> Option<&Console> {
        self.console.as_ref()
    }

    /// Cycles [`reset`](Self::reset) holds RES low.
    #[must_use]
    pub fn with_reset_cycles(mut self, cycles: u32) -> Self {
        self.reset_cycles = cycles;
        self
    }

    #[must_use]
    pub fn cpu(&self) -> &Mos65xx {
        &self.cpu
    }

    pub fn cpu_mut(&mut self) -> &mut Mos65xx {
        &mut self.cpu
    }

    #[must_use]
    pub fn bus(&self) -> &B {
        &self.bus
    }

    pub fn bus_mut(&mut self) -> &mut B {
        &mut self.bus
    }

    /// Cycles executed since the last reset.
    #[must_use]
    pub fn cycles(&self) -> u64 {
        self.cycles
    }

    /// Drive a die input through its pin, or directly on the die when this
    /// package does not bond it out.
    fn drive(&mut self, signal: Signal, high: bool) {
        match self.cpu.pin_of(signal) {
            Some(pin) => self.cpu.pin_write(pin, high),
            None => self.cpu.signal_write(signal, high),
        }
    }

    /// Power-on reset: hold RES low with every other input inactive, clock
    /// for the reset period, then release RES.
    pub fn reset(&mut self) -> Result<()> {
        let name = self.cpu.name();
        self.note(&format!("Initializing {name}"))?;

        // Each input settles before the next is applied.
        self.drive(Signal::Res, false);
        self.cpu.try_recalc()?;
        self.drive(Signal::Clk0, true);
        self.cpu.try_recalc()?;
        self.drive(Signal::Rdy, true);
        self.cpu.try_recalc()?;
        self.drive(Signal::So, false);
        self.cpu.try_recalc()?;
        self.drive(Signal::Irq, true);
        self.cpu.try_recalc()?;
        self.drive(Signal::Nmi, true);
        self.cpu.try_stabilize()?;

        self.note(&format!("Initializing {name} - holding RES"))?;
        for _ in 0..self.reset_cycles {
            self.try_cycle()?;
            if self.tracer.is_some() {
                let value = if self.cpu.rw() {
                    self.bus.read(u32::from(self.cpu.read_address_bus()))
                } else {
                    self.cpu.read_data_bus()
                };
                let record = TraceRecord::capture(&self.cpu, None, value);
                self.trace(&record)?;
            }
        }

        self.drive(Signal::Res, true);
        self.cpu.try_recalc()?;
        self.cycles = 0;
        self.note(&format!("Initializing {name} - done"))?;
        log::info!("{name} out of reset after {} cycles", self.reset_cycles);
        Ok(())
    }

    /// Both clock phases, without serving the bus.
    pub fn try_cycle(&mut self) -> std::result::Result<(), NetworkError> {
        self.drive(Signal::Clk0, false);
        self.cpu.try_recalc()?;
        self.drive(Signal::Clk0, true);
        self.cpu.try_recalc()
    }

    /// Serve the bus cycle in progress. Returns the byte moved.
    ///
    /// Nothing is transferred while AEC holds the bus off. A console
    /// mailbox shadows the bus at its registers. On a 6510 the I/O port then
    /// gets its chance to answer `$0000` and `$0001`.
    pub fn handle_memory(&mut self) -> u8 {
        if !self.cpu.bus_enabled() {
            return self.cpu.read_data_bus();
        }
        let address = u32::from(self.cpu.read_address_bus());
        let console = self.console.as_mut().filter(|c| c.contains(address));
        let value = if self.cpu.rw() {
            let value = match console {
                Some(console) => console.read(address),
                None => self.bus.read(address),
            };
            self.cpu.write_data_bus(value);
            value
        } else {
            let value = self.cpu.read_data_bus();
            match console {
                Some(console) => console.write(address, value),
                None => self.bus.write(address, value),
            }
            value
        };
        self.cpu.service_io_port().unwrap_or(value)
    }

    /// One full cycle: clock, serve the bus, trace.
    pub fn step(&mut self) -> Result<TraceRecord> {
        self.try_cycle()?;
        let value = self.handle_memory();
        self.cycles += 1;
        let record = TraceRecord::capture(&self.cpu, Some(self.cycles), value);
        self.trace(&record)?;
        if let Some(mailbox) = &mut self.console {
            mailbox.service().map_err(MachineError::Console)?;
            if console::is_kernel_call(record.pc) {
                self.note(&format!("kernel call: ${:04X}", record.pc))?;
            }
        }
        Ok(record)
    }

    pub fn run(&mut self, limit: RunLimit) -> Result<RunResult> {
        loop {
            if limit.max_cycles.is_some_and(|max| self.cycles >= max) {
                return self.finish(StopReason::CycleLimit);
            }
            let record = self.step()?;
            if limit.until_pc == Some(record.pc) {
                return self.finish(StopReason::PcReached(record.pc));
            }
        }
    }

    fn finish(&mut self, stop: StopReason) -> Result<RunResult> {
        if let Some(tracer) = &mut self.tracer {
            tracer.flush()?;
        }
        log::info!("stopped after {} cycles: {stop:?}", self.cycles);
        Ok(RunResult {
            cycles: self.cycles,
            stop,
        })
    }

    fn trace(&mut self, record: &TraceRecord) -> io::Result<()> {
        match &mut self.tracer {
            Some(tracer) => tracer.record(record),
            None => Ok(()),
        }
    }

    fn note(&mut self, message: &str) -> io::Result<()> {
        match &mut self.tracer {
            Some(tracer) => tracer.note(message),
            None => Ok(()),
        }
    }
}

impl<B: Bus> Tickable for Machine<B> {
    /// One cycle without tracing.
    ///
    /// # Panics
    ///
    /// If the network does not settle.
    fn tick(&mut self) {
        if let Err(err) = self.try_cycle() {
            panic!("{err}");
        }
        self.handle_memory();
        self.cycles += 1;
        if let Some(Err(err)) = self.console.as_mut().map(Console::service) {
            log::error!("console: {err}");
        }
    }
}
