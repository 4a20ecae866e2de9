//! A 6502-family chip: the shared die plus one variant's package.

use chip_core::{Observable, Value};
use nmos_switch::{Network, NetworkConfig, NetworkError, NodeId};

use crate::error::Result;
use crate::{ChipNodes, IoPort, Netlist, Pin, Signal, Variant};

/// Chip construction options.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChipConfig {
    pub network: NetworkConfig,
    /// Initial level of the AEC pin on variants that have one.
    pub aec_default: bool,
}

impl Default for ChipConfig {
    fn default() -> Self {
        Self {
            network: NetworkConfig::default(),
            aec_default: true,
        }
    }
}

/// A MOS 65xx processor simulated at switch level.
///
/// Pins use 1-based datasheet numbering. Pin writes only change drives;
/// call [`recalc`](Self::recalc) to propagate them.
#[derive(Debug, Clone)]
pub struct Mos65xx {
    variant: Variant,
    network: Network,
    nodes: ChipNodes,
    port: Option<IoPort>,
}

impl Mos65xx {
    pub fn new(variant: Variant, netlist: &Netlist) -> Result<Self> {
        Self::with_config(variant, netlist, ChipConfig::default())
    }

    pub fn with_config(variant: Variant, netlist: &Netlist, config: ChipConfig) -> Result<Self> {
        let nodes = ChipNodes::resolve(netlist)?;
        let network = Network::with_config(netlist.description(), config.network)?;
        log::debug!(
            "{variant}: {} nodes, {} transistors",
            network.node_count(),
            network.transistor_count()
        );
        Ok(Self {
            variant,
            network,
            nodes,
            port: variant
                .has_io_port()
                .then(|| IoPort::new(config.aec_default)),
        })
    }

    #[must_use]
    pub fn variant(&self) -> Variant {
        self.variant
    }

    #[must_use]
    pub fn name(&self) -> &'static str {
        self.variant.name()
    }

    #[must_use]
    pub fn pin_count(&self) -> u32 {
        self.variant.pin_count()
    }

    #[must_use]
    pub fn address_bus_width(&self) -> u32 {
        self.variant.address_bus_width()
    }

    /// See [`Variant::pin_of`].
    #[must_use]
    pub fn pin_of(&self, signal: Signal) -> Option<u32> {
        self.variant.pin_of(signal)
    }

    /// Drive a pin. Unknown and unconnected pins are ignored.
    pub fn pin_write(&mut self, pin: u32, high: bool) {
        match self.variant.pin(pin) {
            Some(Pin::Signal(signal)) => self.network.set(self.nodes.node(signal), high),
            Some(Pin::Port(bit)) => {
                if let Some(port) = &mut self.port {
                    port.drive_pin(bit, high);
                }
            }
            Some(Pin::Aec) => {
                if let Some(port) = &mut self.port {
                    port.set_aec(high);
                }
            }
            Some(Pin::NotConnected) | None => {}
        }
    }

    /// Level of a pin; false for unknown and unconnected pins.
    #[must_use]
    pub fn pin_read(&self, pin: u32) -> bool {
        match self.variant.pin(pin) {
            Some(Pin::Signal(signal)) => self.signal(signal),
            Some(Pin::Port(bit)) => self.port.is_some_and(|port| port.pin(bit)),
            Some(Pin::Aec) => self.port.is_some_and(|port| port.aec()),
            Some(Pin::NotConnected) | None => false,
        }
    }

    /// Level of a die signal, whether or not this package bonds it out.
    #[must_use]
    pub fn signal(&self, signal: Signal) -> bool {
        self.network.get(self.nodes.node(signal))
    }

    /// Drive a die signal directly, bypassing the pinout.
    pub fn signal_write(&mut self, signal: Signal, high: bool) {
        self.network.set(self.nodes.node(signal), high);
    }

    /// The bonded-out address lines.
    #[must_use]
    pub fn read_address_bus(&self) -> u16 {
        let width = self.address_bus_width() as usize;
        let lines = &self.nodes.address_bus[16 - width..];
        self.network.read_bus(lines) as u16
    }

    #[must_use]
    pub fn read_data_bus(&self) -> u8 {
        self.register(&self.nodes.data_bus)
    }

    pub fn write_data_bus(&mut self, value: u8) {
        self.network.write_bus(&self.nodes.data_bus, value.into());
    }

    fn register(&self, ids: &[NodeId; 8]) -> u8 {
        self.network.read_bus(ids) as u8
    }

    #[must_use]
    pub fn a(&self) -> u8 {
        self.register(&self.nodes.a)
    }

    #[must_use]
    pub fn x(&self) -> u8 {
        self.register(&self.nodes.x)
    }

    #[must_use]
    pub fn y(&self) -> u8 {
        self.register(&self.nodes.y)
    }

    #[must_use]
    pub fn s(&self) -> u8 {
        self.register(&self.nodes.s)
    }

    /// Status register, bit 5 reading 0.
    #[must_use]
    pub fn p(&self) -> u8 {
        self.register(&self.nodes.p)
    }

    #[must_use]
    pub fn pch(&self) -> u8 {
        self.register(&self.nodes.pch)
    }

    #[must_use]
    pub fn pcl(&self) -> u8 {
        self.register(&self.nodes.pcl)
    }

    #[must_use]
    pub fn pc(&self) -> u16 {
        u16::from_be_bytes([self.pch(), self.pcl()])
    }

    /// Opcode in the instruction register. The die holds it inverted.
    #[must_use]
    pub fn ir(&self) -> u8 {
        !self.register(&self.nodes.notir)
    }

    /// True while the CPU is reading.
    #[must_use]
    pub fn rw(&self) -> bool {
        self.signal(Signal::Rw)
    }

    /// False while AEC holds the address bus, R/W and data bus in high
    /// impedance. Always true on variants without the pin.
    #[must_use]
    pub fn bus_enabled(&self) -> bool {
        self.port.is_none_or(|port| port.aec())
    }

    #[must_use]
    pub fn io_port(&self) -> Option<&IoPort> {
        self.port.as_ref()
    }

    /// Let the I/O port see the current bus cycle. A read of `$0000` or
    /// `$0001` gets the port's byte forced onto the data bus, overriding
    /// memory, and returned. No-op on variants without the port.
    pub fn service_io_port(&mut self) -> Option<u8> {
        let address = self.read_address_bus();
        let read = self.rw();
        let data = self.read_data_bus();
        let value = self.port.as_mut()?.access(address, read, data)?;
        self.write_data_bus(value);
        Some(value)
    }

    /// See [`Network::stabilize`].
    pub fn stabilize(&mut self) {
        self.network.stabilize();
    }

    /// See [`Network::recalc`].
    pub fn recalc(&mut self) {
        self.network.recalc();
    }

    pub fn try_stabilize(&mut self) -> std::result::Result<(), NetworkError> {
        self.network.try_stabilize()
    }

    pub fn try_recalc(&mut self) -> std::result::Result<(), NetworkError> {
        self.network.try_recalc()
    }

    #[must_use]
    pub fn network(&self) -> &Network {
        &self.network
    }

    pub fn network_mut(&mut self) -> &mut Network {
        &mut self.network
    }

    #[must_use]
    pub fn nodes(&self) -> &ChipNodes {
        &self.nodes
    }
}

const QUERY_PATHS: &[&str] = &[
    "variant",
    "a",
    "x",
    "y",
    "s",
    "p",
    "pc",
    "pcl",
    "pch",
    "ir",
    "address_bus",
    "data_bus",
    "rw",
    "sync",
    "clk0",
    "pins",
];

impl Observable for Mos65xx {
    fn query(&self, path: &str) -> Option<Value> {
        if let Some(id) = path.strip_prefix("node.") {
            let id: NodeId = id.parse().ok()?;
            return (id < self.network.node_count()).then(|| self.network.get(id).into());
        }
        if let Some(pin) = path.strip_prefix("pin.") {
            let pin: u32 = pin.parse().ok()?;
            return self.variant.pin(pin).map(|_| self.pin_read(pin).into());
        }

        match path {
            "variant" => Some(self.name().into()),
            "a" => Some(self.a().into()),
            "x" => Some(self.x().into()),
            "y" => Some(self.y().into()),
            "s" => Some(self.s().into()),
            "p" => Some(self.p().into()),
            "pc" => Some(self.pc().into()),
            "pcl" => Some(self.pcl().into()),
            "pch" => Some(self.pch().into()),
            "ir" => Some(self.ir().into()),
            "address_bus" => Some(self.read_address_bus().into()),
            "data_bus" => Some(self.read_data_bus().into()),
            "rw" => Some(self.rw().into()),
            "sync" => Some(self.signal(Signal::Sync).into()),
            "clk0" => Some(self.signal(Signal::Clk0).into()),
            "pins" => Some(Value::Array(
                (1..=self.pin_count())
                    .map(|pin| self.pin_read(pin).into())
                    .collect(),
            )),
            _ => None,
        }
    }

    fn query_paths(&self) -> &'static [&'static str] {
        QUERY_PATHS
    }
}
