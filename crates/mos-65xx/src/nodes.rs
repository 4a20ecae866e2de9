//! Named nodes the chip facade reads and drives.

use nmos_switch::NodeId;

use crate::Netlist;
use crate::error::Result;

/// Placeholder for a register bit with no node on the die (P bit 5). Out
/// of range for every network, so it always reads low.
pub const UNUSED: NodeId = NodeId::MAX;

/// An electrical function of the die that a package pin can expose.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Signal {
    Vss,
    Vcc,
    /// Reset, active low.
    Res,
    Rdy,
    /// Interrupt request, active low.
    Irq,
    /// Non-maskable interrupt, active low.
    Nmi,
    /// Set overflow.
    So,
    Sync,
    /// High while the CPU reads.
    Rw,
    /// Clock input.
    Clk0,
    Clk1Out,
    Clk2Out,
    /// Address line, by bit number.
    Ab(u8),
    /// Data line, by bit number.
    Db(u8),
}

/// Node ids of every signal and register bit, resolved by name.
///
/// Multi-bit groups are stored most significant bit first, ready for
/// [`Network::read_bus`](nmos_switch::Network::read_bus).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChipNodes {
    pub vss: NodeId,
    pub vcc: NodeId,
    pub res: NodeId,
    pub rdy: NodeId,
    pub irq: NodeId,
    pub nmi: NodeId,
    pub so: NodeId,
    pub sync: NodeId,
    pub rw: NodeId,
    pub clk0: NodeId,
    pub clk1out: NodeId,
    pub clk2out: NodeId,
    pub address_bus: [NodeId; 16],
    pub data_bus: [NodeId; 8],
    pub a: [NodeId; 8],
    pub x: [NodeId; 8],
    pub y: [NodeId; 8],
    pub s: [NodeId; 8],
    /// Status register; bit 5 is [`UNUSED`].
    pub p: [NodeId; 8],
    pub pcl: [NodeId; 8],
    pub pch: [NodeId; 8],
    /// Inverted instruction register.
    pub notir: [NodeId; 8],
}

impl ChipNodes {
    /// Look up every required name in `netlist`, failing on the first
    /// missing one.
    pub fn resolve(netlist: &Netlist) -> Result<Self> {
        let mut p = [UNUSED; 8];
        for (i, slot) in p.iter_mut().enumerate() {
            let bit = 7 - i;
            if bit != 5 {
                *slot = netlist.require(&format!("p{bit}"))?;
            }
        }

        Ok(Self {
            vss: netlist.require("vss")?,
            vcc: netlist.require("vcc")?,
            res: netlist.require("res")?,
            rdy: netlist.require("rdy")?,
            irq: netlist.require("irq")?,
            nmi: netlist.require("nmi")?,
            so: netlist.require("so")?,
            sync: netlist.require("sync")?,
            rw: netlist.require("rw")?,
            clk0: netlist.require("clk0")?,
            clk1out: netlist.require("clk1out")?,
            clk2out: netlist.require("clk2out")?,
            address_bus: msb_first(netlist, "ab")?,
            data_bus: msb_first(netlist, "db")?,
            a: msb_first(netlist, "a")?,
            x: msb_first(netlist, "x")?,
            y: msb_first(netlist, "y")?,
            s: msb_first(netlist, "s")?,
            p,
            pcl: msb_first(netlist, "pcl")?,
            pch: msb_first(netlist, "pch")?,
            notir: msb_first(netlist, "notir")?,
        })
    }

    /// Node carrying `signal`; [`UNUSED`] for a bus bit past the die's
    /// bus width.
    #[must_use]
    pub fn node(&self, signal: Signal) -> NodeId {
        match signal {
            Signal::Vss => self.vss,
            Signal::Vcc => self.vcc,
            Signal::Res => self.res,
            Signal::Rdy => self.rdy,
            Signal::Irq => self.irq,
            Signal::Nmi => self.nmi,
            Signal::So => self.so,
            Signal::Sync => self.sync,
            Signal::Rw => self.rw,
            Signal::Clk0 => self.clk0,
            Signal::Clk1Out => self.clk1out,
            Signal::Clk2Out => self.clk2out,
            Signal::Ab(bit) => bus_bit(&self.address_bus, bit),
            Signal::Db(bit) => bus_bit(&self.data_bus, bit),
        }
    }
}

/// `{prefix}{N-1}` down to `{prefix}0`.
fn msb_first<const N: usize>(netlist: &Netlist, prefix: &str) -> Result<[NodeId; N]> {
    let mut ids = [UNUSED; N];
    for (i, slot) in ids.iter_mut().enumerate() {
        *slot = netlist.require(&format!("{prefix}{}", N - 1 - i))?;
    }
    Ok(ids)
}

fn bus_bit(ids: &[NodeId], bit: u8) -> NodeId {
    (ids.len().checked_sub(1 + usize::from(bit)))
        .and_then(|i| ids.get(i))
        .copied()
        .unwrap_or(UNUSED)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::NetlistError;
    use crate::testing::synthetic_netlist;

    #[test]
    fn buses_are_stored_most_significant_first() {
        let netlist = synthetic_netlist();
        let nodes = ChipNodes::resolve(&netlist).unwrap();
        assert_eq!(nodes.address_bus[0], netlist.node("ab15").unwrap());
        assert_eq!(nodes.address_bus[15], netlist.node("ab0").unwrap());
        assert_eq!(nodes.node(Signal::Ab(3)), netlist.node("ab3").unwrap());
        assert_eq!(nodes.node(Signal::Db(7)), nodes.data_bus[0]);
        assert_eq!(nodes.node(Signal::Db(8)), UNUSED);
    }

    #[test]
    fn status_bit_five_is_unused() {
        let nodes = ChipNodes::resolve(&synthetic_netlist()).unwrap();
        assert_eq!(nodes.p[2], UNUSED);
        assert!(nodes.p.iter().filter(|&&id| id == UNUSED).count() == 1);
    }

    #[test]
    fn first_missing_name_is_reported() {
        let netlist = synthetic_netlist();
        let names = netlist
            .names()
            .filter(|(name, _)| *name != "sync" && *name != "x3")
            .map(|(name, id)| (name.to_string(), id));
        let stripped = Netlist::new(netlist.description().clone(), names);
        let err = ChipNodes::resolve(&stripped).unwrap_err();
        assert!(matches!(err, NetlistError::MissingNode(name) if name == "sync"));
    }
}
