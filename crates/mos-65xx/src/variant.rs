//! Family members and their package pinouts.

use std::fmt;
use std::str::FromStr;

use crate::Signal;
use crate::Signal::{
    Ab, Clk0, Clk1Out, Clk2Out, Db, Irq, Nmi, Rdy, Res, Rw, So, Sync, Vcc, Vss,
};
use crate::error::UnknownVariant;

/// What a package pin is wired to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Pin {
    /// A node of the die.
    Signal(Signal),
    /// Bit of the on-chip I/O port.
    Port(u8),
    /// Address enable control.
    Aec,
    NotConnected,
}

const fn s(signal: Signal) -> Pin {
    Pin::Signal(signal)
}

const NC: Pin = Pin::NotConnected;
const AEC: Pin = Pin::Aec;

const fn port(bit: u8) -> Pin {
    Pin::Port(bit)
}

#[rustfmt::skip]
const PINOUT_6502: [Pin; 40] = [
    s(Vss), s(Rdy), s(Clk1Out), s(Irq), NC, s(Nmi), s(Sync), s(Vcc),
    s(Ab(0)), s(Ab(1)), s(Ab(2)), s(Ab(3)), s(Ab(4)), s(Ab(5)), s(Ab(6)), s(Ab(7)),
    s(Ab(8)), s(Ab(9)), s(Ab(10)), s(Ab(11)), s(Vss), s(Ab(12)), s(Ab(13)), s(Ab(14)),
    s(Ab(15)), s(Db(7)), s(Db(6)), s(Db(5)), s(Db(4)), s(Db(3)), s(Db(2)), s(Db(1)),
    s(Db(0)), s(Rw), NC, NC, s(Clk0), s(So), s(Clk2Out), s(Res),
];

#[rustfmt::skip]
const PINOUT_6503: [Pin; 28] = [
    s(Res), s(Vss), s(Irq), s(Nmi), s(Vcc),
    s(Ab(0)), s(Ab(1)), s(Ab(2)), s(Ab(3)), s(Ab(4)), s(Ab(5)),
    s(Ab(6)), s(Ab(7)), s(Ab(8)), s(Ab(9)), s(Ab(10)), s(Ab(11)),
    s(Db(7)), s(Db(6)), s(Db(5)), s(Db(4)), s(Db(3)), s(Db(2)), s(Db(1)), s(Db(0)),
    s(Rw), s(Clk0), s(Clk2Out),
];

#[rustfmt::skip]
const PINOUT_6504: [Pin; 28] = [
    s(Res), s(Vss), s(Irq), s(Vcc),
    s(Ab(0)), s(Ab(1)), s(Ab(2)), s(Ab(3)), s(Ab(4)), s(Ab(5)), s(Ab(6)),
    s(Ab(7)), s(Ab(8)), s(Ab(9)), s(Ab(10)), s(Ab(11)), s(Ab(12)),
    s(Db(7)), s(Db(6)), s(Db(5)), s(Db(4)), s(Db(3)), s(Db(2)), s(Db(1)), s(Db(0)),
    s(Rw), s(Clk0), s(Clk2Out),
];

#[rustfmt::skip]
const PINOUT_6505: [Pin; 28] = [
    s(Res), s(Vss), s(Rdy), s(Irq), s(Vcc),
    s(Ab(0)), s(Ab(1)), s(Ab(2)), s(Ab(3)), s(Ab(4)), s(Ab(5)),
    s(Ab(6)), s(Ab(7)), s(Ab(8)), s(Ab(9)), s(Ab(10)), s(Ab(11)),
    s(Db(7)), s(Db(6)), s(Db(5)), s(Db(4)), s(Db(3)), s(Db(2)), s(Db(1)), s(Db(0)),
    s(Rw), s(Clk0), s(Clk2Out),
];

// The 6510 parts take their phase clock on the clock input of the shared
// die, so CLK1IN and CLK2IN both land on `Clk0`.

#[rustfmt::skip]
const PINOUT_6510: [Pin; 40] = [
    s(Clk0), s(Rdy), s(Irq), s(Nmi), AEC, s(Vcc),
    s(Ab(0)), s(Ab(1)), s(Ab(2)), s(Ab(3)), s(Ab(4)), s(Ab(5)), s(Ab(6)),
    s(Ab(7)), s(Ab(8)), s(Ab(9)), s(Ab(10)), s(Ab(11)), s(Ab(12)), s(Ab(13)),
    s(Vss), s(Ab(14)), s(Ab(15)),
    port(5), port(4), port(3), port(2), port(1), port(0),
    s(Db(7)), s(Db(6)), s(Db(5)), s(Db(4)), s(Db(3)), s(Db(2)), s(Db(1)), s(Db(0)),
    s(Rw), s(Clk2Out), s(Res),
];

#[rustfmt::skip]
const PINOUT_6510_1: [Pin; 40] = [
    s(Res), s(Clk0), s(Irq), AEC, s(Vcc),
    s(Ab(0)), s(Ab(1)), s(Ab(2)), s(Ab(3)), s(Ab(4)), s(Ab(5)), s(Ab(6)),
    s(Ab(7)), s(Ab(8)), s(Ab(9)), s(Ab(10)), s(Ab(11)), s(Ab(12)), s(Ab(13)),
    s(Vss), s(Ab(14)), s(Ab(15)),
    port(7), port(6), port(5), port(4), port(3), port(2), port(1), port(0),
    s(Db(7)), s(Db(6)), s(Db(5)), s(Db(4)), s(Db(3)), s(Db(2)), s(Db(1)), s(Db(0)),
    s(Rw), s(Clk0),
];

#[rustfmt::skip]
const PINOUT_6510_2: [Pin; 40] = [
    s(Res), s(Clk0), s(Irq), AEC, s(Vcc),
    s(Ab(0)), s(Ab(1)), s(Ab(2)), s(Ab(3)), s(Ab(4)), s(Ab(5)), s(Ab(6)),
    s(Ab(7)), s(Ab(8)), s(Ab(9)), s(Ab(10)), s(Ab(11)), s(Ab(12)), s(Ab(13)),
    s(Vss), s(Ab(14)), s(Ab(15)),
    port(7), port(6), port(5), port(4), port(3), port(2), port(1), port(0),
    s(Db(7)), s(Db(6)), s(Db(5)), s(Db(4)), s(Db(3)), s(Db(2)), s(Db(1)), s(Db(0)),
    s(Rw), s(Clk2Out),
];

/// A member of the 6502 family.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Variant {
    Mos6502,
    Mos6503,
    Mos6504,
    Mos6505,
    Mos6510,
    Mos6510_1,
    Mos6510_2,
}

impl Variant {
    /// Every supported variant, in registry order.
    pub const ALL: [Variant; 7] = [
        Variant::Mos6502,
        Variant::Mos6503,
        Variant::Mos6504,
        Variant::Mos6505,
        Variant::Mos6510,
        Variant::Mos6510_1,
        Variant::Mos6510_2,
    ];

    /// Part number as printed, e.g. `MOS6510-1`.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Variant::Mos6502 => "MOS6502",
            Variant::Mos6503 => "MOS6503",
            Variant::Mos6504 => "MOS6504",
            Variant::Mos6505 => "MOS6505",
            Variant::Mos6510 => "MOS6510",
            Variant::Mos6510_1 => "MOS6510-1",
            Variant::Mos6510_2 => "MOS6510-2",
        }
    }

    /// Identifier-safe name, e.g. `MOS6510_1`.
    #[must_use]
    pub const fn registry_name(self) -> &'static str {
        match self {
            Variant::Mos6510_1 => "MOS6510_1",
            Variant::Mos6510_2 => "MOS6510_2",
            other => other.name(),
        }
    }

    /// Case-insensitive lookup by either [`name`](Self::name) or
    /// [`registry_name`](Self::registry_name).
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|v| {
            v.name().eq_ignore_ascii_case(name) || v.registry_name().eq_ignore_ascii_case(name)
        })
    }

    /// Pin functions, index 0 being pin 1.
    #[must_use]
    pub const fn pinout(self) -> &'static [Pin] {
        match self {
            Variant::Mos6502 => &PINOUT_6502,
            Variant::Mos6503 => &PINOUT_6503,
            Variant::Mos6504 => &PINOUT_6504,
            Variant::Mos6505 => &PINOUT_6505,
            Variant::Mos6510 => &PINOUT_6510,
            Variant::Mos6510_1 => &PINOUT_6510_1,
            Variant::Mos6510_2 => &PINOUT_6510_2,
        }
    }

    #[must_use]
    pub const fn pin_count(self) -> u32 {
        self.pinout().len() as u32
    }

    /// Number of address lines bonded out.
    #[must_use]
    pub const fn address_bus_width(self) -> u32 {
        match self {
            Variant::Mos6503 | Variant::Mos6505 => 12,
            Variant::Mos6504 => 13,
            Variant::Mos6502 | Variant::Mos6510 | Variant::Mos6510_1 | Variant::Mos6510_2 => 16,
        }
    }

    #[must_use]
    pub const fn has_io_port(self) -> bool {
        matches!(
            self,
            Variant::Mos6510 | Variant::Mos6510_1 | Variant::Mos6510_2
        )
    }

    /// Function of a 1-based pin; `None` outside `1..=pin_count()`.
    #[must_use]
    pub fn pin(self, number: u32) -> Option<Pin> {
        let index = usize::try_from(number.checked_sub(1)?).ok()?;
        self.pinout().get(index).copied()
    }

    /// Lowest-numbered pin wired to `signal`.
    #[must_use]
    pub fn pin_of(self, signal: Signal) -> Option<u32> {
        self.pin_where(Pin::Signal(signal))
    }

    /// Lowest-numbered pin with function `pin`.
    #[must_use]
    pub fn pin_where(self, pin: Pin) -> Option<u32> {
        self.pinout()
            .iter()
            .position(|&p| p == pin)
            .map(|i| i as u32 + 1)
    }
}

impl fmt::Display for Variant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Variant {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_name(s).ok_or_else(|| UnknownVariant(s.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pin_counts_and_widths() {
        let table: Vec<_> = Variant::ALL
            .iter()
            .map(|v| (v.pin_count(), v.address_bus_width()))
            .collect();
        assert_eq!(
            table,
            [(40, 16), (28, 12), (28, 13), (28, 12), (40, 16), (40, 16), (40, 16)]
        );
    }

    #[test]
    fn each_bonded_address_line_has_one_pin() {
        for v in Variant::ALL {
            for bit in 0..16 {
                let pins = v
                    .pinout()
                    .iter()
                    .filter(|&&p| p == Pin::Signal(Signal::Ab(bit)))
                    .count();
                let expected = usize::from(u32::from(bit) < v.address_bus_width());
                assert_eq!(pins, expected, "{v} AB{bit}");
            }
            for bit in 0..8 {
                assert!(v.pin_of(Signal::Db(bit)).is_some(), "{v} DB{bit}");
            }
            assert!(v.pin_of(Signal::Clk0).is_some(), "{v} clock input");
        }
    }

    #[test]
    fn datasheet_pin_numbers() {
        let v = Variant::Mos6502;
        assert_eq!(v.pin_of(Signal::Res), Some(40));
        assert_eq!(v.pin_of(Signal::Clk0), Some(37));
        assert_eq!(v.pin_of(Signal::Rw), Some(34));
        assert_eq!(v.pin_of(Signal::Vss), Some(1));
        assert_eq!(v.pin(5), Some(Pin::NotConnected));
        assert_eq!(v.pin(0), None);
        assert_eq!(v.pin(41), None);

        assert_eq!(Variant::Mos6503.pin_of(Signal::Clk0), Some(27));
        assert_eq!(Variant::Mos6504.pin_of(Signal::Ab(12)), Some(17));
        assert_eq!(Variant::Mos6505.pin_of(Signal::Rdy), Some(3));
        assert_eq!(Variant::Mos6510.pin_where(Pin::Aec), Some(5));
        assert_eq!(Variant::Mos6510.pin_where(Pin::Port(0)), Some(29));
        assert_eq!(Variant::Mos6510.pin_where(Pin::Port(6)), None);
        assert_eq!(Variant::Mos6510_1.pin_where(Pin::Port(7)), Some(23));
        assert_eq!(Variant::Mos6510_2.pin_of(Signal::Clk2Out), Some(40));
    }

    #[test]
    fn io_port_variants() {
        let with_port: Vec<_> = Variant::ALL.into_iter().filter(|v| v.has_io_port()).collect();
        assert_eq!(
            with_port,
            [Variant::Mos6510, Variant::Mos6510_1, Variant::Mos6510_2]
        );
        for v in Variant::ALL {
            assert_eq!(v.pin_where(Pin::Aec).is_some(), v.has_io_port(), "{v}");
        }
    }

    #[test]
    fn lookup_by_either_name() {
        assert_eq!(Variant::from_name("MOS6502"), Some(Variant::Mos6502));
        assert_eq!(Variant::from_name("mos6510-1"), Some(Variant::Mos6510_1));
        assert_eq!("MOS6510_2".parse(), Ok(Variant::Mos6510_2));
        assert_eq!(
            "Z80".parse::<Variant>(),
            Err(UnknownVariant("Z80".to_string()))
        );
        for v in Variant::ALL {
            assert_eq!(v.to_string().parse(), Ok(v));
        }
    }
}
