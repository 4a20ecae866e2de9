//! The 6510 family's on-chip 8-bit I/O port.
//!
//! The port is not part of the shared netlist. It sits beside the die and
//! snoops the CPU's own bus traffic: the data direction register lives at
//! `$0000` and the output register at `$0001`. A direction bit of 1 makes
//! the pin an output driven from the output register; 0 makes it an input
//! whose level is read back through `$0001`.

/// Address of the data direction register.
pub const DIRECTION_REGISTER: u16 = 0x0000;
/// Address of the output register.
pub const OUTPUT_REGISTER: u16 = 0x0001;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IoPort {
    /// 1 = output.
    direction: u8,
    output: u8,
    /// Levels applied to the pins from outside.
    input: u8,
    /// Address enable control pin.
    aec: bool,
}

impl IoPort {
    /// A port after reset: every pin an input.
    #[must_use]
    pub fn new(aec: bool) -> Self {
        Self {
            direction: 0,
            output: 0,
            input: 0,
            aec,
        }
    }

    #[must_use]
    pub fn direction(&self) -> u8 {
        self.direction
    }

    #[must_use]
    pub fn output(&self) -> u8 {
        self.output
    }

    #[must_use]
    pub fn aec(&self) -> bool {
        self.aec
    }

    pub fn set_aec(&mut self, high: bool) {
        self.aec = high;
    }

    /// Apply an external level to port bit `bit`. Ignored for bits past 7.
    pub fn drive_pin(&mut self, bit: u8, high: bool) {
        let Some(mask) = 1u8.checked_shl(bit.into()) else {
            return;
        };
        if high {
            self.input |= mask;
        } else {
            self.input &= !mask;
        }
    }

    /// Level on port bit `bit`: the output register for an output, the
    /// external level for an input.
    #[must_use]
    pub fn pin(&self, bit: u8) -> bool {
        1u8.checked_shl(bit.into())
            .is_some_and(|mask| self.pins() & mask != 0)
    }

    /// Every pin level, as the CPU reads it from `$0001`.
    #[must_use]
    pub fn pins(&self) -> u8 {
        (self.output & self.direction) | (self.input & !self.direction)
    }

    /// Take part in one bus cycle. A write to a port register is latched;
    /// a read returns the byte the port drives onto the data bus.
    pub fn access(&mut self, address: u16, read: bool, data: u8) -> Option<u8> {
        match (address, read) {
            (DIRECTION_REGISTER, true) => Some(self.direction),
            (OUTPUT_REGISTER, true) => Some(self.pins()),
            (DIRECTION_REGISTER, false) => {
                self.direction = data;
                None
            }
            (OUTPUT_REGISTER, false) => {
                self.output = data;
                None
            }
            _ => None,
        }
    }
}

impl Default for IoPort {
    fn default() -> Self {
        Self::new(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reset_state_is_all_inputs() {
        let mut port = IoPort::default();
        assert_eq!(port.direction(), 0);
        port.drive_pin(3, true);
        assert!(port.pin(3));
        assert_eq!(port.access(OUTPUT_REGISTER, true, 0xFF), Some(0x08));
    }

    #[test]
    fn outputs_follow_the_output_register() {
        let mut port = IoPort::default();
        assert_eq!(port.access(DIRECTION_REGISTER, false, 0x0F), None);
        assert_eq!(port.access(OUTPUT_REGISTER, false, 0x35), None);
        port.drive_pin(7, true);
        port.drive_pin(0, false);
        // Low nibble from the output register, high nibble from the pins.
        assert_eq!(port.pins(), 0x85);
        assert!(port.pin(0));
        assert!(!port.pin(4));
        assert_eq!(port.access(DIRECTION_REGISTER, true, 0), Some(0x0F));
        assert_eq!(port.output(), 0x35);
    }

    #[test]
    fn other_addresses_are_not_claimed() {
        let mut port = IoPort::default();
        assert_eq!(port.access(0x0002, true, 0), None);
        assert_eq!(port.access(0x0100, false, 0xFF), None);
        assert_eq!(port.direction(), 0);
    }

    #[test]
    fn bits_past_seven_are_ignored() {
        let mut port = IoPort::new(false);
        port.drive_pin(8, true);
        assert_eq!(port.pins(), 0);
        assert!(!port.pin(9));
        assert!(!port.aec());
        port.set_aec(true);
        assert!(port.aec());
    }
}
