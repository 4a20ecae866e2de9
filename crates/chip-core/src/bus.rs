//! Memory and I/O bus interface.

/// Memory and I/O bus interface.
///
/// A harness services a chip's address and data pins through this trait
/// once per clock cycle. Addresses are zero-extended to `u32` so that chips
/// with narrower address buses (11, 12 or 16 pins) share one interface.
pub trait Bus {
    /// Read a byte from the given address.
    fn read(&mut self, address: u32) -> u8;

    /// Write a byte to the given address.
    fn write(&mut self, address: u32, value: u8);
}
