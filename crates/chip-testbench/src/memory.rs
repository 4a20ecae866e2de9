//! Address-range memory map.
//!
//! Ranges are searched in the order they were added; the first one that
//! contains an address serves it. Unmapped reads return 0 and unmapped
//! writes are dropped.

use chip_core::Bus;

/// One region of the address space.
pub trait AddressRange {
    fn contains(&self, address: u32) -> bool;

    fn read(&self, address: u32) -> u8;

    /// Store a byte. Only called when [`is_writable`](Self::is_writable).
    fn write(&mut self, address: u32, value: u8);

    fn is_writable(&self) -> bool;
}

/// Read/write memory, zero-filled.
#[derive(Debug, Clone)]
pub struct Ram {
    start: u32,
    data: Vec<u8>,
}

impl Ram {
    #[must_use]
    pub fn new(start: u32, size: u32) -> Self {
        Self {
            start,
            data: vec![0; size as usize],
        }
    }
}

impl AddressRange for Ram {
    fn contains(&self, address: u32) -> bool {
        address
            .checked_sub(self.start)
            .is_some_and(|offset| (offset as usize) < self.data.len())
    }

    fn read(&self, address: u32) -> u8 {
        self.data[(address - self.start) as usize]
    }

    fn write(&mut self, address: u32, value: u8) {
        self.data[(address - self.start) as usize] = value;
    }

    fn is_writable(&self) -> bool {
        true
    }
}

/// Read-only image.
#[derive(Debug, Clone)]
pub struct Rom {
    start: u32,
    data: Vec<u8>,
}

impl Rom {
    #[must_use]
    pub fn new(start: u32, data: Vec<u8>) -> Self {
        Self { start, data }
    }
}

impl AddressRange for Rom {
    fn contains(&self, address: u32) -> bool {
        address
            .checked_sub(self.start)
            .is_some_and(|offset| (offset as usize) < self.data.len())
    }

    fn read(&self, address: u32) -> u8 {
        self.data[(address - self.start) as usize]
    }

    fn write(&mut self, _address: u32, _value: u8) {}

    fn is_writable(&self) -> bool {
        false
    }
}

#[derive(Default)]
pub struct Memory {
    ranges: Vec<Box<dyn AddressRange>>,
}

impl std::fmt::Debug for Memory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Memory")
            .field("ranges", &self.ranges.len())
            .finish()
    }
}

impl Memory {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_range(&mut self, range: Box<dyn AddressRange>) {
        self.ranges.push(range);
    }

    pub fn add_ram(&mut self, start: u32, size: u32) {
        let end = (u64::from(start) + u64::from(size)).saturating_sub(1);
        log::debug!("RAM ${start:04X}-${end:04X}");
        self.add_range(Box::new(Ram::new(start, size)));
    }

    pub fn add_rom(&mut self, start: u32, data: Vec<u8>) {
        log::debug!("ROM ${start:04X}, {} bytes", data.len());
        self.add_range(Box::new(Rom::new(start, data)));
    }

    #[must_use]
    pub fn range_count(&self) -> usize {
        self.ranges.len()
    }

    #[must_use]
    pub fn peek(&self, address: u32) -> u8 {
        self.ranges
            .iter()
            .find(|r| r.contains(address))
            .map_or(0, |r| r.read(address))
    }

    pub fn poke(&mut self, address: u32, value: u8) {
        let target = self
            .ranges
            .iter_mut()
            .find(|r| r.contains(address))
            .filter(|r| r.is_writable());
        if let Some(range) = target {
            range.write(address, value);
        }
    }
}

impl Bus for Memory {
    fn read(&mut self, address: u32) -> u8 {
        self.peek(address)
    }

    fn write(&mut self, address: u32, value: u8) {
        self.poke(address, value);
    }
}
