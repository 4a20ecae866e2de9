//! Character console mailbox for Commodore-style kernels.
//!
//! Three registers sit at a configurable base address:
//!
//! | Offset | Register | Meaning                                   |
//! |--------|----------|-------------------------------------------|
//! | 0      | select   | Call in progress: CHRIN, CHROUT, or other |
//! | 1      | io       | Character passed in either direction      |
//! | 2      | ack      | Set by the kernel once it took a CHRIN byte |
//!
//! The kernel writes `select` (and `io` for CHROUT) and spins until the
//! harness clears all three. The harness looks at the mailbox once per
//! cycle.

use std::io::{self, ErrorKind, Read, Write};

/// Number of mailbox registers.
pub const REGISTER_COUNT: u32 = 3;

pub const SELECT_CHRIN: u8 = 0x01;
pub const SELECT_CHROUT: u8 = 0x02;
/// A kernel call the kernel itself does not implement.
pub const SELECT_NOT_IMPLEMENTED: u8 = 0xFF;

const OFFSET_SELECT: u32 = 0;
const OFFSET_IO: u32 = 1;
const OFFSET_ACK: u32 = 2;

/// Whether `pc` is one of the kernel jump table entries `$FF81`-`$FFF3`.
#[must_use]
pub fn is_kernel_call(pc: u16) -> bool {
    (0xFF81..=0xFFF3).contains(&pc) && (pc - 0xFF81) % 3 == 0
}

pub struct Console {
    base: u32,
    select: u8,
    io: u8,
    ack: u8,
    input: Box<dyn Read>,
    output: Box<dyn Write>,
}

impl Console {
    pub fn new(base: u32, input: Box<dyn Read>, output: Box<dyn Write>) -> Self {
        Self {
            base,
            select: 0,
            io: 0,
            ack: 0,
            input,
            output,
        }
    }

    #[must_use]
    pub fn contains(&self, address: u32) -> bool {
        address
            .checked_sub(self.base)
            .is_some_and(|offset| offset < REGISTER_COUNT)
    }

    #[must_use]
    pub fn read(&self, address: u32) -> u8 {
        match address.wrapping_sub(self.base) {
            OFFSET_SELECT => self.select,
            OFFSET_IO => self.io,
            OFFSET_ACK => self.ack,
            _ => 0,
        }
    }

    pub fn write(&mut self, address: u32, value: u8) {
        match address.wrapping_sub(self.base) {
            OFFSET_SELECT => self.select = value,
            OFFSET_IO => self.io = value,
            OFFSET_ACK => self.ack = value,
            _ => {}
        }
    }

    /// Answer the pending call, if any. The mailbox is cleared once the
    /// call completes.
    pub fn service(&mut self) -> io::Result<()> {
        let done = match self.select {
            SELECT_CHRIN if self.io == 0 => {
                if let Some(byte) = self.next_input()? {
                    self.io = byte;
                }
                false
            }
            SELECT_CHRIN => self.ack != 0,
            SELECT_CHROUT if self.io != 0 => {
                self.output.write_all(&[self.io])?;
                self.output.flush()?;
                true
            }
            SELECT_NOT_IMPLEMENTED => {
                log::warn!("kernel call not implemented");
                true
            }
            _ => false,
        };
        if done {
            self.select = 0;
            self.io = 0;
            self.ack = 0;
        }
        Ok(())
    }

    /// One byte of input, or `None` at end of input.
    fn next_input(&mut self) -> io::Result<Option<u8>> {
        let mut byte = [0];
        loop {
            match self.input.read(&mut byte) {
                Ok(0) => return Ok(None),
                Ok(_) => return Ok(Some(byte[0])),
                Err(err) if err.kind() == ErrorKind::Interrupted => {}
                Err(err) => return Err(err),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    #[derive(Clone, Default)]
    struct Shared(Arc<Mutex<Vec<u8>>>);

    impl Write for Shared {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    fn console(input: &'static [u8]) -> (Console, Shared) {
        let out = Shared::default();
        (Console::new(0x0300, Box::new(input), Box::new(out.clone())), out)
    }

    #[test]
    fn registers_are_mapped_at_the_base() {
        let (mut c, _) = console(b"");
        assert!(!c.contains(0x02FF));
        assert!(c.contains(0x0300));
        assert!(c.contains(0x0302));
        assert!(!c.contains(0x0303));
        c.write(0x0301, 0x41);
        assert_eq!(c.read(0x0301), 0x41);
        assert_eq!(c.read(0x0300), 0);
    }

    #[test]
    fn chrout_prints_and_clears() {
        let (mut c, out) = console(b"");
        c.write(0x0300, SELECT_CHROUT);
        c.service().unwrap();
        assert_eq!(c.read(0x0300), SELECT_CHROUT, "waits for a character");

        c.write(0x0301, b'H');
        c.service().unwrap();
        assert_eq!(out.0.lock().unwrap().as_slice(), b"H");
        assert_eq!((c.read(0x0300), c.read(0x0301)), (0, 0));
    }

    #[test]
    fn chrin_hands_over_one_byte_until_acknowledged() {
        let (mut c, _) = console(b"ok");
        c.write(0x0300, SELECT_CHRIN);
        c.service().unwrap();
        assert_eq!(c.read(0x0301), b'o');

        // Still waiting for the kernel to take it.
        c.service().unwrap();
        assert_eq!(c.read(0x0301), b'o');

        c.write(0x0302, 1);
        c.service().unwrap();
        assert_eq!((c.read(0x0300), c.read(0x0301), c.read(0x0302)), (0, 0, 0));

        c.write(0x0300, SELECT_CHRIN);
        c.service().unwrap();
        assert_eq!(c.read(0x0301), b'k');
    }

    #[test]
    fn chrin_at_end_of_input_keeps_waiting() {
        let (mut c, _) = console(b"");
        c.write(0x0300, SELECT_CHRIN);
        c.service().unwrap();
        assert_eq!(c.read(0x0300), SELECT_CHRIN);
        assert_eq!(c.read(0x0301), 0);
    }

    #[test]
    fn unimplemented_calls_are_cleared() {
        let (mut c, _) = console(b"");
        c.write(0x0300, SELECT_NOT_IMPLEMENTED);
        c.service().unwrap();
        assert_eq!(c.read(0x0300), 0);
    }

    #[test]
    fn kernel_jump_table() {
        assert!(is_kernel_call(0xFF81));
        assert!(is_kernel_call(0xFFD2));
        assert!(is_kernel_call(0xFFF3));
        assert!(!is_kernel_call(0xFF82));
        assert!(!is_kernel_call(0xFFF6));
        assert!(!is_kernel_call(0x8000));
    }
}
