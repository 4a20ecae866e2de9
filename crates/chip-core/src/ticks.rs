//! A count of clock cycles.

/// A count of clock cycles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Ticks(pub u64);

impl Ticks {
    pub const ZERO: Self = Self(0);

    #[must_use]
    pub const fn new(count: u64) -> Self {
        Self(count)
    }

    #[must_use]
    pub const fn get(self) -> u64 {
        self.0
    }

    /// Number of clock half-cycles in this many cycles.
    #[must_use]
    pub const fn half_cycles(self) -> u64 {
        self.0 * 2
    }
}

impl core::ops::Add for Ticks {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        Self(self.0 + rhs.0)
    }
}

impl core::ops::AddAssign for Ticks {
    fn add_assign(&mut self, rhs: Self) {
        self.0 += rhs.0;
    }
}

impl core::ops::Sub for Ticks {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self {
        Self(self.0.saturating_sub(rhs.0))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn subtraction_saturates() {
        assert_eq!(Ticks::new(3) - Ticks::new(5), Ticks::ZERO);
        assert_eq!(Ticks::new(5) - Ticks::new(3), Ticks::new(2));
    }

    #[test]
    fn half_cycles_double() {
        let mut t = Ticks::new(8);
        t += Ticks::new(1);
        assert_eq!(t.half_cycles(), 18);
    }
}
