//! Observability trait for inspecting chip state.
//!
//! A switch-level chip has no registers of its own, only nodes. Register
//! views are decoded from groups of nodes on demand, and querying them never
//! perturbs the network.

use std::fmt;

/// A dynamically-typed value for state queries.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
#[cfg_attr(feature = "serde", serde(untagged))]
pub enum Value {
    /// A single node or pin level.
    Bool(bool),
    /// 8-bit register or bus.
    U8(u8),
    /// 16-bit register or bus.
    U16(u16),
    /// Wider bus value.
    U32(u32),
    /// Cycle counts and similar.
    U64(u64),
    /// Names and other text.
    String(String),
    /// A list of values, e.g. every pin level.
    Array(Vec<Value>),
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Bool(v) => write!(f, "{}", u8::from(*v)),
            Value::U8(v) => write!(f, "{v:#04X}"),
            Value::U16(v) => write!(f, "{v:#06X}"),
            Value::U32(v) => write!(f, "{v:#010X}"),
            Value::U64(v) => write!(f, "{v}"),
            Value::String(v) => write!(f, "{v}"),
            Value::Array(arr) => {
                write!(f, "[")?;
                for (i, v) in arr.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{v}")?;
                }
                write!(f, "]")
            }
        }
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Bool(v)
    }
}

impl From<u8> for Value {
    fn from(v: u8) -> Self {
        Value::U8(v)
    }
}

impl From<u16> for Value {
    fn from(v: u16) -> Self {
        Value::U16(v)
    }
}

impl From<u32> for Value {
    fn from(v: u32) -> Self {
        Value::U32(v)
    }
}

impl From<u64> for Value {
    fn from(v: u64) -> Self {
        Value::U64(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::String(v.to_string())
    }
}

/// A component whose state can be inspected.
pub trait Observable {
    /// Query a specific property by path.
    ///
    /// Paths are hierarchical, separated by dots:
    /// - `a` - Accumulator
    /// - `pc` - Program counter
    /// - `node.1234` - Resolved level of one node
    ///
    /// Returns `None` if the path is not recognised.
    fn query(&self, path: &str) -> Option<Value>;

    /// List the fixed query paths.
    ///
    /// Parameterised paths such as `node.<id>` are accepted by `query()`
    /// but not listed here.
    fn query_paths(&self) -> &'static [&'static str];
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_formats_registers_as_hex() {
        assert_eq!(Value::U8(0x0A).to_string(), "0x0A");
        assert_eq!(Value::U16(0x8000).to_string(), "0x8000");
        assert_eq!(Value::Bool(true).to_string(), "1");
        assert_eq!(
            Value::Array(vec![Value::Bool(false), Value::U8(1)]).to_string(),
            "[0, 0x01]"
        );
    }
}
