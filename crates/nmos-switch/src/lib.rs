//! Switch-level simulation of NMOS transistor networks.
//!
//! A network is a set of nodes (electrical nets) joined by pass
//! transistors. Each transistor conducts while its gate node is high. After
//! any perturbation the engine floods every affected node's conducting
//! group, resolves one logical level per group, and re-evaluates whatever
//! the resulting gate changes disturb, until nothing is pending.
//!
//! ```
//! use nmos_switch::{Network, NetworkDescription, TransistorDef};
//!
//! // An NMOS inverter: `out` is pulled up, and pulled to ground while `input` is high.
//! let (power, ground, input, out) = (0, 1, 2, 3);
//! let desc = NetworkDescription {
//!     pullups: vec![false, false, false, true],
//!     transistors: vec![TransistorDef::new(input, out, ground)],
//!     power,
//!     ground,
//! };
//! let mut net = Network::new(&desc).unwrap();
//! net.stabilize();
//! assert!(net.get(out));
//!
//! net.set(input, true);
//! net.recalc();
//! assert!(!net.get(out));
//! ```

mod description;
mod error;
mod group;
mod network;
mod queue;
mod store;

pub use description::{NetworkDescription, NodeId, TransistorDef, TransistorId};
pub use error::NetworkError;
pub use group::GroupValue;
pub(crate) use group::GroupResolver;
pub use network::{Network, NetworkConfig};
pub(crate) use queue::ChangeQueue;
pub use store::Drive;
