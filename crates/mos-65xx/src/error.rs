//! Error types for mos-65xx.

use std::io;
use std::path::PathBuf;

use nmos_switch::NetworkError;
use thiserror::Error;

/// Failure to load a netlist or build a chip from it.
#[derive(Debug, Error)]
pub enum NetlistError {
    #[error("failed to read {}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("invalid netlist JSON")]
    Json(#[from] serde_json::Error),

    #[error("{file} line {line}: {reason}")]
    Malformed {
        file: &'static str,
        line: usize,
        reason: String,
    },

    #[error("netlist has no node named {0:?}")]
    MissingNode(String),

    #[error(transparent)]
    Network(#[from] NetworkError),
}

/// A chip name that matches no [`Variant`](crate::Variant).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown chip variant {0:?}")]
pub struct UnknownVariant(pub String);

pub type Result<T> = std::result::Result<T, NetlistError>;
