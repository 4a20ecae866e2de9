//! Harness configuration, loadable from JSON and overridable from the
//! command line.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use mos_65xx::{ChipConfig, UnknownVariant, Variant};
use nmos_switch::NetworkConfig;
use serde::Deserialize;
use thiserror::Error;

use crate::memory::Memory;
use crate::trace::TraceFormat;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid address {0:?}")]
    InvalidAddress(String),

    #[error("invalid ROM {0:?}, expected FILE@ADDR")]
    InvalidRom(String),

    #[error("invalid RAM range {0:?}, expected START:SIZE")]
    InvalidRam(String),

    #[error("failed to read {}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("invalid configuration JSON")]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    UnknownVariant(#[from] UnknownVariant),
}

/// Parse `$C000`, `0xC000` or `49152`.
pub fn parse_address(text: &str) -> Result<u32, ConfigError> {
    let trimmed = text.trim();
    let parsed = if let Some(hex) = trimmed
        .strip_prefix('$')
        .or_else(|| trimmed.strip_prefix("0x"))
        .or_else(|| trimmed.strip_prefix("0X"))
    {
        u32::from_str_radix(hex, 16)
    } else {
        trimmed.parse()
    };
    parsed.map_err(|_| ConfigError::InvalidAddress(text.to_string()))
}

/// A ROM image loaded at a fixed address.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct RomSpec {
    pub path: PathBuf,
    pub address: u32,
}

impl FromStr for RomSpec {
    type Err = ConfigError;

    /// `FILE@ADDR`, split at the last `@`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (path, address) = s
            .rsplit_once('@')
            .filter(|(path, _)| !path.is_empty())
            .ok_or_else(|| ConfigError::InvalidRom(s.to_string()))?;
        Ok(Self {
            path: PathBuf::from(path),
            address: parse_address(address)?,
        })
    }
}

/// A zero-filled RAM range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct RamSpec {
    pub start: u32,
    pub size: u32,
}

impl FromStr for RamSpec {
    type Err = ConfigError;

    /// `START:SIZE`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (start, size) = s
            .split_once(':')
            .ok_or_else(|| ConfigError::InvalidRam(s.to_string()))?;
        Ok(Self {
            start: parse_address(start)?,
            size: parse_address(size)?,
        })
    }
}

/// Everything needed to set up and run one machine.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct MachineConfig {
    /// Variant name, e.g. `MOS6502` or `MOS6510-1`.
    pub chip: String,
    /// Netlist JSON file, or a directory of netlist data.
    pub netlist: Option<PathBuf>,
    /// Mapped before RAM, so ROM shadows overlapping RAM.
    pub roms: Vec<RomSpec>,
    pub ram: Vec<RamSpec>,
    /// Cycles to hold RES low.
    pub reset_cycles: u32,
    pub max_cycles: Option<u64>,
    pub until_pc: Option<u16>,
    pub trace: Option<PathBuf>,
    pub trace_format: TraceFormat,
    pub settle_budget: Option<usize>,
    /// Initial AEC level on variants with the pin.
    pub aec: bool,
    /// Base address of the console mailbox; off when unset.
    pub console: Option<u32>,
}

impl Default for MachineConfig {
    fn default() -> Self {
        Self {
            chip: Variant::Mos6502.name().to_string(),
            netlist: None,
            roms: Vec::new(),
            ram: Vec::new(),
            reset_cycles: 8,
            max_cycles: None,
            until_pc: None,
            trace: None,
            trace_format: TraceFormat::Text,
            settle_budget: None,
            aec: true,
            console: None,
        }
    }
}

impl MachineConfig {
    pub fn from_json(text: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(text)?)
    }

    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json(&text)
    }

    pub fn variant(&self) -> Result<Variant, ConfigError> {
        Ok(self.chip.parse()?)
    }

    #[must_use]
    pub fn chip_config(&self) -> ChipConfig {
        ChipConfig {
            network: NetworkConfig {
                settle_budget: self.settle_budget,
            },
            aec_default: self.aec,
        }
    }

    /// ROMs first, then RAM. With neither configured the whole 64K is RAM.
    pub fn build_memory(&self) -> Result<Memory, ConfigError> {
        let mut memory = Memory::new();
        for rom in &self.roms {
            let data = fs::read(&rom.path).map_err(|source| ConfigError::Io {
                path: rom.path.clone(),
                source,
            })?;
            log::info!("{}: {} bytes at ${:04X}", rom.path.display(), data.len(), rom.address);
            memory.add_rom(rom.address, data);
        }
        for ram in &self.ram {
            memory.add_ram(ram.start, ram.size);
        }
        if memory.range_count() == 0 {
            memory.add_ram(0, 0x1_0000);
        }
        Ok(memory)
    }
}
