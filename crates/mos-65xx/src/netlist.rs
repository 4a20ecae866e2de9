//! Netlist loading.
//!
//! Two formats are understood:
//!
//! - JSON: `{"pullups": [bool], "transistors": [[gate, c1, c2]], "power":
//!   id, "ground": id, "names": {"name": id}}`.
//! - The visual6502 data files `segdefs.js` (node space and pull-ups),
//!   `transdefs.js` (transistors) and `nodenames.js` (names). Power and
//!   ground are the nodes named `vcc` and `vss`.

use std::collections::{BTreeMap, HashMap};
use std::fs;
use std::path::Path;

use nmos_switch::{NetworkDescription, NodeId, TransistorDef};
use serde::{Deserialize, Serialize};

use crate::error::{NetlistError, Result};

/// File name looked up first by [`Netlist::load`] in a directory.
const JSON_FILE: &str = "netlist.json";
const SEGDEFS_FILE: &str = "segdefs.js";
const TRANSDEFS_FILE: &str = "transdefs.js";
const NODENAMES_FILE: &str = "nodenames.js";

/// Largest node id accepted from the visual6502 tables. The node space is
/// sized from the ids it sees, so this also caps the allocation.
const MAX_NODE_ID: NodeId = (1 << 20) - 1;

/// A network description plus the names of its interesting nodes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Netlist {
    description: NetworkDescription,
    names: HashMap<String, NodeId>,
}

#[derive(Serialize, Deserialize)]
struct NetlistFile {
    pullups: Vec<bool>,
    transistors: Vec<[NodeId; 3]>,
    power: NodeId,
    ground: NodeId,
    #[serde(default)]
    names: BTreeMap<String, NodeId>,
}

impl Netlist {
    pub fn new(
        description: NetworkDescription,
        names: impl IntoIterator<Item = (String, NodeId)>,
    ) -> Self {
        Self {
            description,
            names: names.into_iter().collect(),
        }
    }

    /// Load from a JSON file, or from a directory holding either
    /// `netlist.json` or the three visual6502 files.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if !path.is_dir() {
            return Self::from_json(&read(path)?);
        }
        let json = path.join(JSON_FILE);
        if json.is_file() {
            return Self::from_json(&read(&json)?);
        }
        Self::from_visual6502(
            &read(&path.join(SEGDEFS_FILE))?,
            &read(&path.join(TRANSDEFS_FILE))?,
            &read(&path.join(NODENAMES_FILE))?,
        )
    }

    pub fn from_json(text: &str) -> Result<Self> {
        let file: NetlistFile = serde_json::from_str(text)?;
        let transistors = file
            .transistors
            .into_iter()
            .map(|[gate, c1, c2]| TransistorDef::new(gate, c1, c2))
            .collect();
        Ok(Self::new(
            NetworkDescription {
                pullups: file.pullups,
                transistors,
                power: file.power,
                ground: file.ground,
            },
            file.names,
        ))
    }

    /// Serialise in the format [`from_json`](Self::from_json) reads, names
    /// sorted.
    pub fn to_json(&self) -> Result<String> {
        let file = NetlistFile {
            pullups: self.description.pullups.clone(),
            transistors: self
                .description
                .transistors
                .iter()
                .map(|t| [t.gate, t.c1, t.c2])
                .collect(),
            power: self.description.power,
            ground: self.description.ground,
            names: self
                .names
                .iter()
                .map(|(name, &id)| (name.clone(), id))
                .collect(),
        };
        Ok(serde_json::to_string(&file)?)
    }

    /// Parse the visual6502 JavaScript data tables.
    pub fn from_visual6502(segdefs: &str, transdefs: &str, nodenames: &str) -> Result<Self> {
        let mut node_count = 0;
        let mut pulled_up = Vec::new();

        for (line, fields) in rows(segdefs) {
            let id = field(&fields, 0, SEGDEFS_FILE, line)?;
            let pull = fields.get(1).copied().unwrap_or_default();
            node_count = node_count.max(id + 1);
            if pull == "+" {
                pulled_up.push(id);
            }
        }

        let mut transistors = Vec::new();
        for (line, fields) in rows(transdefs) {
            let gate = field(&fields, 1, TRANSDEFS_FILE, line)?;
            let c1 = field(&fields, 2, TRANSDEFS_FILE, line)?;
            let c2 = field(&fields, 3, TRANSDEFS_FILE, line)?;
            node_count = node_count.max(gate.max(c1).max(c2) + 1);
            transistors.push(TransistorDef::new(gate, c1, c2));
        }

        let names = parse_nodenames(nodenames)?;
        if let Some(&max) = names.values().max() {
            node_count = node_count.max(max + 1);
        }

        let mut pullups = vec![false; node_count];
        for id in pulled_up {
            pullups[id] = true;
        }

        let lookup = |name: &str| {
            names
                .get(name)
                .copied()
                .ok_or_else(|| NetlistError::MissingNode(name.to_string()))
        };
        let description = NetworkDescription {
            pullups,
            transistors,
            power: lookup("vcc")?,
            ground: lookup("vss")?,
        };

        log::debug!(
            "visual6502 netlist: {} nodes, {} transistors, {} names",
            description.node_count(),
            description.transistors.len(),
            names.len()
        );
        Ok(Self { description, names })
    }

    #[must_use]
    pub fn description(&self) -> &NetworkDescription {
        &self.description
    }

    /// Id of the node called `name`.
    #[must_use]
    pub fn node(&self, name: &str) -> Option<NodeId> {
        self.names.get(name).copied()
    }

    /// Like [`node`](Self::node), but a missing name is an error.
    pub fn require(&self, name: &str) -> Result<NodeId> {
        self.node(name)
            .ok_or_else(|| NetlistError::MissingNode(name.to_string()))
    }

    pub fn names(&self) -> impl Iterator<Item = (&str, NodeId)> {
        self.names.iter().map(|(name, &id)| (name.as_str(), id))
    }
}

fn read(path: &Path) -> Result<String> {
    fs::read_to_string(path).map_err(|source| NetlistError::Io {
        path: path.to_path_buf(),
        source,
    })
}

/// Array rows of a visual6502 table: `(line number, fields)` for every line
/// opening with `[`, quotes stripped.
fn rows(text: &str) -> impl Iterator<Item = (usize, Vec<&str>)> {
    text.lines().enumerate().filter_map(|(i, line)| {
        let row = line.trim().strip_prefix('[')?;
        let fields = row
            .split(',')
            .map(|f| f.trim().trim_matches(['\'', '"']))
            .collect();
        Some((i + 1, fields))
    })
}

fn field(fields: &[&str], index: usize, file: &'static str, line: usize) -> Result<NodeId> {
    let text = fields.get(index).copied().unwrap_or_default();
    let id = text.parse().map_err(|_| NetlistError::Malformed {
        file,
        line,
        reason: format!("field {index} is {text:?}, expected a node id"),
    })?;
    bounded(id, file, line)
}

fn bounded(id: NodeId, file: &'static str, line: usize) -> Result<NodeId> {
    if id > MAX_NODE_ID {
        return Err(NetlistError::Malformed {
            file,
            line,
            reason: format!("node id {id} exceeds {MAX_NODE_ID}"),
        });
    }
    Ok(id)
}

/// `name: id,` entries, one per line; comments and the enclosing object
/// syntax are skipped.
fn parse_nodenames(text: &str) -> Result<HashMap<String, NodeId>> {
    let mut names = HashMap::new();
    for (i, line) in text.lines().enumerate() {
        let line = line.split("//").next().unwrap_or_default();
        let Some((key, value)) = line.split_once(':') else {
            continue;
        };
        let key = key.trim().trim_matches(['\'', '"']);
        if key.is_empty() || key.contains(char::is_whitespace) {
            continue;
        }
        let value = value.trim().trim_end_matches([',', '}']).trim();
        let id = value.parse().map_err(|_| NetlistError::Malformed {
            file: NODENAMES_FILE,
            line: i + 1,
            reason: format!("{key} has node id {value:?}"),
        })?;
        let id = bounded(id, NODENAMES_FILE, i + 1)?;
        names.insert(key.to_string(), id);
    }
    Ok(names)
}
