//! Embedded catalog of sample Moore machines. The samples ship inside the binary via
//! `include_str!` and cover both text dialects, so the catalog doubles as living
//! documentation of the formats.

use crate::loader::DefinitionLoader;
use crate::types::{MachineDefinition, MooreError};

use std::sync::RwLock;

// Default embedded machines
const MACHINE_SOURCES: [(&str, &str); 3] = [
    ("Binary Parity", include_str!("../machines/parity.txt")),
    ("Traffic Light", include_str!("../machines/traffic-light.txt")),
    ("Turnstile", include_str!("../machines/turnstile.txt")),
];

lazy_static::lazy_static! {
    pub static ref MACHINES: RwLock<Vec<CatalogEntry>> = RwLock::new(Vec::new());
}

/// One loaded catalog entry: the display name plus its validated definition.
#[derive(Debug, Clone)]
pub struct CatalogEntry {
    pub name: String,
    pub definition: MachineDefinition,
}

pub struct MachineCatalog;

impl MachineCatalog {
    /// Initialize the catalog from the embedded machine texts.
    pub fn load() -> Result<(), MooreError> {
        let mut entries = Vec::new();

        for (name, text) in MACHINE_SOURCES {
            match DefinitionLoader::from_text(text) {
                Ok(definition) => entries.push(CatalogEntry {
                    name: name.to_string(),
                    definition,
                }),
                Err(e) => log::error!("failed to load embedded machine '{name}': {e}"),
            }
        }

        // The Excess-3 adder ships as a generated table, not as text.
        entries.push(CatalogEntry {
            name: "Excess-3 Adder".to_string(),
            definition: crate::excess3::table_definition(),
        });

        if let Ok(mut write_guard) = MACHINES.write() {
            *write_guard = entries;
        } else {
            return Err(MooreError::Catalog(
                "Failed to acquire write lock".to_string(),
            ));
        }

        Ok(())
    }

    /// Get the number of available machines
    pub fn machine_count() -> usize {
        // Initialize with embedded machines if not already initialized
        let _ = Self::load();

        MACHINES.read().map(|machines| machines.len()).unwrap_or(0)
    }

    /// Get a machine definition by its index
    pub fn machine_by_index(index: usize) -> Result<MachineDefinition, MooreError> {
        // Initialize with embedded machines if not already initialized
        let _ = Self::load();

        MACHINES
            .read()
            .map_err(|_| MooreError::Catalog("Failed to acquire read lock".to_string()))?
            .get(index)
            .map(|entry| entry.definition.clone())
            .ok_or_else(|| MooreError::Catalog(format!("Machine index {index} out of range")))
    }

    /// Get a machine definition by its name
    pub fn machine_by_name(name: &str) -> Result<MachineDefinition, MooreError> {
        // Initialize with embedded machines if not already initialized
        let _ = Self::load();

        MACHINES
            .read()
            .map_err(|_| MooreError::Catalog("Failed to acquire read lock".to_string()))?
            .iter()
            .find(|entry| entry.name == name)
            .map(|entry| entry.definition.clone())
            .ok_or_else(|| MooreError::Catalog(format!("Machine '{name}' not found")))
    }

    /// List all machine names
    pub fn list_machine_names() -> Vec<String> {
        // Initialize with embedded machines if not already initialized
        let _ = Self::load();

        MACHINES
            .read()
            .map(|machines| machines.iter().map(|entry| entry.name.clone()).collect())
            .unwrap_or_else(|_| Vec::new())
    }

    /// Get summary information about a machine by its index
    pub fn machine_info(index: usize) -> Result<MachineInfo, MooreError> {
        let _ = Self::load();

        MACHINES
            .read()
            .map_err(|_| MooreError::Catalog("Failed to acquire read lock".to_string()))?
            .get(index)
            .map(|entry| MachineInfo {
                index,
                name: entry.name.clone(),
                initial_state: entry.definition.initial_state.clone(),
                state_count: entry.definition.states.len(),
                input_count: entry.definition.inputs.len(),
                transition_count: entry.definition.transition_count(),
            })
            .ok_or_else(|| MooreError::Catalog(format!("Machine index {index} out of range")))
    }

    /// Search for machines by name, case-insensitively
    pub fn search_machines(query: &str) -> Vec<usize> {
        // Initialize with embedded machines if not already initialized
        let _ = Self::load();

        MACHINES
            .read()
            .map(|machines| {
                machines
                    .iter()
                    .enumerate()
                    .filter(|(_, entry)| {
                        entry.name.to_lowercase().contains(&query.to_lowercase())
                    })
                    .map(|(index, _)| index)
                    .collect()
            })
            .unwrap_or_else(|_| Vec::new())
    }

    /// Get the original source text of a machine by its index.
    ///
    /// Only text-backed entries have source text; the generated Excess-3 table
    /// is out of range here.
    pub fn machine_text_by_index(index: usize) -> Result<&'static str, MooreError> {
        MACHINE_SOURCES
            .get(index)
            .map(|(_, text)| *text)
            .ok_or_else(|| MooreError::Catalog(format!("Machine text index {index} out of range")))
    }
}

#[derive(Debug, Clone)]
pub struct MachineInfo {
    pub index: usize,
    pub name: String,
    pub initial_state: String,
    pub state_count: usize,
    pub input_count: usize,
    pub transition_count: usize,
}
