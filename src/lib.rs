//! This crate provides the core logic for a Moore machine toolkit.
//! It includes modules for parsing machine definitions in two text dialects,
//! validating their structure, generating a deterministic circular layout for
//! rendering, simulating execution step by step, and a closed-form Excess-3
//! serial adder that shares the simulation contract.

pub mod excess3;
pub mod exporter;
pub mod layout;
pub mod loader;
pub mod machines;
pub mod parser;
pub mod records;
pub mod simulator;
pub mod types;
pub mod validator;

/// Re-exports the `Rule` enum from the records module, used by the `pest` grammar.
pub use crate::records::Rule;
/// Re-exports the closed-form Excess-3 adder and its output markers.
pub use excess3::{Excess3Adder, END_OF_WORD, NO_OUTPUT};
/// Re-exports the `export` function rendering a definition back into quintuple text.
pub use exporter::export;
/// Re-exports the layout generator and the visual model it produces.
pub use layout::{layout, Point, VisualMachine, VisualState, VisualTransition};
/// Re-exports the `DefinitionLoader` struct from the loader module.
pub use loader::DefinitionLoader;
/// Re-exports the embedded machine catalog.
pub use machines::{MachineCatalog, MachineInfo, MACHINES};
/// Re-exports the `parse` function for the quintuple dialect.
pub use parser::parse;
/// Re-exports the simulation engine, its observer trait, and step outcomes.
pub use simulator::{
    HistoryEntry, MooreEngine, NullObserver, Rejection, RunStatus, SequenceRun,
    SimulationObserver, Simulator, StepResult, TransitionEvent,
};
/// Re-exports the machine definition types and error taxonomy from the types module.
pub use types::{MachineDefinition, MooreError, Transition, MAX_DEFINITION_SIZE};
/// Re-exports the `validate` function collecting structural defects.
pub use validator::validate;
