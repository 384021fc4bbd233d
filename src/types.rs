//! This module defines the core data structures and types used throughout the Moore machine
//! toolkit, including the machine definition, transitions, and error types.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use thiserror::Error;

use crate::records::Rule;

/// The maximum allowed size for a machine definition file in bytes.
pub const MAX_DEFINITION_SIZE: usize = 65536; // 64KB

/// Represents a Moore machine definition: the quintuple of states, input alphabet,
/// output alphabet, initial state, and transition/output functions.
///
/// `states`, `inputs` and `outputs` are ordered sets: unique entries whose order is
/// the order of first occurrence in the source text. That order is also the display
/// order used by the layout generator.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct MachineDefinition {
    /// The state identifiers, unique and in insertion order.
    pub states: Vec<String>,
    /// The input alphabet, unique and in insertion order.
    pub inputs: Vec<String>,
    /// The output alphabet, unique and in insertion order.
    pub outputs: Vec<String>,
    /// The state the machine starts in.
    pub initial_state: String,
    /// Optional set of final states. May be empty; no dialect is required to fill it.
    pub final_states: Vec<String>,
    /// The transition table, in source order.
    pub transitions: Vec<Transition>,
    /// Maps each state to the symbol it emits. Total over `states` once validated.
    pub output_function: HashMap<String, String>,
}

impl MachineDefinition {
    /// Returns the output symbol emitted by `state`, if one is recorded.
    pub fn output_of(&self, state: &str) -> Option<&str> {
        self.output_function.get(state).map(String::as_str)
    }

    /// Returns the first transition matching `(from, input)` in table order.
    ///
    /// Duplicate `(from, input)` pairs are flagged by the validator, but the
    /// lookup itself always takes the first match.
    pub fn transition_from(&self, from: &str, input: &str) -> Option<&Transition> {
        self.transitions
            .iter()
            .find(|t| t.from == from && t.input == input)
    }

    /// Checks whether `id` is a defined state.
    pub fn has_state(&self, id: &str) -> bool {
        self.states.iter().any(|s| s == id)
    }

    /// Checks whether `symbol` is part of the input alphabet.
    pub fn has_input(&self, symbol: &str) -> bool {
        self.inputs.iter().any(|s| s == symbol)
    }

    /// Number of transitions defined for this machine.
    pub fn transition_count(&self) -> usize {
        self.transitions.len()
    }
}

/// A single transition: reading `input` in state `from` moves the machine to `to`.
///
/// Immutable once constructed; owned exclusively by a [`MachineDefinition`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transition {
    /// The source state.
    pub from: String,
    /// The input symbol driving the transition.
    pub input: String,
    /// The destination state.
    pub to: String,
}

impl Transition {
    pub fn new(from: impl Into<String>, input: impl Into<String>, to: impl Into<String>) -> Self {
        Self {
            from: from.into(),
            input: input.into(),
            to: to.into(),
        }
    }

    /// A transition whose source and destination state are identical.
    pub fn is_self_loop(&self) -> bool {
        self.from == self.to
    }
}

/// Represents various errors that can occur while loading or parsing a machine definition.
///
/// Simulation rejections are deliberately not part of this taxonomy: a `step` that finds
/// no matching transition is a normal outcome, reported as a value, not an error.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum MooreError {
    /// A required section marker of the quintuple dialect was not found.
    #[error("Missing '{0}' section")]
    MissingSection(String),
    /// A section marker was found but no data line follows it.
    #[error("No data found for '{0}' section")]
    InsufficientData(String),
    /// The flat-record input could not be read by the record grammar.
    #[error("Record parsing error: {0}")]
    Record(#[from] Box<pest::error::Error<Rule>>),
    /// Structural validation found defects. Carries the full list, not just the first.
    #[error("Invalid machine definition: {}", .0.join("; "))]
    Invalid(Vec<String>),
    /// An error related to file system operations while loading a definition.
    #[error("File error: {0}")]
    File(String),
    /// A lookup in the embedded machine catalog failed.
    #[error("Catalog error: {0}")]
    Catalog(String),
}
