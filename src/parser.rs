//! This module provides the parser for the quintuple dialect of the Moore machine
//! text format: a line-oriented layout where each part of the quintuple is introduced
//! by a section marker and followed by comma-separated data.

use crate::types::{MachineDefinition, MooreError, Transition};

/// Banner lines that may precede the quintuple sections. Skipped when present.
const BANNER_MARKERS: &[&str] = &["QUINTUPLA", "MÁQUINA"];
/// Markers introducing the state set (Q).
const STATE_MARKERS: &[&str] = &["Estados", "Q:"];
/// Markers introducing the input alphabet (Σ).
const INPUT_MARKERS: &[&str] = &["Alfabeto de Entrada", "Σ:"];
/// Markers introducing the output alphabet (Γ).
const OUTPUT_MARKERS: &[&str] = &["Alfabeto de Salida", "Γ:"];
/// Marker introducing the initial state (q0).
const INITIAL_MARKERS: &[&str] = &["Estado Inicial"];
/// Marker introducing the transition table.
const TABLE_MARKERS: &[&str] = &["Tabla de Transición"];

/// Parses the quintuple dialect into an unvalidated [`MachineDefinition`].
///
/// Blank lines are discarded and every line is trimmed before matching. Sections must
/// appear in quintuple order: states, input alphabet, output alphabet, initial state,
/// transition table. An optional banner line may precede them. Each transition-table
/// row has the shape `state, output, dest-for-input-0, dest-for-input-1, ...` with
/// destinations positional in input-alphabet order; an empty destination field defines
/// no transition for that input.
///
/// The result is structurally unchecked: callers are expected to run
/// [`crate::validator::validate`] at the trust boundary before simulating.
///
/// # Errors
///
/// * [`MooreError::MissingSection`] when a required section marker is absent.
/// * [`MooreError::InsufficientData`] when a marker is present but no data line follows.
pub fn parse(input: &str) -> Result<MachineDefinition, MooreError> {
    let mut lines = Lines::new(input);
    let mut definition = MachineDefinition::default();

    // Optional banner line
    if lines.peek().is_some_and(|l| matches_any(l, BANNER_MARKERS)) {
        lines.advance();
    }

    definition.states = split_list(section_data(&mut lines, STATE_MARKERS, "Estados (Q)")?);
    definition.inputs = split_list(section_data(
        &mut lines,
        INPUT_MARKERS,
        "Alfabeto de Entrada (Σ)",
    )?);
    definition.outputs = split_list(section_data(
        &mut lines,
        OUTPUT_MARKERS,
        "Alfabeto de Salida (Γ)",
    )?);
    definition.initial_state = section_data(&mut lines, INITIAL_MARKERS, "Estado Inicial")?.into();

    if !lines.peek().is_some_and(|l| matches_any(l, TABLE_MARKERS)) {
        return Err(MooreError::MissingSection("Tabla de Transición".into()));
    }
    lines.advance();

    while let Some(row) = lines.next() {
        parse_table_row(row, &mut definition);
    }

    Ok(definition)
}

/// Heuristic dialect check: does `input` carry the quintuple states marker?
///
/// Used by the loader to pick a parser; text without the marker is handed to the
/// flat-record dialect instead.
pub fn looks_like_quintuple(input: &str) -> bool {
    input
        .lines()
        .any(|line| matches_any(line.trim(), STATE_MARKERS))
}

/// Parses one transition-table row into `definition`, or skips it with a warning
/// when it is shorter than `2 + |inputs|` fields.
fn parse_table_row(row: &str, definition: &mut MachineDefinition) {
    let parts: Vec<&str> = row.split(',').map(str::trim).collect();

    if parts.len() < 2 + definition.inputs.len() {
        log::warn!("skipping malformed transition row: {row:?}");
        return;
    }

    let state = parts[0];
    let output = parts[1];
    definition
        .output_function
        .insert(state.to_string(), output.to_string());

    for (i, input) in definition.inputs.iter().enumerate() {
        let destination = parts[2 + i];
        if !destination.is_empty() {
            definition
                .transitions
                .push(Transition::new(state, input.clone(), destination));
        }
    }
}

/// Consumes a section: the marker line, then the single data line after it.
fn section_data<'a>(
    lines: &mut Lines<'a>,
    markers: &[&str],
    name: &str,
) -> Result<&'a str, MooreError> {
    match lines.peek() {
        Some(line) if matches_any(line, markers) => lines.advance(),
        _ => return Err(MooreError::MissingSection(name.to_string())),
    }

    lines
        .next()
        .ok_or_else(|| MooreError::InsufficientData(name.to_string()))
}

/// Case-insensitive substring match of `line` against any of `markers`.
fn matches_any(line: &str, markers: &[&str]) -> bool {
    let lowered = line.to_lowercase();
    markers.iter().any(|m| lowered.contains(&m.to_lowercase()))
}

/// Splits a comma-separated data line into an ordered set: trimmed, non-empty,
/// duplicates removed keeping the first occurrence.
fn split_list(line: &str) -> Vec<String> {
    let mut items: Vec<String> = Vec::new();
    for item in line.split(',').map(str::trim) {
        if !item.is_empty() && !items.iter().any(|existing| existing == item) {
            items.push(item.to_string());
        }
    }
    items
}

/// Cursor over the trimmed, non-empty lines of the input.
struct Lines<'a> {
    lines: Vec<&'a str>,
    pos: usize,
}

impl<'a> Lines<'a> {
    fn new(input: &'a str) -> Self {
        Self {
            lines: input
                .lines()
                .map(str::trim)
                .filter(|l| !l.is_empty())
                .collect(),
            pos: 0,
        }
    }

    fn peek(&self) -> Option<&'a str> {
        self.lines.get(self.pos).copied()
    }

    fn advance(&mut self) {
        self.pos += 1;
    }

    fn next(&mut self) -> Option<&'a str> {
        let line = self.peek();
        if line.is_some() {
            self.pos += 1;
        }
        line
    }
}
