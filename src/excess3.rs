//! This module implements the closed-form variant engine: a Moore machine converting a
//! 4-bit BCD digit to its Excess-3 code, computed inline via carry arithmetic instead
//! of a transition table. It demonstrates an alternative state-encoding strategy over
//! the same engine contract as the table-driven [`crate::simulator::Simulator`].
//!
//! State is the pair `(carry, position)` plus a final flag. Input bits are fed least
//! significant first; the per-position constant `k(p)` contributes the binary value 3
//! (bits 1, 1, 0, 0), so the serial sum is the digit plus three.

use crate::simulator::{
    HistoryEntry, MooreEngine, NullObserver, Rejection, SimulationObserver, StepResult,
    TransitionEvent,
};
use crate::types::{MachineDefinition, Transition};

/// The distinguished end-of-word symbol that moves the adder into a final state.
pub const END_OF_WORD: &str = "#";
/// The "no output" symbol emitted by states that produce no sum bit.
pub const NO_OUTPUT: &str = "⊥";

/// The closed-form BCD to Excess-3 adder.
///
/// Satisfies the same externally observable contract as the table-driven engine
/// (current state and output, history, transition events, reset), so a consumer
/// cannot distinguish which engine it is driving.
pub struct Excess3Adder {
    carry: u8,
    position: u8,
    is_final: bool,
    is_complete: bool,
    state_label: String,
    current_output: String,
    history: Vec<HistoryEntry>,
    last_notified: Option<(String, String)>,
}

impl Default for Excess3Adder {
    fn default() -> Self {
        Self::new()
    }
}

impl Excess3Adder {
    pub fn new() -> Self {
        let mut adder = Self {
            carry: 0,
            position: 0,
            is_final: false,
            is_complete: false,
            state_label: String::new(),
            current_output: String::new(),
            history: Vec::new(),
            last_notified: None,
        };
        adder.reset();
        adder
    }

    pub fn current_state(&self) -> &str {
        &self.state_label
    }

    pub fn current_output(&self) -> &str {
        &self.current_output
    }

    pub fn is_complete(&self) -> bool {
        self.is_complete
    }

    pub fn history(&self) -> &[HistoryEntry] {
        &self.history
    }

    /// Returns the adder to the initial `(carry 0, position 0)` state with a fresh
    /// seed history entry.
    pub fn reset(&mut self) {
        self.carry = 0;
        self.position = 0;
        self.is_final = false;
        self.is_complete = false;
        self.state_label = interior_label(0, 0);
        self.current_output = NO_OUTPUT.to_string();
        self.history = vec![HistoryEntry {
            state: self.state_label.clone(),
            input: None,
            output: self.current_output.clone(),
        }];
        self.last_notified = None;
    }

    pub fn step(&mut self, symbol: &str) -> StepResult {
        self.step_with(symbol, &mut NullObserver)
    }

    /// Consumes one symbol: a bit `0`/`1`, or [`END_OF_WORD`].
    ///
    /// For a bit `x` with constant `k = 1` iff `position < 2`: sum bit
    /// `s = x XOR k XOR carry`, next carry is the majority of `(x, k, carry)`, and
    /// the position saturates at 2. The end marker moves to `F1` or `F0` by carry,
    /// emitting one extra `1` only when the carry is set; the final state then
    /// ignores all further input.
    pub fn step_with(
        &mut self,
        symbol: &str,
        observer: &mut dyn SimulationObserver,
    ) -> StepResult {
        if self.is_complete {
            return StepResult::Rejected(Rejection::Complete);
        }

        if symbol == END_OF_WORD {
            return StepResult::Applied(self.finish(observer));
        }

        let x = match symbol {
            "0" => 0u8,
            "1" => 1u8,
            _ => {
                return StepResult::Rejected(Rejection::NoTransition {
                    state: self.state_label.clone(),
                    input: symbol.to_string(),
                })
            }
        };

        let k = constant_bit(self.position);
        let sum = x ^ k ^ self.carry;
        let next_carry = (x & k) | (x & self.carry) | (k & self.carry);
        let next_position = (self.position + 1).min(2);

        let event = TransitionEvent {
            from: self.state_label.clone(),
            to: interior_label(next_carry, next_position),
            input: symbol.to_string(),
            output: sum.to_string(),
        };
        observer.on_transition(&event);

        self.carry = next_carry;
        self.position = next_position;
        self.state_label = event.to.clone();
        self.current_output = event.output.clone();
        self.history.push(HistoryEntry {
            state: event.to.clone(),
            input: Some(symbol.to_string()),
            output: event.output.clone(),
        });
        self.notify_state(observer);

        StepResult::Applied(event)
    }

    /// Checks that every symbol of a candidate sequence is a bit or the end marker,
    /// without executing anything.
    pub fn is_valid_sequence<'a, I>(&self, symbols: I) -> bool
    where
        I: IntoIterator<Item = &'a str>,
    {
        let mut any = false;
        for symbol in symbols {
            if !matches!(symbol, "0" | "1" | END_OF_WORD) {
                return false;
            }
            any = true;
        }
        any
    }

    /// The sum bits emitted so far, least significant first, excluding the
    /// no-output marker.
    pub fn output_bits(&self) -> String {
        collect_output_bits(&self.history)
    }

    fn finish(&mut self, observer: &mut dyn SimulationObserver) -> TransitionEvent {
        let to = final_label(self.carry);
        let output = if self.carry == 1 {
            "1".to_string()
        } else {
            NO_OUTPUT.to_string()
        };

        let event = TransitionEvent {
            from: self.state_label.clone(),
            to: to.clone(),
            input: END_OF_WORD.to_string(),
            output: output.clone(),
        };
        observer.on_transition(&event);

        self.is_final = true;
        self.is_complete = true;
        self.state_label = to.clone();
        self.current_output = output.clone();
        self.history.push(HistoryEntry {
            state: to,
            input: Some(END_OF_WORD.to_string()),
            output,
        });
        self.notify_state(observer);

        event
    }

    fn notify_state(&mut self, observer: &mut dyn SimulationObserver) {
        let pair = (self.state_label.clone(), self.current_output.clone());
        if self.last_notified.as_ref() != Some(&pair) {
            observer.on_state_change(&pair.0, &pair.1);
            self.last_notified = Some(pair);
        }
    }
}

impl MooreEngine for Excess3Adder {
    fn current_state(&self) -> &str {
        self.current_state()
    }

    fn current_output(&self) -> &str {
        self.current_output()
    }

    fn is_complete(&self) -> bool {
        self.is_complete()
    }

    fn history(&self) -> &[HistoryEntry] {
        self.history()
    }

    fn reset(&mut self) {
        Excess3Adder::reset(self);
    }

    fn step_with(&mut self, symbol: &str, observer: &mut dyn SimulationObserver) -> StepResult {
        Excess3Adder::step_with(self, symbol, observer)
    }
}

/// `k(p)`: the bits of the constant 3, least significant first.
fn constant_bit(position: u8) -> u8 {
    if position < 2 {
        1
    } else {
        0
    }
}

fn interior_label(carry: u8, position: u8) -> String {
    format!("S{carry},{position}")
}

fn final_label(carry: u8) -> String {
    if carry == 1 {
        "F1".to_string()
    } else {
        "F0".to_string()
    }
}

/// Filters the sum bits out of a history, dropping seed and no-output entries.
pub fn collect_output_bits(history: &[HistoryEntry]) -> String {
    history
        .iter()
        .filter(|entry| entry.output == "0" || entry.output == "1")
        .map(|entry| entry.output.clone())
        .collect()
}

/// Builds the table-driven Moore machine equivalent to the closed-form adder.
///
/// The closed-form state `(carry, position)` alone cannot serve as a Moore state set:
/// once the constant bit equals the carry, two different input bits lead to the same
/// `(carry, position)` pair while emitting different sum bits. The table therefore
/// splits each interior state by its emitted bit, keeping the output a function of
/// the state. State names: `q0` (seed, no output yet), `q{carry}{position}{sum}`,
/// and the finals `F0`/`F1`.
pub fn table_definition() -> MachineDefinition {
    let mut definition = MachineDefinition {
        states: vec!["q0".to_string()],
        inputs: vec!["0".into(), "1".into(), END_OF_WORD.into()],
        outputs: vec!["0".into(), "1".into(), NO_OUTPUT.into()],
        initial_state: "q0".to_string(),
        final_states: vec!["F0".into(), "F1".into()],
        ..MachineDefinition::default()
    };
    definition
        .output_function
        .insert("q0".into(), NO_OUTPUT.into());

    let interior = |carry: u8, position: u8, sum: u8| format!("q{carry}{position}{sum}");

    for carry in 0..=1u8 {
        for position in 1..=2u8 {
            for sum in 0..=1u8 {
                let state = interior(carry, position, sum);
                definition.states.push(state.clone());
                definition
                    .output_function
                    .insert(state, sum.to_string());
            }
        }
    }
    for state in ["F0", "F1"] {
        definition.states.push(state.to_string());
    }
    definition.output_function.insert(
        "F0".into(),
        NO_OUTPUT.into(),
    );
    definition.output_function.insert("F1".into(), "1".into());

    // Bit transitions out of the seed and every interior state.
    let mut add_bit_transitions = |from: &str, carry: u8, position: u8| {
        for x in 0..=1u8 {
            let k = constant_bit(position);
            let sum = x ^ k ^ carry;
            let next_carry = (x & k) | (x & carry) | (k & carry);
            let next_position = (position + 1).min(2);
            definition.transitions.push(Transition::new(
                from,
                x.to_string(),
                interior(next_carry, next_position, sum),
            ));
        }
        definition
            .transitions
            .push(Transition::new(from, END_OF_WORD, final_label(carry)));
    };

    add_bit_transitions("q0", 0, 0);
    for carry in 0..=1u8 {
        for position in 1..=2u8 {
            for sum in 0..=1u8 {
                add_bit_transitions(&interior(carry, position, sum), carry, position);
            }
        }
    }

    definition
}
