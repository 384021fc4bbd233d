//! This module defines the table-driven simulation engine for Moore machines. The
//! engine owns a validated [`MachineDefinition`], advances one input symbol at a time,
//! records execution history, and notifies an observer about state changes and applied
//! transitions. Paced batch execution is modeled as a cooperative, cancellable run
//! token rather than background timers.

use crate::types::{MachineDefinition, MooreError};
use crate::validator::validate;
use serde::{Deserialize, Serialize};
use std::thread;
use std::time::Duration;

/// One row of the execution history.
///
/// The seed entry created at reset has no input; every subsequent entry records the
/// symbol that was consumed to enter its state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub state: String,
    pub input: Option<String>,
    pub output: String,
}

/// Describes the most recently applied transition. Ephemeral: consumers use it for
/// highlighting and treat it as expired after a presentation delay of their choosing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransitionEvent {
    pub from: String,
    pub to: String,
    pub input: String,
    pub output: String,
}

/// Receives simulation events from an engine.
///
/// `on_state_change` fires whenever the externally observable `(state, output)` pair
/// changes, de-duplicated so the identical pair is never reported twice in a row.
/// `on_transition` fires once per successfully applied step.
pub trait SimulationObserver {
    fn on_state_change(&mut self, _state: &str, _output: &str) {}
    fn on_transition(&mut self, _event: &TransitionEvent) {}
}

/// An observer that ignores every event.
pub struct NullObserver;

impl SimulationObserver for NullObserver {}

/// The outcome of a single step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StepResult {
    /// The step was applied; the event describes the transition taken.
    Applied(TransitionEvent),
    /// The step was refused and the engine state is unchanged. A normal outcome,
    /// not an error.
    Rejected(Rejection),
}

impl StepResult {
    pub fn is_applied(&self) -> bool {
        matches!(self, StepResult::Applied(_))
    }
}

/// Why a step was refused.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Rejection {
    /// The simulation has already completed.
    Complete,
    /// No transition matches the current state and the given symbol.
    NoTransition { state: String, input: String },
}

/// The outcome of advancing a paced run by one step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunStatus {
    /// One symbol was consumed; more remain.
    Applied(TransitionEvent),
    /// The last symbol was consumed; the run is over and the engine is complete.
    Finished,
    /// A symbol was refused; the run stops here, leaving the rest of the sequence
    /// unconsumed, and the engine is complete.
    Stopped(Rejection),
    /// The engine was reset or a newer run was started; this token is stale and the
    /// engine state was left untouched.
    Superseded,
}

/// A cancellable token for a paced batch execution.
///
/// The token captures the engine's generation counter at creation; any later reset or
/// newly started run bumps the counter, so a stale token can never corrupt state that
/// a newer run owns.
#[derive(Debug)]
pub struct SequenceRun {
    symbols: Vec<String>,
    cursor: usize,
    delay: Duration,
    generation: u64,
}

impl SequenceRun {
    /// The delay the driver should wait between consecutive steps.
    pub fn delay(&self) -> Duration {
        self.delay
    }

    /// Symbols not yet consumed by this run.
    pub fn remaining(&self) -> &[String] {
        &self.symbols[self.cursor.min(self.symbols.len())..]
    }
}

/// The common externally observable contract of a Moore engine.
///
/// Both the table-driven [`Simulator`] and the closed-form
/// [`crate::excess3::Excess3Adder`] implement it, so a consumer cannot tell which
/// engine it is driving.
pub trait MooreEngine {
    fn current_state(&self) -> &str;
    fn current_output(&self) -> &str;
    fn is_complete(&self) -> bool;
    fn history(&self) -> &[HistoryEntry];
    fn reset(&mut self);
    fn step_with(&mut self, symbol: &str, observer: &mut dyn SimulationObserver) -> StepResult;
}

/// The table-driven simulation engine.
#[derive(Debug)]
pub struct Simulator {
    definition: MachineDefinition,
    current_state: String,
    current_output: String,
    history: Vec<HistoryEntry>,
    is_complete: bool,
    generation: u64,
    last_notified: Option<(String, String)>,
}

impl Simulator {
    /// Creates an engine for `definition`, refusing with the full defect list when
    /// the definition fails structural validation.
    pub fn new(definition: MachineDefinition) -> Result<Self, MooreError> {
        let defects = validate(&definition);
        if !defects.is_empty() {
            return Err(MooreError::Invalid(defects));
        }

        let mut simulator = Self {
            definition,
            current_state: String::new(),
            current_output: String::new(),
            history: Vec::new(),
            is_complete: false,
            generation: 0,
            last_notified: None,
        };
        simulator.reset();
        Ok(simulator)
    }

    /// The validated definition this engine runs.
    pub fn definition(&self) -> &MachineDefinition {
        &self.definition
    }

    pub fn current_state(&self) -> &str {
        &self.current_state
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

    /// Returns the engine to its initial configuration: current state and output from
    /// the initial state, a single seed history entry, completion cleared. Any pending
    /// paced run is superseded.
    pub fn reset(&mut self) {
        self.reset_with(&mut NullObserver);
    }

    /// Like [`Simulator::reset`], additionally notifying `observer` of the initial
    /// state pair.
    pub fn reset_with(&mut self, observer: &mut dyn SimulationObserver) {
        self.generation += 1;
        self.current_state = self.definition.initial_state.clone();
        self.current_output = self
            .definition
            .output_of(&self.current_state)
            .unwrap_or_default()
            .to_string();
        self.history = vec![HistoryEntry {
            state: self.current_state.clone(),
            input: None,
            output: self.current_output.clone(),
        }];
        self.is_complete = false;
        self.last_notified = None;
        self.notify_state(observer);
    }

    /// Consumes one input symbol.
    ///
    /// Takes the first transition matching `(current_state, symbol)` in table order;
    /// on a match the transition event is emitted, the state and output move to the
    /// destination, and a history entry is appended. Refused silently (state
    /// untouched) when the machine is complete or no transition matches.
    pub fn step(&mut self, symbol: &str) -> StepResult {
        self.step_with(symbol, &mut NullObserver)
    }

    /// Like [`Simulator::step`], notifying `observer` of the applied transition and
    /// any state change.
    pub fn step_with(
        &mut self,
        symbol: &str,
        observer: &mut dyn SimulationObserver,
    ) -> StepResult {
        if self.is_complete {
            return StepResult::Rejected(Rejection::Complete);
        }

        let transition = match self.definition.transition_from(&self.current_state, symbol) {
            Some(t) => t.clone(),
            None => {
                return StepResult::Rejected(Rejection::NoTransition {
                    state: self.current_state.clone(),
                    input: symbol.to_string(),
                })
            }
        };

        let output = self
            .definition
            .output_of(&transition.to)
            .unwrap_or_default()
            .to_string();

        let event = TransitionEvent {
            from: transition.from.clone(),
            to: transition.to.clone(),
            input: transition.input.clone(),
            output: output.clone(),
        };
        observer.on_transition(&event);

        self.current_state = transition.to.clone();
        self.current_output = output.clone();
        self.history.push(HistoryEntry {
            state: transition.to,
            input: Some(symbol.to_string()),
            output,
        });
        self.notify_state(observer);

        StepResult::Applied(event)
    }

    /// Checks that every symbol of a candidate sequence belongs to the input
    /// alphabet, without executing anything. Callers use this to disable run
    /// affordances before starting a run.
    pub fn is_valid_sequence<'a, I>(&self, symbols: I) -> bool
    where
        I: IntoIterator<Item = &'a str>,
    {
        let mut any = false;
        for symbol in symbols {
            if !self.definition.has_input(symbol) {
                return false;
            }
            any = true;
        }
        any
    }

    /// Starts a paced batch run over `symbols`, superseding any pending run.
    pub fn begin_run(&mut self, symbols: &[&str], delay: Duration) -> SequenceRun {
        self.generation += 1;
        SequenceRun {
            symbols: symbols.iter().map(|s| s.to_string()).collect(),
            cursor: 0,
            delay,
            generation: self.generation,
        }
    }

    /// Advances a paced run by exactly one step.
    ///
    /// Checks the run's liveness token first: a run superseded by a reset or a newer
    /// run returns [`RunStatus::Superseded`] without touching engine state. A refused
    /// symbol stops the run and marks the simulation complete, leaving the remainder
    /// of the sequence unconsumed; consuming the final symbol also completes it.
    pub fn advance(
        &mut self,
        run: &mut SequenceRun,
        observer: &mut dyn SimulationObserver,
    ) -> RunStatus {
        if run.generation != self.generation {
            return RunStatus::Superseded;
        }

        let Some(symbol) = run.symbols.get(run.cursor).cloned() else {
            self.is_complete = true;
            return RunStatus::Finished;
        };

        match self.step_with(&symbol, observer) {
            StepResult::Applied(event) => {
                run.cursor += 1;
                if run.cursor == run.symbols.len() {
                    self.is_complete = true;
                    RunStatus::Finished
                } else {
                    RunStatus::Applied(event)
                }
            }
            StepResult::Rejected(rejection) => {
                self.is_complete = true;
                RunStatus::Stopped(rejection)
            }
        }
    }

    /// Applies a whole sequence with `delay` between consecutive steps, so an
    /// observer can see each intermediate transition event. Stops at the first
    /// refused symbol; either way the simulation ends complete.
    ///
    /// Returns the number of symbols actually consumed.
    pub fn run_sequence(
        &mut self,
        symbols: &[&str],
        delay: Duration,
        observer: &mut dyn SimulationObserver,
    ) -> usize {
        let mut run = self.begin_run(symbols, delay);

        loop {
            match self.advance(&mut run, observer) {
                RunStatus::Applied(_) => {
                    if !delay.is_zero() {
                        thread::sleep(delay);
                    }
                }
                RunStatus::Finished | RunStatus::Stopped(_) | RunStatus::Superseded => {
                    return run.cursor
                }
            }
        }
    }

    fn notify_state(&mut self, observer: &mut dyn SimulationObserver) {
        let pair = (self.current_state.clone(), self.current_output.clone());
        if self.last_notified.as_ref() != Some(&pair) {
            observer.on_state_change(&pair.0, &pair.1);
            self.last_notified = Some(pair);
        }
    }
}

impl MooreEngine for Simulator {
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
        Simulator::reset(self);
    }

    fn step_with(&mut self, symbol: &str, observer: &mut dyn SimulationObserver) -> StepResult {
        Simulator::step_with(self, symbol, observer)
    }
}
