//! This module provides structural validation for parsed machine definitions.
//! Validation runs once at the trust boundary, immediately after parsing; downstream
//! components consume only validated definitions and never re-check these invariants.

use crate::types::MachineDefinition;
use std::collections::HashSet;

/// Checks the structural invariants of `definition`, accumulating every applicable
/// defect as a human-readable message. An empty result means the definition is valid.
///
/// Checks run in order without failing fast: non-empty state set, initial state
/// membership, per-transition membership (reported with the 1-based transition index),
/// totality of the output function over the output alphabet, and duplicate
/// `(from, input)` pairs. Duplicates would otherwise be silently shadowed by the
/// engine's first-match lookup, so they are treated as defects here.
pub fn validate(definition: &MachineDefinition) -> Vec<String> {
    let mut defects = Vec::new();

    check_states(definition, &mut defects);
    check_initial_state(definition, &mut defects);
    check_transitions(definition, &mut defects);
    check_output_function(definition, &mut defects);
    check_duplicate_pairs(definition, &mut defects);

    defects
}

fn check_states(definition: &MachineDefinition, defects: &mut Vec<String>) {
    if definition.states.is_empty() {
        defects.push("the machine must have at least one state".to_string());
    }
}

fn check_initial_state(definition: &MachineDefinition, defects: &mut Vec<String>) {
    if definition.initial_state.is_empty() {
        defects.push("an initial state must be specified".to_string());
    } else if !definition.has_state(&definition.initial_state) {
        defects.push(format!(
            "initial state \"{}\" is not one of the defined states",
            definition.initial_state
        ));
    }
}

fn check_transitions(definition: &MachineDefinition, defects: &mut Vec<String>) {
    for (index, transition) in definition.transitions.iter().enumerate() {
        let index = index + 1;
        if !definition.has_state(&transition.from) {
            defects.push(format!(
                "transition {index}: source state \"{}\" is not defined",
                transition.from
            ));
        }
        if !definition.has_state(&transition.to) {
            defects.push(format!(
                "transition {index}: destination state \"{}\" is not defined",
                transition.to
            ));
        }
        if !definition.has_input(&transition.input) {
            defects.push(format!(
                "transition {index}: input symbol \"{}\" is not in the input alphabet",
                transition.input
            ));
        }
    }
}

fn check_output_function(definition: &MachineDefinition, defects: &mut Vec<String>) {
    for state in &definition.states {
        match definition.output_of(state) {
            None => defects.push(format!("state \"{state}\" has no output defined")),
            Some(output) if !definition.outputs.iter().any(|o| o == output) => {
                defects.push(format!(
                    "output \"{output}\" of state \"{state}\" is not in the output alphabet"
                ));
            }
            Some(_) => {}
        }
    }
}

fn check_duplicate_pairs(definition: &MachineDefinition, defects: &mut Vec<String>) {
    let mut seen = HashSet::new();
    for (index, transition) in definition.transitions.iter().enumerate() {
        if !seen.insert((transition.from.as_str(), transition.input.as_str())) {
            defects.push(format!(
                "transition {}: duplicate pair ({}, {}) shadowed by an earlier transition",
                index + 1,
                transition.from,
                transition.input
            ));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Transition;
    use std::collections::HashMap;

    fn valid_definition() -> MachineDefinition {
        MachineDefinition {
            states: vec!["S0".into(), "S1".into()],
            inputs: vec!["0".into(), "1".into()],
            outputs: vec!["A".into(), "B".into()],
            initial_state: "S0".into(),
            final_states: vec![],
            transitions: vec![
                Transition::new("S0", "0", "S1"),
                Transition::new("S0", "1", "S0"),
                Transition::new("S1", "0", "S0"),
                Transition::new("S1", "1", "S1"),
            ],
            output_function: HashMap::from([
                ("S0".to_string(), "A".to_string()),
                ("S1".to_string(), "B".to_string()),
            ]),
        }
    }

    #[test]
    fn test_valid_definition_has_no_defects() {
        assert!(validate(&valid_definition()).is_empty());
    }

    #[test]
    fn test_empty_definition_reports_no_states() {
        let defects = validate(&MachineDefinition::default());
        assert!(defects
            .iter()
            .any(|d| d.contains("at least one state")));
    }

    #[test]
    fn test_unknown_initial_state() {
        let mut definition = valid_definition();
        definition.initial_state = "S9".into();
        let defects = validate(&definition);
        assert_eq!(defects.len(), 1);
        assert!(defects[0].contains("S9"));
    }

    #[test]
    fn test_transition_defects_carry_one_based_index() {
        let mut definition = valid_definition();
        definition.transitions[2] = Transition::new("S9", "9", "S8");
        let defects = validate(&definition);

        assert_eq!(defects.len(), 3);
        assert!(defects.iter().all(|d| d.starts_with("transition 3:")));
    }

    #[test]
    fn test_missing_output_names_state() {
        let mut definition = valid_definition();
        definition.output_function.remove("S1");
        let defects = validate(&definition);
        assert_eq!(defects.len(), 1);
        assert!(defects[0].contains("\"S1\""));
        assert!(defects[0].contains("no output"));
    }

    #[test]
    fn test_output_outside_alphabet() {
        let mut definition = valid_definition();
        definition
            .output_function
            .insert("S1".to_string(), "Z".to_string());
        let defects = validate(&definition);
        assert_eq!(defects.len(), 1);
        assert!(defects[0].contains("\"Z\""));
    }

    #[test]
    fn test_duplicate_pair_is_a_defect() {
        let mut definition = valid_definition();
        definition
            .transitions
            .push(Transition::new("S0", "0", "S0"));
        let defects = validate(&definition);
        assert_eq!(defects.len(), 1);
        assert!(defects[0].contains("duplicate pair (S0, 0)"));
    }

    #[test]
    fn test_defects_accumulate() {
        let mut definition = valid_definition();
        definition.initial_state = "S9".into();
        definition.output_function.remove("S0");
        definition.transitions[0] = Transition::new("S0", "9", "S1");
        let defects = validate(&definition);
        assert_eq!(defects.len(), 3);
    }
}
