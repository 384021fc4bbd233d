//! This module serializes a machine definition back into the quintuple text dialect.
//! The emitted text is not guaranteed byte-identical to any original input, but it
//! always re-parses to an equivalent definition.

use crate::types::MachineDefinition;

/// Renders `definition` in the quintuple dialect accepted by [`crate::parser::parse`].
///
/// One transition-table row is written per state in display order:
/// `state,output,dest-for-each-input`, with an empty field where a state has no
/// transition for an input. States missing from the output function are written with
/// an empty output field; such definitions fail validation either way.
pub fn export(definition: &MachineDefinition) -> String {
    let mut text = String::from("QUINTUPLA MAQUINA DE MOORE\n\n");

    text.push_str("Conjunto de Estados Q:\n");
    text.push_str(&definition.states.join(","));
    text.push_str("\n\n");

    text.push_str("Alfabeto de Entrada Σ:\n");
    text.push_str(&definition.inputs.join(","));
    text.push_str("\n\n");

    text.push_str("Alfabeto de Salida Γ:\n");
    text.push_str(&definition.outputs.join(","));
    text.push_str("\n\n");

    text.push_str("Estado Inicial q0:\n");
    text.push_str(&definition.initial_state);
    text.push_str("\n\n");

    text.push_str("Tabla de Transición:\n");
    for state in &definition.states {
        let mut row = vec![
            state.clone(),
            definition.output_of(state).unwrap_or_default().to_string(),
        ];
        for input in &definition.inputs {
            row.push(
                definition
                    .transition_from(state, input)
                    .map(|t| t.to.clone())
                    .unwrap_or_default(),
            );
        }
        text.push_str(&row.join(","));
        text.push('\n');
    }

    text
}
