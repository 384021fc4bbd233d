//! This module provides the parser for the flat-record machine dialect, utilizing the
//! `pest` crate. Each non-comment line is one `from,input,to[,output]` record; the
//! quintuple sets are accumulated from the fields actually observed.

use crate::types::{MachineDefinition, MooreError, Transition};
use pest::Parser as PestParser;
use pest_derive::Parser as PestParser;

/// Derives a `PestParser` for the flat-record grammar defined in `records.pest`.
#[derive(PestParser)]
#[grammar = "records.pest"]
pub struct RecordParser;

/// Parses the flat-record dialect into an unvalidated [`MachineDefinition`].
///
/// `states`, `inputs` and `outputs` accumulate in order of first occurrence, so their
/// iteration order reflects the source text, not any alphabetical ordering. The `from`
/// field of the first valid record becomes the initial state. An `output` field, when
/// present, records the output of the record's destination state. Records with fewer
/// than three non-empty leading fields are silently skipped. The dialect has no
/// final-state notation, so `final_states` is always empty.
///
/// Input with no valid records at all yields an empty definition, which the validator
/// then rejects for having no states.
pub fn parse(input: &str) -> Result<MachineDefinition, MooreError> {
    let machine = RecordParser::parse(Rule::machine, input)
        .map_err(|e| MooreError::Record(Box::new(e)))?
        .next()
        .expect("grammar yields exactly one machine");

    let mut definition = MachineDefinition::default();

    for record in machine.into_inner() {
        if record.as_rule() != Rule::record {
            continue;
        }

        let fields: Vec<&str> = record.into_inner().map(|f| f.as_str().trim()).collect();
        if fields.len() < 3 {
            continue;
        }

        let (from, input, to) = (fields[0], fields[1], fields[2]);
        if from.is_empty() || input.is_empty() || to.is_empty() {
            continue;
        }

        push_unique(&mut definition.states, from);
        push_unique(&mut definition.states, to);
        push_unique(&mut definition.inputs, input);

        let output = fields.get(3).copied().unwrap_or("");
        if !output.is_empty() {
            push_unique(&mut definition.outputs, output);
            definition
                .output_function
                .insert(to.to_string(), output.to_string());
        }

        // First valid record defines the initial state.
        if definition.initial_state.is_empty() {
            definition.initial_state = from.to_string();
        }

        definition.transitions.push(Transition::new(from, input, to));
    }

    Ok(definition)
}

/// Appends `item` to the ordered set `set` unless it is already present.
fn push_unique(set: &mut Vec<String>, item: &str) {
    if !set.iter().any(|existing| existing == item) {
        set.push(item.to_string());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_turnstile() {
        let input = "\
# Turnstile, coin unlocks, push relocks
Locked,coin,Unlocked,U
Locked,push,Locked,L
Unlocked,push,Locked,L
Unlocked,coin,Unlocked,U
";
        let definition = parse(input).unwrap();

        assert_eq!(definition.states, vec!["Locked", "Unlocked"]);
        assert_eq!(definition.inputs, vec!["coin", "push"]);
        assert_eq!(definition.outputs, vec!["U", "L"]);
        assert_eq!(definition.initial_state, "Locked");
        assert_eq!(definition.transitions.len(), 4);
        assert_eq!(definition.output_of("Locked"), Some("L"));
        assert_eq!(definition.output_of("Unlocked"), Some("U"));
        assert!(definition.final_states.is_empty());
    }

    #[test]
    fn test_parse_insertion_order_not_alphabetical() {
        let input = "z,1,y\ny,0,a\n";
        let definition = parse(input).unwrap();
        assert_eq!(definition.states, vec!["z", "y", "a"]);
        assert_eq!(definition.inputs, vec!["1", "0"]);
        assert_eq!(definition.initial_state, "z");
    }

    #[test]
    fn test_parse_comments_skipped() {
        let input = "# hash comment\n// slash comment\nA,x,B,out\n";
        let definition = parse(input).unwrap();
        assert_eq!(definition.states, vec!["A", "B"]);
        assert_eq!(definition.transitions.len(), 1);
    }

    #[test]
    fn test_parse_short_records_silently_skipped() {
        let input = "A,x\njustonefield\nA,x,B,out\n";
        let definition = parse(input).unwrap();
        assert_eq!(definition.transitions.len(), 1);
        assert_eq!(definition.states, vec!["A", "B"]);
    }

    #[test]
    fn test_parse_output_optional() {
        let input = "A,x,B\nB,x,A,done\n";
        let definition = parse(input).unwrap();

        // B was reached without an output; only A has one.
        assert_eq!(definition.output_of("B"), None);
        assert_eq!(definition.output_of("A"), Some("done"));
        assert_eq!(definition.outputs, vec!["done"]);
    }

    #[test]
    fn test_parse_empty_input_yields_empty_definition() {
        let definition = parse("").unwrap();
        assert!(definition.states.is_empty());
        assert!(definition.inputs.is_empty());
        assert!(definition.outputs.is_empty());
        assert!(definition.initial_state.is_empty());
        assert!(definition.transitions.is_empty());
    }

    #[test]
    fn test_parse_comment_only_input() {
        let definition = parse("# nothing here\n\n// still nothing\n").unwrap();
        assert!(definition.states.is_empty());
        assert!(definition.transitions.is_empty());
    }

    #[test]
    fn test_parse_trims_field_whitespace() {
        let input = "  A , x ,  B , out \n";
        let definition = parse(input).unwrap();
        assert_eq!(definition.states, vec!["A", "B"]);
        assert_eq!(definition.output_of("B"), Some("out"));
    }
}
