//! This module implements the geometric layout generator: a pure function that assigns
//! 2-D coordinates and edge-routing hints to a machine definition, purely from its
//! topology. Layout never depends on simulation state and is regenerated wholesale
//! whenever the definition changes.

use crate::types::MachineDefinition;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::f64::consts::PI;

/// The canvas anchor the state circle is centered on.
pub const CENTER: Point = Point { x: 450.0, y: 275.0 };
/// Upper bound on the state-circle radius.
const MAX_RADIUS: f64 = 300.0;
/// Fixed curvature magnitude for all non-self-loop transitions.
const CURVE_STRENGTH: f64 = 40.0;

/// A 2-D canvas coordinate.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

/// The side of a state on which its self-loop is drawn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LoopDirection {
    Left,
    Right,
    Top,
    Bottom,
}

/// The direction a non-self-loop edge curves away from the straight line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CurveDirection {
    Up,
    Down,
    Left,
    Right,
}

/// A state as seen by a rendering surface.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VisualState {
    pub id: String,
    pub label: String,
    pub is_initial: bool,
    pub is_final: bool,
}

/// A transition as seen by a rendering surface, with its routing hints.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VisualTransition {
    pub from: String,
    pub to: String,
    pub input: String,
    /// The output of the destination state; in a Moore machine the emitted symbol
    /// depends on the state entered, not on the edge taken.
    pub output: Option<String>,
    pub self_loop: bool,
    pub loop_direction: Option<LoopDirection>,
    pub curve_direction: Option<CurveDirection>,
    pub curve_strength: f64,
}

/// The derived, disposable projection a rendering surface consumes.
///
/// A renderer may override positions in its own local copy while dragging;
/// that overlay is never merged back into the [`MachineDefinition`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VisualMachine {
    pub state_positions: HashMap<String, Point>,
    pub states: Vec<VisualState>,
    pub transitions: Vec<VisualTransition>,
}

/// Generates the visual projection of `definition`.
///
/// Deterministic and total: the same definition always yields the same coordinates
/// and routing hints, and no structurally-valid definition can make it fail,
/// including one with zero states.
pub fn layout(definition: &MachineDefinition) -> VisualMachine {
    let state_positions = generate_state_positions(&definition.states);

    let transitions = definition
        .transitions
        .iter()
        .map(|t| {
            let self_loop = t.is_self_loop();
            let from_pos = position_of(&state_positions, &t.from);
            let to_pos = position_of(&state_positions, &t.to);

            VisualTransition {
                from: t.from.clone(),
                to: t.to.clone(),
                input: t.input.clone(),
                output: definition.output_of(&t.to).map(str::to_string),
                self_loop,
                loop_direction: self_loop.then(|| loop_direction(from_pos)),
                curve_direction: (!self_loop).then(|| curve_direction(from_pos, to_pos)),
                curve_strength: if self_loop { 0.0 } else { CURVE_STRENGTH },
            }
        })
        .collect();

    let states = definition
        .states
        .iter()
        .map(|id| VisualState {
            id: id.clone(),
            label: id.clone(),
            is_initial: *id == definition.initial_state,
            is_final: definition.final_states.iter().any(|s| s == id),
        })
        .collect();

    VisualMachine {
        state_positions,
        states,
        transitions,
    }
}

/// Places states evenly on a circle around [`CENTER`], starting at the top and
/// proceeding clockwise in display order. A single state sits at the center itself.
fn generate_state_positions(states: &[String]) -> HashMap<String, Point> {
    let mut positions = HashMap::new();
    let count = states.len();

    if count <= 1 {
        if let Some(state) = states.first() {
            positions.insert(state.clone(), CENTER);
        }
        return positions;
    }

    // Radius grows with the state count up to a cap.
    let radius = MAX_RADIUS.min(100.0 + 20.0 * count as f64);

    for (index, state) in states.iter().enumerate() {
        let angle = 2.0 * PI * index as f64 / count as f64 - PI / 2.0;
        positions.insert(
            state.clone(),
            Point {
                x: CENTER.x + radius * angle.cos(),
                y: CENTER.y + radius * angle.sin(),
            },
        );
    }

    positions
}

fn position_of(positions: &HashMap<String, Point>, id: &str) -> Point {
    positions.get(id).copied().unwrap_or(CENTER)
}

/// Picks the self-loop side from the dominant axis of the state's offset from the
/// layout center, so loops point away from the middle of the diagram.
fn loop_direction(position: Point) -> LoopDirection {
    let dx = position.x - CENTER.x;
    let dy = position.y - CENTER.y;

    if dx.abs() > dy.abs() {
        if dx > 0.0 {
            LoopDirection::Right
        } else {
            LoopDirection::Left
        }
    } else if dy > 0.0 {
        LoopDirection::Bottom
    } else {
        LoopDirection::Top
    }
}

/// Picks the curve direction from the dominant axis between the endpoints:
/// horizontally dominant edges bow vertically and vice versa.
fn curve_direction(from: Point, to: Point) -> CurveDirection {
    let dx = to.x - from.x;
    let dy = to.y - from.y;

    if dx.abs() > dy.abs() {
        if dy > 0.0 {
            CurveDirection::Down
        } else {
            CurveDirection::Up
        }
    } else if dx > 0.0 {
        CurveDirection::Right
    } else {
        CurveDirection::Left
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Transition;
    use std::collections::HashMap as StdHashMap;

    fn definition_with_states(states: &[&str], transitions: Vec<Transition>) -> MachineDefinition {
        MachineDefinition {
            states: states.iter().map(|s| s.to_string()).collect(),
            inputs: vec!["0".into(), "1".into()],
            outputs: vec!["A".into()],
            initial_state: states.first().map(|s| s.to_string()).unwrap_or_default(),
            final_states: vec![],
            transitions,
            output_function: states
                .iter()
                .map(|s| (s.to_string(), "A".to_string()))
                .collect::<StdHashMap<_, _>>(),
        }
    }

    #[test]
    fn test_single_state_sits_at_center() {
        let visual = layout(&definition_with_states(&["S0"], vec![]));
        assert_eq!(visual.state_positions["S0"], CENTER);
    }

    #[test]
    fn test_zero_states_is_total() {
        let visual = layout(&MachineDefinition::default());
        assert!(visual.state_positions.is_empty());
        assert!(visual.states.is_empty());
        assert!(visual.transitions.is_empty());
    }

    #[test]
    fn test_first_state_starts_at_top() {
        let visual = layout(&definition_with_states(&["S0", "S1", "S2", "S3"], vec![]));
        let top = visual.state_positions["S0"];

        // angle -90 degrees: directly above the center at the computed radius
        let radius = 100.0 + 20.0 * 4.0;
        assert!((top.x - CENTER.x).abs() < 1e-9);
        assert!((top.y - (CENTER.y - radius)).abs() < 1e-9);
    }

    #[test]
    fn test_radius_is_capped() {
        let states: Vec<String> = (0..20).map(|i| format!("S{i}")).collect();
        let refs: Vec<&str> = states.iter().map(String::as_str).collect();
        let visual = layout(&definition_with_states(&refs, vec![]));

        let top = visual.state_positions["S0"];
        assert!((top.y - (CENTER.y - 300.0)).abs() < 1e-9);
    }

    #[test]
    fn test_layout_is_deterministic() {
        let definition = definition_with_states(
            &["S0", "S1", "S2"],
            vec![
                Transition::new("S0", "0", "S1"),
                Transition::new("S1", "1", "S1"),
                Transition::new("S2", "0", "S0"),
            ],
        );

        assert_eq!(layout(&definition), layout(&definition));
    }

    #[test]
    fn test_self_loop_direction_follows_offset() {
        // With four states the top one has a dominant negative y offset.
        let definition = definition_with_states(
            &["S0", "S1", "S2", "S3"],
            vec![
                Transition::new("S0", "0", "S0"),
                Transition::new("S1", "0", "S1"),
                Transition::new("S2", "0", "S2"),
                Transition::new("S3", "0", "S3"),
            ],
        );
        let visual = layout(&definition);

        let directions: Vec<Option<LoopDirection>> = visual
            .transitions
            .iter()
            .map(|t| t.loop_direction)
            .collect();
        assert_eq!(
            directions,
            vec![
                Some(LoopDirection::Top),
                Some(LoopDirection::Right),
                Some(LoopDirection::Bottom),
                Some(LoopDirection::Left),
            ]
        );
        assert!(visual.transitions.iter().all(|t| t.self_loop));
        assert!(visual
            .transitions
            .iter()
            .all(|t| t.curve_strength == 0.0 && t.curve_direction.is_none()));
    }

    #[test]
    fn test_curve_hints_for_normal_transitions() {
        // S0 top, S2 bottom: vertically dominant, so the edge curves sideways.
        let definition = definition_with_states(
            &["S0", "S1", "S2", "S3"],
            vec![
                Transition::new("S0", "0", "S2"),
                Transition::new("S2", "0", "S0"),
            ],
        );
        let visual = layout(&definition);

        // Both endpoints share an x coordinate, so dx is zero and both edges
        // fall into the `left` branch.
        assert_eq!(visual.transitions[0].curve_direction, Some(CurveDirection::Left));
        assert_eq!(visual.transitions[1].curve_direction, Some(CurveDirection::Left));
        assert!(visual
            .transitions
            .iter()
            .all(|t| t.curve_strength == 40.0 && t.loop_direction.is_none()));
    }

    #[test]
    fn test_visual_states_flag_initial_and_final() {
        let mut definition = definition_with_states(&["S0", "S1"], vec![]);
        definition.final_states.push("S1".into());
        let visual = layout(&definition);

        assert!(visual.states[0].is_initial);
        assert!(!visual.states[0].is_final);
        assert!(!visual.states[1].is_initial);
        assert!(visual.states[1].is_final);
    }

    #[test]
    fn test_visual_machine_serializes() {
        let definition = definition_with_states(&["S0"], vec![Transition::new("S0", "0", "S0")]);
        let json = serde_json::to_string(&layout(&definition)).unwrap();
        assert!(json.contains("\"state_positions\""));
        assert!(json.contains("\"self_loop\":true"));
    }
}
