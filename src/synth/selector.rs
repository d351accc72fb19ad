//! Selector state machine generation
//!
//! Every pattern becomes a state reachable from any other state when the
//! `Pattern` parameter equals the pattern's index in the document.

use crate::models::{
    state_name, transition_name, Condition, ConditionMode, ParameterType, SelectorMachine,
    SelectorParameter, SelectorState, SelectorTransition, Vec2, SELECTOR_LAYER, SELECTOR_NAME,
    SELECTOR_PARAMETER,
};

/// Center of the state stack in the graph view.
pub const LAYOUT_CENTER: Vec2 = Vec2::new(408.0, 96.0);

/// Vertical distance between stacked states.
pub const LAYOUT_SPACING: f32 = 48.0;

/// Graph position of state `index` out of `count`.
pub fn state_position(index: usize, count: usize) -> Vec2 {
    let top = LAYOUT_CENTER.y - LAYOUT_SPACING * 0.5 * count as f32;
    Vec2::new(LAYOUT_CENTER.x, top + LAYOUT_SPACING * index as f32)
}

/// Build the selector from `(pattern name, timeline name)` pairs in document
/// order. A pattern without a timeline still gets its state so the indices
/// of the patterns after it do not shift.
pub fn synthesize_selector<'a, I>(patterns: I) -> SelectorMachine
where
    I: IntoIterator<Item = (&'a str, Option<&'a str>)>,
{
    let patterns: Vec<_> = patterns.into_iter().collect();
    let count = patterns.len();

    let mut states = Vec::with_capacity(count);
    let mut transitions = Vec::with_capacity(count);

    for (index, (pattern, motion)) in patterns.into_iter().enumerate() {
        let state = state_name(pattern);
        transitions.push(SelectorTransition {
            name: transition_name(pattern),
            destination: state.clone(),
            conditions: vec![Condition {
                mode: ConditionMode::Equals,
                parameter: SELECTOR_PARAMETER.to_string(),
                threshold: index as i32,
            }],
            duration: 0.0,
            offset: 0.0,
            exit_time: 1.0,
            has_exit_time: true,
            can_transition_to_self: false,
        });
        states.push(SelectorState {
            name: state,
            motion: motion.map(str::to_string),
            position: state_position(index, count),
        });
    }

    SelectorMachine {
        name: SELECTOR_NAME.to_string(),
        layer: SELECTOR_LAYER.to_string(),
        parameters: vec![SelectorParameter {
            name: SELECTOR_PARAMETER.to_string(),
            kind: ParameterType::Int,
            default: 0,
        }],
        states,
        any_state_transitions: transitions,
    }
}
