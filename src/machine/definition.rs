//! Serde model of the persisted machine definition, plus validation and
//! construction.
//!
//! Definitions arrive as JSON (the loader's `machine` category). Building a
//! [`Machine`] is split into a parse step, a validation pass that surfaces
//! every dangling reference before anything runs, and a build step that
//! instantiates actions through the registry.

use std::collections::HashMap;

use serde::Deserialize;
use tracing::warn;

use crate::entity::EntityId;
use crate::error::ConfigError;
use crate::machine::action::{ControlHint, ParameterKind};
use crate::machine::registry;
use crate::machine::value::Value;
use crate::machine::{Machine, Services, State, StateId};

/// One action entry in a state: the registry kind, an optional stable id, and
/// kind-specific options.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActionDef {
    pub kind: String,
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub options: serde_json::Value,
}

/// One state: an ordered action list and a transition table.
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct StateDef {
    #[serde(default)]
    pub actions: Vec<ActionDef>,
    #[serde(default)]
    pub transitions: HashMap<String, StateId>,
}

/// A serialized machine: states keyed by id, the initial state, and initial
/// variable values.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MachineDef {
    #[serde(default)]
    pub id: String,
    pub initial_state: StateId,
    #[serde(default)]
    pub vars: HashMap<String, serde_json::Value>,
    pub states: HashMap<StateId, StateDef>,
}

/// Parses a machine definition from JSON text.
pub fn parse(json: &str) -> Result<MachineDef, ConfigError> {
    serde_json::from_str(json).map_err(|e| ConfigError::Malformed(e.to_string()))
}

/// Checks a definition for configuration errors before anything runs: the
/// initial state must exist, every transition target must resolve, every
/// action kind must be registered, and provided options must type-check
/// against the kind's descriptor.
pub fn validate(def: &MachineDef) -> Result<(), ConfigError> {
    if !def.states.contains_key(&def.initial_state) {
        return Err(ConfigError::UnknownState(def.initial_state.clone()));
    }

    for (state_id, state) in &def.states {
        for (key, target) in &state.transitions {
            if !def.states.contains_key(target) {
                return Err(ConfigError::DanglingTransition {
                    state: state_id.clone(),
                    key: key.clone(),
                    target: target.clone(),
                });
            }
        }

        for action in &state.actions {
            let Some(descriptor) = registry::descriptor(&action.kind) else {
                return Err(ConfigError::UnknownActionKind(action.kind.clone()));
            };
            check_options(descriptor.parameters, &action.options)?;
        }
    }

    Ok(())
}

/// Type-checks the options an action definition provides against the
/// parameters its descriptor declares. Options not named by the descriptor
/// pass through untouched; constructors decide what to do with them.
fn check_options(
    parameters: &[crate::machine::action::ParameterSpec],
    options: &serde_json::Value,
) -> Result<(), ConfigError> {
    let Some(map) = options.as_object() else {
        // Null (absent) options are fine; every parameter falls back to its default.
        return if options.is_null() {
            Ok(())
        } else {
            Err(ConfigError::Malformed("action options must be an object".to_string()))
        };
    };

    for spec in parameters {
        let Some(value) = map.get(spec.key) else { continue };
        let matches = match spec.kind {
            ParameterKind::String => value.is_string(),
            ParameterKind::Float => value.is_number() || value.is_string(),
            ParameterKind::Bool => value.is_boolean(),
            ParameterKind::Entity => value.is_u64(),
            ParameterKind::Vec3 => value.as_array().is_some_and(|a| a.len() == 3),
        };
        if !matches {
            return Err(ConfigError::ParameterType {
                key: spec.key.to_string(),
                expected: spec.kind,
            });
        }
        if let (Some(ControlHint::Slider { min, max }), Some(number)) = (spec.control, value.as_f64()) {
            if !(min..=max).contains(&number) {
                return Err(ConfigError::ParameterOutOfRange {
                    key: spec.key.to_string(),
                    value: number,
                    min,
                    max,
                });
            }
        }
    }

    Ok(())
}

/// Validates `def` and constructs the machine, instantiating every action
/// through the registry.
pub fn build(def: &MachineDef, owner: EntityId, services: Services) -> Result<Machine, ConfigError> {
    validate(def)?;

    let mut machine = Machine::new(def.id.clone(), owner, services);
    for (id, state_def) in &def.states {
        let mut state = State::new(id.clone());
        for action_def in &state_def.actions {
            state.add_action(registry::build(action_def)?);
        }
        for (key, target) in &state_def.transitions {
            state.set_transition(key.clone(), target.clone());
        }
        machine.add_state(state);
    }
    machine.set_initial_state(def.initial_state.clone());

    for (name, json) in &def.vars {
        match Value::from_json(json) {
            Some(value) => machine.set_variable(name.clone(), value),
            None => warn!(variable = %name, "initial value has no store representation, skipping"),
        }
    }

    Ok(machine)
}
