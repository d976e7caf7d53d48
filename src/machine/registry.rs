//! Process-wide lookup table of action kinds.
//!
//! Machine definitions name actions by a kind string; the registry maps each
//! kind to its static descriptor and a constructor. Built-in kinds are
//! pre-registered; hosts register additional kinds at startup before loading
//! definitions.

use std::collections::HashMap;

use once_cell::sync::Lazy;
use parking_lot::RwLock;
use tracing::debug;

use crate::actions::{add_variable, hover_enter, wasd, AddVariableAction, HoverEnterAction, WasdInputAction};
use crate::error::ConfigError;
use crate::machine::action::{Action, ActionDescriptor};
use crate::machine::definition::ActionDef;

/// Constructor for one action kind: builds an instance from its definition's
/// resolved options.
pub type BuildFn = fn(&ActionDef) -> Result<Box<dyn Action>, ConfigError>;

/// One registered action kind.
#[derive(Clone, Copy)]
pub struct Registration {
    pub descriptor: &'static ActionDescriptor,
    pub build: BuildFn,
}

static REGISTRY: Lazy<RwLock<HashMap<&'static str, Registration>>> = Lazy::new(|| {
    let mut kinds: HashMap<&'static str, Registration> = HashMap::new();
    kinds.insert(
        HoverEnterAction::KIND,
        Registration {
            descriptor: &hover_enter::DESCRIPTOR,
            build: HoverEnterAction::from_def,
        },
    );
    kinds.insert(
        WasdInputAction::KIND,
        Registration {
            descriptor: &wasd::DESCRIPTOR,
            build: WasdInputAction::from_def,
        },
    );
    kinds.insert(
        AddVariableAction::KIND,
        Registration {
            descriptor: &add_variable::DESCRIPTOR,
            build: AddVariableAction::from_def,
        },
    );
    RwLock::new(kinds)
});

/// Registers an action kind, returning the registration it replaced, if any.
pub fn register(kind: &'static str, registration: Registration) -> Option<Registration> {
    debug!(kind, "registering action kind");
    REGISTRY.write().insert(kind, registration)
}

pub fn is_registered(kind: &str) -> bool {
    REGISTRY.read().contains_key(kind)
}

/// The static descriptor for `kind`, if registered.
pub fn descriptor(kind: &str) -> Option<&'static ActionDescriptor> {
    REGISTRY.read().get(kind).map(|r| r.descriptor)
}

/// Constructs an action instance from its definition.
pub fn build(def: &ActionDef) -> Result<Box<dyn Action>, ConfigError> {
    let registration = REGISTRY
        .read()
        .get(def.kind.as_str())
        .copied()
        .ok_or_else(|| ConfigError::UnknownActionKind(def.kind.clone()))?;
    (registration.build)(def)
}
