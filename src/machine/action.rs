//! The action contract and the static descriptor schema consumed by editors.

use strum_macros::Display;

use crate::machine::MachineContext;

/// A single unit of behavior owned by a state.
///
/// Lifecycle: `setup` runs exactly once on state entry; `run` runs every tick
/// while the state is active when [`Action::every_frame`] is true, otherwise
/// once immediately after `setup`; `exit` runs exactly once on state
/// departure, including machine teardown.
///
/// `exit` must be safe to call when `setup` never ran; implementations detach
/// only what they actually attached ([`crate::input::ListenerSet`] gives this
/// for free).
pub trait Action {
    /// The static editor-facing descriptor for this action kind.
    fn descriptor(&self) -> &'static ActionDescriptor;

    /// Whether `run` is invoked every tick (true) or once on entry (false).
    fn every_frame(&self) -> bool {
        false
    }

    fn setup(&mut self, _ctx: &mut MachineContext<'_>) {}

    fn run(&mut self, ctx: &mut MachineContext<'_>);

    fn exit(&mut self, _ctx: &mut MachineContext<'_>) {}
}

/// Editor category of an action kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
#[strum(serialize_all = "lowercase")]
pub enum ActionCategory {
    Controls,
    Logic,
    Variables,
}

/// Value type of a declared parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
#[strum(serialize_all = "lowercase")]
pub enum ParameterKind {
    String,
    Float,
    Bool,
    Entity,
    Vec3,
}

/// Optional UI control hint for a parameter.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ControlHint {
    Dropdown,
    Slider { min: f64, max: f64 },
    Checkbox,
}

/// Default value of a parameter, expressible in const context.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ParamDefault {
    Str(&'static str),
    Float(f64),
    Bool(bool),
}

/// One typed parameter in an action descriptor.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ParameterSpec {
    pub name: &'static str,
    pub key: &'static str,
    pub kind: ParameterKind,
    pub description: &'static str,
    pub control: Option<ControlHint>,
    pub default: Option<ParamDefault>,
    /// For dropdown controls, the allowed values.
    pub options: &'static [&'static str],
}

impl ParameterSpec {
    /// Whether `value` falls inside this parameter's slider range. Parameters
    /// without a slider hint accept any value.
    pub fn accepts_float(&self, value: f64) -> bool {
        match self.control {
            Some(ControlHint::Slider { min, max }) => (min..=max).contains(&value),
            _ => true,
        }
    }

    pub fn float_default(&self) -> Option<f64> {
        match self.default {
            Some(ParamDefault::Float(f)) => Some(f),
            _ => None,
        }
    }

    pub fn str_default(&self) -> Option<&'static str> {
        match self.default {
            Some(ParamDefault::Str(s)) => Some(s),
            _ => None,
        }
    }
}

/// One named transition slot an action may fire.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TransitionSpec {
    pub key: &'static str,
    pub name: &'static str,
    pub description: &'static str,
}

/// Static metadata for an action kind: display information, typed parameters,
/// and the transition slots it may fire. Consumed by external tooling; the
/// runtime itself only needs parameter values resolved before setup.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ActionDescriptor {
    pub name: &'static str,
    pub category: ActionCategory,
    pub description: &'static str,
    pub can_transition: bool,
    pub parameters: &'static [ParameterSpec],
    pub transitions: &'static [TransitionSpec],
}

impl ActionDescriptor {
    pub fn parameter(&self, key: &str) -> Option<&'static ParameterSpec> {
        self.parameters.iter().find(|p| p.key == key)
    }
}
