//! Per-tick addition onto a machine variable.

use tracing::warn;

use crate::error::ConfigError;
use crate::machine::action::{
    Action, ActionCategory, ActionDescriptor, ControlHint, ParamDefault, ParameterKind, ParameterSpec,
};
use crate::machine::definition::ActionDef;
use crate::machine::value::Operand;
use crate::machine::MachineContext;

pub static DESCRIPTOR: ActionDescriptor = ActionDescriptor {
    name: "Add Variable",
    category: ActionCategory::Variables,
    description: "Adds an amount to a machine variable every tick",
    can_transition: false,
    parameters: &[
        ParameterSpec {
            name: "Variable",
            key: "variable",
            kind: ParameterKind::String,
            description: "Name of the variable to add to",
            control: None,
            default: None,
            options: &[],
        },
        ParameterSpec {
            name: "Amount",
            key: "amount",
            kind: ParameterKind::Float,
            description: "Amount to add each tick, or the name of a variable holding it",
            control: Some(ControlHint::Slider { min: 0.0, max: 10.0 }),
            default: Some(ParamDefault::Float(1.0)),
            options: &[],
        },
    ],
    transitions: &[],
};

/// Adds a resolved amount to a named variable every tick. A pure
/// side-effecting leaf: it never requests a transition. The amount may be a
/// literal or a reference to another machine variable.
pub struct AddVariableAction {
    variable: String,
    amount: Operand,
}

impl AddVariableAction {
    pub const KIND: &'static str = "addVariable";

    pub fn new(variable: impl Into<String>, amount: Operand) -> Self {
        Self {
            variable: variable.into(),
            amount,
        }
    }

    pub fn from_def(def: &ActionDef) -> Result<Box<dyn Action>, ConfigError> {
        let variable = def
            .options
            .get("variable")
            .and_then(|v| v.as_str())
            .ok_or_else(|| ConfigError::MissingParameter {
                kind: Self::KIND.to_string(),
                key: "variable".to_string(),
            })?
            .to_string();

        let spec = DESCRIPTOR.parameter("amount");
        let fallback = Operand::Literal(spec.and_then(ParameterSpec::float_default).unwrap_or(1.0));
        let amount = match def.options.get("amount").and_then(Operand::from_json) {
            None => fallback,
            Some(Operand::Literal(value)) if spec.is_some_and(|s| !s.accepts_float(value)) => {
                // Malformed parameter policy: keep the declared default.
                warn!(amount = value, "amount outside slider range, using default");
                fallback
            }
            Some(operand) => operand,
        };

        Ok(Box::new(Self::new(variable, amount)))
    }
}

impl Action for AddVariableAction {
    fn descriptor(&self) -> &'static ActionDescriptor {
        &DESCRIPTOR
    }

    fn every_frame(&self) -> bool {
        true
    }

    fn run(&mut self, ctx: &mut MachineContext<'_>) {
        let Some(amount) = ctx.resolve(&self.amount) else {
            warn!(amount = ?self.amount, "amount did not resolve to a number, skipping");
            return;
        };
        ctx.apply_to_variable(&self.variable, |value| value + amount);
    }
}
