//! Values stored in a machine's variable store, and operand resolution.

use std::collections::HashMap;

use crate::entity::EntityId;

/// A value in the machine-scoped variable store.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Number(f64),
    Bool(bool),
    Str(String),
    Entity(EntityId),
    Vec3([f32; 3]),
}

impl Value {
    /// Converts a JSON value from a machine definition. Objects and non-vec3
    /// arrays have no store representation.
    pub fn from_json(value: &serde_json::Value) -> Option<Value> {
        match value {
            serde_json::Value::Bool(b) => Some(Value::Bool(*b)),
            serde_json::Value::Number(n) => n.as_f64().map(Value::Number),
            serde_json::Value::String(s) => Some(Value::Str(s.clone())),
            serde_json::Value::Array(items) if items.len() == 3 => {
                let mut vec = [0.0f32; 3];
                for (slot, item) in vec.iter_mut().zip(items) {
                    *slot = item.as_f64()? as f32;
                }
                Some(Value::Vec3(vec))
            }
            _ => None,
        }
    }

    pub fn as_number(&self) -> Option<f64> {
        match self {
            Value::Number(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Str(s) => Some(s),
            _ => None,
        }
    }
}

/// A numeric amount that is either a literal or a reference to another
/// machine variable, resolved at use time against the variable store.
#[derive(Debug, Clone, PartialEq)]
pub enum Operand {
    Literal(f64),
    Variable(String),
}

impl Operand {
    /// Reads an operand from an action's options JSON: numbers are literals,
    /// strings name a variable.
    pub fn from_json(value: &serde_json::Value) -> Option<Operand> {
        match value {
            serde_json::Value::Number(n) => n.as_f64().map(Operand::Literal),
            serde_json::Value::String(s) => Some(Operand::Variable(s.clone())),
            _ => None,
        }
    }

    /// Resolves to a number, or `None` when a referenced variable is missing
    /// or non-numeric.
    pub fn resolve(&self, vars: &HashMap<String, Value>) -> Option<f64> {
        match self {
            Operand::Literal(n) => Some(*n),
            Operand::Variable(name) => vars.get(name)?.as_number(),
        }
    }
}
