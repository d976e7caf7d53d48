//! Built-in action kinds.
//!
//! These three cover the action archetypes: a stateful edge-detecting input
//! action that fires transitions (hover enter), a stateless event bridge
//! (WASD), and a pure per-tick side effect on the variable store
//! (add variable). New kinds register through
//! [`crate::machine::registry::register`].

pub mod add_variable;
pub mod hover_enter;
pub mod wasd;

pub use add_variable::AddVariableAction;
pub use hover_enter::HoverEnterAction;
pub use wasd::WasdInputAction;
