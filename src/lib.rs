//! Machina: a finite-state-machine scripting runtime for game entities.
//!
//! A [`machine::Machine`] drives one entity's behavior through states built
//! from [`machine::action::Action`]s, bridged to the host's input surface by
//! [`input::InputHub`] and fed data by the [`loader::Loader`].

pub mod actions;
pub mod entity;
pub mod error;
pub mod events;
pub mod input;
pub mod loader;
pub mod machine;
pub mod picking;
