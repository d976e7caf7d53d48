//! Keyboard-to-logic-event bridge for the WASD cluster.

use phf::phf_map;

use crate::error::ConfigError;
use crate::events::{EventKind, InputEvent};
use crate::input::ListenerSet;
use crate::machine::action::{Action, ActionCategory, ActionDescriptor};
use crate::machine::definition::ActionDef;
use crate::machine::MachineContext;

// Built once at definition time, shared by every instance.
static DOWN_KEYS: phf::Map<char, &'static str> = phf_map! {
    'w' => "wDown",
    'a' => "aDown",
    's' => "sDown",
    'd' => "dDown",
};

static UP_KEYS: phf::Map<char, &'static str> = phf_map! {
    'w' => "wUp",
    'a' => "aUp",
    's' => "sUp",
    'd' => "dUp",
};

pub static DESCRIPTOR: ActionDescriptor = ActionDescriptor {
    name: "WASD Input",
    category: ActionCategory::Logic,
    description: "Maps W/A/S/D key presses and releases to named logic events",
    can_transition: false,
    parameters: &[],
    transitions: &[],
};

/// Bridges key events to the logic bus: each mapped key press or release
/// fires one named logic event; unmapped keys do nothing. Purely a bridge,
/// it holds no per-tick state and never requests a transition.
#[derive(Default)]
pub struct WasdInputAction {
    listeners: ListenerSet,
}

impl WasdInputAction {
    pub const KIND: &'static str = "wasdInput";

    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_def(_def: &ActionDef) -> Result<Box<dyn Action>, ConfigError> {
        Ok(Box::new(Self::new()))
    }
}

impl Action for WasdInputAction {
    fn descriptor(&self) -> &'static ActionDescriptor {
        &DESCRIPTOR
    }

    fn setup(&mut self, ctx: &mut MachineContext<'_>) {
        self.listeners.detach_all();
        let hub = ctx.services().input.clone();

        let logic = ctx.services().logic.clone();
        self.listeners.attach(&hub, EventKind::KeyDown, move |event| {
            if let InputEvent::KeyDown { key } = event {
                if let Some(&name) = DOWN_KEYS.get(&key.to_ascii_lowercase()) {
                    logic.fire(name);
                }
            }
        });

        let logic = ctx.services().logic.clone();
        self.listeners.attach(&hub, EventKind::KeyUp, move |event| {
            if let InputEvent::KeyUp { key } = event {
                if let Some(&name) = UP_KEYS.get(&key.to_ascii_lowercase()) {
                    logic.fire(name);
                }
            }
        });
    }

    fn run(&mut self, _ctx: &mut MachineContext<'_>) {}

    fn exit(&mut self, _ctx: &mut MachineContext<'_>) {
        self.listeners.detach_all();
    }
}
