//! Hover detection with edge-triggered transitions.

use std::cell::RefCell;
use std::rc::Rc;

use tracing::warn;

use crate::entity::{EntityId, SceneGraph};
use crate::error::ConfigError;
use crate::events::{EventKind, InputEvent};
use crate::input::ListenerSet;
use crate::machine::action::{
    Action, ActionCategory, ActionDescriptor, ControlHint, ParamDefault, ParameterKind, ParameterSpec, TransitionSpec,
};
use crate::machine::definition::ActionDef;
use crate::machine::MachineContext;
use crate::picking::PickAccuracy;

pub static DESCRIPTOR: ActionDescriptor = ActionDescriptor {
    name: "Hover Enter",
    category: ActionCategory::Controls,
    description: "Listens for the pointer entering the owning entity and performs a transition",
    can_transition: true,
    parameters: &[ParameterSpec {
        name: "Accuracy",
        key: "accuracy",
        kind: ParameterKind::String,
        description: "Hover accuracy/performance selection",
        control: Some(ControlHint::Dropdown),
        default: Some(ParamDefault::Str("fast")),
        options: &["fast", "slow"],
    }],
    transitions: &[TransitionSpec {
        key: "enter",
        name: "On Enter",
        description: "State to transition to when the pointer enters the entity",
    }],
};

const ENTER: &str = "enter";

/// Pointer-observation state shared with the attached move listeners.
///
/// Pointer events may fire many times between ticks; their effect is buffered
/// in `updated` and consumed once per tick by `run`, which keeps the
/// transition-request budget at one per tick.
#[derive(Default)]
struct HoverState {
    /// Suppresses firing on the very first event after setup, when the prior
    /// pointer target is undefined.
    first: bool,
    updated: bool,
    current: Option<EntityId>,
}

impl HoverState {
    fn reset(&mut self) {
        self.first = true;
        self.updated = false;
        self.current = None;
    }

    /// Feeds one pick result. "Entered" is edge-triggered: it fires when the
    /// candidate's ancestor chain contains the owner while the previously
    /// recorded target was not already the owner, never while hovering
    /// continuously.
    fn observe(&mut self, owner: EntityId, target: Option<EntityId>, scene: &dyn SceneGraph) {
        if self.first {
            self.first = false;
            self.current = target;
            return;
        }

        let Some(entity) = target else {
            self.current = None;
            return;
        };

        if self.current != Some(owner) && scene.chain_contains(entity, owner) {
            self.updated = true;
        }

        self.current = Some(entity);
    }

    fn take_updated(&mut self) -> bool {
        std::mem::take(&mut self.updated)
    }
}

/// Watches pointer movement, picks against the scene, and requests the
/// `enter` transition when the pointer first lands on the owning entity (or
/// one of its descendants).
pub struct HoverEnterAction {
    accuracy: PickAccuracy,
    shared: Rc<RefCell<HoverState>>,
    listeners: ListenerSet,
}

impl HoverEnterAction {
    pub const KIND: &'static str = "hoverEnter";

    pub fn new(accuracy: PickAccuracy) -> Self {
        Self {
            accuracy,
            shared: Rc::new(RefCell::new(HoverState::default())),
            listeners: ListenerSet::new(),
        }
    }

    pub fn from_def(def: &ActionDef) -> Result<Box<dyn Action>, ConfigError> {
        let accuracy = match def.options.get("accuracy").and_then(|v| v.as_str()) {
            None => PickAccuracy::default(),
            Some(text) => text.parse().unwrap_or_else(|_| {
                warn!(value = text, "unknown hover accuracy, using default");
                PickAccuracy::default()
            }),
        };
        Ok(Box::new(Self::new(accuracy)))
    }

    fn make_move_listener(&self, ctx: &MachineContext<'_>) -> impl FnMut(&InputEvent) + 'static {
        let shared = Rc::clone(&self.shared);
        let picker = Rc::clone(&ctx.services().picker);
        let scene = Rc::clone(&ctx.services().scene);
        let viewport = Rc::clone(&ctx.services().viewport);
        let accuracy = self.accuracy;
        let owner = ctx.owner();
        move |event| {
            let Some((x, y)) = event.surface_position(&viewport.get()) else {
                return;
            };
            let target = accuracy.resolve(picker.as_ref(), x, y);
            shared.borrow_mut().observe(owner, target, scene.as_ref());
        }
    }
}

impl Action for HoverEnterAction {
    fn descriptor(&self) -> &'static ActionDescriptor {
        &DESCRIPTOR
    }

    fn every_frame(&self) -> bool {
        true
    }

    fn setup(&mut self, ctx: &mut MachineContext<'_>) {
        // Re-entry behaves identically to first entry.
        self.listeners.detach_all();
        self.shared.borrow_mut().reset();

        let hub = ctx.services().input.clone();
        self.listeners.attach(&hub, EventKind::MouseMove, self.make_move_listener(ctx));
        self.listeners.attach(&hub, EventKind::TouchMove, self.make_move_listener(ctx));
    }

    fn run(&mut self, ctx: &mut MachineContext<'_>) {
        if self.shared.borrow_mut().take_updated() {
            ctx.send(ENTER);
        }
    }

    fn exit(&mut self, _ctx: &mut MachineContext<'_>) {
        self.listeners.detach_all();
    }
}
