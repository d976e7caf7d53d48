//! The state machine runtime: states, actions, transitions, variables.
//!
//! One [`Machine`] drives one entity's behavior. Each engine tick the machine
//! runs the active state's per-frame actions in declared order, then resolves
//! at most one transition from the single pending slot. Entering a state sets
//! up each action (attaching listeners); leaving it tears every action down
//! before the next state attaches anything, so old and new listeners are
//! never simultaneously live.

use std::cell::Cell;
use std::collections::HashMap;
use std::rc::Rc;

use tracing::{debug, warn};

use crate::entity::{EntityId, SceneGraph};
use crate::events::Viewport;
use crate::input::{InputHub, LogicBus};
use crate::machine::action::Action;
use crate::machine::value::{Operand, Value};
use crate::picking::Picker;

pub mod action;
pub mod definition;
pub mod registry;
pub mod value;

/// Identifier of a state within one machine.
pub type StateId = String;

/// Symbolic key naming a transition slot.
pub type TransitionKey = String;

/// Shared handles to the host collaborators actions reach during their
/// lifecycle: the input surface, the logic output bus, picking queries, the
/// scene hierarchy, and the render target's viewport rect.
#[derive(Clone)]
pub struct Services {
    pub input: InputHub,
    pub logic: LogicBus,
    pub picker: Rc<dyn Picker>,
    pub scene: Rc<dyn SceneGraph>,
    pub viewport: Rc<Cell<Viewport>>,
}

impl Services {
    pub fn new(picker: Rc<dyn Picker>, scene: Rc<dyn SceneGraph>) -> Self {
        Self {
            input: InputHub::new(),
            logic: LogicBus::new(),
            picker,
            scene,
            viewport: Rc::new(Cell::new(Viewport::default())),
        }
    }
}

/// Per-state mapping from transition keys to target state ids.
#[derive(Debug, Clone, Default)]
pub struct TransitionTable {
    targets: HashMap<TransitionKey, StateId>,
}

impl TransitionTable {
    pub fn set(&mut self, key: impl Into<TransitionKey>, target: impl Into<StateId>) {
        self.targets.insert(key.into(), target.into());
    }

    pub fn target(&self, key: &str) -> Option<&StateId> {
        self.targets.get(key)
    }

    pub fn len(&self) -> usize {
        self.targets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.targets.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&TransitionKey, &StateId)> {
        self.targets.iter()
    }
}

/// A named collection of actions plus its transition table. Action order is
/// execution order and is significant for side-effecting actions.
pub struct State {
    id: StateId,
    actions: Vec<Box<dyn Action>>,
    transitions: TransitionTable,
}

impl State {
    pub fn new(id: impl Into<StateId>) -> Self {
        Self {
            id: id.into(),
            actions: Vec::new(),
            transitions: TransitionTable::default(),
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn add_action(&mut self, action: Box<dyn Action>) {
        self.actions.push(action);
    }

    pub fn with_action(mut self, action: Box<dyn Action>) -> Self {
        self.add_action(action);
        self
    }

    pub fn set_transition(&mut self, key: impl Into<TransitionKey>, target: impl Into<StateId>) {
        self.transitions.set(key, target);
    }

    pub fn with_transition(mut self, key: impl Into<TransitionKey>, target: impl Into<StateId>) -> Self {
        self.set_transition(key, target);
        self
    }

    pub fn transitions(&self) -> &TransitionTable {
        &self.transitions
    }

    pub fn action_count(&self) -> usize {
        self.actions.len()
    }
}

/// The view of the machine an action sees during `setup`/`run`/`exit`:
/// transition requests, the variable store, the owning entity, and the
/// service handles. Actions never own or borrow the machine itself.
pub struct MachineContext<'a> {
    owner: EntityId,
    services: &'a Services,
    vars: &'a mut HashMap<String, Value>,
    pending: &'a mut Option<TransitionKey>,
}

impl MachineContext<'_> {
    /// The entity this machine animates.
    pub fn owner(&self) -> EntityId {
        self.owner
    }

    pub fn services(&self) -> &Services {
        self.services
    }

    /// Requests a transition. At most one transition resolves per tick; a
    /// second request in the same tick displaces the first (last-write-wins,
    /// a documented simplification rather than a priority scheme).
    pub fn send(&mut self, key: impl Into<TransitionKey>) {
        let key = key.into();
        if let Some(previous) = self.pending.replace(key) {
            debug!(displaced = %previous, "pending transition overwritten in same tick");
        }
    }

    pub fn value(&self, name: &str) -> Option<&Value> {
        self.vars.get(name)
    }

    pub fn set_value(&mut self, name: impl Into<String>, value: Value) {
        self.vars.insert(name.into(), value);
    }

    /// Resolves a literal-or-variable operand against the variable store.
    pub fn resolve(&self, operand: &Operand) -> Option<f64> {
        operand.resolve(self.vars)
    }

    /// Read-modify-writes the named numeric variable. Sequential action
    /// execution makes the update atomic with respect to every other action
    /// in the same tick.
    pub fn apply_to_variable(&mut self, name: &str, transform: impl FnOnce(f64) -> f64) {
        match self.vars.get_mut(name) {
            Some(Value::Number(n)) => *n = transform(*n),
            Some(other) => warn!(variable = name, value = ?other, "variable is not numeric, ignoring update"),
            None => warn!(variable = name, "variable does not exist, ignoring update"),
        }
    }
}

/// The runtime driving one entity's current state tick-by-tick.
pub struct Machine {
    id: String,
    owner: EntityId,
    services: Services,
    states: HashMap<StateId, State>,
    initial: Option<StateId>,
    current: Option<StateId>,
    pending: Option<TransitionKey>,
    vars: HashMap<String, Value>,
}

impl Machine {
    pub fn new(id: impl Into<String>, owner: EntityId, services: Services) -> Self {
        Self {
            id: id.into(),
            owner,
            services,
            states: HashMap::new(),
            initial: None,
            current: None,
            pending: None,
            vars: HashMap::new(),
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn owner(&self) -> EntityId {
        self.owner
    }

    pub fn services(&self) -> &Services {
        &self.services
    }

    /// Adds a state. The first state added becomes the initial state unless
    /// [`Machine::set_initial_state`] overrides it.
    pub fn add_state(&mut self, state: State) {
        if self.initial.is_none() {
            self.initial = Some(state.id.clone());
        }
        if self.states.insert(state.id.clone(), state).is_some() {
            warn!(machine = %self.id, "state id redefined, replacing previous state");
        }
    }

    pub fn set_initial_state(&mut self, id: impl Into<StateId>) {
        self.initial = Some(id.into());
    }

    pub fn state(&self, id: &str) -> Option<&State> {
        self.states.get(id)
    }

    pub fn current_state(&self) -> Option<&str> {
        self.current.as_deref()
    }

    pub fn is_running(&self) -> bool {
        self.current.is_some()
    }

    pub fn variable(&self, name: &str) -> Option<&Value> {
        self.vars.get(name)
    }

    pub fn set_variable(&mut self, name: impl Into<String>, value: Value) {
        self.vars.insert(name.into(), value);
    }

    /// Host-side transition request, with the same single-slot semantics as
    /// requests made by actions.
    pub fn send(&mut self, key: impl Into<TransitionKey>) {
        let key = key.into();
        if let Some(previous) = self.pending.replace(key) {
            debug!(machine = %self.id, displaced = %previous, "pending transition overwritten");
        }
    }

    /// Enters the initial state. Does nothing if already running.
    pub fn start(&mut self) {
        if self.current.is_some() {
            warn!(machine = %self.id, "start called while already running");
            return;
        }
        let Some(initial) = self.initial.clone() else {
            warn!(machine = %self.id, "start called with no states");
            return;
        };
        if !self.states.contains_key(&initial) {
            warn!(machine = %self.id, state = %initial, "initial state does not exist");
            return;
        }
        debug!(machine = %self.id, state = %initial, "machine started");
        self.enter_state(initial);
    }

    /// Tears the machine down: exits the current state with no subsequent
    /// setup and drops any pending transition.
    pub fn stop(&mut self) {
        if let Some(current) = self.current.take() {
            debug!(machine = %self.id, state = %current, "machine stopped");
            self.exit_state(&current);
        }
        self.pending = None;
    }

    /// One engine tick: runs every per-frame action of the active state in
    /// declared order, then resolves at most one transition.
    pub fn update(&mut self) {
        let Some(current) = self.current.clone() else { return };

        {
            let Machine {
                states,
                vars,
                pending,
                services,
                owner,
                ..
            } = self;
            if let Some(state) = states.get_mut(&current) {
                let mut ctx = MachineContext {
                    owner: *owner,
                    services: &*services,
                    vars,
                    pending,
                };
                for action in state.actions.iter_mut() {
                    if action.every_frame() {
                        action.run(&mut ctx);
                    }
                }
            }
        }

        if let Some(key) = self.pending.take() {
            self.resolve_transition(&current, &key);
        }
    }

    fn resolve_transition(&mut self, from: &str, key: &str) {
        let Some(target) = self
            .states
            .get(from)
            .and_then(|state| state.transitions.target(key))
            .cloned()
        else {
            warn!(machine = %self.id, state = %from, key = %key, "transition key not mapped in current state, staying");
            return;
        };
        if !self.states.contains_key(&target) {
            warn!(machine = %self.id, state = %from, key = %key, target = %target, "transition targets unknown state, staying");
            return;
        }

        debug!(machine = %self.id, from = %from, to = %target, key = %key, "state transition");
        self.exit_state(from);
        self.enter_state(target);
    }

    /// Runs `exit` on every action of `id` in declared order. Always invoked
    /// before any new state's setup, so listener lifetimes never overlap.
    fn exit_state(&mut self, id: &str) {
        let Machine {
            states,
            vars,
            pending,
            services,
            owner,
            ..
        } = self;
        if let Some(state) = states.get_mut(id) {
            let mut ctx = MachineContext {
                owner: *owner,
                services: &*services,
                vars,
                pending,
            };
            for action in state.actions.iter_mut() {
                action.exit(&mut ctx);
            }
        }
    }

    /// Runs `setup` on every action of `id` in declared order; run-once
    /// actions execute immediately after their own setup. Transition requests
    /// made here stay pending until the end of the next tick.
    fn enter_state(&mut self, id: StateId) {
        self.current = Some(id.clone());
        let Machine {
            states,
            vars,
            pending,
            services,
            owner,
            ..
        } = self;
        if let Some(state) = states.get_mut(&id) {
            let mut ctx = MachineContext {
                owner: *owner,
                services: &*services,
                vars,
                pending,
            };
            for action in state.actions.iter_mut() {
                action.setup(&mut ctx);
                if !action.every_frame() {
                    action.run(&mut ctx);
                }
            }
        }
    }
}
