//! Interactive-ish demo: builds a hover machine from a JSON definition, feeds
//! it synthetic pointer traffic, and ticks it while logging transitions.
//!
//! Run with `RUST_LOG=debug cargo run --bin machine_demo` to watch the
//! machine move between states.

use std::rc::Rc;

use anyhow::Context;
use machina::entity::{EntityId, SceneGraph};
use machina::error::MachinaResult;
use machina::events::InputEvent;
use machina::machine::{definition, Machine, Services};
use machina::picking::{PickHit, Picker};
use smallvec::{smallvec, SmallVec};
use tracing::info;
use tracing_subscriber::EnvFilter;

const DEFINITION: &str = r#"{
    "id": "hover-demo",
    "initialState": "idle",
    "vars": { "dwell": 0 },
    "states": {
        "idle": {
            "actions": [
                { "kind": "hoverEnter", "id": "hover", "options": { "accuracy": "fast" } }
            ],
            "transitions": { "enter": "hovering" }
        },
        "hovering": {
            "actions": [
                { "kind": "addVariable", "id": "dwell", "options": { "variable": "dwell", "amount": 1 } }
            ],
            "transitions": {}
        }
    }
}"#;

/// Everything right of x=400 counts as the button entity.
struct HalfPlanePicker;

impl Picker for HalfPlanePicker {
    fn pick(&self, x: f32, _y: f32) -> SmallVec<[PickHit; 8]> {
        if x >= 400.0 {
            smallvec![PickHit {
                entity: EntityId(1),
                distance: 0.0
            }]
        } else {
            smallvec![]
        }
    }

    fn pick_pixel(&self, x: f32, y: f32) -> Option<EntityId> {
        self.pick(x, y).first().map(|hit| hit.entity)
    }
}

struct FlatScene;

impl SceneGraph for FlatScene {
    fn parent(&self, _entity: EntityId) -> Option<EntityId> {
        None
    }
}

fn build_machine(services: Services) -> MachinaResult<Machine> {
    let definition = definition::parse(DEFINITION)?;
    Ok(definition::build(&definition, EntityId(1), services)?)
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let services = Services::new(Rc::new(HalfPlanePicker), Rc::new(FlatScene));
    let input = services.input.clone();
    let mut machine = build_machine(services).context("demo machine failed to build")?;

    machine.start();
    info!(state = machine.current_state(), "machine started");

    // Sweep the pointer from the left edge onto the button.
    for (tick, x) in [100.0f32, 250.0, 380.0, 450.0, 520.0].into_iter().enumerate() {
        input.emit(&InputEvent::MouseMove { page_x: x, page_y: 300.0 });
        machine.update();
        info!(tick, pointer_x = x, state = machine.current_state(), "tick");
    }

    // Let the dwell counter accumulate for a few ticks.
    for _ in 0..3 {
        machine.update();
    }
    info!(dwell = ?machine.variable("dwell"), "hover dwell after 3 ticks");

    machine.stop();
    info!("machine stopped");
    Ok(())
}
