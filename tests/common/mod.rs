//! Shared test doubles: scripted pickers, static scene graphs, and a
//! hand-driven fetcher.
#![allow(dead_code)]

use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::rc::Rc;

use futures::channel::oneshot;
use futures::future::{FutureExt, LocalBoxFuture};
use machina::entity::{EntityId, SceneGraph};
use machina::error::LoadError;
use machina::loader::Fetcher;
use machina::machine::Services;
use machina::picking::{PickHit, Picker};
use smallvec::{smallvec, SmallVec};

/// Picker returning a programmable target, recording how it was queried.
pub struct ScriptedPicker {
    target: Cell<Option<EntityId>>,
    pub pick_calls: Cell<usize>,
    pub pixel_calls: Cell<usize>,
    pub last_coords: Cell<Option<(f32, f32)>>,
}

impl ScriptedPicker {
    pub fn new() -> Rc<Self> {
        Rc::new(Self {
            target: Cell::new(None),
            pick_calls: Cell::new(0),
            pixel_calls: Cell::new(0),
            last_coords: Cell::new(None),
        })
    }

    /// Sets the entity every subsequent pick resolves to.
    pub fn set_target(&self, target: Option<EntityId>) {
        self.target.set(target);
    }
}

impl Picker for ScriptedPicker {
    fn pick(&self, x: f32, y: f32) -> SmallVec<[PickHit; 8]> {
        self.pick_calls.set(self.pick_calls.get() + 1);
        self.last_coords.set(Some((x, y)));
        match self.target.get() {
            Some(entity) => smallvec![PickHit { entity, distance: 0.0 }],
            None => smallvec![],
        }
    }

    fn pick_pixel(&self, x: f32, y: f32) -> Option<EntityId> {
        self.pixel_calls.set(self.pixel_calls.get() + 1);
        self.last_coords.set(Some((x, y)));
        self.target.get()
    }
}

/// Scene graph backed by an explicit child → parent table.
#[derive(Default)]
pub struct StaticScene {
    parents: HashMap<EntityId, EntityId>,
}

impl StaticScene {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_parent(mut self, child: EntityId, parent: EntityId) -> Self {
        self.parents.insert(child, parent);
        self
    }
}

impl SceneGraph for StaticScene {
    fn parent(&self, entity: EntityId) -> Option<EntityId> {
        self.parents.get(&entity).copied()
    }
}

/// Services around a scripted picker and a flat scene.
pub fn scripted_services(picker: Rc<ScriptedPicker>, scene: StaticScene) -> Services {
    Services::new(picker, Rc::new(scene))
}

/// Services for tests that never pick.
pub fn null_services() -> Services {
    Services::new(ScriptedPicker::new(), Rc::new(StaticScene::new()))
}

/// Fetcher whose responses are delivered by hand from the test body, so the
/// in-flight window is observable.
#[derive(Default)]
pub struct ManualFetcher {
    pub fetch_count: Cell<usize>,
    pending: RefCell<HashMap<String, Vec<oneshot::Sender<Result<Vec<u8>, LoadError>>>>>,
}

impl ManualFetcher {
    pub fn new() -> Rc<Self> {
        Rc::new(Self::default())
    }

    /// Resolves every outstanding fetch for `url` with `bytes`.
    pub fn resolve(&self, url: &str, bytes: &[u8]) {
        for sender in self.pending.borrow_mut().remove(url).unwrap_or_default() {
            let _ = sender.send(Ok(bytes.to_vec()));
        }
    }

    /// Fails every outstanding fetch for `url`.
    pub fn reject(&self, url: &str, message: &str) {
        for sender in self.pending.borrow_mut().remove(url).unwrap_or_default() {
            let _ = sender.send(Err(LoadError::Request {
                path: url.to_string(),
                message: message.to_string(),
            }));
        }
    }

    /// URLs with at least one unanswered fetch.
    pub fn outstanding(&self) -> Vec<String> {
        self.pending.borrow().keys().cloned().collect()
    }
}

impl Fetcher for ManualFetcher {
    fn fetch(&self, url: &str) -> LocalBoxFuture<'static, Result<Vec<u8>, LoadError>> {
        self.fetch_count.set(self.fetch_count.get() + 1);
        let (sender, receiver) = oneshot::channel();
        self.pending.borrow_mut().entry(url.to_string()).or_default().push(sender);
        let url = url.to_string();
        async move {
            receiver.await.unwrap_or_else(|_| {
                Err(LoadError::Request {
                    path: url,
                    message: "fetch dropped without a response".to_string(),
                })
            })
        }
        .boxed_local()
    }
}
