//! Asynchronous, cached, type-dispatching resource loader.
//!
//! Two tables back the loader: an in-flight table deduplicating concurrent
//! requests for the same path (everyone shares one future, one fetch), and a
//! completed-value cache serving later requests without any fetch. Loading a
//! bundle additionally warms the cache with every entry the bundle contains,
//! keyed by the entries' own paths.
//!
//! The loader never retries; a failed load rejects every sharing caller with
//! the same error and leaves both tables empty for that path.

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use futures::future::{FutureExt, LocalBoxFuture, Shared};
use phf::phf_map;
use strum_macros::Display;
use tracing::{debug, warn};

use crate::error::LoadError;

/// Content category a path dispatches to, derived from its file extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display)]
#[strum(serialize_all = "lowercase")]
pub enum Category {
    Text,
    Json,
    Image,
    Video,
    Audio,
    Binary,
    Bundle,
}

static EXTENSIONS: phf::Map<&'static str, Category> = phf_map! {
    // Shader / script sources load as plain text.
    "vert" => Category::Text,
    "frag" => Category::Text,
    // Engine config documents are all JSON.
    "json" => Category::Json,
    "shader" => Category::Json,
    "script" => Category::Json,
    "entity" => Category::Json,
    "material" => Category::Json,
    "scene" => Category::Json,
    "mesh" => Category::Json,
    "texture" => Category::Json,
    "skeleton" => Category::Json,
    "animation" => Category::Json,
    "clip" => Category::Json,
    "machine" => Category::Json,
    "sound" => Category::Json,
    "skybox" => Category::Json,
    "project" => Category::Json,
    "jpg" => Category::Image,
    "jpeg" => Category::Image,
    "png" => Category::Image,
    "gif" => Category::Image,
    "mp4" => Category::Video,
    "ogv" => Category::Video,
    "webm" => Category::Video,
    "mp3" => Category::Audio,
    "wav" => Category::Audio,
    "ogg" => Category::Audio,
    "dat" => Category::Binary,
    "bin" => Category::Binary,
    "bundle" => Category::Bundle,
};

impl Category {
    /// Dispatches a path to its category. The extension is read from the
    /// final path segment with any query string or fragment stripped;
    /// unknown extensions (and extensionless names) load as text.
    pub fn from_path(path: &str) -> Category {
        let trimmed = path.split(['?', '#']).next().unwrap_or(path);
        let name = trimmed.rsplit('/').next().unwrap_or(trimmed);
        let Some((_, extension)) = name.rsplit_once('.') else {
            return Category::Text;
        };
        EXTENSIONS
            .get(extension.to_ascii_lowercase().as_str())
            .copied()
            .unwrap_or(Category::Text)
    }
}

/// A loaded resource. Values are cheaply cloneable; every caller sharing a
/// load observes the same underlying data.
#[derive(Debug, Clone, PartialEq)]
pub enum Resource {
    Text(Rc<str>),
    Json(Rc<serde_json::Value>),
    Binary(Rc<[u8]>),
    Image(Rc<[u8]>),
    Video(Rc<[u8]>),
    Audio(Rc<[u8]>),
}

impl Resource {
    pub fn as_json(&self) -> Option<&serde_json::Value> {
        match self {
            Resource::Json(value) => Some(value),
            _ => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Resource::Text(text) => Some(text),
            _ => None,
        }
    }

    pub fn as_bytes(&self) -> Option<&[u8]> {
        match self {
            Resource::Binary(bytes) | Resource::Image(bytes) | Resource::Video(bytes) | Resource::Audio(bytes) => {
                Some(bytes)
            }
            _ => None,
        }
    }
}

/// Transport behind the loader. The host supplies the actual network or
/// filesystem access; the future resolves with the raw bytes at `url`.
pub trait Fetcher {
    fn fetch(&self, url: &str) -> LocalBoxFuture<'static, Result<Vec<u8>, LoadError>>;
}

/// A deduplicated load in progress (or just completed). Cloning is cheap and
/// every clone resolves with the same result.
pub type SharedLoad = Shared<LocalBoxFuture<'static, Result<Resource, LoadError>>>;

fn immediate(result: Result<Resource, LoadError>) -> SharedLoad {
    futures::future::ready(result).boxed_local().shared()
}

/// The loader. Cheap to clone; clones share both tables.
#[derive(Clone)]
pub struct Loader {
    root: Option<String>,
    fetcher: Rc<dyn Fetcher>,
    cache: Rc<RefCell<HashMap<String, Resource>>>,
    inflight: Rc<RefCell<HashMap<String, SharedLoad>>>,
}

impl Loader {
    pub fn new(fetcher: Rc<dyn Fetcher>) -> Self {
        Self {
            root: None,
            fetcher,
            cache: Rc::new(RefCell::new(HashMap::new())),
            inflight: Rc::new(RefCell::new(HashMap::new())),
        }
    }

    /// A loader resolving every path under `root`.
    pub fn with_root(fetcher: Rc<dyn Fetcher>, root: impl Into<String>) -> Self {
        let mut root = root.into();
        if !root.ends_with('/') {
            root.push('/');
        }
        let mut loader = Self::new(fetcher);
        loader.root = Some(root);
        loader
    }

    /// Loads the resource at `path`, serving from the cache when possible.
    pub fn load(&self, path: &str) -> SharedLoad {
        self.load_with(path, false)
    }

    /// Loads the resource at `path`. With `reload` set, bypasses the cache
    /// and any in-flight request and fetches fresh data.
    pub fn load_with(&self, path: &str, reload: bool) -> SharedLoad {
        if path.is_empty() {
            return immediate(Err(LoadError::EmptyPath));
        }

        let category = Category::from_path(path);

        if !reload {
            let cached = self.cache.borrow().get(path).cloned();
            if let Some(resource) = cached {
                if category == Category::Bundle {
                    // A bundle hit re-warms the cache so entries evicted by
                    // `clear` come back without a fetch.
                    if let Some(bundle) = resource.as_json() {
                        self.prefill_from_bundle(bundle);
                    }
                }
                return immediate(Ok(resource));
            }
            if let Some(pending) = self.inflight.borrow().get(path).cloned() {
                return pending;
            }
        }

        let url = match &self.root {
            Some(root) => format!("{root}{path}"),
            None => path.to_string(),
        };
        debug!(path, %category, "fetching resource");

        let loader = self.clone();
        let owned_path = path.to_string();
        let fetch = self.fetcher.fetch(&url);
        let future = async move {
            let result = fetch
                .await
                .and_then(|bytes| parse_resource(&owned_path, category, bytes));
            loader.inflight.borrow_mut().remove(&owned_path);
            match result {
                Ok(resource) => {
                    if category == Category::Bundle {
                        if let Some(bundle) = resource.as_json() {
                            loader.prefill_from_bundle(bundle);
                        }
                    }
                    loader.cache.borrow_mut().insert(owned_path, resource.clone());
                    Ok(resource)
                }
                Err(error) => {
                    warn!(path = %owned_path, %error, "resource load failed");
                    Err(error)
                }
            }
        }
        .boxed_local()
        .shared();

        self.inflight.borrow_mut().insert(path.to_string(), future.clone());
        future
    }

    /// Pre-populates the cache. With `clear` set, replaces the cache wholesale.
    pub fn prefill(&self, entries: impl IntoIterator<Item = (String, Resource)>, clear: bool) {
        let mut cache = self.cache.borrow_mut();
        if clear {
            cache.clear();
        }
        cache.extend(entries);
    }

    /// Overwrites the cached value for one path.
    pub fn update(&self, path: impl Into<String>, resource: Resource) {
        self.cache.borrow_mut().insert(path.into(), resource);
    }

    /// Empties the completed-value cache. In-flight requests are unaffected.
    pub fn clear(&self) {
        self.cache.borrow_mut().clear();
    }

    pub fn cached(&self, path: &str) -> Option<Resource> {
        self.cache.borrow().get(path).cloned()
    }

    /// Number of requests currently in flight.
    pub fn pending_count(&self) -> usize {
        self.inflight.borrow().len()
    }

    fn prefill_from_bundle(&self, bundle: &serde_json::Value) {
        let Some(entries) = bundle.as_object() else {
            warn!("bundle payload is not an object, cache not warmed");
            return;
        };
        debug!(entries = entries.len(), "warming cache from bundle");
        let mut cache = self.cache.borrow_mut();
        for (path, value) in entries {
            cache.insert(path.clone(), Resource::Json(Rc::new(value.clone())));
        }
    }
}

fn parse_resource(path: &str, category: Category, bytes: Vec<u8>) -> Result<Resource, LoadError> {
    match category {
        Category::Text => {
            let text = String::from_utf8(bytes).map_err(|_| LoadError::Encoding { path: path.to_string() })?;
            Ok(Resource::Text(Rc::from(text)))
        }
        Category::Json | Category::Bundle => {
            let text = String::from_utf8(bytes).map_err(|_| LoadError::Encoding { path: path.to_string() })?;
            let value = serde_json::from_str(&text).map_err(|e| LoadError::Parse {
                path: path.to_string(),
                message: e.to_string(),
            })?;
            Ok(Resource::Json(Rc::new(value)))
        }
        Category::Binary => Ok(Resource::Binary(Rc::from(bytes))),
        Category::Image => Ok(Resource::Image(Rc::from(bytes))),
        Category::Video => Ok(Resource::Video(Rc::from(bytes))),
        Category::Audio => Ok(Resource::Audio(Rc::from(bytes))),
    }
}
