//! Opaque entity identity and the scene-graph contract.
//!
//! The runtime never owns entities. The world/entity-component storage lives
//! in the host engine; actions only need identity comparisons and upward
//! traversal of the parent chain.

/// Opaque identifier for an entity owned by the host world.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EntityId(pub u32);

impl std::fmt::Display for EntityId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "entity#{}", self.0)
    }
}

/// Upward-traversal view of the host's scene hierarchy.
pub trait SceneGraph {
    /// Returns the parent of `entity`, or `None` at a root.
    fn parent(&self, entity: EntityId) -> Option<EntityId>;

    /// Walks from `start` up through its ancestor chain (inclusive) and
    /// returns whether `target` appears in it.
    fn chain_contains(&self, start: EntityId, target: EntityId) -> bool {
        let mut cursor = Some(start);
        // Guard against malformed (cyclic) hierarchies from the host.
        let mut remaining = 1024;
        while let Some(entity) = cursor {
            if entity == target {
                return true;
            }
            remaining -= 1;
            if remaining == 0 {
                tracing::warn!(%start, "ancestor walk exceeded depth limit, assuming cycle");
                return false;
            }
            cursor = self.parent(entity);
        }
        false
    }
}
