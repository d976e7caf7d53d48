//! Spatial picking contract consumed by hover-style actions.
//!
//! The renderer owns the actual intersection math; the runtime only chooses
//! between the coarse bounding-volume query and the exact per-pixel query and
//! consumes the resulting candidate entity.

use smallvec::SmallVec;
use strum_macros::{Display, EnumString};

use crate::entity::EntityId;

/// One bounding-volume intersection, nearest first in the result list.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PickHit {
    pub entity: EntityId,
    pub distance: f32,
}

/// Picking queries implemented by the host renderer.
pub trait Picker {
    /// Coarse bounding-volume pick at surface coordinates, ordered by
    /// distance with the nearest hit first.
    fn pick(&self, x: f32, y: f32) -> SmallVec<[PickHit; 8]>;

    /// Exact per-pixel pick resolving to the entity rendered at the
    /// coordinate, if any. Higher cost, pixel-accurate.
    fn pick_pixel(&self, x: f32, y: f32) -> Option<EntityId>;
}

/// Accuracy/performance selection for hover picking.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Display, EnumString)]
#[strum(serialize_all = "lowercase")]
pub enum PickAccuracy {
    /// Bounding-volume intersection against all pickable entities.
    #[default]
    Fast,
    /// Per-pixel render-buffer pick.
    Slow,
}

impl PickAccuracy {
    /// Resolves the candidate entity under `(x, y)`, dispatching to the
    /// query this accuracy level calls for. Both levels share the same
    /// entity-or-none contract.
    pub fn resolve(&self, picker: &dyn Picker, x: f32, y: f32) -> Option<EntityId> {
        match self {
            PickAccuracy::Fast => picker.pick(x, y).first().map(|hit| hit.entity),
            PickAccuracy::Slow => picker.pick_pixel(x, y),
        }
    }
}
