//! Normalized input event model.
//!
//! Events arrive from the host's input surface in DOM-like shape: mouse
//! events carry a single page-relative coordinate, touch events carry a list
//! of touch points, key events carry the pressed character. Actions convert
//! page coordinates into render-surface coordinates through the [`Viewport`].

use smallvec::SmallVec;
use strum_macros::Display;

/// A single touch point with page-relative coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TouchPoint {
    pub page_x: f32,
    pub page_y: f32,
}

/// The set of event types a listener can subscribe to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display)]
#[strum(serialize_all = "camelCase")]
pub enum EventKind {
    MouseMove,
    TouchStart,
    TouchMove,
    TouchEnd,
    KeyDown,
    KeyUp,
}

/// An input event as delivered by the host surface.
#[derive(Debug, Clone, PartialEq)]
pub enum InputEvent {
    MouseMove { page_x: f32, page_y: f32 },
    TouchStart { touches: SmallVec<[TouchPoint; 2]> },
    TouchMove { touches: SmallVec<[TouchPoint; 2]> },
    TouchEnd { touches: SmallVec<[TouchPoint; 2]> },
    KeyDown { key: char },
    KeyUp { key: char },
}

impl InputEvent {
    pub fn kind(&self) -> EventKind {
        match self {
            InputEvent::MouseMove { .. } => EventKind::MouseMove,
            InputEvent::TouchStart { .. } => EventKind::TouchStart,
            InputEvent::TouchMove { .. } => EventKind::TouchMove,
            InputEvent::TouchEnd { .. } => EventKind::TouchEnd,
            InputEvent::KeyDown { .. } => EventKind::KeyDown,
            InputEvent::KeyUp { .. } => EventKind::KeyUp,
        }
    }

    /// The event's position in render-surface coordinates.
    ///
    /// Mouse events convert their page coordinate through the viewport rect;
    /// touch events use their first touch point. Key events have no position.
    pub fn surface_position(&self, viewport: &Viewport) -> Option<(f32, f32)> {
        match self {
            InputEvent::MouseMove { page_x, page_y } => Some(viewport.to_surface(*page_x, *page_y)),
            InputEvent::TouchStart { touches } | InputEvent::TouchMove { touches } | InputEvent::TouchEnd { touches } => {
                let touch = touches.first()?;
                Some(viewport.to_surface(touch.page_x, touch.page_y))
            }
            InputEvent::KeyDown { .. } | InputEvent::KeyUp { .. } => None,
        }
    }
}

/// The render target's bounding rectangle in page coordinates.
///
/// Mirrors what `getBoundingClientRect` reports for a canvas; the host is
/// expected to refresh it on resize or scroll.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    pub left: f32,
    pub top: f32,
    pub width: f32,
    pub height: f32,
}

impl Viewport {
    pub fn new(left: f32, top: f32, width: f32, height: f32) -> Self {
        Self { left, top, width, height }
    }

    /// Converts a page-relative coordinate into a surface-relative one.
    pub fn to_surface(&self, page_x: f32, page_y: f32) -> (f32, f32) {
        (page_x - self.left, page_y - self.top)
    }
}

impl Default for Viewport {
    fn default() -> Self {
        Self {
            left: 0.0,
            top: 0.0,
            width: 1280.0,
            height: 720.0,
        }
    }
}
