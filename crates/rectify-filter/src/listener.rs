//! Change notification for filter parameters
//!
//! A plain subscriber list: callbacks are invoked in subscription order
//! with a borrowed event after each effective parameter change.

use crate::perspective::{CornerShape, QuadSide};
use std::fmt;

/// Handle returned by [`ChangeListeners::subscribe`]
pub type ListenerId = u64;

/// Something about a filter changed
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FilterEvent {
    /// The filter saw a source image of a new size
    ImageSizeChanged { width: u32, height: u32 },
    /// A whole quad or one of its corners was written at a keyframe
    CornerMoved {
        side: QuadSide,
        frame: u32,
        index: Option<usize>,
    },
    /// A keyframe was removed
    KeyFrameDeleted { side: QuadSide, frame: u32 },
    /// A corner store switched between fixed and per-frame mode
    FixedChanged { side: QuadSide, fixed: bool },
    /// The output corner editing constraint changed
    CornerShapeChanged(CornerShape),
    /// All corner stores were replaced at once
    CornersLoaded,
    /// A radial parameter changed
    RadialParamsChanged,
    /// The fixed radius was raised to the feasibility floor
    FixedRadiusRaised { from: f64, to: f64 },
}

/// Ordered list of change callbacks
pub struct ChangeListeners<E> {
    next_id: ListenerId,
    listeners: Vec<(ListenerId, Box<dyn FnMut(&E)>)>,
}

impl<E> Default for ChangeListeners<E> {
    fn default() -> Self {
        Self {
            next_id: 0,
            listeners: Vec::new(),
        }
    }
}

impl<E> fmt::Debug for ChangeListeners<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ChangeListeners")
            .field("count", &self.listeners.len())
            .finish()
    }
}

impl<E> ChangeListeners<E> {
    /// Create an empty list
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a callback; returns a handle for [`ChangeListeners::unsubscribe`].
    pub fn subscribe(&mut self, listener: impl FnMut(&E) + 'static) -> ListenerId {
        let id = self.next_id;
        self.next_id += 1;
        self.listeners.push((id, Box::new(listener)));
        id
    }

    /// Remove a callback. Returns `false` if the handle is unknown.
    pub fn unsubscribe(&mut self, id: ListenerId) -> bool {
        let before = self.listeners.len();
        self.listeners.retain(|(lid, _)| *lid != id);
        self.listeners.len() != before
    }

    /// Invoke every callback with `event`
    pub fn notify(&mut self, event: &E) {
        for (_, listener) in &mut self.listeners {
            listener(event);
        }
    }

    /// Number of registered callbacks
    pub fn len(&self) -> usize {
        self.listeners.len()
    }

    /// Returns `true` if nothing is subscribed
    pub fn is_empty(&self) -> bool {
        self.listeners.is_empty()
    }
}
