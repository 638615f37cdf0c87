//! Control handles
//!
//! A control handle drives one animated component between its `hidden` and
//! `visible` states. `transition_to` resolves when the component's own
//! transition settles, which may be immediately, after a fixed duration, or
//! never (endless loops). `set_immediate` snaps without animating.

use crate::component::{ComponentId, VisualState};
use async_trait::async_trait;
use indexmap::IndexMap;
use std::sync::Arc;
use thiserror::Error;

/// Errors reported by control handles
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ControlError {
    /// The transition was superseded before it settled
    #[error("transition of {0} was interrupted")]
    Interrupted(ComponentId),

    /// No handle is registered for the component
    #[error("no control registered for {0}")]
    Unavailable(ComponentId),
}

/// Capability to animate one component between named visual states
#[async_trait]
pub trait ControlHandle: Send + Sync {
    /// Animate towards `state`, resolving when the transition settles
    async fn transition_to(&self, state: VisualState) -> Result<(), ControlError>;

    /// Jump to `state` without animating
    fn set_immediate(&self, state: VisualState);
}

/// Shared, type-erased control handle
pub type SharedControl = Arc<dyn ControlHandle>;

/// Fixed mapping from component to control handle
///
/// Keys are fixed at construction. Cloning is cheap (the map is shared).
#[derive(Clone)]
pub struct ControlsMap {
    handles: Arc<IndexMap<ComponentId, SharedControl>>,
}

impl ControlsMap {
    pub fn builder() -> ControlsMapBuilder {
        ControlsMapBuilder {
            handles: IndexMap::new(),
        }
    }

    /// Get the handle registered for `id`
    pub fn get(&self, id: ComponentId) -> Result<&SharedControl, ControlError> {
        self.handles.get(&id).ok_or(ControlError::Unavailable(id))
    }

    /// Registered components in insertion order
    pub fn iter(&self) -> impl Iterator<Item = (ComponentId, &SharedControl)> + '_ {
        self.handles.iter().map(|(id, handle)| (*id, handle))
    }

    pub fn len(&self) -> usize {
        self.handles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handles.is_empty()
    }

    /// Snap every registered component to hidden
    pub fn hide_all(&self) {
        for (id, handle) in self.iter() {
            tracing::trace!(component = %id, "forcing hidden");
            handle.set_immediate(VisualState::Hidden);
        }
    }
}

impl std::fmt::Debug for ControlsMap {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list().entries(self.handles.keys()).finish()
    }
}

/// Builder for [`ControlsMap`]
pub struct ControlsMapBuilder {
    handles: IndexMap<ComponentId, SharedControl>,
}

impl ControlsMapBuilder {
    /// Register a handle; a later registration for the same id replaces the earlier one
    pub fn insert(mut self, id: ComponentId, handle: SharedControl) -> Self {
        self.handles.insert(id, handle);
        self
    }

    pub fn build(self) -> ControlsMap {
        ControlsMap {
            handles: Arc::new(self.handles),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    #[derive(Default)]
    struct Recorder {
        calls: Mutex<Vec<(&'static str, VisualState)>>,
    }

    #[async_trait]
    impl ControlHandle for Recorder {
        async fn transition_to(&self, state: VisualState) -> Result<(), ControlError> {
            self.calls.lock().unwrap().push(("transition", state));
            Ok(())
        }

        fn set_immediate(&self, state: VisualState) {
            self.calls.lock().unwrap().push(("set", state));
        }
    }

    #[test]
    fn test_missing_control_is_unavailable() {
        let map = ControlsMap::builder()
            .insert(ComponentId::Dice, Arc::new(Recorder::default()))
            .build();

        assert!(map.get(ComponentId::Dice).is_ok());
        assert_eq!(
            map.get(ComponentId::Amount).err(),
            Some(ControlError::Unavailable(ComponentId::Amount))
        );
    }

    #[test]
    fn test_hide_all_sets_every_handle() {
        let dice = Arc::new(Recorder::default());
        let amount = Arc::new(Recorder::default());
        let map = ControlsMap::builder()
            .insert(ComponentId::Dice, dice.clone())
            .insert(ComponentId::Amount, amount.clone())
            .build();

        map.hide_all();

        assert_eq!(*dice.calls.lock().unwrap(), vec![("set", VisualState::Hidden)]);
        assert_eq!(*amount.calls.lock().unwrap(), vec![("set", VisualState::Hidden)]);
    }

    #[test]
    fn test_ids_keep_insertion_order() {
        let map = ControlsMap::builder()
            .insert(ComponentId::Amount, Arc::new(Recorder::default()))
            .insert(ComponentId::Aperture, Arc::new(Recorder::default()))
            .build();

        let ids: Vec<_> = map.iter().map(|(id, _)| id).collect();
        assert_eq!(ids, vec![ComponentId::Amount, ComponentId::Aperture]);
    }

    #[tokio::test]
    async fn test_transition_delegates() {
        let dice = Arc::new(Recorder::default());
        let map = ControlsMap::builder()
            .insert(ComponentId::Dice, dice.clone())
            .build();

        map.get(ComponentId::Dice)
            .unwrap()
            .transition_to(VisualState::Visible)
            .await
            .unwrap();

        assert_eq!(
            *dice.calls.lock().unwrap(),
            vec![("transition", VisualState::Visible)]
        );
    }
}
