//! Stages and the stage registry
//!
//! A stage is a named async action over the tracked controls with an
//! optional timeout. The registry keeps stages in insertion order, which is
//! execution order, and is frozen once handed to a controller.

use crate::tracked::TrackedControls;
use futures::future::BoxFuture;
use futures::FutureExt;
use jackpot_core::ControlError;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;

/// Why a stage's action failed
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum StageError {
    #[error(transparent)]
    Control(#[from] ControlError),

    /// A completion sender was dropped without reporting
    #[error("completion callback dropped before it fired")]
    CallbackDropped,

    #[error("stage panicked: {0}")]
    Panicked(String),

    #[error("{0}")]
    Failed(String),
}

/// Future returned by a stage action
pub type StageFuture = BoxFuture<'static, Result<(), StageError>>;

type StageFn = Arc<dyn Fn(TrackedControls) -> StageFuture + Send + Sync>;

/// One named unit of a sequence
#[derive(Clone)]
pub struct Stage {
    id: String,
    timeout: Option<Duration>,
    execute: StageFn,
}

impl Stage {
    pub fn new<F, Fut>(id: impl Into<String>, execute: F) -> Self
    where
        F: Fn(TrackedControls) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<(), StageError>> + Send + 'static,
    {
        Self {
            id: id.into(),
            timeout: None,
            execute: Arc::new(move |controls| execute(controls).boxed()),
        }
    }

    /// Bound the stage; `None` waits for the action however long it takes
    pub fn with_timeout(mut self, timeout: impl Into<Option<Duration>>) -> Self {
        self.timeout = timeout.into();
        self
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn timeout(&self) -> Option<Duration> {
        self.timeout
    }

    pub(crate) fn execute(&self, controls: TrackedControls) -> StageFuture {
        (self.execute)(controls)
    }
}

impl std::fmt::Debug for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Stage")
            .field("id", &self.id)
            .field("timeout", &self.timeout)
            .finish_non_exhaustive()
    }
}

/// Ordered list of stages
#[derive(Clone, Debug, Default)]
pub struct StageRegistry {
    stages: Vec<Stage>,
}

impl StageRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a stage (builder style)
    pub fn with(mut self, stage: Stage) -> Self {
        self.push(stage);
        self
    }

    pub fn push(&mut self, stage: Stage) {
        if self.stages.iter().any(|s| s.id == stage.id) {
            tracing::warn!(stage = %stage.id, "duplicate stage id registered");
        }
        self.stages.push(stage);
    }

    pub fn get(&self, index: usize) -> Option<&Stage> {
        self.stages.get(index)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Stage> + '_ {
        self.stages.iter()
    }

    pub fn ids(&self) -> Vec<&str> {
        self.stages.iter().map(Stage::id).collect()
    }

    pub fn len(&self) -> usize {
        self.stages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stages.is_empty()
    }
}

impl FromIterator<Stage> for StageRegistry {
    fn from_iter<I: IntoIterator<Item = Stage>>(iter: I) -> Self {
        let mut registry = Self::new();
        for stage in iter {
            registry.push(stage);
        }
        registry
    }
}
