//! Emergency checkpointing of the in-flight partition.
//!
//! The registry holds non-owning bindings to the live context and hypergraph.
//! It is armed once both exist and fired at most once, from ordinary thread
//! context, when a termination signal arrives (see [`crate::signal`]).

use std::path::PathBuf;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};

use anyhow::{Result, bail};
use tracing::{info, warn};

use crate::context::PartitionContext;
use crate::core::hypergraph::Hypergraph;

/// Hypergraph shared between the engine and the checkpoint path.
///
/// The engine holds the lock for one phase at a time, so a checkpoint always
/// observes the state between two phases.
pub type SharedHypergraph = Arc<Mutex<Hypergraph>>;

/// Persists a context/hypergraph pair. The format is up to the implementation.
pub trait CheckpointSink: Send + Sync {
    /// Write the checkpoint and return where it went.
    fn write(&self, context: &PartitionContext, hypergraph: &Hypergraph) -> Result<PathBuf>;
}

/// Observable registry state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RegistryState {
    Uninitialized,
    Armed,
    Fired,
    /// Cleared at normal termination.
    Disarmed,
}

/// Result of [`CheckpointRegistry::fire`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FireOutcome {
    /// Both bindings were live and the sink wrote a checkpoint.
    Serialized(PathBuf),
    /// Nothing was armed (or the registry was already disarmed).
    Unarmed,
    /// Armed, but a referent was already dropped.
    Released,
    /// A previous fire already consumed the registry.
    AlreadyFired,
}

enum Binding {
    Uninitialized,
    Armed {
        context: Weak<PartitionContext>,
        hypergraph: Weak<Mutex<Hypergraph>>,
    },
    Fired,
    Disarmed,
}

/// Single-shot checkpoint trigger. One instance per process run.
pub struct CheckpointRegistry {
    binding: Mutex<Binding>,
    sink: Box<dyn CheckpointSink>,
}

impl CheckpointRegistry {
    pub fn new(sink: impl CheckpointSink + 'static) -> Self {
        Self {
            binding: Mutex::new(Binding::Uninitialized),
            sink: Box::new(sink),
        }
    }

    /// Bind the live context and hypergraph. Only valid once, from `Uninitialized`.
    pub fn arm(
        &self,
        context: &Arc<PartitionContext>,
        hypergraph: &SharedHypergraph,
    ) -> Result<()> {
        let mut binding = self.lock_binding();
        if !matches!(*binding, Binding::Uninitialized) {
            bail!("checkpoint registry cannot be re-armed");
        }
        *binding = Binding::Armed {
            context: Arc::downgrade(context),
            hypergraph: Arc::downgrade(hypergraph),
        };
        info!("checkpoint registry armed");
        Ok(())
    }

    /// Drop the bindings after a normal run. Later fires are no-ops.
    pub fn disarm(&self) {
        let mut binding = self.lock_binding();
        if matches!(*binding, Binding::Armed { .. } | Binding::Uninitialized) {
            *binding = Binding::Disarmed;
        }
    }

    pub fn state(&self) -> RegistryState {
        match *self.lock_binding() {
            Binding::Uninitialized => RegistryState::Uninitialized,
            Binding::Armed { .. } => RegistryState::Armed,
            Binding::Fired => RegistryState::Fired,
            Binding::Disarmed => RegistryState::Disarmed,
        }
    }

    /// Serialize the bound state through the sink, at most once.
    ///
    /// Blocks until the engine releases the hypergraph lock. Re-entrant
    /// delivery is best effort: a second call returns `AlreadyFired`.
    pub fn fire(&self) -> Result<FireOutcome> {
        let (context, hypergraph) = {
            let mut binding = self.lock_binding();
            let upgraded = match &*binding {
                Binding::Uninitialized | Binding::Disarmed => {
                    warn!("checkpoint requested while not armed; ignoring");
                    return Ok(FireOutcome::Unarmed);
                }
                Binding::Fired => return Ok(FireOutcome::AlreadyFired),
                Binding::Armed {
                    context,
                    hypergraph,
                } => (context.upgrade(), hypergraph.upgrade()),
            };
            *binding = Binding::Fired;
            upgraded
        };

        let (Some(context), Some(hypergraph)) = (context, hypergraph) else {
            warn!("checkpoint bindings already released; nothing to write");
            return Ok(FireOutcome::Released);
        };
        let hypergraph = hypergraph.lock().unwrap_or_else(PoisonError::into_inner);
        let path = self.sink.write(&context, &hypergraph)?;
        info!(
            path = %path.display(),
            assigned = hypergraph.assigned_count(),
            "checkpoint written"
        );
        Ok(FireOutcome::Serialized(path))
    }

    fn lock_binding(&self) -> MutexGuard<'_, Binding> {
        self.binding.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
