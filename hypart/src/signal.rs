//! Bridges termination signals to the checkpoint registry.
//!
//! The OS-level handler installed by `signal-hook` only writes the signal
//! number to a self-pipe. A dedicated watcher thread reads it on ordinary
//! thread context, fires the [`CheckpointRegistry`], and then ends the
//! process.

use std::os::raw::c_int;
use std::sync::Arc;
use std::thread::{self, JoinHandle};

use anyhow::{Context, Result, anyhow};
use signal_hook::consts::{SIGINT, SIGTERM};
use signal_hook::iterator::{Handle, Signals};
use tracing::{debug, error, info};

use crate::checkpoint::{CheckpointRegistry, FireOutcome};
use crate::exit_codes;

/// Signals that trigger checkpoint-and-exit.
pub const TERMINATION_SIGNALS: [c_int; 2] = [SIGINT, SIGTERM];

/// Installed signal handlers plus the watcher thread that services them.
pub struct SignalBridge {
    handle: Handle,
    watcher: Option<JoinHandle<()>>,
}

impl SignalBridge {
    /// Watch [`TERMINATION_SIGNALS`]; on delivery, checkpoint and exit with `128 + signal`.
    pub fn install(registry: Arc<CheckpointRegistry>) -> Result<Self> {
        Self::install_with(registry, &TERMINATION_SIGNALS, |code| std::process::exit(code))
    }

    /// Like [`SignalBridge::install`], with custom signals and exit behavior.
    ///
    /// `on_fired` receives the exit code after the registry has been fired.
    /// It runs at most once.
    pub fn install_with<F>(
        registry: Arc<CheckpointRegistry>,
        signals: &[c_int],
        on_fired: F,
    ) -> Result<Self>
    where
        F: FnOnce(i32) + Send + 'static,
    {
        let mut signals = Signals::new(signals).context("register signal handlers")?;
        let handle = signals.handle();
        let watcher = thread::Builder::new()
            .name("checkpoint-signal".to_string())
            .spawn(move || {
                // `forever` ends once the handle is closed.
                if let Some(signal) = signals.forever().next() {
                    info!(signal, "termination signal received");
                    match registry.fire() {
                        Ok(FireOutcome::Serialized(path)) => {
                            eprintln!("interrupted: checkpoint written to {}", path.display());
                        }
                        Ok(outcome) => debug!(?outcome, "no checkpoint written"),
                        Err(err) => error!("checkpoint failed: {err:#}"),
                    }
                    on_fired(exit_codes::interrupted(signal));
                }
            })
            .context("spawn signal watcher")?;
        debug!("signal bridge installed");
        Ok(Self {
            handle,
            watcher: Some(watcher),
        })
    }

    /// Stop watching and join the watcher thread.
    pub fn shutdown(mut self) -> Result<()> {
        self.handle.close();
        if let Some(watcher) = self.watcher.take() {
            watcher
                .join()
                .map_err(|_| anyhow!("signal watcher thread panicked"))?;
        }
        debug!("signal bridge shut down");
        Ok(())
    }
}

impl Drop for SignalBridge {
    fn drop(&mut self) {
        self.handle.close();
    }
}
