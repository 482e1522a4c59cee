//! Process-wide registration of the decode engine.
//!
//! The host application calls [`init_subsystem`] once at startup before any
//! player opens a file, and [`shutdown_subsystem`] when it tears cinematics
//! down. Both are idempotent.

use std::sync::{Mutex, MutexGuard};

use crate::media::domain::decode_engine::EngineError;

/// One-shot initialization flag.
///
/// The initialization work runs under the flag's lock, so concurrent callers
/// wait for it to finish and only see the flag set once it succeeded.
pub struct SubsystemFlag {
    initialized: Mutex<bool>,
}

impl SubsystemFlag {
    pub const fn new() -> Self {
        Self {
            initialized: Mutex::new(false),
        }
    }

    fn lock(&self) -> MutexGuard<'_, bool> {
        self.initialized
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Runs `init` unless the flag is already set. Returns whether `init` ran.
    ///
    /// The flag is set only when `init` succeeds; a failure leaves it clear
    /// for the next caller to retry.
    pub fn run_once<E>(&self, init: impl FnOnce() -> Result<(), E>) -> Result<bool, E> {
        let mut initialized = self.lock();
        if *initialized {
            return Ok(false);
        }
        init()?;
        *initialized = true;
        Ok(true)
    }

    /// Returns true if this call cleared a set flag.
    pub fn end(&self) -> bool {
        std::mem::replace(&mut *self.lock(), false)
    }

    pub fn is_set(&self) -> bool {
        *self.lock()
    }
}

impl Default for SubsystemFlag {
    fn default() -> Self {
        Self::new()
    }
}

static SUBSYSTEM: SubsystemFlag = SubsystemFlag::new();

/// Registers the engine's codecs and formats. Safe to call repeatedly.
pub fn init_subsystem() -> Result<(), EngineError> {
    let ran = SUBSYSTEM.run_once(|| {
        ffmpeg_next::init().map_err(|e| EngineError::Open {
            status: i32::from(e),
            message: format!("engine registration failed: {e}"),
        })
    })?;
    if ran {
        log::debug!("Cinematic subsystem initialized");
    }
    Ok(())
}

/// Marks the engine as unavailable for new sessions.
pub fn shutdown_subsystem() {
    if SUBSYSTEM.end() {
        log::debug!("Cinematic subsystem shut down");
    }
}

pub fn is_initialized() -> bool {
    SUBSYSTEM.is_set()
}
