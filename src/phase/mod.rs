//! The two-phase cache protocol
//!
//! Phase `run` checks the remote prefix and fetches on a hit; phase
//! `postRun` pushes the local path on a clean miss. The only state
//! shared between them is the `RecordedResult` the host persists from
//! phase one and relays to phase two.

pub mod post_run;
pub mod run;

pub use post_run::post_run;
pub use run::run;

use crate::context::RecordedResult;
use crate::error::StepError;

/// The result of phase one, handed to the host for relay.
///
/// Created once at the end of `run`, never mutated afterward.
#[derive(Debug)]
pub struct CacheResult {
    pub cache_hit: bool,
    pub error: Option<StepError>,
}

impl CacheResult {
    pub fn hit() -> Self {
        Self {
            cache_hit: true,
            error: None,
        }
    }

    /// A clean miss: the prefix does not exist and nothing failed
    pub fn miss() -> Self {
        Self {
            cache_hit: false,
            error: None,
        }
    }

    /// A degraded miss: something failed, phase two must not push
    pub fn miss_with(error: StepError) -> Self {
        Self {
            cache_hit: false,
            error: Some(error),
        }
    }

    /// Wire form stored by the host as the step output
    pub fn recorded(&self) -> RecordedResult {
        RecordedResult {
            cache_hit: self.cache_hit,
            error: self.error.as_ref().map(|e| e.to_string()),
        }
    }
}
