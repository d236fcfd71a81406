//! cache-step - Two-phase object-storage cache step
//!
//! A workflow-engine plugin that checks a remote bucket for a cached
//! artifact before the guarded work (phase `run`, fetch on hit) and
//! pushes the local path afterwards when the earlier check was a clean
//! miss (phase `postRun`). Inter-phase state travels only through the
//! host-owned result slot.

pub mod cli;
pub mod context;
pub mod coordinates;
pub mod credentials;
pub mod error;
pub mod gateway;
pub mod phase;
pub mod request;
pub mod resolve;

pub use error::{StepError, StepResult};
