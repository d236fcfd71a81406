//! Host engine boundary types
//!
//! The workflow engine invokes each phase with two JSON documents: the
//! step's own inputs and the ambient execution context. Both are
//! deserialized here with lenient defaults so a sparse host payload
//! never fails at the boundary; missing required fields surface later
//! as accumulated configuration errors.

use crate::credentials::Credentials;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Declared inputs of the cache step
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct StepInputs {
    /// Logical cache key (remote object prefix)
    pub key: String,
    /// Local cache path, absolute or relative to the working directory
    pub path: String,
    /// Storage region; optional in generic mode, falls back to the
    /// worker default region
    pub region: Option<String>,
    /// Nested object-storage config block
    pub oss_config: Option<OssConfigInput>,
    /// Embedded credentials block
    pub credentials: Option<Credentials>,
}

/// The step's nested object-storage config block
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct OssConfigInput {
    pub bucket: String,
    pub internal: Option<bool>,
}

/// Ambient execution context provided by the host engine
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ExecutionContext {
    /// Working directory for transfer tool invocations
    pub cwd: Option<PathBuf>,
    /// Engine-level inputs shared across steps
    pub inputs: EngineInputs,
    /// Prior phases' recorded outputs, relayed unchanged by the host
    pub step_context: StepContext,
}

/// Engine-level inputs: resolved identity, worker config, and the
/// application-level cache config block of the compatibility host
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct EngineInputs {
    pub sts: Option<StsIdentity>,
    pub uid: Option<String>,
    pub worker_run_config: Option<WorkerRunConfig>,
    pub cache_config: Option<AppCacheConfig>,
}

/// An identity already resolved by the engine before the step ran
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct StsIdentity {
    pub account_id: Option<String>,
    pub access_key_id: Option<String>,
    pub access_key_secret: Option<String>,
    pub security_token: Option<String>,
}

/// Worker-level defaults
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct WorkerRunConfig {
    pub region: Option<String>,
}

/// Application-level cache configuration of the compatibility host
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct AppCacheConfig {
    pub bucket: String,
    pub region_id: String,
}

/// Recorded outputs of prior phases, keyed by phase name
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct StepContext {
    pub run: PhaseRecord,
}

/// One phase's recorded outputs slot
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct PhaseRecord {
    pub outputs: RecordedResult,
}

/// The wire form of a phase-one result: what the host stores as the
/// step output and relays to phase two. Never mutated after phase one.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RecordedResult {
    #[serde(rename = "cache-hit")]
    pub cache_hit: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ExecutionContext {
    /// Worker default region, doubling as the "current region" the
    /// compatibility host compares against
    pub fn default_region(&self) -> Option<&str> {
        self.inputs
            .worker_run_config
            .as_ref()
            .and_then(|w| w.region.as_deref())
            .filter(|r| !r.is_empty())
    }

    /// Strategy-one predicate: the context already carries a complete
    /// identity (account id or uid, key id, secret), usable as-is.
    pub fn direct_identity(&self) -> Option<Credentials> {
        let sts = self.inputs.sts.as_ref()?;
        let account_id = sts
            .account_id
            .clone()
            .or_else(|| self.inputs.uid.clone())
            .filter(|v| !v.is_empty())?;
        let access_key_id = sts.access_key_id.clone().filter(|v| !v.is_empty())?;
        let access_key_secret = sts.access_key_secret.clone().filter(|v| !v.is_empty())?;
        Some(Credentials {
            account_id: Some(account_id),
            access_key_id,
            access_key_secret,
            security_token: sts.security_token.clone().filter(|v| !v.is_empty()),
        })
    }

    /// Strategy-two predicate: the compatibility host's cache config
    /// block is present.
    pub fn app_cache_config(&self) -> Option<&AppCacheConfig> {
        self.inputs.cache_config.as_ref()
    }

    /// The phase-one result as relayed by the host for phase two
    pub fn recorded_run_result(&self) -> &RecordedResult {
        &self.step_context.run.outputs
    }
}
