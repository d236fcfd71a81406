//! Existence & fetch engine (phase "run")
//!
//! Resolution or credential failures short-circuit before any network
//! call. A failed or timed-out existence check, and a failed download,
//! both degrade to a miss carried in the result rather than aborting
//! the pipeline: a fresh build is always a valid fallback.

use crate::context::{ExecutionContext, StepInputs};
use crate::credentials::CredentialProvider;
use crate::error::StepError;
use crate::gateway::{StorageGateway, TransferOptions};
use crate::phase::CacheResult;
use crate::request::CacheRequest;
use std::path::PathBuf;
use tracing::{debug, info, warn};

/// Phase-one entry point: check the remote prefix, fetch on a hit.
pub async fn run(
    inputs: &StepInputs,
    context: &ExecutionContext,
    provider: &dyn CredentialProvider,
    gateway: &dyn StorageGateway,
) -> CacheResult {
    info!("cache step run phase started");
    let result = check_and_fetch(inputs, context, provider, gateway).await;
    info!(cache_hit = result.cache_hit, "cache step run phase finished");
    result
}

async fn check_and_fetch(
    inputs: &StepInputs,
    context: &ExecutionContext,
    provider: &dyn CredentialProvider,
    gateway: &dyn StorageGateway,
) -> CacheResult {
    let request = match CacheRequest::resolve(inputs, context, provider).await {
        Ok(request) => request,
        Err(err) => {
            warn!("cache request invalid: {err}");
            return CacheResult::miss_with(err);
        }
    };
    let address = request.address();

    let probe = match gateway.exists(&address, &request.credentials).await {
        Ok(probe) => probe,
        Err(err) => {
            warn!("existence check failed to execute: {err}");
            return CacheResult::miss_with(StepError::transfer(
                "existence check",
                err.to_string(),
            ));
        }
    };
    if !probe.succeeded() {
        warn!(status = ?probe.status, "existence check failed");
        let reason = match probe.status {
            Some(code) => format!("exit status {code}"),
            None => "no exit status".to_string(),
        };
        return CacheResult::miss_with(StepError::transfer("existence check", reason));
    }

    if probe.reports_zero_objects() {
        debug!(url = %address.object_url, "cache miss, prefix is empty");
        return CacheResult::miss();
    }

    debug!(url = %address.object_url, count = ?probe.object_count(), "cache hit, fetching");
    if let Err(err) = ensure_cache_dir(&request).await {
        warn!("failed to prepare cache directory: {err}");
        return CacheResult::miss_with(StepError::transfer("download", err.to_string()));
    }

    match gateway
        .download(
            &address,
            &request.cache_path,
            &request.credentials,
            &TransferOptions::default(),
        )
        .await
    {
        Ok(outcome) if outcome.succeeded() => CacheResult::hit(),
        Ok(outcome) => {
            warn!(status = ?outcome.status, "download failed");
            let reason = match outcome.status {
                Some(code) => format!("exit status {code}"),
                None => "no exit status".to_string(),
            };
            CacheResult::miss_with(StepError::transfer("download", reason))
        }
        Err(err) => {
            warn!("download failed to execute: {err}");
            CacheResult::miss_with(StepError::transfer("download", err.to_string()))
        }
    }
}

/// Create the local cache directory if absent, resolving a relative
/// path against the working directory. Idempotent.
pub(crate) async fn ensure_cache_dir(request: &CacheRequest) -> std::io::Result<()> {
    let dir: PathBuf = match &request.working_directory {
        Some(cwd) if request.cache_path.is_relative() => cwd.join(&request.cache_path),
        _ => request.cache_path.clone(),
    };
    tokio::fs::create_dir_all(&dir).await
}
