//! Conditional push engine (phase "postRun")
//!
//! Best-effort by contract: the cache is advisory and the build
//! artifact already exists locally, so nothing here may fail the step.
//! A prior error means the remote state is untrusted and pushing could
//! clobber a good entry; a prior hit means pushing is wasted work.

use crate::context::{ExecutionContext, StepInputs};
use crate::credentials::CredentialProvider;
use crate::gateway::{StorageGateway, TransferOptions};
use crate::phase::run::ensure_cache_dir;
use crate::request::CacheRequest;
use tracing::{info, warn};

/// Phase-two entry point: push the local path on a clean miss.
pub async fn post_run(
    inputs: &StepInputs,
    context: &ExecutionContext,
    provider: &dyn CredentialProvider,
    gateway: &dyn StorageGateway,
) {
    info!("cache step postRun phase started");
    push_if_clean_miss(inputs, context, provider, gateway).await;
    info!("cache step postRun phase finished");
}

async fn push_if_clean_miss(
    inputs: &StepInputs,
    context: &ExecutionContext,
    provider: &dyn CredentialProvider,
    gateway: &dyn StorageGateway,
) {
    let prior = context.recorded_run_result();
    if let Some(error) = &prior.error {
        info!("Cache error, skipping push: {error}");
        return;
    }
    if prior.cache_hit {
        info!("Cache already exists, skipping push");
        return;
    }

    let request = match CacheRequest::resolve(inputs, context, provider).await {
        Ok(request) => request,
        Err(err) => {
            warn!("cache request invalid, skipping push: {err}");
            return;
        }
    };

    info!("Cache not exists, start push");
    if let Err(err) = ensure_cache_dir(&request).await {
        warn!("failed to prepare cache path, skipping push: {err}");
        return;
    }

    match gateway
        .upload(
            &request.cache_path,
            &request.address(),
            &request.credentials,
            &TransferOptions::default(),
        )
        .await
    {
        Ok(outcome) if outcome.succeeded() => {
            info!("cache pushed");
        }
        Ok(outcome) => {
            warn!(status = ?outcome.status, "upload failed");
        }
        Err(err) => {
            warn!("upload failed to execute: {err}");
        }
    }
}
