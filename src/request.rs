//! The resolved, validated configuration for one phase invocation
//!
//! A `CacheRequest` exists only in a fully valid form: `resolve`
//! either returns a request with all required fields populated and
//! credentials validated, or a terminal error. Nothing partially valid
//! ever reaches the transfer gateway.

use crate::context::{ExecutionContext, StepInputs};
use crate::coordinates::{remote_address, RemoteAddress};
use crate::credentials::{CredentialProvider, Credentials};
use crate::error::{StepError, StepResult};
use crate::resolve::resolve_profile;
use std::path::PathBuf;
use tracing::debug;

/// Resolved configuration for one phase invocation.
///
/// Each phase rebuilds its own instance from current inputs and
/// context; nothing is carried across phases except the host-owned
/// result slot.
#[derive(Debug, Clone)]
pub struct CacheRequest {
    pub object_key: String,
    pub region: String,
    pub bucket: String,
    pub cache_path: PathBuf,
    pub internal: bool,
    pub credentials: Credentials,
    pub working_directory: Option<PathBuf>,
}

impl CacheRequest {
    /// Resolve and validate the request for this invocation.
    ///
    /// Configuration violations are accumulated so the returned error
    /// reports every missing field, not just the first.
    pub async fn resolve(
        inputs: &StepInputs,
        context: &ExecutionContext,
        provider: &dyn CredentialProvider,
    ) -> StepResult<CacheRequest> {
        let profile = resolve_profile(inputs, context, provider).await?;

        let request = CacheRequest {
            object_key: inputs.key.clone(),
            region: profile.region,
            bucket: profile.bucket,
            cache_path: PathBuf::from(&inputs.path),
            internal: profile.internal,
            credentials: profile.credentials,
            working_directory: context.cwd.clone(),
        };
        request.validate()?;
        debug!(
            key = %request.object_key,
            bucket = %request.bucket,
            region = %request.region,
            internal = request.internal,
            "cache request resolved"
        );
        Ok(request)
    }

    fn validate(&self) -> StepResult<()> {
        let mut violations = Vec::new();
        if self.region.is_empty() {
            violations.push("Region does not meet expectations".to_string());
        }
        if self.bucket.is_empty() {
            violations.push("Bucket does not meet expectations".to_string());
        }
        if self.object_key.is_empty() {
            violations.push("Key does not meet expectations".to_string());
        }
        if self.cache_path.as_os_str().is_empty() {
            violations.push("Path does not meet expectations".to_string());
        }
        if violations.is_empty() {
            Ok(())
        } else {
            Err(StepError::Configuration(violations))
        }
    }

    /// Remote coordinates for this request, recomputed on each call
    pub fn address(&self) -> RemoteAddress {
        remote_address(&self.bucket, &self.object_key, &self.region, self.internal)
    }
}
