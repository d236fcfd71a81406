//! Credential and coordinate resolution strategies
//!
//! Three compatibility paths produce the effective storage coordinates
//! and credentials for a phase. Selection conditions are explicit named
//! predicates evaluated in strict priority order; no dynamic probing.

use crate::context::{ExecutionContext, StepInputs};
use crate::credentials::{CredentialProvider, Credentials};
use crate::error::StepResult;
use tracing::debug;

/// Which compatibility path produced the profile.
///
/// A complete context identity wins outright; otherwise the
/// compatibility host's cache config block, otherwise the step's own
/// inputs plus worker defaults.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResolutionStrategy {
    /// The execution context already carries a complete identity
    DirectContext,
    /// The compatibility host's application-level cache config block
    HostApplication,
    /// The step's own inputs plus worker defaults
    GenericInputs,
}

impl ResolutionStrategy {
    /// Pick the first matching strategy for this invocation
    pub fn select(context: &ExecutionContext) -> Self {
        if context.direct_identity().is_some() {
            ResolutionStrategy::DirectContext
        } else if context.app_cache_config().is_some() {
            ResolutionStrategy::HostApplication
        } else {
            ResolutionStrategy::GenericInputs
        }
    }
}

/// Resolved seed of a cache request: coordinates plus validated
/// credentials. Region or bucket may still be empty here; request
/// validation reports those together with key and path.
#[derive(Debug, Clone)]
pub struct StorageProfile {
    pub region: String,
    pub bucket: String,
    pub internal: bool,
    pub credentials: Credentials,
}

/// Resolve the storage profile for one phase invocation.
///
/// Credentials are validated before returning, so a profile never
/// reaches the transfer gateway with an unusable identity.
pub async fn resolve_profile(
    inputs: &StepInputs,
    context: &ExecutionContext,
    provider: &dyn CredentialProvider,
) -> StepResult<StorageProfile> {
    let strategy = ResolutionStrategy::select(context);
    debug!(?strategy, "resolving storage profile");

    let credentials = match context.direct_identity() {
        Some(creds) => creds,
        None => provider.acquire(inputs, context).await?,
    };
    credentials.validate()?;

    let (region, bucket, internal) = coordinates_for(inputs, context);
    debug!(%region, %bucket, internal, "resolved storage coordinates");

    Ok(StorageProfile {
        region,
        bucket,
        internal,
        credentials,
    })
}

/// Derive region, bucket and endpoint variant.
///
/// The compatibility host's cache config block takes priority over the
/// step's own inputs. In that mode the `internal` flag is always
/// derived from the region comparison and an explicit `internal` input
/// is ignored (same-region execution gets the intranet endpoint,
/// cross-region must go public).
fn coordinates_for(inputs: &StepInputs, context: &ExecutionContext) -> (String, String, bool) {
    if let Some(app) = context.app_cache_config() {
        let internal = context.default_region() == Some(app.region_id.as_str());
        return (app.region_id.clone(), app.bucket.clone(), internal);
    }

    let region = inputs
        .region
        .clone()
        .filter(|r| !r.is_empty())
        .or_else(|| context.default_region().map(str::to_string))
        .unwrap_or_default();
    let (bucket, explicit_internal) = match &inputs.oss_config {
        Some(oss) => (oss.bucket.clone(), oss.internal),
        None => (String::new(), None),
    };
    let internal = explicit_internal
        .unwrap_or_else(|| !region.is_empty() && context.default_region() == Some(region.as_str()));
    (region, bucket, internal)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::credentials::ContextCredentialProvider;

    fn inputs(json: &str) -> StepInputs {
        serde_json::from_str(json).unwrap()
    }

    fn context(json: &str) -> ExecutionContext {
        serde_json::from_str(json).unwrap()
    }

    #[tokio::test]
    async fn direct_identity_skips_the_provider() {
        let ctx = context(
            r#"{"inputs":{
                "uid":"1",
                "sts":{"accessKeyId":"sts-ak","accessKeySecret":"sts-sk"},
                "cacheConfig":{"bucket":"app-bucket","regionId":"cn-shanghai"}
            }}"#,
        );
        assert_eq!(
            ResolutionStrategy::select(&ctx),
            ResolutionStrategy::DirectContext
        );
        // Step inputs carry different credentials; the context identity
        // still wins, while coordinates come from the app config block.
        let ins = inputs(r#"{"credentials":{"accessKeyId":"other","accessKeySecret":"other"}}"#);
        let profile = resolve_profile(&ins, &ctx, &ContextCredentialProvider)
            .await
            .unwrap();
        assert_eq!(profile.credentials.access_key_id, "sts-ak");
        assert_eq!(profile.bucket, "app-bucket");
    }

    #[tokio::test]
    async fn app_config_derives_internal_from_region_match() {
        let ctx = context(
            r#"{"inputs":{
                "workerRunConfig":{"region":"cn-shanghai"},
                "cacheConfig":{"bucket":"app-bucket","regionId":"cn-shanghai"}
            }}"#,
        );
        let ins = inputs(r#"{"credentials":{"accessKeyId":"ak","accessKeySecret":"sk"}}"#);
        let profile = resolve_profile(&ins, &ctx, &ContextCredentialProvider)
            .await
            .unwrap();
        assert_eq!(profile.bucket, "app-bucket");
        assert_eq!(profile.region, "cn-shanghai");
        assert!(profile.internal);
    }

    #[tokio::test]
    async fn app_config_cross_region_goes_public() {
        let ctx = context(
            r#"{"inputs":{
                "workerRunConfig":{"region":"cn-beijing"},
                "cacheConfig":{"bucket":"app-bucket","regionId":"cn-shanghai"}
            }}"#,
        );
        let ins = inputs(r#"{"credentials":{"accessKeyId":"ak","accessKeySecret":"sk"}}"#);
        let profile = resolve_profile(&ins, &ctx, &ContextCredentialProvider)
            .await
            .unwrap();
        assert!(!profile.internal);
    }

    #[tokio::test]
    async fn app_config_ignores_explicit_internal_input() {
        let ctx = context(
            r#"{"inputs":{
                "workerRunConfig":{"region":"cn-shanghai"},
                "cacheConfig":{"bucket":"app-bucket","regionId":"cn-shanghai"}
            }}"#,
        );
        let ins = inputs(
            r#"{"credentials":{"accessKeyId":"ak","accessKeySecret":"sk"},
                "ossConfig":{"bucket":"other","internal":false}}"#,
        );
        let profile = resolve_profile(&ins, &ctx, &ContextCredentialProvider)
            .await
            .unwrap();
        // Derived value wins over the explicit input in this mode
        assert!(profile.internal);
        assert_eq!(profile.bucket, "app-bucket");
    }

    #[tokio::test]
    async fn generic_mode_region_falls_back_to_worker_default() {
        let ctx = context(r#"{"inputs":{"workerRunConfig":{"region":"cn-shenzhen"}}}"#);
        let ins = inputs(
            r#"{"credentials":{"accessKeyId":"ak","accessKeySecret":"sk"},
                "ossConfig":{"bucket":"b"}}"#,
        );
        let profile = resolve_profile(&ins, &ctx, &ContextCredentialProvider)
            .await
            .unwrap();
        assert_eq!(profile.region, "cn-shenzhen");
        // Same region as the worker default, so intranet by default
        assert!(profile.internal);
    }

    #[tokio::test]
    async fn generic_mode_explicit_internal_respected() {
        let ctx = context(r#"{"inputs":{"workerRunConfig":{"region":"cn-shenzhen"}}}"#);
        let ins = inputs(
            r#"{"credentials":{"accessKeyId":"ak","accessKeySecret":"sk"},
                "region":"cn-shenzhen",
                "ossConfig":{"bucket":"b","internal":false}}"#,
        );
        let profile = resolve_profile(&ins, &ctx, &ContextCredentialProvider)
            .await
            .unwrap();
        assert!(!profile.internal);
    }

    #[tokio::test]
    async fn generic_mode_cross_region_defaults_public() {
        let ctx = context(r#"{"inputs":{"workerRunConfig":{"region":"cn-shenzhen"}}}"#);
        let ins = inputs(
            r#"{"credentials":{"accessKeyId":"ak","accessKeySecret":"sk"},
                "region":"cn-hangzhou",
                "ossConfig":{"bucket":"b"}}"#,
        );
        let profile = resolve_profile(&ins, &ctx, &ContextCredentialProvider)
            .await
            .unwrap();
        assert!(!profile.internal);
    }

    #[tokio::test]
    async fn invalid_credentials_abort_resolution() {
        let ins = inputs(r#"{"credentials":{"accessKeyId":"ak","accessKeySecret":""}}"#);
        let err = resolve_profile(&ins, &ExecutionContext::default(), &ContextCredentialProvider)
            .await
            .unwrap_err();
        assert!(err.is_pre_transfer());
    }
}
