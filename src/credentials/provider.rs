//! Credential acquisition collaborator
//!
//! Resolution strategies two and three fetch credentials through this
//! seam. The production provider reads the step's embedded credentials
//! block, then the engine identity block; a hosted deployment can swap
//! in a provider that calls a credential service instead.

use crate::context::{ExecutionContext, StepInputs};
use crate::credentials::Credentials;
use crate::error::{StepError, StepResult};
use async_trait::async_trait;
use tracing::debug;

/// Acquires credentials for a phase invocation.
///
/// Implementations may perform network calls; failures surface as
/// `StepError::Credential`.
#[async_trait]
pub trait CredentialProvider: Send + Sync {
    async fn acquire(
        &self,
        inputs: &StepInputs,
        context: &ExecutionContext,
    ) -> StepResult<Credentials>;
}

/// Production provider: step inputs first, then the engine identity
pub struct ContextCredentialProvider;

#[async_trait]
impl CredentialProvider for ContextCredentialProvider {
    async fn acquire(
        &self,
        inputs: &StepInputs,
        context: &ExecutionContext,
    ) -> StepResult<Credentials> {
        if let Some(creds) = &inputs.credentials {
            debug!("using credentials from step inputs");
            return Ok(creds.clone());
        }
        if let Some(sts) = &context.inputs.sts {
            debug!("using credentials from engine identity block");
            return Ok(Credentials {
                account_id: sts
                    .account_id
                    .clone()
                    .or_else(|| context.inputs.uid.clone()),
                access_key_id: sts.access_key_id.clone().unwrap_or_default(),
                access_key_secret: sts.access_key_secret.clone().unwrap_or_default(),
                security_token: sts.security_token.clone(),
            });
        }
        Err(StepError::Credential(
            "Credentials does not meet expectations".to_string(),
        ))
    }
}
