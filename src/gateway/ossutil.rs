//! Production gateway adapter invoking the ossutil CLI
//!
//! Commands are built as argument vectors, never shell strings, and
//! credentials are redacted from logs. Only the existence check runs
//! under a time bound; transfers run to completion or external
//! cancellation.

use crate::coordinates::RemoteAddress;
use crate::credentials::Credentials;
use crate::error::{StepError, StepResult};
use crate::gateway::{ExistsProbe, StorageGateway, TransferOptions, TransferOutcome};
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::Duration;
use tokio::process::Command;
use tracing::debug;

/// Time budget for the existence check
pub const EXISTENCE_CHECK_TIMEOUT: Duration = Duration::from_secs(10);

/// Gateway adapter shelling out to `ossutil`
pub struct OssutilGateway {
    binary: String,
    working_directory: Option<PathBuf>,
}

impl OssutilGateway {
    pub fn new(binary: impl Into<String>) -> Self {
        Self {
            binary: binary.into(),
            working_directory: None,
        }
    }

    /// Working directory for transfer invocations, typically the
    /// host's ambient cwd
    pub fn with_working_directory(mut self, cwd: Option<PathBuf>) -> Self {
        self.working_directory = cwd;
        self
    }

    fn command(&self, args: &[String]) -> Command {
        let mut cmd = Command::new(&self.binary);
        cmd.args(args);
        if let Some(cwd) = &self.working_directory {
            cmd.current_dir(cwd);
        }
        cmd.stdout(Stdio::piped()).stderr(Stdio::piped());
        cmd.kill_on_drop(true);
        cmd
    }

    /// Endpoint and credential flags appended to every invocation
    fn common_args(address: &RemoteAddress, credentials: &Credentials) -> Vec<String> {
        let mut args = vec![
            "-e".to_string(),
            address.endpoint_url.clone(),
            "-i".to_string(),
            credentials.access_key_id.clone(),
            "-k".to_string(),
            credentials.access_key_secret.clone(),
        ];
        if let Some(token) = &credentials.security_token {
            args.push("-t".to_string());
            args.push(token.clone());
        }
        args
    }

    fn copy_args(options: &TransferOptions) -> Vec<String> {
        vec![
            "-r".to_string(),
            "-f".to_string(),
            "-j".to_string(),
            options.concurrency.to_string(),
            "--bigfile-threshold".to_string(),
            options.large_file_threshold.to_string(),
        ]
    }

    async fn copy(
        &self,
        source: &str,
        destination: &str,
        address: &RemoteAddress,
        credentials: &Credentials,
        options: &TransferOptions,
    ) -> StepResult<TransferOutcome> {
        let mut args = vec!["cp".to_string(), source.to_string(), destination.to_string()];
        args.extend(Self::copy_args(options));
        args.extend(Self::common_args(address, credentials));

        debug!(%source, %destination, "running {} cp", self.binary);
        let output = self
            .command(&args)
            .output()
            .await
            .map_err(|e| StepError::command_failed(format!("{} cp", self.binary), e))?;

        let outcome = TransferOutcome {
            status: output.status.code(),
            raw_output: String::from_utf8_lossy(&output.stdout).into_owned(),
        };
        debug!(status = ?outcome.status, "{} cp finished", self.binary);
        Ok(outcome)
    }
}

impl Default for OssutilGateway {
    fn default() -> Self {
        Self::new("ossutil")
    }
}

#[async_trait]
impl StorageGateway for OssutilGateway {
    async fn exists(
        &self,
        address: &RemoteAddress,
        credentials: &Credentials,
    ) -> StepResult<ExistsProbe> {
        let mut args = vec!["du".to_string(), address.object_url.clone()];
        args.extend(Self::common_args(address, credentials));

        debug!(url = %address.object_url, "running {} du", self.binary);
        let result = tokio::time::timeout(EXISTENCE_CHECK_TIMEOUT, self.command(&args).output())
            .await;

        let output = match result {
            // Child is killed on drop; report the missing status
            Err(_) => {
                debug!("existence check exceeded its time budget");
                return Ok(ExistsProbe::default());
            }
            Ok(output) => output
                .map_err(|e| StepError::command_failed(format!("{} du", self.binary), e))?,
        };

        let probe = ExistsProbe {
            status: output.status.code(),
            raw_output: String::from_utf8_lossy(&output.stdout).into_owned(),
        };
        debug!(status = ?probe.status, count = ?probe.object_count(), "{} du finished", self.binary);
        Ok(probe)
    }

    async fn download(
        &self,
        address: &RemoteAddress,
        local_path: &Path,
        credentials: &Credentials,
        options: &TransferOptions,
    ) -> StepResult<TransferOutcome> {
        self.copy(
            &address.object_url,
            &local_path.to_string_lossy(),
            address,
            credentials,
            options,
        )
        .await
    }

    async fn upload(
        &self,
        local_path: &Path,
        address: &RemoteAddress,
        credentials: &Credentials,
        options: &TransferOptions,
    ) -> StepResult<TransferOutcome> {
        self.copy(
            &local_path.to_string_lossy(),
            &address.object_url,
            address,
            credentials,
            options,
        )
        .await
    }
}
