//! Scripted gateway double for tests
//!
//! Records every call so tests can assert which transfer operations
//! ran, and in what order.

use crate::coordinates::RemoteAddress;
use crate::credentials::Credentials;
use crate::error::{StepError, StepResult};
use crate::gateway::{ExistsProbe, StorageGateway, TransferOptions, TransferOutcome};
use async_trait::async_trait;
use std::path::Path;
use std::sync::Mutex;

/// A recorded gateway invocation
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GatewayCall {
    Exists { object_url: String },
    Download { object_url: String, local_path: String },
    Upload { local_path: String, object_url: String },
}

/// Scripted storage gateway
pub struct FakeGateway {
    exists_status: Option<i32>,
    object_count: Option<u64>,
    download_status: Option<i32>,
    upload_status: Option<i32>,
    spawn_failure: bool,
    calls: Mutex<Vec<GatewayCall>>,
}

impl Default for FakeGateway {
    fn default() -> Self {
        Self {
            exists_status: Some(0),
            object_count: Some(0),
            download_status: Some(0),
            upload_status: Some(0),
            spawn_failure: false,
            calls: Mutex::new(Vec::new()),
        }
    }
}

impl FakeGateway {
    pub fn new() -> Self {
        Self::default()
    }

    /// Script the probe's marker line: `Some(n)` emits
    /// `total object count: n`, `None` omits the marker entirely
    pub fn with_object_count(mut self, count: Option<u64>) -> Self {
        self.object_count = count;
        self
    }

    pub fn with_exists_status(mut self, status: Option<i32>) -> Self {
        self.exists_status = status;
        self
    }

    pub fn with_download_status(mut self, status: Option<i32>) -> Self {
        self.download_status = status;
        self
    }

    pub fn with_upload_status(mut self, status: Option<i32>) -> Self {
        self.upload_status = status;
        self
    }

    /// Make every operation fail at spawn level
    pub fn with_spawn_failure(mut self) -> Self {
        self.spawn_failure = true;
        self
    }

    pub fn calls(&self) -> Vec<GatewayCall> {
        self.calls.lock().unwrap().clone()
    }

    pub fn transfer_call_count(&self) -> usize {
        self.calls()
            .iter()
            .filter(|c| !matches!(c, GatewayCall::Exists { .. }))
            .count()
    }

    fn record(&self, call: GatewayCall) {
        self.calls.lock().unwrap().push(call);
    }

    fn spawn_error(operation: &str) -> StepError {
        StepError::command_failed(
            operation,
            std::io::Error::new(std::io::ErrorKind::NotFound, "scripted spawn failure"),
        )
    }
}

#[async_trait]
impl StorageGateway for FakeGateway {
    async fn exists(
        &self,
        address: &RemoteAddress,
        _credentials: &Credentials,
    ) -> StepResult<ExistsProbe> {
        self.record(GatewayCall::Exists {
            object_url: address.object_url.clone(),
        });
        if self.spawn_failure {
            return Err(Self::spawn_error("fake du"));
        }
        let raw_output = match self.object_count {
            Some(count) => format!("total object count: {count}\n"),
            None => String::new(),
        };
        Ok(ExistsProbe {
            status: self.exists_status,
            raw_output,
        })
    }

    async fn download(
        &self,
        address: &RemoteAddress,
        local_path: &Path,
        _credentials: &Credentials,
        _options: &TransferOptions,
    ) -> StepResult<TransferOutcome> {
        self.record(GatewayCall::Download {
            object_url: address.object_url.clone(),
            local_path: local_path.to_string_lossy().into_owned(),
        });
        if self.spawn_failure {
            return Err(Self::spawn_error("fake cp"));
        }
        Ok(TransferOutcome {
            status: self.download_status,
            raw_output: String::new(),
        })
    }

    async fn upload(
        &self,
        local_path: &Path,
        address: &RemoteAddress,
        _credentials: &Credentials,
        _options: &TransferOptions,
    ) -> StepResult<TransferOutcome> {
        self.record(GatewayCall::Upload {
            local_path: local_path.to_string_lossy().into_owned(),
            object_url: address.object_url.clone(),
        });
        if self.spawn_failure {
            return Err(Self::spawn_error("fake cp"));
        }
        Ok(TransferOutcome {
            status: self.upload_status,
            raw_output: String::new(),
        })
    }
}
