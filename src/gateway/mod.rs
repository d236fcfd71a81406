//! Storage transfer gateway abstraction
//!
//! The protocol core never constructs transfer-tool command lines; it
//! talks to this capability trait. One production adapter shells out
//! to the real tool, one fake adapter scripts outcomes for tests.

pub mod fake;
pub mod ossutil;

pub use ossutil::OssutilGateway;

use crate::coordinates::RemoteAddress;
use crate::credentials::Credentials;
use crate::error::StepResult;
use async_trait::async_trait;
use std::path::Path;

/// Default concurrency for multi-file transfers
pub const TRANSFER_CONCURRENCY: u32 = 50;

/// Threshold in bytes above which transfers go through the tool's
/// resumable multi-part path
pub const LARGE_FILE_THRESHOLD: u64 = 9_223_372_036_854_775_800;

/// Tuning knobs applied to both download and upload
#[derive(Debug, Clone, Copy)]
pub struct TransferOptions {
    pub concurrency: u32,
    pub large_file_threshold: u64,
}

impl Default for TransferOptions {
    fn default() -> Self {
        Self {
            concurrency: TRANSFER_CONCURRENCY,
            large_file_threshold: LARGE_FILE_THRESHOLD,
        }
    }
}

/// Outcome of an existence check against a remote prefix
#[derive(Debug, Clone, Default)]
pub struct ExistsProbe {
    /// Exit status of the probe; `None` means the process died without
    /// one (killed by the time bound)
    pub status: Option<i32>,
    /// Raw tool output, parsed for the object-count marker
    pub raw_output: String,
}

impl ExistsProbe {
    pub fn succeeded(&self) -> bool {
        self.status == Some(0)
    }

    /// Object count under the prefix, parsed from the tool's
    /// `total object count: N` marker line
    pub fn object_count(&self) -> Option<u64> {
        self.raw_output
            .lines()
            .find_map(|line| line.trim().strip_prefix("total object count:"))
            .and_then(|count| count.trim().parse().ok())
    }

    /// The explicit zero-objects marker is present: a clean miss.
    ///
    /// An absent or unparseable marker is not treated as zero; the
    /// prefix is then assumed populated and the download decides.
    pub fn reports_zero_objects(&self) -> bool {
        self.object_count() == Some(0)
    }
}

/// Outcome of a download or upload
#[derive(Debug, Clone, Default)]
pub struct TransferOutcome {
    pub status: Option<i32>,
    pub raw_output: String,
}

impl TransferOutcome {
    pub fn succeeded(&self) -> bool {
        self.status == Some(0)
    }
}

/// Object-storage transfer capability consumed by the two phases
#[async_trait]
pub trait StorageGateway: Send + Sync {
    /// Check whether any object exists under the remote prefix,
    /// bounded by the adapter's time budget
    async fn exists(
        &self,
        address: &RemoteAddress,
        credentials: &Credentials,
    ) -> StepResult<ExistsProbe>;

    /// Recursively download the remote prefix into the local path,
    /// overwriting local files
    async fn download(
        &self,
        address: &RemoteAddress,
        local_path: &Path,
        credentials: &Credentials,
        options: &TransferOptions,
    ) -> StepResult<TransferOutcome>;

    /// Recursively upload the local path to the remote prefix,
    /// overwriting remote objects
    async fn upload(
        &self,
        local_path: &Path,
        address: &RemoteAddress,
        credentials: &Credentials,
        options: &TransferOptions,
    ) -> StepResult<TransferOutcome>;
}
