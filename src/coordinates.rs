//! Cache coordinate builder
//!
//! Pure derivation of the remote address from bucket, key, region and
//! endpoint variant. Recomputed identically in both phases and never
//! persisted, so the two phases cannot drift apart.

/// Fully-qualified remote coordinates of one cache entry
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteAddress {
    /// Storage endpoint host for the region, intranet or public variant
    pub endpoint_url: String,
    /// Directory-like object prefix, always ending in `/`
    pub object_url: String,
}

/// Build the remote address for a cache entry.
///
/// Deterministic, no I/O. The object key always gets a trailing
/// separator so transfers operate over the whole prefix rather than a
/// single blob. `internal` selects the intranet endpoint; there is no
/// fallback between the two variants.
pub fn remote_address(bucket: &str, object_key: &str, region: &str, internal: bool) -> RemoteAddress {
    let suffix = if internal { "-internal" } else { "" };
    let separator = if object_key.ends_with('/') { "" } else { "/" };
    RemoteAddress {
        endpoint_url: format!("oss-{region}{suffix}.aliyuncs.com"),
        object_url: format!("oss://{bucket}/{object_key}{separator}"),
    }
}
