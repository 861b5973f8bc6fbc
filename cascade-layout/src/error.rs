//! Error types for measurement and layout passes.

use thiserror::Error;

/// Errors that can occur while resolving an item's rendered height.
#[derive(Debug, Error)]
pub enum MeasureError {
    /// A caller-supplied height hook reported a failure.
    #[error("height hook failed: {0}")]
    HookFailed(String),
    /// The measurement host could not mount the sandbox or read it back.
    #[error("measurement host failed: {0}")]
    HostFailed(String),
}

/// Errors that abort a layout pass.
///
/// A failed pass publishes nothing: column state and placements are exactly
/// what they were before the call. Side effects of measurements that did run
/// (such as image substitutions on unrelated items) are not rolled back.
#[derive(Debug, Error)]
pub enum LayoutError {
    /// Height resolution failed for one of the items in the batch.
    #[error(transparent)]
    Measure(#[from] MeasureError),
    /// An item scheduled during re-layout had neither a fresh measurement
    /// nor a stored placement to take its height from.
    #[error("no height available for an item scheduled during re-layout")]
    MissingHeight,
}
