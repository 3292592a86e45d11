use thiserror::Error;

/// Deterministic data and input errors from the pricing core.
///
/// A failing plan is logged and skipped, it never aborts the run.
#[derive(Debug, Error, Eq, PartialEq)]
pub enum CoreError {
    #[error("malformed plan data: missing or empty `{field}`")]
    MalformedPlanData { field: &'static str },

    #[error("feed-in tiers are not ascending contiguous bands")]
    InvalidTierOrdering,

    #[error("invalid usage scenario: {reason}")]
    InvalidScenario { reason: &'static str },
}
