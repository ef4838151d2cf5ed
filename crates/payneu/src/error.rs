use thiserror::Error;

/// Errors surfaced by the payment flow.
///
/// Every failure is terminal for the current attempt and returns the
/// orchestrator to an initiable state; nothing here is fatal to the process.
#[derive(Debug, Error)]
pub enum PayError {
    #[error("invoice {0} not found")]
    NotFound(u64),

    #[error("backend fetch failed: {0}")]
    FetchFailed(String),

    #[error("precondition failed: {0}")]
    PreconditionFailed(String),

    #[error("approval rejected: {0}")]
    ApprovalRejected(String),

    #[error("approval failed: {0}")]
    ApprovalFailed(String),

    #[error("settlement failed: {0}")]
    SettlementFailed(String),

    #[error("chain error: {0}")]
    ChainError(String),

    #[error("invalid amount: {0}")]
    InvalidAmount(String),

    #[error("config error: {0}")]
    ConfigError(String),

    #[error("serialization error: {0}")]
    Serde(#[from] serde_json::Error),
}
