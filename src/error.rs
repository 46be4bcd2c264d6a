/// Errors crossing the statement-engine boundary.
///
/// These never reach the UI directly: the [`Evaluator`](crate::Evaluator)
/// implementation folds them into error results before handing anything
/// back to the caller.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    #[error("unsupported evaluator {0}")]
    UnsupportedExecutor(String),

    #[error("unsupported payload type {0}")]
    UnsupportedPayloadType(String),

    #[error("executor {0} does not support debugging")]
    DebugUnsupported(String),

    #[error("execution failed: {0}")]
    Execution(String),
}

pub type Result<T> = std::result::Result<T, EngineError>;
