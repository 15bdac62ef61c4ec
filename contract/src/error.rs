use billchain_store::StoreError;
use billchain_types::BillError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ContractError {
    /// Store access failed; surfaced as the backend reported it.
    #[error(transparent)]
    Store(#[from] StoreError),

    #[error("{0} does not exist")]
    NotFound(String),

    #[error("malformed argument: {0}")]
    MalformedArgument(String),

    #[error("unknown function: {0}")]
    UnknownFunction(String),

    #[error("failed to decode record at {key}: {reason}")]
    Decode { key: String, reason: String },

    #[error("failed to encode record: {0}")]
    Encode(String),

    #[error("cannot {transition} bill {id} in state {state}")]
    InvalidTransition {
        id: String,
        transition: String,
        state: String,
    },

    #[error("bill {0} already exists")]
    AlreadyExists(String),

    #[error("{0} is disabled")]
    Unsupported(String),
}

impl From<BillError> for ContractError {
    fn from(e: BillError) -> Self {
        ContractError::MalformedArgument(e.to_string())
    }
}
