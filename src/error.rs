use serde_json;
use thiserror::Error;

// Enum for engine-level errors surfaced to the embedding host.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("Not enough charges. Need {required}, have {available}.")]
    InsufficientCharges { required: u32, available: u32 }, // Spend exceeds the current pool.

    #[error("Invalid drop source: {:#}", 0)]
    InvalidDropSource(String), // Dragged reference is the wrong kind or missing data.

    #[error("Permission denied: {:#}", 0)]
    PermissionDenied(String), // Privileged mutation attempted by a non-GM user.

    #[error("Activation failed: {:#}", 0)]
    Activation(String), // Downstream item activation threw after the debit.

    #[error("Host error: {:#}", 0)]
    Host(#[from] HostError), // Errors from the platform adapter.

    #[error("Serialization error: {:#}", 0)]
    Serialization(#[from] serde_json::Error), // Errors related to flag value serialization.

    #[error("IO error: {:#}", 0)]
    IO(#[from] std::io::Error), // Input/output errors (settings file).
}

// Enum for failures originating in the host platform adapter.
#[derive(Debug, Error)]
pub enum HostError {
    #[error("Persistence error: {:#}", 0)]
    Persistence(String), // A flag read or write failed.

    #[error("Document error: {:#}", 0)]
    Document(String), // A referenced document could not be created or deleted.

    #[error("Activation error: {:#}", 0)]
    Activation(String), // The item's own activation behavior failed.
}

pub type Result<T> = std::result::Result<T, EngineError>;
