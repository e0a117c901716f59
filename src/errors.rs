use std::fmt;

/// Unified error type for the store engine and cache node.
///
/// `ReservedNotYetResolved` is deliberately distinct from `NotFound`: a
/// reserved-but-unresolved code is flattened to a plain not-found at the wire,
/// but callers inside the crate must be able to tell the two apart.
#[derive(Debug, Clone)]
pub enum ShortpoolError {
    InvalidInput(String),
    InvalidKey(String),
    InvalidArgument(String),
    NotFound(String),
    ReservedNotYetResolved(String),
    Conflict(String),
    EmptyPool(String),
    Unavailable(String),
    ExhaustedKeyspace(String),
    DatabaseOperation(String),
    Serialization(String),
}

impl ShortpoolError {
    pub fn code(&self) -> &'static str {
        match self {
            ShortpoolError::InvalidInput(_) => "E001",
            ShortpoolError::InvalidKey(_) => "E002",
            ShortpoolError::InvalidArgument(_) => "E003",
            ShortpoolError::NotFound(_) => "E004",
            ShortpoolError::ReservedNotYetResolved(_) => "E005",
            ShortpoolError::Conflict(_) => "E006",
            ShortpoolError::EmptyPool(_) => "E007",
            ShortpoolError::Unavailable(_) => "E008",
            ShortpoolError::ExhaustedKeyspace(_) => "E009",
            ShortpoolError::DatabaseOperation(_) => "E010",
            ShortpoolError::Serialization(_) => "E011",
        }
    }

    pub fn error_type(&self) -> &'static str {
        match self {
            ShortpoolError::InvalidInput(_) => "Invalid Input",
            ShortpoolError::InvalidKey(_) => "Invalid Key",
            ShortpoolError::InvalidArgument(_) => "Invalid Argument",
            ShortpoolError::NotFound(_) => "Resource Not Found",
            ShortpoolError::ReservedNotYetResolved(_) => "Reserved Not Yet Resolved",
            ShortpoolError::Conflict(_) => "Conflict",
            ShortpoolError::EmptyPool(_) => "Empty Reservation Pool",
            ShortpoolError::Unavailable(_) => "Backend Unavailable",
            ShortpoolError::ExhaustedKeyspace(_) => "Keyspace Exhausted",
            ShortpoolError::DatabaseOperation(_) => "Database Operation Error",
            ShortpoolError::Serialization(_) => "Serialization Error",
        }
    }

    pub fn message(&self) -> &str {
        match self {
            ShortpoolError::InvalidInput(msg)
            | ShortpoolError::InvalidKey(msg)
            | ShortpoolError::InvalidArgument(msg)
            | ShortpoolError::NotFound(msg)
            | ShortpoolError::ReservedNotYetResolved(msg)
            | ShortpoolError::Conflict(msg)
            | ShortpoolError::EmptyPool(msg)
            | ShortpoolError::Unavailable(msg)
            | ShortpoolError::ExhaustedKeyspace(msg)
            | ShortpoolError::DatabaseOperation(msg)
            | ShortpoolError::Serialization(msg) => msg,
        }
    }

    /// True for the two conditions a read path reports as a plain 404.
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            ShortpoolError::NotFound(_) | ShortpoolError::ReservedNotYetResolved(_)
        )
    }
}

impl fmt::Display for ShortpoolError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.error_type(), self.message())
    }
}

impl std::error::Error for ShortpoolError {}

// Convenience constructors
impl ShortpoolError {
    pub fn invalid_input<T: Into<String>>(msg: T) -> Self {
        ShortpoolError::InvalidInput(msg.into())
    }

    pub fn invalid_key<T: Into<String>>(msg: T) -> Self {
        ShortpoolError::InvalidKey(msg.into())
    }

    pub fn invalid_argument<T: Into<String>>(msg: T) -> Self {
        ShortpoolError::InvalidArgument(msg.into())
    }

    pub fn not_found<T: Into<String>>(msg: T) -> Self {
        ShortpoolError::NotFound(msg.into())
    }

    pub fn reserved_not_yet_resolved<T: Into<String>>(msg: T) -> Self {
        ShortpoolError::ReservedNotYetResolved(msg.into())
    }

    pub fn conflict<T: Into<String>>(msg: T) -> Self {
        ShortpoolError::Conflict(msg.into())
    }

    pub fn empty_pool<T: Into<String>>(msg: T) -> Self {
        ShortpoolError::EmptyPool(msg.into())
    }

    pub fn unavailable<T: Into<String>>(msg: T) -> Self {
        ShortpoolError::Unavailable(msg.into())
    }

    pub fn exhausted_keyspace<T: Into<String>>(msg: T) -> Self {
        ShortpoolError::ExhaustedKeyspace(msg.into())
    }

    pub fn database_operation<T: Into<String>>(msg: T) -> Self {
        ShortpoolError::DatabaseOperation(msg.into())
    }

    pub fn serialization<T: Into<String>>(msg: T) -> Self {
        ShortpoolError::Serialization(msg.into())
    }
}

impl From<sled::Error> for ShortpoolError {
    fn from(err: sled::Error) -> Self {
        ShortpoolError::DatabaseOperation(err.to_string())
    }
}

impl From<sled::transaction::TransactionError<ShortpoolError>> for ShortpoolError {
    fn from(err: sled::transaction::TransactionError<ShortpoolError>) -> Self {
        match err {
            sled::transaction::TransactionError::Abort(e) => e,
            sled::transaction::TransactionError::Storage(e) => {
                ShortpoolError::DatabaseOperation(e.to_string())
            }
        }
    }
}

impl From<serde_json::Error> for ShortpoolError {
    fn from(err: serde_json::Error) -> Self {
        ShortpoolError::Serialization(err.to_string())
    }
}

impl From<reqwest::Error> for ShortpoolError {
    fn from(err: reqwest::Error) -> Self {
        ShortpoolError::Unavailable(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, ShortpoolError>;
