use thiserror::Error;

#[derive(Error, Debug)]
pub enum VirtualListError {
    #[error("Fetch failed for page {page}: {message}")]
    FetchFailure { page: usize, message: String },

    #[error("Pool capacity exceeded: {requested} elements requested, {available} slots free")]
    CapacityExceeded { requested: usize, available: usize },

    #[error("Insufficient elements: {requested} requested, pool holds {len}")]
    InsufficientElements { requested: usize, len: usize },

    #[error("Already at the top of the list")]
    AtTopOfList,

    #[error("Unknown trigger source: {0}")]
    UnknownTriggerSource(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Config parse error: {0}")]
    Config(#[from] toml::de::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl VirtualListError {
    /// Errors that signal a broken contract between the controller and the pool.
    pub fn is_contract_violation(&self) -> bool {
        matches!(
            self,
            Self::CapacityExceeded { .. } | Self::InsufficientElements { .. }
        )
    }

    /// Boundary conditions that callers treat as a no-op.
    pub fn is_boundary(&self) -> bool {
        matches!(self, Self::AtTopOfList)
    }
}
