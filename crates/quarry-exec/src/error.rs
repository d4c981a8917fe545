use thiserror::Error;

#[derive(Debug, Error)]
pub enum ExecError {
    #[error("unknown dataset '{0}'")]
    UnknownDataset(String),
    /// Catalog or API schema could not be built.
    #[error("schema: {0}")]
    Schema(#[source] quarry_core::Error),
    /// Request arguments could not be compiled.
    #[error("query: {0}")]
    Query(#[source] quarry_core::Error),
    #[error("backend: {0}")]
    Backend(String),
    #[error("unsupported by this backend: {0}")]
    Unsupported(String),
}

pub type Result<T> = std::result::Result<T, ExecError>;
